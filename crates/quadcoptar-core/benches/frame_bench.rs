use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::Vec3;
use quadcoptar_core::arena::Arena;
use quadcoptar_core::config::GameConfig;
use quadcoptar_core::pose::{LatestPose, Pose};
use quadcoptar_core::entity::ProjectileKind;
use quadcoptar_core::launcher::ProjectileLauncher;
use quadcoptar_core::resolver::{CollisionResolver, PhysicsResolver, FIXED_DT};
use quadcoptar_core::session::Session;
use quadcoptar_core::spawner::{TargetSpawner, UniformPlacement};
use std::sync::Arc;

fn bench_session_frame(c: &mut Criterion) {
    // Full population plus a spread of projectiles in flight
    let pose = Arc::new(LatestPose::new());
    let mut session = Session::new(GameConfig::with_seed(11))
        .expect("default config is valid")
        .with_pose_provider(pose.clone());
    session.start().expect("fresh session starts");

    for i in 0..30 {
        let angle = i as f32 * 0.2;
        pose.set(Pose::new(Vec3::new(angle.sin(), 0.0, -angle.cos()), Vec3::ZERO));
        let _ = session.fire("bullet");
    }

    c.bench_function("session_frame", |b| {
        b.iter(|| black_box(session.advance(black_box(FIXED_DT))))
    });
}

fn bench_collision_detect(c: &mut Criterion) {
    let config = GameConfig::with_seed(5);
    let mut arena = Arena::new();
    let mut placement = UniformPlacement::new(config.arena, 5);
    TargetSpawner::new(&config.targets).spawn_population(&mut arena, &mut placement);

    // 50 projectiles each swept one frame along a different heading
    let launcher = ProjectileLauncher::new(&config.projectile);
    for i in 0..50 {
        let angle = i as f32 * 0.125;
        let pose = Pose::new(Vec3::new(angle.sin(), 0.1, -angle.cos()), Vec3::ZERO);
        launcher.launch(&mut arena, ProjectileKind::Bullet, pose);
    }
    PhysicsResolver::new().step(&mut arena);
    let collision = CollisionResolver::new();

    c.bench_function("collision_detect_100x50", |b| {
        b.iter(|| black_box(collision.detect(black_box(&arena))))
    });
}

criterion_group!(benches, bench_session_frame, bench_collision_detect);
criterion_main!(benches);
