//! Projectile launch.
//!
//! A launch places a resting projectile at the pose position, then applies a
//! single impulse of `direction * speed` at the configured lever arm. With
//! unit mass the projectile leaves at exactly `speed`; the off-centre lever
//! arm adds a small spin.

use glam::Vec3;

use crate::arena::Arena;
use crate::config::ProjectileTuning;
use crate::entity::{EntityId, EntityInner, LifetimeState, ProjectileComponents, ProjectileKind};
use crate::pose::Pose;

/// A registered projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchedProjectile {
    /// Registry ID
    pub id: EntityId,
    /// Launch position
    pub position: Vec3,
    /// Initial velocity
    pub velocity: Vec3,
}

/// Creates projectiles from a pose.
///
/// # Example
///
/// ```
/// use quadcoptar_core::arena::Arena;
/// use quadcoptar_core::config::ProjectileTuning;
/// use quadcoptar_core::entity::ProjectileKind;
/// use quadcoptar_core::launcher::ProjectileLauncher;
/// use quadcoptar_core::pose::Pose;
///
/// let mut arena = Arena::new();
/// let launcher = ProjectileLauncher::new(&ProjectileTuning::default());
/// let shot = launcher.launch(&mut arena, ProjectileKind::Bullet, Pose::DEFAULT);
///
/// assert!((shot.velocity.length() - 4.0).abs() < 1e-5);
/// ```
#[derive(Debug, Clone)]
pub struct ProjectileLauncher {
    tuning: ProjectileTuning,
}

impl ProjectileLauncher {
    /// Creates a launcher for the given tuning.
    #[must_use]
    pub fn new(tuning: &ProjectileTuning) -> Self {
        Self {
            tuning: tuning.clone(),
        }
    }

    /// Registers a projectile of `kind` fired from `pose`.
    pub fn launch(&self, arena: &mut Arena, kind: ProjectileKind, pose: Pose) -> LaunchedProjectile {
        let mut components = ProjectileComponents::new(
            kind,
            pose.position,
            self.tuning.radius,
            LifetimeState::new(self.tuning.wait_secs, self.tuning.fade_secs),
        );
        components
            .physics
            .apply_impulse(pose.direction * self.tuning.speed, self.tuning.lever_arm);
        let velocity = components.physics.velocity;

        let id = arena.spawn(EntityInner::Projectile(components));
        LaunchedProjectile {
            id,
            position: pose.position,
            velocity,
        }
    }
}
