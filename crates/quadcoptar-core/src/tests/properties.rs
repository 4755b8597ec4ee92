//! Property tests for round invariants.

use glam::Vec3;
use proptest::prelude::*;

use crate::arena::Arena;
use crate::config::{GameConfig, TargetTuning};
use crate::entity::{EntityId, EntityInner, EntityTag, TargetComponents, Tier};
use crate::session::{Session, SessionState};
use crate::spawner::TargetSpawner;

#[derive(Debug, Clone)]
enum Op {
    Start,
    Tick,
    Fire,
    Advance(f32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::Start),
        3 => Just(Op::Tick),
        4 => Just(Op::Fire),
        6 => (0.0f32..0.5).prop_map(Op::Advance),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn round_invariants_hold(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 0..120)) {
        let mut session = Session::new(GameConfig::with_seed(seed)).unwrap();
        let mut last_score = 0;
        let mut last_remaining = session.remaining_seconds();
        let mut zero_seen = 0;

        for op in ops {
            let before = session.state();
            let entities_before = session.arena().entity_count();
            match op {
                Op::Start => { let _ = session.start(); }
                Op::Tick => { session.tick_countdown(); }
                Op::Fire => {
                    let result = session.fire("bullet");
                    if before != SessionState::Running {
                        prop_assert!(result.is_err());
                        prop_assert_eq!(session.arena().entity_count(), entities_before);
                    }
                }
                Op::Advance(dt) => { session.advance(dt); }
            }

            prop_assert!(session.score() >= last_score);
            if session.state() == SessionState::Running {
                prop_assert!(session.remaining_seconds() <= 30);
                if before == SessionState::Running {
                    prop_assert!(session.remaining_seconds() <= last_remaining);
                }
                if session.remaining_seconds() == 0 && last_remaining != 0 {
                    zero_seen += 1;
                }
            }
            if session.state() == SessionState::GameOver {
                prop_assert!(session.arena().is_empty());
            }
            if before == SessionState::GameOver {
                prop_assert_eq!(session.score(), last_score);
            }

            last_score = session.score();
            last_remaining = session.remaining_seconds();
        }
        prop_assert!(zero_seen <= 1);
    }

    #[test]
    fn score_is_sum_of_contact_points(seed in any::<u64>(), shots in 1usize..40) {
        let mut session = Session::new(GameConfig::with_seed(seed)).unwrap();
        session.start().unwrap();

        let mut points = 0;
        for _ in 0..shots {
            let _ = session.fire("bullet");
            for _ in 0..20 {
                let outcome = session.advance(1.0 / 60.0);
                for contact in &outcome.contacts {
                    prop_assert!(contact.points == 1 || contact.points == 5);
                }
                points += outcome.points();
            }
        }
        prop_assert_eq!(session.score(), points);
    }

    #[test]
    fn despawn_twice_is_despawn_once(count in 1usize..20, pick in any::<prop::sample::Index>()) {
        let mut arena = Arena::new();
        let ids: Vec<EntityId> = (0..count)
            .map(|_| arena.spawn(EntityInner::Target(TargetComponents::new(Vec3::ZERO, Tier::Tier1, 1, 0.3, 1.0))))
            .collect();
        let victim = ids[pick.index(ids.len())];

        let mut once = arena.clone();
        once.despawn(victim);
        arena.despawn(victim);
        arena.despawn(victim);

        prop_assert_eq!(once.snapshot(), arena.snapshot());
        prop_assert_eq!(arena.entity_count(), count - 1);
    }

    #[test]
    fn tier2_count_matches_interval(population in 1u32..300, interval in 1u32..20) {
        let tuning = TargetTuning { population, tier2_interval: interval, ..TargetTuning::default() };
        let mut arena = Arena::new();
        let mut origin = |_: u32| Vec3::ZERO;
        let spawned = TargetSpawner::new(&tuning).spawn_population(&mut arena, &mut origin);

        let tier2 = spawned.iter().filter(|t| t.tier == Tier::Tier2).count();
        prop_assert_eq!(tier2 as u32, population / interval);
        prop_assert_eq!(arena.count_tag(EntityTag::Target), population as usize);
    }
}
