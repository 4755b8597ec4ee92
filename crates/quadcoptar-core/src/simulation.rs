//! Frame-level world simulation.
//!
//! A [`Simulation`] owns the [`Arena`] and runs the resolvers in their fixed
//! order each frame:
//!
//! 1. **INTEGRATE**: spin targets, move and age projectiles
//! 2. **DETECT**: gather projectile/target contacts (parallel) and claim them
//!    (serial, projectile ID order)
//! 3. **RESOLVE**: remove both parties of each contact, record points
//! 4. **EXPIRE**: remove projectiles whose lifetime ran out and that did not
//!    hit anything this frame
//!
//! The simulation knows nothing about rounds or scores. The session decides
//! whether a frame runs at all and what the outcome means.
//!
//! # Determinism
//!
//! All phases visit entities in ID order; the parallel candidate pass is
//! collected back into projectile ID order before claiming.

use std::fmt;

use crate::arena::{Arena, ArenaSnapshot};
use crate::entity::EntityId;
use crate::hash::hash_arena;
use crate::resolver::{CollisionResolver, ContactResolver, PhysicsResolver, ResolvedContact};

/// What one frame changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutcome {
    /// Contacts applied this frame, in projectile ID order.
    pub contacts: Vec<ResolvedContact>,
    /// Projectiles removed because their lifetime ran out.
    pub expired: Vec<EntityId>,
}

impl FrameOutcome {
    /// Sum of points from this frame's contacts.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.contacts.iter().map(|c| c.points).sum()
    }

    /// Returns true if nothing was removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty() && self.expired.is_empty()
    }
}

/// The world: arena plus the resolvers that advance it.
#[derive(Clone, Default)]
pub struct Simulation {
    arena: Arena,
    physics: PhysicsResolver,
    collision: CollisionResolver,
    contact: ContactResolver,
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.arena.current_tick())
            .field("entity_count", &self.arena.entity_count())
            .finish_non_exhaustive()
    }
}

impl Simulation {
    /// Creates a simulation with an empty arena.
    ///
    /// # Example
    ///
    /// ```
    /// use quadcoptar_core::simulation::Simulation;
    ///
    /// let sim = Simulation::new();
    /// assert_eq!(sim.tick(), 0);
    /// assert!(sim.arena().is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the world by `dt` seconds.
    pub fn step(&mut self, dt: f32) -> FrameOutcome {
        // INTEGRATE
        let expiring = self.physics.integrate(&mut self.arena, dt);

        // DETECT
        let contacts = self.collision.detect(&self.arena);

        // RESOLVE
        let contacts = self.contact.resolve(&contacts, &mut self.arena);

        // EXPIRE: a projectile that hit something is already gone
        let expired = expiring
            .into_iter()
            .filter(|id| self.arena.despawn(*id).is_some())
            .collect();

        FrameOutcome { contacts, expired }
    }

    /// Advances one fixed 1/60 s step.
    pub fn step_fixed(&mut self) -> FrameOutcome {
        let dt = self.physics.dt();
        self.step(dt)
    }

    /// Returns a reference to the arena.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    /// Returns a mutable reference to the arena.
    ///
    /// Used to spawn entities between frames.
    #[must_use]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Owned snapshot of the current entities.
    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        self.arena.snapshot()
    }

    /// Number of frames simulated.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.arena.current_tick()
    }

    /// Deterministic hash of the world state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        hash_arena(&self.arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProjectileTuning;
    use crate::entity::{EntityInner, EntityTag, ProjectileKind, TargetComponents, Tier};
    use crate::launcher::ProjectileLauncher;
    use crate::pose::Pose;
    use glam::Vec3;

    fn spawn_target(sim: &mut Simulation, position: Vec3, tier: Tier) -> EntityId {
        sim.arena_mut()
            .spawn(EntityInner::Target(TargetComponents::new(position, tier, 1, 0.3, 1.0)))
    }

    fn fire(sim: &mut Simulation, pose: Pose) -> EntityId {
        ProjectileLauncher::new(&ProjectileTuning::default())
            .launch(sim.arena_mut(), ProjectileKind::Bullet, pose)
            .id
    }

    mod step_tests {
        use super::*;

        #[test]
        fn empty_step_advances_tick() {
            let mut sim = Simulation::new();
            let outcome = sim.step_fixed();
            assert!(outcome.is_empty());
            assert_eq!(sim.tick(), 1);
        }

        #[test]
        fn projectile_hits_target_ahead() {
            let mut sim = Simulation::new();
            let target = spawn_target(&mut sim, Vec3::new(0.0, 0.0, -2.0), Tier::Tier2);
            let projectile = fire(&mut sim, Pose::DEFAULT);

            let mut contacts = Vec::new();
            for _ in 0..60 {
                contacts.extend(sim.step_fixed().contacts);
            }

            assert_eq!(contacts.len(), 1);
            assert_eq!(contacts[0].target, target);
            assert_eq!(contacts[0].projectile, projectile);
            assert_eq!(contacts[0].points, 5);
            assert!(sim.arena().is_empty());
        }

        #[test]
        fn missed_projectile_expires() {
            let mut sim = Simulation::new();
            let projectile = fire(&mut sim, Pose::new(Vec3::Y, Vec3::ZERO));

            let mut expired = Vec::new();
            for _ in 0..(7 * 60) {
                expired.extend(sim.step_fixed().expired);
            }

            assert_eq!(expired, vec![projectile]);
            assert_eq!(sim.arena().count_tag(EntityTag::Projectile), 0);
        }

        #[test]
        fn outcome_points_sum() {
            let mut sim = Simulation::new();
            spawn_target(&mut sim, Vec3::new(0.0, 0.0, -1.0), Tier::Tier1);
            spawn_target(&mut sim, Vec3::new(1.0, 0.0, -1.0), Tier::Tier2);
            fire(&mut sim, Pose::new(Vec3::NEG_Z, Vec3::ZERO));
            fire(&mut sim, Pose::new(Vec3::NEG_Z, Vec3::new(1.0, 0.0, 0.0)));

            let mut points = 0;
            for _ in 0..30 {
                points += sim.step_fixed().points();
            }
            assert_eq!(points, 6);
        }
    }

    mod determinism_tests {
        use super::*;

        #[test]
        fn same_inputs_same_hash() {
            fn run() -> u64 {
                let mut sim = Simulation::new();
                spawn_target(&mut sim, Vec3::new(0.5, 0.0, -3.0), Tier::Tier1);
                fire(&mut sim, Pose::DEFAULT);
                for _ in 0..90 {
                    sim.step_fixed();
                }
                sim.state_hash()
            }
            assert_eq!(run(), run());
        }
    }
}
