//! Target population for a new round.
//!
//! [`TargetSpawner`] registers the configured number of targets, assigning
//! tiers by spawn index and positions from a [`PlacementSource`]. The default
//! source is [`UniformPlacement`], which draws every coordinate independently
//! from the arena bounds using a seeded `ChaCha8Rng`, so the same seed always
//! yields the same layout.
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::arena::Arena;
//! use quadcoptar_core::config::GameConfig;
//! use quadcoptar_core::spawner::{TargetSpawner, UniformPlacement};
//!
//! let config = GameConfig::with_seed(42);
//! let mut placement = UniformPlacement::new(config.arena, 42);
//! let mut arena = Arena::new();
//!
//! let spawned = TargetSpawner::new(&config.targets).spawn_population(&mut arena, &mut placement);
//! assert_eq!(spawned.len(), 100);
//! ```

use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::arena::Arena;
use crate::config::{ArenaBounds, TargetTuning};
use crate::entity::{EntityId, EntityInner, TargetComponents, Tier};

/// Supplies target positions.
pub trait PlacementSource: Send {
    /// Position for the target with 1-based spawn `index`.
    fn next_position(&mut self, index: u32) -> Vec3;
}

impl<F> PlacementSource for F
where
    F: FnMut(u32) -> Vec3 + Send,
{
    fn next_position(&mut self, index: u32) -> Vec3 {
        self(index)
    }
}

/// Uniform random placement inside arena bounds.
#[derive(Debug, Clone)]
pub struct UniformPlacement {
    bounds: ArenaBounds,
    rng: ChaCha8Rng,
}

impl UniformPlacement {
    /// Creates a placement source seeded with `seed`.
    #[must_use]
    pub fn new(bounds: ArenaBounds, seed: u64) -> Self {
        Self {
            bounds,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl PlacementSource for UniformPlacement {
    fn next_position(&mut self, _index: u32) -> Vec3 {
        self.bounds.sample(&mut self.rng)
    }
}

/// One target registered by the spawner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnedTarget {
    /// Registry ID
    pub id: EntityId,
    /// Scoring tier
    pub tier: Tier,
    /// Placement
    pub position: Vec3,
}

/// Registers a round's targets.
#[derive(Debug, Clone)]
pub struct TargetSpawner {
    tuning: TargetTuning,
}

impl TargetSpawner {
    /// Creates a spawner for the given tuning.
    #[must_use]
    pub fn new(tuning: &TargetTuning) -> Self {
        Self {
            tuning: tuning.clone(),
        }
    }

    /// Spawns indices `1..=population` in order.
    pub fn spawn_population(
        &self,
        arena: &mut Arena,
        placement: &mut dyn PlacementSource,
    ) -> Vec<SpawnedTarget> {
        let spawned: Vec<SpawnedTarget> = (1..=self.tuning.population)
            .map(|index| {
                let tier = Tier::for_index(index, self.tuning.tier2_interval);
                let position = placement.next_position(index);
                let id = arena.spawn(EntityInner::Target(TargetComponents::new(
                    position,
                    tier,
                    index,
                    self.tuning.radius,
                    self.tuning.spin_rate,
                )));
                SpawnedTarget { id, tier, position }
            })
            .collect();

        debug!(
            count = spawned.len(),
            tier2 = spawned.iter().filter(|t| t.tier == Tier::Tier2).count(),
            "spawned target population"
        );
        spawned
    }
}
