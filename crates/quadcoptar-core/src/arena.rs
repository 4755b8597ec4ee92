//! Entity registry for a game session.
//!
//! The Arena owns every live entity. It provides:
//! - Entity storage with deterministic iteration order (`BTreeMap`)
//! - Monotonic ID assignment
//! - Idempotent removal
//! - Owned snapshots that can be iterated repeatedly
//! - A spatial index for radius queries
//!
//! # Removal Is Idempotent
//!
//! Contact resolution can race two removal requests for the same entity
//! (two contacts naming one target, or an expiry and a hit in the same
//! frame). [`Arena::despawn`] on an unknown ID is therefore a no-op that
//! returns `None`, never an error.
//!
//! # Spatial Index Synchronization
//!
//! The spatial index is updated on spawn and despawn. After changing a
//! position through [`Arena::get_mut`], call [`Arena::update_spatial`] (the
//! physics resolver does this for every entity it moves).
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::arena::Arena;
//! use quadcoptar_core::entity::{EntityInner, TargetComponents, Tier};
//! use glam::Vec3;
//!
//! let mut arena = Arena::new();
//! let id = arena.spawn(EntityInner::Target(TargetComponents::new(
//!     Vec3::new(1.0, 0.0, -3.0),
//!     Tier::Tier1,
//!     1,
//!     0.3,
//!     1.0,
//! )));
//!
//! assert!(arena.get(id).is_some());
//! assert!(arena.despawn(id).is_some());
//! assert!(arena.despawn(id).is_none()); // second removal is a no-op
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId, EntityInner, EntityTag};

// =============================================================================
// Spatial Index
// =============================================================================

/// Position index for proximity queries.
///
/// A flat `HashMap` is enough for a population of a hundred or so entities.
/// Queries sort their results so callers see a deterministic order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpatialIndex {
    positions: HashMap<EntityId, Vec3>,
}

impl SpatialIndex {
    /// Creates a new empty spatial index.
    #[must_use]
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Inserts or updates an entity's position.
    pub fn insert(&mut self, id: EntityId, pos: Vec3) {
        self.positions.insert(id, pos);
    }

    /// Removes an entity from the index.
    pub fn remove(&mut self, id: EntityId) {
        self.positions.remove(&id);
    }

    /// Returns the position of an entity, if known.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<Vec3> {
        self.positions.get(&id).copied()
    }

    /// Returns the IDs within `radius` of `center`, sorted by ID.
    #[must_use]
    pub fn query_radius(&self, center: Vec3, radius: f32) -> Vec<EntityId> {
        let radius_sq = radius * radius;
        let mut results: Vec<EntityId> = self
            .positions
            .iter()
            .filter(|(_, pos)| center.distance_squared(**pos) <= radius_sq)
            .map(|(id, _)| *id)
            .collect();

        results.sort();
        results
    }

    /// Returns the number of indexed entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Owned, immutable copy of the arena at one point in time.
///
/// Cloning is cheap (the entity list is shared), and the snapshot can be
/// iterated any number of times. Mutating the arena afterwards does not
/// affect it.
#[derive(Debug, Clone, PartialEq)]
pub struct ArenaSnapshot {
    tick: u64,
    entities: Arc<[Entity]>,
}

impl ArenaSnapshot {
    /// Physics tick the snapshot was taken at.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Iterates entities in ID order. Restartable.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter()
    }

    /// Looks up one entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, Entity::id)
            .ok()
            .map(|idx| &self.entities[idx])
    }

    /// Number of entities captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the snapshot holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of captured entities in the given category.
    #[must_use]
    pub fn count_tag(&self, tag: EntityTag) -> usize {
        self.iter().filter(|e| e.tag() == tag).count()
    }
}

impl<'a> IntoIterator for &'a ArenaSnapshot {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

// =============================================================================
// Arena
// =============================================================================

/// Registry of all live targets and projectiles.
///
/// # Determinism
///
/// Storage is a `BTreeMap` keyed by monotonically assigned IDs, so iteration
/// always visits entities in spawn order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena {
    /// Next ID to hand out. Starts at 1.
    next_id: u64,
    /// Entity storage with deterministic iteration order.
    entities: BTreeMap<EntityId, Entity>,
    /// Position index kept in sync with `entities`.
    spatial: SpatialIndex,
    /// Physics tick counter.
    tick: u64,
}

impl Arena {
    /// Creates a new empty arena at tick 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
            spatial: SpatialIndex::new(),
            tick: 0,
        }
    }

    /// Adds an entity and returns its freshly assigned ID. Never fails.
    pub fn spawn(&mut self, inner: EntityInner) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;

        let entity = Entity::new(id, inner);
        self.spatial.insert(id, entity.position());
        self.entities.insert(id, entity);
        id
    }

    /// Removes an entity. Unknown IDs are a no-op returning `None`.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.spatial.remove(id);
        self.entities.remove(&id)
    }

    /// Removes every entity, returning the removed IDs in order.
    pub fn clear(&mut self) -> Vec<EntityId> {
        let ids: Vec<EntityId> = self.entities.keys().copied().collect();
        self.entities.clear();
        self.spatial.clear();
        ids
    }

    /// Returns a reference to an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Returns a mutable reference to an entity by ID.
    #[must_use]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Returns true if an entity with this ID is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Iterates entity IDs in ID order.
    pub fn entity_ids_sorted(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    /// Iterates entities in ID order.
    pub fn entities_sorted(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    /// Iterates mutable entities in ID order.
    pub fn entities_sorted_mut(&mut self) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities.values_mut()
    }

    /// Iterates live entities of one category in ID order.
    pub fn entities_tagged(&self, tag: EntityTag) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.values().filter(move |e| e.tag() == tag)
    }

    /// Calls `f` on every entity in ID order.
    pub fn for_each<F: FnMut(&Entity)>(&self, f: F) {
        self.entities.values().for_each(f);
    }

    /// Captures an owned snapshot of the current entities.
    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        ArenaSnapshot {
            tick: self.tick,
            entities: self.entities.values().cloned().collect(),
        }
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Returns the number of entities in one category.
    #[must_use]
    pub fn count_tag(&self, tag: EntityTag) -> usize {
        self.entities_tagged(tag).count()
    }

    /// Returns true if the arena has no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns a reference to the spatial index.
    #[must_use]
    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Returns the current physics tick.
    #[must_use]
    pub const fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Advances the physics tick counter.
    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Re-indexes one entity after its position changed.
    pub fn update_spatial(&mut self, id: EntityId) {
        if let Some(entity) = self.entities.get(&id) {
            self.spatial.insert(id, entity.position());
        }
    }
}

impl Default for Arena {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
