//! Entity types for the game core.
//!
//! - [`EntityId`]: Unique, monotonically assigned identifier
//! - [`EntityTag`]: Closed set of categories with an explicit collision table
//! - [`EntityInner`]: Type-safe component storage per category
//! - [`Entity`]: The complete entity container
//!
//! # Collision Compatibility
//!
//! Categories are a closed enum rather than an open bitmask. The only
//! colliding pair is `Projectile × Target`; see [`EntityTag::collides_with`].
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::entity::{Entity, EntityId, EntityTag, EntityInner, Tier};
//! use quadcoptar_core::entity::components::TargetComponents;
//! use glam::Vec3;
//!
//! let target = Entity::new(
//!     EntityId::new(42),
//!     EntityInner::Target(TargetComponents::new(Vec3::ZERO, Tier::Tier2, 10, 0.3, 1.0)),
//! );
//!
//! assert_eq!(target.id().as_u64(), 42);
//! assert_eq!(target.tag(), EntityTag::Target);
//! assert_eq!(target.tier(), Some(Tier::Tier2));
//! ```

pub mod components;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    LifetimePhase, LifetimeState, PhysicsState, ProjectileComponents, ProjectileKind,
    TargetComponents, Tier, TransformState,
};

/// Unique identifier for an entity.
///
/// Entity IDs are assigned by the [`Arena`](crate::arena::Arena) in strictly
/// increasing order and are never reused within a session.
///
/// # Example
///
/// ```
/// use quadcoptar_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Entity category.
///
/// The category decides which pairs of entities can collide. A projectile
/// only ever collides with a target; targets overlap each other freely and
/// projectiles pass through each other.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityTag {
    /// A spinning quadcopter to shoot at.
    Target,
    /// A fired shot.
    Projectile,
}

impl EntityTag {
    /// Collision compatibility table.
    ///
    /// | self \ other | Target | Projectile |
    /// |--------------|--------|------------|
    /// | Target       | no     | yes        |
    /// | Projectile   | yes    | no         |
    #[must_use]
    pub const fn collides_with(self, other: Self) -> bool {
        matches!(
            (self, other),
            (Self::Projectile, Self::Target) | (Self::Target, Self::Projectile)
        )
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target => write!(f, "Target"),
            Self::Projectile => write!(f, "Projectile"),
        }
    }
}

/// Type-safe storage for category-specific components.
///
/// The tag of an entity is always derived from this variant, so the two
/// cannot disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityInner {
    /// Target components (placement, tier, spin)
    Target(TargetComponents),
    /// Projectile components (physics, lifetime)
    Projectile(ProjectileComponents),
}

impl EntityInner {
    /// Returns the corresponding `EntityTag` for this inner storage.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        match self {
            Self::Target(_) => EntityTag::Target,
            Self::Projectile(_) => EntityTag::Projectile,
        }
    }

    /// Returns a reference to the transform, whatever the category.
    #[must_use]
    pub const fn transform(&self) -> &TransformState {
        match self {
            Self::Target(c) => &c.transform,
            Self::Projectile(c) => &c.transform,
        }
    }

    /// Returns the bounding sphere radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        match self {
            Self::Target(c) => c.radius,
            Self::Projectile(c) => c.radius,
        }
    }
}

/// A live entity in the game arena.
///
/// # Invariants
///
/// - The `EntityId` is unique within a session
/// - The tag always matches the `EntityInner` variant
/// - An entity is alive exactly while the arena holds it; removal is final
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    id: EntityId,
    inner: EntityInner,
}

impl Entity {
    /// Creates a new live entity.
    #[must_use]
    pub const fn new(id: EntityId, inner: EntityInner) -> Self {
        Self { id, inner }
    }

    /// Returns the entity's unique identifier.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Returns the entity's category.
    #[must_use]
    pub const fn tag(&self) -> EntityTag {
        self.inner.tag()
    }

    /// Returns a reference to the entity's inner component storage.
    #[must_use]
    pub const fn inner(&self) -> &EntityInner {
        &self.inner
    }

    /// Returns a mutable reference to the entity's inner component storage.
    #[must_use]
    pub fn inner_mut(&mut self) -> &mut EntityInner {
        &mut self.inner
    }

    /// Current world position.
    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.inner.transform().position
    }

    /// Current world orientation.
    #[must_use]
    pub const fn rotation(&self) -> Quat {
        self.inner.transform().rotation
    }

    /// Bounding sphere radius.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.inner.radius()
    }

    /// Scoring tier; `None` for projectiles.
    #[must_use]
    pub const fn tier(&self) -> Option<Tier> {
        match &self.inner {
            EntityInner::Target(c) => Some(c.tier),
            EntityInner::Projectile(_) => None,
        }
    }

    /// Render opacity; targets are always opaque.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match &self.inner {
            EntityInner::Target(_) => 1.0,
            EntityInner::Projectile(c) => c.lifetime.opacity(),
        }
    }

    /// Returns `true` if this entity is a target.
    #[must_use]
    pub const fn is_target(&self) -> bool {
        matches!(self.inner, EntityInner::Target(_))
    }

    /// Returns `true` if this entity is a projectile.
    #[must_use]
    pub const fn is_projectile(&self) -> bool {
        matches!(self.inner, EntityInner::Projectile(_))
    }

    /// Returns the target components if this is a target.
    #[must_use]
    pub const fn as_target(&self) -> Option<&TargetComponents> {
        match &self.inner {
            EntityInner::Target(c) => Some(c),
            EntityInner::Projectile(_) => None,
        }
    }

    /// Returns mutable target components if this is a target.
    #[must_use]
    pub fn as_target_mut(&mut self) -> Option<&mut TargetComponents> {
        match &mut self.inner {
            EntityInner::Target(c) => Some(c),
            EntityInner::Projectile(_) => None,
        }
    }

    /// Returns the projectile components if this is a projectile.
    #[must_use]
    pub const fn as_projectile(&self) -> Option<&ProjectileComponents> {
        match &self.inner {
            EntityInner::Projectile(c) => Some(c),
            EntityInner::Target(_) => None,
        }
    }

    /// Returns mutable projectile components if this is a projectile.
    #[must_use]
    pub fn as_projectile_mut(&mut self) -> Option<&mut ProjectileComponents> {
        match &mut self.inner {
            EntityInner::Projectile(c) => Some(c),
            EntityInner::Target(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(id: u64, tier: Tier) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityInner::Target(TargetComponents::new(Vec3::ZERO, tier, 1, 0.3, 1.0)),
        )
    }

    fn projectile(id: u64) -> Entity {
        Entity::new(
            EntityId::new(id),
            EntityInner::Projectile(ProjectileComponents::new(
                ProjectileKind::Bullet,
                Vec3::new(0.0, 0.0, -0.2),
                0.05,
                LifetimeState::new(6.0, 0.3),
            )),
        )
    }

    mod entity_id_tests {
        use super::*;

        #[test]
        fn ordering() {
            let mut ids = vec![EntityId::new(3), EntityId::new(1), EntityId::new(2)];
            ids.sort();
            assert_eq!(ids, vec![EntityId::new(1), EntityId::new(2), EntityId::new(3)]);
        }

        #[test]
        fn debug_and_display_format() {
            let id = EntityId::new(42);
            assert_eq!(format!("{id:?}"), "EntityId(42)");
            assert_eq!(format!("{id}"), "42");
        }

        #[test]
        fn u64_conversions() {
            let id: EntityId = 42u64.into();
            let raw: u64 = id.into();
            assert_eq!(raw, 42);
        }

        #[test]
        fn serialization_roundtrip() {
            let id = EntityId::new(12345);
            let json = serde_json::to_string(&id).unwrap();
            let deserialized: EntityId = serde_json::from_str(&json).unwrap();
            assert_eq!(id, deserialized);
        }
    }

    mod entity_tag_tests {
        use super::*;

        #[test]
        fn only_projectile_target_pairs_collide() {
            assert!(EntityTag::Projectile.collides_with(EntityTag::Target));
            assert!(EntityTag::Target.collides_with(EntityTag::Projectile));
            assert!(!EntityTag::Target.collides_with(EntityTag::Target));
            assert!(!EntityTag::Projectile.collides_with(EntityTag::Projectile));
        }

        #[test]
        fn display_format() {
            assert_eq!(EntityTag::Target.to_string(), "Target");
            assert_eq!(EntityTag::Projectile.to_string(), "Projectile");
        }
    }

    mod entity_tests {
        use super::*;

        #[test]
        fn tag_follows_inner() {
            assert_eq!(target(1, Tier::Tier1).tag(), EntityTag::Target);
            assert_eq!(projectile(2).tag(), EntityTag::Projectile);
        }

        #[test]
        fn tier_only_for_targets() {
            assert_eq!(target(1, Tier::Tier2).tier(), Some(Tier::Tier2));
            assert_eq!(projectile(2).tier(), None);
        }

        #[test]
        fn accessors_match_category() {
            let mut t = target(1, Tier::Tier1);
            assert!(t.is_target());
            assert!(t.as_target_mut().is_some());
            assert!(t.as_projectile().is_none());

            let mut p = projectile(2);
            assert!(p.is_projectile());
            assert!(p.as_projectile_mut().is_some());
            assert!(p.as_target().is_none());
        }

        #[test]
        fn position_and_radius() {
            let p = projectile(2);
            assert_eq!(p.position(), Vec3::new(0.0, 0.0, -0.2));
            assert!((p.radius() - 0.05).abs() < f32::EPSILON);
            assert_eq!(p.rotation(), Quat::IDENTITY);
        }

        #[test]
        fn serialization_roundtrip() {
            let entity = target(7, Tier::Tier2);
            let json = serde_json::to_string(&entity).unwrap();
            let deserialized: Entity = serde_json::from_str(&json).unwrap();
            assert_eq!(entity, deserialized);
        }
    }
}
