//! Resolvers that advance the arena by one physics frame.
//!
//! A frame runs three resolvers in a fixed order:
//! 1. [`PhysicsResolver`]: spin targets, fly projectiles, age lifetimes
//! 2. [`CollisionResolver`]: find projectile/target contacts
//! 3. [`ContactResolver`]: award points and remove both parties
//!
//! # Invariants
//!
//! - Every resolver visits entities in ID order
//! - Results never depend on thread scheduling
//! - IDs that are no longer registered are ignored, never an error

mod collision;
mod contact;
mod physics;

pub use collision::CollisionResolver;
pub use contact::{ContactResolver, ResolvedContact};
pub use physics::{PhysicsResolver, FIXED_DT};
