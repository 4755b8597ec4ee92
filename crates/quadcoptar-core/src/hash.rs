//! State hashing for replay verification.
//!
//! Two sessions fed the same seed and the same command sequence must end in
//! the same state. Comparing full states is noisy, so the tests compare these
//! hashes instead.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::{Quat, Vec3};

use crate::arena::Arena;
use crate::entity::{Entity, EntityInner};

/// Deterministic hash of every entity in the arena plus its tick.
#[must_use]
pub fn hash_arena(arena: &Arena) -> u64 {
    let mut hasher = DefaultHasher::new();
    hash_arena_into(arena, &mut hasher);
    hasher.finish()
}

/// Feeds the arena state into an existing hasher.
pub fn hash_arena_into<H: Hasher>(arena: &Arena, hasher: &mut H) {
    arena.current_tick().hash(hasher);
    arena.entity_count().hash(hasher);
    for entity in arena.entities_sorted() {
        hash_entity(entity, hasher);
    }
}

fn hash_entity<H: Hasher>(entity: &Entity, hasher: &mut H) {
    entity.id().hash(hasher);
    match entity.inner() {
        EntityInner::Target(target) => {
            0u8.hash(hasher);
            target.tier.hash(hasher);
            target.spawn_index.hash(hasher);
            hash_vec3(target.transform.position, hasher);
            target.yaw.to_bits().hash(hasher);
        }
        EntityInner::Projectile(projectile) => {
            1u8.hash(hasher);
            projectile.kind.hash(hasher);
            hash_vec3(projectile.transform.position, hasher);
            hash_quat(projectile.transform.rotation, hasher);
            hash_vec3(projectile.physics.velocity, hasher);
            projectile.lifetime.age.to_bits().hash(hasher);
        }
    }
}

// Floats are hashed as bits so equal states hash equal without float Eq.
fn hash_vec3<H: Hasher>(v: Vec3, hasher: &mut H) {
    for c in v.to_array() {
        c.to_bits().hash(hasher);
    }
}

fn hash_quat<H: Hasher>(q: Quat, hasher: &mut H) {
    for c in q.to_array() {
        c.to_bits().hash(hasher);
    }
}
