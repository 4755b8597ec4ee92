//! Contact detection between projectiles and targets.
//!
//! Each projectile is tested as a sphere swept along the segment it travelled
//! this frame, so a fast projectile cannot tunnel through a target between two
//! frames.
//!
//! # Claiming
//!
//! Detection runs in two phases:
//! 1. Candidate gathering (parallel): for each projectile, the arena's spatial
//!    index yields the targets near the swept segment, and every one whose
//!    sphere intersects the segment becomes a candidate, sorted by target ID.
//! 2. Claiming (serial, projectile ID order): each projectile takes its first
//!    candidate not already claimed this frame.
//!
//! The result is one contact per projectile at most, one contact per target
//! at most, and the same answer regardless of thread scheduling.

use std::collections::BTreeSet;

use glam::Vec3;
use rayon::prelude::*;

use crate::arena::Arena;
use crate::entity::{EntityId, EntityTag};
use crate::output::Contact;

/// Sphere representation of a collidable entity for one frame.
#[derive(Debug, Clone, Copy)]
struct Body {
    id: EntityId,
    tag: EntityTag,
    start: Vec3,
    end: Vec3,
    radius: f32,
}

/// Finds projectile/target contacts for the frame just integrated.
///
/// # Example
///
/// ```
/// use quadcoptar_core::arena::Arena;
/// use quadcoptar_core::resolver::CollisionResolver;
///
/// let arena = Arena::new();
/// assert!(CollisionResolver::new().detect(&arena).is_empty());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CollisionResolver;

impl CollisionResolver {
    /// Creates a collision resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Returns contacts in projectile ID order.
    #[must_use]
    pub fn detect(&self, arena: &Arena) -> Vec<Contact> {
        let bodies: Vec<Body> = arena
            .entities_sorted()
            .map(|e| {
                let transform = e.inner().transform();
                Body {
                    id: e.id(),
                    tag: e.tag(),
                    start: transform.previous_position,
                    end: transform.position,
                    radius: e.radius(),
                }
            })
            .collect();

        let (projectiles, targets): (Vec<Body>, Vec<Body>) = bodies
            .into_iter()
            .partition(|b| b.tag == EntityTag::Projectile);

        if projectiles.is_empty() || targets.is_empty() {
            return Vec::new();
        }

        let max_target_radius = targets.iter().map(|t| t.radius).fold(0.0, f32::max);

        // Both lists inherit ID order from the arena; par_iter + collect keeps it.
        let candidates: Vec<(EntityId, Vec<EntityId>)> = projectiles
            .par_iter()
            .map(|projectile| {
                let hits = gather_candidates(arena, projectile, &targets, max_target_radius);
                (projectile.id, hits)
            })
            .collect();

        let mut claimed = BTreeSet::new();
        let mut contacts = Vec::new();
        for (projectile, hits) in candidates {
            if let Some(target) = hits.into_iter().find(|id| !claimed.contains(id)) {
                claimed.insert(target);
                contacts.push(Contact { projectile, target });
            }
        }
        contacts
    }
}

/// Targets whose sphere the projectile's swept segment touches, by ID.
///
/// `targets` must be sorted by ID.
fn gather_candidates(
    arena: &Arena,
    projectile: &Body,
    targets: &[Body],
    max_target_radius: f32,
) -> Vec<EntityId> {
    // Any target the segment can reach lies within this sphere around its midpoint.
    let center = (projectile.start + projectile.end) * 0.5;
    let search = projectile.start.distance(projectile.end) * 0.5
        + projectile.radius
        + max_target_radius;

    arena
        .spatial()
        .query_radius(center, search)
        .into_iter()
        .filter_map(|id| {
            let index = targets.binary_search_by_key(&id, |t| t.id).ok()?;
            Some(&targets[index])
        })
        .filter(|target| projectile.tag.collides_with(target.tag))
        .filter(|target| {
            let point = closest_point_on_segment(projectile.start, projectile.end, target.end);
            let reach = projectile.radius + target.radius;
            point.distance_squared(target.end) <= reach * reach
        })
        .map(|target| target.id)
        .collect()
}

/// Closest point to `p` on the segment `a..b`.
pub(crate) fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq <= f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}
