//! Contact resolution: scoring and removal.
//!
//! Applies each detected [`Contact`] to the arena. A contact naming an entity
//! that is already gone (removed by an earlier contact or by expiry in the
//! same frame) is an expected race and is skipped.

use glam::Vec3;
use tracing::trace;

use crate::arena::Arena;
use crate::entity::{Entity, EntityId};
use crate::output::Contact;

/// Outcome of one applied contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedContact {
    /// Projectile removed.
    pub projectile: EntityId,
    /// Target removed.
    pub target: EntityId,
    /// Target's last position.
    pub position: Vec3,
    /// Points the target was worth.
    pub points: u32,
}

/// Resolver that turns contacts into points and removals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactResolver;

impl ContactResolver {
    /// Creates a contact resolver.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies contacts in order and returns the ones that took effect.
    ///
    /// Both entities of an applied contact are removed from `arena`.
    pub fn resolve(&self, contacts: &[Contact], arena: &mut Arena) -> Vec<ResolvedContact> {
        let mut resolved = Vec::with_capacity(contacts.len());

        for contact in contacts {
            let Some((position, points)) = Self::target_info(arena, contact.target) else {
                trace!(target_id = %contact.target, "contact against removed target ignored");
                continue;
            };
            if !arena
                .get(contact.projectile)
                .is_some_and(Entity::is_projectile)
            {
                trace!(projectile = %contact.projectile, "contact from removed projectile ignored");
                continue;
            }

            arena.despawn(contact.projectile);
            arena.despawn(contact.target);

            resolved.push(ResolvedContact {
                projectile: contact.projectile,
                target: contact.target,
                position,
                points,
            });
        }

        resolved
    }

    fn target_info(arena: &Arena, id: EntityId) -> Option<(Vec3, u32)> {
        let entity = arena.get(id)?;
        let tier = entity.tier()?;
        Some((entity.position(), tier.points()))
    }
}
