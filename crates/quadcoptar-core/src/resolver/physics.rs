//! Physics integration for one frame.
//!
//! The `PhysicsResolver` handles:
//! - Target spin: `yaw += spin_rate * dt` about +Y, no translation
//! - Projectile flight: `position += velocity * dt`, orientation integrated
//!   from angular velocity, no gravity
//! - Projectile ageing, reporting every projectile whose lifetime ran out
//!
//! # Fixed Timestep
//!
//! [`PhysicsResolver::step`] integrates one fixed step of 1/60 s.
//! [`PhysicsResolver::integrate`] takes an explicit `dt` for hosts that
//! drive physics from a variable frame clock.

use std::f32::consts::TAU;

use glam::{Quat, Vec3};

use crate::arena::Arena;
use crate::entity::{EntityId, EntityInner};

/// Fixed timestep for physics integration (1/60 second = ~16.67ms).
pub const FIXED_DT: f32 = 1.0 / 60.0;

/// Resolver that moves every entity forward in time.
///
/// # Processing Order
///
/// 1. Every projectile records `previous_position` (for swept collision)
/// 2. Positions, orientations and ages advance by `dt`
/// 3. The spatial index is re-synced for every projectile
///
/// Entities are visited in ID order, so the result is deterministic.
///
/// # Example
///
/// ```
/// use quadcoptar_core::resolver::{PhysicsResolver, FIXED_DT};
///
/// let resolver = PhysicsResolver::new();
/// assert!((resolver.dt() - FIXED_DT).abs() < f32::EPSILON);
/// ```
#[derive(Debug, Clone)]
pub struct PhysicsResolver {
    /// Fixed timestep for physics integration
    dt: f32,
}

impl Default for PhysicsResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsResolver {
    /// Creates a new physics resolver with the default fixed timestep.
    #[must_use]
    pub fn new() -> Self {
        Self { dt: FIXED_DT }
    }

    /// Creates a physics resolver with a custom timestep.
    ///
    /// Useful for testing or non-standard tick rates.
    #[must_use]
    pub fn with_dt(dt: f32) -> Self {
        Self { dt }
    }

    /// Returns the fixed timestep.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Integrates one fixed step. See [`integrate`](Self::integrate).
    pub fn step(&self, arena: &mut Arena) -> Vec<EntityId> {
        self.integrate(arena, self.dt)
    }

    /// Integrates `dt` seconds and returns expired projectiles in ID order.
    ///
    /// Expired projectiles stay in the arena; removing them is the caller's
    /// decision. Negative or non-finite `dt` is treated as zero.
    pub fn integrate(&self, arena: &mut Arena, dt: f32) -> Vec<EntityId> {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let mut moved = Vec::new();
        let mut expired = Vec::new();

        for entity in arena.entities_sorted_mut() {
            let id = entity.id();
            match entity.inner_mut() {
                EntityInner::Target(target) => {
                    target.yaw = (target.yaw + target.spin_rate * dt).rem_euclid(TAU);
                    target.transform.rotation = Quat::from_rotation_y(target.yaw);
                }
                EntityInner::Projectile(projectile) => {
                    let transform = &mut projectile.transform;
                    transform.previous_position = transform.position;
                    transform.position += projectile.physics.velocity * dt;
                    transform.rotation =
                        integrate_rotation(transform.rotation, projectile.physics.angular_velocity, dt);

                    projectile.lifetime.advance(dt);
                    if projectile.lifetime.is_expired() {
                        expired.push(id);
                    }
                    moved.push(id);
                }
            }
        }

        for id in moved {
            arena.update_spatial(id);
        }
        arena.advance_tick();
        expired
    }
}

/// Rotates `rotation` by `angular_velocity * dt` (axis-angle).
fn integrate_rotation(rotation: Quat, angular_velocity: Vec3, dt: f32) -> Quat {
    let angle = angular_velocity.length() * dt;
    if angle <= f32::EPSILON {
        return rotation;
    }
    let axis = angular_velocity.normalize();
    (Quat::from_axis_angle(axis, angle) * rotation).normalize()
}
