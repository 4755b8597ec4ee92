//! Component structs for the two entity categories.
//!
//! Targets spin in place and carry a scoring [`Tier`]. Projectiles carry
//! physics and a [`LifetimeState`] that drives their fade-out and expiry.

use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::FireRejection;

// =============================================================================
// Transform / Physics
// =============================================================================

/// Position and orientation in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// World position.
    pub position: Vec3,
    /// Position at the start of the last physics step; equals `position`
    /// until the entity first moves. Used for swept collision tests.
    pub previous_position: Vec3,
    /// World orientation.
    pub rotation: Quat,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::at_position(Vec3::ZERO)
    }
}

impl TransformState {
    /// Creates an unrotated transform at `position`.
    #[must_use]
    pub const fn at_position(position: Vec3) -> Self {
        Self {
            position,
            previous_position: position,
            rotation: Quat::IDENTITY,
        }
    }
}

/// Rigid-body motion state for impulse-driven entities.
///
/// Bodies have unit mass and unit moment of inertia, so an impulse maps
/// directly onto a velocity change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    /// Linear velocity in units per second.
    pub velocity: Vec3,
    /// Angular velocity (axis × radians per second).
    pub angular_velocity: Vec3,
}

impl PhysicsState {
    /// Applies `impulse` at `lever_arm` from the centre of mass.
    ///
    /// The linear part changes velocity; an off-centre application point
    /// also adds spin (`lever_arm × impulse`).
    pub fn apply_impulse(&mut self, impulse: Vec3, lever_arm: Vec3) {
        self.velocity += impulse;
        self.angular_velocity += lever_arm.cross(impulse);
    }
}

// =============================================================================
// Targets
// =============================================================================

/// Scoring tier of a target.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Common target, worth 1 point.
    Tier1,
    /// High-value target, worth 5 points.
    Tier2,
}

impl Tier {
    /// Points awarded for destroying a target of this tier.
    #[must_use]
    pub const fn points(self) -> u32 {
        match self {
            Self::Tier1 => 1,
            Self::Tier2 => 5,
        }
    }

    /// Tier for the `index`-th spawned target (1-based).
    ///
    /// Every `interval`-th index, starting at `interval` itself, is Tier2.
    /// With the default interval of 10 that is {10, 20, ..., 100}.
    #[must_use]
    pub const fn for_index(index: u32, interval: u32) -> Self {
        if interval > 0 && index >= interval && index % interval == 0 {
            Self::Tier2
        } else {
            Self::Tier1
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tier1 => write!(f, "Tier1"),
            Self::Tier2 => write!(f, "Tier2"),
        }
    }
}

/// Components for target entities (the quadcopters).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetComponents {
    /// Placement and current spin orientation.
    pub transform: TransformState,
    /// Scoring tier.
    pub tier: Tier,
    /// 1-based spawn index within the round.
    pub spawn_index: u32,
    /// Bounding sphere radius.
    pub radius: f32,
    /// Rotation about +Y in radians per second.
    pub spin_rate: f32,
    /// Accumulated yaw in `[0, TAU)`.
    pub yaw: f32,
}

impl TargetComponents {
    /// Creates a target at `position`.
    #[must_use]
    pub fn new(position: Vec3, tier: Tier, spawn_index: u32, radius: f32, spin_rate: f32) -> Self {
        Self {
            transform: TransformState::at_position(position),
            tier,
            spawn_index,
            radius,
            spin_rate,
            yaw: 0.0,
        }
    }
}

// =============================================================================
// Projectiles
// =============================================================================

/// Kind of projectile a fire command asks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    /// The only projectile the game ships with.
    Bullet,
}

impl ProjectileKind {
    /// Wire name used by the fire command.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bullet => "bullet",
        }
    }
}

impl fmt::Display for ProjectileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectileKind {
    type Err = FireRejection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bullet" => Ok(Self::Bullet),
            other => Err(FireRejection::UnknownKind(other.to_string())),
        }
    }
}

/// Where a projectile is in its fly / fade / expire lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifetimePhase {
    /// Flying at full opacity.
    Flying,
    /// Fading out; still collides.
    Fading,
    /// Lifetime over; the entity must be removed.
    Expired,
}

/// Age tracking for a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LifetimeState {
    /// Seconds since launch.
    pub age: f32,
    /// Seconds at full opacity.
    pub wait_secs: f32,
    /// Seconds of fade-out after `wait_secs`.
    pub fade_secs: f32,
}

impl LifetimeState {
    /// Creates a fresh lifetime.
    #[must_use]
    pub const fn new(wait_secs: f32, fade_secs: f32) -> Self {
        Self {
            age: 0.0,
            wait_secs,
            fade_secs,
        }
    }

    /// Advances the age by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        self.age += dt;
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> LifetimePhase {
        if self.age >= self.wait_secs + self.fade_secs {
            LifetimePhase::Expired
        } else if self.age >= self.wait_secs {
            LifetimePhase::Fading
        } else {
            LifetimePhase::Flying
        }
    }

    /// Render opacity: 1 while flying, linear to 0 across the fade.
    #[must_use]
    pub fn opacity(&self) -> f32 {
        match self.phase() {
            LifetimePhase::Flying => 1.0,
            LifetimePhase::Fading => 1.0 - (self.age - self.wait_secs) / self.fade_secs,
            LifetimePhase::Expired => 0.0,
        }
    }

    /// Returns true once the full lifetime has elapsed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.phase() == LifetimePhase::Expired
    }
}

/// Components for projectile entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectileComponents {
    /// Projectile kind.
    pub kind: ProjectileKind,
    /// Position and orientation.
    pub transform: TransformState,
    /// Linear and angular velocity.
    pub physics: PhysicsState,
    /// Fade / expiry tracking.
    pub lifetime: LifetimeState,
    /// Bounding sphere radius.
    pub radius: f32,
}

impl ProjectileComponents {
    /// Creates a resting projectile at `position`.
    #[must_use]
    pub fn new(kind: ProjectileKind, position: Vec3, radius: f32, lifetime: LifetimeState) -> Self {
        Self {
            kind,
            transform: TransformState::at_position(position),
            physics: PhysicsState::default(),
            lifetime,
            radius,
        }
    }
}
