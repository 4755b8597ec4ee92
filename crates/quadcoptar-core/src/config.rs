//! Game configuration.
//!
//! [`GameConfig`] gathers every gameplay constant (round length, population,
//! arena bounds, projectile tuning) so a host can override them from a JSON
//! file. Every field has a default matching the shipped game, and partial JSON
//! documents are accepted: missing fields fall back to their defaults.
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::config::GameConfig;
//!
//! let config = GameConfig::from_json_str(r#"{ "round_seconds": 45 }"#).unwrap();
//! assert_eq!(config.round_seconds, 45);
//! assert_eq!(config.targets.population, 100);
//! ```

use std::f32::consts::TAU;
use std::path::Path;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default round length in seconds.
pub const DEFAULT_ROUND_SECONDS: u32 = 30;
/// Default number of targets spawned per round.
pub const DEFAULT_POPULATION: u32 = 100;
/// Every n-th spawn index is a high-value target.
pub const DEFAULT_TIER2_INTERVAL: u32 = 10;
/// Projectile speed in world units per second.
pub const DEFAULT_PROJECTILE_SPEED: f32 = 4.0;
/// Seconds a projectile flies at full opacity.
pub const DEFAULT_PROJECTILE_WAIT: f32 = 6.0;
/// Seconds of fade-out before a projectile is destroyed.
pub const DEFAULT_PROJECTILE_FADE: f32 = 0.3;

// =============================================================================
// Arena Bounds
// =============================================================================

/// Axis-aligned region targets are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArenaBounds {
    /// Minimum corner
    pub min: Vec3,
    /// Maximum corner
    pub max: Vec3,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-10.0, -4.0, -10.0),
            max: Vec3::new(10.0, 5.0, 10.0),
        }
    }
}

impl ArenaBounds {
    /// Creates bounds from min/max corners.
    #[must_use]
    pub const fn from_min_max(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Returns true if `point` lies inside the bounds (inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Draws a point uniformly from the bounds, each axis independently.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec3 {
        Vec3::new(
            sample_axis(rng, self.min.x, self.max.x),
            sample_axis(rng, self.min.y, self.max.y),
            sample_axis(rng, self.min.z, self.max.z),
        )
    }
}

fn sample_axis<R: Rng + ?Sized>(rng: &mut R, min: f32, max: f32) -> f32 {
    // gen_range panics on an empty range; a degenerate axis is a fixed plane.
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

// =============================================================================
// Tuning
// =============================================================================

/// Target population and animation tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetTuning {
    /// Number of targets spawned at round start.
    pub population: u32,
    /// Spawn indices divisible by this (and above it) are Tier2.
    pub tier2_interval: u32,
    /// Bounding sphere radius.
    pub radius: f32,
    /// Rotation about the vertical axis, radians per second.
    pub spin_rate: f32,
}

impl Default for TargetTuning {
    fn default() -> Self {
        Self {
            population: DEFAULT_POPULATION,
            tier2_interval: DEFAULT_TIER2_INTERVAL,
            radius: 0.3,
            spin_rate: TAU,
        }
    }
}

/// Projectile flight tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    /// Launch speed along the aim direction.
    pub speed: f32,
    /// Bounding sphere radius.
    pub radius: f32,
    /// Seconds at full opacity before fading starts.
    pub wait_secs: f32,
    /// Fade-out duration; the projectile is destroyed when it ends.
    pub fade_secs: f32,
    /// Offset from the centre of mass where the launch impulse is applied.
    pub lever_arm: Vec3,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            speed: DEFAULT_PROJECTILE_SPEED,
            radius: 0.05,
            wait_secs: DEFAULT_PROJECTILE_WAIT,
            fade_secs: DEFAULT_PROJECTILE_FADE,
            lever_arm: Vec3::new(0.1, 0.0, 0.0),
        }
    }
}

impl ProjectileTuning {
    /// Total lifetime of a projectile that never hits anything.
    #[must_use]
    pub fn lifetime_secs(&self) -> f32 {
        self.wait_secs + self.fade_secs
    }
}

// =============================================================================
// Game Config
// =============================================================================

/// Complete configuration for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Countdown length in seconds.
    pub round_seconds: u32,
    /// Placement seed; `None` draws a fresh seed per session.
    pub seed: Option<u64>,
    /// Placement region.
    pub arena: ArenaBounds,
    /// Target tuning.
    pub targets: TargetTuning,
    /// Projectile tuning.
    pub projectile: ProjectileTuning,
    /// Minimum seconds between shots; `None` disables rate limiting.
    pub fire_cooldown_secs: Option<f32>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_seconds: DEFAULT_ROUND_SECONDS,
            seed: None,
            arena: ArenaBounds::default(),
            targets: TargetTuning::default(),
            projectile: ProjectileTuning::default(),
            fire_cooldown_secs: None,
        }
    }
}

impl GameConfig {
    /// Returns the default configuration with a fixed placement seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Parses and validates a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] when a value fails [`validate`](Self::validate).
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Checks every value against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_seconds == 0 {
            return Err(invalid("round_seconds", "must be at least 1"));
        }
        if self.targets.population == 0 {
            return Err(invalid("targets.population", "must be at least 1"));
        }
        if self.targets.tier2_interval == 0 {
            return Err(invalid("targets.tier2_interval", "must be at least 1"));
        }
        if !self.arena.min.is_finite() || !self.arena.max.is_finite() {
            return Err(invalid("arena", "bounds must be finite"));
        }
        if self.arena.min.cmpgt(self.arena.max).any() {
            return Err(invalid("arena", "min corner exceeds max corner"));
        }
        positive("targets.radius", self.targets.radius)?;
        if !self.targets.spin_rate.is_finite() {
            return Err(invalid("targets.spin_rate", "must be finite"));
        }
        positive("projectile.speed", self.projectile.speed)?;
        positive("projectile.radius", self.projectile.radius)?;
        positive("projectile.wait_secs", self.projectile.wait_secs)?;
        positive("projectile.fade_secs", self.projectile.fade_secs)?;
        if !self.projectile.lever_arm.is_finite() {
            return Err(invalid("projectile.lever_arm", "must be finite"));
        }
        if let Some(cooldown) = self.fire_cooldown_secs {
            positive("fire_cooldown_secs", cooldown)?;
        }
        Ok(())
    }

    /// Returns the configured seed, or draws a fresh one.
    #[must_use]
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}
