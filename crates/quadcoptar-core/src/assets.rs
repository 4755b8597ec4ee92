//! Asset catalog.
//!
//! Names the model, sound and particle assets the presentation layer loads.
//! Spawn and contact events carry these names. Models and the explosion
//! particle are mandatory, so [`AssetCatalog::validate`] fails at construction
//! time without them. Sounds are optional: a cue whose sound is missing is
//! dropped with a warning.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entity::{ProjectileKind, Tier};
use crate::error::CatalogError;
use crate::output::SoundCue;

/// Model node for Tier1 targets.
pub const TIER1_MODEL: &str = "quadcopter1";
/// Model node for Tier2 targets.
pub const TIER2_MODEL: &str = "quadcopter2";
/// Model node for bullets.
pub const BULLET_MODEL: &str = "bullet";
/// Particle system played on contact.
pub const EXPLOSION_PARTICLE: &str = "fire";

/// Asset names available to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCatalog {
    models: BTreeSet<String>,
    sounds: BTreeMap<SoundCue, String>,
    particles: BTreeSet<String>,
}

impl Default for AssetCatalog {
    /// The shipped asset set.
    fn default() -> Self {
        Self {
            models: [TIER1_MODEL, TIER2_MODEL, BULLET_MODEL]
                .into_iter()
                .map(String::from)
                .collect(),
            sounds: BTreeMap::from([
                (SoundCue::Shot, "mossbergShotgun.wav".to_string()),
                (SoundCue::Explosion, "explosion.mp3".to_string()),
                (SoundCue::BackgroundMusic, "expartigh.aiff".to_string()),
            ]),
            particles: BTreeSet::from([EXPLOSION_PARTICLE.to_string()]),
        }
    }
}

impl AssetCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            models: BTreeSet::new(),
            sounds: BTreeMap::new(),
            particles: BTreeSet::new(),
        }
    }

    /// Adds a model node.
    #[must_use]
    pub fn with_model(mut self, name: impl Into<String>) -> Self {
        self.models.insert(name.into());
        self
    }

    /// Maps a cue to a sound file.
    #[must_use]
    pub fn with_sound(mut self, cue: SoundCue, file: impl Into<String>) -> Self {
        self.sounds.insert(cue, file.into());
        self
    }

    /// Adds a particle system.
    #[must_use]
    pub fn with_particle(mut self, name: impl Into<String>) -> Self {
        self.particles.insert(name.into());
        self
    }

    /// Removes a cue's sound.
    #[must_use]
    pub fn without_sound(mut self, cue: SoundCue) -> Self {
        self.sounds.remove(&cue);
        self
    }

    /// Checks that every model and particle a round needs is present.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::MissingModel`] naming the first missing node,
    /// or [`CatalogError::MissingParticle`] if the explosion is absent.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for required in [TIER1_MODEL, TIER2_MODEL, BULLET_MODEL] {
            if !self.models.contains(required) {
                return Err(CatalogError::MissingModel(required.to_string()));
            }
        }
        if !self.has_particle(EXPLOSION_PARTICLE) {
            return Err(CatalogError::MissingParticle(EXPLOSION_PARTICLE.to_string()));
        }
        Ok(())
    }

    /// Model node used for a target tier.
    #[must_use]
    pub const fn target_model(tier: Tier) -> &'static str {
        match tier {
            Tier::Tier1 => TIER1_MODEL,
            Tier::Tier2 => TIER2_MODEL,
        }
    }

    /// Model node used for a projectile kind.
    #[must_use]
    pub const fn projectile_model(kind: ProjectileKind) -> &'static str {
        match kind {
            ProjectileKind::Bullet => BULLET_MODEL,
        }
    }

    /// Particle system played where a target is destroyed.
    #[must_use]
    pub const fn explosion_particle() -> &'static str {
        EXPLOSION_PARTICLE
    }

    /// Sound file for a cue; logs and returns `None` when absent.
    #[must_use]
    pub fn sound(&self, cue: SoundCue) -> Option<&str> {
        let sound = self.sounds.get(&cue).map(String::as_str);
        if sound.is_none() {
            warn!(?cue, "sound asset missing, cue dropped");
        }
        sound
    }

    /// Returns true if the particle system is available.
    #[must_use]
    pub fn has_particle(&self, name: &str) -> bool {
        self.particles.contains(name)
    }
}
