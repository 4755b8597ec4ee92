//! Events the core publishes to the presentation layer.
//!
//! Every session operation collects the [`GameEvent`]s it produces and hands
//! the whole batch to a [`PresentationSink`] once the operation has finished,
//! so observers never see half of a tick.
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::output::{GameEvent, PresentationSink, RecordingSink};
//!
//! let sink = RecordingSink::new();
//! sink.publish(&[GameEvent::ScoreChanged { score: 5 }]);
//!
//! assert_eq!(sink.take_events(), vec![GameEvent::ScoreChanged { score: 5 }]);
//! assert!(sink.take_events().is_empty());
//! ```

use std::fmt;
use std::sync::{Mutex, PoisonError};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::entity::{EntityId, EntityTag, ProjectileKind, Tier};

// =============================================================================
// Contacts
// =============================================================================

/// A projectile touching a target during one physics frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// The projectile that hit.
    pub projectile: EntityId,
    /// The target it hit.
    pub target: EntityId,
}

// =============================================================================
// Events
// =============================================================================

/// Why an entity left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DespawnReason {
    /// Destroyed by a projectile/target contact.
    Contact,
    /// Projectile lifetime ran out.
    Expired,
    /// Swept away when the round ended.
    RoundEnded,
}

impl fmt::Display for DespawnReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contact => write!(f, "contact"),
            Self::Expired => write!(f, "expired"),
            Self::RoundEnded => write!(f, "round_ended"),
        }
    }
}

/// Audio cue requested by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCue {
    /// A projectile was fired.
    Shot,
    /// A target was destroyed.
    Explosion,
    /// Looping music for the running round.
    BackgroundMusic,
}

/// One observable change in the game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// An entity entered the registry.
    EntitySpawned {
        /// New entity
        id: EntityId,
        /// Category
        kind: EntityTag,
        /// Scoring tier (targets only)
        tier: Option<Tier>,
        /// Projectile kind (projectiles only)
        projectile: Option<ProjectileKind>,
        /// Initial position
        position: Vec3,
        /// Catalog model node to instantiate
        model: String,
    },
    /// An entity left the registry.
    EntityDespawned {
        /// Removed entity
        id: EntityId,
        /// Why it was removed
        reason: DespawnReason,
    },
    /// A projectile destroyed a target.
    ContactOccurred {
        /// Projectile involved
        projectile: EntityId,
        /// Target destroyed
        target: EntityId,
        /// Target's last position; the explosion effect plays here
        position: Vec3,
        /// Points awarded
        points: u32,
        /// Catalog particle system for the explosion
        effect: String,
    },
    /// The score changed.
    ScoreChanged {
        /// New total
        score: u32,
    },
    /// The countdown display changed.
    TimerChanged {
        /// Seconds left in the round
        remaining_seconds: u32,
    },
    /// The round is over.
    RoundEnded {
        /// Score handed to the score store
        final_score: u32,
    },
    /// Play a sound.
    Sound {
        /// Which cue
        cue: SoundCue,
        /// Catalog asset to play
        asset: String,
        /// Where to play it; `None` for non-positional audio
        position: Option<Vec3>,
    },
}

impl GameEvent {
    /// Short label for logging.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::EntitySpawned { .. } => "entity_spawned",
            Self::EntityDespawned { .. } => "entity_despawned",
            Self::ContactOccurred { .. } => "contact_occurred",
            Self::ScoreChanged { .. } => "score_changed",
            Self::TimerChanged { .. } => "timer_changed",
            Self::RoundEnded { .. } => "round_ended",
            Self::Sound { .. } => "sound",
        }
    }
}

// =============================================================================
// Sinks
// =============================================================================

/// Receiver for event batches.
///
/// Called with the session lock held; implementations should hand the batch
/// off quickly (queue it, copy it) rather than render inline.
pub trait PresentationSink: Send + Sync {
    /// Delivers one operation's events, in the order they happened.
    fn publish(&self, events: &[GameEvent]);
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PresentationSink for NullSink {
    fn publish(&self, _events: &[GameEvent]) {}
}

/// Sink that logs every event through `tracing`.
///
/// Round lifecycle events log at `info`, everything else at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn publish(&self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::RoundEnded { final_score } => {
                    info!(final_score, "round ended");
                }
                GameEvent::ContactOccurred {
                    projectile,
                    target,
                    points,
                    ..
                } => {
                    info!(projectile_id = %projectile, target_id = %target, points, "target destroyed");
                }
                other => debug!(event = other.name(), ?other, "game event"),
            }
        }
    }
}

/// Sink that stores events until drained.
///
/// Used by tests and by hosts that poll for events on their own schedule.
#[derive(Debug, Default)]
pub struct RecordingSink {
    log: Mutex<Vec<GameEvent>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self {
            log: Mutex::new(Vec::new()),
        }
    }

    /// Drains and returns all recorded events.
    pub fn take_events(&self) -> Vec<GameEvent> {
        let mut log = self.log.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *log)
    }

    /// Number of events waiting to be drained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if nothing is waiting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PresentationSink for RecordingSink {
    fn publish(&self, events: &[GameEvent]) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(events);
    }
}

impl<S: PresentationSink + ?Sized> PresentationSink for std::sync::Arc<S> {
    fn publish(&self, events: &[GameEvent]) {
        (**self).publish(events);
    }
}
