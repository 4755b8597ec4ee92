//! Error types for the game core.
//!
//! Only construction-time problems (bad configuration, an incomplete asset
//! catalog, a failing score store) are real errors. Gameplay-time problems are
//! either expected races, which are ignored, or rejected commands, which are
//! reported as a [`FireRejection`] value and never abort a round.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionState;

/// Invalid or unreadable game configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Io {
        /// Path that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The configuration text is not valid JSON for [`GameConfig`](crate::config::GameConfig).
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A field holds a value outside its allowed range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted name of the offending field
        field: &'static str,
        /// Human-readable constraint that was violated
        reason: String,
    },
}

/// The asset catalog is missing something every round needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A named scene node (model) required for spawning is absent.
    #[error("asset catalog has no model node named `{0}`")]
    MissingModel(String),

    /// A particle system played during the round is absent.
    #[error("asset catalog has no particle system named `{0}`")]
    MissingParticle(String),
}

/// Why a fire command produced no projectile.
///
/// A rejection is not a failure of the round; the command is simply dropped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FireRejection {
    /// Firing only has effect while a round is running.
    #[error("cannot fire while session is {0}")]
    NotRunning(SessionState),
    /// The requested projectile kind is not defined.
    #[error("unknown projectile kind `{0}`")]
    UnknownKind(String),
    /// The optional fire cooldown has not elapsed yet.
    #[error("fire cooldown active for another {remaining_secs:.3}s")]
    CoolingDown {
        /// Seconds until the next shot is allowed
        remaining_secs: f32,
    },
}

/// Invalid session lifecycle transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `start()` was called on a session that already left `Idle`.
    #[error("session already started (state: {0})")]
    AlreadyStarted(SessionState),
}

/// The round-end score handoff failed.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("score store I/O error on {path}: {source}")]
    Io {
        /// Backing file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// The backing file is not a JSON object.
    #[error("score store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
