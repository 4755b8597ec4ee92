//! # QuadcoptAR Core
//!
//! Game-state core for an augmented-reality shooting gallery.
//!
//! The player aims the device at spinning quadcopter targets placed around the
//! room and fires projectiles at them against a countdown. Rendering, camera
//! tracking, audio and UI belong to the host; this crate owns the game state
//! and reports what happened as events.
//!
//! ## Architecture
//!
//! - **Entities**: targets (tiered, spinning) and projectiles (impulse-driven,
//!   fading), stored in an [`Arena`](arena::Arena)
//! - **Resolvers**: physics integration, swept collision detection, contact
//!   scoring
//! - **Session**: the `Idle → Running → GameOver` round state machine, shared
//!   across threads through a [`SessionHandle`](handle::SessionHandle)
//! - **Collaborators**: [`PoseProvider`](pose::PoseProvider),
//!   [`PresentationSink`](output::PresentationSink),
//!   [`ScoreStore`](store::ScoreStore), [`AssetCatalog`](assets::AssetCatalog)
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use quadcoptar_core::prelude::*;
//!
//! let sink = Arc::new(RecordingSink::new());
//! let session = Session::new(GameConfig::with_seed(1))
//!     .unwrap()
//!     .with_sink(sink.clone());
//! let handle = SessionHandle::new(session);
//!
//! handle.start().unwrap();
//! handle.fire("bullet").unwrap();
//! handle.advance(1.0 / 60.0);
//!
//! assert!(!sink.take_events().is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod arena;
pub mod assets;
pub mod config;
pub mod entity;
pub mod error;
pub mod handle;
pub mod hash;
pub mod launcher;
pub mod output;
pub mod pose;
pub mod resolver;
pub mod session;
pub mod simulation;
pub mod spawner;
pub mod store;

#[cfg(test)]
mod tests;

/// Commonly used types.
pub mod prelude {
    pub use crate::arena::{Arena, ArenaSnapshot};
    pub use crate::assets::AssetCatalog;
    pub use crate::config::{ArenaBounds, GameConfig, ProjectileTuning, TargetTuning};
    pub use crate::entity::{Entity, EntityId, EntityTag, ProjectileKind, Tier};
    pub use crate::error::{CatalogError, ConfigError, FireRejection, SessionError, StoreError};
    pub use crate::handle::SessionHandle;
    pub use crate::output::{
        DespawnReason, GameEvent, NullSink, PresentationSink, RecordingSink, SoundCue, TracingSink,
    };
    pub use crate::pose::{LatestPose, Pose, PoseProvider};
    pub use crate::session::{Session, SessionState};
    pub use crate::store::{InMemoryScoreStore, JsonFileScoreStore, ScoreStore, SCORE_KEY};
}
