//! Shared access to a session from several event sources.
//!
//! The countdown timer, the physics frame callback and fire commands may run
//! on different threads. They all go through a [`SessionHandle`], which runs
//! each operation to completion under one lock.
//!
//! A panic in one caller poisons the lock but cannot leave the session half
//! updated from an observer's point of view (events are published only after
//! an operation finishes), so the handle recovers a poisoned lock instead of
//! propagating the panic.
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::config::GameConfig;
//! use quadcoptar_core::handle::SessionHandle;
//! use quadcoptar_core::session::Session;
//!
//! let handle = SessionHandle::new(Session::new(GameConfig::with_seed(3)).unwrap());
//! handle.start().unwrap();
//!
//! let timer = handle.clone();
//! std::thread::spawn(move || timer.tick_countdown()).join().unwrap();
//! assert_eq!(handle.remaining_seconds(), 29);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::arena::ArenaSnapshot;
use crate::entity::EntityId;
use crate::error::{FireRejection, SessionError};
use crate::session::{Session, SessionState};
use crate::simulation::FrameOutcome;

/// Clonable, thread-safe handle to one [`Session`].
#[derive(Debug, Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<Session>>,
}

impl SessionHandle {
    /// Wraps a session.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Locks the session for a compound operation.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`Session::start`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyStarted`] unless the session is `Idle`.
    pub fn start(&self) -> Result<(), SessionError> {
        self.lock().start()
    }

    /// See [`Session::tick_countdown`].
    pub fn tick_countdown(&self) -> SessionState {
        self.lock().tick_countdown()
    }

    /// See [`Session::fire`].
    ///
    /// # Errors
    ///
    /// Returns the [`FireRejection`] explaining why nothing was fired.
    pub fn fire(&self, kind: &str) -> Result<EntityId, FireRejection> {
        self.lock().fire(kind)
    }

    /// See [`Session::advance`].
    pub fn advance(&self, dt: f32) -> FrameOutcome {
        self.lock().advance(dt)
    }

    /// See [`Session::report_contact`].
    pub fn report_contact(&self, projectile: EntityId, target: EntityId) -> Option<u32> {
        self.lock().report_contact(projectile, target)
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().state()
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.lock().score()
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.lock().remaining_seconds()
    }

    /// Owned snapshot of the live entities.
    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        self.lock().snapshot()
    }

    /// Deterministic hash of the session state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        self.lock().state_hash()
    }
}
