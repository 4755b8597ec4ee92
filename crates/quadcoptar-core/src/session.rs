//! Round state machine.
//!
//! A [`Session`] is one round of the game:
//!
//! ```text
//! Idle --start()--> Running --tick at 0--> GameOver
//! ```
//!
//! While `Running` it owns the countdown, the score and the world. Every
//! operation collects its [`GameEvent`]s and publishes them in one batch when
//! it returns, so a sink never observes half an operation.
//!
//! Once a session leaves `Running` every gameplay operation is a no-op. A new
//! round needs a new session.
//!
//! # Example
//!
//! ```
//! use quadcoptar_core::config::GameConfig;
//! use quadcoptar_core::session::{Session, SessionState};
//!
//! let mut session = Session::new(GameConfig::with_seed(7)).unwrap();
//! session.start().unwrap();
//! assert_eq!(session.state(), SessionState::Running);
//! assert_eq!(session.remaining_seconds(), 30);
//!
//! let shot = session.fire("bullet");
//! assert!(shot.is_ok());
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::arena::{Arena, ArenaSnapshot};
use crate::assets::AssetCatalog;
use crate::config::GameConfig;
use crate::entity::{EntityId, EntityTag, ProjectileKind};
use crate::error::{CatalogError, ConfigError, FireRejection, SessionError};
use crate::hash::hash_arena_into;
use crate::launcher::ProjectileLauncher;
use crate::output::{Contact, DespawnReason, GameEvent, NullSink, PresentationSink, SoundCue};
use crate::pose::{NoTracking, Pose, PoseProvider};
use crate::resolver::{ContactResolver, ResolvedContact};
use crate::simulation::{FrameOutcome, Simulation};
use crate::spawner::{PlacementSource, TargetSpawner, UniformPlacement};
use crate::store::{InMemoryScoreStore, ScoreStore, SCORE_KEY};

// =============================================================================
// State
// =============================================================================

/// Lifecycle state of a session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Created, round not started.
    Idle,
    /// Round in progress.
    Running,
    /// Round over. Terminal.
    GameOver,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Running => write!(f, "Running"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// One round of the game.
pub struct Session {
    config: GameConfig,
    seed: u64,
    state: SessionState,
    remaining_seconds: u32,
    score: u32,
    simulation: Simulation,
    spawner: TargetSpawner,
    launcher: ProjectileLauncher,
    contacts: ContactResolver,
    catalog: AssetCatalog,
    placement: Box<dyn PlacementSource>,
    pose: Arc<dyn PoseProvider>,
    sink: Arc<dyn PresentationSink>,
    store: Arc<dyn ScoreStore>,
    /// Simulated seconds since the round started.
    clock: f32,
    /// `clock` value of the last accepted shot.
    last_shot_at: Option<f32>,
    pending: Vec<GameEvent>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("seed", &self.seed)
            .field("remaining_seconds", &self.remaining_seconds)
            .field("score", &self.score)
            .field("simulation", &self.simulation)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Creates an `Idle` session.
    ///
    /// Defaults: uniform placement seeded from the config (or a fresh seed),
    /// no pose tracking, events discarded, score kept in memory, the shipped
    /// asset catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the configuration fails validation.
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let seed = config.resolve_seed();

        Ok(Self {
            spawner: TargetSpawner::new(&config.targets),
            launcher: ProjectileLauncher::new(&config.projectile),
            placement: Box::new(UniformPlacement::new(config.arena, seed)),
            remaining_seconds: config.round_seconds,
            config,
            seed,
            state: SessionState::Idle,
            score: 0,
            simulation: Simulation::new(),
            contacts: ContactResolver::new(),
            catalog: AssetCatalog::default(),
            pose: Arc::new(NoTracking),
            sink: Arc::new(NullSink),
            store: Arc::new(InMemoryScoreStore::new()),
            clock: 0.0,
            last_shot_at: None,
            pending: Vec::new(),
        })
    }

    /// Replaces the presentation sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn PresentationSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Replaces the pose provider.
    #[must_use]
    pub fn with_pose_provider(mut self, pose: Arc<dyn PoseProvider>) -> Self {
        self.pose = pose;
        self
    }

    /// Replaces the score store.
    #[must_use]
    pub fn with_score_store(mut self, store: Arc<dyn ScoreStore>) -> Self {
        self.store = store;
        self
    }

    /// Replaces the target placement source.
    #[must_use]
    pub fn with_placement(mut self, placement: impl PlacementSource + 'static) -> Self {
        self.placement = Box::new(placement);
        self
    }

    /// Replaces the asset catalog after checking it.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] if a required model is missing.
    pub fn with_catalog(mut self, catalog: AssetCatalog) -> Result<Self, CatalogError> {
        catalog.validate()?;
        self.catalog = catalog;
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Starts the round: resets score and countdown and spawns the targets.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AlreadyStarted`] unless the session is `Idle`.
    pub fn start(&mut self) -> Result<(), SessionError> {
        if self.state != SessionState::Idle {
            return Err(SessionError::AlreadyStarted(self.state));
        }

        self.state = SessionState::Running;
        self.score = 0;
        self.remaining_seconds = self.config.round_seconds;
        self.clock = 0.0;
        self.last_shot_at = None;

        let spawned = self
            .spawner
            .spawn_population(self.simulation.arena_mut(), self.placement.as_mut());
        for target in &spawned {
            self.pending.push(GameEvent::EntitySpawned {
                id: target.id,
                kind: EntityTag::Target,
                tier: Some(target.tier),
                projectile: None,
                position: target.position,
                model: AssetCatalog::target_model(target.tier).to_string(),
            });
        }

        self.pending.push(GameEvent::TimerChanged {
            remaining_seconds: self.remaining_seconds,
        });
        self.pending.push(GameEvent::ScoreChanged { score: self.score });
        self.cue(SoundCue::BackgroundMusic, None);

        info!(
            seed = self.seed,
            targets = spawned.len(),
            round_seconds = self.remaining_seconds,
            "round started"
        );
        self.flush();
        Ok(())
    }

    /// One-second countdown tick.
    ///
    /// Decrements the remaining time, or ends the round if it is already 0.
    /// Ignored unless `Running`. Returns the state after the tick.
    pub fn tick_countdown(&mut self) -> SessionState {
        if self.state != SessionState::Running {
            trace!(state = %self.state, "countdown tick ignored");
            return self.state;
        }

        if self.remaining_seconds == 0 {
            self.end_round();
        } else {
            self.remaining_seconds -= 1;
            self.pending.push(GameEvent::TimerChanged {
                remaining_seconds: self.remaining_seconds,
            });
        }

        self.flush();
        self.state
    }

    /// Fires a projectile of the named kind from the current pose.
    ///
    /// # Errors
    ///
    /// Returns a [`FireRejection`] (and creates nothing) when the session is
    /// not `Running`, the kind is unknown, or the fire cooldown is active.
    pub fn fire(&mut self, kind: &str) -> Result<EntityId, FireRejection> {
        match self.try_fire(kind) {
            Ok(id) => {
                self.flush();
                Ok(id)
            }
            Err(rejection) => {
                debug!(%rejection, kind, "fire command rejected");
                Err(rejection)
            }
        }
    }

    fn try_fire(&mut self, kind: &str) -> Result<EntityId, FireRejection> {
        if self.state != SessionState::Running {
            return Err(FireRejection::NotRunning(self.state));
        }
        let kind: ProjectileKind = kind.parse()?;

        if let (Some(cooldown), Some(last)) = (self.config.fire_cooldown_secs, self.last_shot_at) {
            let since = self.clock - last;
            if since < cooldown {
                return Err(FireRejection::CoolingDown {
                    remaining_secs: cooldown - since,
                });
            }
        }

        let pose = self.pose.current_pose().unwrap_or_else(|| {
            debug!("pose unavailable, firing from default pose");
            Pose::DEFAULT
        });
        let shot = self
            .launcher
            .launch(self.simulation.arena_mut(), kind, pose);
        self.last_shot_at = Some(self.clock);

        self.pending.push(GameEvent::EntitySpawned {
            id: shot.id,
            kind: EntityTag::Projectile,
            tier: None,
            projectile: Some(kind),
            position: shot.position,
            model: AssetCatalog::projectile_model(kind).to_string(),
        });
        self.cue(SoundCue::Shot, Some(shot.position));
        Ok(shot.id)
    }

    /// Advances the world by one physics frame of `dt` seconds.
    ///
    /// Contacts are scored and expired projectiles removed before any of the
    /// frame's events are published. Ignored unless `Running`.
    pub fn advance(&mut self, dt: f32) -> FrameOutcome {
        if self.state != SessionState::Running {
            trace!(state = %self.state, "physics frame ignored");
            return FrameOutcome::default();
        }

        if dt.is_finite() && dt > 0.0 {
            self.clock += dt;
        }
        let outcome = self.simulation.step(dt);

        self.record_contacts(&outcome.contacts);
        for id in &outcome.expired {
            self.pending.push(GameEvent::EntityDespawned {
                id: *id,
                reason: DespawnReason::Expired,
            });
        }

        self.flush();
        outcome
    }

    /// Applies a contact reported by an external physics engine.
    ///
    /// Returns the points awarded, or `None` if the contact was ignored (the
    /// session is not `Running`, or either entity is already gone).
    pub fn report_contact(&mut self, projectile: EntityId, target: EntityId) -> Option<u32> {
        if self.state != SessionState::Running {
            trace!(state = %self.state, "contact ignored");
            return None;
        }

        let contact = Contact { projectile, target };
        let resolved = self
            .contacts
            .resolve(&[contact], self.simulation.arena_mut());

        self.record_contacts(&resolved);
        self.flush();
        resolved.first().map(|c| c.points)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn record_contacts(&mut self, contacts: &[ResolvedContact]) {
        if contacts.is_empty() {
            return;
        }

        for contact in contacts {
            self.score = self.score.saturating_add(contact.points);
            self.pending.push(GameEvent::ContactOccurred {
                projectile: contact.projectile,
                target: contact.target,
                position: contact.position,
                points: contact.points,
                effect: AssetCatalog::explosion_particle().to_string(),
            });
            self.pending.push(GameEvent::EntityDespawned {
                id: contact.projectile,
                reason: DespawnReason::Contact,
            });
            self.pending.push(GameEvent::EntityDespawned {
                id: contact.target,
                reason: DespawnReason::Contact,
            });
            self.cue(SoundCue::Explosion, Some(contact.position));
        }

        self.pending.push(GameEvent::ScoreChanged { score: self.score });
    }

    fn end_round(&mut self) {
        self.state = SessionState::GameOver;

        for id in self.simulation.arena_mut().clear() {
            self.pending.push(GameEvent::EntityDespawned {
                id,
                reason: DespawnReason::RoundEnded,
            });
        }

        if let Err(err) = self.store.write_score(SCORE_KEY, self.score) {
            warn!(error = %err, score = self.score, "failed to hand off final score");
        }

        self.pending.push(GameEvent::RoundEnded {
            final_score: self.score,
        });
        info!(final_score = self.score, "round over");
    }

    /// Queues a sound cue if the catalog has an asset for it.
    fn cue(&mut self, cue: SoundCue, position: Option<Vec3>) {
        if let Some(asset) = self.catalog.sound(cue) {
            self.pending.push(GameEvent::Sound {
                cue,
                asset: asset.to_string(),
                position,
            });
        }
    }

    fn flush(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let events = std::mem::take(&mut self.pending);
        self.sink.publish(&events);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Seconds left on the countdown.
    #[must_use]
    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    /// Seed the target layout was drawn from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Read access to the live entities.
    #[must_use]
    pub fn arena(&self) -> &Arena {
        self.simulation.arena()
    }

    /// Owned snapshot of the live entities for rendering.
    #[must_use]
    pub fn snapshot(&self) -> ArenaSnapshot {
        self.simulation.snapshot()
    }

    /// Deterministic hash of the full session state.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.state.hash(&mut hasher);
        self.score.hash(&mut hasher);
        self.remaining_seconds.hash(&mut hasher);
        hash_arena_into(self.simulation.arena(), &mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Tier;
    use crate::output::RecordingSink;
    use crate::pose::LatestPose;
    use crate::store::InMemoryScoreStore;

    /// Session whose targets sit on a line at z = -2, x = index.
    fn grid_session() -> (Session, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::new());
        let session = Session::new(GameConfig::with_seed(1))
            .unwrap()
            .with_sink(sink.clone())
            .with_placement(|index: u32| Vec3::new(index as f32 * 2.0, 0.0, -2.0));
        (session, sink)
    }

    mod lifecycle_tests {
        use super::*;

        #[test]
        fn new_session_is_idle() {
            let (session, sink) = grid_session();
            assert_eq!(session.state(), SessionState::Idle);
            assert_eq!(session.score(), 0);
            assert!(session.arena().is_empty());
            assert!(sink.is_empty());
        }

        #[test]
        fn start_spawns_population_and_publishes() {
            let (mut session, sink) = grid_session();
            session.start().unwrap();

            assert_eq!(session.state(), SessionState::Running);
            assert_eq!(session.arena().count_tag(EntityTag::Target), 100);

            let events = sink.take_events();
            let spawned = events
                .iter()
                .filter(|e| matches!(e, GameEvent::EntitySpawned { .. }))
                .count();
            assert_eq!(spawned, 100);
            let tier2_models = events
                .iter()
                .filter(|e| {
                    matches!(e, GameEvent::EntitySpawned { tier: Some(Tier::Tier2), model, .. }
                        if model == "quadcopter2")
                })
                .count();
            assert_eq!(tier2_models, 10);
            assert!(events.contains(&GameEvent::TimerChanged {
                remaining_seconds: 30
            }));
            assert!(events.contains(&GameEvent::ScoreChanged { score: 0 }));
            assert!(events.iter().any(|e| matches!(
                e,
                GameEvent::Sound {
                    cue: SoundCue::BackgroundMusic,
                    ..
                }
            )));
        }

        #[test]
        fn second_start_rejected() {
            let (mut session, _) = grid_session();
            session.start().unwrap();
            assert_eq!(
                session.start(),
                Err(SessionError::AlreadyStarted(SessionState::Running))
            );
        }

        #[test]
        fn invalid_config_rejected() {
            let config = GameConfig {
                round_seconds: 0,
                ..GameConfig::default()
            };
            assert!(Session::new(config).is_err());
        }

        #[test]
        fn incomplete_catalog_rejected() {
            let (session, _) = grid_session();
            assert!(session.with_catalog(AssetCatalog::empty()).is_err());
        }
    }

    mod countdown_tests {
        use super::*;

        #[test]
        fn thirty_ticks_reach_zero_then_game_over() {
            let (mut session, _) = grid_session();
            session.start().unwrap();

            for expected in (0..30).rev() {
                assert_eq!(session.tick_countdown(), SessionState::Running);
                assert_eq!(session.remaining_seconds(), expected);
            }
            assert_eq!(session.remaining_seconds(), 0);

            assert_eq!(session.tick_countdown(), SessionState::GameOver);
            assert_eq!(session.remaining_seconds(), 0);
            assert!(session.arena().is_empty());
        }

        #[test]
        fn tick_while_idle_is_ignored() {
            let (mut session, sink) = grid_session();
            assert_eq!(session.tick_countdown(), SessionState::Idle);
            assert_eq!(session.remaining_seconds(), 30);
            assert!(sink.is_empty());
        }

        #[test]
        fn game_over_writes_score_and_publishes() {
            let store = Arc::new(InMemoryScoreStore::new());
            let (session, sink) = grid_session();
            let mut session = session.with_score_store(store.clone());
            session.start().unwrap();
            sink.take_events();

            for _ in 0..31 {
                session.tick_countdown();
            }

            assert_eq!(store.read_score(SCORE_KEY).unwrap(), Some(0));
            let events = sink.take_events();
            assert_eq!(events.last(), Some(&GameEvent::RoundEnded { final_score: 0 }));
            let swept = events
                .iter()
                .filter(|e| {
                    matches!(
                        e,
                        GameEvent::EntityDespawned {
                            reason: DespawnReason::RoundEnded,
                            ..
                        }
                    )
                })
                .count();
            assert_eq!(swept, 100);
        }

        #[test]
        fn ticks_after_game_over_change_nothing() {
            let (mut session, sink) = grid_session();
            session.start().unwrap();
            for _ in 0..31 {
                session.tick_countdown();
            }
            sink.take_events();

            assert_eq!(session.tick_countdown(), SessionState::GameOver);
            assert!(sink.is_empty());
        }
    }

    mod fire_tests {
        use super::*;

        #[test]
        fn fire_while_idle_rejected() {
            let (mut session, sink) = grid_session();
            let hash = session.state_hash();

            assert_eq!(
                session.fire("bullet"),
                Err(FireRejection::NotRunning(SessionState::Idle))
            );
            assert!(session.arena().is_empty());
            assert_eq!(session.state_hash(), hash);
            assert!(sink.is_empty());
        }

        #[test]
        fn fire_unknown_kind_rejected() {
            let (mut session, _) = grid_session();
            session.start().unwrap();
            assert_eq!(
                session.fire("rocket"),
                Err(FireRejection::UnknownKind("rocket".to_string()))
            );
            assert_eq!(session.arena().count_tag(EntityTag::Projectile), 0);
        }

        #[test]
        fn fire_uses_pose_and_emits_shot() {
            let pose = Arc::new(LatestPose::new());
            pose.set(Pose::new(Vec3::NEG_Z, Vec3::new(1.0, 0.0, 0.0)));
            let (session, sink) = grid_session();
            let mut session = session.with_pose_provider(pose);
            session.start().unwrap();
            sink.take_events();

            let id = session.fire("bullet").unwrap();

            assert_eq!(
                session.arena().get(id).map(crate::entity::Entity::position),
                Some(Vec3::new(1.0, 0.0, 0.0))
            );
            let events = sink.take_events();
            assert!(matches!(
                events[0],
                GameEvent::EntitySpawned {
                    kind: EntityTag::Projectile,
                    ref model,
                    ..
                } if model == "bullet"
            ));
            assert!(matches!(
                events[1],
                GameEvent::Sound {
                    cue: SoundCue::Shot,
                    ..
                }
            ));
        }

        #[test]
        fn fire_without_tracking_uses_default_pose() {
            let (mut session, _) = grid_session();
            session.start().unwrap();
            let id = session.fire("bullet").unwrap();
            assert_eq!(
                session.arena().get(id).map(crate::entity::Entity::position),
                Some(Pose::DEFAULT.position)
            );
        }

        #[test]
        fn cooldown_limits_rate() {
            let config = GameConfig {
                fire_cooldown_secs: Some(0.5),
                ..GameConfig::with_seed(1)
            };
            let mut session = Session::new(config).unwrap();
            session.start().unwrap();

            assert!(session.fire("bullet").is_ok());
            assert!(matches!(
                session.fire("bullet"),
                Err(FireRejection::CoolingDown { .. })
            ));

            session.advance(0.6);
            assert!(session.fire("bullet").is_ok());
        }

        #[test]
        fn missing_shot_sound_drops_cue_only() {
            let catalog = AssetCatalog::default().without_sound(SoundCue::Shot);
            let (session, sink) = grid_session();
            let mut session = session.with_catalog(catalog).unwrap();
            session.start().unwrap();
            sink.take_events();

            assert!(session.fire("bullet").is_ok());
            let events = sink.take_events();
            assert_eq!(events.len(), 1);
        }
    }

    mod contact_tests {
        use super::*;

        #[test]
        fn reported_contact_scores_tier() {
            let (mut session, sink) = grid_session();
            session.start().unwrap();
            let tier2 = session
                .arena()
                .entities_sorted()
                .find(|e| e.tier() == Some(crate::entity::Tier::Tier2))
                .map(crate::entity::Entity::id)
                .unwrap();
            let projectile = session.fire("bullet").unwrap();
            sink.take_events();

            assert_eq!(session.report_contact(projectile, tier2), Some(5));
            assert_eq!(session.score(), 5);
            assert!(!session.arena().contains(tier2));
            assert!(!session.arena().contains(projectile));

            let events = sink.take_events();
            assert!(events.contains(&GameEvent::ScoreChanged { score: 5 }));
        }

        #[test]
        fn duplicate_contact_ignored() {
            let (mut session, _) = grid_session();
            session.start().unwrap();
            let target = session.arena().entity_ids_sorted().next().unwrap();
            let projectile = session.fire("bullet").unwrap();

            assert_eq!(session.report_contact(projectile, target), Some(1));
            assert_eq!(session.report_contact(projectile, target), None);
            assert_eq!(session.score(), 1);
        }

        #[test]
        fn no_contacts_after_game_over() {
            let (mut session, _) = grid_session();
            session.start().unwrap();
            let target = session.arena().entity_ids_sorted().next().unwrap();
            let projectile = session.fire("bullet").unwrap();
            for _ in 0..31 {
                session.tick_countdown();
            }

            assert_eq!(session.report_contact(projectile, target), None);
            assert_eq!(session.score(), 0);
            assert!(session.advance(1.0).is_empty());
        }
    }
}
