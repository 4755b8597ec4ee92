//! Test helpers for building sessions with known target layouts.

use std::sync::Arc;

use glam::Vec3;

use crate::config::GameConfig;
use crate::entity::{EntityId, Tier};
use crate::output::{DespawnReason, GameEvent, RecordingSink};
use crate::pose::{LatestPose, Pose};
use crate::session::Session;

/// Physics frame length used by scenario tests.
pub const FRAME: f32 = 1.0 / 60.0;

/// Spacing between targets on the test line.
pub const SPACING: f32 = 2.0;

/// Depth of the target line.
pub const LINE_Z: f32 = -2.0;

/// X coordinate of the target with 1-based spawn `index`.
///
/// Targets sit on a line far enough apart that a shot aimed at one can
/// never touch a neighbour.
#[allow(clippy::cast_precision_loss)]
pub fn line_x(index: u32) -> f32 {
    index as f32 * SPACING - 100.0
}

/// A session wired to a recording sink and a settable pose, with targets
/// on a line at `z = LINE_Z`.
pub struct Rig {
    /// The session under test.
    pub session: Session,
    /// Every published event.
    pub sink: Arc<RecordingSink>,
    /// Aim control.
    pub pose: Arc<LatestPose>,
}

impl Rig {
    /// Builds an `Idle` rig.
    pub fn new() -> Self {
        let sink = Arc::new(RecordingSink::new());
        let pose = Arc::new(LatestPose::new());
        let session = Session::new(GameConfig::with_seed(1))
            .unwrap()
            .with_sink(sink.clone())
            .with_pose_provider(pose.clone())
            .with_placement(|index: u32| Vec3::new(line_x(index), 0.0, LINE_Z));
        Self {
            session,
            sink,
            pose,
        }
    }

    /// Builds a rig and starts the round, discarding the start events.
    pub fn running() -> Self {
        let mut rig = Self::new();
        rig.session.start().unwrap();
        rig.sink.take_events();
        rig
    }

    /// Aims straight down -Z from in front of the target with `index`.
    pub fn aim_at_index(&self, index: u32) {
        self.pose
            .set(Pose::new(Vec3::NEG_Z, Vec3::new(line_x(index), 0.0, 0.0)));
    }

    /// Aims at empty space above the line.
    pub fn aim_at_nothing(&self) {
        self.pose.set(Pose::new(Vec3::Y, Vec3::ZERO));
    }

    /// Registry ID of the target with `index`.
    pub fn target_id(&self, index: u32) -> EntityId {
        self.session
            .arena()
            .entities_sorted()
            .find(|e| e.as_target().is_some_and(|t| t.spawn_index == index))
            .map(crate::entity::Entity::id)
            .unwrap()
    }

    /// Runs `seconds` worth of physics frames.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn run_for(&mut self, seconds: f32) {
        let frames = (seconds / FRAME).ceil() as u32;
        for _ in 0..frames {
            self.session.advance(FRAME);
        }
    }
}

/// First spawn index with the given tier under the default interval.
pub fn first_index_of(tier: Tier) -> u32 {
    (1..=100)
        .find(|i| Tier::for_index(*i, 10) == tier)
        .unwrap()
}

/// Number of `ContactOccurred` events.
pub fn count_contacts(events: &[GameEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, GameEvent::ContactOccurred { .. }))
        .count()
}

/// IDs despawned for `reason`, in publication order.
pub fn despawned(events: &[GameEvent], reason: DespawnReason) -> Vec<EntityId> {
    events
        .iter()
        .filter_map(|e| match e {
            GameEvent::EntityDespawned { id, reason: r } if *r == reason => Some(*id),
            _ => None,
        })
        .collect()
}
