//! Device pose input.
//!
//! The AR host reports where the device is and which way it faces. The core
//! only needs an aim direction and a launch position, captured as a [`Pose`].
//! When tracking is unavailable the launcher falls back to [`Pose::DEFAULT`].

use std::sync::{Mutex, PoisonError};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Aim direction and launch position in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Unit aim direction.
    pub direction: Vec3,
    /// Launch position.
    pub position: Vec3,
}

impl Pose {
    /// Pose used when no tracking data is available: facing -Z, slightly in
    /// front of the origin.
    pub const DEFAULT: Self = Self {
        direction: Vec3::new(0.0, 0.0, -1.0),
        position: Vec3::new(0.0, 0.0, -0.2),
    };

    /// Creates a pose; a zero or non-finite direction falls back to the
    /// default direction.
    #[must_use]
    pub fn new(direction: Vec3, position: Vec3) -> Self {
        Self {
            direction: direction.try_normalize().unwrap_or(Self::DEFAULT.direction),
            position,
        }
    }

    /// Derives a pose from a camera-to-world transform.
    ///
    /// The camera looks down its local -Z axis, so the aim direction is the
    /// negated third basis column and the position is the translation.
    ///
    /// # Example
    ///
    /// ```
    /// use glam::{Mat4, Vec3};
    /// use quadcoptar_core::pose::Pose;
    ///
    /// let pose = Pose::from_camera_transform(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)));
    /// assert_eq!(pose.direction, Vec3::new(0.0, 0.0, -1.0));
    /// assert_eq!(pose.position, Vec3::new(1.0, 2.0, 3.0));
    /// ```
    #[must_use]
    pub fn from_camera_transform(transform: Mat4) -> Self {
        Self::new(-transform.z_axis.truncate(), transform.w_axis.truncate())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Source of the current device pose.
pub trait PoseProvider: Send + Sync {
    /// Latest pose, or `None` while tracking is unavailable.
    fn current_pose(&self) -> Option<Pose>;
}

/// Provider that never has tracking.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTracking;

impl PoseProvider for NoTracking {
    fn current_pose(&self) -> Option<Pose> {
        None
    }
}

/// Thread-safe slot the host overwrites every frame.
#[derive(Debug, Default)]
pub struct LatestPose {
    slot: Mutex<Option<Pose>>,
}

impl LatestPose {
    /// Creates an empty slot (no tracking yet).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a new pose.
    pub fn set(&self, pose: Pose) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(pose);
    }

    /// Stores the pose derived from a camera transform.
    pub fn set_camera_transform(&self, transform: Mat4) {
        self.set(Pose::from_camera_transform(transform));
    }

    /// Marks tracking as lost.
    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl PoseProvider for LatestPose {
    fn current_pose(&self) -> Option<Pose> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: PoseProvider + ?Sized> PoseProvider for std::sync::Arc<P> {
    fn current_pose(&self) -> Option<Pose> {
        (**self).current_pose()
    }
}

/// Current pose from `provider`, or the default pose.
#[must_use]
pub fn pose_or_default(provider: &dyn PoseProvider) -> Pose {
    provider.current_pose().unwrap_or_default()
}
