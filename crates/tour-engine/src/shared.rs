//! Published playback state for UI and render readers.
//!
//! The player writes a complete [`TourSnapshot`] under one lock per update, so
//! a reader on another thread never sees a pose paired with stale progress.

use std::sync::{Arc, PoisonError, RwLock};

use crate::pose::Pose;

/// Coarse playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No tour selected.
    #[default]
    Idle,
    /// A tour is advancing.
    Playing,
    /// The tour reached the end and is holding its final pose.
    Finished,
}

impl PlaybackPhase {
    /// Returns true while a tour owns the camera (playing or finished).
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, PlaybackPhase::Idle)
    }
}

/// A consistent view of the player at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TourSnapshot {
    /// Id of the active tour, if any.
    pub tour_id: Option<String>,
    pub phase: PlaybackPhase,
    /// Normalized progress in [0, 1].
    pub progress: f32,
    /// The camera pose applied for this update.
    pub pose: Pose,
}

/// Cloneable handle to the latest [`TourSnapshot`].
#[derive(Debug, Clone)]
pub struct SharedTourState(Arc<RwLock<TourSnapshot>>);

impl SharedTourState {
    pub(crate) fn new(pose: Pose) -> Self {
        Self(Arc::new(RwLock::new(TourSnapshot {
            tour_id: None,
            phase: PlaybackPhase::Idle,
            progress: 0.0,
            pose,
        })))
    }

    /// Copy out the latest snapshot.
    #[must_use]
    pub fn snapshot(&self) -> TourSnapshot {
        // A poisoned lock still holds the last complete snapshot.
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The latest published progress.
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .progress
    }

    pub(crate) fn publish(&self, snapshot: TourSnapshot) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}
