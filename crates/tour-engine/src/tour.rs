//! Tour and waypoint definitions.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pose::Pose;

/// A single stop along a tour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Camera location.
    pub position: Vec3,
    /// Look-at point.
    pub target: Vec3,
    /// Relative weight of the segment leaving this waypoint, in seconds.
    ///
    /// Longer holds make the camera move more slowly away from this stop.
    /// The tour's `total_duration` stays authoritative; holds only distribute it.
    pub hold_duration: f32,
    /// Display name of this stop.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Waypoint {
    /// Create an unlabelled waypoint.
    #[must_use]
    pub fn new(position: Vec3, target: Vec3, hold_duration: f32) -> Self {
        Self {
            position,
            target,
            hold_duration,
            label: None,
        }
    }

    /// Attach a display label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The camera pose at this waypoint.
    #[must_use]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.target)
    }
}

/// Easing applied within each segment between two waypoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    /// Constant speed within a segment.
    #[default]
    Linear,
    /// `3t² - 2t³`: eases in and out of every waypoint.
    SmoothStep,
}

impl Easing {
    /// Apply the easing curve to a local segment factor in [0, 1].
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::SmoothStep => t * t * (3.0 - 2.0 * t),
        }
    }
}

/// Audience level shown on the tour card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Difficulty {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
    AllLevels,
}

impl Difficulty {
    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::AllLevels => "All levels",
        }
    }
}

/// A named, ordered sequence of waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    /// Stable identifier used for lookup.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Seconds for one full playthrough.
    pub total_duration: f32,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub easing: Easing,
    pub waypoints: Vec<Waypoint>,
}

impl Tour {
    /// The pose at the given waypoint index.
    #[must_use]
    pub fn pose_at(&self, index: usize) -> Option<Pose> {
        self.waypoints.get(index).map(Waypoint::pose)
    }

    /// The pose the tour starts from.
    #[must_use]
    pub fn first_pose(&self) -> Option<Pose> {
        self.waypoints.first().map(Waypoint::pose)
    }

    /// The pose the tour ends on.
    #[must_use]
    pub fn last_pose(&self) -> Option<Pose> {
        self.waypoints.last().map(Waypoint::pose)
    }

    /// Duration formatted for display, e.g. `"12 min"` or `"45 s"`.
    #[must_use]
    pub fn display_duration(&self) -> String {
        let secs = self.total_duration.max(0.0).round();
        if secs < 60.0 {
            format!("{secs:.0} s")
        } else {
            format!("{:.0} min", (secs / 60.0).round())
        }
    }

    /// Check the structural invariants of the tour.
    ///
    /// Single-waypoint tours are accepted; the sampler holds them still.
    pub fn validate(&self) -> Result<()> {
        let invalid = |detail: String| Error::InvalidTour {
            id: self.id.clone(),
            detail,
        };

        if self.id.trim().is_empty() {
            return Err(invalid("id is empty".into()));
        }
        if self.waypoints.is_empty() {
            return Err(invalid("tour has no waypoints".into()));
        }
        if !self.total_duration.is_finite() || self.total_duration <= 0.0 {
            return Err(invalid(format!(
                "total duration must be positive, got {}",
                self.total_duration
            )));
        }
        for (index, waypoint) in self.waypoints.iter().enumerate() {
            if !waypoint.position.is_finite() || !waypoint.target.is_finite() {
                return Err(invalid(format!("waypoint {index} has non-finite coordinates")));
            }
            if !waypoint.hold_duration.is_finite() || waypoint.hold_duration < 0.0 {
                return Err(invalid(format!(
                    "waypoint {index} has invalid hold duration {}",
                    waypoint.hold_duration
                )));
            }
        }
        Ok(())
    }
}
