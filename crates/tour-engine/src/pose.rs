//! Camera poses and frame-rate independent smoothing.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Default smoothing time constant in seconds.
///
/// Exponential decay with this constant matches a 2% per-frame lerp at 60 Hz:
/// `-(1/60) / ln(0.98) ≈ 0.825`.
pub const DEFAULT_SMOOTHING_TIME_CONSTANT: f32 = 0.825;

/// A camera position and the point it looks at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Camera location.
    pub position: Vec3,
    /// Look-at point.
    pub target: Vec3,
}

impl Pose {
    /// Create a pose from a position and a look-at target.
    #[must_use]
    pub const fn new(position: Vec3, target: Vec3) -> Self {
        Self { position, target }
    }

    /// Linearly interpolates position and target independently.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }

    /// Returns true if every coordinate is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.target.is_finite()
    }

    /// Moves a fraction of the way toward `goal`.
    ///
    /// `factor` is clamped to [0, 1]. A non-finite goal or factor leaves the
    /// pose where it is.
    #[must_use]
    pub fn approach(self, goal: Self, factor: f32) -> Self {
        if !goal.is_finite() || !factor.is_finite() {
            return self;
        }
        if factor >= 1.0 {
            return goal;
        }
        self.lerp(goal, factor.max(0.0))
    }
}

/// Fraction to move toward a target over `delta_secs` with exponential decay.
///
/// Computes `1 - exp(-delta / time_constant)`, so the approach rate is the
/// same regardless of how often it is applied. A non-positive time constant
/// snaps (returns 1) even for a zero delta; otherwise a non-positive delta
/// returns 0.
#[must_use]
pub fn smoothing_factor(delta_secs: f32, time_constant_secs: f32) -> f32 {
    if !time_constant_secs.is_finite() || time_constant_secs <= 0.0 {
        return 1.0;
    }
    if !delta_secs.is_finite() || delta_secs <= 0.0 {
        return 0.0;
    }
    1.0 - (-delta_secs / time_constant_secs).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let a = Pose::new(Vec3::new(50.0, 30.0, 50.0), Vec3::ZERO);
        let b = Pose::new(Vec3::new(0.0, 20.0, 40.0), Vec3::new(0.0, 10.0, 0.0));

        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);

        let mid = a.lerp(b, 0.5);
        assert_eq!(mid.position, Vec3::new(25.0, 25.0, 45.0));
        assert_eq!(mid.target, Vec3::new(0.0, 5.0, 0.0));
    }

    #[test]
    fn test_approach_ignores_non_finite_goal() {
        let a = Pose::new(Vec3::ONE, Vec3::ZERO);
        let bad = Pose::new(Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO);
        assert_eq!(a.approach(bad, 0.5), a);
        assert_eq!(a.approach(a, f32::NAN), a);
    }

    #[test]
    fn test_approach_clamps_factor() {
        let a = Pose::new(Vec3::ZERO, Vec3::ZERO);
        let b = Pose::new(Vec3::X, Vec3::Y);
        assert_eq!(a.approach(b, 2.0), b);
        assert_eq!(a.approach(b, -1.0), a);
    }

    #[test]
    fn test_smoothing_factor_edge_cases() {
        assert_eq!(smoothing_factor(0.0, 1.0), 0.0);
        assert_eq!(smoothing_factor(-0.5, 1.0), 0.0);
        assert_eq!(smoothing_factor(f32::NAN, 1.0), 0.0);
        assert_eq!(smoothing_factor(0.1, 0.0), 1.0);
        assert!(smoothing_factor(1000.0, 0.5) > 0.999);
    }

    #[test]
    fn test_smoothing_is_frame_rate_independent() {
        let tau = DEFAULT_SMOOTHING_TIME_CONSTANT;

        // One second at 30 Hz versus one second at 144 Hz.
        let remaining = |hz: u32| {
            let dt = 1.0 / hz as f32;
            (0..hz).fold(1.0_f32, |r, _| r * (1.0 - smoothing_factor(dt, tau)))
        };
        assert!((remaining(30) - remaining(144)).abs() < 1e-4);
    }

    #[test]
    fn test_default_constant_matches_two_percent_at_60hz() {
        let factor = smoothing_factor(1.0 / 60.0, DEFAULT_SMOOTHING_TIME_CONSTANT);
        assert!((factor - 0.02).abs() < 1e-4);
    }
}
