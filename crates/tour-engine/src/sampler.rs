//! Mapping normalized tour progress to a camera pose.
//!
//! Waypoints are laid out on a normalized timeline using their hold durations
//! as weights. Waypoint `i` sits at
//!
//! ```text
//! offset(i) = sum(hold[0..i]) / sum(hold[0..n-1])
//! ```
//!
//! so the first waypoint is always at 0 and the last at 1, and each hold
//! weights the segment leaving its waypoint. The final waypoint's hold does not
//! contribute. Negative or non-finite holds count as zero; if every weight is
//! zero the waypoints are spread uniformly.
//!
//! Everything here is pure and allocation-light, so it can be called from any
//! thread without synchronization.

use crate::pose::Pose;
use crate::tour::Tour;

/// Where a progress value falls between two waypoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentPosition {
    /// Index of the waypoint the segment starts at.
    pub from: usize,
    /// Index of the waypoint the segment ends at.
    pub to: usize,
    /// Un-eased interpolation factor within the segment, in [0, 1].
    pub local_t: f32,
}

/// Normalized timeline offsets for each waypoint of `tour`.
///
/// The result has one entry per waypoint, is non-decreasing, starts at 0 and
/// (for two or more waypoints) ends at exactly 1.
#[must_use]
pub fn waypoint_offsets(tour: &Tour) -> Vec<f32> {
    let n = tour.waypoints.len();
    if n == 0 {
        return Vec::new();
    }
    if n == 1 {
        return vec![0.0];
    }

    let weights: Vec<f32> = tour.waypoints[..n - 1]
        .iter()
        .map(|w| sanitize_weight(w.hold_duration))
        .collect();
    let total: f32 = weights.iter().sum();

    let mut offsets = Vec::with_capacity(n);
    if total > 0.0 && total.is_finite() {
        let mut acc = 0.0;
        offsets.push(0.0);
        for weight in &weights {
            acc += weight;
            offsets.push((acc / total).min(1.0));
        }
    } else {
        // Uniform fallback.
        #[allow(clippy::cast_precision_loss)]
        let segments = (n - 1) as f32;
        #[allow(clippy::cast_precision_loss)]
        offsets.extend((0..n).map(|i| i as f32 / segments));
    }

    // Guard against rounding leaving the last offset a hair below 1.
    if let Some(last) = offsets.last_mut() {
        *last = 1.0;
    }
    offsets
}

fn sanitize_weight(hold: f32) -> f32 {
    if hold.is_finite() && hold > 0.0 {
        hold
    } else {
        0.0
    }
}

/// Find the two waypoints bracketing `progress` and the factor between them.
///
/// Returns `None` for a tour with no waypoints. A single-waypoint tour yields
/// a zero-length segment from the waypoint to itself.
#[must_use]
pub fn segment_at(tour: &Tour, progress: f32) -> Option<SegmentPosition> {
    let n = tour.waypoints.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(SegmentPosition {
            from: 0,
            to: 0,
            local_t: 1.0,
        });
    }

    let p = clamp_progress(progress);
    if p <= 0.0 {
        return Some(SegmentPosition {
            from: 0,
            to: 1,
            local_t: 0.0,
        });
    }
    if p >= 1.0 {
        return Some(SegmentPosition {
            from: n - 2,
            to: n - 1,
            local_t: 1.0,
        });
    }

    let offsets = waypoint_offsets(tour);
    // First waypoint whose offset is >= p; index 0 is excluded since p > 0.
    let to = offsets[1..].partition_point(|&offset| offset < p) + 1;
    let to = to.min(n - 1);
    let from = to - 1;

    let span = offsets[to] - offsets[from];
    let local_t = if span <= f32::EPSILON {
        1.0
    } else {
        ((p - offsets[from]) / span).clamp(0.0, 1.0)
    };

    Some(SegmentPosition { from, to, local_t })
}

/// Sample the interpolated camera pose at `progress` along `tour`.
///
/// `progress` is clamped to [0, 1]; NaN is treated as 0. Progress 0 returns the
/// first waypoint's pose exactly and progress 1 the last. Returns `None` only
/// when the tour has no waypoints.
#[must_use]
pub fn sample(tour: &Tour, progress: f32) -> Option<Pose> {
    let segment = segment_at(tour, progress)?;
    let from = tour.waypoints[segment.from].pose();
    let to = tour.waypoints[segment.to].pose();

    // Exact endpoints, without relying on lerp rounding.
    if segment.local_t <= 0.0 {
        return Some(from);
    }
    if segment.local_t >= 1.0 {
        return Some(to);
    }
    Some(from.lerp(to, tour.easing.apply(segment.local_t)))
}

/// Sample `count` evenly spaced poses from start to end of `tour`.
///
/// Returns an empty vector for tours without waypoints or when `count` is 0.
#[must_use]
pub fn sample_path(tour: &Tour, count: usize) -> Vec<Pose> {
    match count {
        0 => Vec::new(),
        1 => tour.first_pose().into_iter().collect(),
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let last = (count - 1) as f32;
            #[allow(clippy::cast_precision_loss)]
            (0..count)
                .filter_map(|i| sample(tour, i as f32 / last))
                .collect()
        }
    }
}

fn clamp_progress(progress: f32) -> f32 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;
    use proptest::prelude::*;

    use super::*;
    use crate::tour::Easing;
    use crate::tour::tests::tour_with;

    fn reactor_core() -> Tour {
        tour_with(
            &[
                (Vec3::new(50.0, 30.0, 50.0), 60.0),
                (Vec3::new(0.0, 20.0, 40.0), 60.0),
                (Vec3::new(0.0, 40.0, 0.0), 60.0),
            ],
            120.0,
        )
    }

    #[test]
    fn test_offsets_follow_hold_weights() {
        let tour = tour_with(
            &[
                (Vec3::ZERO, 1.0),
                (Vec3::X, 3.0),
                (Vec3::Y, 0.0),
                (Vec3::Z, 99.0),
            ],
            10.0,
        );
        assert_eq!(waypoint_offsets(&tour), vec![0.0, 0.25, 1.0, 1.0]);
    }

    #[test]
    fn test_offsets_uniform_fallback() {
        let tour = tour_with(
            &[(Vec3::ZERO, 0.0), (Vec3::X, 0.0), (Vec3::Y, 0.0)],
            10.0,
        );
        assert_eq!(waypoint_offsets(&tour), vec![0.0, 0.5, 1.0]);

        let nan_holds = tour_with(&[(Vec3::ZERO, f32::NAN), (Vec3::X, -2.0), (Vec3::Y, 1.0)], 10.0);
        assert_eq!(waypoint_offsets(&nan_holds), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_reactor_core_scenario() {
        let tour = reactor_core();

        // Elapsed 60s of 120s.
        let at_half = sample(&tour, 60.0 / 120.0).unwrap();
        assert_eq!(at_half, tour.waypoints[1].pose());

        // Elapsed 30s of 120s: midpoint of the first segment.
        let at_quarter = sample(&tour, 30.0 / 120.0).unwrap();
        assert_eq!(at_quarter.position, Vec3::new(25.0, 25.0, 45.0));
    }

    #[test]
    fn test_endpoints_are_exact() {
        let tour = reactor_core();
        assert_eq!(sample(&tour, 0.0), tour.first_pose());
        assert_eq!(sample(&tour, 1.0), tour.last_pose());
        assert_eq!(sample(&tour, -3.0), tour.first_pose());
        assert_eq!(sample(&tour, 7.5), tour.last_pose());
        assert_eq!(sample(&tour, f32::NAN), tour.first_pose());
    }

    #[test]
    fn test_empty_tour_has_no_pose() {
        let tour = tour_with(&[], 10.0);
        assert!(sample(&tour, 0.5).is_none());
        assert!(segment_at(&tour, 0.5).is_none());
        assert!(sample_path(&tour, 8).is_empty());
    }

    #[test]
    fn test_zero_length_segment_snaps_to_end() {
        // Middle waypoint has zero hold, so waypoints 1 and 2 share offset 0.5.
        let tour = tour_with(
            &[
                (Vec3::ZERO, 1.0),
                (Vec3::X, 0.0),
                (Vec3::Y, 1.0),
                (Vec3::Z, 1.0),
            ],
            10.0,
        );
        let segment = segment_at(&tour, 0.5).unwrap();
        assert_eq!((segment.from, segment.to), (0, 1));
        assert_eq!(segment.local_t, 1.0);
        assert_eq!(sample(&tour, 0.5).unwrap().position, Vec3::X);

        let after = segment_at(&tour, 0.6).unwrap();
        assert_eq!((after.from, after.to), (2, 3));
    }

    #[test]
    fn test_smoothstep_easing() {
        let mut tour = reactor_core();
        tour.easing = Easing::SmoothStep;
        // Eased midpoints coincide with linear midpoints.
        assert_eq!(
            sample(&tour, 0.25).unwrap().position,
            Vec3::new(25.0, 25.0, 45.0)
        );
        // Near the start the eased camera lags the linear one.
        let linear = sample(&reactor_core(), 0.05).unwrap().position;
        let eased = sample(&tour, 0.05).unwrap().position;
        let start = tour.waypoints[0].position;
        assert!(eased.distance(start) < linear.distance(start));
    }

    #[test]
    fn test_sample_path() {
        let tour = reactor_core();
        let path = sample_path(&tour, 5);
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], tour.waypoints[0].pose());
        assert_eq!(path[2], tour.waypoints[1].pose());
        assert_eq!(path[4], tour.waypoints[2].pose());
        assert_eq!(sample_path(&tour, 1), vec![tour.waypoints[0].pose()]);
    }

    fn arb_tour() -> impl Strategy<Value = Tour> {
        let coord = -500.0f32..500.0;
        let waypoint = (
            (coord.clone(), coord.clone(), coord.clone()),
            0.0f32..100.0,
        );
        prop::collection::vec(waypoint, 1..12).prop_map(|points| {
            let points: Vec<(Vec3, f32)> = points
                .into_iter()
                .map(|((x, y, z), hold)| (Vec3::new(x, y, z), hold))
                .collect();
            tour_with(&points, 60.0)
        })
    }

    proptest! {
        #[test]
        fn prop_sample_is_finite(tour in arb_tour(), p in -1.0f32..2.0) {
            let pose = sample(&tour, p).unwrap();
            prop_assert!(pose.is_finite());
        }

        #[test]
        fn prop_endpoints_exact(tour in arb_tour()) {
            prop_assert_eq!(sample(&tour, 0.0), tour.first_pose());
            prop_assert_eq!(sample(&tour, 1.0), tour.last_pose());
        }

        #[test]
        fn prop_single_waypoint_is_constant(x in -100.0f32..100.0, p in 0.0f32..1.0) {
            let tour = tour_with(&[(Vec3::splat(x), 5.0)], 30.0);
            prop_assert_eq!(sample(&tour, p), tour.first_pose());
        }

        #[test]
        fn prop_continuity(tour in arb_tour(), p in 0.0f32..1.0) {
            // Holds are strictly positive here so segment speeds are bounded.
            let mut tour = tour;
            for waypoint in &mut tour.waypoints {
                waypoint.hold_duration = waypoint.hold_duration.max(1.0);
            }
            let eps = 1e-4;
            let a = sample(&tour, p).unwrap().position;
            let b = sample(&tour, (p + eps).min(1.0)).unwrap().position;
            // Max extent ~1732 per segment, smallest segment share >= 1/1100.
            prop_assert!(a.distance(b) < 1732.0 * 1100.0 * eps * 1.01 + 1e-2);
        }
    }
}
