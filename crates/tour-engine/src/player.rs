//! Per-session tour playback.
//!
//! ## State machine
//!
//! ```text
//! Idle -> Playing -> Finished -> Idle
//!            |                    ^
//!            +---- stop() --------+
//! ```
//!
//! `start` from any state restarts from progress 0 on the requested tour.
//! `Finished` keeps ticking so the camera settles on the final pose; it never
//! exits on its own.

use std::sync::Arc;

use crate::catalog::TourCatalog;
use crate::error::Result;
use crate::pose::{DEFAULT_SMOOTHING_TIME_CONSTANT, Pose, smoothing_factor};
use crate::sampler;
use crate::shared::{PlaybackPhase, SharedTourState, TourSnapshot};
use crate::tour::Tour;

/// Tunables for playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    /// Time constant (seconds) of the exponential approach toward the sampled
    /// pose. Zero or negative snaps directly to it.
    pub smoothing_time_constant: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            smoothing_time_constant: DEFAULT_SMOOTHING_TIME_CONSTANT,
        }
    }
}

/// The tour currently owning the camera.
struct ActivePlayback {
    tour: Arc<Tour>,
    /// Host clock (seconds) when playback started.
    started_at: f64,
    /// Host clock of the latest tick, for smoothing deltas.
    last_tick: f64,
    finished: bool,
}

/// Drives one tour at a time, one frame per [`tick`](Self::tick).
pub struct TourPlayer {
    catalog: Arc<TourCatalog>,
    settings: PlayerSettings,
    active: Option<ActivePlayback>,
    progress: f32,
    current_pose: Pose,
    shared: SharedTourState,
}

impl TourPlayer {
    /// Create an idle player with the camera at `initial_pose`.
    #[must_use]
    pub fn new(catalog: Arc<TourCatalog>, initial_pose: Pose, settings: PlayerSettings) -> Self {
        Self {
            catalog,
            settings,
            active: None,
            progress: 0.0,
            current_pose: initial_pose,
            shared: SharedTourState::new(initial_pose),
        }
    }

    /// Begin playing `tour_id` from the start, replacing any active tour.
    ///
    /// An unknown id is logged and returned as an error; the player keeps its
    /// previous state and the camera does not move.
    pub fn start(&mut self, tour_id: &str, now: f64) -> Result<()> {
        let tour = match self.catalog.lookup(tour_id) {
            Ok(tour) => Arc::clone(tour),
            Err(e) => {
                tracing::warn!("Cannot start tour: {e}");
                return Err(e);
            }
        };

        if let Some(previous) = &self.active {
            tracing::debug!(
                "Interrupting tour {} at {:.0}% to start {}",
                previous.tour.id,
                self.progress * 100.0,
                tour.id
            );
        }

        tracing::info!(
            "Starting tour {} ({} waypoints, {:.0}s)",
            tour.id,
            tour.waypoints.len(),
            tour.total_duration
        );

        self.active = Some(ActivePlayback {
            tour,
            started_at: now,
            last_tick: now,
            finished: false,
        });
        self.progress = 0.0;
        self.publish();
        Ok(())
    }

    /// Advance playback to host time `now` (seconds).
    ///
    /// Returns the pose to apply to the camera this frame, or `None` when idle.
    /// Progress is derived from elapsed wall-clock time, never frame count, and
    /// the smoothing step is scaled by the time since the previous tick.
    pub fn tick(&mut self, now: f64) -> Option<Pose> {
        let active = self.active.as_mut()?;

        let elapsed = (now - active.started_at).max(0.0);
        let duration = f64::from(active.tour.total_duration);
        #[allow(clippy::cast_possible_truncation)]
        let raw_progress = if duration.is_finite() && duration > 0.0 {
            (elapsed / duration).min(1.0) as f32
        } else {
            1.0
        };
        self.progress = self.progress.max(raw_progress);

        let delta = (now - active.last_tick).max(0.0);
        active.last_tick = active.last_tick.max(now);

        if let Some(target) = sampler::sample(&active.tour, self.progress) {
            #[allow(clippy::cast_possible_truncation)]
            let factor = smoothing_factor(delta as f32, self.settings.smoothing_time_constant);
            self.current_pose = self.current_pose.approach(target, factor);
        }

        if self.progress >= 1.0 && !active.finished {
            active.finished = true;
            tracing::info!("Tour {} finished", active.tour.id);
        }

        self.publish();
        Some(self.current_pose)
    }

    /// Abandon the active tour immediately.
    ///
    /// The camera pose is left where it is. Returns whether a tour was active;
    /// calling this while idle is a no-op.
    pub fn stop(&mut self) -> bool {
        let Some(previous) = self.active.take() else {
            return false;
        };
        tracing::info!(
            "Exited tour {} at {:.0}%",
            previous.tour.id,
            self.progress * 100.0
        );
        self.publish();
        true
    }

    /// Re-seat the current pose from the live camera.
    ///
    /// Only honoured while idle; during playback the player owns the pose.
    pub fn sync_pose(&mut self, pose: Pose) -> bool {
        if self.active.is_some() || !pose.is_finite() {
            return false;
        }
        self.current_pose = pose;
        true
    }

    /// Current playback phase.
    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        match &self.active {
            None => PlaybackPhase::Idle,
            Some(active) if active.finished => PlaybackPhase::Finished,
            Some(_) => PlaybackPhase::Playing,
        }
    }

    /// Returns true while a tour is playing or holding its final pose.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Last computed progress in [0, 1].
    #[must_use]
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// The tour being played, if any.
    #[must_use]
    pub fn active_tour(&self) -> Option<&Arc<Tour>> {
        self.active.as_ref().map(|active| &active.tour)
    }

    /// The smoothed camera pose.
    #[must_use]
    pub fn current_pose(&self) -> Pose {
        self.current_pose
    }

    /// The catalog tours are started from.
    #[must_use]
    pub fn catalog(&self) -> &Arc<TourCatalog> {
        &self.catalog
    }

    #[must_use]
    pub fn settings(&self) -> PlayerSettings {
        self.settings
    }

    /// Change tunables; takes effect on the next tick.
    pub fn set_settings(&mut self, settings: PlayerSettings) {
        self.settings = settings;
    }

    /// Handle to the published snapshot.
    #[must_use]
    pub fn shared(&self) -> SharedTourState {
        self.shared.clone()
    }

    fn publish(&self) {
        self.shared.publish(TourSnapshot {
            tour_id: self.active.as_ref().map(|active| active.tour.id.clone()),
            phase: self.phase(),
            progress: self.progress,
            pose: self.current_pose,
        });
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::error::Error;
    use crate::tour::tests::tour_with;

    const SNAP: PlayerSettings = PlayerSettings {
        smoothing_time_constant: 0.0,
    };

    fn start_pose() -> Pose {
        Pose::new(Vec3::new(50.0, 30.0, 50.0), Vec3::ZERO)
    }

    fn builtin_player(settings: PlayerSettings) -> TourPlayer {
        TourPlayer::new(Arc::new(TourCatalog::builtin()), start_pose(), settings)
    }

    #[test]
    fn test_unknown_tour_keeps_player_idle() {
        let mut player = builtin_player(PlayerSettings::default());
        let err = player.start("no-such-tour", 0.0).unwrap_err();
        assert!(matches!(err, Error::UnknownTour { .. }));
        assert_eq!(player.phase(), PlaybackPhase::Idle);
        assert!(player.tick(1.0).is_none());
        assert_eq!(player.current_pose(), start_pose());
    }

    #[test]
    fn test_start_then_tick_has_zero_progress() {
        let mut player = builtin_player(PlayerSettings::default());
        player.start("reactor-core", 10.0).unwrap();
        player.tick(10.0);
        assert_eq!(player.progress(), 0.0);
        assert_eq!(player.phase(), PlaybackPhase::Playing);
    }

    #[test]
    fn test_progress_is_monotonic_and_saturates() {
        let mut player = builtin_player(PlayerSettings::default());
        player.start("reactor-core", 0.0).unwrap();

        let mut last = 0.0;
        for step in 0..300 {
            player.tick(f64::from(step) * 0.5);
            assert!(player.progress() >= last);
            last = player.progress();
        }
        assert_eq!(player.progress(), 1.0);
        assert_eq!(player.phase(), PlaybackPhase::Finished);

        // Further ticks keep it at 1 and stay finished.
        player.tick(500.0);
        assert_eq!(player.progress(), 1.0);
        assert_eq!(player.phase(), PlaybackPhase::Finished);
    }

    #[test]
    fn test_clock_going_backwards_does_not_regress() {
        let mut player = builtin_player(PlayerSettings::default());
        player.start("reactor-core", 100.0).unwrap();
        player.tick(160.0);
        assert_eq!(player.progress(), 0.5);

        let pose = player.current_pose();
        player.tick(130.0);
        assert_eq!(player.progress(), 0.5);
        // No time passed according to the smoother, so the pose is unchanged.
        assert_eq!(player.current_pose(), pose);

        player.tick(40.0);
        assert_eq!(player.progress(), 0.5);
    }

    #[test]
    fn test_reactor_core_scenario_with_snapping() {
        let mut player = builtin_player(SNAP);
        player.start("reactor-core", 0.0).unwrap();

        let pose = player.tick(30.0).unwrap();
        assert_eq!(player.progress(), 0.25);
        assert_eq!(pose.position, Vec3::new(25.0, 25.0, 45.0));

        let pose = player.tick(60.0).unwrap();
        assert_eq!(player.progress(), 0.5);
        assert_eq!(pose.position, Vec3::new(0.0, 20.0, 40.0));
    }

    #[test]
    fn test_smoothing_lags_target() {
        let mut player = builtin_player(PlayerSettings::default());
        player.start("reactor-core", 0.0).unwrap();
        let pose = player.tick(1.0 / 60.0).unwrap();

        let target = sampler::sample(player.active_tour().unwrap(), player.progress()).unwrap();
        // Camera started exactly at W0, target has barely moved; pose is in between.
        assert!(pose.position.distance(target.position) > 0.0);
        assert!(pose.target.distance(target.target) < start_pose().target.distance(target.target));
    }

    #[test]
    fn test_smoothing_independent_of_frame_rate() {
        let catalog = Arc::new(
            TourCatalog::new([tour_with(&[(Vec3::new(100.0, 0.0, 0.0), 1.0)], 10.0)]).unwrap(),
        );
        let run = |hz: u32| {
            let mut player = TourPlayer::new(
                Arc::clone(&catalog),
                Pose::new(Vec3::ZERO, Vec3::ZERO),
                PlayerSettings::default(),
            );
            player.start("test", 0.0).unwrap();
            for frame in 1..=hz {
                player.tick(f64::from(frame) / f64::from(hz));
            }
            player.current_pose().position.x
        };

        let slow = run(20);
        let fast = run(240);
        assert!((slow - fast).abs() < 1e-2, "{slow} vs {fast}");

        // After one second with tau = 0.825 the camera covered 1 - e^(-1/0.825).
        let expected = 100.0 * (1.0 - (-1.0_f32 / DEFAULT_SMOOTHING_TIME_CONSTANT).exp());
        assert!((fast - expected).abs() < 1e-2);
    }

    #[test]
    fn test_stop_leaves_pose_and_idles() {
        let mut player = builtin_player(SNAP);
        player.start("reactor-core", 0.0).unwrap();
        let pose = player.tick(30.0).unwrap();

        assert!(player.stop());
        assert_eq!(player.phase(), PlaybackPhase::Idle);
        assert!(player.active_tour().is_none());
        assert_eq!(player.current_pose(), pose);

        assert!(player.tick(60.0).is_none());
        assert_eq!(player.current_pose(), pose);

        // Idempotent.
        assert!(!player.stop());
    }

    #[test]
    fn test_restart_resets_progress_and_switches_tour() {
        let mut player = builtin_player(SNAP);
        player.start("reactor-core", 0.0).unwrap();
        player.tick(90.0);
        assert_eq!(player.progress(), 0.75);

        player.start("control-room", 90.0).unwrap();
        assert_eq!(player.progress(), 0.0);
        let pose = player.tick(90.0).unwrap();
        assert_eq!(player.progress(), 0.0);

        let control_room = player.catalog().lookup("control-room").unwrap();
        assert_eq!(Some(pose), control_room.first_pose());
    }

    #[test]
    fn test_sync_pose_only_while_idle() {
        let mut player = builtin_player(PlayerSettings::default());
        let moved = Pose::new(Vec3::new(10.0, 10.0, 10.0), Vec3::ZERO);
        assert!(player.sync_pose(moved));
        assert_eq!(player.current_pose(), moved);

        player.start("reactor-core", 0.0).unwrap();
        assert!(!player.sync_pose(start_pose()));
        assert_eq!(player.current_pose(), moved);
    }

    #[test]
    fn test_shared_state_tracks_ticks() {
        let mut player = builtin_player(SNAP);
        let shared = player.shared();

        player.start("reactor-core", 0.0).unwrap();
        player.tick(60.0);
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.tour_id.as_deref(), Some("reactor-core"));
        assert_eq!(snapshot.phase, PlaybackPhase::Playing);
        assert_eq!(snapshot.progress, 0.5);
        assert_eq!(snapshot.pose, player.current_pose());

        player.stop();
        let snapshot = shared.snapshot();
        assert_eq!(snapshot.tour_id, None);
        assert_eq!(snapshot.phase, PlaybackPhase::Idle);
    }
}
