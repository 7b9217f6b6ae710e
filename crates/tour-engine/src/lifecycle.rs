//! Start/exit mediation between UI intent, the player and free-camera input.
//!
//! Free-camera control and tour playback are mutually exclusive: the control
//! is enabled exactly when the player is idle. Every operation here leaves the
//! pair in one of those two states, including when a start request names an
//! unknown tour.
//!
//! A finished tour still counts as active. The orbit controls exist only while
//! no tour is selected, so free control returns on exit and never on
//! completion; the camera holds the final stop until then.

use crate::error::Result;
use crate::player::TourPlayer;
use crate::pose::Pose;
use crate::shared::PlaybackPhase;

/// The user-driven camera controller that tours must suspend.
pub trait FreeCameraControl {
    /// Enable or disable the controller's input handling.
    fn set_enabled(&mut self, enabled: bool);

    /// Whether the controller currently reacts to input.
    fn is_enabled(&self) -> bool;
}

/// Session-scoped owner of the tour player.
pub struct TourLifecycle {
    player: TourPlayer,
}

impl TourLifecycle {
    #[must_use]
    pub fn new(player: TourPlayer) -> Self {
        Self { player }
    }

    /// Hand the camera to `tour_id`.
    ///
    /// The free camera is disabled first. If the tour cannot be started the
    /// control is re-enabled and any tour that was already playing continues.
    pub fn on_start_tour(
        &mut self,
        tour_id: &str,
        now: f64,
        control: &mut impl FreeCameraControl,
    ) -> Result<()> {
        control.set_enabled(false);
        let result = self.player.start(tour_id, now);
        self.enforce(control);
        result
    }

    /// Stop any tour and give the camera back to the user.
    ///
    /// Safe to call when no tour was started.
    pub fn on_exit_tour(&mut self, control: &mut impl FreeCameraControl) {
        self.player.stop();
        self.enforce(control);
    }

    /// Advance the active tour, keeping the control state consistent.
    ///
    /// Returns the pose to apply to the camera this frame, if a tour is active.
    pub fn tick(&mut self, now: f64, control: &mut impl FreeCameraControl) -> Option<Pose> {
        let pose = self.player.tick(now);
        self.enforce(control);
        pose
    }

    /// Re-assert mutual exclusion: control enabled iff the player is idle.
    pub fn enforce(&self, control: &mut impl FreeCameraControl) {
        let should_enable = !self.player.is_active();
        if control.is_enabled() != should_enable {
            tracing::debug!(
                "Free camera control {}",
                if should_enable { "enabled" } else { "disabled" }
            );
            control.set_enabled(should_enable);
        }
    }

    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.player.phase()
    }

    #[must_use]
    pub fn player(&self) -> &TourPlayer {
        &self.player
    }

    /// Mutable access for host-side adjustments such as [`TourPlayer::sync_pose`].
    pub fn player_mut(&mut self) -> &mut TourPlayer {
        &mut self.player
    }
}
