//! Tour playback inside the Bevy app.
//!
//! UI and launch parameters never touch the tour player directly; they queue
//! [`TourRequest`]s which one system applies at a fixed point in the frame.
//! A second system ticks the player and writes the camera transform exactly
//! once per frame while a tour is active.

use std::path::Path;
use std::sync::Arc;

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use tour_engine::{
    PlaybackPhase, PlayerSettings, Pose, SharedTourState, TourCatalog, TourLifecycle, TourPlayer,
};

use crate::camera::{OrbitCamera, OrbitSystems};
use crate::input::ViewerAction;
use crate::launch_params::LaunchParams;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin driving guided tours.
pub struct TourPlugin;

impl Plugin for TourPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TourRequests>()
            .add_systems(PostStartup, (setup_tour_session, apply_initial_tour))
            .add_systems(
                Update,
                (exit_tour_on_escape, process_tour_requests, drive_tour_camera)
                    .chain()
                    .before(OrbitSystems),
            );
    }
}

// ============================================================================
// Resources
// ============================================================================

/// The viewer's tour session: the lifecycle controller and its catalog.
#[derive(Resource)]
pub struct TourSession {
    lifecycle: TourLifecycle,
    shared: SharedTourState,
}

impl TourSession {
    pub fn new(catalog: Arc<TourCatalog>, initial_pose: Pose, settings: PlayerSettings) -> Self {
        let player = TourPlayer::new(catalog, initial_pose, settings);
        let shared = player.shared();
        Self {
            lifecycle: TourLifecycle::new(player),
            shared,
        }
    }

    pub fn catalog(&self) -> &Arc<TourCatalog> {
        self.lifecycle.player().catalog()
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.lifecycle.phase()
    }

    pub fn lifecycle(&self) -> &TourLifecycle {
        &self.lifecycle
    }

    /// Handle for reading progress and pose without borrowing the session.
    pub fn shared(&self) -> &SharedTourState {
        &self.shared
    }
}

/// Queue of start/exit requests from the UI and launch parameters.
#[derive(Resource, Default)]
pub struct TourRequests {
    pending: Vec<TourRequest>,
}

impl TourRequests {
    /// Request that the given tour start (restarting if it is already active).
    pub fn request_start(&mut self, tour_id: impl Into<String>) {
        self.pending.push(TourRequest::Start(tour_id.into()));
    }

    /// Request that the current tour, if any, end.
    pub fn request_exit(&mut self) {
        self.pending.push(TourRequest::Exit);
    }

    /// Take all pending requests for processing.
    fn take(&mut self) -> Vec<TourRequest> {
        std::mem::take(&mut self.pending)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TourRequest {
    Start(String),
    Exit,
}

// ============================================================================
// Setup
// ============================================================================

/// Load the catalog from `path`, or use the built-in tours.
///
/// A file that cannot be read or parsed is logged and replaced by the
/// built-in catalog so the viewer always has something to show.
pub fn load_catalog(path: Option<&Path>) -> TourCatalog {
    let Some(path) = path else {
        return TourCatalog::builtin();
    };

    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!("Failed to read tour catalog {}: {e}", path.display());
            return TourCatalog::builtin();
        }
    };

    match TourCatalog::from_json(&json) {
        Ok(catalog) => {
            tracing::info!(
                "Loaded {} tours from {}",
                catalog.len(),
                path.display()
            );
            catalog
        }
        Err(e) => {
            tracing::warn!("Rejected tour catalog {}: {e}", path.display());
            TourCatalog::builtin()
        }
    }
}

/// Create the tour session from launch parameters and the camera's start pose.
fn setup_tour_session(
    mut commands: Commands,
    params: Res<LaunchParams>,
    camera: Single<(&Transform, &OrbitCamera)>,
) {
    let (transform, orbit) = camera.into_inner();
    let catalog = Arc::new(load_catalog(params.catalog.as_deref()));
    let settings = PlayerSettings {
        smoothing_time_constant: params.smoothing,
    };
    commands.insert_resource(TourSession::new(
        catalog,
        Pose::new(transform.translation, orbit.focus),
        settings,
    ));
}

/// Start the tour named on the command line, if any.
fn apply_initial_tour(params: Res<LaunchParams>, mut requests: ResMut<TourRequests>) {
    if let Some(tour_id) = &params.tour {
        requests.request_start(tour_id.clone());
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Escape leaves a running tour.
fn exit_tour_on_escape(
    action_query: Query<&ActionState<ViewerAction>>,
    session: Res<TourSession>,
    mut requests: ResMut<TourRequests>,
) {
    let Ok(action_state) = action_query.single() else {
        return;
    };

    if session.phase().is_active() && action_state.just_pressed(&ViewerAction::ExitTour) {
        requests.request_exit();
    }
}

/// Apply queued start/exit requests in order.
fn process_tour_requests(
    time: Res<Time>,
    mut requests: ResMut<TourRequests>,
    mut session: ResMut<TourSession>,
    mut orbit: Single<&mut OrbitCamera>,
) {
    for request in requests.take() {
        match request {
            TourRequest::Start(tour_id) => {
                // Failures are logged by the player; the free camera stays usable.
                let _ = session.lifecycle.on_start_tour(
                    &tour_id,
                    time.elapsed_secs_f64(),
                    &mut **orbit,
                );
            }
            TourRequest::Exit => session.lifecycle.on_exit_tour(&mut **orbit),
        }
    }
}

/// Advance the active tour and apply its pose to the camera.
///
/// While idle the player is kept in sync with the free camera so the next
/// tour starts smoothing from wherever the user left it.
fn drive_tour_camera(
    time: Res<Time>,
    mut session: ResMut<TourSession>,
    camera: Single<(&mut Transform, &mut OrbitCamera)>,
) {
    let (mut transform, mut orbit) = camera.into_inner();

    match session
        .lifecycle
        .tick(time.elapsed_secs_f64(), &mut *orbit)
    {
        Some(pose) => *transform = pose_transform(pose),
        None => {
            session
                .lifecycle
                .player_mut()
                .sync_pose(Pose::new(transform.translation, orbit.focus));
        }
    }
}

/// Camera transform for a pose.
pub fn pose_transform(pose: Pose) -> Transform {
    Transform::from_translation(pose.position).looking_at(pose.target, Vec3::Y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requests_are_taken_in_order() {
        let mut requests = TourRequests::default();
        requests.request_start("reactor-core");
        requests.request_exit();
        requests.request_start("control-room");

        assert_eq!(
            requests.take(),
            vec![
                TourRequest::Start("reactor-core".into()),
                TourRequest::Exit,
                TourRequest::Start("control-room".into()),
            ]
        );
        assert!(requests.take().is_empty());
    }

    #[test]
    fn test_missing_catalog_file_falls_back_to_builtin() {
        let catalog = load_catalog(Some(Path::new("/nonexistent/tours.json")));
        assert_eq!(catalog.len(), TourCatalog::builtin().len());
    }

    #[test]
    fn test_pose_transform_looks_at_target() {
        let transform = pose_transform(Pose::new(Vec3::new(50.0, 30.0, 50.0), Vec3::ZERO));
        let expected = Vec3::new(-50.0, -30.0, -50.0).normalize();
        assert!((*transform.forward() - expected).length() < 1e-5);
    }

    #[test]
    fn test_session_shares_player_state() {
        let mut session = TourSession::new(
            Arc::new(TourCatalog::builtin()),
            Pose::new(Vec3::new(50.0, 30.0, 50.0), Vec3::ZERO),
            PlayerSettings::default(),
        );
        let mut orbit = OrbitCamera::looking_at(Vec3::new(50.0, 30.0, 50.0), Vec3::ZERO);

        session
            .lifecycle
            .on_start_tour("reactor-core", 0.0, &mut orbit)
            .unwrap();
        session.lifecycle.tick(60.0, &mut orbit);

        assert_eq!(session.phase(), PlaybackPhase::Playing);
        assert!((session.shared().progress() - 0.5).abs() < 1e-6);
        assert_eq!(
            session.shared().snapshot().tour_id.as_deref(),
            Some("reactor-core")
        );
    }
}
