//! Guided camera tours of a nuclear power plant using Bevy.
//!
//! The camera starts as a free orbit camera around the plant. Picking a tour
//! hands the camera to the tour engine until the tour is exited.

mod camera;
mod input;
mod launch_params;
mod route_preview;
mod scene;
mod tour;
mod ui;

use bevy::prelude::*;
use camera::{OrbitCamera, OrbitCameraPlugin};
use input::{InputPlugin, ViewerAction};
use leafwing_input_manager::prelude::ActionState;
use route_preview::RoutePreviewPlugin;
use scene::ScenePlugin;
use tour::TourPlugin;
use ui::TourUiPlugin;

/// Where the camera starts, matching the first stop of the reactor tour.
const START_POSITION: Vec3 = Vec3::new(50.0, 30.0, 50.0);
/// Vertical field of view in degrees.
const FOV_DEGREES: f32 = 50.0;

/// Plugin for the main application.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            InputPlugin,
            OrbitCameraPlugin,
            ScenePlugin,
            TourPlugin,
            RoutePreviewPlugin,
            TourUiPlugin,
        ))
        .add_systems(Startup, setup_camera);
    }
}

/// Spawn the camera looking at the reactor.
fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(START_POSITION).looking_at(Vec3::ZERO, Vec3::Y),
        Projection::Perspective(PerspectiveProjection {
            fov: FOV_DEGREES.to_radians(),
            near: 0.1,
            far: 2000.0,
            ..Default::default()
        }),
        OrbitCamera::looking_at(START_POSITION, Vec3::ZERO),
        input::default_input_map(),
        ActionState::<ViewerAction>::default(),
    ));

    tracing::info!("Camera ready - drag to orbit, scroll to zoom, pick a tour to begin");
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "plant-tour-viewer".to_string(),
        resolution: (1600, 900).into(),
        position: WindowPosition::Centered(MonitorSelection::Primary),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }))
    .insert_resource(params)
    .add_plugins(AppPlugin)
    .run();
}
