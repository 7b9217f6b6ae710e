//! Gizmo preview of a tour's route while the free camera is active.
//!
//! Paths are computed by the sampling worker on Bevy's async compute pool.
//! Until the worker answers, the preview samples the tour inline, so a route
//! is drawn from the very first frame.

use bevy::prelude::*;
use bevy::tasks::AsyncComputeTaskPool;
use tour_engine::{PlaybackPhase, SamplerClient, sampler_worker};

use crate::tour::TourSession;

/// Number of samples drawn along a previewed route.
const PREVIEW_SAMPLES: usize = 96;
/// In-flight requests the worker channel holds.
const WORKER_CAPACITY: usize = 8;

/// Plugin for route previews.
pub struct RoutePreviewPlugin;

impl Plugin for RoutePreviewPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PreviewedTour>()
            .add_systems(Startup, spawn_sampler_worker)
            .add_systems(
                Update,
                draw_route_preview.run_if(resource_exists::<RoutePreview>),
            );
    }
}

/// The tour whose route is drawn, typically the card under the pointer.
#[derive(Resource, Default, Debug, Clone, PartialEq, Eq)]
pub struct PreviewedTour(pub Option<String>);

/// Client half of the sampling worker.
#[derive(Resource)]
pub struct RoutePreview {
    client: SamplerClient,
}

fn spawn_sampler_worker(mut commands: Commands) {
    let (client, worker) = sampler_worker(WORKER_CAPACITY);

    #[cfg(not(target_family = "wasm"))]
    AsyncComputeTaskPool::get().spawn(worker.run()).detach();
    #[cfg(target_family = "wasm")]
    AsyncComputeTaskPool::get().spawn_local(worker.run()).detach();

    commands.insert_resource(RoutePreview { client });
}

fn draw_route_preview(
    mut gizmos: Gizmos,
    session: Res<TourSession>,
    previewed: Res<PreviewedTour>,
    mut preview: ResMut<RoutePreview>,
) {
    if session.phase() != PlaybackPhase::Idle {
        return;
    }
    let Some(tour_id) = &previewed.0 else {
        return;
    };
    let Ok(tour) = session.catalog().lookup(tour_id) else {
        return;
    };

    let path = preview.client.path_or_sample(tour, PREVIEW_SAMPLES);
    gizmos.linestrip(
        path.iter().map(|pose| pose.position),
        Color::srgb(1.0, 0.75, 0.1),
    );

    for waypoint in &tour.waypoints {
        gizmos.sphere(
            Isometry3d::from_translation(waypoint.position),
            1.5,
            Color::srgb(1.0, 0.35, 0.1),
        );
        gizmos.line(
            waypoint.position,
            waypoint.target,
            Color::srgba(1.0, 1.0, 1.0, 0.35),
        );
    }
}
