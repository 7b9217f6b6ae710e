//! Tour selection cards and the in-tour overlay.
//!
//! While the free camera is active a window lists every tour in the catalog.
//! During a tour it is replaced by a panel with the tour's details, playback
//! progress and the stop the camera is heading to.

use bevy::{
    diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin},
    prelude::*,
};
use bevy_egui::{EguiContexts, EguiPlugin, EguiPrimaryContextPass, egui};
use tour_engine::{Difficulty, PlaybackPhase, Tour, segment_at};

use crate::route_preview::PreviewedTour;
use crate::scene::SceneLayers;
use crate::tour::{TourRequests, TourSession};

/// Plugin for the tour UI.
pub struct TourUiPlugin;

impl Plugin for TourUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(EguiPrimaryContextPass, tour_ui_system);
    }
}

fn difficulty_color(difficulty: Difficulty) -> egui::Color32 {
    match difficulty {
        Difficulty::Beginner => egui::Color32::from_rgb(72, 160, 96),
        Difficulty::Intermediate => egui::Color32::from_rgb(214, 160, 40),
        Difficulty::Advanced => egui::Color32::from_rgb(200, 70, 60),
        Difficulty::AllLevels => egui::Color32::from_rgb(120, 100, 200),
    }
}

/// Label of the stop the camera is travelling toward (or holding at).
fn current_stop_label(tour: &Tour, progress: f32) -> Option<&str> {
    let segment = segment_at(tour, progress)?;
    let index = if segment.local_t > 0.0 {
        segment.to
    } else {
        segment.from
    };
    tour.waypoints.get(index)?.label.as_deref()
}

/// The preview to show for the hovered card, or `None` if it is unchanged.
///
/// Nothing hovered clears the preview.
fn next_preview(current: &PreviewedTour, hovered: Option<&str>) -> Option<PreviewedTour> {
    (current.0.as_deref() != hovered).then(|| PreviewedTour(hovered.map(str::to_owned)))
}

/// Render the UI for the current playback phase.
fn tour_ui_system(
    mut contexts: EguiContexts,
    session: Res<TourSession>,
    diagnostics: Res<DiagnosticsStore>,
    mut requests: ResMut<TourRequests>,
    mut previewed: ResMut<PreviewedTour>,
    mut layers: ResMut<SceneLayers>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);

    match session.lifecycle().player().active_tour() {
        None => {
            egui::Window::new("Guided tours")
                .default_pos([10.0, 10.0])
                .default_width(320.0)
                .resizable(false)
                .show(ctx, |ui| {
                    let mut hovered = None;
                    egui::ScrollArea::vertical()
                        .max_height(560.0)
                        .show(ui, |ui| {
                            for tour in session.catalog().iter() {
                                if tour_card(ui, tour, &mut requests) {
                                    hovered = Some(tour.id.as_str());
                                }
                                ui.add_space(6.0);
                            }
                        });
                    if let Some(next) = next_preview(&previewed, hovered) {
                        *previewed = next;
                    }

                    ui.separator();
                    ui.horizontal(|ui| {
                        let mut terrain = layers.terrain;
                        let mut switchyard = layers.switchyard;
                        ui.checkbox(&mut terrain, "Terrain");
                        ui.checkbox(&mut switchyard, "Switchyard");
                        // Only write on change so the visibility system stays idle.
                        if terrain != layers.terrain || switchyard != layers.switchyard {
                            layers.terrain = terrain;
                            layers.switchyard = switchyard;
                        }
                    });
                    ui.label(format!("FPS: {fps:.0}"));
                });
        }
        Some(tour) => {
            if let Some(next) = next_preview(&previewed, None) {
                *previewed = next;
            }
            let snapshot = session.shared().snapshot();
            egui::Window::new(tour.title.as_str())
                .id(egui::Id::new("tour_overlay"))
                .anchor(egui::Align2::LEFT_BOTTOM, [10.0, -10.0])
                .default_width(360.0)
                .resizable(false)
                .collapsible(false)
                .show(ctx, |ui| {
                    ui.label(tour.description.as_str());
                    ui.label(
                        egui::RichText::new(format!("Duration: {}", tour.display_duration()))
                            .small(),
                    );
                    ui.add_space(4.0);

                    ui.add(
                        egui::ProgressBar::new(snapshot.progress)
                            .show_percentage()
                            .desired_width(340.0),
                    );
                    if snapshot.phase == PlaybackPhase::Finished {
                        ui.label("Tour complete");
                    } else if let Some(label) = current_stop_label(tour, snapshot.progress) {
                        ui.label(format!("Next stop: {label}"));
                    }

                    ui.add_space(4.0);
                    ui.horizontal(|ui| {
                        if ui.button("Exit tour").clicked() {
                            requests.request_exit();
                        }
                        ui.label(egui::RichText::new("or press Esc").small().weak());
                    });
                    ui.label(format!("FPS: {fps:.0}"));
                });
        }
    }

    Ok(())
}

/// Draw one tour card; returns whether the pointer is over it.
fn tour_card(ui: &mut egui::Ui, tour: &Tour, requests: &mut TourRequests) -> bool {
    let response = egui::Frame::group(ui.style())
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&tour.title).strong());
                ui.label(
                    egui::RichText::new(tour.difficulty.label())
                        .small()
                        .color(difficulty_color(tour.difficulty)),
                );
                ui.label(egui::RichText::new(tour.display_duration()).small().weak());
            });
            ui.label(tour.description.as_str());
            if !tour.highlights.is_empty() {
                ui.label(egui::RichText::new(tour.highlights.join(" · ")).small());
            }
            if ui.button("Start tour").clicked() {
                requests.request_start(tour.id.clone());
            }
        })
        .response;

    response.hovered()
}

#[cfg(test)]
mod tests {
    use tour_engine::TourCatalog;

    use super::*;

    #[test]
    fn test_current_stop_label_follows_progress() {
        let catalog = TourCatalog::builtin();
        let tour = catalog.lookup("reactor-core").unwrap();

        let first = tour.waypoints[0].label.as_deref();
        let second = tour.waypoints[1].label.as_deref();
        let last = tour.waypoints[2].label.as_deref();

        assert_eq!(current_stop_label(tour, 0.0), first);
        assert_eq!(current_stop_label(tour, 0.25), second);
        assert_eq!(current_stop_label(tour, 0.75), last);
        assert_eq!(current_stop_label(tour, 1.0), last);
    }

    #[test]
    fn test_preview_follows_hover_and_clears() {
        let idle = PreviewedTour::default();
        let reactor = next_preview(&idle, Some("reactor-core")).unwrap();
        assert_eq!(reactor.0.as_deref(), Some("reactor-core"));
        assert_eq!(next_preview(&reactor, Some("reactor-core")), None);

        // Pointer left every card.
        assert_eq!(next_preview(&reactor, None), Some(PreviewedTour(None)));
        assert_eq!(next_preview(&idle, None), None);
    }
}
