//! Input action definitions for the viewer.
//!
//! Mouse actions drive the orbit camera; keyboard actions control tours.
//! Mouse actions are disabled whenever egui has the pointer so that dragging
//! a UI window never also spins the camera.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use leafwing_input_manager::{plugin::InputManagerSystem, prelude::*};

/// Actions for the orbit camera and tour playback.
#[derive(Actionlike, PartialEq, Eq, Hash, Clone, Copy, Debug, Reflect)]
pub enum ViewerAction {
    /// Mouse motion, interpreted by whichever drag button is held.
    #[actionlike(DualAxis)]
    Look,
    /// Hold to rotate around the focus point (left mouse).
    Rotate,
    /// Hold to pan the focus point (right mouse).
    Pan,
    /// Zoom toward or away from the focus point (scroll wheel).
    #[actionlike(Axis)]
    Zoom,
    /// Leave the running tour (Escape).
    ExitTour,
}

/// Actions that read the mouse and should yield to egui.
const POINTER_ACTIONS: &[ViewerAction] = &[
    ViewerAction::Look,
    ViewerAction::Rotate,
    ViewerAction::Pan,
    ViewerAction::Zoom,
];

/// Create the default input map.
pub fn default_input_map() -> InputMap<ViewerAction> {
    InputMap::default()
        .with_dual_axis(ViewerAction::Look, MouseMove::default())
        .with(ViewerAction::Rotate, MouseButton::Left)
        .with(ViewerAction::Pan, MouseButton::Right)
        .with_axis(ViewerAction::Zoom, MouseScrollAxis::Y)
        .with(ViewerAction::ExitTour, KeyCode::Escape)
}

/// Plugin that registers the action type and pointer focus handling.
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(InputManagerPlugin::<ViewerAction>::default())
            .add_systems(
                PreUpdate,
                manage_pointer_focus.after(InputManagerSystem::Update),
            );
    }
}

/// Disable camera mouse actions while the pointer is over egui.
fn manage_pointer_focus(
    mut action_query: Query<&mut ActionState<ViewerAction>>,
    mut contexts: EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area() || ctx.wants_pointer_input());

    for mut action_state in &mut action_query {
        for action in POINTER_ACTIONS {
            if egui_wants_pointer {
                action_state.disable_action(action);
            } else {
                action_state.enable_action(action);
            }
        }
    }
}
