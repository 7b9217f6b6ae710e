//! Orbit camera controller.
//!
//! Left-drag rotates around a focus point, right-drag pans the focus point and
//! the scroll wheel zooms. Input is accumulated and released gradually so the
//! camera coasts to a stop instead of halting the moment the mouse does.
//!
//! The controller is the free camera that guided tours suspend: it implements
//! [`FreeCameraControl`] and does nothing at all while disabled.

use std::f32::consts::PI;

use bevy::prelude::*;
use leafwing_input_manager::prelude::*;
use tour_engine::{FreeCameraControl, smoothing_factor};

use crate::input::ViewerAction;

/// Closest the camera may get to its focus point.
pub const MIN_DISTANCE: f32 = 20.0;
/// Farthest the camera may get from its focus point.
pub const MAX_DISTANCE: f32 = 200.0;
/// Largest polar angle (from straight up); keeps the camera above the ground.
pub const MAX_POLAR_ANGLE: f32 = PI / 2.2;
/// Smallest polar angle; avoids the singularity directly above the focus.
const MIN_POLAR_ANGLE: f32 = 0.01;

// ============================================================================
// Plugin
// ============================================================================

/// Plugin for the orbit camera.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<OrbitSettings>().add_systems(
            Update,
            (orbit_input, orbit_motion).chain().in_set(OrbitSystems),
        );
    }
}

/// System set for orbit input and motion, for ordering against systems that
/// also move the camera.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrbitSystems;

// ============================================================================
// Settings and component
// ============================================================================

/// Orbit controller tuning.
#[derive(Resource, Debug, Clone)]
pub struct OrbitSettings {
    /// Radians of rotation per pixel of mouse motion.
    pub rotate_sensitivity: f32,
    /// Fraction of the focus distance panned per pixel of mouse motion.
    pub pan_sensitivity: f32,
    /// Zoom factor per scroll line.
    pub zoom_step: f32,
    /// Seconds for accumulated motion to decay to ~37%.
    pub damping_time_constant: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.005,
            pan_sensitivity: 0.0015,
            zoom_step: 0.9,
            // 5% of the remaining motion per frame at 60 Hz.
            damping_time_constant: 0.325,
        }
    }
}

/// Motion requested by input but not yet applied.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingMotion {
    yaw: f32,
    polar: f32,
    /// Natural log of the distance scale.
    zoom: f32,
    pan: Vec3,
}

impl PendingMotion {
    fn scaled(self, factor: f32) -> Self {
        Self {
            yaw: self.yaw * factor,
            polar: self.polar * factor,
            zoom: self.zoom * factor,
            pan: self.pan * factor,
        }
    }

    fn minus(self, other: Self) -> Self {
        Self {
            yaw: self.yaw - other.yaw,
            polar: self.polar - other.polar,
            zoom: self.zoom - other.zoom,
            pan: self.pan - other.pan,
        }
    }
}

/// Orbit state for the camera.
///
/// Spherical coordinates around `focus`: `yaw` around +Y measured from +Z,
/// `polar` measured down from +Y.
#[derive(Component, Debug, Clone)]
pub struct OrbitCamera {
    pub focus: Vec3,
    pub yaw: f32,
    pub polar: f32,
    pub distance: f32,
    enabled: bool,
    /// Set when re-enabled; the next update re-derives the orbit from the transform.
    needs_resync: bool,
    pending: PendingMotion,
}

impl OrbitCamera {
    /// Orbit that places the camera at `position` looking at `focus`.
    pub fn looking_at(position: Vec3, focus: Vec3) -> Self {
        let mut orbit = Self {
            focus,
            yaw: 0.0,
            polar: MAX_POLAR_ANGLE,
            distance: MIN_DISTANCE,
            enabled: true,
            needs_resync: false,
            pending: PendingMotion::default(),
        };
        orbit.set_from_offset(position - focus);
        orbit
    }

    fn set_from_offset(&mut self, offset: Vec3) {
        let distance = offset.length();
        if !distance.is_finite() || distance < f32::EPSILON {
            return;
        }
        self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.polar = (offset.y / distance)
            .clamp(-1.0, 1.0)
            .acos()
            .clamp(MIN_POLAR_ANGLE, MAX_POLAR_ANGLE);
        self.yaw = offset.x.atan2(offset.z);
    }

    /// Camera position implied by the orbit parameters.
    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        self.focus + self.distance * Vec3::new(sin_polar * sin_yaw, cos_polar, sin_polar * cos_yaw)
    }

    /// Transform implied by the orbit parameters.
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position()).looking_at(self.focus, Vec3::Y)
    }

    /// Re-derive the orbit from wherever the camera currently is.
    ///
    /// The new focus lies along the view direction at the previous focus
    /// distance, so the camera does not move when control resumes. A view
    /// direction outside the polar limits (looking up, or straight down) is
    /// tilted back inside them; only the orientation changes, never the
    /// position.
    pub fn resync_from(&mut self, transform: &Transform) {
        let distance = transform
            .translation
            .distance(self.focus)
            .clamp(MIN_DISTANCE, MAX_DISTANCE);
        let offset_dir = self.clamped_offset_dir(-*transform.forward());

        self.focus = transform.translation - offset_dir * distance;
        self.distance = distance;
        self.polar = offset_dir.y.clamp(-1.0, 1.0).acos();
        self.yaw = offset_dir.x.atan2(offset_dir.z);
        self.pending = PendingMotion::default();
    }

    /// Unit focus-to-camera direction with its polar angle inside the limits.
    fn clamped_offset_dir(&self, dir: Vec3) -> Vec3 {
        let polar = dir.y.clamp(-1.0, 1.0).acos();
        if (MIN_POLAR_ANGLE..=MAX_POLAR_ANGLE).contains(&polar) {
            return dir;
        }
        let clamped = polar.clamp(MIN_POLAR_ANGLE, MAX_POLAR_ANGLE);

        // Keep the horizontal heading; a vertical view has none, so keep the yaw.
        let yaw = if dir.x.hypot(dir.z) > 1e-4 {
            dir.x.atan2(dir.z)
        } else {
            self.yaw
        };
        let (sin_polar, cos_polar) = clamped.sin_cos();
        let (sin_yaw, cos_yaw) = yaw.sin_cos();
        Vec3::new(sin_polar * sin_yaw, cos_polar, sin_polar * cos_yaw)
    }

    /// Release a share of the pending motion and apply it.
    fn advance(&mut self, delta_secs: f32, settings: &OrbitSettings) {
        let factor = smoothing_factor(delta_secs, settings.damping_time_constant);
        let step = self.pending.scaled(factor);
        self.pending = self.pending.minus(step);

        self.yaw = (self.yaw + step.yaw).rem_euclid(2.0 * PI);
        self.polar = (self.polar + step.polar).clamp(MIN_POLAR_ANGLE, MAX_POLAR_ANGLE);
        self.distance = (self.distance * step.zoom.exp()).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.focus += step.pan;
    }
}

impl FreeCameraControl for OrbitCamera {
    fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.needs_resync = true;
        }
        if !enabled {
            self.pending = PendingMotion::default();
        }
        self.enabled = enabled;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// ============================================================================
// Systems
// ============================================================================

/// Accumulate drag and scroll input into the pending motion.
fn orbit_input(
    settings: Res<OrbitSettings>,
    camera: Single<(&ActionState<ViewerAction>, &mut OrbitCamera, &Transform)>,
) {
    let (action_state, mut orbit, transform) = camera.into_inner();
    if !orbit.enabled {
        return;
    }

    let delta = action_state.axis_pair(&ViewerAction::Look);
    if action_state.pressed(&ViewerAction::Rotate) {
        orbit.pending.yaw -= delta.x * settings.rotate_sensitivity;
        orbit.pending.polar -= delta.y * settings.rotate_sensitivity;
    } else if action_state.pressed(&ViewerAction::Pan) {
        let scale = orbit.distance * settings.pan_sensitivity;
        let pan = (transform.left() * delta.x + transform.up() * delta.y) * scale;
        orbit.pending.pan += pan;
    }

    let scroll = action_state.value(&ViewerAction::Zoom);
    if scroll != 0.0 {
        orbit.pending.zoom += settings.zoom_step.ln() * scroll;
    }
}

/// Apply damped orbit motion to the camera transform.
fn orbit_motion(
    time: Res<Time>,
    settings: Res<OrbitSettings>,
    camera: Single<(&mut OrbitCamera, &mut Transform)>,
) {
    let (mut orbit, mut transform) = camera.into_inner();
    if !orbit.enabled {
        return;
    }

    if orbit.needs_resync {
        orbit.resync_from(&transform);
        orbit.needs_resync = false;
        tracing::debug!(
            "Orbit resynced: focus {:?}, distance {:.1}",
            orbit.focus,
            orbit.distance
        );
    }

    orbit.advance(time.delta_secs(), &settings);
    *transform = orbit.transform();
}
