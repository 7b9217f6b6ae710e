//! Guided camera tours for the plant viewer.
//!
//! A tour is an ordered list of waypoints, each a camera position and a
//! look-at target. This crate turns a tour id and a clock into the camera pose
//! to apply each frame, and keeps free-camera input out of the way while a
//! tour owns the camera.
//!
//! # Design principles
//!
//! - **Engine-agnostic**: Only `glam` math types; the host applies poses
//! - **Deterministic**: Sampling is a pure function of tour and progress
//! - **Non-blocking**: Offloaded sampling never stalls the caller
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tour_engine::{PlayerSettings, Pose, TourCatalog, TourLifecycle, TourPlayer};
//!
//! let player = TourPlayer::new(
//!     Arc::new(TourCatalog::builtin()),
//!     Pose::new(glam::Vec3::new(50.0, 30.0, 50.0), glam::Vec3::ZERO),
//!     PlayerSettings::default(),
//! );
//! let mut lifecycle = TourLifecycle::new(player);
//!
//! lifecycle.on_start_tour("reactor-core", now, &mut orbit_controls)?;
//! // Every frame:
//! if let Some(pose) = lifecycle.tick(now, &mut orbit_controls) {
//!     camera.look_from(pose.position, pose.target);
//! }
//! ```

pub mod catalog;
mod error;
pub mod lifecycle;
pub mod offload;
pub mod player;
mod pose;
pub mod sampler;
mod shared;
pub mod tour;

pub use catalog::TourCatalog;
pub use error::{Error, Result};
pub use lifecycle::{FreeCameraControl, TourLifecycle};
pub use offload::{SampleRequest, SampleResult, SamplerClient, SamplerWorker, sampler_worker};
pub use player::{PlayerSettings, TourPlayer};
pub use pose::{DEFAULT_SMOOTHING_TIME_CONSTANT, Pose, smoothing_factor};
pub use sampler::{SegmentPosition, sample, sample_path, segment_at};
pub use shared::{PlaybackPhase, SharedTourState, TourSnapshot};
pub use tour::{Difficulty, Easing, Tour, Waypoint};
