//! Plate detection workflow.
//!
//! Three input modes feed one request: an uploaded image, a camera still, or
//! a typed plate. The server answers with a [`DetectionResult`] that is
//! turned into a [`ResultsView`] for display.
//!
//! # Architecture
//!
//! - [`DetectionWorkflow`]: active mode, per-mode input, submit and reset
//! - [`CameraController`]: idle / streaming / captured state machine over a
//!   [`CameraDevice`]
//! - [`ResultsView`]: what the results panel shows

mod camera;
mod render;
mod types;
mod workflow;

pub use camera::{
    CameraController, CameraDevice, CameraState, Frame, MediaStream, StillImageCamera,
};
pub use render::{NO_PLATES_MESSAGE, OwnerCard, PlateCard, ResultsView, VehicleCard};
pub use types::{
    DetectionInput, DetectionResult, ImageFile, InputMode, OwnerInfo, PlateMatch, VehicleInfo,
};
pub use workflow::{CAMERA_DENIED_MESSAGE, DetectionWorkflow, MISSING_INPUT_MESSAGE, REQUEST_FAILED_MESSAGE};
