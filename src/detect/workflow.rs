//! Detection form controller.

use std::sync::Arc;

use tracing::{info, warn};

use super::camera::{CameraController, CameraDevice, CameraState};
use super::render::ResultsView;
use super::types::{DetectionInput, ImageFile, InputMode};
use crate::api::Api;
use crate::error::{Error, Result};
use crate::ui::InFlight;

/// Alert for a submit with nothing to detect.
pub const MISSING_INPUT_MESSAGE: &str = "Please provide an image or enter a license plate number.";
/// Alert when the camera cannot be opened.
pub const CAMERA_DENIED_MESSAGE: &str =
    "Unable to access camera. Please ensure you have granted camera permissions.";
/// Alert when the detection request itself fails.
pub const REQUEST_FAILED_MESSAGE: &str = "Error processing request. Please try again.";

/// State of the detection page.
#[derive(Debug)]
pub struct DetectionWorkflow {
    api: Api,
    camera: CameraController,
    mode: InputMode,
    upload: Option<ImageFile>,
    preview: Option<String>,
    manual: String,
    results: Option<ResultsView>,
    alert: Option<String>,
    in_flight: bool,
}

impl DetectionWorkflow {
    /// Fresh page in upload mode.
    pub fn new(api: Api, camera: Arc<dyn CameraDevice>) -> Self {
        Self {
            api,
            camera: CameraController::new(camera),
            mode: InputMode::Upload,
            upload: None,
            preview: None,
            manual: String::new(),
            results: None,
            alert: None,
            in_flight: false,
        }
    }

    /// Active input mode.
    pub fn mode(&self) -> InputMode {
        self.mode
    }

    /// Switch tabs. Leaving camera mode releases the camera; results hide.
    pub fn switch_mode(&mut self, mode: InputMode) {
        if mode != InputMode::Camera {
            self.camera.reset();
        }
        self.mode = mode;
        self.results = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Upload
    // ─────────────────────────────────────────────────────────────────────────

    /// File chosen through the picker. Returns the preview data URL.
    pub fn select_file(&mut self, file: ImageFile) -> &str {
        self.alert = None;
        let preview = file.data_url();
        self.upload = Some(file);
        self.preview.insert(preview).as_str()
    }

    /// File dropped on the upload area. Only images are accepted.
    pub fn drop_file(&mut self, file: ImageFile) -> Result<&str> {
        if !file.is_image() {
            return Err(Error::input(format!("{} is not an image", file.name)));
        }
        Ok(self.select_file(file))
    }

    /// Selected upload.
    pub fn upload(&self) -> Option<&ImageFile> {
        self.upload.as_ref()
    }

    /// Preview of the selected upload.
    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Camera
    // ─────────────────────────────────────────────────────────────────────────

    /// Camera state.
    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    /// Captured still.
    pub fn captured(&self) -> Option<&str> {
        self.camera.snapshot()
    }

    pub async fn start_camera(&mut self) -> Result<()> {
        let outcome = self.camera.start().await;
        if let Err(Error::MediaAccess(_)) = &outcome {
            self.alert = Some(CAMERA_DENIED_MESSAGE.to_string());
        }
        outcome
    }

    pub async fn capture(&mut self) -> Result<String> {
        let outcome = self.camera.capture().await;
        if let Err(Error::MediaAccess(_)) = &outcome {
            self.alert = Some(CAMERA_DENIED_MESSAGE.to_string());
        }
        outcome
    }

    pub fn retake(&mut self) {
        self.camera.retake();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Manual entry
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_manual_text(&mut self, text: impl Into<String>) {
        self.manual = text.into();
    }

    pub fn manual_text(&self) -> &str {
        &self.manual
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Submit
    // ─────────────────────────────────────────────────────────────────────────

    /// Results panel, hidden when `None`.
    pub fn results(&self) -> Option<&ResultsView> {
        self.results.as_ref()
    }

    /// Last alert shown to the user.
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    /// Whether the detect button is enabled.
    pub fn can_submit(&self) -> bool {
        !self.in_flight
    }

    /// The request the active mode would send.
    pub fn build_input(&self) -> Result<DetectionInput> {
        let input = match self.mode {
            InputMode::Upload => self.upload.clone().map(DetectionInput::File),
            InputMode::Camera => self
                .camera
                .snapshot()
                .map(|data_url| DetectionInput::Capture(data_url.to_string())),
            InputMode::Manual => {
                let plate = self.manual.trim();
                (!plate.is_empty()).then(|| DetectionInput::Manual(plate.to_string()))
            }
        };
        input.ok_or_else(|| Error::input(MISSING_INPUT_MESSAGE))
    }

    /// Send the active input and show the response.
    ///
    /// Missing input is rejected before any request. The detect button is
    /// re-enabled on every exit path, including a dropped future.
    pub async fn submit(&mut self) -> Result<&ResultsView> {
        if self.in_flight {
            return Err(Error::input("A detection request is already in progress"));
        }
        self.alert = None;

        let input = match self.build_input() {
            Ok(input) => input,
            Err(e) => {
                self.alert = Some(e.to_string());
                return Err(e);
            }
        };

        let outcome = {
            let _busy = InFlight::enter(&mut self.in_flight);
            self.api.detection().submit(&input).await
        };

        match outcome {
            Ok(result) => {
                info!(name: "detect.rendered", mode = ?self.mode, plates = result.plates.len(), "Results updated");
                Ok(&*self.results.insert(ResultsView::from_result(&result)))
            }
            Err(e) => {
                warn!(name: "detect.submit.failed", error = %e, "Detection failed");
                if !e.is_session_expired() {
                    self.alert = Some(REQUEST_FAILED_MESSAGE.to_string());
                }
                Err(e)
            }
        }
    }

    /// Back to the initial state of every mode; releases the camera.
    pub fn reset(&mut self) {
        self.results = None;
        self.upload = None;
        self.preview = None;
        self.camera.reset();
        self.manual.clear();
        self.alert = None;
        self.in_flight = false;
    }
}
