//! `POST /plate/detect`.

use reqwest::multipart::{Form, Part};
use tracing::{error, info};

use crate::detect::{DetectionInput, DetectionResult};
use crate::error::{Error, Result};
use crate::http::{HttpClient, error_message};

/// Detection endpoint, outside the `/plate/api` prefix.
pub const DETECT_PATH: &str = "/plate/detect";

/// Plate detection API.
#[derive(Debug)]
pub struct DetectApi<'a> {
    client: &'a HttpClient,
}

impl<'a> DetectApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Submit one input as a multipart form.
    ///
    /// The endpoint reports recognition failures in-band
    /// (`success: false`); only responses that are not a detection result at
    /// all become [`Error::Request`].
    pub async fn submit(&self, input: &DetectionInput) -> Result<DetectionResult> {
        let form = match input {
            DetectionInput::File(image) => Form::new().part(
                input.field_name(),
                Part::bytes(image.bytes.clone())
                    .file_name(image.name.clone())
                    .mime_str(&image.mime)?,
            ),
            DetectionInput::Capture(data_url) => {
                Form::new().text(input.field_name(), data_url.clone())
            }
            DetectionInput::Manual(plate) => Form::new().text(input.field_name(), plate.clone()),
        };

        let response = self
            .client
            .raw()
            .post(self.client.url(DETECT_PATH)?)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                error!(name: "detect.request.failed", field = input.field_name(), error = %e, "Detection request failed");
                Error::Network(e)
            })?;

        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<DetectionResult>(&body) {
            Ok(result) => {
                info!(
                    name: "detect.completed",
                    field = input.field_name(),
                    success = result.success,
                    plates = result.plates.len(),
                    "Detection completed"
                );
                Ok(result)
            }
            Err(_) if !status.is_success() => Err(Error::Request {
                status: status.as_u16(),
                message: error_message(status, &body),
            }),
            Err(e) => Err(Error::Json(e)),
        }
    }
}
