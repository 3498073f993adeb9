mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use serde_json::json;

use common::Harness;
use plate_console::Error;
use plate_console::detect::{
    CAMERA_DENIED_MESSAGE, CameraDevice, CameraState, DetectionWorkflow, ImageFile, InputMode,
    MISSING_INPUT_MESSAGE, REQUEST_FAILED_MESSAGE, ResultsView, StillImageCamera,
};
use plate_console::session::{Profile, Role};

const DETECT: &str = "/plate/detect";

fn workflow(h: &Harness, camera: &StillImageCamera) -> DetectionWorkflow {
    let device: Arc<dyn CameraDevice> = Arc::new(camera.clone());
    DetectionWorkflow::new(h.api(), device)
}

fn plate_response() -> serde_json::Value {
    json!({
        "success": true,
        "source": "manual",
        "plates": [{
            "text": "ABC123",
            "confidence": 92,
            "vehicle_info": {
                "year": 2019,
                "make": "Toyota",
                "model": "Corolla",
                "color": "Blue",
                "status": "active",
                "owner": {
                    "name": "Jane Doe",
                    "email": "jane@example.com",
                    "phone": null,
                    "city": "Austin",
                    "state": "TX"
                }
            }
        }]
    })
}

#[tokio::test]
async fn test_manual_entry_is_trimmed_and_rendered() {
    let h = Harness::start().await;
    h.server.respond(Method::POST, DETECT, 200, &plate_response());
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Manual);
    page.set_manual_text("  ABC123 ");
    let view = page.submit().await.unwrap().clone();

    let ResultsView::Plates { source, cards } = &view else {
        panic!("expected plates, got {view:?}");
    };
    assert_eq!(source, "manual");
    assert_eq!(cards[0].confidence, "Confidence: 92%");
    let vehicle = cards[0].vehicle.as_ref().unwrap();
    assert_eq!(vehicle.description, "2019 Toyota Corolla Blue");
    assert_eq!(vehicle.owner.location.as_deref(), Some("Austin, TX"));
    assert!(vehicle.owner.phone.is_none());
    assert!(view.to_string().starts_with("Source: manual"));

    let sent = &h.server.requests_to(DETECT)[0];
    let body = sent.body_text();
    assert!(
        sent.header("content-type")
            .is_some_and(|ct| ct.starts_with("multipart/form-data"))
    );
    assert!(body.contains(r#"name="manual_plate""#));
    assert!(body.contains("\r\n\r\nABC123\r\n"));
    assert!(!body.contains(r#"name="file""#));
    assert!(!body.contains(r#"name="image_data""#));
}

#[tokio::test]
async fn test_detection_is_sent_without_credentials() {
    let h = Harness::start().await;
    h.session()
        .set_session("tok-x", &Profile::with_role(Role::Officer))
        .unwrap();
    h.server.respond(Method::POST, DETECT, 200, &plate_response());
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Manual);
    page.set_manual_text("ABC123");
    page.submit().await.unwrap();

    assert!(h.server.requests_to(DETECT)[0].header("authorization").is_none());
}

#[tokio::test]
async fn test_upload_sends_file_part() {
    let h = Harness::start().await;
    h.server.respond(
        Method::POST,
        DETECT,
        200,
        &json!({ "success": true, "source": "upload", "plates": [] }),
    );
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    let preview = page
        .select_file(ImageFile::with_mime("car.jpg", "image/jpeg", vec![0xFF, 0xD8, 0xFF]))
        .to_string();
    assert!(preview.starts_with("data:image/jpeg;base64,"));

    let view = page.submit().await.unwrap();
    assert_eq!(view, &ResultsView::Empty);
    assert_eq!(view.to_string(), "No license plates detected");

    let body = h.server.requests_to(DETECT)[0].body_text();
    assert!(body.contains(r#"name="file""#));
    assert!(body.contains(r#"filename="car.jpg""#));
    assert!(body.contains("image/jpeg"));
    assert!(!body.contains(r#"name="manual_plate""#));
}

#[tokio::test]
async fn test_dropped_non_image_is_ignored() {
    let h = Harness::start().await;
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    let dropped = page.drop_file(ImageFile::with_mime("notes.txt", "text/plain", b"hi".to_vec()));

    assert!(dropped.is_err());
    assert!(page.upload().is_none());
    assert!(page.preview().is_none());
}

#[tokio::test]
async fn test_camera_capture_sends_image_data_and_releases_camera() {
    let h = Harness::start().await;
    h.server.respond(
        Method::POST,
        DETECT,
        200,
        &json!({ "success": true, "source": "camera", "plates": null }),
    );
    let mut still = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
    still.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    let camera = StillImageCamera::new(still.path());
    let mut page = workflow(&h, &camera);

    page.switch_mode(InputMode::Camera);
    page.start_camera().await.unwrap();
    assert_eq!(page.camera_state(), CameraState::Streaming);
    assert_eq!(camera.live_tracks(), 1);

    let snapshot = page.capture().await.unwrap();
    assert!(snapshot.starts_with("data:image/jpeg;base64,"));
    assert_eq!(page.camera_state(), CameraState::Captured);
    assert_eq!(camera.live_tracks(), 0);

    page.submit().await.unwrap();
    let body = h.server.requests_to(DETECT)[0].body_text();
    assert!(body.contains(r#"name="image_data""#));
    assert!(body.contains(&snapshot));

    page.retake();
    assert_eq!(page.camera_state(), CameraState::Idle);
    assert!(page.captured().is_none());
    page.start_camera().await.unwrap();
    assert_eq!(camera.live_tracks(), 1);

    page.switch_mode(InputMode::Upload);
    assert_eq!(page.camera_state(), CameraState::Idle);
    assert_eq!(camera.live_tracks(), 0);
}

#[tokio::test]
async fn test_camera_denied_shows_alert() {
    let h = Harness::start().await;
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Camera);
    let err = page.start_camera().await.unwrap_err();

    assert!(matches!(err, Error::MediaAccess(_)));
    assert_eq!(page.alert(), Some(CAMERA_DENIED_MESSAGE));
    assert_eq!(page.camera_state(), CameraState::Idle);
}

#[tokio::test]
async fn test_missing_input_sends_nothing() {
    let h = Harness::start().await;
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Manual);
    page.set_manual_text("   ");
    let err = page.submit().await.unwrap_err();

    assert!(matches!(err, Error::Input(_)));
    assert_eq!(page.alert(), Some(MISSING_INPUT_MESSAGE));
    assert!(h.server.requests().is_empty());

    page.switch_mode(InputMode::Camera);
    assert!(page.submit().await.is_err());
    assert!(h.server.requests().is_empty());
    assert!(page.can_submit());
}

#[tokio::test]
async fn test_server_reported_failure_is_rendered() {
    let h = Harness::start().await;
    h.server.respond(
        Method::POST,
        DETECT,
        200,
        &json!({ "success": false, "error": "Image too dark" }),
    );
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Manual);
    page.set_manual_text("ABC123");
    let view = page.submit().await.unwrap();

    assert_eq!(view.to_string(), "Error: Image too dark");
    assert!(page.alert().is_none());
}

#[tokio::test]
async fn test_unreadable_response_alerts_and_reenables() {
    let h = Harness::start().await;
    h.server
        .respond_raw(Method::POST, DETECT, 500, "Internal Server Error");
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Manual);
    page.set_manual_text("ABC123");
    let err = page.submit().await.unwrap_err();

    assert!(matches!(err, Error::Request { status: 500, .. }));
    assert_eq!(page.alert(), Some(REQUEST_FAILED_MESSAGE));
    assert!(page.results().is_none());
    assert!(page.can_submit());
}

#[tokio::test]
async fn test_abandoned_submit_reenables_detect() {
    let h = Harness::start().await;
    h.server.stall(Method::POST, DETECT);
    let mut page = workflow(&h, &StillImageCamera::unavailable());

    page.switch_mode(InputMode::Manual);
    page.set_manual_text("ABC123");
    let abandoned = tokio::time::timeout(Duration::from_millis(200), page.submit()).await;

    assert!(abandoned.is_err());
    assert!(page.can_submit());

    h.server.respond(Method::POST, DETECT, 200, &plate_response());
    let view = page.submit().await.unwrap();
    assert!(matches!(view, ResultsView::Plates { .. }));
    assert_eq!(h.server.requests_to(DETECT).len(), 2);
}
