//! Camera capture.
//!
//! The controller owns at most one live [`MediaStream`] and stops it on every
//! way out of streaming: capture (successful or not), retake, reset, drop.

use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tracing::{info, warn};

use super::types::ImageFile;
use crate::error::{Error, Result};

/// One still grabbed from a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Frame {
    /// JPEG still.
    #[must_use]
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            mime: "image/jpeg".to_string(),
            bytes,
        }
    }

    /// `data:` URL as sent in the `image_data` field.
    #[must_use]
    pub fn data_url(&self) -> String {
        ImageFile::with_mime("capture", self.mime.clone(), self.bytes.clone()).data_url()
    }
}

/// A source of video streams.
#[async_trait]
pub trait CameraDevice: Send + Sync + Debug {
    /// Acquire a live stream. Fails with [`Error::MediaAccess`] when the
    /// camera is missing or permission is refused.
    async fn open(&self) -> Result<Box<dyn MediaStream>>;
}

/// A live video stream.
#[async_trait]
pub trait MediaStream: Send + Debug {
    /// Grab the current frame.
    async fn grab_frame(&mut self) -> Result<Frame>;

    /// Stop every track. Idempotent.
    fn stop(&mut self);

    /// Number of tracks still running.
    fn active_tracks(&self) -> usize;
}

/// Camera controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Streaming,
    Captured,
}

/// Camera state machine.
#[derive(Debug)]
pub struct CameraController {
    device: Arc<dyn CameraDevice>,
    stream: Option<Box<dyn MediaStream>>,
    snapshot: Option<String>,
}

impl CameraController {
    /// Controller over a device, idle.
    pub fn new(device: Arc<dyn CameraDevice>) -> Self {
        Self {
            device,
            stream: None,
            snapshot: None,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> CameraState {
        match (&self.stream, &self.snapshot) {
            (Some(_), _) => CameraState::Streaming,
            (None, Some(_)) => CameraState::Captured,
            (None, None) => CameraState::Idle,
        }
    }

    /// Captured still as a data URL.
    #[must_use]
    pub fn snapshot(&self) -> Option<&str> {
        self.snapshot.as_deref()
    }

    /// Idle → streaming. Starting while streaming is a no-op.
    pub async fn start(&mut self) -> Result<()> {
        match self.state() {
            CameraState::Streaming => Ok(()),
            CameraState::Captured => Err(Error::input(
                "Retake the photo before starting the camera again",
            )),
            CameraState::Idle => {
                let stream = self.device.open().await.map_err(|e| match e {
                    Error::MediaAccess(_) => e,
                    other => Error::MediaAccess(other.to_string()),
                })?;
                info!(name: "camera.stream.started", tracks = stream.active_tracks(), "Camera stream started");
                self.stream = Some(stream);
                Ok(())
            }
        }
    }

    /// Streaming → captured. The stream is stopped whether or not the frame
    /// grab succeeds; on failure the controller is idle again.
    pub async fn capture(&mut self) -> Result<String> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(Error::input("Start the camera before capturing"));
        };

        let frame = stream.grab_frame().await;
        self.stop_stream();

        let frame = frame.inspect_err(|e| {
            warn!(name: "camera.capture.failed", error = %e, "Frame capture failed");
        })?;
        let data_url = frame.data_url();
        self.snapshot = Some(data_url.clone());
        info!(name: "camera.captured", bytes = frame.bytes.len(), "Frame captured");
        Ok(data_url)
    }

    /// Captured → idle: discard the still so the camera can start again.
    pub fn retake(&mut self) {
        self.snapshot = None;
        self.stop_stream();
    }

    /// Any → idle.
    pub fn reset(&mut self) {
        self.stop_stream();
        self.snapshot = None;
    }

    fn stop_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            info!(name: "camera.stream.stopped", "Camera stream stopped");
        }
    }
}

impl Drop for CameraController {
    fn drop(&mut self) {
        self.stop_stream();
    }
}

/// Device whose every frame is the same image file.
///
/// Lets the console run the camera flow on machines without a camera, and
/// reports how many of its tracks are live.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    source: Option<PathBuf>,
    live_tracks: Arc<AtomicUsize>,
}

impl StillImageCamera {
    /// Device serving frames from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            source: Some(path.into()),
            live_tracks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Device that is never available.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            source: None,
            live_tracks: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Tracks opened by this device and not yet stopped.
    #[must_use]
    pub fn live_tracks(&self) -> usize {
        self.live_tracks.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CameraDevice for StillImageCamera {
    async fn open(&self) -> Result<Box<dyn MediaStream>> {
        let Some(path) = &self.source else {
            return Err(Error::MediaAccess("no camera device available".into()));
        };
        let image = ImageFile::read(path)
            .await
            .map_err(|e| Error::MediaAccess(e.to_string()))?;
        if !image.is_image() {
            return Err(Error::MediaAccess(format!(
                "{} is not an image",
                path.display()
            )));
        }
        self.live_tracks.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StillImageStream {
            frame: Frame {
                mime: image.mime,
                bytes: image.bytes,
            },
            live_tracks: Arc::clone(&self.live_tracks),
            live: true,
        }))
    }
}

#[derive(Debug)]
struct StillImageStream {
    frame: Frame,
    live_tracks: Arc<AtomicUsize>,
    live: bool,
}

#[async_trait]
impl MediaStream for StillImageStream {
    async fn grab_frame(&mut self) -> Result<Frame> {
        if !self.live {
            return Err(Error::MediaAccess("stream already stopped".into()));
        }
        Ok(self.frame.clone())
    }

    fn stop(&mut self) {
        if self.live {
            self.live = false;
            self.live_tracks.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn active_tracks(&self) -> usize {
        usize::from(self.live)
    }
}

impl Drop for StillImageStream {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;

    /// Device that counts live tracks and can be told to fail grabs.
    #[derive(Debug, Default)]
    struct FakeCamera {
        live: Arc<AtomicUsize>,
        fail_grab: Arc<AtomicBool>,
        denied: bool,
    }

    #[derive(Debug)]
    struct FakeStream {
        live: Arc<AtomicUsize>,
        fail_grab: Arc<AtomicBool>,
        running: bool,
    }

    #[async_trait]
    impl CameraDevice for FakeCamera {
        async fn open(&self) -> Result<Box<dyn MediaStream>> {
            if self.denied {
                return Err(Error::MediaAccess("permission denied".into()));
            }
            self.live.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                live: Arc::clone(&self.live),
                fail_grab: Arc::clone(&self.fail_grab),
                running: true,
            }))
        }
    }

    #[async_trait]
    impl MediaStream for FakeStream {
        async fn grab_frame(&mut self) -> Result<Frame> {
            if self.fail_grab.load(Ordering::SeqCst) {
                return Err(Error::MediaAccess("video not ready".into()));
            }
            Ok(Frame::jpeg(vec![0xFF, 0xD8, 0xFF]))
        }

        fn stop(&mut self) {
            if self.running {
                self.running = false;
                self.live.fetch_sub(1, Ordering::SeqCst);
            }
        }

        fn active_tracks(&self) -> usize {
            usize::from(self.running)
        }
    }

    fn controller() -> (CameraController, Arc<AtomicUsize>, Arc<AtomicBool>) {
        let camera = FakeCamera::default();
        let live = Arc::clone(&camera.live);
        let fail = Arc::clone(&camera.fail_grab);
        (CameraController::new(Arc::new(camera)), live, fail)
    }

    #[tokio::test]
    async fn capture_stops_stream_and_retake_allows_restart() {
        let (mut camera, live, _) = controller();
        assert_eq!(camera.state(), CameraState::Idle);

        camera.start().await.unwrap();
        assert_eq!(camera.state(), CameraState::Streaming);
        assert_eq!(live.load(Ordering::SeqCst), 1);

        let data_url = camera.capture().await.unwrap();
        assert!(data_url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(camera.state(), CameraState::Captured);
        assert_eq!(live.load(Ordering::SeqCst), 0);
        assert!(camera.start().await.is_err());

        camera.retake();
        assert_eq!(camera.state(), CameraState::Idle);
        assert!(camera.snapshot().is_none());
        camera.start().await.unwrap();
        assert_eq!(camera.state(), CameraState::Streaming);
    }

    #[tokio::test]
    async fn failed_grab_still_releases_stream() {
        let (mut camera, live, fail) = controller();
        camera.start().await.unwrap();
        fail.store(true, Ordering::SeqCst);

        assert!(camera.capture().await.is_err());
        assert_eq!(camera.state(), CameraState::Idle);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reset_and_drop_release_stream() {
        let (mut camera, live, _) = controller();
        camera.start().await.unwrap();
        camera.reset();
        assert_eq!(live.load(Ordering::SeqCst), 0);

        camera.start().await.unwrap();
        assert_eq!(live.load(Ordering::SeqCst), 1);
        drop(camera);
        assert_eq!(live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn denied_camera_stays_idle() {
        let mut camera = CameraController::new(Arc::new(FakeCamera {
            denied: true,
            ..FakeCamera::default()
        }));
        assert!(matches!(camera.start().await, Err(Error::MediaAccess(_))));
        assert_eq!(camera.state(), CameraState::Idle);
        assert!(matches!(camera.capture().await, Err(Error::Input(_))));
    }

    #[tokio::test]
    async fn still_image_camera_serves_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plate.png");
        std::fs::write(&path, b"\x89PNG").unwrap();

        let device = StillImageCamera::new(&path);
        let mut camera = CameraController::new(Arc::new(device.clone()));
        camera.start().await.unwrap();
        assert_eq!(device.live_tracks(), 1);

        let data_url = camera.capture().await.unwrap();
        assert!(data_url.starts_with("data:image/png;base64,"));
        assert_eq!(device.live_tracks(), 0);

        let mut missing = CameraController::new(Arc::new(StillImageCamera::unavailable()));
        assert!(matches!(missing.start().await, Err(Error::MediaAccess(_))));
    }
}
