//! Toasts and the loading overlay.

use std::future::Future;
use std::time::{Duration, Instant};

use tracing::{debug, error};
use uuid::Uuid;

use crate::error::{Error, Result};

/// How long a toast stays up unless told otherwise.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_secs(5);
/// Overlay text when no message is given.
pub const DEFAULT_LOADING_MESSAGE: &str = "Loading...";

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

impl ToastKind {
    /// Font Awesome icon for the kind.
    #[must_use]
    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "fa-check-circle",
            Self::Error => "fa-exclamation-circle",
            Self::Warning => "fa-exclamation-triangle",
            Self::Info => "fa-info-circle",
        }
    }
}

/// A visible toast.
#[derive(Debug, Clone)]
pub struct Toast {
    pub id: Uuid,
    pub kind: ToastKind,
    pub message: String,
    shown_at: Instant,
    duration: Duration,
}

impl Toast {
    /// Whether the toast should be gone at `now`.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.duration
    }
}

/// Toast stack, oldest first.
#[derive(Debug, Clone)]
pub struct Toasts {
    items: Vec<Toast>,
    default_duration: Duration,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl Toasts {
    /// Empty stack with a default lifetime for new toasts.
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            items: Vec::new(),
            default_duration,
        }
    }

    /// Show a toast for `duration` (or the default).
    pub fn show(
        &mut self,
        kind: ToastKind,
        message: impl Into<String>,
        duration: Option<Duration>,
    ) -> Uuid {
        let toast = Toast {
            id: Uuid::new_v4(),
            kind,
            message: message.into(),
            shown_at: Instant::now(),
            duration: duration.unwrap_or(self.default_duration),
        };
        debug!(name: "toast.shown", kind = ?toast.kind, message = %toast.message, "Toast shown");
        let id = toast.id;
        self.items.push(toast);
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.show(ToastKind::Success, message, None)
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.show(ToastKind::Error, message, None)
    }

    pub fn warning(&mut self, message: impl Into<String>) -> Uuid {
        self.show(ToastKind::Warning, message, None)
    }

    pub fn info(&mut self, message: impl Into<String>) -> Uuid {
        self.show(ToastKind::Info, message, None)
    }

    /// Close button. Returns whether the toast was still up.
    pub fn dismiss(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|t| t.id != id);
        self.items.len() != before
    }

    /// Drop toasts whose time is up.
    pub fn expire(&mut self, now: Instant) {
        self.items.retain(|t| !t.is_expired(now));
    }

    /// Visible toasts.
    #[must_use]
    pub fn visible(&self) -> &[Toast] {
        &self.items
    }

    /// Remove and return every toast.
    pub fn drain(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.items)
    }
}

/// Full-page loading overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingOverlay {
    visible: bool,
    message: String,
}

impl LoadingOverlay {
    /// Show with a message, or the default text.
    pub fn show(&mut self, message: Option<&str>) {
        self.message = message.unwrap_or(DEFAULT_LOADING_MESSAGE).to_string();
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Show the overlay until the returned guard is dropped.
    #[must_use]
    pub fn scoped(&mut self, message: Option<&str>) -> OverlayScope<'_> {
        self.show(message);
        OverlayScope { overlay: self }
    }
}

/// Hides its overlay when dropped.
#[derive(Debug)]
pub struct OverlayScope<'a> {
    overlay: &'a mut LoadingOverlay,
}

impl Drop for OverlayScope<'_> {
    fn drop(&mut self) {
        self.overlay.hide();
    }
}

/// Holds a busy flag up while an action runs.
///
/// The flag drops back to `false` when the guard goes away, including when
/// the future holding it is cancelled mid-request.
#[derive(Debug)]
pub struct InFlight<'a> {
    flag: &'a mut bool,
}

impl<'a> InFlight<'a> {
    #[must_use]
    pub fn enter(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// Feedback primitives a page shares.
#[derive(Debug, Clone, Default)]
pub struct Feedback {
    pub toasts: Toasts,
    pub loading: LoadingOverlay,
}

impl Feedback {
    /// Feedback whose toasts last `toast_duration`.
    #[must_use]
    pub fn new(toast_duration: Duration) -> Self {
        Self {
            toasts: Toasts::new(toast_duration),
            loading: LoadingOverlay::default(),
        }
    }
}

/// Error toast for a failed API call.
///
/// A 401 is already being handled by a redirect, so it produces no toast.
pub fn report_error(toasts: &mut Toasts, err: &Error, default_message: &str) {
    if err.is_session_expired() {
        return;
    }
    error!(name: "ui.api.error", error = %err, "API error");
    let message = err.to_string();
    if message.is_empty() {
        toasts.error(default_message);
    } else {
        toasts.error(message);
    }
}

/// Run a form submission with the overlay up, then toast the outcome.
///
/// The overlay is hidden on every exit path, including cancellation.
pub async fn submit_with_feedback<T, F>(
    feedback: &mut Feedback,
    success_message: &str,
    action: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let outcome = {
        let _overlay = feedback.loading.scoped(Some("Processing..."));
        action.await
    };
    match &outcome {
        Ok(_) => {
            feedback.toasts.success(success_message);
        }
        Err(e) => report_error(&mut feedback.toasts, e, "An error occurred"),
    }
    outcome
}
