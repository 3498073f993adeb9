//! Page controllers.
//!
//! Each controller is a view model: it holds what the page shows as plain
//! data and exposes the user's actions as methods, so pages can be driven
//! from a terminal or a test without a document.
//!
//! - [`login`]: sign-in form
//! - [`dashboard`]: sidebar, user menu and navigation highlighting
//! - [`feedback`]: toasts and the loading overlay shared by every page
//! - [`format`]: money and date display helpers

pub mod dashboard;
pub mod feedback;
pub mod format;
pub mod login;

pub use dashboard::{ClickTarget, DashboardChrome, NavLink};
pub use feedback::{
    Feedback, InFlight, LoadingOverlay, OverlayScope, Toast, ToastKind, Toasts, report_error,
    submit_with_feedback,
};
pub use format::{format_currency, format_date};
pub use login::{Banner, LoginController, LoginForm, LoginOutcome};
