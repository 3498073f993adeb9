//! Page navigation.
//!
//! Controllers never touch a window; they ask a [`Navigator`] to move to a
//! page path. [`History`] records every request and is what the binary and
//! the tests use.

use std::fmt::Debug;
use std::sync::{Mutex, PoisonError};

use tracing::info;

/// Path prefix every page and endpoint lives under.
pub const BASE_PATH: &str = "/plate";
/// Login page.
pub const LOGIN_PAGE: &str = "/plate/login";
/// Page shown when the role is not allowed.
pub const UNAUTHORIZED_PAGE: &str = "/plate/unauthorized";
/// Landing page for profiles without a known role.
pub const DEFAULT_LANDING_PAGE: &str = "/plate/";

/// Something that can move the user to another page.
pub trait Navigator: Send + Sync + Debug {
    /// Request navigation to `path`.
    fn navigate(&self, path: &str);
}

/// Navigator that records requested paths.
#[derive(Debug, Default)]
pub struct History {
    visited: Mutex<Vec<String>>,
}

impl History {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recent navigation target, if any.
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }

    /// All navigation targets, oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn navigate(&self, path: &str) {
        info!(name: "navigation.requested", path = %path, "Navigating");
        self.visited
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_string());
    }
}
