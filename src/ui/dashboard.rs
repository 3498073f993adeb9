//! Dashboard chrome: sidebar, user menu, navigation highlighting.

use std::sync::Arc;

use tracing::debug;

use super::feedback::Feedback;
use crate::error::Result;
use crate::storage::{KeyValueStore, SIDEBAR_COLLAPSED_KEY};

/// Viewports at or below this width use the mobile sidebar.
pub const MOBILE_BREAKPOINT: u32 = 768;

/// Sidebar navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

impl NavLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
        }
    }
}

/// Where a click landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// The hamburger button.
    MenuToggle,
    /// The user menu button.
    UserMenuToggle,
    /// Inside the sidebar.
    Sidebar,
    /// Anywhere else.
    Elsewhere,
}

/// Chrome shared by every dashboard page.
#[derive(Debug)]
pub struct DashboardChrome {
    prefs: Arc<dyn KeyValueStore>,
    sidebar_collapsed: bool,
    mobile: bool,
    mobile_open: bool,
    user_menu_open: bool,
    nav: Vec<NavLink>,
    current_path: String,
    pub feedback: Feedback,
}

impl DashboardChrome {
    /// Build the chrome for a page load, restoring the sidebar preference.
    pub fn load(
        prefs: Arc<dyn KeyValueStore>,
        current_path: impl Into<String>,
        nav: Vec<NavLink>,
        viewport_width: u32,
    ) -> Self {
        let sidebar_collapsed = prefs
            .get(SIDEBAR_COLLAPSED_KEY)
            .is_some_and(|v| v == "true");
        Self {
            prefs,
            sidebar_collapsed,
            mobile: viewport_width <= MOBILE_BREAKPOINT,
            mobile_open: false,
            user_menu_open: false,
            nav,
            current_path: current_path.into(),
            feedback: Feedback::default(),
        }
    }

    /// Replace the feedback primitives (e.g. with a configured toast lifetime).
    #[must_use]
    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Sidebar
    // ─────────────────────────────────────────────────────────────────────────

    /// Collapse or expand the sidebar and remember the choice.
    pub fn toggle_sidebar(&mut self) -> Result<bool> {
        self.sidebar_collapsed = !self.sidebar_collapsed;
        self.prefs.set(
            SIDEBAR_COLLAPSED_KEY,
            if self.sidebar_collapsed { "true" } else { "false" },
        )?;
        debug!(name: "ui.sidebar.toggled", collapsed = self.sidebar_collapsed, "Sidebar toggled");
        Ok(self.sidebar_collapsed)
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        self.sidebar_collapsed
    }

    pub fn is_mobile(&self) -> bool {
        self.mobile
    }

    /// Slide the sidebar in on mobile.
    pub fn open_mobile_sidebar(&mut self) {
        if self.mobile {
            self.mobile_open = true;
        }
    }

    pub fn is_mobile_sidebar_open(&self) -> bool {
        self.mobile_open
    }

    // ─────────────────────────────────────────────────────────────────────────
    // User menu
    // ─────────────────────────────────────────────────────────────────────────

    pub fn toggle_user_menu(&mut self) {
        self.user_menu_open = !self.user_menu_open;
    }

    pub fn is_user_menu_open(&self) -> bool {
        self.user_menu_open
    }

    /// Route a document click.
    ///
    /// The user menu button toggles the dropdown and nothing else; every other
    /// click closes it. On mobile, clicks outside the sidebar and its toggle
    /// close the sidebar.
    pub fn click(&mut self, target: ClickTarget) -> Result<()> {
        if target == ClickTarget::UserMenuToggle {
            self.toggle_user_menu();
            return Ok(());
        }

        self.user_menu_open = false;
        if self.mobile && target == ClickTarget::Elsewhere {
            self.mobile_open = false;
        }
        if target == ClickTarget::MenuToggle {
            self.toggle_sidebar()?;
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn nav_links(&self) -> &[NavLink] {
        &self.nav
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    /// Whether a link points at the current page.
    pub fn is_active(&self, link: &NavLink) -> bool {
        link.href == self.current_path
    }

    /// Links highlighted for the current page.
    pub fn active_links(&self) -> impl Iterator<Item = &NavLink> {
        self.nav.iter().filter(|link| self.is_active(link))
    }
}
