//! Sign-in page.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::feedback::InFlight;
use crate::session::{AuthService, LoginResult, Profile};
use crate::storage::{KeyValueStore, REMEMBERED_USERNAME_KEY};

/// Inline message under the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Error(String),
    Success(String),
}

/// Form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub remember_me: bool,
    pub password_visible: bool,
}

/// Result of a submit.
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Signed in; navigation to `landing` has been requested.
    LoggedIn { profile: Profile, landing: String },
    /// Server refused; the banner holds the message.
    Rejected(String),
    /// A field was empty; nothing was sent.
    Invalid,
    /// A login request is already in flight; this submit was ignored.
    Busy,
}

/// Sign-in form controller.
#[derive(Debug)]
pub struct LoginController {
    auth: AuthService,
    prefs: Arc<dyn KeyValueStore>,
    redirect_delay: Duration,
    pub form: LoginForm,
    banner: Option<Banner>,
    in_flight: bool,
}

impl LoginController {
    /// Load the page, pre-filling a remembered username.
    pub fn new(auth: AuthService) -> Self {
        let prefs = Arc::clone(auth.session().storage());
        let mut form = LoginForm::default();
        if let Some(username) = prefs.get(REMEMBERED_USERNAME_KEY) {
            form.username = username;
            form.remember_me = true;
        }
        Self {
            auth,
            prefs,
            redirect_delay: Duration::from_secs(1),
            form,
            banner: None,
            in_flight: false,
        }
    }

    /// Pause between the success banner and the redirect.
    #[must_use]
    pub fn with_redirect_delay(mut self, delay: Duration) -> Self {
        self.redirect_delay = delay;
        self
    }

    /// Send an already signed-in user straight to their dashboard.
    ///
    /// Returns whether a redirect happened.
    pub fn init(&self) -> bool {
        if !self.auth.session().is_authenticated() {
            return false;
        }
        self.auth
            .client()
            .navigator()
            .navigate(self.auth.redirect_target());
        true
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    /// Inputs and the button are disabled while a login is in flight.
    pub fn inputs_disabled(&self) -> bool {
        self.in_flight
    }

    pub fn toggle_password_visibility(&mut self) {
        self.form.password_visible = !self.form.password_visible;
    }

    /// Demo-account shortcut.
    pub fn fill_credentials(&mut self, username: &str, password: &str) {
        self.form.username = username.to_string();
        self.form.password = password.to_string();
    }

    /// Submit the form.
    pub async fn submit(&mut self) -> LoginOutcome {
        if self.in_flight {
            return LoginOutcome::Busy;
        }
        self.banner = None;

        let username = self.form.username.trim().to_string();
        let password = self.form.password.clone();
        if username.is_empty() || password.is_empty() {
            self.banner = Some(Banner::Error(
                "Please enter both username and password".to_string(),
            ));
            return LoginOutcome::Invalid;
        }

        let result = {
            let _busy = InFlight::enter(&mut self.in_flight);
            self.auth.login(&username, &password).await
        };

        match result {
            LoginResult::Success(profile) => {
                self.remember(&username);
                self.banner = Some(Banner::Success(
                    "Login successful! Redirecting...".to_string(),
                ));
                if !self.redirect_delay.is_zero() {
                    let _busy = InFlight::enter(&mut self.in_flight);
                    tokio::time::sleep(self.redirect_delay).await;
                }
                let landing = self.auth.redirect_target().to_string();
                self.auth.client().navigator().navigate(&landing);
                LoginOutcome::LoggedIn { profile, landing }
            }
            LoginResult::Failure(message) => {
                let message = if message.is_empty() {
                    "Invalid username or password".to_string()
                } else {
                    message
                };
                self.banner = Some(Banner::Error(message.clone()));
                LoginOutcome::Rejected(message)
            }
        }
    }

    fn remember(&self, username: &str) {
        let outcome = if self.form.remember_me {
            self.prefs.set(REMEMBERED_USERNAME_KEY, username)
        } else {
            self.prefs.remove(REMEMBERED_USERNAME_KEY)
        };
        match outcome {
            Ok(()) => debug!(name: "ui.login.remembered", remember = self.form.remember_me, "Username preference saved"),
            Err(e) => warn!(name: "ui.login.remember_failed", error = %e, "Failed to save username preference"),
        }
    }
}
