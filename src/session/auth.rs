//! Login, logout and route guards.

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::store::{Profile, Role, SessionStore};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::navigation::{LOGIN_PAGE, UNAUTHORIZED_PAGE};

/// Outcome of [`AuthService::login`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoginResult {
    /// Credentials accepted; the profile has been persisted.
    Success(Profile),
    /// Login failed; nothing was persisted.
    Failure(String),
}

impl LoginResult {
    /// Whether the login succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Authentication flows over an [`HttpClient`] and its session.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: HttpClient,
}

impl AuthService {
    /// Create the service.
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Session the service manages.
    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    /// Client the service talks through.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    /// Exchange credentials for a token, fetch the profile, persist both.
    ///
    /// Never fails: every error is folded into [`LoginResult::Failure`].
    pub async fn login(&self, username: &str, password: &str) -> LoginResult {
        match self.try_login(username, password).await {
            Ok(profile) => {
                info!(name: "auth.login.succeeded", username = %username, role = %profile.role, "Login succeeded");
                LoginResult::Success(profile)
            }
            Err(e) => {
                warn!(name: "auth.login.failed", username = %username, error = %e, "Login failed");
                let message = match e {
                    Error::Auth(message) => message,
                    other => other.to_string(),
                };
                LoginResult::Failure(message)
            }
        }
    }

    async fn try_login(&self, username: &str, password: &str) -> Result<Profile> {
        let response = self
            .client
            .raw()
            .post(self.client.api_url("/auth/login")?)
            .form(&[
                ("username", username),
                ("password", password),
                ("grant_type", "password"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|json| json.get("detail").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| "Login failed".to_string());
            return Err(Error::Auth(message));
        }

        let token: TokenResponse = response.json().await?;
        let profile = self
            .fetch_profile(&token.access_token)
            .await?
            .ok_or_else(|| Error::Auth("Failed to get user information".into()))?;

        self.session().set_session(&token.access_token, &profile)?;
        Ok(profile)
    }

    /// `GET /auth/me`. `Ok(None)` when the server rejects the token.
    async fn fetch_profile(&self, token: &str) -> Result<Option<Profile>> {
        let response = self
            .client
            .raw()
            .get(self.client.api_url("/auth/me")?)
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }
        Ok(Some(response.json().await?))
    }

    /// Tell the server (best effort), clear the session, go to the login page.
    pub async fn logout(&self) {
        if let Some(token) = self.session().token() {
            if let Err(e) = self.notify_logout(&token).await {
                warn!(name: "auth.logout.failed", error = %e, "Logout notification failed");
            }
        }
        if let Err(e) = self.session().clear() {
            warn!(name: "session.clear.failed", error = %e, "Failed to clear session");
        }
        info!(name: "auth.logout.completed", "Logged out");
        self.client.navigator().navigate(LOGIN_PAGE);
    }

    async fn notify_logout(&self, token: &str) -> Result<()> {
        self.client
            .raw()
            .post(self.client.api_url("/auth/logout")?)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Revalidate the stored token and refresh the stored profile.
    ///
    /// Without a token this returns `false` without contacting the server.
    /// A rejected token or an unreachable server clears the session.
    pub async fn check_auth(&self) -> bool {
        let Some(token) = self.session().token() else {
            return false;
        };

        match self.fetch_profile(&token).await {
            Ok(Some(profile)) => {
                if let Err(e) = self.session().update_profile(&profile) {
                    warn!(name: "session.profile.store_failed", error = %e, "Failed to refresh stored profile");
                }
                true
            }
            Ok(None) => {
                info!(name: "auth.token.rejected", "Stored token rejected");
                self.clear_quietly();
                false
            }
            Err(e) => {
                warn!(name: "auth.check.failed", error = %e, "Token check failed");
                self.clear_quietly();
                false
            }
        }
    }

    fn clear_quietly(&self) {
        if let Err(e) = self.session().clear() {
            warn!(name: "session.clear.failed", error = %e, "Failed to clear session");
        }
    }

    /// Landing path for the stored role.
    pub fn redirect_target(&self) -> &'static str {
        self.session().redirect_target()
    }

    /// Guard a page: valid session and, when `allowed_roles` is non-empty,
    /// one of those roles. Navigates to the login or unauthorized page on
    /// refusal.
    pub async fn require_auth(&self, allowed_roles: &[Role]) -> bool {
        if !self.check_auth().await {
            self.client.navigator().navigate(LOGIN_PAGE);
            return false;
        }

        if !allowed_roles.is_empty() {
            let role = self.session().role().unwrap_or_default();
            if !allowed_roles.contains(&role) {
                info!(name: "auth.role.denied", role = %role, "Role not allowed");
                self.client.navigator().navigate(UNAUTHORIZED_PAGE);
                return false;
            }
        }

        true
    }
}
