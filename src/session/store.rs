//! Bearer token and profile storage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::Result;
use crate::navigation::DEFAULT_LANDING_PAGE;
use crate::storage::{AUTH_TOKEN_KEY, KeyValueStore, USER_DATA_KEY};

/// User role as reported by the server.
///
/// Unknown or missing roles deserialize as [`Role::Unspecified`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum Role {
    SuperAdmin,
    Officer,
    Cashier,
    #[default]
    Unspecified,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Officer => "officer",
            Self::Cashier => "cashier",
            Self::Unspecified => "unspecified",
        }
    }

    /// Dashboard the role lands on after login.
    #[must_use]
    pub fn landing_path(self) -> &'static str {
        match self {
            Self::SuperAdmin => "/plate/admin/dashboard",
            Self::Officer => "/plate/officer/dashboard",
            Self::Cashier => "/plate/cashier/dashboard",
            Self::Unspecified => DEFAULT_LANDING_PAGE,
        }
    }
}

impl From<Option<String>> for Role {
    fn from(value: Option<String>) -> Self {
        match value.as_deref() {
            Some("super_admin") => Self::SuperAdmin,
            Some("officer") => Self::Officer,
            Some("cashier") => Self::Cashier,
            _ => Self::Unspecified,
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Landing path for an optional role; absent roles use the default page.
#[must_use]
pub fn redirect_target(role: Option<Role>) -> &'static str {
    role.unwrap_or_default().landing_path()
}

/// User profile returned by `GET /auth/me`.
///
/// Only `role` is interpreted; every other field is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    /// Profile with only a role set.
    #[must_use]
    pub fn with_role(role: Role) -> Self {
        Self {
            role,
            ..Self::default()
        }
    }

    /// Name to greet the user with: `full_name`, then `username`.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.extra
            .get("full_name")
            .and_then(Value::as_str)
            .or(self.username.as_deref())
    }
}

/// Persistent session: bearer token and profile.
///
/// Cloning is cheap; clones share the underlying storage.
#[derive(Debug, Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Create a session over the given storage.
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// Storage the session lives in. Other client preferences share it.
    #[must_use]
    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    /// Persist token and profile together.
    ///
    /// If the token cannot be written the profile is rolled back, so the
    /// store never holds one without the other.
    pub fn set_session(&self, token: &str, profile: &Profile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.storage.set(USER_DATA_KEY, &json)?;
        if let Err(e) = self.storage.set(AUTH_TOKEN_KEY, token) {
            if let Err(rollback) = self.storage.remove(USER_DATA_KEY) {
                warn!(
                    name: "session.rollback.failed",
                    error = %rollback,
                    "Failed to roll back profile after token write failed"
                );
            }
            return Err(e);
        }
        debug!(name: "session.stored", role = %profile.role, "Session stored");
        Ok(())
    }

    /// Replace the stored profile, keeping the token.
    pub fn update_profile(&self, profile: &Profile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.storage.set(USER_DATA_KEY, &json)
    }

    /// Stored bearer token.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get(AUTH_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Stored profile. An unreadable profile reads as absent.
    #[must_use]
    pub fn profile(&self) -> Option<Profile> {
        let raw = self.storage.get(USER_DATA_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(name: "session.profile.corrupt", error = %e, "Stored profile unreadable");
                None
            }
        }
    }

    /// True iff both token and profile are present.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some() && self.profile().is_some()
    }

    /// Role of the stored profile.
    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.profile().map(|p| p.role)
    }

    /// Landing path for the stored role.
    #[must_use]
    pub fn redirect_target(&self) -> &'static str {
        redirect_target(self.role())
    }

    /// Remove token and profile. Idempotent.
    pub fn clear(&self) -> Result<()> {
        self.storage.remove(AUTH_TOKEN_KEY)?;
        self.storage.remove(USER_DATA_KEY)?;
        debug!(name: "session.cleared", "Session cleared");
        Ok(())
    }
}
