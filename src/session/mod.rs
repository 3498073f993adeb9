//! Session persistence and authentication flows.
//!
//! # Architecture
//!
//! - [`SessionStore`]: bearer token + [`Profile`] over a key-value store
//! - [`AuthService`]: login, logout, token revalidation and route guards
//! - [`Role`]: the closed set of roles and their landing pages
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use plate_console::session::{Profile, Role, SessionStore};
//! use plate_console::storage::MemoryStore;
//!
//! let session = SessionStore::new(Arc::new(MemoryStore::new()));
//! assert!(!session.is_authenticated());
//!
//! session.set_session("token", &Profile::with_role(Role::Officer)).unwrap();
//! assert!(session.is_authenticated());
//! assert_eq!(session.redirect_target(), "/plate/officer/dashboard");
//! ```

mod auth;
mod store;

pub use auth::{AuthService, LoginResult};
pub use store::{Profile, Role, SessionStore, redirect_target};
