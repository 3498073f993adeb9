//! Plate Console
//!
//! Client library and terminal console for the license-plate violation
//! management system. The server does recognition and persistence; this crate
//! owns the session, the REST bindings and the page controllers.
//!
//! # Architecture
//!
//! - **Storage**: [`storage::KeyValueStore`] with in-memory and file backends
//! - **Session**: bearer token + profile persistence and the auth flows
//! - **HTTP**: [`http::HttpClient`], auth headers and 401 handling
//! - **API**: one accessor per server resource plus plate detection
//! - **Detection**: upload / camera / manual workflow and result rendering
//! - **UI**: login and dashboard view-models, toasts, loading overlay
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use plate_console::api::Api;
//! use plate_console::http::HttpClient;
//! use plate_console::navigation::History;
//! use plate_console::session::{AuthService, SessionStore};
//! use plate_console::storage::MemoryStore;
//!
//! # async fn example() -> plate_console::Result<()> {
//! let session = SessionStore::new(Arc::new(MemoryStore::new()));
//! let client = HttpClient::new("http://127.0.0.1:8000", session, Arc::new(History::new()))?;
//! let auth = AuthService::new(client.clone());
//!
//! if auth.login("officer1", "secret").await.is_success() {
//!     let stats = Api::new(client).dashboard().stats().await?;
//!     println!("{stats}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod detect;
pub mod error;
pub mod http;
pub mod navigation;
pub mod session;
pub mod storage;
pub mod ui;

pub use error::{Error, Result};
