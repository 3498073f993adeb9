//! Endpoint bindings for the violation management API.
//!
//! Every method is a thin binding of verb + path (+ body shaping) over
//! [`HttpClient`]. Records are opaque JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! # async fn example(api: plate_console::api::Api) -> plate_console::Result<()> {
//! let open = api.violations().list(&[("status", "pending")]).await?;
//! api.appeals().update_status(12, "approved", Some("Signage missing")).await?;
//! # Ok(())
//! # }
//! ```

mod detect;
mod resources;

pub use detect::DetectApi;
pub use resources::{
    AppealsApi, DashboardApi, DetectionLogsApi, OwnersApi, PaymentsApi, UsersApi, VehiclesApi,
    ViolationTypesApi, ViolationsApi,
};

use crate::http::HttpClient;

/// A server record, moved as JSON without interpretation.
pub type Record = serde_json::Value;

/// Resource facade.
#[derive(Debug, Clone)]
pub struct Api {
    client: HttpClient,
}

impl Api {
    /// Wrap a client.
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    /// Underlying client.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Violations.
    pub fn violations(&self) -> ViolationsApi<'_> {
        ViolationsApi::new(&self.client)
    }

    /// Payments.
    pub fn payments(&self) -> PaymentsApi<'_> {
        PaymentsApi::new(&self.client)
    }

    /// User accounts.
    pub fn users(&self) -> UsersApi<'_> {
        UsersApi::new(&self.client)
    }

    /// Appeals.
    pub fn appeals(&self) -> AppealsApi<'_> {
        AppealsApi::new(&self.client)
    }

    /// Dashboard statistics.
    pub fn dashboard(&self) -> DashboardApi<'_> {
        DashboardApi::new(&self.client)
    }

    /// Vehicle owners.
    pub fn owners(&self) -> OwnersApi<'_> {
        OwnersApi::new(&self.client)
    }

    /// Vehicles.
    pub fn vehicles(&self) -> VehiclesApi<'_> {
        VehiclesApi::new(&self.client)
    }

    /// Violation type catalogue.
    pub fn violation_types(&self) -> ViolationTypesApi<'_> {
        ViolationTypesApi::new(&self.client)
    }

    /// Detection history.
    pub fn detection_logs(&self) -> DetectionLogsApi<'_> {
        DetectionLogsApi::new(&self.client)
    }

    /// Plate detection.
    pub fn detection(&self) -> DetectApi<'_> {
        DetectApi::new(&self.client)
    }
}
