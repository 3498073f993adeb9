//! Per-resource bindings.

use std::fmt::Display;

use serde::Serialize;

use super::Record;
use crate::error::Result;
use crate::http::HttpClient;

#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    status: &'a str,
}

#[derive(Debug, Serialize)]
struct AppealReview<'a> {
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    review_notes: Option<&'a str>,
}

// =============================================================================
// Violations
// =============================================================================

/// Violations API.
#[derive(Debug)]
pub struct ViolationsApi<'a> {
    client: &'a HttpClient,
}

impl<'a> ViolationsApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Record a violation.
    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Record> {
        self.client.post("/violations", data).await
    }

    /// List violations, filtered by query pairs.
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Record> {
        self.client.get("/violations", query).await
    }

    /// Look up a violation by ticket number.
    pub async fn by_ticket(&self, ticket_number: &str) -> Result<Record> {
        self.client
            .get(&format!("/violations/ticket/{ticket_number}"), &[])
            .await
    }

    /// Change a violation's status.
    pub async fn update_status(&self, id: impl Display, status: &str) -> Result<Record> {
        self.client
            .put(&format!("/violations/{id}/status"), &StatusUpdate { status })
            .await
    }
}

// =============================================================================
// Payments
// =============================================================================

/// Payments API.
#[derive(Debug)]
pub struct PaymentsApi<'a> {
    client: &'a HttpClient,
}

impl<'a> PaymentsApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Record a payment.
    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Record> {
        self.client.post("/payments", data).await
    }

    /// List payments.
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Record> {
        self.client.get("/payments", query).await
    }
}

// =============================================================================
// Users
// =============================================================================

/// User accounts API.
#[derive(Debug)]
pub struct UsersApi<'a> {
    client: &'a HttpClient,
}

impl<'a> UsersApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Record> {
        self.client.post("/users", data).await
    }

    pub async fn list(&self) -> Result<Record> {
        self.client.get("/users", &[]).await
    }

    pub async fn update<B: Serialize + ?Sized>(&self, id: impl Display, data: &B) -> Result<Record> {
        self.client.put(&format!("/users/{id}"), data).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<Record> {
        self.client.delete(&format!("/users/{id}")).await
    }

    /// Body shape is whatever the server expects (current/new password).
    pub async fn change_password<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        data: &B,
    ) -> Result<Record> {
        self.client.put(&format!("/users/{id}/password"), data).await
    }
}

// =============================================================================
// Appeals
// =============================================================================

/// Appeals API.
#[derive(Debug)]
pub struct AppealsApi<'a> {
    client: &'a HttpClient,
}

impl<'a> AppealsApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// File an appeal.
    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Record> {
        self.client.post("/appeals", data).await
    }

    /// List appeals.
    pub async fn list(&self, query: &[(&str, &str)]) -> Result<Record> {
        self.client.get("/appeals", query).await
    }

    /// Decide an appeal. `review_notes` is omitted from the body when `None`.
    pub async fn update_status(
        &self,
        id: impl Display,
        status: &str,
        review_notes: Option<&str>,
    ) -> Result<Record> {
        self.client
            .put(
                &format!("/appeals/{id}/status"),
                &AppealReview {
                    status,
                    review_notes,
                },
            )
            .await
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Dashboard statistics API.
#[derive(Debug)]
pub struct DashboardApi<'a> {
    client: &'a HttpClient,
}

impl<'a> DashboardApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Aggregate counters for the dashboard cards.
    pub async fn stats(&self) -> Result<Record> {
        self.client.get("/dashboard/statistics", &[]).await
    }
}

// =============================================================================
// Owners and vehicles
// =============================================================================

/// Vehicle owners API.
#[derive(Debug)]
pub struct OwnersApi<'a> {
    client: &'a HttpClient,
}

impl<'a> OwnersApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Record> {
        self.client.post("/owners", data).await
    }

    pub async fn list(&self) -> Result<Record> {
        self.client.get("/owners", &[]).await
    }
}

/// Vehicles API.
#[derive(Debug)]
pub struct VehiclesApi<'a> {
    client: &'a HttpClient,
}

impl<'a> VehiclesApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn create<B: Serialize + ?Sized>(&self, data: &B) -> Result<Record> {
        self.client.post("/vehicles", data).await
    }

    pub async fn list(&self) -> Result<Record> {
        self.client.get("/vehicles", &[]).await
    }

    /// Registration record for a plate, owner included.
    pub async fn by_plate(&self, plate_number: &str) -> Result<Record> {
        self.client
            .get(&format!("/vehicles/plate/{plate_number}"), &[])
            .await
    }
}

/// Violation type catalogue API.
#[derive(Debug)]
pub struct ViolationTypesApi<'a> {
    client: &'a HttpClient,
}

impl<'a> ViolationTypesApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Record> {
        self.client.get("/violation-types", &[]).await
    }
}

/// Detection history API.
#[derive(Debug)]
pub struct DetectionLogsApi<'a> {
    client: &'a HttpClient,
}

impl<'a> DetectionLogsApi<'a> {
    pub(super) fn new(client: &'a HttpClient) -> Self {
        Self { client }
    }

    /// Most recent detections first.
    pub async fn list(&self, skip: u32, limit: u32) -> Result<Record> {
        let skip = skip.to_string();
        let limit = limit.to_string();
        self.client
            .get(
                "/detection-logs",
                &[("skip", skip.as_str()), ("limit", limit.as_str())],
            )
            .await
    }
}
