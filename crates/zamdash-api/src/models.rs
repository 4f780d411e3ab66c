// Zammad API response types
//
// Models for the Zammad REST API's expanded JSON payloads. Fields use
// `#[serde(default)]` liberally because the API drops or adds fields
// across releases, and custom object attributes show up unannounced.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Ticket ───────────────────────────────────────────────────────────

/// Ticket object from `GET /api/v1/tickets` (with `expand=true`).
///
/// Zammad tickets carry dozens of fields plus arbitrary custom object
/// attributes. We model the ones the dashboard needs explicitly and let
/// everything else land in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketRecord {
    pub id: u64,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub title: String,
    /// Always present: Zammad stamps this at ticket creation.
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_at: Option<DateTime<Utc>>,
    /// Overall SLA escalation deadline; absent when no SLA applies.
    #[serde(default)]
    pub escalation_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub first_response_escalation_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub update_escalation_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub close_escalation_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub priority_id: Option<u32>,
    #[serde(default)]
    pub state_id: Option<u32>,
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(default)]
    pub group_id: Option<u64>,
    #[serde(default)]
    pub owner_id: Option<u64>,
    /// Catch-all for custom object attributes and undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── User ─────────────────────────────────────────────────────────────

/// Current user from `GET /api/v1/users/me` (used as a connectivity probe).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── API error body ───────────────────────────────────────────────────

/// Error body Zammad returns on non-2xx responses.
///
/// ```json
/// { "error": "Invalid BasicAuth credentials", "error_human": "..." }
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_human: Option<String>,
}

impl ApiErrorBody {
    /// Best human-readable message, preferring the verbose variant.
    pub fn message(&self) -> Option<&str> {
        self.error_human.as_deref().or(self.error.as_deref())
    }
}
