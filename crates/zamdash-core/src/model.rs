// Dashboard domain model.
//
// Everything here is an immutable point-in-time value: a `TicketView` is
// built once per aggregation pass and never mutated; a new
// `DashboardSnapshot` supersedes, never updates, the previous one.

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

// ── Name lookup ──────────────────────────────────────────────────────

/// Injected id→name lookup for priorities and states.
///
/// The ids are deployment-specific, so the built-in table is a default,
/// not a contract -- deployments override entries from config. Unknown
/// ids render as `priority {id}` / `state {id}` rather than failing.
#[derive(Debug, Clone)]
pub struct NameTable {
    priorities: HashMap<u32, String>,
    states: HashMap<u32, String>,
}

impl NameTable {
    pub fn new(priorities: HashMap<u32, String>, states: HashMap<u32, String>) -> Self {
        Self { priorities, states }
    }

    pub fn priority_name(&self, id: u32) -> String {
        self.priorities
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("priority {id}"))
    }

    pub fn state_name(&self, id: u32) -> String {
        self.states
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("state {id}"))
    }

    /// Merge override entries on top of this table.
    pub fn with_overrides(
        mut self,
        priorities: HashMap<u32, String>,
        states: HashMap<u32, String>,
    ) -> Self {
        self.priorities.extend(priorities);
        self.states.extend(states);
        self
    }
}

impl Default for NameTable {
    fn default() -> Self {
        let priorities = [(1, "1 high"), (2, "2 normal"), (3, "3 low")]
            .into_iter()
            .map(|(k, v)| (k, v.to_owned()))
            .collect();
        let states = [
            (1, "new"),
            (2, "open"),
            (3, "on hold"),
            (4, "closed"),
            (5, "merged"),
            (6, "pending reminder"),
            (7, "pending close"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_owned()))
        .collect();
        Self { priorities, states }
    }
}

// ── Ticket view ──────────────────────────────────────────────────────

/// A ticket enriched for display: resolved deadline, human time string,
/// and display names for priority and state.
#[derive(Debug, Clone, Serialize)]
pub struct TicketView {
    pub id: u64,
    pub number: String,
    pub title: String,
    /// Earliest applicable escalation deadline, if any.
    pub escalation_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub close_at: Option<DateTime<Utc>>,
    pub priority_id: u32,
    pub priority_name: String,
    pub state_id: u32,
    pub state_name: String,
    /// Bucket-dependent human string: overdue/remaining for SLA buckets,
    /// age for backlog buckets, resolution time for closed tickets.
    pub time_remaining: String,
    pub customer_id: Option<u64>,
    pub group_id: Option<u64>,
    pub owner_id: Option<u64>,
}

// ── Provenance ───────────────────────────────────────────────────────

/// How a metric's value was obtained within one aggregation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricProvenance {
    /// Primary query succeeded.
    Fresh,
    /// Primary query failed or came back empty; a fallback succeeded.
    Fallback,
    /// All attempts failed; the metric contributes zero/empty.
    Degraded,
}

/// Per-fetch provenance for one snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SnapshotProvenance {
    pub open_tickets: MetricProvenance,
    pub today_created: MetricProvenance,
    pub today_closed: MetricProvenance,
    pub yesterday_created: MetricProvenance,
}

// ── Snapshot ─────────────────────────────────────────────────────────

/// One fully-assembled aggregation result.
///
/// Counts and their per-bucket ticket lists are always consistent
/// (count == list length); a ticket may legitimately appear in more
/// than one bucket. Constructed wholesale by one aggregation pass and
/// never partially mutated afterward.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub sla_breaches: usize,
    pub sla_at_risk: usize,
    pub open_p1: usize,
    pub p1_on_hold: usize,
    pub aged_over_48h: usize,
    pub today_created: usize,
    pub today_closed: usize,
    pub yesterday_created: usize,

    /// today − yesterday.
    pub ticket_change: i64,
    /// 0.0 when yesterday is 0, else change/yesterday × 100.
    pub change_percent: f64,

    pub sla_breach_tickets: Vec<TicketView>,
    pub sla_at_risk_tickets: Vec<TicketView>,
    pub p1_tickets: Vec<TicketView>,
    pub p1_on_hold_tickets: Vec<TicketView>,
    pub aged_tickets: Vec<TicketView>,
    pub today_tickets: Vec<TicketView>,
    pub today_closed_tickets: Vec<TicketView>,

    /// Wall-clock capture time, for display only.
    pub last_updated: DateTime<Local>,
    pub provenance: SnapshotProvenance,
}

/// Derived day-over-day change: delta and percent (0.0 when yesterday is 0).
#[allow(clippy::cast_possible_wrap, clippy::cast_precision_loss)]
pub fn change_stats(today: usize, yesterday: usize) -> (i64, f64) {
    let delta = today as i64 - yesterday as i64;
    let percent = if yesterday > 0 {
        delta as f64 / yesterday as f64 * 100.0
    } else {
        0.0
    };
    (delta, percent)
}

// ── Health ───────────────────────────────────────────────────────────

/// Liveness report. Computed locally; never touches the ticket source.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn healthy() -> Self {
        Self {
            status: "healthy",
            timestamp: Utc::now(),
        }
    }
}
