// Engine thresholds and tunables.
//
// Loaded once at process start (see zamdash-config) and immutable for
// the life of the process. Ids are deployment-specific: the defaults
// match a stock Zammad install but every one of them can be overridden.

use std::time::Duration;

/// Thresholds and ids driving classification, aggregation, and caching.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Tickets whose SLA deadline is within this window count as at-risk.
    pub sla_warning_threshold: chrono::Duration,

    /// Priority id designating the highest tier ("P1").
    pub p1_priority_id: u32,

    /// State id designating closed tickets.
    pub closed_state_id: u32,

    /// State ids designating on-hold / awaiting tickets
    /// (on-hold, pending reminder, pending close).
    pub hold_state_ids: Vec<u32>,

    /// State names used in the server-side open-ticket search.
    pub open_states: Vec<String>,

    /// Tickets open longer than this land in the aging backlog.
    pub aged_after: chrono::Duration,

    /// Maximum results requested per search.
    pub search_limit: usize,

    /// Bound on each individual remote fetch within one aggregation pass.
    pub fetch_timeout: Duration,

    /// Snapshot cache time-to-live.
    pub cache_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sla_warning_threshold: chrono::Duration::minutes(60),
            p1_priority_id: 1,
            closed_state_id: 4,
            hold_state_ids: vec![3, 6, 7],
            open_states: vec!["new".into(), "open".into(), "pending".into()],
            aged_after: chrono::Duration::hours(48),
            search_limit: 1000,
            fetch_timeout: Duration::from_secs(15),
            cache_ttl: Duration::from_secs(30),
        }
    }
}
