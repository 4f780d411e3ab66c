// zamdash-core: Metrics aggregation and SLA-evaluation engine between
// zamdash-api and consumers (CLI, HTTP views).

pub mod agefmt;
pub mod aggregate;
pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod service;
pub mod sla;
pub mod source;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregate::MetricsEngine;
pub use cache::SnapshotCache;
pub use config::EngineConfig;
pub use error::CoreError;
pub use model::{
    DashboardSnapshot, HealthStatus, MetricProvenance, NameTable, SnapshotProvenance, TicketView,
};
pub use service::DashboardService;
pub use sla::SlaStatus;
pub use source::TicketSource;
