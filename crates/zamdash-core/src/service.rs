// Dashboard service facade.
//
// The surface offered to presentation layers: cached snapshots, forced
// refresh, and a local liveness check. Construction probes the ticket
// source once -- the engine cannot run without a reachable source, so a
// failed probe aborts startup.

use std::sync::Arc;

use tracing::{info, warn};

use crate::aggregate::MetricsEngine;
use crate::cache::SnapshotCache;
use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::model::{DashboardSnapshot, HealthStatus, NameTable};
use crate::source::TicketSource;

/// Entry point for dashboard consumers.
///
/// Cheaply cloneable; all clones share one snapshot cache.
pub struct DashboardService<S> {
    cache: SnapshotCache<S>,
}

impl<S> Clone for DashboardService<S> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
        }
    }
}

impl<S: TicketSource + 'static> DashboardService<S> {
    /// Verify the source is reachable, then build the engine and cache.
    ///
    /// A failed probe is fatal: returns `CoreError` instead of a service.
    pub async fn connect(
        source: S,
        config: EngineConfig,
        names: NameTable,
    ) -> Result<Self, CoreError> {
        if let Err(e) = source.check_connectivity().await {
            warn!(error = %e, "ticket source connectivity probe failed");
            return Err(e.into());
        }
        info!("connected to ticket source");

        let ttl = config.cache_ttl;
        let engine = MetricsEngine::new(source, config, names);
        Ok(Self {
            cache: SnapshotCache::new(engine, ttl),
        })
    }

    /// Build a service without probing the source (used in tests).
    pub fn with_engine(engine: MetricsEngine<S>) -> Self {
        let ttl = engine.config().cache_ttl;
        Self {
            cache: SnapshotCache::new(engine, ttl),
        }
    }

    /// Current metrics snapshot, served from cache within the TTL.
    pub async fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.cache.get().await
    }

    /// Invalidate the cache and run a fresh aggregation pass.
    pub async fn force_refresh(&self) -> Arc<DashboardSnapshot> {
        self.cache.force_refresh().await
    }

    /// Liveness only: never touches the ticket source.
    pub fn health(&self) -> HealthStatus {
        HealthStatus::healthy()
    }
}
