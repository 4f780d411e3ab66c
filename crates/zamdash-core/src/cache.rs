// Snapshot cache.
//
// One shared entry guarding the upstream ticket source from per-view
// re-queries. At most one aggregation pass is in flight at a time:
// concurrent misses share the pending result through a `watch` channel,
// and the pass runs on a spawned task so a cancelled caller never
// cancels it for the other waiters. `invalidate` bumps a generation
// counter -- a pass that started before the invalidation still delivers
// its result to its waiters but is not stored.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::debug;

use crate::aggregate::MetricsEngine;
use crate::model::DashboardSnapshot;
use crate::source::TicketSource;

type PendingSnapshot = watch::Receiver<Option<Arc<DashboardSnapshot>>>;

/// Shared, TTL-bounded cache over the aggregation engine.
///
/// Cheaply cloneable; all clones share the same entry.
pub struct SnapshotCache<S> {
    inner: Arc<CacheInner<S>>,
}

impl<S> Clone for SnapshotCache<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CacheInner<S> {
    engine: MetricsEngine<S>,
    ttl: Duration,
    state: Mutex<CacheState>,
}

struct CacheState {
    entry: Option<CacheEntry>,
    inflight: Option<PendingSnapshot>,
    generation: u64,
}

struct CacheEntry {
    snapshot: Arc<DashboardSnapshot>,
    expires_at: Instant,
}

impl<S: TicketSource + 'static> SnapshotCache<S> {
    pub fn new(engine: MetricsEngine<S>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                engine,
                ttl,
                state: Mutex::new(CacheState {
                    entry: None,
                    inflight: None,
                    generation: 0,
                }),
            }),
        }
    }

    /// The engine backing this cache.
    pub fn engine(&self) -> &MetricsEngine<S> {
        &self.inner.engine
    }

    /// Return the cached snapshot, producing a fresh one on miss or expiry.
    pub async fn get(&self) -> Arc<DashboardSnapshot> {
        loop {
            let mut rx = {
                let mut state = self.inner.state.lock().await;
                if let Some(entry) = &state.entry {
                    if entry.expires_at > Instant::now() {
                        debug!("serving cached snapshot");
                        return Arc::clone(&entry.snapshot);
                    }
                }
                match &state.inflight {
                    Some(rx) => rx.clone(),
                    None => self.start_pass(&mut state),
                }
            };

            if let Ok(value) = rx.wait_for(Option::is_some).await {
                if let Some(snapshot) = value.clone() {
                    return snapshot;
                }
            }
            // Producing task went away without a result; start over.
        }
    }

    /// Discard the current entry. The next `get()` recomputes; a pass
    /// already in flight completes for its waiters but is not stored.
    pub async fn invalidate(&self) {
        let mut state = self.inner.state.lock().await;
        state.entry = None;
        state.inflight = None;
        state.generation = state.generation.wrapping_add(1);
        debug!("cache invalidated");
    }

    /// Invalidate and recompute: always triggers a new aggregation pass.
    pub async fn force_refresh(&self) -> Arc<DashboardSnapshot> {
        self.invalidate().await;
        self.get().await
    }

    /// Spawn one aggregation pass and register it as in-flight.
    /// Caller holds the state lock.
    fn start_pass(&self, state: &mut CacheState) -> PendingSnapshot {
        debug!("cache miss, starting aggregation pass");
        let (tx, rx) = watch::channel(None);
        state.inflight = Some(rx.clone());
        let generation = state.generation;
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            let snapshot = Arc::new(inner.engine.produce(Utc::now()).await);
            let mut state = inner.state.lock().await;
            if state.generation == generation {
                state.entry = Some(CacheEntry {
                    snapshot: Arc::clone(&snapshot),
                    expires_at: Instant::now() + inner.ttl,
                });
                state.inflight = None;
            }
            drop(state);
            let _ = tx.send(Some(snapshot));
        });

        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::NaiveDate;
    use zamdash_api::{Error, TicketRecord};

    use crate::config::EngineConfig;
    use crate::model::NameTable;

    /// Source that counts aggregation passes (via the open-ticket search)
    /// and can delay them to simulate slow upstream calls.
    struct CountingSource {
        passes: AtomicUsize,
        delay: Duration,
    }

    impl CountingSource {
        fn new() -> Self {
            Self {
                passes: AtomicUsize::new(0),
                delay: Duration::ZERO,
            }
        }

        fn slow(delay: Duration) -> Self {
            Self {
                passes: AtomicUsize::new(0),
                delay,
            }
        }
    }

    impl TicketSource for CountingSource {
        async fn search_by_states(
            &self,
            _states: &[String],
            _limit: usize,
        ) -> Result<Vec<TicketRecord>, Error> {
            self.passes.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(vec![open_ticket()])
        }

        async fn search_created_between(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
            _limit: usize,
        ) -> Result<Vec<TicketRecord>, Error> {
            Ok(Vec::new())
        }

        async fn search_closed_between(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
            _limit: usize,
        ) -> Result<Vec<TicketRecord>, Error> {
            Ok(Vec::new())
        }

        async fn list_all(&self, _per_page: usize) -> Result<Vec<TicketRecord>, Error> {
            Ok(Vec::new())
        }

        async fn check_connectivity(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    fn open_ticket() -> TicketRecord {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "number": "61001",
            "title": "open ticket",
            "created_at": "2026-08-29T09:00:00Z",
            "priority_id": 2,
            "state_id": 2,
        }))
        .expect("valid ticket json")
    }

    fn cache_with(source: CountingSource, ttl: Duration) -> SnapshotCache<CountingSource> {
        let engine = MetricsEngine::new(source, EngineConfig::default(), NameTable::default());
        SnapshotCache::new(engine, ttl)
    }

    fn passes(cache: &SnapshotCache<CountingSource>) -> usize {
        cache.engine().source().passes.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn second_get_within_ttl_serves_cached_snapshot() {
        let cache = cache_with(CountingSource::new(), Duration::from_secs(30));

        let first = cache.get().await;
        let second = cache.get().await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(passes(&cache), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_triggers_a_new_pass() {
        let cache = cache_with(CountingSource::new(), Duration::from_secs(30));

        cache.get().await;
        tokio::time::advance(Duration::from_secs(31)).await;
        cache.get().await;

        assert_eq!(passes(&cache), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_recompute_on_next_get() {
        let cache = cache_with(CountingSource::new(), Duration::from_secs(30));

        cache.get().await;
        cache.invalidate().await;
        cache.get().await;

        assert_eq!(passes(&cache), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn force_refresh_always_runs_a_new_pass() {
        let cache = cache_with(CountingSource::new(), Duration::from_secs(30));

        cache.get().await;
        let refreshed = cache.force_refresh().await;

        assert_eq!(passes(&cache), 2);
        assert_eq!(refreshed.sla_breaches, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_share_one_pass() {
        let cache = cache_with(
            CountingSource::slow(Duration::from_secs(1)),
            Duration::from_secs(30),
        );

        let (a, b) = tokio::join!(cache.get(), cache.get());

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(passes(&cache), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidation_mid_flight_delivers_but_does_not_store() {
        let cache = cache_with(
            CountingSource::slow(Duration::from_secs(5)),
            Duration::from_secs(30),
        );

        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get().await })
        };
        // Let the waiter register its pass before invalidating.
        tokio::task::yield_now().await;
        cache.invalidate().await;

        let snapshot = waiter.await.expect("waiter completes");
        assert_eq!(snapshot.open_p1, 0);
        assert_eq!(passes(&cache), 1);

        // The delivered result was not cached: the next get recomputes.
        cache.get().await;
        assert_eq!(passes(&cache), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_caller_does_not_cancel_the_pass() {
        let cache = cache_with(
            CountingSource::slow(Duration::from_secs(5)),
            Duration::from_secs(30),
        );

        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get().await })
        };
        tokio::task::yield_now().await;
        waiter.abort();
        let _ = waiter.await;

        // The spawned pass completes and is stored; the next get hits it.
        let snapshot = cache.get().await;
        assert_eq!(snapshot.sla_at_risk, 0);
        assert_eq!(passes(&cache), 1);
    }
}
