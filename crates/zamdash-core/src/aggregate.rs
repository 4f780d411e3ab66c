// Metrics aggregation.
//
// One `produce` call is one full aggregation pass: fetch the open set
// (with fallback), classify, fetch the day-scoped counts, assemble.
// The pass never fails -- every fetch failure is caught, logged, and
// recorded in the snapshot's provenance as degraded-to-zero. The four
// remote fetches are independent and run concurrently, each under a
// bounded timeout so one stalled call cannot hold up the others.

use std::future::Future;

use chrono::{DateTime, Days, Local, NaiveDate, Utc};
use tracing::{debug, error, info, warn};
use zamdash_api::TicketRecord;

use crate::classify::{self, OpenBuckets};
use crate::config::EngineConfig;
use crate::model::{
    DashboardSnapshot, MetricProvenance, NameTable, SnapshotProvenance, TicketView, change_stats,
};
use crate::source::TicketSource;

/// The aggregation engine: one ticket source plus the configured
/// thresholds and name lookups.
pub struct MetricsEngine<S> {
    source: S,
    config: EngineConfig,
    names: NameTable,
}

impl<S: TicketSource> MetricsEngine<S> {
    pub fn new(source: S, config: EngineConfig, names: NameTable) -> Self {
        Self {
            source,
            config,
            names,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run one full aggregation pass as of `now`.
    ///
    /// Infallible by design: a snapshot with all-zero fields and a fresh
    /// `last_updated` is the legitimate output for "could not determine
    /// metrics this cycle".
    pub async fn produce(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        debug!("starting aggregation pass");

        // Day windows use the local calendar day of the capture instant.
        let today = now.with_timezone(&Local).date_naive();
        let tomorrow = today + Days::new(1);
        let yesterday = today - Days::new(1);

        let (open, created, closed, prior) = tokio::join!(
            self.fetch_open(),
            self.fetch_today_created(today, tomorrow, now),
            self.fetch_today_closed(today, tomorrow),
            self.fetch_yesterday_count(yesterday, today),
        );

        let (open_tickets, open_prov) = open;
        let (today_tickets, today_prov) = created;
        let (today_closed_tickets, closed_prov) = closed;
        let (yesterday_created, yesterday_prov) = prior;

        let OpenBuckets {
            sla_breach,
            sla_at_risk,
            p1,
            p1_on_hold,
            aged,
        } = classify::classify_open(&open_tickets, &self.config, &self.names, now);

        let (ticket_change, change_percent) =
            change_stats(today_tickets.len(), yesterday_created);

        info!(
            breaches = sla_breach.len(),
            at_risk = sla_at_risk.len(),
            p1 = p1.len(),
            aged = aged.len(),
            today = today_tickets.len(),
            "aggregation pass complete"
        );

        DashboardSnapshot {
            sla_breaches: sla_breach.len(),
            sla_at_risk: sla_at_risk.len(),
            open_p1: p1.len(),
            p1_on_hold: p1_on_hold.len(),
            aged_over_48h: aged.len(),
            today_created: today_tickets.len(),
            today_closed: today_closed_tickets.len(),
            yesterday_created,
            ticket_change,
            change_percent,
            sla_breach_tickets: sla_breach,
            sla_at_risk_tickets: sla_at_risk,
            p1_tickets: p1,
            p1_on_hold_tickets: p1_on_hold,
            aged_tickets: aged,
            today_tickets,
            today_closed_tickets,
            last_updated: now.with_timezone(&Local),
            provenance: SnapshotProvenance {
                open_tickets: open_prov,
                today_created: today_prov,
                today_closed: closed_prov,
                yesterday_created: yesterday_prov,
            },
        }
    }

    // ── Fetch steps ──────────────────────────────────────────────────

    /// Open set: filtered search, then full-listing fallback, then empty.
    /// Each fallback level is attempted at most once.
    async fn fetch_open(&self) -> (Vec<TicketRecord>, MetricProvenance) {
        let primary = self
            .bounded(
                self.source
                    .search_by_states(&self.config.open_states, self.config.search_limit),
            )
            .await;

        match primary {
            Ok(tickets) if !tickets.is_empty() => return (tickets, MetricProvenance::Fresh),
            Ok(_) => warn!("open-ticket search returned no results, falling back to full listing"),
            Err(e) => {
                warn!(error = %e, "open-ticket search failed, falling back to full listing");
            }
        }

        match self
            .bounded(self.source.list_all(self.config.search_limit))
            .await
        {
            Ok(all) => {
                let open: Vec<TicketRecord> = all
                    .into_iter()
                    .filter(|t| t.state_id != Some(self.config.closed_state_id))
                    .collect();
                (open, MetricProvenance::Fallback)
            }
            Err(e) => {
                error!(error = %e, "full ticket listing failed, proceeding with an empty open set");
                (Vec::new(), MetricProvenance::Degraded)
            }
        }
    }

    /// Today's created tickets: count plus views, newest first.
    async fn fetch_today_created(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        now: DateTime<Utc>,
    ) -> (Vec<TicketView>, MetricProvenance) {
        match self
            .bounded(
                self.source
                    .search_created_between(start, end, self.config.search_limit),
            )
            .await
        {
            Ok(tickets) => {
                let mut views: Vec<TicketView> = tickets
                    .iter()
                    .map(|t| classify::created_view(t, &self.names, now))
                    .collect();
                views.sort_by(|a, b| b.created_at.cmp(&a.created_at));
                (views, MetricProvenance::Fresh)
            }
            Err(e) => {
                warn!(error = %e, "today's ticket query failed, counting zero");
                (Vec::new(), MetricProvenance::Degraded)
            }
        }
    }

    /// Today's closed tickets: close-window search, falling back to a
    /// full-listing scan for closed tickets with today's close stamp.
    async fn fetch_today_closed(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> (Vec<TicketView>, MetricProvenance) {
        match self
            .bounded(
                self.source
                    .search_closed_between(start, end, self.config.search_limit),
            )
            .await
        {
            Ok(tickets) => return (self.closed_views(&tickets), MetricProvenance::Fresh),
            Err(e) => {
                warn!(error = %e, "closed-ticket query failed, falling back to full listing");
            }
        }

        match self
            .bounded(self.source.list_all(self.config.search_limit))
            .await
        {
            Ok(all) => {
                let closed_today: Vec<TicketRecord> = all
                    .into_iter()
                    .filter(|t| {
                        t.state_id == Some(self.config.closed_state_id)
                            && t.close_at.is_some_and(|c| {
                                let day = c.with_timezone(&Local).date_naive();
                                start <= day && day < end
                            })
                    })
                    .collect();
                (self.closed_views(&closed_today), MetricProvenance::Fallback)
            }
            Err(e) => {
                error!(error = %e, "closed-ticket fallback failed, counting zero");
                (Vec::new(), MetricProvenance::Degraded)
            }
        }
    }

    /// Yesterday's created count. Independent of the today fetch: either
    /// may fail without affecting the other, and each runs exactly once
    /// per pass.
    async fn fetch_yesterday_count(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> (usize, MetricProvenance) {
        match self
            .bounded(
                self.source
                    .search_created_between(start, end, self.config.search_limit),
            )
            .await
        {
            Ok(tickets) => (tickets.len(), MetricProvenance::Fresh),
            Err(e) => {
                warn!(error = %e, "yesterday's ticket query failed, counting zero");
                (0, MetricProvenance::Degraded)
            }
        }
    }

    fn closed_views(&self, tickets: &[TicketRecord]) -> Vec<TicketView> {
        let mut views: Vec<TicketView> = tickets
            .iter()
            .filter_map(|t| classify::closed_view(t, &self.names))
            .collect();
        views.sort_by(|a, b| b.close_at.cmp(&a.close_at));
        views
    }

    /// Bound a remote fetch to the configured per-fetch timeout.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, zamdash_api::Error>>,
    ) -> Result<T, zamdash_api::Error> {
        match tokio::time::timeout(self.config.fetch_timeout, fut).await {
            Ok(res) => res,
            Err(_) => Err(zamdash_api::Error::Timeout {
                timeout_secs: self.config.fetch_timeout.as_secs(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;
    use serde_json::json;
    use zamdash_api::Error;

    // ── Mock source ──────────────────────────────────────────────────

    #[derive(Default)]
    struct MockSource {
        open: Vec<TicketRecord>,
        all: Vec<TicketRecord>,
        today_created: Vec<TicketRecord>,
        yesterday_created: Vec<TicketRecord>,
        today_closed: Vec<TicketRecord>,
        today: NaiveDate,

        fail_state_search: bool,
        fail_list: bool,
        fail_created_today: bool,
        fail_created_yesterday: bool,
        fail_closed: bool,
        hang_state_search: bool,

        state_search_calls: AtomicUsize,
        list_calls: AtomicUsize,
    }

    fn api_err() -> Error {
        Error::Api {
            message: "boom".into(),
            status: 500,
        }
    }

    impl TicketSource for MockSource {
        async fn search_by_states(
            &self,
            _states: &[String],
            _limit: usize,
        ) -> Result<Vec<TicketRecord>, Error> {
            self.state_search_calls.fetch_add(1, Ordering::SeqCst);
            if self.hang_state_search {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
            }
            if self.fail_state_search {
                return Err(api_err());
            }
            Ok(self.open.clone())
        }

        async fn search_created_between(
            &self,
            start: NaiveDate,
            _end: NaiveDate,
            _limit: usize,
        ) -> Result<Vec<TicketRecord>, Error> {
            if start == self.today {
                if self.fail_created_today {
                    return Err(api_err());
                }
                Ok(self.today_created.clone())
            } else {
                if self.fail_created_yesterday {
                    return Err(api_err());
                }
                Ok(self.yesterday_created.clone())
            }
        }

        async fn search_closed_between(
            &self,
            _start: NaiveDate,
            _end: NaiveDate,
            _limit: usize,
        ) -> Result<Vec<TicketRecord>, Error> {
            if self.fail_closed {
                return Err(api_err());
            }
            Ok(self.today_closed.clone())
        }

        async fn list_all(&self, _per_page: usize) -> Result<Vec<TicketRecord>, Error> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_list {
                return Err(api_err());
            }
            Ok(self.all.clone())
        }

        async fn check_connectivity(&self) -> Result<(), Error> {
            Ok(())
        }
    }

    // ── Fixtures ─────────────────────────────────────────────────────

    // Local noon today: keeps "a few hours ago" inside the same local
    // calendar day no matter when the test runs.
    fn now() -> DateTime<Utc> {
        Local::now()
            .date_naive()
            .and_hms_opt(12, 0, 0)
            .expect("valid time")
            .and_local_timezone(Local)
            .single()
            .expect("unambiguous local noon")
            .with_timezone(&Utc)
    }

    fn ticket(id: u64, priority: u32, state: u32, created: DateTime<Utc>) -> TicketRecord {
        serde_json::from_value(json!({
            "id": id,
            "number": format!("6100{id}"),
            "title": format!("Ticket {id}"),
            "created_at": created.to_rfc3339(),
            "priority_id": priority,
            "state_id": state,
        }))
        .expect("valid ticket json")
    }

    fn engine(source: MockSource) -> MetricsEngine<MockSource> {
        MetricsEngine::new(source, EngineConfig::default(), NameTable::default())
    }

    fn mock_at(now: DateTime<Utc>) -> MockSource {
        MockSource {
            today: now.with_timezone(&Local).date_naive(),
            ..MockSource::default()
        }
    }

    // ── Tests ────────────────────────────────────────────────────────

    #[tokio::test]
    async fn primary_path_produces_fresh_snapshot() {
        let now = now();
        let mut source = mock_at(now);
        let mut breached = ticket(1, 2, 2, now - Duration::hours(3));
        breached.escalation_at = Some(now - Duration::minutes(10));
        source.open = vec![breached, ticket(2, 1, 2, now - Duration::hours(50))];
        source.today_created = vec![ticket(3, 2, 1, now)];
        source.yesterday_created = vec![
            ticket(4, 2, 1, now - Duration::days(1)),
            ticket(5, 2, 1, now - Duration::days(1)),
        ];

        let snapshot = engine(source).produce(now).await;

        assert_eq!(snapshot.sla_breaches, 1);
        assert_eq!(snapshot.sla_breach_tickets[0].time_remaining, "10m overdue");
        assert_eq!(snapshot.open_p1, 1);
        assert_eq!(snapshot.aged_over_48h, 1);
        assert_eq!(snapshot.today_created, 1);
        assert_eq!(snapshot.yesterday_created, 2);
        assert_eq!(snapshot.ticket_change, -1);
        assert!((snapshot.change_percent + 50.0).abs() < f64::EPSILON);
        assert_eq!(snapshot.provenance.open_tickets, MetricProvenance::Fresh);
    }

    #[tokio::test]
    async fn failed_search_falls_back_to_filtered_listing() {
        let now = now();
        let mut source = mock_at(now);
        source.fail_state_search = true;
        source.all = vec![
            ticket(1, 2, 2, now - Duration::hours(1)),
            ticket(2, 2, 4, now - Duration::hours(1)), // closed: filtered out
            ticket(3, 1, 1, now - Duration::hours(1)),
        ];

        let engine = engine(source);
        let snapshot = engine.produce(now).await;

        assert_eq!(snapshot.open_p1, 1);
        assert_eq!(
            snapshot.provenance.open_tickets,
            MetricProvenance::Fallback
        );
        assert_eq!(engine.source().state_search_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_search_result_also_triggers_fallback() {
        let now = now();
        let mut source = mock_at(now);
        source.all = vec![ticket(1, 2, 2, now - Duration::hours(1))];

        let engine = engine(source);
        let snapshot = engine.produce(now).await;

        assert_eq!(
            snapshot.provenance.open_tickets,
            MetricProvenance::Fallback
        );
        assert_eq!(engine.source().list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn total_open_failure_yields_degraded_empty_snapshot() {
        let now = now();
        let mut source = mock_at(now);
        source.fail_state_search = true;
        source.fail_list = true;
        source.fail_created_today = true;
        source.fail_created_yesterday = true;
        source.fail_closed = true;

        let snapshot = engine(source).produce(now).await;

        assert_eq!(snapshot.sla_breaches, 0);
        assert_eq!(snapshot.open_p1, 0);
        assert_eq!(snapshot.today_created, 0);
        assert_eq!(snapshot.yesterday_created, 0);
        assert_eq!(snapshot.ticket_change, 0);
        assert!((snapshot.change_percent).abs() < f64::EPSILON);
        assert_eq!(snapshot.provenance.open_tickets, MetricProvenance::Degraded);
        assert_eq!(snapshot.provenance.today_created, MetricProvenance::Degraded);
        assert_eq!(snapshot.provenance.today_closed, MetricProvenance::Degraded);
        assert_eq!(
            snapshot.provenance.yesterday_created,
            MetricProvenance::Degraded
        );
    }

    #[tokio::test]
    async fn day_counts_fail_independently() {
        let now = now();
        let mut source = mock_at(now);
        source.open = vec![ticket(1, 2, 2, now - Duration::hours(1))];
        source.fail_created_yesterday = true;
        source.today_created = vec![ticket(2, 2, 1, now)];

        let snapshot = engine(source).produce(now).await;

        assert_eq!(snapshot.today_created, 1);
        assert_eq!(snapshot.yesterday_created, 0);
        assert_eq!(snapshot.provenance.today_created, MetricProvenance::Fresh);
        assert_eq!(
            snapshot.provenance.yesterday_created,
            MetricProvenance::Degraded
        );
    }

    #[tokio::test]
    async fn today_list_is_sorted_newest_first() {
        let now = now();
        let mut source = mock_at(now);
        source.today_created = vec![
            ticket(1, 2, 1, now - Duration::hours(5)),
            ticket(2, 2, 1, now - Duration::hours(1)),
            ticket(3, 2, 1, now - Duration::hours(3)),
        ];

        let snapshot = engine(source).produce(now).await;

        let ids: Vec<u64> = snapshot.today_tickets.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[tokio::test]
    async fn closed_fallback_scans_listing_for_todays_closures() {
        let now = now();
        let mut source = mock_at(now);
        source.fail_closed = true;
        let mut closed_today = ticket(1, 2, 4, now - Duration::hours(6));
        closed_today.close_at = Some(now - Duration::hours(1));
        let mut closed_last_week = ticket(2, 2, 4, now - Duration::days(9));
        closed_last_week.close_at = Some(now - Duration::days(7));
        source.all = vec![closed_today, closed_last_week, ticket(3, 2, 2, now)];

        let snapshot = engine(source).produce(now).await;

        assert_eq!(snapshot.today_closed, 1);
        assert_eq!(snapshot.today_closed_tickets[0].id, 1);
        assert_eq!(
            snapshot.today_closed_tickets[0].time_remaining,
            "Resolved in 5h 0m"
        );
        assert_eq!(snapshot.provenance.today_closed, MetricProvenance::Fallback);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_fetch_is_bounded_by_timeout() {
        let now = now();
        let mut source = mock_at(now);
        source.hang_state_search = true;
        source.all = vec![ticket(1, 2, 2, now - Duration::hours(1))];

        let snapshot = engine(source).produce(now).await;

        // The hung search timed out and the listing fallback served the pass.
        assert_eq!(
            snapshot.provenance.open_tickets,
            MetricProvenance::Fallback
        );
        assert_eq!(snapshot.sla_breaches + snapshot.sla_at_risk, 0);
    }
}
