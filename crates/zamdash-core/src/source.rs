// Ticket source seam.
//
// The engine consumes an abstract query capability rather than the HTTP
// client directly, so the aggregator and cache are testable against mock
// sources. `TicketApi` is the production implementation.

use std::future::Future;

use chrono::NaiveDate;
use zamdash_api::{Error, TicketApi, TicketRecord};

/// Query capabilities the engine requires from the ticketing backend.
///
/// Futures are `Send` so aggregation passes can run on spawned tasks.
pub trait TicketSource: Send + Sync {
    /// Server-side filtered query: tickets in any of the named states.
    fn search_by_states(
        &self,
        states: &[String],
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TicketRecord>, Error>> + Send;

    /// Tickets created within `[start, end)` at date granularity.
    fn search_created_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TicketRecord>, Error>> + Send;

    /// Tickets closed within `[start, end)` at date granularity.
    fn search_closed_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<TicketRecord>, Error>> + Send;

    /// The full ticket set (fallback when search is unavailable).
    fn list_all(
        &self,
        per_page: usize,
    ) -> impl Future<Output = Result<Vec<TicketRecord>, Error>> + Send;

    /// Cheap authenticated call proving the source is reachable.
    fn check_connectivity(&self) -> impl Future<Output = Result<(), Error>> + Send;
}

impl TicketSource for TicketApi {
    async fn search_by_states(
        &self,
        states: &[String],
        limit: usize,
    ) -> Result<Vec<TicketRecord>, Error> {
        TicketApi::search_by_states(self, states, limit).await
    }

    async fn search_created_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<TicketRecord>, Error> {
        TicketApi::search_created_between(self, start, end, limit).await
    }

    async fn search_closed_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<TicketRecord>, Error> {
        TicketApi::search_closed_between(self, start, end, limit).await
    }

    async fn list_all(&self, per_page: usize) -> Result<Vec<TicketRecord>, Error> {
        TicketApi::list_all(self, per_page).await
    }

    async fn check_connectivity(&self) -> Result<(), Error> {
        self.current_user().await.map(|_| ())
    }
}
