// Ticket endpoints
//
// Search and listing over `/api/v1/tickets`. Searches use the Zammad
// query language (`state:... OR state:...`, `created_at:[A TO B]`) with
// `expand=true` so responses come back as full ticket objects instead of
// the id/assets envelope.

use chrono::NaiveDate;
use tracing::debug;

use crate::client::TicketApi;
use crate::error::Error;
use crate::models::{TicketRecord, User};

impl TicketApi {
    /// Search tickets by state name.
    ///
    /// `GET /api/v1/tickets/search?query=state:new OR state:open&limit=N`
    pub async fn search_by_states(
        &self,
        states: &[String],
        limit: usize,
    ) -> Result<Vec<TicketRecord>, Error> {
        let query = states
            .iter()
            .map(|s| format!("state:{s}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        debug!(%query, "searching tickets by state");
        self.search(&query, limit).await
    }

    /// Search tickets created within `[start, end)` (date granularity).
    ///
    /// `GET /api/v1/tickets/search?query=created_at:[start TO end]`
    pub async fn search_created_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<TicketRecord>, Error> {
        let query = format!("created_at:[{start} TO {end}]");
        debug!(%query, "searching tickets by creation window");
        self.search(&query, limit).await
    }

    /// Search tickets closed within `[start, end)` (date granularity).
    ///
    /// `GET /api/v1/tickets/search?query=close_at:[start TO end]`
    pub async fn search_closed_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        limit: usize,
    ) -> Result<Vec<TicketRecord>, Error> {
        let query = format!("close_at:[{start} TO {end}]");
        debug!(%query, "searching tickets by close window");
        self.search(&query, limit).await
    }

    /// List the full ticket set (fallback path when search is unavailable).
    ///
    /// `GET /api/v1/tickets?expand=true&per_page=N`
    pub async fn list_all(&self, per_page: usize) -> Result<Vec<TicketRecord>, Error> {
        let url = self.api_url("tickets")?;
        self.get(
            url,
            &[
                ("expand", "true".into()),
                ("per_page", per_page.to_string()),
            ],
        )
        .await
    }

    /// Fetch the authenticated user.
    ///
    /// `GET /api/v1/users/me` -- the cheapest call that exercises auth,
    /// used as a startup connectivity probe.
    pub async fn current_user(&self) -> Result<User, Error> {
        let url = self.api_url("users/me")?;
        self.get(url, &[]).await
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<TicketRecord>, Error> {
        let url = self.api_url("tickets/search")?;
        self.get(
            url,
            &[
                ("query", query.to_owned()),
                ("limit", limit.to_string()),
                ("expand", "true".into()),
            ],
        )
        .await
    }
}
