// Ticket classification.
//
// Maps the open-ticket set into the dashboard's display buckets. Each
// bucket is an independent filter over the full set -- a ticket may land
// in several buckets, or none. List order follows source iteration order
// for the SLA buckets.

use chrono::{DateTime, Utc};
use zamdash_api::TicketRecord;

use crate::agefmt;
use crate::config::EngineConfig;
use crate::model::{NameTable, TicketView};
use crate::sla::{self, SlaStatus};

/// The five independent classifications over the open-ticket set.
#[derive(Debug, Default)]
pub struct OpenBuckets {
    pub sla_breach: Vec<TicketView>,
    pub sla_at_risk: Vec<TicketView>,
    pub p1: Vec<TicketView>,
    pub p1_on_hold: Vec<TicketView>,
    pub aged: Vec<TicketView>,
}

/// Classify the currently-open tickets into all buckets.
pub fn classify_open(
    tickets: &[TicketRecord],
    config: &EngineConfig,
    names: &NameTable,
    now: DateTime<Utc>,
) -> OpenBuckets {
    let mut buckets = OpenBuckets::default();

    // SLA buckets: evaluator decides; NoDeadline and OnTrack contribute
    // to neither. Source iteration order is preserved.
    for ticket in tickets {
        match sla::evaluate(ticket, now, config.sla_warning_threshold) {
            SlaStatus::Breached(overdue) => {
                let deadline = sla::effective_deadline(ticket);
                buckets.sla_breach.push(make_view(
                    ticket,
                    names,
                    deadline,
                    agefmt::format_overdue(overdue),
                ));
            }
            SlaStatus::AtRisk(remaining) => {
                let deadline = sla::effective_deadline(ticket);
                buckets.sla_at_risk.push(make_view(
                    ticket,
                    names,
                    deadline,
                    agefmt::format_remaining(remaining),
                ));
            }
            SlaStatus::NoDeadline | SlaStatus::OnTrack => {}
        }
    }

    // P1 bucket: time_remaining shows ticket age, not SLA remaining.
    for ticket in tickets {
        if ticket.priority_id == Some(config.p1_priority_id) {
            buckets.p1.push(aged_view(ticket, names, now));
        }
    }

    // P1-on-hold: an independent re-filter of the full set, not an
    // intersection with the P1 bucket.
    for ticket in tickets {
        let on_hold = ticket
            .state_id
            .is_some_and(|s| config.hold_state_ids.contains(&s));
        if ticket.priority_id == Some(config.p1_priority_id) && on_hold {
            buckets.p1_on_hold.push(aged_view(ticket, names, now));
        }
    }

    // Aging backlog: created before the cutoff, regardless of priority
    // or SLA state.
    let cutoff = now - config.aged_after;
    for ticket in tickets {
        if ticket.created_at < cutoff {
            buckets.aged.push(aged_view(ticket, names, now));
        }
    }

    buckets
}

/// View for a freshly-created ticket (day lists): time_remaining shows age.
pub fn created_view(ticket: &TicketRecord, names: &NameTable, now: DateTime<Utc>) -> TicketView {
    aged_view(ticket, names, now)
}

/// View for a resolved ticket: time_remaining shows the resolution time.
///
/// Returns `None` when the record lacks a close timestamp (it should not
/// appear in a closed-ticket list without one).
pub fn closed_view(ticket: &TicketRecord, names: &NameTable) -> Option<TicketView> {
    let close_at = ticket.close_at?;
    let resolution = close_at - ticket.created_at;
    Some(make_view(
        ticket,
        names,
        ticket.escalation_at,
        agefmt::format_resolution(resolution),
    ))
}

fn aged_view(ticket: &TicketRecord, names: &NameTable, now: DateTime<Utc>) -> TicketView {
    make_view(
        ticket,
        names,
        ticket.escalation_at,
        agefmt::format_age(now - ticket.created_at),
    )
}

fn make_view(
    ticket: &TicketRecord,
    names: &NameTable,
    escalation_at: Option<DateTime<Utc>>,
    time_remaining: String,
) -> TicketView {
    let priority_id = ticket.priority_id.unwrap_or(0);
    let state_id = ticket.state_id.unwrap_or(0);
    TicketView {
        id: ticket.id,
        number: ticket.number.clone(),
        title: ticket.title.clone(),
        escalation_at,
        created_at: ticket.created_at,
        updated_at: ticket.updated_at,
        close_at: ticket.close_at,
        priority_id,
        priority_name: names.priority_name(priority_id),
        state_id,
        state_name: names.state_name(state_id),
        time_remaining,
        customer_id: ticket.customer_id,
        group_id: ticket.group_id,
        owner_id: ticket.owner_id,
    }
}
