// SLA evaluation.
//
// Resolves the effective escalation deadline for a ticket and classifies
// it relative to "now" and the configured warning window. Pure functions:
// all clock input is explicit.

use chrono::{DateTime, Duration, Utc};
use zamdash_api::TicketRecord;

/// Where a ticket stands relative to its SLA deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaStatus {
    /// No deadline field is set; the ticket contributes to no SLA bucket.
    NoDeadline,
    /// Deadline has passed; carries the overdue magnitude.
    Breached(Duration),
    /// Deadline is within the warning window; carries the remaining time.
    AtRisk(Duration),
    /// Deadline exists but is comfortably in the future.
    OnTrack,
}

/// Resolve the effective escalation deadline for a ticket.
///
/// The overall `escalation_at` always wins when present. Otherwise the
/// effective deadline is the earliest of the per-leg deadlines
/// (first response, update, close); absent legs are ignored.
pub fn effective_deadline(ticket: &TicketRecord) -> Option<DateTime<Utc>> {
    if let Some(overall) = ticket.escalation_at {
        return Some(overall);
    }
    [
        ticket.first_response_escalation_at,
        ticket.update_escalation_at,
        ticket.close_escalation_at,
    ]
    .into_iter()
    .flatten()
    .min()
}

/// Classify a ticket's SLA position as of `now`.
pub fn evaluate(ticket: &TicketRecord, now: DateTime<Utc>, warning_threshold: Duration) -> SlaStatus {
    let Some(deadline) = effective_deadline(ticket) else {
        return SlaStatus::NoDeadline;
    };

    let delta = deadline - now;
    if delta < Duration::zero() {
        SlaStatus::Breached(-delta)
    } else if delta <= warning_threshold {
        SlaStatus::AtRisk(delta)
    } else {
        SlaStatus::OnTrack
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ticket() -> TicketRecord {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "number": "61001",
            "title": "test",
            "created_at": "2026-08-28T00:00:00Z",
        }))
        .expect("valid ticket json")
    }

    fn at(now: DateTime<Utc>, minutes: i64) -> DateTime<Utc> {
        now + Duration::minutes(minutes)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 29, 12, 0, 0).single().expect("valid timestamp")
    }

    #[test]
    fn no_deadline_fields_means_no_deadline() {
        let t = ticket();
        assert_eq!(evaluate(&t, now(), Duration::minutes(60)), SlaStatus::NoDeadline);
    }

    #[test]
    fn overall_deadline_in_the_past_is_breached() {
        let mut t = ticket();
        t.escalation_at = Some(at(now(), -10));
        assert_eq!(
            evaluate(&t, now(), Duration::minutes(60)),
            SlaStatus::Breached(Duration::minutes(10))
        );
    }

    #[test]
    fn far_future_deadline_is_on_track() {
        let mut t = ticket();
        t.escalation_at = Some(at(now(), 200));
        assert_eq!(evaluate(&t, now(), Duration::minutes(60)), SlaStatus::OnTrack);
    }

    #[test]
    fn earliest_present_leg_wins_when_no_overall_deadline() {
        let mut t = ticket();
        t.first_response_escalation_at = Some(at(now(), 5));
        t.update_escalation_at = Some(at(now(), 50));
        // close leg absent: ignored, not treated as zero
        assert_eq!(effective_deadline(&t), Some(at(now(), 5)));
        assert_eq!(
            evaluate(&t, now(), Duration::minutes(60)),
            SlaStatus::AtRisk(Duration::minutes(5))
        );
    }

    #[test]
    fn overall_deadline_beats_earlier_leg_deadlines() {
        let mut t = ticket();
        t.escalation_at = Some(at(now(), 90));
        t.first_response_escalation_at = Some(at(now(), 5));
        assert_eq!(effective_deadline(&t), Some(at(now(), 90)));
    }

    #[test]
    fn deadline_exactly_at_threshold_is_at_risk() {
        let mut t = ticket();
        t.escalation_at = Some(at(now(), 60));
        assert_eq!(
            evaluate(&t, now(), Duration::minutes(60)),
            SlaStatus::AtRisk(Duration::minutes(60))
        );
    }
}
