// Human duration rendering for the dashboard.
//
// Three granularities: ages use day/hour/minute buckets, resolution
// times prefix "Resolved in ", and SLA spans render hour/minute only
// (the warning window keeps them small) with an overdue/remaining
// suffix. All components are floored, never rounded.

use chrono::Duration;

/// Render an age: `{d}d {h}h` past one day, `{h}h {m}m` past one hour,
/// else `{m}m`.
pub fn format_age(age: Duration) -> String {
    let days = age.num_days();
    if days >= 1 {
        format!("{days}d {}h", age.num_hours() - days * 24)
    } else if age.num_hours() >= 1 {
        format!("{}h {}m", age.num_hours(), age.num_minutes() % 60)
    } else {
        format!("{}m", age.num_minutes())
    }
}

/// Render a resolution time: `"Resolved in {age}"`.
pub fn format_resolution(elapsed: Duration) -> String {
    format!("Resolved in {}", format_age(elapsed))
}

/// Render SLA overdue magnitude: `"{span} overdue"`.
pub fn format_overdue(overdue: Duration) -> String {
    format!("{} overdue", sla_span(overdue))
}

/// Render SLA remaining time: `"{span} remaining"`.
pub fn format_remaining(remaining: Duration) -> String {
    format!("{} remaining", sla_span(remaining))
}

// SLA spans drop the day component: hour/minute only, switching to
// `{h}h {m}m` strictly past the 60-minute mark.
fn sla_span(span: Duration) -> String {
    let minutes = span.num_minutes();
    if minutes > 60 {
        format!("{}h {}m", minutes / 60, minutes % 60)
    } else {
        format!("{minutes}m")
    }
}
