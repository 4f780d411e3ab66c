//! Output formatting: table and JSON.
//!
//! Table rendering uses `tabled`; JSON serializes the data via serde.

use std::io::{self, Write};

use tabled::{Table, Tabled, settings::Style};

use zamdash_core::{DashboardSnapshot, HealthStatus, MetricProvenance, TicketView};

use crate::cli::OutputFormat;

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Source")]
    source: &'static str,
}

#[derive(Tabled)]
struct TicketRow {
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Time")]
    time: String,
}

impl From<&TicketView> for TicketRow {
    fn from(t: &TicketView) -> Self {
        Self {
            number: t.number.clone(),
            title: t.title.clone(),
            priority: t.priority_name.clone(),
            state: t.state_name.clone(),
            time: t.time_remaining.clone(),
        }
    }
}

#[derive(Tabled)]
struct HealthRow {
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Timestamp")]
    timestamp: String,
}

fn provenance_label(p: MetricProvenance) -> &'static str {
    match p {
        MetricProvenance::Fresh => "fresh",
        MetricProvenance::Fallback => "fallback",
        MetricProvenance::Degraded => "degraded",
    }
}

// ── Renderers ────────────────────────────────────────────────────────

/// Render a snapshot in the chosen format.
///
/// Table mode shows the metric summary; `full` appends one table per
/// non-empty bucket. JSON modes serialize the entire snapshot.
pub fn render_snapshot(format: &OutputFormat, snap: &DashboardSnapshot, full: bool) -> String {
    match format {
        OutputFormat::Table => render_snapshot_table(snap, full),
        OutputFormat::Json => render_json_pretty(snap),
        OutputFormat::JsonCompact => render_json_compact(snap),
    }
}

/// Render the health status in the chosen format.
pub fn render_health(format: &OutputFormat, health: &HealthStatus) -> String {
    match format {
        OutputFormat::Table => render_table(&[HealthRow {
            status: health.status,
            timestamp: health.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        }]),
        OutputFormat::Json => render_json_pretty(health),
        OutputFormat::JsonCompact => render_json_compact(health),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Snapshot table assembly ──────────────────────────────────────────

fn render_snapshot_table(snap: &DashboardSnapshot, full: bool) -> String {
    let p = &snap.provenance;
    let rows = [
        MetricRow {
            metric: "SLA breaches",
            count: snap.sla_breaches,
            source: provenance_label(p.open_tickets),
        },
        MetricRow {
            metric: "SLA at risk",
            count: snap.sla_at_risk,
            source: provenance_label(p.open_tickets),
        },
        MetricRow {
            metric: "Open P1",
            count: snap.open_p1,
            source: provenance_label(p.open_tickets),
        },
        MetricRow {
            metric: "P1 on hold",
            count: snap.p1_on_hold,
            source: provenance_label(p.open_tickets),
        },
        MetricRow {
            metric: "Aged > 48h",
            count: snap.aged_over_48h,
            source: provenance_label(p.open_tickets),
        },
        MetricRow {
            metric: "Created today",
            count: snap.today_created,
            source: provenance_label(p.today_created),
        },
        MetricRow {
            metric: "Closed today",
            count: snap.today_closed,
            source: provenance_label(p.today_closed),
        },
        MetricRow {
            metric: "Created yesterday",
            count: snap.yesterday_created,
            source: provenance_label(p.yesterday_created),
        },
    ];

    let mut out = render_table(&rows);
    out.push_str(&format!(
        "\nChange vs yesterday: {:+} ({:.1}%)",
        snap.ticket_change, snap.change_percent
    ));
    out.push_str(&format!(
        "\nLast updated: {}",
        snap.last_updated.format("%Y-%m-%d %H:%M:%S")
    ));

    if full {
        let sections: [(&str, &[TicketView]); 7] = [
            ("SLA breaches", &snap.sla_breach_tickets),
            ("SLA at risk", &snap.sla_at_risk_tickets),
            ("Open P1", &snap.p1_tickets),
            ("P1 on hold", &snap.p1_on_hold_tickets),
            ("Aged > 48h", &snap.aged_tickets),
            ("Created today", &snap.today_tickets),
            ("Closed today", &snap.today_closed_tickets),
        ];
        for (title, tickets) in sections {
            if tickets.is_empty() {
                continue;
            }
            let rows: Vec<TicketRow> = tickets.iter().map(TicketRow::from).collect();
            out.push_str(&format!("\n\n{title} ({})\n", tickets.len()));
            out.push_str(&render_table(&rows));
        }
    }

    out
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json_pretty<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

pub(crate) fn render_json_compact<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string(data).expect("serialization should not fail")
}
