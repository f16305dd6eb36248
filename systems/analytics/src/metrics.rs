use std::collections::BTreeMap;

use grove_core::{
    MemberStats, SprintRecord, SprintReport, SprintSummary, TicketSample, CLOSE_COLUMN,
    UNASSIGNED,
};

/// Aggregates the board of one sprint into a report.
///
/// Completion is the share of tickets sitting in the close column, rounded to
/// a whole percent. An empty board reports zero.
#[must_use]
pub fn summarize(record: &SprintRecord) -> SprintReport {
    let mut total_tickets = 0u32;
    let mut closed_tickets = 0u32;
    let mut member_stats: BTreeMap<String, MemberStats> = BTreeMap::new();

    for column in &record.columns {
        let closing = column.title == CLOSE_COLUMN;
        for ticket in &column.tickets {
            total_tickets = total_tickets.saturating_add(1);
            if closing {
                closed_tickets = closed_tickets.saturating_add(1);
            }

            let member = ticket
                .assignee
                .as_deref()
                .filter(|name| !name.is_empty())
                .unwrap_or(UNASSIGNED);
            let stats = member_stats.entry(member.to_owned()).or_default();
            stats.received = stats.received.saturating_add(1);
            if ticket.closed_on.is_some() {
                stats.closed = stats.closed.saturating_add(1);
            }
        }
    }

    let name = record
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| record.id.as_str());
    let summary = SprintSummary::new(
        record.id.as_str(),
        name,
        completion_percentage(closed_tickets, total_tickets),
    )
    .with_ticket_series(ticket_series(record));

    SprintReport {
        summary,
        total_tickets,
        closed_tickets,
        member_stats,
    }
}

/// Whole-percent share of `closed` in `total`, zero when `total` is zero.
#[must_use]
pub fn completion_percentage(closed: u32, total: u32) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(closed) / f64::from(total) * 100.0).round() as f32
}

/// Cumulative opened/closed counts per creation day.
///
/// Every dated ticket counts as opened on its creation day, and as closed on
/// that same day when it carries a close date. Days are emitted in ascending
/// order with one sample each.
#[must_use]
pub fn ticket_series(record: &SprintRecord) -> Vec<TicketSample> {
    let mut per_day: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for ticket in record.columns.iter().flat_map(|column| &column.tickets) {
        let Some(created_on) = ticket.created_on.as_deref() else {
            continue;
        };
        let day = per_day.entry(created_on).or_default();
        day.0 = day.0.saturating_add(1);
        if ticket.closed_on.is_some() {
            day.1 = day.1.saturating_add(1);
        }
    }

    let mut opened = 0u32;
    let mut closed = 0u32;
    per_day
        .into_iter()
        .map(|(date, (day_opened, day_closed))| {
            opened = opened.saturating_add(day_opened);
            closed = closed.saturating_add(day_closed);
            TicketSample::new(date, opened, closed)
        })
        .collect()
}
