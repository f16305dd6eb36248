#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Sprint analytics that turn raw board records into growth summaries.

mod metrics;

pub use metrics::{completion_percentage, summarize, ticket_series};

use grove_core::{Command, Event, SprintId, SprintRecord, SprintReport};

/// Pure analytics system that recomputes reports on the next frame after new
/// board records arrive.
#[derive(Debug, Default)]
pub struct Analytics {
    reports: Vec<SprintReport>,
    pending: Option<Vec<SprintRecord>>,
}

impl Analytics {
    /// Creates an analytics system without reports.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a fresh set of board records, replacing any not yet processed.
    pub fn submit(&mut self, records: Vec<SprintRecord>) {
        if self.pending.replace(records).is_some() {
            log::debug!("superseding unprocessed sprint records");
        }
    }

    /// Reports published by the last recompute, in record order.
    #[must_use]
    pub fn reports(&self) -> &[SprintReport] {
        &self.reports
    }

    /// Report of a single sprint, if it was published.
    #[must_use]
    pub fn report(&self, sprint: &SprintId) -> Option<&SprintReport> {
        self.reports
            .iter()
            .find(|report| &report.summary.id == sprint)
    }

    /// Recomputes reports once a frame is observed and emits the summary sync.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::FrameAdvanced { .. }))
        {
            return;
        }
        let Some(records) = self.pending.take() else {
            return;
        };

        self.reports = records.iter().map(summarize).collect();
        log::debug!("published {} sprint reports", self.reports.len());
        out.push(Command::SyncSummaries {
            summaries: self
                .reports
                .iter()
                .map(|report| report.summary.clone())
                .collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> SprintRecord {
        SprintRecord {
            id: SprintId::new(id),
            name: None,
            columns: Vec::new(),
        }
    }

    #[test]
    fn later_submission_supersedes_pending_records() {
        let mut analytics = Analytics::new();
        analytics.submit(vec![record("A")]);
        analytics.submit(vec![record("B"), record("C")]);

        let mut out = Vec::new();
        analytics.handle(&[Event::FrameAdvanced { frame: 0 }], &mut out);

        assert_eq!(analytics.reports().len(), 2);
        assert!(analytics.report(&SprintId::new("A")).is_none());
        assert!(analytics.report(&SprintId::new("B")).is_some());
        assert_eq!(out.len(), 1);
    }
}
