//! Loading of sprint data and engine configuration from disk.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use grove_core::{EngineConfig, SprintRecord, SprintSummary, TicketSample};
use serde::{de::DeserializeOwned, Deserialize};

/// Sprint data handed to the engine at start-up.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum SprintSource {
    /// Precomputed summaries synced immediately.
    Summaries(Vec<SprintSummary>),
    /// Raw board records aggregated on the first frame.
    Records(Vec<SprintRecord>),
}

/// Sprint documents are either a bare list or an object holding `sprints`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SprintDocument<T> {
    List(Vec<T>),
    Wrapped { sprints: Vec<T> },
}

/// Reads sprint summaries from a JSON document.
pub(crate) fn load_summaries(path: &Path) -> Result<Vec<SprintSummary>> {
    load_document(path, "sprint summaries")
}

/// Reads raw sprint board records from a JSON document.
pub(crate) fn load_records(path: &Path) -> Result<Vec<SprintRecord>> {
    load_document(path, "sprint records")
}

fn load_document<T: DeserializeOwned>(path: &Path, what: &str) -> Result<Vec<T>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} at {}", path.display()))?;
    parse_document(&contents).with_context(|| format!("failed to parse {what} at {}", path.display()))
}

fn parse_document<T: DeserializeOwned>(contents: &str) -> Result<Vec<T>> {
    let document: SprintDocument<T> = serde_json::from_str(contents)?;
    Ok(match document {
        SprintDocument::List(sprints) | SprintDocument::Wrapped { sprints } => sprints,
    })
}

/// Reads and validates the engine configuration, falling back to defaults
/// when no file is provided.
pub(crate) fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read engine configuration at {}", path.display()))?;
    let config = parse_config(&contents)
        .with_context(|| format!("invalid engine configuration at {}", path.display()))?;
    log::info!("loaded engine configuration from {}", path.display());
    Ok(config)
}

fn parse_config(contents: &str) -> Result<EngineConfig> {
    let config: EngineConfig =
        toml::from_str(contents).context("failed to parse engine configuration toml contents")?;
    config.validate()?;
    Ok(config)
}

/// Sprints shown when no data file is provided.
pub(crate) fn demo_summaries() -> Vec<SprintSummary> {
    let series = |closed: [u32; 3]| {
        ["2024-03-04", "2024-03-05", "2024-03-06"]
            .into_iter()
            .zip(closed)
            .enumerate()
            .map(|(day, (date, closed))| TicketSample::new(date, 4 * (day as u32 + 1), closed))
            .collect::<Vec<_>>()
    };

    vec![
        SprintSummary::new("S1", "Sprint 1", 12.0).with_ticket_series(series([0, 1, 1])),
        SprintSummary::new("S2", "Sprint 2", 38.0).with_ticket_series(series([1, 2, 4])),
        SprintSummary::new("S3", "Sprint 3", 61.0).with_ticket_series(series([2, 4, 7])),
        SprintSummary::new("S4", "Sprint 4", 92.0).with_ticket_series(series([3, 7, 11])),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use grove_core::{GrowthStage, SprintId};

    #[test]
    fn summaries_accept_bare_lists() {
        let summaries: Vec<SprintSummary> = parse_document(
            r#"[{ "id": "S1", "name": "Sprint 1", "completionPercentage": 55.0 }]"#,
        )
        .expect("valid document");

        assert_eq!(summaries, vec![SprintSummary::new("S1", "Sprint 1", 55.0)]);
    }

    #[test]
    fn records_accept_wrapped_documents() {
        let records: Vec<SprintRecord> = parse_document(
            r#"{
                "sprints": [{
                    "id": "S7",
                    "columns": [
                        { "title": "Close", "tickets": [{ "createdOn": "2024-03-01", "closedOn": "2024-03-02" }] }
                    ]
                }]
            }"#,
        )
        .expect("valid document");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, SprintId::new("S7"));
        assert_eq!(records[0].columns[0].tickets.len(), 1);
    }

    #[test]
    fn malformed_documents_are_rejected() {
        assert!(parse_document::<SprintSummary>(r#"{ "id": "S1" }"#).is_err());
    }

    #[test]
    fn partial_configuration_keeps_defaults() {
        let config = parse_config(
            r#"
                [motion]
                rise_speed = 0.05
            "#,
        )
        .expect("valid configuration");

        assert_eq!(config.motion.rise_speed, 0.05);
        assert_eq!(config.camera, EngineConfig::default().camera);
    }

    #[test]
    fn invalid_tuning_is_rejected() {
        assert!(parse_config("[camera]\nconvergence = 0.0\n").is_err());
    }

    #[test]
    fn demo_covers_every_stage() {
        let stages: Vec<GrowthStage> = demo_summaries().iter().map(SprintSummary::stage).collect();
        assert_eq!(stages, GrowthStage::ALL.to_vec());
    }
}
