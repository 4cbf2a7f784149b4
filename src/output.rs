//! Output formatting and persistence of classification results.
//!
//! Writes the merged per-stop CSV and an optional JSON run summary.

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::classifier::{FinalTable, TierDefinition, TierOutcome};

/// Writes the final table as CSV, replacing any existing file.
///
/// Tier cells hold `1` or are empty; coordinates are empty for stops missing
/// from the stop table.
pub fn write_final_table(path: &str, table: &FinalTable) -> Result<()> {
    debug!(path, rows = table.rows.len(), "Writing final table");

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(table.header())?;

    for row in &table.rows {
        let (lat, lon) = match row.coordinate {
            Some(c) => (c.lat.to_string(), c.lon.to_string()),
            None => (String::new(), String::new()),
        };
        let record = std::iter::once(row.stop_id.as_str())
            .chain(row.markers())
            .chain([lat.as_str(), lon.as_str()]);
        writer.write_record(record)?;
    }
    writer.flush()?;

    info!(path, rows = table.rows.len(), "Final table written");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStatus {
    Ok,
    Empty,
    Failed,
    Disabled,
}

#[derive(Debug, Serialize)]
pub struct TierSummary {
    pub column: String,
    pub name: String,
    pub status: TierStatus,
    pub qualifying_stops: usize,
    pub error: Option<String>,
}

/// Run-level summary, written as `--summary` JSON.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub rows: usize,
    pub tiers: Vec<TierSummary>,
}

impl RunSummary {
    /// Summarizes every configured tier, including disabled ones.
    pub fn new(tiers: &[TierDefinition], outcomes: &[TierOutcome], table: &FinalTable) -> Self {
        let tiers = tiers
            .iter()
            .map(|tier| {
                let outcome = outcomes.iter().find(|o| o.column == tier.column);
                let (status, qualifying_stops, error) = match outcome.map(|o| &o.result) {
                    None => (TierStatus::Disabled, 0, None),
                    Some(Ok(stops)) if stops.is_empty() => (TierStatus::Empty, 0, None),
                    Some(Ok(stops)) => (TierStatus::Ok, stops.len(), None),
                    Some(Err(e)) => (TierStatus::Failed, 0, Some(e.to_string())),
                };
                TierSummary {
                    column: tier.column.clone(),
                    name: tier.name.clone(),
                    status,
                    qualifying_stops,
                    error,
                }
            })
            .collect();

        RunSummary {
            generated_at: Utc::now(),
            rows: table.rows.len(),
            tiers,
        }
    }

    pub fn failed(&self) -> impl Iterator<Item = &TierSummary> {
        self.tiers.iter().filter(|t| t.status == TierStatus::Failed)
    }
}

/// Writes a summary as pretty-printed JSON.
pub fn write_summary(path: &str, summary: &RunSummary) -> Result<()> {
    std::fs::write(path, serde_json::to_string_pretty(summary)?)?;
    info!(path, "Run summary written");
    Ok(())
}
