//! Tier table configuration.
//!
//! The built-in table is the study's published methodology. A replacement can
//! be loaded from a JSON file shaped like:
//! ```json
//! {
//!   "tiers": [
//!     { "name": "Level 5", "column": "level5",
//!       "rule": { "kind": "daily_trips", "min_trips": 6 } },
//!     { "name": "Level 4", "column": "level4",
//!       "rule": { "kind": "windowed",
//!                 "peak": { "hours": [9, 10, 11, 12, 13, 14, 15, 16], "min_tph": 0, "min_total": 8 } } }
//!   ]
//! }
//! ```
//! Tiers are listed coarsest first; that order is the output column order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::classifier::{TierDefinition, WindowRule, WindowedTier, validate_tiers};
use crate::error::ClassifyError;
use crate::hours::{Hour, all_buckets};

const PEAK_HOURS: [Hour; 8] = [9, 10, 11, 12, 13, 14, 15, 16];
const EXTENDED_HOURS: [Hour; 8] = [6, 7, 8, 17, 18, 19, 20, 21];
const WEEKEND_HOURS: [Hour; 8] = PEAK_HOURS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierConfig {
    pub tiers: Vec<TierDefinition>,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            tiers: default_tiers(),
        }
    }
}

impl TierConfig {
    /// Loads the tier table from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading tier config {}", path))?;
        let config: TierConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing tier config {}", path))?;
        Ok(config)
    }

    /// Turns a tier off by column id. Returns false when no tier matches.
    pub fn disable(&mut self, column: &str) -> bool {
        let mut found = false;
        for tier in self.tiers.iter_mut().filter(|t| t.column == column) {
            tier.enabled = false;
            found = true;
        }
        if !found {
            warn!(column, "Cannot disable unknown tier");
        }
        found
    }

    pub fn enabled(&self) -> impl Iterator<Item = &TierDefinition> {
        self.tiers.iter().filter(|t| t.enabled)
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        validate_tiers(&self.tiers)
    }
}

/// Overnight segments; `[26, 27]` overlaps its neighbours on purpose so a
/// gap straddling a segment boundary is still caught.
fn night_segments(min_total: u32) -> Vec<WindowRule> {
    vec![
        WindowRule::aggregate([23, 24], min_total),
        WindowRule::aggregate([25, 26], min_total),
        WindowRule::aggregate([27, 28], min_total),
        WindowRule::aggregate([26, 27], min_total),
    ]
}

/// The seven published tiers, coarsest first.
pub fn default_tiers() -> Vec<TierDefinition> {
    vec![
        TierDefinition::daily_trips("Level 6", "level6", 2),
        TierDefinition::daily_trips("Level 5", "level5", 6),
        TierDefinition::windowed(
            "Level 4",
            "level4",
            WindowedTier {
                peak: Some(WindowRule::new(PEAK_HOURS, 0, 8)),
                ..Default::default()
            },
        ),
        TierDefinition::windowed(
            "Level 3",
            "level3",
            WindowedTier {
                peak: Some(WindowRule::new(PEAK_HOURS, 1, 16)),
                extended: Some(WindowRule::new(EXTENDED_HOURS, 0, 8)),
                weekend: Some(WindowRule::new(WEEKEND_HOURS, 0, 8)),
                weekend_required: true,
                ..Default::default()
            },
        ),
        TierDefinition::windowed(
            "Level 2",
            "level2",
            WindowedTier {
                peak: Some(WindowRule::new(PEAK_HOURS, 3, 32)),
                extended: Some(WindowRule::new(EXTENDED_HOURS, 1, 16)),
                weekend: Some(WindowRule::new(WEEKEND_HOURS, 1, 16)),
                weekend_required: true,
                ..Default::default()
            },
        ),
        TierDefinition::windowed(
            "Level 1",
            "level1",
            WindowedTier {
                peak: Some(WindowRule::new(PEAK_HOURS, 4, 32)),
                extended: Some(WindowRule::new(EXTENDED_HOURS, 3, 32)),
                weekend: Some(WindowRule::new(WEEKEND_HOURS, 3, 32)),
                night_segments: night_segments(0),
                weekend_required: true,
                ..Default::default()
            },
        ),
        TierDefinition::windowed(
            "Night",
            "levelNights",
            WindowedTier {
                peak: Some(WindowRule::new(all_buckets().collect::<Vec<_>>(), 0, 4)),
                night_segments: night_segments(1),
                ..Default::default()
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    #[test]
    fn test_defaults_are_valid() {
        let config = TierConfig::default();
        config.validate().unwrap();

        let columns: Vec<&str> = config.tiers.iter().map(|t| t.column.as_str()).collect();
        assert_eq!(
            columns,
            ["level6", "level5", "level4", "level3", "level2", "level1", "levelNights"]
        );
    }

    #[test]
    fn test_disable() {
        let mut config = TierConfig::default();
        assert!(config.disable("level3"));
        assert!(!config.disable("level9"));

        assert_eq!(config.enabled().count(), 6);
        assert!(config.enabled().all(|t| t.column != "level3"));
    }

    #[test]
    fn test_load_round_trip() {
        let path = env::temp_dir().join("stop_tiers_config_test.json");
        let path = path.to_str().unwrap();
        let config = TierConfig::default();
        fs::write(path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let loaded = TierConfig::load(path).unwrap();
        assert_eq!(loaded, config);

        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_load_missing_file() {
        assert!(TierConfig::load("/nonexistent/stop_tiers.json").is_err());
    }
}
