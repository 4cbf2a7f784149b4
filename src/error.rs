use std::path::PathBuf;

use thiserror::Error;

/// Failures raised while loading schedules or classifying tiers.
///
/// An empty tier is not an error; it is logged and shows up as an all-empty
/// column in the final table.
#[derive(Error, Debug)]
pub enum ClassifyError {
    #[error("invalid configuration for tier {tier:?}: {message}")]
    Configuration { tier: String, message: String },

    #[error("tier {tier:?} needs the {schedule} {table} table, which was not loaded")]
    MissingInput {
        tier: String,
        schedule: String,
        table: &'static str,
    },

    #[error("failed to read {path:?}: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed input in {path:?}: {message}")]
    InvalidInput { path: PathBuf, message: String },
}

impl ClassifyError {
    pub fn configuration(tier: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            tier: tier.to_string(),
            message: message.into(),
        }
    }

    pub fn missing(tier: &str, schedule: &str, table: &'static str) -> Self {
        Self::MissingInput {
            tier: tier.to_string(),
            schedule: schedule.to_string(),
            table,
        }
    }

    pub fn invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            path: path.into(),
            message: message.into(),
        }
    }
}
