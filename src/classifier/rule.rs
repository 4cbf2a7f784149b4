use serde::{Deserialize, Serialize};

use crate::error::ClassifyError;
use crate::hours::{FIRST_HOUR, HourCounts, Hour, LAST_HOUR, is_bucket};

/// A time window with a per-hour floor and an aggregate floor.
///
/// A row passes when every listed bucket has at least `min_tph` trips and the
/// sum over exactly those buckets is at least `min_total`. Both thresholds are
/// inclusive. Night segments are aggregate-only rules with `min_tph = 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRule {
    pub hours: Vec<Hour>,
    #[serde(default)]
    pub min_tph: u32,
    #[serde(default)]
    pub min_total: u32,
}

impl WindowRule {
    pub fn new(hours: impl Into<Vec<Hour>>, min_tph: u32, min_total: u32) -> Self {
        Self {
            hours: hours.into(),
            min_tph,
            min_total,
        }
    }

    /// Aggregate-only rule, no per-hour floor.
    pub fn aggregate(hours: impl Into<Vec<Hour>>, min_total: u32) -> Self {
        Self::new(hours, 0, min_total)
    }

    pub fn validate(&self, tier: &str, window: &str) -> Result<(), ClassifyError> {
        if self.hours.is_empty() {
            return Err(ClassifyError::configuration(
                tier,
                format!("{} window has no hours", window),
            ));
        }
        if let Some(hour) = self.hours.iter().find(|&&h| !is_bucket(h)) {
            return Err(ClassifyError::configuration(
                tier,
                format!(
                    "{} window uses hour_{}, outside hour_{}..hour_{}",
                    window, hour, FIRST_HOUR, LAST_HOUR
                ),
            ));
        }
        Ok(())
    }

    pub fn passes(&self, counts: &HourCounts) -> bool {
        self.hours.iter().all(|&h| counts.get(h) >= self.min_tph)
            && counts.sum_over(&self.hours) >= self.min_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peak() -> WindowRule {
        WindowRule::new([9, 10, 11, 12, 13, 14, 15, 16], 4, 32)
    }

    #[test]
    fn test_exact_thresholds_pass() {
        let counts = HourCounts::from_pairs((9..=16).map(|h| (h, 4)));
        assert!(peak().passes(&counts));
    }

    #[test]
    fn test_one_weak_hour_fails_despite_total() {
        let mut pairs: Vec<(Hour, u32)> = (9..=16).map(|h| (h, 10)).collect();
        pairs[3].1 = 3;
        let counts = HourCounts::from_pairs(pairs);

        assert!(counts.sum_over(&peak().hours) >= 32);
        assert!(!peak().passes(&counts));
    }

    #[test]
    fn test_total_below_aggregate_fails() {
        let rule = WindowRule::new([9, 10], 1, 5);
        let counts = HourCounts::from_pairs([(9, 2), (10, 2)]);
        assert!(!rule.passes(&counts));
    }

    #[test]
    fn test_hours_outside_window_are_ignored() {
        let rule = WindowRule::aggregate([23, 24], 2);
        let counts = HourCounts::from_pairs([(22, 50), (23, 1)]);
        assert!(!rule.passes(&counts));
    }

    #[test]
    fn test_validate_rejects_empty_and_unknown_hours() {
        assert!(WindowRule::new(Vec::<Hour>::new(), 0, 0).validate("t", "peak").is_err());
        assert!(WindowRule::new([4], 0, 0).validate("t", "peak").is_err());
        assert!(WindowRule::new([29], 0, 0).validate("t", "peak").is_err());
        assert!(WindowRule::new([5, 28], 0, 0).validate("t", "peak").is_ok());
    }

    #[test]
    fn test_missing_thresholds_default_to_zero() {
        let rule: WindowRule = serde_json::from_str(r#"{"hours": [23, 24]}"#).unwrap();
        assert_eq!(rule, WindowRule::aggregate([23, 24], 0));
    }
}
