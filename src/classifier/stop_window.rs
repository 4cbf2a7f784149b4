use crate::classifier::rule::WindowRule;
use crate::table::{StopHourlyTable, StopSet};

/// Stops whose observed hourly counts satisfy `rule`.
pub fn evaluate_stop_window(stops: &StopHourlyTable, rule: &WindowRule) -> StopSet {
    stops
        .iter()
        .filter(|(_, counts)| rule.passes(counts))
        .map(|(stop_id, _)| stop_id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hours::HourCounts;

    fn row(id: &str, pairs: &[(u8, u32)]) -> (String, HourCounts) {
        (id.to_string(), HourCounts::from_pairs(pairs.iter().copied()))
    }

    #[test]
    fn test_min_tph_minus_one_fails() {
        let rule = WindowRule::new([9, 10, 11], 2, 6);
        let stops: StopHourlyTable = vec![
            row("exact", &[(9, 2), (10, 2), (11, 2)]),
            row("short", &[(9, 2), (10, 1), (11, 5)]),
        ]
        .into_iter()
        .collect();

        let result = evaluate_stop_window(&stops, &rule);
        assert!(result.contains("exact"));
        assert!(!result.contains("short"));
    }

    #[test]
    fn test_zero_floor_accepts_silent_stop() {
        let rule = WindowRule::new([9], 0, 0);
        let stops: StopHourlyTable = vec![row("silent", &[])].into_iter().collect();
        assert_eq!(evaluate_stop_window(&stops, &rule).len(), 1);
    }

    #[test]
    fn test_empty_table() {
        let rule = WindowRule::new([9], 1, 1);
        assert!(evaluate_stop_window(&StopHourlyTable::new(), &rule).is_empty());
    }
}
