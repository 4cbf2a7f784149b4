use tracing::debug;

use crate::classifier::rule::WindowRule;
use crate::classifier::stop_window::evaluate_stop_window;
use crate::classifier::utility::intersect_all;
use crate::table::{StopHourlyTable, StopSet};

/// Stops that clear every night segment on its own.
///
/// Segments may share buckets (e.g. `[25, 26]` and `[26, 27]`); each segment
/// is evaluated independently so the overlap is kept. No segments yields the
/// empty set.
pub fn evaluate_night_segments(stops: &StopHourlyTable, segments: &[WindowRule]) -> StopSet {
    let per_segment = segments.iter().map(|segment| {
        let passing = evaluate_stop_window(stops, segment);
        debug!(hours = ?segment.hours, min_total = segment.min_total, stops = passing.len(), "Night segment");
        passing
    });
    intersect_all(per_segment)
}
