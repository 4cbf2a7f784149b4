//! Hour buckets of a service day.
//!
//! A service day starts at 05:00 and runs through 04:59 the next morning.
//! Buckets are labeled `hour_5` .. `hour_28`; the overnight hours 00:00-04:59
//! land in buckets 24-28 so that a day never wraps.

pub type Hour = u8;

pub const FIRST_HOUR: Hour = 5;
pub const LAST_HOUR: Hour = 28;
pub const HOUR_COUNT: usize = (LAST_HOUR - FIRST_HOUR + 1) as usize;

/// Returns true when `hour` is one of the 24 declared buckets.
pub fn is_bucket(hour: Hour) -> bool {
    (FIRST_HOUR..=LAST_HOUR).contains(&hour)
}

/// All buckets in order, `5..=28`.
pub fn all_buckets() -> impl Iterator<Item = Hour> {
    FIRST_HOUR..=LAST_HOUR
}

/// Column label for a bucket, e.g. `hour_17`.
pub fn column_name(hour: Hour) -> String {
    format!("hour_{}", hour)
}

/// Parses a `hour_N` column label. Returns `None` for any other header.
pub fn parse_column_name(name: &str) -> Option<u32> {
    name.strip_prefix("hour_")?.parse().ok()
}

/// Maps a clock hour (GTFS allows values past 24) onto a service-day bucket.
pub fn bucket_for_clock_hour(hour: u32) -> Hour {
    let hour = (hour % 24) as Hour;
    if hour < FIRST_HOUR { hour + 24 } else { hour }
}

/// Parses a GTFS `HH:MM:SS` time into seconds past midnight of the service
/// date. Hours may exceed 23.
pub fn parse_gtfs_time(time: &str) -> Option<u32> {
    let mut parts = time.trim().split(':');
    let h: u32 = parts.next()?.parse().ok()?;
    let m: u32 = parts.next()?.parse().ok()?;
    let s: u32 = match parts.next() {
        Some(s) => s.parse().ok()?,
        None => 0,
    };
    if parts.next().is_some() || m >= 60 || s >= 60 {
        return None;
    }
    Some(h * 3600 + m * 60 + s)
}

/// Bucket of a time expressed in seconds past midnight.
pub fn bucket_for_seconds(seconds: u32) -> Hour {
    bucket_for_clock_hour(seconds / 3600)
}

/// Trip counts for each bucket of one row of an hourly table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourCounts([u32; HOUR_COUNT]);

impl HourCounts {
    /// Builds counts from `(bucket, count)` pairs. Pairs outside the service
    /// day are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Hour, u32)>) -> Self {
        let mut counts = Self::default();
        for (hour, count) in pairs {
            counts.add(hour, count);
        }
        counts
    }

    /// Count for `hour`; zero for undeclared buckets.
    pub fn get(&self, hour: Hour) -> u32 {
        if is_bucket(hour) {
            self.0[(hour - FIRST_HOUR) as usize]
        } else {
            0
        }
    }

    pub fn add(&mut self, hour: Hour, count: u32) {
        if is_bucket(hour) {
            self.0[(hour - FIRST_HOUR) as usize] += count;
        }
    }

    pub fn merge(&mut self, other: &HourCounts) {
        for (mine, theirs) in self.0.iter_mut().zip(other.0.iter()) {
            *mine += theirs;
        }
    }

    /// Sum over the given buckets. Repeated buckets are counted each time.
    pub fn sum_over(&self, hours: &[Hour]) -> u32 {
        hours.iter().map(|&h| self.get(h)).sum()
    }

    pub fn total(&self) -> u32 {
        self.0.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overnight_hours_map_past_midnight() {
        assert_eq!(bucket_for_clock_hour(0), 24);
        assert_eq!(bucket_for_clock_hour(4), 28);
        assert_eq!(bucket_for_clock_hour(5), 5);
        assert_eq!(bucket_for_clock_hour(23), 23);
        assert_eq!(bucket_for_clock_hour(25), 25);
        assert_eq!(bucket_for_clock_hour(29), 5);
    }

    #[test]
    fn test_parse_gtfs_time() {
        assert_eq!(parse_gtfs_time("08:15:30"), Some(8 * 3600 + 15 * 60 + 30));
        assert_eq!(parse_gtfs_time("25:00:00"), Some(25 * 3600));
        assert_eq!(parse_gtfs_time(" 7:05"), Some(7 * 3600 + 5 * 60));
        assert_eq!(parse_gtfs_time("7:65:00"), None);
        assert_eq!(parse_gtfs_time("garbage"), None);
    }

    #[test]
    fn test_counts_ignore_undeclared_buckets() {
        let counts = HourCounts::from_pairs([(4, 9), (5, 1), (28, 2), (29, 7)]);
        assert_eq!(counts.get(4), 0);
        assert_eq!(counts.get(5), 1);
        assert_eq!(counts.get(28), 2);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_sum_over_counts_overlap_twice() {
        let counts = HourCounts::from_pairs([(25, 1), (26, 2)]);
        assert_eq!(counts.sum_over(&[25, 26, 26]), 5);
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(9), "hour_9");
        assert_eq!(parse_column_name("hour_28"), Some(28));
        assert_eq!(parse_column_name("stop_id"), None);
        assert_eq!(all_buckets().count(), HOUR_COUNT);
    }
}
