//! Read-only tables the classifier consumes.

use std::collections::{BTreeMap, BTreeSet};

use crate::hours::HourCounts;
use crate::model::{RouteKey, StopId, TripId};

/// Set of qualifying stops. Ordered so output and logs are deterministic.
pub type StopSet = BTreeSet<StopId>;

/// Trips observed per hour bucket, one row per key.
///
/// Inserting an existing key sums into the existing row, so the table always
/// holds exactly one row per key.
#[derive(Debug, Clone)]
pub struct HourlyFrequencyTable<K: Ord> {
    rows: BTreeMap<K, HourCounts>,
}

impl<K: Ord> Default for HourlyFrequencyTable<K> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<K: Ord> HourlyFrequencyTable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: K, counts: HourCounts) {
        self.rows.entry(key).or_default().merge(&counts);
    }

    pub fn get(&self, key: &K) -> Option<&HourCounts> {
        self.rows.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &HourCounts)> {
        self.rows.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.rows.keys()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<K: Ord> FromIterator<(K, HourCounts)> for HourlyFrequencyTable<K> {
    fn from_iter<I: IntoIterator<Item = (K, HourCounts)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (key, counts) in iter {
            table.insert(key, counts);
        }
        table
    }
}

pub type StopHourlyTable = HourlyFrequencyTable<StopId>;

/// Route/direction hourly counts together with the representative trip of
/// each route/direction.
#[derive(Debug, Clone, Default)]
pub struct RouteHourlyTable {
    pub counts: HourlyFrequencyTable<RouteKey>,
    representative_trips: BTreeMap<RouteKey, TripId>,
}

impl RouteHourlyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row. An empty `rep_trip_id` leaves the route without a
    /// representative trip, so it can never expand to stops.
    pub fn insert(&mut self, key: RouteKey, rep_trip_id: Option<TripId>, counts: HourCounts) {
        if let Some(trip_id) = rep_trip_id.filter(|t| !t.is_empty()) {
            self.representative_trips
                .entry(key.clone())
                .or_insert(trip_id);
        }
        self.counts.insert(key, counts);
    }

    pub fn representative_trip(&self, key: &RouteKey) -> Option<&TripId> {
        self.representative_trips.get(key)
    }

    /// All route/directions that have a representative trip.
    pub fn representative_trips(&self) -> impl Iterator<Item = (&RouteKey, &TripId)> {
        self.representative_trips.iter()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Total trips operated per route/direction over the whole service day.
pub type RouteTotals = BTreeMap<RouteKey, u32>;

/// Which stops each trip visits, in visiting order.
#[derive(Debug, Clone, Default)]
pub struct TripStops(BTreeMap<TripId, Vec<StopId>>);

impl TripStops {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds membership from `(trip_id, stop_id, stop_sequence)` rows.
    pub fn from_sequenced(rows: impl IntoIterator<Item = (TripId, StopId, u32)>) -> Self {
        let mut by_trip: BTreeMap<TripId, Vec<(u32, StopId)>> = BTreeMap::new();
        for (trip_id, stop_id, sequence) in rows {
            by_trip.entry(trip_id).or_default().push((sequence, stop_id));
        }

        let trips = by_trip
            .into_iter()
            .map(|(trip_id, mut stops)| {
                stops.sort_by_key(|(sequence, _)| *sequence);
                (trip_id, stops.into_iter().map(|(_, stop)| stop).collect())
            })
            .collect();
        Self(trips)
    }

    pub fn insert(&mut self, trip_id: TripId, stops: Vec<StopId>) {
        self.0.insert(trip_id, stops);
    }

    /// Stops of `trip_id`; empty when the trip is unknown.
    pub fn stops_of(&self, trip_id: &str) -> &[StopId] {
        self.0.get(trip_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;

    #[test]
    fn test_duplicate_keys_are_summed() {
        let table: StopHourlyTable = vec![
            ("A".to_string(), HourCounts::from_pairs([(9, 2)])),
            ("A".to_string(), HourCounts::from_pairs([(9, 1), (10, 4)])),
        ]
        .into_iter()
        .collect();

        assert_eq!(table.len(), 1);
        let row = table.get(&"A".to_string()).unwrap();
        assert_eq!(row.get(9), 3);
        assert_eq!(row.get(10), 4);
    }

    #[test]
    fn test_route_without_rep_trip() {
        let mut routes = RouteHourlyTable::new();
        let key = RouteKey::new("1", Direction::Outbound);
        routes.insert(key.clone(), Some(String::new()), HourCounts::default());

        assert_eq!(routes.len(), 1);
        assert!(routes.representative_trip(&key).is_none());
    }

    #[test]
    fn test_first_rep_trip_is_kept() {
        let mut routes = RouteHourlyTable::new();
        let key = RouteKey::new("1", Direction::Outbound);
        routes.insert(key.clone(), Some("t1".into()), HourCounts::default());
        routes.insert(key.clone(), Some("t2".into()), HourCounts::default());

        assert_eq!(routes.representative_trip(&key).map(String::as_str), Some("t1"));
    }

    #[test]
    fn test_trip_stops_follow_sequence() {
        let trips = TripStops::from_sequenced(vec![
            ("t1".to_string(), "C".to_string(), 3),
            ("t1".to_string(), "A".to_string(), 1),
            ("t1".to_string(), "B".to_string(), 2),
        ]);

        assert_eq!(trips.stops_of("t1"), ["A", "B", "C"]);
        assert!(trips.stops_of("missing").is_empty());
    }
}
