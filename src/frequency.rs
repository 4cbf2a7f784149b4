//! Derives the hourly tables of a [`Schedule`] from raw stop departures.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::hours::{HourCounts, bucket_for_seconds, parse_gtfs_time};
use crate::model::{Direction, RouteId, RouteKey, StopId, TripId};
use crate::schedule::Schedule;
use crate::table::{RouteHourlyTable, RouteTotals, StopHourlyTable, TripStops};

/// One scheduled departure of one trip from one stop on the service date.
#[derive(Debug, Clone, Deserialize)]
pub struct Departure {
    pub stop_id: StopId,
    pub trip_id: TripId,
    pub route_id: RouteId,
    pub direction_id: Direction,
    pub departure_time: String,
}

#[derive(Default)]
struct TripAccumulator {
    route: Option<RouteKey>,
    first_departure: u32,
    stops: Vec<(u32, StopId)>,
}

/// Builds every table of a schedule from departures.
///
/// - stop counts: one per departure, in the departure's bucket;
/// - route counts: one per distinct trip, in the bucket of its earliest
///   departure; the same trips give the daily totals;
/// - representative trip: the trip of each route/direction that visits the
///   most distinct stops, smallest trip id on ties.
///
/// Returns `Err((index, time))` for the first departure whose time cannot be
/// parsed.
pub fn build_schedule(
    label: &str,
    departures: &[Departure],
) -> Result<Schedule, (usize, String)> {
    let mut stop_counts: BTreeMap<StopId, HourCounts> = BTreeMap::new();
    let mut trips: BTreeMap<&str, TripAccumulator> = BTreeMap::new();

    for (index, departure) in departures.iter().enumerate() {
        let seconds = parse_gtfs_time(&departure.departure_time)
            .ok_or_else(|| (index, departure.departure_time.clone()))?;

        stop_counts
            .entry(departure.stop_id.clone())
            .or_default()
            .add(bucket_for_seconds(seconds), 1);

        let trip = trips.entry(departure.trip_id.as_str()).or_insert_with(|| TripAccumulator {
            first_departure: seconds,
            ..Default::default()
        });
        if trip.route.is_none() {
            trip.route = Some(RouteKey::new(
                departure.route_id.clone(),
                departure.direction_id,
            ));
        }
        trip.first_departure = trip.first_departure.min(seconds);
        trip.stops.push((seconds, departure.stop_id.clone()));
    }

    let mut route_counts: BTreeMap<RouteKey, HourCounts> = BTreeMap::new();
    let mut route_totals = RouteTotals::new();
    let mut representatives: BTreeMap<RouteKey, (usize, &str)> = BTreeMap::new();
    let mut trip_stops = TripStops::new();

    for (trip_id, mut trip) in trips {
        let Some(route) = trip.route else { continue };

        route_counts
            .entry(route.clone())
            .or_default()
            .add(bucket_for_seconds(trip.first_departure), 1);
        *route_totals.entry(route.clone()).or_default() += 1;

        trip.stops.sort_by_key(|(seconds, _)| *seconds);
        let ordered: Vec<StopId> = trip.stops.into_iter().map(|(_, stop)| stop).collect();
        let distinct = ordered.iter().collect::<BTreeSet<_>>().len();

        // Trips are visited in id order, so a strict comparison keeps the
        // smallest id among equally long trips.
        representatives
            .entry(route)
            .and_modify(|best| {
                if distinct > best.0 {
                    *best = (distinct, trip_id);
                }
            })
            .or_insert((distinct, trip_id));

        trip_stops.insert(trip_id.to_string(), ordered);
    }

    let mut route_hourly = RouteHourlyTable::new();
    for (route, counts) in route_counts {
        let rep = representatives.get(&route).map(|(_, trip)| trip.to_string());
        route_hourly.insert(route, rep, counts);
    }

    let stop_hourly: StopHourlyTable = stop_counts.into_iter().collect();

    debug!(
        schedule = label,
        departures = departures.len(),
        stops = stop_hourly.len(),
        routes = route_hourly.len(),
        trips = trip_stops.len(),
        "Derived hourly tables from departures"
    );

    Ok(Schedule::new(label)
        .with_stop_hourly(stop_hourly)
        .with_route_hourly(route_hourly)
        .with_route_totals(route_totals)
        .with_trip_stops(trip_stops))
}
