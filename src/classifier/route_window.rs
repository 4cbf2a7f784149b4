use std::collections::BTreeSet;
use tracing::debug;

use crate::classifier::rule::WindowRule;
use crate::model::{RouteId, RouteKey, TripId};
use crate::table::{RouteHourlyTable, RouteTotals, StopSet, TripStops};

/// Route/direction rows that satisfy `rule`.
pub fn qualifying_routes(routes: &RouteHourlyTable, rule: &WindowRule) -> BTreeSet<RouteKey> {
    routes
        .counts
        .iter()
        .filter(|(_, counts)| rule.passes(counts))
        .map(|(key, _)| key.clone())
        .collect()
}

/// Stops reached by routes that are frequent enough under `primary` and, when
/// given, `secondary`.
///
/// Qualification is per route id: a route qualifies when any of its
/// directions passes `primary` and, with two rules, any direction passes
/// `secondary`. The representative trips of every direction of a qualifying
/// route contribute their stops.
pub fn evaluate_route_windows(
    routes: &RouteHourlyTable,
    trips: &TripStops,
    primary: &WindowRule,
    secondary: Option<&WindowRule>,
) -> StopSet {
    let passing = qualifying_routes(routes, primary);

    let mut qualifying = route_ids(passing.iter());
    if let Some(secondary) = secondary {
        let second = route_ids(qualifying_routes(routes, secondary).iter());
        qualifying.retain(|route_id| second.contains(route_id));
    }
    let rep_trips = representative_trips_of(routes, &qualifying);

    debug!(
        routes = qualifying.len(),
        rep_trips = rep_trips.len(),
        "Route window qualification"
    );
    stops_of_trips(trips, rep_trips)
}

/// Stops reached by routes with a direction operating at least `min_trips`
/// trips over the day. Every direction of such a route contributes its
/// representative trip.
pub fn evaluate_daily_trips(
    totals: &RouteTotals,
    routes: &RouteHourlyTable,
    trips: &TripStops,
    min_trips: u32,
) -> StopSet {
    let qualifying = route_ids(
        totals
            .iter()
            .filter(|&(_, &total)| total >= min_trips)
            .map(|(key, _)| key),
    );
    let rep_trips = representative_trips_of(routes, &qualifying);

    debug!(
        min_trips,
        routes = qualifying.len(),
        rep_trips = rep_trips.len(),
        "Daily trip qualification"
    );
    stops_of_trips(trips, rep_trips)
}

fn route_ids<'a>(keys: impl IntoIterator<Item = &'a RouteKey>) -> BTreeSet<RouteId> {
    keys.into_iter().map(|key| key.route_id.clone()).collect()
}

/// Representative trips of every direction of the given routes.
fn representative_trips_of<'a>(
    routes: &'a RouteHourlyTable,
    route_ids: &BTreeSet<RouteId>,
) -> Vec<&'a TripId> {
    routes
        .representative_trips()
        .filter(|(key, _)| route_ids.contains(&key.route_id))
        .map(|(_, trip)| trip)
        .collect()
}

fn stops_of_trips<'a>(trips: &TripStops, rep_trips: impl IntoIterator<Item = &'a TripId>) -> StopSet {
    rep_trips
        .into_iter()
        .flat_map(|trip_id| trips.stops_of(trip_id))
        .cloned()
        .collect()
}
