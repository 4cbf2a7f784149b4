//! One representative service day reduced to the tables the classifier reads.

use crate::error::ClassifyError;
use crate::table::{RouteHourlyTable, RouteTotals, StopHourlyTable, TripStops};

/// Tables for a single service day (weekday or weekend).
///
/// Every table is optional: a missing table only becomes an error when a tier
/// actually needs it.
#[derive(Debug, Clone, Default)]
pub struct Schedule {
    pub label: String,
    pub stop_hourly: Option<StopHourlyTable>,
    pub route_hourly: Option<RouteHourlyTable>,
    pub route_totals: Option<RouteTotals>,
    pub trip_stops: Option<TripStops>,
}

impl Schedule {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_stop_hourly(mut self, table: StopHourlyTable) -> Self {
        self.stop_hourly = Some(table);
        self
    }

    pub fn with_route_hourly(mut self, table: RouteHourlyTable) -> Self {
        self.route_hourly = Some(table);
        self
    }

    pub fn with_route_totals(mut self, totals: RouteTotals) -> Self {
        self.route_totals = Some(totals);
        self
    }

    pub fn with_trip_stops(mut self, trips: TripStops) -> Self {
        self.trip_stops = Some(trips);
        self
    }

    pub fn require_stop_hourly(&self, tier: &str) -> Result<&StopHourlyTable, ClassifyError> {
        self.stop_hourly
            .as_ref()
            .ok_or_else(|| ClassifyError::missing(tier, &self.label, "stop hourly"))
    }

    pub fn require_route_hourly(&self, tier: &str) -> Result<&RouteHourlyTable, ClassifyError> {
        self.route_hourly
            .as_ref()
            .ok_or_else(|| ClassifyError::missing(tier, &self.label, "route hourly"))
    }

    pub fn require_route_totals(&self, tier: &str) -> Result<&RouteTotals, ClassifyError> {
        self.route_totals
            .as_ref()
            .ok_or_else(|| ClassifyError::missing(tier, &self.label, "route totals"))
    }

    pub fn require_trip_stops(&self, tier: &str) -> Result<&TripStops, ClassifyError> {
        self.trip_stops
            .as_ref()
            .ok_or_else(|| ClassifyError::missing(tier, &self.label, "trip stops"))
    }
}
