//! Identifiers and reference entities shared by the loaders and the classifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type StopId = String;
pub type RouteId = String;
pub type TripId = String;

/// GTFS `direction_id`: `0` or `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl TryFrom<u8> for Direction {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Direction::Outbound),
            1 => Ok(Direction::Inbound),
            other => Err(format!("direction_id must be 0 or 1, got {}", other)),
        }
    }
}

impl From<Direction> for u8 {
    fn from(value: Direction) -> Self {
        match value {
            Direction::Outbound => 0,
            Direction::Inbound => 1,
        }
    }
}

/// Key of a route-level row: one route travelling one way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    pub route_id: RouteId,
    pub direction: Direction,
}

impl RouteKey {
    pub fn new(route_id: impl Into<RouteId>, direction: Direction) -> Self {
        Self {
            route_id: route_id.into(),
            direction,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.route_id, u8::from(self.direction))
    }
}

/// A row of the canonical stop table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stop {
    pub stop_id: StopId,
    pub stop_lat: f64,
    pub stop_lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

/// Stop id -> coordinate lookup used when building the final table.
#[derive(Debug, Clone, Default)]
pub struct StopCoordinates(BTreeMap<StopId, Coordinate>);

impl StopCoordinates {
    pub fn get(&self, stop_id: &str) -> Option<Coordinate> {
        self.0.get(stop_id).copied()
    }

    pub fn insert(&mut self, stop: Stop) {
        self.0.insert(
            stop.stop_id,
            Coordinate {
                lat: stop.stop_lat,
                lon: stop.stop_lon,
            },
        );
    }

    pub fn stop_ids(&self) -> impl Iterator<Item = &StopId> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Stop> for StopCoordinates {
    fn from_iter<I: IntoIterator<Item = Stop>>(iter: I) -> Self {
        let mut coords = StopCoordinates::default();
        for stop in iter {
            coords.insert(stop);
        }
        coords
    }
}
