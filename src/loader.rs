//! CSV loading of schedule directories and the canonical stop table.
//!
//! A schedule directory holds any of `stop_hourly.csv`, `route_hourly.csv`,
//! `route_totals.csv` and `trip_stops.csv`. When the hourly tables are absent
//! but `departures.csv` is present, all tables are derived from departures.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::ClassifyError;
use crate::frequency::{Departure, build_schedule};
use crate::hours::{Hour, HourCounts, is_bucket, parse_column_name};
use crate::model::{Direction, RouteKey, Stop, StopCoordinates};
use crate::schedule::Schedule;
use crate::table::{RouteHourlyTable, RouteTotals, StopHourlyTable, TripStops};

pub const STOP_HOURLY_FILE: &str = "stop_hourly.csv";
pub const ROUTE_HOURLY_FILE: &str = "route_hourly.csv";
pub const ROUTE_TOTALS_FILE: &str = "route_totals.csv";
pub const TRIP_STOPS_FILE: &str = "trip_stops.csv";
pub const DEPARTURES_FILE: &str = "departures.csv";
pub const STOPS_FILE: &str = "stops.csv";

#[derive(Debug, Deserialize)]
struct RouteTotalRow {
    route_id: String,
    direction_id: Direction,
    total_trips: u32,
}

#[derive(Debug, Deserialize)]
struct TripStopRow {
    trip_id: String,
    stop_id: String,
    stop_sequence: u32,
}

/// Loads every table found in `dir`.
pub fn load_schedule(dir: &Path, label: &str) -> Result<Schedule, ClassifyError> {
    if !dir.is_dir() {
        return Err(ClassifyError::invalid(
            dir,
            format!("{} schedule directory does not exist", label),
        ));
    }

    let stop_hourly_path = dir.join(STOP_HOURLY_FILE);
    let departures_path = dir.join(DEPARTURES_FILE);
    if !stop_hourly_path.exists() && departures_path.exists() {
        info!(schedule = label, path = %departures_path.display(), "Deriving tables from departures");
        let departures: Vec<Departure> = read_rows(&departures_path)?;
        return build_schedule(label, &departures).map_err(|(index, time)| {
            ClassifyError::invalid(
                &departures_path,
                format!("row {}: invalid departure_time {:?}", index + 2, time),
            )
        });
    }

    let mut schedule = Schedule::new(label);

    if let Some(path) = existing(dir, STOP_HOURLY_FILE) {
        schedule.stop_hourly = Some(load_stop_hourly(&path)?);
    }
    if let Some(path) = existing(dir, ROUTE_HOURLY_FILE) {
        schedule.route_hourly = Some(load_route_hourly(&path)?);
    }
    if let Some(path) = existing(dir, ROUTE_TOTALS_FILE) {
        schedule.route_totals = Some(load_route_totals(&path)?);
    }
    if let Some(path) = existing(dir, TRIP_STOPS_FILE) {
        schedule.trip_stops = Some(load_trip_stops(&path)?);
    }

    info!(
        schedule = label,
        stops = schedule.stop_hourly.as_ref().map(StopHourlyTable::len),
        routes = schedule.route_hourly.as_ref().map(RouteHourlyTable::len),
        trips = schedule.trip_stops.as_ref().map(TripStops::len),
        has_totals = schedule.route_totals.is_some(),
        "Schedule loaded"
    );

    Ok(schedule)
}

fn existing(dir: &Path, file: &str) -> Option<PathBuf> {
    let path = dir.join(file);
    if path.exists() {
        Some(path)
    } else {
        debug!(path = %path.display(), "Optional table not present");
        None
    }
}

/// Reads `stop_id,hour_5..hour_28`. Missing hour columns count as zero.
pub fn load_stop_hourly(path: &Path) -> Result<StopHourlyTable, ClassifyError> {
    let rows = read_hourly(path, &["stop_id"])?;
    Ok(rows
        .into_iter()
        .map(|(mut keys, counts)| (keys.remove(0), counts))
        .collect())
}

/// Reads `route_id,direction_id,rep_trip_id,hour_5..hour_28`.
pub fn load_route_hourly(path: &Path) -> Result<RouteHourlyTable, ClassifyError> {
    let mut table = RouteHourlyTable::new();
    for (index, (keys, counts)) in read_hourly(path, &["route_id", "direction_id", "rep_trip_id"])?
        .into_iter()
        .enumerate()
    {
        let direction = parse_direction(&keys[1]).map_err(|message| {
            ClassifyError::invalid(path, format!("row {}: {}", index + 2, message))
        })?;
        let route = RouteKey::new(keys[0].clone(), direction);
        table.insert(route, Some(keys[2].clone()), counts);
    }
    Ok(table)
}

/// Reads `route_id,direction_id,total_trips`, summing duplicate keys.
pub fn load_route_totals(path: &Path) -> Result<RouteTotals, ClassifyError> {
    let mut totals = RouteTotals::new();
    for row in read_rows::<RouteTotalRow>(path)? {
        *totals
            .entry(RouteKey::new(row.route_id, row.direction_id))
            .or_default() += row.total_trips;
    }
    Ok(totals)
}

/// Reads `trip_id,stop_id,stop_sequence`.
pub fn load_trip_stops(path: &Path) -> Result<TripStops, ClassifyError> {
    let rows = read_rows::<TripStopRow>(path)?;
    Ok(TripStops::from_sequenced(
        rows.into_iter()
            .map(|row| (row.trip_id, row.stop_id, row.stop_sequence)),
    ))
}

/// Reads the canonical `stop_id,stop_lat,stop_lon` table.
pub fn load_stops(path: &Path) -> Result<StopCoordinates, ClassifyError> {
    let stops = read_rows::<Stop>(path)?;
    info!(path = %path.display(), stops = stops.len(), "Stop coordinates loaded");
    Ok(stops.into_iter().collect())
}

fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, ClassifyError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| input_error(path, source))?;

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|source| input_error(path, source))?;
        rows.push(record);
    }
    Ok(rows)
}

type HourlyRow = (Vec<String>, HourCounts);

fn read_hourly(path: &Path, key_columns: &[&str]) -> Result<Vec<HourlyRow>, ClassifyError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| input_error(path, source))?;
    let headers = rdr
        .headers()
        .map_err(|source| input_error(path, source))?
        .clone();

    let key_indices = key_columns
        .iter()
        .map(|name| {
            headers
                .iter()
                .position(|h| h == *name)
                .ok_or_else(|| ClassifyError::invalid(path, format!("missing column {}", name)))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut hour_indices: Vec<(usize, Hour)> = Vec::new();
    for (index, header) in headers.iter().enumerate() {
        let Some(hour) = parse_column_name(header) else {
            continue;
        };
        match Hour::try_from(hour) {
            Ok(hour) if is_bucket(hour) => hour_indices.push((index, hour)),
            _ => {
                return Err(ClassifyError::invalid(
                    path,
                    format!("column {} is outside the service day", header),
                ));
            }
        }
    }
    if hour_indices.is_empty() {
        warn!(path = %path.display(), "Hourly table has no hour columns");
    }

    let mut rows = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|source| input_error(path, source))?;
        let keys = key_indices
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();

        let mut counts = HourCounts::default();
        for &(index, hour) in &hour_indices {
            let raw = record.get(index).unwrap_or_default();
            let count = parse_count(raw).ok_or_else(|| {
                ClassifyError::invalid(
                    path,
                    format!("row {}: {:?} is not a trip count", line + 2, raw),
                )
            })?;
            counts.add(hour, count);
        }
        rows.push((keys, counts));
    }

    debug!(path = %path.display(), rows = rows.len(), "Hourly table read");
    Ok(rows)
}

/// Empty cells are zero. Whole-number floats (`4.0`) are accepted.
fn parse_count(raw: &str) -> Option<u32> {
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(count) = raw.parse::<u32>() {
        return Some(count);
    }
    let value = raw.parse::<f64>().ok()?;
    (value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64).then_some(value as u32)
}

fn parse_direction(raw: &str) -> Result<Direction, String> {
    let value: u8 = raw
        .parse()
        .map_err(|_| format!("direction_id {:?} is not 0 or 1", raw))?;
    Direction::try_from(value)
}

fn input_error(path: &Path, source: csv::Error) -> ClassifyError {
    ClassifyError::Input {
        path: path.to_path_buf(),
        source,
    }
}
