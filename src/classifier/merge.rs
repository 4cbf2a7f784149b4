use std::collections::BTreeMap;

use crate::model::{Coordinate, StopCoordinates, StopId};
use crate::table::StopSet;

/// Marker written for a stop that belongs to a tier.
pub const MEMBER: &str = "1";

/// One output row: tier memberships in column order plus coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalRow {
    pub stop_id: StopId,
    pub tiers: Vec<bool>,
    pub coordinate: Option<Coordinate>,
}

impl FinalRow {
    /// `"1"` for member tiers, empty otherwise.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.tiers
            .iter()
            .map(|&member| if member { MEMBER } else { "" })
    }
}

/// The merged per-stop table, one row per stop id sorted by id.
#[derive(Debug, Clone, Default)]
pub struct FinalTable {
    pub tier_columns: Vec<String>,
    pub rows: Vec<FinalRow>,
}

impl FinalTable {
    /// Header in output order: stop id, tiers, latitude, longitude.
    pub fn header(&self) -> Vec<&str> {
        std::iter::once("stop_id")
            .chain(self.tier_columns.iter().map(String::as_str))
            .chain(["stop_lat", "stop_lon"])
            .collect()
    }

    pub fn count(&self, column: &str) -> usize {
        let Some(index) = self.tier_columns.iter().position(|c| c == column) else {
            return 0;
        };
        self.rows.iter().filter(|row| row.tiers[index]).count()
    }
}

/// Full outer union of every tier set and the coordinate table, keyed by
/// stop id.
///
/// `tiers` are in output column order. A stop missing from `coordinates`
/// keeps empty coordinates; a stop in no tier keeps all markers empty.
pub fn merge_results(tiers: &[(String, StopSet)], coordinates: &StopCoordinates) -> FinalTable {
    let mut rows: BTreeMap<&StopId, Vec<bool>> = coordinates
        .stop_ids()
        .map(|stop_id| (stop_id, vec![false; tiers.len()]))
        .collect();

    for (index, (_, stops)) in tiers.iter().enumerate() {
        for stop_id in stops {
            rows.entry(stop_id)
                .or_insert_with(|| vec![false; tiers.len()])[index] = true;
        }
    }

    FinalTable {
        tier_columns: tiers.iter().map(|(column, _)| column.clone()).collect(),
        rows: rows
            .into_iter()
            .map(|(stop_id, tiers)| FinalRow {
                stop_id: stop_id.clone(),
                tiers,
                coordinate: coordinates.get(stop_id),
            })
            .collect(),
    }
}
