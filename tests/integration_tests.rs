use std::fs;
use std::path::{Path, PathBuf};

use stop_tiers::classifier::{classify_all, merge_results};
use stop_tiers::config::TierConfig;
use stop_tiers::error::ClassifyError;
use stop_tiers::loader::{
    ROUTE_HOURLY_FILE, ROUTE_TOTALS_FILE, STOP_HOURLY_FILE, STOPS_FILE, TRIP_STOPS_FILE,
    load_schedule, load_stops,
};
use stop_tiers::output::write_final_table;
use stop_tiers::table::StopSet;

const PEAK: [u32; 8] = [9, 10, 11, 12, 13, 14, 15, 16];
const EXTENDED: [u32; 8] = [6, 7, 8, 17, 18, 19, 20, 21];

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn hour_header() -> String {
    (5..=28).map(|h| format!("hour_{}", h)).collect::<Vec<_>>().join(",")
}

/// Renders 24 hourly cells from `(hour, count)` pairs; other hours are zero.
fn hour_cells(counts: &[(u32, u32)]) -> String {
    (5..=28)
        .map(|h| {
            counts
                .iter()
                .filter(|(hour, _)| *hour == h)
                .map(|(_, n)| *n)
                .sum::<u32>()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn every(hours: &[u32], count: u32) -> Vec<(u32, u32)> {
    hours.iter().map(|&h| (h, count)).collect()
}

fn write_stop_hourly(dir: &Path, rows: &[(&str, Vec<(u32, u32)>)]) {
    let mut content = format!("stop_id,{}\n", hour_header());
    for (stop_id, counts) in rows {
        content.push_str(&format!("{},{}\n", stop_id, hour_cells(counts)));
    }
    fs::write(dir.join(STOP_HOURLY_FILE), content).unwrap();
}

fn write_route_hourly(dir: &Path, counts: &[(u32, u32)]) {
    let content = format!(
        "route_id,direction_id,rep_trip_id,{}\nr,0,t1,{}\n",
        hour_header(),
        hour_cells(counts)
    );
    fs::write(dir.join(ROUTE_HOURLY_FILE), content).unwrap();
}

/// Weekday schedule: stop A and stop B run every 15 minutes all day; route
/// `r` visits A, B and D on its representative trip.
fn weekday_dir(name: &str) -> PathBuf {
    let dir = temp_dir(name);
    let all_day: Vec<(u32, u32)> = every(&PEAK, 4)
        .into_iter()
        .chain(every(&EXTENDED, 4))
        .collect();

    write_stop_hourly(&dir, &[("A", all_day.clone()), ("B", all_day.clone())]);
    write_route_hourly(&dir, &all_day);
    fs::write(
        dir.join(ROUTE_TOTALS_FILE),
        "route_id,direction_id,total_trips\nr,0,64\n",
    )
    .unwrap();
    fs::write(
        dir.join(TRIP_STOPS_FILE),
        "trip_id,stop_id,stop_sequence\nt1,A,1\nt1,B,2\nt1,D,3\n",
    )
    .unwrap();
    fs::write(
        dir.join(STOPS_FILE),
        "stop_id,stop_lat,stop_lon\nA,47.5,-122.25\nB,47.75,-122.5\nC,48,-123\n",
    )
    .unwrap();
    dir
}

/// Weekend schedule: A keeps four trips an hour; B drops one trip in the
/// last midday hour for a total of 31.
fn weekend_dir(name: &str) -> PathBuf {
    let dir = temp_dir(name);
    let mut b_counts = every(&PEAK, 4);
    b_counts[7] = (16, 3);

    write_stop_hourly(&dir, &[("A", every(&PEAK, 4)), ("B", b_counts)]);
    write_route_hourly(&dir, &every(&PEAK, 4));
    dir
}

#[test]
fn test_level1_requires_weekend_service() {
    let weekday_path = weekday_dir("stop_tiers_it_level1_weekday");
    let weekend_path = weekend_dir("stop_tiers_it_level1_weekend");

    let weekday = load_schedule(&weekday_path, "weekday").unwrap();
    let weekend = load_schedule(&weekend_path, "weekend").unwrap();
    let config = TierConfig::default();
    config.validate().unwrap();

    let outcomes = classify_all(&config.tiers, &weekday, &weekend);
    assert!(outcomes.iter().all(|o| o.result.is_ok()));

    let level1 = outcomes.iter().find(|o| o.column == "level1").unwrap();
    assert_eq!(level1.stops(), StopSet::from(["A".to_string()]));

    let level5 = outcomes.iter().find(|o| o.column == "level5").unwrap();
    assert_eq!(
        level5.stops(),
        StopSet::from(["A".to_string(), "B".to_string(), "D".to_string()])
    );

    // no overnight service anywhere
    let nights = outcomes.iter().find(|o| o.column == "levelNights").unwrap();
    assert!(nights.stops().is_empty());

    fs::remove_dir_all(&weekday_path).unwrap();
    fs::remove_dir_all(&weekend_path).unwrap();
}

#[test]
fn test_full_pipeline_writes_final_table() {
    let weekday_path = weekday_dir("stop_tiers_it_pipeline_weekday");
    let weekend_path = weekend_dir("stop_tiers_it_pipeline_weekend");
    let output = std::env::temp_dir().join("stop_tiers_it_pipeline.csv");

    let weekday = load_schedule(&weekday_path, "weekday").unwrap();
    let weekend = load_schedule(&weekend_path, "weekend").unwrap();
    let coordinates = load_stops(&weekday_path.join(STOPS_FILE)).unwrap();
    let config = TierConfig::default();

    let outcomes = classify_all(&config.tiers, &weekday, &weekend);
    let tier_sets: Vec<(String, StopSet)> = outcomes
        .iter()
        .map(|o| (o.column.clone(), o.stops()))
        .collect();
    let table = merge_results(&tier_sets, &coordinates);
    write_final_table(output.to_str().unwrap(), &table).unwrap();

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(
        lines,
        [
            "stop_id,level6,level5,level4,level3,level2,level1,levelNights,stop_lat,stop_lon",
            "A,1,1,1,1,1,1,,47.5,-122.25",
            "B,1,1,1,1,1,,,47.75,-122.5",
            "C,,,,,,,,48,-123",
            "D,1,1,,,,,,,",
        ]
    );

    fs::remove_file(&output).unwrap();
    fs::remove_dir_all(&weekday_path).unwrap();
    fs::remove_dir_all(&weekend_path).unwrap();
}

#[test]
fn test_missing_weekend_tables_fail_only_weekend_tiers() {
    let weekday_path = weekday_dir("stop_tiers_it_missing_weekday");
    let weekend_path = temp_dir("stop_tiers_it_missing_weekend");

    let weekday = load_schedule(&weekday_path, "weekday").unwrap();
    let weekend = load_schedule(&weekend_path, "weekend").unwrap();
    let config = TierConfig::default();

    let outcomes = classify_all(&config.tiers, &weekday, &weekend);
    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.result.is_err())
        .map(|o| o.column.as_str())
        .collect();
    assert_eq!(failed, ["level3", "level2", "level1"]);

    let level1 = outcomes.iter().find(|o| o.column == "level1").unwrap();
    assert!(matches!(
        level1.result,
        Err(ClassifyError::MissingInput { .. })
    ));
    assert!(level1.stops().is_empty());

    let level4 = outcomes.iter().find(|o| o.column == "level4").unwrap();
    assert_eq!(
        level4.stops(),
        StopSet::from(["A".to_string(), "B".to_string()])
    );

    fs::remove_dir_all(&weekday_path).unwrap();
    fs::remove_dir_all(&weekend_path).unwrap();
}
