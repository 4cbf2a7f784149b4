//! Tier definitions and the per-tier classification pipeline.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, error, info, warn};

use crate::classifier::night::evaluate_night_segments;
use crate::classifier::route_window::{evaluate_daily_trips, evaluate_route_windows};
use crate::classifier::rule::WindowRule;
use crate::classifier::stop_window::evaluate_stop_window;
use crate::classifier::utility::intersect_all;
use crate::error::ClassifyError;
use crate::schedule::Schedule;
use crate::table::StopSet;

/// One named frequency tier and the rule that decides membership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDefinition {
    pub name: String,
    /// Output column id, e.g. `level1`.
    pub column: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    pub rule: TierRule,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TierRule {
    /// A route/direction qualifies on its total trips over the weekday.
    DailyTrips { min_trips: u32 },
    /// Stop-level and route-level window rules that must all agree.
    Windowed(WindowedTier),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowedTier {
    pub peak: Option<WindowRule>,
    pub extended: Option<WindowRule>,
    pub weekend: Option<WindowRule>,
    pub night_segments: Vec<WindowRule>,
    pub weekend_required: bool,
    pub route_gate: RouteGate,
}

/// Which weekday rules gate route-level qualification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteGate {
    /// Peak when defined, otherwise extended.
    #[default]
    PreferPeak,
    /// Routes must pass both peak and extended.
    PeakAndExtended,
}

impl TierDefinition {
    pub fn daily_trips(name: &str, column: &str, min_trips: u32) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            enabled: true,
            rule: TierRule::DailyTrips { min_trips },
        }
    }

    pub fn windowed(name: &str, column: &str, tier: WindowedTier) -> Self {
        Self {
            name: name.to_string(),
            column: column.to_string(),
            enabled: true,
            rule: TierRule::Windowed(tier),
        }
    }

    pub fn validate(&self) -> Result<(), ClassifyError> {
        let tier = self.column.as_str();
        if tier.is_empty() {
            return Err(ClassifyError::configuration(&self.name, "column id is empty"));
        }

        let TierRule::Windowed(windows) = &self.rule else {
            return Ok(());
        };

        for (label, rule) in [
            ("peak", &windows.peak),
            ("extended", &windows.extended),
            ("weekend", &windows.weekend),
        ] {
            if let Some(rule) = rule {
                rule.validate(tier, label)?;
            }
        }
        for segment in &windows.night_segments {
            segment.validate(tier, "night segment")?;
        }

        if windows.peak.is_none() && windows.extended.is_none() && windows.night_segments.is_empty()
        {
            return Err(ClassifyError::configuration(
                tier,
                "needs a peak, extended or night segment window",
            ));
        }
        if windows.weekend_required && windows.weekend.is_none() {
            return Err(ClassifyError::configuration(
                tier,
                "weekend is required but no weekend window is defined",
            ));
        }
        if windows.route_gate == RouteGate::PeakAndExtended
            && (windows.peak.is_none() || windows.extended.is_none())
        {
            return Err(ClassifyError::configuration(
                tier,
                "peak_and_extended route gate needs both peak and extended windows",
            ));
        }
        Ok(())
    }
}

/// Validates every tier and rejects duplicate column ids.
pub fn validate_tiers(tiers: &[TierDefinition]) -> Result<(), ClassifyError> {
    let mut columns = BTreeSet::new();
    for tier in tiers {
        tier.validate()?;
        if !columns.insert(tier.column.as_str()) {
            return Err(ClassifyError::configuration(
                &tier.column,
                "column id is used by more than one tier",
            ));
        }
    }
    Ok(())
}

impl WindowedTier {
    /// Weekday rules that gate route-level qualification, primary first.
    fn route_rules(&self) -> Option<(&WindowRule, Option<&WindowRule>)> {
        match self.route_gate {
            RouteGate::PreferPeak => self
                .peak
                .as_ref()
                .or(self.extended.as_ref())
                .map(|rule| (rule, None)),
            RouteGate::PeakAndExtended => Some((self.peak.as_ref()?, Some(self.extended.as_ref()?))),
        }
    }
}

/// Stop-level windows must all pass, then the route gate, all on one schedule.
fn qualify_service_day(
    tier: &str,
    schedule: &Schedule,
    windows: &[&WindowRule],
    night_segments: &[WindowRule],
    route_rules: Option<(&WindowRule, Option<&WindowRule>)>,
) -> Result<StopSet, ClassifyError> {
    let stops = schedule.require_stop_hourly(tier)?;

    let mut stop_results: Vec<StopSet> = windows
        .iter()
        .map(|rule| evaluate_stop_window(stops, rule))
        .collect();
    if !night_segments.is_empty() {
        stop_results.push(evaluate_night_segments(stops, night_segments));
    }
    debug!(
        schedule = %schedule.label,
        sizes = ?stop_results.iter().map(|s| s.len()).collect::<Vec<_>>(),
        "Stop-level results"
    );
    let stop_level = intersect_all(stop_results);

    let Some((primary, secondary)) = route_rules else {
        return Ok(stop_level);
    };
    let routes = schedule.require_route_hourly(tier)?;
    let trips = schedule.require_trip_stops(tier)?;
    let route_level = evaluate_route_windows(routes, trips, primary, secondary);

    debug!(
        schedule = %schedule.label,
        stop_level = stop_level.len(),
        route_level = route_level.len(),
        "Combining stop and route evidence"
    );
    Ok(intersect_all([stop_level, route_level]))
}

/// Computes the qualifying stops of one tier.
#[tracing::instrument(skip_all, fields(tier = %tier.column))]
pub fn classify_tier(
    tier: &TierDefinition,
    weekday: &Schedule,
    weekend: &Schedule,
) -> Result<StopSet, ClassifyError> {
    let column = tier.column.as_str();

    match &tier.rule {
        TierRule::DailyTrips { min_trips } => {
            let totals = weekday.require_route_totals(column)?;
            let routes = weekday.require_route_hourly(column)?;
            let trips = weekday.require_trip_stops(column)?;
            Ok(evaluate_daily_trips(totals, routes, trips, *min_trips))
        }
        TierRule::Windowed(windows) => {
            let weekday_windows: Vec<&WindowRule> =
                windows.peak.iter().chain(windows.extended.iter()).collect();
            let weekday_stops = qualify_service_day(
                column,
                weekday,
                &weekday_windows,
                &windows.night_segments,
                windows.route_rules(),
            )?;

            let Some(weekend_rule) = windows.weekend.as_ref().filter(|_| windows.weekend_required)
            else {
                return Ok(weekday_stops);
            };
            let weekend_stops = qualify_service_day(
                column,
                weekend,
                &[weekend_rule],
                &[],
                Some((weekend_rule, None)),
            )?;
            debug!(
                weekday = weekday_stops.len(),
                weekend = weekend_stops.len(),
                "Applying weekend requirement"
            );
            Ok(intersect_all([weekday_stops, weekend_stops]))
        }
    }
}

/// Result of classifying one tier.
#[derive(Debug)]
pub struct TierOutcome {
    pub column: String,
    pub name: String,
    pub result: Result<StopSet, ClassifyError>,
}

impl TierOutcome {
    /// Qualifying stops; a failed tier contributes none.
    pub fn stops(&self) -> StopSet {
        self.result.as_ref().cloned().unwrap_or_default()
    }
}

/// Classifies every enabled tier independently, in order.
///
/// A tier failing on missing input does not stop the others. Empty tiers
/// are reported as warnings.
pub fn classify_all(
    tiers: &[TierDefinition],
    weekday: &Schedule,
    weekend: &Schedule,
) -> Vec<TierOutcome> {
    tiers
        .iter()
        .filter(|tier| tier.enabled)
        .map(|tier| {
            let result = classify_tier(tier, weekday, weekend);
            match &result {
                Ok(stops) if stops.is_empty() => {
                    warn!(tier = %tier.column, "No stops qualify for tier")
                }
                Ok(stops) => info!(tier = %tier.column, stops = stops.len(), "Tier classified"),
                Err(e) => error!(tier = %tier.column, error = %e, "Tier classification failed"),
            }
            TierOutcome {
                column: tier.column.clone(),
                name: tier.name.clone(),
                result,
            }
        })
        .collect()
}
