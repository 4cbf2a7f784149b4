//! Frequency tier classification.
//!
//! Each tier combines stop-level window rules, night segments and route-level
//! qualification on the weekday schedule, optionally gated by the weekend
//! schedule. Per-tier stop sets are then merged with stop coordinates into a
//! single per-stop table.

pub mod merge;
pub mod night;
pub mod route_window;
pub mod rule;
pub mod stop_window;
pub mod tier;
pub mod utility;

pub use merge::{FinalRow, FinalTable, merge_results};
pub use rule::WindowRule;
pub use tier::{
    RouteGate, TierDefinition, TierOutcome, TierRule, WindowedTier, classify_all, classify_tier,
    validate_tiers,
};
