pub mod classifier;
pub mod config;
pub mod error;
pub mod frequency;
pub mod hours;
pub mod loader;
pub mod model;
pub mod output;
pub mod schedule;
pub mod table;
