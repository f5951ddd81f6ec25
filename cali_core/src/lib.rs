#![forbid(unsafe_code)]

//! Core domain model and business logic for the Cali skill tracker.
//!
//! This crate provides:
//! - Domain types (exercises, roadmaps, sets, sessions, workout state)
//! - The compiled-in exercise catalog
//! - The workout store and its session state machine
//! - Goal evaluation for Elite skill advancement
//! - Snapshot persistence, statistics, and CSV export

pub mod types;
pub mod error;
pub mod catalog;
pub mod config;
pub mod logging;
pub mod goal;
pub mod state;
pub mod store;
pub mod stats;
pub mod export;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use catalog::{build_default_catalog, get_default_catalog, Catalog};
pub use config::Config;
pub use store::WorkoutStore;
pub use stats::{category_stats, elite_stats, weak_point, CategoryStats, EliteStats};
pub use export::export_history;
