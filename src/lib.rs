//! TripTrack - group expense tracker backend
//!
//! Serves the expenses of a trip group through a cached data-access layer
//! over a hosted data service, and fronts the static app shell with an
//! offline cache.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod expenses;
pub mod form;
pub mod models;
pub mod remote;
pub mod tasks;
pub mod test_util;
pub mod views;
pub mod worker;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{Result, TrackerError};
pub use expenses::ExpenseService;
pub use tasks::spawn_cleanup_task;
