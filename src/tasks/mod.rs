//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Query cache sweep: drops results that have been stale for longer than
//!   the retention window

mod cleanup;

pub use cleanup::spawn_cleanup_task;
