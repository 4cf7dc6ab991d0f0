//! API Module
//!
//! HTTP handlers, session extraction and routing for the expense tracker.

pub mod handlers;
pub mod routes;
pub mod session;

pub use handlers::*;
pub use routes::create_router;
pub use session::{BearerSession, SignedIn};
