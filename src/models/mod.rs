//! Domain types and response bodies
//!
//! `expense` holds the records read from the data service and the values
//! derived from them; `responses` holds the JSON bodies the HTTP API returns.

pub mod expense;
pub mod notification;
pub mod responses;

// Re-export commonly used types
pub use expense::{Category, Expense, ExpenseWithOwner, ExpensesData, Profile, TeamMember};
pub use notification::{Notification, NotificationKind};
pub use responses::{
    HealthResponse, InvalidateResponse, LandingResponse, MutationResponse, SignOutResponse,
    StatsResponse,
};
