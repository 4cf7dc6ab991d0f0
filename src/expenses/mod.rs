//! Expenses Module
//!
//! Data access for expenses: one fetch returns every expense joined with
//! its owner plus the per-member team totals, and `ExpenseService` puts the
//! query cache in front of it.

mod aggregate;
mod service;

#[cfg(test)]
mod property_tests;

pub use aggregate::aggregate_team_members;
pub use service::ExpenseService;

use crate::error::Result;
use crate::models::ExpensesData;
use crate::remote::{ExpenseBackend, Session};

/// Fetches all expenses and profiles and derives the team totals.
///
/// Fails if either query fails; no partial result is returned.
pub async fn fetch_expenses_data(backend: &dyn ExpenseBackend, session: &Session) -> Result<ExpensesData> {
    let (expenses, profiles) = tokio::try_join!(backend.list_expenses(session), backend.list_profiles(session))?;
    let team_members = aggregate_team_members(&profiles, &expenses);

    Ok(ExpensesData {
        expenses,
        team_members,
    })
}
