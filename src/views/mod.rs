//! Views Module
//!
//! Display models derived from the expenses query: the expense table, the
//! team breakdown and the dashboard that combines them.

mod breakdown;
mod dashboard;
mod money;
mod table;

pub use breakdown::{BreakdownEntry, TeamBreakdown};
pub use dashboard::{DashboardStats, DashboardView};
pub use money::{format_amount, format_currency, Money, CURRENCY_SYMBOL};
pub use table::{format_timestamp, EmptyState, ExpenseRow, ExpenseTable};
