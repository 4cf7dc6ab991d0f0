//! Expense table rows and the empty state.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

use super::money::Money;
use crate::form::ExpenseForm;
use crate::models::{Category, Expense};

/// Offset of the trip's local time zone (Asia/Dhaka, no DST), in seconds.
const DISPLAY_OFFSET_SECS: i32 = 6 * 3600;

/// `Jan 5, 03:07 PM`
const TIMESTAMP_FORMAT: &str = "%b %-d, %I:%M %p";

/// Shown when there are no rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyState {
    pub title: &'static str,
    pub hint: &'static str,
}

impl Default for EmptyState {
    fn default() -> Self {
        Self {
            title: "No expenses yet",
            hint: "Tap + to add your first expense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseRow {
    pub id: String,
    pub description: String,
    pub amount: Money,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub created_at_display: String,
    /// Pre-filled form for the edit action
    pub edit_form: ExpenseForm,
    /// Display gating only; the data service enforces ownership
    pub can_edit: bool,
    pub can_delete: bool,
}

impl ExpenseRow {
    pub fn build(expense: &Expense, current_user_id: &str) -> Self {
        let mine = expense.is_owned_by(current_user_id);
        Self {
            id: expense.id.clone(),
            description: expense.description.clone(),
            amount: Money::new(expense.amount),
            category: expense.category,
            created_at: expense.created_at,
            created_at_display: format_timestamp(expense.created_at),
            edit_form: ExpenseForm::for_expense(expense),
            can_edit: mine,
            can_delete: mine,
        }
    }
}

/// Rows in the order given, or the empty state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseTable {
    pub rows: Vec<ExpenseRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty: Option<EmptyState>,
}

impl ExpenseTable {
    pub fn build<'a>(expenses: impl IntoIterator<Item = &'a Expense>, current_user_id: &str) -> Self {
        let rows: Vec<ExpenseRow> = expenses
            .into_iter()
            .map(|e| ExpenseRow::build(e, current_user_id))
            .collect();
        let empty = rows.is_empty().then(EmptyState::default);
        Self { rows, empty }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// `at` in the trip's local time zone.
pub fn local_time(at: DateTime<Utc>) -> DateTime<FixedOffset> {
    let zone = FixedOffset::east_opt(DISPLAY_OFFSET_SECS).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&zone)
}

/// Formats `at` in the trip's local time, e.g. `Jan 15, 02:00 PM`.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    local_time(at).format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{at_minute, expense};

    #[test]
    fn test_timestamp_in_dhaka_time() {
        // 08:00 UTC is 14:00 in Dhaka
        assert_eq!(format_timestamp(at_minute(0)), "Jan 15, 02:00 PM");
        assert_eq!(format_timestamp(at_minute(7)), "Jan 15, 02:07 PM");
    }

    #[test]
    fn test_local_time_keeps_offset() {
        let local = local_time(at_minute(0));
        assert_eq!(local.offset().local_minus_utc(), 6 * 3600);
        assert_eq!(local.to_rfc3339(), "2024-01-15T14:00:00+06:00");
        assert_eq!(local, at_minute(0));
    }

    #[test]
    fn test_timestamp_crosses_midnight() {
        // 20:30 UTC is 02:30 next day
        assert_eq!(format_timestamp(at_minute(12 * 60 + 30)), "Jan 16, 02:30 AM");
    }

    #[test]
    fn test_empty_table_shows_empty_state() {
        let table = ExpenseTable::build(std::iter::empty(), "u1");
        assert!(table.is_empty());
        let empty = table.empty.unwrap();
        assert_eq!(empty.title, "No expenses yet");
        assert_eq!(empty.hint, "Tap + to add your first expense");
    }

    #[test]
    fn test_rows_keep_order_and_format() {
        let expenses = vec![
            expense("e2", "u1", "Hotel", "4500", Category::Team),
            expense("e1", "u1", "Tea", "20.5", Category::Personal),
        ];
        let table = ExpenseTable::build(&expenses, "u1");

        assert!(table.empty.is_none());
        assert_eq!(table.rows[0].id, "e2");
        assert_eq!(table.rows[0].amount.display, "৳4,500");
        assert_eq!(table.rows[1].edit_form.amount, "20.5");
        assert_eq!(table.rows[1].created_at_display, "Jan 15, 02:00 PM");
    }

    #[test]
    fn test_actions_only_on_own_rows() {
        let expenses = vec![
            expense("e1", "u1", "Hotel", "4500", Category::Team),
            expense("e2", "u2", "Boat", "900", Category::Team),
        ];
        let table = ExpenseTable::build(&expenses, "u2");

        assert!(!table.rows[0].can_edit && !table.rows[0].can_delete);
        assert!(table.rows[1].can_edit && table.rows[1].can_delete);
    }
}
