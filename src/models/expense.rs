//! Expense, profile and the values derived from them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// == Category ==
/// Expense category. `Team` expenses count toward the shared pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[default]
    Personal,
    Team,
}

impl Category {
    /// All categories, in the order the form offers them.
    pub const ALL: [Category; 2] = [Category::Personal, Category::Team];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Team => "Team",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown category: {s}"))
    }
}

// == Expense ==
/// A single expense as stored by the data service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    /// Owning user; only this user may change or delete the row
    pub user_id: String,
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

// == Profile ==
/// Public profile of a user. Read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
}

// == Expense With Owner ==
/// An expense joined with its owner's profile.
///
/// `owner` is `None` when the data service returned no profile for the row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpenseWithOwner {
    #[serde(flatten)]
    pub expense: Expense,
    pub owner: Option<Profile>,
}

impl ExpenseWithOwner {
    pub fn new(expense: Expense, owner: Option<Profile>) -> Self {
        Self { expense, owner }
    }
}

// == Team Member ==
/// A user's total of `Team` expenses. Derived on every fetch, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamMember {
    pub id: String,
    pub full_name: String,
    pub total: Decimal,
}

// == Expenses Data ==
/// Result of the expenses query, as held in the query cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExpensesData {
    /// Newest first
    pub expenses: Vec<ExpenseWithOwner>,
    pub team_members: Vec<TeamMember>,
}

impl ExpensesData {
    /// Expenses owned by `user_id`, keeping the newest-first order.
    pub fn owned_by<'a>(&'a self, user_id: &'a str) -> impl Iterator<Item = &'a Expense> + 'a {
        self.expenses
            .iter()
            .map(|e| &e.expense)
            .filter(move |e| e.is_owned_by(user_id))
    }
}
