//! Dashboard for the signed-in user.

use rust_decimal::Decimal;
use serde::Serialize;

use super::breakdown::TeamBreakdown;
use super::money::Money;
use super::table::ExpenseTable;
use crate::form::ExpenseForm;
use crate::models::{Category, ExpensesData};

/// Summary figures of the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Personal spend plus team contribution
    pub my_total_spent: Money,
    pub my_personal_total: Money,
    /// Team spend of everyone
    pub team_total: Money,
    /// The user's own team spend
    pub my_contribution: Money,
}

impl DashboardStats {
    pub fn new(data: &ExpensesData, user_id: &str) -> Self {
        let mut personal = Decimal::ZERO;
        let mut contribution = Decimal::ZERO;
        let mut team = Decimal::ZERO;

        for row in &data.expenses {
            let expense = &row.expense;
            let mine = expense.is_owned_by(user_id);
            match expense.category {
                Category::Personal if mine => personal += expense.amount,
                Category::Personal => {}
                Category::Team => {
                    team += expense.amount;
                    if mine {
                        contribution += expense.amount;
                    }
                }
            }
        }

        Self {
            my_total_spent: Money::new(personal + contribution),
            my_personal_total: Money::new(personal),
            team_total: Money::new(team),
            my_contribution: Money::new(contribution),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub user_id: String,
    pub stats: DashboardStats,
    /// Present when someone has team spend
    pub team_breakdown: Option<TeamBreakdown>,
    /// The user's own expenses, newest first
    pub my_expenses: ExpenseTable,
    /// Blank form for the add action
    pub new_expense_form: ExpenseForm,
}

impl DashboardView {
    pub fn build(data: &ExpensesData, user_id: &str) -> Self {
        let stats = DashboardStats::new(data, user_id);
        let team_total = stats.team_total.amount;

        let team_breakdown = (!data.team_members.is_empty() && team_total > Decimal::ZERO)
            .then(|| TeamBreakdown::build(&data.team_members, team_total, user_id));

        Self {
            user_id: user_id.to_string(),
            stats,
            team_breakdown,
            my_expenses: ExpenseTable::build(data.owned_by(user_id), user_id),
            new_expense_form: ExpenseForm::default(),
        }
    }
}
