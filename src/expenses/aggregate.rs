//! Per-member totals of team expenses.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{Category, ExpenseWithOwner, Profile, TeamMember};

/// Sums `Team` expenses per profile.
///
/// Members follow the order of `profiles`; profiles with a zero total are
/// left out. Expenses whose owner has no profile still count toward
/// nobody's total.
pub fn aggregate_team_members(profiles: &[Profile], expenses: &[ExpenseWithOwner]) -> Vec<TeamMember> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    for row in expenses {
        if row.expense.category == Category::Team {
            *totals.entry(row.expense.user_id.as_str()).or_default() += row.expense.amount;
        }
    }

    profiles
        .iter()
        .filter_map(|profile| {
            let total = totals.get(profile.id.as_str()).copied().unwrap_or_default();
            (total > Decimal::ZERO).then(|| TeamMember {
                id: profile.id.clone(),
                full_name: profile.full_name.clone(),
                total,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{dec, expense, profile};

    fn owned(id: &str, user: &str, amount: &str, category: Category) -> ExpenseWithOwner {
        ExpenseWithOwner::new(expense(id, user, "item", amount, category), None)
    }

    #[test]
    fn test_only_team_expenses_count() {
        let profiles = vec![profile("a", "Anika"), profile("b", "Bashir")];
        let expenses = vec![
            owned("1", "a", "300", Category::Team),
            owned("2", "a", "999", Category::Personal),
            owned("3", "b", "100", Category::Team),
        ];

        let members = aggregate_team_members(&profiles, &expenses);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, "a");
        assert_eq!(members[0].total, dec("300"));
        assert_eq!(members[1].total, dec("100"));
    }

    #[test]
    fn test_zero_totals_are_left_out() {
        let profiles = vec![profile("a", "Anika"), profile("b", "Bashir"), profile("c", "Chaity")];
        let expenses = vec![
            owned("1", "b", "12.50", Category::Team),
            owned("2", "c", "40", Category::Personal),
        ];

        let members = aggregate_team_members(&profiles, &expenses);
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].full_name, "Bashir");
    }

    #[test]
    fn test_profile_order_is_kept() {
        let profiles = vec![profile("z", "Zara"), profile("a", "Anika")];
        let expenses = vec![
            owned("1", "a", "500", Category::Team),
            owned("2", "z", "5", Category::Team),
        ];

        let ids: Vec<_> = aggregate_team_members(&profiles, &expenses)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn test_expense_without_profile_is_ignored() {
        let profiles = vec![profile("a", "Anika")];
        let expenses = vec![owned("1", "ghost", "80", Category::Team)];
        assert!(aggregate_team_members(&profiles, &expenses).is_empty());
    }
}
