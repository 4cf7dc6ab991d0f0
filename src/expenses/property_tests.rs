//! Property-Based Tests for team aggregation

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::expenses::{aggregate_team_members, ExpenseService};
use crate::form::{ExpenseForm, FormSubmission};
use crate::models::{Category, ExpenseWithOwner};
use crate::remote::Session;
use crate::test_util::{expense, profile, MemoryBackend};

const USERS: [&str; 4] = ["u0", "u1", "u2", "u3"];

fn expense_strategy() -> impl Strategy<Value = ExpenseWithOwner> {
    (0..USERS.len(), 1i64..10_000_000i64, any::<bool>()).prop_map(|(user, cents, team)| {
        let category = if team { Category::Team } else { Category::Personal };
        let mut e = expense("e", USERS[user], "item", "1", category);
        e.amount = Decimal::new(cents, 2);
        ExpenseWithOwner::new(e, None)
    })
}

fn profiles() -> Vec<crate::models::Profile> {
    USERS.iter().map(|id| profile(id, id)).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Member totals add up to the sum of all team expenses of known users.
    #[test]
    fn prop_totals_sum_to_team_spend(expenses in prop::collection::vec(expense_strategy(), 0..40)) {
        let members = aggregate_team_members(&profiles(), &expenses);

        let member_sum: Decimal = members.iter().map(|m| m.total).sum();
        let team_sum: Decimal = expenses
            .iter()
            .filter(|e| e.expense.category == Category::Team)
            .map(|e| e.expense.amount)
            .sum();
        prop_assert_eq!(member_sum, team_sum);
    }

    // Each user's total is exactly that user's team spend.
    #[test]
    fn prop_each_member_total_is_own_team_spend(expenses in prop::collection::vec(expense_strategy(), 0..40)) {
        let members = aggregate_team_members(&profiles(), &expenses);

        for user in USERS {
            let own: Decimal = expenses
                .iter()
                .filter(|e| e.expense.user_id == user && e.expense.category == Category::Team)
                .map(|e| e.expense.amount)
                .sum();
            let reported = members.iter().find(|m| m.id == user).map(|m| m.total);

            if own > Decimal::ZERO {
                prop_assert_eq!(reported, Some(own));
            } else {
                prop_assert_eq!(reported, None);
            }
        }
    }

    // No member is reported with a zero total, and each appears once.
    #[test]
    fn prop_members_are_positive_and_unique(expenses in prop::collection::vec(expense_strategy(), 0..40)) {
        let members = aggregate_team_members(&profiles(), &expenses);

        prop_assert!(members.iter().all(|m| m.total > Decimal::ZERO));
        let mut ids: Vec<_> = members.iter().map(|m| m.id.clone()).collect();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), members.len());
    }

    // The derivation depends only on its inputs.
    #[test]
    fn prop_aggregation_is_deterministic(expenses in prop::collection::vec(expense_strategy(), 0..40)) {
        prop_assert_eq!(
            aggregate_team_members(&profiles(), &expenses),
            aggregate_team_members(&profiles(), &expenses)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // A saved team expense shows up on the next read and moves the
    // owner's team total by exactly its amount.
    #[test]
    fn prop_saved_expense_is_read_back(cents in 1i64..=1_000_000_000i64, team in any::<bool>()) {
        let amount = Decimal::new(cents, 2);
        let category = if team { "Team" } else { "Personal" };

        let (before, after) = tokio_test::block_on(async {
            let backend = Arc::new(
                MemoryBackend::new()
                    .with_session("tok-a", "a")
                    .with_profile(profile("a", "Anika"))
                    .with_expense(expense("e1", "a", "Bus", "300", Category::Team)),
            );
            let service = ExpenseService::new(backend, Duration::from_secs(300));
            let session = Session::new("tok-a");

            let before = service.expenses(&session).await.unwrap();
            let form = ExpenseForm {
                description: "Generated".to_string(),
                amount: amount.to_string(),
                category: category.to_string(),
            };
            let submission = FormSubmission::Create { user_id: "a".to_string() };
            service.save_expense(&session, &submission, &form).await.unwrap();
            let after = service.expenses(&session).await.unwrap();
            (before, after)
        });

        prop_assert_eq!(after.expenses.len(), before.expenses.len() + 1);
        prop_assert!(after
            .expenses
            .iter()
            .any(|e| e.expense.description == "Generated" && e.expense.amount == amount));

        let expected = if team { before.team_members[0].total + amount } else { before.team_members[0].total };
        prop_assert_eq!(after.team_members[0].total, expected);
    }
}
