//! Team breakdown: each member's share of the team total.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use super::money::Money;
use crate::models::TeamMember;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownEntry {
    pub id: String,
    pub full_name: String,
    pub total: Money,
    /// Share of the team total, rounded to a whole percent
    pub percentage: u32,
    /// Unrounded share, for the bar width
    pub bar_width: f64,
    pub is_current_user: bool,
}

/// Members sorted by total, largest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamBreakdown {
    pub entries: Vec<BreakdownEntry>,
    pub team_total: Money,
}

impl TeamBreakdown {
    /// Builds the breakdown. With a zero team total every share is 0%.
    pub fn build(members: &[TeamMember], team_total: Decimal, current_user_id: &str) -> Self {
        let mut entries: Vec<BreakdownEntry> = members
            .iter()
            .map(|member| {
                let share = share_percent(member.total, team_total);
                BreakdownEntry {
                    id: member.id.clone(),
                    full_name: member.full_name.clone(),
                    total: Money::new(member.total),
                    percentage: share
                        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                        .to_u32()
                        .unwrap_or(0),
                    bar_width: share.to_f64().unwrap_or(0.0),
                    is_current_user: member.id == current_user_id,
                }
            })
            .collect();

        entries.sort_by(|a, b| b.total.amount.cmp(&a.total.amount));

        Self {
            entries,
            team_total: Money::new(team_total),
        }
    }
}

fn share_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        part / whole * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}
