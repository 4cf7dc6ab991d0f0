pub mod memory_backend;
pub mod mock_network;

use std::str::FromStr;

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::models::{Category, Expense, Profile};

pub use memory_backend::{MemoryBackend, Op};
pub use mock_network::MockNetwork;

/// Parses a decimal literal, panicking on bad input.
pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Fixed timestamp, `minutes` after 2024-01-15 08:00 UTC.
pub fn at_minute(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

pub fn expense(id: &str, user_id: &str, description: &str, amount: &str, category: Category) -> Expense {
    Expense {
        id: id.to_string(),
        user_id: user_id.to_string(),
        description: description.to_string(),
        amount: dec(amount),
        category,
        created_at: at_minute(0),
    }
}

pub fn profile(id: &str, full_name: &str) -> Profile {
    Profile {
        id: id.to_string(),
        full_name: full_name.to_string(),
        email: format!("{id}@example.com"),
    }
}
