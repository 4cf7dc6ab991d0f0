//! Expense form
//!
//! Holds the values a user typed for a new or edited expense and validates
//! them before anything is sent to the data service.


use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TrackerError};
use crate::models::{Category, Expense};

// == Limits ==
pub const MIN_DESCRIPTION_CHARS: usize = 2;
pub const MAX_DESCRIPTION_CHARS: usize = 200;
/// Largest accepted amount, inclusive
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

// == Expense Form ==
/// Raw form values, exactly as entered.
///
/// `amount` is kept as text so a rejected submission can be handed back to
/// the client unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseForm {
    pub description: String,
    #[serde(deserialize_with = "amount_as_text")]
    pub amount: String,
    pub category: String,
}

impl Default for ExpenseForm {
    fn default() -> Self {
        Self {
            description: String::new(),
            amount: String::new(),
            category: Category::default().to_string(),
        }
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidExpense {
    /// Trimmed
    pub description: String,
    pub amount: Decimal,
    pub category: Category,
}

/// What a successful submission writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormSubmission {
    /// Insert a new expense owned by `user_id`
    Create { user_id: String },
    /// Update the expense with this id. Ownership is checked by the data service.
    Update { id: String },
}

impl FormSubmission {
    pub fn success_message(&self) -> &'static str {
        match self {
            FormSubmission::Create { .. } => "Expense added",
            FormSubmission::Update { .. } => "Expense updated",
        }
    }
}

impl ExpenseForm {
    /// Form pre-filled for editing `expense`.
    pub fn for_expense(expense: &Expense) -> Self {
        Self {
            description: expense.description.clone(),
            amount: expense.amount.normalize().to_string(),
            category: expense.category.to_string(),
        }
    }

    // == Validate ==
    /// Checks the form and returns the first rule it breaks.
    pub fn validate(&self) -> Result<ValidExpense> {
        let description = self.description.trim();
        let chars = description.chars().count();

        if chars < MIN_DESCRIPTION_CHARS {
            return Err(invalid("Description must be at least 2 characters"));
        }
        if chars > MAX_DESCRIPTION_CHARS {
            return Err(invalid("Description must be at most 200 characters"));
        }

        let amount = validate_amount(&self.amount)?;

        let category = self.category.trim();
        if category.is_empty() {
            return Err(invalid("Please select a category"));
        }
        let category = Category::from_str(category).map_err(|_| invalid("Unknown category"))?;

        Ok(ValidExpense {
            description: description.to_string(),
            amount,
            category,
        })
    }
}

fn validate_amount(raw: &str) -> Result<Decimal> {
    let raw = raw.trim();
    let amount = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| out_of_decimal_range(raw))?;

    if amount <= Decimal::ZERO {
        return Err(invalid("Amount must be positive"));
    }
    if amount > MAX_AMOUNT {
        return Err(invalid("Amount too large"));
    }
    Ok(amount)
}

/// Text that is no decimal may still be a number too big or too small for
/// one; report the rule it breaks.
fn out_of_decimal_range(raw: &str) -> TrackerError {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 1.0 => invalid("Amount too large"),
        Ok(value) if value.is_finite() => invalid("Amount must be positive"),
        _ => invalid("Amount must be a valid number"),
    }
}

fn invalid(message: &str) -> TrackerError {
    TrackerError::Validation(message.to_string())
}

/// Accepts the amount as a JSON string or number.
fn amount_as_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}
