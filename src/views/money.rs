//! Amount display.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

pub const CURRENCY_SYMBOL: &str = "৳";

/// Fraction digits shown at most; trailing zeros are dropped.
const MAX_FRACTION_DIGITS: u32 = 3;

/// An amount together with its display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Money {
    pub amount: Decimal,
    pub display: String,
}

impl Money {
    pub fn new(amount: Decimal) -> Self {
        Self {
            amount,
            display: format_currency(amount),
        }
    }
}

/// `৳` followed by the grouped amount, e.g. `৳1,234.5`.
pub fn format_currency(amount: Decimal) -> String {
    format!("{}{}", CURRENCY_SYMBOL, format_amount(amount))
}

/// Formats with thousands separators and up to three fraction digits.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount
        .round_dp_with_strategy(MAX_FRACTION_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .normalize();
    let text = rounded.abs().to_string();
    let (int_part, fraction) = match text.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (text.as_str(), None),
    };

    let mut out = String::with_capacity(text.len() + text.len() / 3 + 1);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}
