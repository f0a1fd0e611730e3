use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use crate::core::{AppError, Result};

/// Number of fractional digits carried by every monetary value
pub const MONEY_SCALE: u32 = 2;

/// Rounds to exactly two decimals, half away from zero.
///
/// The result always carries scale 2 so `25` comes back as `25.00`.
pub fn quantize(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

/// Largest magnitude a `DECIMAL(12,2)` column holds (`9999999999.99`)
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Quantize and reject values outside ±[`max_amount`]
pub fn bounded(amount: Decimal) -> Result<Decimal> {
    let amount = quantize(amount);
    if amount.abs() > max_amount() {
        return Err(out_of_range(amount));
    }
    Ok(amount)
}

/// `a + b`, bounded
pub fn checked_add(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_add(b)
        .ok_or_else(|| AppError::validation("amount out of range"))
        .and_then(bounded)
}

/// `a × b`, bounded
pub fn checked_mul(a: Decimal, b: Decimal) -> Result<Decimal> {
    a.checked_mul(b)
        .ok_or_else(|| AppError::validation("amount out of range"))
        .and_then(bounded)
}

fn out_of_range(amount: Decimal) -> AppError {
    AppError::validation(format!(
        "amount out of range: {} exceeds {}",
        amount,
        max_amount()
    ))
}

/// Zero with money scale (`0.00`)
pub fn zero() -> Decimal {
    quantize(Decimal::ZERO)
}

/// Values that can be turned into a money amount
///
/// Strings are parsed as decimals, floats go through their shortest decimal
/// representation rather than the raw binary value.
pub trait ToMoney {
    /// Strict conversion: fails with a validation error on non-numeric input
    /// or a magnitude above [`max_amount`]
    fn to_money(&self) -> Result<Decimal>;
}

impl ToMoney for Decimal {
    fn to_money(&self) -> Result<Decimal> {
        bounded(*self)
    }
}

impl ToMoney for i32 {
    fn to_money(&self) -> Result<Decimal> {
        bounded(Decimal::from(*self))
    }
}

impl ToMoney for i64 {
    fn to_money(&self) -> Result<Decimal> {
        bounded(Decimal::from(*self))
    }
}

impl ToMoney for u32 {
    fn to_money(&self) -> Result<Decimal> {
        bounded(Decimal::from(*self))
    }
}

impl ToMoney for f64 {
    fn to_money(&self) -> Result<Decimal> {
        Decimal::from_f64(*self)
            .ok_or_else(|| AppError::validation(format!("invalid amount: {}", self)))
            .and_then(bounded)
    }
}

impl ToMoney for str {
    fn to_money(&self) -> Result<Decimal> {
        let trimmed = self.trim();
        Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| AppError::validation(format!("invalid amount: '{}'", self)))
            .and_then(bounded)
    }
}

impl ToMoney for &str {
    fn to_money(&self) -> Result<Decimal> {
        (**self).to_money()
    }
}

impl ToMoney for String {
    fn to_money(&self) -> Result<Decimal> {
        self.as_str().to_money()
    }
}

/// Lenient conversion: non-numeric input becomes `0.00`
pub fn money_or_zero<T: ToMoney + ?Sized>(value: &T) -> Decimal {
    value.to_money().unwrap_or_else(|_| zero())
}

/// Percentage of an amount, quantized (`pct` is 0–100, not a fraction)
pub fn percent_of(amount: Decimal, pct: Decimal) -> Decimal {
    quantize(amount * pct / Decimal::ONE_HUNDRED)
}

/// Serde helpers storing money as a decimal string (`"12.50"`)
pub mod as_string {
    use rust_decimal::Decimal;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::{quantize, ToMoney};

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&quantize(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.to_money().map_err(serde::de::Error::custom)
    }
}
