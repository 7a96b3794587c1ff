//! Money type for representing currency amounts
//!
//! Internally stores amounts as an exact `rust_decimal::Decimal` so that
//! per-unit prices derived by division (`650 / 3`) and sums over many line
//! items never accumulate floating-point drift. Rounding to two decimal
//! places happens only when an amount is displayed.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use std::str::FromStr;

use super::quantity::Quantity;

/// Number of decimal places shown when an amount is displayed
pub const DISPLAY_SCALE: u32 = 2;

/// Represents a monetary amount in the project's currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Create a Money amount from a decimal value
    pub const fn from_decimal(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a Money amount from whole currency units
    ///
    /// # Examples
    /// ```
    /// use sitecost::models::Money;
    /// let amount = Money::from_major(650);
    /// assert_eq!(amount.to_string(), "$650.00");
    /// ```
    pub fn from_major(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Create a Money amount from minor units (hundredths)
    ///
    /// # Examples
    /// ```
    /// use sitecost::models::Money;
    /// let amount = Money::from_minor(1050); // 10.50
    /// assert_eq!(amount.to_string(), "$10.50");
    /// ```
    pub fn from_minor(minor: i64) -> Self {
        Self(Decimal::new(minor, DISPLAY_SCALE))
    }

    /// Create a zero Money amount
    pub const fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Get the exact underlying amount
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Check if the amount is zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Check if the amount is positive
    pub fn is_positive(&self) -> bool {
        self.0.is_sign_positive() && !self.0.is_zero()
    }

    /// Check if the amount is negative
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Get the absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Amount rounded half away from zero to the display scale
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(DISPLAY_SCALE, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Divide this amount evenly over a quantity
    ///
    /// Returns `None` when the quantity is not strictly positive, so callers
    /// never see a division by zero.
    pub fn per_unit(&self, quantity: Quantity) -> Option<Self> {
        if !quantity.is_positive() {
            return None;
        }
        self.0.checked_div(quantity.value()).map(Self)
    }

    /// Multiply by a quantity, returning `None` on overflow
    pub fn checked_mul(&self, quantity: Quantity) -> Option<Self> {
        self.0.checked_mul(quantity.value()).map(Self)
    }

    /// Add two amounts, returning `None` on overflow
    pub fn checked_add(&self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Sum amounts, returning `None` if any partial sum overflows
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        amounts
            .into_iter()
            .try_fold(Self::zero(), |acc, amount| acc.checked_add(amount))
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "1,250.75", "10"
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let trimmed = s.trim();

        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(stripped) => (true, stripped),
            None => (false, trimmed),
        };

        // Drop a leading currency symbol and any grouping separators
        let digits: String = rest
            .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.')
            .chars()
            .filter(|c| *c != ',')
            .collect();

        if digits.is_empty() {
            return Err(MoneyParseError::InvalidFormat(s.to_string()));
        }

        let value = Decimal::from_str(&digits)
            .map_err(|_| MoneyParseError::InvalidFormat(s.to_string()))?;

        Ok(Self(if negative { -value } else { value }))
    }

    /// Format with a currency symbol, rounded to the display scale
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        let rounded = self.rounded();
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}{:.2}", symbol, rounded.abs())
        } else {
            format!("{}{:.2}", symbol, rounded.abs())
        }
    }

    /// Plain two-decimal rendering without symbol, for machine formats
    pub fn to_plain_string(&self) -> String {
        format!("{:.2}", self.rounded())
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Mul<Quantity> for Money {
    type Output = Self;

    fn mul(self, quantity: Quantity) -> Self {
        Self(self.0 * quantity.value())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let m = Money::from_minor(1050);
        assert_eq!(m.amount(), Decimal::new(105, 1));
        assert_eq!(m, Money::parse("10.5").unwrap());
    }

    #[test]
    fn test_display_rounds_half_away_from_zero() {
        assert_eq!(Money::from_minor(1050).to_string(), "$10.50");
        assert_eq!(Money::zero().to_string(), "$0.00");
        assert_eq!(Money::from_minor(-1050).to_string(), "-$10.50");
        assert_eq!(Money::parse("0.005").unwrap().to_string(), "$0.01");
        assert_eq!(Money::parse("2.675").unwrap().to_string(), "$2.68");
        assert_eq!(Money::parse("-0.001").unwrap().to_string(), "$0.00");
    }

    #[test]
    fn test_format_with_symbol() {
        let m = Money::from_major(6500);
        assert_eq!(m.format_with_symbol("Rs "), "Rs 6500.00");
        assert_eq!(m.to_plain_string(), "6500.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(1000);
        let b = Money::from_major(500);

        assert_eq!(a + b, Money::from_major(1500));
        assert_eq!(a - b, Money::from_major(500));
        assert_eq!(-a, Money::from_major(-1000));
        assert_eq!(a * Quantity::from(3), Money::from_major(3000));
    }

    #[test]
    fn test_per_unit_keeps_full_precision() {
        let total = Money::from_major(100);
        let per_unit = total.per_unit(Quantity::from(3)).unwrap();
        assert_eq!(per_unit.to_plain_string(), "33.33");
        // Re-multiplying lands within a rounding hair of the original total
        let back = per_unit * Quantity::from(3);
        assert!((back - total).abs() < Money::parse("0.000001").unwrap());
    }

    #[test]
    fn test_per_unit_rejects_zero_quantity() {
        assert!(Money::from_major(100).per_unit(Quantity::from(0)).is_none());
        assert!(Money::from_major(100).per_unit(Quantity::from(-2)).is_none());
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap(), Money::from_minor(1050));
        assert_eq!(Money::parse("$10.50").unwrap(), Money::from_minor(1050));
        assert_eq!(Money::parse("-10.50").unwrap(), Money::from_minor(-1050));
        assert_eq!(Money::parse("1,250.75").unwrap(), Money::from_minor(125075));
        assert_eq!(Money::parse("10").unwrap(), Money::from_major(10));
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_sum_is_order_independent() {
        let amounts = vec![
            Money::parse("0.1").unwrap(),
            Money::parse("0.2").unwrap(),
            Money::from_minor(1),
            Money::from_major(1_000_000),
        ];
        let forward: Money = amounts.iter().sum();
        let backward: Money = amounts.iter().rev().sum();
        assert_eq!(forward, backward);
        assert_eq!(forward, Money::parse("1000000.31").unwrap());
    }

    #[test]
    fn test_checked_sum_reports_overflow() {
        let near_max = Money::from_decimal(Decimal::MAX);
        assert!(near_max.checked_add(Money::from_major(1)).is_none());
        assert!(Money::checked_sum([Money::from_major(1), near_max]).is_none());
        assert_eq!(
            Money::checked_sum([Money::from_major(2), Money::from_minor(50)]),
            Some(Money::from_minor(250))
        );
        assert_eq!(Money::checked_sum(Vec::new()), Some(Money::zero()));
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_minor(1050);
        let json = serde_json::to_string(&m).unwrap();
        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);

        // Upstream JSON numbers are accepted too
        let from_number: Money = serde_json::from_str("65").unwrap();
        assert_eq!(from_number, Money::from_major(65));
    }
}
