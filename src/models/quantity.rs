//! Material quantity type
//!
//! Quantities are exact decimals so fractional site measurements
//! (`2.5` cubic metres, `12.75` kg) multiply against prices without drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A measured amount of material, in the line item's own unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Create a quantity from a decimal value
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Get the underlying value
    pub const fn value(&self) -> Decimal {
        self.0
    }

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

macro_rules! quantity_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Quantity {
                fn from(value: $t) -> Self {
                    Self(Decimal::from(value))
                }
            }
        )*
    };
}

quantity_from_int!(i32, i64, u32);

impl From<Decimal> for Quantity {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}
