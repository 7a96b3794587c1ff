//! Labor ledger model
//!
//! Each entry is a crew line from a section's labor ledger: a category
//! (Mason, Carpenter), a type (skilled, helper), a head count and a daily
//! rate per head.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::Money;
use super::quantity::Quantity;

/// A validated labor entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborEntry {
    pub category: String,
    #[serde(rename = "type")]
    pub labor_type: String,
    /// Always at least one
    pub count: u32,
    pub per_labor_cost: Money,
    /// Always `count * per_labor_cost`
    pub total_cost: Money,
}

impl LaborEntry {
    /// Create an entry, deriving the total from count and rate
    ///
    /// Returns `None` when the total does not fit in a `Money`.
    pub fn new(
        category: impl Into<String>,
        labor_type: impl Into<String>,
        count: u32,
        per_labor_cost: Money,
    ) -> Option<Self> {
        let total_cost = per_labor_cost.checked_mul(Quantity::from(count))?;
        Some(Self {
            category: category.into(),
            labor_type: labor_type.into(),
            count,
            per_labor_cost,
            total_cost,
        })
    }
}

/// A labor entry exactly as the ledger query returns it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawLaborEntry {
    #[serde(default, alias = "labourCategory", alias = "laborCategory")]
    pub category: Option<String>,
    #[serde(default, rename = "type", alias = "labourType", alias = "laborType")]
    pub labor_type: Option<String>,
    #[serde(default, alias = "number", alias = "labourCount")]
    pub count: Option<Decimal>,
    #[serde(default, alias = "perLabourCost", alias = "rate")]
    pub per_labor_cost: Option<Decimal>,
    /// Informational; the canonical total is always recomputed
    #[serde(default)]
    pub total_cost: Option<Decimal>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_derives_total() {
        let mason = LaborEntry::new("Mason", "skilled", 5, Money::from_major(800)).unwrap();
        assert_eq!(mason.total_cost, Money::from_major(4000));
    }

    #[test]
    fn test_new_rejects_overflowing_total() {
        let rate = Money::from_decimal(Decimal::MAX);
        assert!(LaborEntry::new("Mason", "skilled", 2, rate).is_none());
        assert!(LaborEntry::new("Mason", "skilled", 1, rate).is_some());
    }

    #[test]
    fn test_raw_entry_aliases() {
        let raw: RawLaborEntry = serde_json::from_str(
            r#"{"category": "Mason", "labourType": "skilled", "count": 5, "perLabourCost": 800}"#,
        )
        .unwrap();
        assert_eq!(raw.labor_type.as_deref(), Some("skilled"));
        assert_eq!(raw.count, Some(Decimal::from(5)));
        assert_eq!(raw.per_labor_cost, Some(Decimal::from(800)));
    }

    #[test]
    fn test_type_field_is_named_type_on_the_wire() {
        let entry = LaborEntry::new("Helper", "unskilled", 2, Money::from_major(500)).unwrap();
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "unskilled");
    }
}
