//! Material line item model
//!
//! Older records carry a single `cost` number; newer ones carry
//! `perUnitCost` and/or `totalCost`. The raw shape is kept only until the
//! cost normalizer resolves it into a `NormalizedCost`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::money::Money;
use super::quantity::Quantity;

/// How a line item's canonical cost pair was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostBasis {
    /// Both per-unit and total cost were supplied
    Explicit,
    /// Total computed from the supplied per-unit cost
    DerivedFromPerUnit,
    /// Per-unit cost computed from the supplied total
    DerivedFromTotal,
    /// Legacy `cost` read as a per-unit price
    LegacyPerUnit,
    /// Legacy `cost` read as a line total
    LegacyTotal,
    /// No cost information at all; both figures are zero
    Absent,
}

impl CostBasis {
    /// Short label for audit columns
    pub fn label(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::DerivedFromPerUnit => "from per-unit",
            Self::DerivedFromTotal => "from total",
            Self::LegacyPerUnit => "legacy per-unit",
            Self::LegacyTotal => "legacy total",
            Self::Absent => "no cost",
        }
    }
}

/// Canonical cost pair of a line item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCost {
    pub per_unit_cost: Money,
    pub total_cost: Money,
    pub basis: CostBasis,
}

impl NormalizedCost {
    /// The "no cost information" default
    pub fn absent() -> Self {
        Self {
            per_unit_cost: Money::zero(),
            total_cost: Money::zero(),
            basis: CostBasis::Absent,
        }
    }
}

/// A validated material line with its canonical cost pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialLineItem {
    pub name: String,
    pub unit: String,
    /// Always strictly positive
    pub quantity: Quantity,
    #[serde(flatten)]
    pub cost: NormalizedCost,
    /// Informational attributes (grade, size, brand), in upstream order
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub specs: Map<String, Value>,
}

impl MaterialLineItem {
    pub fn per_unit_cost(&self) -> Money {
        self.cost.per_unit_cost
    }

    pub fn total_cost(&self) -> Money {
        self.cost.total_cost
    }

    /// Specs rendered as `key: value` pairs, e.g. "grade: Fe500, dia: 12"
    pub fn specs_summary(&self) -> String {
        self.specs
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}: {}", k, s),
                other => format!("{}: {}", k, other),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A material line exactly as the backend sends it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialLine {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default, alias = "qnt", alias = "qty")]
    pub quantity: Option<Decimal>,
    /// Legacy single cost field; meaning depends on the activity kind
    #[serde(default)]
    pub cost: Option<Decimal>,
    #[serde(default)]
    pub per_unit_cost: Option<Decimal>,
    #[serde(default)]
    pub total_cost: Option<Decimal>,
    #[serde(default)]
    pub specs: Map<String, Value>,
}
