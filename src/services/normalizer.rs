//! Cost normalization
//!
//! Resolves whichever cost fields a material line carries into the
//! canonical `(per_unit_cost, total_cost)` pair. Resolution order:
//!
//! 1. `perUnitCost` and `totalCost` both present: trusted as-is
//! 2. only `perUnitCost`: total = per-unit x quantity
//! 3. only `totalCost`: per-unit = total / quantity
//! 4. legacy `cost`: per-unit for imports, a line total otherwise
//! 5. nothing: both zero
//!
//! Quantity must be strictly positive before any rule runs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SiteCostError, SiteCostResult};
use crate::models::{
    ActivityKind, CostBasis, MaterialLineItem, Money, NormalizedCost, Quantity, RawMaterialLine,
};

/// Allowed divergence between `per_unit_cost * quantity` and `total_cost`
///
/// The allowance is `absolute + per_unit_rounding * quantity`, so a per-unit
/// price rounded to whole cents upstream is never flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostTolerance {
    pub absolute: Decimal,
    pub per_unit_rounding: Decimal,
}

impl CostTolerance {
    /// Maximum accepted divergence for a given quantity
    pub fn allowance(&self, quantity: Quantity) -> Decimal {
        self.per_unit_rounding
            .checked_mul(quantity.value())
            .and_then(|rounding| rounding.checked_add(self.absolute))
            .unwrap_or(Decimal::MAX)
    }
}

impl Default for CostTolerance {
    fn default() -> Self {
        Self {
            absolute: Decimal::new(1, 2),
            per_unit_rounding: Decimal::new(5, 3),
        }
    }
}

/// Which cost fields a raw line carries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostFields {
    pub cost: Option<Decimal>,
    pub per_unit_cost: Option<Decimal>,
    pub total_cost: Option<Decimal>,
}

impl From<&RawMaterialLine> for CostFields {
    fn from(raw: &RawMaterialLine) -> Self {
        Self {
            cost: raw.cost,
            per_unit_cost: raw.per_unit_cost,
            total_cost: raw.total_cost,
        }
    }
}

/// Why a cost could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostFieldError {
    /// Quantity is zero or negative
    Quantity,
    /// The named field is negative
    Negative(&'static str),
    /// Arithmetic left the representable range
    Overflow(&'static str),
}

/// Resolve cost fields into the canonical pair
///
/// Pure: the same fields, quantity and kind always give the same result.
pub fn resolve_cost(
    fields: CostFields,
    quantity: Quantity,
    kind: ActivityKind,
) -> Result<NormalizedCost, CostFieldError> {
    if !quantity.is_positive() {
        return Err(CostFieldError::Quantity);
    }

    for (name, value) in [
        ("cost", fields.cost),
        ("perUnitCost", fields.per_unit_cost),
        ("totalCost", fields.total_cost),
    ] {
        if matches!(value, Some(v) if v.is_sign_negative() && !v.is_zero()) {
            return Err(CostFieldError::Negative(name));
        }
    }

    let from_per_unit = |per_unit: Decimal, basis: CostBasis, field: &'static str| {
        let per_unit = Money::from_decimal(per_unit);
        per_unit
            .checked_mul(quantity)
            .map(|total| NormalizedCost {
                per_unit_cost: per_unit,
                total_cost: total,
                basis,
            })
            .ok_or(CostFieldError::Overflow(field))
    };

    let from_total = |total: Decimal, basis: CostBasis, field: &'static str| {
        let total = Money::from_decimal(total);
        total
            .per_unit(quantity)
            .map(|per_unit| NormalizedCost {
                per_unit_cost: per_unit,
                total_cost: total,
                basis,
            })
            .ok_or(CostFieldError::Overflow(field))
    };

    match (fields.per_unit_cost, fields.total_cost, fields.cost) {
        (Some(per_unit), Some(total), _) => Ok(NormalizedCost {
            per_unit_cost: Money::from_decimal(per_unit),
            total_cost: Money::from_decimal(total),
            basis: CostBasis::Explicit,
        }),
        (Some(per_unit), None, _) => from_per_unit(per_unit, CostBasis::DerivedFromPerUnit, "perUnitCost"),
        (None, Some(total), _) => from_total(total, CostBasis::DerivedFromTotal, "totalCost"),
        (None, None, Some(cost)) => match kind {
            ActivityKind::Imported => from_per_unit(cost, CostBasis::LegacyPerUnit, "cost"),
            ActivityKind::Used | ActivityKind::Transferred => {
                from_total(cost, CostBasis::LegacyTotal, "cost")
            }
        },
        (None, None, None) => Ok(NormalizedCost::absent()),
    }
}

/// A normalized line plus an optional consistency warning
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedLine {
    pub item: MaterialLineItem,
    pub warning: Option<SiteCostError>,
}

/// Normalizes raw material lines for one report run
#[derive(Debug, Clone, Copy, Default)]
pub struct CostNormalizer {
    tolerance: CostTolerance,
}

impl CostNormalizer {
    /// Create a normalizer with the given consistency tolerance
    pub fn new(tolerance: CostTolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> CostTolerance {
        self.tolerance
    }

    /// Validate and normalize one raw line of activity `record`
    ///
    /// `index` is the line's position in the activity's `materials` list and
    /// appears in error field names, e.g. `materials[2].quantity`.
    pub fn normalize_line(
        &self,
        record: &str,
        index: usize,
        raw: &RawMaterialLine,
        kind: ActivityKind,
    ) -> SiteCostResult<NormalizedLine> {
        let field = |name: &str| format!("materials[{}].{}", index, name);

        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SiteCostError::missing_field(record, field("name")))?;

        let quantity = raw
            .quantity
            .map(Quantity::new)
            .ok_or_else(|| SiteCostError::missing_field(record, field("quantity")))?;

        let cost = resolve_cost(CostFields::from(raw), quantity, kind).map_err(|e| match e {
            CostFieldError::Quantity => {
                SiteCostError::invalid_quantity(record, field("quantity"), quantity)
            }
            CostFieldError::Negative(name) => {
                let value = match name {
                    "cost" => raw.cost,
                    "perUnitCost" => raw.per_unit_cost,
                    _ => raw.total_cost,
                };
                SiteCostError::invalid_cost(
                    record,
                    field(name),
                    value.map(|v| v.to_string()).unwrap_or_default(),
                )
            }
            CostFieldError::Overflow(name) => {
                SiteCostError::invalid_cost(record, field(name), "out of range")
            }
        })?;

        let warning = if cost.basis == CostBasis::Explicit {
            self.check_pair(record, &field("totalCost"), quantity, &cost)
        } else {
            None
        };

        debug!(
            record,
            line = index,
            basis = cost.basis.label(),
            total = %cost.total_cost.amount(),
            "normalized material line"
        );

        Ok(NormalizedLine {
            item: MaterialLineItem {
                name: name.to_string(),
                unit: raw.unit.clone().unwrap_or_default(),
                quantity,
                cost,
                specs: raw.specs.clone(),
            },
            warning,
        })
    }

    /// Compare `per_unit_cost * quantity` against `total_cost`
    pub fn check_pair(
        &self,
        record: &str,
        field: &str,
        quantity: Quantity,
        cost: &NormalizedCost,
    ) -> Option<SiteCostError> {
        let computed = cost.per_unit_cost.amount().checked_mul(quantity.value())?;
        let recorded = cost.total_cost.amount();
        if (computed - recorded).abs() > self.tolerance.allowance(quantity) {
            Some(SiteCostError::InconsistentCostPair {
                record: record.to_string(),
                field: field.to_string(),
                computed,
                recorded,
            })
        } else {
            None
        }
    }
}
