//! Spend classification
//!
//! The single place that decides whether an activity's materials are new
//! project spend. Every total in the crate goes through `counts_toward_spend`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ActivityKind;

/// Financial meaning of an activity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpendClass {
    /// Money leaves the project for new materials
    NewSpend,
    /// Already-paid inventory is consumed
    Consumption,
    /// Inventory moves between projects; neither end is charged
    Relocation,
}

impl fmt::Display for SpendClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewSpend => write!(f, "New spend"),
            Self::Consumption => write!(f, "Consumption"),
            Self::Relocation => write!(f, "Relocation"),
        }
    }
}

/// Classify an activity kind
pub fn classify(kind: ActivityKind) -> SpendClass {
    match kind {
        ActivityKind::Imported => SpendClass::NewSpend,
        ActivityKind::Used => SpendClass::Consumption,
        // Transfers are not re-priced at the destination.
        ActivityKind::Transferred => SpendClass::Relocation,
    }
}

/// Whether materials under this kind count toward total project spend
pub fn counts_toward_spend(kind: ActivityKind) -> bool {
    classify(kind) == SpendClass::NewSpend
}
