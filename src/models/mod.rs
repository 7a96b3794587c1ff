//! Core data models for SiteCost
//!
//! This module contains the data structures of the cost reporting domain:
//! material activities and their line items, labor entries, money and
//! quantities. Each entity has a raw (wire) form and a canonical form.

pub mod activity;
pub mod ids;
pub mod labor;
pub mod material;
pub mod money;
pub mod quantity;

pub use activity::{
    ActivityKind, ActivityUser, MaterialActivity, RawMaterialActivity, RawProjectRef,
    RawTransferDetails, RawUser, TransferDetails,
};
pub use ids::{ActivityId, ProjectId, ReportId, UserId};
pub use labor::{LaborEntry, RawLaborEntry};
pub use material::{CostBasis, MaterialLineItem, NormalizedCost, RawMaterialLine};
pub use money::Money;
pub use quantity::Quantity;
