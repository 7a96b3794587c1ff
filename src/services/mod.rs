//! Cost engine services
//!
//! The pipeline stages, leaves first: cost normalization, spend
//! classification, calendar-day grouping and aggregation, plus the ingest
//! stage that validates raw records and applies the validation policy.
//! Every stage is a pure, synchronous transformation over in-memory data;
//! `import` is the one place that reads files.

pub mod aggregation;
pub mod classifier;
pub mod grouping;
pub mod import;
pub mod ingest;
pub mod normalizer;

pub use aggregation::{
    aggregate, ActivityTotals, Aggregation, CostSummary, DailyBucket, KindCounts,
    LaborCategoryTotal, LaborSection,
};
pub use classifier::{classify, counts_toward_spend, SpendClass};
pub use grouping::{DateGrouper, DateGroups};
pub use import::{
    parse_activities, parse_labor, read_activities, read_labor, ImportedRecords,
};
pub use ingest::{
    ActivityFilter, CostWarning, IngestOutcome, Ingestor, SkippedItem, ValidationPolicy,
};
pub use normalizer::{resolve_cost, CostFields, CostNormalizer, CostTolerance, NormalizedLine};
