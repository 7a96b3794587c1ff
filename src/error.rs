//! Custom error types for SiteCost
//!
//! This module defines the error hierarchy for the engine and the CLI host
//! using thiserror. Record-level variants always name the offending record
//! (an activity id or `labor[<index>]`) and the field that failed.

use rust_decimal::Decimal;
use thiserror::Error;

/// The main error type for SiteCost operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SiteCostError {
    /// Quantity or head count is zero, negative or absent where a division needs it
    #[error("Invalid quantity in {record} ({field}): {value}")]
    InvalidQuantity {
        record: String,
        field: String,
        value: String,
    },

    /// A cost field carries a negative amount
    #[error("Invalid cost in {record} ({field}): {value}")]
    InvalidCost {
        record: String,
        field: String,
        value: String,
    },

    /// Timestamp could not be parsed into a calendar instant
    #[error("Unparseable timestamp in {record}: '{value}'")]
    UnparseableTimestamp { record: String, value: String },

    /// Activity kind is not one of imported, used or transferred
    #[error("Unknown activity kind in {record}: '{value}'")]
    UnknownActivityKind { record: String, value: String },

    /// A field required by the record's kind is absent
    #[error("Missing required field in {record}: {field}")]
    MissingRequiredField { record: String, field: String },

    /// A record in the input file does not have the expected shape
    #[error("Malformed record {record}{}: {reason}", in_field(.field))]
    MalformedRecord {
        record: String,
        field: Option<String>,
        reason: String,
    },

    /// An explicit per-unit/total pair disagrees beyond tolerance
    #[error(
        "Inconsistent cost pair in {record} ({field}): per-unit x quantity = {computed}, total = {recorded}"
    )]
    InconsistentCostPair {
        record: String,
        field: String,
        computed: Decimal,
        recorded: Decimal,
    },

    /// A report total does not fit in the money representation
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Validation errors for caller-supplied parameters
    #[error("Validation error: {0}")]
    Validation(String),

    /// Import errors (reading upstream query results)
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),
}

impl SiteCostError {
    /// Create an "invalid quantity" error
    pub fn invalid_quantity(
        record: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::InvalidQuantity {
            record: record.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Create an "invalid cost" error
    pub fn invalid_cost(
        record: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::InvalidCost {
            record: record.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Create a "missing required field" error
    pub fn missing_field(record: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            record: record.into(),
            field: field.into(),
        }
    }

    /// Create an "unparseable timestamp" error
    pub fn unparseable_timestamp(record: impl Into<String>, value: impl Into<String>) -> Self {
        Self::UnparseableTimestamp {
            record: record.into(),
            value: value.into(),
        }
    }

    /// The record (activity id or labor index) this error refers to, if any
    pub fn record(&self) -> Option<&str> {
        match self {
            Self::InvalidQuantity { record, .. }
            | Self::InvalidCost { record, .. }
            | Self::UnparseableTimestamp { record, .. }
            | Self::UnknownActivityKind { record, .. }
            | Self::MissingRequiredField { record, .. }
            | Self::MalformedRecord { record, .. }
            | Self::InconsistentCostPair { record, .. } => Some(record),
            _ => None,
        }
    }

    /// The field this error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidQuantity { field, .. }
            | Self::InvalidCost { field, .. }
            | Self::MissingRequiredField { field, .. }
            | Self::InconsistentCostPair { field, .. } => Some(field),
            Self::UnparseableTimestamp { .. } => Some("timestamp"),
            Self::UnknownActivityKind { .. } => Some("activityKind"),
            Self::MalformedRecord { field, .. } => field.as_deref(),
            _ => None,
        }
    }

    /// Check if this error describes a malformed input record
    pub fn is_record_error(&self) -> bool {
        self.record().is_some()
    }

    /// Check if this is a warning rather than a rejection
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::InconsistentCostPair { .. })
    }
}

fn in_field(field: &Option<String>) -> String {
    field.as_ref().map(|f| format!(" ({})", f)).unwrap_or_default()
}

// Implement From traits for common error types

impl From<std::io::Error> for SiteCostError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SiteCostError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl From<serde_yaml::Error> for SiteCostError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Yaml(err.to_string())
    }
}

impl From<csv::Error> for SiteCostError {
    fn from(err: csv::Error) -> Self {
        Self::Export(err.to_string())
    }
}

/// Result type alias for SiteCost operations
pub type SiteCostResult<T> = Result<T, SiteCostError>;
