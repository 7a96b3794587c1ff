//! Ingestion of upstream query results
//!
//! Validates raw material activities and labor entries, normalizes every
//! material line exactly once, and applies the caller's validation policy:
//! abort on the first invalid record, or skip it and keep going.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use super::grouping::DateGrouper;
use super::normalizer::CostNormalizer;
use crate::error::{SiteCostError, SiteCostResult};
use crate::models::{
    ActivityId, ActivityKind, ActivityUser, CostBasis, LaborEntry, MaterialActivity, Money,
    NormalizedCost, ProjectId, Quantity, RawLaborEntry, RawMaterialActivity, TransferDetails,
    UserId,
};

/// What to do when an input record is invalid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidationPolicy {
    /// Fail the whole report on the first invalid record
    #[default]
    Abort,
    /// Skip invalid records and list them in the report
    BestEffort,
}

impl fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Abort => write!(f, "abort"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

impl FromStr for ValidationPolicy {
    type Err = SiteCostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" | "strict" => Ok(Self::Abort),
            "best-effort" | "best_effort" | "lenient" => Ok(Self::BestEffort),
            other => Err(SiteCostError::Validation(format!(
                "Unknown validation policy '{}'. Use 'abort' or 'best-effort'",
                other
            ))),
        }
    }
}

/// A record left out of the report under the best-effort policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedItem {
    /// Activity id or `labor[<index>]`
    pub record: String,
    pub field: Option<String>,
    pub reason: String,
    #[serde(skip)]
    pub error: SiteCostError,
}

impl From<SiteCostError> for SkippedItem {
    fn from(error: SiteCostError) -> Self {
        Self {
            record: error.record().unwrap_or("unknown").to_string(),
            field: error.field().map(str::to_string),
            reason: error.to_string(),
            error,
        }
    }
}

/// An explicit cost pair that disagrees beyond tolerance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostWarning {
    pub record: String,
    pub field: String,
    pub computed: Decimal,
    pub recorded: Decimal,
    pub message: String,
}

impl CostWarning {
    /// Convert an `InconsistentCostPair` error; other errors are not warnings
    pub fn from_error(error: SiteCostError) -> Option<Self> {
        let message = error.to_string();
        match error {
            SiteCostError::InconsistentCostPair {
                record,
                field,
                computed,
                recorded,
            } => Some(Self {
                record,
                field,
                computed,
                recorded,
                message,
            }),
            _ => None,
        }
    }
}

/// Restricts which activities enter a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityFilter {
    pub project_id: Option<ProjectId>,
    /// Inclusive, local calendar date
    pub from: Option<NaiveDate>,
    /// Inclusive, local calendar date
    pub to: Option<NaiveDate>,
}

impl ActivityFilter {
    /// Check that the date range is not inverted
    pub fn validate(&self) -> SiteCostResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err(SiteCostError::Validation(format!(
                    "Start date {} is after end date {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    /// Whether an activity passes the filter
    pub fn matches(&self, activity: &MaterialActivity, grouper: &DateGrouper) -> bool {
        if let Some(project_id) = &self.project_id {
            if &activity.project_id != project_id {
                return false;
            }
        }
        let date = grouper.local_date(&activity.timestamp);
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

/// Validated records plus whatever was skipped or flagged on the way
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome<T> {
    pub items: Vec<T>,
    pub skipped: Vec<SkippedItem>,
    pub warnings: Vec<CostWarning>,
}

impl<T> Default for IngestOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Turns raw query results into canonical records
#[derive(Debug, Clone, Copy, Default)]
pub struct Ingestor {
    normalizer: CostNormalizer,
    grouper: DateGrouper,
    policy: ValidationPolicy,
}

impl Ingestor {
    pub fn new(normalizer: CostNormalizer, grouper: DateGrouper, policy: ValidationPolicy) -> Self {
        Self {
            normalizer,
            grouper,
            policy,
        }
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    /// Validate, normalize and filter material activities
    pub fn activities(
        &self,
        raw: &[RawMaterialActivity],
        filter: &ActivityFilter,
    ) -> SiteCostResult<IngestOutcome<MaterialActivity>> {
        let mut outcome = IngestOutcome::default();

        for (index, record) in raw.iter().enumerate() {
            if let Some(activity) = self.activity(index, record, &mut outcome)? {
                if filter.matches(&activity, &self.grouper) {
                    outcome.items.push(activity);
                }
            }
        }

        debug!(
            received = raw.len(),
            accepted = outcome.items.len(),
            skipped = outcome.skipped.len(),
            "ingested material activities"
        );
        Ok(outcome)
    }

    /// Validate labor entries
    pub fn labor(&self, raw: &[RawLaborEntry]) -> SiteCostResult<IngestOutcome<LaborEntry>> {
        let mut outcome = IngestOutcome::default();

        for (index, record) in raw.iter().enumerate() {
            match self.labor_entry(index, record) {
                Ok((entry, warning)) => {
                    if let Some(warning) = warning.and_then(CostWarning::from_error) {
                        warn!(record = %warning.record, "{}", warning.message);
                        outcome.warnings.push(warning);
                    }
                    outcome.items.push(entry);
                }
                Err(err) => self.reject(err, &mut outcome.skipped)?,
            }
        }

        debug!(
            received = raw.len(),
            accepted = outcome.items.len(),
            skipped = outcome.skipped.len(),
            "ingested labor entries"
        );
        Ok(outcome)
    }

    /// Apply the policy to entries that could not be deserialized
    pub fn malformed(&self, errors: &[SiteCostError]) -> SiteCostResult<Vec<SkippedItem>> {
        let mut skipped = Vec::new();
        for err in errors {
            self.reject(err.clone(), &mut skipped)?;
        }
        Ok(skipped)
    }

    /// Abort with the error, or record it as skipped
    fn reject(&self, err: SiteCostError, skipped: &mut Vec<SkippedItem>) -> SiteCostResult<()> {
        match self.policy {
            ValidationPolicy::Abort => Err(err),
            ValidationPolicy::BestEffort => {
                warn!(record = err.record().unwrap_or("unknown"), "skipping: {}", err);
                skipped.push(SkippedItem::from(err));
                Ok(())
            }
        }
    }

    fn activity(
        &self,
        index: usize,
        raw: &RawMaterialActivity,
        outcome: &mut IngestOutcome<MaterialActivity>,
    ) -> SiteCostResult<Option<MaterialActivity>> {
        let mut activity = match self.activity_header(index, raw) {
            Ok(activity) => activity,
            Err(err) => {
                self.reject(err, &mut outcome.skipped)?;
                return Ok(None);
            }
        };
        let record = activity.id.to_string();

        for (line_index, line) in raw.materials.iter().enumerate() {
            match self
                .normalizer
                .normalize_line(&record, line_index, line, activity.kind)
            {
                Ok(normalized) => {
                    if let Some(warning) = normalized.warning.and_then(CostWarning::from_error) {
                        warn!(record = %record, "{}", warning.message);
                        outcome.warnings.push(warning);
                    }
                    activity.materials.push(normalized.item);
                }
                Err(err) => self.reject(err, &mut outcome.skipped)?,
            }
        }

        if activity.materials.is_empty() {
            self.reject(
                SiteCostError::missing_field(&record, "materials"),
                &mut outcome.skipped,
            )?;
            return Ok(None);
        }

        if Money::checked_sum(activity.materials.iter().map(|m| m.total_cost())).is_none() {
            self.reject(
                SiteCostError::invalid_cost(&record, "materials", "total out of range"),
                &mut outcome.skipped,
            )?;
            return Ok(None);
        }

        Ok(Some(activity))
    }

    /// Validate everything but the material lines
    fn activity_header(
        &self,
        index: usize,
        raw: &RawMaterialActivity,
    ) -> SiteCostResult<MaterialActivity> {
        let id = non_blank(&raw.id)
            .map(ActivityId::new)
            .ok_or_else(|| SiteCostError::missing_field(format!("activity[{}]", index), "id"))?;
        let record = id.to_string();

        let kind_str = non_blank(&raw.activity_kind)
            .ok_or_else(|| SiteCostError::missing_field(&record, "activityKind"))?;
        let kind = kind_str
            .parse::<ActivityKind>()
            .map_err(|value| SiteCostError::UnknownActivityKind {
                record: record.clone(),
                value,
            })?;

        let timestamp = match raw.timestamp.as_deref() {
            Some(value) => self.grouper.parse_timestamp(&record, value)?,
            None => return Err(SiteCostError::missing_field(&record, "timestamp")),
        };

        let user = raw
            .user
            .as_ref()
            .and_then(|u| non_blank(&u.id).map(|id| (id, u)))
            .map(|(id, u)| ActivityUser {
                id: UserId::new(id),
                full_name: non_blank(&u.full_name).unwrap_or_default(),
            })
            .ok_or_else(|| SiteCostError::missing_field(&record, "user.id"))?;

        let project_id = non_blank(&raw.project_id)
            .map(ProjectId::new)
            .ok_or_else(|| SiteCostError::missing_field(&record, "projectId"))?;

        let transfer = match kind {
            ActivityKind::Transferred => {
                let details = raw
                    .transfer_details
                    .as_ref()
                    .ok_or_else(|| SiteCostError::missing_field(&record, "transferDetails"))?;
                let from_project = details
                    .from_project
                    .as_ref()
                    .and_then(|p| p.label())
                    .ok_or_else(|| {
                        SiteCostError::missing_field(&record, "transferDetails.fromProject")
                    })?;
                let to_project = details
                    .to_project
                    .as_ref()
                    .and_then(|p| p.label())
                    .ok_or_else(|| {
                        SiteCostError::missing_field(&record, "transferDetails.toProject")
                    })?;
                Some(TransferDetails {
                    from_project,
                    to_project,
                })
            }
            _ => {
                if raw.transfer_details.is_some() {
                    debug!(record = %record, "ignoring transfer details on a {} activity", kind);
                }
                None
            }
        };

        if raw.materials.is_empty() {
            return Err(SiteCostError::missing_field(&record, "materials"));
        }

        Ok(MaterialActivity {
            id,
            user,
            project_id,
            project_name: non_blank(&raw.project_name),
            section_name: non_blank(&raw.section_name),
            mini_section_name: non_blank(&raw.mini_section_name),
            materials: Vec::with_capacity(raw.materials.len()),
            kind,
            message: non_blank(&raw.message),
            timestamp,
            transfer,
        })
    }

    fn labor_entry(
        &self,
        index: usize,
        raw: &RawLaborEntry,
    ) -> SiteCostResult<(LaborEntry, Option<SiteCostError>)> {
        let record = format!("labor[{}]", index);

        let category = non_blank(&raw.category)
            .ok_or_else(|| SiteCostError::missing_field(&record, "category"))?;
        let labor_type = non_blank(&raw.labor_type).unwrap_or_default();

        let count = raw
            .count
            .ok_or_else(|| SiteCostError::missing_field(&record, "count"))?;
        let count_u32 = Some(count)
            .filter(|c| c.fract().is_zero() && *c > Decimal::ZERO)
            .and_then(|c| c.to_u32())
            .ok_or_else(|| SiteCostError::invalid_quantity(&record, "count", count.normalize()))?;

        for (field, value) in [("perLaborCost", raw.per_labor_cost), ("totalCost", raw.total_cost)] {
            if let Some(v) = value {
                if v.is_sign_negative() && !v.is_zero() {
                    return Err(SiteCostError::invalid_cost(&record, field, v));
                }
            }
        }

        let quantity = Quantity::from(count_u32);
        let per_labor_cost = match (raw.per_labor_cost, raw.total_cost) {
            (Some(per), _) => Money::from_decimal(per),
            (None, Some(total)) => Money::from_decimal(total)
                .per_unit(quantity)
                .ok_or_else(|| SiteCostError::invalid_cost(&record, "totalCost", "out of range"))?,
            (None, None) => return Err(SiteCostError::missing_field(&record, "perLaborCost")),
        };

        let entry = LaborEntry::new(category, labor_type, count_u32, per_labor_cost)
            .ok_or_else(|| SiteCostError::invalid_cost(&record, "perLaborCost", "out of range"))?;

        let warning = match (raw.per_labor_cost, raw.total_cost) {
            (Some(_), Some(total)) => self.normalizer.check_pair(
                &record,
                "totalCost",
                quantity,
                &NormalizedCost {
                    per_unit_cost: per_labor_cost,
                    total_cost: Money::from_decimal(total),
                    basis: CostBasis::Explicit,
                },
            ),
            _ => None,
        };

        Ok((entry, warning))
    }
}

/// Trimmed, non-empty copy of an optional string
fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
