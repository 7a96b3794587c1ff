//! Cost Report
//!
//! Assembles header metadata, the cost summary, the day buckets and the
//! labor section into one renderer-agnostic document. Nothing here reads
//! global state or touches the filesystem: company and project details
//! arrive in an explicit `ReportContext`.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{SiteCostError, SiteCostResult};
use crate::models::{LaborEntry, MaterialActivity, RawLaborEntry, RawMaterialActivity, ReportId};
use crate::services::{
    aggregate, ActivityFilter, Aggregation, CostNormalizer, CostSummary, CostTolerance,
    CostWarning, DailyBucket, DateGrouper, ImportedRecords, Ingestor, LaborSection, SkippedItem,
    ValidationPolicy,
};

/// Company block printed at the top of a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl CompanyInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Non-empty contact lines in display order
    pub fn contact_lines(&self) -> Vec<&str> {
        [&self.address, &self.phone, &self.email]
            .into_iter()
            .filter_map(|l| l.as_deref())
            .filter(|l| !l.trim().is_empty())
            .collect()
    }
}

/// Caller-supplied metadata for one report request
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub company: CompanyInfo,
    pub project_name: String,
    pub generated_at: DateTime<FixedOffset>,
    /// Offset used for calendar-day truncation and displayed times
    pub utc_offset: FixedOffset,
    pub report_id: ReportId,
}

impl ReportContext {
    /// Context stamped now, truncating days in UTC
    pub fn new(company: CompanyInfo, project_name: impl Into<String>) -> Self {
        let utc = Utc.fix();
        Self {
            company,
            project_name: project_name.into(),
            generated_at: Utc::now().with_timezone(&utc),
            utc_offset: utc,
            report_id: ReportId::new(),
        }
    }

    /// Use a different local offset
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Pin the generation time
    pub fn with_generated_at(mut self, generated_at: DateTime<FixedOffset>) -> Self {
        self.generated_at = generated_at;
        self
    }

    /// Pin the report id
    pub fn with_report_id(mut self, report_id: ReportId) -> Self {
        self.report_id = report_id;
        self
    }
}

/// Caller choices for one report run
#[derive(Debug, Clone, Default)]
pub struct ReportOptions {
    pub policy: ValidationPolicy,
    pub tolerance: CostTolerance,
    pub filter: ActivityFilter,
}

/// Header block of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportHeader {
    pub report_id: ReportId,
    pub company: CompanyInfo,
    pub project_name: String,
    /// Expressed in the report's local offset
    pub generated_at: DateTime<FixedOffset>,
    /// Oldest day with activity
    pub period_start: Option<NaiveDate>,
    /// Newest day with activity
    pub period_end: Option<NaiveDate>,
    pub policy: ValidationPolicy,
}

/// The complete report, ready for any renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportDocument {
    pub header: ReportHeader,
    pub summary: CostSummary,
    /// Newest day first
    pub days: Vec<DailyBucket>,
    pub labor: LaborSection,
    pub skipped: Vec<SkippedItem>,
    pub warnings: Vec<CostWarning>,
}

/// Lightweight response for a "stats" endpoint
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportStats {
    pub report_id: ReportId,
    pub generated_at: DateTime<FixedOffset>,
    pub day_count: usize,
    pub skipped_count: usize,
    pub warning_count: usize,
    #[serde(flatten)]
    pub summary: CostSummary,
}

impl ReportDocument {
    /// Run the whole pipeline over raw query results
    pub fn generate(
        context: &ReportContext,
        activities: &[RawMaterialActivity],
        labor: &[RawLaborEntry],
        options: &ReportOptions,
    ) -> SiteCostResult<Self> {
        Self::build(context, activities, &[], labor, &[], options)
    }

    /// Run the whole pipeline over imported files
    ///
    /// Entries that failed to deserialize go through the validation policy
    /// ahead of the records of the same file.
    pub fn from_import(
        context: &ReportContext,
        activities: &ImportedRecords<RawMaterialActivity>,
        labor: &ImportedRecords<RawLaborEntry>,
        options: &ReportOptions,
    ) -> SiteCostResult<Self> {
        Self::build(
            context,
            &activities.records,
            &activities.malformed,
            &labor.records,
            &labor.malformed,
            options,
        )
    }

    fn build(
        context: &ReportContext,
        activities: &[RawMaterialActivity],
        malformed_activities: &[SiteCostError],
        labor: &[RawLaborEntry],
        malformed_labor: &[SiteCostError],
        options: &ReportOptions,
    ) -> SiteCostResult<Self> {
        options.filter.validate()?;

        let grouper = DateGrouper::new(context.utc_offset);
        let ingestor = Ingestor::new(CostNormalizer::new(options.tolerance), grouper, options.policy);

        let mut skipped = ingestor.malformed(malformed_activities)?;
        let activities = ingestor.activities(activities, &options.filter)?;
        skipped.extend(activities.skipped);
        skipped.extend(ingestor.malformed(malformed_labor)?);
        let labor = ingestor.labor(labor)?;
        skipped.extend(labor.skipped);

        let aggregation = aggregate(&grouper.group(&activities.items), &labor.items)?;

        let mut warnings = activities.warnings;
        warnings.extend(labor.warnings);

        let document = Self::assemble(context, aggregation, skipped, warnings, options.policy);
        info!(
            report = %document.header.report_id,
            days = document.days.len(),
            activities = document.summary.total_activities,
            skipped = document.skipped.len(),
            warnings = document.warnings.len(),
            "assembled cost report"
        );
        Ok(document)
    }

    /// Build a report from records that are already normalized
    pub fn from_normalized(
        context: &ReportContext,
        activities: &[MaterialActivity],
        labor: &[LaborEntry],
    ) -> SiteCostResult<Self> {
        let grouper = DateGrouper::new(context.utc_offset);
        let aggregation = aggregate(&grouper.group(activities), labor)?;
        Ok(Self::assemble(
            context,
            aggregation,
            Vec::new(),
            Vec::new(),
            ValidationPolicy::Abort,
        ))
    }

    /// Put the pieces together
    pub fn assemble(
        context: &ReportContext,
        aggregation: Aggregation,
        skipped: Vec<SkippedItem>,
        warnings: Vec<CostWarning>,
        policy: ValidationPolicy,
    ) -> Self {
        let Aggregation {
            buckets,
            labor,
            summary,
        } = aggregation;

        let header = ReportHeader {
            report_id: context.report_id,
            company: context.company.clone(),
            project_name: context.project_name.clone(),
            generated_at: context.generated_at.with_timezone(&context.utc_offset),
            period_start: buckets.last().map(|b| b.date),
            period_end: buckets.first().map(|b| b.date),
            policy,
        };

        Self {
            header,
            summary,
            days: buckets,
            labor,
            skipped,
            warnings,
        }
    }

    /// Summary for a "stats" response
    pub fn stats(&self) -> ReportStats {
        ReportStats {
            report_id: self.header.report_id,
            generated_at: self.header.generated_at,
            day_count: self.days.len(),
            skipped_count: self.skipped.len(),
            warning_count: self.warnings.len(),
            summary: self.summary.clone(),
        }
    }

    /// True when no input record was left out
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Offset the report's times are expressed in
    pub fn utc_offset(&self) -> FixedOffset {
        *self.header.generated_at.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityKind, Money, RawMaterialLine, RawUser};
    use rust_decimal::Decimal;

    fn context() -> ReportContext {
        ReportContext::new(CompanyInfo::new("Acme Builders"), "Riverside Towers")
    }

    fn raw(id: &str, kind: &str, ts: &str, qty: i64, cost: i64) -> RawMaterialActivity {
        RawMaterialActivity {
            id: Some(id.into()),
            user: Some(RawUser {
                id: Some("u1".into()),
                full_name: Some("Site Engineer".into()),
            }),
            project_id: Some("p1".into()),
            materials: vec![RawMaterialLine {
                name: Some("Steel".into()),
                unit: Some("kg".into()),
                quantity: Some(Decimal::from(qty)),
                cost: Some(Decimal::from(cost)),
                ..Default::default()
            }],
            activity_kind: Some(kind.into()),
            timestamp: Some(ts.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_header_carries_context() {
        let company = CompanyInfo {
            name: "Acme Builders".into(),
            phone: Some("+91 98450 00000".into()),
            ..Default::default()
        };
        let ist = FixedOffset::east_opt(19800).unwrap();
        let ctx = ReportContext::new(company, "Riverside Towers").with_offset(ist);
        let doc = ReportDocument::generate(
            &ctx,
            &[
                raw("a1", "imported", "2023-06-14T09:00:00Z", 10, 65),
                raw("a2", "imported", "2023-06-15T09:00:00Z", 2, 100),
            ],
            &[],
            &ReportOptions::default(),
        )
        .unwrap();

        assert_eq!(doc.header.company.contact_lines(), vec!["+91 98450 00000"]);
        assert_eq!(doc.header.project_name, "Riverside Towers");
        assert_eq!(doc.header.period_start, NaiveDate::from_ymd_opt(2023, 6, 14));
        assert_eq!(doc.header.period_end, NaiveDate::from_ymd_opt(2023, 6, 15));
        assert_eq!(doc.utc_offset(), ist);
        assert_eq!(doc.header.report_id, ctx.report_id);
    }

    #[test]
    fn test_abort_policy_propagates_error() {
        let err = ReportDocument::generate(
            &context(),
            &[raw("a1", "imported", "2023-06-15T09:00:00Z", 0, 65)],
            &[],
            &ReportOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SiteCostError::InvalidQuantity { .. }));
    }

    #[test]
    fn test_best_effort_lists_skipped_items() {
        let options = ReportOptions {
            policy: ValidationPolicy::BestEffort,
            ..Default::default()
        };
        let doc = ReportDocument::generate(
            &context(),
            &[
                raw("a1", "imported", "2023-06-15T09:00:00Z", 0, 65),
                raw("a2", "imported", "2023-06-15T10:00:00Z", 10, 65),
            ],
            &[],
            &options,
        )
        .unwrap();
        assert!(!doc.is_complete());
        assert_eq!(doc.summary.total_activities, 1);
        assert_eq!(doc.summary.total_material_cost, Money::from_major(650));
        assert_eq!(doc.stats().skipped_count, 2);
    }

    #[test]
    fn test_from_normalized_matches_generate() {
        let ctx = context();
        let generated = ReportDocument::generate(
            &ctx,
            &[
                raw("a1", "imported", "2023-06-15T09:00:00Z", 10, 65),
                raw("a2", "used", "2023-06-15T10:00:00Z", 10, 650),
            ],
            &[],
            &ReportOptions::default(),
        )
        .unwrap();
        let activities: Vec<MaterialActivity> = generated
            .days
            .iter()
            .flat_map(|d| d.activities.iter().cloned())
            .collect();
        let rebuilt = ReportDocument::from_normalized(&ctx, &activities, &[]).unwrap();
        assert_eq!(rebuilt.summary, generated.summary);
        assert_eq!(rebuilt.days, generated.days);
        assert_eq!(rebuilt.days[0].activities[1].kind, ActivityKind::Used);
    }

    #[test]
    fn test_inverted_filter_is_rejected() {
        let options = ReportOptions {
            filter: ActivityFilter {
                from: NaiveDate::from_ymd_opt(2023, 6, 16),
                to: NaiveDate::from_ymd_opt(2023, 6, 1),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = ReportDocument::generate(&context(), &[], &[], &options).unwrap_err();
        assert!(matches!(err, SiteCostError::Validation(_)));
    }

    #[test]
    fn test_stats_serialize_flat() {
        let doc = ReportDocument::generate(
            &context(),
            &[raw("a1", "imported", "2023-06-15T09:00:00Z", 10, 65)],
            &[],
            &ReportOptions::default(),
        )
        .unwrap();
        let json = serde_json::to_value(doc.stats()).unwrap();
        assert_eq!(json["day_count"], 1);
        assert_eq!(json["total_activities"], 1);
        assert_eq!(json["counts_by_kind"]["imported"], 1);
    }

    #[test]
    fn test_from_import_skips_malformed_entries_under_best_effort() {
        let activities = ImportedRecords {
            records: vec![raw("a1", "imported", "2023-06-15T09:00:00Z", 10, 65)],
            malformed: vec![SiteCostError::MalformedRecord {
                record: "a2".into(),
                field: Some("materials[0].qnt".into()),
                reason: "expected a Decimal".into(),
            }],
        };
        let options = ReportOptions {
            policy: ValidationPolicy::BestEffort,
            ..Default::default()
        };
        let doc = ReportDocument::from_import(&context(), &activities, &ImportedRecords::default(), &options)
            .unwrap();
        assert_eq!(doc.summary.total_material_cost, Money::from_major(650));
        assert_eq!(doc.skipped.len(), 1);
        assert_eq!(doc.skipped[0].record, "a2");

        let err = ReportDocument::from_import(
            &context(),
            &activities,
            &ImportedRecords::default(),
            &ReportOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err.record(), Some("a2"));
    }

    #[test]
    fn test_overflowing_labor_is_skipped_not_fatal() {
        let labor = vec![RawLaborEntry {
            category: Some("Mason".into()),
            count: Some(Decimal::from(2)),
            per_labor_cost: Some(Decimal::MAX),
            ..Default::default()
        }];
        let options = ReportOptions {
            policy: ValidationPolicy::BestEffort,
            ..Default::default()
        };
        let doc = ReportDocument::generate(
            &context(),
            &[raw("a1", "imported", "2023-06-15T09:00:00Z", 10, 65)],
            &labor,
            &options,
        )
        .unwrap();
        assert!(doc.labor.entries.is_empty());
        assert_eq!(doc.skipped[0].record, "labor[0]");
        assert_eq!(doc.skipped[0].field.as_deref(), Some("perLaborCost"));
    }
}
