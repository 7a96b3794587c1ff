//! Export module for sitecost
//!
//! Machine-readable renderings of a cost report:
//! - JSON: the full report document with schema versioning
//! - YAML: the same document, human-readable
//! - CSV: one row per material line and labor entry (spreadsheet-compatible)

pub mod csv;
pub mod json;
pub mod yaml;

pub use csv::export_report_csv;
pub use json::{export_report_json, export_stats_json, ReportExport, EXPORT_SCHEMA_VERSION};
pub use yaml::export_report_yaml;

#[cfg(test)]
pub(crate) fn test_document() -> crate::reports::ReportDocument {
    use crate::models::{ActivityKind, LaborEntry, Money};
    use crate::reports::{CompanyInfo, ReportContext, ReportDocument};
    use crate::services::test_support::{activity, line};

    let activities = vec![
        activity("steel-in", ActivityKind::Imported, "2023-06-15T09:00:00Z", vec![line("Steel", 100, 65)]),
        activity("cement-in", ActivityKind::Imported, "2023-06-15T10:00:00Z", vec![line("Cement", 20, 400)]),
        activity("steel-out", ActivityKind::Used, "2023-06-15T15:00:00Z", vec![line("Steel", 30, 65)]),
    ];
    let labor = vec![LaborEntry::new("Mason", "skilled", 5, Money::from_major(800)).unwrap()];
    let ctx = ReportContext::new(CompanyInfo::new("Acme Builders"), "Riverside Towers");
    ReportDocument::from_normalized(&ctx, &activities, &labor).unwrap()
}
