//! CSV Export functionality
//!
//! One row per material line (newest day first), then one row per labor
//! entry, then the three report totals.

use serde::Serialize;
use std::io::Write;

use crate::error::SiteCostResult;
use crate::reports::ReportDocument;

#[derive(Debug, Default, Serialize)]
struct CsvRecord<'a> {
    #[serde(rename = "Section")]
    section: &'static str,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Activity")]
    activity: &'a str,
    #[serde(rename = "Kind")]
    kind: &'a str,
    #[serde(rename = "Counts Toward Spend")]
    counts_toward_spend: &'static str,
    #[serde(rename = "Item")]
    item: &'a str,
    #[serde(rename = "Type")]
    item_type: &'a str,
    #[serde(rename = "Quantity")]
    quantity: String,
    #[serde(rename = "Unit")]
    unit: &'a str,
    #[serde(rename = "Per Unit")]
    per_unit: String,
    #[serde(rename = "Total")]
    total: String,
    #[serde(rename = "Cost Basis")]
    cost_basis: &'a str,
}

/// Export a report as CSV
pub fn export_report_csv<W: Write>(report: &ReportDocument, writer: &mut W) -> SiteCostResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    for bucket in &report.days {
        let date = bucket.date_key();
        for (activity, totals) in bucket.entries() {
            for item in &activity.materials {
                csv.serialize(CsvRecord {
                    section: "material",
                    date: date.clone(),
                    activity: activity.id.as_str(),
                    kind: activity.kind.as_str(),
                    counts_toward_spend: if totals.counts_toward_spend { "yes" } else { "no" },
                    item: &item.name,
                    quantity: item.quantity.to_string(),
                    unit: &item.unit,
                    per_unit: item.per_unit_cost().to_plain_string(),
                    total: item.total_cost().to_plain_string(),
                    cost_basis: item.cost.basis.label(),
                    ..Default::default()
                })?;
            }
        }
    }

    for entry in &report.labor.entries {
        csv.serialize(CsvRecord {
            section: "labor",
            item: &entry.category,
            item_type: &entry.labor_type,
            quantity: entry.count.to_string(),
            unit: "head",
            per_unit: entry.per_labor_cost.to_plain_string(),
            total: entry.total_cost.to_plain_string(),
            ..Default::default()
        })?;
    }

    let summary = &report.summary;
    for (label, amount) in [
        ("Material Total", summary.total_material_cost),
        ("Labor Total", summary.total_labor_cost),
        ("Project Total", summary.total_project_cost),
    ] {
        csv.serialize(CsvRecord {
            section: "total",
            item: label,
            total: amount.to_plain_string(),
            ..Default::default()
        })?;
    }

    csv.flush()?;
    Ok(())
}
