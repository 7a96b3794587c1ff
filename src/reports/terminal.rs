//! Plain-text rendering of a cost report

use super::cost_report::ReportDocument;
use crate::display::report::{
    double_separator, format_bar, format_header, format_percentage, labeled, separator, share,
};
use crate::display::{labor_table, material_table, DisplayOptions};
use crate::models::ActivityKind;
use crate::services::{ActivityTotals, DailyBucket, KindCounts};

const BAR_WIDTH: usize = 30;

impl ReportDocument {
    /// Format the report for terminal display
    pub fn format_terminal(&self, options: &DisplayOptions) -> String {
        let width = options.width;
        let mut output = String::new();

        // Header
        output.push_str(&format_header("MATERIAL & LABOR COST REPORT", width));
        output.push('\n');
        output.push_str(&double_separator(width));
        output.push('\n');
        if !self.header.company.name.is_empty() {
            output.push_str(&format!("{}\n", self.header.company.name));
        }
        for line in self.header.company.contact_lines() {
            output.push_str(&format!("{}\n", line));
        }
        output.push_str(&labeled(
            &format!("Project: {}", self.header.project_name),
            &format!("Report: {}", self.header.report_id.short()),
            width,
        ));
        output.push('\n');
        output.push_str(&format!(
            "Generated: {}\n",
            self.header.generated_at.format("%Y-%m-%d %H:%M (UTC%:z)")
        ));
        if let (Some(start), Some(end)) = (self.header.period_start, self.header.period_end) {
            output.push_str(&format!(
                "Period: {} to {}\n",
                options.date(start),
                options.date(end)
            ));
        }
        output.push_str(&separator(width));
        output.push('\n');

        self.push_summary(&mut output, options);

        // Days, newest first
        if self.days.is_empty() {
            output.push_str("\nNo material activity in this period.\n");
        }
        for bucket in &self.days {
            self.push_day(&mut output, bucket, options);
        }

        // Labor
        output.push('\n');
        output.push_str("LABOR\n");
        output.push_str(&separator(width));
        output.push('\n');
        if self.labor.entries.is_empty() {
            output.push_str("No labor entries.\n");
        } else {
            output.push_str(&labor_table(&self.labor, options));
            output.push('\n');
        }

        if !self.warnings.is_empty() {
            output.push_str(&format!("\nCost warnings ({}):\n", self.warnings.len()));
            for warning in &self.warnings {
                output.push_str(&format!("  ! {}\n", warning.message));
            }
        }

        if !self.skipped.is_empty() {
            output.push_str(&format!("\nSkipped records ({}):\n", self.skipped.len()));
            for item in &self.skipped {
                output.push_str(&format!("  - {}\n", item.reason));
            }
        }

        output.push_str(&double_separator(width));
        output.push('\n');
        output.push_str(&labeled(
            "TOTAL PROJECT COST",
            &options.money(self.summary.total_project_cost),
            width,
        ));
        output.push('\n');

        output
    }

    fn push_summary(&self, output: &mut String, options: &DisplayOptions) {
        let summary = &self.summary;
        let width = options.width;

        output.push_str("SUMMARY\n");
        output.push_str(&format!(
            "Activities: {} ({})\n",
            summary.total_activities,
            kind_breakdown(&summary.counts_by_kind)
        ));
        output.push_str(&labeled(
            "Material cost:",
            &options.money(summary.total_material_cost),
            width / 2,
        ));
        output.push('\n');
        output.push_str(&labeled(
            "Labor cost:",
            &options.money(summary.total_labor_cost),
            width / 2,
        ));
        output.push('\n');
        output.push_str(&labeled(
            "Project cost:",
            &options.money(summary.total_project_cost),
            width / 2,
        ));
        output.push('\n');

        if !summary.total_project_cost.is_zero() {
            let material_pct = share(summary.total_material_cost, summary.total_project_cost);
            let labor_pct = share(summary.total_labor_cost, summary.total_project_cost);
            output.push_str(&format!(
                "  Material {} {}\n",
                format_bar(material_pct, 100.0, BAR_WIDTH),
                format_percentage(material_pct)
            ));
            output.push_str(&format!(
                "  Labor    {} {}\n",
                format_bar(labor_pct, 100.0, BAR_WIDTH),
                format_percentage(labor_pct)
            ));
        }
    }

    fn push_day(&self, output: &mut String, bucket: &DailyBucket, options: &DisplayOptions) {
        let offset = self.utc_offset();

        output.push('\n');
        output.push_str(&labeled(
            &format!(
                "{} ({})",
                options.date(bucket.date),
                bucket.date.format("%A")
            ),
            &format!("Day total: {}", options.money(bucket.day_material_total)),
            options.width,
        ));
        output.push('\n');
        output.push_str(&format!("  {}\n", kind_breakdown(&bucket.counts_by_kind)));
        output.push_str(&separator(options.width));
        output.push('\n');

        for (activity, totals) in bucket.entries() {
            let mut line = format!(
                "[{}] {} by {}",
                activity.kind,
                activity.timestamp.with_timezone(&offset).format("%H:%M"),
                activity.user.full_name
            );
            if let Some(location) = activity.location() {
                line.push_str(&format!(" @ {}", location));
            }
            output.push_str(&labeled(&line, &spend_label(totals, options), options.width));
            output.push('\n');

            if let Some(transfer) = &activity.transfer {
                output.push_str(&format!(
                    "  Transfer: {} -> {}\n",
                    transfer.from_project, transfer.to_project
                ));
            }
            if let Some(message) = &activity.message {
                output.push_str(&format!("  Note: {}\n", message));
            }
            output.push_str(&material_table(&activity.materials, options));
            output.push('\n');
        }
    }
}

fn kind_breakdown(counts: &KindCounts) -> String {
    ActivityKind::ALL
        .iter()
        .map(|kind| format!("{} {}", kind, counts.get(*kind)))
        .collect::<Vec<_>>()
        .join(", ")
}

fn spend_label(totals: &ActivityTotals, options: &DisplayOptions) -> String {
    if totals.counts_toward_spend {
        format!("Spend: {}", options.money(totals.spend_total))
    } else {
        format!("Value: {} (not spend)", options.money(totals.material_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LaborEntry, Money};
    use crate::reports::{CompanyInfo, ReportContext};
    use crate::services::test_support::{activity, line};
    use chrono::DateTime;

    fn document() -> ReportDocument {
        let activities = vec![
            activity("steel-in", ActivityKind::Imported, "2023-06-15T09:00:00Z", vec![line("Steel", 100, 65)]),
            activity("cement-in", ActivityKind::Imported, "2023-06-15T10:00:00Z", vec![line("Cement", 20, 400)]),
            activity("steel-out", ActivityKind::Used, "2023-06-15T15:00:00Z", vec![line("Steel", 30, 65)]),
        ];
        let labor = vec![LaborEntry::new("Mason", "skilled", 5, Money::from_major(800)).unwrap()];
        let ctx = ReportContext::new(CompanyInfo::new("Acme Builders"), "Riverside Towers")
            .with_generated_at(DateTime::parse_from_rfc3339("2023-06-15T18:00:00Z").unwrap());
        ReportDocument::from_normalized(&ctx, &activities, &labor).unwrap()
    }

    #[test]
    fn test_format_terminal_sections() {
        let output = document().format_terminal(&DisplayOptions::default());

        assert!(output.contains("MATERIAL & LABOR COST REPORT"));
        assert!(output.contains("Acme Builders"));
        assert!(output.contains("Project: Riverside Towers"));
        assert!(output.contains("Activities: 3 (Imported 2, Used 1, Transferred 0)"));
        assert!(output.contains("$14500.00"));
        assert!(output.contains("$4000.00"));
        assert!(output.contains("2023-06-15 (Thursday)"));
        assert!(output.contains("Value: $1950.00 (not spend)"));
        assert!(output.contains("LABOR"));
        assert!(output.lines().last().unwrap().ends_with("$18500.00"));
    }

    #[test]
    fn test_format_terminal_empty_report() {
        let ctx = ReportContext::new(CompanyInfo::default(), "Empty");
        let doc = ReportDocument::from_normalized(&ctx, &[], &[]).unwrap();
        let output = doc.format_terminal(&DisplayOptions::default());
        assert!(output.contains("No material activity in this period."));
        assert!(output.contains("No labor entries."));
        assert!(!output.contains("Period:"));
    }
}
