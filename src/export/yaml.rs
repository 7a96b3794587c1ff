//! YAML Export functionality

use std::io::Write;

use crate::error::SiteCostResult;
use crate::export::json::ReportExport;
use crate::reports::ReportDocument;

/// Export a report to YAML format
pub fn export_report_yaml<W: Write>(report: &ReportDocument, writer: &mut W) -> SiteCostResult<()> {
    let export = ReportExport::new(report);

    writeln!(writer, "# sitecost material & labor cost report")?;
    writeln!(writer, "# Report: {}", report.header.report_id.short())?;
    writeln!(writer, "# Project: {}", report.header.project_name)?;
    writeln!(writer, "# Generated: {}", export.exported_at)?;
    writeln!(writer, "# App Version: {}", export.app_version)?;
    writeln!(writer)?;

    serde_yaml::to_writer(writer, &export)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::test_document;

    #[test]
    fn test_yaml_export() {
        let report = test_document();
        let mut buffer = Vec::new();
        export_report_yaml(&report, &mut buffer).unwrap();

        let yaml = String::from_utf8(buffer).unwrap();
        assert!(yaml.starts_with("# sitecost"));
        assert!(yaml.contains("project_name: Riverside Towers"));

        let value: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(value["report"]["summary"]["total_activities"].as_u64(), Some(3));
        assert_eq!(value["schema_version"].as_str(), Some("1.0.0"));
    }
}
