//! CLI commands for cost reports
//!
//! Reads the query-result files, runs the report pipeline with the user's
//! settings and writes the result in the requested format.

use chrono::NaiveDate;
use clap::{Args, ValueEnum};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::error::{SiteCostError, SiteCostResult};
use crate::export::{export_report_csv, export_report_json, export_report_yaml, export_stats_json};
use crate::models::{ProjectId, RawMaterialActivity};
use crate::reports::{ReportContext, ReportDocument, ReportOptions};
use crate::services::{
    read_activities, read_labor, ActivityFilter, ImportedRecords, ValidationPolicy,
};

/// Output format of `sitecost report`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Json,
    Yaml,
    Csv,
}

/// Inputs shared by `report` and `stats`
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Material activity query result (JSON)
    #[arg(short, long)]
    pub activities: PathBuf,

    /// Labor ledger query result (JSON)
    #[arg(short, long)]
    pub labor: Option<PathBuf>,

    /// Only include activities of this project
    #[arg(long)]
    pub project_id: Option<String>,

    /// Project name for the report header
    #[arg(long)]
    pub project_name: Option<String>,

    /// First day to include (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Last day to include (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,

    /// Skip invalid records instead of failing
    #[arg(long)]
    pub best_effort: bool,
}

/// Arguments of `sitecost report`
#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    pub format: OutputFormat,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments of `sitecost stats`
#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Pretty-print the JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Handle `sitecost report`
pub fn handle_report_command(settings: &Settings, args: ReportArgs) -> SiteCostResult<()> {
    let report = build_report(settings, &args.input)?;

    match &args.output {
        Some(path) => {
            let mut writer = create_output(path)?;
            write_report(&report, settings, args.format, &mut writer)?;
            writer.flush()?;
            println!("Report exported to: {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut writer = stdout.lock();
            write_report(&report, settings, args.format, &mut writer)?;
        }
    }

    Ok(())
}

/// Handle `sitecost stats`
pub fn handle_stats_command(settings: &Settings, args: StatsArgs) -> SiteCostResult<()> {
    let report = build_report(settings, &args.input)?;
    let stdout = std::io::stdout();
    export_stats_json(&report.stats(), &mut stdout.lock(), args.pretty)
}

fn write_report<W: Write>(
    report: &ReportDocument,
    settings: &Settings,
    format: OutputFormat,
    writer: &mut W,
) -> SiteCostResult<()> {
    match format {
        OutputFormat::Terminal => {
            write!(writer, "{}", report.format_terminal(&settings.display_options()))?;
            Ok(())
        }
        OutputFormat::Json => export_report_json(report, writer, true),
        OutputFormat::Yaml => export_report_yaml(report, writer),
        OutputFormat::Csv => export_report_csv(report, writer),
    }
}

fn create_output(path: &Path) -> SiteCostResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        SiteCostError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Read inputs and run the pipeline with the user's settings
fn build_report(settings: &Settings, input: &InputArgs) -> SiteCostResult<ReportDocument> {
    let activities = read_activities(&input.activities)?;
    let labor = match &input.labor {
        Some(path) => read_labor(path)?,
        None => ImportedRecords::default(),
    };

    let filter = ActivityFilter {
        project_id: input.project_id.as_deref().map(ProjectId::new),
        from: input.from.as_deref().map(|s| parse_date(s, "start")).transpose()?,
        to: input.to.as_deref().map(|s| parse_date(s, "end")).transpose()?,
    };

    let options = ReportOptions {
        policy: if input.best_effort {
            ValidationPolicy::BestEffort
        } else {
            settings.validation_policy
        },
        tolerance: settings.cost_tolerance,
        filter,
    };

    let project_name = input
        .project_name
        .clone()
        .unwrap_or_else(|| project_name_from(&activities.records, input.project_id.as_deref()));

    let context = ReportContext::new(settings.company.clone(), project_name)
        .with_offset(settings.utc_offset()?);

    ReportDocument::from_import(&context, &activities, &labor, &options)
}

fn parse_date(value: &str, label: &str) -> SiteCostResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        SiteCostError::Validation(format!(
            "Invalid {} date format: {}. Use YYYY-MM-DD",
            label, value
        ))
    })
}

/// Header name when none is given: the first project name in the input
fn project_name_from(activities: &[RawMaterialActivity], project_id: Option<&str>) -> String {
    activities
        .iter()
        .filter(|a| project_id.map_or(true, |id| a.project_id.as_deref() == Some(id)))
        .find_map(|a| a.project_name.as_deref().filter(|n| !n.trim().is_empty()))
        .map(str::to_string)
        .or_else(|| project_id.map(str::to_string))
        .unwrap_or_else(|| "Unnamed project".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(project_id: &str, name: Option<&str>) -> RawMaterialActivity {
        RawMaterialActivity {
            project_id: Some(project_id.into()),
            project_name: name.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2023-06-15", "start").unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()
        );
        let err = parse_date("15/06/2023", "end").unwrap_err();
        assert!(err.to_string().contains("Invalid end date format"));
    }

    #[test]
    fn test_project_name_fallbacks() {
        let activities = vec![raw("p1", None), raw("p2", Some("Harbor View")), raw("p1", Some("Riverside"))];
        assert_eq!(project_name_from(&activities, None), "Harbor View");
        assert_eq!(project_name_from(&activities, Some("p1")), "Riverside");
        assert_eq!(project_name_from(&activities, Some("p9")), "p9");
        assert_eq!(project_name_from(&[], None), "Unnamed project");
    }

    #[test]
    fn test_write_report_formats() {
        let report = crate::export::test_document();
        let settings = Settings::default();

        let mut terminal = Vec::new();
        write_report(&report, &settings, OutputFormat::Terminal, &mut terminal).unwrap();
        assert!(String::from_utf8(terminal).unwrap().contains("TOTAL PROJECT COST"));

        let mut csv = Vec::new();
        write_report(&report, &settings, OutputFormat::Csv, &mut csv).unwrap();
        assert!(String::from_utf8(csv).unwrap().starts_with("Section,"));
    }
}
