//! JSON Export functionality
//!
//! Wraps a report document with schema and version metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::error::SiteCostResult;
use crate::reports::{ReportDocument, ReportStats};

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Report export envelope
#[derive(Debug, Clone, Serialize)]
pub struct ReportExport<'a> {
    /// Schema version for compatibility checking
    pub schema_version: &'static str,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: &'static str,

    pub report: &'a ReportDocument,
}

impl<'a> ReportExport<'a> {
    pub fn new(report: &'a ReportDocument) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION"),
            report,
        }
    }
}

/// Export a report to JSON
pub fn export_report_json<W: Write>(
    report: &ReportDocument,
    writer: &mut W,
    pretty: bool,
) -> SiteCostResult<()> {
    let export = ReportExport::new(report);
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, &export)?;
    } else {
        serde_json::to_writer(&mut *writer, &export)?;
    }
    writeln!(writer)?;
    Ok(())
}

/// Export report stats to JSON
pub fn export_stats_json<W: Write>(
    stats: &ReportStats,
    writer: &mut W,
    pretty: bool,
) -> SiteCostResult<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, stats)?;
    } else {
        serde_json::to_writer(&mut *writer, stats)?;
    }
    writeln!(writer)?;
    Ok(())
}
