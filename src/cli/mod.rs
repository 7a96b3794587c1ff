//! CLI command handlers
//!
//! Bridges clap argument parsing with the report pipeline.

pub mod report;

pub use report::{handle_report_command, handle_stats_command, OutputFormat, ReportArgs, StatsArgs};
