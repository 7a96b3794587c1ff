//! sitecost - material and labor cost reports for construction sites
//!
//! Turns the raw material-activity and labor-ledger query results of a site
//! management backend into a cost report: every material line gets one
//! canonical per-unit/total cost pair, activities are classified as new
//! spend, consumption or relocation, bucketed by local calendar day and
//! summed into day and project totals. The resulting `ReportDocument` is
//! renderer-agnostic; terminal, JSON, YAML and CSV renderings live in
//! `reports` and `export`.
//!
//! # Architecture
//!
//! - `models`: canonical records, wire records, money and quantities
//! - `services`: normalization, classification, grouping, aggregation, ingest
//! - `reports`: the report document and its terminal rendering
//! - `export`: JSON, YAML and CSV renderings
//! - `display`: formatting helpers and tables
//! - `config`: config directory and user settings
//! - `cli`: command handlers for the `sitecost` binary
//! - `error`: error types
//! - `logging`: tracing subscriber setup
//!
//! # Example
//!
//! ```rust,ignore
//! use sitecost::reports::{CompanyInfo, ReportContext, ReportDocument, ReportOptions};
//! use sitecost::services::{parse_activities, parse_labor};
//!
//! let activities = parse_activities(&activities_json)?;
//! let labor = parse_labor(&labor_json)?;
//! let context = ReportContext::new(CompanyInfo::new("Acme Builders"), "Riverside Towers");
//! let report = ReportDocument::from_import(&context, &activities, &labor, &ReportOptions::default())?;
//! println!("{}", report.summary.total_project_cost);
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod reports;
pub mod services;

pub use error::{SiteCostError, SiteCostResult};
