//! Reports module for sitecost
//!
//! The cost report document, its stats view and its terminal rendering.

pub mod cost_report;
mod terminal;

pub use cost_report::{
    CompanyInfo, ReportContext, ReportDocument, ReportHeader, ReportOptions, ReportStats,
};
