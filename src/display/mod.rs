//! Display formatting for terminal output
//!
//! Formatting helpers and table rows shared by the terminal renderer.

pub mod report;
pub mod tables;

pub use tables::{labor_table, material_table, LaborRow, MaterialRow};

use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::fmt::Write;

use crate::models::Money;

/// Default width of separators and centered headings
pub const REPORT_WIDTH: usize = 80;

/// Day format used when the configured one cannot render a date
pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";

/// How amounts and dates are printed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    pub currency_symbol: String,
    /// chrono format string for day headings
    pub date_format: String,
    pub width: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            date_format: FALLBACK_DATE_FORMAT.to_string(),
            width: REPORT_WIDTH,
        }
    }
}

impl DisplayOptions {
    /// Format an amount with the configured symbol
    pub fn money(&self, amount: Money) -> String {
        amount.format_with_symbol(&self.currency_symbol)
    }

    /// Format a calendar date with the configured format
    pub fn date(&self, date: NaiveDate) -> String {
        format_date(date, &self.date_format)
            .unwrap_or_else(|| date.format(FALLBACK_DATE_FORMAT).to_string())
    }
}

/// Check that a strftime string can render a plain calendar date
///
/// Rejects unknown specifiers and time-of-day fields, both of which make
/// chrono's `Display` fail for a `NaiveDate`.
pub fn is_valid_date_format(format: &str) -> bool {
    !StrftimeItems::new(format).any(|item| matches!(item, Item::Error))
        && NaiveDate::from_ymd_opt(2000, 1, 1).map_or(false, |d| format_date(d, format).is_some())
}

fn format_date(date: NaiveDate, format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", date.format(format)).ok()?;
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_uses_symbol() {
        let options = DisplayOptions {
            currency_symbol: "₹".to_string(),
            ..Default::default()
        };
        assert_eq!(options.money(Money::from_major(18500)), "₹18500.00");
        assert_eq!(DisplayOptions::default().money(Money::from_minor(-5)), "-$0.05");
    }

    #[test]
    fn test_date_format_validation() {
        assert!(is_valid_date_format("%Y-%m-%d"));
        assert!(is_valid_date_format("%d %b %Y"));
        assert!(!is_valid_date_format("%Q"));
        assert!(!is_valid_date_format("%Y-%m-%d %H:%M"));
    }

    #[test]
    fn test_bad_date_format_falls_back() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let options = DisplayOptions {
            date_format: "%Q".to_string(),
            ..Default::default()
        };
        assert_eq!(options.date(date), "2023-06-15");

        let options = DisplayOptions {
            date_format: "%d/%m/%Y".to_string(),
            ..Default::default()
        };
        assert_eq!(options.date(date), "15/06/2023");
    }
}
