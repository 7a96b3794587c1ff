//! User settings for sitecost
//!
//! Display preferences, the local UTC offset used for day grouping, the
//! default validation policy and cost tolerance, and the company block
//! printed on every report.

use chrono::{FixedOffset, Local, Offset};
use serde::{Deserialize, Serialize};

use super::paths::SiteCostPaths;
use crate::display::{is_valid_date_format, DisplayOptions};
use crate::error::SiteCostError;
use crate::reports::CompanyInfo;
use crate::services::{CostTolerance, ValidationPolicy};

/// Largest offset chrono accepts, in minutes
const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

/// User settings for sitecost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol for terminal output
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format for day headings (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// Minutes east of UTC for calendar days; host offset when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub utc_offset_minutes: Option<i32>,

    #[serde(default)]
    pub validation_policy: ValidationPolicy,

    #[serde(default)]
    pub cost_tolerance: CostTolerance,

    /// Company block printed on reports
    #[serde(default)]
    pub company: CompanyInfo,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            utc_offset_minutes: None,
            validation_policy: ValidationPolicy::default(),
            cost_tolerance: CostTolerance::default(),
            company: CompanyInfo::default(),
        }
    }
}

impl Settings {
    /// Load settings from disk, or defaults if the file doesn't exist
    pub fn load_or_create(paths: &SiteCostPaths) -> Result<Self, SiteCostError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                SiteCostError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                SiteCostError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            settings.validate()?;
            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &SiteCostPaths) -> Result<(), SiteCostError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SiteCostError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents)
            .map_err(|e| SiteCostError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }

    /// Reject values that would fail later at report time
    pub fn validate(&self) -> Result<(), SiteCostError> {
        if let Some(minutes) = self.utc_offset_minutes {
            if minutes.abs() > MAX_OFFSET_MINUTES {
                return Err(SiteCostError::Config(format!(
                    "utc_offset_minutes {} is out of range",
                    minutes
                )));
            }
        }
        if !is_valid_date_format(&self.date_format) {
            return Err(SiteCostError::Config(format!(
                "date_format '{}' cannot format a calendar date",
                self.date_format
            )));
        }
        let tolerance = &self.cost_tolerance;
        if tolerance.absolute.is_sign_negative() || tolerance.per_unit_rounding.is_sign_negative() {
            return Err(SiteCostError::Config(
                "cost_tolerance values must not be negative".into(),
            ));
        }
        Ok(())
    }

    /// Offset used for calendar-day truncation
    pub fn utc_offset(&self) -> Result<FixedOffset, SiteCostError> {
        match self.utc_offset_minutes {
            Some(minutes) => FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
                SiteCostError::Config(format!("utc_offset_minutes {} is out of range", minutes))
            }),
            None => Ok(Local::now().offset().fix()),
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            currency_symbol: self.currency_symbol.clone(),
            date_format: self.date_format.clone(),
            ..Default::default()
        }
    }
}
