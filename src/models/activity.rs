//! Material activity model
//!
//! A material activity records materials entering a project's inventory
//! (`imported`), leaving it into the works (`used`), or moving to another
//! project (`transferred`). Raw records mirror the backend's JSON; the
//! canonical `MaterialActivity` is built once by the ingest stage.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ids::{ActivityId, ProjectId, UserId};
use super::material::{MaterialLineItem, RawMaterialLine};

/// What happened to the materials in an activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Materials newly brought into inventory
    Imported,
    /// Materials consumed from existing inventory
    Used,
    /// Materials moved between project inventories
    Transferred,
}

impl ActivityKind {
    /// All kinds, in summary display order
    pub const ALL: [ActivityKind; 3] = [Self::Imported, Self::Used, Self::Transferred];

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Imported => "imported",
            Self::Used => "used",
            Self::Transferred => "transferred",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imported => write!(f, "Imported"),
            Self::Used => write!(f, "Used"),
            Self::Transferred => write!(f, "Transferred"),
        }
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imported" | "import" => Ok(Self::Imported),
            "used" | "use" => Ok(Self::Used),
            "transferred" | "transfer" => Ok(Self::Transferred),
            other => Err(other.to_string()),
        }
    }
}

/// The person who recorded an activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityUser {
    pub id: UserId,
    pub full_name: String,
}

/// Source and destination of a transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDetails {
    pub from_project: String,
    pub to_project: String,
}

/// A validated material activity with normalized line items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialActivity {
    pub id: ActivityId,
    pub user: ActivityUser,
    pub project_id: ProjectId,
    pub project_name: Option<String>,
    pub section_name: Option<String>,
    pub mini_section_name: Option<String>,
    /// Never empty
    pub materials: Vec<MaterialLineItem>,
    pub kind: ActivityKind,
    pub message: Option<String>,
    pub timestamp: DateTime<FixedOffset>,
    /// Present iff `kind` is `Transferred`
    pub transfer: Option<TransferDetails>,
}

impl MaterialActivity {
    /// Human-readable location, e.g. "Tower A / Floor 3"
    pub fn location(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.section_name, &self.mini_section_name]
            .into_iter()
            .filter_map(|p| p.as_deref())
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" / "))
        }
    }
}

// ---------------------------------------------------------------------------
// Wire records
// ---------------------------------------------------------------------------

/// User reference as sent by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default, alias = "name")]
    pub full_name: Option<String>,
}

/// Project reference inside transfer details: a bare name/id or an object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawProjectRef {
    Label(String),
    Object {
        #[serde(default, alias = "_id")]
        id: Option<String>,
        #[serde(default)]
        name: Option<String>,
    },
}

impl RawProjectRef {
    /// Display label, preferring a name over an id
    pub fn label(&self) -> Option<String> {
        let label = match self {
            Self::Label(s) => Some(s.as_str()),
            Self::Object { id, name } => name.as_deref().or(id.as_deref()),
        };
        label
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Transfer details as sent by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransferDetails {
    #[serde(default)]
    pub from_project: Option<RawProjectRef>,
    #[serde(default)]
    pub to_project: Option<RawProjectRef>,
}

/// A material activity exactly as the backend query returns it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMaterialActivity {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub user: Option<RawUser>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub section_name: Option<String>,
    #[serde(default)]
    pub mini_section_name: Option<String>,
    #[serde(default)]
    pub materials: Vec<RawMaterialLine>,
    #[serde(default, alias = "activity")]
    pub activity_kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, alias = "date", alias = "createdAt")]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub transfer_details: Option<RawTransferDetails>,
}
