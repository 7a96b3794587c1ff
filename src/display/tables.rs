//! Table rows for material lines and labor entries

use tabled::settings::Style;
use tabled::{Table, Tabled};

use super::report::truncate;
use super::DisplayOptions;
use crate::models::MaterialLineItem;
use crate::services::LaborSection;

const MAX_SPECS_WIDTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct MaterialRow {
    #[tabled(rename = "Material")]
    pub material: String,
    #[tabled(rename = "Qty")]
    pub quantity: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Per Unit")]
    pub per_unit: String,
    #[tabled(rename = "Total")]
    pub total: String,
    #[tabled(rename = "Specs")]
    pub specs: String,
}

impl MaterialRow {
    pub fn from_item(item: &MaterialLineItem, options: &DisplayOptions) -> Self {
        Self {
            material: item.name.clone(),
            quantity: item.quantity.to_string(),
            unit: item.unit.clone(),
            per_unit: options.money(item.per_unit_cost()),
            total: options.money(item.total_cost()),
            specs: truncate(&item.specs_summary(), MAX_SPECS_WIDTH),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct LaborRow {
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(rename = "Type")]
    pub labor_type: String,
    #[tabled(rename = "Count")]
    pub count: String,
    #[tabled(rename = "Per Head")]
    pub per_head: String,
    #[tabled(rename = "Total")]
    pub total: String,
}

/// Material lines of one activity
pub fn material_table(items: &[MaterialLineItem], options: &DisplayOptions) -> String {
    let rows = items.iter().map(|item| MaterialRow::from_item(item, options));
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Labor entries followed by a grand total row
pub fn labor_table(section: &LaborSection, options: &DisplayOptions) -> String {
    let mut rows: Vec<LaborRow> = section
        .entries
        .iter()
        .map(|entry| LaborRow {
            category: entry.category.clone(),
            labor_type: entry.labor_type.clone(),
            count: entry.count.to_string(),
            per_head: options.money(entry.per_labor_cost),
            total: options.money(entry.total_cost),
        })
        .collect();

    rows.push(LaborRow {
        category: "TOTAL".to_string(),
        labor_type: String::new(),
        count: section.head_count.to_string(),
        per_head: String::new(),
        total: options.money(section.total),
    });

    Table::new(rows).with(Style::rounded()).to_string()
}
