//! Cost aggregation
//!
//! Turns grouped, normalized activities and labor entries into per-day
//! buckets and project totals. Spend inclusion is asked of the classifier
//! once per activity; every higher total is a sum of those answers, so
//! `total_material_cost` is exactly the sum of the day totals. Every sum is
//! checked; a total that leaves the `Money` range is an error, never a panic.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::classifier::{classify, counts_toward_spend, SpendClass};
use super::grouping::DateGroups;
use crate::error::{SiteCostError, SiteCostResult};
use crate::models::{ActivityId, ActivityKind, LaborEntry, MaterialActivity, Money};

/// Activity counts per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    pub imported: usize,
    pub used: usize,
    pub transferred: usize,
}

impl KindCounts {
    /// Record one activity of the given kind
    pub fn add(&mut self, kind: ActivityKind) {
        match kind {
            ActivityKind::Imported => self.imported += 1,
            ActivityKind::Used => self.used += 1,
            ActivityKind::Transferred => self.transferred += 1,
        }
    }

    pub fn get(&self, kind: ActivityKind) -> usize {
        match kind {
            ActivityKind::Imported => self.imported,
            ActivityKind::Used => self.used,
            ActivityKind::Transferred => self.transferred,
        }
    }

    pub fn total(&self) -> usize {
        self.imported + self.used + self.transferred
    }

    fn merge(&mut self, other: &KindCounts) {
        self.imported += other.imported;
        self.used += other.used;
        self.transferred += other.transferred;
    }
}

/// Derived cost figures of one activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityTotals {
    pub activity_id: ActivityId,
    pub spend_class: SpendClass,
    pub counts_toward_spend: bool,
    /// Sum of line totals regardless of kind, for display
    pub material_value: Money,
    /// `material_value` when the activity is new spend, otherwise zero
    pub spend_total: Money,
}

impl ActivityTotals {
    /// Compute the totals of one activity
    pub fn of(activity: &MaterialActivity) -> SiteCostResult<Self> {
        let material_value = Money::checked_sum(activity.materials.iter().map(|m| m.total_cost()))
            .ok_or_else(|| {
                SiteCostError::invalid_cost(activity.id.as_str(), "materials", "total out of range")
            })?;
        let counts = counts_toward_spend(activity.kind);
        Ok(Self {
            activity_id: activity.id.clone(),
            spend_class: classify(activity.kind),
            counts_toward_spend: counts,
            material_value,
            spend_total: if counts { material_value } else { Money::zero() },
        })
    }
}

/// Activities of one local calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    /// Input order is preserved
    pub activities: Vec<MaterialActivity>,
    /// Per-activity figures, same order as `activities`
    pub activity_totals: Vec<ActivityTotals>,
    pub counts_by_kind: KindCounts,
    /// Sum of `spend_total` over the day's activities
    pub day_material_total: Money,
}

impl DailyBucket {
    /// Build a bucket, deriving every figure from the activities
    pub fn new(date: NaiveDate, activities: Vec<MaterialActivity>) -> SiteCostResult<Self> {
        let activity_totals = activities
            .iter()
            .map(ActivityTotals::of)
            .collect::<SiteCostResult<Vec<_>>>()?;
        let mut counts_by_kind = KindCounts::default();
        for activity in &activities {
            counts_by_kind.add(activity.kind);
        }
        let day_material_total = Money::checked_sum(activity_totals.iter().map(|t| t.spend_total))
            .ok_or_else(|| {
                SiteCostError::AmountOutOfRange(format!("material total of {}", date))
            })?;

        Ok(Self {
            date,
            activities,
            activity_totals,
            counts_by_kind,
            day_material_total,
        })
    }

    /// Activities paired with their totals
    pub fn entries(&self) -> impl Iterator<Item = (&MaterialActivity, &ActivityTotals)> {
        self.activities.iter().zip(self.activity_totals.iter())
    }

    /// `YYYY-MM-DD` key of the bucket
    pub fn date_key(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Labor totals for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborCategoryTotal {
    pub category: String,
    pub head_count: u64,
    pub total_cost: Money,
}

/// Labor entries with their totals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborSection {
    pub entries: Vec<LaborEntry>,
    /// Categories in first-seen order
    pub by_category: Vec<LaborCategoryTotal>,
    pub head_count: u64,
    pub total: Money,
}

impl LaborSection {
    /// Build the section from validated entries
    pub fn new(entries: Vec<LaborEntry>) -> SiteCostResult<Self> {
        let mut by_category: Vec<LaborCategoryTotal> = Vec::new();
        for entry in &entries {
            match by_category.iter_mut().find(|c| c.category == entry.category) {
                Some(existing) => {
                    existing.head_count += u64::from(entry.count);
                    existing.total_cost = existing
                        .total_cost
                        .checked_add(entry.total_cost)
                        .ok_or_else(|| {
                            SiteCostError::AmountOutOfRange(format!(
                                "labor total of {}",
                                entry.category
                            ))
                        })?;
                }
                None => by_category.push(LaborCategoryTotal {
                    category: entry.category.clone(),
                    head_count: u64::from(entry.count),
                    total_cost: entry.total_cost,
                }),
            }
        }
        let head_count = entries.iter().map(|e| u64::from(e.count)).sum();
        let total = Money::checked_sum(entries.iter().map(|e| e.total_cost))
            .ok_or_else(|| SiteCostError::AmountOutOfRange("labor total".to_string()))?;

        Ok(Self {
            entries,
            by_category,
            head_count,
            total,
        })
    }
}

/// Overall figures of a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSummary {
    pub total_activities: usize,
    pub counts_by_kind: KindCounts,
    pub total_material_cost: Money,
    pub total_labor_cost: Money,
    /// Always `total_material_cost + total_labor_cost`
    pub total_project_cost: Money,
}

impl CostSummary {
    /// Summarize buckets and labor
    pub fn from_parts(buckets: &[DailyBucket], labor: &LaborSection) -> SiteCostResult<Self> {
        let mut counts_by_kind = KindCounts::default();
        for bucket in buckets {
            counts_by_kind.merge(&bucket.counts_by_kind);
        }
        let total_material_cost = Money::checked_sum(buckets.iter().map(|b| b.day_material_total))
            .ok_or_else(|| SiteCostError::AmountOutOfRange("total material cost".to_string()))?;
        let total_labor_cost = labor.total;
        let total_project_cost = total_material_cost
            .checked_add(total_labor_cost)
            .ok_or_else(|| SiteCostError::AmountOutOfRange("total project cost".to_string()))?;

        Ok(Self {
            total_activities: counts_by_kind.total(),
            counts_by_kind,
            total_material_cost,
            total_labor_cost,
            total_project_cost,
        })
    }

    /// Check the conservation invariants against the parts it came from
    pub fn is_balanced(&self, buckets: &[DailyBucket], labor: &LaborSection) -> bool {
        let day_sum = Money::checked_sum(buckets.iter().map(|b| b.day_material_total));
        day_sum == Some(self.total_material_cost)
            && self.total_labor_cost == labor.total
            && self.total_material_cost.checked_add(self.total_labor_cost)
                == Some(self.total_project_cost)
            && self.total_activities == self.counts_by_kind.total()
    }
}

/// Result of an aggregation run
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Newest day first
    pub buckets: Vec<DailyBucket>,
    pub labor: LaborSection,
    pub summary: CostSummary,
}

/// Aggregate grouped activities and labor entries
///
/// Deterministic and side-effect free: inputs are only read, so running it
/// twice on the same data gives equal results. Fails with
/// `AmountOutOfRange` or `InvalidCost` when a total overflows.
pub fn aggregate(groups: &DateGroups, labor: &[LaborEntry]) -> SiteCostResult<Aggregation> {
    let buckets = groups
        .iter_newest_first()
        .map(|(date, activities)| DailyBucket::new(date, activities.to_vec()))
        .collect::<SiteCostResult<Vec<_>>>()?;
    let labor = LaborSection::new(labor.to_vec())?;
    let summary = CostSummary::from_parts(&buckets, &labor)?;

    Ok(Aggregation {
        buckets,
        labor,
        summary,
    })
}
