//! Calendar-day grouping
//!
//! Buckets activities by the calendar date of their timestamp in the
//! report's local offset. Days come out newest first; activities inside a
//! day keep their input order.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, TimeZone, Utc};
use std::collections::BTreeMap;

use crate::error::{SiteCostError, SiteCostResult};
use crate::models::MaterialActivity;

/// Naive forms accepted in addition to RFC 3339; read in the local offset
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Groups activities by local calendar day
#[derive(Debug, Clone, Copy)]
pub struct DateGrouper {
    offset: FixedOffset,
}

impl Default for DateGrouper {
    fn default() -> Self {
        Self::utc()
    }
}

impl DateGrouper {
    /// Create a grouper truncating to days in the given offset
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Grouper truncating in UTC
    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Parse an upstream timestamp for activity `record`
    pub fn parse_timestamp(&self, record: &str, value: &str) -> SiteCostResult<DateTime<FixedOffset>> {
        let trimmed = value.trim();

        if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(ts);
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
            .and_then(|naive| self.offset.from_local_datetime(&naive).single())
            .ok_or_else(|| SiteCostError::unparseable_timestamp(record, value))
    }

    /// Calendar date of an instant in the local offset
    pub fn local_date(&self, ts: &DateTime<FixedOffset>) -> NaiveDate {
        ts.with_timezone(&self.offset).date_naive()
    }

    /// Bucket activities by local date
    pub fn group(&self, activities: &[MaterialActivity]) -> DateGroups {
        let mut days: BTreeMap<NaiveDate, Vec<MaterialActivity>> = BTreeMap::new();
        for activity in activities {
            days.entry(self.local_date(&activity.timestamp))
                .or_default()
                .push(activity.clone());
        }
        DateGroups { days }
    }
}

/// Activities keyed by local calendar date
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DateGroups {
    days: BTreeMap<NaiveDate, Vec<MaterialActivity>>,
}

impl DateGroups {
    /// Dates, most recent first
    pub fn dates_newest_first(&self) -> Vec<NaiveDate> {
        self.days.keys().rev().copied().collect()
    }

    /// `YYYY-MM-DD` keys, most recent first
    pub fn date_keys(&self) -> Vec<String> {
        self.days
            .keys()
            .rev()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .collect()
    }

    /// Activities of one day in input order
    pub fn get(&self, date: NaiveDate) -> Option<&[MaterialActivity]> {
        self.days.get(&date).map(Vec::as_slice)
    }

    /// Iterate days, most recent first
    pub fn iter_newest_first(&self) -> impl Iterator<Item = (NaiveDate, &[MaterialActivity])> {
        self.days.iter().rev().map(|(d, a)| (*d, a.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::activity_at;

    #[test]
    fn test_parse_rfc3339() {
        let grouper = DateGrouper::utc();
        let ts = grouper.parse_timestamp("a", "2023-06-15T09:00:00.000Z").unwrap();
        assert_eq!(ts.to_rfc3339(), "2023-06-15T09:00:00+00:00");
    }

    #[test]
    fn test_parse_naive_uses_local_offset() {
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let grouper = DateGrouper::new(ist);
        let ts = grouper.parse_timestamp("a", "2023-06-15 23:30:00").unwrap();
        assert_eq!(ts.offset(), &ist);
        assert_eq!(grouper.local_date(&ts), NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
    }

    #[test]
    fn test_unparseable_timestamp_is_rejected() {
        let err = DateGrouper::utc().parse_timestamp("act-5", "yesterday").unwrap_err();
        assert_eq!(err, SiteCostError::unparseable_timestamp("act-5", "yesterday"));
        assert!(DateGrouper::utc().parse_timestamp("act-5", "").is_err());
        assert!(DateGrouper::utc().parse_timestamp("act-5", "2023-13-40T00:00:00Z").is_err());
    }

    #[test]
    fn test_same_day_and_next_day() {
        let activities = vec![
            activity_at("a", "2023-06-15T09:00:00Z"),
            activity_at("b", "2023-06-16T00:01:00Z"),
            activity_at("c", "2023-06-15T23:00:00Z"),
        ];
        let groups = DateGrouper::utc().group(&activities);

        assert_eq!(groups.date_keys(), vec!["2023-06-16", "2023-06-15"]);
        let june15 = groups.get(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()).unwrap();
        let ids: Vec<&str> = june15.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_order_within_day_is_input_order_not_time() {
        let activities = vec![
            activity_at("late", "2023-06-15T20:00:00Z"),
            activity_at("early", "2023-06-15T06:00:00Z"),
        ];
        let groups = DateGrouper::utc().group(&activities);
        let (_, day) = groups.iter_newest_first().next().unwrap();
        assert_eq!(day[0].id.as_str(), "late");
        assert_eq!(day[1].id.as_str(), "early");
    }

    #[test]
    fn test_offset_moves_day_boundary() {
        let activities = vec![activity_at("a", "2023-06-15T23:00:00Z")];
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        let groups = DateGrouper::new(ist).group(&activities);
        assert_eq!(groups.date_keys(), vec!["2023-06-16"]);
    }

    #[test]
    fn test_empty_input() {
        let groups = DateGrouper::utc().group(&[]);
        assert!(groups.is_empty());
        assert_eq!(groups.len(), 0);
    }
}
