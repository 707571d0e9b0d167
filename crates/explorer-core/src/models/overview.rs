//! The period overview record and its persisted envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use super::geometry::Geometry;
use super::period::{TimeRange, TimelinePeriod};
use super::summary::SummaryState;

/// Dataset counts, timeline and footprint for one product and time period
///
/// Immutable once generated: regeneration produces a new record that replaces
/// the old one under the same key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePeriodOverview {
    pub dataset_count: u64,

    /// Bucket start -> count, zero-filled across `time_range`
    pub timeline: BTreeMap<DateTime<Utc>, u64>,

    pub region_dataset_counts: BTreeMap<String, u64>,

    pub timeline_period: TimelinePeriod,

    pub time_range: Option<TimeRange>,

    /// Union of contributing footprints, in the target SRID
    pub footprint_geometry: Option<Geometry>,

    /// Datasets whose footprint is part of `footprint_geometry`
    pub footprint_count: u64,

    pub newest_dataset_creation_time: Option<DateTime<Utc>>,

    /// CRS identifiers of the datasets in `footprint_count`
    pub crses: BTreeSet<String>,
}

impl TimePeriodOverview {
    /// A zero-count overview with every bucket of `time_range` present
    pub fn empty(timeline_period: TimelinePeriod, time_range: Option<TimeRange>) -> Self {
        Self {
            dataset_count: 0,
            timeline: zero_timeline(timeline_period, time_range.as_ref()),
            region_dataset_counts: BTreeMap::new(),
            timeline_period,
            time_range,
            footprint_geometry: None,
            footprint_count: 0,
            newest_dataset_creation_time: None,
            crses: BTreeSet::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dataset_count == 0
    }

    /// Sum of all timeline buckets
    pub fn timeline_total(&self) -> u64 {
        self.timeline.values().sum()
    }

    /// Datasets that were counted but whose footprint was left out of the union
    pub fn footprint_gap(&self) -> u64 {
        self.dataset_count.saturating_sub(self.footprint_count)
    }

    /// Check the record's internal invariants
    pub fn is_consistent(&self) -> bool {
        if self.timeline_total() != self.dataset_count {
            return false;
        }
        if self.footprint_count > self.dataset_count {
            return false;
        }
        if self.dataset_count == 0 && self.footprint_geometry.is_some() {
            return false;
        }
        if self.footprint_count == 0 && !self.crses.is_empty() {
            return false;
        }
        match &self.time_range {
            Some(range) => self
                .timeline_period
                .buckets(range)
                .into_iter()
                .eq(self.timeline.keys().copied()),
            None => self.timeline.is_empty(),
        }
    }
}

/// Every bucket of `range` with a zero count
pub fn zero_timeline(
    period: TimelinePeriod,
    range: Option<&TimeRange>,
) -> BTreeMap<DateTime<Utc>, u64> {
    range
        .map(|r| period.buckets(r).into_iter().map(|b| (b, 0)).collect())
        .unwrap_or_default()
}

/// Re-bucket a timeline into a coarser (or equal) period
pub fn rebucket_timeline(
    timeline: &BTreeMap<DateTime<Utc>, u64>,
    period: TimelinePeriod,
) -> BTreeMap<DateTime<Utc>, u64> {
    let mut out = BTreeMap::new();
    for (bucket, count) in timeline {
        *out.entry(period.bucket_start(*bucket)).or_insert(0) += count;
    }
    out
}

/// A persisted overview plus generation metadata
///
/// The metadata is kept outside [`TimePeriodOverview`] so that regenerating
/// over unchanged data still yields an equal overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOverview {
    pub overview: Arc<TimePeriodOverview>,
    pub generated_at: DateTime<Utc>,
    pub stale: bool,
}

impl StoredOverview {
    pub fn new(overview: TimePeriodOverview, generated_at: DateTime<Utc>) -> Self {
        Self { overview: Arc::new(overview), generated_at, stale: false }
    }

    pub fn state(&self) -> SummaryState {
        if self.stale {
            SummaryState::Stale
        } else {
            SummaryState::Current
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_overview_is_zero_filled() {
        let overview =
            TimePeriodOverview::empty(TimelinePeriod::Day, TimeRange::month(2017, 1));
        assert_eq!(overview.dataset_count, 0);
        assert_eq!(overview.timeline.len(), 31);
        assert!(overview.timeline.values().all(|c| *c == 0));
        assert!(overview.footprint_geometry.is_none());
        assert!(overview.is_consistent());
    }

    #[test]
    fn test_structural_equality() {
        let a = TimePeriodOverview::empty(TimelinePeriod::Day, TimeRange::month(2017, 1));
        let mut b = a.clone();
        assert_eq!(a, b);
        b.crses.insert("EPSG:4326".to_string());
        assert_ne!(a, b);
    }

    #[test]
    fn test_rebucket_to_month() {
        let mut days = BTreeMap::new();
        days.insert(ts(1, 1), 1);
        days.insert(ts(1, 3), 2);
        days.insert(ts(2, 7), 4);

        let months = rebucket_timeline(&days, TimelinePeriod::Month);
        assert_eq!(months.len(), 2);
        assert_eq!(months[&ts(1, 1)], 3);
        assert_eq!(months[&ts(2, 1)], 4);
    }

    #[test]
    fn test_inconsistent_when_timeline_does_not_sum() {
        let mut overview =
            TimePeriodOverview::empty(TimelinePeriod::Day, TimeRange::month(2017, 1));
        overview.dataset_count = 2;
        assert!(!overview.is_consistent());
        overview.timeline.insert(ts(1, 5), 2);
        assert!(overview.is_consistent());
    }

    #[test]
    fn test_overview_json_roundtrip_keeps_timeline_keys() {
        let mut overview =
            TimePeriodOverview::empty(TimelinePeriod::Day, TimeRange::month(2017, 1));
        overview.dataset_count = 1;
        overview.timeline.insert(ts(1, 2), 1);
        overview.region_dataset_counts.insert("090_084".to_string(), 1);

        let json = serde_json::to_string(&overview).unwrap();
        let parsed: TimePeriodOverview = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, overview);
    }
}
