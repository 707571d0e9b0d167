use chrono::{DateTime, Utc};
use explorer_core::models::{
    Geometry, StoredOverview, SummaryKey, SummaryState, TimePeriodOverview, TimeRange,
    TimelinePeriod,
};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tabled::Tabled;

/// Output for generate and show commands
#[derive(Debug, Serialize)]
pub struct OverviewOutput {
    pub key: String,
    pub state: SummaryState,
    pub generated_at: Option<DateTime<Utc>>,
    pub dataset_count: u64,
    pub footprint_count: u64,
    pub timeline_period: TimelinePeriod,
    pub time_range: Option<TimeRange>,
    pub newest_dataset_creation_time: Option<DateTime<Utc>>,
    pub region_dataset_counts: BTreeMap<String, u64>,
    pub crses: BTreeSet<String>,
    pub timeline: Vec<TimelineRow>,
    pub footprint_geometry: Option<Geometry>,
}

impl OverviewOutput {
    pub fn new(key: &SummaryKey, stored: &StoredOverview, full_timeline: bool) -> Self {
        let overview: &TimePeriodOverview = &stored.overview;
        Self {
            key: key.to_string(),
            state: stored.state(),
            generated_at: Some(stored.generated_at),
            dataset_count: overview.dataset_count,
            footprint_count: overview.footprint_count,
            timeline_period: overview.timeline_period,
            time_range: overview.time_range,
            newest_dataset_creation_time: overview.newest_dataset_creation_time,
            region_dataset_counts: overview.region_dataset_counts.clone(),
            crses: overview.crses.clone(),
            timeline: timeline_rows(overview, full_timeline),
            footprint_geometry: overview.footprint_geometry.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct TimelineRow {
    #[tabled(rename = "Period")]
    pub bucket: String,
    #[tabled(rename = "Datasets")]
    pub count: u64,
}

/// Timeline buckets labelled at the overview's granularity
pub fn timeline_rows(overview: &TimePeriodOverview, full: bool) -> Vec<TimelineRow> {
    let format = match overview.timeline_period {
        TimelinePeriod::Day => "%Y-%m-%d",
        TimelinePeriod::Month => "%Y-%m",
        TimelinePeriod::Year => "%Y",
    };
    overview
        .timeline
        .iter()
        .filter(|(_, count)| full || **count > 0)
        .map(|(bucket, count)| TimelineRow { bucket: bucket.format(format).to_string(), count: *count })
        .collect()
}

/// One row of the list command
#[derive(Debug, Serialize, Tabled)]
pub struct GeneratedRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Datasets")]
    pub dataset_count: u64,
    #[tabled(rename = "Generated At")]
    pub generated_at: String,
}

/// Output for refresh command
#[derive(Debug, Serialize)]
pub struct RefreshOutput {
    pub product: String,
    pub dataset_count: u64,
    pub overviews: usize,
}

/// Output for stale and drop commands
#[derive(Debug, Serialize)]
pub struct ProductChangeOutput {
    pub product: String,
    pub affected: usize,
}

#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct MigrationRow {
    #[tabled(rename = "Version")]
    pub version: i64,
    #[tabled(rename = "Description")]
    pub description: String,
    #[tabled(rename = "Applied")]
    pub applied: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timeline_rows_skip_empty_buckets() {
        let mut overview =
            TimePeriodOverview::empty(TimelinePeriod::Day, TimeRange::month(2017, 1));
        overview.dataset_count = 2;
        overview.timeline.insert(Utc.with_ymd_and_hms(2017, 1, 3, 0, 0, 0).unwrap(), 2);

        let rows = timeline_rows(&overview, false);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].bucket, "2017-01-03");
        assert_eq!(rows[0].count, 2);

        assert_eq!(timeline_rows(&overview, true).len(), 31);
    }

    #[test]
    fn test_month_labels() {
        let overview = TimePeriodOverview::empty(TimelinePeriod::Month, TimeRange::year(2017));
        let rows = timeline_rows(&overview, true);
        assert_eq!(rows.first().map(|r| r.bucket.as_str()), Some("2017-01"));
        assert_eq!(rows.len(), 12);
    }
}
