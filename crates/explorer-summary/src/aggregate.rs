//! Building period overviews from datasets or from finer overviews

use chrono::{DateTime, Datelike, Utc};
use std::collections::BTreeMap;

use explorer_core::error::Result;
use explorer_core::models::overview::{rebucket_timeline, zero_timeline};
use explorer_core::models::{
    Crs, DatasetId, DatasetSummary, Footprint, TimePeriodOverview, TimeRange, TimelinePeriod,
    ValidityMode,
};
use explorer_geo::footprint::FootprintUnion;

/// Accumulates one overview
///
/// With a fixed `time_range` (dated keys) the timeline is zero-filled over that
/// window. Without one (whole-product keys) the range is widened to whole
/// calendar years around everything added, so that building from datasets and
/// building from year overviews give the same range.
pub struct OverviewBuilder {
    period: TimelinePeriod,
    time_range: Option<TimeRange>,
    observed: Option<TimeRange>,
    counts: BTreeMap<DateTime<Utc>, u64>,
    regions: BTreeMap<String, u64>,
    dataset_count: u64,
    newest_creation: Option<DateTime<Utc>>,
    footprints: Vec<(DatasetId, Footprint)>,
    union: FootprintUnion,
}

impl OverviewBuilder {
    pub fn new(
        period: TimelinePeriod,
        time_range: Option<TimeRange>,
        target: Crs,
        mode: ValidityMode,
    ) -> Self {
        Self {
            period,
            time_range,
            observed: None,
            counts: BTreeMap::new(),
            regions: BTreeMap::new(),
            dataset_count: 0,
            newest_creation: None,
            footprints: Vec::new(),
            union: FootprintUnion::new(target, mode),
        }
    }

    /// Count one dataset from the index
    pub fn add_dataset(&mut self, dataset: &DatasetSummary) {
        self.dataset_count += 1;
        *self.counts.entry(self.period.bucket_start(dataset.time)).or_insert(0) += 1;

        if let Some(region) = &dataset.region_code {
            *self.regions.entry(region.clone()).or_insert(0) += 1;
        }

        self.newest_creation = self.newest_creation.max(dataset.creation_time);
        self.observe(TimeRange::year(dataset.time.year()));

        match &dataset.footprint {
            Some(footprint) => self.footprints.push((dataset.id, footprint.clone())),
            None => tracing::debug!(dataset_id = %dataset.id, "Dataset has no footprint"),
        }
    }

    /// Fold in a finer-grained overview
    pub fn add_overview(&mut self, overview: &TimePeriodOverview) {
        self.dataset_count += overview.dataset_count;
        for (bucket, count) in rebucket_timeline(&overview.timeline, self.period) {
            *self.counts.entry(bucket).or_insert(0) += count;
        }
        for (region, count) in &overview.region_dataset_counts {
            *self.regions.entry(region.clone()).or_insert(0) += count;
        }
        self.newest_creation = self.newest_creation.max(overview.newest_dataset_creation_time);
        self.observe(overview.time_range);

        if let Some(geometry) = &overview.footprint_geometry {
            self.union.add_union(geometry, overview.footprint_count, &overview.crses);
        }
    }

    /// Finish the overview
    ///
    /// Dataset footprints are unioned here, in identifier order, so the result
    /// does not depend on the order the index returned them in. Fails only in
    /// strict validity mode, on the first unusable footprint.
    pub fn finish(mut self) -> Result<TimePeriodOverview> {
        self.footprints.sort_by_key(|(id, _)| *id);
        for (id, footprint) in &self.footprints {
            self.union.add(&id.to_string(), footprint)?;
        }
        let footprint = self.union.finish();
        if footprint.skipped > 0 {
            tracing::warn!(
                skipped = footprint.skipped,
                dataset_count = self.dataset_count,
                "Some dataset footprints were left out of the union"
            );
        }

        let time_range = match self.time_range {
            Some(range) => Some(range),
            None if self.dataset_count > 0 => self.observed,
            None => None,
        };

        let mut timeline = zero_timeline(self.period, time_range.as_ref());
        for (bucket, count) in self.counts {
            *timeline.entry(bucket).or_insert(0) += count;
        }

        Ok(TimePeriodOverview {
            dataset_count: self.dataset_count,
            timeline,
            region_dataset_counts: self.regions,
            timeline_period: self.period,
            time_range,
            footprint_geometry: footprint.geometry,
            footprint_count: footprint.count,
            newest_dataset_creation_time: self.newest_creation,
            crses: footprint.crses,
        })
    }

    fn observe(&mut self, range: Option<TimeRange>) {
        if let Some(range) = range {
            self.observed = Some(match self.observed {
                Some(current) => current.span(&range),
                None => range,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use explorer_core::models::Geometry;
    use explorer_core::ExplorerError;
    use uuid::Uuid;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 10, 30, 0).unwrap()
    }

    fn dataset(n: u128, time: DateTime<Utc>, geometry: Option<Geometry>) -> DatasetSummary {
        DatasetSummary {
            id: DatasetId(Uuid::from_u128(n)),
            product: "ls7_level1_scene".to_string(),
            time,
            creation_time: Some(time),
            region_code: Some("090_084".to_string()),
            footprint: geometry.map(|geometry| Footprint { geometry, crs: Crs::wgs84() }),
            archived_time: None,
        }
    }

    fn builder(range: Option<TimeRange>, period: TimelinePeriod) -> OverviewBuilder {
        OverviewBuilder::new(period, range, Crs::new(4326, "EPSG:4326"), ValidityMode::Lenient)
    }

    #[test]
    fn test_empty_window() {
        let overview = builder(TimeRange::month(2017, 2), TimelinePeriod::Day).finish().unwrap();
        assert_eq!(overview.dataset_count, 0);
        assert_eq!(overview.timeline.len(), 28);
        assert!(overview.footprint_geometry.is_none());
        assert!(overview.is_consistent());
    }

    #[test]
    fn test_empty_product_has_no_range() {
        let overview = builder(None, TimelinePeriod::Month).finish().unwrap();
        assert!(overview.time_range.is_none());
        assert!(overview.timeline.is_empty());
        assert!(overview.is_consistent());
    }

    #[test]
    fn test_product_range_is_year_aligned() {
        let mut b = builder(None, TimelinePeriod::Month);
        b.add_dataset(&dataset(1, ts(2016, 11, 3), None));
        b.add_dataset(&dataset(2, ts(2017, 2, 9), None));

        let overview = b.finish().unwrap();
        let range = overview.time_range.unwrap();
        assert_eq!(range.begin, Utc.with_ymd_and_hms(2016, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2018, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(overview.timeline.len(), 24);
        assert!(overview.is_consistent());
    }

    #[test]
    fn test_footprint_order_does_not_matter() {
        let a = dataset(1, ts(2017, 1, 1), Some(Geometry::rect(0.0, 0.0, 2.0, 2.0)));
        let b = dataset(2, ts(2017, 1, 2), Some(Geometry::rect(1.0, 1.0, 3.0, 3.0)));

        let mut forward = builder(TimeRange::year(2017), TimelinePeriod::Day);
        forward.add_dataset(&a);
        forward.add_dataset(&b);

        let mut backward = builder(TimeRange::year(2017), TimelinePeriod::Day);
        backward.add_dataset(&b);
        backward.add_dataset(&a);

        assert_eq!(forward.finish().unwrap(), backward.finish().unwrap());
    }

    #[test]
    fn test_missing_and_invalid_footprints_are_counted() {
        let mut b = builder(TimeRange::year(2017), TimelinePeriod::Day);
        b.add_dataset(&dataset(1, ts(2017, 1, 1), Some(Geometry::rect(0.0, 0.0, 1.0, 1.0))));
        b.add_dataset(&dataset(2, ts(2017, 1, 1), Some(Geometry::point(0.5, 0.5))));
        b.add_dataset(&dataset(3, ts(2017, 1, 1), None));

        let overview = b.finish().unwrap();
        assert_eq!(overview.dataset_count, 3);
        assert_eq!(overview.footprint_count, 1);
        assert_eq!(overview.footprint_gap(), 2);
        assert_eq!(overview.region_dataset_counts["090_084"], 3);
    }

    #[test]
    fn test_strict_mode_fails_on_invalid_footprint() {
        let mut b = OverviewBuilder::new(
            TimelinePeriod::Day,
            TimeRange::year(2017),
            Crs::wgs84(),
            ValidityMode::Strict,
        );
        b.add_dataset(&dataset(1, ts(2017, 1, 1), Some(Geometry::point(0.5, 0.5))));
        assert!(matches!(b.finish(), Err(ExplorerError::InconsistentGeometry { .. })));
    }

    #[test]
    fn test_combining_months_matches_direct_build() {
        let datasets = vec![
            dataset(1, ts(2017, 1, 1), Some(Geometry::rect(0.0, 0.0, 1.0, 1.0))),
            dataset(2, ts(2017, 1, 20), Some(Geometry::rect(2.0, 0.0, 3.0, 1.0))),
            dataset(3, ts(2017, 3, 4), None),
        ];

        let mut direct = builder(TimeRange::year(2017), TimelinePeriod::Day);
        let mut months = Vec::new();
        for month in 1..=12 {
            let mut m = builder(TimeRange::month(2017, month), TimelinePeriod::Day);
            for d in datasets.iter().filter(|d| d.time.month() == month) {
                m.add_dataset(d);
            }
            months.push(m.finish().unwrap());
        }
        for d in &datasets {
            direct.add_dataset(d);
        }
        let direct = direct.finish().unwrap();

        let mut combined = builder(TimeRange::year(2017), TimelinePeriod::Day);
        for m in &months {
            combined.add_overview(m);
        }
        let combined = combined.finish().unwrap();

        assert!(combined.is_consistent());
        assert_eq!(combined.dataset_count, direct.dataset_count);
        assert_eq!(combined.timeline, direct.timeline);
        assert_eq!(combined.region_dataset_counts, direct.region_dataset_counts);
        assert_eq!(combined.footprint_count, direct.footprint_count);
        assert_eq!(combined.crses, direct.crses);
        assert_eq!(combined.newest_dataset_creation_time, direct.newest_dataset_creation_time);
        assert_eq!(combined.time_range, direct.time_range);
    }

    proptest::proptest! {
        #[test]
        fn timeline_always_sums_to_dataset_count(
            offsets in proptest::collection::vec(0i64..365 * 86_400, 0..40)
        ) {
            let start = Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap();
            let mut b = builder(TimeRange::year(2017), TimelinePeriod::Day);
            for (i, secs) in offsets.iter().enumerate() {
                b.add_dataset(&dataset(i as u128, start + chrono::Duration::seconds(*secs), None));
            }

            let overview = b.finish().unwrap();
            proptest::prop_assert_eq!(overview.dataset_count, offsets.len() as u64);
            proptest::prop_assert!(overview.is_consistent());
        }
    }
}

