//! Timeline granularity and time ranges

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExplorerError;

/// Granularity of timeline buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelinePeriod {
    Day,
    Month,
    Year,
}

impl TimelinePeriod {
    /// Start of the bucket containing `t`
    pub fn bucket_start(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let date = match self {
            TimelinePeriod::Day => t.date_naive(),
            TimelinePeriod::Month => first_of_month(t.year(), t.month()),
            TimelinePeriod::Year => first_of_month(t.year(), 1),
        };
        midnight(date)
    }

    /// Start of the bucket following the one that starts at `start`
    pub fn next_bucket(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        let start = self.bucket_start(start);
        let date = start.date_naive();
        let next = match self {
            TimelinePeriod::Day => date.succ_opt().unwrap_or(NaiveDate::MAX),
            TimelinePeriod::Month if date.month() == 12 => first_of_month(date.year() + 1, 1),
            TimelinePeriod::Month => first_of_month(date.year(), date.month() + 1),
            TimelinePeriod::Year => first_of_month(date.year() + 1, 1),
        };
        midnight(next)
    }

    /// Every bucket start inside `range`, in order
    pub fn buckets(&self, range: &TimeRange) -> Vec<DateTime<Utc>> {
        let mut buckets = Vec::new();
        let mut current = self.bucket_start(range.begin);
        while current < range.end {
            buckets.push(current);
            current = self.next_bucket(current);
        }
        buckets
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimelinePeriod::Day => "day",
            TimelinePeriod::Month => "month",
            TimelinePeriod::Year => "year",
        }
    }
}

impl fmt::Display for TimelinePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimelinePeriod {
    type Err = ExplorerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "daily" => Ok(TimelinePeriod::Day),
            "month" | "monthly" => Ok(TimelinePeriod::Month),
            "year" | "yearly" => Ok(TimelinePeriod::Year),
            _ => Err(ExplorerError::ConfigInvalid {
                key: "timeline_period".to_string(),
                reason: format!("Invalid timeline period: {}. Use day, month, or year", s),
            }),
        }
    }
}

/// Time interval `[begin, end)`
///
/// Generated overviews always use bucket-aligned bounds, so `end` is the start
/// of the first bucket after the covered period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub begin: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.begin <= t && t < self.end
    }

    /// Smallest range covering both
    pub fn span(&self, other: &TimeRange) -> TimeRange {
        TimeRange { begin: self.begin.min(other.begin), end: self.end.max(other.end) }
    }

    /// The whole calendar year
    pub fn year(year: i32) -> Option<TimeRange> {
        let begin = utc_date(year, 1, 1)?;
        let end = utc_date(year + 1, 1, 1)?;
        Some(TimeRange { begin, end })
    }

    /// The whole calendar month
    pub fn month(year: i32, month: u32) -> Option<TimeRange> {
        let begin = utc_date(year, month, 1)?;
        Some(TimeRange { begin, end: TimelinePeriod::Month.next_bucket(begin) })
    }

    /// A single UTC day
    pub fn day(year: i32, month: u32, day: u32) -> Option<TimeRange> {
        let begin = utc_date(year, month, day)?;
        Some(TimeRange { begin, end: TimelinePeriod::Day.next_bucket(begin) })
    }
}

/// First and last dataset time of a product, both inclusive
///
/// Unlike [`TimeRange`] this is not a bucket window: `last` is the time of a
/// real dataset and is itself covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBounds {
    pub first: DateTime<Utc>,
    pub last: DateTime<Utc>,
}

impl TimeBounds {
    pub fn at(t: DateTime<Utc>) -> Self {
        Self { first: t, last: t }
    }

    /// Widen to cover `t`
    pub fn include(&mut self, t: DateTime<Utc>) {
        self.first = self.first.min(t);
        self.last = self.last.max(t);
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.first <= t && t <= self.last
    }

    /// Calendar years touched, first to last
    pub fn years(&self) -> std::ops::RangeInclusive<i32> {
        self.first.year()..=self.last.year()
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to {}",
            self.begin.format("%Y-%m-%d %H:%M:%S"),
            self.end.format("%Y-%m-%d %H:%M:%S")
        )
    }
}

fn utc_date(year: i32, month: u32, day: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ts(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_time_bounds_include_last_dataset() {
        let mut bounds = TimeBounds::at(ts(2017, 1, 5, 0));
        bounds.include(ts(2016, 11, 30, 23));
        bounds.include(ts(2017, 1, 2, 0));

        assert_eq!(bounds.first, ts(2016, 11, 30, 23));
        assert_eq!(bounds.last, ts(2017, 1, 5, 0));
        assert!(bounds.contains(ts(2017, 1, 5, 0)));
        assert!(!bounds.contains(ts(2017, 1, 5, 1)));
        assert_eq!(bounds.years(), 2016..=2017);
    }

    #[test]
    fn test_bucket_start() {
        let t = ts(2017, 3, 14, 15);
        assert_eq!(TimelinePeriod::Day.bucket_start(t), ts(2017, 3, 14, 0));
        assert_eq!(TimelinePeriod::Month.bucket_start(t), ts(2017, 3, 1, 0));
        assert_eq!(TimelinePeriod::Year.bucket_start(t), ts(2017, 1, 1, 0));
    }

    #[test]
    fn test_next_bucket_crosses_year() {
        assert_eq!(TimelinePeriod::Month.next_bucket(ts(2017, 12, 1, 0)), ts(2018, 1, 1, 0));
        assert_eq!(TimelinePeriod::Day.next_bucket(ts(2016, 2, 28, 0)), ts(2016, 2, 29, 0));
        assert_eq!(TimelinePeriod::Year.next_bucket(ts(2017, 6, 3, 0)), ts(2018, 1, 1, 0));
    }

    #[test]
    fn test_buckets_cover_range_contiguously() {
        let year = TimeRange::year(2017).unwrap();
        assert_eq!(TimelinePeriod::Day.buckets(&year).len(), 365);
        assert_eq!(TimelinePeriod::Month.buckets(&year).len(), 12);
        assert_eq!(TimelinePeriod::Year.buckets(&year), vec![ts(2017, 1, 1, 0)]);

        let leap_feb = TimeRange::month(2016, 2).unwrap();
        assert_eq!(TimelinePeriod::Day.buckets(&leap_feb).len(), 29);
    }

    #[test]
    fn test_invalid_dates_have_no_range() {
        assert!(TimeRange::month(2017, 13).is_none());
        assert!(TimeRange::day(2017, 2, 29).is_none());
        assert!(TimeRange::day(2016, 2, 29).is_some());
    }

    #[test]
    fn test_parse_timeline_period() {
        assert_eq!("day".parse::<TimelinePeriod>().unwrap(), TimelinePeriod::Day);
        assert_eq!("MONTH".parse::<TimelinePeriod>().unwrap(), TimelinePeriod::Month);
        assert!("week".parse::<TimelinePeriod>().is_err());
    }

    proptest! {
        #[test]
        fn bucket_contains_its_timestamp(secs in 0i64..4_102_444_800i64) {
            let t = DateTime::<Utc>::from_timestamp(secs, 0).unwrap();
            for period in [TimelinePeriod::Day, TimelinePeriod::Month, TimelinePeriod::Year] {
                let start = period.bucket_start(t);
                prop_assert!(start <= t);
                prop_assert!(t < period.next_bucket(start));
            }
        }
    }
}
