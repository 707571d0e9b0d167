//! Hierarchical summary keys and their lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

use super::period::{TimeRange, TimelinePeriod};
use crate::error::{ExplorerError, Result};

/// Identifies one period overview: a whole product, a year, a month, or a day
///
/// Absent trailing components denote a coarser aggregation. Use
/// [`SummaryKey::new`] to construct a validated key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SummaryKey {
    product_name: String,
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
}

impl SummaryKey {
    /// Build a key, rejecting gaps (a month without a year) and impossible dates
    pub fn new(
        product_name: impl Into<String>,
        year: Option<i32>,
        month: Option<u32>,
        day: Option<u32>,
    ) -> Result<Self> {
        let key = Self { product_name: product_name.into(), year, month, day };

        if key.product_name.trim().is_empty() {
            return Err(key.invalid("product name cannot be empty"));
        }
        if month.is_some() && year.is_none() {
            return Err(key.invalid("a month requires a year"));
        }
        if day.is_some() && month.is_none() {
            return Err(key.invalid("a day requires a month"));
        }
        if let Some(y) = year {
            if y < 1 {
                return Err(key.invalid("year must be 1 or later"));
            }
        }
        if let Some(m) = month {
            if !(1..=12).contains(&m) {
                return Err(key.invalid("month must be between 1 and 12"));
            }
        }
        if key.year.is_some() && key.time_window().is_none() {
            return Err(key.invalid("no such date"));
        }

        Ok(key)
    }

    /// Whole-product summary
    pub fn product(product_name: impl Into<String>) -> Result<Self> {
        Self::new(product_name, None, None, None)
    }

    pub fn year(product_name: impl Into<String>, year: i32) -> Result<Self> {
        Self::new(product_name, Some(year), None, None)
    }

    pub fn month(product_name: impl Into<String>, year: i32, month: u32) -> Result<Self> {
        Self::new(product_name, Some(year), Some(month), None)
    }

    pub fn day(product_name: impl Into<String>, year: i32, month: u32, day: u32) -> Result<Self> {
        Self::new(product_name, Some(year), Some(month), Some(day))
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn year_value(&self) -> Option<i32> {
        self.year
    }

    pub fn month_value(&self) -> Option<u32> {
        self.month
    }

    pub fn day_value(&self) -> Option<u32> {
        self.day
    }

    /// The time window this key covers, or `None` for a whole-product key
    pub fn time_window(&self) -> Option<TimeRange> {
        match (self.year, self.month, self.day) {
            (Some(y), Some(m), Some(d)) => TimeRange::day(y, m, d),
            (Some(y), Some(m), None) => TimeRange::month(y, m),
            (Some(y), None, None) => TimeRange::year(y),
            _ => None,
        }
    }

    /// Timeline granularity for this key; whole-product keys use `product_period`
    pub fn timeline_period(&self, product_period: TimelinePeriod) -> TimelinePeriod {
        if self.year.is_some() {
            TimelinePeriod::Day
        } else {
            product_period
        }
    }

    fn invalid(&self, reason: &str) -> ExplorerError {
        ExplorerError::InvalidSummaryKey { key: self.to_string(), reason: reason.to_string() }
    }
}

impl fmt::Display for SummaryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.product_name)?;
        for part in [self.year.map(i64::from), self.month.map(i64::from), self.day.map(i64::from)]
            .into_iter()
            .map_while(|p| p)
        {
            write!(f, "/{}", part)?;
        }
        Ok(())
    }
}

/// Lifecycle of the persisted overview for one key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryState {
    /// Never generated
    Absent,
    /// Generated, but source data has since changed
    Stale,
    /// Matches the latest generation
    Current,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_valid_keys() {
        assert!(SummaryKey::product("ls7_level1_scene").is_ok());
        assert!(SummaryKey::year("ls7_level1_scene", 2017).is_ok());
        assert!(SummaryKey::month("ls7_level1_scene", 2017, 12).is_ok());
        assert!(SummaryKey::day("ls7_level1_scene", 2016, 2, 29).is_ok());
    }

    #[test]
    fn test_rejects_gaps_and_bad_dates() {
        assert!(SummaryKey::new("p", None, Some(4), None).is_err());
        assert!(SummaryKey::new("p", Some(2019), None, Some(4)).is_err());
        assert!(SummaryKey::month("p", 2019, 13).is_err());
        assert!(SummaryKey::month("p", 2019, 0).is_err());
        assert!(SummaryKey::day("p", 2017, 2, 29).is_err());
        assert!(SummaryKey::product("  ").is_err());
        // Absent parts are persisted as 0, so year 0 would alias the product key
        assert!(SummaryKey::year("p", 0).is_err());
        assert!(SummaryKey::month("p", -3, 1).is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(SummaryKey::product("p").unwrap().to_string(), "p");
        assert_eq!(SummaryKey::month("p", 2019, 4).unwrap().to_string(), "p/2019/4");
        assert_eq!(SummaryKey::day("p", 2019, 4, 1).unwrap().to_string(), "p/2019/4/1");
    }

    #[test]
    fn test_time_window() {
        let key = SummaryKey::month("p", 2017, 1).unwrap();
        let window = key.time_window().unwrap();
        assert_eq!(window.begin, Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2017, 2, 1, 0, 0, 0).unwrap());
        assert!(SummaryKey::product("p").unwrap().time_window().is_none());
    }

    #[test]
    fn test_timeline_period() {
        let product = SummaryKey::product("p").unwrap();
        assert_eq!(product.timeline_period(TimelinePeriod::Month), TimelinePeriod::Month);
        let year = SummaryKey::year("p", 2017).unwrap();
        assert_eq!(year.timeline_period(TimelinePeriod::Month), TimelinePeriod::Day);
    }
}
