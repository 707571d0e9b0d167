use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::geometry::Footprint;
use super::period::TimeRange;

/// Unique identifier for a dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatasetId(pub Uuid);

impl DatasetId {
    /// Name-based (v5) identifier, stable for the same name
    pub fn from_name(name: &str) -> Self {
        Self(Uuid::new_v5(&Uuid::NAMESPACE_URL, name.as_bytes()))
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// What the dataset index reports about one dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Unique identifier
    pub id: DatasetId,

    /// Product the dataset belongs to
    pub product: String,

    /// Acquisition (center) time, used for timeline bucketing
    pub time: DateTime<Utc>,

    /// When the dataset was created by its producer
    pub creation_time: Option<DateTime<Utc>>,

    /// Region identifier (e.g. a path/row or tile code)
    pub region_code: Option<String>,

    /// Footprint in the dataset's native CRS
    pub footprint: Option<Footprint>,

    /// When the dataset was archived, if it has been
    pub archived_time: Option<DateTime<Utc>>,
}

impl DatasetSummary {
    pub fn is_archived(&self) -> bool {
        self.archived_time.is_some()
    }
}

/// Filter passed to the dataset index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetQuery {
    pub product: Option<String>,
    pub time: Option<TimeRange>,
    /// Include archived datasets (excluded by default)
    pub include_archived: bool,
}

impl DatasetQuery {
    pub fn for_product(product: impl Into<String>) -> Self {
        Self { product: Some(product.into()), ..Default::default() }
    }

    pub fn time(mut self, range: Option<TimeRange>) -> Self {
        self.time = range;
        self
    }

    /// Whether a dataset satisfies this query
    pub fn matches(&self, dataset: &DatasetSummary) -> bool {
        if !self.include_archived && dataset.is_archived() {
            return false;
        }
        if let Some(product) = &self.product {
            if &dataset.product != product {
                return false;
            }
        }
        match &self.time {
            Some(range) => range.contains(dataset.time),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dataset(product: &str, day: u32) -> DatasetSummary {
        DatasetSummary {
            id: DatasetId(Uuid::new_v4()),
            product: product.to_string(),
            time: Utc.with_ymd_and_hms(2017, 1, day, 10, 0, 0).unwrap(),
            creation_time: None,
            region_code: None,
            footprint: None,
            archived_time: None,
        }
    }

    #[test]
    fn test_name_based_ids_are_stable() {
        assert_eq!(DatasetId::from_name("ls7/0"), DatasetId::from_name("ls7/0"));
        assert_ne!(DatasetId::from_name("ls7/0"), DatasetId::from_name("ls7/1"));
    }

    #[test]
    fn test_query_matches_product_and_window() {
        let query = DatasetQuery::for_product("ls7").time(TimeRange::day(2017, 1, 2));
        assert!(query.matches(&dataset("ls7", 2)));
        assert!(!query.matches(&dataset("ls7", 3)));
        assert!(!query.matches(&dataset("ls8", 2)));
    }

    #[test]
    fn test_query_skips_archived() {
        let mut archived = dataset("ls7", 2);
        archived.archived_time = Some(Utc::now());

        let query = DatasetQuery::for_product("ls7");
        assert!(!query.matches(&archived));

        let query = DatasetQuery { include_archived: true, ..query };
        assert!(query.matches(&archived));
    }
}
