//! Loading datasets from a GeoJSON FeatureCollection
//!
//! Each feature is one dataset. The geometry is the dataset footprint and the
//! properties carry the rest:
//!
//! | property        | required | example                  |
//! |-----------------|----------|--------------------------|
//! | `product`       | yes      | `"ls7_level1_scene"`     |
//! | `time`          | yes      | `"2017-01-03T00:12:00Z"` |
//! | `id`            | no       | UUID, or the feature id  |
//!
//! Features without an id get a name-based UUID derived from their product,
//! time and position in the file, so reloading a file yields the same ids.
//! | `creation_time` | no       | RFC 3339 timestamp       |
//! | `region_code`   | no       | `"090_084"`              |
//! | `crs`           | no       | `"EPSG:32755"` (WGS 84)  |
//! | `archived_time` | no       | RFC 3339 timestamp       |

use chrono::{DateTime, Utc};
use geojson::{Feature, GeoJson};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

use explorer_core::models::{Crs, DatasetId, DatasetSummary, Footprint, Geometry};

#[derive(Debug, Error)]
pub enum DatasetFileError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GeoJSON: {0}")]
    Parse(#[from] geojson::Error),

    #[error("Expected a FeatureCollection")]
    NotACollection,

    #[error("Feature {index}: {reason}")]
    Feature { index: usize, reason: String },
}

/// Read every dataset in a FeatureCollection file
pub fn load_datasets(path: &Path) -> Result<Vec<DatasetSummary>, DatasetFileError> {
    let content = std::fs::read_to_string(path).map_err(|source| DatasetFileError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_datasets(&content)
}

pub fn parse_datasets(content: &str) -> Result<Vec<DatasetSummary>, DatasetFileError> {
    let GeoJson::FeatureCollection(collection) = content.parse::<GeoJson>()? else {
        return Err(DatasetFileError::NotACollection);
    };

    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            dataset_from_feature(index, feature)
                .map_err(|reason| DatasetFileError::Feature { index, reason })
        })
        .collect()
}

fn dataset_from_feature(index: usize, feature: &Feature) -> Result<DatasetSummary, String> {
    let product = string_property(feature, "product")?
        .ok_or_else(|| "missing 'product' property".to_string())?;
    let time = time_property(feature, "time")?.ok_or_else(|| "missing 'time' property".to_string())?;

    Ok(DatasetSummary {
        id: dataset_id(index, feature, &product, time)?,
        product,
        time,
        creation_time: time_property(feature, "creation_time")?,
        region_code: string_property(feature, "region_code")?,
        footprint: footprint(feature)?,
        archived_time: time_property(feature, "archived_time")?,
    })
}

fn dataset_id(
    index: usize,
    feature: &Feature,
    product: &str,
    time: DateTime<Utc>,
) -> Result<DatasetId, String> {
    let raw = match (string_property(feature, "id")?, &feature.id) {
        (Some(id), _) => Some(id),
        (None, Some(geojson::feature::Id::String(id))) => Some(id.clone()),
        (None, Some(geojson::feature::Id::Number(n))) => Some(n.to_string()),
        (None, None) => None,
    };

    match raw {
        Some(raw) => Uuid::parse_str(&raw)
            .map(DatasetId)
            .map_err(|e| format!("invalid dataset id '{}': {}", raw, e)),
        None => Ok(DatasetId::from_name(&format!("{}/{}/{}", product, time.to_rfc3339(), index))),
    }
}

fn footprint(feature: &Feature) -> Result<Option<Footprint>, String> {
    let Some(geometry) = &feature.geometry else {
        return Ok(None);
    };

    let value = serde_json::to_value(geometry).map_err(|e| e.to_string())?;
    let geometry = Geometry::from_geojson(&value)
        .ok_or_else(|| "unsupported footprint geometry".to_string())?;

    let crs = match string_property(feature, "crs")? {
        Some(identifier) => {
            let epsg = Crs::parse_identifier(&identifier)
                .ok_or_else(|| format!("invalid crs '{}', expected EPSG:<code>", identifier))?;
            Crs::new(epsg, identifier)
        }
        None => Crs::wgs84(),
    };

    Ok(Some(Footprint { geometry, crs }))
}

fn string_property(feature: &Feature, name: &str) -> Result<Option<String>, String> {
    match feature.property(name) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(format!("'{}' must be a string, got {}", name, other)),
    }
}

fn time_property(feature: &Feature, name: &str) -> Result<Option<DateTime<Utc>>, String> {
    string_property(feature, name)?
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| format!("invalid '{}' timestamp '{}': {}", name, s, e))
        })
        .transpose()
}
