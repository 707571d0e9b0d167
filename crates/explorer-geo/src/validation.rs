use explorer_core::error::ExplorerError;
use geo::{Area, LineString, MultiPolygon, Polygon};

/// Validation result with details
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
}

/// Validation error with location details
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub location: String,
    pub reason: String,
}

impl ValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self { is_valid: true, errors: Vec::new() }
    }

    /// Add an error to the result
    pub fn add_error(&mut self, location: String, reason: String) {
        self.is_valid = false;
        self.errors.push(ValidationError { location, reason });
    }

    /// Convert into an error for the given dataset, if invalid
    pub fn into_error(self, dataset_id: &str) -> Option<ExplorerError> {
        if self.is_valid {
            return None;
        }
        let reason = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.location, e.reason))
            .collect::<Vec<_>>()
            .join("; ");
        Some(ExplorerError::InconsistentGeometry { dataset_id: dataset_id.to_string(), reason })
    }
}

/// Validate a footprint before it takes part in a union
pub fn validate_footprint(footprint: &MultiPolygon) -> ValidationResult {
    let mut result = ValidationResult::valid();

    if footprint.0.is_empty() {
        result.add_error("MultiPolygon".to_string(), "Footprint has no polygons".to_string());
        return result;
    }

    for (i, polygon) in footprint.0.iter().enumerate() {
        for error in validate_polygon(polygon).errors {
            result.add_error(format!("Polygon[{}].{}", i, error.location), error.reason);
        }
    }

    result
}

fn validate_ring(ring: &LineString, location: &str, result: &mut ValidationResult) {
    if ring.0.len() < 4 {
        result.add_error(
            location.to_string(),
            format!("Ring must have at least 4 points, found {}", ring.0.len()),
        );
    }

    if let (Some(first), Some(last)) = (ring.0.first(), ring.0.last()) {
        if first != last {
            result.add_error(
                location.to_string(),
                "Ring must be closed (first point == last point)".to_string(),
            );
        }
    }

    if ring.0.iter().any(|c| !c.x.is_finite() || !c.y.is_finite()) {
        result.add_error(location.to_string(), "Coordinates must be finite".to_string());
    }
}

fn validate_polygon(polygon: &Polygon) -> ValidationResult {
    let mut result = ValidationResult::valid();

    validate_ring(polygon.exterior(), "exterior", &mut result);
    for (i, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(interior, &format!("interior[{}]", i), &mut result);
    }

    if result.is_valid && polygon.unsigned_area() == 0.0 {
        result.add_error("exterior".to_string(), "Polygon has zero area".to_string());
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{to_multi_polygon, Geometry};
    use geo::{Coord, LineString};

    #[test]
    fn test_valid_rect() {
        let mp = to_multi_polygon(&Geometry::rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        assert!(validate_footprint(&mp).is_valid);
    }

    #[test]
    fn test_degenerate_polygon_is_invalid() {
        // All points on a line: closed, but no area
        let mp = to_multi_polygon(&Geometry::polygon(vec![vec![
            [0.0, 0.0],
            [1.0, 1.0],
            [2.0, 2.0],
            [0.0, 0.0],
        ]]))
        .unwrap();
        let result = validate_footprint(&mp);
        assert!(!result.is_valid);
        assert!(result.errors[0].reason.contains("zero area"));
    }

    #[test]
    fn test_non_finite_coordinates() {
        let ring = LineString::new(vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: f64::NAN, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 0.0, y: 0.0 },
        ]);
        let mp = MultiPolygon::new(vec![Polygon::new(ring, vec![])]);
        let err = validate_footprint(&mp).into_error("abc").unwrap();
        assert!(matches!(err, ExplorerError::InconsistentGeometry { ref dataset_id, .. } if dataset_id == "abc"));
    }

    #[test]
    fn test_empty_footprint_is_invalid() {
        assert!(!validate_footprint(&MultiPolygon::new(vec![])).is_valid);
    }
}
