//! Geometry models for explorer-geo.
//!
//! Re-exports the canonical types from `explorer-core` and converts areal
//! geometries to and from the `geo` polygons used for footprint unions.

use geo::{Coord, LineString, MultiPolygon, Polygon};

pub use explorer_core::models::{Crs, Footprint, Geometry, GeometryType, ValidityMode};

type Ring = Vec<[f64; 2]>;

fn to_line_string(ring: &[[f64; 2]]) -> LineString {
    LineString::new(ring.iter().map(|c| Coord { x: c[0], y: c[1] }).collect())
}

fn to_polygon(rings: &[Ring]) -> Polygon {
    match rings.split_first() {
        Some((exterior, interiors)) => {
            Polygon::new(to_line_string(exterior), interiors.iter().map(|r| to_line_string(r)).collect())
        }
        None => Polygon::new(LineString::new(vec![]), vec![]),
    }
}

fn from_line_string(ls: &LineString) -> Ring {
    ls.coords().map(|c| [c.x, c.y]).collect()
}

fn from_polygon(polygon: &Polygon) -> Vec<Ring> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(from_line_string)
        .collect()
}

/// Areal part of a canonical geometry as a MultiPolygon
///
/// Returns `None` for points and lines, which cannot contribute to a footprint.
pub fn to_multi_polygon(geom: &Geometry) -> Option<MultiPolygon> {
    match geom {
        Geometry::Polygon { coordinates } => Some(MultiPolygon::new(vec![to_polygon(coordinates)])),
        Geometry::MultiPolygon { coordinates } => {
            Some(MultiPolygon::new(coordinates.iter().map(|p| to_polygon(p)).collect()))
        }
        _ => None,
    }
}

/// Convert a union result back to a canonical geometry
///
/// A single polygon is kept as `Polygon`; anything else becomes `MultiPolygon`.
pub fn from_multi_polygon(mp: &MultiPolygon) -> Option<Geometry> {
    match mp.0.as_slice() {
        [] => None,
        [single] => Some(Geometry::Polygon { coordinates: from_polygon(single) }),
        many => Some(Geometry::MultiPolygon {
            coordinates: many.iter().map(from_polygon).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Area;

    fn area(geometry: &Geometry) -> f64 {
        to_multi_polygon(geometry).map(|mp| mp.unsigned_area()).unwrap_or(0.0)
    }

    #[test]
    fn test_polygon_roundtrip() {
        let geom = Geometry::rect(0.0, 0.0, 1.0, 1.0);
        let mp = to_multi_polygon(&geom).unwrap();
        assert_eq!(from_multi_polygon(&mp), Some(geom));
    }

    #[test]
    fn test_points_are_not_areal() {
        assert!(to_multi_polygon(&Geometry::point(115.0, -8.5)).is_none());
        assert_eq!(area(&Geometry::point(115.0, -8.5)), 0.0);
    }

    #[test]
    fn test_multi_polygon_output() {
        let a = to_multi_polygon(&Geometry::rect(0.0, 0.0, 1.0, 1.0)).unwrap();
        let b = to_multi_polygon(&Geometry::rect(5.0, 5.0, 6.0, 6.0)).unwrap();
        let both = MultiPolygon::new(a.0.into_iter().chain(b.0).collect());

        let geom = from_multi_polygon(&both).unwrap();
        assert!(matches!(geom, Geometry::MultiPolygon { ref coordinates } if coordinates.len() == 2));
        assert!((area(&geom) - 2.0).abs() < 1e-10);
        assert!(from_multi_polygon(&MultiPolygon::new(vec![])).is_none());
    }

    #[test]
    fn test_polygon_with_hole_keeps_interior() {
        let geom = Geometry::polygon(vec![
            vec![[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0], [0.0, 0.0]],
            vec![[1.0, 1.0], [2.0, 1.0], [2.0, 2.0], [1.0, 2.0], [1.0, 1.0]],
        ]);
        let mp = to_multi_polygon(&geom).unwrap();
        assert_eq!(mp.0[0].interiors().len(), 1);
        assert!((area(&geom) - 15.0).abs() < 1e-10);
        assert_eq!(from_multi_polygon(&mp), Some(geom));
    }
}
