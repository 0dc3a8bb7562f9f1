//! Vector data structures: features, collections, field boundaries

use crate::error::{Error, Result};
use geo_types::{Coord, Geometry, LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Attribute value types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

/// A geographic feature with geometry and attributes
#[derive(Debug, Clone)]
pub struct Feature {
    /// Feature geometry
    pub geometry: Option<Geometry<f64>>,
    /// Feature attributes
    pub properties: HashMap<String, AttributeValue>,
    /// Optional feature ID
    pub id: Option<String>,
}

impl Feature {
    /// Create a new feature with geometry
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry: Some(geometry),
            properties: HashMap::new(),
            id: None,
        }
    }

    /// Set an attribute
    pub fn set_property(&mut self, key: impl Into<String>, value: AttributeValue) {
        self.properties.insert(key.into(), value);
    }

    /// Get an attribute
    pub fn get_property(&self, key: &str) -> Option<&AttributeValue> {
        self.properties.get(key)
    }
}

/// Collection of features
#[derive(Debug, Clone, Default)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new() -> Self {
        Self {
            features: Vec::new(),
        }
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}

/// The boundary of one agricultural field.
///
/// A single exterior ring in longitude/latitude order. Holes are not
/// supported; imagery is assumed pre-clipped to this boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBoundary {
    polygon: Polygon<f64>,
}

impl FieldBoundary {
    /// Build a boundary from an exterior ring of `(lon, lat)` vertices.
    ///
    /// The ring may be open or closed; it is closed automatically. Fewer
    /// than three distinct vertices is a precondition violation.
    pub fn from_ring(ring: Vec<(f64, f64)>) -> Result<Self> {
        let mut coords: Vec<Coord<f64>> =
            ring.into_iter().map(|(x, y)| Coord { x, y }).collect();

        // Drop an explicit closing vertex before counting distinct ones
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }

        if coords.len() < 3 {
            return Err(Error::InvalidGeometry(format!(
                "field boundary needs at least 3 vertices, got {}",
                coords.len()
            )));
        }

        Ok(Self {
            polygon: Polygon::new(LineString::new(coords), vec![]),
        })
    }

    /// The boundary polygon (exterior ring only)
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// Bounding box as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;

        for c in &self.polygon.exterior().0 {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }

        (min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundary_from_open_ring() {
        let b = FieldBoundary::from_ring(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]).unwrap();
        assert_eq!(b.polygon().exterior().0.len(), 4); // auto-closed
    }

    #[test]
    fn test_boundary_from_closed_ring() {
        let b = FieldBoundary::from_ring(vec![
            (0.0, 0.0),
            (1.0, 0.0),
            (1.0, 1.0),
            (0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(b.bounds(), (0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn test_degenerate_ring_rejected() {
        let result = FieldBoundary::from_ring(vec![(0.0, 0.0), (1.0, 1.0)]);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));

        // Two distinct vertices plus a closing copy is still degenerate
        let result = FieldBoundary::from_ring(vec![(0.0, 0.0), (1.0, 1.0), (0.0, 0.0)]);
        assert!(matches!(result, Err(Error::InvalidGeometry(_))));
    }

    #[test]
    fn test_feature_properties() {
        let mut f = Feature::new(Geometry::Polygon(Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]),
            vec![],
        )));
        f.set_property("zone_id", AttributeValue::Int(1));
        assert_eq!(f.get_property("zone_id"), Some(&AttributeValue::Int(1)));
    }
}
