//! GeoJSON serialization of zone features

use agrozone_core::vector::{AttributeValue, Feature, FeatureCollection};
use agrozone_core::{Error, Result};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Write a feature collection as a GeoJSON FeatureCollection file.
///
/// Coordinates are emitted exactly as stored, i.e. in the CRS of the
/// source geometry.
pub fn write_geojson(features: &FeatureCollection, path: &Path) -> Result<()> {
    let fc = to_geojson(features);
    let file = File::create(path)?;
    serde_json::to_writer(BufWriter::new(file), &fc)
        .map_err(|e| Error::Export(format!("GeoJSON serialization failed: {}", e)))
}

fn to_geojson(features: &FeatureCollection) -> geojson::FeatureCollection {
    geojson::FeatureCollection {
        bbox: None,
        features: features.iter().map(feature_to_geojson).collect(),
        foreign_members: None,
    }
}

fn feature_to_geojson(feature: &Feature) -> geojson::Feature {
    let geometry = feature
        .geometry
        .as_ref()
        .map(|g| geojson::Geometry::new(geojson::Value::from(g)));

    let mut properties = serde_json::Map::new();
    for (key, value) in &feature.properties {
        properties.insert(key.clone(), attribute_to_json(value));
    }

    geojson::Feature {
        bbox: None,
        geometry,
        id: feature
            .id
            .clone()
            .map(|id| geojson::feature::Id::String(id)),
        properties: Some(properties),
        foreign_members: None,
    }
}

fn attribute_to_json(value: &AttributeValue) -> serde_json::Value {
    match value {
        AttributeValue::Null => serde_json::Value::Null,
        AttributeValue::Bool(b) => serde_json::Value::Bool(*b),
        AttributeValue::Int(i) => serde_json::Value::from(*i),
        AttributeValue::Float(f) => serde_json::Value::from(*f),
        AttributeValue::String(s) => serde_json::Value::from(s.clone()),
    }
}
