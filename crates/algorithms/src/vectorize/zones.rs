//! Dissolved zone features with per-zone statistics
//!
//! Turns a zone-label raster into one polygon feature per zone id. All
//! raster regions sharing an id are merged into a single (possibly
//! multi-part) feature; merging disjoint regions into a `MultiPolygon`
//! keeps the total area identical to the per-region polygons.

use crate::vectorize::extract_zone_polygons;
use crate::zoning::{zone_label, ZONE_NODATA};
use agrozone_core::raster::Raster;
use agrozone_core::vector::{AttributeValue, Feature, FeatureCollection};
use agrozone_core::{Error, Result};
use geo_types::{Geometry, MultiPolygon, Polygon};
use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics of the masked index values belonging to one zone
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
    pub pixel_count: usize,
}

/// The vectorized zoning of one field
#[derive(Debug, Clone)]
pub struct ZoneVectorization {
    /// One dissolved feature per zone id, ascending
    pub features: FeatureCollection,
    /// Per-zone statistics keyed by zone id
    pub statistics: BTreeMap<i16, ZoneStats>,
}

/// Compute per-zone statistics of the index values under each zone id.
///
/// Masked (NaN) index cells and nodata zone cells are skipped.
pub fn zone_statistics(
    index: &Raster<f32>,
    zones: &Raster<i16>,
) -> Result<BTreeMap<i16, ZoneStats>> {
    let (rows_v, cols_v) = index.shape();
    let (rows_z, cols_z) = zones.shape();
    if (rows_v, cols_v) != (rows_z, cols_z) {
        return Err(Error::ShapeMismatch {
            er: rows_v,
            ec: cols_v,
            ar: rows_z,
            ac: cols_z,
        });
    }

    let mut zone_values: BTreeMap<i16, Vec<f64>> = BTreeMap::new();
    for row in 0..rows_v {
        for col in 0..cols_v {
            let zone = unsafe { zones.get_unchecked(row, col) };
            let val = unsafe { index.get_unchecked(row, col) };
            if zone == ZONE_NODATA || !val.is_finite() {
                continue;
            }
            zone_values.entry(zone).or_default().push(val as f64);
        }
    }

    let mut results = BTreeMap::new();
    for (zone_id, vals) in zone_values {
        let count = vals.len();
        let sum: f64 = vals.iter().sum();
        let mean = sum / count as f64;
        let var = vals.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / count as f64;

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in &vals {
            min = min.min(v);
            max = max.max(v);
        }

        results.insert(
            zone_id,
            ZoneStats {
                mean,
                min,
                max,
                std_dev: var.sqrt(),
                pixel_count: count,
            },
        );
    }

    Ok(results)
}

/// Merge per-region polygons into one `MultiPolygon` per zone id.
///
/// Regions of a zone are pairwise disjoint, so grouping them preserves
/// total area exactly; no hull or union approximation is involved.
pub fn dissolve(polygons: Vec<(i16, Polygon<f64>)>) -> BTreeMap<i16, MultiPolygon<f64>> {
    let mut groups: BTreeMap<i16, Vec<Polygon<f64>>> = BTreeMap::new();
    for (zone_id, poly) in polygons {
        groups.entry(zone_id).or_default().push(poly);
    }

    groups
        .into_iter()
        .map(|(zone_id, polys)| (zone_id, MultiPolygon::new(polys)))
        .collect()
}

/// Vectorize a zone-label raster into dissolved features with per-zone
/// statistics.
///
/// Each zone id in 1..=num_zones yields one feature carrying
/// `{zone_id, mean_index, pixel_count, label}`. Fails when the raster
/// holds no zoned pixels at all.
pub fn vectorize_zones(
    zones: &Raster<i16>,
    index: &Raster<f32>,
    num_zones: usize,
) -> Result<ZoneVectorization> {
    let statistics = zone_statistics(index, zones)?;
    if statistics.is_empty() {
        return Err(Error::InsufficientData(
            "zone raster holds no zoned pixels".to_string(),
        ));
    }

    let mut per_region: Vec<(i16, Polygon<f64>)> = Vec::new();
    for zone_id in 1..=num_zones as i16 {
        for poly in extract_zone_polygons(zones, zone_id) {
            per_region.push((zone_id, poly));
        }
    }

    tracing::debug!(regions = per_region.len(), zones = num_zones, "dissolving zone polygons");

    let dissolved = dissolve(per_region);

    let mut features = FeatureCollection::new();
    for (zone_id, geometry) in dissolved {
        let stats = match statistics.get(&zone_id) {
            Some(s) => *s,
            None => continue,
        };

        let mut feature = Feature::new(Geometry::MultiPolygon(geometry));
        feature.id = Some(zone_id.to_string());
        feature.set_property("zone_id", AttributeValue::Int(zone_id as i64));
        feature.set_property("mean_index", AttributeValue::Float(stats.mean));
        feature.set_property("pixel_count", AttributeValue::Int(stats.pixel_count as i64));
        feature.set_property(
            "label",
            AttributeValue::String(zone_label(zone_id as usize, num_zones)),
        );
        features.push(feature);
    }

    Ok(ZoneVectorization {
        features,
        statistics,
    })
}
