//! Field statistics from a masked index raster
//!
//! Reduces a quality-masked index raster and the field boundary to the
//! summary record reported to the grower: area, mean index, cloud and
//! valid-pixel percentages, and the fixed low/medium/high vigor split.

use agrozone_core::raster::Raster;
use agrozone_core::vector::FieldBoundary;
use agrozone_core::Result;
use geo::Area;
use serde::Serialize;
use std::collections::BTreeMap;

/// Linear meters per degree used for the planar area approximation.
///
/// Known limitation: this treats a degree of longitude as a degree of
/// latitude, which only holds near mid-latitudes and for field-sized
/// extents. No latitude correction is applied.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Vigor buckets as percentages of valid pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZonePercentages {
    /// Index below 0.3
    pub low: f64,
    /// Index in [0.3, 0.6)
    pub medium: f64,
    /// Index at or above 0.6
    pub high: f64,
}

/// Summary of one index raster over its valid pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexSummary {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub std_dev: f64,
}

/// The field-level statistics record for one analysis
#[derive(Debug, Clone, Serialize)]
pub struct FieldStats {
    /// Field area in hectares (planar approximation)
    pub area_ha: f64,
    /// Mean of the primary index over valid pixels
    pub mean_index: f64,
    /// Acquisition date of the imagery, as supplied by the caller
    pub capture_date: String,
    /// Share of pixels invalidated by the quality mask
    pub cloud_coverage_percent: f64,
    /// Complement of `cloud_coverage_percent`
    pub valid_pixels_percent: f64,
    /// Fixed three-way vigor split over valid pixels
    pub zones_percent: ZonePercentages,
    /// Summaries for additionally requested indices, keyed by index name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra_indices: BTreeMap<String, IndexSummary>,
}

/// Field area in hectares from the boundary's planar degree area.
///
/// `area_ha = degree_area * 111320^2 / 10000`; a first-order
/// approximation, not a geodesic computation.
pub fn area_hectares(boundary: &FieldBoundary) -> f64 {
    boundary.polygon().unsigned_area() * METERS_PER_DEGREE * METERS_PER_DEGREE / 10_000.0
}

/// Summarize an index raster over its valid (finite) pixels.
///
/// With zero valid pixels every component degrades to `0.0`; an empty
/// field report is not a fault.
pub fn summarize_index(index: &Raster<f32>) -> IndexSummary {
    let mut count = 0usize;
    let mut sum = 0.0f64;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for &v in index.data().iter() {
        if !v.is_finite() {
            continue;
        }
        let v = v as f64;
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }

    if count == 0 {
        return IndexSummary {
            mean: 0.0,
            min: 0.0,
            max: 0.0,
            std_dev: 0.0,
        };
    }

    let mean = sum / count as f64;
    let var = index
        .data()
        .iter()
        .filter(|v| v.is_finite())
        .map(|&v| {
            let d = v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / count as f64;

    IndexSummary {
        mean,
        min,
        max,
        std_dev: var.sqrt(),
    }
}

/// Compute the field statistics record from a masked index raster and
/// the field boundary.
pub fn field_statistics(
    index: &Raster<f32>,
    boundary: &FieldBoundary,
    capture_date: &str,
) -> Result<FieldStats> {
    let total_pixels = index.len();

    let mut valid_pixels = 0usize;
    let mut sum = 0.0f64;
    let mut low = 0usize;
    let mut medium = 0usize;
    let mut high = 0usize;

    for &v in index.data().iter() {
        if !v.is_finite() {
            continue;
        }
        valid_pixels += 1;
        sum += v as f64;
        if v < 0.3 {
            low += 1;
        } else if v < 0.6 {
            medium += 1;
        } else {
            high += 1;
        }
    }

    let mean_index = if valid_pixels > 0 {
        sum / valid_pixels as f64
    } else {
        0.0
    };

    let cloud_coverage_percent = if total_pixels > 0 {
        (total_pixels - valid_pixels) as f64 / total_pixels as f64 * 100.0
    } else {
        0.0
    };
    let valid_pixels_percent = if total_pixels > 0 {
        100.0 - cloud_coverage_percent
    } else {
        0.0
    };

    let zones_percent = if valid_pixels > 0 {
        let denom = valid_pixels as f64;
        ZonePercentages {
            low: round_to(low as f64 / denom * 100.0, 1),
            medium: round_to(medium as f64 / denom * 100.0, 1),
            high: round_to(high as f64 / denom * 100.0, 1),
        }
    } else {
        ZonePercentages {
            low: 0.0,
            medium: 0.0,
            high: 0.0,
        }
    };

    tracing::debug!(
        valid_pixels,
        total_pixels,
        mean_index,
        "computed field statistics"
    );

    Ok(FieldStats {
        area_ha: round_to(area_hectares(boundary), 2),
        mean_index: round_to(mean_index, 3),
        capture_date: capture_date.to_string(),
        cloud_coverage_percent: round_to(cloud_coverage_percent, 1),
        valid_pixels_percent: round_to(valid_pixels_percent, 1),
        zones_percent,
        extra_indices: BTreeMap::new(),
    })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
