//! K-means zone clustering over a masked index raster
//!
//! Partitions the valid pixels of a quality-masked index raster into K
//! management zones by 1-D k-means over the scalar index values, then
//! paints a zone-label raster. Zone ids are canonical: after fitting,
//! cluster ids are remapped so that zone 1 holds the lowest centroid
//! (weakest vegetation) and zone K the highest. Callers rely on that
//! ordering when prescribing variable-rate inputs.

use agrozone_core::raster::Raster;
use agrozone_core::{Error, Result};
use ndarray::Array2;

/// No-data sentinel for zone-label rasters, outside the 1..=K id range
pub const ZONE_NODATA: i16 = -9999;

/// Largest supported zone count
pub const MAX_ZONES: usize = 10;

/// Parameters for zone clustering
#[derive(Debug, Clone)]
pub struct ZoningParams {
    /// Number of zones (1..=10, typically 3-5)
    pub zones: usize,
    /// Maximum k-means iterations
    pub max_iterations: usize,
    /// Stop when no centroid moves more than this between iterations
    pub convergence: f64,
}

impl Default for ZoningParams {
    fn default() -> Self {
        Self {
            zones: 4,
            max_iterations: 300,
            convergence: 1e-4,
        }
    }
}

/// Cluster the valid pixels of a masked index raster into ordered
/// management zones.
///
/// Only finite values within [-1, 1] participate in fitting; masked
/// pixels never receive a zone id. Centroid initialization is quantile
/// spacing over the sorted valid values, so the same input always
/// yields the same partition. Reproducible zonings are required for
/// agronomic reports; a deterministic start gives that without any RNG.
///
/// # Errors
/// - `InvalidParameter` when `zones` is outside 1..=10
/// - `InsufficientData` when fewer valid pixels than zones remain
pub fn cluster_zones(index: &Raster<f32>, params: &ZoningParams) -> Result<Raster<i16>> {
    let k = params.zones;
    if k < 1 || k > MAX_ZONES {
        return Err(Error::InvalidParameter {
            name: "zones",
            value: k.to_string(),
            reason: format!("supported zone count is 1..={}", MAX_ZONES),
        });
    }

    let (rows, cols) = index.shape();

    // Valid pixels: finite and inside the index's nominal range
    let mut values: Vec<(usize, f64)> = Vec::new();
    for r in 0..rows {
        for c in 0..cols {
            let v = unsafe { index.get_unchecked(r, c) };
            if v.is_finite() && (-1.0..=1.0).contains(&v) {
                values.push((r * cols + c, v as f64));
            }
        }
    }

    if values.len() < k {
        return Err(Error::InsufficientData(format!(
            "{} valid pixels cannot form {} zones",
            values.len(),
            k
        )));
    }

    tracing::debug!(valid = values.len(), zones = k, "clustering index values");

    let mut centroids = initialize_centroids(&values, k);
    let mut labels = vec![0usize; values.len()];

    for _iter in 0..params.max_iterations {
        // Assignment step
        for (i, label) in labels.iter_mut().enumerate() {
            let val = values[i].1;
            let mut best_dist = f64::INFINITY;
            let mut best_k = 0;
            for (ci, &centroid) in centroids.iter().enumerate() {
                let dist = (val - centroid).abs();
                if dist < best_dist {
                    best_dist = dist;
                    best_k = ci;
                }
            }
            *label = best_k;
        }

        // Update step
        let mut sums = vec![0.0f64; k];
        let mut counts = vec![0usize; k];
        for (i, &(_, val)) in values.iter().enumerate() {
            sums[labels[i]] += val;
            counts[labels[i]] += 1;
        }

        let mut max_shift = 0.0f64;
        for ci in 0..k {
            if counts[ci] > 0 {
                let next = sums[ci] / counts[ci] as f64;
                max_shift = max_shift.max((next - centroids[ci]).abs());
                centroids[ci] = next;
            }
        }

        if max_shift < params.convergence {
            break;
        }
    }

    // A cluster can end up empty when the data has fewer distinct levels
    // than K. Fall back to equal-count rank splitting, which always
    // yields K non-empty groups with non-decreasing means.
    let counts = label_counts(&labels, k);
    if counts.iter().any(|&c| c == 0) {
        rank_split(&values, k, &mut labels, &mut centroids);
    }

    // Canonical ordering: remap so zone 1 = lowest centroid
    let mut order: Vec<usize> = (0..k).collect();
    order.sort_by(|&a, &b| {
        centroids[a]
            .partial_cmp(&centroids[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    let mut zone_of_cluster = vec![0i16; k];
    for (rank, &cluster) in order.iter().enumerate() {
        zone_of_cluster[cluster] = (rank + 1) as i16;
    }

    // Paint the label raster
    let mut data = vec![ZONE_NODATA; rows * cols];
    for (i, &(idx, _)) in values.iter().enumerate() {
        data[idx] = zone_of_cluster[labels[i]];
    }

    let mut output = index.with_same_meta::<i16>(rows, cols);
    output.set_nodata(Some(ZONE_NODATA));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

    Ok(output)
}

/// Initialize centroids by quantile spacing over the sorted values
fn initialize_centroids(values: &[(usize, f64)], k: usize) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().map(|&(_, v)| v).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = sorted.len();
    (0..k)
        .map(|i| {
            let idx = (i * n / k) + n / (2 * k);
            sorted[idx.min(n - 1)]
        })
        .collect()
}

fn label_counts(labels: &[usize], k: usize) -> Vec<usize> {
    let mut counts = vec![0usize; k];
    for &l in labels {
        counts[l] += 1;
    }
    counts
}

/// Assign labels by splitting the value ranking into K equal-count
/// chunks. Deterministic; every chunk is non-empty when `n >= k`.
fn rank_split(values: &[(usize, f64)], k: usize, labels: &mut [usize], centroids: &mut [f64]) {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .1
            .partial_cmp(&values[b].1)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut sums = vec![0.0f64; k];
    let mut counts = vec![0usize; k];
    for (rank, &i) in order.iter().enumerate() {
        let cluster = (rank * k / n).min(k - 1);
        labels[i] = cluster;
        sums[cluster] += values[i].1;
        counts[cluster] += 1;
    }
    for ci in 0..k {
        centroids[ci] = sums[ci] / counts[ci] as f64;
    }
}
