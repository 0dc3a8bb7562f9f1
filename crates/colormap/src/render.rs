//! Raster-to-RGBA rendering and PNG encoding.

use crate::scheme::{evaluate, ColorScheme, Rgb};
use agrozone_core::raster::Raster;
use agrozone_core::{Error, Result};
use std::path::Path;

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    /// Color scheme to use.
    pub scheme: ColorScheme,
    /// Minimum value for normalization. Values below are clamped.
    pub min: f64,
    /// Maximum value for normalization. Values above are clamped.
    pub max: f64,
    /// Color for masked pixels (RGBA). Default: fully transparent, so
    /// the overlay shows the base map through clouds.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    /// Create params with an explicit normalization range.
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: [0, 0, 0, 0],
        }
    }
}

/// Convert an index raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
/// Non-finite cells are rendered with `params.nodata_color`.
pub fn raster_to_rgba(raster: &Raster<f32>, params: &ColormapParams) -> Vec<u8> {
    let rows = raster.rows();
    let cols = raster.cols();
    let range = params.max - params.min;
    let inv_range = if range.abs() > f64::EPSILON {
        1.0 / range
    } else {
        1.0
    };

    let mut rgba = vec![0u8; rows * cols * 4];

    for (i, &val) in raster.data().iter().enumerate() {
        let offset = i * 4;
        if !val.is_finite() {
            rgba[offset..offset + 4].copy_from_slice(&params.nodata_color);
            continue;
        }

        let t = (val as f64 - params.min) * inv_range;
        let Rgb { r, g, b } = evaluate(params.scheme, t);
        rgba[offset] = r;
        rgba[offset + 1] = g;
        rgba[offset + 2] = b;
        rgba[offset + 3] = 255;
    }

    rgba
}

/// Render an index raster to a PNG overlay file.
pub fn write_png(raster: &Raster<f32>, params: &ColormapParams, path: &Path) -> Result<()> {
    let rgba = raster_to_rgba(raster, params);
    let (rows, cols) = raster.shape();

    let img = image::RgbaImage::from_raw(cols as u32, rows as u32, rgba)
        .ok_or_else(|| Error::Other("RGBA buffer does not match raster shape".to_string()))?;

    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| Error::Export(format!("PNG encoding failed: {}", e)))
}
