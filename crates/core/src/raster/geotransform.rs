//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation mapping pixel coordinates to geographic
/// coordinates for a north-up raster:
///
/// ```text
/// x = origin_x + col * pixel_width
/// y = origin_y + row * pixel_height
/// ```
///
/// `origin_x`/`origin_y` name the upper-left corner of the grid;
/// `pixel_height` is negative for north-up imagery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
}

impl GeoTransform {
    /// Create a new north-up GeoTransform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
        }
    }

    /// Derive the transform that fits a grid of `cols` x `rows` pixels to
    /// the geographic window `(min_x, min_y, max_x, max_y)`.
    pub fn from_bounds(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        cols: usize,
        rows: usize,
    ) -> Self {
        Self {
            origin_x: min_x,
            origin_y: max_y,
            pixel_width: (max_x - min_x) / cols as f64,
            pixel_height: -(max_y - min_y) / rows as f64,
        }
    }

    /// Convert pixel indices to the geographic coordinates of the pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.pixel_width;
        let y = self.origin_y + (row as f64 + 0.5) * self.pixel_height;
        (x, y)
    }

    /// Convert a pixel-corner position (fractional indices allowed) to
    /// geographic coordinates. Corner `(0, 0)` is the grid origin.
    pub fn corner_to_geo(&self, col: f64, row: f64) -> (f64, f64) {
        let x = self.origin_x + col * self.pixel_width;
        let y = self.origin_y + row * self.pixel_height;
        (x, y)
    }

    /// Convert geographic coordinates to fractional pixel coordinates
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.origin_x) / self.pixel_width;
        let row = (y - self.origin_y) / self.pixel_height;
        (col, row)
    }

    /// Cell size (assumes square pixels)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` for a raster of the
    /// given dimensions
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.corner_to_geo(0.0, 0.0);
        let (x1, y1) = self.corner_to_geo(cols as f64, rows as f64);
        (x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_pixel_to_geo_roundtrip() {
        let gt = GeoTransform::new(100.0, 200.0, 10.0, -10.0);

        let (x, y) = gt.pixel_to_geo(5, 10);
        let (col, row) = gt.geo_to_pixel(x, y);

        assert_relative_eq!(col, 5.5, epsilon = 1e-10);
        assert_relative_eq!(row, 10.5, epsilon = 1e-10);
    }

    #[test]
    fn test_from_bounds() {
        let gt = GeoTransform::from_bounds(30.0, 50.0, 31.0, 51.0, 100, 200);

        assert_relative_eq!(gt.origin_x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(gt.origin_y, 51.0, epsilon = 1e-12);
        assert_relative_eq!(gt.pixel_width, 0.01, epsilon = 1e-12);
        assert_relative_eq!(gt.pixel_height, -0.005, epsilon = 1e-12);

        let (min_x, min_y, max_x, max_y) = gt.bounds(100, 200);
        assert_relative_eq!(min_x, 30.0, epsilon = 1e-12);
        assert_relative_eq!(min_y, 50.0, epsilon = 1e-12);
        assert_relative_eq!(max_x, 31.0, epsilon = 1e-12);
        assert_relative_eq!(max_y, 51.0, epsilon = 1e-12);
    }

    #[test]
    fn test_corner_to_geo() {
        let gt = GeoTransform::new(10.0, 20.0, 2.0, -1.0);
        let (x, y) = gt.corner_to_geo(3.0, 4.0);
        assert_relative_eq!(x, 16.0, epsilon = 1e-12);
        assert_relative_eq!(y, 16.0, epsilon = 1e-12);
    }
}
