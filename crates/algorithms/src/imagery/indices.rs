//! Spectral vegetation indices
//!
//! Elementwise band math over co-registered single-band rasters. All
//! kernels share the same degenerate-case convention: a cell whose
//! denominator is exactly zero yields `0.0`, not NaN and not an error.
//! NaN band values propagate to the output unchanged.

use crate::maybe_rayon::*;
use agrozone_core::raster::Raster;
use agrozone_core::{Error, Result};
use ndarray::Array2;

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - RED) / (NIR + RED)`, clipped to [-1, 1].
///
/// Interpretation at field scale:
/// - above 0.6: healthy, dense vegetation
/// - 0.3 to 0.6: moderate vegetation
/// - below 0.3: bare soil, stressed crop, water
pub fn ndvi(red: &Raster<f32>, nir: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(nir, red)?;
    map2(nir, red, |n, r| clip_unit(ratio(n - r, n + r)))
}

/// Enhanced Vegetation Index (Huete et al., 2002)
///
/// `EVI = 2.5 * (NIR - RED) / (NIR + 6*RED - 7.5*BLUE + 1)`, clipped to
/// [-1, 1]. More sensitive than NDVI in high-biomass canopies.
pub fn evi(red: &Raster<f32>, nir: &Raster<f32>, blue: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(nir, red)?;
    check_dimensions(nir, blue)?;
    map3(nir, red, blue, |n, r, b| {
        clip_unit(ratio(2.5 * (n - r), n + 6.0 * r - 7.5 * b + 1.0))
    })
}

/// Plant Senescence Reflectance Index
///
/// `PSRI = (RED - GREEN) / NIR`. Left unclipped: its natural range is
/// narrower and asymmetric. High values indicate senescence or stress.
pub fn psri(red: &Raster<f32>, green: &Raster<f32>, nir: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(red, green)?;
    check_dimensions(red, nir)?;
    map3(red, green, nir, |r, g, n| ratio(r - g, n))
}

/// Normalized Burn Ratio
///
/// `NBR = (NIR - SWIR2) / (NIR + SWIR2)`, clipped to [-1, 1]. Low values
/// indicate burned or fire-damaged vegetation.
pub fn nbr(nir: &Raster<f32>, swir2: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(nir, swir2)?;
    map2(nir, swir2, |n, s| clip_unit(ratio(n - s, n + s)))
}

/// Normalized Difference Snow Index
///
/// `NDSI = (GREEN - SWIR1) / (GREEN + SWIR1)`, clipped to [-1, 1].
/// Values above 0.4 indicate snow and ice.
pub fn ndsi(green: &Raster<f32>, swir1: &Raster<f32>) -> Result<Raster<f32>> {
    check_dimensions(green, swir1)?;
    map2(green, swir1, |g, s| clip_unit(ratio(g - s, g + s)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Division with the pipeline's degenerate-case convention: an exactly
/// zero denominator yields 0.0. Purely local; no float-error state is
/// touched.
#[inline]
fn ratio(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Clip to the normalized-difference range [-1, 1]; NaN passes through.
#[inline]
fn clip_unit(value: f32) -> f32 {
    value.clamp(-1.0, 1.0)
}

fn check_dimensions(a: &Raster<f32>, b: &Raster<f32>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::ShapeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

fn map2<F>(a: &Raster<f32>, b: &Raster<f32>, f: F) -> Result<Raster<f32>>
where
    F: Fn(f32, f32) -> f32 + Send + Sync,
{
    let (rows, cols) = a.shape();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f32; cols];
            for col in 0..cols {
                let av = unsafe { a.get_unchecked(row, col) };
                let bv = unsafe { b.get_unchecked(row, col) };
                row_data[col] = f(av, bv);
            }
            row_data
        })
        .collect();

    build_output(a, rows, cols, data)
}

fn map3<F>(a: &Raster<f32>, b: &Raster<f32>, c: &Raster<f32>, f: F) -> Result<Raster<f32>>
where
    F: Fn(f32, f32, f32) -> f32 + Send + Sync,
{
    let (rows, cols) = a.shape();

    let data: Vec<f32> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0.0f32; cols];
            for col in 0..cols {
                let av = unsafe { a.get_unchecked(row, col) };
                let bv = unsafe { b.get_unchecked(row, col) };
                let cv = unsafe { c.get_unchecked(row, col) };
                row_data[col] = f(av, bv, cv);
            }
            row_data
        })
        .collect();

    build_output(a, rows, cols, data)
}

fn build_output(
    template: &Raster<f32>,
    rows: usize,
    cols: usize,
    data: Vec<f32>,
) -> Result<Raster<f32>> {
    let mut output = template.with_same_meta::<f32>(rows, cols);
    output.set_nodata(Some(f32::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use agrozone_core::GeoTransform;

    fn make_band(rows: usize, cols: usize, value: f32) -> Raster<f32> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn test_ndvi_healthy_vegetation() {
        // Raw Sentinel-2 reflectance values for a healthy crop pixel
        let red = make_band(3, 3, 800.0);
        let nir = make_band(3, 3, 4000.0);

        let result = ndvi(&red, &nir).unwrap();
        let val = result.get(1, 1).unwrap();

        // (4000 - 800) / (4000 + 800) = 0.6667
        assert!((val - 0.6667).abs() < 1e-3, "expected ~0.667, got {}", val);
        assert!(val > 0.6, "healthy vegetation should exceed 0.6");
    }

    #[test]
    fn test_ndvi_bare_soil() {
        let red = make_band(3, 3, 2000.0);
        let nir = make_band(3, 3, 2500.0);

        let val = ndvi(&red, &nir).unwrap().get(0, 0).unwrap();
        assert!((val - 0.1111).abs() < 1e-3, "expected ~0.111, got {}", val);
        assert!(val < 0.3, "bare soil should stay below 0.3");
    }

    #[test]
    fn test_ndvi_water() {
        let red = make_band(3, 3, 1000.0);
        let nir = make_band(3, 3, 200.0);

        let val = ndvi(&red, &nir).unwrap().get(0, 0).unwrap();
        assert!((val + 0.6667).abs() < 1e-3, "expected ~-0.667, got {}", val);
    }

    #[test]
    fn test_ndvi_zero_denominator() {
        let red = make_band(2, 2, 0.0);
        let nir = make_band(2, 2, 0.0);

        let result = ndvi(&red, &nir).unwrap();
        for row in 0..2 {
            for col in 0..2 {
                assert_eq!(result.get(row, col).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn test_ndvi_range_is_clipped() {
        // NIR + RED can be tiny and negative after atmospheric correction;
        // the ratio may leave [-1, 1] before clipping
        let mut red = make_band(1, 3, 0.0);
        let mut nir = make_band(1, 3, 0.0);
        red.set(0, 0, -10.0).unwrap();
        nir.set(0, 0, 11.0).unwrap();
        red.set(0, 1, 10.0).unwrap();
        nir.set(0, 1, -11.0).unwrap();

        let result = ndvi(&red, &nir).unwrap();
        for col in 0..3 {
            let val = result.get(0, col).unwrap();
            assert!((-1.0..=1.0).contains(&val), "out of range: {}", val);
        }
    }

    #[test]
    fn test_ndvi_nan_propagates() {
        let mut red = make_band(2, 2, 800.0);
        let nir = make_band(2, 2, 4000.0);
        red.set(0, 1, f32::NAN).unwrap();

        let result = ndvi(&red, &nir).unwrap();
        assert!(result.get(0, 1).unwrap().is_nan());
        assert!(!result.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn test_evi() {
        let red = make_band(2, 2, 0.1);
        let nir = make_band(2, 2, 0.5);
        let blue = make_band(2, 2, 0.05);

        let val = evi(&red, &nir, &blue).unwrap().get(0, 0).unwrap();
        let expected = 2.5 * (0.5 - 0.1) / (0.5 + 6.0 * 0.1 - 7.5 * 0.05 + 1.0);
        assert!((val - expected).abs() < 1e-6, "expected {}, got {}", expected, val);
    }

    #[test]
    fn test_evi_zero_denominator() {
        // NIR + 6*RED - 7.5*BLUE + 1 == 0
        let red = make_band(1, 1, 0.0);
        let nir = make_band(1, 1, -1.0);
        let blue = make_band(1, 1, 0.0);

        assert_eq!(evi(&red, &nir, &blue).unwrap().get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_psri_unclipped() {
        // (RED - GREEN) / NIR can exceed 1; PSRI must not be clipped
        let red = make_band(1, 1, 30.0);
        let green = make_band(1, 1, 10.0);
        let nir = make_band(1, 1, 10.0);

        let val = psri(&red, &green, &nir).unwrap().get(0, 0).unwrap();
        assert!((val - 2.0).abs() < 1e-6, "expected 2.0, got {}", val);
    }

    #[test]
    fn test_psri_zero_nir() {
        let red = make_band(1, 1, 30.0);
        let green = make_band(1, 1, 10.0);
        let nir = make_band(1, 1, 0.0);

        assert_eq!(psri(&red, &green, &nir).unwrap().get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_nbr() {
        let nir = make_band(2, 2, 0.5);
        let swir2 = make_band(2, 2, 0.2);

        let val = nbr(&nir, &swir2).unwrap().get(0, 0).unwrap();
        let expected = (0.5 - 0.2) / (0.5 + 0.2);
        assert!((val - expected).abs() < 1e-6);
    }

    #[test]
    fn test_ndsi() {
        let green = make_band(2, 2, 0.6);
        let swir1 = make_band(2, 2, 0.2);

        let val = ndsi(&green, &swir1).unwrap().get(0, 0).unwrap();
        let expected = (0.6 - 0.2) / (0.6 + 0.2);
        assert!((val - expected).abs() < 1e-6);
        assert!(val > 0.4, "snow should exceed the 0.4 threshold");
    }

    #[test]
    fn test_dimension_mismatch() {
        let red = make_band(5, 5, 1.0);
        let nir = make_band(5, 10, 1.0);

        let result = ndvi(&red, &nir);
        assert!(matches!(result, Err(Error::ShapeMismatch { .. })));
    }
}
