//! Scene-classification cloud masking
//!
//! Invalidates index pixels whose scene class marks them as unreliable
//! (clouds, shadows, saturated or missing data). The classification
//! raster is often delivered at a coarser resolution than the bands and
//! is resampled to the index grid with nearest-neighbor lookup; category
//! codes are not numerically interpolable, so no smoothing is ever
//! applied.

use agrozone_core::raster::Raster;
use agrozone_core::{Error, Result};

/// Sentinel-2 L2A scene classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SceneClass {
    NoData = 0,
    Saturated = 1,
    DarkArea = 2,
    CloudShadow = 3,
    Vegetation = 4,
    NotVegetated = 5,
    Water = 6,
    Unclassified = 7,
    CloudMediumProbability = 8,
    CloudHighProbability = 9,
    ThinCirrus = 10,
    SnowIce = 11,
}

impl SceneClass {
    /// Decode a raw category code
    pub fn from_code(code: u8) -> Option<SceneClass> {
        use SceneClass::*;
        match code {
            0 => Some(NoData),
            1 => Some(Saturated),
            2 => Some(DarkArea),
            3 => Some(CloudShadow),
            4 => Some(Vegetation),
            5 => Some(NotVegetated),
            6 => Some(Water),
            7 => Some(Unclassified),
            8 => Some(CloudMediumProbability),
            9 => Some(CloudHighProbability),
            10 => Some(ThinCirrus),
            11 => Some(SnowIce),
            _ => None,
        }
    }

    /// Whether pixels of this class carry usable surface reflectance.
    ///
    /// Valid: vegetation, not-vegetated, water, unclassified, snow/ice.
    /// Everything else is atmospheric contamination or sensor artefact.
    pub fn is_valid_surface(self) -> bool {
        matches!(
            self,
            SceneClass::Vegetation
                | SceneClass::NotVegetated
                | SceneClass::Water
                | SceneClass::Unclassified
                | SceneClass::SnowIce
        )
    }
}

/// Whether a raw code is a valid surface observation. Unknown codes are
/// treated as masked.
fn code_is_valid(code: u8) -> bool {
    SceneClass::from_code(code).is_some_and(SceneClass::is_valid_surface)
}

/// Resample a categorical raster to a new shape with nearest-neighbor
/// lookup.
///
/// Each output cell takes the source cell under it at per-axis zoom
/// `target_dim / source_dim`. Georeferencing is carried over from the
/// source.
pub fn resample_nearest(scene: &Raster<u8>, rows: usize, cols: usize) -> Raster<u8> {
    let (src_rows, src_cols) = scene.shape();
    let mut output = scene.with_same_meta::<u8>(rows, cols);

    for row in 0..rows {
        let src_row = (row * src_rows / rows).min(src_rows - 1);
        for col in 0..cols {
            let src_col = (col * src_cols / cols).min(src_cols - 1);
            let value = unsafe { scene.get_unchecked(src_row, src_col) };
            output.set(row, col, value).expect("output index in range");
        }
    }

    output.set_nodata(scene.nodata());
    output
}

/// Mask an index raster using a scene-classification raster.
///
/// Returns a copy of the index raster in which every pixel whose scene
/// class is not a valid surface observation is set to NaN. Valid pixels
/// are numerically unchanged. A classification raster with a different
/// shape is first resampled to the index grid.
pub fn apply_cloud_mask(index: &Raster<f32>, scene: &Raster<u8>) -> Result<Raster<f32>> {
    let (rows, cols) = index.shape();
    if rows == 0 || cols == 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let resampled;
    let scene = if scene.shape() != (rows, cols) {
        tracing::debug!(
            from = ?scene.shape(),
            to = ?(rows, cols),
            "resampling scene classification to index grid"
        );
        resampled = resample_nearest(scene, rows, cols);
        &resampled
    } else {
        scene
    };

    let mut output = index.clone();
    output.set_nodata(Some(f32::NAN));

    for row in 0..rows {
        for col in 0..cols {
            let code = unsafe { scene.get_unchecked(row, col) };
            if !code_is_valid(code) {
                output.set(row, col, f32::NAN).expect("index in range");
            }
        }
    }

    Ok(output)
}
