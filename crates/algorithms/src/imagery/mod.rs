//! Multispectral imagery analysis: spectral indices and cloud masking

mod cloud_mask;
mod indices;

pub use cloud_mask::{apply_cloud_mask, resample_nearest, SceneClass};
pub use indices::{evi, nbr, ndsi, ndvi, psri};

use agrozone_core::raster::Raster;
use agrozone_core::{Error, Result};

/// The vegetation indices the pipeline can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndexKind {
    /// Normalized Difference Vegetation Index
    Ndvi,
    /// Enhanced Vegetation Index
    Evi,
    /// Plant Senescence Reflectance Index
    Psri,
    /// Normalized Burn Ratio
    Nbr,
    /// Normalized Difference Snow Index
    Ndsi,
}

impl IndexKind {
    /// All supported indices
    pub const ALL: &'static [IndexKind] = &[
        IndexKind::Ndvi,
        IndexKind::Evi,
        IndexKind::Psri,
        IndexKind::Nbr,
        IndexKind::Ndsi,
    ];

    /// Canonical short name
    pub fn name(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "NDVI",
            IndexKind::Evi => "EVI",
            IndexKind::Psri => "PSRI",
            IndexKind::Nbr => "NBR",
            IndexKind::Ndsi => "NDSI",
        }
    }

    /// Band formula, for reports and logs
    pub fn formula(&self) -> &'static str {
        match self {
            IndexKind::Ndvi => "(NIR - RED) / (NIR + RED)",
            IndexKind::Evi => "2.5 * (NIR - RED) / (NIR + 6*RED - 7.5*BLUE + 1)",
            IndexKind::Psri => "(RED - GREEN) / NIR",
            IndexKind::Nbr => "(NIR - SWIR2) / (NIR + SWIR2)",
            IndexKind::Ndsi => "(GREEN - SWIR1) / (GREEN + SWIR1)",
        }
    }

    /// Nominal value range, used for colormap normalization. PSRI is the
    /// one index with an asymmetric natural range.
    pub fn value_range(&self) -> (f64, f64) {
        match self {
            IndexKind::Psri => (-0.2, 0.8),
            _ => (-1.0, 1.0),
        }
    }

    /// Parse a short name like "NDVI" (case-insensitive)
    pub fn from_name(name: &str) -> Option<IndexKind> {
        IndexKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The co-registered band rasters for one analysis request.
///
/// Red and NIR are always required (NDVI is always computed); the other
/// bands are only needed by the indices that reference them. All present
/// bands must share shape and geotransform.
#[derive(Debug, Clone)]
pub struct BandSet {
    pub red: Raster<f32>,
    pub nir: Raster<f32>,
    pub green: Option<Raster<f32>>,
    pub blue: Option<Raster<f32>>,
    pub swir1: Option<Raster<f32>>,
    pub swir2: Option<Raster<f32>>,
}

impl BandSet {
    /// Create a band set with only the mandatory red and NIR bands
    pub fn new(red: Raster<f32>, nir: Raster<f32>) -> Self {
        Self {
            red,
            nir,
            green: None,
            blue: None,
            swir1: None,
            swir2: None,
        }
    }

    fn require<'a>(
        &self,
        band: &'a Option<Raster<f32>>,
        band_name: &str,
        index: IndexKind,
    ) -> Result<&'a Raster<f32>> {
        band.as_ref().ok_or_else(|| Error::InvalidParameter {
            name: "bands",
            value: index.name().to_string(),
            reason: format!("{} requires the {} band", index.name(), band_name),
        })
    }
}

/// Compute one index from a band set, validating band availability.
pub fn compute_index(bands: &BandSet, kind: IndexKind) -> Result<Raster<f32>> {
    match kind {
        IndexKind::Ndvi => ndvi(&bands.red, &bands.nir),
        IndexKind::Evi => {
            let blue = bands.require(&bands.blue, "blue", kind)?;
            evi(&bands.red, &bands.nir, blue)
        }
        IndexKind::Psri => {
            let green = bands.require(&bands.green, "green", kind)?;
            psri(&bands.red, green, &bands.nir)
        }
        IndexKind::Nbr => {
            let swir2 = bands.require(&bands.swir2, "SWIR2", kind)?;
            nbr(&bands.nir, swir2)
        }
        IndexKind::Ndsi => {
            let green = bands.require(&bands.green, "green", kind)?;
            let swir1 = bands.require(&bands.swir1, "SWIR1", kind)?;
            ndsi(green, swir1)
        }
    }
}
