//! Request types for the analysis service

use agrozone_algorithms::imagery::{BandSet, IndexKind};
use agrozone_core::raster::Raster;
use agrozone_core::vector::FieldBoundary;
use std::path::PathBuf;

/// One field-analysis request.
///
/// All rasters are pre-read, co-registered and clipped to the field by
/// the imagery-acquisition collaborator; the pipeline never fetches
/// data itself.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Co-registered reflectance bands
    pub bands: BandSet,
    /// Scene-classification raster, same grid or coarser
    pub scene: Raster<u8>,
    /// Field boundary in longitude/latitude
    pub boundary: FieldBoundary,
    /// Imagery acquisition date, reported back in the statistics
    pub capture_date: String,
    /// Indices to compute in addition to NDVI
    pub extra_indices: Vec<IndexKind>,
    /// Request id; generated when absent
    pub analysis_id: Option<String>,
}

/// Where the zoning stage takes its masked index raster from.
#[derive(Debug, Clone)]
pub enum ZoneSource {
    /// An in-memory masked index raster
    Raster(Raster<f32>),
    /// The persisted index raster of a previous analysis
    Analysis(String),
    /// An index raster file on disk
    RasterFile(PathBuf),
}

/// One management-zoning request.
#[derive(Debug, Clone)]
pub struct ZoneRequest {
    pub source: ZoneSource,
    /// Requested zone count (1..=10, typically 3-5)
    pub zones: usize,
    /// Export id shared by all produced files; generated when absent
    pub export_id: Option<String>,
}
