//! The field-analysis service
//!
//! An explicit, caller-constructed pipeline instance: no global state,
//! no hidden singletons. Each method call is one request; concurrent
//! requests only share the immutable configuration and exporter.

use crate::config::PipelineConfig;
use crate::export::{VectorFileExporter, ZoneArtifacts, ZoneExporter};
use crate::request::{AnalysisRequest, ZoneRequest, ZoneSource};
use agrozone_algorithms::imagery::{apply_cloud_mask, compute_index, IndexKind};
use agrozone_algorithms::statistics::{field_statistics, summarize_index, FieldStats};
use agrozone_algorithms::vectorize::{vectorize_zones, ZoneStats};
use agrozone_algorithms::zoning::{cluster_zones, ZoningParams};
use agrozone_colormap::{write_png, ColorScheme, ColormapParams};
use agrozone_core::io::{read_geotiff, write_geotiff};
use agrozone_core::raster::Raster;
use agrozone_core::vector::FeatureCollection;
use agrozone_core::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use uuid::Uuid;

/// On-disk artifacts of one field analysis
#[derive(Debug, Clone)]
pub struct AnalysisArtifacts {
    /// Persisted masked index raster, consumed by the zoning stage
    pub index_raster: PathBuf,
    /// PNG map overlay per computed index, keyed by index name
    pub overlays: BTreeMap<String, PathBuf>,
}

/// Result of one field analysis
#[derive(Debug, Clone)]
pub struct FieldAnalysis {
    pub analysis_id: String,
    /// Quality-masked primary index raster
    pub index: Raster<f32>,
    pub stats: FieldStats,
    pub artifacts: AnalysisArtifacts,
}

/// Result of one management-zoning request
#[derive(Debug, Clone)]
pub struct ZoneAnalysis {
    pub num_zones: usize,
    /// One dissolved feature per zone, ascending zone id
    pub features: FeatureCollection,
    /// Per-zone statistics keyed by zone id
    pub zone_statistics: BTreeMap<i16, ZoneStats>,
    pub artifacts: ZoneArtifacts,
}

/// The analysis pipeline service.
///
/// Construct one per deployment (or per test) and share it freely; it
/// holds no mutable state. Rasters live in memory for the duration of a
/// request and results land in per-request paths, so concurrent requests
/// with distinct ids never collide.
pub struct AnalysisPipeline {
    config: PipelineConfig,
    exporter: Box<dyn ZoneExporter>,
}

impl AnalysisPipeline {
    /// Create a pipeline with the default vector-file exporter
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_exporter(config, Box::new(VectorFileExporter))
    }

    /// Create a pipeline with an explicit export capability
    pub fn with_exporter(config: PipelineConfig, exporter: Box<dyn ZoneExporter>) -> Self {
        Self { config, exporter }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the analysis stage: NDVI (plus requested extra indices),
    /// cloud masking, field statistics, and artifact persistence.
    pub fn analyze_field(&self, request: AnalysisRequest) -> Result<FieldAnalysis> {
        let analysis_id = request.analysis_id.clone().unwrap_or_else(new_id);
        let dir = self.config.results_dir.join(&analysis_id);
        fs::create_dir_all(&dir)?;

        tracing::info!(%analysis_id, "calculating NDVI");
        let raw = compute_index(&request.bands, IndexKind::Ndvi)?;

        tracing::info!(%analysis_id, "applying cloud mask");
        let masked = apply_cloud_mask(&raw, &request.scene)?;

        tracing::info!(%analysis_id, "calculating statistics");
        let mut stats = field_statistics(&masked, &request.boundary, &request.capture_date)?;

        let mut overlays = BTreeMap::new();
        overlays.insert(
            IndexKind::Ndvi.name().to_string(),
            write_overlay(&dir, IndexKind::Ndvi, &masked)?,
        );

        let mut extras = request.extra_indices.clone();
        extras.sort();
        extras.dedup();
        for kind in extras {
            if kind == IndexKind::Ndvi {
                continue;
            }
            tracing::info!(%analysis_id, index = kind.name(), "calculating extra index");
            let raster = compute_index(&request.bands, kind)?;
            let masked_extra = apply_cloud_mask(&raster, &request.scene)?;
            stats
                .extra_indices
                .insert(kind.name().to_string(), summarize_index(&masked_extra));
            overlays.insert(kind.name().to_string(), write_overlay(&dir, kind, &masked_extra)?);
        }

        let index_raster = dir.join("ndvi.tif");
        write_geotiff(&masked, &index_raster)?;

        Ok(FieldAnalysis {
            analysis_id,
            index: masked,
            stats,
            artifacts: AnalysisArtifacts {
                index_raster,
                overlays,
            },
        })
    }

    /// Run the zoning stage: cluster the masked index raster, vectorize
    /// the zones, and export the feature collection.
    pub fn create_management_zones(&self, request: ZoneRequest) -> Result<ZoneAnalysis> {
        let index = match request.source {
            ZoneSource::Raster(raster) => raster,
            ZoneSource::Analysis(analysis_id) => {
                let path = self
                    .config
                    .results_dir
                    .join(&analysis_id)
                    .join("ndvi.tif");
                tracing::info!(%analysis_id, path = %path.display(), "loading persisted index raster");
                read_geotiff(&path)?
            }
            ZoneSource::RasterFile(path) => read_geotiff(&path)?,
        };

        tracing::info!(zones = request.zones, "clustering management zones");
        let zone_raster = cluster_zones(
            &index,
            &ZoningParams {
                zones: request.zones,
                ..Default::default()
            },
        )?;

        let vectorization = vectorize_zones(&zone_raster, &index, request.zones)?;

        let export_id = request.export_id.unwrap_or_else(new_id);
        fs::create_dir_all(&self.config.results_dir)?;
        let crs = index.crs().cloned().unwrap_or_default();
        let artifacts = self.exporter.export(
            &vectorization.features,
            &crs,
            &self.config.results_dir,
            &export_id,
        )?;

        Ok(ZoneAnalysis {
            num_zones: request.zones,
            features: vectorization.features,
            zone_statistics: vectorization.statistics,
            artifacts,
        })
    }
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn write_overlay(dir: &std::path::Path, kind: IndexKind, raster: &Raster<f32>) -> Result<PathBuf> {
    let (min, max) = kind.value_range();
    let params = ColormapParams::with_range(scheme_for(kind), min, max);
    let path = dir.join(format!("{}.png", kind.name().to_ascii_lowercase()));
    write_png(raster, &params, &path)?;
    Ok(path)
}

fn scheme_for(kind: IndexKind) -> ColorScheme {
    match kind {
        IndexKind::Ndvi => ColorScheme::Ndvi,
        IndexKind::Evi => ColorScheme::Evi,
        IndexKind::Psri => ColorScheme::Psri,
        IndexKind::Nbr => ColorScheme::Nbr,
        IndexKind::Ndsi => ColorScheme::Ndsi,
    }
}
