//! Zone export capability
//!
//! Vector serialization is modeled as a capability interface with one
//! implementation chosen when the pipeline is constructed. Deployments
//! without vector output configure [`NoExporter`] and get a clear
//! "capability unavailable" failure instead of a silent degradation.

mod archive;
mod geojson_io;
mod shapefile;

pub use geojson_io::write_geojson;

use agrozone_core::vector::FeatureCollection;
use agrozone_core::{Crs, Error, Result};
use std::path::{Path, PathBuf};

/// File artifacts of one zone export, all sharing one export id.
#[derive(Debug, Clone)]
pub struct ZoneArtifacts {
    pub export_id: String,
    /// `zones_<id>.geojson`
    pub geojson_path: PathBuf,
    /// `zones_<id>.zip` bundling the shapefile sidecars
    pub archive_path: PathBuf,
}

/// Serializes dissolved zone features to downloadable vector files.
pub trait ZoneExporter: Send + Sync {
    /// Write all export artifacts for one zoning into `out_dir`, using
    /// `export_id` in every file name.
    fn export(
        &self,
        features: &FeatureCollection,
        crs: &Crs,
        out_dir: &Path,
        export_id: &str,
    ) -> Result<ZoneArtifacts>;
}

/// The default exporter: GeoJSON plus a zipped ESRI shapefile.
#[derive(Debug, Default)]
pub struct VectorFileExporter;

impl ZoneExporter for VectorFileExporter {
    fn export(
        &self,
        features: &FeatureCollection,
        crs: &Crs,
        out_dir: &Path,
        export_id: &str,
    ) -> Result<ZoneArtifacts> {
        let stem = format!("zones_{}", export_id);

        let geojson_path = out_dir.join(format!("{}.geojson", stem));
        geojson_io::write_geojson(features, &geojson_path)?;

        let archive_path = out_dir.join(format!("{}.zip", stem));
        let bundle = shapefile::write_shapefile(features, crs, out_dir, &stem)
            .and_then(|parts| archive::zip_files(&parts, &archive_path));
        if let Err(e) = bundle {
            // A failed bundle must not leave the geojson behind as if the
            // export had succeeded
            let _ = std::fs::remove_file(&geojson_path);
            return Err(e);
        }

        tracing::info!(
            geojson = %geojson_path.display(),
            archive = %archive_path.display(),
            "exported zone vectors"
        );

        Ok(ZoneArtifacts {
            export_id: export_id.to_string(),
            geojson_path,
            archive_path,
        })
    }
}

/// Stand-in for deployments without vector output support.
#[derive(Debug, Default)]
pub struct NoExporter;

impl ZoneExporter for NoExporter {
    fn export(
        &self,
        _features: &FeatureCollection,
        _crs: &Crs,
        _out_dir: &Path,
        _export_id: &str,
    ) -> Result<ZoneArtifacts> {
        Err(Error::CapabilityUnavailable("zone vector export"))
    }
}
