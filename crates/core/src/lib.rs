//! # Agrozone Core
//!
//! Core types and I/O for the agrozone field-analysis pipeline.
//!
//! This crate provides:
//! - `Raster<T>`: generic georeferenced raster grid
//! - `GeoTransform`: affine pixel-to-geographic mapping
//! - `Crs`: coordinate reference system handle
//! - `FieldBoundary` and vector feature types
//! - Native single-band GeoTIFF reading/writing

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};
pub use vector::{AttributeValue, Feature, FeatureCollection, FieldBoundary};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::vector::{Feature, FeatureCollection, FieldBoundary};
}
