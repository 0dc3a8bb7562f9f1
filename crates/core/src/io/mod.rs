//! I/O for persisting single-band rasters between pipeline stages

mod geotiff;

pub use geotiff::{read_geotiff, write_geotiff};
