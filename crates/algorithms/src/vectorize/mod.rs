//! Zone raster vectorization

mod trace;
mod zones;

pub use trace::extract_zone_polygons;
pub use zones::{dissolve, vectorize_zones, zone_statistics, ZoneStats, ZoneVectorization};
