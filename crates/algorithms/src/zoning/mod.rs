//! Management-zone clustering

mod kmeans;
mod labels;

pub use kmeans::{cluster_zones, ZoningParams, MAX_ZONES, ZONE_NODATA};
pub use labels::zone_label;
