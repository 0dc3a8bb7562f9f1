//! # Agrozone Algorithms
//!
//! The analysis stages of the field pipeline:
//!
//! - **imagery**: spectral vegetation indices and scene-classification
//!   cloud masking
//! - **statistics**: field-level summaries of a masked index raster
//! - **zoning**: k-means management-zone clustering with canonical
//!   low-to-high ordering, plus zone labels
//! - **vectorize**: zone raster to dissolved polygon features with
//!   per-zone statistics

pub mod imagery;
pub mod statistics;
pub mod vectorize;
pub mod zoning;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        apply_cloud_mask, compute_index, evi, nbr, ndsi, ndvi, psri, BandSet, IndexKind,
        SceneClass,
    };
    pub use crate::statistics::{field_statistics, FieldStats};
    pub use crate::vectorize::{vectorize_zones, ZoneStats, ZoneVectorization};
    pub use crate::zoning::{cluster_zones, zone_label, ZoningParams, ZONE_NODATA};
    pub use agrozone_core::prelude::*;
}
