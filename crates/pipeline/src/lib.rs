//! # Agrozone Pipeline
//!
//! The request-scoped service layer over the analysis algorithms:
//! takes pre-read band arrays and a field boundary, produces masked
//! index rasters, field statistics, and downloadable management-zone
//! vectors.
//!
//! ## Usage
//!
//! ```ignore
//! use agrozone_pipeline::{AnalysisPipeline, AnalysisRequest, PipelineConfig};
//!
//! let pipeline = AnalysisPipeline::new(PipelineConfig::default());
//! let analysis = pipeline.analyze_field(request)?;
//! println!("mean NDVI: {}", analysis.stats.mean_index);
//! ```
//!
//! The pipeline is synchronous and CPU-bound; run concurrent requests
//! on separate threads of the hosting service if needed. Instances hold
//! no mutable state.

pub mod config;
pub mod export;

mod request;
mod service;

pub use config::PipelineConfig;
pub use export::{NoExporter, VectorFileExporter, ZoneArtifacts, ZoneExporter};
pub use request::{AnalysisRequest, ZoneRequest, ZoneSource};
pub use service::{AnalysisArtifacts, AnalysisPipeline, FieldAnalysis, ZoneAnalysis};
