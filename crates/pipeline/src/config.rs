//! Pipeline configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for an [`AnalysisPipeline`](crate::AnalysisPipeline).
///
/// The pipeline itself is stateless between requests; the configuration
/// only names where request-scoped artifacts are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory receiving per-request output files. Each analysis gets
    /// its own subdirectory keyed by the analysis id; zone exports are
    /// written at the top level keyed by their export id.
    pub results_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("results"),
        }
    }
}
