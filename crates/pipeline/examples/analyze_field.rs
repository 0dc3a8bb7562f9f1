//! Run the full pipeline against a synthetic field and print the report.
//!
//! ```sh
//! cargo run --example analyze_field
//! ```

use agrozone_algorithms::imagery::{BandSet, SceneClass};
use agrozone_core::raster::Raster;
use agrozone_core::vector::FieldBoundary;
use agrozone_core::{Crs, GeoTransform};
use agrozone_pipeline::{AnalysisPipeline, AnalysisRequest, PipelineConfig, ZoneRequest, ZoneSource};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // A 32x32 field: vigor rises from north to south, with a cloud bank
    // over the north-west corner.
    let size = 32usize;
    let gt = GeoTransform::new(30.50, 50.45, 0.0001, -0.0001);

    let mut red: Raster<f32> = Raster::new(size, size);
    let mut nir: Raster<f32> = Raster::new(size, size);
    let mut scene: Raster<u8> = Raster::filled(size, size, SceneClass::Vegetation as u8);
    for row in 0..size {
        let vigor = row as f32 / size as f32; // 0 north .. 1 south
        for col in 0..size {
            red.set(row, col, 2000.0 - 1500.0 * vigor)?;
            nir.set(row, col, 1500.0 + 2500.0 * vigor)?;
            if row < 8 && col < 8 {
                scene.set(row, col, SceneClass::CloudHighProbability as u8)?;
            }
        }
    }
    red.set_transform(gt);
    red.set_crs(Some(Crs::wgs84()));
    nir.set_transform(gt);

    let boundary = FieldBoundary::from_ring(vec![
        (30.50, 50.4468),
        (30.5032, 50.4468),
        (30.5032, 50.45),
        (30.50, 50.45),
    ])?;

    let pipeline = AnalysisPipeline::new(PipelineConfig::default());

    let analysis = pipeline.analyze_field(AnalysisRequest {
        bands: BandSet::new(red, nir),
        scene,
        boundary,
        capture_date: "2025-06-15".to_string(),
        extra_indices: Vec::new(),
        analysis_id: None,
    })?;

    println!("analysis id:      {}", analysis.analysis_id);
    println!("area:             {:.2} ha", analysis.stats.area_ha);
    println!("mean NDVI:        {:.3}", analysis.stats.mean_index);
    println!("cloud coverage:   {:.1} %", analysis.stats.cloud_coverage_percent);
    println!(
        "vigor split:      low {:.1} % / medium {:.1} % / high {:.1} %",
        analysis.stats.zones_percent.low,
        analysis.stats.zones_percent.medium,
        analysis.stats.zones_percent.high
    );

    let zoning = pipeline.create_management_zones(ZoneRequest {
        source: ZoneSource::Analysis(analysis.analysis_id.clone()),
        zones: 4,
        export_id: None,
    })?;

    println!("\nmanagement zones ({}):", zoning.num_zones);
    for (zone_id, stats) in &zoning.zone_statistics {
        println!(
            "  zone {}: mean {:.3}, {} px",
            zone_id, stats.mean, stats.pixel_count
        );
    }
    println!("\ngeojson: {}", zoning.artifacts.geojson_path.display());
    println!("archive: {}", zoning.artifacts.archive_path.display());

    Ok(())
}
