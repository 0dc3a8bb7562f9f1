//! End-to-end service tests: analysis, zoning, and export artifacts.

use agrozone_algorithms::imagery::{BandSet, IndexKind, SceneClass};
use agrozone_core::raster::Raster;
use agrozone_core::vector::FieldBoundary;
use agrozone_core::{Crs, Error, GeoTransform};
use agrozone_pipeline::{
    AnalysisPipeline, AnalysisRequest, NoExporter, PipelineConfig, ZoneRequest, ZoneSource,
};
use std::fs::File;

/// An 8x8 field in four horizontal vigor stripes. Reflectance pairs are
/// chosen so NDVI comes out exactly 0.1, 0.4, 0.7 and 0.9 per stripe.
fn synthetic_request(analysis_id: &str) -> AnalysisRequest {
    let gt = GeoTransform::new(30.0, 50.0, 0.001, -0.001);
    let stripe_values = [(900.0, 1100.0), (600.0, 1400.0), (300.0, 1700.0), (100.0, 1900.0)];

    let mut red: Raster<f32> = Raster::new(8, 8);
    let mut nir: Raster<f32> = Raster::new(8, 8);
    let mut green: Raster<f32> = Raster::new(8, 8);
    for row in 0..8 {
        let (r, n) = stripe_values[row / 2];
        for col in 0..8 {
            red.set(row, col, r).unwrap();
            nir.set(row, col, n).unwrap();
            green.set(row, col, 500.0).unwrap();
        }
    }
    red.set_transform(gt);
    red.set_crs(Some(Crs::wgs84()));
    nir.set_transform(gt);
    green.set_transform(gt);

    let scene: Raster<u8> = Raster::filled(8, 8, SceneClass::Vegetation as u8);

    let mut bands = BandSet::new(red, nir);
    bands.green = Some(green);

    AnalysisRequest {
        bands,
        scene,
        boundary: FieldBoundary::from_ring(vec![
            (30.0, 49.992),
            (30.008, 49.992),
            (30.008, 50.0),
            (30.0, 50.0),
        ])
        .unwrap(),
        capture_date: "2025-06-15".to_string(),
        extra_indices: vec![IndexKind::Psri],
        analysis_id: Some(analysis_id.to_string()),
    }
}

#[test]
fn analyze_then_zone_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnalysisPipeline::new(PipelineConfig {
        results_dir: dir.path().to_path_buf(),
    });

    // Stage 1: analysis
    let analysis = pipeline.analyze_field(synthetic_request("field-a")).unwrap();

    assert_eq!(analysis.analysis_id, "field-a");
    assert_eq!(analysis.stats.valid_pixels_percent, 100.0);
    assert_eq!(analysis.stats.cloud_coverage_percent, 0.0);
    // Stripes: 0.1 and 0.4 below/inside the buckets, 0.7 and 0.9 high
    assert!((analysis.stats.zones_percent.low - 25.0).abs() < 0.1);
    assert!((analysis.stats.zones_percent.medium - 25.0).abs() < 0.1);
    assert!((analysis.stats.zones_percent.high - 50.0).abs() < 0.1);
    // (0.1 + 0.4 + 0.7 + 0.9) / 4
    assert!((analysis.stats.mean_index - 0.525).abs() < 1e-3);

    assert!(analysis.artifacts.index_raster.exists());
    assert!(analysis.artifacts.overlays["NDVI"].exists());
    assert!(analysis.artifacts.overlays["PSRI"].exists());
    assert!(analysis.stats.extra_indices.contains_key("PSRI"));

    // Stage 2: zoning from the persisted raster
    let zoning = pipeline
        .create_management_zones(ZoneRequest {
            source: ZoneSource::Analysis("field-a".to_string()),
            zones: 4,
            export_id: Some("e2e".to_string()),
        })
        .unwrap();

    assert_eq!(zoning.num_zones, 4);
    assert_eq!(zoning.features.len(), 4);
    assert_eq!(zoning.zone_statistics.len(), 4);

    let expected_means = [0.1, 0.4, 0.7, 0.9];
    for zone_id in 1..=4i16 {
        let stats = &zoning.zone_statistics[&zone_id];
        assert_eq!(stats.pixel_count, 16, "zone {} pixel count", zone_id);
        assert!(
            (stats.mean - expected_means[(zone_id - 1) as usize]).abs() < 1e-3,
            "zone {} mean {}",
            zone_id,
            stats.mean
        );
    }

    // Artifact naming: shared id, both formats
    assert_eq!(
        zoning.artifacts.geojson_path.file_name().unwrap(),
        "zones_e2e.geojson"
    );
    assert_eq!(
        zoning.artifacts.archive_path.file_name().unwrap(),
        "zones_e2e.zip"
    );
    assert!(zoning.artifacts.geojson_path.exists());
    assert!(zoning.artifacts.archive_path.exists());

    // The geojson parses back with the full attribute set
    let raw = std::fs::read_to_string(&zoning.artifacts.geojson_path).unwrap();
    let parsed: geojson::GeoJson = raw.parse().unwrap();
    let geojson::GeoJson::FeatureCollection(fc) = parsed else {
        panic!("expected FeatureCollection");
    };
    assert_eq!(fc.features.len(), 4);
    for feature in &fc.features {
        let props = feature.properties.as_ref().unwrap();
        for key in ["zone_id", "mean_index", "pixel_count", "label"] {
            assert!(props.contains_key(key), "missing property {}", key);
        }
    }

    // The archive bundles the four shapefile sidecars
    let archive =
        zip::ZipArchive::new(File::open(&zoning.artifacts.archive_path).unwrap()).unwrap();
    let mut names: Vec<_> = archive.file_names().map(String::from).collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "zones_e2e.dbf",
            "zones_e2e.prj",
            "zones_e2e.shp",
            "zones_e2e.shx"
        ]
    );
}

#[test]
fn zoning_accepts_in_memory_raster() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnalysisPipeline::new(PipelineConfig {
        results_dir: dir.path().to_path_buf(),
    });

    let mut index: Raster<f32> = Raster::new(4, 4);
    for row in 0..4 {
        for col in 0..4 {
            index.set(row, col, 0.2 + 0.2 * (row as f32 / 2.0)).unwrap();
        }
    }
    index.set_transform(GeoTransform::new(30.0, 50.0, 0.001, -0.001));

    let zoning = pipeline
        .create_management_zones(ZoneRequest {
            source: ZoneSource::Raster(index),
            zones: 2,
            export_id: None,
        })
        .unwrap();

    assert_eq!(zoning.features.len(), 2);
    // Generated ids are used in both artifact names
    let id = &zoning.artifacts.export_id;
    assert_eq!(
        zoning.artifacts.geojson_path.file_name().unwrap().to_string_lossy(),
        format!("zones_{}.geojson", id)
    );
}

#[test]
fn zoning_without_export_capability_fails_clearly() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnalysisPipeline::with_exporter(
        PipelineConfig {
            results_dir: dir.path().to_path_buf(),
        },
        Box::new(NoExporter),
    );

    let index: Raster<f32> = Raster::filled(4, 4, 0.5);
    let result = pipeline.create_management_zones(ZoneRequest {
        source: ZoneSource::Raster(index),
        zones: 3,
        export_id: None,
    });

    assert!(matches!(result, Err(Error::CapabilityUnavailable(_))));
}

#[test]
fn zoning_with_too_few_valid_pixels_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = AnalysisPipeline::new(PipelineConfig {
        results_dir: dir.path().to_path_buf(),
    });

    let mut index: Raster<f32> = Raster::filled(3, 3, f32::NAN);
    index.set(0, 0, 0.4).unwrap();
    index.set(0, 1, 0.6).unwrap();

    let result = pipeline.create_management_zones(ZoneRequest {
        source: ZoneSource::Raster(index),
        zones: 5,
        export_id: None,
    });

    assert!(matches!(result, Err(Error::InsufficientData(_))));
}
