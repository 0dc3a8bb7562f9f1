//! Integration tests running the analysis stages together: band math,
//! masking, clustering, vectorization.

use agrozone_algorithms::imagery::{apply_cloud_mask, ndvi, SceneClass};
use agrozone_algorithms::statistics::field_statistics;
use agrozone_algorithms::vectorize::vectorize_zones;
use agrozone_algorithms::zoning::{cluster_zones, ZoningParams};
use agrozone_core::raster::Raster;
use agrozone_core::vector::{AttributeValue, FieldBoundary};
use agrozone_core::GeoTransform;
use geo::Area;

fn raster_from_values(rows: usize, cols: usize, values: &[f32]) -> Raster<f32> {
    let mut r: Raster<f32> = Raster::new(rows, cols);
    r.set_transform(GeoTransform::new(30.0, 50.0, 0.001, -0.001));
    for (i, v) in values.iter().enumerate() {
        r.set(i / cols, i % cols, *v).unwrap();
    }
    r
}

#[test]
fn four_value_bands_become_four_ordered_zones() {
    // Four horizontal stripes of ascending vigor, no masking
    let index = raster_from_values(
        4,
        4,
        &[
            0.1, 0.1, 0.1, 0.1, //
            0.4, 0.4, 0.4, 0.4, //
            0.7, 0.7, 0.7, 0.7, //
            0.9, 0.9, 0.9, 0.9,
        ],
    );

    let zones = cluster_zones(&index, &ZoningParams { zones: 4, ..Default::default() }).unwrap();
    let result = vectorize_zones(&zones, &index, 4).unwrap();

    assert_eq!(result.features.len(), 4);
    assert_eq!(result.statistics.len(), 4);

    let expected_means = [0.1, 0.4, 0.7, 0.9];
    for zone_id in 1..=4i16 {
        let stats = &result.statistics[&zone_id];
        assert_eq!(stats.pixel_count, 4, "zone {} pixel count", zone_id);
        let expected = expected_means[(zone_id - 1) as usize] as f64;
        assert!(
            (stats.mean - expected).abs() < 1e-5,
            "zone {} mean {} != {}",
            zone_id,
            stats.mean,
            expected
        );
    }

    // Ascending mean invariant
    for zone_id in 1..4i16 {
        assert!(result.statistics[&zone_id].mean <= result.statistics[&(zone_id + 1)].mean);
    }

    // Each stripe dissolves into one 4x1-pixel feature
    for feature in result.features.iter() {
        let Some(geo_types::Geometry::MultiPolygon(mp)) = &feature.geometry else {
            panic!("zone feature must be a MultiPolygon");
        };
        let cell_area = 0.001 * 0.001;
        assert!((mp.unsigned_area() - 4.0 * cell_area).abs() < 1e-9);
    }
}

#[test]
fn ndvi_mask_stats_cluster_roundtrip() {
    // Reflectance stripes: water, bare soil, healthy crop; last row clouded
    let mut red: Raster<f32> = Raster::new(3, 4);
    let mut nir: Raster<f32> = Raster::new(3, 4);
    let mut scl: Raster<u8> = Raster::new(3, 4);
    red.set_transform(GeoTransform::new(30.0, 50.0, 0.001, -0.001));
    nir.set_transform(GeoTransform::new(30.0, 50.0, 0.001, -0.001));

    for col in 0..4 {
        red.set(0, col, 1000.0).unwrap();
        nir.set(0, col, 200.0).unwrap(); // water-like, NDVI ~ -0.667
        red.set(1, col, 2000.0).unwrap();
        nir.set(1, col, 2500.0).unwrap(); // bare soil, NDVI ~ 0.111
        red.set(2, col, 800.0).unwrap();
        nir.set(2, col, 4000.0).unwrap(); // healthy, NDVI ~ 0.667

        scl.set(0, col, SceneClass::Water as u8).unwrap();
        scl.set(1, col, SceneClass::NotVegetated as u8).unwrap();
        scl.set(2, col, SceneClass::CloudHighProbability as u8).unwrap();
    }

    let raw = ndvi(&red, &nir).unwrap();
    assert!((raw.get(2, 0).unwrap() - 0.6667).abs() < 1e-3);

    let masked = apply_cloud_mask(&raw, &scl).unwrap();
    assert!(masked.get(2, 0).unwrap().is_nan(), "clouded row must be masked");
    assert!((masked.get(1, 0).unwrap() - 0.1111).abs() < 1e-3);

    let boundary =
        FieldBoundary::from_ring(vec![(30.0, 49.997), (30.004, 49.997), (30.004, 50.0), (30.0, 50.0)])
            .unwrap();
    let stats = field_statistics(&masked, &boundary, "2025-06-15").unwrap();

    // 4 of 12 pixels clouded
    assert!((stats.cloud_coverage_percent - 33.3).abs() < 0.1);
    assert!((stats.valid_pixels_percent - 66.7).abs() < 0.1);
    // All surviving pixels sit below 0.3
    assert!((stats.zones_percent.low - 100.0).abs() < 0.1);

    // Two vigor levels remain valid; cluster them
    let zones = cluster_zones(&masked, &ZoningParams { zones: 2, ..Default::default() }).unwrap();
    for col in 0..4 {
        assert_eq!(zones.get(0, col).unwrap(), 1, "water is the weakest zone");
        assert_eq!(zones.get(1, col).unwrap(), 2);
        assert_eq!(zones.get(2, col).unwrap(), agrozone_algorithms::zoning::ZONE_NODATA);
    }
}

#[test]
fn labels_follow_zone_count() {
    let index = raster_from_values(
        3,
        3,
        &[0.1, 0.1, 0.1, 0.5, 0.5, 0.5, 0.8, 0.8, 0.8],
    );

    let zones = cluster_zones(&index, &ZoningParams { zones: 3, ..Default::default() }).unwrap();
    let result = vectorize_zones(&zones, &index, 3).unwrap();

    let labels: Vec<_> = result
        .features
        .iter()
        .map(|f| f.get_property("label").cloned())
        .collect();

    assert_eq!(
        labels,
        vec![
            Some(AttributeValue::String("weak".to_string())),
            Some(AttributeValue::String("medium".to_string())),
            Some(AttributeValue::String("strong".to_string())),
        ]
    );
}
