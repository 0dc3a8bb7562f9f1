//! Native ESRI shapefile writing
//!
//! Writes the legacy multi-file vector format (.shp/.shx/.dbf/.prj)
//! directly, without a GIS library: polygon geometry records, the fixed
//! attribute table used by zone features, and the CRS sidecar when WKT
//! is available. Exterior rings are written clockwise and holes
//! counter-clockwise as the format requires.

use agrozone_core::vector::{AttributeValue, Feature, FeatureCollection};
use agrozone_core::{Crs, Error, Result};
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use geo::Winding;
use geo_types::{Coord, Geometry, LineString, Polygon};
use std::io::Write;
use std::path::{Path, PathBuf};

const SHAPEFILE_MAGIC: i32 = 9994;
const SHAPEFILE_VERSION: i32 = 1000;
const SHAPE_TYPE_POLYGON: i32 = 5;

/// Attribute columns of a zone shapefile. dBase limits names to 10
/// characters.
const FIELDS: &[DbfField] = &[
    DbfField { name: "zone_id", kind: b'N', length: 9, decimals: 0 },
    DbfField { name: "mean_index", kind: b'N', length: 19, decimals: 11 },
    DbfField { name: "pixels", kind: b'N', length: 9, decimals: 0 },
    DbfField { name: "label", kind: b'C', length: 32, decimals: 0 },
];

struct DbfField {
    name: &'static str,
    kind: u8,
    length: u8,
    decimals: u8,
}

/// Write `<stem>.shp`, `<stem>.shx`, `<stem>.dbf` and, when the CRS has
/// a WKT form, `<stem>.prj` into `out_dir`. Returns the written paths.
pub fn write_shapefile(
    features: &FeatureCollection,
    crs: &Crs,
    out_dir: &Path,
    stem: &str,
) -> Result<Vec<PathBuf>> {
    let shapes: Vec<ShapeRecord> = features.iter().map(ShapeRecord::from_feature).collect::<Result<_>>()?;

    let mut paths = Vec::new();

    let shp_path = out_dir.join(format!("{}.shp", stem));
    let shx_path = out_dir.join(format!("{}.shx", stem));
    std::fs::write(&shp_path, encode_shp(&shapes)?)?;
    std::fs::write(&shx_path, encode_shx(&shapes)?)?;
    paths.push(shp_path);
    paths.push(shx_path);

    let dbf_path = out_dir.join(format!("{}.dbf", stem));
    std::fs::write(&dbf_path, encode_dbf(features)?)?;
    paths.push(dbf_path);

    if let Some(wkt) = crs.wkt() {
        let prj_path = out_dir.join(format!("{}.prj", stem));
        std::fs::write(&prj_path, wkt)?;
        paths.push(prj_path);
    }

    Ok(paths)
}

/// One polygon record: rings flattened to parts + points
struct ShapeRecord {
    parts: Vec<i32>,
    points: Vec<Coord<f64>>,
    bbox: [f64; 4],
}

impl ShapeRecord {
    fn from_feature(feature: &Feature) -> Result<Self> {
        let polygons: Vec<&Polygon<f64>> = match &feature.geometry {
            Some(Geometry::MultiPolygon(mp)) => mp.0.iter().collect(),
            Some(Geometry::Polygon(p)) => vec![p],
            _ => {
                return Err(Error::Export(format!(
                    "shapefile export supports polygon features only (feature id {:?})",
                    feature.id
                )))
            }
        };

        let mut parts = Vec::new();
        let mut points: Vec<Coord<f64>> = Vec::new();

        for polygon in polygons {
            let mut exterior = polygon.exterior().clone();
            exterior.make_cw_winding();
            push_ring(&mut parts, &mut points, &exterior);

            for hole in polygon.interiors() {
                let mut hole = hole.clone();
                hole.make_ccw_winding();
                push_ring(&mut parts, &mut points, &hole);
            }
        }

        if points.is_empty() {
            return Err(Error::Export("empty zone geometry".to_string()));
        }

        let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
        for p in &points {
            bbox[0] = bbox[0].min(p.x);
            bbox[1] = bbox[1].min(p.y);
            bbox[2] = bbox[2].max(p.x);
            bbox[3] = bbox[3].max(p.y);
        }

        Ok(Self { parts, points, bbox })
    }

    /// Record content length in bytes (without the record header)
    fn content_bytes(&self) -> usize {
        44 + 4 * self.parts.len() + 16 * self.points.len()
    }
}

fn push_ring(parts: &mut Vec<i32>, points: &mut Vec<Coord<f64>>, ring: &LineString<f64>) {
    parts.push(points.len() as i32);
    points.extend(ring.0.iter().copied());
}

fn file_bbox(shapes: &[ShapeRecord]) -> [f64; 4] {
    let mut bbox = [0.0, 0.0, 0.0, 0.0];
    if let Some(first) = shapes.first() {
        bbox = first.bbox;
    }
    for s in shapes {
        bbox[0] = bbox[0].min(s.bbox[0]);
        bbox[1] = bbox[1].min(s.bbox[1]);
        bbox[2] = bbox[2].max(s.bbox[2]);
        bbox[3] = bbox[3].max(s.bbox[3]);
    }
    bbox
}

fn write_main_header(buf: &mut Vec<u8>, file_words: i32, bbox: [f64; 4]) -> Result<()> {
    buf.write_i32::<BigEndian>(SHAPEFILE_MAGIC)?;
    for _ in 0..5 {
        buf.write_i32::<BigEndian>(0)?;
    }
    buf.write_i32::<BigEndian>(file_words)?;
    buf.write_i32::<LittleEndian>(SHAPEFILE_VERSION)?;
    buf.write_i32::<LittleEndian>(SHAPE_TYPE_POLYGON)?;
    for v in bbox {
        buf.write_f64::<LittleEndian>(v)?;
    }
    // Z and M ranges, unused for 2-D polygons
    for _ in 0..4 {
        buf.write_f64::<LittleEndian>(0.0)?;
    }
    Ok(())
}

fn encode_shp(shapes: &[ShapeRecord]) -> Result<Vec<u8>> {
    let total_bytes: usize =
        100 + shapes.iter().map(|s| 8 + s.content_bytes()).sum::<usize>();

    let mut buf = Vec::with_capacity(total_bytes);
    write_main_header(&mut buf, (total_bytes / 2) as i32, file_bbox(shapes))?;

    for (i, shape) in shapes.iter().enumerate() {
        buf.write_i32::<BigEndian>(i as i32 + 1)?;
        buf.write_i32::<BigEndian>((shape.content_bytes() / 2) as i32)?;

        buf.write_i32::<LittleEndian>(SHAPE_TYPE_POLYGON)?;
        for v in shape.bbox {
            buf.write_f64::<LittleEndian>(v)?;
        }
        buf.write_i32::<LittleEndian>(shape.parts.len() as i32)?;
        buf.write_i32::<LittleEndian>(shape.points.len() as i32)?;
        for &part in &shape.parts {
            buf.write_i32::<LittleEndian>(part)?;
        }
        for p in &shape.points {
            buf.write_f64::<LittleEndian>(p.x)?;
            buf.write_f64::<LittleEndian>(p.y)?;
        }
    }

    Ok(buf)
}

fn encode_shx(shapes: &[ShapeRecord]) -> Result<Vec<u8>> {
    let total_bytes = 100 + 8 * shapes.len();

    let mut buf = Vec::with_capacity(total_bytes);
    write_main_header(&mut buf, (total_bytes / 2) as i32, file_bbox(shapes))?;

    let mut offset_bytes = 100usize;
    for shape in shapes {
        buf.write_i32::<BigEndian>((offset_bytes / 2) as i32)?;
        buf.write_i32::<BigEndian>((shape.content_bytes() / 2) as i32)?;
        offset_bytes += 8 + shape.content_bytes();
    }

    Ok(buf)
}

fn encode_dbf(features: &FeatureCollection) -> Result<Vec<u8>> {
    let record_size: usize = 1 + FIELDS.iter().map(|f| f.length as usize).sum::<usize>();
    let header_size = 32 + 32 * FIELDS.len() + 1;

    let mut buf = Vec::with_capacity(header_size + record_size * features.len() + 1);

    buf.push(0x03); // dBase III, no memo
    buf.extend_from_slice(&[125, 1, 1]); // last-update stamp
    buf.write_u32::<LittleEndian>(features.len() as u32)?;
    buf.write_u16::<LittleEndian>(header_size as u16)?;
    buf.write_u16::<LittleEndian>(record_size as u16)?;
    buf.extend_from_slice(&[0u8; 20]);

    for field in FIELDS {
        let mut name = [0u8; 11];
        name[..field.name.len()].copy_from_slice(field.name.as_bytes());
        buf.extend_from_slice(&name);
        buf.push(field.kind);
        buf.extend_from_slice(&[0u8; 4]);
        buf.push(field.length);
        buf.push(field.decimals);
        buf.extend_from_slice(&[0u8; 14]);
    }
    buf.push(0x0D);

    for feature in features.iter() {
        buf.push(b' '); // not deleted
        write_numeric(&mut buf, property_i64(feature, "zone_id"), FIELDS[0].length)?;
        write_decimal(
            &mut buf,
            property_f64(feature, "mean_index"),
            FIELDS[1].length,
            FIELDS[1].decimals,
        )?;
        write_numeric(&mut buf, property_i64(feature, "pixel_count"), FIELDS[2].length)?;
        write_text(&mut buf, &property_string(feature, "label"), FIELDS[3].length)?;
    }
    buf.push(0x1A);

    Ok(buf)
}

fn property_i64(feature: &Feature, key: &str) -> i64 {
    match feature.get_property(key) {
        Some(AttributeValue::Int(v)) => *v,
        _ => 0,
    }
}

fn property_f64(feature: &Feature, key: &str) -> f64 {
    match feature.get_property(key) {
        Some(AttributeValue::Float(v)) => *v,
        Some(AttributeValue::Int(v)) => *v as f64,
        _ => 0.0,
    }
}

fn property_string(feature: &Feature, key: &str) -> String {
    match feature.get_property(key) {
        Some(AttributeValue::String(v)) => v.clone(),
        _ => String::new(),
    }
}

fn write_numeric(buf: &mut Vec<u8>, value: i64, length: u8) -> Result<()> {
    let text = format!("{:>width$}", value, width = length as usize);
    write_fixed(buf, &text, length)
}

fn write_decimal(buf: &mut Vec<u8>, value: f64, length: u8, decimals: u8) -> Result<()> {
    let text = format!(
        "{:>width$.prec$}",
        value,
        width = length as usize,
        prec = decimals as usize
    );
    write_fixed(buf, &text, length)
}

fn write_text(buf: &mut Vec<u8>, value: &str, length: u8) -> Result<()> {
    let truncated: String = value.chars().take(length as usize).collect();
    let text = format!("{:<width$}", truncated, width = length as usize);
    write_fixed(buf, &text, length)
}

fn write_fixed(buf: &mut Vec<u8>, text: &str, length: u8) -> Result<()> {
    let bytes = text.as_bytes();
    if bytes.len() != length as usize {
        return Err(Error::Export(format!(
            "attribute value '{}' does not fit a {}-byte column",
            text, length
        )));
    }
    buf.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::ReadBytesExt;
    use geo_types::MultiPolygon;
    use std::io::Cursor;

    fn zone_feature(zone_id: i64) -> Feature {
        let poly = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (2.0, 0.0),
                (2.0, 2.0),
                (0.0, 2.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let mut f = Feature::new(Geometry::MultiPolygon(MultiPolygon::new(vec![poly])));
        f.set_property("zone_id", AttributeValue::Int(zone_id));
        f.set_property("mean_index", AttributeValue::Float(0.42));
        f.set_property("pixel_count", AttributeValue::Int(16));
        f.set_property("label", AttributeValue::String("medium".to_string()));
        f
    }

    fn collection() -> FeatureCollection {
        let mut fc = FeatureCollection::new();
        fc.push(zone_feature(1));
        fc.push(zone_feature(2));
        fc
    }

    #[test]
    fn test_writes_all_parts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_shapefile(&collection(), &Crs::wgs84(), dir.path(), "zones_t").unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["zones_t.shp", "zones_t.shx", "zones_t.dbf", "zones_t.prj"]
        );
        for p in &paths {
            assert!(p.exists());
        }
    }

    #[test]
    fn test_prj_skipped_without_wkt() {
        let dir = tempfile::tempdir().unwrap();
        let crs = Crs::from_epsg(32636); // no built-in WKT
        let paths = write_shapefile(&collection(), &crs, dir.path(), "zones_t").unwrap();
        assert_eq!(paths.len(), 3);
    }

    #[test]
    fn test_shp_header() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(&collection(), &Crs::wgs84(), dir.path(), "zones_t").unwrap();

        let bytes = std::fs::read(dir.path().join("zones_t.shp")).unwrap();
        let mut cursor = Cursor::new(&bytes);

        assert_eq!(cursor.read_i32::<BigEndian>().unwrap(), SHAPEFILE_MAGIC);
        cursor.set_position(24);
        let file_words = cursor.read_i32::<BigEndian>().unwrap();
        assert_eq!(file_words as usize * 2, bytes.len());
        assert_eq!(cursor.read_i32::<LittleEndian>().unwrap(), SHAPEFILE_VERSION);
        assert_eq!(cursor.read_i32::<LittleEndian>().unwrap(), SHAPE_TYPE_POLYGON);

        // bbox covers the 2x2 square
        assert_eq!(cursor.read_f64::<LittleEndian>().unwrap(), 0.0);
        assert_eq!(cursor.read_f64::<LittleEndian>().unwrap(), 0.0);
        assert_eq!(cursor.read_f64::<LittleEndian>().unwrap(), 2.0);
        assert_eq!(cursor.read_f64::<LittleEndian>().unwrap(), 2.0);
    }

    #[test]
    fn test_exterior_ring_is_clockwise() {
        let dir = tempfile::tempdir().unwrap();
        write_shapefile(&collection(), &Crs::wgs84(), dir.path(), "zones_t").unwrap();

        let bytes = std::fs::read(dir.path().join("zones_t.shp")).unwrap();
        let mut cursor = Cursor::new(&bytes);
        // First record content: skip 100-byte header + 8-byte record
        // header + type + bbox + counts + one part index
        cursor.set_position(100 + 8 + 4 + 32);
        let num_parts = cursor.read_i32::<LittleEndian>().unwrap();
        let num_points = cursor.read_i32::<LittleEndian>().unwrap();
        assert_eq!(num_parts, 1);
        assert_eq!(num_points, 5);
        cursor.set_position(cursor.position() + 4);

        let mut ring = Vec::new();
        for _ in 0..num_points {
            let x = cursor.read_f64::<LittleEndian>().unwrap();
            let y = cursor.read_f64::<LittleEndian>().unwrap();
            ring.push((x, y));
        }

        // Shoelace: clockwise rings have negative signed area
        let mut area = 0.0;
        for i in 0..ring.len() - 1 {
            area += ring[i].0 * ring[i + 1].1 - ring[i + 1].0 * ring[i].1;
        }
        assert!(area < 0.0, "exterior ring must be clockwise, area {}", area);
    }

    #[test]
    fn test_dbf_layout() {
        let fc = collection();
        let bytes = encode_dbf(&fc).unwrap();

        assert_eq!(bytes[0], 0x03);
        let n_records = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(n_records, 2);

        let header_size = u16::from_le_bytes(bytes[8..10].try_into().unwrap()) as usize;
        let record_size = u16::from_le_bytes(bytes[10..12].try_into().unwrap()) as usize;
        assert_eq!(header_size, 32 + 32 * 4 + 1);
        assert_eq!(record_size, 1 + 9 + 19 + 9 + 32);
        assert_eq!(bytes.len(), header_size + 2 * record_size + 1);
        assert_eq!(*bytes.last().unwrap(), 0x1A);

        // First record: deletion flag then right-justified zone id
        let record = &bytes[header_size..header_size + record_size];
        assert_eq!(record[0], b' ');
        let zone_id = std::str::from_utf8(&record[1..10]).unwrap();
        assert_eq!(zone_id.trim(), "1");
        let label = std::str::from_utf8(&record[1 + 9 + 19 + 9..]).unwrap();
        assert_eq!(label.trim_end(), "medium");
    }

    #[test]
    fn test_non_polygon_geometry_rejected() {
        let mut fc = FeatureCollection::new();
        fc.push(Feature::new(Geometry::Point(geo_types::Point::new(0.0, 0.0))));

        let dir = tempfile::tempdir().unwrap();
        let result = write_shapefile(&fc, &Crs::wgs84(), dir.path(), "zones_t");
        assert!(matches!(result, Err(Error::Export(_))));
    }
}
