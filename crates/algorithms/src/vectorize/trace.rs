//! Raster-to-polygon boundary tracing
//!
//! Extracts the regions of a zone-label raster sharing one id as
//! polygons. Boundary edges are collected along pixel sides with the
//! region interior on the left, then stitched into closed rings; at
//! nodes where two diagonal regions meet, the walk takes the leftmost
//! turn, which keeps 4-connected regions separate. Ring corners are
//! mapped to geographic coordinates through the raster's geotransform.

use agrozone_core::raster::Raster;
use geo_types::{Coord, LineString, Polygon};
use std::collections::HashMap;

/// Pixel corner as (col, row)
type Corner = (i64, i64);

/// Extract all regions holding `zone_id` as polygons in geographic
/// coordinates. Each 4-connected region yields one polygon; enclosed
/// areas of other zones become interior rings.
pub fn extract_zone_polygons(zones: &Raster<i16>, zone_id: i16) -> Vec<Polygon<f64>> {
    let rings = trace_rings(zones, zone_id);
    assemble_polygons(zones, rings)
}

/// Collect directed boundary edges and stitch them into closed pixel
/// rings. Exterior rings come back with negative signed area in pixel
/// coordinates (y grows downward), interior rings positive.
fn trace_rings(zones: &Raster<i16>, zone_id: i16) -> Vec<Vec<Corner>> {
    let (rows, cols) = zones.shape();
    let in_zone = |r: i64, c: i64| -> bool {
        if r < 0 || c < 0 || r as usize >= rows || c as usize >= cols {
            return false;
        }
        unsafe { zones.get_unchecked(r as usize, c as usize) == zone_id }
    };

    // Directed edges along pixel sides, zone interior on the left
    let mut edges: Vec<(Corner, Corner)> = Vec::new();
    for r in 0..rows as i64 {
        for c in 0..cols as i64 {
            if !in_zone(r, c) {
                continue;
            }
            if !in_zone(r - 1, c) {
                edges.push(((c + 1, r), (c, r))); // top side
            }
            if !in_zone(r + 1, c) {
                edges.push(((c, r + 1), (c + 1, r + 1))); // bottom side
            }
            if !in_zone(r, c - 1) {
                edges.push(((c, r), (c, r + 1))); // left side
            }
            if !in_zone(r, c + 1) {
                edges.push(((c + 1, r + 1), (c + 1, r))); // right side
            }
        }
    }

    let mut by_start: HashMap<Corner, Vec<usize>> = HashMap::new();
    for (i, &(start, _)) in edges.iter().enumerate() {
        by_start.entry(start).or_default().push(i);
    }

    let mut used = vec![false; edges.len()];
    let mut rings: Vec<Vec<Corner>> = Vec::new();

    for first in 0..edges.len() {
        if used[first] {
            continue;
        }
        used[first] = true;

        let (ring_start, mut current) = edges[first];
        let mut dir = direction(ring_start, current);
        let mut ring = vec![ring_start];

        while current != ring_start {
            ring.push(current);

            let next = by_start
                .get(&current)
                .and_then(|candidates| {
                    candidates
                        .iter()
                        .copied()
                        .filter(|&i| !used[i])
                        .min_by_key(|&i| turn_priority(dir, direction(edges[i].0, edges[i].1)))
                });

            let Some(next) = next else {
                // Every emitted edge belongs to exactly one closed ring,
                // so the walk always returns to its start.
                ring.clear();
                break;
            };

            used[next] = true;
            dir = direction(edges[next].0, edges[next].1);
            current = edges[next].1;
        }

        if ring.len() >= 4 {
            rings.push(ring);
        }
    }

    rings
}

/// Unit direction of an axis-aligned edge
fn direction(from: Corner, to: Corner) -> (i64, i64) {
    ((to.0 - from.0).signum(), (to.1 - from.1).signum())
}

/// Rank an outgoing direction relative to the incoming one: leftmost
/// turn first (pixel coordinates, row axis growing downward), then
/// straight, then right, then reverse.
fn turn_priority(dir: (i64, i64), out: (i64, i64)) -> i32 {
    let cross = dir.0 * out.1 - dir.1 * out.0;
    let dot = dir.0 * out.0 + dir.1 * out.1;
    if cross < 0 {
        0
    } else if cross == 0 && dot > 0 {
        1
    } else if cross > 0 {
        2
    } else {
        3
    }
}

/// Shoelace signed area of a pixel ring (not closed)
fn signed_area(ring: &[Corner]) -> f64 {
    let n = ring.len();
    let mut sum = 0i64;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        sum += x0 * y1 - x1 * y0;
    }
    sum as f64 / 2.0
}

/// Group exterior rings with the interior rings they enclose and map
/// pixel corners to geographic coordinates.
fn assemble_polygons(zones: &Raster<i16>, rings: Vec<Vec<Corner>>) -> Vec<Polygon<f64>> {
    let mut exteriors: Vec<Vec<Corner>> = Vec::new();
    let mut holes: Vec<Vec<Corner>> = Vec::new();

    for ring in rings {
        if signed_area(&ring) < 0.0 {
            exteriors.push(ring);
        } else {
            holes.push(ring);
        }
    }

    let mut hole_sets: Vec<Vec<Vec<Corner>>> = vec![Vec::new(); exteriors.len()];
    for hole in holes {
        let p = representative_point(&hole);
        if let Some(owner) = exteriors.iter().position(|ext| contains(ext, p)) {
            hole_sets[owner].push(hole);
        }
    }

    let transform = *zones.transform();
    let to_geo = |ring: &[Corner]| -> LineString<f64> {
        let mut coords: Vec<Coord<f64>> = ring
            .iter()
            .map(|&(c, r)| {
                let (x, y) = transform.corner_to_geo(c as f64, r as f64);
                Coord { x, y }
            })
            .collect();
        let first = coords[0];
        coords.push(first); // close the ring
        LineString::new(coords)
    };

    exteriors
        .iter()
        .zip(hole_sets)
        .map(|(ext, ext_holes)| {
            Polygon::new(to_geo(ext), ext_holes.iter().map(|h| to_geo(h)).collect())
        })
        .collect()
}

/// A point strictly inside the zone area bordered by this ring: the
/// midpoint of the first edge, nudged half a pixel toward the interior
/// (which lies on the left of every traced edge).
fn representative_point(ring: &[Corner]) -> (f64, f64) {
    let a = ring[0];
    let b = ring[1];
    let (dx, dy) = direction(a, b);
    let mid_x = (a.0 + b.0) as f64 / 2.0;
    let mid_y = (a.1 + b.1) as f64 / 2.0;
    // Left of direction (dx, dy) in pixel coordinates is (dy, -dx)
    (mid_x + dy as f64 * 0.5, mid_y - dx as f64 * 0.5)
}

/// Even-odd ray casting in pixel coordinates. The query points sit on
/// half-integer rows, so the horizontal ray never passes through a ring
/// vertex.
fn contains(ring: &[Corner], point: (f64, f64)) -> bool {
    let (px, py) = point;
    let n = ring.len();
    let mut inside = false;
    for i in 0..n {
        let (x0, y0) = ring[i];
        let (x1, y1) = ring[(i + 1) % n];
        let (x0, y0, x1, y1) = (x0 as f64, y0 as f64, x1 as f64, y1 as f64);
        if (y0 > py) != (y1 > py) {
            let x_cross = x0 + (py - y0) / (y1 - y0) * (x1 - x0);
            if px < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}
