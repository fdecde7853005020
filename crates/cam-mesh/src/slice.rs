//! Horizontal plane slicing.
//!
//! Intersects a mesh with the plane `z = height` and chains the resulting
//! segments into polylines. Waterline sampling uses the chained polylines as
//! a coarse outline of where the surface crosses the target height.
//!
//! # Example
//!
//! ```
//! use cam_mesh::{Mesh, Vertex};
//! use cam_mesh::slice::slice_at;
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(5.0, 10.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(5.0, 5.0, 10.0));
//! mesh.faces.push([0, 1, 3]);
//! mesh.faces.push([1, 2, 3]);
//! mesh.faces.push([2, 0, 3]);
//! mesh.faces.push([0, 2, 1]);
//!
//! let slice = slice_at(&mesh, 5.0);
//! assert_eq!(slice.segments.len(), 3);
//! assert_eq!(slice.contours.len(), 1);
//! ```

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::types::{Mesh, Rect, Triangle};

/// Endpoints closer than this are joined when chaining segments.
pub const CHAIN_TOLERANCE: f64 = 1e-6;

/// A plane section of a mesh at one height.
#[derive(Debug, Clone)]
pub struct ZSlice {
    /// Height of the cutting plane.
    pub z: f64,
    /// Raw triangle/plane intersection segments.
    pub segments: Vec<(Point3<f64>, Point3<f64>)>,
    /// Segments chained into polylines. Closed polylines repeat their first point.
    pub contours: Vec<Vec<Point3<f64>>>,
    /// XY bounds of all segments, or None if the plane misses the mesh.
    pub bounds: Option<Rect>,
}

impl ZSlice {
    /// Check whether the plane missed the mesh.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Slice the mesh at `z` and chain the segments into polylines.
pub fn slice_at(mesh: &Mesh, z: f64) -> ZSlice {
    let segments = slice_segments(mesh, z);
    let contours = chain_segments(&segments, CHAIN_TOLERANCE);

    let bounds = segments
        .iter()
        .map(|(a, b)| Rect::new(a.x.min(b.x), a.x.max(b.x), a.y.min(b.y), a.y.max(b.y)))
        .reduce(|a, b| a.union(&b));

    debug!(
        z,
        segments = segments.len(),
        contours = contours.len(),
        "Mesh sliced"
    );

    ZSlice {
        z,
        segments,
        contours,
        bounds,
    }
}

/// Intersect every triangle with the plane `z = height`.
///
/// Vertices lying exactly on the plane are treated as above it, so every
/// triangle yields either no segment or exactly one.
pub fn slice_segments(mesh: &Mesh, z: f64) -> Vec<(Point3<f64>, Point3<f64>)> {
    mesh.triangles()
        .filter_map(|tri| triangle_plane_segment(&tri, z))
        .collect()
}

/// Segment where a triangle crosses the plane `z = height`, if any.
pub fn triangle_plane_segment(tri: &Triangle, z: f64) -> Option<(Point3<f64>, Point3<f64>)> {
    let mut hits = [Point3::origin(); 2];
    let mut count = 0;

    for (a, b) in tri.edges() {
        if let Some(p) = plane_edge_intersection(z, a, b) {
            if count == 2 {
                return None;
            }
            hits[count] = p;
            count += 1;
        }
    }

    if count == 2 && (hits[0] - hits[1]).norm() > f64::EPSILON {
        Some((hits[0], hits[1]))
    } else {
        None
    }
}

fn plane_edge_intersection(z: f64, a: Point3<f64>, b: Point3<f64>) -> Option<Point3<f64>> {
    let above_a = a.z >= z;
    let above_b = b.z >= z;

    // Same side of plane
    if above_a == above_b {
        return None;
    }

    let t = (z - a.z) / (b.z - a.z);
    let direction = b - a;
    Some(Point3::from(a.coords + direction * t))
}

/// Grid key for endpoint matching.
fn endpoint_key(p: &Point3<f64>, tolerance: f64) -> (i64, i64, i64) {
    (
        (p.x / tolerance).round() as i64,
        (p.y / tolerance).round() as i64,
        (p.z / tolerance).round() as i64,
    )
}

/// Chain unordered segments into polylines.
///
/// Segments sharing an endpoint (within `tolerance`) are joined. A polyline
/// that returns to its start is closed by repeating the first point.
pub fn chain_segments(
    segments: &[(Point3<f64>, Point3<f64>)],
    tolerance: f64,
) -> Vec<Vec<Point3<f64>>> {
    if segments.is_empty() {
        return Vec::new();
    }

    // endpoint key -> segment ids touching it
    let mut by_endpoint: HashMap<(i64, i64, i64), Vec<usize>> = HashMap::new();
    for (i, (a, b)) in segments.iter().enumerate() {
        by_endpoint
            .entry(endpoint_key(a, tolerance))
            .or_default()
            .push(i);
        by_endpoint
            .entry(endpoint_key(b, tolerance))
            .or_default()
            .push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut contours = Vec::new();

    let next_from = |p: &Point3<f64>, used: &[bool]| -> Option<usize> {
        by_endpoint
            .get(&endpoint_key(p, tolerance))
            .and_then(|ids| ids.iter().copied().find(|&i| !used[i]))
    };

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;

        let (a, b) = segments[start];
        let mut forward = vec![a, b];

        // Grow from the tail
        let mut tail = b;
        while let Some(i) = next_from(&tail, &used) {
            used[i] = true;
            let (s0, s1) = segments[i];
            tail = if endpoint_key(&s0, tolerance) == endpoint_key(&tail, tolerance) {
                s1
            } else {
                s0
            };
            forward.push(tail);
        }

        // Grow from the head
        let mut head = a;
        let mut backward = Vec::new();
        while let Some(i) = next_from(&head, &used) {
            used[i] = true;
            let (s0, s1) = segments[i];
            head = if endpoint_key(&s0, tolerance) == endpoint_key(&head, tolerance) {
                s1
            } else {
                s0
            };
            backward.push(head);
        }

        backward.reverse();
        backward.extend(forward);
        contours.push(backward);
    }

    contours
}
