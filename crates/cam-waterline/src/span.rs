//! Spans: parametrized curves that guide where fibers are placed.
//!
//! The sampler walks a span from `t = 0` to `t = 1` and places x-fibers at
//! the span's y and y-fibers at its x. By default the span is the diagonal
//! of the sampling region; slice contours make tighter guides.

use cam_mesh::{Mesh, Rect, slice_at};
use nalgebra::Point3;

/// A curve in the XY plane parametrized over `[0, 1]`.
pub trait Span: Send + Sync + std::fmt::Debug {
    /// Point at parameter `t`.
    fn point(&self, t: f64) -> Point3<f64>;

    /// Length of the curve.
    fn length(&self) -> f64;
}

/// A straight segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSpan {
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

impl LineSpan {
    pub fn new(start: Point3<f64>, end: Point3<f64>) -> Self {
        Self { start, end }
    }

    /// Diagonal of `rect` from `(min_x, min_y)` to `(max_x, max_y)` at height `z`.
    pub fn diagonal(rect: &Rect, z: f64) -> Self {
        Self::new(
            Point3::new(rect.min_x, rect.min_y, z),
            Point3::new(rect.max_x, rect.max_y, z),
        )
    }
}

impl Span for LineSpan {
    #[inline]
    fn point(&self, t: f64) -> Point3<f64> {
        self.start + (self.end - self.start) * t
    }

    #[inline]
    fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }
}

/// Segments of the plane section of `mesh` at `z`, as spans.
///
/// Each segment of each chained contour becomes one span, so sampling
/// concentrates fibers where the surface actually crosses the height.
pub fn spans_from_slice(mesh: &Mesh, z: f64) -> Vec<Box<dyn Span>> {
    let slice = slice_at(mesh, z);
    slice
        .contours
        .iter()
        .flat_map(|contour| contour.windows(2))
        .map(|w| LineSpan::new(w[0], w[1]))
        .filter(|span| span.length() > f64::EPSILON)
        .map(|span| Box::new(span) as Box<dyn Span>)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cam_mesh::Vertex;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn test_line_span() {
        let span = LineSpan::new(Point3::new(0.0, 0.0, 1.0), Point3::new(3.0, 4.0, 1.0));
        assert!(approx_eq(span.length(), 5.0));
        let mid = span.point(0.5);
        assert!(approx_eq(mid.x, 1.5));
        assert!(approx_eq(mid.y, 2.0));
        assert!(approx_eq(span.point(1.0).y, 4.0));
    }

    #[test]
    fn test_diagonal() {
        let span = LineSpan::diagonal(&Rect::new(-1.0, 1.0, -2.0, 2.0), 3.0);
        assert!(approx_eq(span.start.x, -1.0));
        assert!(approx_eq(span.start.y, -2.0));
        assert!(approx_eq(span.end.x, 1.0));
        assert!(approx_eq(span.end.z, 3.0));
    }

    #[test]
    fn test_spans_from_tetrahedron_slice() {
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, 10.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(5.0, 5.0, 10.0));
        mesh.faces.push([0, 1, 3]);
        mesh.faces.push([1, 2, 3]);
        mesh.faces.push([2, 0, 3]);
        mesh.faces.push([0, 2, 1]);

        let spans = spans_from_slice(&mesh, 5.0);
        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|s| s.length() > 0.0));
        assert!(spans_from_slice(&mesh, 20.0).is_empty());
    }
}
