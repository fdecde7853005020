//! Cutter shapes and the push-cutter primitive.
//!
//! A cutter is pushed along a fiber against one triangle at a time. The
//! result is the parameter interval of fiber positions (cutter tip on the
//! fiber) where the cutter would intersect the triangle. For convex cutters
//! and a single triangle the forbidden set along a line is convex, so the
//! interval is the hull of the hits of its boundary features.

mod ball;
mod cylinder;

pub use ball::BallCutter;
pub use cylinder::CylCutter;

use cam_mesh::Triangle;
use nalgebra::{Point3, Vector3};

use crate::fiber::{CcPoint, CcType, Fiber, Interval};

/// Below this, lengths and slopes are treated as zero.
const GEOM_EPSILON: f64 = 1e-12;

/// A milling cutter that can be pushed along fibers.
pub trait Cutter: Send + Sync + std::fmt::Debug {
    /// Cutter radius.
    fn radius(&self) -> f64;

    /// Cutting length above the tip.
    fn length(&self) -> f64;

    /// Cutter diameter.
    fn diameter(&self) -> f64 {
        2.0 * self.radius()
    }

    /// Interval of `fiber` where the cutter, tip on the fiber, collides with `triangle`.
    ///
    /// Returns None when the cutter clears the triangle everywhere along the
    /// infinite line through the fiber. The interval may extend beyond `[0, 1]`.
    fn push(&self, fiber: &Fiber, triangle: &Triangle) -> Option<Interval>;
}

/// The fiber as a parametrized line `origin + u * dir`, with `u` in model units.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FiberLine {
    origin: Point3<f64>,
    dir: Vector3<f64>,
    length: f64,
}

impl FiberLine {
    /// Line through the fiber with its origin lifted (or dropped) to height `z`.
    pub(crate) fn at_height(fiber: &Fiber, z: f64) -> Option<Self> {
        let delta = fiber.p2 - fiber.p1;
        let length = delta.norm();
        if length < GEOM_EPSILON {
            return None;
        }
        Some(Self {
            origin: Point3::new(fiber.p1.x, fiber.p1.y, z),
            dir: delta / length,
            length,
        })
    }

    #[inline]
    pub(crate) fn at(&self, u: f64) -> Point3<f64> {
        self.origin + self.dir * u
    }

    /// Fiber parameter for distance `u` from the fiber start.
    #[inline]
    pub(crate) fn t(&self, u: f64) -> f64 {
        u / self.length
    }
}

/// Accumulates component hits into one interval.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HitHull {
    line: FiberLine,
    interval: Interval,
}

impl HitHull {
    pub(crate) fn new(line: FiberLine) -> Self {
        Self {
            line,
            interval: Interval::new(),
        }
    }

    pub(crate) fn line(&self) -> &FiberLine {
        &self.line
    }

    /// Record a `u` range whose end contacts are given by `contact(u)`.
    pub(crate) fn add(
        &mut self,
        range: Option<(f64, f64)>,
        kind: CcType,
        contact: impl Fn(f64) -> Point3<f64>,
    ) {
        if let Some((lo, hi)) = range {
            if !(lo.is_finite() && hi.is_finite()) {
                return;
            }
            self.interval
                .update(self.line.t(lo), CcPoint::new(contact(lo), kind));
            self.interval
                .update(self.line.t(hi), CcPoint::new(contact(hi), kind));
        }
    }

    pub(crate) fn finish(self) -> Option<Interval> {
        if self.interval.is_empty() {
            None
        } else {
            Some(self.interval)
        }
    }
}

/// Solve `lo <= a * u + b <= hi` for `u`.
///
/// A constant expression yields the whole line if it lies strictly inside
/// the bounds, nothing otherwise. Grazing contact is not a collision.
pub(crate) fn linear_range(a: f64, b: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if a.abs() < GEOM_EPSILON {
        return (lo < b && b < hi).then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let u1 = (lo - b) / a;
    let u2 = (hi - b) / a;
    Some((u1.min(u2), u1.max(u2)))
}

/// Solve `a * u^2 + b * u + c <= 0` for `u`, with `a >= 0`.
pub(crate) fn quadratic_range(a: f64, b: f64, c: f64) -> Option<(f64, f64)> {
    if a < GEOM_EPSILON {
        return linear_range(b, c, f64::NEG_INFINITY, 0.0);
    }
    let disc = b * b - 4.0 * a * c;
    if disc <= 0.0 {
        return None;
    }
    let root = disc.sqrt();
    Some(((-b - root) / (2.0 * a), (-b + root) / (2.0 * a)))
}

/// Intersection of two ranges.
pub(crate) fn intersect(a: Option<(f64, f64)>, b: Option<(f64, f64)>) -> Option<(f64, f64)> {
    let (a, b) = (a?, b?);
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    (lo <= hi).then_some((lo, hi))
}

/// Positions where the line passes within `radius` of `center`.
pub(crate) fn sphere_range(line: &FiberLine, center: &Point3<f64>, radius: f64) -> Option<(f64, f64)> {
    let w = line.origin - center;
    quadratic_range(1.0, 2.0 * w.dot(&line.dir), w.norm_squared() - radius * radius)
}

/// Positions where the line is within `radius` of the segment interior.
///
/// The caps at the endpoints are covered by [`sphere_range`].
pub(crate) fn band_range(
    line: &FiberLine,
    p: &Point3<f64>,
    q: &Point3<f64>,
    radius: f64,
) -> Option<(f64, f64)> {
    let d = q - p;
    let dd = d.norm_squared();
    if dd < GEOM_EPSILON {
        return None;
    }

    // s(u) = ((origin - p) + u dir) . d / |d|^2
    let w = line.origin - p;
    let s_range = linear_range(line.dir.dot(&d) / dd, w.dot(&d) / dd, 0.0, 1.0);

    // Perpendicular offset A + u B
    let a = w - d * (w.dot(&d) / dd);
    let b = line.dir - d * (line.dir.dot(&d) / dd);
    let perp_range = quadratic_range(
        b.norm_squared(),
        2.0 * a.dot(&b),
        a.norm_squared() - radius * radius,
    );

    intersect(s_range, perp_range)
}

/// Parameter in `[0, 1]` of the point on segment `pq` closest to the line point at `u`.
pub(crate) fn segment_param(line: &FiberLine, p: &Point3<f64>, q: &Point3<f64>, u: f64) -> f64 {
    let d = q - p;
    let dd = d.norm_squared();
    if dd < GEOM_EPSILON {
        return 0.0;
    }
    ((line.at(u) - p).dot(&d) / dd).clamp(0.0, 1.0)
}

/// Closest point on segment `pq` to the line point at `u`.
pub(crate) fn segment_point(line: &FiberLine, p: &Point3<f64>, q: &Point3<f64>, u: f64) -> Point3<f64> {
    p + (q - p) * segment_param(line, p, q, u)
}

/// Clip a triangle to the slab `z_lo <= z <= z_hi`.
///
/// Returns the clipped convex polygon; corners that are original vertices
/// are tagged [`CcType::Vertex`], cut points [`CcType::Edge`].
pub(crate) fn clip_to_slab(tri: &Triangle, z_lo: f64, z_hi: f64) -> Vec<(Point3<f64>, CcType)> {
    let poly: Vec<(Point3<f64>, CcType)> = tri
        .vertices()
        .into_iter()
        .map(|v| (v, CcType::Vertex))
        .collect();
    let poly = clip_half(&poly, |p| p.z - z_lo, z_lo);
    clip_half(&poly, |p| z_hi - p.z, z_hi)
}

/// Sutherland-Hodgman against `side(p) >= 0`, cut points placed at `z = plane_z`.
fn clip_half(
    poly: &[(Point3<f64>, CcType)],
    side: impl Fn(&Point3<f64>) -> f64,
    plane_z: f64,
) -> Vec<(Point3<f64>, CcType)> {
    let n = poly.len();
    if n == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n {
        let (cur, cur_kind) = poly[i];
        let (next, _) = poly[(i + 1) % n];
        let (sc, sn) = (side(&cur), side(&next));
        if sc >= 0.0 {
            out.push((cur, cur_kind));
        }
        if (sc >= 0.0) != (sn >= 0.0) {
            let t = (plane_z - cur.z) / (next.z - cur.z);
            let mut cut = cur + (next - cur) * t;
            cut.z = plane_z;
            out.push((cut, CcType::Edge));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn x_line(y: f64, z: f64) -> FiberLine {
        let fiber = Fiber::along_x(y, 0.0, 10.0, 0.0);
        FiberLine::at_height(&fiber, z).unwrap()
    }

    #[test]
    fn test_linear_range() {
        let (lo, hi) = linear_range(2.0, 1.0, 0.0, 5.0).unwrap();
        assert!(approx_eq(lo, -0.5));
        assert!(approx_eq(hi, 2.0));

        let (lo, hi) = linear_range(-1.0, 0.0, 0.0, 1.0).unwrap();
        assert!(approx_eq(lo, -1.0));
        assert!(approx_eq(hi, 0.0));

        assert!(linear_range(0.0, 3.0, 0.0, 1.0).is_none());
        assert!(linear_range(0.0, 1.0, 0.0, 1.0).is_none());
        assert!(linear_range(0.0, 0.5, 0.0, 1.0).unwrap().0.is_infinite());
    }

    #[test]
    fn test_sphere_range() {
        let line = x_line(3.0, 0.0);
        let (lo, hi) = sphere_range(&line, &Point3::new(5.0, 3.0, 0.0), 1.0).unwrap();
        assert!(approx_eq(lo, 4.0));
        assert!(approx_eq(hi, 6.0));

        // Offset by 0.6 in y: half-chord 0.8
        let (lo, hi) = sphere_range(&line, &Point3::new(5.0, 3.6, 0.0), 1.0).unwrap();
        assert!(approx_eq(lo, 4.2));
        assert!(approx_eq(hi, 5.8));

        assert!(sphere_range(&line, &Point3::new(5.0, 5.0, 0.0), 1.0).is_none());
        // Tangent
        assert!(sphere_range(&line, &Point3::new(5.0, 4.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_band_range_parallel_and_crossing() {
        let line = x_line(0.0, 0.0);

        // Segment parallel to the line at distance 0.5
        let p = Point3::new(2.0, 0.5, 0.0);
        let q = Point3::new(4.0, 0.5, 0.0);
        let (lo, hi) = band_range(&line, &p, &q, 1.0).unwrap();
        assert!(approx_eq(lo, 2.0));
        assert!(approx_eq(hi, 4.0));

        // Segment crossing the line at x = 3, perpendicular
        let p = Point3::new(3.0, -2.0, 0.0);
        let q = Point3::new(3.0, 2.0, 0.0);
        let (lo, hi) = band_range(&line, &p, &q, 1.0).unwrap();
        assert!(approx_eq(lo, 2.0));
        assert!(approx_eq(hi, 4.0));

        let c = segment_point(&line, &p, &q, 2.0);
        assert!(approx_eq(c.x, 3.0));
        assert!(approx_eq(c.y, 0.0));
    }

    #[test]
    fn test_clip_to_slab() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 4.0),
            Point3::new(0.0, 4.0, 0.0),
        );

        let whole = clip_to_slab(&tri, -1.0, 5.0);
        assert_eq!(whole.len(), 3);
        assert!(whole.iter().all(|(_, k)| *k == CcType::Vertex));

        let band = clip_to_slab(&tri, 1.0, 2.0);
        assert_eq!(band.len(), 4);
        assert!(band.iter().all(|(p, _)| p.z >= 1.0 - 1e-12 && p.z <= 2.0 + 1e-12));

        assert!(clip_to_slab(&tri, 5.0, 6.0).is_empty());
    }
}
