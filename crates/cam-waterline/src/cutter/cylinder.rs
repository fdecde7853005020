//! Flat-end cylindrical cutter.

use cam_mesh::Triangle;
use nalgebra::Point3;

use super::{Cutter, FiberLine, HitHull, band_range, clip_to_slab, segment_param, sphere_range};
use crate::error::{WaterlineError, WaterlineResult};
use crate::fiber::{CcType, Fiber, Interval};

/// A flat-end cylindrical cutter.
///
/// The cutter occupies the disk of radius `diameter / 2` swept from the tip
/// up to `length` above it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CylCutter {
    radius: f64,
    length: f64,
}

impl CylCutter {
    /// Create a cylindrical cutter.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` if the diameter or length is not positive and finite.
    pub fn new(diameter: f64, length: f64) -> WaterlineResult<Self> {
        if !(diameter.is_finite() && diameter > 0.0) {
            return Err(WaterlineError::invalid_param(
                "diameter",
                diameter,
                "must be positive",
            ));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(WaterlineError::invalid_param(
                "length",
                length,
                "must be positive",
            ));
        }
        Ok(Self {
            radius: diameter / 2.0,
            length,
        })
    }
}

impl Cutter for CylCutter {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn push(&self, fiber: &Fiber, triangle: &Triangle) -> Option<Interval> {
        let z = fiber.z();
        push_cylinder(fiber, triangle, z, z + self.length, self.radius, None)
    }
}

/// Push a vertical cylinder of `radius` spanning `[z_lo, z_hi]` along the fiber.
///
/// The forbidden region is the slab-clipped triangle projected to XY and
/// grown by `radius`. `kind` overrides the contact type of every hit.
pub(crate) fn push_cylinder(
    fiber: &Fiber,
    triangle: &Triangle,
    z_lo: f64,
    z_hi: f64,
    radius: f64,
    kind: Option<CcType>,
) -> Option<Interval> {
    let polygon = clip_to_slab(triangle, z_lo, z_hi);
    if polygon.is_empty() {
        return None;
    }

    // Work in the plane z = 0; contacts keep their true height.
    let line = FiberLine::at_height(fiber, 0.0)?;
    let flat = |p: &Point3<f64>| Point3::new(p.x, p.y, 0.0);
    let mut hull = HitHull::new(line);

    for (corner, corner_kind) in &polygon {
        let range = sphere_range(hull.line(), &flat(corner), radius);
        hull.add(range, kind.unwrap_or(*corner_kind), |_| *corner);
    }

    let n = polygon.len();
    let edge_count = match n {
        1 => 0,
        2 => 1,
        _ => n,
    };
    for i in 0..edge_count {
        let (p, _) = polygon[i];
        let (q, _) = polygon[(i + 1) % n];
        let (fp, fq) = (flat(&p), flat(&q));
        let range = band_range(hull.line(), &fp, &fq, radius);
        let line = *hull.line();
        // Same segment parameter on the 3D edge
        hull.add(range, kind.unwrap_or(CcType::Edge), |u| {
            p + (q - p) * segment_param(&line, &fp, &fq, u)
        });
    }

    hull.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn wall() -> Triangle {
        // Vertical wall in the plane x = 5, from y = 0 to 10, z = 0 to 10
        Triangle::new(
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 10.0, 0.0),
            Point3::new(5.0, 5.0, 10.0),
        )
    }

    #[test]
    fn test_invalid_cutter() {
        assert!(CylCutter::new(0.0, 10.0).is_err());
        assert!(CylCutter::new(2.0, -1.0).is_err());
        assert!(CylCutter::new(f64::NAN, 1.0).is_err());
        let c = CylCutter::new(4.0, 10.0).unwrap();
        assert!(approx_eq(c.radius(), 2.0));
        assert!(approx_eq(c.diameter(), 4.0));
    }

    #[test]
    fn test_push_against_wall() {
        let cutter = CylCutter::new(2.0, 20.0).unwrap();
        let fiber = Fiber::along_x(5.0, 0.0, 10.0, 1.0);
        let interval = cutter.push(&fiber, &wall()).unwrap();
        assert!(approx_eq(interval.lower, 0.4));
        assert!(approx_eq(interval.upper, 0.6));
        assert!(approx_eq(interval.lower_cc.position.x, 5.0));
    }

    #[test]
    fn test_push_misses_above_triangle() {
        let cutter = CylCutter::new(2.0, 5.0).unwrap();
        let fiber = Fiber::along_x(5.0, 0.0, 10.0, 11.0);
        assert!(cutter.push(&fiber, &wall()).is_none());
    }

    #[test]
    fn test_push_misses_beside_triangle() {
        let cutter = CylCutter::new(2.0, 20.0).unwrap();
        let fiber = Fiber::along_x(12.0, 0.0, 10.0, 0.0);
        assert!(cutter.push(&fiber, &wall()).is_none());
    }

    #[test]
    fn test_push_catches_overhang_with_shank() {
        // Horizontal triangle at z = 3, cutter tip at z = 0 reaches it via its length
        let tri = Triangle::new(
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(6.0, 0.0, 3.0),
            Point3::new(5.0, 4.0, 3.0),
        );
        let fiber = Fiber::along_x(1.0, 0.0, 10.0, 0.0);
        let short = CylCutter::new(2.0, 2.0).unwrap();
        assert!(short.push(&fiber, &tri).is_none());

        let long = CylCutter::new(2.0, 5.0).unwrap();
        let interval = long.push(&fiber, &tri).unwrap();
        // Triangle spans x in [4.25, 5.75] at y = 1; the slanted sides are
        // offset by r along their normals, i.e. sqrt(17) / 4 along x.
        let offset = 17.0_f64.sqrt() / 4.0;
        assert!(approx_eq(interval.lower, (4.25 - offset) / 10.0));
        assert!(approx_eq(interval.upper, (5.75 + offset) / 10.0));
        assert_eq!(interval.lower_cc.kind, CcType::Edge);
    }
}
