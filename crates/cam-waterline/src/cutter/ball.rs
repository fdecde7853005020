//! Ball-nose cutter.

use cam_mesh::Triangle;

use super::cylinder::push_cylinder;
use super::{
    Cutter, FiberLine, HitHull, band_range, intersect, linear_range, segment_point, sphere_range,
};
use crate::error::{WaterlineError, WaterlineResult};
use crate::fiber::{CcType, Fiber, Interval};

/// A ball-nose cutter: a sphere of radius `diameter / 2` with its lowest
/// point on the fiber, topped by a cylindrical shaft up to `length`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallCutter {
    radius: f64,
    length: f64,
}

impl BallCutter {
    /// Create a ball-nose cutter.
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

    /// Hits of the ball itself: vertex spheres, edge capsules and the face slab.
    fn push_ball(&self, fiber: &Fiber, triangle: &Triangle, hull: &mut HitHull) {
        let r = self.radius;
        let line = *hull.line();
        let verts = triangle.vertices();

        for v in &verts {
            hull.add(sphere_range(&line, v, r), CcType::Vertex, |_| *v);
        }

        for (p, q) in triangle.edges() {
            hull.add(band_range(&line, &p, &q, r), CcType::Edge, |u| {
                segment_point(&line, &p, &q, u)
            });
        }

        let Some(n) = triangle.normal() else {
            return;
        };

        // Within r of the supporting plane
        let offset = line.origin - verts[0];
        let mut range = linear_range(line.dir.dot(&n), offset.dot(&n), -r, r);

        // Projection inside the triangle: one half-plane per edge
        for (a, b) in triangle.edges() {
            let edge = b - a;
            let w = line.origin - a;
            let slope = edge.cross(&line.dir).dot(&n);
            let base = edge.cross(&w).dot(&n);
            range = intersect(range, linear_range(slope, base, 0.0, f64::INFINITY));
        }

        hull.add(range, CcType::Facet, |u| {
            let x = line.at(u);
            x - n * (x - verts[0]).dot(&n)
        });

        tracing::trace!(
            coordinate = fiber.coordinate(),
            facet_hit = range.is_some(),
            "Ball pushed against triangle"
        );
    }
}

impl Cutter for BallCutter {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn length(&self) -> f64 {
        self.length
    }

    fn push(&self, fiber: &Fiber, triangle: &Triangle) -> Option<Interval> {
        let center_z = fiber.z() + self.radius;
        let line = FiberLine::at_height(fiber, center_z)?;

        let (tri_lo, tri_hi) = triangle.z_range();
        let mut hull = HitHull::new(line);
        if tri_hi >= fiber.z() && tri_lo <= center_z + self.radius {
            self.push_ball(fiber, triangle, &mut hull);
        }

        let mut interval = hull.finish();

        let shaft_top = fiber.z() + self.length;
        if shaft_top > center_z {
            let shaft = push_cylinder(
                fiber,
                triangle,
                center_z,
                shaft_top,
                self.radius,
                Some(CcType::Shaft),
            );
            match (&mut interval, shaft) {
                (Some(i), Some(s)) => i.merge(&s),
                (None, Some(s)) => interval = Some(s),
                _ => {}
            }
        }

        interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_push_against_wall_hits_facet() {
        let wall = Triangle::new(
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(5.0, 10.0, 0.0),
            Point3::new(5.0, 5.0, 10.0),
        );
        let cutter = BallCutter::new(2.0, 20.0).unwrap();
        let fiber = Fiber::along_x(5.0, 0.0, 10.0, 1.0);
        let interval = cutter.push(&fiber, &wall).unwrap();
        assert!(approx_eq(interval.lower, 0.4));
        assert!(approx_eq(interval.upper, 0.6));
        assert_eq!(interval.lower_cc.kind, CcType::Facet);
        assert!(approx_eq(interval.lower_cc.position.x, 5.0));
        assert!(approx_eq(interval.lower_cc.position.z, 2.0));
    }

    #[test]
    fn test_floor_below_tip_is_clear() {
        let floor = Triangle::new(
            Point3::new(-10.0, -10.0, -0.5),
            Point3::new(20.0, -10.0, -0.5),
            Point3::new(5.0, 20.0, -0.5),
        );
        let cutter = BallCutter::new(2.0, 20.0).unwrap();
        let fiber = Fiber::along_x(5.0, 0.0, 10.0, 0.0);
        assert!(cutter.push(&fiber, &floor).is_none());
    }

    #[test]
    fn test_overhang_hits_shaft() {
        let tri = Triangle::new(
            Point3::new(4.0, 0.0, 3.0),
            Point3::new(6.0, 0.0, 3.0),
            Point3::new(5.0, 4.0, 3.0),
        );
        let fiber = Fiber::along_x(1.0, 0.0, 10.0, 0.0);

        let short = BallCutter::new(2.0, 1.5).unwrap();
        assert!(short.push(&fiber, &tri).is_none());

        let long = BallCutter::new(2.0, 5.0).unwrap();
        let interval = long.push(&fiber, &tri).unwrap();
        let offset = 17.0_f64.sqrt() / 4.0;
        assert!(approx_eq(interval.lower, (4.25 - offset) / 10.0));
        assert!(approx_eq(interval.upper, (5.75 + offset) / 10.0));
        assert_eq!(interval.lower_cc.kind, CcType::Shaft);
    }

    #[test]
    fn test_vertex_contact() {
        // Tiny triangle around a point at ball-centre height, off the fiber line by 0.6
        let tri = Triangle::new(
            Point3::new(5.0, 5.6, 1.0),
            Point3::new(5.0, 5.6, 1.0 - 1e-3),
            Point3::new(5.0, 5.6 + 1e-3, 1.0),
        );
        let cutter = BallCutter::new(2.0, 1.0).unwrap();
        let fiber = Fiber::along_x(5.0, 0.0, 10.0, 0.0);
        let interval = cutter.push(&fiber, &tri).unwrap();
        // Chord half-width sqrt(1 - 0.36) = 0.8
        assert!(approx_eq(interval.lower, 0.42));
        assert!(approx_eq(interval.upper, 0.58));
    }
}
