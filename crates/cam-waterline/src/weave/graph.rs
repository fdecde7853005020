//! Weave graph construction.

use nalgebra::Point3;
use tracing::debug;

use super::{WeaveError, validate_fibers};
use crate::fiber::{Fiber, FiberDirection};

/// Edge directions, counterclockwise: +x, +y, -x, -y.
pub(crate) const PLUS_X: usize = 0;
pub(crate) const PLUS_Y: usize = 1;
pub(crate) const MINUS_X: usize = 2;
pub(crate) const MINUS_Y: usize = 3;

/// Role of a weave vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexKind {
    /// Interval endpoint: a cutter-location point on the waterline.
    Cl,
    /// Strict crossing of an x-interval with a y-interval.
    Int,
}

/// A vertex of the weave.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaveVertex {
    pub position: Point3<f64>,
    pub kind: VertexKind,
}

/// One direction of an edge. Half-edges are stored in twin pairs, so the
/// twin of `e` is `e ^ 1` and its target is the origin of `e`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HalfEdge {
    pub(crate) target: usize,
    pub(crate) dir: usize,
}

/// The planar graph of crossing fiber intervals.
#[derive(Debug, Clone, Default)]
pub struct Weave {
    pub(crate) vertices: Vec<WeaveVertex>,
    pub(crate) half_edges: Vec<HalfEdge>,
    /// Outgoing half-edge per vertex and direction.
    pub(crate) outgoing: Vec<[Option<usize>; 4]>,
}

impl Weave {
    /// Build the weave of sorted, non-overlapping fiber sets.
    ///
    /// # Errors
    ///
    /// Returns a [`WeaveError`] if a fiber is in the wrong list, has
    /// non-finite values, or the fibers are not strictly increasing in
    /// coordinate.
    pub fn build(x_fibers: &[Fiber], y_fibers: &[Fiber]) -> Result<Self, WeaveError> {
        validate_fibers(x_fibers, FiberDirection::X)?;
        validate_fibers(y_fibers, FiberDirection::Y)?;

        let mut weave = Weave::default();
        let y_coords: Vec<f64> = y_fibers.iter().map(Fiber::coordinate).collect();

        // INT vertices found on each y-interval, in increasing y
        let mut y_crossings: Vec<Vec<Vec<usize>>> = y_fibers
            .iter()
            .map(|f| vec![Vec::new(); f.len()])
            .collect();

        for x_fiber in x_fibers {
            let y = x_fiber.coordinate();
            for n in 0..x_fiber.len() {
                let lo = x_fiber.lower_cl(n);
                let hi = x_fiber.upper_cl(n);
                let mut chain = vec![weave.add_vertex(lo, VertexKind::Cl)];

                // y-fibers strictly between the interval ends
                let first = y_coords.partition_point(|&x| x <= lo.x);
                let last = y_coords.partition_point(|&x| x < hi.x);
                for j in first..last {
                    let y_fiber = &y_fibers[j];
                    for m in 0..y_fiber.len() {
                        let (y_lo, y_hi) = (y_fiber.lower_cl(m).y, y_fiber.upper_cl(m).y);
                        if y_lo < y && y < y_hi {
                            let p = Point3::new(y_coords[j], y, lo.z);
                            let v = weave.add_vertex(p, VertexKind::Int);
                            chain.push(v);
                            y_crossings[j][m].push(v);
                        }
                    }
                }

                chain.push(weave.add_vertex(hi, VertexKind::Cl));
                weave.link_chain(&chain, PLUS_X, MINUS_X);
            }
        }

        for (j, y_fiber) in y_fibers.iter().enumerate() {
            for m in 0..y_fiber.len() {
                let mut chain = vec![weave.add_vertex(y_fiber.lower_cl(m), VertexKind::Cl)];
                chain.extend_from_slice(&y_crossings[j][m]);
                chain.push(weave.add_vertex(y_fiber.upper_cl(m), VertexKind::Cl));
                weave.link_chain(&chain, PLUS_Y, MINUS_Y);
            }
        }

        debug!(
            cl_vertices = weave.cl_count(),
            int_vertices = weave.int_count(),
            edges = weave.edge_count(),
            "Weave built"
        );

        Ok(weave)
    }

    fn add_vertex(&mut self, position: Point3<f64>, kind: VertexKind) -> usize {
        self.vertices.push(WeaveVertex { position, kind });
        self.outgoing.push([None; 4]);
        self.vertices.len() - 1
    }

    /// Join consecutive vertices of an interval with twin half-edges.
    fn link_chain(&mut self, chain: &[usize], forward: usize, backward: usize) {
        for pair in chain.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let e = self.half_edges.len();
            self.half_edges.push(HalfEdge {
                target: b,
                dir: forward,
            });
            self.half_edges.push(HalfEdge {
                target: a,
                dir: backward,
            });
            self.outgoing[a][forward] = Some(e);
            self.outgoing[b][backward] = Some(e + 1);
        }
    }

    /// All vertices.
    pub fn vertices(&self) -> &[WeaveVertex] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.half_edges.len() / 2
    }

    /// Number of CL vertices.
    pub fn cl_count(&self) -> usize {
        self.vertices
            .iter()
            .filter(|v| v.kind == VertexKind::Cl)
            .count()
    }

    /// Number of INT vertices.
    pub fn int_count(&self) -> usize {
        self.vertices
            .iter()
            .filter(|v| v.kind == VertexKind::Int)
            .count()
    }

    /// Check whether the weave has no vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fiber::Interval;

    fn x_fiber(y: f64, lo: f64, hi: f64) -> Fiber {
        let mut f = Fiber::along_x(y, 0.0, 10.0, 0.0);
        f.add_interval(Interval::from_bounds(lo / 10.0, hi / 10.0));
        f
    }

    fn y_fiber(x: f64, lo: f64, hi: f64) -> Fiber {
        let mut f = Fiber::along_y(x, 0.0, 10.0, 0.0);
        f.add_interval(Interval::from_bounds(lo / 10.0, hi / 10.0));
        f
    }

    #[test]
    fn test_grid_counts() {
        let xs: Vec<Fiber> = [2.0, 4.0, 6.0].iter().map(|&y| x_fiber(y, 1.0, 7.0)).collect();
        let ys: Vec<Fiber> = [3.0, 5.0].iter().map(|&x| y_fiber(x, 1.0, 7.0)).collect();
        let weave = Weave::build(&xs, &ys).unwrap();

        assert_eq!(weave.cl_count(), 10);
        assert_eq!(weave.int_count(), 6);
        // Each x-interval: 2 INT -> 3 edges; each y-interval: 3 INT -> 4 edges
        assert_eq!(weave.edge_count(), 3 * 3 + 2 * 4);
        assert_eq!(weave.vertex_count(), 16);
    }

    #[test]
    fn test_touching_is_not_crossing() {
        // y-fiber ends exactly on the x-fiber
        let xs = vec![x_fiber(5.0, 0.0, 10.0)];
        let ys = vec![y_fiber(5.0, 5.0, 8.0)];
        let weave = Weave::build(&xs, &ys).unwrap();
        assert_eq!(weave.int_count(), 0);
        assert_eq!(weave.edge_count(), 2);
    }

    #[test]
    fn test_unsorted_fibers_rejected() {
        let xs = vec![x_fiber(5.0, 1.0, 2.0), x_fiber(4.0, 1.0, 2.0)];
        let err = Weave::build(&xs, &[]).unwrap_err();
        assert_eq!(
            err,
            WeaveError::UnsortedFibers {
                direction: FiberDirection::X,
                index: 1
            }
        );

        let xs = vec![x_fiber(5.0, 1.0, 2.0), x_fiber(5.0, 3.0, 4.0)];
        assert!(Weave::build(&xs, &[]).is_err());
    }

    #[test]
    fn test_wrong_direction_rejected() {
        let ys = vec![y_fiber(1.0, 1.0, 2.0)];
        let err = Weave::build(&ys, &[]).unwrap_err();
        assert!(matches!(err, WeaveError::WrongDirection { index: 0, .. }));
    }

    #[test]
    fn test_non_finite_rejected() {
        let mut f = Fiber::along_x(1.0, 0.0, 10.0, 0.0);
        f.add_interval(Interval::from_bounds(f64::NAN, 0.5));
        let err = Weave::build(&[f], &[]).unwrap_err();
        assert!(matches!(err, WeaveError::NonFinite { index: 0, .. }));
    }

    #[test]
    fn test_empty_weave() {
        let weave = Weave::build(&[], &[]).unwrap();
        assert!(weave.is_empty());
        assert_eq!(weave.edge_count(), 0);
    }
}
