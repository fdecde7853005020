//! Face traversal of the weave.

use cam_mesh::tracing_ext::log_perf_section;
use nalgebra::Point3;
use tracing::debug;

use super::graph::{VertexKind, Weave};
use super::WeaveError;
use crate::fiber::Fiber;

/// A closed waterline: the first point is repeated at the end.
pub type Loop = Vec<Point3<f64>>;

/// Loops recovered from a weave.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeaveLoops {
    /// Closed loops, one per face cycle holding CL vertices.
    pub loops: Vec<Loop>,
    /// Face cycles walked in total.
    pub cycles: usize,
    /// Face cycles without CL vertices (cells between fibers).
    pub discarded: usize,
}

impl Weave {
    /// Walk every face cycle and collect the CL vertices of each.
    ///
    /// At the head of each half-edge the walk takes the first outgoing edge
    /// clockwise from the way it came in, turning back only at a dead end.
    /// Every half-edge lies on exactly one cycle.
    ///
    /// # Errors
    ///
    /// Returns [`WeaveError::TraversalOverrun`] if a cycle fails to close.
    pub fn loops(&self) -> Result<WeaveLoops, WeaveError> {
        let count = self.half_edges.len();
        let mut visited = vec![false; count];
        let mut result = WeaveLoops::default();

        for start in 0..count {
            if visited[start] {
                continue;
            }

            let mut points = Vec::new();
            let mut e = start;
            let mut steps = 0;
            loop {
                visited[e] = true;
                let head = &self.vertices[self.half_edges[e].target];
                if head.kind == VertexKind::Cl {
                    points.push(head.position);
                }

                e = self.next_half_edge(e);
                steps += 1;
                if e == start {
                    break;
                }
                if steps > count || visited[e] {
                    return Err(WeaveError::TraversalOverrun { steps });
                }
            }

            result.cycles += 1;
            match points.first().copied() {
                Some(first) => {
                    points.push(first);
                    result.loops.push(points);
                }
                None => result.discarded += 1,
            }
        }

        debug!(
            cycles = result.cycles,
            loops = result.loops.len(),
            discarded = result.discarded,
            "Weave faces traversed"
        );

        Ok(result)
    }

    /// Successor of half-edge `e` on its face cycle.
    fn next_half_edge(&self, e: usize) -> usize {
        let he = self.half_edges[e];
        let back = (he.dir + 2) % 4;
        // back - 1, back - 2, back - 3, then back itself
        for turn in [3, 2, 1, 0] {
            if let Some(next) = self.outgoing[he.target][(back + turn) % 4] {
                return next;
            }
        }
        e ^ 1
    }
}

/// Build the weave of the fibers and return its loops.
pub fn weave_loops(x_fibers: &[Fiber], y_fibers: &[Fiber]) -> Result<WeaveLoops, WeaveError> {
    let _section = log_perf_section("weave_loops");
    Weave::build(x_fibers, y_fibers)?.loops()
}
