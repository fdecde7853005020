//! Weave: the planar graph formed by crossing x- and y-fiber intervals.
//!
//! Interval endpoints become CL vertices, strict crossings of an x-interval
//! with a y-interval become INT vertices, and consecutive vertices along an
//! interval are joined by an edge. Walking the faces of this graph and
//! keeping the CL vertices of each face yields the waterline loops.
//!
//! ```
//! use cam_waterline::{Fiber, Interval};
//! use cam_waterline::weave::Weave;
//!
//! // One x-fiber and one y-fiber crossing in a plus sign
//! let mut x = Fiber::along_x(0.0, -1.0, 1.0, 0.0);
//! x.add_interval(Interval::from_bounds(0.0, 1.0));
//! let mut y = Fiber::along_y(0.0, -1.0, 1.0, 0.0);
//! y.add_interval(Interval::from_bounds(0.0, 1.0));
//!
//! let weave = Weave::build(&[x], &[y]).unwrap();
//! assert_eq!(weave.cl_count(), 4);
//! assert_eq!(weave.int_count(), 1);
//!
//! let loops = weave.loops().unwrap();
//! assert_eq!(loops.loops.len(), 1);
//! assert_eq!(loops.loops[0].len(), 5);
//! ```

mod graph;
mod traverse;

pub use graph::{VertexKind, Weave, WeaveVertex};
pub use traverse::{Loop, WeaveLoops, weave_loops};

use thiserror::Error;

use crate::fiber::{Fiber, FiberDirection};

/// Problems found while building or walking a weave.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeaveError {
    /// Fiber coordinates are not strictly increasing.
    #[error("{direction}-fiber {index} is out of coordinate order")]
    UnsortedFibers {
        direction: FiberDirection,
        index: usize,
    },

    /// A fiber has a NaN or infinite coordinate or interval bound.
    #[error("{direction}-fiber {index} has a non-finite coordinate or interval")]
    NonFinite {
        direction: FiberDirection,
        index: usize,
    },

    /// A fiber was passed in the wrong list.
    #[error("fiber {index} runs along {found}, expected {expected}")]
    WrongDirection {
        expected: FiberDirection,
        found: FiberDirection,
        index: usize,
    },

    /// A face walk did not return to its start.
    #[error("face traversal did not close after {steps} steps")]
    TraversalOverrun { steps: usize },
}

/// Check that fibers are finite, of one direction and strictly ordered.
pub(crate) fn validate_fibers(fibers: &[Fiber], direction: FiberDirection) -> Result<(), WeaveError> {
    let mut previous: Option<f64> = None;
    for (index, fiber) in fibers.iter().enumerate() {
        if fiber.direction() != direction {
            return Err(WeaveError::WrongDirection {
                expected: direction,
                found: fiber.direction(),
                index,
            });
        }

        let c = fiber.coordinate();
        let finite = c.is_finite()
            && fiber.p1.iter().chain(fiber.p2.iter()).all(|v| v.is_finite())
            && fiber
                .intervals()
                .iter()
                .all(|i| i.lower.is_finite() && i.upper.is_finite());
        if !finite {
            return Err(WeaveError::NonFinite { direction, index });
        }

        if previous.is_some_and(|p| c <= p) {
            return Err(WeaveError::UnsortedFibers { direction, index });
        }
        previous = Some(c);
    }
    Ok(())
}
