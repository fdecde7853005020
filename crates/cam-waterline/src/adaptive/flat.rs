//! Flatness predicate deciding whether a fiber triple needs refinement.

use nalgebra::Point3;

use crate::fiber::Fiber;

/// Chords shorter than this count as flat.
const DEGENERATE_LENGTH: f64 = 1e-12;

/// Check whether `start -> mid -> stop` is straight enough.
///
/// The two chords are normalized and their dot product compared against
/// `cos_limit`. A zero-length chord carries no direction and is flat.
pub fn flat_points(
    start: &Point3<f64>,
    mid: &Point3<f64>,
    stop: &Point3<f64>,
    cos_limit: f64,
) -> bool {
    let v1 = mid - start;
    let v2 = stop - mid;
    let (n1, n2) = (v1.norm(), v2.norm());
    if n1 < DEGENERATE_LENGTH || n2 < DEGENERATE_LENGTH {
        return true;
    }
    (v1 / n1).dot(&(v2 / n2)) > cos_limit
}

/// Check whether three neighbouring fibers describe the same, nearly straight
/// waterline segments.
///
/// Differing interval counts mean a waterline starts, ends or splits between
/// them, which is never flat. Three empty fibers are flat. Otherwise both
/// endpoint chains of every interval must pass [`flat_points`].
pub fn flat_fibers(start: &Fiber, mid: &Fiber, stop: &Fiber, cos_limit: f64) -> bool {
    let n = start.len();
    if mid.len() != n || stop.len() != n {
        return false;
    }

    (0..n).all(|i| {
        flat_points(&start.upper_cl(i), &mid.upper_cl(i), &stop.upper_cl(i), cos_limit)
            && flat_points(&start.lower_cl(i), &mid.lower_cl(i), &stop.lower_cl(i), cos_limit)
    })
}
