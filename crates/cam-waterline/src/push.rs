//! Fiber computation: push a cutter along a fiber against a surface.

use cam_mesh::tracing_ext::log_mesh_stats;
use cam_mesh::{Mesh, Rect, TriangleIndex};
use tracing::debug;

use crate::cutter::Cutter;
use crate::error::WaterlineResult;
use crate::fiber::Fiber;

/// Something that can fill fibers with collision intervals.
///
/// Implementations must be deterministic: the same fiber always comes back
/// with the same intervals. Fibers are requested from many threads at once.
pub trait FiberSource: Sync {
    /// XY region worth sampling, or None if there is nothing to cut.
    fn reach(&self) -> Option<Rect>;

    /// Fill a fresh `fiber` with all its intervals.
    ///
    /// The fiber's endpoints and direction are fixed by the caller. A fiber
    /// that never touches the surface comes back empty.
    fn compute_fiber(&self, fiber: Fiber) -> Fiber;
}

/// Pushes a cutter along fibers against a triangle mesh.
#[derive(Debug)]
pub struct PushCutter<'a> {
    cutter: &'a dyn Cutter,
    index: TriangleIndex,
}

impl<'a> PushCutter<'a> {
    /// Index `mesh` for fiber queries with `cutter`.
    ///
    /// # Errors
    ///
    /// Returns `MeshError` if the mesh has invalid indices or coordinates.
    pub fn new(mesh: &Mesh, cutter: &'a dyn Cutter) -> WaterlineResult<Self> {
        log_mesh_stats(mesh, "waterline surface");
        let index = TriangleIndex::new(mesh)?;
        Ok(Self::from_index(index, cutter))
    }

    /// Use an already built triangle index.
    pub fn from_index(index: TriangleIndex, cutter: &'a dyn Cutter) -> Self {
        debug!(
            triangles = index.len(),
            radius = cutter.radius(),
            length = cutter.length(),
            "Push cutter ready"
        );
        Self { cutter, index }
    }

    /// The cutter being pushed.
    pub fn cutter(&self) -> &dyn Cutter {
        self.cutter
    }

    /// The triangle index being queried.
    pub fn index(&self) -> &TriangleIndex {
        &self.index
    }
}

impl FiberSource for PushCutter<'_> {
    /// Surface footprint grown by the cutter diameter, so fibers start and
    /// end clear of the surface.
    fn reach(&self) -> Option<Rect> {
        self.index
            .footprint()
            .map(|fp| fp.expand(self.cutter.diameter()))
    }

    fn compute_fiber(&self, mut fiber: Fiber) -> Fiber {
        let z = fiber.z();
        let candidates = self.index.query_line(
            fiber.direction().axis(),
            fiber.coordinate(),
            self.cutter.radius(),
            (z, z + self.cutter.length()),
        );

        for id in candidates {
            if let Some(interval) = self.cutter.push(&fiber, self.index.triangle(id)) {
                fiber.add_interval(interval);
            }
        }
        fiber
    }
}
