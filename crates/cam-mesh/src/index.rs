//! Spatial index for axis-parallel line queries against a triangle soup.
//!
//! Waterline fibers are lines of constant Y (x-fibers) or constant X
//! (y-fibers) at a fixed Z height. The index buckets triangle bounding boxes
//! along both axes so a fiber only visits triangles whose footprint,
//! grown by the cutter radius, straddles the fiber line.
//!
//! The index is immutable once built and is safe to query from many threads.

use nalgebra::Point3;
use tracing::debug;

use crate::error::{MeshError, MeshResult, validate_mesh_data};
use crate::types::{Mesh, Rect, Triangle};

/// Upper bound on buckets per axis.
const MAX_BUCKETS: usize = 4096;

/// Axis-aligned bounding box for spatial acceleration.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create AABB from a triangle.
    pub fn from_triangle(tri: &Triangle) -> Self {
        let min = Point3::new(
            tri.v0.x.min(tri.v1.x).min(tri.v2.x),
            tri.v0.y.min(tri.v1.y).min(tri.v2.y),
            tri.v0.z.min(tri.v1.z).min(tri.v2.z),
        );
        let max = Point3::new(
            tri.v0.x.max(tri.v1.x).max(tri.v2.x),
            tri.v0.y.max(tri.v1.y).max(tri.v2.y),
            tri.v0.z.max(tri.v1.z).max(tri.v2.z),
        );
        Self { min, max }
    }

    /// Check whether the Z extent overlaps `[z_lo, z_hi]`.
    #[inline]
    pub fn overlaps_z(&self, z_lo: f64, z_hi: f64) -> bool {
        self.min.z <= z_hi && self.max.z >= z_lo
    }
}

/// Which axis a query line runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAxis {
    /// Line of constant Y, running along X.
    X,
    /// Line of constant X, running along Y.
    Y,
}

/// One-dimensional bucket grid over triangle extents.
#[derive(Debug, Clone)]
struct Buckets {
    origin: f64,
    size: f64,
    cells: Vec<Vec<u32>>,
}

impl Buckets {
    fn new(origin: f64, extent: f64, target_size: f64) -> Self {
        let count = if extent > 0.0 && target_size > 0.0 {
            ((extent / target_size).ceil() as usize).clamp(1, MAX_BUCKETS)
        } else {
            1
        };
        let size = if extent > 0.0 {
            extent / count as f64
        } else {
            1.0
        };
        Self {
            origin,
            size,
            cells: vec![Vec::new(); count],
        }
    }

    fn cell(&self, value: f64) -> usize {
        let raw = ((value - self.origin) / self.size).floor();
        if raw <= 0.0 {
            0
        } else {
            (raw as usize).min(self.cells.len() - 1)
        }
    }

    fn insert(&mut self, lo: f64, hi: f64, id: u32) {
        let (a, b) = (self.cell(lo), self.cell(hi));
        for cell in &mut self.cells[a..=b] {
            cell.push(id);
        }
    }

    fn range(&self, lo: f64, hi: f64) -> &[Vec<u32>] {
        let (a, b) = (self.cell(lo), self.cell(hi));
        &self.cells[a..=b]
    }
}

/// Bucketed triangle index supporting fiber-line queries.
#[derive(Debug, Clone)]
pub struct TriangleIndex {
    triangles: Vec<Triangle>,
    aabbs: Vec<Aabb>,
    by_y: Buckets,
    by_x: Buckets,
    footprint: Option<Rect>,
    z_range: Option<(f64, f64)>,
}

impl TriangleIndex {
    /// Build an index with an automatically chosen bucket size.
    ///
    /// The bucket size is the mean triangle footprint edge, which keeps
    /// bucket occupancy roughly constant for evenly tessellated meshes.
    pub fn new(mesh: &Mesh) -> MeshResult<Self> {
        validate_mesh_data(mesh)?;

        let mean_extent = if mesh.faces.is_empty() {
            1.0
        } else {
            let total: f64 = mesh
                .triangles()
                .map(|t| {
                    let fp = t.footprint();
                    fp.width().max(fp.height())
                })
                .sum();
            total / mesh.faces.len() as f64
        };

        Self::with_bucket_size(mesh, mean_extent.max(1e-6))
    }

    /// Build an index with an explicit bucket size (in model units).
    pub fn with_bucket_size(mesh: &Mesh, bucket_size: f64) -> MeshResult<Self> {
        if !(bucket_size.is_finite() && bucket_size > 0.0) {
            return Err(MeshError::index_failed(format!(
                "bucket size must be positive and finite, got {}",
                bucket_size
            )));
        }
        validate_mesh_data(mesh)?;

        let triangles: Vec<Triangle> = mesh.triangles().collect();
        let aabbs: Vec<Aabb> = triangles.iter().map(Aabb::from_triangle).collect();

        let footprint = aabbs
            .iter()
            .map(|b| Rect::new(b.min.x, b.max.x, b.min.y, b.max.y))
            .reduce(|a, b| a.union(&b));
        let z_range = aabbs
            .iter()
            .map(|b| (b.min.z, b.max.z))
            .reduce(|a, b| (a.0.min(b.0), a.1.max(b.1)));

        let fp = footprint.unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        let mut by_y = Buckets::new(fp.min_y, fp.height(), bucket_size);
        let mut by_x = Buckets::new(fp.min_x, fp.width(), bucket_size);

        for (id, b) in aabbs.iter().enumerate() {
            by_y.insert(b.min.y, b.max.y, id as u32);
            by_x.insert(b.min.x, b.max.x, id as u32);
        }

        debug!(
            triangles = triangles.len(),
            y_buckets = by_y.cells.len(),
            x_buckets = by_x.cells.len(),
            bucket_size,
            "Triangle index built"
        );

        Ok(Self {
            triangles,
            aabbs,
            by_y,
            by_x,
            footprint,
            z_range,
        })
    }

    /// Number of indexed triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check whether the index holds no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// XY footprint of all triangles, or None for an empty index.
    #[inline]
    pub fn footprint(&self) -> Option<Rect> {
        self.footprint
    }

    /// Lowest and highest Z of all triangles, or None for an empty index.
    #[inline]
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.z_range
    }

    /// Triangle by id.
    #[inline]
    pub fn triangle(&self, id: usize) -> &Triangle {
        &self.triangles[id]
    }

    /// Ids of triangles whose footprint, grown by `margin`, touches the line
    /// at `coordinate` along `axis`, and whose Z extent overlaps `z_range`.
    ///
    /// Returned ids are sorted and unique.
    pub fn query_line(
        &self,
        axis: LineAxis,
        coordinate: f64,
        margin: f64,
        z_range: (f64, f64),
    ) -> Vec<usize> {
        if self.triangles.is_empty() {
            return Vec::new();
        }

        let lo = coordinate - margin;
        let hi = coordinate + margin;
        let buckets = match axis {
            LineAxis::X => &self.by_y,
            LineAxis::Y => &self.by_x,
        };

        let mut ids: Vec<usize> = buckets
            .range(lo, hi)
            .iter()
            .flatten()
            .map(|&id| id as usize)
            .filter(|&id| {
                let b = &self.aabbs[id];
                let (b_lo, b_hi) = match axis {
                    LineAxis::X => (b.min.y, b.max.y),
                    LineAxis::Y => (b.min.x, b.max.x),
                };
                b_lo <= hi && b_hi >= lo && b.overlaps_z(z_range.0, z_range.1)
            })
            .collect();

        ids.sort_unstable();
        ids.dedup();
        ids
    }
}
