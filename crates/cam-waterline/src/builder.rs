//! Fluent builder API for waterline generation.
//!
//! # Example
//!
//! ```
//! use cam_mesh::{Mesh, Vertex};
//! use cam_waterline::{CylCutter, WaterlineBuilder};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 10.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let cutter = CylCutter::new(2.0, 20.0).unwrap();
//! let result = WaterlineBuilder::new(&mesh, &cutter)
//!     .z(2.0)
//!     .min_sampling(0.05)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(result.loops.len(), 1);
//! ```

use cam_mesh::Mesh;

use crate::cutter::Cutter;
use crate::error::{WaterlineError, WaterlineResult};
use crate::fiber::Fiber;
use crate::span::Span;
use crate::waterline::{AdaptiveWaterline, WaterlineParams, WaterlineStats};
use crate::weave::Loop;

/// Result from [`WaterlineBuilder`]: loops, fibers and statistics.
#[derive(Debug, Clone)]
pub struct WaterlineBuildResult {
    /// Closed loops around the surface.
    pub loops: Vec<Loop>,
    /// Non-empty x-fibers, increasing in y.
    pub x_fibers: Vec<Fiber>,
    /// Non-empty y-fibers, increasing in x.
    pub y_fibers: Vec<Fiber>,
    /// Run statistics.
    pub stats: WaterlineStats,
}

/// Fluent builder for a single adaptive waterline.
///
/// The height is required; every sampling parameter has a default.
pub struct WaterlineBuilder<'a> {
    mesh: &'a Mesh,
    cutter: &'a dyn Cutter,
    z: Option<f64>,
    params: WaterlineParams,
    spans: Option<Vec<Box<dyn Span>>>,
}

impl<'a> WaterlineBuilder<'a> {
    /// Create a builder for `mesh` cut with `cutter`.
    pub fn new(mesh: &'a Mesh, cutter: &'a dyn Cutter) -> Self {
        Self {
            mesh,
            cutter,
            z: None,
            params: WaterlineParams::default(),
            spans: None,
        }
    }

    // =========================================================================
    // Height and Sampling
    // =========================================================================

    /// Set the waterline height (cutter tip Z).
    pub fn z(mut self, z: f64) -> Self {
        self.z = Some(z);
        self
    }

    /// Set the largest step between neighbouring fibers.
    pub fn sampling(mut self, sampling: f64) -> Self {
        self.params.sampling = sampling;
        self
    }

    /// Set the smallest step the sampler may produce.
    ///
    /// Smaller values follow tight curves more closely at the cost of more
    /// fibers near them.
    pub fn min_sampling(mut self, min_sampling: f64) -> Self {
        self.params.min_sampling = min_sampling;
        self
    }

    /// Set the flatness threshold (cosine of the largest accepted bend).
    pub fn cos_limit(mut self, cos_limit: f64) -> Self {
        self.params.cos_limit = cos_limit;
        self
    }

    /// Enable or disable parallel sampling.
    pub fn parallel(mut self, enable: bool) -> Self {
        self.params.parallel = enable;
        self
    }

    /// Replace all sampling parameters.
    pub fn params(mut self, params: WaterlineParams) -> Self {
        self.params = params;
        self
    }

    /// Sample along custom spans instead of the reachable region diagonal.
    pub fn spans(mut self, spans: Vec<Box<dyn Span>>) -> Self {
        self.spans = Some(spans);
        self
    }

    // =========================================================================
    // Presets
    // =========================================================================

    /// Use finishing-quality sampling.
    pub fn finishing(mut self) -> Self {
        self.params = WaterlineParams {
            parallel: self.params.parallel,
            ..WaterlineParams::for_finishing()
        };
        self
    }

    /// Use coarse roughing sampling.
    pub fn roughing(mut self) -> Self {
        self.params = WaterlineParams {
            parallel: self.params.parallel,
            ..WaterlineParams::for_roughing()
        };
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Run the waterline and return its loops and fibers.
    ///
    /// # Errors
    ///
    /// - `MissingZ` if no height was set
    /// - `InvalidParams` for unusable sampling parameters
    /// - `MeshError` if the surface cannot be indexed
    /// - `WeaveFailed` if the sampled fibers do not form a valid weave
    pub fn build(self) -> WaterlineResult<WaterlineBuildResult> {
        let z = self.z.ok_or(WaterlineError::MissingZ)?;

        let mut waterline = AdaptiveWaterline::with_params(self.params);
        waterline.set_surface(self.mesh);
        waterline.set_cutter(self.cutter);
        waterline.set_z(z);
        if let Some(spans) = self.spans {
            waterline.set_spans(spans);
        }
        waterline.run()?;

        Ok(WaterlineBuildResult {
            loops: waterline.loops().to_vec(),
            x_fibers: waterline.x_fibers().to_vec(),
            y_fibers: waterline.y_fibers().to_vec(),
            stats: waterline.stats().clone(),
        })
    }
}
