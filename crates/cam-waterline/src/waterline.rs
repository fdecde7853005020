//! The adaptive waterline operation.
//!
//! [`AdaptiveWaterline`] ties the pieces together: it samples x- and
//! y-fibers adaptively along spans at one height, weaves them, and extracts
//! the closed loops the cutter follows around the surface.

use cam_mesh::Mesh;
use cam_mesh::tracing_ext::OperationTimer;
use tracing::{debug, info};

use crate::adaptive::{AdaptiveSampler, SamplingStats, sample_spans};
use crate::cutter::Cutter;
use crate::error::{WaterlineError, WaterlineResult};
use crate::fiber::Fiber;
use crate::push::{FiberSource, PushCutter};
use crate::span::{LineSpan, Span};
use crate::weave::{Loop, weave_loops};

/// Sampling parameters for adaptive waterlines.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct WaterlineParams {
    /// Largest allowed step between neighbouring fibers, in model units.
    pub sampling: f64,
    /// Smallest step the sampler may produce. Refinement stops here.
    pub min_sampling: f64,
    /// Cosine of the largest bend angle accepted as flat.
    /// Closer to 1.0 means more refinement on curves.
    pub cos_limit: f64,
    /// Sample spans and directions on the rayon thread pool.
    pub parallel: bool,
}

impl Default for WaterlineParams {
    fn default() -> Self {
        Self {
            sampling: 1.0,
            min_sampling: 0.01,
            cos_limit: 0.999,
            parallel: true,
        }
    }
}

impl WaterlineParams {
    /// Finer sampling for finishing passes.
    pub fn for_finishing() -> Self {
        Self {
            sampling: 0.5,
            min_sampling: 0.005,
            cos_limit: 0.9995,
            parallel: true,
        }
    }

    /// Coarser sampling for fast roughing passes.
    pub fn for_roughing() -> Self {
        Self {
            sampling: 2.0,
            min_sampling: 0.05,
            cos_limit: 0.99,
            parallel: true,
        }
    }

    /// Check that the parameters describe a usable sampling.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParams` naming the first offending parameter.
    pub fn validate(&self) -> WaterlineResult<()> {
        if !(self.sampling.is_finite() && self.sampling > 0.0) {
            return Err(WaterlineError::invalid_param(
                "sampling",
                self.sampling,
                "must be positive and finite",
            ));
        }
        if !(self.min_sampling > 0.0 && self.min_sampling <= self.sampling) {
            return Err(WaterlineError::invalid_param(
                "min_sampling",
                self.min_sampling,
                "must be positive and at most sampling",
            ));
        }
        if !(-1.0..=1.0).contains(&self.cos_limit) {
            return Err(WaterlineError::invalid_param(
                "cos_limit",
                self.cos_limit,
                "must be within [-1, 1]",
            ));
        }
        Ok(())
    }
}

/// Lifecycle of an [`AdaptiveWaterline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterlineState {
    /// Height, surface or cutter still missing.
    Unconfigured,
    /// Ready to run.
    Configured,
    /// Fibers sampled; the weave has not produced loops.
    Sampled,
    /// Loops available.
    Woven,
}

/// Statistics from the last run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaterlineStats {
    /// Sampling counters, both directions combined.
    pub sampling: SamplingStats,
    /// X-direction sampling counters.
    pub x_sampling: SamplingStats,
    /// Y-direction sampling counters.
    pub y_sampling: SamplingStats,
    /// Spans sampled.
    pub spans: usize,
    /// Face cycles walked in the weave.
    pub weave_cycles: usize,
    /// Face cycles dropped for lacking CL vertices.
    pub discarded_cycles: usize,
    /// Wall time of the run.
    pub elapsed_ms: f64,
}

/// Adaptive waterline toolpath at a single height.
///
/// # Example
///
/// ```
/// use cam_mesh::{Mesh, Vertex};
/// use cam_waterline::{AdaptiveWaterline, CylCutter};
///
/// // A single upright triangle
/// let mut mesh = Mesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 10.0));
/// mesh.faces.push([0, 1, 2]);
///
/// let cutter = CylCutter::new(2.0, 20.0).unwrap();
/// let mut waterline = AdaptiveWaterline::new();
/// waterline.set_surface(&mesh);
/// waterline.set_cutter(&cutter);
/// waterline.set_z(2.0);
/// waterline.set_min_sampling(0.05);
/// waterline.run().unwrap();
///
/// assert_eq!(waterline.loops().len(), 1);
/// ```
pub struct AdaptiveWaterline<'a> {
    surface: Option<&'a Mesh>,
    cutter: Option<&'a dyn Cutter>,
    fiber_source: Option<&'a dyn FiberSource>,
    spans: Option<Vec<Box<dyn Span>>>,
    z: Option<f64>,
    params: WaterlineParams,
    x_fibers: Vec<Fiber>,
    y_fibers: Vec<Fiber>,
    loops: Vec<Loop>,
    stats: WaterlineStats,
    state: WaterlineState,
}

impl std::fmt::Debug for AdaptiveWaterline<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveWaterline")
            .field("z", &self.z)
            .field("params", &self.params)
            .field("state", &self.state)
            .field("x_fibers", &self.x_fibers.len())
            .field("y_fibers", &self.y_fibers.len())
            .field("loops", &self.loops.len())
            .finish_non_exhaustive()
    }
}

impl Default for AdaptiveWaterline<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> AdaptiveWaterline<'a> {
    /// Create an unconfigured waterline with default parameters.
    pub fn new() -> Self {
        Self::with_params(WaterlineParams::default())
    }

    /// Create an unconfigured waterline with the given parameters.
    pub fn with_params(params: WaterlineParams) -> Self {
        Self {
            surface: None,
            cutter: None,
            fiber_source: None,
            spans: None,
            z: None,
            params,
            x_fibers: Vec::new(),
            y_fibers: Vec::new(),
            loops: Vec::new(),
            stats: WaterlineStats::default(),
            state: WaterlineState::Unconfigured,
        }
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Set the surface to cut around.
    pub fn set_surface(&mut self, surface: &'a Mesh) {
        self.surface = Some(surface);
        self.refresh_state();
    }

    /// Set the cutter.
    pub fn set_cutter(&mut self, cutter: &'a dyn Cutter) {
        self.cutter = Some(cutter);
        self.refresh_state();
    }

    /// Compute fibers with `source` instead of pushing the cutter against the surface.
    pub fn set_fiber_source(&mut self, source: &'a dyn FiberSource) {
        self.fiber_source = Some(source);
        self.refresh_state();
    }

    /// Set the height of the waterline (cutter tip Z).
    pub fn set_z(&mut self, z: f64) {
        self.z = Some(z);
        self.refresh_state();
    }

    /// Set the largest step between neighbouring fibers.
    pub fn set_sampling(&mut self, sampling: f64) {
        self.params.sampling = sampling;
        self.refresh_state();
    }

    /// Set the smallest step the sampler may produce.
    pub fn set_min_sampling(&mut self, min_sampling: f64) {
        self.params.min_sampling = min_sampling;
        self.refresh_state();
    }

    /// Set the flatness threshold (cosine of the largest accepted bend).
    pub fn set_cos_limit(&mut self, cos_limit: f64) {
        self.params.cos_limit = cos_limit;
        self.refresh_state();
    }

    /// Enable or disable parallel sampling.
    pub fn set_parallel(&mut self, parallel: bool) {
        self.params.parallel = parallel;
        self.refresh_state();
    }

    /// Replace all sampling parameters.
    pub fn set_params(&mut self, params: WaterlineParams) {
        self.params = params;
        self.refresh_state();
    }

    /// Sample along these spans instead of the region diagonal.
    pub fn set_spans(&mut self, spans: Vec<Box<dyn Span>>) {
        self.spans = Some(spans);
        self.refresh_state();
    }

    /// Current sampling parameters.
    pub fn params(&self) -> &WaterlineParams {
        &self.params
    }

    /// Configured height, if any.
    pub fn z(&self) -> Option<f64> {
        self.z
    }

    fn is_configured(&self) -> bool {
        self.z.is_some()
            && (self.fiber_source.is_some() || (self.surface.is_some() && self.cutter.is_some()))
    }

    fn refresh_state(&mut self) {
        self.state = if self.is_configured() {
            WaterlineState::Configured
        } else {
            WaterlineState::Unconfigured
        };
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Sample, weave and extract loops.
    ///
    /// Previous results are cleared first. A surface out of reach of the
    /// cutter, or a sampling region with no area, is not an error: the run
    /// succeeds with no loops.
    ///
    /// # Errors
    ///
    /// - `MissingSurface`, `MissingCutter`, `MissingZ` if not configured
    /// - `InvalidParams` for unusable sampling parameters or a non-finite Z
    /// - `MeshError` if the surface cannot be indexed
    /// - `WeaveFailed` if the sampled fibers do not form a valid weave
    pub fn run(&mut self) -> WaterlineResult<()> {
        let surface_cutter = match self.fiber_source {
            Some(_) => None,
            None => Some((
                self.surface.ok_or(WaterlineError::MissingSurface)?,
                self.cutter.ok_or(WaterlineError::MissingCutter)?,
            )),
        };
        let z = self.z.ok_or(WaterlineError::MissingZ)?;
        self.validate(z)?;

        let pushed = match surface_cutter {
            Some((surface, cutter)) => Some(PushCutter::new(surface, cutter)?),
            None => None,
        };
        let source: &dyn FiberSource = match (&pushed, self.fiber_source) {
            (Some(pushed), _) => pushed,
            (None, Some(source)) => source,
            (None, None) => return Err(WaterlineError::MissingSurface),
        };

        self.x_fibers.clear();
        self.y_fibers.clear();
        self.loops.clear();
        self.stats = WaterlineStats::default();
        self.state = WaterlineState::Configured;

        let timer = OperationTimer::at_height("adaptive_waterline", z);
        let _entered = timer.span().enter();

        let Some(region) = source.reach() else {
            info!(z, "Nothing in reach, waterline is empty");
            self.state = WaterlineState::Woven;
            return Ok(());
        };
        if region.width() <= 0.0 || region.height() <= 0.0 {
            debug!(
                z,
                width = region.width(),
                height = region.height(),
                "Sampling region has no area, waterline is empty"
            );
            self.state = WaterlineState::Woven;
            return Ok(());
        }

        let sampler = AdaptiveSampler::new(source, region, z, self.params);
        let default_spans: Vec<Box<dyn Span>>;
        let spans: &[Box<dyn Span>] = match &self.spans {
            Some(spans) => spans,
            None => {
                default_spans = vec![Box::new(LineSpan::diagonal(&region, z))];
                &default_spans
            }
        };
        let span_count = spans.len();
        let dual = sample_spans(&sampler, spans, self.params.parallel);

        self.stats.sampling = dual.stats();
        self.stats.x_sampling = dual.x_stats;
        self.stats.y_sampling = dual.y_stats;
        self.stats.spans = span_count;
        self.x_fibers = dual.x_fibers;
        self.y_fibers = dual.y_fibers;
        self.state = WaterlineState::Sampled;

        debug!(
            x_fibers = self.x_fibers.len(),
            y_fibers = self.y_fibers.len(),
            flat_checks = self.stats.sampling.flat_checks,
            max_depth = self.stats.sampling.max_depth,
            "Fibers sampled"
        );

        let woven = weave_loops(&self.x_fibers, &self.y_fibers)?;
        self.stats.weave_cycles = woven.cycles;
        self.stats.discarded_cycles = woven.discarded;
        self.loops = woven.loops;
        self.state = WaterlineState::Woven;
        self.stats.elapsed_ms = timer.elapsed_ms();

        info!(
            z,
            loops = self.loops.len(),
            x_fibers = self.x_fibers.len(),
            y_fibers = self.y_fibers.len(),
            fibers_computed = self.stats.sampling.fibers_computed,
            "Adaptive waterline complete"
        );

        Ok(())
    }

    fn validate(&self, z: f64) -> WaterlineResult<()> {
        if !z.is_finite() {
            return Err(WaterlineError::invalid_param("z", z, "must be finite"));
        }
        self.params.validate()
    }

    // =========================================================================
    // Results
    // =========================================================================

    /// Closed loops from the last run.
    pub fn loops(&self) -> &[Loop] {
        &self.loops
    }

    /// Non-empty x-fibers from the last run, increasing in y.
    pub fn x_fibers(&self) -> &[Fiber] {
        &self.x_fibers
    }

    /// Non-empty y-fibers from the last run, increasing in x.
    pub fn y_fibers(&self) -> &[Fiber] {
        &self.y_fibers
    }

    /// Statistics from the last run.
    pub fn stats(&self) -> &WaterlineStats {
        &self.stats
    }

    /// Current lifecycle state.
    pub fn state(&self) -> WaterlineState {
        self.state
    }
}
