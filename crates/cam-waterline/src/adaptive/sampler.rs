//! Adaptive fiber sampling along one span in one direction.
//!
//! Starting from fibers at both ends of a span, the sampler bisects the
//! span in parameter space wherever the step is still coarser than
//! `sampling` or the three fibers around the midpoint are not flat. It stops
//! bisecting once half a step would fall below `min_sampling`.

use cam_mesh::Rect;
use tracing::trace;

use super::flat::flat_fibers;
use crate::fiber::{Fiber, FiberDirection};
use crate::push::FiberSource;
use crate::span::Span;
use crate::waterline::WaterlineParams;

/// Counters collected while sampling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SamplingStats {
    /// Fibers computed through the fiber source.
    pub fibers_computed: usize,
    /// Flatness checks performed.
    pub flat_checks: usize,
    /// Fibers accepted into the output, before merging.
    pub fibers_accepted: usize,
    /// Deepest bisection level reached.
    pub max_depth: usize,
}

impl SamplingStats {
    /// Fold another set of counters into this one.
    pub fn merge(&mut self, other: &SamplingStats) {
        self.fibers_computed += other.fibers_computed;
        self.flat_checks += other.flat_checks;
        self.fibers_accepted += other.fibers_accepted;
        self.max_depth = self.max_depth.max(other.max_depth);
    }
}

/// Fibers sampled along one span, in increasing span parameter.
#[derive(Debug, Clone, Default)]
pub struct SampledFibers {
    pub fibers: Vec<Fiber>,
    pub stats: SamplingStats,
}

/// One pending bisection: the half-open span range `(start_t, stop_t]`.
struct Segment {
    start_t: f64,
    stop_t: f64,
    start: Fiber,
    stop: Fiber,
    depth: usize,
}

/// Places fibers along spans inside a sampling region at one height.
#[derive(Clone, Copy)]
pub struct AdaptiveSampler<'a> {
    source: &'a dyn FiberSource,
    region: Rect,
    z: f64,
    params: WaterlineParams,
}

impl std::fmt::Debug for AdaptiveSampler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdaptiveSampler")
            .field("region", &self.region)
            .field("z", &self.z)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl<'a> AdaptiveSampler<'a> {
    pub fn new(source: &'a dyn FiberSource, region: Rect, z: f64, params: WaterlineParams) -> Self {
        Self {
            source,
            region,
            z,
            params,
        }
    }

    /// The sampling region.
    pub fn region(&self) -> &Rect {
        &self.region
    }

    /// Compute the full-width fiber of `direction` at the given constant coordinate.
    pub fn fiber_at(&self, direction: FiberDirection, coordinate: f64) -> Fiber {
        let r = &self.region;
        let fiber = match direction {
            FiberDirection::X => Fiber::along_x(coordinate, r.min_x, r.max_x, self.z),
            FiberDirection::Y => Fiber::along_y(coordinate, r.min_y, r.max_y, self.z),
        };
        self.source.compute_fiber(fiber)
    }

    fn fiber_at_span(&self, span: &dyn Span, direction: FiberDirection, t: f64) -> Fiber {
        let p = span.point(t);
        self.fiber_at(direction, direction.fixed_coordinate(&p))
    }

    /// Sample `span` with fibers of `direction`.
    ///
    /// The fiber at `t = 0` is recorded first; every accepted subdivision
    /// records its stop fiber, so the output is ordered by span parameter
    /// and each fiber appears once.
    pub fn sample(&self, span: &dyn Span, direction: FiberDirection) -> SampledFibers {
        let mut stats = SamplingStats::default();

        let start = self.fiber_at_span(span, direction, 0.0);
        let stop = self.fiber_at_span(span, direction, 1.0);
        stats.fibers_computed += 2;

        let mut fibers = vec![start.clone()];
        let mut stack = vec![Segment {
            start_t: 0.0,
            stop_t: 1.0,
            start,
            stop,
            depth: 0,
        }];

        while let Some(seg) = stack.pop() {
            stats.max_depth = stats.max_depth.max(seg.depth);

            let step = (seg.start.coordinate() - seg.stop.coordinate()).abs();
            let can_split = step / 2.0 >= self.params.min_sampling;
            if !can_split {
                fibers.push(seg.stop);
                continue;
            }

            let mid_t = seg.start_t + (seg.stop_t - seg.start_t) / 2.0;
            let mid = self.fiber_at_span(span, direction, mid_t);
            stats.fibers_computed += 1;

            let coarse = step > self.params.sampling;
            let split = coarse || {
                stats.flat_checks += 1;
                !flat_fibers(&seg.start, &mid, &seg.stop, self.params.cos_limit)
            };

            if !split {
                fibers.push(seg.stop);
                continue;
            }

            trace!(
                direction = %direction,
                depth = seg.depth,
                step,
                coarse,
                "Subdividing span"
            );

            // Right half first so the left half is processed next
            stack.push(Segment {
                start_t: mid_t,
                stop_t: seg.stop_t,
                start: mid.clone(),
                stop: seg.stop,
                depth: seg.depth + 1,
            });
            stack.push(Segment {
                start_t: seg.start_t,
                stop_t: mid_t,
                start: seg.start,
                stop: mid,
                depth: seg.depth + 1,
            });
        }

        stats.fibers_accepted = fibers.len();
        SampledFibers { fibers, stats }
    }
}
