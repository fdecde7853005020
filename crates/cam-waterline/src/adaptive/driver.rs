//! Dual-direction sampling over a set of spans.

use rayon::prelude::*;
use tracing::debug;

use super::sampler::{AdaptiveSampler, SampledFibers, SamplingStats};
use crate::fiber::{Fiber, FiberDirection};
use crate::span::Span;

/// Fibers whose coordinates differ by less than this are the same fiber.
pub const FIBER_TIE_TOLERANCE: f64 = 1e-9;

/// Merged fibers of both directions.
#[derive(Debug, Clone, Default)]
pub struct DualFibers {
    /// Non-empty x-fibers, strictly increasing in y.
    pub x_fibers: Vec<Fiber>,
    /// Non-empty y-fibers, strictly increasing in x.
    pub y_fibers: Vec<Fiber>,
    /// Counters for x-direction sampling.
    pub x_stats: SamplingStats,
    /// Counters for y-direction sampling.
    pub y_stats: SamplingStats,
}

impl DualFibers {
    /// Counters of both directions combined.
    pub fn stats(&self) -> SamplingStats {
        let mut stats = self.x_stats;
        stats.merge(&self.y_stats);
        stats
    }
}

/// Sample every span in both directions and merge the results.
///
/// Spans of zero length are skipped. With `parallel` set, spans are sampled
/// concurrently and each span's two directions run side by side. The merged
/// output does not depend on it.
pub fn sample_spans(sampler: &AdaptiveSampler<'_>, spans: &[Box<dyn Span>], parallel: bool) -> DualFibers {
    let usable: Vec<&dyn Span> = spans
        .iter()
        .map(|span| span.as_ref())
        .filter(|span| span.length() > 0.0)
        .collect();
    if usable.len() < spans.len() {
        debug!(skipped = spans.len() - usable.len(), "Skipped zero-length spans");
    }

    let sample_both = |span: &&dyn Span| -> (SampledFibers, SampledFibers) {
        let span = *span;
        if parallel {
            rayon::join(
                || sampler.sample(span, FiberDirection::X),
                || sampler.sample(span, FiberDirection::Y),
            )
        } else {
            (
                sampler.sample(span, FiberDirection::X),
                sampler.sample(span, FiberDirection::Y),
            )
        }
    };

    let per_span: Vec<(SampledFibers, SampledFibers)> = if parallel {
        usable.par_iter().map(sample_both).collect()
    } else {
        usable.iter().map(sample_both).collect()
    };

    let mut x_stats = SamplingStats::default();
    let mut y_stats = SamplingStats::default();
    let mut x_all = Vec::new();
    let mut y_all = Vec::new();
    for (x, y) in per_span {
        x_stats.merge(&x.stats);
        y_stats.merge(&y.stats);
        x_all.extend(x.fibers);
        y_all.extend(y.fibers);
    }

    let x_fibers = merge_fibers(x_all, FiberDirection::X);
    let y_fibers = merge_fibers(y_all, FiberDirection::Y);

    debug!(
        spans = usable.len(),
        x_fibers = x_fibers.len(),
        y_fibers = y_fibers.len(),
        x_computed = x_stats.fibers_computed,
        y_computed = y_stats.fibers_computed,
        "Spans sampled"
    );

    DualFibers {
        x_fibers,
        y_fibers,
        x_stats,
        y_stats,
    }
}

/// Sort fibers by coordinate, collapse ties and drop empty fibers.
///
/// The sort is stable, so of several tied fibers the first sampled is kept.
pub fn merge_fibers(mut fibers: Vec<Fiber>, direction: FiberDirection) -> Vec<Fiber> {
    let before = fibers.len();
    fibers.sort_by(|a, b| a.coordinate().total_cmp(&b.coordinate()));
    fibers.dedup_by(|next, kept| (next.coordinate() - kept.coordinate()).abs() < FIBER_TIE_TOLERANCE);
    let duplicates = before - fibers.len();

    if duplicates > 0 {
        debug!(
            direction = %direction,
            duplicates,
            total = before,
            "Collapsed duplicate fibers"
        );
    }

    fibers.retain(|f| !f.is_empty());
    fibers
}
