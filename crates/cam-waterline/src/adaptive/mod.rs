//! Adaptive fiber sampling.
//!
//! Fibers are placed densely where the waterline bends, starts or ends, and
//! sparsely where it runs straight. See [`AdaptiveSampler`] for the
//! per-span bisection and [`sample_spans`] for running it over many spans in
//! both directions.

mod driver;
mod flat;
mod sampler;

pub use driver::{DualFibers, FIBER_TIE_TOLERANCE, merge_fibers, sample_spans};
pub use flat::{flat_fibers, flat_points};
pub use sampler::{AdaptiveSampler, SampledFibers, SamplingStats};
