//! Adaptive waterline toolpaths around triangle meshes.
//!
//! A waterline is the set of closed curves a cutter follows at a fixed
//! height while staying in contact with the surface. This crate computes
//! them by pushing the cutter along axis-parallel fibers, sampling those
//! fibers adaptively so they are dense only where the waterline bends, and
//! weaving the x- and y-fibers into a planar graph whose faces yield the
//! loops.
//!
//! # Features
//!
//! - **Push cutter**: exact collision intervals for cylindrical and ball cutters
//! - **Adaptive sampling**: bisection driven by a flatness test on neighbouring fibers
//! - **Weave**: loop extraction from the crossing x/y fiber graph
//! - **Builder API**: one-call waterlines with [`WaterlineBuilder`]
//!
//! # Quick Start
//!
//! ```
//! use cam_mesh::{Mesh, Vertex};
//! use cam_waterline::{BallCutter, WaterlineBuilder};
//!
//! let mut mesh = Mesh::new();
//! mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(10.0, 0.0, 0.0));
//! mesh.vertices.push(Vertex::from_coords(5.0, 0.0, 10.0));
//! mesh.faces.push([0, 1, 2]);
//!
//! let cutter = BallCutter::new(2.0, 20.0).unwrap();
//! let result = WaterlineBuilder::new(&mesh, &cutter)
//!     .z(2.0)
//!     .min_sampling(0.05)
//!     .build()
//!     .unwrap();
//!
//! for lp in &result.loops {
//!     assert_eq!(lp.first(), lp.last());
//! }
//! ```
//!
//! # Low-Level API
//!
//! [`AdaptiveWaterline`] exposes the stateful operation, including custom
//! spans and injected [`FiberSource`]s. The [`adaptive`] and [`weave`]
//! modules can be used on their own.
//!
//! # Error Handling
//!
//! Fallible operations return `WaterlineResult<T>`, which is
//! `Result<T, WaterlineError>`. Errors carry a `WL-XXXX` code and a
//! recovery suggestion.

pub mod adaptive;
mod builder;
pub mod cutter;
mod error;
mod fiber;
pub mod push;
pub mod span;
mod waterline;
pub mod weave;

pub use adaptive::{FIBER_TIE_TOLERANCE, SamplingStats};
pub use builder::{WaterlineBuildResult, WaterlineBuilder};
pub use cutter::{BallCutter, Cutter, CylCutter};
pub use error::{
    WaterlineError, WaterlineErrorCode, WaterlineRecoverySuggestion, WaterlineResult,
};
pub use fiber::{CcPoint, CcType, Fiber, FiberDirection, Interval};
pub use push::{FiberSource, PushCutter};
pub use span::{LineSpan, Span, spans_from_slice};
pub use waterline::{AdaptiveWaterline, WaterlineParams, WaterlineState, WaterlineStats};
pub use weave::{Loop, WeaveError};
