//! Tracing extensions for mesh and toolpath operations.
//!
//! Enable tracing by initializing a subscriber in your application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // Set RUST_LOG=cam_waterline=debug,cam_mesh=debug for detailed output
//! ```
//!
//! # Log Levels
//!
//! - **WARN**: Recoverable issues
//! - **INFO**: High-level operation summaries, timing
//! - **DEBUG**: Per-stage statistics, discarded weave cycles, collapsed fibers
//! - **TRACE**: Per-subdivision and per-section detail

use std::time::Instant;
use tracing::{Span, debug, info, trace};

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use cam_mesh::tracing_ext::OperationTimer;
///
/// fn slice_layer(z: f64) {
///     let timer = OperationTimer::at_height("slice_layer", z);
///     let _entered = timer.span().enter();
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a timer tagged with the Z height being processed.
    pub fn at_height(name: &'static str, z: f64) -> Self {
        let span = tracing::info_span!("cam_operation", operation = name, z = z);
        debug!(
            target: "cam_mesh::timing",
            operation = name,
            z = z,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// The span events of this operation can be recorded in.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "cam_mesh::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &crate::Mesh, context: &str) {
    let (min_bounds, max_bounds) = mesh.bounds().unwrap_or_default();
    let dims = max_bounds - min_bounds;

    debug!(
        target: "cam_mesh::mesh_state",
        context = context,
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}

/// Log a performance-critical section.
///
/// Returns a guard that logs when dropped.
#[must_use]
pub fn log_perf_section(name: &'static str) -> impl Drop {
    struct PerfGuard {
        name: &'static str,
        start: Instant,
    }
    impl Drop for PerfGuard {
        fn drop(&mut self) {
            let elapsed = self.start.elapsed();
            trace!(
                target: "cam_mesh::perf",
                section = self.name,
                elapsed_us = elapsed.as_micros(),
                "Performance section completed"
            );
        }
    }
    PerfGuard {
        name,
        start: Instant::now(),
    }
}
