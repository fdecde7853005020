//! End-to-end integration tests for cam-waterline.
//!
//! These tests run the full pipeline from surface -> fibers -> weave -> loops
//! and check the loops against the known offset shape of simple surfaces.

use cam_mesh::{Mesh, Rect, Vertex};
use cam_waterline::weave::weave_loops;
use cam_waterline::{
    AdaptiveWaterline, BallCutter, CylCutter, Fiber, FiberSource, Interval, WaterlineBuilder,
    WaterlineErrorCode, WaterlineParams, WaterlineState, spans_from_slice,
};
use nalgebra::Point3;

/// Create a closed box from (0, 0, 0) to (size, size, height).
fn create_test_box(size: f64, height: f64) -> Mesh {
    let mut mesh = Mesh::new();

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
    mesh.vertices.push(Vertex::from_coords(size, 0.0, 0.0)); // 1
    mesh.vertices.push(Vertex::from_coords(size, size, 0.0)); // 2
    mesh.vertices.push(Vertex::from_coords(0.0, size, 0.0)); // 3
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, height)); // 4
    mesh.vertices.push(Vertex::from_coords(size, 0.0, height)); // 5
    mesh.vertices.push(Vertex::from_coords(size, size, height)); // 6
    mesh.vertices.push(Vertex::from_coords(0.0, size, height)); // 7

    // Bottom
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);
    // Top
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);
    // Front
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);
    // Back
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);
    // Left
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);
    // Right
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}

/// Horizontal distance from `p` to the square `[0, size]^2`.
fn distance_to_square(p: &Point3<f64>, size: f64) -> f64 {
    let dx = (-p.x).max(p.x - size).max(0.0);
    let dy = (-p.y).max(p.y - size).max(0.0);
    (dx * dx + dy * dy).sqrt()
}

fn sequential(min_sampling: f64) -> WaterlineParams {
    WaterlineParams {
        min_sampling,
        parallel: false,
        ..WaterlineParams::default()
    }
}

/// Analytic disk of radius 3 around (5, 5): no surface needed.
struct Disk;

impl FiberSource for Disk {
    fn reach(&self) -> Option<Rect> {
        Some(Rect::new(0.0, 10.0, 0.0, 10.0))
    }

    fn compute_fiber(&self, mut fiber: Fiber) -> Fiber {
        let d = fiber.coordinate() - 5.0;
        if d.abs() < 3.0 {
            let half = (9.0 - d * d).sqrt();
            let lo = fiber.t_at(5.0 - half);
            let hi = fiber.t_at(5.0 + half);
            fiber.add_interval(Interval::from_bounds(lo, hi));
        }
        fiber
    }
}

// =============================================================================
// Surfaces
// =============================================================================

#[test]
fn test_cylinder_around_box_gives_offset_loop() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = CylCutter::new(2.0, 10.0).unwrap();

    let mut wl = AdaptiveWaterline::with_params(sequential(0.05));
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(2.0);
    wl.run().unwrap();

    assert_eq!(wl.state(), WaterlineState::Woven);
    assert_eq!(wl.loops().len(), 1);

    let lp = &wl.loops()[0];
    assert_eq!(lp.first(), lp.last());
    for p in lp {
        assert!((p.z - 2.0).abs() < 1e-12);
        let d = distance_to_square(p, 10.0);
        assert!((d - 1.0).abs() < 1e-6, "point {:?} is {} from the box", p, d);
    }

    assert!(wl.x_fibers().iter().all(|f| !f.is_empty()));
    assert!(wl.y_fibers().iter().all(|f| !f.is_empty()));
}

#[test]
fn test_ball_around_box_gives_offset_loop() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = BallCutter::new(2.0, 10.0).unwrap();

    let mut wl = AdaptiveWaterline::with_params(sequential(0.05));
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(2.0);
    wl.run().unwrap();

    assert_eq!(wl.loops().len(), 1);
    for p in &wl.loops()[0] {
        let d = distance_to_square(p, 10.0);
        assert!((d - 1.0).abs() < 1e-6, "point {:?} is {} from the box", p, d);
    }
}

#[test]
fn test_above_surface_gives_no_loops() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = CylCutter::new(2.0, 10.0).unwrap();

    let mut wl = AdaptiveWaterline::with_params(sequential(0.05));
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(6.0);
    wl.run().unwrap();

    assert!(wl.loops().is_empty());
    assert!(wl.x_fibers().is_empty());
    assert!(wl.y_fibers().is_empty());
    assert_eq!(wl.state(), WaterlineState::Woven);
}

#[test]
fn test_empty_surface_is_not_an_error() {
    let mesh = Mesh::new();
    let cutter = CylCutter::new(2.0, 10.0).unwrap();

    let mut wl = AdaptiveWaterline::new();
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(0.0);
    wl.run().unwrap();

    assert!(wl.loops().is_empty());
    assert_eq!(wl.stats().sampling.fibers_computed, 0);
}

#[test]
fn test_slice_spans_guide_sampling() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = CylCutter::new(2.0, 10.0).unwrap();
    let spans = spans_from_slice(&mesh, 2.0);
    let span_count = spans.len();
    assert!(span_count >= 4);

    let mut wl = AdaptiveWaterline::with_params(sequential(0.05));
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(2.0);
    wl.set_spans(spans);
    wl.run().unwrap();

    assert_eq!(wl.stats().spans, span_count);
    assert_eq!(wl.loops().len(), 1);
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_missing_configuration_codes() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = CylCutter::new(2.0, 10.0).unwrap();
    let mut wl = AdaptiveWaterline::new();

    let err = wl.run().unwrap_err();
    assert_eq!(err.code(), WaterlineErrorCode::MissingSurface);
    assert_eq!(err.code().as_str(), "WL-1001");

    wl.set_surface(&mesh);
    assert_eq!(wl.run().unwrap_err().code(), WaterlineErrorCode::MissingCutter);

    wl.set_cutter(&cutter);
    assert_eq!(wl.run().unwrap_err().code(), WaterlineErrorCode::MissingZ);
    assert_eq!(wl.state(), WaterlineState::Unconfigured);

    wl.set_z(2.0);
    assert_eq!(wl.state(), WaterlineState::Configured);

    wl.set_cos_limit(2.0);
    let err = wl.run().unwrap_err();
    assert_eq!(err.code(), WaterlineErrorCode::InvalidParams);
    assert!(err.is_config_error());
}

#[test]
fn test_invalid_cutter_rejected() {
    assert!(CylCutter::new(0.0, 10.0).is_err());
    assert!(BallCutter::new(2.0, -1.0).is_err());
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_rerun_gives_identical_results() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = CylCutter::new(2.0, 10.0).unwrap();

    let mut wl = AdaptiveWaterline::with_params(sequential(0.1));
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(2.0);

    wl.run().unwrap();
    let loops = wl.loops().to_vec();
    let x_fibers = wl.x_fibers().to_vec();
    let y_fibers = wl.y_fibers().to_vec();

    wl.run().unwrap();
    assert_eq!(wl.loops(), loops.as_slice());
    assert_eq!(wl.x_fibers(), x_fibers.as_slice());
    assert_eq!(wl.y_fibers(), y_fibers.as_slice());
}

#[test]
fn test_parallel_matches_sequential() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = BallCutter::new(3.0, 10.0).unwrap();

    let run = |parallel: bool| {
        WaterlineBuilder::new(&mesh, &cutter)
            .z(1.0)
            .min_sampling(0.05)
            .parallel(parallel)
            .build()
            .unwrap()
    };

    let seq = run(false);
    let par = run(true);
    assert_eq!(seq.x_fibers, par.x_fibers);
    assert_eq!(seq.y_fibers, par.y_fibers);
    assert_eq!(seq.loops, par.loops);
    assert_eq!(seq.stats.sampling, par.stats.sampling);
}

#[test]
fn test_builder_matches_stateful_api() {
    let mesh = create_test_box(10.0, 5.0);
    let cutter = CylCutter::new(2.0, 10.0).unwrap();
    let params = sequential(0.05);

    let built = WaterlineBuilder::new(&mesh, &cutter)
        .params(params)
        .z(2.0)
        .build()
        .unwrap();

    let mut wl = AdaptiveWaterline::with_params(params);
    wl.set_surface(&mesh);
    wl.set_cutter(&cutter);
    wl.set_z(2.0);
    wl.run().unwrap();

    assert_eq!(built.loops, wl.loops());
    assert_eq!(built.x_fibers, wl.x_fibers());
}

// =============================================================================
// Injected Fiber Sources
// =============================================================================

#[test]
fn test_disk_source_loop_follows_circle() {
    let mut wl = AdaptiveWaterline::with_params(sequential(0.01));
    wl.set_fiber_source(&Disk);
    wl.set_z(0.0);
    wl.run().unwrap();

    assert_eq!(wl.loops().len(), 1);
    let lp = &wl.loops()[0];
    assert!(lp.len() > 20);
    for p in lp {
        let r = ((p.x - 5.0).powi(2) + (p.y - 5.0).powi(2)).sqrt();
        assert!((r - 3.0).abs() < 1e-9);
    }
}

#[test]
fn test_refinement_concentrates_at_curvature() {
    let mut coarse = AdaptiveWaterline::with_params(WaterlineParams {
        cos_limit: 0.9,
        ..sequential(0.01)
    });
    coarse.set_fiber_source(&Disk);
    coarse.set_z(0.0);
    coarse.run().unwrap();

    let mut fine = AdaptiveWaterline::with_params(WaterlineParams {
        cos_limit: 0.99999,
        ..sequential(0.01)
    });
    fine.set_fiber_source(&Disk);
    fine.set_z(0.0);
    fine.run().unwrap();

    assert!(fine.stats().sampling.fibers_computed > coarse.stats().sampling.fibers_computed);
    assert!(fine.stats().sampling.max_depth >= coarse.stats().sampling.max_depth);
}

// =============================================================================
// Weave
// =============================================================================

#[test]
fn test_square_weave_gives_single_loop() {
    let x_fibers: Vec<Fiber> = (0..10)
        .map(|i| {
            let mut f = Fiber::along_x(i as f64 + 0.5, -5.0, 15.0, 0.0);
            f.add_interval(Interval::from_bounds(0.25, 0.75));
            f
        })
        .collect();
    let y_fibers: Vec<Fiber> = (0..10)
        .map(|i| {
            let mut f = Fiber::along_y(i as f64 + 0.5, -5.0, 15.0, 0.0);
            f.add_interval(Interval::from_bounds(0.25, 0.75));
            f
        })
        .collect();

    let woven = weave_loops(&x_fibers, &y_fibers).unwrap();
    assert_eq!(woven.loops.len(), 1);
    assert_eq!(woven.loops[0].len(), 41);
    // 9 x 9 interior cells plus the outer face
    assert_eq!(woven.cycles, 82);
    assert_eq!(woven.discarded, 81);

    for p in &woven.loops[0] {
        let on_x_edge = (p.x - 0.0).abs() < 1e-12 || (p.x - 10.0).abs() < 1e-12;
        let on_y_edge = (p.y - 0.0).abs() < 1e-12 || (p.y - 10.0).abs() < 1e-12;
        assert!(on_x_edge || on_y_edge);
    }
}
