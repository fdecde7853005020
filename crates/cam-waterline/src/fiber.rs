//! Fibers: axis-parallel probe lines carrying cutter clearance intervals.
//!
//! A fiber is a line segment at a fixed Z running parallel to X or Y. Pushing
//! a cutter along it records the parameter intervals where the cutter would
//! collide with the surface. Interval endpoints are cutter-location (CL)
//! points on the waterline.

use cam_mesh::LineAxis;
use nalgebra::Point3;

/// Scan direction of a fiber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FiberDirection {
    /// Runs along X at constant Y.
    X,
    /// Runs along Y at constant X.
    Y,
}

impl FiberDirection {
    /// Axis of the spatial index line matching this direction.
    #[inline]
    pub fn axis(self) -> LineAxis {
        match self {
            FiberDirection::X => LineAxis::X,
            FiberDirection::Y => LineAxis::Y,
        }
    }

    /// Coordinate that stays constant along a fiber of this direction.
    #[inline]
    pub fn fixed_coordinate(self, p: &Point3<f64>) -> f64 {
        match self {
            FiberDirection::X => p.y,
            FiberDirection::Y => p.x,
        }
    }

    /// Coordinate that varies along a fiber of this direction.
    #[inline]
    pub fn running_coordinate(self, p: &Point3<f64>) -> f64 {
        match self {
            FiberDirection::X => p.x,
            FiberDirection::Y => p.y,
        }
    }
}

impl std::fmt::Display for FiberDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FiberDirection::X => write!(f, "x"),
            FiberDirection::Y => write!(f, "y"),
        }
    }
}

/// Which cutter feature touched the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CcType {
    /// No contact recorded.
    #[default]
    None,
    /// Contact with a triangle vertex.
    Vertex,
    /// Contact with a triangle edge.
    Edge,
    /// Contact with a triangle face interior.
    Facet,
    /// Contact with the cutter shaft above the cutting end.
    Shaft,
}

/// Cutter-contact point on the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CcPoint {
    pub position: Point3<f64>,
    pub kind: CcType,
}

impl CcPoint {
    #[inline]
    pub fn new(position: Point3<f64>, kind: CcType) -> Self {
        Self { position, kind }
    }

    /// Placeholder for endpoints without a known contact.
    #[inline]
    pub fn none() -> Self {
        Self {
            position: Point3::origin(),
            kind: CcType::None,
        }
    }
}

impl Default for CcPoint {
    fn default() -> Self {
        Self::none()
    }
}

/// A parameter interval `[lower, upper]` on a fiber where the cutter collides.
///
/// A fresh interval is empty; [`Interval::update`] widens it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
    pub lower_cc: CcPoint,
    pub upper_cc: CcPoint,
}

impl Interval {
    /// Create an empty interval.
    pub fn new() -> Self {
        Self {
            lower: f64::INFINITY,
            upper: f64::NEG_INFINITY,
            lower_cc: CcPoint::none(),
            upper_cc: CcPoint::none(),
        }
    }

    /// Create an interval from explicit bounds, without contact points.
    pub fn from_bounds(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            lower_cc: CcPoint::none(),
            upper_cc: CcPoint::none(),
        }
    }

    /// Check whether the interval has never been updated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    /// Widen the interval to include `t`, recording the contact for new extremes.
    pub fn update(&mut self, t: f64, cc: CcPoint) {
        if t < self.lower {
            self.lower = t;
            self.lower_cc = cc;
        }
        if t > self.upper {
            self.upper = t;
            self.upper_cc = cc;
        }
    }

    /// Widen this interval by another one.
    pub fn merge(&mut self, other: &Interval) {
        if other.is_empty() {
            return;
        }
        self.update(other.lower, other.lower_cc);
        self.update(other.upper, other.upper_cc);
    }

    /// Check whether two non-empty intervals share at least one point.
    #[inline]
    pub fn overlaps(&self, other: &Interval) -> bool {
        !self.is_empty() && !other.is_empty() && self.lower <= other.upper && other.lower <= self.upper
    }

    /// Length in parameter space (zero for empty intervals).
    #[inline]
    pub fn width(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            self.upper - self.lower
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::new()
    }
}

/// An axis-parallel probe line with its ordered, disjoint collision intervals.
#[derive(Debug, Clone, PartialEq)]
pub struct Fiber {
    pub p1: Point3<f64>,
    pub p2: Point3<f64>,
    direction: FiberDirection,
    intervals: Vec<Interval>,
}

impl Fiber {
    /// Create a fiber along X at constant `y`.
    pub fn along_x(y: f64, min_x: f64, max_x: f64, z: f64) -> Self {
        Self {
            p1: Point3::new(min_x, y, z),
            p2: Point3::new(max_x, y, z),
            direction: FiberDirection::X,
            intervals: Vec::new(),
        }
    }

    /// Create a fiber along Y at constant `x`.
    pub fn along_y(x: f64, min_y: f64, max_y: f64, z: f64) -> Self {
        Self {
            p1: Point3::new(x, min_y, z),
            p2: Point3::new(x, max_y, z),
            direction: FiberDirection::Y,
            intervals: Vec::new(),
        }
    }

    #[inline]
    pub fn direction(&self) -> FiberDirection {
        self.direction
    }

    /// The constant coordinate: y for x-fibers, x for y-fibers.
    #[inline]
    pub fn coordinate(&self) -> f64 {
        self.direction.fixed_coordinate(&self.p1)
    }

    /// Height of the fiber.
    #[inline]
    pub fn z(&self) -> f64 {
        self.p1.z
    }

    /// Point at parameter `t`, with `t = 0` at `p1` and `t = 1` at `p2`.
    #[inline]
    pub fn point(&self, t: f64) -> Point3<f64> {
        self.p1 + (self.p2 - self.p1) * t
    }

    /// Parameter of the point on the fiber with the given running coordinate.
    pub fn t_at(&self, running: f64) -> f64 {
        let a = self.direction.running_coordinate(&self.p1);
        let b = self.direction.running_coordinate(&self.p2);
        (running - a) / (b - a)
    }

    /// Length of the fiber.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).norm()
    }

    /// Add an interval, clamping it to `[0, 1]` and merging with any overlap.
    ///
    /// Intervals stay sorted by `lower` and pairwise disjoint.
    pub fn add_interval(&mut self, interval: Interval) {
        if interval.is_empty() || interval.upper < 0.0 || interval.lower > 1.0 {
            return;
        }

        let mut merged = interval;
        if merged.lower < 0.0 {
            merged.lower = 0.0;
            merged.lower_cc = CcPoint::none();
        }
        if merged.upper > 1.0 {
            merged.upper = 1.0;
            merged.upper_cc = CcPoint::none();
        }

        let mut kept = Vec::with_capacity(self.intervals.len() + 1);
        for existing in self.intervals.drain(..) {
            if existing.overlaps(&merged) {
                merged.merge(&existing);
            } else {
                kept.push(existing);
            }
        }
        kept.push(merged);
        kept.sort_by(|a, b| a.lower.total_cmp(&b.lower));
        self.intervals = kept;
    }

    /// The collision intervals, sorted by `lower`.
    #[inline]
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of intervals.
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Check whether the fiber never touches the surface.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// CL point at the lower end of interval `n`.
    #[inline]
    pub fn lower_cl(&self, n: usize) -> Point3<f64> {
        self.point(self.intervals[n].lower)
    }

    /// CL point at the upper end of interval `n`.
    #[inline]
    pub fn upper_cl(&self, n: usize) -> Point3<f64> {
        self.point(self.intervals[n].upper)
    }
}
