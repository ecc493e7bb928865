//! Reference shapes for lattice embedding.
//!
//! A [`Shape`] is an oriented volume primitive (cube, cylinder or
//! sphere) that maps between three coordinate frames:
//!
//! - **world**: the global Cartesian frame geometry lives in
//! - **local**: the shape's curvilinear frame (Cartesian offsets for a
//!   cube, radius/azimuth/height for a cylinder,
//!   radius/azimuth/polar for a sphere)
//! - **basic**: the unit cube `[0,1]^3`, where every shape looks alike
//!
//! A deformation lattice is built in basic coordinates and carried into
//! the world through these maps, which is what lets one lattice code
//! path wrap a box, a pipe or a ball.

use crate::Aabb;
use nalgebra::{Matrix3, Point3, Vector3};
use std::f64::consts::{PI, TAU};
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tolerance for the pairwise orthogonality check on reference axes.
const AXES_ORTHO_TOL: f64 = 1.0e-12;

/// Highest admissible polar origin, a hair below the south pole.
const POLAR_ORIGIN_LIMIT: f64 = (0.5 - 1.0e-12) * TAU;

/// The topology of a reference shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ShapeKind {
    /// Axis-aligned box in its local frame. Local coordinates are
    /// Cartesian offsets from the center, spanning `[-0.5, 0.5]` before
    /// scaling.
    Cube,
    /// Cylinder or cylindrical wedge. Local coordinates are
    /// `(radius, azimuth, height)` with the origin at mid-height.
    Cylinder,
    /// Sphere or spherical sector. Local coordinates are
    /// `(radius, azimuth, polar)` with the origin at the center.
    Sphere,
}

impl std::fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cube => write!(f, "cube"),
            Self::Cylinder => write!(f, "cylinder"),
            Self::Sphere => write!(f, "sphere"),
        }
    }
}

/// An oriented volume primitive with world/local/basic coordinate maps.
///
/// The shape stores its physical extent as a per-axis `scaling` on top
/// of a canonical local span, so the basic frame is always the unit
/// cube regardless of size. Angular spans are clamped to a full turn
/// and drive the periodicity flag of the azimuth axis.
///
/// Setters follow a clamp-and-continue policy: out-of-range values are
/// brought back into range and invalid requests (such as an angular
/// origin on a cube) leave the shape untouched. Rejections are logged.
///
/// # Example
///
/// ```
/// use ffd_types::{Point3, Shape};
///
/// let cube = Shape::cube(Point3::new(0.0, 0.0, 0.0), [2.0, 2.0, 2.0]);
///
/// assert!(cube.contains(&Point3::new(0.9, -0.9, 0.0)));
/// assert!(!cube.contains(&Point3::new(1.1, 0.0, 0.0)));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Shape {
    kind: ShapeKind,
    origin: Point3<f64>,
    /// Span in local coordinates: unit lengths for scaled axes, raw
    /// angles for angular axes.
    local_span: Vector3<f64>,
    /// Per-axis factor from local to world units.
    scaling: Vector3<f64>,
    /// Lower bound of each local coordinate interval. Only angular
    /// axes may move away from zero.
    inf_limits: Vector3<f64>,
    /// Rows are the local axis directions in world coordinates.
    axes: Matrix3<f64>,
    periodic: [bool; 3],
}

impl Shape {
    /// Create an axis-aligned cube centered at `origin`.
    ///
    /// `span` holds the edge lengths along the local x, y, z axes.
    #[must_use]
    pub fn cube(origin: Point3<f64>, span: [f64; 3]) -> Self {
        Self::with_kind(ShapeKind::Cube, origin, span)
    }

    /// Create a cylinder centered at `origin` (mid-height).
    ///
    /// `span` holds `[radius, azimuth span, height]`. An azimuth span
    /// of `2π` closes the loop and marks the axis periodic; larger
    /// values are clamped.
    #[must_use]
    pub fn cylinder(origin: Point3<f64>, span: [f64; 3]) -> Self {
        Self::with_kind(ShapeKind::Cylinder, origin, span)
    }

    /// Create a sphere centered at `origin`.
    ///
    /// `span` holds `[radius, azimuth span, polar span]`. The azimuth
    /// span is clamped to `2π` and the polar span to whatever is left
    /// between the polar origin and the south pole.
    #[must_use]
    pub fn sphere(origin: Point3<f64>, span: [f64; 3]) -> Self {
        Self::with_kind(ShapeKind::Sphere, origin, span)
    }

    fn with_kind(kind: ShapeKind, origin: Point3<f64>, span: [f64; 3]) -> Self {
        let mut shape = Self {
            kind,
            origin,
            local_span: Vector3::new(1.0, 1.0, 1.0),
            scaling: Vector3::new(1.0, 1.0, 1.0),
            inf_limits: Vector3::zeros(),
            axes: Matrix3::identity(),
            periodic: [false; 3],
        };
        shape.set_span(span[0], span[1], span[2]);
        shape
    }

    /// Create a cube wrapping an AABB with a uniform margin.
    ///
    /// # Example
    ///
    /// ```
    /// use ffd_types::{Aabb, Point3, Shape};
    ///
    /// let bounds = Aabb::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 2.0, 2.0),
    /// );
    /// let shape = Shape::cube_around(&bounds, 0.5);
    ///
    /// assert!(shape.contains(&Point3::new(-0.4, 1.0, 1.0)));
    /// ```
    #[must_use]
    pub fn cube_around(bounds: &Aabb, margin: f64) -> Self {
        let padded = bounds.expanded(margin);
        let size = padded.size();
        Self::cube(padded.center(), [size.x, size.y, size.z])
    }

    /// Shape topology.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// World-space barycenter of the shape.
    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point3<f64> {
        self.origin
    }

    /// Move the shape barycenter.
    pub fn set_origin(&mut self, origin: Point3<f64>) {
        self.origin = origin;
    }

    /// Physical span along each local coordinate.
    ///
    /// Lengths for scaled axes, angles for angular axes.
    #[inline]
    #[must_use]
    pub fn span(&self) -> Vector3<f64> {
        self.local_span.component_mul(&self.scaling)
    }

    /// Span in local coordinates (angles kept raw, unit elsewhere).
    #[inline]
    #[must_use]
    pub const fn local_span(&self) -> Vector3<f64> {
        self.local_span
    }

    /// Per-axis local-to-world scale factors.
    #[inline]
    #[must_use]
    pub const fn scaling(&self) -> Vector3<f64> {
        self.scaling
    }

    /// Lower bound of each local coordinate interval.
    #[inline]
    #[must_use]
    pub const fn inf_limits(&self) -> Vector3<f64> {
        self.inf_limits
    }

    /// Local reference axes, one per row, in world coordinates.
    #[inline]
    #[must_use]
    pub const fn axes(&self) -> Matrix3<f64> {
        self.axes
    }

    /// Check if a local coordinate axis wraps around on itself.
    ///
    /// Only the azimuth axis of a cylinder or sphere with a full `2π`
    /// span is periodic.
    #[inline]
    #[must_use]
    pub const fn is_periodic(&self, axis: usize) -> bool {
        self.periodic[axis]
    }

    /// Resize the shape, clamping spans to the admissible range.
    ///
    /// Negative spans are folded positive. Angular spans are capped at
    /// a full turn (and, for the polar axis, at the arc left before
    /// the south pole); a full azimuth turn marks that axis periodic.
    pub fn set_span(&mut self, s0: f64, s1: f64, s2: f64) {
        let (mut s0, mut s1, mut s2) = (s0.abs(), s1.abs(), s2.abs());

        match self.kind {
            ShapeKind::Cube => {}
            ShapeKind::Cylinder => {
                if s1 > TAU {
                    debug!(requested = s1, "azimuth span clamped to full turn");
                }
                s1 = s1.min(TAU);
                self.periodic[1] = s1 >= TAU;
            }
            ShapeKind::Sphere => {
                if s1 > TAU {
                    debug!(requested = s1, "azimuth span clamped to full turn");
                }
                s1 = s1.min(TAU);
                let polar_max = PI - self.inf_limits[2];
                if s2 > polar_max {
                    debug!(requested = s2, max = polar_max, "polar span clamped");
                }
                s2 = s2.min(polar_max);
                self.periodic[1] = s1 >= TAU;
            }
        }

        self.apply_scaling(s0, s1, s2);
    }

    /// Store the checked span as canonical local span plus scaling.
    fn apply_scaling(&mut self, s0: f64, s1: f64, s2: f64) {
        self.local_span = Vector3::new(1.0, 1.0, 1.0);
        self.scaling = Vector3::new(1.0, 1.0, 1.0);
        match self.kind {
            ShapeKind::Cube => {
                self.scaling = Vector3::new(s0, s1, s2);
            }
            ShapeKind::Cylinder => {
                self.local_span[1] = s1;
                self.scaling[0] = s0;
                self.scaling[2] = s2;
            }
            ShapeKind::Sphere => {
                self.local_span[1] = s1;
                self.local_span[2] = s2;
                self.scaling[0] = s0;
            }
        }
    }

    /// Move the lower bound of an angular coordinate interval.
    ///
    /// The physical span is preserved and re-clamped against the new
    /// origin. Requests on non-angular axes (any cube axis, or the
    /// radius and height of the curvilinear shapes) are ignored.
    pub fn set_inf_limit(&mut self, value: f64, axis: usize) {
        if axis > 2 {
            return;
        }

        let span = self.span();
        let accepted = match (self.kind, axis) {
            (ShapeKind::Cylinder | ShapeKind::Sphere, 1) => Some(value.clamp(0.0, TAU)),
            (ShapeKind::Sphere, 2) => Some(value.clamp(0.0, POLAR_ORIGIN_LIMIT)),
            _ => None,
        };

        match accepted {
            Some(clamped) => {
                self.inf_limits[axis] = clamped;
                self.set_span(span.x, span.y, span.z);
            }
            None => {
                warn!(kind = %self.kind, axis, "coordinate origin not settable, ignored");
            }
        }
    }

    /// Replace the local reference frame with three orthonormal axes.
    ///
    /// Axes are normalized before use. If any pair fails the
    /// orthogonality tolerance the previous frame is kept.
    pub fn set_axes(&mut self, axis0: Vector3<f64>, axis1: Vector3<f64>, axis2: Vector3<f64>) {
        let a0 = axis0.normalize();
        let a1 = axis1.normalize();
        let a2 = axis2.normalize();

        let skew = a0
            .dot(&a1)
            .abs()
            .max(a1.dot(&a2).abs())
            .max(a0.dot(&a2).abs());
        if !skew.is_finite() || skew > AXES_ORTHO_TOL {
            warn!(skew, "reference axes not orthonormal, frame unchanged");
            return;
        }

        self.axes = Matrix3::from_rows(&[a0.transpose(), a1.transpose(), a2.transpose()]);
    }

    /// Point one local axis along a world direction and rebuild the
    /// other two around it.
    ///
    /// The next axis (cyclic order) is the world basis vector closest
    /// to it, re-orthogonalized against `direction`; the third
    /// completes a right-handed frame. Zero directions are ignored.
    pub fn orient_axis(&mut self, axis: usize, direction: Vector3<f64>) {
        if axis > 2 {
            return;
        }
        let norm = direction.norm();
        if norm < f64::EPSILON {
            warn!(axis, "zero direction for axis orientation, frame unchanged");
            return;
        }
        let primary = direction / norm;

        let next = (axis + 1) % 3;
        let last = (axis + 2) % 3;

        let mut seed = Vector3::zeros();
        seed[next] = 1.0;
        // Fall back to the following basis vector when the seed is
        // parallel to the primary direction.
        if (1.0 - seed.dot(&primary).abs()) < AXES_ORTHO_TOL {
            seed = Vector3::zeros();
            seed[last] = 1.0;
        }

        let second = (seed - primary * seed.dot(&primary)).normalize();
        let third = primary.cross(&second);

        let mut rows = [Vector3::zeros(); 3];
        rows[axis] = primary;
        rows[next] = second;
        rows[last] = third;
        self.axes = Matrix3::from_rows(&[
            rows[0].transpose(),
            rows[1].transpose(),
            rows[2].transpose(),
        ]);
    }

    /// Origin of the local coordinate intervals for this topology.
    #[must_use]
    pub fn local_origin(&self) -> Point3<f64> {
        match self.kind {
            ShapeKind::Cube => Point3::new(-0.5, -0.5, -0.5),
            ShapeKind::Cylinder => Point3::new(0.0, 0.0, -0.5),
            ShapeKind::Sphere => Point3::new(0.0, 0.0, 0.0),
        }
    }

    /// Map a point from the shape's local frame to world coordinates.
    #[must_use]
    pub fn to_world(&self, point: &Point3<f64>) -> Point3<f64> {
        let scaled = point.coords.component_mul(&self.scaling);

        let xyz = match self.kind {
            ShapeKind::Cube => scaled,
            ShapeKind::Cylinder => {
                let theta = scaled.y + self.inf_limits[1];
                Vector3::new(scaled.x * theta.cos(), scaled.x * theta.sin(), scaled.z)
            }
            ShapeKind::Sphere => {
                let theta = scaled.y + self.inf_limits[1];
                let phi = scaled.z + self.inf_limits[2];
                Vector3::new(
                    scaled.x * theta.cos() * phi.sin(),
                    scaled.x * theta.sin() * phi.sin(),
                    scaled.x * phi.cos(),
                )
            }
        };

        self.origin + self.axes.transpose() * xyz
    }

    /// Map a world point into the shape's local frame.
    ///
    /// Azimuth angles come out in `[0, 2π)` measured from the angular
    /// origin. Points on the cylinder axis get azimuth zero; the
    /// sphere center gets all angles zero.
    #[must_use]
    pub fn to_local(&self, point: &Point3<f64>) -> Point3<f64> {
        let rot = self.axes * (point - self.origin);

        let local = match self.kind {
            ShapeKind::Cube => rot,
            ShapeKind::Cylinder => {
                let (radius, raw) = if rot.x == 0.0 && rot.y == 0.0 {
                    (0.0, 0.0)
                } else {
                    (rot.x.hypot(rot.y), positive_atan2(rot.y, rot.x))
                };
                Vector3::new(radius, wrap_azimuth(raw, self.inf_limits[1]), rot.z)
            }
            ShapeKind::Sphere => {
                let radius = rot.norm();
                if radius > 0.0 {
                    let raw = if rot.x == 0.0 && rot.y == 0.0 {
                        0.0
                    } else {
                        positive_atan2(rot.y, rot.x)
                    };
                    let phi = (rot.z / radius).clamp(-1.0, 1.0).acos() - self.inf_limits[2];
                    Vector3::new(radius, wrap_azimuth(raw, self.inf_limits[1]), phi)
                } else {
                    Vector3::zeros()
                }
            }
        };

        Point3::from(local.component_div(&self.scaling))
    }

    /// Map a point from the unit cube to the local frame.
    #[inline]
    #[must_use]
    pub fn basic_to_local(&self, point: &Point3<f64>) -> Point3<f64> {
        self.local_origin() + point.coords.component_mul(&self.local_span)
    }

    /// Map a local point into the unit cube.
    #[inline]
    #[must_use]
    pub fn local_to_basic(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from((point - self.local_origin()).component_div(&self.local_span))
    }

    /// Check if a world point lies inside the shape volume.
    ///
    /// Boundary points count as inside.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        let basic = self.local_to_basic(&self.to_local(point));
        (0.0..=1.0).contains(&basic.x)
            && (0.0..=1.0).contains(&basic.y)
            && (0.0..=1.0).contains(&basic.z)
    }
}

/// `atan2` folded into `[0, 2π)`.
#[inline]
fn positive_atan2(y: f64, x: f64) -> f64 {
    let angle = y.atan2(x);
    if angle < 0.0 {
        angle + TAU
    } else {
        angle
    }
}

/// Re-anchor an azimuth in `[0, 2π)` at a new angular origin.
#[inline]
fn wrap_azimuth(angle: f64, origin: f64) -> f64 {
    let mut shifted = angle - origin;
    if shifted < 0.0 {
        shifted += TAU;
    }
    if shifted > TAU {
        shifted -= TAU;
    }
    shifted
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn cube_round_trip() {
        let mut shape = Shape::cube(Point3::new(1.0, 2.0, 3.0), [2.0, 4.0, 6.0]);
        shape.orient_axis(2, Vector3::new(1.0, 1.0, 1.0));

        let world = Point3::new(1.3, 1.1, 3.4);
        let back = shape.to_world(&shape.to_local(&world));
        assert_relative_eq!(back, world, epsilon = 1e-12);
    }

    #[test]
    fn cube_contains_boundary() {
        let shape = Shape::cube(Point3::new(0.0, 0.0, 0.0), [2.0, 2.0, 2.0]);

        assert!(shape.contains(&Point3::new(1.0, 1.0, 1.0)));
        assert!(shape.contains(&Point3::new(-1.0, 0.0, 0.0)));
        assert!(!shape.contains(&Point3::new(1.0 + 1e-9, 0.0, 0.0)));
    }

    #[test]
    fn cube_negative_span_folded() {
        let shape = Shape::cube(Point3::new(0.0, 0.0, 0.0), [-2.0, 2.0, 2.0]);
        assert_relative_eq!(shape.span().x, 2.0);
    }

    #[test]
    fn cube_rejects_angular_origin() {
        let mut shape = Shape::cube(Point3::new(0.0, 0.0, 0.0), [1.0, 1.0, 1.0]);
        shape.set_inf_limit(1.0, 1);
        assert_relative_eq!(shape.inf_limits()[1], 0.0);
    }

    #[test]
    fn cylinder_full_turn_is_periodic() {
        let full = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, 2.0]);
        assert!(full.is_periodic(1));

        let wedge = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, PI, 2.0]);
        assert!(!wedge.is_periodic(1));

        let over = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, 3.0 * PI, 2.0]);
        assert!(over.is_periodic(1));
        assert_relative_eq!(over.span().y, TAU);
    }

    #[test]
    fn cylinder_round_trip() {
        let shape = Shape::cylinder(Point3::new(1.0, 0.0, -1.0), [2.0, TAU, 4.0]);

        let world = Point3::new(2.2, 0.7, 0.5);
        let local = shape.to_local(&world);
        assert_relative_eq!(shape.to_world(&local), world, epsilon = 1e-12);

        // radius in [0,1] after scaling, azimuth raw, height in [-.5,.5]
        assert!(local.x <= 1.0);
        assert!((0.0..TAU).contains(&local.y));
    }

    #[test]
    fn cylinder_inclusion() {
        let shape = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, 2.0]);

        assert!(shape.contains(&Point3::new(0.5, 0.5, 0.0)));
        assert!(shape.contains(&Point3::new(0.0, 0.0, 1.0)));
        assert!(!shape.contains(&Point3::new(0.9, 0.9, 0.0)));
        assert!(!shape.contains(&Point3::new(0.0, 0.0, 1.1)));
    }

    #[test]
    fn cylinder_wedge_excludes_far_side() {
        let shape = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, PI, 2.0]);

        assert!(shape.contains(&Point3::new(0.5, 0.5, 0.0)));
        assert!(!shape.contains(&Point3::new(0.5, -0.5, 0.0)));
    }

    #[test]
    fn cylinder_angular_origin_moves_wedge() {
        let mut shape = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, PI, 2.0]);
        shape.set_inf_limit(PI, 1);

        assert!(!shape.contains(&Point3::new(0.5, 0.5, 0.0)));
        assert!(shape.contains(&Point3::new(0.5, -0.5, 0.0)));
        // physical span preserved across the origin shift
        assert_relative_eq!(shape.span().y, PI);
    }

    #[test]
    fn sphere_round_trip() {
        let shape = Shape::sphere(Point3::new(0.5, 0.5, 0.5), [2.0, TAU, PI]);

        let world = Point3::new(1.2, -0.3, 1.4);
        let local = shape.to_local(&world);
        assert_relative_eq!(shape.to_world(&local), world, epsilon = 1e-12);
    }

    #[test]
    fn sphere_polar_span_clamped() {
        let shape = Shape::sphere(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, 5.0]);
        assert_relative_eq!(shape.span().z, PI);

        let mut shifted = Shape::sphere(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, PI]);
        shifted.set_inf_limit(PI / 2.0, 2);
        assert_relative_eq!(shifted.span().z, PI / 2.0);
    }

    #[test]
    fn sphere_center_maps_to_zero() {
        let shape = Shape::sphere(Point3::new(2.0, 0.0, 0.0), [1.0, TAU, PI]);
        let local = shape.to_local(&Point3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(local, Point3::new(0.0, 0.0, 0.0));
        assert!(shape.contains(&Point3::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn sphere_inclusion() {
        let shape = Shape::sphere(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, PI]);

        assert!(shape.contains(&Point3::new(0.0, 0.0, -0.99)));
        assert!(!shape.contains(&Point3::new(0.8, 0.8, 0.0)));

        let upper = Shape::sphere(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, PI / 2.0]);
        assert!(upper.contains(&Point3::new(0.0, 0.0, 0.5)));
        assert!(!upper.contains(&Point3::new(0.0, 0.0, -0.5)));
    }

    #[test]
    fn non_orthogonal_axes_rejected() {
        let mut shape = Shape::cube(Point3::new(0.0, 0.0, 0.0), [1.0, 1.0, 1.0]);
        shape.set_axes(
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0),
        );
        assert_eq!(shape.axes(), Matrix3::identity());
    }

    #[test]
    fn orient_axis_builds_right_handed_frame() {
        let mut shape = Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, 2.0]);
        shape.orient_axis(2, Vector3::new(0.0, 3.0, 0.0));

        let axes = shape.axes();
        let r0 = axes.row(0).transpose();
        let r1 = axes.row(1).transpose();
        let r2 = axes.row(2).transpose();

        assert_relative_eq!(r2, Vector3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(r0.dot(&r1), 0.0, epsilon = 1e-12);
        assert_relative_eq!(r0.cross(&r1).dot(&r2), 1.0, epsilon = 1e-12);

        // cylinder height now runs along world y
        assert!(shape.contains(&Point3::new(0.0, 0.9, 0.0)));
        assert!(!shape.contains(&Point3::new(0.0, 0.0, 1.1)));
    }

    #[test]
    fn cube_around_bounds() {
        let bounds = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 4.0, 6.0));
        let shape = Shape::cube_around(&bounds, 1.0);

        assert_eq!(shape.origin(), Point3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(shape.span(), Vector3::new(4.0, 6.0, 8.0));
        assert!(shape.contains(&Point3::new(-0.9, 2.0, 3.0)));
        assert!(!shape.contains(&Point3::new(-1.1, 2.0, 3.0)));
    }

    #[test]
    fn basic_local_round_trip() {
        for shape in [
            Shape::cube(Point3::new(0.0, 0.0, 0.0), [2.0, 3.0, 4.0]),
            Shape::cylinder(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, 2.0]),
            Shape::sphere(Point3::new(0.0, 0.0, 0.0), [1.0, TAU, PI]),
        ] {
            let basic = Point3::new(0.25, 0.5, 0.75);
            let back = shape.local_to_basic(&shape.basic_to_local(&basic));
            assert_relative_eq!(back, basic, epsilon = 1e-12);
        }
    }
}
