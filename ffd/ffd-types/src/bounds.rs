//! Axis-aligned bounding box.

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
///
/// Used to measure the extent of input geometry so that a deformation
/// lattice can be fitted around it.
///
/// # Example
///
/// ```
/// use ffd_types::{Aabb, Point3};
///
/// let aabb = Aabb::new(
///     Point3::new(-1.0, -1.0, -1.0),
///     Point3::new(1.0, 1.0, 1.0),
/// );
///
/// assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
/// assert_eq!(aabb.size().x, 2.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y, z values).
    pub min: Point3<f64>,
    /// Maximum corner (largest x, y, z values).
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a new AABB from minimum and maximum corners.
    ///
    /// Corners are swapped per axis if min > max.
    #[must_use]
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self {
            min: Point3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Point3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Create an empty (invalid) AABB.
    ///
    /// An empty AABB has min > max, which makes it a neutral starting
    /// point for expanding over a point set.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Point3::new is not const in nalgebra
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create an AABB enclosing an iterator of points.
    ///
    /// Returns an empty AABB if the iterator is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use ffd_types::{Aabb, Point3};
    ///
    /// let points = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(4.0, 1.0, 2.0),
    ///     Point3::new(-1.0, 3.0, 0.5),
    /// ];
    ///
    /// let aabb = Aabb::from_points(points.iter());
    /// assert_eq!(aabb.min, Point3::new(-1.0, 0.0, 0.0));
    /// assert_eq!(aabb.max, Point3::new(4.0, 3.0, 2.0));
    /// ```
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Check if the AABB is empty (min > max for any axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the edge lengths of the AABB.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Get the center of the AABB.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::new(
            (self.min.x + self.max.x) * 0.5,
            (self.min.y + self.max.y) * 0.5,
            (self.min.z + self.max.z) * 0.5,
        )
    }

    /// Get the length of the longest edge.
    #[inline]
    #[must_use]
    pub fn max_extent(&self) -> f64 {
        let s = self.size();
        s.x.max(s.y).max(s.z)
    }

    /// Check if the AABB contains a point.
    ///
    /// Points on the boundary are considered inside.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Expand the AABB in place to include a point.
    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Return a copy grown by a uniform margin on all sides.
    ///
    /// Negative margins shrink the AABB.
    ///
    /// # Example
    ///
    /// ```
    /// use ffd_types::{Aabb, Point3};
    ///
    /// let aabb = Aabb::new(
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(2.0, 2.0, 2.0),
    /// );
    ///
    /// let padded = aabb.expanded(0.5);
    /// assert_eq!(padded.min, Point3::new(-0.5, -0.5, -0.5));
    /// assert_eq!(padded.max, Point3::new(2.5, 2.5, 2.5));
    /// ```
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point3::new(
                self.min.x - margin,
                self.min.y - margin,
                self.min.z - margin,
            ),
            max: Point3::new(
                self.max.x + margin,
                self.max.y + margin,
                self.max.z + margin,
            ),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_from_points() {
        let points = [Point3::new(1.0, 0.0, 0.0),
            Point3::new(-3.0, 2.0, 5.0),
            Point3::new(0.0, -1.0, 2.0)];

        let aabb = Aabb::from_points(points.iter());
        assert!((aabb.min.x - (-3.0)).abs() < f64::EPSILON);
        assert!((aabb.min.y - (-1.0)).abs() < f64::EPSILON);
        assert!((aabb.min.z - 0.0).abs() < f64::EPSILON);
        assert!((aabb.max.x - 1.0).abs() < f64::EPSILON);
        assert!((aabb.max.y - 2.0).abs() < f64::EPSILON);
        assert!((aabb.max.z - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aabb_empty() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert!(Aabb::from_points([].iter()).is_empty());
    }

    #[test]
    fn aabb_contains_boundary() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 4.0, 4.0));

        assert!(aabb.contains(&Point3::new(2.0, 2.0, 2.0)));
        assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(aabb.contains(&Point3::new(4.0, 4.0, 4.0)));
        assert!(!aabb.contains(&Point3::new(4.0 + 1e-9, 2.0, 2.0)));
    }

    #[test]
    fn aabb_swapped_corners() {
        let aabb = Aabb::new(Point3::new(5.0, 0.0, 0.0), Point3::new(0.0, 5.0, 5.0));
        assert!((aabb.min.x - 0.0).abs() < f64::EPSILON);
        assert!((aabb.max.x - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aabb_expanded() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 2.0, 3.0));
        let padded = aabb.expanded(1.0);
        assert!((padded.min.y - (-1.0)).abs() < f64::EPSILON);
        assert!((padded.max.y - 3.0).abs() < f64::EPSILON);
        assert!((padded.max_extent() - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aabb_size_and_center() {
        let aabb = Aabb::new(Point3::new(-1.0, -2.0, -3.0), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(aabb.size(), nalgebra::Vector3::new(2.0, 4.0, 6.0));
        assert_eq!(aabb.center(), Point3::new(0.0, 0.0, 0.0));
    }
}
