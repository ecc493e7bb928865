//! Unstructured point cloud.

use crate::Aabb;
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An unstructured set of points in 3D space.
///
/// This is the simplest geometry a deformation field can act on. Points
/// carry no connectivity, so a cloud can represent scan data, sample
/// sites, or the vertices of some richer structure held elsewhere.
///
/// # Example
///
/// ```
/// use ffd_types::{Point3, PointCloud};
///
/// let cloud = PointCloud::from_points(vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
/// ]);
///
/// assert_eq!(cloud.len(), 2);
/// assert_eq!(cloud.bounds().max.x, 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PointCloud {
    /// Point positions.
    pub points: Vec<Point3<f64>>,
}

impl PointCloud {
    /// Create a new empty point cloud.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Create a point cloud with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(count: usize) -> Self {
        Self {
            points: Vec::with_capacity(count),
        }
    }

    /// Create a point cloud from a list of positions.
    #[inline]
    #[must_use]
    pub const fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self { points }
    }

    /// Number of points in the cloud.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the cloud has no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Append a point to the cloud.
    #[inline]
    pub fn push(&mut self, point: Point3<f64>) {
        self.points.push(point);
    }

    /// Iterate over point positions.
    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.points.iter()
    }

    /// Compute the axis-aligned bounding box of the cloud.
    ///
    /// Returns an empty AABB for an empty cloud.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.points.iter())
    }
}

impl FromIterator<Point3<f64>> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3<f64>>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloud_len_and_push() {
        let mut cloud = PointCloud::new();
        assert!(cloud.is_empty());

        cloud.push(Point3::new(1.0, 2.0, 3.0));
        cloud.push(Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(cloud.len(), 2);
        assert!(!cloud.is_empty());
    }

    #[test]
    fn cloud_bounds() {
        let cloud = PointCloud::from_points(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, -1.0, 4.0),
        ]);

        let bounds = cloud.bounds();
        assert!((bounds.min.y - (-1.0)).abs() < f64::EPSILON);
        assert!((bounds.max.z - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_cloud_bounds() {
        assert!(PointCloud::new().bounds().is_empty());
    }

    #[test]
    fn cloud_from_iterator() {
        let cloud: PointCloud = (0..5)
            .map(|i| Point3::new(f64::from(i), 0.0, 0.0))
            .collect();
        assert_eq!(cloud.len(), 5);
        assert!((cloud.points[4].x - 4.0).abs() < f64::EPSILON);
    }
}
