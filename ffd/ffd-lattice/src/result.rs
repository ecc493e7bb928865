//! Deformation results and quality metrics.
//!
//! This module provides the [`DeformOutput`] struct returned by the bulk
//! deformation entry points, carrying the displacement field and summary
//! metrics about its effect.

use ffd_types::Vector3;

/// Displacements below this norm count as unmoved.
pub(crate) const DISPLACEMENT_EPS: f64 = 1.0e-10;

/// Result of deforming a point cloud or mesh.
///
/// The displacement list is aligned with the input ordering; points outside
/// the lattice volume or excluded by the vertex mask carry a zero vector.
/// The input geometry itself is never mutated; apply the displacements with
/// [`apply_to_cloud`](crate::apply_to_cloud) or
/// [`apply_to_mesh`](crate::apply_to_mesh).
#[derive(Debug, Clone)]
pub struct DeformOutput {
    /// One displacement per input point, in input order.
    pub displacements: Vec<Vector3<f64>>,
    /// Number of points that actually moved.
    pub modified: usize,
    /// Largest displacement norm.
    pub max_displacement: f64,
    /// Average displacement norm over the moved points.
    pub average_displacement: f64,
    /// Deformed over original mesh volume; 1.0 for point clouds.
    pub volume_ratio: f64,
}

impl DeformOutput {
    /// Creates an output with the given field and neutral metrics.
    #[must_use]
    pub const fn new(displacements: Vec<Vector3<f64>>) -> Self {
        Self {
            displacements,
            modified: 0,
            max_displacement: 0.0,
            average_displacement: 0.0,
            volume_ratio: 1.0,
        }
    }

    /// Returns whether the deformation changed the enclosed volume by more
    /// than the given relative threshold.
    ///
    /// # Example
    ///
    /// ```
    /// use ffd_lattice::DeformOutput;
    ///
    /// let mut output = DeformOutput::new(Vec::new());
    /// output.volume_ratio = 1.25;
    /// assert!(output.has_significant_volume_change(0.1));
    /// assert!(!output.has_significant_volume_change(0.5));
    /// ```
    #[must_use]
    pub fn has_significant_volume_change(&self, threshold: f64) -> bool {
        (self.volume_ratio - 1.0).abs() > threshold
    }

    /// Returns a human-readable summary of the deformation.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Deformed {} of {} points: max displacement {:.6}, average {:.6}, volume ratio {:.4}",
            self.modified,
            self.displacements.len(),
            self.max_displacement,
            self.average_displacement,
            self.volume_ratio
        )
    }
}

/// Computes (moved count, max norm, average norm) over a displacement field.
pub(crate) fn displacement_stats(displacements: &[Vector3<f64>]) -> (usize, f64, f64) {
    let mut modified = 0;
    let mut max_displacement: f64 = 0.0;
    let mut total = 0.0;
    for displacement in displacements {
        let norm = displacement.norm();
        if norm > DISPLACEMENT_EPS {
            modified += 1;
            max_displacement = max_displacement.max(norm);
            total += norm;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let average = if modified > 0 {
        total / modified as f64
    } else {
        0.0
    };
    (modified, max_displacement, average)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::needless_range_loop
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_has_neutral_metrics() {
        let output = DeformOutput::new(vec![Vector3::zeros(); 4]);

        assert_eq!(output.displacements.len(), 4);
        assert_eq!(output.modified, 0);
        assert_eq!(output.max_displacement, 0.0);
        assert_eq!(output.volume_ratio, 1.0);
    }

    #[test]
    fn test_displacement_stats() {
        let field = vec![
            Vector3::zeros(),
            Vector3::new(3.0, 0.0, 4.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(0.0, 0.0, 1.0e-14),
        ];

        let (modified, max, average) = displacement_stats(&field);
        assert_eq!(modified, 2);
        assert_relative_eq!(max, 5.0);
        assert_relative_eq!(average, 3.0);
    }

    #[test]
    fn test_volume_change_threshold() {
        let mut output = DeformOutput::new(Vec::new());
        output.volume_ratio = 0.8;

        assert!(output.has_significant_volume_change(0.1));
        assert!(!output.has_significant_volume_change(0.3));
    }

    #[test]
    fn test_summary_mentions_counts() {
        let mut output = DeformOutput::new(vec![Vector3::zeros(); 3]);
        output.modified = 2;
        output.max_displacement = 0.5;

        let text = output.summary();
        assert!(text.contains("2 of 3"));
        assert!(text.contains("0.5"));
    }
}
