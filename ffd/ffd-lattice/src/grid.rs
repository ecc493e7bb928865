//! Structured control-node grid in the shape's local frame.
//!
//! The grid stores equispaced node abscissas per axis between the shape's
//! local origin and the end of its local span. Flat node indices follow the
//! convention `flat = ny*nz*i + nz*j + k` with the z axis fastest.

use ffd_types::{Point3, Shape, Vector3};

/// Structured grid of lattice nodes in local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredGrid {
    counts: [usize; 3],
    nodes: [Vec<f64>; 3],
    spacing: Vector3<f64>,
}

impl StructuredGrid {
    /// Builds the grid for a shape's local domain.
    ///
    /// `dims` are node counts per axis; counts below 2 are raised to 2 so
    /// every axis has at least one cell.
    #[must_use]
    pub fn new(shape: &Shape, dims: [usize; 3]) -> Self {
        let origin = shape.local_origin();
        let span = shape.local_span();

        let counts = [dims[0].max(2), dims[1].max(2), dims[2].max(2)];
        let mut spacing = Vector3::zeros();
        let mut nodes: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for axis in 0..3 {
            #[allow(clippy::cast_precision_loss)]
            let step = span[axis] / (counts[axis] - 1) as f64;
            spacing[axis] = step;
            nodes[axis] = (0..counts[axis])
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let offset = i as f64 * step;
                    origin[axis] + offset
                })
                .collect();
        }

        Self {
            counts,
            nodes,
            spacing,
        }
    }

    /// Returns the node count per axis.
    #[must_use]
    pub const fn counts(&self) -> [usize; 3] {
        self.counts
    }

    /// Returns the total number of grid nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.counts.iter().product()
    }

    /// Returns the node spacing per axis.
    #[must_use]
    pub const fn spacing(&self) -> Vector3<f64> {
        self.spacing
    }

    /// Returns the node abscissas of one axis.
    ///
    /// # Panics
    ///
    /// Panics if `axis > 2`.
    #[must_use]
    pub fn nodes(&self, axis: usize) -> &[f64] {
        &self.nodes[axis]
    }

    /// Converts per-axis node indices to the flat node index.
    #[must_use]
    pub const fn flatten(&self, i: usize, j: usize, k: usize) -> usize {
        self.counts[1] * self.counts[2] * i + self.counts[2] * j + k
    }

    /// Converts a flat node index back to per-axis indices.
    #[must_use]
    pub const fn unflatten(&self, flat: usize) -> [usize; 3] {
        let plane = self.counts[1] * self.counts[2];
        let i = flat / plane;
        let rest = flat % plane;
        [i, rest / self.counts[2], rest % self.counts[2]]
    }

    /// Returns the local-frame position of a node.
    #[must_use]
    pub fn local_node(&self, i: usize, j: usize, k: usize) -> Point3<f64> {
        Point3::new(self.nodes[0][i], self.nodes[1][j], self.nodes[2][k])
    }

    /// Finds the cell containing a local-frame point.
    ///
    /// Returns `None` when the point lies outside the grid along any axis.
    /// The interpolation path does not use cells; it searches knot intervals
    /// instead.
    #[must_use]
    pub fn locate_cell(&self, local: &Point3<f64>) -> Option<[usize; 3]> {
        let mut cell = [0_usize; 3];
        for axis in 0..3 {
            let lo = self.nodes[axis][0];
            let hi = self.nodes[axis][self.counts[axis] - 1];
            let coord = local[axis];
            if coord < lo || coord > hi {
                return None;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let idx = ((coord - lo) / self.spacing[axis]).floor() as usize;
            cell[axis] = idx.min(self.counts[axis] - 2);
        }
        Some(cell)
    }
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
    use ffd_types::Point3;

    fn unit_cube_grid(dims: [usize; 3]) -> StructuredGrid {
        let shape = Shape::cube(Point3::origin(), [1.0, 1.0, 1.0]);
        StructuredGrid::new(&shape, dims)
    }

    #[test]
    fn test_cube_node_abscissas() {
        let grid = unit_cube_grid([3, 3, 3]);

        for axis in 0..3 {
            let nodes = grid.nodes(axis);
            assert_eq!(nodes.len(), 3);
            assert_relative_eq!(nodes[0], -0.5);
            assert_relative_eq!(nodes[1], 0.0);
            assert_relative_eq!(nodes[2], 0.5);
        }
        assert_relative_eq!(grid.spacing()[0], 0.5);
    }

    #[test]
    fn test_flat_index_convention() {
        let grid = unit_cube_grid([3, 4, 5]);

        assert_eq!(grid.node_count(), 60);
        assert_eq!(grid.flatten(0, 0, 0), 0);
        assert_eq!(grid.flatten(0, 0, 1), 1);
        assert_eq!(grid.flatten(0, 1, 0), 5);
        assert_eq!(grid.flatten(1, 0, 0), 20);
        assert_eq!(grid.flatten(2, 3, 4), 59);
    }

    #[test]
    fn test_flatten_unflatten_round_trip() {
        let grid = unit_cube_grid([3, 4, 5]);

        for flat in 0..grid.node_count() {
            let [i, j, k] = grid.unflatten(flat);
            assert_eq!(grid.flatten(i, j, k), flat);
        }
    }

    #[test]
    fn test_local_node_positions() {
        let grid = unit_cube_grid([3, 3, 3]);

        let center = grid.local_node(1, 1, 1);
        assert_relative_eq!(center.x, 0.0);
        assert_relative_eq!(center.y, 0.0);
        assert_relative_eq!(center.z, 0.0);

        let corner = grid.local_node(2, 0, 2);
        assert_relative_eq!(corner.x, 0.5);
        assert_relative_eq!(corner.y, -0.5);
        assert_relative_eq!(corner.z, 0.5);
    }

    #[test]
    fn test_cylinder_angular_axis() {
        let shape = Shape::cylinder(Point3::origin(), [1.0, std::f64::consts::TAU, 2.0]);
        let grid = StructuredGrid::new(&shape, [2, 5, 2]);

        let azimuth = grid.nodes(1);
        assert_relative_eq!(azimuth[0], 0.0);
        assert_relative_eq!(azimuth[4], std::f64::consts::TAU);

        let radial = grid.nodes(0);
        assert_relative_eq!(radial[0], 0.0);
        assert_relative_eq!(radial[1], 1.0);
    }

    #[test]
    fn test_locate_cell() {
        let grid = unit_cube_grid([3, 3, 3]);

        assert_eq!(
            grid.locate_cell(&Point3::new(-0.4, 0.1, 0.4)),
            Some([0, 1, 1])
        );
        assert_eq!(grid.locate_cell(&Point3::new(0.5, 0.5, 0.5)), Some([1, 1, 1]));
        assert_eq!(grid.locate_cell(&Point3::new(0.6, 0.0, 0.0)), None);
    }

    #[test]
    fn test_degenerate_dims_raised() {
        let grid = unit_cube_grid([1, 0, 2]);
        assert_eq!(grid.counts(), [2, 2, 2]);
    }
}
