//! Degree-of-freedom reduction over the control grid.
//!
//! Curvilinear shapes make several grid nodes coincide in world space: every
//! node on a cylinder axis at fixed height, a periodic seam ring, a sphere
//! center, a polar cap. Each such group must move as one control point, so
//! the displacement field is indexed by degrees of freedom rather than grid
//! nodes. [`DofMap`] holds the relation in both directions: a grid-sized
//! lookup array and a CSR-style list of the grid nodes behind each DOF.

use ffd_types::ShapeKind;

/// Bidirectional grid-node to degree-of-freedom relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DofMap {
    grid_to_dof: Vec<u32>,
    dof_offsets: Vec<u32>,
    dof_nodes: Vec<u32>,
}

impl DofMap {
    /// Builds the reduction for a grid of `counts` nodes per axis.
    ///
    /// `azimuth_periodic` aliases the last azimuth ring onto the first;
    /// `north_pole` and `south_pole` collapse the polar caps of a sphere.
    /// Both pole flags are ignored for cubes and cylinders, and all flags
    /// are ignored for cubes.
    ///
    /// Nodes are scanned in flat order, so DOF numbering follows the first
    /// appearance of each group and the representative of a DOF is its
    /// lowest flat node index.
    #[must_use]
    pub fn build(
        kind: ShapeKind,
        counts: [usize; 3],
        azimuth_periodic: bool,
        north_pole: bool,
        south_pole: bool,
    ) -> Self {
        let [nx, ny, nz] = counts;
        let total = nx * ny * nz;
        let flatten = |i: usize, j: usize, k: usize| ny * nz * i + nz * j + k;

        let canonical = |i: usize, j: usize, k: usize| -> usize {
            match kind {
                ShapeKind::Cube => flatten(i, j, k),
                ShapeKind::Cylinder => {
                    if i == 0 {
                        // The radial origin is degenerate: one DOF per height.
                        flatten(0, 0, k)
                    } else if azimuth_periodic && j == ny - 1 {
                        flatten(i, 0, k)
                    } else {
                        flatten(i, j, k)
                    }
                }
                ShapeKind::Sphere => {
                    if i == 0 {
                        // Every zero-radius node is the center point.
                        flatten(0, 0, 0)
                    } else if north_pole && k == 0 {
                        flatten(i, 0, 0)
                    } else if south_pole && k == nz - 1 {
                        flatten(i, 0, nz - 1)
                    } else if azimuth_periodic && j == ny - 1 {
                        flatten(i, 0, k)
                    } else {
                        flatten(i, j, k)
                    }
                }
            }
        };

        let mut grid_to_dof = vec![u32::MAX; total];
        let mut dof_count: u32 = 0;
        for i in 0..nx {
            for j in 0..ny {
                for k in 0..nz {
                    let flat = flatten(i, j, k);
                    let canon = canonical(i, j, k);
                    if canon == flat {
                        grid_to_dof[flat] = dof_count;
                        dof_count += 1;
                    } else {
                        // Canonical nodes precede their aliases in flat order.
                        grid_to_dof[flat] = grid_to_dof[canon];
                    }
                }
            }
        }

        let mut sizes = vec![0_u32; dof_count as usize];
        for &dof in &grid_to_dof {
            sizes[dof as usize] += 1;
        }
        let mut dof_offsets = vec![0_u32; dof_count as usize + 1];
        for (d, &size) in sizes.iter().enumerate() {
            dof_offsets[d + 1] = dof_offsets[d] + size;
        }
        let mut cursor = dof_offsets.clone();
        let mut dof_nodes = vec![0_u32; total];
        for (flat, &dof) in grid_to_dof.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            let node = flat as u32;
            dof_nodes[cursor[dof as usize] as usize] = node;
            cursor[dof as usize] += 1;
        }

        Self {
            grid_to_dof,
            dof_offsets,
            dof_nodes,
        }
    }

    /// Returns the number of independent degrees of freedom.
    #[must_use]
    pub fn dof_count(&self) -> usize {
        self.dof_offsets.len() - 1
    }

    /// Returns the number of grid nodes covered by the map.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.grid_to_dof.len()
    }

    /// Returns the DOF index of a flat grid node.
    #[must_use]
    pub fn dof_of(&self, flat_node: usize) -> usize {
        self.grid_to_dof[flat_node] as usize
    }

    /// Returns the flat grid nodes sharing one DOF.
    #[must_use]
    pub fn nodes_of(&self, dof: usize) -> &[u32] {
        let lo = self.dof_offsets[dof] as usize;
        let hi = self.dof_offsets[dof + 1] as usize;
        &self.dof_nodes[lo..hi]
    }

    /// Returns the representative grid node of a DOF, its lowest flat index.
    #[must_use]
    pub fn representative(&self, dof: usize) -> u32 {
        self.dof_nodes[self.dof_offsets[dof] as usize]
    }

    /// Expands per-DOF values to a grid-sized list.
    ///
    /// # Panics
    ///
    /// Panics if `dof_values` is shorter than [`Self::dof_count`].
    #[must_use]
    pub fn expand<T: Copy>(&self, dof_values: &[T]) -> Vec<T> {
        self.grid_to_dof
            .iter()
            .map(|&dof| dof_values[dof as usize])
            .collect()
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

    fn flatten(counts: [usize; 3], i: usize, j: usize, k: usize) -> usize {
        counts[1] * counts[2] * i + counts[2] * j + k
    }

    #[test]
    fn test_cube_is_identity() {
        let counts = [3, 3, 3];
        let map = DofMap::build(ShapeKind::Cube, counts, false, false, false);

        assert_eq!(map.dof_count(), 27);
        for flat in 0..27 {
            assert_eq!(map.dof_of(flat), flat);
            assert_eq!(map.nodes_of(flat), &[flat as u32]);
        }
    }

    #[test]
    fn test_cylinder_axis_collapses_per_height() {
        let counts = [3, 5, 2];
        let map = DofMap::build(ShapeKind::Cylinder, counts, false, false, false);

        // One DOF per height level plus the full outer rings.
        assert_eq!(map.dof_count(), 2 + 2 * 5 * 2);
        for k in 0..2 {
            let first = map.dof_of(flatten(counts, 0, 0, k));
            for j in 1..5 {
                assert_eq!(map.dof_of(flatten(counts, 0, j, k)), first);
            }
        }
    }

    #[test]
    fn test_cylinder_periodic_seam_aliases() {
        let counts = [3, 5, 2];
        let map = DofMap::build(ShapeKind::Cylinder, counts, true, false, false);

        assert_eq!(map.dof_count(), 18);
        for i in 1..3 {
            for k in 0..2 {
                assert_eq!(
                    map.dof_of(flatten(counts, i, 4, k)),
                    map.dof_of(flatten(counts, i, 0, k))
                );
            }
        }
    }

    #[test]
    fn test_sphere_center_and_poles_collapse() {
        let counts = [3, 5, 3];
        let map = DofMap::build(ShapeKind::Sphere, counts, true, true, true);

        assert_eq!(map.dof_count(), 13);

        // All zero-radius nodes are the single center DOF.
        let center = map.dof_of(flatten(counts, 0, 0, 0));
        for j in 0..5 {
            for k in 0..3 {
                assert_eq!(map.dof_of(flatten(counts, 0, j, k)), center);
            }
        }

        // Each polar cap is one DOF per radial shell.
        for i in 1..3 {
            let north = map.dof_of(flatten(counts, i, 0, 0));
            let south = map.dof_of(flatten(counts, i, 0, 2));
            assert_ne!(north, south);
            for j in 1..5 {
                assert_eq!(map.dof_of(flatten(counts, i, j, 0)), north);
                assert_eq!(map.dof_of(flatten(counts, i, j, 2)), south);
            }
        }
    }

    #[test]
    fn test_sphere_without_flags_keeps_rings() {
        let counts = [3, 5, 3];
        let map = DofMap::build(ShapeKind::Sphere, counts, false, false, false);

        assert_eq!(map.dof_count(), 31);
    }

    #[test]
    fn test_representative_is_lowest_node() {
        let counts = [3, 5, 2];
        let map = DofMap::build(ShapeKind::Cylinder, counts, true, false, false);

        for dof in 0..map.dof_count() {
            let nodes = map.nodes_of(dof);
            assert_eq!(map.representative(dof), nodes[0]);
            assert!(nodes.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_expand_reproduces_lookup() {
        let counts = [3, 5, 2];
        let map = DofMap::build(ShapeKind::Cylinder, counts, true, false, false);

        let values: Vec<usize> = (0..map.dof_count()).collect();
        let grid = map.expand(&values);
        assert_eq!(grid.len(), map.node_count());
        for (flat, &value) in grid.iter().enumerate() {
            assert_eq!(value, map.dof_of(flat));
        }
    }
}
