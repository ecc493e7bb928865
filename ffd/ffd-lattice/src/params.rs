//! Lattice configuration parameters.
//!
//! This module provides the [`LatticeParams`] struct for configuring the
//! control-node resolution, spline degrees, knot regimes, and displacement
//! interpretation of an [`FfdLattice`](crate::FfdLattice).

use crate::knots::KnotRegime;
use std::collections::HashSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How control-point displacements are interpreted during evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DisplacementMode {
    /// Displacements are absolute world-frame vectors.
    ///
    /// The blended value at a query point is returned as-is. This is the
    /// natural choice for box lattices aligned with the world axes.
    Global,

    /// Displacements perturb the local shape coordinate before mapping back
    /// to world space.
    ///
    /// Radial and height components stay in world units while angular
    /// components are radians, so a displacement field can bend or twist a
    /// geometry along curved cylinder or sphere axes.
    Local,
}

impl Default for DisplacementMode {
    fn default() -> Self {
        Self::Local
    }
}

/// Parameters for building a deformation lattice.
///
/// Use the builder methods to configure the lattice. Node counts below the
/// topology minimum of the shape and degrees outside `[1, nodes - 1]` are
/// corrected at build time rather than rejected.
///
/// # Examples
///
/// ```
/// use ffd_lattice::{DisplacementMode, KnotRegime, LatticeParams};
///
/// let params = LatticeParams::new(3, 7, 4)
///     .with_degrees(2, 3, 2)
///     .with_regime(1, KnotRegime::Periodic)
///     .with_mode(DisplacementMode::Global);
///
/// assert_eq!(params.dims, [3, 7, 4]);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LatticeParams {
    /// Requested control-node count per axis.
    pub dims: [usize; 3],
    /// Requested curve degree per axis.
    ///
    /// If `None`, each axis defaults to `nodes - 1` (pure Bezier) after the
    /// node counts are corrected for the shape topology.
    pub degrees: Option<[usize; 3]>,
    /// Knot-vector regime per axis.
    ///
    /// `None` derives the regime from the shape: periodic axes become
    /// [`KnotRegime::Periodic`], everything else [`KnotRegime::Clamped`].
    pub regimes: [Option<KnotRegime>; 3],
    /// Displacement interpretation.
    pub mode: DisplacementMode,
    /// Optional mask of vertex indices to deform.
    ///
    /// If `None`, all vertices inside the lattice volume are deformed.
    pub vertex_mask: Option<HashSet<usize>>,
}

impl Default for LatticeParams {
    fn default() -> Self {
        Self::new(4, 4, 4)
    }
}

impl LatticeParams {
    /// Creates parameters with the given node counts and default settings.
    ///
    /// Degrees default to `nodes - 1` per axis, regimes are derived from the
    /// shape, and displacements are interpreted in the local frame.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffd_lattice::LatticeParams;
    ///
    /// let params = LatticeParams::new(5, 5, 5);
    /// assert!(params.degrees.is_none());
    /// ```
    #[must_use]
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            dims: [nx, ny, nz],
            degrees: None,
            regimes: [None; 3],
            mode: DisplacementMode::Local,
            vertex_mask: None,
        }
    }

    /// Sets an explicit curve degree per axis.
    ///
    /// Each degree is capped to `[1, nodes - 1]` at build time.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffd_lattice::LatticeParams;
    ///
    /// let params = LatticeParams::new(4, 4, 4).with_degrees(2, 2, 2);
    /// assert_eq!(params.degrees, Some([2, 2, 2]));
    /// ```
    #[must_use]
    pub const fn with_degrees(mut self, dx: usize, dy: usize, dz: usize) -> Self {
        self.degrees = Some([dx, dy, dz]);
        self
    }

    /// Sets the knot regime of one axis.
    ///
    /// Axis indices above 2 are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffd_lattice::{KnotRegime, LatticeParams};
    ///
    /// let params = LatticeParams::new(3, 9, 3).with_regime(1, KnotRegime::Symmetric);
    /// assert_eq!(params.regimes[1], Some(KnotRegime::Symmetric));
    /// ```
    #[must_use]
    pub fn with_regime(mut self, axis: usize, regime: KnotRegime) -> Self {
        if axis < 3 {
            self.regimes[axis] = Some(regime);
        }
        self
    }

    /// Sets the displacement interpretation.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffd_lattice::{DisplacementMode, LatticeParams};
    ///
    /// let params = LatticeParams::new(4, 4, 4).with_mode(DisplacementMode::Global);
    /// assert_eq!(params.mode, DisplacementMode::Global);
    /// ```
    #[must_use]
    pub const fn with_mode(mut self, mode: DisplacementMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the vertex mask for selective deformation.
    ///
    /// Only vertices with indices in the mask are deformed.
    ///
    /// # Examples
    ///
    /// ```
    /// use ffd_lattice::LatticeParams;
    /// use std::collections::HashSet;
    ///
    /// let mask: HashSet<usize> = [0, 1, 2].into_iter().collect();
    /// let params = LatticeParams::new(4, 4, 4).with_vertex_mask(mask);
    /// assert!(params.vertex_mask.is_some());
    /// ```
    #[must_use]
    pub fn with_vertex_mask(mut self, mask: HashSet<usize>) -> Self {
        self.vertex_mask = Some(mask);
        self
    }

    /// Clears the vertex mask so all vertices are deformed.
    #[must_use]
    pub fn without_vertex_mask(mut self) -> Self {
        self.vertex_mask = None;
        self
    }

    /// Returns whether a vertex index should be deformed.
    #[must_use]
    pub fn should_deform_vertex(&self, index: usize) -> bool {
        self.vertex_mask
            .as_ref()
            .is_none_or(|mask| mask.contains(&index))
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

    #[test]
    fn test_default_params() {
        let params = LatticeParams::default();
        assert_eq!(params.dims, [4, 4, 4]);
        assert!(params.degrees.is_none());
        assert_eq!(params.regimes, [None; 3]);
        assert_eq!(params.mode, DisplacementMode::Local);
        assert!(params.vertex_mask.is_none());
    }

    #[test]
    fn test_builder_chain() {
        let params = LatticeParams::new(3, 7, 4)
            .with_degrees(2, 3, 2)
            .with_regime(0, KnotRegime::Unclamped)
            .with_regime(1, KnotRegime::Periodic)
            .with_mode(DisplacementMode::Global);

        assert_eq!(params.dims, [3, 7, 4]);
        assert_eq!(params.degrees, Some([2, 3, 2]));
        assert_eq!(params.regimes[0], Some(KnotRegime::Unclamped));
        assert_eq!(params.regimes[1], Some(KnotRegime::Periodic));
        assert_eq!(params.regimes[2], None);
        assert_eq!(params.mode, DisplacementMode::Global);
    }

    #[test]
    fn test_regime_axis_out_of_range_ignored() {
        let params = LatticeParams::new(4, 4, 4).with_regime(3, KnotRegime::Periodic);
        assert_eq!(params.regimes, [None; 3]);
    }

    #[test]
    fn test_vertex_mask() {
        let mask: HashSet<usize> = [0, 2].into_iter().collect();
        let params = LatticeParams::new(4, 4, 4).with_vertex_mask(mask);

        assert!(params.should_deform_vertex(0));
        assert!(!params.should_deform_vertex(1));
        assert!(params.should_deform_vertex(2));
        assert!(!params.should_deform_vertex(100));
    }

    #[test]
    fn test_without_vertex_mask() {
        let mask: HashSet<usize> = [0].into_iter().collect();
        let params = LatticeParams::new(4, 4, 4)
            .with_vertex_mask(mask)
            .without_vertex_mask();

        assert!(params.vertex_mask.is_none());
        assert!(params.should_deform_vertex(7));
    }
}
