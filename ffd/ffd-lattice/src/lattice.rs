//! Shape-conforming deformation lattice.
//!
//! [`FfdLattice`] aggregates a [`Shape`], the lattice configuration, and the
//! per-DOF displacement and weight fields. Derived state (node grid, per-axis
//! knot topology, DOF reduction, evaluation order) lives in a lazily built
//! core. Every structural setter drops the core and every evaluation entry
//! point rebuilds it first, so evaluation can never observe stale derived
//! data.

use crate::{
    dof::DofMap,
    error::{FfdError, FfdResult},
    grid::StructuredGrid,
    knots::{AxisKnots, KnotRegime},
    params::{DisplacementMode, LatticeParams},
};
use ffd_types::{Point3, Shape, ShapeKind, Vector3};
use std::collections::HashSet;
use std::f64::consts::PI;
use tracing::{info, warn};

/// Tolerance for detecting polar caps on the sphere's polar range.
const POLE_EPS: f64 = 1.0e-12;

/// Derived lattice state, consistent with the current shape and parameters.
#[derive(Debug, Clone)]
pub(crate) struct LatticeCore {
    pub(crate) grid: StructuredGrid,
    pub(crate) axes: [AxisKnots; 3],
    pub(crate) dof: DofMap,
    pub(crate) eval_order: [usize; 3],
}

/// Free-form deformation lattice over a primitive shape.
///
/// The lattice owns a control-node grid conforming to its shape, reduces the
/// grid to independent degrees of freedom, and blends per-DOF displacements
/// into a smooth trivariate NURBS field evaluated at arbitrary world points.
/// Points outside the shape volume always receive a zero displacement.
///
/// # Example
///
/// ```
/// use ffd_lattice::{FfdLattice, LatticeParams};
/// use ffd_types::{Point3, Shape, Vector3};
///
/// let shape = Shape::cube(Point3::origin(), [2.0, 2.0, 2.0]);
/// let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 3, 3));
///
/// // Push the central control point up.
/// let mut field = vec![Vector3::zeros(); lattice.dof_count()];
/// field[13] = Vector3::new(0.0, 0.0, 0.5);
/// lattice.set_displacements(field).unwrap();
///
/// let moved = lattice.deform_point(&Point3::origin());
/// assert!(moved.z > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct FfdLattice {
    shape: Shape,
    params: LatticeParams,
    displacements: Vec<Vector3<f64>>,
    weights: Vec<f64>,
    core: Option<LatticeCore>,
}

impl FfdLattice {
    /// Creates an unbuilt lattice over a shape.
    #[must_use]
    pub const fn new(shape: Shape, params: LatticeParams) -> Self {
        Self {
            shape,
            params,
            displacements: Vec::new(),
            weights: Vec::new(),
            core: None,
        }
    }

    /// Returns the lattice shape.
    #[must_use]
    pub const fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the lattice parameters.
    #[must_use]
    pub const fn params(&self) -> &LatticeParams {
        &self.params
    }

    /// Returns whether the derived state is currently built.
    #[must_use]
    pub const fn is_built(&self) -> bool {
        self.core.is_some()
    }

    /// Replaces the shape. Drops derived state.
    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.invalidate();
    }

    /// Moves the shape origin. Drops derived state.
    pub fn set_origin(&mut self, origin: Point3<f64>) {
        self.shape.set_origin(origin);
        self.invalidate();
    }

    /// Resizes the shape span. Drops derived state.
    pub fn set_span(&mut self, s0: f64, s1: f64, s2: f64) {
        self.shape.set_span(s0, s1, s2);
        self.invalidate();
    }

    /// Sets an angular origin offset on the shape. Drops derived state.
    pub fn set_inf_limit(&mut self, value: f64, axis: usize) {
        self.shape.set_inf_limit(value, axis);
        self.invalidate();
    }

    /// Reorients the shape's reference frame. Drops derived state.
    pub fn set_axes(&mut self, axis0: Vector3<f64>, axis1: Vector3<f64>, axis2: Vector3<f64>) {
        self.shape.set_axes(axis0, axis1, axis2);
        self.invalidate();
    }

    /// Aligns one shape axis with a direction. Drops derived state.
    pub fn orient_axis(&mut self, axis: usize, direction: Vector3<f64>) {
        self.shape.orient_axis(axis, direction);
        self.invalidate();
    }

    /// Sets the requested node counts. Drops derived state.
    pub fn set_dimensions(&mut self, nx: usize, ny: usize, nz: usize) {
        self.params.dims = [nx, ny, nz];
        self.invalidate();
    }

    /// Sets explicit curve degrees. Drops derived state.
    pub fn set_degrees(&mut self, dx: usize, dy: usize, dz: usize) {
        self.params.degrees = Some([dx, dy, dz]);
        self.invalidate();
    }

    /// Sets the knot regime of one axis. Drops derived state.
    ///
    /// Axis indices above 2 are ignored.
    pub fn set_regime(&mut self, axis: usize, regime: KnotRegime) {
        if axis < 3 {
            self.params.regimes[axis] = Some(regime);
            self.invalidate();
        }
    }

    /// Sets the displacement interpretation.
    ///
    /// Takes effect on the next evaluation; derived state is kept.
    pub fn set_mode(&mut self, mode: DisplacementMode) {
        self.params.mode = mode;
    }

    /// Restricts bulk deformation to the listed vertex indices.
    pub fn set_vertex_mask(&mut self, mask: HashSet<usize>) {
        self.params.vertex_mask = Some(mask);
    }

    /// Clears the vertex mask so all vertices are deformed.
    pub fn clear_vertex_mask(&mut self) {
        self.params.vertex_mask = None;
    }

    fn invalidate(&mut self) {
        self.core = None;
    }

    /// Builds the derived state if it is missing.
    ///
    /// Node counts are raised to the topology minimum of the shape, degrees
    /// default to `nodes - 1` per axis, and unset regimes derive from the
    /// shape's periodicity. The displacement and weight fields are resized
    /// to the DOF count, preserving existing entries.
    pub fn build(&mut self) {
        if self.core.is_some() {
            return;
        }
        let kind = self.shape.kind();

        let minimums = minimum_dims(kind);
        let mut dims = self.params.dims;
        for axis in 0..3 {
            dims[axis] = dims[axis].max(minimums[axis]);
        }
        if dims != self.params.dims {
            warn!(
                kind = %kind,
                requested = ?self.params.dims,
                corrected = ?dims,
                "node counts raised to the topology minimum"
            );
        }

        let degrees = self
            .params
            .degrees
            .unwrap_or([dims[0] - 1, dims[1] - 1, dims[2] - 1]);
        let regimes = [0_usize, 1, 2].map(|axis| {
            self.params.regimes[axis].unwrap_or(if self.shape.is_periodic(axis) {
                KnotRegime::Periodic
            } else {
                KnotRegime::Clamped
            })
        });

        let grid = StructuredGrid::new(&self.shape, dims);
        let origin = self.shape.local_origin();
        let span = self.shape.local_span();
        let axes = [0_usize, 1, 2].map(|axis| {
            AxisKnots::build(
                regimes[axis],
                dims[axis],
                degrees[axis],
                origin[axis],
                span[axis],
            )
        });

        let azimuth_periodic = axes[1].regime() == KnotRegime::Periodic;
        let inf = self.shape.inf_limits();
        let north_pole = kind == ShapeKind::Sphere && inf.z.abs() <= POLE_EPS;
        let south_pole = kind == ShapeKind::Sphere && (inf.z + span.z - PI).abs() <= POLE_EPS;
        let dof = DofMap::build(kind, dims, azimuth_periodic, north_pole, south_pole);

        let mut eval_order = [0_usize, 1, 2];
        eval_order.sort_by_key(|&axis| (dims[axis], axis));

        let dof_count = dof.dof_count();
        if self.displacements.len() != dof_count {
            self.displacements.resize(dof_count, Vector3::zeros());
        }
        if self.weights.len() != dof_count {
            self.weights.resize(dof_count, 1.0);
        }
        info!(
            kind = %kind,
            dims = ?dims,
            dofs = dof_count,
            "deformation lattice built"
        );

        self.core = Some(LatticeCore {
            grid,
            axes,
            dof,
            eval_order,
        });
    }

    /// Returns the number of independent degrees of freedom.
    ///
    /// Builds the lattice if needed.
    pub fn dof_count(&mut self) -> usize {
        self.build();
        self.core.as_ref().map_or(0, |core| core.dof.dof_count())
    }

    /// Returns the node counts actually in effect after topology correction.
    ///
    /// Builds the lattice if needed.
    pub fn dimensions(&mut self) -> [usize; 3] {
        self.build();
        self.core.as_ref().map_or([0; 3], |core| core.grid.counts())
    }

    /// Returns the curve degrees actually in effect after capping.
    ///
    /// Builds the lattice if needed.
    pub fn degrees(&mut self) -> [usize; 3] {
        self.build();
        self.core.as_ref().map_or([0; 3], |core| {
            [
                core.axes[0].degree(),
                core.axes[1].degree(),
                core.axes[2].degree(),
            ]
        })
    }

    /// Returns the knot regimes actually in effect.
    ///
    /// Builds the lattice if needed.
    pub fn regimes(&mut self) -> [KnotRegime; 3] {
        self.build();
        self.core
            .as_ref()
            .map_or([KnotRegime::Clamped; 3], |core| {
                [
                    core.axes[0].regime(),
                    core.axes[1].regime(),
                    core.axes[2].regime(),
                ]
            })
    }

    /// Replaces the per-DOF displacement field.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::DisplacementCount`] if the list length does not
    /// match the DOF count.
    pub fn set_displacements(&mut self, displacements: Vec<Vector3<f64>>) -> FfdResult<()> {
        let expected = self.dof_count();
        if displacements.len() != expected {
            return Err(FfdError::DisplacementCount {
                expected,
                actual: displacements.len(),
            });
        }
        self.displacements = displacements;
        Ok(())
    }

    /// Returns the per-DOF displacement field.
    ///
    /// Resized to the DOF count on build.
    #[must_use]
    pub fn displacements(&self) -> &[Vector3<f64>] {
        &self.displacements
    }

    /// Replaces the per-DOF NURBS weights.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::WeightCount`] on a length mismatch and
    /// [`FfdError::InvalidWeight`] if any weight is not strictly positive
    /// and finite.
    pub fn set_weights(&mut self, weights: Vec<f64>) -> FfdResult<()> {
        let expected = self.dof_count();
        if weights.len() != expected {
            return Err(FfdError::WeightCount {
                expected,
                actual: weights.len(),
            });
        }
        for (index, &value) in weights.iter().enumerate() {
            if !value.is_finite() || value <= 0.0 {
                return Err(FfdError::InvalidWeight { index, value });
            }
        }
        self.weights = weights;
        Ok(())
    }

    /// Returns the per-DOF NURBS weights.
    #[must_use]
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the DOF index controlling a grid node.
    ///
    /// Builds the lattice if needed.
    pub fn dof_of_node(&mut self, i: usize, j: usize, k: usize) -> usize {
        self.build();
        self.core
            .as_ref()
            .map_or(0, |core| core.dof.dof_of(core.grid.flatten(i, j, k)))
    }

    /// Returns the representative grid node of a DOF.
    ///
    /// Builds the lattice if needed.
    pub fn representative_node(&mut self, dof: usize) -> [usize; 3] {
        self.build();
        self.core.as_ref().map_or([0; 3], |core| {
            core.grid.unflatten(core.dof.representative(dof) as usize)
        })
    }

    /// Recovers the displacement of every grid node through the DOF map.
    ///
    /// Builds the lattice if needed.
    pub fn grid_displacements(&mut self) -> Vec<Vector3<f64>> {
        self.build();
        self.core
            .as_ref()
            .map_or_else(Vec::new, |core| core.dof.expand(&self.displacements))
    }

    /// Recovers the NURBS weight of every grid node through the DOF map.
    ///
    /// Builds the lattice if needed.
    pub fn grid_weights(&mut self) -> Vec<f64> {
        self.build();
        self.core
            .as_ref()
            .map_or_else(Vec::new, |core| core.dof.expand(&self.weights))
    }

    /// Returns the world position of every grid node, in flat node order.
    ///
    /// Builds the lattice if needed.
    pub fn grid_world_points(&mut self) -> Vec<Point3<f64>> {
        self.build();
        let Some(core) = self.core.as_ref() else {
            return Vec::new();
        };
        let counts = core.grid.counts();
        let mut points = Vec::with_capacity(core.grid.node_count());
        for i in 0..counts[0] {
            for j in 0..counts[1] {
                for k in 0..counts[2] {
                    points.push(self.shape.to_world(&core.grid.local_node(i, j, k)));
                }
            }
        }
        points
    }

    /// Returns the world position of every grid node with its current
    /// displacement applied, in flat node order.
    ///
    /// Builds the lattice if needed.
    pub fn deformed_grid_points(&mut self) -> Vec<Point3<f64>> {
        self.build();
        let Some(core) = self.core.as_ref() else {
            return Vec::new();
        };
        let scaling = self.shape.scaling();
        let counts = core.grid.counts();
        let mut points = Vec::with_capacity(core.grid.node_count());
        for i in 0..counts[0] {
            for j in 0..counts[1] {
                for k in 0..counts[2] {
                    let flat = core.grid.flatten(i, j, k);
                    let displacement = self.displacements[core.dof.dof_of(flat)];
                    let local = core.grid.local_node(i, j, k);
                    let point = match self.params.mode {
                        DisplacementMode::Global => self.shape.to_world(&local) + displacement,
                        DisplacementMode::Local => {
                            let perturbed = Point3::new(
                                local.x + displacement.x / scaling.x,
                                local.y + displacement.y / scaling.y,
                                local.z + displacement.z / scaling.z,
                            );
                            self.shape.to_world(&perturbed)
                        }
                    };
                    points.push(point);
                }
            }
        }
        points
    }

    /// Evaluates the displacement field at one world point.
    ///
    /// Returns the zero vector for points outside the shape volume. Builds
    /// the lattice if needed.
    pub fn deform_point(&mut self, point: &Point3<f64>) -> Vector3<f64> {
        self.eval_context()
            .map_or_else(Vector3::zeros, |ctx| ctx.displacement_at(point))
    }

    /// Builds the lattice and borrows everything evaluation needs.
    pub(crate) fn eval_context(&mut self) -> Option<EvalContext<'_>> {
        self.build();
        let core = self.core.as_ref()?;
        Some(EvalContext {
            core,
            shape: &self.shape,
            displacements: &self.displacements,
            weights: &self.weights,
            mode: self.params.mode,
        })
    }
}

/// Borrowed view of a built lattice used by the evaluation loops.
pub(crate) struct EvalContext<'a> {
    core: &'a LatticeCore,
    shape: &'a Shape,
    displacements: &'a [Vector3<f64>],
    weights: &'a [f64],
    mode: DisplacementMode,
}

impl EvalContext<'_> {
    /// Evaluates the displacement field at one world point.
    pub(crate) fn displacement_at(&self, world: &Point3<f64>) -> Vector3<f64> {
        if !self.shape.contains(world) {
            return Vector3::zeros();
        }
        let local = self.shape.to_local(world);
        let blend = blend_at(self.core, self.weights, self.displacements, &local);
        match self.mode {
            DisplacementMode::Global => Vector3::new(blend[0], blend[1], blend[2]) / blend[3],
            DisplacementMode::Local => {
                let scaling = self.shape.scaling();
                let perturbed = Point3::new(
                    local.x + blend[0] / (blend[3] * scaling.x),
                    local.y + blend[1] / (blend[3] * scaling.y),
                    local.z + blend[2] / (blend[3] * scaling.z),
                );
                self.shape.to_world(&perturbed) - *world
            }
        }
    }
}

/// Accumulates the rational blend numerator and denominator at a local point.
///
/// Walks the `(degree + 1)^3` tensor neighborhood of the query's knot
/// intervals, smallest axis first. Loop counters write their theoretical
/// basis index into the slot of their real axis, so the traversal order
/// cannot change which control points are touched. Each tap resolves through
/// the per-axis node map and the DOF map before fetching displacement and
/// weight.
fn blend_at(
    core: &LatticeCore,
    weights: &[f64],
    displacements: &[Vector3<f64>],
    local: &Point3<f64>,
) -> [f64; 4] {
    let mut bases: [Vec<f64>; 3] = [Vec::new(), Vec::new(), Vec::new()];
    let mut starts = [0_usize; 3];
    for axis in 0..3 {
        let knots = &core.axes[axis];
        let interval = knots.interval_of(local[axis]);
        starts[axis] = interval - knots.degree();
        bases[axis] = knots.basis_at(interval, local[axis]);
    }

    let [a0, a1, a2] = core.eval_order;
    let mut acc = [0.0_f64; 4];
    let mut idx = [0_usize; 3];
    for (i, &b0) in bases[a0].iter().enumerate() {
        let mut plane = [0.0_f64; 4];
        for (j, &b1) in bases[a1].iter().enumerate() {
            let mut line = [0.0_f64; 4];
            for (k, &b2) in bases[a2].iter().enumerate() {
                idx[a0] = starts[a0] + i;
                idx[a1] = starts[a1] + j;
                idx[a2] = starts[a2] + k;
                let flat = core.grid.flatten(
                    core.axes[0].node_of_basis(idx[0]),
                    core.axes[1].node_of_basis(idx[1]),
                    core.axes[2].node_of_basis(idx[2]),
                );
                let dof = core.dof.dof_of(flat);
                let bw = b2 * weights[dof];
                let displacement = displacements[dof];
                line[0] += bw * displacement.x;
                line[1] += bw * displacement.y;
                line[2] += bw * displacement.z;
                line[3] += bw;
            }
            for (slot, value) in plane.iter_mut().zip(line) {
                *slot += b1 * value;
            }
        }
        for (slot, value) in acc.iter_mut().zip(plane) {
            *slot += b0 * value;
        }
    }
    acc
}

/// Topology-imposed node count minimums per axis.
const fn minimum_dims(kind: ShapeKind) -> [usize; 3] {
    match kind {
        ShapeKind::Cube => [2, 2, 2],
        ShapeKind::Cylinder => [2, 5, 2],
        ShapeKind::Sphere => [2, 5, 3],
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
    use std::f64::consts::TAU;

    fn unit_cube_lattice() -> FfdLattice {
        let shape = Shape::cube(Point3::origin(), [1.0, 1.0, 1.0]);
        FfdLattice::new(shape, LatticeParams::new(3, 3, 3).with_degrees(2, 2, 2))
    }

    fn center_displaced(lattice: &mut FfdLattice, displacement: Vector3<f64>) {
        let center = lattice.dof_of_node(1, 1, 1);
        let mut field = vec![Vector3::zeros(); lattice.dof_count()];
        field[center] = displacement;
        lattice.set_displacements(field).unwrap();
    }

    #[test]
    fn test_build_is_lazy_and_idempotent() {
        let mut lattice = unit_cube_lattice();
        assert!(!lattice.is_built());

        assert_eq!(lattice.dof_count(), 27);
        assert!(lattice.is_built());

        lattice.build();
        assert_eq!(lattice.dof_count(), 27);
    }

    #[test]
    fn test_structural_setters_invalidate() {
        let mut lattice = unit_cube_lattice();
        lattice.build();

        lattice.set_dimensions(4, 4, 4);
        assert!(!lattice.is_built());
        assert_eq!(lattice.dof_count(), 64);

        lattice.set_span(2.0, 2.0, 2.0);
        assert!(!lattice.is_built());
    }

    #[test]
    fn test_mode_and_mask_keep_core() {
        let mut lattice = unit_cube_lattice();
        lattice.build();

        lattice.set_mode(DisplacementMode::Global);
        assert!(lattice.is_built());

        lattice.set_vertex_mask([0_usize].into_iter().collect());
        assert!(lattice.is_built());
    }

    #[test]
    fn test_cylinder_dims_raised_and_degrees_follow() {
        let shape = Shape::cylinder(Point3::origin(), [1.0, TAU, 2.0]);
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(2, 2, 2));

        assert_eq!(lattice.dimensions(), [2, 5, 2]);
        // Default degrees are taken from the corrected node counts.
        assert_eq!(lattice.degrees(), [1, 4, 1]);
    }

    #[test]
    fn test_full_turn_cylinder_derives_periodic_regime() {
        let shape = Shape::cylinder(Point3::origin(), [1.0, TAU, 2.0]);
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 5, 2));

        assert_eq!(
            lattice.regimes(),
            [
                KnotRegime::Clamped,
                KnotRegime::Periodic,
                KnotRegime::Clamped
            ]
        );
        assert_eq!(lattice.dof_count(), 18);
    }

    #[test]
    fn test_half_turn_cylinder_stays_clamped() {
        let shape = Shape::cylinder(Point3::origin(), [1.0, PI, 2.0]);
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 5, 2));

        assert_eq!(lattice.regimes()[1], KnotRegime::Clamped);
        assert_eq!(lattice.dof_count(), 2 + 2 * 5 * 2);
    }

    #[test]
    fn test_displacement_count_is_validated() {
        let mut lattice = unit_cube_lattice();

        let result = lattice.set_displacements(vec![Vector3::zeros(); 5]);
        assert!(matches!(
            result,
            Err(FfdError::DisplacementCount {
                expected: 27,
                actual: 5
            })
        ));
    }

    #[test]
    fn test_weights_are_validated() {
        let mut lattice = unit_cube_lattice();

        assert!(matches!(
            lattice.set_weights(vec![1.0; 4]),
            Err(FfdError::WeightCount { .. })
        ));

        let mut weights = vec![1.0; 27];
        weights[3] = -2.0;
        assert!(matches!(
            lattice.set_weights(weights),
            Err(FfdError::InvalidWeight { index: 3, .. })
        ));
    }

    #[test]
    fn test_zero_field_evaluates_to_zero() {
        let mut lattice = unit_cube_lattice();

        for mode in [DisplacementMode::Global, DisplacementMode::Local] {
            lattice.set_mode(mode);
            for sample in [
                Point3::origin(),
                Point3::new(0.3, -0.2, 0.1),
                Point3::new(-0.5, -0.5, -0.5),
            ] {
                let displacement = lattice.deform_point(&sample);
                assert_relative_eq!(displacement.norm(), 0.0, epsilon = 1.0e-12);
            }
        }
    }

    #[test]
    fn test_outside_point_gets_zero() {
        let mut lattice = unit_cube_lattice();
        center_displaced(&mut lattice, Vector3::new(0.0, 0.0, 1.0));

        let displacement = lattice.deform_point(&Point3::new(0.51, 0.0, 0.0));
        assert_eq!(displacement, Vector3::zeros());
    }

    #[test]
    fn test_center_control_point_moves_center_along_z() {
        let mut lattice = unit_cube_lattice();
        center_displaced(&mut lattice, Vector3::new(0.0, 0.0, 1.0));

        // Quadratic tensor basis at the center: (1/2)^3 of the control value.
        let displacement = lattice.deform_point(&Point3::origin());
        assert_relative_eq!(displacement.x, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(displacement.y, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(displacement.z, 0.125, epsilon = 1.0e-12);
    }

    #[test]
    fn test_corner_node_is_interpolated() {
        let mut lattice = unit_cube_lattice();
        let corner = lattice.dof_of_node(0, 0, 0);
        let mut field = vec![Vector3::zeros(); lattice.dof_count()];
        field[corner] = Vector3::new(0.2, -0.1, 0.4);
        lattice.set_displacements(field).unwrap();

        // Clamped ends make the basis cardinal at the corner node.
        let displacement = lattice.deform_point(&Point3::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(displacement.x, 0.2, epsilon = 1.0e-12);
        assert_relative_eq!(displacement.y, -0.1, epsilon = 1.0e-12);
        assert_relative_eq!(displacement.z, 0.4, epsilon = 1.0e-12);
    }

    #[test]
    fn test_uniform_field_is_reproduced_everywhere() {
        let mut lattice = unit_cube_lattice();
        lattice.set_mode(DisplacementMode::Global);
        let uniform = Vector3::new(0.3, 0.7, -0.2);
        let field = vec![uniform; lattice.dof_count()];
        lattice.set_displacements(field).unwrap();

        for sample in [
            Point3::origin(),
            Point3::new(0.25, 0.1, -0.45),
            Point3::new(-0.37, 0.42, 0.11),
        ] {
            let displacement = lattice.deform_point(&sample);
            assert_relative_eq!(displacement.x, uniform.x, epsilon = 1.0e-12);
            assert_relative_eq!(displacement.y, uniform.y, epsilon = 1.0e-12);
            assert_relative_eq!(displacement.z, uniform.z, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn test_local_mode_matches_global_for_axis_aligned_cube() {
        let mut global = unit_cube_lattice();
        global.set_mode(DisplacementMode::Global);
        center_displaced(&mut global, Vector3::new(0.1, 0.2, 0.3));

        let mut local = unit_cube_lattice();
        local.set_mode(DisplacementMode::Local);
        center_displaced(&mut local, Vector3::new(0.1, 0.2, 0.3));

        let sample = Point3::new(0.12, -0.31, 0.05);
        let from_global = global.deform_point(&sample);
        let from_local = local.deform_point(&sample);
        assert_relative_eq!(from_global.x, from_local.x, epsilon = 1.0e-12);
        assert_relative_eq!(from_global.y, from_local.y, epsilon = 1.0e-12);
        assert_relative_eq!(from_global.z, from_local.z, epsilon = 1.0e-12);
    }

    #[test]
    fn test_weight_pulls_blend_toward_control_point() {
        let mut lattice = unit_cube_lattice();
        center_displaced(&mut lattice, Vector3::new(0.0, 0.0, 1.0));

        let center = lattice.dof_of_node(1, 1, 1);
        let mut weights = vec![1.0; lattice.dof_count()];
        weights[center] = 100.0;
        lattice.set_weights(weights).unwrap();

        let displacement = lattice.deform_point(&Point3::origin());
        assert!(displacement.z > 0.5, "rational blend should favor the heavy control point, got {}", displacement.z);
    }

    #[test]
    fn test_grid_recovery_shares_aliased_values() {
        let shape = Shape::cylinder(Point3::origin(), [1.0, TAU, 2.0]);
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 5, 2));

        let count = lattice.dof_count();
        let field: Vec<Vector3<f64>> = (0..count)
            .map(|d| {
                #[allow(clippy::cast_precision_loss)]
                let v = d as f64;
                Vector3::new(v, 0.0, 0.0)
            })
            .collect();
        lattice.set_displacements(field).unwrap();

        let per_node = lattice.grid_displacements();
        assert_eq!(per_node.len(), 3 * 5 * 2);

        // The seam ring repeats the first azimuth ring.
        assert_eq!(lattice.dof_of_node(1, 4, 0), lattice.dof_of_node(1, 0, 0));
        let [_, ny, nz] = lattice.dimensions();
        let flat = |i: usize, j: usize, k: usize| ny * nz * i + nz * j + k;
        assert_eq!(per_node[flat(1, 4, 0)], per_node[flat(1, 0, 0)]);
        assert_eq!(per_node[flat(0, 3, 1)], per_node[flat(0, 0, 1)]);
    }

    #[test]
    fn test_deformed_grid_points_follow_displacements() {
        let mut lattice = unit_cube_lattice();
        lattice.set_mode(DisplacementMode::Global);
        let corner = lattice.dof_of_node(0, 0, 0);
        let mut field = vec![Vector3::zeros(); lattice.dof_count()];
        field[corner] = Vector3::new(0.0, 0.0, 0.25);
        lattice.set_displacements(field).unwrap();

        let rest = lattice.grid_world_points();
        let moved = lattice.deformed_grid_points();
        assert_eq!(rest.len(), moved.len());
        assert_relative_eq!(moved[0].z - rest[0].z, 0.25, epsilon = 1.0e-12);
        assert_relative_eq!((moved[1] - rest[1]).norm(), 0.0, epsilon = 1.0e-12);
    }

    #[test]
    fn test_representative_round_trip() {
        let shape = Shape::sphere(Point3::origin(), [1.0, TAU, PI]);
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 5, 3));

        for dof in 0..lattice.dof_count() {
            let [i, j, k] = lattice.representative_node(dof);
            assert_eq!(lattice.dof_of_node(i, j, k), dof);
        }
    }
}
