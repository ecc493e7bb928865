//! Property-based tests for the deformation lattice.
//!
//! These tests use proptest to generate random shapes and lattices and
//! verify coordinate-frame and field invariants.
//!
//! Run with: cargo test -p ffd-lattice -- proptest

use ffd_lattice::{DisplacementMode, FfdLattice, LatticeParams};
use ffd_types::{Point3, Shape, Vector3};
use proptest::prelude::*;
use std::f64::consts::{PI, TAU};

// =============================================================================
// Strategies for generating random shapes and sample points
// =============================================================================

/// Generate a random world-space origin.
fn arb_origin() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(-10.0..10.0f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Generate a shape of any topology, full-turn or wedge.
fn arb_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (arb_origin(), prop::array::uniform3(0.5..4.0f64))
            .prop_map(|(origin, span)| Shape::cube(origin, span)),
        (arb_origin(), 0.5..3.0f64, 0.5..4.0f64).prop_map(|(origin, radius, height)| {
            Shape::cylinder(origin, [radius, TAU, height])
        }),
        (arb_origin(), 0.5..3.0f64, 0.8..5.0f64, 0.5..4.0f64).prop_map(
            |(origin, radius, azimuth, height)| {
                Shape::cylinder(origin, [radius, azimuth, height])
            }
        ),
        (arb_origin(), 0.5..3.0f64)
            .prop_map(|(origin, radius)| Shape::sphere(origin, [radius, TAU, PI])),
        (arb_origin(), 0.5..3.0f64, 0.8..5.0f64, 0.5..2.5f64).prop_map(
            |(origin, radius, azimuth, polar)| {
                Shape::sphere(origin, [radius, azimuth, polar])
            }
        ),
    ]
}

/// Generate a point strictly inside the unit cube, away from seams,
/// poles, and boundary faces.
fn arb_basic_interior() -> impl Strategy<Value = Point3<f64>> {
    prop::array::uniform3(0.02..0.98f64).prop_map(|[x, y, z]| Point3::new(x, y, z))
}

fn arb_dims() -> impl Strategy<Value = [usize; 3]> {
    prop::array::uniform3(2..6usize)
}

fn arb_mode() -> impl Strategy<Value = DisplacementMode> {
    prop_oneof![
        Just(DisplacementMode::Global),
        Just(DisplacementMode::Local)
    ]
}

/// Map a basic-frame sample into world space for a given shape.
fn world_sample(shape: &Shape, basic: &Point3<f64>) -> Point3<f64> {
    shape.to_world(&shape.basic_to_local(basic))
}

/// Deterministic bounded displacement field, one vector per DOF.
fn bounded_field(count: usize, bound: f64) -> Vec<Vector3<f64>> {
    (0..count)
        .map(|i| {
            let t = |s: usize| (((i * s + 3) % 11) as f64) / 5.5 - 1.0;
            Vector3::new(t(7), t(5), t(3)) * bound
        })
        .collect()
}

// =============================================================================
// Property Tests: Coordinate frames
// =============================================================================

proptest! {
    /// world -> local -> world recovers interior points for every topology.
    #[test]
    fn round_trip_recovers_interior_points(shape in arb_shape(), basic in arb_basic_interior()) {
        let local = shape.basic_to_local(&basic);
        let world = shape.to_world(&local);
        let recovered = shape.to_local(&world);

        prop_assert!(
            (recovered - local).norm() < 1e-9,
            "local {:?} came back as {:?}",
            local,
            recovered
        );
    }

    /// Points built from interior basic coordinates are always contained.
    #[test]
    fn interior_points_are_contained(shape in arb_shape(), basic in arb_basic_interior()) {
        prop_assert!(shape.contains(&world_sample(&shape, &basic)));
    }

    /// Inflating the first basic coordinate past 1 leaves the volume.
    #[test]
    fn radially_inflated_points_are_outside(
        shape in arb_shape(),
        basic in arb_basic_interior(),
        factor in 1.05..3.0f64,
    ) {
        let mut outside = basic;
        outside.x = factor;
        prop_assert!(!shape.contains(&world_sample(&shape, &outside)));
    }
}

// =============================================================================
// Property Tests: Field invariants
// =============================================================================

proptest! {
    /// An all-zero control field moves nothing, in either mode.
    #[test]
    fn zero_field_never_moves_anything(
        shape in arb_shape(),
        dims in arb_dims(),
        mode in arb_mode(),
        basic in arb_basic_interior(),
    ) {
        let params = LatticeParams::new(dims[0], dims[1], dims[2]).with_mode(mode);
        let world = world_sample(&shape, &basic);
        let mut lattice = FfdLattice::new(shape, params);

        prop_assert!(lattice.deform_point(&world).norm() < 1e-9);
    }

    /// A uniform control field is reproduced exactly inside the volume.
    #[test]
    fn uniform_field_translates_interior(
        shape in arb_shape(),
        dims in arb_dims(),
        basic in arb_basic_interior(),
        shift in prop::array::uniform3(-0.5..0.5f64),
    ) {
        let params = LatticeParams::new(dims[0], dims[1], dims[2])
            .with_mode(DisplacementMode::Global);
        let world = world_sample(&shape, &basic);
        let mut lattice = FfdLattice::new(shape, params);

        let uniform = Vector3::new(shift[0], shift[1], shift[2]);
        let field = vec![uniform; lattice.dof_count()];
        lattice.set_displacements(field).unwrap();

        let displacement = lattice.deform_point(&world);
        prop_assert!(
            (displacement - uniform).norm() < 1e-9,
            "expected {:?}, got {:?}",
            uniform,
            displacement
        );
    }

    /// Each blended component stays within the control-field bound.
    #[test]
    fn blend_stays_within_control_bounds(
        shape in arb_shape(),
        dims in arb_dims(),
        basic in arb_basic_interior(),
        bound in 0.1..2.0f64,
    ) {
        let params = LatticeParams::new(dims[0], dims[1], dims[2])
            .with_mode(DisplacementMode::Global);
        let world = world_sample(&shape, &basic);
        let mut lattice = FfdLattice::new(shape, params);

        let field = bounded_field(lattice.dof_count(), bound);
        lattice.set_displacements(field).unwrap();

        let displacement = lattice.deform_point(&world);
        for component in [displacement.x, displacement.y, displacement.z] {
            prop_assert!(component.abs() <= bound + 1e-9);
        }
    }

    /// Points outside the volume never move, whatever the control field.
    #[test]
    fn outside_points_never_move(
        shape in arb_shape(),
        dims in arb_dims(),
        basic in arb_basic_interior(),
        factor in 1.05..3.0f64,
        bound in 0.1..2.0f64,
    ) {
        let params = LatticeParams::new(dims[0], dims[1], dims[2]);
        let mut outside = basic;
        outside.x = factor;
        let world = world_sample(&shape, &outside);
        let mut lattice = FfdLattice::new(shape, params);

        let field = bounded_field(lattice.dof_count(), bound);
        lattice.set_displacements(field).unwrap();

        prop_assert_eq!(lattice.deform_point(&world), Vector3::zeros());
    }
}

// =============================================================================
// Property Tests: Lattice structure
// =============================================================================

proptest! {
    /// Rebuilding after an equivalent setter call keeps the DOF count.
    #[test]
    fn dof_count_is_stable_across_rebuilds(shape in arb_shape(), dims in arb_dims()) {
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(dims[0], dims[1], dims[2]));
        let first = lattice.dof_count();

        lattice.set_dimensions(dims[0], dims[1], dims[2]);
        prop_assert!(!lattice.is_built());
        prop_assert_eq!(lattice.dof_count(), first);
    }

    /// Reduction only ever removes freedom, and never all of it.
    #[test]
    fn dof_count_is_bounded_by_node_count(shape in arb_shape(), dims in arb_dims()) {
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(dims[0], dims[1], dims[2]));
        let dofs = lattice.dof_count();
        let [nx, ny, nz] = lattice.dimensions();

        prop_assert!(dofs >= 1);
        prop_assert!(dofs <= nx * ny * nz);
    }

    /// Every DOF's representative node maps back to that DOF.
    #[test]
    fn representative_nodes_round_trip(shape in arb_shape(), dims in arb_dims()) {
        let mut lattice = FfdLattice::new(shape, LatticeParams::new(dims[0], dims[1], dims[2]));

        for dof in 0..lattice.dof_count() {
            let [i, j, k] = lattice.representative_node(dof);
            prop_assert_eq!(lattice.dof_of_node(i, j, k), dof);
        }
    }
}

// =============================================================================
// Fixed topology spot checks
// =============================================================================

#[test]
fn full_sphere_collapses_to_thirteen_dofs() {
    let shape = Shape::sphere(Point3::origin(), [1.0, TAU, PI]);
    let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 5, 3));

    // 45 grid nodes: center, two aliased pole caps, and a wrapped seam.
    assert_eq!(lattice.dof_count(), 13);
}

#[test]
fn cube_keeps_every_node_independent() {
    let shape = Shape::cube(Point3::origin(), [1.0, 1.0, 1.0]);
    let mut lattice = FfdLattice::new(shape, LatticeParams::new(3, 4, 5));

    assert_eq!(lattice.dof_count(), 3 * 4 * 5);
}
