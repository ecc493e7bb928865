//! Bulk deformation drivers for point clouds and meshes.
//!
//! The drivers evaluate the lattice field once per vertex and report the
//! resulting displacement field without mutating the input geometry. Large
//! inputs are evaluated in parallel. The [`apply_to_cloud`] and
//! [`apply_to_mesh`] helpers apply a reported field in place.

use crate::{
    error::{FfdError, FfdResult},
    lattice::FfdLattice,
    result::{displacement_stats, DeformOutput},
};
use ffd_types::{IndexedMesh, Point3, PointCloud, Vector3};
use rayon::prelude::*;
use tracing::{debug, info};

/// Vertex count above which bulk evaluation switches to rayon.
const PARALLEL_THRESHOLD: usize = 1000;

impl FfdLattice {
    /// Evaluates the displacement field at every point of a cloud.
    ///
    /// Masked-out points and points outside the shape volume receive a zero
    /// displacement. Builds the lattice if needed.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::EmptyGeometry`] for an empty cloud and
    /// [`FfdError::InvalidMaskIndex`] if the vertex mask names a point that
    /// does not exist.
    pub fn deform_cloud(&mut self, cloud: &PointCloud) -> FfdResult<DeformOutput> {
        self.deform_positions(&cloud.points)
    }

    /// Evaluates the displacement field at every vertex of a mesh.
    ///
    /// Behaves like [`FfdLattice::deform_cloud`] and additionally reports
    /// the deformed-to-original volume ratio of closed meshes.
    ///
    /// # Errors
    ///
    /// Returns [`FfdError::EmptyGeometry`] for an empty mesh and
    /// [`FfdError::InvalidMaskIndex`] if the vertex mask names a vertex that
    /// does not exist.
    pub fn deform_mesh(&mut self, mesh: &IndexedMesh) -> FfdResult<DeformOutput> {
        if mesh.is_empty() {
            return Err(FfdError::EmptyGeometry);
        }
        let mut output = self.deform_positions(&mesh.vertices)?;

        let original_volume = mesh.volume();
        if original_volume > 1e-10 {
            let mut deformed = mesh.clone();
            apply_to_mesh(&mut deformed, &output.displacements)?;
            output.volume_ratio = deformed.volume() / original_volume;
            debug!(
                original = original_volume,
                ratio = output.volume_ratio,
                "mesh volume tracked through deformation"
            );
        }
        Ok(output)
    }

    fn deform_positions(&mut self, positions: &[Point3<f64>]) -> FfdResult<DeformOutput> {
        if positions.is_empty() {
            return Err(FfdError::EmptyGeometry);
        }
        self.build();

        if let Some(mask) = &self.params().vertex_mask {
            if let Some(&index) = mask.iter().find(|&&i| i >= positions.len()) {
                return Err(FfdError::InvalidMaskIndex {
                    index,
                    point_count: positions.len(),
                });
            }
        }
        let included: Vec<usize> = (0..positions.len())
            .filter(|&i| self.params().should_deform_vertex(i))
            .collect();

        let mut displacements = vec![Vector3::zeros(); positions.len()];
        let Some(ctx) = self.eval_context() else {
            return Ok(DeformOutput::new(displacements));
        };

        if included.len() > PARALLEL_THRESHOLD {
            let computed: Vec<(usize, Vector3<f64>)> = included
                .par_iter()
                .map(|&i| (i, ctx.displacement_at(&positions[i])))
                .collect();
            for (i, displacement) in computed {
                displacements[i] = displacement;
            }
        } else {
            for &i in &included {
                displacements[i] = ctx.displacement_at(&positions[i]);
            }
        }

        let (modified, max_displacement, average_displacement) =
            displacement_stats(&displacements);
        info!(
            points = positions.len(),
            modified, max_displacement, "lattice deformation evaluated"
        );

        Ok(DeformOutput {
            displacements,
            modified,
            max_displacement,
            average_displacement,
            volume_ratio: 1.0,
        })
    }
}

/// Applies per-point displacements to a cloud in place.
///
/// # Errors
///
/// Returns [`FfdError::DisplacementCount`] if the field length does not
/// match the point count.
pub fn apply_to_cloud(cloud: &mut PointCloud, displacements: &[Vector3<f64>]) -> FfdResult<()> {
    if displacements.len() != cloud.points.len() {
        return Err(FfdError::DisplacementCount {
            expected: cloud.points.len(),
            actual: displacements.len(),
        });
    }
    for (point, displacement) in cloud.points.iter_mut().zip(displacements) {
        *point += *displacement;
    }
    Ok(())
}

/// Applies per-vertex displacements to a mesh in place.
///
/// # Errors
///
/// Returns [`FfdError::DisplacementCount`] if the field length does not
/// match the vertex count.
pub fn apply_to_mesh(mesh: &mut IndexedMesh, displacements: &[Vector3<f64>]) -> FfdResult<()> {
    if displacements.len() != mesh.vertices.len() {
        return Err(FfdError::DisplacementCount {
            expected: mesh.vertices.len(),
            actual: displacements.len(),
        });
    }
    for (vertex, displacement) in mesh.vertices.iter_mut().zip(displacements) {
        *vertex += *displacement;
    }
    Ok(())
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
    use crate::params::{DisplacementMode, LatticeParams};
    use approx::assert_relative_eq;
    use ffd_types::{unit_cube, Shape};
    use std::collections::HashSet;
    use std::f64::consts::{PI, TAU};

    fn cube_lattice(span: f64) -> FfdLattice {
        let shape = Shape::cube(Point3::origin(), [span, span, span]);
        let params = LatticeParams::new(3, 3, 3).with_mode(DisplacementMode::Global);
        FfdLattice::new(shape, params)
    }

    fn bulge_z(lattice: &mut FfdLattice, magnitude: f64) {
        let center = lattice.dof_of_node(1, 1, 1);
        let mut field = vec![Vector3::zeros(); lattice.dof_count()];
        field[center] = Vector3::new(0.0, 0.0, magnitude);
        lattice.set_displacements(field).unwrap();
    }

    #[test]
    fn test_empty_cloud_is_rejected() {
        let mut lattice = cube_lattice(1.0);
        let result = lattice.deform_cloud(&PointCloud::new());
        assert!(matches!(result, Err(FfdError::EmptyGeometry)));
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let mut lattice = cube_lattice(1.0);
        let result = lattice.deform_mesh(&IndexedMesh::new());
        assert!(matches!(result, Err(FfdError::EmptyGeometry)));
    }

    #[test]
    fn test_zero_field_reports_no_modification() {
        let mut lattice = cube_lattice(2.0);
        let output = lattice.deform_mesh(&unit_cube()).unwrap();

        assert_eq!(output.modified, 0);
        assert_relative_eq!(output.max_displacement, 0.0);
        assert_relative_eq!(output.volume_ratio, 1.0, epsilon = 1.0e-12);
        assert!(output.displacements.iter().all(|d| d.norm() == 0.0));
    }

    #[test]
    fn test_center_bulge_moves_inner_points_only() {
        let mut lattice = cube_lattice(1.0);
        bulge_z(&mut lattice, 1.0);

        let cloud = PointCloud::from_points(vec![
            Point3::origin(),
            Point3::new(3.0, 0.0, 0.0),
        ]);
        let output = lattice.deform_cloud(&cloud).unwrap();

        assert_eq!(output.modified, 1);
        assert_relative_eq!(output.displacements[0].z, 0.125, epsilon = 1.0e-12);
        assert_eq!(output.displacements[1], Vector3::zeros());
        assert_relative_eq!(output.max_displacement, 0.125, epsilon = 1.0e-12);
    }

    #[test]
    fn test_vertex_mask_limits_deformation() {
        let mut lattice = cube_lattice(1.0);
        bulge_z(&mut lattice, 1.0);
        let mask: HashSet<usize> = [0_usize].into_iter().collect();
        lattice.set_vertex_mask(mask);

        let cloud = PointCloud::from_points(vec![Point3::origin(), Point3::origin()]);
        let output = lattice.deform_cloud(&cloud).unwrap();

        assert!(output.displacements[0].z > 0.0);
        assert_eq!(output.displacements[1], Vector3::zeros());
        assert_eq!(output.modified, 1);

        lattice.clear_vertex_mask();
        let output = lattice.deform_cloud(&cloud).unwrap();
        assert_eq!(output.modified, 2);
    }

    #[test]
    fn test_mask_index_out_of_range_is_rejected() {
        let mut lattice = cube_lattice(1.0);
        lattice.set_vertex_mask([5_usize].into_iter().collect());

        let cloud = PointCloud::from_points(vec![Point3::origin(), Point3::origin()]);
        let result = lattice.deform_cloud(&cloud);
        assert!(matches!(
            result,
            Err(FfdError::InvalidMaskIndex {
                index: 5,
                point_count: 2
            })
        ));
    }

    #[test]
    fn test_linear_field_scales_mesh_volume() {
        // Control displacements sampled from v(x) = 0.1 x reproduce the
        // linear map exactly, so the unit cube scales by 1.1 per axis.
        let mut lattice = cube_lattice(4.0);
        let nodes = lattice.grid_world_points();
        let field: Vec<Vector3<f64>> = nodes.iter().map(|p| 0.1 * p.coords).collect();
        lattice.set_displacements(field).unwrap();

        let output = lattice.deform_mesh(&unit_cube()).unwrap();
        assert_relative_eq!(output.volume_ratio, 1.1_f64.powi(3), epsilon = 1.0e-9);
        assert_eq!(output.modified, 7); // the origin vertex does not move
    }

    #[test]
    fn test_large_cloud_takes_parallel_path() {
        let mut lattice = cube_lattice(1.0);
        let uniform = Vector3::new(0.02, -0.01, 0.03);
        let field = vec![uniform; lattice.dof_count()];
        lattice.set_displacements(field).unwrap();

        let mut cloud = PointCloud::with_capacity(11 * 11 * 11);
        for xi in 0..11 {
            for yi in 0..11 {
                for zi in 0..11 {
                    #[allow(clippy::cast_precision_loss)]
                    let at = |n: usize| 0.08 * n as f64 - 0.4;
                    cloud.push(Point3::new(at(xi), at(yi), at(zi)));
                }
            }
        }
        assert!(cloud.len() > PARALLEL_THRESHOLD);

        let output = lattice.deform_cloud(&cloud).unwrap();
        assert_eq!(output.modified, cloud.len());
        for displacement in &output.displacements {
            assert_relative_eq!(displacement.x, uniform.x, epsilon = 1.0e-12);
            assert_relative_eq!(displacement.y, uniform.y, epsilon = 1.0e-12);
            assert_relative_eq!(displacement.z, uniform.z, epsilon = 1.0e-12);
        }
    }

    #[test]
    fn test_apply_to_cloud_moves_points() {
        let mut cloud = PointCloud::from_points(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        let field = vec![Vector3::new(0.0, 0.5, 0.0); 2];

        apply_to_cloud(&mut cloud, &field).unwrap();
        assert_relative_eq!(cloud.points[0].y, 0.5);
        assert_relative_eq!(cloud.points[1].y, 0.5);

        let short = vec![Vector3::zeros(); 1];
        assert!(matches!(
            apply_to_cloud(&mut cloud, &short),
            Err(FfdError::DisplacementCount {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_apply_to_mesh_moves_vertices() {
        let mut mesh = unit_cube();
        let field = vec![Vector3::new(0.0, 0.0, 2.0); mesh.vertex_count()];

        apply_to_mesh(&mut mesh, &field).unwrap();
        assert_relative_eq!(mesh.vertices[0].z, 2.0);
        assert_relative_eq!(mesh.bounds().min.z, 2.0);

        assert!(matches!(
            apply_to_mesh(&mut mesh, &[]),
            Err(FfdError::DisplacementCount { .. })
        ));
    }

    #[test]
    fn test_field_is_continuous_across_azimuth_seam() {
        let shape = Shape::cylinder(Point3::origin(), [1.0, TAU, 2.0]);
        let params = LatticeParams::new(3, 5, 2).with_mode(DisplacementMode::Global);
        let mut lattice = FfdLattice::new(shape, params);

        let seam = lattice.dof_of_node(1, 0, 0);
        let mut field = vec![Vector3::zeros(); lattice.dof_count()];
        field[seam] = Vector3::new(0.0, 0.0, 0.5);
        lattice.set_displacements(field).unwrap();

        let eps = 1.0e-6;
        let before = Point3::new(0.5 * (TAU - eps).cos(), 0.5 * (TAU - eps).sin(), -1.0);
        let after = Point3::new(0.5 * eps.cos(), 0.5 * eps.sin(), -1.0);
        let cloud = PointCloud::from_points(vec![before, after]);

        let output = lattice.deform_cloud(&cloud).unwrap();
        let jump = (output.displacements[0] - output.displacements[1]).norm();
        assert!(jump < 1.0e-5, "field jumps across the seam by {jump}");
        assert!(output.displacements[0].z > 0.0);
    }

    #[test]
    fn test_north_pole_follows_its_single_dof() {
        let shape = Shape::sphere(Point3::origin(), [1.0, TAU, PI]);
        let params = LatticeParams::new(3, 5, 3).with_mode(DisplacementMode::Global);
        let mut lattice = FfdLattice::new(shape, params);

        // One DOF drives the whole outer north cap ring.
        let cap = lattice.dof_of_node(2, 0, 0);
        assert_eq!(cap, lattice.dof_of_node(2, 3, 0));
        let moved = Vector3::new(0.3, 0.0, 0.4);
        let mut field = vec![Vector3::zeros(); lattice.dof_count()];
        field[cap] = moved;
        lattice.set_displacements(field).unwrap();

        let pole = lattice.deform_point(&Point3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(pole.x, moved.x, epsilon = 1.0e-12);
        assert_relative_eq!(pole.y, moved.y, epsilon = 1.0e-12);
        assert_relative_eq!(pole.z, moved.z, epsilon = 1.0e-12);

        // Near the pole the result cannot depend on azimuth.
        let polar = 0.05_f64;
        let probes: Vec<Vector3<f64>> = [0.0, 1.0, 2.5, 4.0]
            .into_iter()
            .map(|azimuth: f64| {
                let point = Point3::new(
                    0.9 * polar.sin() * azimuth.cos(),
                    0.9 * polar.sin() * azimuth.sin(),
                    0.9 * polar.cos(),
                );
                lattice.deform_point(&point)
            })
            .collect();
        for pair in probes.windows(2) {
            assert_relative_eq!((pair[0] - pair[1]).norm(), 0.0, epsilon = 1.0e-12);
        }
        assert!(probes[0].norm() > 0.1);
    }
}
