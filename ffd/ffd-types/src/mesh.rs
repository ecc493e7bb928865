//! Indexed triangle mesh.

use crate::Aabb;
use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index. Faces use counter-clockwise winding when viewed
/// from outside, so normals point outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use ffd_types::{IndexedMesh, Point3};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Point3::new(0.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(1.0, 0.0, 0.0));
/// mesh.vertices.push(Point3::new(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,

    /// Triangle faces as indices into the vertex array.
    /// Each face is `[v0, v1, v2]` with counter-clockwise winding.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertex positions and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from flat coordinate and index arrays.
    ///
    /// `positions` holds `[x0, y0, z0, x1, y1, z1, ...]` and `indices`
    /// holds `[v0a, v1a, v2a, v0b, ...]`. Returns an empty mesh if either
    /// slice length is not divisible by 3.
    ///
    /// # Example
    ///
    /// ```
    /// use ffd_types::IndexedMesh;
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let indices = [0, 1, 2];
    ///
    /// let mesh = IndexedMesh::from_raw(&positions, &indices);
    /// assert_eq!(mesh.vertex_count(), 3);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Point3::new(c[0], c[1], c[2]))
            .collect();

        let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

        Self { vertices, faces }
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no faces.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Translate the mesh by the given vector.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            *vertex += offset;
        }
    }

    /// Compute the axis-aligned bounding box of the vertices.
    ///
    /// Returns an empty AABB for a mesh with no vertices.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter())
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sums the signed volumes of the tetrahedra formed by each face and
    /// the origin. A closed mesh with outward normals yields a positive
    /// value; a near-zero result means the mesh is open or has
    /// inconsistent winding, and the number is not meaningful as a
    /// volume.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.vertices[i0 as usize];
            let v1 = &self.vertices[i1 as usize];
            let v2 = &self.vertices[i2 as usize];

            // v0 · (v1 × v2) / 6 per tetrahedron, mul_add for accuracy
            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Compute the absolute volume of the mesh.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }
}

/// Create a unit cube mesh from (0,0,0) to (1,1,1).
///
/// The cube is closed with outward-facing normals, which makes it a
/// convenient fixture for volume checks.
///
/// # Example
///
/// ```
/// use ffd_types::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// assert!((cube.signed_volume() - 1.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let positions = [
        0.0, 0.0, 0.0, // 0
        1.0, 0.0, 0.0, // 1
        1.0, 1.0, 0.0, // 2
        0.0, 1.0, 0.0, // 3
        0.0, 0.0, 1.0, // 4
        1.0, 0.0, 1.0, // 5
        1.0, 1.0, 1.0, // 6
        0.0, 1.0, 1.0, // 7
    ];

    // Two CCW triangles per face, outward normals
    let indices = [
        0, 2, 1, 0, 3, 2, // bottom, -Z
        4, 5, 6, 4, 6, 7, // top, +Z
        0, 1, 5, 0, 5, 4, // front, -Y
        3, 7, 6, 3, 6, 2, // back, +Y
        0, 4, 7, 0, 7, 3, // left, -X
        1, 2, 6, 1, 6, 5, // right, +X
    ];

    IndexedMesh::from_raw(&positions, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_is_empty() {
        let mesh = IndexedMesh::new();
        assert!(mesh.is_empty());

        let mut mesh2 = IndexedMesh::new();
        mesh2.vertices.push(Point3::new(0.0, 0.0, 0.0));
        assert!(mesh2.is_empty()); // no faces

        mesh2.faces.push([0, 0, 0]);
        assert!(!mesh2.is_empty());
    }

    #[test]
    fn mesh_from_raw_rejects_ragged_input() {
        let mesh = IndexedMesh::from_raw(&[0.0, 0.0], &[0, 1, 2]);
        assert_eq!(mesh.vertex_count(), 0);
        assert_eq!(mesh.face_count(), 0);
    }

    #[test]
    fn mesh_bounds() {
        let mesh = IndexedMesh::from_parts(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 5.0, 3.0),
                Point3::new(-2.0, 8.0, 1.0),
            ],
            vec![[0, 1, 2]],
        );

        let bounds = mesh.bounds();
        assert!((bounds.min.x - (-2.0)).abs() < f64::EPSILON);
        assert!((bounds.max.y - 8.0).abs() < f64::EPSILON);
        assert!((bounds.max.z - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn unit_cube_volume() {
        let cube = unit_cube();
        let vol = cube.signed_volume();
        assert!(
            (vol - 1.0).abs() < 1e-10,
            "unit cube volume should be 1.0, got {vol}"
        );
    }

    #[test]
    fn mesh_translate_preserves_volume() {
        let mut cube = unit_cube();
        cube.translate(Vector3::new(5.0, -2.0, 1.0));

        assert!((cube.bounds().min.x - 5.0).abs() < f64::EPSILON);
        assert!((cube.volume() - 1.0).abs() < 1e-10);
    }
}
