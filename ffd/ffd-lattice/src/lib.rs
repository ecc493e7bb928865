//! Shape-conforming free-form deformation.
//!
//! This crate deforms geometry by embedding it in a trivariate NURBS
//! lattice built over a primitive volume from [`ffd_types`]:
//!
//! - [`FfdLattice`] - The lattice: shape, control grid, and displacement
//!   field
//! - [`LatticeParams`] - Node counts, degrees, knot regimes, and the
//!   displacement mode
//! - [`DeformOutput`] - Per-vertex displacements plus deformation metrics
//!
//! Control nodes on a structured grid carry displacement vectors. Moving
//! a node bends the smooth field around it; geometry inside the volume
//! follows, while everything outside stays exactly where it was.
//!
//! # Topologies
//!
//! The lattice conforms to its shape instead of always being a box:
//!
//! - **cube**: a plain Cartesian grid
//! - **cylinder**: nodes on rings; the axis degenerates to one node per
//!   height and a full angular turn closes seamlessly
//! - **sphere**: nodes on shells; poles and center degenerate the same
//!   way
//!
//! Degenerate and seam nodes are merged into shared degrees of freedom,
//! so a displacement on the axis of a cylinder cannot tear the lattice
//! apart.
//!
//! # Example
//!
//! ```
//! use ffd_lattice::{DisplacementMode, FfdLattice, LatticeParams};
//! use ffd_types::{Point3, PointCloud, Shape, Vector3};
//!
//! let shape = Shape::cube(Point3::origin(), [2.0, 2.0, 2.0]);
//! let params = LatticeParams::new(3, 3, 3).with_mode(DisplacementMode::Global);
//! let mut lattice = FfdLattice::new(shape, params);
//!
//! // Pull the central control point upward.
//! let mut field = vec![Vector3::zeros(); lattice.dof_count()];
//! field[13] = Vector3::new(0.0, 0.0, 0.4);
//! lattice.set_displacements(field).unwrap();
//!
//! let cloud = PointCloud::from_points(vec![
//!     Point3::origin(),
//!     Point3::new(0.4, 0.0, 0.2),
//!     Point3::new(9.0, 0.0, 0.0), // outside the lattice, stays put
//! ]);
//! let output = lattice.deform_cloud(&cloud).unwrap();
//! assert!(output.displacements[0].z > 0.0);
//! assert_eq!(output.displacements[2], Vector3::zeros());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod deform;
mod dof;
mod error;
mod grid;
mod knots;
mod lattice;
mod params;
mod result;

// Re-export the lattice surface
pub use deform::{apply_to_cloud, apply_to_mesh};
pub use dof::DofMap;
pub use error::{FfdError, FfdResult};
pub use grid::StructuredGrid;
pub use knots::{AxisKnots, KnotRegime};
pub use lattice::FfdLattice;
pub use params::{DisplacementMode, LatticeParams};
pub use result::DeformOutput;
