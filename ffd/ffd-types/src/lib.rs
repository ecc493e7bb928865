//! Core geometric types for the FFD lattice engine.
//!
//! This crate provides the foundational types for free-form deformation:
//!
//! - [`Shape`] - An oriented cube, cylinder or sphere with coordinate maps
//! - [`PointCloud`] - An unstructured set of points
//! - [`IndexedMesh`] - A triangle mesh with indexed vertices
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! # Coordinate Frames
//!
//! Deformation code juggles three frames, all owned by [`Shape`]:
//!
//! - **world**: the global Cartesian frame geometry lives in
//! - **local**: the shape's own frame, curvilinear for cylinders and
//!   spheres
//! - **basic**: the unit cube `[0,1]^3`, shared by every topology
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`.
//! Angular coordinates are radians.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**. Mesh face winding is
//! counter-clockwise when viewed from outside, so normals point
//! outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use ffd_types::{Point3, PointCloud, Shape};
//!
//! let cloud = PointCloud::from_points(vec![
//!     Point3::new(0.2, 0.1, 0.4),
//!     Point3::new(5.0, 5.0, 5.0),
//! ]);
//!
//! let shape = Shape::cube(Point3::new(0.0, 0.0, 0.0), [2.0, 2.0, 2.0]);
//! assert!(shape.contains(&cloud.points[0]));
//! assert!(!shape.contains(&cloud.points[1]));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod cloud;
mod mesh;
mod shape;

// Re-export core types
pub use bounds::Aabb;
pub use cloud::PointCloud;
pub use mesh::{unit_cube, IndexedMesh};
pub use shape::{Shape, ShapeKind};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
