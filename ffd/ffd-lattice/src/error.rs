//! Error types for lattice deformation operations.

use thiserror::Error;

/// Errors that can occur while configuring or applying a lattice.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FfdError {
    /// The input geometry has no points.
    #[error("input geometry has no points")]
    EmptyGeometry,

    /// The displacement list length does not match its target. The target
    /// is the DOF count when assigning the control field and the vertex
    /// count when applying a field to geometry.
    #[error("expected {expected} displacements, got {actual}")]
    DisplacementCount {
        /// Required number of displacements.
        expected: usize,
        /// Number of displacements provided.
        actual: usize,
    },

    /// The weight list does not match the lattice degrees of freedom.
    #[error("expected {expected} weights, got {actual}")]
    WeightCount {
        /// Degrees of freedom of the lattice.
        expected: usize,
        /// Number of weights provided.
        actual: usize,
    },

    /// A control point weight is zero, negative, or not finite.
    #[error("weight {value} at index {index} is not strictly positive and finite")]
    InvalidWeight {
        /// Index of the offending weight.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// A vertex mask references a point outside the input geometry.
    #[error("mask references invalid point index {index} (geometry has {point_count} points)")]
    InvalidMaskIndex {
        /// The invalid index.
        index: usize,
        /// The number of points in the geometry.
        point_count: usize,
    },
}

/// Result type for lattice deformation operations.
pub type FfdResult<T> = Result<T, FfdError>;
