//! Error types for hedra.
//!
//! Most rewrite failures in this crate are not errors at all: a face that
//! cannot be inserted is reported as `false` by
//! [`MeshAssembler::try_add_face`](crate::mesh::MeshAssembler::try_add_face),
//! and an empty selection simply leaves the mesh unchanged. The variants here
//! cover malformed input and caller-side precondition bugs.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur while building or rewriting a mesh.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A face references a vertex index that does not exist.
    #[error("face {face} references invalid vertex index {vertex}")]
    InvalidVertexIndex {
        /// The face index.
        face: usize,
        /// The invalid vertex index.
        vertex: usize,
    },

    /// A metadata list does not line up with the elements it describes.
    #[error("{what} has {actual} entries, expected {expected}")]
    MetadataMismatch {
        /// Which list is misaligned.
        what: &'static str,
        /// Number of elements the list must match.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },

    /// A face split was requested between two vertices that already share an edge.
    #[error("cannot split face {face}: vertices {a} and {b} are adjacent")]
    AdjacentSplit {
        /// The face index.
        face: usize,
        /// First split vertex.
        a: usize,
        /// Second split vertex.
        b: usize,
    },

    /// A vertex was expected on a face boundary but is not part of it.
    #[error("vertex {vertex} is not on face {face}")]
    VertexNotOnFace {
        /// The face index.
        face: usize,
        /// The vertex index.
        vertex: usize,
    },

    /// A face index is out of range.
    #[error("face index {face} out of range for mesh with {len} faces")]
    FaceOutOfRange {
        /// The requested face.
        face: usize,
        /// Number of faces in the mesh.
        len: usize,
    },

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
