//! # Hedra
//!
//! Conway-style polyhedron operators on a half-edge mesh.
//!
//! Hedra provides a polygon half-edge mesh that carries provenance metadata
//! (a [`Role`](mesh::Role) per face and vertex, a [`TagSet`](mesh::TagSet)
//! per face) and a closed algebra of operators that rewrite it: the Conway
//! family (kis, dual, ambo, truncate, gyro, snub, ...), lofting, per-element
//! edits, repair, slicing and composition.
//!
//! ## Features
//!
//! - **Half-edge data structure**: arbitrary polygons, type-safe indices,
//!   open meshes with naked half-edges
//! - **Provenance metadata**: roles and tags survive every rewrite, so a later
//!   operator can target what the previous one created
//! - **Selection engine**: built-in face and vertex filters, tag queries and
//!   custom predicates
//! - **Repair**: octree-backed welding and hole filling
//!
//! ## Quick Start
//!
//! ```
//! use hedra::prelude::*;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(-0.5, -0.5, -0.5),
//!     Point3::new(0.5, -0.5, -0.5),
//!     Point3::new(0.5, 0.5, -0.5),
//!     Point3::new(-0.5, 0.5, -0.5),
//!     Point3::new(-0.5, -0.5, 0.5),
//!     Point3::new(0.5, -0.5, 0.5),
//!     Point3::new(0.5, 0.5, 0.5),
//!     Point3::new(-0.5, 0.5, 0.5),
//! ];
//! let faces = vec![
//!     vec![0, 3, 2, 1],
//!     vec![4, 5, 6, 7],
//!     vec![0, 1, 5, 4],
//!     vec![2, 3, 7, 6],
//!     vec![0, 4, 7, 3],
//!     vec![1, 2, 6, 5],
//! ];
//! let cube = HalfEdgeMesh::from_faces(&positions, &faces).unwrap();
//!
//! // Raise a pyramid on every face
//! let kis = Operator::Kis.apply(&cube, &OpParams::new().with_a(0.1)).unwrap();
//! assert_eq!(kis.vef(), [14, 36, 24]);
//!
//! // Then loft only the faces the kis just created
//! let params = OpParams::new()
//!     .with_a(0.3)
//!     .with_b(0.1)
//!     .with_filter(Filter::new(Selection::New));
//! let lofted = Operator::Loft.apply(&kis, &params).unwrap();
//! assert!(lofted.is_valid());
//! ```
//!
//! ## Reading Results
//!
//! Every operator returns a fresh mesh. Its contents can be read back as
//! plain lists:
//!
//! ```
//! use hedra::prelude::*;
//! # use nalgebra::Point3;
//! # let positions = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! # ];
//! # let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2]]).unwrap();
//! let points = mesh.list_vertices_by_points();
//! let faces = mesh.list_faces_by_vertex_indices();
//! let roles = mesh.face_roles();
//! assert_eq!((points.len(), faces.len(), roles.len()), (3, 1, 1));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compose;
pub mod error;
pub mod mesh;
pub mod ops;
pub mod repair;
pub mod select;
pub mod slice;

#[cfg(test)]
mod test_util;

/// Smallest tolerance [`repair::weld`] will use.
pub const MIN_WELD_DISTANCE: f64 = 1e-5;

/// Upper bound on the number of lofts [`ops::Operator::Stack`] performs.
pub const MAX_STACK_ITERATIONS: usize = 16;

/// Slack on the dot product used by the directional selections.
pub const DIRECTION_TOLERANCE: f64 = 0.01;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use hedra::prelude::*;
/// ```
pub mod prelude {
    pub use crate::compose::{Axis, Transform};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        FaceId, HalfEdgeId, HalfEdgeMesh, MeshAssembler, Role, Tag, TagKind, TagSet, VertexId,
    };
    pub use crate::ops::{OpConfig, OpParams, Operator};
    pub use crate::repair::{fill_holes, weld};
    pub use crate::select::{Filter, Selection};
    pub use crate::slice::{slice, Plane, SliceKeep, SliceOptions};
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use crate::test_util::cube;

    #[test]
    fn test_cube_kis_scenario() {
        let out = Operator::Kis
            .apply(&cube(), &OpParams::new().with_a(0.1))
            .unwrap();
        assert_eq!(out.num_faces(), 24);
        assert_eq!(out.num_vertices(), 14);
        assert!(out.face_ids().all(|f| out.face_sides(f) == 3));

        let new = out.vertex_roles().iter().filter(|r| **r == Role::New).count();
        let existing = out.vertex_roles().iter().filter(|r| **r == Role::Existing).count();
        assert_eq!((new, existing), (6, 8));
        assert!(out.naked_halfedges().is_empty());
    }
}
