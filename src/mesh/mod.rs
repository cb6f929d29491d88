//! Core mesh data structures.
//!
//! This module provides the half-edge mesh representation and the metadata
//! every operator reads and writes.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], which represents a polygon mesh with
//! faces of any size using a half-edge data structure. Elements live in flat
//! arenas and refer to each other through the type-safe indices
//! [`VertexId`], [`HalfEdgeId`] and [`FaceId`].
//!
//! Beside the topology, a mesh carries one [`Role`] per face and per vertex
//! and one [`TagSet`] per face.
//!
//! # Construction
//!
//! ```
//! use hedra::mesh::{HalfEdgeMesh, Role};
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2]]).unwrap();
//! assert_eq!(mesh.face_roles(), &[Role::Existing]);
//! ```

mod builder;
mod halfedge;
mod index;
mod meta;

pub use builder::{build_from_faces, split_polygon, MeshAssembler};
pub use halfedge::{Face, FaceHalfEdgeIter, HalfEdge, HalfEdgeMesh, Vertex, VertexRing};
pub use index::{FaceId, HalfEdgeId, VertexId};
pub use meta::{Role, Tag, TagKind, TagSet};
