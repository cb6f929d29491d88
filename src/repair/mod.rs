//! Mesh repair: tolerance welding and hole filling.
//!
//! Both entry points take a mesh by reference and return a repaired copy.
//!
//! ```
//! use hedra::repair::{fill_holes, weld};
//! # use hedra::mesh::HalfEdgeMesh;
//! # use nalgebra::Point3;
//! # let positions = vec![
//! #     Point3::new(0.0, 0.0, 0.0),
//! #     Point3::new(1.0, 0.0, 0.0),
//! #     Point3::new(0.0, 1.0, 0.0),
//! # ];
//! # let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2]]).unwrap();
//! let closed = fill_holes(&weld(&mesh, 1e-4));
//! assert!(closed.naked_halfedges().is_empty());
//! ```

mod holes;
mod octree;
mod weld;

pub use holes::{detect_boundary_loops, fill_holes, BoundaryLoop};
pub use octree::{OctreeConfig, VertexOctree};
pub use weld::weld;
