//! Whole-mesh composition: copies, affine transforms and concatenation.
//!
//! # Example
//!
//! ```
//! use hedra::compose::{Axis, Transform};
//! use hedra::mesh::HalfEdgeMesh;
//! use nalgebra::{Point3, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let tri = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2]]).unwrap();
//!
//! let pair = tri.append(&tri, &Transform::mirror(Axis::X));
//! assert_eq!(pair.vef(), [6, 6, 2]);
//! assert_eq!(pair.face_normal(hedra::mesh::FaceId::new(1)), Vector3::z());
//! ```

use nalgebra::{Point3, UnitQuaternion, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mesh::{HalfEdgeMesh, MeshAssembler, Role};

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Axis {
    /// The X axis.
    X,
    /// The Y axis.
    Y,
    /// The Z axis.
    Z,
}

impl Axis {
    /// Unit vector along the axis.
    pub fn unit(self) -> Vector3<f64> {
        match self {
            Axis::X => Vector3::x(),
            Axis::Y => Vector3::y(),
            Axis::Z => Vector3::z(),
        }
    }
}

/// Scale, then rotate, then translate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset applied last.
    pub translation: Vector3<f64>,
    /// Rotation applied after scaling.
    pub rotation: UnitQuaternion<f64>,
    /// Per-axis scale factors.
    pub scale: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// The transform that leaves every point in place.
    pub fn identity() -> Self {
        Self {
            translation: Vector3::zeros(),
            rotation: UnitQuaternion::identity(),
            scale: Vector3::repeat(1.0),
        }
    }

    /// A pure translation.
    pub fn from_translation(translation: Vector3<f64>) -> Self {
        Self::identity().with_translation(translation)
    }

    /// Reflection through the plane perpendicular to `axis` at the origin.
    pub fn mirror(axis: Axis) -> Self {
        Self::identity().with_scale(Vector3::repeat(1.0) - 2.0 * axis.unit())
    }

    /// Set the translation.
    pub fn with_translation(mut self, translation: Vector3<f64>) -> Self {
        self.translation = translation;
        self
    }

    /// Set the rotation.
    pub fn with_rotation(mut self, rotation: UnitQuaternion<f64>) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set the per-axis scale.
    pub fn with_scale(mut self, scale: Vector3<f64>) -> Self {
        self.scale = scale;
        self
    }

    /// Set the same scale on every axis.
    pub fn with_uniform_scale(self, scale: f64) -> Self {
        self.with_scale(Vector3::repeat(scale))
    }

    /// Map a point.
    pub fn apply(&self, p: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * self.scale.component_mul(&p.coords) + self.translation)
    }

    /// Whether the transform has a negative determinant, turning every
    /// face inside out unless the windings are reversed.
    pub fn is_mirroring(&self) -> bool {
        self.scale.x * self.scale.y * self.scale.z < 0.0
    }
}

impl HalfEdgeMesh {
    // ==================== Composition ====================

    /// Rebuild this mesh from its face-vertex form, metadata included.
    pub fn duplicate(&self) -> HalfEdgeMesh {
        MeshAssembler::from_mesh(self).finish()
    }

    /// Copy of this mesh with every vertex mapped through `transform`.
    ///
    /// Topology, roles and tags are kept. A mirroring transform also reverses
    /// every face loop so normals keep pointing outward.
    pub fn transform(&self, transform: &Transform) -> HalfEdgeMesh {
        let positions: Vec<Point3<f64>> = self
            .vertices()
            .map(|(_, v)| transform.apply(&v.position))
            .collect();
        if !transform.is_mirroring() {
            return self.with_positions(&positions);
        }

        let mut asm = MeshAssembler::with_capacity(self.num_vertices(), self.num_faces());
        for (v, p) in self.vertex_ids().zip(positions) {
            asm.add_vertex(p, self.vertex_role(v));
        }
        for f in self.face_ids() {
            let mut verts = self.face_vertex_indices(f);
            verts.reverse();
            asm.try_add_face(&verts, self.face_role(f), self.tags(f).clone());
        }
        asm.finish()
    }

    /// A new mesh holding this mesh followed by `other` mapped through
    /// `transform`.
    ///
    /// The two parts share no vertices. Vertex and face metadata of both are
    /// concatenated in order, so every element of `other` sits at its old
    /// index plus the size of `self`.
    ///
    /// # Example
    ///
    /// ```
    /// use hedra::compose::Transform;
    /// # use hedra::mesh::HalfEdgeMesh;
    /// # use nalgebra::{Point3, Vector3};
    /// # let positions = vec![
    /// #     Point3::new(0.0, 0.0, 0.0),
    /// #     Point3::new(1.0, 0.0, 0.0),
    /// #     Point3::new(0.0, 1.0, 0.0),
    /// # ];
    /// # let tri = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2]]).unwrap();
    /// let moved = Transform::from_translation(Vector3::new(0.0, 0.0, 1.0));
    /// let stacked = tri.append(&tri, &moved);
    /// assert_eq!(stacked.num_faces(), 2);
    /// ```
    pub fn append(&self, other: &HalfEdgeMesh, transform: &Transform) -> HalfEdgeMesh {
        let moved = other.transform(transform);
        let mut asm = MeshAssembler::from_mesh(self);
        let offset = asm.num_vertices();
        for (v, vertex) in moved.vertices() {
            asm.add_vertex(vertex.position, moved.vertex_role(v));
        }
        for f in moved.face_ids() {
            let verts: Vec<usize> = moved.face_vertices(f).map(|v| v.index() + offset).collect();
            asm.try_add_face(&verts, moved.face_role(f), moved.tags(f).clone());
        }
        asm.finish()
    }

    /// Append the dual, scaled by `scale` about this mesh's centroid. The
    /// appended part is marked `New`.
    pub fn add_dual(&self, scale: f64) -> HalfEdgeMesh {
        let centre = self.centroid();
        let dual = crate::ops::dual(self);
        let positions: Vec<Point3<f64>> = dual
            .vertices()
            .map(|(_, v)| centre + (v.position - centre) * scale)
            .collect();
        let dual = dual.with_positions(&positions).with_roles(Role::New, Role::New);
        self.append(&dual, &Transform::identity())
    }

    /// Append a copy moved `offset` along `axis`. The copy is marked `New`.
    pub fn add_copy(&self, axis: Axis, offset: f64) -> HalfEdgeMesh {
        let copy = self.with_roles(Role::New, Role::New);
        self.append(&copy, &Transform::from_translation(axis.unit() * offset))
    }

    /// Append a copy mirrored across the plane through the origin
    /// perpendicular to `axis`, then moved `offset` along it. The copy is
    /// re-wound and marked `New`.
    pub fn add_mirror(&self, axis: Axis, offset: f64) -> HalfEdgeMesh {
        let copy = self.with_roles(Role::New, Role::New);
        let mirror = Transform::mirror(axis).with_translation(axis.unit() * offset);
        self.append(&copy, &mirror)
    }
}
