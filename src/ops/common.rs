//! Shared plumbing for topology rewrites.
//!
//! A rewrite walks the input mesh, creates derived points on demand (face
//! centroids, edge midpoints, points along a half-edge...) and emits polygons
//! over them. [`Rewrite`] memoizes every derived point under a [`Key`], so
//! the two faces that share an edge get the very same vertex index for a point
//! on that edge. That is what lets [`MeshAssembler::finish`] pair them up.

use std::collections::HashMap;

use nalgebra::Point3;
use rand::rngs::StdRng;

use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshAssembler, Role, TagSet, VertexId};
use crate::select::{FaceFilter, VertexFilter};

use super::params::OpParams;

/// Identity of a derived point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Key {
    /// Something at a face, usually its (raised) centroid.
    Face(usize),
    /// Something on an undirected edge, keyed by its sorted endpoints.
    Edge(usize, usize),
    /// A point on an edge nearer to one of its endpoints: `(edge, near)`.
    EdgeNear((usize, usize), usize),
    /// Something owned by a single half-edge.
    Half(usize),
    /// A second point owned by a single half-edge.
    HalfAlt(usize),
}

/// Output under construction for one rewrite.
pub(crate) struct Rewrite<'a> {
    pub mesh: &'a HalfEdgeMesh,
    pub asm: MeshAssembler,
    points: HashMap<Key, usize>,
}

impl<'a> Rewrite<'a> {
    /// Start a rewrite that may reuse the input vertices by index.
    ///
    /// Input vertices no emitted face references are culled by [`finish`](Self::finish).
    pub fn new(mesh: &'a HalfEdgeMesh) -> Self {
        Self {
            mesh,
            asm: MeshAssembler::from_mesh_vertices(mesh, Role::Existing),
            points: HashMap::new(),
        }
    }

    /// Start a rewrite that builds every vertex itself.
    pub fn empty(mesh: &'a HalfEdgeMesh) -> Self {
        Self {
            mesh,
            asm: MeshAssembler::new(),
            points: HashMap::new(),
        }
    }

    /// Index of the derived point `key`, creating it with `make` on first use.
    pub fn point(&mut self, key: Key, role: Role, make: impl FnOnce() -> Point3<f64>) -> usize {
        if let Some(&index) = self.points.get(&key) {
            return index;
        }
        let index = self.asm.add_vertex(make(), role);
        self.points.insert(key, index);
        index
    }

    /// Emit a polygon.
    pub fn face(&mut self, verts: &[usize], role: Role, tags: TagSet) -> bool {
        self.asm.try_add_face(verts, role, tags)
    }

    /// Re-emit an input face unchanged.
    pub fn copy_face(&mut self, f: FaceId, role: Role) -> bool {
        let verts = self.mesh.face_vertex_indices(f);
        let tags = self.mesh.tags(f).clone();
        self.asm.try_add_face(&verts, role, tags)
    }

    /// Link the output and drop input vertices nothing references.
    pub fn finish(self) -> HalfEdgeMesh {
        self.asm.finish_culled()
    }

    // ==================== Common derived points ====================

    /// The midpoint of the edge under `he`, shared by both sides.
    pub fn midpoint(&mut self, he: HalfEdgeId, role: Role) -> usize {
        let mesh = self.mesh;
        let (a, b) = mesh.edge_key(he);
        self.point(Key::Edge(a, b), role, || mesh.edge_midpoint(he))
    }

    /// The point at fraction `t` from `near` toward the other end of the edge
    /// under `he`, shared by both sides.
    pub fn edge_point(&mut self, he: HalfEdgeId, near: VertexId, t: f64, role: Role) -> usize {
        let mesh = self.mesh;
        let key = mesh.edge_key(he);
        let far = if mesh.head(he) == near {
            mesh.tail(he)
        } else {
            mesh.head(he)
        };
        self.point(Key::EdgeNear(key, near.index()), role, || {
            lerp(mesh.position(near), mesh.position(far), t)
        })
    }

    /// Face centroid moved `height` along the face normal.
    pub fn raised_centroid(&mut self, f: FaceId, height: f64, role: Role) -> usize {
        let mesh = self.mesh;
        self.point(Key::Face(f.index()), role, || {
            mesh.face_centroid(f) + mesh.face_normal(f) * height
        })
    }

    /// Input face `f` with the midpoint spliced into every edge `split` accepts.
    ///
    /// Used to keep unselected neighbours stitched to faces whose edges were
    /// subdivided.
    pub fn face_with_midpoints(
        &mut self,
        f: FaceId,
        role: Role,
        split: impl Fn(HalfEdgeId) -> bool,
    ) -> Vec<usize> {
        let mesh = self.mesh;
        let mut verts = Vec::with_capacity(mesh.face_sides(f) * 2);
        for he in mesh.face_halfedges(f) {
            if split(he) {
                verts.push(self.midpoint(he, role));
            }
            verts.push(mesh.head(he).index());
        }
        verts
    }
}

/// Position of a point at parameter `t` between two points.
#[inline]
pub(crate) fn lerp(a: &Point3<f64>, b: &Point3<f64>, t: f64) -> Point3<f64> {
    Point3::from(a.coords.lerp(&b.coords, t))
}

/// Union of the extrovert tags of the faces around a vertex.
pub(crate) fn vertex_tags(mesh: &HalfEdgeMesh, v: VertexId) -> TagSet {
    let mut tags = TagSet::new();
    for f in mesh.vertex_faces(v) {
        tags.extend_extrovert(mesh.tags(f));
    }
    tags
}

/// Union of the extrovert tags of the faces on both sides of an edge.
pub(crate) fn edge_tags(mesh: &HalfEdgeMesh, he: HalfEdgeId) -> TagSet {
    let mut tags = mesh.tags(mesh.face_of(he)).extrovert();
    if let Some(pair) = mesh.pair(he) {
        tags.extend_extrovert(mesh.tags(mesh.face_of(pair)));
    }
    tags
}

/// Which faces the operator's filter selects, in index order.
pub(crate) fn face_mask(mesh: &HalfEdgeMesh, params: &OpParams, rng: &mut StdRng) -> Vec<bool> {
    FaceFilter::new(mesh, &params.filter).mask(rng)
}

/// Which vertices the operator's filter selects, in index order.
pub(crate) fn vertex_mask(mesh: &HalfEdgeMesh, params: &OpParams, rng: &mut StdRng) -> Vec<bool> {
    VertexFilter::new(mesh, &params.filter).mask(rng)
}

/// Primary amount per face.
pub(crate) fn face_amounts_a(mesh: &HalfEdgeMesh, params: &OpParams, rng: &mut StdRng) -> Vec<f64> {
    (0..mesh.num_faces())
        .map(|i| params.a_at(mesh, i, rng))
        .collect()
}

/// Secondary amount per face.
pub(crate) fn face_amounts_b(mesh: &HalfEdgeMesh, params: &OpParams, rng: &mut StdRng) -> Vec<f64> {
    (0..mesh.num_faces())
        .map(|i| params.b_at(mesh, i, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Tag;
    use crate::test_util::cube;
    use rand::SeedableRng;

    #[test]
    fn test_shared_midpoint() {
        let mesh = cube();
        let mut rw = Rewrite::new(&mesh);
        let he = HalfEdgeId::new(0);
        let pair = mesh.pair(he).unwrap();
        let a = rw.midpoint(he, Role::NewAlt);
        let b = rw.midpoint(pair, Role::NewAlt);
        assert_eq!(a, b);
        assert_eq!(a, mesh.num_vertices());
    }

    #[test]
    fn test_edge_point_sides() {
        let mesh = cube();
        let mut rw = Rewrite::new(&mesh);
        let he = HalfEdgeId::new(0);
        let pair = mesh.pair(he).unwrap();
        let near_tail = rw.edge_point(he, mesh.tail(he), 0.25, Role::New);
        let same = rw.edge_point(pair, mesh.head(pair), 0.25, Role::New);
        let near_head = rw.edge_point(he, mesh.head(he), 0.25, Role::New);
        assert_eq!(near_tail, same);
        assert_ne!(near_tail, near_head);
    }

    #[test]
    fn test_tag_unions() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut tags = TagSet::new();
        tags.insert(Tag::extrovert("out"));
        tags.insert(Tag::introvert("in"));
        let mesh = cube().tag_faces(&tags, &crate::select::Selection::OnlyFirst.into(), &mut rng);

        let v = VertexId::new(0);
        let union = vertex_tags(&mesh, v);
        assert!(union.contains_name("out"));
        assert!(!union.contains_name("in"));
    }
}
