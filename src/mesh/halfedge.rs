//! Half-edge mesh data structure.
//!
//! This module provides a half-edge (doubly-connected edge list)
//! representation for polygon meshes with arbitrary face sizes.
//!
//! # Structure
//!
//! - Each face is bounded by a closed loop of **half-edges** linked by `next`
//!   and `prev`
//! - Each half-edge knows its **head** vertex (the vertex it points to), the
//!   face it bounds, and an optional **pair**: the half-edge running the other
//!   way along the same undirected edge
//! - Each vertex stores one incoming half-edge
//! - Each face stores one half-edge on its boundary
//!
//! # Boundary Handling
//!
//! There are no boundary half-edges. A half-edge whose `pair` is `None` is
//! *naked*: the edge lies on an open boundary of the mesh.
//!
//! # Metadata
//!
//! Alongside the three element arenas the mesh carries one [`Role`] per face,
//! one per vertex and one [`TagSet`] per face. The lists are index-aligned with
//! the arenas after every operation.

use nalgebra::{Point3, Vector3};

use super::index::{FaceId, HalfEdgeId, VertexId};
use super::meta::{Role, TagSet};

/// A vertex in the half-edge mesh.
#[derive(Debug, Clone)]
pub struct Vertex {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One half-edge whose head is this vertex.
    /// `None` for a vertex no face references.
    pub halfedge: Option<HalfEdgeId>,
}

impl Vertex {
    /// Create a new vertex at the given position.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: None,
        }
    }

    /// Create a new vertex from coordinates.
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A half-edge in the mesh.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge {
    /// The vertex this half-edge points to.
    pub vertex: VertexId,

    /// The face this half-edge bounds.
    pub face: FaceId,

    /// The next half-edge around the face (counter-clockwise).
    pub next: HalfEdgeId,

    /// The previous half-edge around the face.
    pub prev: HalfEdgeId,

    /// The opposite half-edge of the same undirected edge.
    /// `None` for a naked boundary edge.
    pub pair: Option<HalfEdgeId>,
}

impl HalfEdge {
    /// Check if this half-edge lies on an open boundary.
    #[inline]
    pub fn is_naked(&self) -> bool {
        self.pair.is_none()
    }
}

/// A face in the half-edge mesh.
#[derive(Debug, Clone, Copy)]
pub struct Face {
    /// One half-edge on the boundary of this face.
    pub halfedge: HalfEdgeId,
}

impl Face {
    /// Create a new face with the given half-edge.
    pub fn new(halfedge: HalfEdgeId) -> Self {
        Self { halfedge }
    }
}

/// Outgoing half-edges around a vertex in counter-clockwise order.
///
/// For a vertex on an open boundary the ring starts at the clockwise-most
/// outgoing half-edge and stops where the boundary cuts the fan; `closed` is
/// then false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRing {
    /// Outgoing half-edges, counter-clockwise as seen from outside.
    pub outgoing: Vec<HalfEdgeId>,
    /// Whether the fan wraps all the way around the vertex.
    pub closed: bool,
}

/// A half-edge mesh with per-element role and tag metadata.
///
/// Meshes have value semantics: every operator in this crate reads a mesh and
/// returns a new one.
#[derive(Debug, Clone, Default)]
pub struct HalfEdgeMesh {
    /// All vertices in the mesh.
    pub(crate) vertices: Vec<Vertex>,

    /// All half-edges in the mesh.
    pub(crate) halfedges: Vec<HalfEdge>,

    /// All faces in the mesh.
    pub(crate) faces: Vec<Face>,

    /// One role per face.
    pub(crate) face_roles: Vec<Role>,

    /// One role per vertex.
    pub(crate) vertex_roles: Vec<Role>,

    /// One tag set per face.
    pub(crate) face_tags: Vec<TagSet>,
}

impl HalfEdgeMesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Accessors ====================

    /// Get the number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of half-edges.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Get the number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Get the number of undirected edges.
    ///
    /// A paired edge counts once; a naked half-edge counts as an edge of its own.
    pub fn num_edges(&self) -> usize {
        self.halfedges()
            .filter(|(id, he)| he.pair.map_or(true, |p| p > *id))
            .count()
    }

    /// Vertex, edge and face counts.
    pub fn vef(&self) -> [usize; 3] {
        [self.num_vertices(), self.num_edges(), self.num_faces()]
    }

    /// Whether the mesh has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId) -> &HalfEdge {
        &self.halfedges[id.index()]
    }

    /// Get a face by ID.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.index()]
    }

    /// Get the position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId) -> &Point3<f64> {
        &self.vertex(v).position
    }

    /// Role of a face.
    #[inline]
    pub fn face_role(&self, f: FaceId) -> Role {
        self.face_roles[f.index()]
    }

    /// Role of a vertex.
    #[inline]
    pub fn vertex_role(&self, v: VertexId) -> Role {
        self.vertex_roles[v.index()]
    }

    /// Tags of a face.
    #[inline]
    pub fn tags(&self, f: FaceId) -> &TagSet {
        &self.face_tags[f.index()]
    }

    /// All face roles, index-aligned with the faces.
    #[inline]
    pub fn face_roles(&self) -> &[Role] {
        &self.face_roles
    }

    /// All vertex roles, index-aligned with the vertices.
    #[inline]
    pub fn vertex_roles(&self) -> &[Role] {
        &self.vertex_roles
    }

    /// All face tag sets, index-aligned with the faces.
    #[inline]
    pub fn face_tags(&self) -> &[TagSet] {
        &self.face_tags
    }

    // ==================== Topology Queries ====================

    /// Get the pair (opposite) half-edge, if the edge is not naked.
    #[inline]
    pub fn pair(&self, he: HalfEdgeId) -> Option<HalfEdgeId> {
        self.halfedge(he).pair
    }

    /// Get the next half-edge around the face.
    #[inline]
    pub fn next(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).next
    }

    /// Get the previous half-edge around the face.
    #[inline]
    pub fn prev(&self, he: HalfEdgeId) -> HalfEdgeId {
        self.halfedge(he).prev
    }

    /// Get the vertex a half-edge points to.
    #[inline]
    pub fn head(&self, he: HalfEdgeId) -> VertexId {
        self.halfedge(he).vertex
    }

    /// Get the vertex a half-edge starts from.
    #[inline]
    pub fn tail(&self, he: HalfEdgeId) -> VertexId {
        self.head(self.prev(he))
    }

    /// Get the face of a half-edge.
    #[inline]
    pub fn face_of(&self, he: HalfEdgeId) -> FaceId {
        self.halfedge(he).face
    }

    /// Check if a half-edge is naked (on an open boundary).
    #[inline]
    pub fn is_boundary_halfedge(&self, he: HalfEdgeId) -> bool {
        self.halfedge(he).is_naked()
    }

    /// Check if a vertex is on an open boundary (or references no face).
    pub fn is_boundary_vertex(&self, v: VertexId) -> bool {
        !self.vertex_ring(v).closed
    }

    /// Check if any edge of a face is naked.
    pub fn is_boundary_face(&self, f: FaceId) -> bool {
        self.face_halfedges(f)
            .any(|he| self.is_boundary_halfedge(he))
    }

    /// Undirected key of the edge under a half-edge: its endpoints, smaller first.
    #[inline]
    pub fn edge_key(&self, he: HalfEdgeId) -> (usize, usize) {
        let a = self.tail(he).index();
        let b = self.head(he).index();
        if a < b {
            (a, b)
        } else {
            (b, a)
        }
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all vertices with their IDs.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| (VertexId::new(i), v))
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all half-edges with their IDs.
    pub fn halfedges(&self) -> impl Iterator<Item = (HalfEdgeId, &HalfEdge)> + '_ {
        self.halfedges
            .iter()
            .enumerate()
            .map(|(i, he)| (HalfEdgeId::new(i), he))
    }

    /// Iterate over all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    /// Iterate over half-edges around a face, starting at the face's half-edge.
    pub fn face_halfedges(&self, f: FaceId) -> FaceHalfEdgeIter<'_> {
        FaceHalfEdgeIter::new(self, f)
    }

    /// Iterate over the vertices of a face in winding order.
    pub fn face_vertices(&self, f: FaceId) -> impl Iterator<Item = VertexId> + '_ {
        self.face_halfedges(f).map(|he| self.head(he))
    }

    /// Raw vertex indices of a face in winding order.
    pub fn face_vertex_indices(&self, f: FaceId) -> Vec<usize> {
        self.face_vertices(f).map(VertexId::index).collect()
    }

    /// Positions of a face's vertices in winding order.
    pub fn face_positions(&self, f: FaceId) -> Vec<Point3<f64>> {
        self.face_vertices(f).map(|v| *self.position(v)).collect()
    }

    /// Number of sides of a face.
    pub fn face_sides(&self, f: FaceId) -> usize {
        self.face_halfedges(f).count()
    }

    /// Outgoing half-edges around a vertex, counter-clockwise.
    pub fn vertex_ring(&self, v: VertexId) -> VertexRing {
        let Some(incoming) = self.vertex(v).halfedge else {
            return VertexRing {
                outgoing: Vec::new(),
                closed: false,
            };
        };
        let limit = self.halfedges.len();

        // Rewind clockwise until a naked outgoing half-edge stops us, or we
        // come back round to where we started.
        let first = self.next(incoming);
        let mut start = first;
        let mut steps = 0;
        while let Some(p) = self.pair(start) {
            let cw = self.next(p);
            steps += 1;
            if cw == first || steps > limit {
                start = first;
                break;
            }
            start = cw;
        }

        let mut outgoing = vec![start];
        let mut current = start;
        loop {
            match self.pair(self.prev(current)) {
                Some(p) if p == start => {
                    return VertexRing {
                        outgoing,
                        closed: true,
                    }
                }
                Some(p) if outgoing.len() <= limit => {
                    outgoing.push(p);
                    current = p;
                }
                _ => {
                    return VertexRing {
                        outgoing,
                        closed: false,
                    }
                }
            }
        }
    }

    /// Half-edges pointing into a vertex, in ring order.
    pub fn incident_halfedges(&self, v: VertexId) -> Vec<HalfEdgeId> {
        self.vertex_ring(v)
            .outgoing
            .into_iter()
            .map(|o| self.prev(o))
            .collect()
    }

    /// Vertices adjacent to a vertex, counter-clockwise.
    pub fn vertex_neighbors(&self, v: VertexId) -> Vec<VertexId> {
        let ring = self.vertex_ring(v);
        let mut neighbors: Vec<VertexId> =
            ring.outgoing.iter().map(|&o| self.head(o)).collect();
        if !ring.closed {
            if let Some(&last) = ring.outgoing.last() {
                neighbors.push(self.tail(self.prev(last)));
            }
        }
        neighbors
    }

    /// Faces around a vertex, counter-clockwise.
    pub fn vertex_faces(&self, v: VertexId) -> Vec<FaceId> {
        self.vertex_ring(v)
            .outgoing
            .iter()
            .map(|&o| self.face_of(o))
            .collect()
    }

    /// Number of edges meeting at a vertex.
    pub fn valence(&self, v: VertexId) -> usize {
        self.vertex_neighbors(v).len()
    }

    /// All naked half-edges.
    pub fn naked_halfedges(&self) -> Vec<HalfEdgeId> {
        self.halfedges()
            .filter(|(_, he)| he.is_naked())
            .map(|(id, _)| id)
            .collect()
    }

    // ==================== Geometry ====================

    /// Newell's area vector of a face: normal direction, length twice the area.
    fn newell(&self, f: FaceId) -> Vector3<f64> {
        let points = self.face_positions(f);
        let n = points.len();
        let mut normal = Vector3::zeros();
        for i in 0..n {
            let a = &points[i];
            let b = &points[(i + 1) % n];
            normal.x += (a.y - b.y) * (a.z + b.z);
            normal.y += (a.z - b.z) * (a.x + b.x);
            normal.z += (a.x - b.x) * (a.y + b.y);
        }
        normal
    }

    /// Compute the unit normal of a face. Zero for a degenerate face.
    pub fn face_normal(&self, f: FaceId) -> Vector3<f64> {
        self.newell(f)
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the area of a (planar) face.
    pub fn face_area(&self, f: FaceId) -> f64 {
        0.5 * self.newell(f).norm()
    }

    /// Compute the centroid (vertex average) of a face.
    pub fn face_centroid(&self, f: FaceId) -> Point3<f64> {
        let points = self.face_positions(f);
        if points.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = points.iter().map(|p| p.coords).sum();
        Point3::from(sum / points.len() as f64)
    }

    /// Compute the normal at a vertex as the average of its face normals.
    pub fn vertex_normal(&self, v: VertexId) -> Vector3<f64> {
        let sum: Vector3<f64> = self
            .vertex_faces(v)
            .into_iter()
            .map(|f| self.face_normal(f))
            .sum();
        sum.try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Compute the midpoint of an edge.
    pub fn edge_midpoint(&self, he: HalfEdgeId) -> Point3<f64> {
        let p0 = self.position(self.tail(he));
        let p1 = self.position(self.head(he));
        Point3::from((p0.coords + p1.coords) * 0.5)
    }

    /// Compute the length of an edge.
    pub fn edge_length(&self, he: HalfEdgeId) -> f64 {
        (self.position(self.head(he)) - self.position(self.tail(he))).norm()
    }

    /// Average of all vertex positions.
    pub fn centroid(&self) -> Point3<f64> {
        if self.vertices.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.vertices.iter().map(|v| v.position.coords).sum();
        Point3::from(sum / self.vertices.len() as f64)
    }

    /// Compute the bounding box of the mesh.
    pub fn bounding_box(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = first.position;
        let mut max = first.position;

        for v in &self.vertices {
            for i in 0..3 {
                min[i] = min[i].min(v.position[i]);
                max[i] = max[i].max(v.position[i]);
            }
        }

        Some((min, max))
    }

    /// Compute the total surface area of the mesh.
    pub fn surface_area(&self) -> f64 {
        self.face_ids().map(|f| self.face_area(f)).sum()
    }

    // ==================== Serialization ====================

    /// Every face as its list of vertex indices, in winding order.
    pub fn list_faces_by_vertex_indices(&self) -> Vec<Vec<usize>> {
        self.face_ids().map(|f| self.face_vertex_indices(f)).collect()
    }

    /// Every vertex position, in index order.
    pub fn list_vertices_by_points(&self) -> Vec<Point3<f64>> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Copy of this mesh with every vertex moved to a new position.
    ///
    /// Topology and metadata are untouched. `positions` must hold one point per
    /// vertex; missing entries keep their old position.
    pub fn with_positions(&self, positions: &[Point3<f64>]) -> HalfEdgeMesh {
        let mut out = self.clone();
        for (v, p) in out.vertices.iter_mut().zip(positions) {
            v.position = *p;
        }
        out
    }

    /// Copy of this mesh with roles replaced.
    pub(crate) fn with_roles(&self, face_role: Role, vertex_role: Role) -> HalfEdgeMesh {
        let mut out = self.clone();
        out.face_roles = vec![face_role; out.faces.len()];
        out.vertex_roles = vec![vertex_role; out.vertices.len()];
        out
    }

    // ==================== Validation ====================

    /// Check if the mesh is valid (all connectivity is consistent).
    pub fn is_valid(&self) -> bool {
        if self.face_roles.len() != self.faces.len()
            || self.face_tags.len() != self.faces.len()
            || self.vertex_roles.len() != self.vertices.len()
        {
            return false;
        }

        // Check vertices
        for (vid, v) in self.vertices() {
            if let Some(he) = v.halfedge {
                if he.index() >= self.halfedges.len() || self.head(he) != vid {
                    return false;
                }
            }
        }

        // Check half-edges
        for (heid, he) in self.halfedges() {
            if self.halfedge(he.next).prev != heid || self.halfedge(he.prev).next != heid {
                return false;
            }
            if self.face_of(he.next) != he.face {
                return false;
            }
            if let Some(pair) = he.pair {
                if self.pair(pair) != Some(heid) || self.head(pair) != self.tail(heid) {
                    return false;
                }
            }
        }

        // Check faces: every loop closes
        for (fi, f) in self.faces.iter().enumerate() {
            let mut he = f.halfedge;
            let mut steps = 0;
            loop {
                if self.face_of(he).index() != fi {
                    return false;
                }
                he = self.next(he);
                steps += 1;
                if he == f.halfedge {
                    break;
                }
                if steps > self.halfedges.len() {
                    return false;
                }
            }
        }

        true
    }
}

/// Iterator over half-edges around a face.
pub struct FaceHalfEdgeIter<'a> {
    mesh: &'a HalfEdgeMesh,
    start: HalfEdgeId,
    current: HalfEdgeId,
    done: bool,
}

impl<'a> FaceHalfEdgeIter<'a> {
    fn new(mesh: &'a HalfEdgeMesh, f: FaceId) -> Self {
        let start = mesh.face(f).halfedge;
        Self {
            mesh,
            start,
            current: start,
            done: false,
        }
    }
}

impl<'a> Iterator for FaceHalfEdgeIter<'a> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.current);

        if self.current == self.start {
            self.done = true;
        }

        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{cube, grid, open_box, tetrahedron};
    use approx::assert_relative_eq;

    #[test]
    fn test_vertex_creation() {
        let v = Vertex::from_coords(1.0, 2.0, 3.0);
        assert_eq!(v.position, Point3::new(1.0, 2.0, 3.0));
        assert!(v.halfedge.is_none());
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = HalfEdgeMesh::new();
        assert_eq!(mesh.num_vertices(), 0);
        assert_eq!(mesh.num_halfedges(), 0);
        assert_eq!(mesh.num_faces(), 0);
        assert!(mesh.is_valid());
        assert!(mesh.bounding_box().is_none());
    }

    #[test]
    fn test_cube_counts() {
        let mesh = cube();
        assert_eq!(mesh.vef(), [8, 12, 6]);
        assert_eq!(mesh.num_halfedges(), 24);
        assert!(mesh.naked_halfedges().is_empty());
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_face_geometry() {
        let mesh = cube();
        // Top face of the unit cube centred on the origin
        let top = FaceId::new(1);
        assert_eq!(mesh.face_sides(top), 4);
        assert_relative_eq!(mesh.face_area(top), 1.0, epsilon = 1e-12);
        assert_relative_eq!(mesh.face_normal(top), Vector3::z(), epsilon = 1e-12);
        assert_relative_eq!(
            mesh.face_centroid(top),
            Point3::new(0.0, 0.0, 0.5),
            epsilon = 1e-12
        );
        assert_relative_eq!(mesh.surface_area(), 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_outward_normals() {
        for mesh in [cube(), tetrahedron()] {
            for f in mesh.face_ids() {
                let n = mesh.face_normal(f);
                let c = mesh.face_centroid(f);
                assert!(n.dot(&c.coords) > 0.0, "face {:?} points inward", f);
            }
        }
    }

    #[test]
    fn test_closed_vertex_ring() {
        let mesh = cube();
        for v in mesh.vertex_ids() {
            let ring = mesh.vertex_ring(v);
            assert!(ring.closed);
            assert_eq!(ring.outgoing.len(), 3);
            for &o in &ring.outgoing {
                assert_eq!(mesh.tail(o), v);
            }
            assert_eq!(mesh.valence(v), 3);
        }
    }

    #[test]
    fn test_ring_is_counter_clockwise() {
        let mesh = cube();
        let v = VertexId::new(6); // (+,+,+) corner
        let normal = mesh.vertex_normal(v);
        let p = mesh.position(v);
        let ring = mesh.vertex_ring(v);
        for w in ring.outgoing.windows(2) {
            let a = mesh.position(mesh.head(w[0])) - p;
            let b = mesh.position(mesh.head(w[1])) - p;
            assert!(a.cross(&b).dot(&normal) > 0.0);
        }
    }

    #[test]
    fn test_open_vertex_ring() {
        let mesh = grid(2);
        // Corner vertex touches one quad
        let corner = VertexId::new(0);
        let ring = mesh.vertex_ring(corner);
        assert!(!ring.closed);
        assert_eq!(ring.outgoing.len(), 1);
        assert_eq!(mesh.vertex_neighbors(corner).len(), 2);

        // Centre vertex of a 2x2 grid is interior
        let centre = VertexId::new(4);
        let ring = mesh.vertex_ring(centre);
        assert!(ring.closed);
        assert_eq!(ring.outgoing.len(), 4);

        // Edge midpoint vertex touches two quads
        let side = VertexId::new(1);
        let ring = mesh.vertex_ring(side);
        assert!(!ring.closed);
        assert_eq!(ring.outgoing.len(), 2);
        assert_eq!(mesh.vertex_neighbors(side).len(), 3);
        assert!(mesh.is_boundary_vertex(side));
    }

    #[test]
    fn test_open_box_boundary() {
        let mesh = open_box();
        assert_eq!(mesh.naked_halfedges().len(), 4);
        assert_eq!(mesh.num_edges(), 12);
        let boundary_faces = mesh.face_ids().filter(|&f| mesh.is_boundary_face(f)).count();
        assert_eq!(boundary_faces, 4);
    }

    #[test]
    fn test_pairing() {
        let mesh = tetrahedron();
        for he in mesh.halfedge_ids() {
            let pair = mesh.pair(he).unwrap();
            assert_eq!(mesh.pair(pair), Some(he));
            assert_eq!(mesh.head(pair), mesh.tail(he));
            assert_eq!(mesh.edge_key(he), mesh.edge_key(pair));
        }
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mesh = cube();
        let faces = mesh.list_faces_by_vertex_indices();
        assert_eq!(faces[1], vec![4, 5, 6, 7]);
        let points = mesh.list_vertices_by_points();
        assert_eq!(points.len(), 8);
    }

    #[test]
    fn test_with_positions_keeps_topology() {
        let mesh = cube();
        let moved: Vec<_> = mesh
            .list_vertices_by_points()
            .iter()
            .map(|p| p * 2.0)
            .collect();
        let scaled = mesh.with_positions(&moved);
        assert_eq!(scaled.vef(), mesh.vef());
        assert_relative_eq!(scaled.surface_area(), 24.0, epsilon = 1e-12);
        assert!(scaled.is_valid());
    }
}
