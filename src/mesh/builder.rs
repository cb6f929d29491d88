//! Mesh construction utilities.
//!
//! Every operator in this crate produces its output the same way: it seeds a
//! [`MeshAssembler`] with vertices, feeds it polygons one at a time, and calls
//! [`MeshAssembler::finish`] to link the half-edge structure. Face insertion
//! never fails loudly; a polygon the assembler cannot accept is reported with
//! `false` so the caller can retry with the opposite winding or skip it.

use std::collections::{HashMap, HashSet};

use nalgebra::Point3;
use tracing::trace;

use super::halfedge::{Face, HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{FaceId, HalfEdgeId, VertexId};
use super::meta::{Role, TagSet};
use crate::error::{MeshError, Result};

/// Incremental polygon-soup to half-edge mesh builder.
///
/// # Example
/// ```
/// use hedra::mesh::{MeshAssembler, Role, TagSet};
/// use nalgebra::Point3;
///
/// let mut asm = MeshAssembler::new();
/// let a = asm.add_vertex(Point3::new(0.0, 0.0, 0.0), Role::Existing);
/// let b = asm.add_vertex(Point3::new(1.0, 0.0, 0.0), Role::Existing);
/// let c = asm.add_vertex(Point3::new(0.0, 1.0, 0.0), Role::Existing);
///
/// assert!(asm.try_add_face(&[a, b, c], Role::New, TagSet::new()));
/// // The same directed edges again are rejected...
/// assert!(!asm.try_add_face(&[a, b, c], Role::New, TagSet::new()));
/// // ...but the back side is fine.
/// assert!(asm.try_add_face(&[c, b, a], Role::New, TagSet::new()));
///
/// let mesh = asm.finish();
/// assert_eq!(mesh.num_faces(), 2);
/// assert!(mesh.naked_halfedges().is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MeshAssembler {
    positions: Vec<Point3<f64>>,
    vertex_roles: Vec<Role>,
    faces: Vec<Vec<usize>>,
    face_roles: Vec<Role>,
    face_tags: Vec<TagSet>,
    directed: HashSet<(usize, usize)>,
}

impl MeshAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty assembler with room for the given element counts.
    pub fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        Self {
            positions: Vec::with_capacity(num_vertices),
            vertex_roles: Vec::with_capacity(num_vertices),
            faces: Vec::with_capacity(num_faces),
            face_roles: Vec::with_capacity(num_faces),
            face_tags: Vec::with_capacity(num_faces),
            directed: HashSet::new(),
        }
    }

    /// Seed an assembler with every vertex of `mesh`, at the same indices,
    /// all carrying `role`.
    pub fn from_mesh_vertices(mesh: &HalfEdgeMesh, role: Role) -> Self {
        let mut asm = Self::with_capacity(mesh.num_vertices(), mesh.num_faces());
        for (_, v) in mesh.vertices() {
            asm.add_vertex(v.position, role);
        }
        asm
    }

    /// Seed an assembler with the full contents of `mesh`, metadata included.
    pub fn from_mesh(mesh: &HalfEdgeMesh) -> Self {
        let mut asm = Self::with_capacity(mesh.num_vertices(), mesh.num_faces());
        for (vid, v) in mesh.vertices() {
            asm.add_vertex(v.position, mesh.vertex_role(vid));
        }
        for f in mesh.face_ids() {
            asm.try_add_face(
                &mesh.face_vertex_indices(f),
                mesh.face_role(f),
                mesh.tags(f).clone(),
            );
        }
        asm
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, position: Point3<f64>, role: Role) -> usize {
        self.positions.push(position);
        self.vertex_roles.push(role);
        self.positions.len() - 1
    }

    /// Number of vertices added so far.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    /// Number of faces accepted so far.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Position of an added vertex.
    #[inline]
    pub fn position(&self, index: usize) -> Point3<f64> {
        self.positions[index]
    }

    /// Move an added vertex.
    #[inline]
    pub fn set_position(&mut self, index: usize, position: Point3<f64>) {
        self.positions[index] = position;
    }

    /// Overwrite the role of an added vertex.
    #[inline]
    pub fn set_vertex_role(&mut self, index: usize, role: Role) {
        self.vertex_roles[index] = role;
    }

    /// Whether a directed edge `from -> to` is already used by an accepted face.
    #[inline]
    pub fn has_directed_edge(&self, from: usize, to: usize) -> bool {
        self.directed.contains(&(from, to))
    }

    /// Try to add a polygon.
    ///
    /// Returns `false` and leaves the assembler untouched if the polygon has
    /// fewer than three vertices, references a vertex that was never added, or
    /// would reuse a directed edge already claimed by another face (or by
    /// itself). Degenerate self-loop edges (`a -> a`) are accepted and never
    /// paired.
    pub fn try_add_face(&mut self, verts: &[usize], role: Role, tags: TagSet) -> bool {
        if verts.len() < 3 {
            trace!(sides = verts.len(), "rejected face: too few vertices");
            return false;
        }
        if let Some(&bad) = verts.iter().find(|&&v| v >= self.positions.len()) {
            trace!(vertex = bad, "rejected face: unknown vertex");
            return false;
        }

        let n = verts.len();
        let mut local = HashSet::with_capacity(n);
        for i in 0..n {
            let edge = (verts[i], verts[(i + 1) % n]);
            if edge.0 == edge.1 {
                continue;
            }
            if self.directed.contains(&edge) || !local.insert(edge) {
                trace!(from = edge.0, to = edge.1, "rejected face: directed edge in use");
                return false;
            }
        }

        self.directed.extend(local);
        self.faces.push(verts.to_vec());
        self.face_roles.push(role);
        self.face_tags.push(tags);
        true
    }

    /// Try to add a polygon, falling back to the reversed winding.
    pub fn add_face_either_winding(&mut self, verts: &[usize], role: Role, tags: TagSet) -> bool {
        if self.try_add_face(verts, role, tags.clone()) {
            return true;
        }
        let reversed: Vec<usize> = verts.iter().rev().copied().collect();
        self.try_add_face(&reversed, role, tags)
    }

    /// Link all accepted faces into a half-edge mesh.
    ///
    /// Vertices no face references are kept, with no incident half-edge.
    pub fn finish(self) -> HalfEdgeMesh {
        let num_halfedges = self.faces.iter().map(Vec::len).sum();

        let mut mesh = HalfEdgeMesh {
            vertices: self.positions.into_iter().map(Vertex::new).collect(),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(self.faces.len()),
            face_roles: self.face_roles,
            vertex_roles: self.vertex_roles,
            face_tags: self.face_tags,
        };

        // Map from directed edge (tail, head) to half-edge ID
        let mut edge_map: HashMap<(usize, usize), HalfEdgeId> =
            HashMap::with_capacity(num_halfedges);

        // First pass: create face loops
        for (fi, verts) in self.faces.iter().enumerate() {
            let n = verts.len();
            let base = mesh.halfedges.len();
            let face_id = FaceId::new(fi);
            mesh.faces.push(Face::new(HalfEdgeId::new(base)));

            for k in 0..n {
                let head = verts[k];
                let tail = verts[(k + n - 1) % n];
                let id = HalfEdgeId::new(base + k);
                mesh.halfedges.push(HalfEdge {
                    vertex: VertexId::new(head),
                    face: face_id,
                    next: HalfEdgeId::new(base + (k + 1) % n),
                    prev: HalfEdgeId::new(base + (k + n - 1) % n),
                    pair: None,
                });
                if tail != head {
                    edge_map.insert((tail, head), id);
                }

                // Prefer a proper incoming edge over a self-loop
                let slot = &mut mesh.vertices[head].halfedge;
                if slot.is_none() || tail != head {
                    *slot = Some(id);
                }
            }
        }

        // Second pass: match pairs
        for (&(tail, head), &he) in &edge_map {
            if let Some(&pair) = edge_map.get(&(head, tail)) {
                mesh.halfedges[he.index()].pair = Some(pair);
            }
        }

        mesh
    }

    /// Link all accepted faces, then drop vertices no face references.
    pub fn finish_culled(self) -> HalfEdgeMesh {
        let mut used = vec![false; self.positions.len()];
        for face in &self.faces {
            for &v in face {
                used[v] = true;
            }
        }
        if used.iter().all(|&u| u) {
            return self.finish();
        }

        let mut remap = vec![usize::MAX; self.positions.len()];
        let mut culled = MeshAssembler::with_capacity(self.positions.len(), self.faces.len());
        for (i, (&p, &role)) in self.positions.iter().zip(&self.vertex_roles).enumerate() {
            if used[i] {
                remap[i] = culled.add_vertex(p, role);
            }
        }
        for ((face, role), tags) in self.faces.into_iter().zip(self.face_roles).zip(self.face_tags)
        {
            let verts: Vec<usize> = face.iter().map(|&v| remap[v]).collect();
            culled.try_add_face(&verts, role, tags);
        }
        culled.finish()
    }
}

/// Build a mesh from positions, face index lists, and optional metadata.
///
/// Missing metadata defaults to `Existing` roles and empty tag sets. Faces the
/// assembler rejects are skipped along with their role and tags.
///
/// # Errors
/// * [`MeshError::InvalidVertexIndex`] if a face references a missing vertex
/// * [`MeshError::MetadataMismatch`] if a metadata list has the wrong length
pub fn build_from_faces(
    positions: &[Point3<f64>],
    faces: &[Vec<usize>],
    face_roles: Option<&[Role]>,
    vertex_roles: Option<&[Role]>,
    face_tags: Option<&[TagSet]>,
) -> Result<HalfEdgeMesh> {
    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= positions.len()) {
            return Err(MeshError::InvalidVertexIndex { face: fi, vertex: vi });
        }
    }
    check_len("face_roles", faces.len(), face_roles.map(<[Role]>::len))?;
    check_len("vertex_roles", positions.len(), vertex_roles.map(<[Role]>::len))?;
    check_len("face_tags", faces.len(), face_tags.map(<[TagSet]>::len))?;

    let mut asm = MeshAssembler::with_capacity(positions.len(), faces.len());
    for (i, &p) in positions.iter().enumerate() {
        let role = vertex_roles.map_or(Role::Existing, |r| r[i]);
        asm.add_vertex(p, role);
    }
    for (fi, face) in faces.iter().enumerate() {
        let role = face_roles.map_or(Role::Existing, |r| r[fi]);
        let tags = face_tags.map_or_else(TagSet::new, |t| t[fi].clone());
        asm.try_add_face(face, role, tags);
    }
    Ok(asm.finish())
}

fn check_len(what: &'static str, expected: usize, actual: Option<usize>) -> Result<()> {
    match actual {
        Some(actual) if actual != expected => Err(MeshError::MetadataMismatch {
            what,
            expected,
            actual,
        }),
        _ => Ok(()),
    }
}

/// Split a polygon's vertex list along the chord between positions `i` and `j`.
///
/// Both halves keep the original winding and share the chord endpoints.
///
/// # Errors
/// [`MeshError::AdjacentSplit`] if `i` and `j` are equal or neighbours on the
/// loop, since the chord would then be an existing edge.
pub fn split_polygon(
    face: usize,
    verts: &[usize],
    i: usize,
    j: usize,
) -> Result<(Vec<usize>, Vec<usize>)> {
    let n = verts.len();
    let (i, j) = if i < j { (i, j) } else { (j, i) };
    if j - i <= 1 || (i == 0 && j == n - 1) {
        return Err(MeshError::AdjacentSplit {
            face,
            a: verts[i],
            b: verts[j],
        });
    }
    let first = verts[i..=j].to_vec();
    let mut second = verts[j..].to_vec();
    second.extend_from_slice(&verts[..=i]);
    Ok((first, second))
}

impl HalfEdgeMesh {
    /// Build a mesh from positions and face index lists with default metadata.
    ///
    /// # Example
    /// ```
    /// use hedra::mesh::HalfEdgeMesh;
    /// use nalgebra::Point3;
    ///
    /// let positions = vec![
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    ///     Point3::new(1.0, 1.0, 0.0),
    ///     Point3::new(0.0, 1.0, 0.0),
    /// ];
    /// let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2, 3]]).unwrap();
    /// assert_eq!(mesh.num_faces(), 1);
    /// assert_eq!(mesh.naked_halfedges().len(), 4);
    /// ```
    pub fn from_faces(positions: &[Point3<f64>], faces: &[Vec<usize>]) -> Result<HalfEdgeMesh> {
        build_from_faces(positions, faces, None, None, None)
    }

    /// Copy of this mesh without vertices that no face references.
    pub fn cull_unused_vertices(&self) -> HalfEdgeMesh {
        MeshAssembler::from_mesh(self).finish_culled()
    }

    /// Copy of this mesh with one empty tag set per face.
    pub fn init_tags(&self) -> HalfEdgeMesh {
        let mut out = self.clone();
        out.face_tags = vec![TagSet::new(); out.faces.len()];
        out
    }

    /// Split a face along the chord between two of its vertices.
    ///
    /// Both halves keep the face's role and tags.
    ///
    /// # Errors
    /// * [`MeshError::FaceOutOfRange`] for a bad face index
    /// * [`MeshError::VertexNotOnFace`] if `a` or `b` is not on the face
    /// * [`MeshError::AdjacentSplit`] if `a` and `b` already share an edge
    pub fn split_face(&self, face: FaceId, a: VertexId, b: VertexId) -> Result<HalfEdgeMesh> {
        if face.index() >= self.num_faces() {
            return Err(MeshError::FaceOutOfRange {
                face: face.index(),
                len: self.num_faces(),
            });
        }
        let verts = self.face_vertex_indices(face);
        let position_of = |v: VertexId| {
            verts
                .iter()
                .position(|&x| x == v.index())
                .ok_or(MeshError::VertexNotOnFace {
                    face: face.index(),
                    vertex: v.index(),
                })
        };
        let i = position_of(a)?;
        let j = position_of(b)?;
        let (first, second) = split_polygon(face.index(), &verts, i, j)?;

        let mut asm = MeshAssembler::with_capacity(self.num_vertices(), self.num_faces() + 1);
        for (vid, v) in self.vertices() {
            asm.add_vertex(v.position, self.vertex_role(vid));
        }
        for f in self.face_ids() {
            let role = self.face_role(f);
            let tags = self.tags(f);
            if f == face {
                asm.try_add_face(&first, role, tags.clone());
                asm.try_add_face(&second, role, tags.clone());
            } else {
                asm.try_add_face(&self.face_vertex_indices(f), role, tags.clone());
            }
        }
        Ok(asm.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Tag;
    use crate::test_util::{cube, grid};

    fn unit_square() -> Vec<Point3<f64>> {
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_single_polygon() {
        let mesh = HalfEdgeMesh::from_faces(&unit_square(), &[vec![0, 1, 2, 3]]).unwrap();
        assert_eq!(mesh.num_halfedges(), 4);
        assert_eq!(mesh.num_edges(), 4);
        assert!(mesh.is_valid());
        for v in mesh.vertex_ids() {
            assert!(mesh.is_boundary_vertex(v));
        }
    }

    #[test]
    fn test_face_order_roundtrip() {
        let faces = vec![vec![0, 1, 2], vec![0, 2, 3]];
        let mesh = HalfEdgeMesh::from_faces(&unit_square(), &faces).unwrap();
        assert_eq!(mesh.list_faces_by_vertex_indices(), faces);
        assert_eq!(mesh.num_edges(), 5);
        assert_eq!(mesh.naked_halfedges().len(), 4);
    }

    #[test]
    fn test_rejects_bad_faces() {
        let mut asm = MeshAssembler::new();
        for p in unit_square() {
            asm.add_vertex(p, Role::Existing);
        }
        assert!(!asm.try_add_face(&[0, 1], Role::New, TagSet::new()));
        assert!(!asm.try_add_face(&[0, 1, 9], Role::New, TagSet::new()));
        assert!(asm.try_add_face(&[0, 1, 2], Role::New, TagSet::new()));
        // shares directed edge 1 -> 2
        assert!(!asm.try_add_face(&[3, 1, 2], Role::New, TagSet::new()));
        assert_eq!(asm.num_faces(), 1);
        // the retry with the other winding succeeds
        assert!(asm.add_face_either_winding(&[3, 1, 2], Role::New, TagSet::new()));
        assert_eq!(asm.num_faces(), 2);
    }

    #[test]
    fn test_degenerate_face_kept() {
        let mut asm = MeshAssembler::new();
        for p in unit_square() {
            asm.add_vertex(p, Role::Existing);
        }
        assert!(asm.try_add_face(&[0, 0, 1], Role::New, TagSet::new()));
        let mesh = asm.finish();
        assert_eq!(mesh.num_faces(), 1);
        assert!(mesh.is_valid());
    }

    #[test]
    fn test_invalid_vertex_index() {
        let err = HalfEdgeMesh::from_faces(&unit_square(), &[vec![0, 1, 7]]).unwrap_err();
        assert_eq!(err, MeshError::InvalidVertexIndex { face: 0, vertex: 7 });
    }

    #[test]
    fn test_metadata_mismatch() {
        let roles = [Role::New, Role::New];
        let err = build_from_faces(&unit_square(), &[vec![0, 1, 2]], Some(&roles[..]), None, None)
            .unwrap_err();
        assert!(matches!(err, MeshError::MetadataMismatch { what: "face_roles", .. }));
    }

    #[test]
    fn test_metadata_carried() {
        let tags = [TagSet::parse("lid", false)];
        let mesh = build_from_faces(
            &unit_square(),
            &[vec![0, 1, 2, 3]],
            Some(&[Role::NewAlt][..]),
            None,
            Some(&tags[..]),
        )
        .unwrap();
        assert_eq!(mesh.face_roles(), &[Role::NewAlt]);
        assert_eq!(mesh.vertex_roles(), &[Role::Existing; 4]);
        assert!(mesh.tags(FaceId::new(0)).contains(&Tag::extrovert("lid")));
    }

    #[test]
    fn test_finish_culled() {
        let mut asm = MeshAssembler::new();
        for p in unit_square() {
            asm.add_vertex(p, Role::Existing);
        }
        asm.add_vertex(Point3::new(5.0, 5.0, 5.0), Role::New);
        asm.try_add_face(&[0, 1, 2, 3], Role::Existing, TagSet::new());
        let mesh = asm.finish_culled();
        assert_eq!(mesh.num_vertices(), 4);
        assert!(mesh.vertex_roles().iter().all(|&r| r == Role::Existing));
    }

    #[test]
    fn test_split_polygon() {
        let (a, b) = split_polygon(0, &[10, 11, 12, 13, 14], 1, 3).unwrap();
        assert_eq!(a, vec![11, 12, 13]);
        assert_eq!(b, vec![13, 14, 10, 11]);

        assert!(split_polygon(0, &[10, 11, 12, 13], 0, 3).is_err());
        assert!(split_polygon(0, &[10, 11, 12, 13], 2, 2).is_err());
    }

    #[test]
    fn test_split_face() {
        let mesh = cube();
        let split = mesh
            .split_face(FaceId::new(1), VertexId::new(4), VertexId::new(6))
            .unwrap();
        assert_eq!(split.vef(), [8, 13, 7]);
        assert!(split.naked_halfedges().is_empty());
        assert!(split.is_valid());
    }

    #[test]
    fn test_split_face_errors() {
        let mesh = cube();
        let top = FaceId::new(1);
        assert_eq!(
            mesh.split_face(top, VertexId::new(4), VertexId::new(5))
                .unwrap_err(),
            MeshError::AdjacentSplit { face: 1, a: 4, b: 5 }
        );
        assert_eq!(
            mesh.split_face(top, VertexId::new(0), VertexId::new(6))
                .unwrap_err(),
            MeshError::VertexNotOnFace { face: 1, vertex: 0 }
        );
        assert!(matches!(
            mesh.split_face(FaceId::new(99), VertexId::new(0), VertexId::new(1)),
            Err(MeshError::FaceOutOfRange { face: 99, len: 6 })
        ));
    }

    #[test]
    fn test_cull_unused_vertices() {
        let mesh = grid(1);
        assert_eq!(mesh.cull_unused_vertices().num_vertices(), 4);
    }
}
