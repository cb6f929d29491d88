//! Boundary loop detection and hole filling.
//!
//! A hole is a closed chain of naked half-edges. Loops are reported in the
//! winding a filling face needs, so a loop's vertex list can be handed
//! straight to the assembler.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::mesh::{HalfEdgeId, HalfEdgeMesh, MeshAssembler, Role, TagSet, VertexId};

/// A closed chain of naked half-edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLoop {
    /// Vertices in filling order: consecutive entries run against the naked
    /// half-edges, so a face over them pairs with every one.
    pub vertices: Vec<VertexId>,
}

impl BoundaryLoop {
    /// Number of edges (and vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the loop can be closed by a polygon.
    #[must_use]
    pub fn is_fillable(&self) -> bool {
        self.vertices.len() >= 3
    }

    /// The loop as raw vertex indices.
    pub fn indices(&self) -> Vec<usize> {
        self.vertices.iter().map(|v| v.index()).collect()
    }
}

/// Chain every naked half-edge of `mesh` into boundary loops.
///
/// From a naked half-edge `a -> b` the walk continues with the naked half-edge
/// whose head is `a`. Where several naked half-edges end at the same vertex
/// (a pinched boundary) the lowest-indexed one is followed; chains that never
/// close are discarded.
///
/// # Returns
///
/// Loops in order of their lowest naked half-edge.
///
/// # Example
///
/// ```
/// use hedra::mesh::HalfEdgeMesh;
/// use hedra::repair::detect_boundary_loops;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2]]).unwrap();
/// let loops = detect_boundary_loops(&mesh);
/// assert_eq!(loops.len(), 1);
/// assert_eq!(loops[0].indices(), vec![0, 2, 1]);
/// ```
pub fn detect_boundary_loops(mesh: &HalfEdgeMesh) -> Vec<BoundaryLoop> {
    let naked = mesh.naked_halfedges();
    let mut by_head: HashMap<VertexId, HalfEdgeId> = HashMap::with_capacity(naked.len());
    for &he in &naked {
        by_head.entry(mesh.head(he)).or_insert(he);
    }

    let mut visited: HashSet<HalfEdgeId> = HashSet::with_capacity(naked.len());
    let mut loops = Vec::new();
    for &start in &naked {
        if visited.contains(&start) {
            continue;
        }
        let mut vertices = Vec::new();
        let mut chain = Vec::new();
        let mut current = start;
        let closed = loop {
            if !visited.insert(current) {
                break current == start;
            }
            chain.push(current);
            vertices.push(mesh.head(current));
            match by_head.get(&mesh.tail(current)) {
                Some(&next) => current = next,
                None => break false,
            }
        };
        if closed {
            loops.push(BoundaryLoop { vertices });
        } else {
            trace!(edges = chain.len(), "open boundary chain skipped");
        }
    }
    loops
}

/// Close every boundary loop of three or more edges with a single polygon.
///
/// Each new face gets role `New` and an empty tag set; existing faces and
/// vertices keep their metadata. A loop whose filling face would reuse a
/// directed edge is retried with the opposite winding and skipped if that
/// fails too.
pub fn fill_holes(mesh: &HalfEdgeMesh) -> HalfEdgeMesh {
    let loops = detect_boundary_loops(mesh);
    if loops.is_empty() {
        return mesh.clone();
    }

    let mut asm = MeshAssembler::from_mesh(mesh);
    let mut filled = 0;
    for boundary in loops.iter().filter(|l| l.is_fillable()) {
        if asm.add_face_either_winding(&boundary.indices(), Role::New, TagSet::new()) {
            filled += 1;
        } else {
            trace!(edges = boundary.edge_count(), "hole could not be filled");
        }
    }
    debug!(holes = loops.len(), filled, "filled holes");
    asm.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::FaceId;
    use crate::test_util::{cube, grid, open_box};
    use nalgebra::Point3;

    #[test]
    fn test_closed_mesh_has_no_loops() {
        assert!(detect_boundary_loops(&cube()).is_empty());
        let filled = fill_holes(&cube());
        assert_eq!(filled.vef(), [8, 12, 6]);
    }

    #[test]
    fn test_open_box_loop() {
        let loops = detect_boundary_loops(&open_box());
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].edge_count(), 4);
        assert!(loops[0].is_fillable());
    }

    #[test]
    fn test_fill_open_box() {
        let mesh = open_box();
        let filled = fill_holes(&mesh);
        assert_eq!(filled.num_faces(), mesh.num_faces() + 1);
        assert!(filled.naked_halfedges().is_empty());
        assert!(filled.is_valid());

        let cap = FaceId::new(mesh.num_faces());
        assert_eq!(filled.face_role(cap), Role::New);
        assert!(filled.tags(cap).is_empty());
        assert_eq!(filled.face_sides(cap), 4);
    }

    #[test]
    fn test_fill_grid_with_one_polygon() {
        let filled = fill_holes(&grid(2));
        assert_eq!(filled.vef(), [9, 12, 5]);
        assert_eq!(filled.face_sides(FaceId::new(4)), 8);
        assert!(filled.naked_halfedges().is_empty());
    }

    /// Two triangles touching only at vertex 0.
    fn bow_tie() -> HalfEdgeMesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(-1.0, 0.0, 0.0),
            Point3::new(-1.0, -1.0, 0.0),
        ];
        HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2], vec![0, 3, 4]]).unwrap()
    }

    #[test]
    fn test_pinched_boundary_follows_lowest_halfedge() {
        let mesh = bow_tie();
        assert_eq!(mesh.naked_halfedges().len(), 6);

        // Both wings end at vertex 0; the walk always continues along the
        // first wing, so only its loop closes.
        let loops = detect_boundary_loops(&mesh);
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0].indices(), vec![0, 2, 1]);

        let filled = fill_holes(&mesh);
        assert_eq!(filled.num_faces(), 3);
        assert_eq!(filled.face_vertex_indices(FaceId::new(2)), vec![0, 2, 1]);
        assert_eq!(filled.naked_halfedges().len(), 3);
    }

    #[test]
    fn test_fill_keeps_existing_metadata() {
        let mesh = open_box();
        let filled = fill_holes(&mesh);
        for f in mesh.face_ids() {
            assert_eq!(filled.face_role(f), mesh.face_role(f));
        }
        assert_eq!(&filled.vertex_roles()[..], mesh.vertex_roles());
    }
}
