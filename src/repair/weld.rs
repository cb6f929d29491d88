//! Tolerance-based vertex merging.

use tracing::{debug, trace};

use crate::mesh::{HalfEdgeMesh, MeshAssembler, Role};
use crate::MIN_WELD_DISTANCE;

use super::octree::VertexOctree;

/// For every vertex, the index of the vertex it collapses onto.
///
/// Vertices are visited in index order; each one not yet claimed becomes the
/// leader of every unclaimed vertex within `tolerance` (inclusive).
fn leaders(mesh: &HalfEdgeMesh, tolerance: f64) -> Vec<usize> {
    let positions = mesh.list_vertices_by_points();
    let octree = VertexOctree::from_points(&positions);

    let mut leader = vec![usize::MAX; positions.len()];
    for i in 0..positions.len() {
        if leader[i] != usize::MAX {
            continue;
        }
        leader[i] = i;
        for v in octree.query_sphere(&positions[i], tolerance) {
            if leader[v.index()] == usize::MAX {
                leader[v.index()] = i;
            }
        }
    }
    leader
}

/// Merge vertices closer than `tolerance`.
///
/// The tolerance is clamped to at least [`MIN_WELD_DISTANCE`]. Faces are
/// remapped onto the surviving vertices and keep their tags; faces that
/// collapse to a degenerate loop are kept as long as the assembler accepts
/// them. Every role in the result is `New`. Welding twice gives the same mesh
/// as welding once.
///
/// # Arguments
/// * `mesh` - The mesh to weld
/// * `tolerance` - Maximum distance between merged vertices
///
/// # Example
///
/// ```
/// use hedra::mesh::HalfEdgeMesh;
/// use hedra::repair::weld;
/// use nalgebra::Point3;
///
/// // Two triangles that share an edge only geometrically
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
/// let welded = weld(&mesh, 1e-6);
/// assert_eq!(welded.vef(), [4, 5, 2]);
/// ```
pub fn weld(mesh: &HalfEdgeMesh, tolerance: f64) -> HalfEdgeMesh {
    let tolerance = if tolerance.is_nan() {
        MIN_WELD_DISTANCE
    } else {
        tolerance.max(MIN_WELD_DISTANCE)
    };
    let leader = leaders(mesh, tolerance);
    let merged = leader.iter().enumerate().filter(|&(i, &l)| i != l).count();

    let mut asm = MeshAssembler::from_mesh_vertices(mesh, Role::New);
    let mut dropped = 0;
    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh.face_vertices(f).map(|v| leader[v.index()]).collect();
        if !asm.try_add_face(&verts, Role::New, mesh.tags(f).clone()) {
            trace!(face = f.index(), "welded face rejected");
            dropped += 1;
        }
    }
    let out = asm.finish_culled();
    debug!(
        tolerance,
        merged,
        dropped,
        vertices = out.num_vertices(),
        "welded vertices"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{Tag, TagSet};
    use crate::ops::{OpParams, Operator};
    use crate::test_util::cube;
    use nalgebra::Point3;

    /// A cube whose six faces each own four private corner vertices.
    fn exploded_cube() -> HalfEdgeMesh {
        let mesh = cube();
        let mut positions = Vec::new();
        let mut faces = Vec::new();
        for f in mesh.face_ids() {
            let start = positions.len();
            positions.extend(mesh.face_positions(f));
            faces.push((start..positions.len()).collect());
        }
        HalfEdgeMesh::from_faces(&positions, &faces).unwrap()
    }

    #[test]
    fn test_weld_exploded_cube() {
        let exploded = exploded_cube();
        assert_eq!(exploded.vef(), [24, 24, 6]);

        let welded = weld(&exploded, 1e-6);
        assert_eq!(welded.vef(), [8, 12, 6]);
        assert!(welded.naked_halfedges().is_empty());
        assert!(welded.vertex_roles().iter().all(|r| *r == Role::New));
        assert!(welded.face_roles().iter().all(|r| *r == Role::New));
    }

    #[test]
    fn test_weld_is_idempotent() {
        let welded = weld(&exploded_cube(), 0.1);
        let again = weld(&welded, 0.1);
        assert_eq!(again.list_faces_by_vertex_indices(), welded.list_faces_by_vertex_indices());
        assert_eq!(again.list_vertices_by_points(), welded.list_vertices_by_points());
    }

    #[test]
    fn test_tolerance_is_clamped() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 5e-6),
        ];
        let mesh = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2], vec![3, 2, 1]]).unwrap();
        assert_eq!(weld(&mesh, 0.0).num_vertices(), 3);
        assert_eq!(weld(&mesh, -1.0).num_vertices(), 3);
    }

    #[test]
    fn test_degenerate_faces_survive() {
        // Everything collapses onto vertex 0; the faces become self-loops
        let welded = weld(&crate::test_util::tetrahedron(), 10.0);
        assert!(welded.is_valid());
        assert_eq!(welded.num_vertices(), 1);
        assert_eq!(welded.num_faces(), 4);

        // Kis apexes sit 0.707 from the corners and welding pulls them in
        let mesh = Operator::Kis.apply(&cube(), &OpParams::new().with_a(0.0)).unwrap();
        let welded = weld(&mesh, 0.75);
        assert!(welded.is_valid());
        assert!(welded.num_vertices() <= 8);
    }

    #[test]
    fn test_tags_survive() {
        let mut tags = TagSet::new();
        tags.insert(Tag::introvert("rim"));
        let mut rng = OpParams::new().rng();
        let mesh = exploded_cube().tag_faces(&tags, &crate::select::Selection::OnlyFirst.into(), &mut rng);
        let welded = weld(&mesh, 1e-6);
        assert!(welded.tags(crate::mesh::FaceId::new(0)).contains_name("rim"));
        assert!(!welded.tags(crate::mesh::FaceId::new(1)).contains_name("rim"));
    }
}
