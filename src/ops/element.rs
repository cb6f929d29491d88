//! Per-element transforms and shell thickening.
//!
//! Vertex operators move the selected vertices in place and keep the topology.
//! Face operators detach every face onto its own copy of its corners before
//! transforming the selected ones, so a face can move without dragging its
//! neighbours along.

use nalgebra::{Point3, Rotation3, Unit, Vector3};

use crate::mesh::{FaceId, HalfEdgeMesh, MeshAssembler, Role, VertexId};

use super::common::{face_amounts_a, face_amounts_b, face_mask, vertex_mask};
use super::params::OpParams;

// ==================== Vertex operators ====================

/// Move selected vertices with `place(vertex, amount)`; positions are always
/// read from the input mesh.
fn move_vertices(
    mesh: &HalfEdgeMesh,
    params: &OpParams,
    place: impl Fn(VertexId, f64) -> Point3<f64>,
) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = vertex_mask(mesh, params, &mut rng);
    let positions: Vec<Point3<f64>> = mesh
        .vertex_ids()
        .map(|v| {
            let amount = params.a_at(mesh, v.index(), &mut rng);
            if mask[v.index()] {
                place(v, amount)
            } else {
                *mesh.position(v)
            }
        })
        .collect();

    let mut out = mesh.with_positions(&positions);
    for (role, &selected) in out.vertex_roles.iter_mut().zip(&mask) {
        *role = if selected { Role::New } else { Role::Ignored };
    }
    out
}

/// Mean position of a vertex's neighbours, or the vertex itself if it has none.
fn neighbour_centroid(mesh: &HalfEdgeMesh, v: VertexId) -> Point3<f64> {
    let neighbours = mesh.vertex_neighbors(v);
    if neighbours.is_empty() {
        return *mesh.position(v);
    }
    let sum: Vector3<f64> = neighbours.iter().map(|&n| mesh.position(n).coords).sum();
    Point3::from(sum / neighbours.len() as f64)
}

/// Rotation by `degrees` about `axis`, or `None` if the axis is degenerate.
fn rotation_about(axis: &Vector3<f64>, degrees: f64) -> Option<Rotation3<f64>> {
    Unit::try_new(*axis, f64::EPSILON)
        .map(|axis| Rotation3::from_axis_angle(&axis, degrees.to_radians()))
}

pub(super) fn vertex_scale(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    move_vertices(mesh, params, |v, scale| {
        let centre = neighbour_centroid(mesh, v);
        centre + (mesh.position(v) - centre) * scale
    })
}

pub(super) fn vertex_rotate(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    move_vertices(mesh, params, |v, degrees| {
        let p = *mesh.position(v);
        let centre = neighbour_centroid(mesh, v);
        match rotation_about(&mesh.vertex_normal(v), degrees) {
            Some(rotation) => centre + rotation * (p - centre),
            None => p,
        }
    })
}

pub(super) fn vertex_flex(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    move_vertices(mesh, params, |v, distance| {
        mesh.position(v) + mesh.vertex_normal(v) * distance
    })
}

// ==================== Face operators ====================

/// Split every face onto its own corners and move the selected ones with
/// `place(face, corners, a, b)`.
fn detach_faces(
    mesh: &HalfEdgeMesh,
    params: &OpParams,
    place: impl Fn(FaceId, &[Point3<f64>], f64, f64) -> Vec<Point3<f64>>,
) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);
    let a = face_amounts_a(mesh, params, &mut rng);
    let b = face_amounts_b(mesh, params, &mut rng);

    let mut asm = MeshAssembler::with_capacity(mesh.num_halfedges(), mesh.num_faces());
    for f in mesh.face_ids() {
        let corners = mesh.face_positions(f);
        let (points, face_role, vertex_role) = if mask[f.index()] {
            let moved = place(f, &corners, a[f.index()], b[f.index()]);
            (moved, Role::Existing, Role::New)
        } else {
            (corners, Role::Ignored, Role::Ignored)
        };
        let verts: Vec<usize> = points
            .into_iter()
            .map(|p| asm.add_vertex(p, vertex_role))
            .collect();
        asm.try_add_face(&verts, face_role, mesh.tags(f).clone());
    }
    asm.finish()
}

pub(super) fn face_scale(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    detach_faces(mesh, params, |f, corners, scale, _| {
        let c = mesh.face_centroid(f);
        corners.iter().map(|p| c + (p - c) * scale).collect()
    })
}

pub(super) fn face_rotate(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    detach_faces(mesh, params, |f, corners, degrees, _| {
        let c = mesh.face_centroid(f);
        match rotation_about(&mesh.face_normal(f), degrees) {
            Some(rotation) => corners.iter().map(|p| c + rotation * (p - c)).collect(),
            None => corners.to_vec(),
        }
    })
}

/// Slide within the face plane: `A` along the first edge, `B` across it.
pub(super) fn face_slide(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    detach_faces(mesh, params, |f, corners, along, across| {
        let normal = mesh.face_normal(f);
        let tangent = (corners[1] - corners[0])
            .try_normalize(f64::EPSILON)
            .unwrap_or_else(Vector3::zeros);
        let offset = tangent * along + normal.cross(&tangent) * across;
        corners.iter().map(|p| p + offset).collect()
    })
}

pub(super) fn face_offset(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    detach_faces(mesh, params, |f, corners, distance, _| {
        let offset = mesh.face_normal(f) * distance;
        corners.iter().map(|p| p + offset).collect()
    })
}

// ==================== Shell ====================

/// Thicken into a closed solid.
///
/// The input faces stay as the outside. A reversed copy, pushed `A` against
/// the vertex normals, becomes the inside, and every open boundary edge gets a
/// rim quad joining the two. With `randomize` on, each face draws one
/// thickness and every inner vertex uses the mean of its faces' draws.
pub(super) fn shell(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let thickness = face_amounts_a(mesh, params, &mut rng);
    let nv = mesh.num_vertices();

    let mut asm = MeshAssembler::from_mesh_vertices(mesh, Role::Existing);
    for v in mesh.vertex_ids() {
        let faces = mesh.vertex_faces(v);
        let depth = if faces.is_empty() {
            params.value_a
        } else {
            faces.iter().map(|f| thickness[f.index()]).sum::<f64>() / faces.len() as f64
        };
        asm.add_vertex(mesh.position(v) - mesh.vertex_normal(v) * depth, Role::New);
    }

    for f in mesh.face_ids() {
        let verts = mesh.face_vertex_indices(f);
        let tags = mesh.tags(f);
        asm.try_add_face(&verts, Role::Existing, tags.clone());
        let inner: Vec<usize> = verts.iter().rev().map(|&i| i + nv).collect();
        asm.add_face_either_winding(&inner, Role::ExistingAlt, tags.clone());
    }
    for he in mesh.naked_halfedges() {
        let a = mesh.tail(he).index();
        let b = mesh.head(he).index();
        let tags = mesh.tags(mesh.face_of(he)).extrovert();
        asm.try_add_face(&[b, a, a + nv, b + nv], Role::New, tags);
    }
    asm.finish_culled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::Selection;
    use crate::test_util::{cube, grid, open_box};
    use approx::assert_relative_eq;

    fn count(roles: &[Role], role: Role) -> usize {
        roles.iter().filter(|r| **r == role).count()
    }

    #[test]
    fn test_vertex_flex_moves_along_normal() {
        let mesh = cube();
        let out = vertex_flex(&mesh, &OpParams::new().with_a(0.1));
        let v = VertexId::new(0);
        let moved = out.position(v) - mesh.position(v);
        assert_relative_eq!(moved.norm(), 0.1, epsilon = 1e-12);
        assert_relative_eq!(moved.normalize(), mesh.vertex_normal(v), epsilon = 1e-12);
        assert_eq!(count(out.vertex_roles(), Role::New), 8);
    }

    #[test]
    fn test_vertex_ops_only_touch_selection() {
        let mesh = grid(2);
        let params = OpParams::new().with_a(0.3).with_selection(Selection::Inner);
        let out = vertex_flex(&mesh, &params);
        assert_eq!(count(out.vertex_roles(), Role::New), 1);
        assert_eq!(count(out.vertex_roles(), Role::Ignored), 8);
        let centre = VertexId::new(4);
        assert_relative_eq!(out.position(centre).y, 0.3, epsilon = 1e-12);
        assert_eq!(out.position(VertexId::new(0)), mesh.position(VertexId::new(0)));
    }

    #[test]
    fn test_vertex_rotate_corner_on_axis_stays() {
        let mesh = cube();
        let out = vertex_rotate(&mesh, &OpParams::new().with_a(90.0));
        for v in mesh.vertex_ids() {
            assert_relative_eq!(out.position(v), mesh.position(v), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_vertex_scale_towards_neighbours() {
        let mesh = cube();
        let params = OpParams::new().with_a(0.0).with_selection(Selection::OnlyFirst);
        let out = vertex_scale(&mesh, &params);
        let expected = Point3::new(-1.0 / 6.0, -1.0 / 6.0, -1.0 / 6.0);
        assert_relative_eq!(*out.position(VertexId::new(0)), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_face_scale_detaches() {
        let out = face_scale(&cube(), &OpParams::new().with_a(0.5));
        assert_eq!(out.vef(), [24, 24, 6]);
        assert_eq!(out.naked_halfedges().len(), 24);
        assert_relative_eq!(out.surface_area(), 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_face_offset_partial() {
        let params = OpParams::new().with_a(1.0).with_selection(Selection::FacingUp);
        let out = face_offset(&cube(), &params);
        assert_eq!(count(out.face_roles(), Role::Ignored), 5);
        assert_eq!(count(out.face_roles(), Role::Existing), 1);
        let (_, max) = out.bounding_box().unwrap();
        assert_relative_eq!(max.y, 1.5);
    }

    #[test]
    fn test_face_rotate_keeps_area() {
        let mesh = cube();
        let out = face_rotate(&mesh, &OpParams::new().with_a(30.0));
        for f in out.face_ids() {
            assert_relative_eq!(out.face_area(f), 1.0, epsilon = 1e-12);
            assert_relative_eq!(out.face_centroid(f), mesh.face_centroid(f), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_face_slide_along_first_edge() {
        let mesh = cube();
        let out = face_slide(&mesh, &OpParams::new().with_a(0.25));
        let f = FaceId::new(0);
        let corners = mesh.face_positions(f);
        let dir = (corners[1] - corners[0]).normalize();
        let moved = out.face_centroid(f) - mesh.face_centroid(f);
        assert_relative_eq!(moved, dir * 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_shell_closed() {
        let out = shell(&cube(), &OpParams::new().with_a(0.1));
        assert_eq!(out.vef(), [16, 24, 12]);
        assert_eq!(count(out.face_roles(), Role::ExistingAlt), 6);
    }

    #[test]
    fn test_shell_open_gets_rim() {
        let out = shell(&open_box(), &OpParams::new().with_a(0.1));
        assert!(out.naked_halfedges().is_empty());
        assert_eq!(out.vef(), [16, 28, 14]);
        assert_eq!(count(out.face_roles(), Role::New), 4);
        assert!(out.is_valid());
    }

    #[test]
    fn test_shell_randomized_is_seeded() {
        let params = OpParams::new().with_a(0.2).randomized(true).with_seed(4);
        let first = shell(&open_box(), &params).list_vertices_by_points();
        let second = shell(&open_box(), &params).list_vertices_by_points();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shell_randomized_uses_mean_of_face_draws() {
        let mesh = cube();
        let params = OpParams::new().with_a(0.2).randomized(true).with_seed(9);
        let draws = face_amounts_a(&mesh, &params, &mut params.rng());
        let out = shell(&mesh, &params);

        let nv = mesh.num_vertices();
        let mut depths = Vec::new();
        for v in mesh.vertex_ids() {
            let faces = mesh.vertex_faces(v);
            let depth = faces.iter().map(|f| draws[f.index()]).sum::<f64>() / faces.len() as f64;
            let expected = mesh.position(v) - mesh.vertex_normal(v) * depth;
            let inner = out.position(VertexId::new(v.index() + nv));
            assert_relative_eq!(*inner, expected, epsilon = 1e-12);
            depths.push(depth);
        }
        // Corners of one face sink by different amounts
        assert!(depths.iter().any(|d| (d - depths[0]).abs() > 1e-9));
        assert!(out.naked_halfedges().is_empty());
    }
}
