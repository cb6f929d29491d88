//! Whole-shape coordinate remaps. Topology and metadata pass through untouched.

use std::collections::HashSet;
use std::f64::consts::PI;

use nalgebra::{Point3, Rotation3, Vector3};

use crate::error::{MeshError, Result};
use crate::mesh::{FaceId, HalfEdgeMesh};

use super::common::lerp;
use super::params::OpParams;
use super::Operator;

/// Damping applied to each canonicalization correction.
const CANONICAL_STEP: f64 = 0.1;

fn remap(mesh: &HalfEdgeMesh, f: impl Fn(&Point3<f64>) -> Point3<f64>) -> HalfEdgeMesh {
    let positions: Vec<Point3<f64>> = mesh.vertices().map(|(_, v)| f(&v.position)).collect();
    mesh.with_positions(&positions)
}

/// Blend every vertex toward the sphere around the centroid whose radius is
/// the mean vertex distance.
pub(super) fn spherize(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let centre = mesh.centroid();
    let radius = mean(mesh.vertices().map(|(_, v)| (v.position - centre).norm()));
    remap(mesh, |p| match (p - centre).try_normalize(f64::EPSILON) {
        Some(dir) => lerp(p, &(centre + dir * radius), params.value_a),
        None => *p,
    })
}

/// [`spherize`] in the XZ plane: heights are kept.
pub(super) fn cylinderize(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let centre = mesh.centroid();
    let planar = |p: &Point3<f64>| Vector3::new(p.x - centre.x, 0.0, p.z - centre.z);
    let radius = mean(mesh.vertices().map(|(_, v)| planar(&v.position).norm()));
    remap(mesh, |p| match planar(p).try_normalize(f64::EPSILON) {
        Some(dir) => {
            let target = Point3::new(centre.x + dir.x * radius, p.y, centre.z + dir.z * radius);
            lerp(p, &target, params.value_a)
        }
        None => *p,
    })
}

pub(super) fn stretch(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    remap(mesh, |p| Point3::new(p.x, p.y * params.value_a, p.z))
}

pub(super) fn recenter(mesh: &HalfEdgeMesh) -> HalfEdgeMesh {
    let offset = mesh.centroid().coords;
    remap(mesh, |p| p - offset)
}

/// Rotate so face `A` points straight down, then rest the lowest point on `y = 0`.
///
/// # Errors
/// [`MeshError::FaceOutOfRange`] if `A` does not name a face.
pub(super) fn sit_level(mesh: &HalfEdgeMesh, params: &OpParams) -> Result<HalfEdgeMesh> {
    let len = mesh.num_faces();
    let index = params.value_a.round();
    if !(0.0..len as f64).contains(&index) {
        return Err(MeshError::FaceOutOfRange {
            face: index.max(0.0) as usize,
            len,
        });
    }
    let normal = mesh.face_normal(FaceId::new(index as usize));
    let down = -Vector3::y();
    let rotation = if normal == Vector3::zeros() {
        Rotation3::identity()
    } else {
        Rotation3::rotation_between(&normal, &down)
            .unwrap_or_else(|| Rotation3::from_axis_angle(&Vector3::x_axis(), PI))
    };

    let rotated = remap(mesh, |p| rotation.transform_point(p));
    let floor = rotated
        .vertices()
        .map(|(_, v)| v.position.y)
        .fold(f64::INFINITY, f64::min);
    if !floor.is_finite() {
        return Ok(rotated);
    }
    Ok(remap(&rotated, |p| Point3::new(p.x, p.y - floor, p.z)))
}

/// Hart-style canonical form: `A` rounds of edge tangentification, centring
/// and face planarization.
///
/// Each round nudges every edge so its closest point to the origin sits on the
/// unit sphere, moves the mean of those tangent points to the origin, and pulls
/// every face's corners toward the face's own plane. The round count is
/// capped at the operator's configured maximum.
pub(super) fn canonicalize(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let max = Operator::Canonicalize.config().a_max;
    let iterations = params.value_a.clamp(0.0, max).round() as usize;
    let edges = undirected_edges(mesh);
    let faces = mesh.list_faces_by_vertex_indices();
    let mut positions = mesh.list_vertices_by_points();

    for _ in 0..iterations {
        tangentify(&mut positions, &edges);
        recentre_on_tangents(&mut positions, &edges);
        planarize(&mut positions, &faces);
    }
    mesh.with_positions(&positions)
}

fn undirected_edges(mesh: &HalfEdgeMesh) -> Vec<(usize, usize)> {
    let mut seen = HashSet::new();
    mesh.halfedge_ids()
        .map(|he| mesh.edge_key(he))
        .filter(|&key| key.0 != key.1 && seen.insert(key))
        .collect()
}

/// Closest point to the origin on the line through `a` and `b`.
fn tangent_point(a: &Point3<f64>, b: &Point3<f64>) -> Vector3<f64> {
    let d = b - a;
    let len2 = d.norm_squared();
    if len2 <= f64::EPSILON {
        return a.coords;
    }
    let t = -a.coords.dot(&d) / len2;
    a.coords + d * t
}

fn tangentify(positions: &mut [Point3<f64>], edges: &[(usize, usize)]) {
    for &(a, b) in edges {
        let t = tangent_point(&positions[a], &positions[b]);
        let push = t * (0.5 * CANONICAL_STEP * (1.0 - t.norm()));
        positions[a] += push;
        positions[b] += push;
    }
}

fn recentre_on_tangents(positions: &mut [Point3<f64>], edges: &[(usize, usize)]) {
    if edges.is_empty() {
        return;
    }
    let sum: Vector3<f64> = edges
        .iter()
        .map(|&(a, b)| tangent_point(&positions[a], &positions[b]))
        .sum();
    let offset = sum / edges.len() as f64;
    for p in positions.iter_mut() {
        *p -= offset;
    }
}

fn planarize(positions: &mut [Point3<f64>], faces: &[Vec<usize>]) {
    let before = positions.to_vec();
    for face in faces {
        let corners: Vec<Point3<f64>> = face.iter().map(|&i| before[i]).collect();
        let Some(mut normal) = newell(&corners).try_normalize(f64::EPSILON) else {
            continue;
        };
        let centre = corners.iter().map(|p| p.coords).sum::<Vector3<f64>>() / corners.len() as f64;
        if centre.dot(&normal) < 0.0 {
            normal = -normal;
        }
        for &i in face {
            let lift = (centre - before[i].coords).dot(&normal) * CANONICAL_STEP;
            positions[i] += normal * lift;
        }
    }
}

fn newell(points: &[Point3<f64>]) -> Vector3<f64> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let (a, b) = (&points[i], &points[(i + 1) % n]);
            Vector3::new(
                (a.y - b.y) * (a.z + b.z),
                (a.z - b.z) * (a.x + b.x),
                (a.x - b.x) * (a.y + b.y),
            )
        })
        .sum()
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{cube, grid};
    use approx::assert_relative_eq;

    #[test]
    fn test_spherize_full_blend() {
        let out = spherize(&cube(), &OpParams::new().with_a(1.0));
        let radius = 0.75f64.sqrt();
        for (_, v) in out.vertices() {
            assert_relative_eq!(v.position.coords.norm(), radius, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_cylinderize_keeps_height() {
        let mesh = grid(2);
        let out = cylinderize(&mesh, &OpParams::new().with_a(1.0));
        for (id, v) in out.vertices() {
            assert_relative_eq!(v.position.y, mesh.position(id).y);
        }
        // The centre vertex sits on the axis and does not move
        let centre = crate::mesh::VertexId::new(4);
        assert_relative_eq!(out.position(centre), mesh.position(centre));
    }

    #[test]
    fn test_stretch_and_recenter() {
        let out = recenter(&stretch(&grid(2), &OpParams::new().with_a(3.0)));
        assert_relative_eq!(out.centroid(), Point3::origin(), epsilon = 1e-12);
        let stretched = stretch(&cube(), &OpParams::new().with_a(2.0));
        let (min, max) = stretched.bounding_box().unwrap();
        assert_relative_eq!(max.y - min.y, 2.0);
    }

    #[test]
    fn test_sit_level_top_face() {
        let mesh = cube();
        // Face 3 is the +y face
        let out = sit_level(&mesh, &OpParams::new().with_a(3.0)).unwrap();
        let normal = out.face_normal(FaceId::new(3));
        assert_relative_eq!(normal, -Vector3::y(), epsilon = 1e-12);
        let (min, max) = out.bounding_box().unwrap();
        assert_relative_eq!(min.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(max.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_sit_level_out_of_range() {
        let err = sit_level(&cube(), &OpParams::new().with_a(6.0)).unwrap_err();
        assert!(matches!(err, MeshError::FaceOutOfRange { face: 6, len: 6 }));
    }

    #[test]
    fn test_canonicalize_moves_cube_edges_toward_unit_sphere() {
        let mesh = cube();
        let out = canonicalize(&mesh, &OpParams::new().with_a(200.0));
        let edges = undirected_edges(&out);
        let positions = out.list_vertices_by_points();
        for (a, b) in edges {
            let t = tangent_point(&positions[a], &positions[b]);
            assert_relative_eq!(t.norm(), 1.0, epsilon = 1e-3);
        }
        assert_eq!(out.vef(), mesh.vef());
    }

    #[test]
    fn test_canonicalize_zero_iterations_is_identity() {
        let mesh = cube();
        let out = canonicalize(&mesh, &OpParams::new());
        assert_eq!(out.list_vertices_by_points(), mesh.list_vertices_by_points());
    }

    #[test]
    fn test_canonicalize_caps_iterations() {
        let mesh = cube();
        let max = Operator::Canonicalize.config().a_max;
        let capped = canonicalize(&mesh, &OpParams::new().with_a(1e15));
        let at_max = canonicalize(&mesh, &OpParams::new().with_a(max));
        assert_eq!(capped.list_vertices_by_points(), at_max.list_vertices_by_points());
    }
}
