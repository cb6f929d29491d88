//! Shared fixtures for unit tests.

use nalgebra::Point3;

use crate::mesh::HalfEdgeMesh;

/// Regular tetrahedron inscribed in the cube `[-1, 1]^3`.
pub fn tetrahedron() -> HalfEdgeMesh {
    let positions = vec![
        Point3::new(1.0, 1.0, 1.0),
        Point3::new(1.0, -1.0, -1.0),
        Point3::new(-1.0, 1.0, -1.0),
        Point3::new(-1.0, -1.0, 1.0),
    ];
    let faces = vec![vec![0, 1, 2], vec![1, 3, 2], vec![0, 2, 3], vec![0, 3, 1]];
    HalfEdgeMesh::from_faces(&positions, &faces).unwrap()
}

fn cube_positions() -> Vec<Point3<f64>> {
    vec![
        Point3::new(-0.5, -0.5, -0.5),
        Point3::new(0.5, -0.5, -0.5),
        Point3::new(0.5, 0.5, -0.5),
        Point3::new(-0.5, 0.5, -0.5),
        Point3::new(-0.5, -0.5, 0.5),
        Point3::new(0.5, -0.5, 0.5),
        Point3::new(0.5, 0.5, 0.5),
        Point3::new(-0.5, 0.5, 0.5),
    ]
}

fn cube_faces() -> Vec<Vec<usize>> {
    vec![
        vec![0, 3, 2, 1], // z-
        vec![4, 5, 6, 7], // z+
        vec![0, 1, 5, 4], // y-
        vec![2, 3, 7, 6], // y+
        vec![0, 4, 7, 3], // x-
        vec![1, 2, 6, 5], // x+
    ]
}

/// Unit cube centred on the origin, outward winding.
pub fn cube() -> HalfEdgeMesh {
    HalfEdgeMesh::from_faces(&cube_positions(), &cube_faces()).unwrap()
}

/// The unit cube with its `z+` face removed.
pub fn open_box() -> HalfEdgeMesh {
    let mut faces = cube_faces();
    faces.remove(1);
    HalfEdgeMesh::from_faces(&cube_positions(), &faces).unwrap()
}

/// An `n` by `n` patch of unit quads in the XZ plane, facing `+y`.
///
/// Vertex `(i, j)` sits at `(i, 0, j)` with index `i * (n + 1) + j`.
pub fn grid(n: usize) -> HalfEdgeMesh {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    for i in 0..=n {
        for j in 0..=n {
            positions.push(Point3::new(i as f64, 0.0, j as f64));
        }
    }
    let idx = |i: usize, j: usize| i * (n + 1) + j;
    let mut faces = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            faces.push(vec![idx(i, j), idx(i, j + 1), idx(i + 1, j + 1), idx(i + 1, j)]);
        }
    }
    HalfEdgeMesh::from_faces(&positions, &faces).unwrap()
}
