//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use hedra::mesh::HalfEdgeMesh;
use nalgebra::Point3;

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

fn cube_faces() -> Vec<Vec<usize>> {
    vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![2, 3, 7, 6],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ]
}

fn cube_positions() -> Vec<Point3<f64>> {
    (0..8)
        .map(|i| {
            let x = if matches!(i % 4, 1 | 2) { 0.5 } else { -0.5 };
            let y = if matches!(i % 4, 2 | 3) { 0.5 } else { -0.5 };
            let z = if i >= 4 { 0.5 } else { -0.5 };
            Point3::new(x, y, z)
        })
        .collect()
}

/// Unit cube centred on the origin; face 3 faces `+y`.
pub fn cube() -> HalfEdgeMesh {
    HalfEdgeMesh::from_faces(&cube_positions(), &cube_faces()).unwrap()
}

/// The cube without its `z+` face.
pub fn open_box() -> HalfEdgeMesh {
    let mut faces = cube_faces();
    faces.remove(1);
    HalfEdgeMesh::from_faces(&cube_positions(), &faces).unwrap()
}

/// An `n` by `n` patch of quads in the XZ plane facing `+y`.
pub fn grid(n: usize) -> HalfEdgeMesh {
    let mut positions = Vec::new();
    for i in 0..=n {
        for j in 0..=n {
            positions.push(Point3::new(i as f64, 0.0, j as f64));
        }
    }
    let idx = |i: usize, j: usize| i * (n + 1) + j;
    let mut faces = Vec::new();
    for i in 0..n {
        for j in 0..n {
            faces.push(vec![idx(i, j), idx(i, j + 1), idx(i + 1, j + 1), idx(i + 1, j)]);
        }
    }
    HalfEdgeMesh::from_faces(&positions, &faces).unwrap()
}

/// A single regular `n`-gon in the XY plane.
pub fn polygon(n: usize) -> HalfEdgeMesh {
    let positions: Vec<Point3<f64>> = (0..n)
        .map(|i| {
            let t = std::f64::consts::TAU * i as f64 / n as f64;
            Point3::new(t.cos(), t.sin(), 0.0)
        })
        .collect();
    HalfEdgeMesh::from_faces(&positions, &[(0..n).collect()]).unwrap()
}
