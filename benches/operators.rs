//! Benchmarks for mesh operators.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hedra::prelude::*;
use nalgebra::Point3;

fn create_grid_mesh(n: usize) -> HalfEdgeMesh {
    let mut positions = Vec::with_capacity((n + 1) * (n + 1));
    let mut faces = Vec::with_capacity(n * n);

    for j in 0..=n {
        for i in 0..=n {
            positions.push(Point3::new(i as f64, 0.0, j as f64));
        }
    }

    for j in 0..n {
        for i in 0..n {
            let v00 = j * (n + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + (n + 1);
            let v11 = v01 + 1;
            faces.push(vec![v00, v01, v11, v10]);
        }
    }

    HalfEdgeMesh::from_faces(&positions, &faces).unwrap()
}

fn create_cube() -> HalfEdgeMesh {
    let positions: Vec<Point3<f64>> = (0..8)
        .map(|i| {
            let x = if matches!(i % 4, 1 | 2) { 0.5 } else { -0.5 };
            let y = if matches!(i % 4, 2 | 3) { 0.5 } else { -0.5 };
            let z = if i >= 4 { 0.5 } else { -0.5 };
            Point3::new(x, y, z)
        })
        .collect();
    let faces = vec![
        vec![0, 3, 2, 1],
        vec![4, 5, 6, 7],
        vec![0, 1, 5, 4],
        vec![2, 3, 7, 6],
        vec![0, 4, 7, 3],
        vec![1, 2, 6, 5],
    ];
    HalfEdgeMesh::from_faces(&positions, &faces).unwrap()
}

fn bench_conway(c: &mut Criterion) {
    // A few thousand faces to rewrite
    let params = OpParams::new().with_seed(1);
    let mut base = create_cube();
    for _ in 0..3 {
        base = Operator::Subdivide.apply(&base, &params).unwrap();
    }

    for op in [
        Operator::Kis,
        Operator::Dual,
        Operator::Ambo,
        Operator::Truncate,
        Operator::Gyro,
        Operator::Snub,
        Operator::Chamfer,
        Operator::Loft,
    ] {
        let params = op.default_params().with_seed(1);
        c.bench_function(&format!("{op:?}_subdivided_cube"), |b| {
            b.iter(|| op.apply(black_box(&base), &params).unwrap())
        });
    }
}

fn bench_selection(c: &mut Criterion) {
    let mesh = create_grid_mesh(64);
    let params = OpParams::new().with_a(0.1).with_selection(Selection::FacingUp);

    c.bench_function("kis_facing_up_grid_64", |b| {
        b.iter(|| Operator::Kis.apply(black_box(&mesh), &params).unwrap())
    });
}

fn bench_repair(c: &mut Criterion) {
    let grid = create_grid_mesh(64);
    let doubled = grid.add_copy(Axis::Y, 0.0);

    c.bench_function("weld_doubled_grid_64", |b| {
        b.iter(|| weld(black_box(&doubled), 1e-4))
    });

    c.bench_function("fill_holes_grid_64", |b| {
        b.iter(|| fill_holes(black_box(&grid)))
    });

    let options = SliceOptions::new(Plane::new(Point3::new(32.0, 0.0, 0.0), nalgebra::Vector3::x()));
    c.bench_function("slice_grid_64", |b| {
        b.iter(|| slice(black_box(&grid), &options))
    });
}

criterion_group!(benches, bench_conway, bench_selection, bench_repair);
criterion_main!(benches);
