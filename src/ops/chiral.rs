//! Chiral rewrites: gyro, snub, propeller and whirl.
//!
//! All four cut every edge at two points, one near each end. Both sides of an
//! edge see the same pair of points, so the output stays stitched.

use nalgebra::Point3;

use crate::mesh::{HalfEdgeId, HalfEdgeMesh, Role};

use super::common::{edge_tags, face_amounts_a, face_amounts_b, lerp, vertex_tags, Key, Rewrite};
use super::params::OpParams;

/// The two edge cuts of `he`: `(near tail, near head)`.
fn cuts(rw: &mut Rewrite, he: HalfEdgeId, t: f64) -> (usize, usize) {
    let mesh = rw.mesh;
    let near_tail = rw.edge_point(he, mesh.tail(he), t, Role::New);
    let near_head = rw.edge_point(he, mesh.head(he), t, Role::New);
    (near_tail, near_head)
}

/// A pentagon per half-edge around a (raised) face centre.
pub(super) fn gyro(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let ratios = face_amounts_a(mesh, params, &mut rng);
    let heights = face_amounts_b(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let t = ratios[f.index()];
        let c = rw.raised_centroid(f, heights[f.index()], Role::New);
        for he in mesh.face_halfedges(f) {
            let (near_tail, near_head) = cuts(&mut rw, he, t);
            let (next_tail, _) = cuts(&mut rw, mesh.next(he), t);
            let corner = mesh.head(he).index();
            rw.face(
                &[c, near_tail, near_head, corner, next_tail],
                Role::Existing,
                mesh.tags(f).clone(),
            );
        }
    }
    rw.finish()
}

/// Shrunk and twisted faces, vertex polygons, and two triangles per edge.
pub(super) fn snub(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let twist = face_amounts_a(mesh, params, &mut rng);
    let scale = face_amounts_b(mesh, params, &mut rng);

    let mut rw = Rewrite::empty(mesh);
    let s = |rw: &mut Rewrite, he: HalfEdgeId| {
        let f = mesh.face_of(he);
        rw.point(Key::Half(he.index()), Role::New, || {
            let c = mesh.face_centroid(f);
            let on_edge: Point3<f64> = lerp(
                mesh.position(mesh.tail(he)),
                mesh.position(mesh.head(he)),
                twist[f.index()],
            );
            c + (on_edge - c) * scale[f.index()]
        })
    };

    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh.face_halfedges(f).map(|he| s(&mut rw, he)).collect();
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for v in mesh.vertex_ids() {
        let ring = mesh.vertex_ring(v);
        if !ring.closed {
            continue;
        }
        let verts: Vec<usize> = ring
            .outgoing
            .iter()
            .map(|&o| s(&mut rw, mesh.prev(o)))
            .collect();
        rw.face(&verts, Role::New, vertex_tags(mesh, v));
    }
    for he in mesh.halfedge_ids() {
        let Some(g) = mesh.pair(he) else { continue };
        let verts = [s(&mut rw, he), s(&mut rw, mesh.prev(he)), s(&mut rw, g)];
        rw.face(&verts, Role::NewAlt, edge_tags(mesh, he));
    }
    rw.finish()
}

/// A central face with one quad vane at every corner.
pub(super) fn propeller(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let ratios = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let t = ratios[f.index()];
        let tags = mesh.tags(f);
        let hes: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
        let cut: Vec<(usize, usize)> = hes.iter().map(|&he| cuts(&mut rw, he, t)).collect();

        let centre: Vec<usize> = cut.iter().map(|&(near_tail, _)| near_tail).collect();
        rw.face(&centre, Role::Existing, tags.clone());
        let n = hes.len();
        for i in 0..n {
            let corner = mesh.head(hes[i]).index();
            let (near_tail, near_head) = cut[i];
            let (next_tail, _) = cut[(i + 1) % n];
            rw.face(
                &[corner, next_tail, near_tail, near_head],
                Role::New,
                tags.clone(),
            );
        }
    }
    rw.finish()
}

/// A shrunk central face with a hexagon along every edge.
pub(super) fn whirl(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let ratios = face_amounts_a(mesh, params, &mut rng);
    let pulls = face_amounts_b(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let (t, pull) = (ratios[f.index()], pulls[f.index()]);
        let tags = mesh.tags(f);
        let centroid = mesh.face_centroid(f);
        let hes: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
        let cut: Vec<(usize, usize)> = hes.iter().map(|&he| cuts(&mut rw, he, t)).collect();
        let inner: Vec<usize> = hes
            .iter()
            .zip(&cut)
            .map(|(&he, &(near_tail, _))| {
                let from = rw.asm.position(near_tail);
                rw.point(Key::Half(he.index()), Role::New, || lerp(&from, &centroid, pull))
            })
            .collect();

        rw.face(&inner, Role::Existing, tags.clone());
        let n = hes.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let corner = mesh.head(hes[i]).index();
            let (near_tail, near_head) = cut[i];
            let (next_tail, _) = cut[j];
            rw.face(
                &[inner[i], near_tail, near_head, corner, next_tail, inner[j]],
                Role::New,
                tags.clone(),
            );
        }
    }
    rw.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Operator;
    use crate::test_util::{cube, grid, tetrahedron};

    fn defaults(op: Operator) -> OpParams {
        op.default_params().with_seed(5)
    }

    #[test]
    fn test_counts_on_cube() {
        let mesh = cube();
        let cases = [
            (gyro(&mesh, &defaults(Operator::Gyro)), [38, 60, 24]),
            (snub(&mesh, &defaults(Operator::Snub)), [24, 60, 38]),
            (propeller(&mesh, &defaults(Operator::Propeller)), [32, 60, 30]),
            (whirl(&mesh, &defaults(Operator::Whirl)), [56, 84, 30]),
        ];
        for (out, expected) in cases {
            assert_eq!(out.vef(), expected);
            assert!(out.naked_halfedges().is_empty());
            assert!(out.is_valid());
        }
    }

    #[test]
    fn test_snub_is_dual_of_gyro_counts() {
        let mesh = tetrahedron();
        let g = gyro(&mesh, &defaults(Operator::Gyro)).vef();
        let s = snub(&mesh, &defaults(Operator::Snub)).vef();
        assert_eq!([g[2], g[1], g[0]], s);
    }

    #[test]
    fn test_open_grid_keeps_boundary() {
        let mesh = grid(2);
        for out in [
            gyro(&mesh, &defaults(Operator::Gyro)),
            propeller(&mesh, &defaults(Operator::Propeller)),
            whirl(&mesh, &defaults(Operator::Whirl)),
        ] {
            assert!(out.is_valid());
            // Each of the 8 boundary edges is cut into three
            assert_eq!(out.naked_halfedges().len(), 24);
        }
    }

    #[test]
    fn test_gyro_shares_edge_cuts() {
        let mesh = cube();
        let out = gyro(&mesh, &defaults(Operator::Gyro));
        // 8 corners, 6 centres, 24 edge cuts
        let new = out.vertex_roles().iter().filter(|r| **r == Role::New).count();
        assert_eq!(new, 30);
    }
}
