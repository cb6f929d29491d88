//! Conway topology rewrites.
//!
//! Each function walks the input once and emits polygons over derived points.
//! The shared conventions:
//!
//! - faces derived from one input face keep its role-of-origin `Existing` and
//!   its whole tag set
//! - faces built around an input vertex or edge are `New` (or `NewAlt`) and
//!   carry the extrovert tags of the faces around it
//! - faces are only built around vertices whose ring is closed; an open
//!   boundary produces no vertex face
//!
//! Operators that take a face selection keep unselected neighbours stitched by
//! splicing any new edge midpoints into them.

use nalgebra::Point3;

use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, Role, VertexRing};

use super::common::{
    edge_tags, face_amounts_a, face_amounts_b, face_mask, lerp, vertex_mask, vertex_tags, Key,
    Rewrite,
};
use super::params::OpParams;

/// Closed vertex rings, `None` for boundary or isolated vertices.
fn closed_rings(mesh: &HalfEdgeMesh) -> Vec<Option<VertexRing>> {
    mesh.vertex_ids()
        .map(|v| Some(mesh.vertex_ring(v)).filter(|r| r.closed))
        .collect()
}

/// Whether the edge under `he` borders a selected face.
fn touches_selected(mesh: &HalfEdgeMesh, mask: &[bool], he: HalfEdgeId) -> bool {
    mask[mesh.face_of(he).index()]
        || mesh
            .pair(he)
            .map_or(false, |g| mask[mesh.face_of(g).index()])
}

/// Raise a pyramid on each selected face.
pub(super) fn kis(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);
    let heights = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        if !mask[f.index()] {
            rw.copy_face(f, Role::Existing);
            continue;
        }
        let apex = rw.raised_centroid(f, heights[f.index()], Role::New);
        for he in mesh.face_halfedges(f) {
            let a = mesh.tail(he).index();
            let b = mesh.head(he).index();
            rw.face(&[a, b, apex], Role::New, mesh.tags(f).clone());
        }
    }
    rw.finish()
}

/// Face centroids become vertices, closed vertex rings become faces.
///
/// Roles swap with the elements: a dual vertex takes its face's role and a
/// dual face takes its vertex's role.
pub(crate) fn dual(mesh: &HalfEdgeMesh) -> HalfEdgeMesh {
    let mut rw = Rewrite::empty(mesh);
    for f in mesh.face_ids() {
        rw.asm.add_vertex(mesh.face_centroid(f), mesh.face_role(f));
    }
    for v in mesh.vertex_ids() {
        let ring = mesh.vertex_ring(v);
        if !ring.closed {
            continue;
        }
        let verts: Vec<usize> = ring
            .outgoing
            .iter()
            .map(|&o| mesh.face_of(o).index())
            .collect();
        rw.face(&verts, mesh.vertex_role(v), vertex_tags(mesh, v));
    }
    rw.finish()
}

/// Edge midpoints become the vertices.
pub(super) fn ambo(mesh: &HalfEdgeMesh) -> HalfEdgeMesh {
    let mut rw = Rewrite::empty(mesh);
    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh
            .face_halfedges(f)
            .map(|he| rw.midpoint(he, Role::NewAlt))
            .collect();
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for (v, ring) in closed_rings(mesh).into_iter().enumerate() {
        let Some(ring) = ring else { continue };
        let verts: Vec<usize> = ring
            .outgoing
            .iter()
            .map(|&o| rw.midpoint(o, Role::NewAlt))
            .collect();
        rw.face(&verts, Role::New, vertex_tags(mesh, v.into()));
    }
    rw.finish()
}

/// One point per half-edge, between the edge midpoint and the face centroid.
pub(super) fn zip(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let amounts = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::empty(mesh);
    let z = |rw: &mut Rewrite, he: HalfEdgeId| {
        let f = mesh.face_of(he);
        rw.point(Key::Half(he.index()), Role::New, || {
            lerp(&mesh.edge_midpoint(he), &mesh.face_centroid(f), amounts[f.index()])
        })
    };

    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh.face_halfedges(f).map(|he| z(&mut rw, he)).collect();
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for (v, ring) in closed_rings(mesh).into_iter().enumerate() {
        let Some(ring) = ring else { continue };
        let mut verts = Vec::with_capacity(ring.outgoing.len() * 2);
        for &o in &ring.outgoing {
            verts.push(z(&mut rw, o));
            verts.push(z(&mut rw, mesh.prev(o)));
        }
        rw.face(&verts, Role::New, vertex_tags(mesh, v.into()));
    }
    rw.finish()
}

/// Cut the corners off selected interior vertices.
///
/// Each cut vertex is replaced by one point per incident edge, a fraction
/// `A` of the way along it, and a polygon through those points.
pub(super) fn truncate(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = vertex_mask(mesh, params, &mut rng);
    let ratios: Vec<f64> = (0..mesh.num_vertices())
        .map(|i| params.a_at(mesh, i, &mut rng))
        .collect();
    let rings: Vec<Option<VertexRing>> = closed_rings(mesh)
        .into_iter()
        .zip(&mask)
        .map(|(ring, &selected)| ring.filter(|_| selected))
        .collect();

    let mut rw = Rewrite::new(mesh);
    // Point on outgoing half-edge `o`, near its tail.
    let p = |rw: &mut Rewrite, o: HalfEdgeId| {
        let t = ratios[mesh.tail(o).index()];
        rw.point(Key::Half(o.index()), Role::New, || {
            lerp(mesh.position(mesh.tail(o)), mesh.position(mesh.head(o)), t)
        })
    };

    for f in mesh.face_ids() {
        let mut verts = Vec::with_capacity(mesh.face_sides(f) * 2);
        for he in mesh.face_halfedges(f) {
            let corner = mesh.head(he);
            match (&rings[corner.index()], mesh.pair(he)) {
                (Some(_), Some(back)) => {
                    verts.push(p(&mut rw, back));
                    verts.push(p(&mut rw, mesh.next(he)));
                }
                _ => verts.push(corner.index()),
            }
        }
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for (v, ring) in rings.iter().enumerate() {
        let Some(ring) = ring else { continue };
        let verts: Vec<usize> = ring.outgoing.iter().map(|&o| p(&mut rw, o)).collect();
        rw.face(&verts, Role::New, vertex_tags(mesh, v.into()));
    }
    rw.finish()
}

/// A quad across every edge, joining its two endpoints and two face centres.
pub(super) fn join(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let heights = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for he in mesh.halfedge_ids() {
        let f = mesh.face_of(he);
        let a = mesh.tail(he).index();
        let b = mesh.head(he).index();
        match mesh.pair(he) {
            Some(g) if g > he => {
                let g_face = mesh.face_of(g);
                let cf = rw.raised_centroid(f, heights[f.index()], Role::New);
                let cg = rw.raised_centroid(g_face, heights[g_face.index()], Role::New);
                rw.face(&[a, cg, b, cf], Role::New, edge_tags(mesh, he));
            }
            Some(_) => {}
            None => {
                let cf = rw.raised_centroid(f, heights[f.index()], Role::New);
                rw.face(&[a, b, cf], Role::New, edge_tags(mesh, he));
            }
        }
    }
    rw.finish()
}

/// Two triangles across every edge, split along the line between the centres.
pub(super) fn needle(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let heights = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for he in mesh.halfedge_ids() {
        let f = mesh.face_of(he);
        let a = mesh.tail(he).index();
        let b = mesh.head(he).index();
        match mesh.pair(he) {
            Some(g) if g > he => {
                let g_face = mesh.face_of(g);
                let cf = rw.raised_centroid(f, heights[f.index()], Role::New);
                let cg = rw.raised_centroid(g_face, heights[g_face.index()], Role::New);
                let tags = edge_tags(mesh, he);
                rw.face(&[cf, a, cg], Role::New, tags.clone());
                rw.face(&[cg, b, cf], Role::New, tags);
            }
            Some(_) => {}
            None => {
                let cf = rw.raised_centroid(f, heights[f.index()], Role::New);
                rw.face(&[a, b, cf], Role::New, edge_tags(mesh, he));
            }
        }
    }
    rw.finish()
}

/// Point owned by half-edge `he`, pulled from its head toward the face centroid.
fn inset_point(rw: &mut Rewrite, he: HalfEdgeId, amounts: &[f64]) -> usize {
    let mesh = rw.mesh;
    let f = mesh.face_of(he);
    rw.point(Key::Half(he.index()), Role::New, || {
        lerp(mesh.position(mesh.head(he)), &mesh.face_centroid(f), amounts[f.index()])
    })
}

/// Shrink every face, fill each edge with a quad and each vertex with a polygon.
pub(super) fn expand(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let amounts = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh
            .face_halfedges(f)
            .map(|he| inset_point(&mut rw, he, &amounts))
            .collect();
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for he in mesh.halfedge_ids() {
        let x = inset_point(&mut rw, he, &amounts);
        let x_prev = inset_point(&mut rw, mesh.prev(he), &amounts);
        match mesh.pair(he) {
            Some(g) if g > he => {
                let y = inset_point(&mut rw, g, &amounts);
                let y_prev = inset_point(&mut rw, mesh.prev(g), &amounts);
                rw.face(&[x, x_prev, y, y_prev], Role::New, edge_tags(mesh, he));
            }
            Some(_) => {}
            None => {
                let a = mesh.tail(he).index();
                let b = mesh.head(he).index();
                rw.face(&[x, x_prev, a, b], Role::New, edge_tags(mesh, he));
            }
        }
    }
    for (v, ring) in closed_rings(mesh).into_iter().enumerate() {
        let Some(ring) = ring else { continue };
        let verts: Vec<usize> = ring
            .outgoing
            .iter()
            .map(|&o| inset_point(&mut rw, mesh.prev(o), &amounts))
            .collect();
        rw.face(&verts, Role::NewAlt, vertex_tags(mesh, v.into()));
    }
    rw.finish()
}

/// Shared driver for the rewrites that split selected faces through their
/// edge midpoints and a (raised) centroid.
///
/// `emit` is called for every selected face with its half-edges in order and
/// the index of the centroid point.
fn midpoint_rewrite(
    mesh: &HalfEdgeMesh,
    params: &OpParams,
    mut emit: impl FnMut(&mut Rewrite, FaceId, &[HalfEdgeId], usize),
) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);
    let heights = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        if mask[f.index()] {
            let hes: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
            let c = rw.raised_centroid(f, heights[f.index()], Role::New);
            emit(&mut rw, f, &hes, c);
        } else {
            let verts =
                rw.face_with_midpoints(f, Role::NewAlt, |he| touches_selected(mesh, &mask, he));
            rw.face(&verts, Role::Existing, mesh.tags(f).clone());
        }
    }
    rw.finish()
}

/// A quad at every corner of each selected face.
pub(super) fn ortho(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    midpoint_rewrite(mesh, params, |rw, f, hes, c| {
        let n = hes.len();
        for i in 0..n {
            let corner = mesh.head(hes[i]).index();
            let m_in = rw.midpoint(hes[i], Role::NewAlt);
            let m_out = rw.midpoint(hes[(i + 1) % n], Role::NewAlt);
            rw.face(&[corner, m_out, c, m_in], Role::New, mesh.tags(f).clone());
        }
    })
}

/// Two triangles along every edge of each selected face.
pub(super) fn meta(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    midpoint_rewrite(mesh, params, |rw, f, hes, c| {
        for &he in hes {
            let a = mesh.tail(he).index();
            let b = mesh.head(he).index();
            let m = rw.midpoint(he, Role::NewAlt);
            let tags = mesh.tags(f).clone();
            rw.face(&[c, a, m], Role::New, tags.clone());
            rw.face(&[c, m, b], Role::New, tags);
        }
    })
}

/// Midpoint polygon plus one triangle per corner of each selected face.
pub(super) fn subdivide(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let tags = mesh.tags(f);
        if !mask[f.index()] {
            let verts =
                rw.face_with_midpoints(f, Role::NewAlt, |he| touches_selected(mesh, &mask, he));
            rw.face(&verts, Role::Existing, tags.clone());
            continue;
        }
        let hes: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
        let mids: Vec<usize> = hes.iter().map(|&he| rw.midpoint(he, Role::NewAlt)).collect();
        rw.face(&mids, Role::Existing, tags.clone());
        let n = hes.len();
        for i in 0..n {
            let corner = mesh.head(hes[i]).index();
            rw.face(&[mids[i], corner, mids[(i + 1) % n]], Role::New, tags.clone());
        }
    }
    rw.finish()
}

/// Inset faces joined across each edge by a hexagon.
pub(super) fn chamfer(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let amounts = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let verts: Vec<usize> = mesh
            .face_halfedges(f)
            .map(|he| inset_point(&mut rw, he, &amounts))
            .collect();
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for he in mesh.halfedge_ids() {
        let a = mesh.tail(he).index();
        let b = mesh.head(he).index();
        let x = inset_point(&mut rw, he, &amounts);
        let x_prev = inset_point(&mut rw, mesh.prev(he), &amounts);
        match mesh.pair(he) {
            Some(g) if g > he => {
                let y = inset_point(&mut rw, g, &amounts);
                let y_prev = inset_point(&mut rw, mesh.prev(g), &amounts);
                rw.face(&[x, x_prev, a, y, y_prev, b], Role::New, edge_tags(mesh, he));
            }
            Some(_) => {}
            None => {
                rw.face(&[x, x_prev, a, b], Role::New, edge_tags(mesh, he));
            }
        }
    }
    rw.finish()
}

/// An inner face plus a pentagon at every corner of each selected face.
pub(super) fn quinto(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);
    let amounts = face_amounts_a(mesh, params, &mut rng);

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let tags = mesh.tags(f);
        if !mask[f.index()] {
            let verts =
                rw.face_with_midpoints(f, Role::NewAlt, |he| touches_selected(mesh, &mask, he));
            rw.face(&verts, Role::Existing, tags.clone());
            continue;
        }
        let centroid = mesh.face_centroid(f);
        let t = amounts[f.index()];
        let hes: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
        let mids: Vec<usize> = hes.iter().map(|&he| rw.midpoint(he, Role::NewAlt)).collect();
        let inner: Vec<usize> = hes
            .iter()
            .map(|&he| {
                rw.point(Key::Half(he.index()), Role::New, || {
                    lerp(&mesh.edge_midpoint(he), &centroid, t)
                })
            })
            .collect();
        rw.face(&inner, Role::Existing, tags.clone());
        let n = hes.len();
        for i in 0..n {
            let j = (i + 1) % n;
            let corner = mesh.head(hes[i]).index();
            rw.face(
                &[corner, mids[j], inner[j], inner[i], mids[i]],
                Role::New,
                tags.clone(),
            );
        }
    }
    rw.finish()
}

/// Corner points of the bevel polygon for half-edge `he`: the tail-side and
/// head-side points, each `edge` of the way in from its end and pulled `pull`
/// toward the face centroid.
fn bevel_points(
    rw: &mut Rewrite,
    he: HalfEdgeId,
    edge: &[f64],
    pull: &[f64],
) -> (usize, usize) {
    let mesh = rw.mesh;
    let f = mesh.face_of(he);
    let (t, s) = (edge[f.index()], pull[f.index()]);
    let a = *mesh.position(mesh.tail(he));
    let b = *mesh.position(mesh.head(he));
    let c: Point3<f64> = mesh.face_centroid(f);
    let near_tail = rw.point(Key::Half(he.index()), Role::New, || {
        lerp(&lerp(&a, &b, t), &c, s)
    });
    let near_head = rw.point(Key::HalfAlt(he.index()), Role::New, || {
        lerp(&lerp(&b, &a, t), &c, s)
    });
    (near_tail, near_head)
}

/// Truncated expand: every face becomes a 2n-gon, every edge a quad and every
/// vertex a 2k-gon.
///
/// `A` sets how far along each edge the corners are cut. `B` pulls the
/// selected faces inward; unselected faces are not pulled, which leaves their
/// edge quads flat.
pub(super) fn bevel(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);
    let edge = face_amounts_a(mesh, params, &mut rng);
    let pull: Vec<f64> = face_amounts_b(mesh, params, &mut rng)
        .into_iter()
        .zip(&mask)
        .map(|(b, &selected)| if selected { b } else { 0.0 })
        .collect();

    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        let mut verts = Vec::with_capacity(mesh.face_sides(f) * 2);
        for he in mesh.face_halfedges(f) {
            let (t, h) = bevel_points(&mut rw, he, &edge, &pull);
            verts.push(t);
            verts.push(h);
        }
        rw.face(&verts, Role::Existing, mesh.tags(f).clone());
    }
    for he in mesh.halfedge_ids() {
        let (t, h) = bevel_points(&mut rw, he, &edge, &pull);
        match mesh.pair(he) {
            Some(g) if g > he => {
                let (gt, gh) = bevel_points(&mut rw, g, &edge, &pull);
                rw.face(&[h, t, gh, gt], Role::New, edge_tags(mesh, he));
            }
            Some(_) => {}
            None => {
                let a = mesh.tail(he).index();
                let b = mesh.head(he).index();
                rw.face(&[h, t, a, b], Role::New, edge_tags(mesh, he));
            }
        }
    }
    for (v, ring) in closed_rings(mesh).into_iter().enumerate() {
        let Some(ring) = ring else { continue };
        let mut verts = Vec::with_capacity(ring.outgoing.len() * 2);
        for &o in &ring.outgoing {
            let (out_tail, _) = bevel_points(&mut rw, o, &edge, &pull);
            let (_, in_head) = bevel_points(&mut rw, mesh.prev(o), &edge, &pull);
            verts.push(out_tail);
            verts.push(in_head);
        }
        rw.face(&verts, Role::NewAlt, vertex_tags(mesh, v.into()));
    }
    rw.finish()
}
