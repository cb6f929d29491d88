//! Loft family: inset and raise selected faces, then wall the gap.
//!
//! Unselected faces pass through with role `Ignored`, selected faces become an
//! `Existing` cap and `New` walls. That role split is what lets [`stack`] keep
//! lofting only the newest caps.

use tracing::debug;

use crate::mesh::{HalfEdgeId, HalfEdgeMesh, Role};
use crate::select::{Filter, Selection};
use crate::MAX_STACK_ITERATIONS;

use super::common::{face_amounts_a, face_amounts_b, face_mask, lerp, Key, Rewrite};
use super::params::OpParams;

/// Cap area, relative to the starting selection, below which [`stack`] stops.
const STACK_MIN_AREA_RATIO: f64 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Walls {
    Quads,
    Lace,
    OppositeLace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cap {
    Flat,
    Fan,
}

/// Per-face placement of the lofted ring.
struct Profile {
    mask: Vec<bool>,
    /// Fraction of the way from each corner to the centroid.
    inset: Vec<f64>,
    /// Distance along the face normal.
    height: Vec<f64>,
}

fn loft_faces(mesh: &HalfEdgeMesh, profile: &Profile, walls: Walls, cap: Cap) -> HalfEdgeMesh {
    let mut rw = Rewrite::new(mesh);
    for f in mesh.face_ids() {
        if !profile.mask[f.index()] {
            rw.copy_face(f, Role::Ignored);
            continue;
        }
        let tags = mesh.tags(f);
        let centroid = mesh.face_centroid(f);
        let normal = mesh.face_normal(f);
        let (t, h) = (profile.inset[f.index()], profile.height[f.index()]);

        let hes: Vec<HalfEdgeId> = mesh.face_halfedges(f).collect();
        let ring: Vec<usize> = hes
            .iter()
            .map(|&he| {
                rw.point(Key::Half(he.index()), Role::New, || {
                    lerp(mesh.position(mesh.head(he)), &centroid, t) + normal * h
                })
            })
            .collect();
        let k = ring.len();

        match cap {
            Cap::Flat => {
                rw.face(&ring, Role::Existing, tags.clone());
            }
            Cap::Fan => {
                let apex = rw.raised_centroid(f, h, Role::New);
                for i in 0..k {
                    rw.face(&[ring[i], ring[(i + 1) % k], apex], Role::Existing, tags.clone());
                }
            }
        }

        for (i, &he) in hes.iter().enumerate() {
            let a = mesh.tail(he).index();
            let b = mesh.head(he).index();
            let (xa, xb) = (ring[(i + k - 1) % k], ring[i]);
            match walls {
                Walls::Quads => {
                    rw.face(&[a, b, xb, xa], Role::New, tags.clone());
                }
                Walls::Lace => {
                    rw.face(&[a, b, xb], Role::New, tags.clone());
                    rw.face(&[a, xb, xa], Role::New, tags.clone());
                }
                Walls::OppositeLace => {
                    rw.face(&[a, b, xa], Role::New, tags.clone());
                    rw.face(&[b, xb, xa], Role::New, tags.clone());
                }
            }
        }
    }
    rw.finish()
}

/// Inset by `A`, raise by `B`.
fn inset_profile(mesh: &HalfEdgeMesh, params: &OpParams) -> Profile {
    let mut rng = params.rng();
    Profile {
        mask: face_mask(mesh, params, &mut rng),
        inset: face_amounts_a(mesh, params, &mut rng),
        height: face_amounts_b(mesh, params, &mut rng),
    }
}

pub(super) fn loft(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    loft_faces(mesh, &inset_profile(mesh, params), Walls::Quads, Cap::Flat)
}

/// Loft without inset: `A` is the distance along the normal.
pub(super) fn extrude(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let profile = Profile {
        mask: face_mask(mesh, params, &mut rng),
        inset: vec![0.0; mesh.num_faces()],
        height: face_amounts_a(mesh, params, &mut rng),
    };
    loft_faces(mesh, &profile, Walls::Quads, Cap::Flat)
}

pub(super) fn lace(mesh: &HalfEdgeMesh, params: &OpParams, opposite: bool) -> HalfEdgeMesh {
    let walls = if opposite {
        Walls::OppositeLace
    } else {
        Walls::Lace
    };
    loft_faces(mesh, &inset_profile(mesh, params), walls, Cap::Flat)
}

pub(super) fn stake(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    loft_faces(mesh, &inset_profile(mesh, params), Walls::Quads, Cap::Fan)
}

fn existing_area(mesh: &HalfEdgeMesh) -> f64 {
    mesh.face_ids()
        .filter(|&f| mesh.face_role(f) == Role::Existing)
        .map(|f| mesh.face_area(f))
        .sum()
}

/// Repeated loft. `A` is the step height and `B` the scale of each new cap
/// relative to the last.
///
/// The first step lofts the filter's faces, every later one the caps of the
/// step before. Stops after [`MAX_STACK_ITERATIONS`] steps or once the caps
/// have shrunk to nothing.
pub(super) fn stack(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mut mask = face_mask(mesh, params, &mut rng);
    let start: f64 = mesh
        .face_ids()
        .filter(|f| mask[f.index()])
        .map(|f| mesh.face_area(f))
        .sum();
    let caps = params.clone().with_filter(Filter::new(Selection::Existing));

    let mut current = mesh.clone();
    for step in 0..MAX_STACK_ITERATIONS {
        let step_params = if step == 0 { params } else { &caps };
        let profile = Profile {
            height: face_amounts_a(&current, step_params, &mut rng),
            inset: face_amounts_b(&current, step_params, &mut rng)
                .into_iter()
                .map(|scale| 1.0 - scale)
                .collect(),
            mask,
        };
        current = loft_faces(&current, &profile, Walls::Quads, Cap::Flat);

        let area = existing_area(&current);
        if area <= start * STACK_MIN_AREA_RATIO {
            debug!(steps = step + 1, "stack caps vanished");
            break;
        }
        mask = current
            .face_ids()
            .map(|f| current.face_role(f) == Role::Existing)
            .collect();
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::Operator;
    use crate::test_util::{cube, open_box};
    use approx::assert_relative_eq;

    fn count(mesh: &HalfEdgeMesh, role: Role) -> usize {
        mesh.face_roles().iter().filter(|r| **r == role).count()
    }

    #[test]
    fn test_loft_counts() {
        let out = loft(&cube(), &OpParams::new().with_a(0.5).with_b(0.2));
        assert_eq!(out.vef(), [32, 60, 30]);
        assert!(out.naked_halfedges().is_empty());
        assert_eq!(count(&out, Role::Existing), 6);
        assert_eq!(count(&out, Role::New), 24);
    }

    #[test]
    fn test_partial_loft_marks_rest_ignored() {
        let params = OpParams::new()
            .with_a(0.5)
            .with_b(0.2)
            .with_selection(Selection::FacingUp);
        let out = loft(&cube(), &params);
        assert_eq!(out.vef(), [12, 20, 10]);
        assert_eq!(count(&out, Role::Ignored), 5);
        assert_eq!(count(&out, Role::Existing), 1);
    }

    #[test]
    fn test_extrude_moves_cap_along_normal() {
        let params = OpParams::new()
            .with_a(1.0)
            .with_selection(Selection::FacingUp);
        let out = extrude(&cube(), &params);
        let (min, max) = out.bounding_box().unwrap();
        assert_relative_eq!(min.y, -0.5);
        assert_relative_eq!(max.y, 1.5);
    }

    #[test]
    fn test_lace_and_stake_counts() {
        let params = Operator::Lace.default_params();
        let mesh = cube();
        assert_eq!(lace(&mesh, &params, false).vef(), [32, 84, 54]);
        assert_eq!(lace(&mesh, &params, true).vef(), [32, 84, 54]);
        assert_eq!(stake(&mesh, &params).vef(), [38, 84, 48]);
    }

    #[test]
    fn test_open_mesh_walls() {
        let out = loft(&open_box(), &Operator::Loft.default_params());
        assert!(out.is_valid());
        assert_eq!(out.naked_halfedges().len(), 4);
    }

    #[test]
    fn test_stack_hits_iteration_limit() {
        let params = OpParams::new()
            .with_a(0.5)
            .with_b(0.8)
            .with_selection(Selection::FacingUp);
        let out = stack(&cube(), &params);
        assert_eq!(out.num_vertices(), 8 + 4 * MAX_STACK_ITERATIONS);
        assert_eq!(count(&out, Role::Existing), 1);
        assert!(out.naked_halfedges().is_empty());
    }

    #[test]
    fn test_stack_stops_when_caps_vanish() {
        let params = OpParams::new()
            .with_a(0.1)
            .with_b(0.0)
            .with_selection(Selection::FacingUp);
        let out = stack(&cube(), &params);
        // The first cap collapses to a point
        assert_eq!(out.num_vertices(), 8 + 4);
    }
}
