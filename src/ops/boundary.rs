//! Rewrites that delete, split or merge whole faces.
//!
//! Surviving faces and vertices keep their roles and tags by original index,
//! never by position lookup.

use std::collections::{HashMap, HashSet};

use tracing::trace;

use crate::mesh::{split_polygon, FaceId, HalfEdgeId, HalfEdgeMesh, MeshAssembler, Role, TagSet};

use super::common::{face_mask, vertex_mask};
use super::params::OpParams;

/// An assembler holding every input vertex with its own role.
fn seeded(mesh: &HalfEdgeMesh) -> MeshAssembler {
    let mut asm = MeshAssembler::with_capacity(mesh.num_vertices(), mesh.num_faces());
    for (v, vertex) in mesh.vertices() {
        asm.add_vertex(vertex.position, mesh.vertex_role(v));
    }
    asm
}

fn keep_faces(mesh: &HalfEdgeMesh, keep: impl Fn(FaceId) -> bool) -> HalfEdgeMesh {
    let mut asm = seeded(mesh);
    for f in mesh.face_ids().filter(|&f| keep(f)) {
        asm.try_add_face(
            &mesh.face_vertex_indices(f),
            mesh.face_role(f),
            mesh.tags(f).clone(),
        );
    }
    asm.finish_culled()
}

/// Split every selected face with four or more sides along the chord from its
/// first corner to the opposite one. The half holding the first edge keeps the
/// face's role, the other half is `New`.
pub(super) fn split_faces(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);

    let mut asm = seeded(mesh);
    for f in mesh.face_ids() {
        let verts = mesh.face_vertex_indices(f);
        let (role, tags) = (mesh.face_role(f), mesh.tags(f));
        let halves = if mask[f.index()] && verts.len() >= 4 {
            split_polygon(f.index(), &verts, 0, verts.len() / 2).ok()
        } else {
            None
        };
        match halves {
            Some((first, second)) => {
                asm.try_add_face(&first, role, tags.clone());
                asm.try_add_face(&second, Role::New, tags.clone());
            }
            None => {
                asm.try_add_face(&verts, role, tags.clone());
            }
        }
    }
    asm.finish()
}

/// Delete the selected faces, or with `keep` every face but those.
pub(super) fn face_remove(mesh: &HalfEdgeMesh, params: &OpParams, keep: bool) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);
    keep_faces(mesh, |f| mask[f.index()] == keep)
}

/// Delete the selected vertices and every face touching one, or with `keep`
/// the unselected ones.
pub(super) fn vertex_remove(mesh: &HalfEdgeMesh, params: &OpParams, keep: bool) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = vertex_mask(mesh, params, &mut rng);
    keep_faces(mesh, |f| mesh.face_vertices(f).all(|v| mask[v.index()] == keep))
}

/// Edge-connected groups of selected faces, each listed in index order.
fn selected_groups(mesh: &HalfEdgeMesh, mask: &[bool]) -> Vec<Vec<FaceId>> {
    let mut group_of = vec![usize::MAX; mesh.num_faces()];
    let mut groups = Vec::new();
    for start in mesh.face_ids() {
        if !mask[start.index()] || group_of[start.index()] != usize::MAX {
            continue;
        }
        let id = groups.len();
        group_of[start.index()] = id;
        let mut group = vec![start];
        let mut stack = vec![start];
        while let Some(f) = stack.pop() {
            for he in mesh.face_halfedges(f) {
                let Some(pair) = mesh.pair(he) else { continue };
                let g = mesh.face_of(pair);
                if mask[g.index()] && group_of[g.index()] == usize::MAX {
                    group_of[g.index()] = id;
                    group.push(g);
                    stack.push(g);
                }
            }
        }
        group.sort();
        groups.push(group);
    }
    groups
}

/// The outline of a face group as one vertex loop, or `None` if the outline is
/// empty, pinched or made of several loops.
fn group_outline(mesh: &HalfEdgeMesh, group: &HashSet<FaceId>) -> Option<Vec<usize>> {
    let mut by_tail: HashMap<usize, HalfEdgeId> = HashMap::new();
    for &f in group {
        for he in mesh.face_halfedges(f) {
            let inside = mesh
                .pair(he)
                .map_or(false, |p| group.contains(&mesh.face_of(p)));
            if !inside && by_tail.insert(mesh.tail(he).index(), he).is_some() {
                return None;
            }
        }
    }
    let (&first_tail, &first) = by_tail.iter().min_by_key(|(tail, _)| **tail)?;

    let mut outline = vec![first_tail];
    let mut current = first;
    loop {
        let head = mesh.head(current).index();
        if head == first_tail {
            break;
        }
        outline.push(head);
        current = *by_tail.get(&head)?;
        if outline.len() > by_tail.len() {
            return None;
        }
    }
    (outline.len() == by_tail.len()).then_some(outline)
}

/// Merge each edge-connected group of selected faces into one `New` face.
///
/// Only groups whose outline is a single loop are merged; the merged face
/// carries the union of the group's tags. Other groups, and lone faces, pass
/// through unchanged.
pub(super) fn face_merge(mesh: &HalfEdgeMesh, params: &OpParams) -> HalfEdgeMesh {
    let mut rng = params.rng();
    let mask = face_mask(mesh, params, &mut rng);

    let mut merged: HashMap<FaceId, (Vec<usize>, TagSet)> = HashMap::new();
    let mut absorbed: HashSet<FaceId> = HashSet::new();
    for group in selected_groups(mesh, &mask) {
        if group.len() < 2 {
            continue;
        }
        let members: HashSet<FaceId> = group.iter().copied().collect();
        let Some(outline) = group_outline(mesh, &members) else {
            trace!(faces = group.len(), "face group outline is not a single loop");
            continue;
        };
        let mut tags = TagSet::new();
        for &f in &group {
            tags.extend_from(mesh.tags(f));
        }
        merged.insert(group[0], (outline, tags));
        absorbed.extend(group.iter().skip(1).copied());
    }

    let mut asm = seeded(mesh);
    for f in mesh.face_ids() {
        if absorbed.contains(&f) {
            continue;
        }
        match merged.remove(&f) {
            Some((outline, tags)) => {
                asm.try_add_face(&outline, Role::New, tags);
            }
            None => {
                asm.try_add_face(
                    &mesh.face_vertex_indices(f),
                    mesh.face_role(f),
                    mesh.tags(f).clone(),
                );
            }
        }
    }
    asm.finish_culled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Tag;
    use crate::select::Selection;
    use crate::test_util::{cube, grid, tetrahedron};

    fn only(selection: Selection) -> OpParams {
        OpParams::new().with_selection(selection)
    }

    #[test]
    fn test_split_faces() {
        let out = split_faces(&cube(), &OpParams::new());
        assert_eq!(out.vef(), [8, 18, 12]);
        assert!(out.naked_halfedges().is_empty());
        let new = out.face_roles().iter().filter(|r| **r == Role::New).count();
        assert_eq!(new, 6);

        let tetra = tetrahedron();
        assert_eq!(split_faces(&tetra, &OpParams::new()).vef(), tetra.vef());
    }

    #[test]
    fn test_face_remove_and_keep() {
        let removed = face_remove(&cube(), &only(Selection::OnlyFirst), false);
        assert_eq!(removed.num_faces(), 5);
        assert_eq!(removed.naked_halfedges().len(), 4);

        let kept = face_remove(&cube(), &only(Selection::OnlyFirst), true);
        assert_eq!(kept.vef(), [4, 4, 1]);
    }

    #[test]
    fn test_survivors_keep_tags_by_index() {
        let mut tags = TagSet::new();
        tags.insert(Tag::extrovert("lid"));
        let mut rng = OpParams::new().with_seed(1).rng();
        let mesh = cube().tag_faces(&tags, &Selection::OnlyLast.into(), &mut rng);

        let out = face_remove(&mesh, &only(Selection::OnlyFirst), false);
        let tagged: Vec<usize> = out
            .face_ids()
            .filter(|&f| out.tags(f).contains_name("lid"))
            .map(|f| f.index())
            .collect();
        assert_eq!(tagged, vec![4]);
    }

    #[test]
    fn test_vertex_remove_and_keep() {
        let out = vertex_remove(&cube(), &only(Selection::OnlyFirst), false);
        assert_eq!(out.vef(), [7, 9, 3]);

        let kept = vertex_remove(&cube(), &only(Selection::OnlyFirst), true);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_merge_open_patch() {
        let out = face_merge(&grid(2), &OpParams::new());
        assert_eq!(out.vef(), [8, 8, 1]);
        assert_eq!(out.face_role(FaceId::new(0)), Role::New);
    }

    #[test]
    fn test_merge_skips_closed_group() {
        let out = face_merge(&cube(), &OpParams::new());
        assert_eq!(out.vef(), [8, 12, 6]);
    }

    #[test]
    fn test_merge_two_adjacent_faces() {
        let params = OpParams::new().with_predicate(|fp| fp.index == 0 || fp.index == 2);
        let out = face_merge(&cube(), &params);
        assert_eq!(out.vef(), [8, 11, 5]);
        assert_eq!(out.face_sides(FaceId::new(0)), 6);
        assert!(out.naked_halfedges().is_empty());
    }
}
