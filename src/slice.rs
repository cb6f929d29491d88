//! Cutting meshes with planes.
//!
//! [`slice`] clips every face against one plane and keeps either side or
//! both; [`slice_by_poly`] repeats that against each face plane of a convex
//! cutter to split a mesh into the part inside the cutter and the rest.
//!
//! # Example
//!
//! ```
//! use hedra::slice::{slice, Plane, SliceKeep, SliceOptions};
//! # use hedra::mesh::HalfEdgeMesh;
//! # use nalgebra::{Point3, Vector3};
//! # let positions = vec![
//! #     Point3::new(-1.0, -1.0, 0.0),
//! #     Point3::new(1.0, -1.0, 0.0),
//! #     Point3::new(1.0, 1.0, 0.0),
//! #     Point3::new(-1.0, 1.0, 0.0),
//! # ];
//! # let square = HalfEdgeMesh::from_faces(&positions, &[vec![0, 1, 2, 3]]).unwrap();
//!
//! let options = SliceOptions::new(Plane::new(Point3::origin(), Vector3::x()))
//!     .with_keep(SliceKeep::Below);
//! let left = slice(&square, &options);
//! assert_eq!(left.vef(), [4, 4, 1]);
//! ```

use std::collections::HashMap;

use nalgebra::{Point3, Vector3};
use tracing::debug;

use crate::compose::Transform;
use crate::mesh::{HalfEdgeMesh, MeshAssembler, Role, TagSet};
use crate::repair::detect_boundary_loops;

/// Distance within which a vertex counts as lying on the plane.
const SLICE_EPSILON: f64 = 1e-9;

/// An oriented plane. "Above" is the side the normal points to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point on the plane.
    pub point: Point3<f64>,
    /// Unit normal, or zero for a degenerate plane.
    pub normal: Vector3<f64>,
}

impl Plane {
    /// Create a plane, normalizing `normal`.
    pub fn new(point: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            point,
            normal: normal.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros),
        }
    }

    /// The plane `y = height`, facing up.
    pub fn horizontal(height: f64) -> Self {
        Self::new(Point3::new(0.0, height, 0.0), Vector3::y())
    }

    /// Signed distance from the plane, positive above.
    #[inline]
    pub fn signed_distance(&self, p: &Point3<f64>) -> f64 {
        (p - self.point).dot(&self.normal)
    }
}

/// Which side(s) of the plane a slice keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SliceKeep {
    /// Only the part the normal points toward.
    Above,
    /// Only the part behind the plane.
    Below,
    /// Both parts, split along the plane.
    #[default]
    Both,
}

/// Options for [`slice`].
#[derive(Debug, Clone, PartialEq)]
pub struct SliceOptions {
    /// The cutting plane.
    pub plane: Plane,
    /// Which side(s) to keep.
    pub keep: SliceKeep,
    /// Close the cut with new faces when a single side is kept.
    pub cap: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self::new(Plane::horizontal(0.0))
    }
}

impl SliceOptions {
    /// Keep both sides of `plane`, uncapped.
    pub fn new(plane: Plane) -> Self {
        Self {
            plane,
            keep: SliceKeep::Both,
            cap: false,
        }
    }

    /// Set which side(s) to keep.
    pub fn with_keep(mut self, keep: SliceKeep) -> Self {
        self.keep = keep;
        self
    }

    /// Set whether to cap the cut.
    pub fn with_cap(mut self, cap: bool) -> Self {
        self.cap = cap;
        self
    }
}

/// The two results of [`slice_by_poly`].
#[derive(Debug, Clone)]
pub struct SlicePieces {
    /// The part inside every cutter plane.
    pub inside: HalfEdgeMesh,
    /// Everything cut away.
    pub outside: HalfEdgeMesh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Above,
    On,
    Below,
}

impl Side {
    fn of(distance: f64) -> Side {
        if distance > SLICE_EPSILON {
            Side::Above
        } else if distance < -SLICE_EPSILON {
            Side::Below
        } else {
            Side::On
        }
    }

    fn opposes(self, other: Side) -> bool {
        matches!(
            (self, other),
            (Side::Above, Side::Below) | (Side::Below, Side::Above)
        )
    }
}

/// Clip every face of `mesh` against a plane.
///
/// Each edge with endpoints strictly on opposite sides gets one `New`
/// crossing vertex shared by both faces using it. Every face is split into an
/// above polygon (role `Existing`) and a below polygon (role `ExistingAlt`),
/// both keeping the face's tags; polygons left with fewer than three vertices
/// are dropped, and a face lying wholly on the plane counts as above.
/// Vertices no kept face uses are removed.
///
/// With a single side kept and `cap` set, every boundary loop lying on the
/// plane is closed with a `New` face.
pub fn slice(mesh: &HalfEdgeMesh, options: &SliceOptions) -> HalfEdgeMesh {
    let plane = &options.plane;
    let distances: Vec<f64> = mesh
        .vertices()
        .map(|(_, v)| plane.signed_distance(&v.position))
        .collect();
    let sides: Vec<Side> = distances.iter().map(|&d| Side::of(d)).collect();
    let keep_above = options.keep != SliceKeep::Below;
    let keep_below = options.keep != SliceKeep::Above;

    let mut asm = MeshAssembler::with_capacity(mesh.num_vertices(), mesh.num_faces());
    for (v, vertex) in mesh.vertices() {
        asm.add_vertex(vertex.position, mesh.vertex_role(v));
    }

    let mut crossings: HashMap<(usize, usize), usize> = HashMap::new();
    let (mut above_faces, mut below_faces) = (0, 0);
    for f in mesh.face_ids() {
        let verts = mesh.face_vertex_indices(f);
        let tags = mesh.tags(f);
        if verts.iter().all(|&v| sides[v] == Side::On) {
            if keep_above && asm.try_add_face(&verts, Role::Existing, tags.clone()) {
                above_faces += 1;
            }
            continue;
        }

        let n = verts.len();
        let mut above = Vec::with_capacity(n + 2);
        let mut below = Vec::with_capacity(n + 2);
        for i in 0..n {
            let (cur, nxt) = (verts[i], verts[(i + 1) % n]);
            match sides[cur] {
                Side::Above => above.push(cur),
                Side::Below => below.push(cur),
                Side::On => {
                    above.push(cur);
                    below.push(cur);
                }
            }
            if sides[cur].opposes(sides[nxt]) {
                let key = (cur.min(nxt), cur.max(nxt));
                let x = *crossings.entry(key).or_insert_with(|| {
                    let (a, b) = key;
                    let t = distances[a] / (distances[a] - distances[b]);
                    let pa = asm.position(a);
                    let pb = asm.position(b);
                    asm.add_vertex(pa + (pb - pa) * t, Role::New)
                });
                above.push(x);
                below.push(x);
            }
        }

        let has_above = verts.iter().any(|&v| sides[v] == Side::Above);
        let has_below = verts.iter().any(|&v| sides[v] == Side::Below);
        if keep_above && has_above && asm.try_add_face(&above, Role::Existing, tags.clone()) {
            above_faces += 1;
        }
        if keep_below && has_below && asm.try_add_face(&below, Role::ExistingAlt, tags.clone()) {
            below_faces += 1;
        }
    }

    let mut out = asm.finish_culled();
    let mut caps = 0;
    if options.cap && options.keep != SliceKeep::Both {
        (out, caps) = cap_cut(&out, plane);
    }
    debug!(
        crossings = crossings.len(),
        above = above_faces,
        below = below_faces,
        caps,
        "sliced mesh"
    );
    out
}

/// Close every boundary loop lying on `plane`.
fn cap_cut(mesh: &HalfEdgeMesh, plane: &Plane) -> (HalfEdgeMesh, usize) {
    let on_plane: Vec<Vec<usize>> = detect_boundary_loops(mesh)
        .into_iter()
        .filter(|l| l.is_fillable())
        .filter(|l| {
            l.vertices
                .iter()
                .all(|&v| plane.signed_distance(mesh.position(v)).abs() <= SLICE_EPSILON)
        })
        .map(|l| l.indices())
        .collect();
    if on_plane.is_empty() {
        return (mesh.clone(), 0);
    }

    let mut asm = MeshAssembler::from_mesh(mesh);
    let caps = on_plane
        .iter()
        .filter(|verts| asm.add_face_either_winding(verts, Role::New, TagSet::new()))
        .count();
    (asm.finish(), caps)
}

/// Slice by the horizontal plane `y = height`, keeping both sides.
pub fn slice_at_height(mesh: &HalfEdgeMesh, height: f64) -> HalfEdgeMesh {
    slice(mesh, &SliceOptions::new(Plane::horizontal(height)))
}

/// Split `mesh` by a convex `cutter`.
///
/// Each face plane of the cutter, with its outward normal, cuts the current
/// inside piece: what lies above is added to `outside` and what lies below
/// carries on. Degenerate cutter faces are skipped. Cuts are left open.
pub fn slice_by_poly(mesh: &HalfEdgeMesh, cutter: &HalfEdgeMesh) -> SlicePieces {
    let mut inside = mesh.clone();
    let mut outside = HalfEdgeMesh::new();
    for f in cutter.face_ids() {
        let normal = cutter.face_normal(f);
        if normal == Vector3::zeros() {
            continue;
        }
        let options = SliceOptions::new(Plane::new(cutter.face_centroid(f), normal));
        let above = slice(&inside, &options.clone().with_keep(SliceKeep::Above));
        if !above.is_empty() {
            outside = outside.append(&above, &Transform::identity());
        }
        inside = slice(&inside, &options.with_keep(SliceKeep::Below));
    }
    SlicePieces { inside, outside }
}
