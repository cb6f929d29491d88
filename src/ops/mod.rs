//! The operator algebra.
//!
//! Every rewrite is a variant of the closed [`Operator`] enum. An operator
//! reads a mesh and an [`OpParams`] bundle and returns a new mesh; nothing is
//! modified in place. Chaining is left to the caller:
//!
//! ```
//! use hedra::ops::{Operator, OpParams};
//! use hedra::mesh::HalfEdgeMesh;
//! use nalgebra::Point3;
//!
//! let positions = vec![
//!     Point3::new(1.0, 1.0, 1.0),
//!     Point3::new(1.0, -1.0, -1.0),
//!     Point3::new(-1.0, 1.0, -1.0),
//!     Point3::new(-1.0, -1.0, 1.0),
//! ];
//! let faces = vec![vec![0, 1, 2], vec![1, 3, 2], vec![0, 2, 3], vec![0, 3, 1]];
//! let tetra = HalfEdgeMesh::from_faces(&positions, &faces).unwrap();
//!
//! let kis = Operator::Kis.apply(&tetra, &OpParams::new().with_a(0.2)).unwrap();
//! let dual = Operator::Dual.apply(&kis, &OpParams::new()).unwrap();
//! assert_eq!(dual.vef(), [12, 18, 8]);
//! ```
//!
//! Static facts about each operator (which amounts it reads, defaults,
//! ranges, predicted output counts) live in [`OpConfig`].

mod boundary;
mod chiral;
pub(crate) mod common;
mod config;
mod conway;
mod element;
mod inset;
mod params;
mod shape;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::compose::Axis;
use crate::error::{MeshError, Result};
use crate::mesh::HalfEdgeMesh;

pub use config::{OpConfig, VefMatrix};
pub(crate) use conway::dual;
pub use params::{OpParams, ParamFn};

/// Every operator the crate implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Operator {
    /// Unchanged copy.
    Identity,
    /// Raise a pyramid on each selected face.
    Kis,
    /// Swap faces and vertices.
    Dual,
    /// Cut every vertex down to its edge midpoints.
    Ambo,
    /// One point per half-edge, pulled into its face.
    Zip,
    /// Cut the corners off selected vertices.
    Truncate,
    /// A quad across every edge.
    Join,
    /// Two triangles across every edge.
    Needle,
    /// Pull faces apart, filling edges with quads and vertices with polygons.
    Expand,
    /// A quad at every face corner.
    Ortho,
    /// Truncated expand.
    Bevel,
    /// Two triangles along every face edge.
    Meta,
    /// A pentagon per half-edge.
    Gyro,
    /// Dual of gyro.
    Snub,
    /// Midpoint polygon plus corner triangles.
    Subdivide,
    /// Inset faces joined by hexagons.
    Chamfer,
    /// Inset and raise selected faces, adding side quads.
    Loft,
    /// Push selected faces out along their normal.
    Extrude,
    /// Loft with triangulated sides.
    Lace,
    /// Lace with the other diagonal.
    OppositeLace,
    /// Loft with a fanned cap.
    Stake,
    /// Inner face plus corner pentagons.
    Quinto,
    /// Central face plus one quad vane per corner.
    Propeller,
    /// Central face plus one hexagon per edge.
    Whirl,
    /// Dual of whirl.
    Volute,
    /// Needle applied twice.
    Exalt,
    /// Zip applied twice.
    Yank,
    /// Split selected faces with four or more sides in two.
    SplitFaces,
    /// Scale selected vertices about their neighbourhood.
    VertexScale,
    /// Rotate selected vertices about their normal.
    VertexRotate,
    /// Move selected vertices along their normal.
    VertexFlex,
    /// Scale selected faces about their centroid.
    FaceScale,
    /// Rotate selected faces about their normal.
    FaceRotate,
    /// Slide selected faces within their plane.
    FaceSlide,
    /// Move selected faces along their normal.
    FaceOffset,
    /// Thicken into a closed solid.
    Shell,
    /// Blend toward a sphere.
    Spherize,
    /// Blend toward a cylinder around the Y axis.
    Cylinderize,
    /// Scale along Y.
    Stretch,
    /// Move the centroid to the origin.
    Recenter,
    /// Rest a chosen face on the ground plane.
    SitLevel,
    /// Tangentify edges and planarize faces.
    Canonicalize,
    /// Delete selected faces.
    FaceRemove,
    /// Delete unselected faces.
    FaceKeep,
    /// Delete selected vertices and their faces.
    VertexRemove,
    /// Delete unselected vertices and their faces.
    VertexKeep,
    /// Merge groups of adjacent selected faces.
    FaceMerge,
    /// Append the scaled dual.
    AddDual,
    /// Append a copy shifted along X.
    AddCopyX,
    /// Append a copy shifted along Y.
    AddCopyY,
    /// Append a copy shifted along Z.
    AddCopyZ,
    /// Append a copy mirrored across X.
    AddMirrorX,
    /// Append a copy mirrored across Y.
    AddMirrorY,
    /// Append a copy mirrored across Z.
    AddMirrorZ,
    /// Repeatedly loft the newest caps.
    Stack,
    /// Merge coincident vertices.
    Weld,
    /// Close open boundary loops.
    FillHoles,
    /// Cut along a horizontal plane.
    Slice,
}

impl Operator {
    /// Number of operators. `Slice` is the last variant.
    pub const COUNT: usize = Operator::Slice as usize + 1;

    /// Every operator, in declaration order.
    pub const ALL: [Operator; Operator::COUNT] = {
        use Operator::*;
        [
            Identity, Kis, Dual, Ambo, Zip, Truncate, Join, Needle, Expand, Ortho, Bevel, Meta,
            Gyro, Snub, Subdivide, Chamfer, Loft, Extrude, Lace, OppositeLace, Stake, Quinto,
            Propeller, Whirl, Volute, Exalt, Yank, SplitFaces, VertexScale, VertexRotate,
            VertexFlex, FaceScale, FaceRotate, FaceSlide, FaceOffset, Shell, Spherize,
            Cylinderize, Stretch, Recenter, SitLevel, Canonicalize, FaceRemove, FaceKeep,
            VertexRemove, VertexKeep, FaceMerge, AddDual, AddCopyX, AddCopyY, AddCopyZ,
            AddMirrorX, AddMirrorY, AddMirrorZ, Stack, Weld, FillHoles, Slice,
        ]
    };

    /// Run the operator.
    ///
    /// # Errors
    /// Only caller-checkable preconditions fail:
    /// * [`MeshError::InvalidParameter`] if an amount the operator reads is
    ///   NaN or infinite
    /// * [`MeshError::FaceOutOfRange`] from [`SitLevel`](Operator::SitLevel)
    ///   with a face index out of range
    pub fn apply(self, mesh: &HalfEdgeMesh, params: &OpParams) -> Result<HalfEdgeMesh> {
        use Operator::*;
        let config = self.config();
        if config.uses_a && !params.value_a.is_finite() {
            return Err(MeshError::invalid_param("value_a", params.value_a, "must be finite"));
        }
        if config.uses_b && !params.value_b.is_finite() {
            return Err(MeshError::invalid_param("value_b", params.value_b, "must be finite"));
        }
        debug!(
            op = ?self,
            vertices = mesh.num_vertices(),
            faces = mesh.num_faces(),
            "applying operator"
        );
        let out = match self {
            Identity => mesh.duplicate(),
            Kis => conway::kis(mesh, params),
            Dual => conway::dual(mesh),
            Ambo => conway::ambo(mesh),
            Zip => conway::zip(mesh, params),
            Truncate => conway::truncate(mesh, params),
            Join => conway::join(mesh, params),
            Needle => conway::needle(mesh, params),
            Expand => conway::expand(mesh, params),
            Ortho => conway::ortho(mesh, params),
            Bevel => conway::bevel(mesh, params),
            Meta => conway::meta(mesh, params),
            Subdivide => conway::subdivide(mesh, params),
            Chamfer => conway::chamfer(mesh, params),
            Quinto => conway::quinto(mesh, params),
            Exalt => conway::needle(&conway::needle(mesh, params), params),
            Yank => conway::zip(&conway::zip(mesh, params), params),
            Gyro => chiral::gyro(mesh, params),
            Snub => chiral::snub(mesh, params),
            Propeller => chiral::propeller(mesh, params),
            Whirl => chiral::whirl(mesh, params),
            Volute => conway::dual(&chiral::whirl(mesh, params)),
            Loft => inset::loft(mesh, params),
            Extrude => inset::extrude(mesh, params),
            Lace => inset::lace(mesh, params, false),
            OppositeLace => inset::lace(mesh, params, true),
            Stake => inset::stake(mesh, params),
            Stack => inset::stack(mesh, params),
            SplitFaces => boundary::split_faces(mesh, params),
            VertexScale => element::vertex_scale(mesh, params),
            VertexRotate => element::vertex_rotate(mesh, params),
            VertexFlex => element::vertex_flex(mesh, params),
            FaceScale => element::face_scale(mesh, params),
            FaceRotate => element::face_rotate(mesh, params),
            FaceSlide => element::face_slide(mesh, params),
            FaceOffset => element::face_offset(mesh, params),
            Shell => element::shell(mesh, params),
            Spherize => shape::spherize(mesh, params),
            Cylinderize => shape::cylinderize(mesh, params),
            Stretch => shape::stretch(mesh, params),
            Recenter => shape::recenter(mesh),
            SitLevel => shape::sit_level(mesh, params)?,
            Canonicalize => shape::canonicalize(mesh, params),
            FaceRemove => boundary::face_remove(mesh, params, false),
            FaceKeep => boundary::face_remove(mesh, params, true),
            VertexRemove => boundary::vertex_remove(mesh, params, false),
            VertexKeep => boundary::vertex_remove(mesh, params, true),
            FaceMerge => boundary::face_merge(mesh, params),
            AddDual => mesh.add_dual(params.value_a),
            AddCopyX => mesh.add_copy(Axis::X, params.value_a),
            AddCopyY => mesh.add_copy(Axis::Y, params.value_a),
            AddCopyZ => mesh.add_copy(Axis::Z, params.value_a),
            AddMirrorX => mesh.add_mirror(Axis::X, params.value_a),
            AddMirrorY => mesh.add_mirror(Axis::Y, params.value_a),
            AddMirrorZ => mesh.add_mirror(Axis::Z, params.value_a),
            Weld => crate::repair::weld(mesh, params.value_a),
            FillHoles => crate::repair::fill_holes(mesh),
            Slice => crate::slice::slice_at_height(mesh, params.value_a),
        };
        debug!(
            op = ?self,
            vertices = out.num_vertices(),
            faces = out.num_faces(),
            "operator done"
        );
        Ok(out)
    }
}
