//! Selection predicates.
//!
//! Every per-element operator asks one question of each face or vertex it
//! visits: is this element included? A [`Filter`] answers it from three parts:
//!
//! - a built-in [`Selection`] category (side count, facing, role, index,
//!   position and size tests)
//! - an optional [`TagQuery`] that must intersect the face's tag names
//! - an optional [`Predicate`] closure which, when present, overrides both
//!
//! Categories that compare against whole-mesh statistics (mean area, mean
//! distance from the centroid) compute them once per [`FaceFilter`] or
//! [`VertexFilter`], on first use.
//!
//! The frame is Y-up. `FacingForward` means the normal points along `+z`.

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use nalgebra::{Point3, Vector3};
use rand::Rng;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::mesh::{FaceId, HalfEdgeMesh, Role, TagSet, VertexId};
use crate::DIRECTION_TOLERANCE;

/// Built-in element categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Selection {
    /// Every element.
    #[default]
    All,
    /// No element.
    None,
    /// Triangles (vertices of valence 3).
    ThreeSided,
    /// Quads.
    FourSided,
    /// Pentagons.
    FiveSided,
    /// Hexagons.
    SixSided,
    /// Heptagons.
    SevenSided,
    /// Octagons.
    EightSided,
    /// Nonagons.
    NineSided,
    /// Decagons.
    TenSided,
    /// Hendecagons.
    ElevenSided,
    /// Dodecagons.
    TwelveSided,
    /// Even side count.
    EvenSided,
    /// Odd side count.
    OddSided,
    /// Normal has a positive `y` component.
    FacingUp,
    /// Normal has a negative `y` component.
    FacingDown,
    /// Normal is (nearly) `+y`.
    FacingStraightUp,
    /// Normal is (nearly) `-y`.
    FacingStraightDown,
    /// Normal is (nearly) horizontal.
    FacingLevel,
    /// Normal has a positive `z` component.
    FacingForward,
    /// Normal has a negative `z` component.
    FacingBackward,
    /// Normal points toward the origin.
    FacingIn,
    /// Normal points away from the origin.
    FacingOut,
    /// Role is `Existing`.
    Existing,
    /// Role is `ExistingAlt`.
    ExistingAlt,
    /// Role is `New`.
    New,
    /// Role is `NewAlt`.
    NewAlt,
    /// Role is `New` or `NewAlt`.
    AllNew,
    /// Role is `Ignored`.
    Ignored,
    /// Odd index.
    Odd,
    /// Even index.
    Even,
    /// Index 0 only.
    OnlyFirst,
    /// Every index but 0.
    ExceptFirst,
    /// The last index only.
    OnlyLast,
    /// Every index but the last.
    ExceptLast,
    /// A coin flip per element.
    Random,
    /// Not on an open boundary.
    Inner,
    /// On an open boundary.
    Outer,
    /// Area below the mean.
    Smaller,
    /// Area above the mean.
    Larger,
    /// Centroid above `y = 0`.
    TopHalf,
    /// Centroid below `y = 0`.
    BottomHalf,
    /// Closer to the mesh centroid than the mean.
    Closer,
    /// Further from the mesh centroid than the mean.
    Further,
}

impl Selection {
    /// Side count this category requires, if it is one of the n-sided ones.
    fn sides(self) -> Option<usize> {
        match self {
            Selection::ThreeSided => Some(3),
            Selection::FourSided => Some(4),
            Selection::FiveSided => Some(5),
            Selection::SixSided => Some(6),
            Selection::SevenSided => Some(7),
            Selection::EightSided => Some(8),
            Selection::NineSided => Some(9),
            Selection::TenSided => Some(10),
            Selection::ElevenSided => Some(11),
            Selection::TwelveSided => Some(12),
            _ => None,
        }
    }
}

/// Tag names a face must carry at least one of.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagQuery(Vec<String>);

impl TagQuery {
    /// Parse a comma-delimited list of tag names.
    pub fn parse(list: &str) -> Self {
        Self(
            list.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    /// Whether any queried name appears in `tags`.
    pub fn matches(&self, tags: &TagSet) -> bool {
        self.0.iter().any(|name| tags.contains_name(name))
    }

    /// Whether the query names nothing.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The element a predicate or parameter function is asked about.
#[derive(Debug, Clone, Copy)]
pub struct FilterParams<'a> {
    /// The mesh being filtered.
    pub mesh: &'a HalfEdgeMesh,
    /// Index of the face or vertex. Which one depends on the caller: face
    /// filters and face operators pass faces, vertex filters and vertex
    /// operators pass vertices.
    pub index: usize,
}

impl<'a> FilterParams<'a> {
    /// Create filter params for an element.
    pub fn new(mesh: &'a HalfEdgeMesh, index: usize) -> Self {
        Self { mesh, index }
    }

    /// The element as a face ID.
    #[inline]
    pub fn face(&self) -> FaceId {
        FaceId::new(self.index)
    }

    /// The element as a vertex ID.
    #[inline]
    pub fn vertex(&self) -> VertexId {
        VertexId::new(self.index)
    }
}

/// A caller-supplied inclusion test.
#[derive(Clone)]
pub struct Predicate(Arc<dyn Fn(&FilterParams) -> bool + Send + Sync>);

impl Predicate {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FilterParams) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluate the predicate.
    #[inline]
    pub fn test(&self, params: &FilterParams) -> bool {
        (self.0)(params)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Which elements an operator touches.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    /// Built-in category.
    pub selection: Selection,
    /// Optional tag names, intersected with each face's tags.
    pub tags: Option<TagQuery>,
    /// Optional closure; when set it alone decides.
    pub predicate: Option<Predicate>,
}

impl Filter {
    /// Filter on a built-in category.
    pub fn new(selection: Selection) -> Self {
        Self {
            selection,
            ..Default::default()
        }
    }

    /// Select everything.
    pub fn all() -> Self {
        Self::new(Selection::All)
    }

    /// Select nothing.
    pub fn none() -> Self {
        Self::new(Selection::None)
    }

    /// Also require one of these comma-delimited tag names.
    pub fn with_tags(mut self, list: &str) -> Self {
        let query = TagQuery::parse(list);
        self.tags = (!query.is_empty()).then_some(query);
        self
    }

    /// Decide inclusion with a closure instead.
    pub fn with_predicate<F>(mut self, f: F) -> Self
    where
        F: Fn(&FilterParams) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Predicate::new(f));
        self
    }
}

impl From<Selection> for Filter {
    fn from(selection: Selection) -> Self {
        Self::new(selection)
    }
}

/// The per-element facts a category is evaluated against.
struct Probe {
    index: usize,
    count: usize,
    sides: usize,
    normal: Vector3<f64>,
    centre: Point3<f64>,
    role: Role,
    boundary: bool,
}

/// Shared category evaluation for faces and vertices.
///
/// `mean_size` and `mean_distance` are only called by the categories that need them.
fn matches_category<R: Rng + ?Sized>(
    selection: Selection,
    probe: &Probe,
    size: impl FnOnce() -> (f64, f64),
    distance: impl FnOnce() -> (f64, f64),
    rng: &mut R,
) -> bool {
    let tol = DIRECTION_TOLERANCE;
    let n = &probe.normal;
    match selection {
        Selection::All => true,
        Selection::None => false,
        Selection::EvenSided => probe.sides % 2 == 0,
        Selection::OddSided => probe.sides % 2 == 1,
        Selection::FacingUp => n.y > tol,
        Selection::FacingDown => n.y < -tol,
        Selection::FacingStraightUp => n.y > 1.0 - tol,
        Selection::FacingStraightDown => n.y < -1.0 + tol,
        Selection::FacingLevel => n.y.abs() < tol,
        Selection::FacingForward => n.z > tol,
        Selection::FacingBackward => n.z < -tol,
        Selection::FacingIn => n.dot(&probe.centre.coords) < 0.0,
        Selection::FacingOut => n.dot(&probe.centre.coords) > 0.0,
        Selection::Existing => probe.role == Role::Existing,
        Selection::ExistingAlt => probe.role == Role::ExistingAlt,
        Selection::New => probe.role == Role::New,
        Selection::NewAlt => probe.role == Role::NewAlt,
        Selection::AllNew => probe.role.is_new(),
        Selection::Ignored => probe.role == Role::Ignored,
        Selection::Odd => probe.index % 2 == 1,
        Selection::Even => probe.index % 2 == 0,
        Selection::OnlyFirst => probe.index == 0,
        Selection::ExceptFirst => probe.index != 0,
        Selection::OnlyLast => probe.index + 1 == probe.count,
        Selection::ExceptLast => probe.index + 1 != probe.count,
        Selection::Random => rng.gen::<f64>() < 0.5,
        Selection::Inner => !probe.boundary,
        Selection::Outer => probe.boundary,
        Selection::Smaller => {
            let (value, mean) = size();
            value < mean
        }
        Selection::Larger => {
            let (value, mean) = size();
            value > mean
        }
        Selection::TopHalf => probe.centre.y > 0.0,
        Selection::BottomHalf => probe.centre.y < 0.0,
        Selection::Closer => {
            let (value, mean) = distance();
            value < mean
        }
        Selection::Further => {
            let (value, mean) = distance();
            value > mean
        }
        other => other.sides() == Some(probe.sides),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// A [`Filter`] bound to one mesh's faces.
pub struct FaceFilter<'a> {
    mesh: &'a HalfEdgeMesh,
    filter: &'a Filter,
    mean_area: OnceCell<f64>,
    mean_distance: OnceCell<f64>,
}

impl<'a> FaceFilter<'a> {
    /// Bind `filter` to `mesh`.
    pub fn new(mesh: &'a HalfEdgeMesh, filter: &'a Filter) -> Self {
        Self {
            mesh,
            filter,
            mean_area: OnceCell::new(),
            mean_distance: OnceCell::new(),
        }
    }

    fn mean_area(&self) -> f64 {
        *self.mean_area.get_or_init(|| {
            mean(
                self.mesh
                    .face_ids()
                    .map(|f| self.mesh.face_area(f))
                    .filter(|&a| a > f64::EPSILON),
            )
        })
    }

    fn mean_distance(&self) -> f64 {
        *self.mean_distance.get_or_init(|| {
            let c = self.mesh.centroid();
            mean(
                self.mesh
                    .face_ids()
                    .map(|f| (self.mesh.face_centroid(f) - c).norm()),
            )
        })
    }

    /// Whether face `f` is selected.
    pub fn include<R: Rng + ?Sized>(&self, f: FaceId, rng: &mut R) -> bool {
        let mesh = self.mesh;
        if let Some(predicate) = &self.filter.predicate {
            return predicate.test(&FilterParams::new(mesh, f.index()));
        }
        let probe = Probe {
            index: f.index(),
            count: mesh.num_faces(),
            sides: mesh.face_sides(f),
            normal: mesh.face_normal(f),
            centre: mesh.face_centroid(f),
            role: mesh.face_role(f),
            boundary: mesh.is_boundary_face(f),
        };
        let hit = matches_category(
            self.filter.selection,
            &probe,
            || (mesh.face_area(f), self.mean_area()),
            || ((probe.centre - mesh.centroid()).norm(), self.mean_distance()),
            rng,
        );
        hit && self
            .filter
            .tags
            .as_ref()
            .map_or(true, |q| q.matches(mesh.tags(f)))
    }

    /// Evaluate every face in index order.
    pub fn mask<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        self.mesh.face_ids().map(|f| self.include(f, rng)).collect()
    }
}

/// A [`Filter`] bound to one mesh's vertices.
///
/// Categories read vertex data: valence for side counts, the vertex normal
/// for facing, the vertex role, boundary membership, the mean area of the
/// incident faces for size, and the tags of the incident faces.
pub struct VertexFilter<'a> {
    mesh: &'a HalfEdgeMesh,
    filter: &'a Filter,
    mean_area: OnceCell<f64>,
    mean_distance: OnceCell<f64>,
}

impl<'a> VertexFilter<'a> {
    /// Bind `filter` to `mesh`.
    pub fn new(mesh: &'a HalfEdgeMesh, filter: &'a Filter) -> Self {
        Self {
            mesh,
            filter,
            mean_area: OnceCell::new(),
            mean_distance: OnceCell::new(),
        }
    }

    fn vertex_area(&self, v: VertexId) -> f64 {
        mean(
            self.mesh
                .vertex_faces(v)
                .into_iter()
                .map(|f| self.mesh.face_area(f)),
        )
    }

    fn mean_area(&self) -> f64 {
        *self.mean_area.get_or_init(|| {
            mean(
                self.mesh
                    .vertex_ids()
                    .map(|v| self.vertex_area(v))
                    .filter(|&a| a > f64::EPSILON),
            )
        })
    }

    fn mean_distance(&self) -> f64 {
        *self.mean_distance.get_or_init(|| {
            let c = self.mesh.centroid();
            mean(self.mesh.vertices().map(|(_, v)| (v.position - c).norm()))
        })
    }

    /// Whether vertex `v` is selected.
    pub fn include<R: Rng + ?Sized>(&self, v: VertexId, rng: &mut R) -> bool {
        let mesh = self.mesh;
        if let Some(predicate) = &self.filter.predicate {
            return predicate.test(&FilterParams::new(mesh, v.index()));
        }
        let ring = mesh.vertex_ring(v);
        let probe = Probe {
            index: v.index(),
            count: mesh.num_vertices(),
            sides: mesh.valence(v),
            normal: mesh.vertex_normal(v),
            centre: *mesh.position(v),
            role: mesh.vertex_role(v),
            boundary: !ring.closed,
        };
        let hit = matches_category(
            self.filter.selection,
            &probe,
            || (self.vertex_area(v), self.mean_area()),
            || ((probe.centre - mesh.centroid()).norm(), self.mean_distance()),
            rng,
        );
        hit && self.filter.tags.as_ref().map_or(true, |q| {
            ring.outgoing
                .iter()
                .any(|&o| q.matches(mesh.tags(mesh.face_of(o))))
        })
    }

    /// Evaluate every vertex in index order.
    pub fn mask<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<bool> {
        self.mesh.vertex_ids().map(|v| self.include(v, rng)).collect()
    }
}

/// Whether face `index` of `mesh` passes `filter`.
///
/// Prefer [`FaceFilter`] when testing many faces of one mesh: it computes the
/// whole-mesh statistics once.
pub fn include_face<R: Rng + ?Sized>(
    mesh: &HalfEdgeMesh,
    index: usize,
    filter: &Filter,
    rng: &mut R,
) -> bool {
    FaceFilter::new(mesh, filter).include(FaceId::new(index), rng)
}

/// Whether vertex `index` of `mesh` passes `filter`.
pub fn include_vertex<R: Rng + ?Sized>(
    mesh: &HalfEdgeMesh,
    index: usize,
    filter: &Filter,
    rng: &mut R,
) -> bool {
    VertexFilter::new(mesh, filter).include(VertexId::new(index), rng)
}

impl HalfEdgeMesh {
    /// Copy of this mesh with `tags` added to every face `filter` selects.
    pub fn tag_faces<R: Rng + ?Sized>(&self, tags: &TagSet, filter: &Filter, rng: &mut R) -> HalfEdgeMesh {
        let mask = FaceFilter::new(self, filter).mask(rng);
        let mut out = self.clone();
        for (set, selected) in out.face_tags.iter_mut().zip(mask) {
            if selected {
                set.extend_from(tags);
            }
        }
        out
    }
}
