//! Operator parameters.

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::mesh::HalfEdgeMesh;
use crate::select::{Filter, FilterParams, Selection, TagQuery};

/// A per-element amount, computed from the element being rewritten.
///
/// The element is whatever the operator iterates over. Face operators pass a
/// face index in [`FilterParams::index`]. Operators that act on vertices
/// (Truncate and the vertex edits) pass a vertex index, so read it with
/// [`FilterParams::vertex`] there.
#[derive(Clone)]
pub struct ParamFn(Arc<dyn Fn(&FilterParams) -> f64 + Send + Sync>);

impl ParamFn {
    /// Wrap a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&FilterParams) -> f64 + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Evaluate for one element.
    #[inline]
    pub fn eval(&self, params: &FilterParams) -> f64 {
        (self.0)(params)
    }
}

impl fmt::Debug for ParamFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamFn(..)")
    }
}

/// Everything an operator reads besides the mesh.
///
/// # Example
/// ```
/// use hedra::ops::OpParams;
/// use hedra::select::Selection;
///
/// let params = OpParams::new()
///     .with_a(0.2)
///     .with_selection(Selection::FourSided)
///     .with_seed(42);
/// assert_eq!(params.value_a, 0.2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OpParams {
    /// Primary amount.
    pub value_a: f64,

    /// Secondary amount.
    pub value_b: f64,

    /// Per-element override for `value_a`.
    pub func_a: Option<ParamFn>,

    /// Per-element override for `value_b`.
    pub func_b: Option<ParamFn>,

    /// Which faces or vertices the operator touches.
    pub filter: Filter,

    /// Scale each resolved amount by a uniform draw in `[0, 1)`.
    pub randomize: bool,

    /// Seed for the operator's random generator. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl OpParams {
    /// Parameters with zero amounts that select everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the primary amount.
    pub fn with_a(mut self, a: f64) -> Self {
        self.value_a = a;
        self
    }

    /// Set the secondary amount.
    pub fn with_b(mut self, b: f64) -> Self {
        self.value_b = b;
        self
    }

    /// Replace the whole filter.
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Set the built-in selection category.
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.filter.selection = selection;
        self
    }

    /// Require one of these comma-delimited tag names.
    pub fn with_tags(mut self, list: &str) -> Self {
        let query = TagQuery::parse(list);
        self.filter.tags = (!query.is_empty()).then_some(query);
        self
    }

    /// Decide inclusion with a closure.
    pub fn with_predicate<F>(mut self, f: F) -> Self
    where
        F: Fn(&FilterParams) -> bool + Send + Sync + 'static,
    {
        self.filter = self.filter.with_predicate(f);
        self
    }

    /// Compute the primary amount per element.
    pub fn with_func_a<F>(mut self, f: F) -> Self
    where
        F: Fn(&FilterParams) -> f64 + Send + Sync + 'static,
    {
        self.func_a = Some(ParamFn::new(f));
        self
    }

    /// Compute the secondary amount per element.
    pub fn with_func_b<F>(mut self, f: F) -> Self
    where
        F: Fn(&FilterParams) -> f64 + Send + Sync + 'static,
    {
        self.func_b = Some(ParamFn::new(f));
        self
    }

    /// Turn on per-element randomization of the amounts.
    pub fn randomized(mut self, randomize: bool) -> Self {
        self.randomize = randomize;
        self
    }

    /// Fix the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// A fresh generator for one operator call.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn resolve<R: Rng + ?Sized>(
        &self,
        value: f64,
        func: Option<&ParamFn>,
        fp: &FilterParams,
        rng: &mut R,
    ) -> f64 {
        let amount = func.map_or(value, |f| f.eval(fp));
        if self.randomize {
            amount * rng.gen::<f64>()
        } else {
            amount
        }
    }

    /// The primary amount for one element.
    pub fn a_for<R: Rng + ?Sized>(&self, fp: &FilterParams, rng: &mut R) -> f64 {
        self.resolve(self.value_a, self.func_a.as_ref(), fp, rng)
    }

    /// The secondary amount for one element.
    pub fn b_for<R: Rng + ?Sized>(&self, fp: &FilterParams, rng: &mut R) -> f64 {
        self.resolve(self.value_b, self.func_b.as_ref(), fp, rng)
    }

    /// The primary amount for element `index` of `mesh`.
    pub fn a_at<R: Rng + ?Sized>(&self, mesh: &HalfEdgeMesh, index: usize, rng: &mut R) -> f64 {
        self.a_for(&FilterParams::new(mesh, index), rng)
    }

    /// The secondary amount for element `index` of `mesh`.
    pub fn b_at<R: Rng + ?Sized>(&self, mesh: &HalfEdgeMesh, index: usize, rng: &mut R) -> f64 {
        self.b_for(&FilterParams::new(mesh, index), rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::cube;

    #[test]
    fn test_scalar_amount() {
        let mesh = cube();
        let params = OpParams::new().with_a(0.25).with_b(-1.0);
        let mut rng = params.rng();
        assert_eq!(params.a_at(&mesh, 0, &mut rng), 0.25);
        assert_eq!(params.b_at(&mesh, 3, &mut rng), -1.0);
    }

    #[test]
    fn test_function_overrides_scalar() {
        let mesh = cube();
        let params = OpParams::new()
            .with_a(1.0)
            .with_func_a(|fp| fp.index as f64 * 0.5);
        let mut rng = params.rng();
        assert_eq!(params.a_at(&mesh, 4, &mut rng), 2.0);
    }

    #[test]
    fn test_randomized_is_scaled_and_seeded() {
        let mesh = cube();
        let params = OpParams::new().with_a(2.0).randomized(true).with_seed(9);
        let first: Vec<f64> = {
            let mut rng = params.rng();
            (0..6).map(|i| params.a_at(&mesh, i, &mut rng)).collect()
        };
        let second: Vec<f64> = {
            let mut rng = params.rng();
            (0..6).map(|i| params.a_at(&mesh, i, &mut rng)).collect()
        };
        assert_eq!(first, second);
        assert!(first.iter().all(|&a| (0.0..2.0).contains(&a)));
    }

    #[test]
    fn test_builder_sets_filter() {
        let params = OpParams::new()
            .with_selection(Selection::FacingUp)
            .with_tags("top");
        assert_eq!(params.filter.selection, Selection::FacingUp);
        assert!(params.filter.tags.is_some());
        assert!(params.filter.predicate.is_none());
    }
}
