//! The independence-oracle seam.
//!
//! The learner never computes statistics itself. It asks an
//! [`IndependenceOracle`] whether two vertices are independent given a
//! conditioning set, at a caller-chosen false-rejection probability.

use crate::engine::errors::OracleError;

/// Decides conditional independence between two vertices.
///
/// Implementations must be deterministic for a fixed data snapshot. Failures
/// are reported as [`OracleError`]; the learner treats them as "not
/// independent" and keeps the edge.
pub trait IndependenceOracle<V>: Send + Sync {
    /// Whether `a` and `b` are independent given `given` at significance
    /// `threshold` (a false-rejection probability in `(0, 1)`).
    fn independent(&self, threshold: f64, a: &V, b: &V, given: &[V]) -> Result<bool, OracleError>;
}

impl<V, O: IndependenceOracle<V> + ?Sized> IndependenceOracle<V> for &O {
    fn independent(&self, threshold: f64, a: &V, b: &V, given: &[V]) -> Result<bool, OracleError> {
        (**self).independent(threshold, a, b, given)
    }
}

impl<V, O: IndependenceOracle<V> + ?Sized> IndependenceOracle<V> for Box<O> {
    fn independent(&self, threshold: f64, a: &V, b: &V, given: &[V]) -> Result<bool, OracleError> {
        (**self).independent(threshold, a, b, given)
    }
}

/// An oracle backed by a closure.
///
/// ```
/// use glymour_core::engine::oracle::{from_fn, IndependenceOracle};
///
/// // Everything is independent of everything.
/// let oracle = from_fn(|_threshold: f64, _a: &u32, _b: &u32, _given: &[u32]| Ok(true));
/// assert_eq!(oracle.independent(0.05, &1, &2, &[]), Ok(true));
/// ```
pub struct FnOracle<F>(F);

/// Wraps `f` as an [`IndependenceOracle`].
pub fn from_fn<V, F>(f: F) -> FnOracle<F>
where
    F: Fn(f64, &V, &V, &[V]) -> Result<bool, OracleError> + Send + Sync,
{
    FnOracle(f)
}

impl<V, F> IndependenceOracle<V> for FnOracle<F>
where
    F: Fn(f64, &V, &V, &[V]) -> Result<bool, OracleError> + Send + Sync,
{
    fn independent(&self, threshold: f64, a: &V, b: &V, given: &[V]) -> Result<bool, OracleError> {
        (self.0)(threshold, a, b, given)
    }
}
