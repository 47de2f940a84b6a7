//! Collider (v-structure) orientation over a learned skeleton.

use crate::engine::algorithms::{non_transitive, AdjacencyIndex};
use crate::engine::graph::{DirectedEdges, UndirectedGraph, Vertex};
use crate::engine::learning_net::OracleFailure;
use crate::engine::oracle::IndependenceOracle;
use crate::engine::power_set::power_set;

/// What one orientation pass did.
#[derive(Debug, Clone, PartialEq)]
pub struct OrientationReport<V> {
    pub triples_examined: usize,
    /// Triples whose middle vertex was judged a collider.
    pub colliders: usize,
    pub oracle_calls: usize,
    pub failures: Vec<OracleFailure<V>>,
}

impl<V> Default for OrientationReport<V> {
    fn default() -> Self {
        Self {
            triples_examined: 0,
            colliders: 0,
            oracle_calls: 0,
            failures: Vec::new(),
        }
    }
}

/// Records `a→b` and `c→b` for every open triple `a–b–c` of `skeleton` where
/// `a` and `c` are found dependent given every subset of
/// `adjacent_either(a, c) ∩ verts_on_paths(a, c)` that contains `b`.
///
/// The accumulator only grows: existing directions are never removed and
/// re-deriving one is a no-op. A failed oracle call counts as "not
/// independent" and is reported.
pub fn orient_colliders<V, O>(
    skeleton: &UndirectedGraph<V>,
    oracle: &O,
    threshold: f64,
    accumulator: &mut DirectedEdges<V>,
) -> OrientationReport<V>
where
    V: Vertex,
    O: IndependenceOracle<V> + ?Sized,
{
    let mut report = OrientationReport::default();
    let index = AdjacencyIndex::new(skeleton);

    for (a, b, c) in non_transitive(skeleton) {
        report.triples_examined += 1;

        let others: Vec<V> = index.separation_candidates(&a, &c)
            .into_iter()
            .filter(|v| v != &b)
            .collect();

        let mut separated = false;
        for mut given in power_set(&others) {
            given.push(b.clone());
            report.oracle_calls += 1;
            match oracle.independent(threshold, &a, &c, &given) {
                Ok(true) => {
                    separated = true;
                    break;
                }
                Ok(false) => {}
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        a = ?a,
                        c = ?c,
                        given = ?given,
                        %error,
                        "independence test failed during orientation; treating as dependent"
                    );
                    report.failures.push(OracleFailure {
                        pair: (a.clone(), c.clone()),
                        conditioning: given,
                        error,
                    });
                }
            }
        }

        if !separated {
            #[cfg(feature = "tracing")]
            tracing::debug!(a = ?a, b = ?b, c = ?c, "orienting collider");
            report.colliders += 1;
            accumulator.insert(a, b.clone());
            accumulator.insert(c, b);
        }
    }

    report
}
