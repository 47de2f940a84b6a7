//! Enumeration of the acyclic completions of a partially directed skeleton.

use crate::engine::errors::LearnError;
use crate::engine::graph::{DirectedEdges, DirectedGraph, UndirectedGraph, Vertex};
use crate::engine::power_set::power_set;

/// Largest number of unoriented edges [`compatible_orientations`] accepts.
/// Every subset of the free edges is materialized.
pub const MAX_FREE_EDGES: usize = 16;

/// Returns every DAG over `skeleton` that keeps the directions recorded in
/// `fixed` and orients each remaining edge one way or the other.
///
/// A skeleton edge recorded in both directions is treated as unoriented.
/// Directions in `fixed` that are not skeleton edges are ignored. The result
/// has at most `2^E` graphs for `E` unoriented edges, in power-set order.
///
/// Fails with [`LearnError::Validation`] when `E > MAX_FREE_EDGES`.
pub fn compatible_orientations<V: Vertex>(
    skeleton: &UndirectedGraph<V>,
    fixed: &DirectedEdges<V>,
) -> Result<Vec<DirectedGraph<V>>, LearnError> {
    let mut oriented = DirectedEdges::new();
    let mut free = Vec::new();

    for (a, b) in skeleton.edges() {
        match (fixed.contains(&a, &b), fixed.contains(&b, &a)) {
            (true, false) => {
                oriented.insert(a, b);
            }
            (false, true) => {
                oriented.insert(b, a);
            }
            (conflict, _) => {
                if conflict {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        a = ?a,
                        b = ?b,
                        "edge oriented both ways; enumerating both directions"
                    );
                }
                free.push((a, b));
            }
        }
    }

    if free.len() > MAX_FREE_EDGES {
        return Err(LearnError::Validation(format!(
            "compatible_orientations: {} unoriented edges exceeds the limit of {}",
            free.len(),
            MAX_FREE_EDGES
        )));
    }

    let mut dags = Vec::new();
    for forward in power_set(&free) {
        let mut edges = oriented.clone();
        for (a, b) in &free {
            if forward.contains(&(a.clone(), b.clone())) {
                edges.insert(a.clone(), b.clone());
            } else {
                edges.insert(b.clone(), a.clone());
            }
        }

        let dag = DirectedGraph::from_edges(skeleton.vertex_iter().cloned(), &edges);
        if dag.is_acyclic() {
            check_completion(skeleton, &oriented, &dag)?;
            dags.push(dag);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        free_edges = free.len(),
        candidates = 1usize << free.len(),
        acyclic = dags.len(),
        "enumerated compatible orientations"
    );

    Ok(dags)
}

/// A retained graph must be acyclic, cover the skeleton edge for edge, and keep
/// every fixed direction. Anything else is a bug in the enumerator.
fn check_completion<V: Vertex>(
    skeleton: &UndirectedGraph<V>,
    oriented: &DirectedEdges<V>,
    dag: &DirectedGraph<V>,
) -> Result<(), LearnError> {
    if dag.edge_count() != skeleton.edge_count() {
        return Err(LearnError::Internal(format!(
            "orientation has {} edges, skeleton has {}",
            dag.edge_count(),
            skeleton.edge_count()
        )));
    }
    for (a, b) in skeleton.edges() {
        if dag.has_edge(&a, &b) == dag.has_edge(&b, &a) {
            return Err(LearnError::Internal(format!(
                "skeleton edge {:?}-{:?} not oriented exactly once",
                a, b
            )));
        }
    }
    for (src, dst) in oriented.iter() {
        if !dag.has_edge(src, dst) {
            return Err(LearnError::Internal(format!(
                "fixed direction {:?}->{:?} lost",
                src, dst
            )));
        }
    }
    if !dag.is_acyclic() {
        return Err(LearnError::Internal("retained orientation is cyclic".into()));
    }
    Ok(())
}
