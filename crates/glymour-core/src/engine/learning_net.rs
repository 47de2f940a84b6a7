//! PC-algorithm skeleton learner.
//!
//! [`LearningNet`] holds the candidate skeleton, the round counter and the
//! directed-edge accumulator. Each [`step`](LearningNet::step) is one round of
//! the cardinality sweep:
//!
//! 1. Snapshot the current skeleton.
//! 2. For every edge `a–b` of the snapshot, draw conditioning sets of size
//!    `n + 1` from `adjacent_either(a, b) ∩ verts_on_paths(a, b)` (minus the
//!    endpoints) and ask the oracle about each, stopping at the first
//!    independence.
//! 3. Apply every decided removal to the snapshot at once, producing the next
//!    skeleton value.
//!
//! Decisions are made against an immutable snapshot, so the result of a round
//! does not depend on edge visiting order. With the `parallel` feature the
//! edges of one round are evaluated on the rayon pool; removals are still
//! applied after the round in edge order.
//!
//! [`learn_structure`](LearningNet::learn_structure) runs the sweep until the
//! conditioning cardinality exceeds `|vertices| − 2` and then orients
//! colliders.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::engine::algorithms::AdjacencyIndex;
use crate::engine::errors::{LearnError, OracleError};
use crate::engine::graph::{DirectedEdges, DirectedGraph, UndirectedGraph, Vertex};
use crate::engine::oracle::IndependenceOracle;
use crate::engine::orient::orient_colliders;
use crate::engine::orientations::compatible_orientations;
use crate::engine::power_set::subsets_of_size;

/// Default false-rejection probability handed to the oracle.
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;

/// When the cardinality sweep stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SweepRule {
    /// Test every cardinality up to `|vertices| − 2`, even after rounds that
    /// removed nothing.
    #[default]
    Exhaustive,
    /// Stop after the first round that removes no edge.
    ///
    /// Can miss independences that only show up at a higher cardinality.
    UntilStable,
}

/// Configuration for skeleton learning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearnerConfig {
    /// False-rejection probability passed to the oracle, in `(0, 1)`.
    pub significance: f64,
    /// Stopping rule for the cardinality sweep.
    pub sweep: SweepRule,
    /// Largest conditioning-set size to test. `None` tests up to
    /// `|vertices| − 2`.
    pub max_depth: Option<usize>,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
            sweep: SweepRule::Exhaustive,
            max_depth: None,
        }
    }
}

impl LearnerConfig {
    pub fn validate(self) -> Result<Self, LearnError> {
        if !(self.significance > 0.0 && self.significance < 1.0) {
            return Err(LearnError::Validation(format!(
                "learn_structure: significance must be in (0, 1), got {}",
                self.significance
            )));
        }
        Ok(self)
    }
}

/// A recovered oracle failure. The edge involved was kept (or, during
/// orientation, the test counted as dependent).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OracleFailure<V> {
    pub pair: (V, V),
    pub conditioning: Vec<V>,
    pub error: OracleError,
}

/// What one round of the sweep did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepReport {
    /// Conditioning-set size tested in this round (`n + 1`).
    pub depth: usize,
    /// Edges present at the start of the round.
    pub edges_considered: usize,
    /// Edges skipped because too few separation candidates remained.
    pub edges_skipped: usize,
    pub oracle_calls: usize,
    pub oracle_failures: usize,
    pub edges_removed: usize,
}

/// Runtime diagnostics accumulated over a learning run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearningDiagnostics<V> {
    /// One entry per completed round, in order.
    pub rounds: Vec<StepReport>,
    /// Oracle calls made while orienting colliders.
    pub orientation_oracle_calls: usize,
    /// Every recovered oracle failure, skeleton and orientation phases alike.
    pub oracle_failures: Vec<OracleFailure<V>>,
}

impl<V> Default for LearningDiagnostics<V> {
    fn default() -> Self {
        Self {
            rounds: Vec::new(),
            orientation_oracle_calls: 0,
            oracle_failures: Vec::new(),
        }
    }
}

impl<V> LearningDiagnostics<V> {
    pub fn total_oracle_calls(&self) -> usize {
        self.rounds.iter().map(|r| r.oracle_calls).sum::<usize>() + self.orientation_oracle_calls
    }

    pub fn edges_removed(&self) -> usize {
        self.rounds.iter().map(|r| r.edges_removed).sum()
    }
}

/// Conditioning set that separated each removed edge, keyed `(smaller, larger)`.
pub type SeparatingSets<V> = BTreeMap<(V, V), Vec<V>>;

/// The result of a learning run.
#[derive(Debug, Clone)]
pub struct LearnedStructure<V: Vertex> {
    pub skeleton: UndirectedGraph<V>,
    pub directed_edges: DirectedEdges<V>,
    pub separating_sets: SeparatingSets<V>,
    pub diagnostics: LearningDiagnostics<V>,
}

/// Outcome of testing one edge against one snapshot.
struct EdgeDecision<V> {
    edge: (V, V),
    skipped: bool,
    separating_set: Option<Vec<V>>,
    oracle_calls: usize,
    failures: Vec<OracleFailure<V>>,
}

/// PC learner over vertices `V`, asking oracle `O`.
pub struct LearningNet<V: Vertex, O> {
    net: UndirectedGraph<V>,
    directed_edges: DirectedEdges<V>,
    separating_sets: SeparatingSets<V>,
    history: Vec<UndirectedGraph<V>>,
    /// Conditioning-set size the next step tests; the PC counter `n` is `depth - 1`.
    depth: usize,
    oracle: O,
    config: LearnerConfig,
    diagnostics: LearningDiagnostics<V>,
}

impl<V: Vertex, O: IndependenceOracle<V>> LearningNet<V, O> {
    /// Starts from the complete graph over `vertices`.
    ///
    /// Fails with [`LearnError::Input`] for fewer than two distinct vertices
    /// and [`LearnError::Validation`] for an invalid config.
    pub fn new(
        vertices: impl IntoIterator<Item = V>,
        oracle: O,
        config: LearnerConfig,
    ) -> Result<Self, LearnError> {
        let config = config.validate()?;
        let vertices: BTreeSet<V> = vertices.into_iter().collect();
        if vertices.len() < 2 {
            return Err(LearnError::Input(format!(
                "structure learning needs at least 2 variables, got {}",
                vertices.len()
            )));
        }

        Ok(Self {
            net: UndirectedGraph::complete(vertices),
            directed_edges: DirectedEdges::new(),
            separating_sets: SeparatingSets::new(),
            history: Vec::new(),
            depth: 0,
            oracle,
            config,
            diagnostics: LearningDiagnostics::default(),
        })
    }

    /// The current candidate skeleton.
    pub fn net(&self) -> &UndirectedGraph<V> {
        &self.net
    }

    /// Directions recorded by collider orientation.
    pub fn directed_edges(&self) -> &DirectedEdges<V> {
        &self.directed_edges
    }

    pub fn separating_sets(&self) -> &SeparatingSets<V> {
        &self.separating_sets
    }

    pub fn diagnostics(&self) -> &LearningDiagnostics<V> {
        &self.diagnostics
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.config
    }

    /// Skeleton snapshots taken at the start of each completed round.
    pub fn history(&self) -> &[UndirectedGraph<V>] {
        &self.history
    }

    /// The PC round counter `n`: the next step tests sets of `n + 1`
    /// vertices. Starts at `-1`.
    pub fn n(&self) -> isize {
        self.depth as isize - 1
    }

    /// Conditioning-set size the next step tests (`n + 1`).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Largest conditioning-set size the sweep will test.
    pub fn depth_bound(&self) -> usize {
        let exhaustive = self.net.vertex_count().saturating_sub(2);
        match self.config.max_depth {
            Some(cap) => cap.min(exhaustive),
            None => exhaustive,
        }
    }

    /// Whether another round is within the cardinality bound.
    pub fn can_step(&self) -> bool {
        self.depth <= self.depth_bound()
    }

    /// Runs one round of the sweep and increments `n`.
    ///
    /// Returns whether any edge was removed.
    pub fn step(&mut self) -> bool {
        let snapshot = self.net.clone();
        let depth = self.depth;
        let edges = snapshot.edges();
        let index = AdjacencyIndex::new(&snapshot);

        #[cfg(feature = "parallel")]
        let decisions: Vec<EdgeDecision<V>> = edges
            .into_par_iter()
            .map(|edge| self.evaluate_edge(&index, edge, depth))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let decisions: Vec<EdgeDecision<V>> = edges
            .into_iter()
            .map(|edge| self.evaluate_edge(&index, edge, depth))
            .collect();

        let mut report = StepReport {
            depth,
            edges_considered: decisions.len(),
            ..StepReport::default()
        };
        let mut removals = Vec::new();

        for decision in decisions {
            report.oracle_calls += decision.oracle_calls;
            report.oracle_failures += decision.failures.len();
            if decision.skipped {
                report.edges_skipped += 1;
            }
            self.diagnostics.oracle_failures.extend(decision.failures);

            if let Some(separating_set) = decision.separating_set {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    a = ?decision.edge.0,
                    b = ?decision.edge.1,
                    given = ?separating_set,
                    "removing edge"
                );
                self.separating_sets
                    .insert(decision.edge.clone(), separating_set);
                removals.push(decision.edge);
            }
        }

        report.edges_removed = removals.len();
        let removed_any = !removals.is_empty();
        self.net = if removed_any {
            snapshot.without_edges(removals)
        } else {
            snapshot.clone()
        };
        self.history.push(snapshot);
        self.depth += 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            depth = report.depth,
            edges = report.edges_considered,
            skipped = report.edges_skipped,
            calls = report.oracle_calls,
            removed = report.edges_removed,
            "completed PC round"
        );
        self.diagnostics.rounds.push(report);

        removed_any
    }

    /// Runs the full PC algorithm: the cardinality sweep under the configured
    /// [`SweepRule`], then collider orientation over the final skeleton.
    ///
    /// Always terminates; returns the complete graph unchanged when nothing
    /// could be separated.
    pub fn learn_structure(&mut self) -> LearnedStructure<V> {
        while self.can_step() {
            let removed = self.step();
            if self.config.sweep == SweepRule::UntilStable && !removed {
                break;
            }
        }

        self.orient();

        #[cfg(feature = "tracing")]
        tracing::info!(
            rounds = self.diagnostics.rounds.len(),
            edges = self.net.edge_count(),
            oriented = self.directed_edges.len(),
            oracle_failures = self.diagnostics.oracle_failures.len(),
            "learned structure"
        );

        self.structure()
    }

    /// Orients colliders over the current skeleton into the accumulator.
    ///
    /// Called by [`learn_structure`](Self::learn_structure); exposed for
    /// callers that drive [`step`](Self::step) themselves.
    pub fn orient(&mut self) {
        let report = orient_colliders(
            &self.net,
            &self.oracle,
            self.config.significance,
            &mut self.directed_edges,
        );
        self.diagnostics.orientation_oracle_calls += report.oracle_calls;
        self.diagnostics.oracle_failures.extend(report.failures);
    }

    /// Snapshot of the current learning state.
    pub fn structure(&self) -> LearnedStructure<V> {
        LearnedStructure {
            skeleton: self.net.clone(),
            directed_edges: self.directed_edges.clone(),
            separating_sets: self.separating_sets.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }

    /// Every DAG over the current skeleton that honors the recorded
    /// directions. See [`compatible_orientations`].
    pub fn compatible_orientations(&self) -> Result<Vec<DirectedGraph<V>>, LearnError> {
        compatible_orientations(&self.net, &self.directed_edges)
    }

    fn evaluate_edge(
        &self,
        index: &AdjacencyIndex<V>,
        edge: (V, V),
        depth: usize,
    ) -> EdgeDecision<V> {
        let mut decision = EdgeDecision {
            edge,
            skipped: false,
            separating_set: None,
            oracle_calls: 0,
            failures: Vec::new(),
        };
        let (a, b) = (&decision.edge.0, &decision.edge.1);

        // Only the empty set is drawn at depth 0, so no path search is needed.
        let pool: Vec<V> = if depth == 0 {
            Vec::new()
        } else {
            // |S| <= n, i.e. |S| < n + 1
            let candidates = index.separation_candidates(a, b);
            if candidates.len() < depth {
                decision.skipped = true;
                return decision;
            }
            candidates
                .into_iter()
                .filter(|v| v != a && v != b)
                .collect()
        };

        for given in subsets_of_size(&pool, depth) {
            decision.oracle_calls += 1;
            match self
                .oracle
                .independent(self.config.significance, a, b, &given)
            {
                Ok(true) => {
                    decision.separating_set = Some(given);
                    break;
                }
                Ok(false) => {}
                Err(error) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(
                        a = ?a,
                        b = ?b,
                        given = ?given,
                        %error,
                        "independence test failed; keeping edge"
                    );
                    decision.failures.push(OracleFailure {
                        pair: (a.clone(), b.clone()),
                        conditioning: given,
                        error,
                    });
                }
            }
        }

        decision
    }
}
