//! # Glymour Core
//!
//! PC-algorithm structure learning for Bayesian networks: skeleton discovery
//! by conditional-independence testing, collider orientation, and
//! enumeration of the compatible DAGs.

pub mod engine;
pub mod stats;

// Re-export commonly used types
pub use engine::errors::{LearnError, OracleError};
pub use engine::graph::{DirectedEdges, DirectedGraph, UndirectedGraph};
pub use engine::learning_net::{LearnedStructure, LearnerConfig, LearningNet, SweepRule};
pub use engine::oracle::{from_fn, IndependenceOracle};
pub use engine::orientations::compatible_orientations;
pub use stats::chi_square::ChiSquareOracle;
pub use stats::variable::{Variable, VariableContainer, VariableId};

/// Learns a skeleton and collider orientations from `container` with the
/// chi-square oracle.
///
/// Convenience wrapper around [`LearningNet::from_container`] and
/// [`LearningNet::learn_structure`].
pub fn learn_from_table<R>(
    container: &VariableContainer<R>,
    config: LearnerConfig,
) -> Result<LearnedStructure<VariableId>, LearnError> {
    let mut net = LearningNet::from_container(container, config)?;
    Ok(net.learn_structure())
}
