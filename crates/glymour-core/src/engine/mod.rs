//! The structure-learning engine.
//!
//! This module provides:
//! - **errors**: Error types for learning and oracle failures
//! - **graph**: Persistent undirected/directed graph values
//! - **algorithms**: Adjacency union, simple-path vertices, open triples
//! - **power_set**: Subset enumeration
//! - **oracle**: The conditional-independence oracle seam
//! - **learning_net**: The PC skeleton learner
//! - **orient**: Collider orientation
//! - **orientations**: Enumeration of acyclic completions
//! - **bayes_net**: Named network structure export

pub mod algorithms;
pub mod bayes_net;
pub mod errors;
pub mod graph;
pub mod learning_net;
pub mod oracle;
pub mod orient;
pub mod orientations;
pub mod power_set;
