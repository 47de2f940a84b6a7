//! Bayesian-network structure export.
//!
//! A learned DAG carries vertex identities. [`NetworkStructure`] is the
//! named, serializable form handed to downstream inference tooling: one node
//! per variable plus its parent list. Probability tables are not fitted here.

use std::collections::BTreeMap;

use crate::engine::errors::LearnError;
use crate::engine::graph::{DirectedGraph, Vertex};

/// Named node/parent structure of a Bayesian network.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NetworkStructure {
    pub title: String,
    /// Node names in a topological order of the source DAG.
    pub nodes: Vec<String>,
    /// Node name -> parent names, sorted. Every node has an entry.
    pub parents: BTreeMap<String, Vec<String>>,
}

impl NetworkStructure {
    /// Builds the structure of `dag`, naming vertices with `name`.
    ///
    /// Fails with [`LearnError::Input`] when `dag` has a directed cycle or two
    /// vertices share a name.
    pub fn from_dag<V, F>(title: impl Into<String>, dag: &DirectedGraph<V>, name: F) -> Result<Self, LearnError>
    where
        V: Vertex,
        F: Fn(&V) -> String,
    {
        let title = title.into();
        let order = dag.topological_order().ok_or_else(|| {
            LearnError::Input(format!("network '{}': graph has a directed cycle", title))
        })?;

        let mut nodes = Vec::with_capacity(order.len());
        let mut parents = BTreeMap::new();
        for v in &order {
            let node = name(v);
            let mut node_parents: Vec<String> = dag.parents(v).map(&name).collect();
            node_parents.sort();
            if parents.insert(node.clone(), node_parents).is_some() {
                return Err(LearnError::Input(format!(
                    "network '{}': duplicate node name '{}'",
                    title, node
                )));
            }
            nodes.push(node);
        }

        Ok(Self {
            title,
            nodes,
            parents,
        })
    }

    /// Nodes with no parents, in node order.
    pub fn roots(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| self.parents_of(n).is_empty())
            .map(String::as_str)
            .collect()
    }

    /// Parents of `node`; empty for unknown nodes.
    pub fn parents_of(&self, node: &str) -> &[String] {
        self.parents.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Children of `node`, in node order.
    pub fn children_of(&self, node: &str) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| self.parents_of(n).iter().any(|p| p == node))
            .map(String::as_str)
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.parents.values().map(Vec::len).sum()
    }
}
