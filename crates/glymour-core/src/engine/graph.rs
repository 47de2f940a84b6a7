//! # Graph model
//!
//! Persistent graph values used by the structure learner.
//!
//! ## Key Components
//!
//! - **UndirectedGraph**: symmetric adjacency; the PC candidate skeleton.
//! - **DirectedEdges**: mutable source -> targets accumulator for orientation
//!   constraints.
//! - **DirectedGraph**: immutable directed graph built from a vertex set and a
//!   `DirectedEdges`; used for enumerated orientations.
//! - **Adjacency**: the vertex-enumeration + symmetric adjacency view the
//!   graph algorithms are written against.
//!
//! ## Design
//!
//! Graph values share their storage through `Arc`. Structural changes such as
//! [`UndirectedGraph::without_edge`] return a *new* graph and leave every
//! earlier snapshot untouched, so a traversal over one snapshot never observes
//! a graph changing underneath it.
//!
//! Iteration order is stable (`BTreeMap`/`BTreeSet` keyed by the vertex
//! ordering). Adjacency lookups for a vertex with no recorded edges yield an
//! empty set; there is no shared default container.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Identity usable as a graph vertex.
///
/// Blanket-implemented for every type with the required bounds.
pub trait Vertex: Clone + Ord + Hash + Debug + Send + Sync {}

impl<T: Clone + Ord + Hash + Debug + Send + Sync> Vertex for T {}

/// Vertex enumeration plus *symmetric* adjacency.
///
/// Implementations over directed storage must report `w` as adjacent to `v`
/// when either `v -> w` or `w -> v` is recorded.
pub trait Adjacency {
    type Vertex: Vertex;

    /// All vertices, in stable order.
    fn vertices(&self) -> Vec<Self::Vertex>;

    /// Vertices adjacent to `v` in either direction. Empty for unknown vertices.
    fn adjacent(&self, v: &Self::Vertex) -> BTreeSet<Self::Vertex>;

    /// Whether `a` and `b` are adjacent in either direction.
    fn is_adjacent(&self, a: &Self::Vertex, b: &Self::Vertex) -> bool {
        self.adjacent(a).contains(b)
    }
}

/// An undirected simple graph with persistent (copy-on-change) storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndirectedGraph<V: Ord> {
    adjacency: Arc<BTreeMap<V, BTreeSet<V>>>,
}

impl<V: Vertex> UndirectedGraph<V> {
    /// Graph over `vertices` with no edges.
    pub fn new(vertices: impl IntoIterator<Item = V>) -> Self {
        let adjacency = vertices
            .into_iter()
            .map(|v| (v, BTreeSet::new()))
            .collect();
        Self {
            adjacency: Arc::new(adjacency),
        }
    }

    /// The complete graph over `vertices`: every distinct pair is adjacent.
    pub fn complete(vertices: impl IntoIterator<Item = V>) -> Self {
        let set: BTreeSet<V> = vertices.into_iter().collect();
        let adjacency = set
            .iter()
            .map(|v| {
                let others = set.iter().filter(|w| *w != v).cloned().collect();
                (v.clone(), others)
            })
            .collect();
        Self {
            adjacency: Arc::new(adjacency),
        }
    }

    /// Graph over `vertices` plus the given edges.
    ///
    /// Endpoints missing from `vertices` are added. Self-loops are ignored.
    pub fn from_edges(
        vertices: impl IntoIterator<Item = V>,
        edges: impl IntoIterator<Item = (V, V)>,
    ) -> Self {
        let mut adjacency: BTreeMap<V, BTreeSet<V>> = vertices
            .into_iter()
            .map(|v| (v, BTreeSet::new()))
            .collect();
        for (a, b) in edges {
            if a == b {
                continue;
            }
            adjacency.entry(a.clone()).or_default().insert(b.clone());
            adjacency.entry(b).or_default().insert(a);
        }
        Self {
            adjacency: Arc::new(adjacency),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn contains_vertex(&self, v: &V) -> bool {
        self.adjacency.contains_key(v)
    }

    /// Iterates vertices in order.
    pub fn vertex_iter(&self) -> impl Iterator<Item = &V> {
        self.adjacency.keys()
    }

    /// Neighbors of `v`; empty when `v` has no edges or is unknown.
    pub fn neighbors<'a>(&'a self, v: &V) -> impl Iterator<Item = &'a V> + 'a {
        self.adjacency.get(v).into_iter().flatten()
    }

    pub fn degree(&self, v: &V) -> usize {
        self.adjacency.get(v).map_or(0, BTreeSet::len)
    }

    pub fn has_edge(&self, a: &V, b: &V) -> bool {
        self.adjacency.get(a).is_some_and(|adj| adj.contains(b))
    }

    /// Every edge once, as `(smaller, larger)` pairs in order.
    pub fn edges(&self) -> Vec<(V, V)> {
        self.adjacency
            .iter()
            .flat_map(|(a, adj)| {
                adj.iter()
                    .filter(move |b| a < *b)
                    .map(move |b| (a.clone(), b.clone()))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// A new graph without the edge `a–b`. `self` is left unchanged.
    pub fn without_edge(&self, a: &V, b: &V) -> Self {
        self.without_edges([(a.clone(), b.clone())])
    }

    /// A new graph without any of the given edges, built with a single copy.
    ///
    /// Edges that are not present are ignored.
    pub fn without_edges(&self, edges: impl IntoIterator<Item = (V, V)>) -> Self {
        let mut adjacency = (*self.adjacency).clone();
        for (a, b) in edges {
            if let Some(adj) = adjacency.get_mut(&a) {
                adj.remove(&b);
            }
            if let Some(adj) = adjacency.get_mut(&b) {
                adj.remove(&a);
            }
        }
        Self {
            adjacency: Arc::new(adjacency),
        }
    }

    /// Whether both values share the same underlying storage.
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.adjacency, &other.adjacency)
    }
}

impl<V: Vertex> Adjacency for UndirectedGraph<V> {
    type Vertex = V;

    fn vertices(&self) -> Vec<V> {
        self.adjacency.keys().cloned().collect()
    }

    fn adjacent(&self, v: &V) -> BTreeSet<V> {
        self.adjacency.get(v).cloned().unwrap_or_default()
    }

    fn is_adjacent(&self, a: &V, b: &V) -> bool {
        self.has_edge(a, b)
    }
}

/// Source -> set of targets. Insertion is idempotent and nothing is ever
/// removed, so the accumulator only grows.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectedEdges<V: Ord> {
    targets: BTreeMap<V, BTreeSet<V>>,
}

impl<V: Ord> Default for DirectedEdges<V> {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
        }
    }
}

impl<V: Vertex> DirectedEdges<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `src -> dst`. Returns `false` if it was already recorded.
    pub fn insert(&mut self, src: V, dst: V) -> bool {
        self.targets.entry(src).or_default().insert(dst)
    }

    pub fn contains(&self, src: &V, dst: &V) -> bool {
        self.targets.get(src).is_some_and(|t| t.contains(dst))
    }

    /// Targets recorded for `src`; empty when none are.
    pub fn targets<'a>(&'a self, src: &V) -> impl Iterator<Item = &'a V> + 'a {
        self.targets.get(src).into_iter().flatten()
    }

    /// All recorded `(src, dst)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&V, &V)> {
        self.targets
            .iter()
            .flat_map(|(src, dsts)| dsts.iter().map(move |dst| (src, dst)))
    }

    pub fn len(&self) -> usize {
        self.targets.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.values().all(BTreeSet::is_empty)
    }
}

impl<V: Vertex> FromIterator<(V, V)> for DirectedEdges<V> {
    fn from_iter<I: IntoIterator<Item = (V, V)>>(iter: I) -> Self {
        let mut edges = Self::new();
        for (src, dst) in iter {
            edges.insert(src, dst);
        }
        edges
    }
}

#[derive(Debug, PartialEq, Eq)]
struct DirectedInner<V: Ord> {
    children: BTreeMap<V, BTreeSet<V>>,
    parents: BTreeMap<V, BTreeSet<V>>,
}

/// An immutable directed graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectedGraph<V: Ord> {
    inner: Arc<DirectedInner<V>>,
}

impl<V: Vertex> DirectedGraph<V> {
    /// Directed graph over `vertices` with the edges of `edges` whose
    /// endpoints are both in the vertex set.
    pub fn from_edges(vertices: impl IntoIterator<Item = V>, edges: &DirectedEdges<V>) -> Self {
        let mut children: BTreeMap<V, BTreeSet<V>> = vertices
            .into_iter()
            .map(|v| (v, BTreeSet::new()))
            .collect();
        let mut parents: BTreeMap<V, BTreeSet<V>> = children
            .keys()
            .map(|v| (v.clone(), BTreeSet::new()))
            .collect();

        for (src, dst) in edges.iter() {
            if !children.contains_key(dst) {
                continue;
            }
            if let Some(out) = children.get_mut(src) {
                out.insert(dst.clone());
                if let Some(inc) = parents.get_mut(dst) {
                    inc.insert(src.clone());
                }
            }
        }

        Self {
            inner: Arc::new(DirectedInner { children, parents }),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.inner.children.len()
    }

    pub fn vertex_iter(&self) -> impl Iterator<Item = &V> {
        self.inner.children.keys()
    }

    pub fn children<'a>(&'a self, v: &V) -> impl Iterator<Item = &'a V> + 'a {
        self.inner.children.get(v).into_iter().flatten()
    }

    pub fn parents<'a>(&'a self, v: &V) -> impl Iterator<Item = &'a V> + 'a {
        self.inner.parents.get(v).into_iter().flatten()
    }

    pub fn has_edge(&self, src: &V, dst: &V) -> bool {
        self.inner
            .children
            .get(src)
            .is_some_and(|out| out.contains(dst))
    }

    /// All edges as `(src, dst)` pairs in order.
    pub fn edges(&self) -> Vec<(V, V)> {
        self.inner
            .children
            .iter()
            .flat_map(|(src, out)| out.iter().map(move |dst| (src.clone(), dst.clone())))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.children.values().map(BTreeSet::len).sum()
    }

    /// A topological order (Kahn's algorithm, smallest ready vertex first),
    /// or `None` when the graph has a directed cycle.
    pub fn topological_order(&self) -> Option<Vec<V>> {
        let mut in_degree: BTreeMap<&V, usize> = self
            .inner
            .parents
            .iter()
            .map(|(v, inc)| (v, inc.len()))
            .collect();
        let mut ready: BTreeSet<&V> = in_degree
            .iter()
            .filter(|(_, d)| **d == 0)
            .map(|(v, _)| *v)
            .collect();
        let mut order = Vec::with_capacity(self.vertex_count());

        while let Some(v) = ready.pop_first() {
            order.push(v.clone());
            for child in self.children(v) {
                if let Some(d) = in_degree.get_mut(child) {
                    *d -= 1;
                    if *d == 0 {
                        ready.insert(child);
                    }
                }
            }
        }

        (order.len() == self.vertex_count()).then_some(order)
    }

    pub fn is_acyclic(&self) -> bool {
        self.topological_order().is_some()
    }
}

impl<V: Vertex> Adjacency for DirectedGraph<V> {
    type Vertex = V;

    fn vertices(&self) -> Vec<V> {
        self.inner.children.keys().cloned().collect()
    }

    fn adjacent(&self, v: &V) -> BTreeSet<V> {
        self.children(v).chain(self.parents(v)).cloned().collect()
    }
}
