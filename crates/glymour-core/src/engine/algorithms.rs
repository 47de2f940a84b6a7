//! Graph algorithms used by the PC learner and the edge orienter.
//!
//! All functions are written against [`Adjacency`] and treat adjacency as
//! symmetric, so they give the same answers over undirected storage and over
//! a directed graph's underlying skeleton.
//!
//! Naming follows Spirtes and Glymour: `A(a,b)` is [`adjacent_either`] and
//! `U(a,b)` is [`verts_on_paths`]; their intersection is the pool conditioning
//! sets are drawn from.

use std::collections::{BTreeMap, BTreeSet};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;

use crate::engine::graph::{Adjacency, Vertex};

/// Inline capacity of the DFS path stack.
const INLINE_PATH_LEN: usize = 16;

/// Deduplicated union of the vertices adjacent to `a` or to `b`.
pub fn adjacent_either<G: Adjacency>(g: &G, a: &G::Vertex, b: &G::Vertex) -> BTreeSet<G::Vertex> {
    let mut out = g.adjacent(a);
    out.extend(g.adjacent(b));
    out
}

/// Union of the vertices on every simple undirected path from `start` to `end`.
///
/// Exhaustive depth-first enumeration: the search extends the current path
/// with each neighbor not already on it and, on reaching `end`, adds the whole
/// path to the result. The simple-path restriction bounds the depth by the
/// vertex count, so cyclic graphs terminate.
///
/// Empty when `end` is unreachable. `{start}` when `start == end`.
pub fn verts_on_paths<G: Adjacency>(
    g: &G,
    start: &G::Vertex,
    end: &G::Vertex,
) -> BTreeSet<G::Vertex> {
    AdjacencyIndex::new(g).verts_on_paths(start, end)
}

/// Symmetric adjacency lists of one graph value, built once and shared by
/// every query against that value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyIndex<V: Vertex> {
    lists: BTreeMap<V, Vec<V>>,
}

impl<V: Vertex> AdjacencyIndex<V> {
    pub fn new<G: Adjacency<Vertex = V>>(g: &G) -> Self {
        let lists = g
            .vertices()
            .into_iter()
            .map(|v| {
                let adj = g.adjacent(&v).into_iter().collect();
                (v, adj)
            })
            .collect();
        Self { lists }
    }

    /// Neighbors of `v` in ascending order; empty for unknown vertices.
    pub fn neighbors(&self, v: &V) -> &[V] {
        self.lists.get(v).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn adjacent_either(&self, a: &V, b: &V) -> BTreeSet<V> {
        self.neighbors(a)
            .iter()
            .chain(self.neighbors(b))
            .cloned()
            .collect()
    }

    /// See [`verts_on_paths`].
    pub fn verts_on_paths(&self, start: &V, end: &V) -> BTreeSet<V> {
        let mut walk = PathWalk {
            adjacency: &self.lists,
            end,
            path: SmallVec::new(),
            on_path: FxHashSet::default(),
            found: BTreeSet::new(),
        };
        walk.visit(start);
        walk.found
    }

    /// See [`separation_candidates`].
    pub fn separation_candidates(&self, a: &V, b: &V) -> BTreeSet<V> {
        let adjacent = self.adjacent_either(a, b);
        if adjacent.is_empty() {
            return adjacent;
        }
        let on_paths = self.verts_on_paths(a, b);
        adjacent.intersection(&on_paths).cloned().collect()
    }
}

struct PathWalk<'g, V: Vertex> {
    adjacency: &'g BTreeMap<V, Vec<V>>,
    end: &'g V,
    path: SmallVec<[V; INLINE_PATH_LEN]>,
    on_path: FxHashSet<V>,
    found: BTreeSet<V>,
}

impl<V: Vertex> PathWalk<'_, V> {
    fn visit(&mut self, current: &V) {
        self.path.push(current.clone());
        self.on_path.insert(current.clone());

        let adjacency = self.adjacency;
        if current == self.end {
            self.found.extend(self.path.iter().cloned());
        } else if let Some(neighbors) = adjacency.get(current) {
            for next in neighbors {
                if !self.on_path.contains(next) {
                    self.visit(next);
                }
            }
        }

        self.on_path.remove(current);
        self.path.pop();
    }
}

/// Every ordered triple `(a, b, c)` with `a–b` and `b–c` adjacent but `a–c`
/// not adjacent and `a != c`.
///
/// Triples come in mirrored pairs: if `(x, y, z)` is returned so is `(z, y, x)`.
pub fn non_transitive<G: Adjacency>(g: &G) -> Vec<(G::Vertex, G::Vertex, G::Vertex)> {
    let adjacency = AdjacencyIndex::new(g).lists;
    let mut triples = Vec::new();

    for (a, a_adj) in &adjacency {
        for b in a_adj {
            let Some(b_adj) = adjacency.get(b) else {
                continue;
            };
            for c in b_adj {
                if c == a || a_adj.contains(c) {
                    continue;
                }
                triples.push((a.clone(), b.clone(), c.clone()));
            }
        }
    }

    triples
}

/// `adjacent_either(a, b) ∩ verts_on_paths(a, b)`: the vertices that may
/// appear in a set separating `a` from `b`.
pub fn separation_candidates<G: Adjacency>(
    g: &G,
    a: &G::Vertex,
    b: &G::Vertex,
) -> BTreeSet<G::Vertex> {
    AdjacencyIndex::new(g).separation_candidates(a, b)
}
