//! Shared fixtures: a d-separation oracle over known DAGs and synthetic tables.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glymour_core::engine::graph::{DirectedEdges, DirectedGraph, Vertex};
use glymour_core::{IndependenceOracle, OracleError, Variable, VariableContainer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn dag<V: Vertex>(vertices: &[V], edges: &[(V, V)]) -> DirectedGraph<V> {
    let edges: DirectedEdges<V> = edges.iter().cloned().collect();
    DirectedGraph::from_edges(vertices.iter().cloned(), &edges)
}

/// Answers independence queries exactly from a known DAG.
pub struct DSeparation<V: Vertex> {
    dag: DirectedGraph<V>,
}

impl<V: Vertex> DSeparation<V> {
    pub fn new(dag: DirectedGraph<V>) -> Self {
        Self { dag }
    }
}

impl<V: Vertex> IndependenceOracle<V> for DSeparation<V> {
    fn independent(&self, _: f64, a: &V, b: &V, given: &[V]) -> Result<bool, OracleError> {
        Ok(d_separated(&self.dag, a, b, given))
    }
}

/// Moralized-ancestral-graph test: `a` and `b` are d-separated by `given`
/// iff removing `given` disconnects them in the moral graph of the ancestors
/// of `{a, b} ∪ given`.
pub fn d_separated<V: Vertex>(dag: &DirectedGraph<V>, a: &V, b: &V, given: &[V]) -> bool {
    let mut ancestors = BTreeSet::new();
    let mut stack: Vec<V> = given.to_vec();
    stack.push(a.clone());
    stack.push(b.clone());
    while let Some(v) = stack.pop() {
        if ancestors.insert(v.clone()) {
            stack.extend(dag.parents(&v).cloned());
        }
    }

    let mut moral: BTreeMap<V, BTreeSet<V>> = BTreeMap::new();
    let mut link = |x: &V, y: &V| {
        moral.entry(x.clone()).or_default().insert(y.clone());
        moral.entry(y.clone()).or_default().insert(x.clone());
    };
    for v in &ancestors {
        let parents: Vec<V> = dag.parents(v).cloned().collect();
        for (i, p) in parents.iter().enumerate() {
            link(p, v);
            for q in &parents[i + 1..] {
                link(p, q);
            }
        }
    }

    let blocked: BTreeSet<&V> = given.iter().collect();
    let mut seen = BTreeSet::from([a.clone()]);
    let mut queue = VecDeque::from([a.clone()]);
    while let Some(v) = queue.pop_front() {
        if &v == b {
            return false;
        }
        for w in moral.get(&v).into_iter().flatten() {
            if !blocked.contains(w) && seen.insert(w.clone()) {
                queue.push_back(w.clone());
            }
        }
    }
    true
}

pub type Row3 = [f64; 3];
pub type Row5 = [f64; 5];

pub fn container3(names: [&str; 3], rows: Vec<Row3>) -> VariableContainer<Row3> {
    let variables = names
        .iter()
        .enumerate()
        .map(|(i, name)| Variable::named(name, move |r: &Row3| Some(r[i])))
        .collect();
    VariableContainer::new(rows, variables).expect("valid table")
}

/// Three fair coins in a balanced factorial design: every combination
/// appears equally often, so every test statistic is exactly zero.
pub fn independent_coins(rows: u32) -> Vec<Row3> {
    (0..rows)
        .map(|i| [(i & 1) as f64, ((i >> 1) & 1) as f64, ((i >> 2) & 1) as f64])
        .collect()
}

/// Confounder `H` with two noisy indicators `Red` and `Blue`.
///
/// Each indicator copies `H` and is flipped for one in five rows; the two
/// flip patterns are crossed so that `Red ⊥ Blue | H` holds exactly in the
/// sample while both stay strongly tied to `H`.
pub fn confounded_indicators(rows: u32) -> Vec<Row3> {
    (0..rows)
        .map(|i| {
            let h = i % 2;
            let red_flip = (i / 2) % 5 == 0;
            let blue_flip = (i / 10) % 5 == 0;
            let red = h ^ red_flip as u32;
            let blue = h ^ blue_flip as u32;
            [h as f64, red as f64, blue as f64]
        })
        .collect()
}

/// Three fair coins flipped independently per row.
pub fn sampled_coins(rows: usize, seed: u64) -> Vec<Row3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut flip = || if rng.gen_bool(0.5) { 1.0 } else { 0.0 };
    (0..rows).map(|_| [flip(), flip(), flip()]).collect()
}

/// Confounder `H` driving `Red` and `Blue`, sampled per row:
/// `P(red | h) = 0.2 / 0.7` and `P(blue | h) = 0.4 / 0.9` for heads / tails.
pub fn sampled_confounded(rows: usize, seed: u64) -> Vec<Row3> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bernoulli = |p: f64| if rng.gen_bool(p) { 1.0 } else { 0.0 };
    (0..rows)
        .map(|_| {
            let h = bernoulli(0.5);
            let heads = h > 0.5;
            let red = bernoulli(if heads { 0.2 } else { 0.7 });
            let blue = bernoulli(if heads { 0.4 } else { 0.9 });
            [h, red, blue]
        })
        .collect()
}

/// Burglary, Earthquake, Alarm, JohnCalls, MaryCalls
pub const ALARM_NAMES: [&str; 5] = ["Burglary", "Earthquake", "Alarm", "JohnCalls", "MaryCalls"];

/// Samples from the textbook alarm network.
pub fn alarm_rows(rows: usize, seed: u64) -> Vec<Row5> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bernoulli = |p: f64| if rng.gen::<f64>() < p { 1.0 } else { 0.0 };
    (0..rows)
        .map(|_| {
            let burglary = bernoulli(0.001);
            let earthquake = bernoulli(0.002);
            let p_alarm = match (burglary > 0.5, earthquake > 0.5) {
                (true, true) => 0.95,
                (true, false) => 0.94,
                (false, true) => 0.29,
                (false, false) => 0.001,
            };
            let alarm = bernoulli(p_alarm);
            let john = bernoulli(if alarm > 0.5 { 0.90 } else { 0.05 });
            let mary = bernoulli(if alarm > 0.5 { 0.70 } else { 0.01 });
            [burglary, earthquake, alarm, john, mary]
        })
        .collect()
}

pub fn alarm_container(rows: Vec<Row5>) -> VariableContainer<Row5> {
    let variables = ALARM_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Variable::named(name, move |r: &Row5| Some(r[i])))
        .collect();
    VariableContainer::new(rows, variables).expect("valid table")
}

#[test]
fn d_separation_on_a_collider() {
    let g = dag(&[1, 2, 3], &[(1, 3), (2, 3)]);
    assert!(d_separated(&g, &1, &2, &[]));
    assert!(!d_separated(&g, &1, &2, &[3]));
}

#[test]
fn d_separation_on_a_chain_and_fork() {
    let chain = dag(&[1, 2, 3], &[(1, 2), (2, 3)]);
    assert!(!d_separated(&chain, &1, &3, &[]));
    assert!(d_separated(&chain, &1, &3, &[2]));

    let fork = dag(&[1, 2, 3], &[(2, 1), (2, 3)]);
    assert!(!d_separated(&fork, &1, &3, &[]));
    assert!(d_separated(&fork, &1, &3, &[2]));
}
