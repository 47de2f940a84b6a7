//! Orientation enumeration and network export over learned structures.

use glymour_core::engine::bayes_net::NetworkStructure;
use glymour_core::engine::learning_net::{LearnerConfig, LearningNet};
use glymour_core::engine::orientations::MAX_FREE_EDGES;
use glymour_core::{compatible_orientations, from_fn, DirectedEdges, LearnError, UndirectedGraph};

use super::support::{dag, DSeparation};

#[test]
fn sprinkler_orientations_export_as_networks() {
    // cloudy -> {sprinkler, rain} -> wet
    let truth = dag(
        &["cloudy", "rain", "sprinkler", "wet"],
        &[
            ("cloudy", "sprinkler"),
            ("cloudy", "rain"),
            ("sprinkler", "wet"),
            ("rain", "wet"),
        ],
    );
    let mut net = LearningNet::new(
        ["cloudy", "rain", "sprinkler", "wet"],
        DSeparation::new(truth),
        LearnerConfig::default(),
    )
    .unwrap();
    let learned = net.learn_structure();
    assert_eq!(learned.skeleton.edge_count(), 4);
    assert!(learned.directed_edges.contains(&"rain", &"wet"));
    assert!(learned.directed_edges.contains(&"sprinkler", &"wet"));

    let dags = net.compatible_orientations().unwrap();
    assert_eq!(dags.len(), 4);

    let networks: Vec<NetworkStructure> = dags
        .iter()
        .enumerate()
        .map(|(i, d)| NetworkStructure::from_dag(format!("sprinkler_{}", i), d, |v| v.to_string()))
        .collect::<Result<_, _>>()
        .unwrap();
    for network in &networks {
        assert_eq!(network.edge_count(), 4);
        assert_eq!(network.parents_of("wet"), ["rain", "sprinkler"]);
        assert!(network.children_of("wet").is_empty());
    }
    // The true network is one of the completions.
    assert!(networks.iter().any(|n| n.roots() == vec!["cloudy"]));
}

#[test]
fn enumeration_is_bounded_by_free_edges() {
    let skeleton = UndirectedGraph::from_edges(0..5u32, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)]);
    let free = compatible_orientations(&skeleton, &DirectedEdges::new()).unwrap();
    // 2^5 orientations of a 5-cycle minus the two directed cycles.
    assert_eq!(free.len(), 30);

    let fixed: DirectedEdges<u32> = [(0, 1)].into_iter().collect();
    let constrained = compatible_orientations(&skeleton, &fixed).unwrap();
    assert_eq!(constrained.len(), 15);
    assert!(constrained.iter().all(|d| d.has_edge(&0, &1) && d.is_acyclic()));
}

#[test]
fn dense_skeletons_are_refused() {
    let oracle = from_fn(|_: f64, _: &u32, _: &u32, _: &[u32]| Ok(false));
    let mut net = LearningNet::new(0..7u32, oracle, LearnerConfig::default()).unwrap();
    let learned = net.learn_structure();
    assert_eq!(learned.skeleton.edge_count(), 21);
    assert!(learned.skeleton.edge_count() > MAX_FREE_EDGES);

    let err = net.compatible_orientations().unwrap_err();
    assert!(matches!(err, LearnError::Validation(_)));
}
