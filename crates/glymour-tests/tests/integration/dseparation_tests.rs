//! Structure learning against exact independence oracles.

use glymour_core::engine::learning_net::{LearnerConfig, LearningNet, SweepRule};
use glymour_core::UndirectedGraph;

use super::support::{dag, DSeparation};

fn alarm_oracle() -> DSeparation<&'static str> {
    DSeparation::new(dag(
        &["B", "E", "A", "J", "M"],
        &[("B", "A"), ("E", "A"), ("A", "J"), ("A", "M")],
    ))
}

/// X -> Z1 -> Y and X -> Z2 -> Y
fn diamond_oracle() -> DSeparation<&'static str> {
    DSeparation::new(dag(
        &["X", "Y", "Z1", "Z2"],
        &[("X", "Z1"), ("X", "Z2"), ("Z1", "Y"), ("Z2", "Y")],
    ))
}

#[test]
fn alarm_skeleton_and_colliders_are_recovered() {
    let mut net = LearningNet::new(
        ["B", "E", "A", "J", "M"],
        alarm_oracle(),
        LearnerConfig::default(),
    )
    .unwrap();
    let learned = net.learn_structure();

    let expected = UndirectedGraph::from_edges(
        ["B", "E", "A", "J", "M"],
        [("A", "B"), ("A", "E"), ("A", "J"), ("A", "M")],
    );
    assert_eq!(learned.skeleton, expected);

    assert_eq!(learned.separating_sets.get(&("B", "E")), Some(&vec![]));
    assert_eq!(learned.separating_sets.get(&("J", "M")), Some(&vec!["A"]));
    assert_eq!(learned.separating_sets.len(), 6);

    assert!(learned.directed_edges.contains(&"B", &"A"));
    assert!(learned.directed_edges.contains(&"E", &"A"));
    assert_eq!(learned.directed_edges.len(), 2);
    assert!(learned.diagnostics.oracle_failures.is_empty());

    let dags = net.compatible_orientations().unwrap();
    assert_eq!(dags.len(), 4);
    for dag in &dags {
        assert!(dag.is_acyclic());
        assert!(dag.has_edge(&"B", &"A"));
        assert!(dag.has_edge(&"E", &"A"));
    }
}

#[test]
fn alarm_rounds_follow_the_cardinality_sweep() {
    let mut net = LearningNet::new(
        ["B", "E", "A", "J", "M"],
        alarm_oracle(),
        LearnerConfig::default(),
    )
    .unwrap();

    assert!(net.step());
    assert_eq!(net.net().edge_count(), 9);
    assert!(net.step());
    assert_eq!(net.net().edge_count(), 4);
    assert!(!net.step());
    assert!(!net.step());
    assert!(!net.can_step());

    let rounds = &net.diagnostics().rounds;
    assert_eq!(rounds.len(), 4);
    assert_eq!(
        rounds.iter().map(|r| r.edges_removed).collect::<Vec<_>>(),
        vec![1, 5, 0, 0]
    );
    // Every edge has at most two separation candidates by the last round.
    assert_eq!(rounds[3].edges_skipped, 4);
    assert_eq!(net.history().len(), 4);
    assert_eq!(net.history()[0].edge_count(), 10);
}

#[test]
fn exhaustive_sweep_finds_higher_order_separation() {
    let vertices = ["X", "Y", "Z1", "Z2"];

    let mut exhaustive =
        LearningNet::new(vertices, diamond_oracle(), LearnerConfig::default()).unwrap();
    let learned = exhaustive.learn_structure();
    let expected = UndirectedGraph::from_edges(
        vertices,
        [("X", "Z1"), ("X", "Z2"), ("Y", "Z1"), ("Y", "Z2")],
    );
    assert_eq!(learned.skeleton, expected);
    assert_eq!(learned.separating_sets.get(&("X", "Y")), Some(&vec!["Z1", "Z2"]));
    assert_eq!(learned.separating_sets.get(&("Z1", "Z2")), Some(&vec!["X"]));

    // Y is the only collider.
    assert!(learned.directed_edges.contains(&"Z1", &"Y"));
    assert!(learned.directed_edges.contains(&"Z2", &"Y"));
    assert_eq!(learned.directed_edges.len(), 2);
    assert_eq!(exhaustive.compatible_orientations().unwrap().len(), 4);

    // Round 0 removes nothing, so the early-stopping sweep never gets to the
    // conditioning sets that separate anything.
    let config = LearnerConfig {
        sweep: SweepRule::UntilStable,
        ..LearnerConfig::default()
    };
    let mut until_stable = LearningNet::new(vertices, diamond_oracle(), config).unwrap();
    let learned = until_stable.learn_structure();
    assert_eq!(learned.skeleton.edge_count(), 6);
    assert_eq!(learned.diagnostics.rounds.len(), 1);
}

#[test]
fn snapshots_are_unaffected_by_later_rounds() {
    let mut net = LearningNet::new(
        ["B", "E", "A", "J", "M"],
        alarm_oracle(),
        LearnerConfig::default(),
    )
    .unwrap();
    let before = net.net().clone();
    net.learn_structure();

    assert_eq!(before.edge_count(), 10);
    assert_eq!(net.history()[0], before);
    assert_eq!(net.net().edge_count(), 4);
}

#[test]
fn depth_cap_stops_before_second_order_tests() {
    let config = LearnerConfig {
        max_depth: Some(1),
        ..LearnerConfig::default()
    };
    let mut net = LearningNet::new(["X", "Y", "Z1", "Z2"], diamond_oracle(), config).unwrap();
    let learned = net.learn_structure();
    // Z1 - Z2 goes at depth 1, X - Y needs depth 2.
    assert_eq!(learned.skeleton.edge_count(), 5);
    assert!(learned.skeleton.has_edge(&"X", &"Y"));
}
