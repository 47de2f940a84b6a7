//! End-to-end learning from synthetic tables with the chi-square oracle.

use glymour_core::engine::learning_net::{LearnerConfig, LearningNet};
use glymour_core::stats::chi_square::{ChiSquareConfig, ChiSquareOracle};
use glymour_core::{learn_from_table, IndependenceOracle, VariableId};

use super::support::{
    alarm_container, alarm_rows, confounded_indicators, container3, independent_coins,
    sampled_coins, sampled_confounded,
};

/// Seeds for the sampled scenarios. Each run is a test at the 5% level, so a
/// few seeds are expected to miss; the checks require a clear majority.
const SEEDS: std::ops::Range<u64> = 0..40;
const REQUIRED_HITS: usize = 32;

#[test]
fn independent_coins_leave_no_edges() {
    let container = container3(["coin_a", "coin_b", "coin_c"], independent_coins(10_240));
    let learned = learn_from_table(&container, LearnerConfig::default()).unwrap();

    assert_eq!(learned.skeleton.edge_count(), 0);
    assert_eq!(learned.skeleton.vertex_count(), 3);
    assert!(learned.directed_edges.is_empty());
    // Everything goes in the first round, marginally.
    assert_eq!(learned.diagnostics.rounds[0].edges_removed, 3);
    assert!(learned.separating_sets.values().all(|s| s.is_empty()));
}

#[test]
fn confounded_indicators_keep_only_the_common_cause() {
    let container = container3(["H", "Red", "Blue"], confounded_indicators(10_000));
    let h = container.id_of("H").unwrap();
    let red = container.id_of("Red").unwrap();
    let blue = container.id_of("Blue").unwrap();

    let mut net = LearningNet::from_container(&container, LearnerConfig::default()).unwrap();
    let learned = net.learn_structure();

    assert!(learned.skeleton.has_edge(&h, &red));
    assert!(learned.skeleton.has_edge(&h, &blue));
    assert!(!learned.skeleton.has_edge(&red, &blue));
    assert_eq!(learned.separating_sets.get(&(red, blue)), Some(&vec![h]));

    // H separates Red and Blue, so it is not a collider and no direction is
    // recorded; all four orientations of the two edges are acyclic.
    assert!(learned.directed_edges.is_empty());
    assert_eq!(net.compatible_orientations().unwrap().len(), 4);
}

#[test]
fn confounded_indicators_are_marginally_dependent() {
    let container = container3(["H", "Red", "Blue"], confounded_indicators(10_000));
    let oracle = ChiSquareOracle::from_container(&container, ChiSquareConfig::default()).unwrap();
    let (h, red, blue) = (VariableId(0), VariableId(1), VariableId(2));

    assert!(!oracle.independent(0.05, &red, &blue, &[]).unwrap());
    assert!(oracle.independent(0.05, &red, &blue, &[h]).unwrap());

    let conditional = oracle.test(red, blue, &[h]).unwrap();
    assert_eq!(conditional.statistic, 0.0);
    assert_eq!(conditional.degrees_of_freedom, 2);
    assert_eq!(conditional.strata, 2);
}

#[test]
fn alarm_network_loses_edges() {
    let container = alarm_container(alarm_rows(10_000, 42));
    let learned = learn_from_table(&container, LearnerConfig::default()).unwrap();

    assert_eq!(learned.skeleton.vertex_count(), 5);
    assert!(learned.skeleton.edge_count() < 10);
    assert_eq!(
        learned.separating_sets.len(),
        10 - learned.skeleton.edge_count()
    );
}

#[test]
fn learning_is_deterministic_for_a_fixed_table() {
    let first = learn_from_table(&alarm_container(alarm_rows(5_000, 7)), LearnerConfig::default())
        .unwrap();
    let second = learn_from_table(&alarm_container(alarm_rows(5_000, 7)), LearnerConfig::default())
        .unwrap();

    assert_eq!(first.skeleton, second.skeleton);
    assert_eq!(first.directed_edges, second.directed_edges);
    assert_eq!(first.separating_sets, second.separating_sets);
}

#[test]
fn balanced_design_is_independent_at_any_significance() {
    let container = container3(["a", "b", "c"], independent_coins(800));
    for significance in [0.01, 0.05, 0.2] {
        let config = LearnerConfig {
            significance,
            ..LearnerConfig::default()
        };
        let learned = learn_from_table(&container, config).unwrap();
        assert_eq!(learned.skeleton.edge_count(), 0, "alpha = {}", significance);
    }
}

#[test]
fn sampled_independent_coins_usually_leave_no_edges() {
    let hits = SEEDS
        .filter(|&seed| {
            let container = container3(["coin_a", "coin_b", "coin_c"], sampled_coins(10_000, seed));
            let learned = learn_from_table(&container, LearnerConfig::default()).unwrap();
            learned.skeleton.edge_count() == 0
        })
        .count();
    assert!(hits >= REQUIRED_HITS, "{} of {} seeds", hits, SEEDS.end);
}

#[test]
fn sampled_confounder_usually_recovers_the_fork() {
    let mut hits = 0;
    for seed in SEEDS {
        let container = container3(["H", "Red", "Blue"], sampled_confounded(10_000, seed));
        let h = container.id_of("H").unwrap();
        let red = container.id_of("Red").unwrap();
        let blue = container.id_of("Blue").unwrap();
        let learned = learn_from_table(&container, LearnerConfig::default()).unwrap();

        // Red and Blue are strongly tied through H, so they are never
        // separated marginally and H can never look like a collider.
        assert!(learned.directed_edges.is_empty(), "seed {}", seed);
        if learned.skeleton.has_edge(&h, &red)
            && learned.skeleton.has_edge(&h, &blue)
            && !learned.skeleton.has_edge(&red, &blue)
        {
            assert_eq!(learned.separating_sets.get(&(red, blue)), Some(&vec![h]));
            hits += 1;
        }
    }
    assert!(hits >= REQUIRED_HITS, "{} of {} seeds", hits, SEEDS.end);
}
