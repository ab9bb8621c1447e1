//! Transaction graph traversal and shortest paths.

use bankdesk_core::{
    algorithms::{
        graph::{run_graph, PathOutcome, TransactionGraph},
        CancelToken,
    },
    clock::FixedClock,
    config::{GeneratorConfig, GraphParams},
    dataset::Dataset,
    error::BankError,
    generator::generate,
    types::TransactionType,
};
use std::collections::{BTreeMap, HashSet};

fn dataset() -> Dataset {
    let clock = FixedClock::at_date(2024, 6, 1).unwrap();
    generate(&GeneratorConfig::default(), &clock).unwrap()
}

#[test]
fn bfs_levels_from_first_account_are_disjoint() {
    let ds = dataset();
    let source = ds.accounts[0].account_number.clone();
    let params = GraphParams { source: Some(source.clone()), max_depth: Some(3), ..GraphParams::default() };
    let report = run_graph(&ds, &params, &CancelToken::new()).unwrap();

    assert_eq!(report.bfs_levels[&0], vec![source]);
    let mut seen = HashSet::new();
    for vertices in report.bfs_levels.values() {
        for v in vertices {
            assert!(seen.insert(v.clone()), "{v} appears in two levels");
        }
    }
    assert!(report.bfs_levels.keys().all(|d| *d <= 3));
}

#[test]
fn graph_has_one_edge_per_transfer() {
    let ds = dataset();
    let transfers = ds
        .transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Transfer)
        .count();
    let graph = TransactionGraph::build(&ds);
    assert_eq!(graph.vertex_count(), ds.accounts.len());
    assert_eq!(graph.edge_count(), transfers);
}

#[test]
fn dfs_visits_each_reachable_vertex_once() {
    let ds = dataset();
    let graph = TransactionGraph::build(&ds);
    let order = graph.dfs(&ds.accounts[0].account_number, &CancelToken::new()).unwrap();
    let unique: HashSet<&String> = order.iter().collect();
    assert_eq!(unique.len(), order.len());
    assert_eq!(order[0], ds.accounts[0].account_number);
}

#[test]
fn dijkstra_cost_matches_path_edges() {
    let ds = dataset();
    let report = run_graph(&ds, &GraphParams::default(), &CancelToken::new()).unwrap();
    if let PathOutcome::Found { path, cost } = &report.dijkstra {
        assert_eq!(path.first(), Some(&report.source));
        assert_eq!(path.last(), Some(&report.target));
        let graph = TransactionGraph::build(&ds);
        let mut total = 0.0;
        for hop in path.windows(2) {
            let from = graph.vertex_index(&hop[0]).unwrap();
            let to = graph.vertex_index(&hop[1]).unwrap();
            total += graph
                .out_edges(from)
                .iter()
                .filter(|e| e.to == to)
                .map(|e| e.weight)
                .fold(f64::INFINITY, f64::min);
        }
        assert!((total - cost).abs() < 1e-6);
    }
}

#[test]
fn bfs_depth_zero_is_the_source_only() {
    let graph = TransactionGraph::from_edges(&["a", "b"], &[("a", "b", 1.0)]).unwrap();
    let levels = graph.bfs("a", 0, &CancelToken::new()).unwrap();
    assert_eq!(levels, BTreeMap::from([(0, vec!["a".to_string()])]));
}

#[test]
fn source_equal_to_target_is_a_zero_length_path() {
    let graph = TransactionGraph::from_edges(&["a", "b"], &[("a", "b", 1.0)]).unwrap();
    let outcome = graph.dijkstra("b", "b", &CancelToken::new()).unwrap();
    assert_eq!(outcome, PathOutcome::Found { path: vec!["b".into()], cost: 0.0 });
}

#[test]
fn target_without_inbound_edges_is_unreachable() {
    let graph = TransactionGraph::from_edges(
        &["a", "b", "c"],
        &[("a", "b", 1.0), ("c", "a", 1.0)],
    )
    .unwrap();
    assert_eq!(graph.dijkstra("a", "c", &CancelToken::new()).unwrap(), PathOutcome::Unreachable);
}

#[test]
fn cheaper_long_path_beats_expensive_direct_edge() {
    let graph = TransactionGraph::from_edges(
        &["s", "x", "y", "t"],
        &[("s", "t", 10.0), ("s", "x", 1.0), ("x", "y", 1.0), ("y", "t", 1.0)],
    )
    .unwrap();
    let outcome = graph.dijkstra("s", "t", &CancelToken::new()).unwrap();
    assert_eq!(
        outcome,
        PathOutcome::Found { path: vec!["s".into(), "x".into(), "y".into(), "t".into()], cost: 3.0 }
    );
}

#[test]
fn zero_weight_cycle_back_to_the_source_is_not_taken() {
    let graph = TransactionGraph::from_edges(
        &["s", "a", "t"],
        &[("s", "a", 0.0), ("a", "s", 0.0), ("s", "t", 1.0)],
    )
    .unwrap();
    let outcome = graph.dijkstra("s", "t", &CancelToken::new()).unwrap();
    assert_eq!(outcome, PathOutcome::Found { path: vec!["s".into(), "t".into()], cost: 1.0 });
}

#[test]
fn zero_weight_detour_that_only_returns_through_the_path_is_skipped() {
    // b and a reach t only through s, which is already taken.
    let graph = TransactionGraph::from_edges(
        &["s", "b", "a", "t"],
        &[("s", "b", 0.0), ("b", "a", 0.0), ("a", "b", 0.0), ("a", "s", 0.0), ("s", "t", 1.0)],
    )
    .unwrap();
    let outcome = graph.dijkstra("s", "t", &CancelToken::new()).unwrap();
    assert_eq!(outcome, PathOutcome::Found { path: vec!["s".into(), "t".into()], cost: 1.0 });
}

#[test]
fn zero_weight_edges_still_give_the_smallest_index_path() {
    let graph = TransactionGraph::from_edges(
        &["s", "a", "b", "t"],
        &[("s", "a", 0.0), ("a", "s", 0.0), ("a", "b", 0.0), ("b", "t", 1.0), ("s", "t", 1.0)],
    )
    .unwrap();
    let outcome = graph.dijkstra("s", "t", &CancelToken::new()).unwrap();
    assert_eq!(
        outcome,
        PathOutcome::Found { path: vec!["s".into(), "a".into(), "b".into(), "t".into()], cost: 1.0 }
    );
}

#[test]
fn self_loops_and_parallel_edges_are_kept() {
    let graph = TransactionGraph::from_edges(
        &["a", "b"],
        &[("a", "a", 5.0), ("a", "b", 4.0), ("a", "b", 2.0)],
    )
    .unwrap();
    assert_eq!(graph.edge_count(), 3);
    let outcome = graph.dijkstra("a", "b", &CancelToken::new()).unwrap();
    assert_eq!(outcome, PathOutcome::Found { path: vec!["a".into(), "b".into()], cost: 2.0 });
}

#[test]
fn unknown_source_is_a_config_error() {
    let ds = dataset();
    let params = GraphParams { source: Some("0000000000".into()), ..GraphParams::default() };
    let err = run_graph(&ds, &params, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, BankError::Config(_)));
}

#[test]
fn cancelled_token_stops_traversal() {
    let ds = dataset();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = run_graph(&ds, &GraphParams::default(), &cancel).unwrap_err();
    assert!(matches!(err, BankError::Cancelled));
}
