//! Plain-text report layouts.

use bankdesk_core::{
    algorithms::{
        genetic::run_genetic, graph::run_graph, greedy::run_greedy, kmeans::run_clustering, CancelToken,
    },
    analytics::{customer_summary, financial_summary, fraud_summary, risk_summary},
    clock::FixedClock,
    config::{ClusteringParams, GeneratorConfig, GeneticParams, GraphParams, GreedyParams},
    dataset::Dataset,
    generator::generate,
    report::{self, format_currency},
    rng::{RngBank, StreamSlot},
};

fn dataset() -> Dataset {
    let clock = FixedClock::at_date(2024, 6, 1).unwrap();
    generate(&GeneratorConfig::default_test(), &clock).unwrap()
}

#[test]
fn financial_report_shows_grouped_currency() {
    let ds = dataset();
    let r = financial_summary(&ds).unwrap();
    let text = report::render_financial(&r);
    assert!(text.starts_with("=== FINANCIAL ANALYSIS ==="));
    assert!(text.contains(&format_currency(r.overall_totals.total_balance)));
    for g in &r.per_bank {
        assert!(text.contains(&g.key));
    }
    assert!(!text.contains('\r'));
}

#[test]
fn risk_report_lists_buckets_with_one_decimal_percent() {
    let r = risk_summary(&dataset()).unwrap();
    let text = report::render_risk(&r);
    let pct = r.buckets.high as f64 / r.total_accounts as f64 * 100.0;
    assert!(text.contains(&format!("({pct:.1}%)")));
    assert!(text.contains(&format!("{:.2}", r.avg_risk_score)));
    assert!(text.contains(&format_currency(r.risk_exposure)));
}

#[test]
fn fraud_and_customer_reports_enumerate_top_entries() {
    let ds = dataset();
    let fraud = report::render_fraud(&fraud_summary(&ds).unwrap());
    assert!(fraud.contains(" 1. #"));
    let customers = customer_summary(&ds).unwrap();
    let text = report::render_customer(&customers);
    assert!(text.contains(&customers.top_customers[0].customer_name));
    assert!(text.contains("Excellent (750+)"));
}

#[test]
fn algorithm_reports_render() {
    let ds = dataset();
    let cancel = CancelToken::new();
    let bank = RngBank::new(7);

    let greedy = report::render_greedy(&run_greedy(&ds, &GreedyParams::default(), &cancel).unwrap());
    assert!(greedy.contains("Optimisation ratio"));

    let graph = report::render_graph(&run_graph(&ds, &GraphParams::default(), &cancel).unwrap());
    assert!(graph.contains("depth 0: 1 vertices"));
    assert!(graph.contains("Dijkstra"));

    let clustering = run_clustering(
        &ds,
        &ClusteringParams::default(),
        &mut bank.stream(StreamSlot::Clustering),
        &cancel,
    )
    .unwrap();
    let text = report::render_clustering(&clustering);
    for k in [3, 5, 7] {
        assert!(text.contains(&format!("k = {k} (")));
    }

    let params = GeneticParams { generations: 5, ..GeneticParams::default() };
    let genetic = run_genetic(&ds, &params, &mut bank.stream(StreamSlot::Genetic), &cancel).unwrap();
    let text = report::render_genetic(&genetic);
    assert!(text.contains("Population:      50"));
    assert!(text.contains("Improvement:"));
}
