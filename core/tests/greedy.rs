//! Greedy top-k selection.

use bankdesk_core::{
    algorithms::{
        greedy::{key_value, run_greedy, select_top_k},
        CancelToken,
    },
    clock::FixedClock,
    config::{GeneratorConfig, GreedyKey, GreedyParams, SortDirection},
    dataset::Dataset,
    error::BankError,
    generator::generate,
};

fn dataset() -> Dataset {
    let clock = FixedClock::at_date(2024, 6, 1).unwrap();
    generate(&GeneratorConfig::default(), &clock).unwrap()
}

#[test]
fn selection_is_sorted_and_bounded_by_k() {
    let ds = dataset();
    let picked = select_top_k(&ds.accounts, GreedyKey::Balance, SortDirection::Descending, 25);
    assert_eq!(picked.len(), 25);
    for pair in picked.windows(2) {
        assert!(pair[0].balance >= pair[1].balance);
    }
    let max = ds.accounts.iter().map(|a| a.balance).fold(f64::MIN, f64::max);
    assert_eq!(picked[0].balance, max);
}

#[test]
fn ties_keep_input_order() {
    let mut accounts = dataset().accounts;
    accounts.truncate(6);
    for a in &mut accounts {
        a.risk_score = 40.0;
    }
    accounts[4].risk_score = 10.0;

    let picked = select_top_k(&accounts, GreedyKey::RiskScore, SortDirection::Ascending, 4);
    let numbers: Vec<&str> = picked.iter().map(|a| a.account_number.as_str()).collect();
    let expected: Vec<&str> = [4, 0, 1, 2].iter().map(|&i| accounts[i].account_number.as_str()).collect();
    assert_eq!(numbers, expected);
}

#[test]
fn k_larger_than_the_dataset_selects_everything() {
    let ds = dataset();
    let k = ds.accounts.len() + 10;
    let picked = select_top_k(&ds.accounts, GreedyKey::TransactionCount, SortDirection::Descending, k);
    assert_eq!(picked.len(), ds.accounts.len());
}

#[test]
fn report_ratios_match_selected_balances() {
    let ds = dataset();
    let report = run_greedy(&ds, &GreedyParams::default(), &CancelToken::new()).unwrap();
    assert_eq!(report.k, 50);
    assert_eq!(report.selections.len(), 3);

    let all: f64 = ds.accounts.iter().map(|a| a.balance).sum();
    for sel in &report.selections {
        let picked = select_top_k(&ds.accounts, sel.key, sel.direction, report.k);
        let total: f64 = picked.iter().map(|a| a.balance).sum();
        assert_eq!(sel.selected_count, 50);
        assert_eq!(sel.total_value, total);
        assert!((sel.optimisation_ratio - total / all).abs() < 1e-12);
        assert!(sel.top.len() <= 10);
        let avg: f64 = picked.iter().map(|a| key_value(a, sel.key)).sum::<f64>() / picked.len() as f64;
        assert!((sel.avg_key - avg).abs() < 1e-9);
    }
    let primary = report.primary().unwrap();
    assert_eq!(primary.key, GreedyKey::Balance);
}

#[test]
fn zero_k_and_empty_dataset_are_rejected() {
    let ds = dataset();
    let err = run_greedy(&ds, &GreedyParams { k: 0 }, &CancelToken::new()).unwrap_err();
    assert!(matches!(err, BankError::Config(_)));

    let empty = Dataset::default();
    let err = run_greedy(&empty, &GreedyParams::default(), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, BankError::EmptyDataset(_)));
}
