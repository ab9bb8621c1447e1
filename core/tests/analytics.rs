//! Analytics reports over generated datasets.

use bankdesk_core::{
    analytics::{customer_summary, financial_summary, fraud_summary, risk_summary},
    clock::FixedClock,
    config::GeneratorConfig,
    dataset::Dataset,
    error::BankError,
    generator::generate,
};

fn dataset() -> Dataset {
    let clock = FixedClock::at_date(2024, 6, 1).unwrap();
    generate(&GeneratorConfig::default(), &clock).unwrap()
}

#[test]
fn financial_totals_reconcile_with_accounts() {
    let ds = dataset();
    let report = financial_summary(&ds).unwrap();

    let expected: f64 = ds.accounts.iter().map(|a| a.balance).sum();
    assert!((report.overall_totals.total_balance - expected).abs() < 0.005);
    assert_eq!(report.overall_totals.account_count, 500);
    assert_eq!(report.per_bank.iter().map(|g| g.count).sum::<usize>(), 500);
    assert_eq!(report.per_account_type.iter().map(|g| g.count).sum::<usize>(), 500);
    assert_eq!(report.per_transaction_type.iter().map(|g| g.count).sum::<usize>(), 2000);

    let bank_sum: f64 = report.per_bank.iter().map(|g| g.sum).sum();
    assert!((bank_sum - expected).abs() < 0.01);
    for g in &report.per_bank {
        assert!((g.mean - g.sum / g.count as f64).abs() < 1e-9);
    }
}

#[test]
fn risk_buckets_partition_accounts() {
    let ds = dataset();
    let report = risk_summary(&ds).unwrap();
    let b = &report.buckets;
    assert_eq!(b.high + b.medium + b.low, 500);

    let exposure: f64 = ds.accounts.iter().filter(|a| a.risk_score > 50.0).map(|a| a.balance).sum();
    assert!((report.risk_exposure - exposure).abs() < 0.005);
}

#[test]
fn top_high_risk_is_ordered_by_risk_then_balance() {
    let report = risk_summary(&dataset()).unwrap();
    assert!(report.top_high_risk.len() <= 10);
    for pair in report.top_high_risk.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.risk_score > 70.0);
        assert!(
            a.risk_score > b.risk_score || (a.risk_score == b.risk_score && a.balance >= b.balance),
            "{a:?} before {b:?}"
        );
    }
}

#[test]
fn fraud_counts_cover_every_event() {
    let report = fraud_summary(&dataset()).unwrap();
    assert_eq!(report.total_events, 100);
    assert_eq!(report.severity_counts.iter().map(|s| s.count).sum::<usize>(), 100);
    assert_eq!(report.type_distribution.iter().map(|s| s.count).sum::<usize>(), 100);
    assert_eq!(report.status_distribution.iter().map(|s| s.count).sum::<usize>(), 100);
    assert_eq!(report.top_events.len(), 10);
    for pair in report.top_events.windows(2) {
        assert!(pair[0].confidence_score >= pair[1].confidence_score);
    }
}

#[test]
fn customer_buckets_cover_every_customer() {
    let report = customer_summary(&dataset()).unwrap();
    assert_eq!(report.total_customers, 200);
    assert_eq!(report.credit_buckets.iter().map(|s| s.count).sum::<usize>(), 200);
    assert_eq!(report.income_distribution.iter().map(|s| s.count).sum::<usize>(), 200);
    assert_eq!(report.risk_category_distribution.iter().map(|s| s.count).sum::<usize>(), 200);
    for pair in report.top_customers.windows(2) {
        assert!(pair[0].total_balance >= pair[1].total_balance);
    }
}

#[test]
fn rerunning_an_analysis_gives_an_equal_report() {
    let ds = dataset();
    assert_eq!(financial_summary(&ds).unwrap(), financial_summary(&ds).unwrap());
    assert_eq!(risk_summary(&ds).unwrap(), risk_summary(&ds).unwrap());
    assert_eq!(fraud_summary(&ds).unwrap(), fraud_summary(&ds).unwrap());
    assert_eq!(customer_summary(&ds).unwrap(), customer_summary(&ds).unwrap());
}

#[test]
fn empty_dataset_is_an_error_for_every_analysis() {
    let ds = Dataset::default();
    assert!(matches!(financial_summary(&ds), Err(BankError::EmptyDataset(_))));
    assert!(matches!(risk_summary(&ds), Err(BankError::EmptyDataset(_))));
    assert!(matches!(fraud_summary(&ds), Err(BankError::EmptyDataset(_))));
    assert!(matches!(customer_summary(&ds), Err(BankError::EmptyDataset(_))));
}
