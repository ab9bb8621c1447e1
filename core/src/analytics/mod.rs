//! Analytics engine.
//!
//! RULE: Every function here is pure. It reads an immutable Dataset,
//! performs no I/O, and either returns a complete report or an
//! EmptyDataset error. Nothing is partially populated.

mod customer;
mod financial;
mod fraud;
mod risk;

pub use customer::{customer_summary, CustomerReport, RankedCustomer};
pub use financial::{financial_summary, FinancialReport, GroupStats, OverallTotals};
pub use fraud::{fraud_summary, FraudReport, RankedFraudEvent};
pub use risk::{risk_summary, RankedAccount, RiskBuckets, RiskReport};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Number of entries in every "top N" list.
pub const TOP_N: usize = 10;

/// One row of a categorical distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percent: f64,
}

impl Share {
    pub fn new(label: impl Into<String>, count: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            count as f64 / total as f64 * 100.0
        };
        Self { label: label.into(), count, percent }
    }
}

/// The analyses the View Model can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Financial,
    Risk,
    Fraud,
    Customer,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 4] = [Self::Financial, Self::Risk, Self::Fraud, Self::Customer];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Risk => "risk",
            Self::Fraud => "fraud",
            Self::Customer => "customer",
        }
    }
}

pub(crate) fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Total order on floats for ranking; NaN never occurs in generated data.
pub(crate) fn cmp_f64(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Categorical distribution for strings: count descending, label ascending.
pub(crate) fn ranked_shares<'a>(labels: impl Iterator<Item = &'a str>, total: usize) -> Vec<Share> {
    let mut counts: std::collections::BTreeMap<&str, usize> = std::collections::BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut rows: Vec<(&str, usize)> = counts.into_iter().collect();
    // BTreeMap order is ascending by label; a stable sort keeps it for ties.
    rows.sort_by(|a, b| b.1.cmp(&a.1));
    rows.into_iter().map(|(label, count)| Share::new(label, count, total)).collect()
}
