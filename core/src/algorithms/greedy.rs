//! Greedy top-k account selection.

use super::CancelToken;
use crate::{
    analytics::{RankedAccount, TOP_N},
    config::{GreedyKey, GreedyParams, SortDirection},
    dataset::{Account, Dataset},
    error::{BankError, BankResult},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub fn key_value(account: &Account, key: GreedyKey) -> f64 {
    match key {
        GreedyKey::Balance => account.balance,
        GreedyKey::RiskScore => account.risk_score,
        GreedyKey::TransactionCount => account.transaction_count as f64,
    }
}

/// First `k` accounts after a stable sort by `key` in `direction`.
/// Ties keep input order. O(n log n).
pub fn select_top_k<'a>(
    accounts: &'a [Account],
    key: GreedyKey,
    direction: SortDirection,
    k: usize,
) -> Vec<&'a Account> {
    let mut sorted: Vec<&Account> = accounts.iter().collect();
    sorted.sort_by(|a, b| {
        let ord = key_value(a, key)
            .partial_cmp(&key_value(b, key))
            .unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
    sorted.truncate(k);
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreedySelection {
    pub key: GreedyKey,
    pub direction: SortDirection,
    pub selected_count: usize,
    /// Sum of balances of the selected accounts.
    pub total_value: f64,
    /// total_value / sum of all balances.
    pub optimisation_ratio: f64,
    pub avg_key: f64,
    /// Mean of the key across all accounts.
    pub population_avg_key: f64,
    pub top: Vec<RankedAccount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreedyReport {
    pub k: usize,
    /// Balance-based first, then risk-based, then activity-based.
    pub selections: Vec<GreedySelection>,
}

impl GreedyReport {
    pub fn primary(&self) -> Option<&GreedySelection> {
        self.selections.first()
    }
}

const CRITERIA: [(GreedyKey, SortDirection); 3] = [
    (GreedyKey::Balance, SortDirection::Descending),
    (GreedyKey::RiskScore, SortDirection::Ascending),
    (GreedyKey::TransactionCount, SortDirection::Descending),
];

pub fn run_greedy(ds: &Dataset, params: &GreedyParams, cancel: &CancelToken) -> BankResult<GreedyReport> {
    params.validate()?;
    if ds.accounts.is_empty() {
        return Err(BankError::EmptyDataset("greedy selection needs at least one account".into()));
    }
    let all_balance: f64 = ds.accounts.iter().map(|a| a.balance).sum();
    let n = ds.accounts.len() as f64;

    let mut selections = Vec::with_capacity(CRITERIA.len());
    for (key, direction) in CRITERIA {
        cancel.checkpoint()?;
        let picked = select_top_k(&ds.accounts, key, direction, params.k);
        let total_value: f64 = picked.iter().map(|a| a.balance).sum();
        let key_sum: f64 = picked.iter().map(|a| key_value(a, key)).sum();
        let population_sum: f64 = ds.accounts.iter().map(|a| key_value(a, key)).sum();

        selections.push(GreedySelection {
            key,
            direction,
            selected_count: picked.len(),
            total_value,
            optimisation_ratio: if all_balance > 0.0 { total_value / all_balance } else { 0.0 },
            avg_key: key_sum / picked.len() as f64,
            population_avg_key: population_sum / n,
            top: picked.iter().take(TOP_N).map(|a| RankedAccount::from(*a)).collect(),
        });
    }
    log::debug!("greedy: k={} over {} accounts", params.k, ds.accounts.len());
    Ok(GreedyReport { k: params.k, selections })
}
