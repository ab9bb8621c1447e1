use super::mean;
use crate::{
    dataset::Dataset,
    error::{BankError, BankResult},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
    pub account_count: usize,
    pub total_balance: f64,
    pub avg_balance: f64,
    pub median_balance: f64,
    pub total_transactions: usize,
    pub total_volume: f64,
}

/// Sum, mean and count of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub key: String,
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialReport {
    pub overall_totals: OverallTotals,
    pub per_bank: Vec<GroupStats>,
    pub per_account_type: Vec<GroupStats>,
    pub per_transaction_type: Vec<GroupStats>,
}

pub fn financial_summary(ds: &Dataset) -> BankResult<FinancialReport> {
    if ds.accounts.is_empty() {
        return Err(BankError::EmptyDataset("financial analysis needs at least one account".into()));
    }

    let total_balance: f64 = ds.accounts.iter().map(|a| a.balance).sum();
    let total_volume: f64 = ds.transactions.iter().map(|t| t.amount).sum();

    let overall_totals = OverallTotals {
        account_count: ds.accounts.len(),
        total_balance,
        avg_balance: mean(total_balance, ds.accounts.len()),
        median_balance: median(ds.accounts.iter().map(|a| a.balance).collect()),
        total_transactions: ds.transactions.len(),
        total_volume,
    };

    Ok(FinancialReport {
        overall_totals,
        per_bank: group(ds.accounts.iter().map(|a| (a.bank_name.clone(), a.balance))),
        per_account_type: group(ds.accounts.iter().map(|a| (a.account_type.to_string(), a.balance))),
        per_transaction_type: group(
            ds.transactions.iter().map(|t| (t.transaction_type.to_string(), t.amount)),
        ),
    })
}

/// Group (key, value) pairs; output is ordered by key.
fn group(rows: impl Iterator<Item = (String, f64)>) -> Vec<GroupStats> {
    let mut groups: BTreeMap<String, (usize, f64)> = BTreeMap::new();
    for (key, value) in rows {
        let entry = groups.entry(key).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += value;
    }
    groups
        .into_iter()
        .map(|(key, (count, sum))| GroupStats { key, count, sum, mean: mean(sum, count) })
        .collect()
}

fn median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| super::cmp_f64(*a, *b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_handles_odd_and_even() {
        assert_eq!(median(vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(vec![4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(vec![]), 0.0);
    }

    #[test]
    fn groups_are_sorted_by_key() {
        let rows = vec![("b".to_string(), 1.0), ("a".to_string(), 2.0), ("b".to_string(), 3.0)];
        let g = group(rows.into_iter());
        assert_eq!(g[0].key, "a");
        assert_eq!(g[1].count, 2);
        assert_eq!(g[1].mean, 2.0);
    }
}
