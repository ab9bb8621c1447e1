use super::{cmp_f64, mean, Share, TOP_N};
use crate::{
    dataset::{Account, Dataset},
    error::{BankError, BankResult},
    types::RiskLevel,
};
use serde::{Deserialize, Serialize};

pub const HIGH_RISK_THRESHOLD: f64 = 70.0;
pub const LOW_RISK_THRESHOLD: f64 = 30.0;
pub const EXPOSURE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskBuckets {
    /// risk_score > 70
    pub high: usize,
    /// 30 < risk_score <= 70
    pub medium: usize,
    /// risk_score <= 30
    pub low: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedAccount {
    pub account_number: String,
    pub balance: f64,
    pub risk_score: f64,
}

impl From<&Account> for RankedAccount {
    fn from(a: &Account) -> Self {
        Self {
            account_number: a.account_number.clone(),
            balance: a.balance,
            risk_score: a.risk_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub total_accounts: usize,
    pub buckets: RiskBuckets,
    pub avg_risk_score: f64,
    /// Sum of balances over accounts with risk_score > 50.
    pub risk_exposure: f64,
    pub high_risk_balance: f64,
    pub high_risk_avg_balance: f64,
    /// Distribution of assessment risk levels.
    pub level_distribution: Vec<Share>,
    pub top_high_risk: Vec<RankedAccount>,
}

pub fn risk_summary(ds: &Dataset) -> BankResult<RiskReport> {
    if ds.accounts.is_empty() {
        return Err(BankError::EmptyDataset("risk analysis needs at least one account".into()));
    }

    let mut buckets = RiskBuckets { high: 0, medium: 0, low: 0 };
    let mut risk_sum = 0.0;
    let mut risk_exposure = 0.0;
    let mut high_risk: Vec<&Account> = Vec::new();

    for a in &ds.accounts {
        risk_sum += a.risk_score;
        if a.risk_score > HIGH_RISK_THRESHOLD {
            buckets.high += 1;
            high_risk.push(a);
        } else if a.risk_score > LOW_RISK_THRESHOLD {
            buckets.medium += 1;
        } else {
            buckets.low += 1;
        }
        if a.risk_score > EXPOSURE_THRESHOLD {
            risk_exposure += a.balance;
        }
    }

    let high_risk_balance: f64 = high_risk.iter().map(|a| a.balance).sum();
    let high_risk_avg_balance = mean(high_risk_balance, high_risk.len());

    let total_assessments = ds.risk_assessments.len();
    let level_distribution = RiskLevel::ALL
        .iter()
        .map(|level| {
            let count = ds.risk_assessments.iter().filter(|r| r.risk_level == *level).count();
            Share::new(level.label(), count, total_assessments)
        })
        .collect();

    // Descending risk, ties by descending balance; stable for full ties.
    high_risk.sort_by(|a, b| {
        cmp_f64(b.risk_score, a.risk_score).then_with(|| cmp_f64(b.balance, a.balance))
    });

    Ok(RiskReport {
        total_accounts: ds.accounts.len(),
        buckets,
        avg_risk_score: mean(risk_sum, ds.accounts.len()),
        risk_exposure,
        high_risk_balance,
        high_risk_avg_balance,
        level_distribution,
        top_high_risk: high_risk.into_iter().take(TOP_N).map(RankedAccount::from).collect(),
    })
}
