use super::{cmp_f64, mean, ranked_shares, Share, TOP_N};
use crate::{
    dataset::{Dataset, FraudEvent},
    error::{BankError, BankResult},
    types::{FraudStatus, Severity},
};
use serde::{Deserialize, Serialize};

pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedFraudEvent {
    pub fraud_id: u64,
    pub account_number: String,
    pub fraud_type: String,
    pub severity: Severity,
    pub amount_involved: f64,
    pub confidence_score: f64,
}

impl From<&FraudEvent> for RankedFraudEvent {
    fn from(f: &FraudEvent) -> Self {
        Self {
            fraud_id: f.fraud_id,
            account_number: f.account_number.clone(),
            fraud_type: f.fraud_type.clone(),
            severity: f.severity,
            amount_involved: f.amount_involved,
            confidence_score: f.confidence_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudReport {
    pub total_events: usize,
    /// Critical first, Low last.
    pub severity_counts: Vec<Share>,
    pub type_distribution: Vec<Share>,
    pub status_distribution: Vec<Share>,
    pub total_amount: f64,
    pub avg_confidence: f64,
    pub high_confidence_count: usize,
    pub high_confidence_amount: f64,
    pub top_events: Vec<RankedFraudEvent>,
}

pub fn fraud_summary(ds: &Dataset) -> BankResult<FraudReport> {
    let events = &ds.fraud_events;
    if events.is_empty() {
        return Err(BankError::EmptyDataset("fraud analysis needs at least one fraud event".into()));
    }
    let total = events.len();

    let severity_counts = Severity::ALL
        .iter()
        .rev()
        .map(|s| Share::new(s.label(), events.iter().filter(|e| e.severity == *s).count(), total))
        .collect();

    let status_distribution = FraudStatus::ALL
        .iter()
        .map(|s| Share::new(s.label(), events.iter().filter(|e| e.status == *s).count(), total))
        .collect();

    let total_amount: f64 = events.iter().map(|e| e.amount_involved).sum();
    let confidence_sum: f64 = events.iter().map(|e| e.confidence_score).sum();
    let high: Vec<&FraudEvent> = events
        .iter()
        .filter(|e| e.confidence_score > HIGH_CONFIDENCE_THRESHOLD)
        .collect();

    let mut ranked: Vec<&FraudEvent> = events.iter().collect();
    ranked.sort_by(|a, b| cmp_f64(b.confidence_score, a.confidence_score));

    Ok(FraudReport {
        total_events: total,
        severity_counts,
        type_distribution: ranked_shares(events.iter().map(|e| e.fraud_type.as_str()), total),
        status_distribution,
        total_amount,
        avg_confidence: mean(confidence_sum, total),
        high_confidence_count: high.len(),
        high_confidence_amount: high.iter().map(|e| e.amount_involved).sum(),
        top_events: ranked.into_iter().take(TOP_N).map(RankedFraudEvent::from).collect(),
    })
}
