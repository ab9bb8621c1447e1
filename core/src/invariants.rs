//! Executable dataset invariants.
//!
//! `check` walks a dataset once per rule and reports every violation it
//! finds, so tests and the reload path can assert `violations.is_empty()`.

use crate::{dataset::Dataset, types::round2};
use std::collections::{HashMap, HashSet};

/// One broken rule, with enough context to find the record.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub rule: &'static str,
    pub detail: String,
}

fn push(out: &mut Vec<Violation>, rule: &'static str, detail: String) {
    out.push(Violation { rule, detail });
}

fn in_range(v: f64, lo: f64, hi: f64) -> bool {
    v.is_finite() && v >= lo && v <= hi
}

pub fn check(ds: &Dataset) -> Vec<Violation> {
    let mut out = Vec::new();

    // ── Unique account numbers ────────────────────────────────
    let mut numbers = HashSet::with_capacity(ds.accounts.len());
    for a in &ds.accounts {
        if !numbers.insert(a.account_number.as_str()) {
            push(&mut out, "unique_account_number", a.account_number.clone());
        }
        if a.account_number.len() != 10 || !a.account_number.bytes().all(|b| b.is_ascii_digit()) {
            push(&mut out, "account_number_format", a.account_number.clone());
        }
    }

    // ── Foreign keys ──────────────────────────────────────────
    let customer_ids: HashSet<u64> = ds.customers.iter().map(|c| c.customer_id).collect();
    for a in &ds.accounts {
        if !customer_ids.contains(&a.customer_id) {
            push(&mut out, "account_customer_fk", format!("account {} -> customer {}", a.account_id, a.customer_id));
        }
    }
    for t in &ds.transactions {
        if !numbers.contains(t.account_number.as_str()) {
            push(&mut out, "transaction_account_fk", format!("transaction {}", t.transaction_id));
        }
        if let Some(cp) = &t.counterparty_account {
            if !numbers.contains(cp.as_str()) {
                push(&mut out, "transaction_counterparty_fk", format!("transaction {}", t.transaction_id));
            }
        }
    }
    for f in &ds.fraud_events {
        if !numbers.contains(f.account_number.as_str()) {
            push(&mut out, "fraud_account_fk", format!("fraud event {}", f.fraud_id));
        }
    }
    for r in &ds.risk_assessments {
        if !numbers.contains(r.account_number.as_str()) {
            push(&mut out, "risk_account_fk", format!("risk assessment {}", r.risk_id));
        }
    }

    // ── Accounts ──────────────────────────────────────────────
    let mut txn_counts: HashMap<&str, u64> = HashMap::new();
    for t in &ds.transactions {
        *txn_counts.entry(t.account_number.as_str()).or_default() += 1;
    }
    for a in &ds.accounts {
        let id = a.account_id;
        if !(a.balance.is_finite() && a.balance >= 0.0) || round2(a.balance) != a.balance {
            push(&mut out, "account_balance", format!("account {id}: {}", a.balance));
        }
        let credit = a.account_type == crate::types::AccountType::Credit;
        if a.credit_limit < 0.0 || (!credit && a.credit_limit != 0.0) {
            push(&mut out, "account_credit_limit", format!("account {id}: {}", a.credit_limit));
        }
        if !in_range(a.risk_score, 0.0, 100.0) {
            push(&mut out, "account_risk_score", format!("account {id}: {}", a.risk_score));
        }
        if a.created_date > a.last_activity {
            push(&mut out, "account_dates", format!("account {id}"));
        }
        let expected = txn_counts.get(a.account_number.as_str()).copied().unwrap_or(0);
        if a.transaction_count != expected {
            push(&mut out, "account_transaction_count", format!("account {id}: {} != {expected}", a.transaction_count));
        }
    }

    // ── Transactions ──────────────────────────────────────────
    for t in &ds.transactions {
        let id = t.transaction_id;
        if t.transaction_type.is_debit() != (t.amount < 0.0) {
            push(&mut out, "transaction_sign", format!("transaction {id}: {} {}", t.transaction_type, t.amount));
        }
        let transfer = t.transaction_type == crate::types::TransactionType::Transfer;
        if transfer != t.counterparty_account.is_some() {
            push(&mut out, "transaction_counterparty", format!("transaction {id}"));
        }
        if !in_range(t.fraud_score, 0.0, 100.0) {
            push(&mut out, "transaction_fraud_score", format!("transaction {id}: {}", t.fraud_score));
        }
    }

    // ── Customers ─────────────────────────────────────────────
    let mut per_customer: HashMap<u64, (u64, f64)> = HashMap::new();
    for a in &ds.accounts {
        let entry = per_customer.entry(a.customer_id).or_default();
        entry.0 += 1;
        entry.1 += a.balance;
    }
    for c in &ds.customers {
        let id = c.customer_id;
        if !(300..=850).contains(&c.credit_score) {
            push(&mut out, "customer_credit_score", format!("customer {id}: {}", c.credit_score));
        }
        let (count, sum) = per_customer.get(&id).copied().unwrap_or((0, 0.0));
        if c.account_count < 1 || c.account_count != count {
            push(&mut out, "customer_account_count", format!("customer {id}: {} != {count}", c.account_count));
        }
        if c.total_balance < 0.0 || (c.total_balance - sum).abs() > 0.005 {
            push(&mut out, "customer_total_balance", format!("customer {id}: {} != {sum}", c.total_balance));
        }
    }

    // ── Fraud events and risk assessments ─────────────────────
    for f in &ds.fraud_events {
        if !(f.amount_involved >= 0.0) || !in_range(f.confidence_score, 0.0, 100.0) {
            push(&mut out, "fraud_ranges", format!("fraud event {}", f.fraud_id));
        }
    }
    for r in &ds.risk_assessments {
        if !in_range(r.risk_score, 0.0, 100.0) {
            push(&mut out, "risk_score", format!("risk assessment {}", r.risk_id));
        }
        if r.assessment_date > r.review_date {
            push(&mut out, "risk_dates", format!("risk assessment {}", r.risk_id));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, config::GeneratorConfig, generator::generate};

    #[test]
    fn detects_broken_sign_and_dangling_reference() {
        let clock = FixedClock::at_date(2025, 6, 30).unwrap();
        let mut ds = generate(&GeneratorConfig::default_test(), &clock).unwrap();
        assert!(check(&ds).is_empty());

        ds.transactions[0].amount = -ds.transactions[0].amount;
        ds.fraud_events[0].account_number = "0000000000".into();
        let rules: Vec<_> = check(&ds).into_iter().map(|v| v.rule).collect();
        assert!(rules.contains(&"transaction_sign"));
        assert!(rules.contains(&"fraud_account_fk"));
    }
}
