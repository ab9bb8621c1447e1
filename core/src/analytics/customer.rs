use super::{cmp_f64, mean, Share, TOP_N};
use crate::{
    dataset::{Customer, Dataset},
    error::{BankError, BankResult},
    types::{IncomeLevel, RiskLevel},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCustomer {
    pub customer_id: u64,
    pub customer_name: String,
    pub total_balance: f64,
    pub credit_score: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerReport {
    pub total_customers: usize,
    pub avg_credit_score: f64,
    pub avg_account_count: f64,
    pub total_customer_balance: f64,
    pub income_distribution: Vec<Share>,
    pub risk_category_distribution: Vec<Share>,
    /// Excellent (>=750), Good (700-749), Fair (650-699), Poor (<650).
    pub credit_buckets: Vec<Share>,
    pub top_customers: Vec<RankedCustomer>,
}

pub fn customer_summary(ds: &Dataset) -> BankResult<CustomerReport> {
    let customers = &ds.customers;
    if customers.is_empty() {
        return Err(BankError::EmptyDataset("customer analysis needs at least one customer".into()));
    }
    let total = customers.len();

    let income_distribution = IncomeLevel::ALL
        .iter()
        .map(|l| Share::new(l.label(), customers.iter().filter(|c| c.income_level == *l).count(), total))
        .collect();
    let risk_category_distribution = RiskLevel::ALL
        .iter()
        .map(|l| Share::new(l.label(), customers.iter().filter(|c| c.risk_category == *l).count(), total))
        .collect();

    let mut buckets = [0usize; 4];
    for c in customers {
        let slot = match c.credit_score {
            750..=u16::MAX => 0,
            700..=749 => 1,
            650..=699 => 2,
            _ => 3,
        };
        buckets[slot] += 1;
    }
    let credit_buckets = ["Excellent (750+)", "Good (700-749)", "Fair (650-699)", "Poor (<650)"]
        .into_iter()
        .zip(buckets)
        .map(|(label, count)| Share::new(label, count, total))
        .collect();

    let mut ranked: Vec<&Customer> = customers.iter().collect();
    ranked.sort_by(|a, b| cmp_f64(b.total_balance, a.total_balance));

    let credit_sum: f64 = customers.iter().map(|c| c.credit_score as f64).sum();
    let account_sum: f64 = customers.iter().map(|c| c.account_count as f64).sum();

    Ok(CustomerReport {
        total_customers: total,
        avg_credit_score: mean(credit_sum, total),
        avg_account_count: mean(account_sum, total),
        total_customer_balance: customers.iter().map(|c| c.total_balance).sum(),
        income_distribution,
        risk_category_distribution,
        credit_buckets,
        top_customers: ranked
            .into_iter()
            .take(TOP_N)
            .map(|c| RankedCustomer {
                customer_id: c.customer_id,
                customer_name: c.customer_name.clone(),
                total_balance: c.total_balance,
                credit_score: c.credit_score,
            })
            .collect(),
    })
}
