//! The in-memory banking dataset.
//!
//! RULE: A Dataset is immutable once generated. A new dataset is a new
//! value; nothing mutates records in place after generation.

use crate::types::*;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub account_number: AccountNumber,
    pub customer_id: CustomerId,
    pub account_type: AccountType,
    pub balance: f64,
    pub credit_limit: f64,
    pub bank_name: String,
    pub location: String,
    pub status: AccountStatus,
    pub created_date: NaiveDate,
    pub last_activity: NaiveDate,
    pub transaction_count: u64,
    pub risk_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: TransactionId,
    pub account_number: AccountNumber,
    /// Receiving account; present iff the type is Transfer.
    pub counterparty_account: Option<AccountNumber>,
    pub transaction_type: TransactionType,
    pub amount: f64,
    pub description: String,
    pub timestamp: NaiveDateTime,
    pub status: TransactionStatus,
    pub merchant: String,
    pub location: String,
    pub fraud_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub city: String,
    pub state: String,
    pub email: String,
    pub date_of_birth: NaiveDate,
    pub account_count: u64,
    pub total_balance: f64,
    pub credit_score: u16,
    pub income_level: IncomeLevel,
    pub risk_category: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudEvent {
    pub fraud_id: FraudId,
    pub account_number: AccountNumber,
    pub fraud_type: String,
    pub severity: Severity,
    pub detected_date: NaiveDate,
    pub status: FraudStatus,
    pub amount_involved: f64,
    pub location: String,
    pub ip_address: String,
    pub device_info: String,
    pub confidence_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_id: RiskId,
    pub account_number: AccountNumber,
    pub risk_factors: Vec<String>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub assessment_date: NaiveDate,
    pub recommendation: String,
    pub review_date: NaiveDate,
}

/// All records of one session, in generation order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub accounts: Vec<Account>,
    pub transactions: Vec<Transaction>,
    pub customers: Vec<Customer>,
    pub fraud_events: Vec<FraudEvent>,
    pub risk_assessments: Vec<RiskAssessment>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
            && self.transactions.is_empty()
            && self.customers.is_empty()
            && self.fraud_events.is_empty()
            && self.risk_assessments.is_empty()
    }

    /// One-line record count summary for headers and logs.
    pub fn summary(&self) -> String {
        format!(
            "{} accounts, {} transactions, {} customers, {} fraud events, {} risk assessments",
            self.accounts.len(),
            self.transactions.len(),
            self.customers.len(),
            self.fraud_events.len(),
            self.risk_assessments.len()
        )
    }

    /// Account position keyed by account number.
    pub fn account_index(&self) -> HashMap<&str, usize> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (a.account_number.as_str(), i))
            .collect()
    }
}
