//! Dataset generator.
//!
//! GENERATION ORDER (fixed, never reordered, since every draw
//! shifts the RNG stream):
//!   1. Customers
//!   2. Accounts        (each owned by an existing customer)
//!   3. Transactions    (Transfers reference a second account)
//!   4. Fraud events
//!   5. Risk assessments
//!   6. Derived totals  (transaction_count, account_count, total_balance)

use crate::{
    clock::Clock,
    config::GeneratorConfig,
    dataset::*,
    error::BankResult,
    name_generator::NameGenerator,
    rng::{DataRng, RngBank, StreamSlot},
    types::*,
};
use chrono::Duration;
use std::collections::HashSet;

const DESCRIPTIONS: &[&str] = &[
    "Salary deposit",
    "ATM withdrawal",
    "Online transfer",
    "Utility payment",
    "Credit card payment",
    "Loan payment",
    "Investment deposit",
    "Insurance payment",
    "Tax payment",
    "Shopping",
    "Restaurant",
    "Gas station",
    "Grocery store",
    "Online purchase",
    "Subscription payment",
];

const RECOMMENDATIONS: &[&str] = &[
    "Monitor account activity",
    "Implement additional security",
    "Contact customer",
    "Freeze account",
    "Require additional verification",
    "No action required",
];

const MAX_RISK_FACTORS: usize = 4;

/// Generate a dataset from `config`, timestamped relative to `clock`.
/// Same config and same clock instant produce identical datasets.
pub fn generate(config: &GeneratorConfig, clock: &dyn Clock) -> BankResult<Dataset> {
    config.validate()?;
    let mut rng = RngBank::new(config.seed).stream(StreamSlot::Generator);
    let mut builder = Generator { config, clock, rng: &mut rng };

    let mut customers = builder.customers()?;
    let mut accounts = builder.accounts()?;
    let transactions = builder.transactions(&accounts)?;
    let fraud_events = builder.fraud_events(&accounts)?;
    let risk_assessments = builder.risk_assessments(&accounts)?;

    link_totals(&mut customers, &mut accounts, &transactions);

    let dataset = Dataset {
        accounts,
        transactions,
        customers,
        fraud_events,
        risk_assessments,
    };
    log::info!("generator: seed={} produced {}", config.seed, dataset.summary());
    Ok(dataset)
}

struct Generator<'a> {
    config: &'a GeneratorConfig,
    clock: &'a dyn Clock,
    rng: &'a mut DataRng,
}

impl Generator<'_> {
    fn customers(&mut self) -> BankResult<Vec<Customer>> {
        let n = self.config.num_customers;
        let mut customers = Vec::with_capacity(n);
        for i in 0..n {
            let customer_id = i as u64 + 1;
            let customer_name = NameGenerator::full_name(self.rng);
            let (city, state) = NameGenerator::city_state(self.rng);
            // 18 to 70 years old.
            let age_days = self.rng.rand_int(6570, 25550)?;
            customers.push(Customer {
                customer_id,
                email: NameGenerator::email(&customer_name, customer_id),
                customer_name,
                city: city.to_string(),
                state: state.to_string(),
                date_of_birth: self.clock.offset_days(-age_days).date(),
                account_count: 0,
                total_balance: 0.0,
                credit_score: self.rng.rand_int(300, 850)? as u16,
                income_level: *self.rng.choose(IncomeLevel::ALL)?,
                risk_category: *self.rng.choose(RiskLevel::ALL)?,
            });
        }
        Ok(customers)
    }

    fn accounts(&mut self) -> BankResult<Vec<Account>> {
        let cfg = self.config;
        let n = cfg.num_accounts;
        let mut accounts = Vec::with_capacity(n);
        let mut used_numbers = HashSet::with_capacity(n);

        for i in 0..n {
            // The first num_customers accounts cover every customer once.
            let customer_id = if i < cfg.num_customers {
                i as u64 + 1
            } else {
                self.rng.rand_int(1, cfg.num_customers as i64)? as u64
            };

            let account_number = loop {
                let candidate = self.rng.rand_int(1_000_000_000, 9_999_999_999)?.to_string();
                if used_numbers.insert(candidate.clone()) {
                    break candidate;
                }
            };

            let account_type = *self.rng.choose(&cfg.account_types)?;
            let balance = round2(self.rng.rand_uniform(1_000.0, 1_000_000.0)?);
            let credit_limit = if account_type == AccountType::Credit {
                round2(self.rng.rand_uniform(5_000.0, 50_000.0)?)
            } else {
                0.0
            };

            let created_days_ago = self.rng.rand_int(1, 3650)?;
            let last_days_ago = self.rng.rand_int(0, created_days_ago.min(30))?;

            accounts.push(Account {
                account_id: i as u64 + 1,
                account_number,
                customer_id,
                account_type,
                balance,
                credit_limit,
                bank_name: self.rng.choose(&cfg.bank_names)?.clone(),
                location: self.rng.choose(&cfg.locations)?.clone(),
                status: *self.rng.choose(&cfg.statuses)?,
                created_date: self.clock.offset_days(-created_days_ago).date(),
                last_activity: self.clock.offset_days(-last_days_ago).date(),
                transaction_count: 0,
                risk_score: round2(self.rng.rand_uniform(0.0, 100.0)?),
            });
        }
        Ok(accounts)
    }

    fn transactions(&mut self, accounts: &[Account]) -> BankResult<Vec<Transaction>> {
        let cfg = self.config;
        let n = cfg.num_transactions;
        let mut transactions = Vec::with_capacity(n);

        for i in 0..n {
            let account_number = self.rng.choose(accounts)?.account_number.clone();
            let transaction_type = *self.rng.choose(&cfg.transaction_types)?;
            let counterparty_account = if transaction_type == TransactionType::Transfer {
                Some(self.rng.choose(accounts)?.account_number.clone())
            } else {
                None
            };

            let magnitude = round2(self.rng.rand_uniform(10.0, 10_000.0)?);
            let amount = if transaction_type.is_debit() { -magnitude } else { magnitude };

            // Strictly within the last 365 days.
            let days = self.rng.rand_int(0, 364)?;
            let hours = self.rng.rand_int(0, 23)?;
            let minutes = self.rng.rand_int(0, 59)?;
            let timestamp = self.clock.now()
                - Duration::days(days)
                - Duration::hours(hours)
                - Duration::minutes(minutes);

            transactions.push(Transaction {
                transaction_id: i as u64 + 1,
                account_number,
                counterparty_account,
                transaction_type,
                amount,
                description: self.rng.choose(DESCRIPTIONS)?.to_string(),
                timestamp,
                status: *self.rng.choose(&cfg.transaction_statuses)?,
                merchant: format!("Merchant_{}", self.rng.rand_int(1, 100)?),
                location: format!("Location_{}", self.rng.rand_int(1, 50)?),
                fraud_score: round2(self.rng.rand_uniform(0.0, 100.0)?),
            });
        }
        Ok(transactions)
    }

    fn fraud_events(&mut self, accounts: &[Account]) -> BankResult<Vec<FraudEvent>> {
        let cfg = self.config;
        let mut events = Vec::with_capacity(cfg.num_fraud_events);

        for i in 0..cfg.num_fraud_events {
            let account_number = self.rng.choose(accounts)?.account_number.clone();
            let ip_address = format!(
                "{}.{}.{}.{}",
                self.rng.rand_int(1, 255)?,
                self.rng.rand_int(1, 255)?,
                self.rng.rand_int(1, 255)?,
                self.rng.rand_int(1, 255)?
            );
            events.push(FraudEvent {
                fraud_id: i as u64 + 1,
                account_number,
                fraud_type: self.rng.choose(&cfg.fraud_types)?.clone(),
                severity: *self.rng.choose(Severity::ALL)?,
                detected_date: self.clock.offset_days(-self.rng.rand_int(0, 30)?).date(),
                status: *self.rng.choose(FraudStatus::ALL)?,
                amount_involved: round2(self.rng.rand_uniform(100.0, 50_000.0)?),
                location: format!("Location_{}", self.rng.rand_int(1, 50)?),
                ip_address,
                device_info: format!("Device_{}", self.rng.rand_int(1, 100)?),
                confidence_score: round2(self.rng.rand_uniform(0.0, 100.0)?),
            });
        }
        Ok(events)
    }

    fn risk_assessments(&mut self, accounts: &[Account]) -> BankResult<Vec<RiskAssessment>> {
        let cfg = self.config;
        let mut assessments = Vec::with_capacity(cfg.num_risk_assessments);
        let max_factors = cfg.risk_factors.len().min(MAX_RISK_FACTORS) as i64;

        for i in 0..cfg.num_risk_assessments {
            let account_number = self.rng.choose(accounts)?.account_number.clone();
            let factor_count = self.rng.rand_int(1, max_factors)? as usize;
            let risk_factors = self.rng.sample(&cfg.risk_factors, factor_count)?;
            let risk_score = round2(self.rng.rand_uniform(0.0, 100.0)?);
            let assessed_days_ago = self.rng.rand_int(0, 90)?;
            let review_in_days = self.rng.rand_int(30, 90)?;

            assessments.push(RiskAssessment {
                risk_id: i as u64 + 1,
                account_number,
                risk_factors,
                risk_score,
                risk_level: RiskLevel::from_score(risk_score),
                assessment_date: self.clock.offset_days(-assessed_days_ago).date(),
                recommendation: self.rng.choose(RECOMMENDATIONS)?.to_string(),
                review_date: self.clock.offset_days(review_in_days).date(),
            });
        }
        Ok(assessments)
    }
}

/// Fill in the derived per-account and per-customer totals.
fn link_totals(customers: &mut [Customer], accounts: &mut [Account], transactions: &[Transaction]) {
    let index: std::collections::HashMap<String, usize> = accounts
        .iter()
        .enumerate()
        .map(|(i, a)| (a.account_number.clone(), i))
        .collect();
    for txn in transactions {
        if let Some(&i) = index.get(&txn.account_number) {
            accounts[i].transaction_count += 1;
        }
    }

    // Customer ids are dense, starting at 1.
    let mut sums = vec![0.0f64; customers.len()];
    for account in accounts.iter() {
        let slot = (account.customer_id - 1) as usize;
        sums[slot] += account.balance;
        customers[slot].account_count += 1;
    }
    for (customer, sum) in customers.iter_mut().zip(sums) {
        customer.total_balance = round2(sum);
    }
}
