use crate::{
    error::{BankError, BankResult},
    types::{AccountStatus, AccountType, TransactionStatus, TransactionType},
};
use serde::{Deserialize, Serialize};

// ── Dataset generation ─────────────────────────────────────────────

/// Everything the dataset generator needs. Field names match the
/// JSON accepted by [`GeneratorConfig::load`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub num_accounts: usize,
    pub num_transactions: usize,
    pub num_customers: usize,
    pub num_fraud_events: usize,
    pub num_risk_assessments: usize,
    pub seed: u64,
    pub bank_names: Vec<String>,
    pub locations: Vec<String>,
    pub account_types: Vec<AccountType>,
    pub statuses: Vec<AccountStatus>,
    pub transaction_types: Vec<TransactionType>,
    pub transaction_statuses: Vec<TransactionStatus>,
    pub fraud_types: Vec<String>,
    pub risk_factors: Vec<String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            num_accounts: 500,
            num_transactions: 2000,
            num_customers: 200,
            num_fraud_events: 100,
            num_risk_assessments: 200,
            seed: 42,
            bank_names: strings(&[
                "Chase Bank",
                "Bank of America",
                "Wells Fargo",
                "Citibank",
                "Goldman Sachs",
                "Morgan Stanley",
            ]),
            locations: strings(&[
                "New York, NY",
                "Los Angeles, CA",
                "Chicago, IL",
                "Houston, TX",
                "Phoenix, AZ",
                "Philadelphia, PA",
            ]),
            account_types: AccountType::ALL.to_vec(),
            statuses: AccountStatus::ALL.to_vec(),
            transaction_types: TransactionType::ALL.to_vec(),
            transaction_statuses: TransactionStatus::ALL.to_vec(),
            fraud_types: strings(&[
                "Unusual transaction pattern",
                "Multiple failed login attempts",
                "Suspicious location",
                "Large amount transfer",
                "Unusual time",
                "New device access",
                "Account takeover attempt",
                "Phishing attempt",
                "Malware detection",
                "Social engineering",
            ]),
            risk_factors: strings(&[
                "High transaction volume",
                "Large balance fluctuations",
                "Multiple accounts",
                "International transactions",
                "Unusual patterns",
                "Credit score changes",
                "Income verification",
                "Employment status",
                "Address changes",
            ]),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Missing keys fall back to the defaults.
    pub fn load(path: &str) -> BankResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BankError::Config(format!("Cannot read {path}: {e}")))?;
        Self::from_json(&content)
    }

    /// Parse from JSON text. A negative count is rejected here, since
    /// counts are unsigned.
    pub fn from_json(content: &str) -> BankResult<Self> {
        let config: Self = serde_json::from_str(content)
            .map_err(|e| BankError::Config(format!("Invalid generator config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Small config for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            num_accounts: 60,
            num_transactions: 240,
            num_customers: 25,
            num_fraud_events: 20,
            num_risk_assessments: 30,
            seed: 7,
            ..Self::default()
        }
    }

    /// A config that produces a dataset with no records at all.
    pub fn empty() -> Self {
        Self {
            num_accounts: 0,
            num_transactions: 0,
            num_customers: 0,
            num_fraud_events: 0,
            num_risk_assessments: 0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> BankResult<()> {
        non_empty("bank_names", &self.bank_names)?;
        non_empty("locations", &self.locations)?;
        non_empty("account_types", &self.account_types)?;
        non_empty("statuses", &self.statuses)?;
        non_empty("transaction_types", &self.transaction_types)?;
        non_empty("transaction_statuses", &self.transaction_statuses)?;
        non_empty("fraud_types", &self.fraud_types)?;
        non_empty("risk_factors", &self.risk_factors)?;

        // Every customer owns at least one account.
        if self.num_accounts < self.num_customers {
            return Err(BankError::Config(format!(
                "num_accounts ({}) must be >= num_customers ({})",
                self.num_accounts, self.num_customers
            )));
        }
        if self.num_accounts > 0 && self.num_customers == 0 {
            return Err(BankError::Config(
                "accounts require at least one customer".into(),
            ));
        }
        let needs_accounts = self.num_transactions + self.num_fraud_events + self.num_risk_assessments;
        if needs_accounts > 0 && self.num_accounts == 0 {
            return Err(BankError::Config(
                "transactions, fraud events and risk assessments require at least one account".into(),
            ));
        }
        // Account numbers are drawn from 9e9 ten-digit values.
        if self.num_accounts > 1_000_000_000 {
            return Err(BankError::Config("num_accounts is too large".into()));
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn non_empty<T>(name: &str, items: &[T]) -> BankResult<()> {
    if items.is_empty() {
        return Err(BankError::Config(format!("{name} must not be empty")));
    }
    Ok(())
}

// ── Algorithm parameters ───────────────────────────────────────────

/// Which account field drives a greedy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GreedyKey {
    Balance,
    RiskScore,
    TransactionCount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GreedyParams {
    /// Number of accounts each selection keeps.
    pub k: usize,
}

impl Default for GreedyParams {
    fn default() -> Self {
        Self { k: 50 }
    }
}

impl GreedyParams {
    pub fn validate(&self) -> BankResult<()> {
        if self.k == 0 {
            return Err(BankError::Config("greedy k must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphParams {
    /// Start vertex; defaults to the first account.
    pub source: Option<String>,
    /// Dijkstra target; defaults to the last account.
    pub target: Option<String>,
    /// BFS depth limit; defaults to 3.
    pub max_depth: Option<usize>,
}

pub const DEFAULT_BFS_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringParams {
    pub k_values: Vec<usize>,
    pub max_iters: usize,
}

impl Default for ClusteringParams {
    fn default() -> Self {
        Self {
            k_values: vec![3, 5, 7],
            max_iters: 100,
        }
    }
}

impl ClusteringParams {
    pub fn validate(&self) -> BankResult<()> {
        if self.k_values.is_empty() {
            return Err(BankError::Config("clustering needs at least one k".into()));
        }
        if self.k_values.contains(&0) {
            return Err(BankError::Config("clustering k must be positive".into()));
        }
        if self.max_iters == 0 {
            return Err(BankError::Config("max_iters must be positive".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticParams {
    pub population_size: usize,
    pub generations: usize,
    pub mutation_rate: f64,
    pub crossover_rate: f64,
    pub tournament_size: usize,
}

impl Default for GeneticParams {
    fn default() -> Self {
        Self {
            population_size: 50,
            generations: 100,
            mutation_rate: 0.01,
            crossover_rate: 1.0,
            tournament_size: 3,
        }
    }
}

impl GeneticParams {
    pub fn validate(&self) -> BankResult<()> {
        if self.tournament_size == 0 {
            return Err(BankError::Config("tournament_size must be positive".into()));
        }
        if self.population_size < 3 {
            return Err(BankError::Config(format!(
                "population_size must be at least 3, got {}",
                self.population_size
            )));
        }
        if self.population_size < self.tournament_size {
            return Err(BankError::Config(format!(
                "population_size ({}) must be >= tournament_size ({})",
                self.population_size, self.tournament_size
            )));
        }
        for (name, p) in [("mutation_rate", self.mutation_rate), ("crossover_rate", self.crossover_rate)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(BankError::Config(format!("{name} must be within [0, 1], got {p}")));
            }
        }
        Ok(())
    }
}

/// Parameters for every algorithm, as used by "run all".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlgorithmSettings {
    pub greedy: GreedyParams,
    pub graph: GraphParams,
    pub clustering: ClusteringParams,
    pub genetic: GeneticParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GeneratorConfig::default().validate().unwrap();
        GeneratorConfig::default_test().validate().unwrap();
        GeneratorConfig::empty().validate().unwrap();
        GeneticParams::default().validate().unwrap();
        ClusteringParams::default().validate().unwrap();
    }

    #[test]
    fn negative_count_in_json_is_config_error() {
        let err = GeneratorConfig::from_json(r#"{ "num_accounts": -5 }"#).unwrap_err();
        assert!(matches!(err, BankError::Config(_)), "got {err:?}");
    }

    #[test]
    fn empty_enumeration_is_config_error() {
        let err = GeneratorConfig::from_json(r#"{ "bank_names": [] }"#).unwrap_err();
        assert!(matches!(err, BankError::Config(_)));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = GeneratorConfig::from_json(r#"{ "seed": 9, "account_types": ["Credit", "Savings"] }"#).unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.account_types, vec![AccountType::Credit, AccountType::Savings]);
        assert_eq!(cfg.num_accounts, 500);
    }
}
