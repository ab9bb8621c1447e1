//! The View Model's results record. One optional entry per result kind;
//! an absent entry means that analysis or algorithm has not completed.

use crate::{
    algorithms::{
        genetic::GeneticReport, graph::GraphReport, greedy::GreedyReport, kmeans::ClusteringReport,
        AlgorithmKind,
    },
    analytics::{AnalysisKind, CustomerReport, FinancialReport, FraudReport, RiskReport},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greedy: Option<GreedyReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clustering: Option<ClusteringReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genetic: Option<GeneticReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub financial: Option<FinancialReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk: Option<RiskReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fraud: Option<FraudReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerReport>,
}

impl AnalysisResults {
    pub fn has_analysis(&self, kind: AnalysisKind) -> bool {
        match kind {
            AnalysisKind::Financial => self.financial.is_some(),
            AnalysisKind::Risk => self.risk.is_some(),
            AnalysisKind::Fraud => self.fraud.is_some(),
            AnalysisKind::Customer => self.customer.is_some(),
        }
    }

    pub fn has_algorithm(&self, kind: AlgorithmKind) -> bool {
        match kind {
            AlgorithmKind::Greedy => self.greedy.is_some(),
            AlgorithmKind::Graph => self.graph.is_some(),
            AlgorithmKind::Clustering => self.clustering.is_some(),
            AlgorithmKind::Genetic => self.genetic.is_some(),
        }
    }

    /// Number of populated entries.
    pub fn len(&self) -> usize {
        AnalysisKind::ALL.iter().filter(|k| self.has_analysis(**k)).count()
            + AlgorithmKind::ALL.iter().filter(|k| self.has_algorithm(**k)).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
