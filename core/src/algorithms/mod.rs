//! Algorithms engine.
//!
//! RULE: Algorithms are pure functions of their inputs plus an explicit
//! DataRng. Long loops poll a CancelToken at their natural checkpoints
//! and return `BankError::Cancelled` as soon as it is set.

pub mod genetic;
pub mod graph;
pub mod greedy;
pub mod kmeans;

use crate::error::{BankError, BankResult};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Shared cooperative-cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Checkpoint: Err(Cancelled) once cancellation was requested.
    pub fn checkpoint(&self) -> BankResult<()> {
        if self.is_cancelled() {
            Err(BankError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// The algorithms the View Model can run, one per task slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmKind {
    Greedy,
    Graph,
    Clustering,
    Genetic,
}

impl AlgorithmKind {
    pub const ALL: [AlgorithmKind; 4] = [Self::Greedy, Self::Graph, Self::Clustering, Self::Genetic];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Graph => "graph",
            Self::Clustering => "clustering",
            Self::Genetic => "genetic",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let other = token.clone();
        assert!(token.checkpoint().is_ok());
        other.cancel();
        assert!(matches!(token.checkpoint(), Err(BankError::Cancelled)));
    }
}
