//! Lloyd's k-means over account features.

use super::CancelToken;
use crate::{
    config::ClusteringParams,
    dataset::{Account, Dataset},
    error::{BankError, BankResult},
    rng::DataRng,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansResult {
    /// Cluster label per input row, each in [0, k).
    pub labels: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    pub iterations: usize,
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// Index of the nearest centroid. Ties go to the lowest index.
fn nearest(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_d = f64::INFINITY;
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(point, c);
        if d < best_d {
            best = i;
            best_d = d;
        }
    }
    best
}

/// Cluster `points` into `k` groups. Initial centroids are `k` distinct
/// rows drawn with `rng`. Stops when no centroid moves or after
/// `max_iters` passes; polls `cancel` once per pass.
pub fn kmeans(
    points: &[Vec<f64>],
    k: usize,
    max_iters: usize,
    rng: &mut DataRng,
    cancel: &CancelToken,
) -> BankResult<KMeansResult> {
    if k == 0 {
        return Err(BankError::Config("k-means k must be positive".into()));
    }
    let dims = points.first().map(Vec::len).unwrap_or(0);
    if points.iter().any(|p| p.len() != dims) {
        return Err(BankError::Config("k-means rows must share one dimension".into()));
    }

    let mut centroids = rng.sample(points, k)?;
    let mut labels = vec![0usize; points.len()];
    let mut iterations = 0;

    while iterations < max_iters {
        cancel.checkpoint()?;
        iterations += 1;

        for (label, point) in labels.iter_mut().zip(points) {
            *label = nearest(point, &centroids);
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (point, &label) in points.iter().zip(&labels) {
            counts[label] += 1;
            for (s, x) in sums[label].iter_mut().zip(point) {
                *s += x;
            }
        }
        let next: Vec<Vec<f64>> = sums
            .into_iter()
            .zip(&counts)
            .zip(&centroids)
            .map(|((sum, &count), old)| {
                if count == 0 {
                    old.clone()
                } else {
                    sum.into_iter().map(|s| s / count as f64).collect()
                }
            })
            .collect();

        let converged = next == centroids;
        centroids = next;
        if converged {
            break;
        }
    }

    log::debug!("k-means k={} finished after {} iterations", k, iterations);
    Ok(KMeansResult { labels, centroids, iterations })
}

// ── Account clustering ─────────────────────────────────────────────

pub const FEATURES: [&str; 3] = ["balance", "risk_score", "transaction_count"];

pub fn account_features(account: &Account) -> Vec<f64> {
    vec![account.balance, account.risk_score, account.transaction_count as f64]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub cluster: usize,
    pub size: usize,
    pub avg_balance: f64,
    pub avg_risk_score: f64,
    pub avg_transaction_count: f64,
    pub centroid: Vec<f64>,
    pub accounts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringRun {
    pub k: usize,
    pub iterations: usize,
    pub labels: Vec<usize>,
    pub clusters: Vec<ClusterSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringReport {
    pub features: Vec<String>,
    pub max_iters: usize,
    pub runs: Vec<ClusteringRun>,
}

/// One k-means run per configured `k`, drawing seeds from `rng` in order.
pub fn run_clustering(
    ds: &Dataset,
    params: &ClusteringParams,
    rng: &mut DataRng,
    cancel: &CancelToken,
) -> BankResult<ClusteringReport> {
    params.validate()?;
    if ds.accounts.is_empty() {
        return Err(BankError::EmptyDataset("clustering needs at least one account".into()));
    }
    let points: Vec<Vec<f64>> = ds.accounts.iter().map(account_features).collect();

    let mut runs = Vec::with_capacity(params.k_values.len());
    for &k in &params.k_values {
        let result = kmeans(&points, k, params.max_iters, rng, cancel)?;
        let clusters = (0..k)
            .map(|c| summarise(ds, &result, c))
            .collect();
        runs.push(ClusteringRun {
            k,
            iterations: result.iterations,
            labels: result.labels,
            clusters,
        });
    }
    Ok(ClusteringReport {
        features: FEATURES.iter().map(|f| f.to_string()).collect(),
        max_iters: params.max_iters,
        runs,
    })
}

fn summarise(ds: &Dataset, result: &KMeansResult, cluster: usize) -> ClusterSummary {
    let members: Vec<&Account> = ds
        .accounts
        .iter()
        .zip(&result.labels)
        .filter(|(_, &label)| label == cluster)
        .map(|(a, _)| a)
        .collect();
    let size = members.len();
    let avg = |f: fn(&Account) -> f64| {
        if size == 0 {
            0.0
        } else {
            members.iter().map(|a| f(a)).sum::<f64>() / size as f64
        }
    };
    ClusterSummary {
        cluster,
        size,
        avg_balance: avg(|a| a.balance),
        avg_risk_score: avg(|a| a.risk_score),
        avg_transaction_count: avg(|a| a.transaction_count as f64),
        centroid: result.centroids[cluster].clone(),
        accounts: members.iter().map(|a| a.account_number.clone()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_obvious_groups() {
        let points = vec![vec![0.0, 0.0], vec![0.1, 0.0], vec![10.0, 10.0], vec![10.1, 10.0]];
        let mut rng = DataRng::new(3, 1);
        let result = kmeans(&points, 2, 100, &mut rng, &CancelToken::new()).unwrap();
        assert_eq!(result.labels[0], result.labels[1]);
        assert_eq!(result.labels[2], result.labels[3]);
        assert_ne!(result.labels[0], result.labels[2]);
    }

    #[test]
    fn k_larger_than_rows_is_config_error() {
        let mut rng = DataRng::new(3, 1);
        let err = kmeans(&[vec![1.0]], 2, 10, &mut rng, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, BankError::Config(_)));
    }

    #[test]
    fn nearest_breaks_ties_low() {
        let centroids = vec![vec![0.0], vec![2.0]];
        assert_eq!(nearest(&[1.0], &centroids), 0);
    }
}
