//! Binary-genome genetic optimiser for account portfolios.
//!
//! A genome has one bit per account; a set bit selects the account.
//! Fitness is total selected balance over total selected risk score.

use super::CancelToken;
use crate::{
    analytics::{RankedAccount, TOP_N},
    config::GeneticParams,
    dataset::{Account, Dataset},
    error::{BankError, BankResult},
    rng::DataRng,
};
use serde::{Deserialize, Serialize};

pub type Genome = Vec<bool>;

/// Balance/risk ratio of the selected subset. 0 when the selected risk
/// sums to zero or below.
pub fn fitness(genome: &[bool], balances: &[f64], risks: &[f64]) -> f64 {
    let mut balance = 0.0;
    let mut risk = 0.0;
    for ((&bit, b), r) in genome.iter().zip(balances).zip(risks) {
        if bit {
            balance += b;
            risk += r;
        }
    }
    if risk > 0.0 {
        balance / risk
    } else {
        0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evolution {
    pub best: Genome,
    pub best_fitness: f64,
    /// Best-so-far fitness after each evaluated generation, `G + 1` entries.
    pub history: Vec<f64>,
}

/// Evolve a population of subsets of `balances.len()` items.
/// Polls `cancel` once per generation.
pub fn evolve(
    balances: &[f64],
    risks: &[f64],
    params: &GeneticParams,
    rng: &mut DataRng,
    cancel: &CancelToken,
) -> BankResult<Evolution> {
    params.validate()?;
    let n = balances.len();
    if n != risks.len() {
        return Err(BankError::Config("balances and risks differ in length".into()));
    }
    if n < 2 {
        return Err(BankError::Config(format!("genetic optimiser needs at least 2 items, got {n}")));
    }
    let pop_size = params.population_size;

    let mut population: Vec<Genome> = (0..pop_size)
        .map(|_| (0..n).map(|_| rng.chance(0.5)).collect())
        .collect();
    let mut best = population[0].clone();
    let mut best_fitness = fitness(&best, balances, risks);
    let mut history = Vec::new();

    for generation in 0..=params.generations {
        cancel.checkpoint()?;

        let scores: Vec<f64> = population.iter().map(|g| fitness(g, balances, risks)).collect();
        for (genome, &score) in population.iter().zip(&scores) {
            if score > best_fitness {
                best_fitness = score;
                best = genome.clone();
            }
        }
        history.push(best_fitness);
        log::debug!("genetic: generation {} best {:.4}", generation, best_fitness);
        if generation == params.generations {
            break;
        }

        let mut parents = Vec::with_capacity(pop_size);
        for _ in 0..pop_size {
            let winner = tournament(&scores, params.tournament_size, rng)?;
            parents.push(population[winner].clone());
        }

        for pair in parents.chunks_mut(2) {
            if let [a, b] = pair {
                if rng.chance(params.crossover_rate) {
                    let point = rng.rand_int(1, n as i64 - 1)? as usize;
                    a[point..].swap_with_slice(&mut b[point..]);
                }
            }
        }

        for genome in &mut parents {
            for bit in genome.iter_mut() {
                if rng.chance(params.mutation_rate) {
                    *bit = !*bit;
                }
            }
        }
        population = parents;
    }

    Ok(Evolution { best, best_fitness, history })
}

/// Index of the fittest of `size` distinct random entrants.
/// Ties go to the entrant drawn first.
fn tournament(scores: &[f64], size: usize, rng: &mut DataRng) -> BankResult<usize> {
    let entrants = rng.sample_indices(scores.len(), size)?;
    let mut winner = entrants[0];
    for &i in &entrants[1..] {
        if scores[i] > scores[winner] {
            winner = i;
        }
    }
    Ok(winner)
}

// ── Report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneticReport {
    pub params: GeneticParams,
    pub best_fitness: f64,
    pub selected_count: usize,
    pub total_balance: f64,
    pub avg_risk_score: f64,
    pub initial_fitness: f64,
    pub final_fitness: f64,
    pub improvement_pct: f64,
    /// Best fitness relative to the fitness of selecting every account.
    pub efficiency: f64,
    /// Selected accounts with the largest balances.
    pub top_selected: Vec<RankedAccount>,
    pub fitness_history: Vec<f64>,
    pub selected_accounts: Vec<String>,
}

pub fn run_genetic(
    ds: &Dataset,
    params: &GeneticParams,
    rng: &mut DataRng,
    cancel: &CancelToken,
) -> BankResult<GeneticReport> {
    if ds.accounts.is_empty() {
        return Err(BankError::EmptyDataset("genetic optimiser needs accounts".into()));
    }
    let balances: Vec<f64> = ds.accounts.iter().map(|a| a.balance).collect();
    let risks: Vec<f64> = ds.accounts.iter().map(|a| a.risk_score).collect();
    let evolution = evolve(&balances, &risks, params, rng, cancel)?;

    let mut selected: Vec<&Account> = ds
        .accounts
        .iter()
        .zip(&evolution.best)
        .filter(|(_, &bit)| bit)
        .map(|(a, _)| a)
        .collect();
    let total_balance: f64 = selected.iter().map(|a| a.balance).sum();
    let risk_sum: f64 = selected.iter().map(|a| a.risk_score).sum();
    let selected_accounts = selected.iter().map(|a| a.account_number.clone()).collect();

    let all_fitness = fitness(&vec![true; ds.accounts.len()], &balances, &risks);
    let initial_fitness = evolution.history.first().copied().unwrap_or(0.0);
    let final_fitness = evolution.history.last().copied().unwrap_or(0.0);

    selected.sort_by(|a, b| b.balance.partial_cmp(&a.balance).unwrap_or(std::cmp::Ordering::Equal));

    Ok(GeneticReport {
        params: params.clone(),
        best_fitness: evolution.best_fitness,
        selected_count: selected.len(),
        total_balance,
        avg_risk_score: if selected.is_empty() { 0.0 } else { risk_sum / selected.len() as f64 },
        initial_fitness,
        final_fitness,
        improvement_pct: if initial_fitness > 0.0 {
            (final_fitness - initial_fitness) / initial_fitness * 100.0
        } else {
            0.0
        },
        efficiency: if all_fitness > 0.0 { evolution.best_fitness / all_fitness } else { 0.0 },
        top_selected: selected.iter().take(TOP_N).map(|a| RankedAccount::from(*a)).collect(),
        fitness_history: evolution.history,
        selected_accounts,
    })
}
