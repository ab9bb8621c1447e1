//! Genetic portfolio optimiser.

use bankdesk_core::{
    algorithms::{
        genetic::{evolve, fitness, run_genetic},
        CancelToken,
    },
    clock::FixedClock,
    config::{GeneratorConfig, GeneticParams},
    dataset::Dataset,
    error::BankError,
    generator::generate,
    rng::{DataRng, RngBank, StreamSlot},
};

fn dataset() -> Dataset {
    let clock = FixedClock::at_date(2024, 6, 1).unwrap();
    generate(&GeneratorConfig::default(), &clock).unwrap()
}

fn stream() -> DataRng {
    RngBank::new(42).stream(StreamSlot::Genetic)
}

#[test]
fn history_is_monotonic_and_ends_at_best() {
    let ds = dataset();
    let params = GeneticParams { population_size: 50, generations: 100, ..GeneticParams::default() };
    let report = run_genetic(&ds, &params, &mut stream(), &CancelToken::new()).unwrap();

    assert_eq!(report.fitness_history.len(), 101);
    for pair in report.fitness_history.windows(2) {
        assert!(pair[1] >= pair[0], "best-so-far decreased: {} -> {}", pair[0], pair[1]);
    }
    let max = report.fitness_history.iter().cloned().fold(f64::MIN, f64::max);
    assert_eq!(report.best_fitness, max);
    assert_eq!(report.final_fitness, report.best_fitness);
    assert!(report.top_selected.len() <= 10);
    assert_eq!(report.selected_count, report.selected_accounts.len());
}

#[test]
fn best_individual_scores_its_reported_fitness() {
    let ds = dataset();
    let balances: Vec<f64> = ds.accounts.iter().map(|a| a.balance).collect();
    let risks: Vec<f64> = ds.accounts.iter().map(|a| a.risk_score).collect();
    let params = GeneticParams { generations: 10, ..GeneticParams::default() };
    let evolution = evolve(&balances, &risks, &params, &mut stream(), &CancelToken::new()).unwrap();
    assert_eq!(fitness(&evolution.best, &balances, &risks), evolution.best_fitness);
}

#[test]
fn zero_generations_returns_best_of_initial_population() {
    let balances = [100.0, 50.0, 10.0, 500.0];
    let risks = [10.0, 40.0, 5.0, 20.0];
    let params = GeneticParams { population_size: 6, generations: 0, ..GeneticParams::default() };

    let mut replay = stream();
    let initial: Vec<Vec<bool>> =
        (0..6).map(|_| (0..4).map(|_| replay.chance(0.5)).collect()).collect();
    let expected = initial.iter().map(|g| fitness(g, &balances, &risks)).fold(f64::MIN, f64::max);

    let evolution = evolve(&balances, &risks, &params, &mut stream(), &CancelToken::new()).unwrap();
    assert_eq!(evolution.history, vec![expected]);
    assert_eq!(evolution.best_fitness, expected);
}

#[test]
fn too_small_population_is_rejected() {
    let params = GeneticParams { population_size: 2, tournament_size: 2, ..GeneticParams::default() };
    let err = evolve(&[1.0, 2.0], &[1.0, 1.0], &params, &mut stream(), &CancelToken::new()).unwrap_err();
    assert!(matches!(err, BankError::Config(_)));
}

#[test]
fn cancellation_is_observed_at_the_first_generation() {
    let ds = dataset();
    let cancel = CancelToken::new();
    cancel.cancel();
    let err = run_genetic(&ds, &GeneticParams::default(), &mut stream(), &cancel).unwrap_err();
    assert!(matches!(err, BankError::Cancelled));
}
