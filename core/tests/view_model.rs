//! View Model intents, slot exclusivity and cancellation.

use bankdesk_core::{
    algorithms::{AlgorithmKind, CancelToken},
    analytics::AnalysisKind,
    clock::FixedClock,
    config::{GeneratorConfig, GeneticParams, GreedyParams},
    error::BankError,
    task::{Slot, TaskOutcome, TaskOutput, TaskRunner},
    view_model::{AlgorithmRequest, ViewModel},
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(30);

fn view_model(root: &std::path::Path) -> ViewModel {
    let clock = Arc::new(FixedClock::at_date(2024, 6, 1).unwrap());
    ViewModel::new(GeneratorConfig::default_test(), clock, root)
}

/// Genetic run that takes far longer than any test waits.
fn endless_genetic() -> AlgorithmRequest {
    AlgorithmRequest::Genetic(GeneticParams { generations: 50_000_000, ..GeneticParams::default() })
}

/// Occupies a slot until cancelled.
fn park(cancel: &CancelToken) -> Result<TaskOutput, BankError> {
    loop {
        cancel.checkpoint()?;
        thread::sleep(Duration::from_millis(2));
    }
}

#[test]
fn intents_without_a_dataset_fail_the_precondition() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());

    let err = vm.run_analysis(AnalysisKind::Financial).unwrap_err();
    assert!(matches!(err, BankError::Precondition(_)));
    let err = vm.run_algorithm(AlgorithmRequest::Greedy(GreedyParams::default())).unwrap_err();
    assert!(matches!(err, BankError::Precondition(_)));
    let err = vm.export_all().unwrap_err();
    assert!(matches!(err, BankError::Precondition(_)));

    assert_eq!(vm.log().len(), 3);
    assert!(vm.log().iter().all(|e| e.message.contains("PreconditionError")));
    assert!(vm.results().is_empty());
}

#[test]
fn analyses_store_results_and_log_with_timestamps() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();
    for kind in AnalysisKind::ALL {
        vm.run_analysis(kind).unwrap();
    }
    let results = vm.results();
    assert!(results.financial.is_some() && results.risk.is_some());
    assert!(results.fraud.is_some() && results.customer.is_some());
    assert!(vm.log()[0].to_string().starts_with("2024-06-01T12:00:00 "));
}

#[test]
fn empty_dataset_analysis_stores_nothing() {
    let root = tempfile::tempdir().unwrap();
    let clock = Arc::new(FixedClock::at_date(2024, 6, 1).unwrap());
    let mut vm = ViewModel::new(GeneratorConfig::empty(), clock, root.path());
    vm.generate_dataset().unwrap();

    for kind in AnalysisKind::ALL {
        let err = vm.run_analysis(kind).unwrap_err();
        assert!(matches!(err, BankError::EmptyDataset(_)));
    }
    assert!(vm.results().is_empty());
}

#[test]
fn run_all_fills_every_algorithm_result() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();

    assert_eq!(vm.run_all_algorithms().unwrap(), 4);
    assert!(vm.wait_idle(WAIT));
    for kind in AlgorithmKind::ALL {
        assert!(vm.results().has_algorithm(kind), "{} missing", kind.name());
    }
}

#[test]
fn second_submission_to_a_running_slot_is_busy() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();

    vm.run_algorithm(endless_genetic()).unwrap();
    assert!(vm.is_busy(Slot::Genetic));
    let err = vm.run_algorithm(endless_genetic()).unwrap_err();
    assert!(matches!(err, BankError::Busy { .. }));
    assert!(vm.is_busy(Slot::Genetic), "rejected submission disturbed the running task");

    // Other slots stay available.
    vm.run_algorithm(AlgorithmRequest::Greedy(GreedyParams::default())).unwrap();

    // Regeneration waits for every slot.
    let err = vm.generate_dataset().unwrap_err();
    assert!(matches!(err, BankError::Busy { .. }));

    vm.cancel(Slot::Genetic);
    assert!(vm.wait_idle(WAIT));
    assert!(vm.results().greedy.is_some());
}

#[test]
fn cancelled_run_keeps_the_previous_result() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();

    let quick = GeneticParams { generations: 5, ..GeneticParams::default() };
    vm.run_algorithm(AlgorithmRequest::Genetic(quick)).unwrap();
    assert!(vm.wait_idle(WAIT));
    let before = vm.results().genetic.clone().expect("first run stored");

    vm.run_algorithm(endless_genetic()).unwrap();
    assert!(vm.cancel(Slot::Genetic));
    assert!(vm.wait_idle(WAIT));

    assert_eq!(vm.results().genetic.as_ref(), Some(&before));
    assert!(vm.log().last().unwrap().message.contains("genetic cancelled"));
    assert!(!vm.is_busy(Slot::Genetic));
}

#[test]
fn export_runs_on_its_slot_and_records_the_directory() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();
    vm.run_analysis(AnalysisKind::Financial).unwrap();

    vm.export_all().unwrap();
    assert!(vm.wait_idle(WAIT));
    let dir = vm.last_export().expect("export directory");
    assert!(dir.join("analysis_results.json").is_file());

    // Same clock second: the directory already exists.
    vm.export_all().unwrap();
    assert!(vm.wait_idle(WAIT));
    assert!(vm.log().last().unwrap().message.contains("ExportError"));
}

#[test]
fn unknown_graph_source_is_rejected_up_front() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();
    let params = bankdesk_core::config::GraphParams {
        source: Some("nope".into()),
        ..Default::default()
    };
    let err = vm.run_algorithm(AlgorithmRequest::Graph(params)).unwrap_err();
    assert!(matches!(err, BankError::Config(_)));
    assert!(!vm.is_busy(Slot::Graph));
}

#[test]
fn shutdown_cancels_running_work() {
    let root = tempfile::tempdir().unwrap();
    let mut vm = view_model(root.path());
    vm.generate_dataset().unwrap();
    vm.run_algorithm(endless_genetic()).unwrap();
    vm.shutdown(Duration::from_secs(2));
    assert!(vm.busy_slots().is_empty());
    assert!(vm.results().genetic.is_none());
}

#[test]
fn runner_rejects_busy_slot_and_reports_cancellation() {
    let clock = Arc::new(FixedClock::at_date(2024, 6, 1).unwrap());
    let mut runner = TaskRunner::new(clock);

    runner.submit(Slot::Export, park).unwrap();
    let err = runner.submit(Slot::Export, park).unwrap_err();
    assert!(matches!(err, BankError::Busy { slot } if slot == "export"));

    assert!(runner.cancel(Slot::Export));
    let event = runner.wait(WAIT).expect("cancellation event");
    assert_eq!(event.slot, Slot::Export);
    assert!(matches!(event.outcome, TaskOutcome::Failed(BankError::Cancelled)));
    assert!(!runner.is_busy(Slot::Export));
    assert!(!runner.cancel(Slot::Export));
}
