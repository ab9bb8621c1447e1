//! View Model: session state plus the intents the shell can emit.
//!
//! RULE: The View Model is the only writer of `results` and the log.
//! Analyses run inline; algorithms and export go through the TaskRunner
//! and land here when `pump` drains their events. A failed or cancelled
//! task never touches the results it would have replaced.

use crate::{
    algorithms::{genetic, graph, greedy, kmeans, AlgorithmKind},
    analytics::{self, AnalysisKind},
    clock::Clock,
    config::{AlgorithmSettings, ClusteringParams, GeneratorConfig, GeneticParams, GraphParams, GreedyParams},
    dataset::Dataset,
    error::{BankError, BankResult},
    export,
    generator,
    results::AnalysisResults,
    rng::{RngBank, StreamSlot},
    task::{Slot, TaskEvent, TaskOutcome, TaskOutput, TaskRunner},
};
use chrono::NaiveDateTime;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default shutdown grace period.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// One System Log line.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub at: NaiveDateTime,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.at.format("%Y-%m-%dT%H:%M:%S"), self.message)
    }
}

/// An algorithm together with the parameters to run it with.
#[derive(Debug, Clone, PartialEq)]
pub enum AlgorithmRequest {
    Greedy(GreedyParams),
    Graph(GraphParams),
    Clustering(ClusteringParams),
    Genetic(GeneticParams),
}

impl AlgorithmRequest {
    pub fn kind(&self) -> AlgorithmKind {
        match self {
            Self::Greedy(_) => AlgorithmKind::Greedy,
            Self::Graph(_) => AlgorithmKind::Graph,
            Self::Clustering(_) => AlgorithmKind::Clustering,
            Self::Genetic(_) => AlgorithmKind::Genetic,
        }
    }

    /// The request for `kind` with the parameters from `settings`.
    pub fn from_settings(kind: AlgorithmKind, settings: &AlgorithmSettings) -> Self {
        match kind {
            AlgorithmKind::Greedy => Self::Greedy(settings.greedy.clone()),
            AlgorithmKind::Graph => Self::Graph(settings.graph.clone()),
            AlgorithmKind::Clustering => Self::Clustering(settings.clustering.clone()),
            AlgorithmKind::Genetic => Self::Genetic(settings.genetic.clone()),
        }
    }

    fn validate(&self, ds: &Dataset) -> BankResult<()> {
        match self {
            Self::Greedy(p) => p.validate(),
            Self::Clustering(p) => p.validate(),
            Self::Genetic(p) => p.validate(),
            Self::Graph(p) => {
                let index = ds.account_index();
                for vertex in p.source.iter().chain(p.target.iter()) {
                    if !index.contains_key(vertex.as_str()) {
                        return Err(BankError::Config(format!("unknown account {vertex}")));
                    }
                }
                Ok(())
            }
        }
    }
}

pub struct ViewModel {
    config: GeneratorConfig,
    settings: AlgorithmSettings,
    dataset: Option<Arc<Dataset>>,
    results: AnalysisResults,
    log: Vec<LogEntry>,
    runner: TaskRunner,
    clock: Arc<dyn Clock>,
    export_root: PathBuf,
    last_export: Option<PathBuf>,
    /// Bumped on every visible state change.
    revision: u64,
}

impl ViewModel {
    pub fn new(config: GeneratorConfig, clock: Arc<dyn Clock>, export_root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            settings: AlgorithmSettings::default(),
            dataset: None,
            results: AnalysisResults::default(),
            log: Vec::new(),
            runner: TaskRunner::new(Arc::clone(&clock)),
            clock,
            export_root: export_root.into(),
            last_export: None,
            revision: 0,
        }
    }

    pub fn with_settings(mut self, settings: AlgorithmSettings) -> Self {
        self.settings = settings;
        self
    }

    // ── Read access ────────────────────────────────────────────────

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn settings(&self) -> &AlgorithmSettings {
        &self.settings
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_deref()
    }

    pub fn results(&self) -> &AnalysisResults {
        &self.results
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn export_root(&self) -> &Path {
        &self.export_root
    }

    pub fn last_export(&self) -> Option<&Path> {
        self.last_export.as_deref()
    }

    pub fn is_busy(&self, slot: Slot) -> bool {
        self.runner.is_busy(slot)
    }

    pub fn busy_slots(&self) -> Vec<Slot> {
        self.runner.busy_slots()
    }

    // ── Intents ────────────────────────────────────────────────────

    /// Replace the dataset with a freshly generated one. Previous results
    /// describe the old dataset and are dropped. A generation failure
    /// leaves the session without a dataset.
    pub fn generate_dataset(&mut self) -> BankResult<()> {
        if self.runner.any_busy() {
            let busy: Vec<&str> = self.runner.busy_slots().iter().map(Slot::name).collect();
            return self.reject(BankError::Busy { slot: busy.join(", ") }, "generate");
        }
        match generator::generate(&self.config, self.clock.as_ref()) {
            Ok(ds) => {
                let summary = ds.summary();
                self.dataset = Some(Arc::new(ds));
                self.results = AnalysisResults::default();
                self.last_export = None;
                self.record(format!("generated dataset (seed {}): {summary}", self.config.seed));
                Ok(())
            }
            Err(e) => {
                self.dataset = None;
                self.results = AnalysisResults::default();
                self.reject(e, "generate")
            }
        }
    }

    /// Run one analysis inline and store its report.
    pub fn run_analysis(&mut self, kind: AnalysisKind) -> BankResult<()> {
        let ds = match self.require_dataset(kind.name()) {
            Ok(ds) => ds,
            Err(e) => return self.reject(e, kind.name()),
        };
        let stored = match kind {
            AnalysisKind::Financial => {
                analytics::financial_summary(&ds).map(|r| self.results.financial = Some(r))
            }
            AnalysisKind::Risk => analytics::risk_summary(&ds).map(|r| self.results.risk = Some(r)),
            AnalysisKind::Fraud => analytics::fraud_summary(&ds).map(|r| self.results.fraud = Some(r)),
            AnalysisKind::Customer => {
                analytics::customer_summary(&ds).map(|r| self.results.customer = Some(r))
            }
        };
        match stored {
            Ok(()) => {
                self.record(format!("{} analysis completed", kind.name()));
                Ok(())
            }
            Err(e) => self.reject(e, kind.name()),
        }
    }

    /// Submit an algorithm to its slot.
    pub fn run_algorithm(&mut self, request: AlgorithmRequest) -> BankResult<()> {
        let kind = request.kind();
        let slot = Slot::for_algorithm(kind);
        let ds = match self.require_dataset(kind.name()) {
            Ok(ds) => ds,
            Err(e) => return self.reject(e, kind.name()),
        };
        if let Err(e) = request.validate(&ds) {
            return self.reject(e, kind.name());
        }

        let bank = RngBank::new(self.config.seed);
        let submitted = match request {
            AlgorithmRequest::Greedy(params) => self.runner.submit(slot, move |cancel| {
                greedy::run_greedy(&ds, &params, cancel).map(TaskOutput::Greedy)
            }),
            AlgorithmRequest::Graph(params) => self.runner.submit(slot, move |cancel| {
                graph::run_graph(&ds, &params, cancel).map(TaskOutput::Graph)
            }),
            AlgorithmRequest::Clustering(params) => self.runner.submit(slot, move |cancel| {
                let mut rng = bank.stream(StreamSlot::Clustering);
                kmeans::run_clustering(&ds, &params, &mut rng, cancel).map(TaskOutput::Clustering)
            }),
            AlgorithmRequest::Genetic(params) => self.runner.submit(slot, move |cancel| {
                let mut rng = bank.stream(StreamSlot::Genetic);
                genetic::run_genetic(&ds, &params, &mut rng, cancel).map(TaskOutput::Genetic)
            }),
        };
        match submitted {
            Ok(_) => {
                self.record(format!("{} started", kind.name()));
                Ok(())
            }
            Err(e) => self.reject(e, kind.name()),
        }
    }

    /// Submit every algorithm with the configured settings. Busy slots
    /// are skipped. Returns how many were started.
    pub fn run_all_algorithms(&mut self) -> BankResult<usize> {
        if let Err(e) = self.require_dataset("run all") {
            return self.reject(e, "run all");
        }
        let mut started = 0;
        for kind in AlgorithmKind::ALL {
            let request = AlgorithmRequest::from_settings(kind, &self.settings);
            if self.run_algorithm(request).is_ok() {
                started += 1;
            }
        }
        Ok(started)
    }

    /// Export the dataset and every stored result on the export slot.
    pub fn export_all(&mut self) -> BankResult<()> {
        let ds = match self.require_dataset("export") {
            Ok(ds) => ds,
            Err(e) => return self.reject(e, "export"),
        };
        let results = self.results.clone();
        let root = self.export_root.clone();
        let clock = Arc::clone(&self.clock);
        let submitted = self.runner.submit(Slot::Export, move |cancel| {
            cancel.checkpoint()?;
            export::export(&ds, &results, &root, clock.as_ref()).map(TaskOutput::Exported)
        });
        match submitted {
            Ok(_) => {
                self.record(format!("export started into {}", self.export_root.display()));
                Ok(())
            }
            Err(e) => self.reject(e, "export"),
        }
    }

    /// Request cancellation of `slot`. Returns false if it was idle.
    pub fn cancel(&mut self, slot: Slot) -> bool {
        let requested = self.runner.cancel(slot);
        if requested {
            self.record(format!("cancel requested for {slot}"));
        }
        requested
    }

    /// Apply every finished task. Returns how many events were applied.
    pub fn pump(&mut self) -> usize {
        let events = self.runner.poll();
        let n = events.len();
        for event in events {
            self.apply(event);
        }
        n
    }

    /// Block until no slot is busy or `timeout` elapses, applying events
    /// as they arrive. Returns true when everything finished.
    pub fn wait_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.runner.any_busy() {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if let Some(event) = self.runner.wait(deadline - now) {
                self.apply(event);
            }
        }
        true
    }

    /// Cancel all slots and wait up to `grace` for them to report.
    pub fn shutdown(&mut self, grace: Duration) {
        for event in self.runner.shutdown(grace) {
            self.apply(event);
        }
        self.record("shutdown".to_string());
    }

    // ── Internals ──────────────────────────────────────────────────

    fn require_dataset(&self, what: &str) -> BankResult<Arc<Dataset>> {
        self.dataset
            .clone()
            .ok_or_else(|| BankError::Precondition(format!("{what} requires a dataset; generate one first")))
    }

    fn apply(&mut self, event: TaskEvent) {
        let slot = event.slot;
        let message = match event.outcome {
            TaskOutcome::Completed(output) => {
                match output {
                    TaskOutput::Greedy(r) => self.results.greedy = Some(r),
                    TaskOutput::Graph(r) => self.results.graph = Some(r),
                    TaskOutput::Clustering(r) => self.results.clustering = Some(r),
                    TaskOutput::Genetic(r) => self.results.genetic = Some(r),
                    TaskOutput::Exported(dir) => {
                        let message = format!("export completed: {}", dir.display());
                        self.last_export = Some(dir);
                        log::info!("{message}");
                        self.push(event.finished_at, message);
                        return;
                    }
                }
                log::info!("{slot} completed");
                format!("{slot} completed")
            }
            TaskOutcome::Failed(BankError::Cancelled) => {
                log::info!("{slot} cancelled");
                format!("{slot} cancelled")
            }
            TaskOutcome::Failed(e) => {
                log::warn!("{slot} failed: {e}");
                format!("{slot} failed [{}]: {e}", e.kind())
            }
        };
        self.push(event.finished_at, message);
    }

    fn record(&mut self, message: String) {
        log::info!("{message}");
        let at = self.clock.now();
        self.push(at, message);
    }

    fn reject<T>(&mut self, error: BankError, intent: &str) -> BankResult<T> {
        log::warn!("{intent} rejected: {error}");
        let at = self.clock.now();
        self.push(at, format!("{intent} rejected [{}]: {error}", error.kind()));
        Err(error)
    }

    fn push(&mut self, at: NaiveDateTime, message: String) {
        self.log.push(LogEntry { at, message });
        self.revision += 1;
    }
}
