//! Task runner: one background thread per busy slot.
//!
//! RULE: Workers never touch View Model state. They return a TaskOutput
//! (or an error) which is posted to the owner's channel as exactly one
//! TaskEvent. Slots are freed only when the owner drains that event.

use crate::{
    algorithms::{
        genetic::GeneticReport, graph::GraphReport, greedy::GreedyReport, kmeans::ClusteringReport,
        AlgorithmKind, CancelToken,
    },
    clock::Clock,
    error::{BankError, BankResult},
};
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{
    mpsc::{self, Receiver, RecvTimeoutError, Sender},
    Arc,
};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Logical concurrency lanes. At most one task per slot is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    Greedy,
    Graph,
    Clustering,
    Genetic,
    Export,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Self::Greedy, Self::Graph, Self::Clustering, Self::Genetic, Self::Export];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Graph => "graph",
            Self::Clustering => "clustering",
            Self::Genetic => "genetic",
            Self::Export => "export",
        }
    }

    pub fn for_algorithm(kind: AlgorithmKind) -> Self {
        match kind {
            AlgorithmKind::Greedy => Self::Greedy,
            AlgorithmKind::Graph => Self::Graph,
            AlgorithmKind::Clustering => Self::Clustering,
            AlgorithmKind::Genetic => Self::Genetic,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value a successful task hands back.
#[derive(Debug, Clone)]
pub enum TaskOutput {
    Greedy(GreedyReport),
    Graph(GraphReport),
    Clustering(ClusteringReport),
    Genetic(GeneticReport),
    Exported(PathBuf),
}

#[derive(Debug)]
pub enum TaskOutcome {
    Completed(TaskOutput),
    Failed(BankError),
}

#[derive(Debug)]
pub struct TaskEvent {
    pub slot: Slot,
    pub outcome: TaskOutcome,
    /// Stamped by the worker when the task finished.
    pub finished_at: NaiveDateTime,
}

struct RunningTask {
    cancel: CancelToken,
    handle: JoinHandle<()>,
}

pub struct TaskRunner {
    tx: Sender<TaskEvent>,
    rx: Receiver<TaskEvent>,
    running: HashMap<Slot, RunningTask>,
    clock: Arc<dyn Clock>,
}

impl TaskRunner {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx, running: HashMap::new(), clock }
    }

    pub fn is_busy(&self, slot: Slot) -> bool {
        self.running.contains_key(&slot)
    }

    pub fn any_busy(&self) -> bool {
        !self.running.is_empty()
    }

    /// Busy slots in declaration order.
    pub fn busy_slots(&self) -> Vec<Slot> {
        Slot::ALL.into_iter().filter(|s| self.is_busy(*s)).collect()
    }

    /// Start `op` on its own thread. Fails with Busy if `slot` is running.
    pub fn submit<F>(&mut self, slot: Slot, op: F) -> BankResult<CancelToken>
    where
        F: FnOnce(&CancelToken) -> BankResult<TaskOutput> + Send + 'static,
    {
        if self.is_busy(slot) {
            return Err(BankError::Busy { slot: slot.name().to_string() });
        }
        let cancel = CancelToken::new();
        let worker_cancel = cancel.clone();
        let tx = self.tx.clone();
        let clock = Arc::clone(&self.clock);

        let handle = thread::Builder::new()
            .name(format!("bankdesk-{}", slot.name()))
            .spawn(move || {
                let outcome = match panic::catch_unwind(AssertUnwindSafe(|| op(&worker_cancel))) {
                    Ok(Ok(output)) => TaskOutcome::Completed(output),
                    Ok(Err(e)) => TaskOutcome::Failed(e),
                    Err(payload) => TaskOutcome::Failed(BankError::Internal(anyhow::anyhow!(
                        "{} task panicked: {}",
                        slot.name(),
                        panic_message(payload.as_ref())
                    ))),
                };
                // The owner may already be gone at shutdown.
                let _ = tx.send(TaskEvent { slot, outcome, finished_at: clock.now() });
            })
            .map_err(|e| BankError::Internal(anyhow::anyhow!("failed to spawn {} worker: {e}", slot.name())))?;

        self.running.insert(slot, RunningTask { cancel: cancel.clone(), handle });
        log::debug!("task started on slot {}", slot.name());
        Ok(cancel)
    }

    /// Request cancellation. Returns false if the slot was idle.
    pub fn cancel(&self, slot: Slot) -> bool {
        match self.running.get(&slot) {
            Some(task) => {
                task.cancel.cancel();
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&self) {
        for task in self.running.values() {
            task.cancel.cancel();
        }
    }

    /// Drain finished tasks in arrival order, freeing their slots.
    pub fn poll(&mut self) -> Vec<TaskEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            self.finish(&event);
            events.push(event);
        }
        events
    }

    /// Block until the next event or `timeout`.
    pub fn wait(&mut self, timeout: Duration) -> Option<TaskEvent> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => {
                self.finish(&event);
                Some(event)
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Cancel everything and wait up to `grace` for workers to report.
    /// Workers that miss the deadline are detached.
    pub fn shutdown(&mut self, grace: Duration) -> Vec<TaskEvent> {
        self.cancel_all();
        let deadline = Instant::now() + grace;
        let mut events = self.poll();
        while self.any_busy() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            if let Some(event) = self.wait(deadline - now) {
                events.push(event);
            }
        }
        for (slot, _) in self.running.drain() {
            log::warn!("slot {} did not stop within {:?}; detaching", slot.name(), grace);
        }
        events
    }

    fn finish(&mut self, event: &TaskEvent) {
        if let Some(task) = self.running.remove(&event.slot) {
            // The worker sends as its last action, so this join is brief.
            let _ = task.handle.join();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    #[test]
    fn panic_becomes_internal_error() {
        let clock = Arc::new(FixedClock::at_date(2024, 1, 1).unwrap());
        let mut runner = TaskRunner::new(clock);
        runner.submit(Slot::Greedy, |_| panic!("boom")).unwrap();
        let event = runner.wait(Duration::from_secs(5)).expect("event");
        match event.outcome {
            TaskOutcome::Failed(BankError::Internal(e)) => assert!(e.to_string().contains("boom")),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(!runner.is_busy(Slot::Greedy));
    }
}
