//! Presentation shell: tab state, key bindings and the event loop.
//!
//! RULE: The shell never computes. It emits View Model intents, pumps
//! finished tasks once per frame, and renders stored results through the
//! core report renderers.

use crate::ui;
use anyhow::Result;
use bankdesk_core::{
    algorithms::AlgorithmKind,
    analytics::AnalysisKind,
    report,
    task::Slot,
    view_model::{AlgorithmRequest, ViewModel, SHUTDOWN_GRACE},
};
use ratatui::{
    crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    DefaultTerminal,
};
use std::time::Duration;

const FRAME_POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Financial,
    Risk,
    Fraud,
    Customer,
    Greedy,
    Graph,
    Clustering,
    Genetic,
    SystemLog,
}

impl Tab {
    pub const ALL: [Tab; 9] = [
        Self::Financial,
        Self::Risk,
        Self::Fraud,
        Self::Customer,
        Self::Greedy,
        Self::Graph,
        Self::Clustering,
        Self::Genetic,
        Self::SystemLog,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Financial => "Financial",
            Self::Risk => "Risk",
            Self::Fraud => "Fraud",
            Self::Customer => "Customer",
            Self::Greedy => "Greedy",
            Self::Graph => "Graph",
            Self::Clustering => "Clustering",
            Self::Genetic => "Genetic",
            Self::SystemLog => "System Log",
        }
    }

    fn analysis(&self) -> Option<AnalysisKind> {
        match self {
            Self::Financial => Some(AnalysisKind::Financial),
            Self::Risk => Some(AnalysisKind::Risk),
            Self::Fraud => Some(AnalysisKind::Fraud),
            Self::Customer => Some(AnalysisKind::Customer),
            _ => None,
        }
    }

    fn algorithm(&self) -> Option<AlgorithmKind> {
        match self {
            Self::Greedy => Some(AlgorithmKind::Greedy),
            Self::Graph => Some(AlgorithmKind::Graph),
            Self::Clustering => Some(AlgorithmKind::Clustering),
            Self::Genetic => Some(AlgorithmKind::Genetic),
            _ => None,
        }
    }

    /// The task slot `c` cancels on this tab. The log tab owns export.
    pub fn slot(&self) -> Option<Slot> {
        match self {
            Self::SystemLog => Some(Slot::Export),
            _ => self.algorithm().map(Slot::for_algorithm),
        }
    }

    fn key_hint(&self) -> &'static str {
        match self {
            Self::Financial => "1",
            Self::Risk => "2",
            Self::Fraud => "3",
            Self::Customer => "4",
            Self::Greedy => "r",
            Self::Graph => "d",
            Self::Clustering => "k",
            Self::Genetic => "a",
            Self::SystemLog => "e",
        }
    }

    pub fn has_result(&self, vm: &ViewModel) -> bool {
        let results = vm.results();
        match (self.analysis(), self.algorithm()) {
            (Some(kind), _) => results.has_analysis(kind),
            (_, Some(kind)) => results.has_algorithm(kind),
            _ => !vm.log().is_empty(),
        }
    }

    /// Plain-text body of this tab.
    pub fn render(&self, vm: &ViewModel) -> String {
        let r = vm.results();
        let body = match self {
            Self::Financial => r.financial.as_ref().map(report::render_financial),
            Self::Risk => r.risk.as_ref().map(report::render_risk),
            Self::Fraud => r.fraud.as_ref().map(report::render_fraud),
            Self::Customer => r.customer.as_ref().map(report::render_customer),
            Self::Greedy => r.greedy.as_ref().map(report::render_greedy),
            Self::Graph => r.graph.as_ref().map(report::render_graph),
            Self::Clustering => r.clustering.as_ref().map(report::render_clustering),
            Self::Genetic => r.genetic.as_ref().map(report::render_genetic),
            Self::SystemLog => Some(
                vm.log()
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        };
        body.unwrap_or_else(|| {
            if vm.dataset().is_none() {
                "No dataset yet. Press g to generate one.".to_string()
            } else {
                format!("No {} report yet. Press {} to run it.", self.title(), self.key_hint())
            }
        })
    }
}

/// Slot run by a trigger key, if any.
pub fn trigger_slot(key: char) -> Option<Slot> {
    match key {
        'r' => Some(Slot::Greedy),
        'd' => Some(Slot::Graph),
        'k' => Some(Slot::Clustering),
        'a' => Some(Slot::Genetic),
        'e' => Some(Slot::Export),
        _ => None,
    }
}

pub struct App {
    pub vm: ViewModel,
    tab: usize,
    scroll: u16,
    quit: bool,
}

impl App {
    pub fn new(vm: ViewModel) -> Self {
        Self { vm, tab: 0, scroll: 0, quit: false }
    }

    pub fn tab(&self) -> Tab {
        Tab::ALL[self.tab]
    }

    pub fn tab_index(&self) -> usize {
        self.tab
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn select(&mut self, tab: Tab) {
        if let Some(i) = Tab::ALL.iter().position(|t| *t == tab) {
            self.tab = i;
            self.scroll = 0;
        }
    }

    fn run_algorithm(&mut self, kind: AlgorithmKind) {
        let request = AlgorithmRequest::from_settings(kind, self.vm.settings());
        let _ = self.vm.run_algorithm(request);
    }

    /// Whether the trigger bound to `key` may fire. A trigger is disabled
    /// while its slot runs; generation waits for every slot.
    pub fn trigger_enabled(&self, key: char) -> bool {
        match key {
            'g' => self.vm.busy_slots().is_empty(),
            _ => match trigger_slot(key) {
                Some(slot) => !self.vm.is_busy(slot),
                None => true,
            },
        }
    }

    /// Rejected intents are recorded in the System Log by the View Model.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if let KeyCode::Char(c) = key.code {
            if !self.trigger_enabled(c) {
                return;
            }
        }
        let analysis_tab = |c: char| match c {
            '1' => Some(Tab::Financial),
            '2' => Some(Tab::Risk),
            '3' => Some(Tab::Fraud),
            '4' => Some(Tab::Customer),
            _ => None,
        };
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit = true,
            KeyCode::Char('g') => {
                let _ = self.vm.generate_dataset();
            }
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(tab) = analysis_tab(c) {
                    if let Some(kind) = tab.analysis() {
                        let _ = self.vm.run_analysis(kind);
                    }
                    self.select(tab);
                }
            }
            KeyCode::Char('r') => {
                self.run_algorithm(AlgorithmKind::Greedy);
                self.select(Tab::Greedy);
            }
            KeyCode::Char('d') => {
                self.run_algorithm(AlgorithmKind::Graph);
                self.select(Tab::Graph);
            }
            KeyCode::Char('k') => {
                self.run_algorithm(AlgorithmKind::Clustering);
                self.select(Tab::Clustering);
            }
            KeyCode::Char('a') => {
                self.run_algorithm(AlgorithmKind::Genetic);
                self.select(Tab::Genetic);
            }
            KeyCode::Char('A') => {
                let _ = self.vm.run_all_algorithms();
            }
            KeyCode::Char('e') => {
                let _ = self.vm.export_all();
            }
            KeyCode::Char('c') => {
                if let Some(slot) = self.tab().slot() {
                    self.vm.cancel(slot);
                }
            }
            KeyCode::Tab | KeyCode::Right => {
                self.tab = (self.tab + 1) % Tab::ALL.len();
                self.scroll = 0;
            }
            KeyCode::BackTab | KeyCode::Left => {
                self.tab = (self.tab + Tab::ALL.len() - 1) % Tab::ALL.len();
                self.scroll = 0;
            }
            KeyCode::Down => self.scroll = self.scroll.saturating_add(1),
            KeyCode::Up => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            _ => {}
        }
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.quit {
            self.vm.pump();
            let app: &App = self;
            terminal.draw(|f| ui::draw(f, app))?;
            if event::poll(FRAME_POLL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }
        Ok(())
    }
}

pub fn run(vm: ViewModel) -> Result<()> {
    let mut terminal = ratatui::try_init()?;
    let mut app = App::new(vm);
    let result = app.event_loop(&mut terminal);
    ratatui::restore();
    app.vm.shutdown(SHUTDOWN_GRACE);
    result
}
