//! Transaction graph: DFS, depth-limited BFS and Dijkstra.
//!
//! Vertices are account numbers in account order. Each Transfer adds one
//! directed edge `account_number -> counterparty_account` weighted by the
//! absolute amount. Self-loops and parallel edges are kept. The graph is
//! rebuilt from the dataset on every run and never cached.

use super::CancelToken;
use crate::{
    config::{GraphParams, DEFAULT_BFS_DEPTH},
    dataset::Dataset,
    error::{BankError, BankResult},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap, HashMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub to: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionGraph {
    vertices: Vec<String>,
    index: HashMap<String, usize>,
    /// Out-edges per vertex in insertion order.
    adjacency: Vec<Vec<Edge>>,
    edge_count: usize,
}

/// Result of a shortest-path query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PathOutcome {
    Found { path: Vec<String>, cost: f64 },
    Unreachable,
}

impl TransactionGraph {
    pub fn build(ds: &Dataset) -> Self {
        let mut graph = Self::default();
        for account in &ds.accounts {
            graph.add_vertex(&account.account_number);
        }
        for txn in &ds.transactions {
            if let Some(to) = &txn.counterparty_account {
                let from = graph.add_vertex(&txn.account_number);
                let to = graph.add_vertex(to);
                graph.push_edge(from, to, txn.amount.abs());
            }
        }
        graph
    }

    /// Build from explicit vertices and `(from, to, weight)` edges.
    /// Edge endpoints not listed as vertices are appended in first-seen order.
    pub fn from_edges(vertices: &[&str], edges: &[(&str, &str, f64)]) -> BankResult<Self> {
        let mut graph = Self::default();
        for v in vertices {
            graph.add_vertex(v);
        }
        for (from, to, weight) in edges {
            if !(weight.is_finite() && *weight >= 0.0) {
                return Err(BankError::Config(format!(
                    "edge {from} -> {to} has invalid weight {weight}"
                )));
            }
            let from = graph.add_vertex(from);
            let to = graph.add_vertex(to);
            graph.push_edge(from, to, *weight);
        }
        Ok(graph)
    }

    fn add_vertex(&mut self, name: &str) -> usize {
        if let Some(&i) = self.index.get(name) {
            return i;
        }
        let i = self.vertices.len();
        self.vertices.push(name.to_string());
        self.index.insert(name.to_string(), i);
        self.adjacency.push(Vec::new());
        i
    }

    fn push_edge(&mut self, from: usize, to: usize, weight: f64) {
        self.adjacency[from].push(Edge { to, weight });
        self.edge_count += 1;
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn vertices(&self) -> &[String] {
        &self.vertices
    }

    pub fn out_edges(&self, vertex: usize) -> &[Edge] {
        &self.adjacency[vertex]
    }

    pub fn vertex_index(&self, name: &str) -> BankResult<usize> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| BankError::Config(format!("unknown vertex {name}")))
    }

    fn names(&self, ids: impl IntoIterator<Item = usize>) -> Vec<String> {
        ids.into_iter().map(|i| self.vertices[i].clone()).collect()
    }

    /// Vertices reachable from `start`, in depth-first discovery order.
    /// Same order as the recursive formulation, without recursion.
    pub fn dfs(&self, start: &str, cancel: &CancelToken) -> BankResult<Vec<String>> {
        let s = self.vertex_index(start)?;
        let mut visited = vec![false; self.vertices.len()];
        let mut order = vec![s];
        let mut stack = vec![(s, 0usize)];
        visited[s] = true;

        while let Some(top) = stack.last_mut() {
            let (v, next) = *top;
            match self.adjacency[v].get(next) {
                Some(edge) => {
                    top.1 += 1;
                    let w = edge.to;
                    if !visited[w] {
                        cancel.checkpoint()?;
                        visited[w] = true;
                        order.push(w);
                        stack.push((w, 0));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        Ok(self.names(order))
    }

    /// Vertices grouped by the depth at which they are first discovered,
    /// up to and including `max_depth`.
    pub fn bfs(
        &self,
        start: &str,
        max_depth: usize,
        cancel: &CancelToken,
    ) -> BankResult<BTreeMap<usize, Vec<String>>> {
        let s = self.vertex_index(start)?;
        let mut visited = vec![false; self.vertices.len()];
        let mut levels: BTreeMap<usize, Vec<String>> = BTreeMap::new();
        let mut queue = VecDeque::from([(s, 0usize)]);
        visited[s] = true;

        while let Some((v, depth)) = queue.pop_front() {
            cancel.checkpoint()?;
            levels.entry(depth).or_default().push(self.vertices[v].clone());
            if depth == max_depth {
                continue;
            }
            for edge in &self.adjacency[v] {
                if !visited[edge.to] {
                    visited[edge.to] = true;
                    queue.push_back((edge.to, depth + 1));
                }
            }
        }
        Ok(levels)
    }

    /// Cheapest path from `from` to `to`. Among equal-cost paths the one
    /// with the lexicographically smallest vertex-index sequence wins.
    pub fn dijkstra(&self, from: &str, to: &str, cancel: &CancelToken) -> BankResult<PathOutcome> {
        let s = self.vertex_index(from)?;
        let t = self.vertex_index(to)?;
        if s == t {
            return Ok(PathOutcome::Found { path: vec![from.to_string()], cost: 0.0 });
        }

        let dist = self.distances_from(s, t, cancel)?;
        if !dist[t].is_finite() {
            return Ok(PathOutcome::Unreachable);
        }

        let n = self.vertices.len();
        let mut reverse: Vec<Vec<usize>> = vec![Vec::new(); n];
        for u in 0..n {
            for edge in &self.adjacency[u] {
                if self.is_tight(&dist, u, edge) {
                    reverse[edge.to].push(u);
                }
            }
        }

        // Greedy walk: smallest neighbour that still completes a simple
        // tight path. Zero-weight cycles make reachability depend on the
        // vertices already taken, so it is recomputed per step.
        let mut on_path = vec![false; n];
        let mut path = vec![s];
        on_path[s] = true;
        let mut current = s;
        while current != t {
            cancel.checkpoint()?;
            let reach = tight_reach(&reverse, t, &on_path);
            let next = self.adjacency[current]
                .iter()
                .filter(|e| self.is_tight(&dist, current, e))
                .map(|e| e.to)
                .filter(|&v| reach[v])
                .min()
                .ok_or_else(|| {
                    BankError::Internal(anyhow::anyhow!(
                        "shortest-path reconstruction stalled at {}",
                        self.vertices[current]
                    ))
                })?;
            on_path[next] = true;
            path.push(next);
            current = next;
        }

        Ok(PathOutcome::Found { path: self.names(path), cost: dist[t] })
    }

    /// Dijkstra distances from `s`; stops once every vertex no farther
    /// than `t` is settled.
    fn distances_from(&self, s: usize, t: usize, cancel: &CancelToken) -> BankResult<Vec<f64>> {
        let mut dist = vec![f64::INFINITY; self.vertices.len()];
        dist[s] = 0.0;
        let mut heap = BinaryHeap::from([HeapNode { dist: 0.0, node: s }]);

        while let Some(HeapNode { dist: d, node: v }) = heap.pop() {
            if d > dist[v] {
                continue;
            }
            if dist[t].is_finite() && d > dist[t] && !approx_eq(d, dist[t]) {
                break;
            }
            cancel.checkpoint()?;
            for edge in &self.adjacency[v] {
                let candidate = d + edge.weight;
                if candidate < dist[edge.to] {
                    dist[edge.to] = candidate;
                    heap.push(HeapNode { dist: candidate, node: edge.to });
                }
            }
        }
        Ok(dist)
    }

    fn is_tight(&self, dist: &[f64], u: usize, edge: &Edge) -> bool {
        dist[u].is_finite() && dist[edge.to].is_finite() && approx_eq(dist[u] + edge.weight, dist[edge.to])
    }
}

/// Vertices that reach `t` over tight edges without touching `blocked`.
fn tight_reach(reverse: &[Vec<usize>], t: usize, blocked: &[bool]) -> Vec<bool> {
    let mut reach = vec![false; reverse.len()];
    reach[t] = true;
    let mut queue = VecDeque::from([t]);
    while let Some(v) = queue.pop_front() {
        for &u in &reverse[v] {
            if !reach[u] && !blocked[u] {
                reach[u] = true;
                queue.push_back(u);
            }
        }
    }
    reach
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
}

/// Min-heap entry: smaller distance first, then smaller vertex index.
#[derive(Clone, Copy, PartialEq)]
struct HeapNode {
    dist: f64,
    node: usize,
}

impl Eq for HeapNode {}

impl Ord for HeapNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for HeapNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ── Report ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphReport {
    pub source: String,
    pub target: String,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub avg_out_degree: f64,
    pub dfs_order: Vec<String>,
    /// Fraction of vertices reached by DFS, in [0, 1].
    pub dfs_coverage: f64,
    pub bfs_max_depth: usize,
    pub bfs_levels: BTreeMap<usize, Vec<String>>,
    pub dijkstra: PathOutcome,
}

pub fn run_graph(ds: &Dataset, params: &GraphParams, cancel: &CancelToken) -> BankResult<GraphReport> {
    let (first, last) = match (ds.accounts.first(), ds.accounts.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return Err(BankError::EmptyDataset("graph analysis needs at least one account".into())),
    };
    let source = params.source.clone().unwrap_or_else(|| first.account_number.clone());
    let target = params.target.clone().unwrap_or_else(|| last.account_number.clone());
    let max_depth = params.max_depth.unwrap_or(DEFAULT_BFS_DEPTH);

    let graph = TransactionGraph::build(ds);
    let dfs_order = graph.dfs(&source, cancel)?;
    let bfs_levels = graph.bfs(&source, max_depth, cancel)?;
    let dijkstra = graph.dijkstra(&source, &target, cancel)?;

    let vertex_count = graph.vertex_count();
    log::debug!(
        "graph: {} vertices, {} edges, dfs reached {}",
        vertex_count,
        graph.edge_count(),
        dfs_order.len()
    );

    Ok(GraphReport {
        dfs_coverage: dfs_order.len() as f64 / vertex_count as f64,
        avg_out_degree: graph.edge_count() as f64 / vertex_count as f64,
        vertex_count,
        edge_count: graph.edge_count(),
        source,
        target,
        dfs_order,
        bfs_max_depth: max_depth,
        bfs_levels,
        dijkstra,
    })
}
