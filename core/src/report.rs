//! Plain-text report renderers, one per result tab.
//!
//! RULE: Renderers only format. They take a finished report record and
//! return LF-separated text; they never compute anything that is not
//! already in the record.

use crate::{
    algorithms::{
        genetic::GeneticReport,
        graph::{GraphReport, PathOutcome},
        greedy::GreedyReport,
        kmeans::ClusteringReport,
    },
    analytics::{
        CustomerReport, FinancialReport, FraudReport, GroupStats, RankedAccount, RiskReport, Share,
    },
    config::{GreedyKey, SortDirection},
};
use std::fmt::Write;

/// `1234567.891` -> `$1,234,567.89`; negatives keep the sign in front.
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{sign}${}.{frac}", group_thousands(whole))
}

/// `1234567` -> `1,234,567`.
pub fn format_count(value: usize) -> String {
    group_thousands(&value.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn heading(out: &mut String, title: &str) {
    let _ = writeln!(out, "=== {title} ===");
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "--- {title} ---");
}

fn shares(out: &mut String, rows: &[Share]) {
    for s in rows {
        let _ = writeln!(out, "  {:<28} {:>7} ({:.1}%)", s.label, format_count(s.count), s.percent);
    }
}

fn groups(out: &mut String, rows: &[GroupStats]) {
    for g in rows {
        let _ = writeln!(
            out,
            "  {:<28} sum {:>18}  mean {:>14}  count {:>6}",
            g.key,
            format_currency(g.sum),
            format_currency(g.mean),
            format_count(g.count)
        );
    }
}

fn ranked_accounts(out: &mut String, rows: &[RankedAccount]) {
    if rows.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, a) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {}  balance {:>16}  risk {:.2}",
            i + 1,
            a.account_number,
            format_currency(a.balance),
            a.risk_score
        );
    }
}

fn percent_of(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

// ── Analytics ──────────────────────────────────────────────────────

pub fn render_financial(r: &FinancialReport) -> String {
    let mut out = String::new();
    let t = &r.overall_totals;
    heading(&mut out, "FINANCIAL ANALYSIS");
    section(&mut out, "Overall totals");
    let _ = writeln!(out, "  Accounts:            {}", format_count(t.account_count));
    let _ = writeln!(out, "  Total balance:       {}", format_currency(t.total_balance));
    let _ = writeln!(out, "  Average balance:     {}", format_currency(t.avg_balance));
    let _ = writeln!(out, "  Median balance:      {}", format_currency(t.median_balance));
    let _ = writeln!(out, "  Transactions:        {}", format_count(t.total_transactions));
    let _ = writeln!(out, "  Transaction volume:  {}", format_currency(t.total_volume));
    section(&mut out, "By bank");
    groups(&mut out, &r.per_bank);
    section(&mut out, "By account type");
    groups(&mut out, &r.per_account_type);
    section(&mut out, "By transaction type");
    groups(&mut out, &r.per_transaction_type);
    out
}

pub fn render_risk(r: &RiskReport) -> String {
    let mut out = String::new();
    let b = &r.buckets;
    heading(&mut out, "RISK ANALYSIS");
    section(&mut out, "Risk buckets");
    for (label, count) in [("High (>70)", b.high), ("Medium (30-70)", b.medium), ("Low (<=30)", b.low)] {
        let _ = writeln!(
            out,
            "  {:<16} {:>7} ({:.1}%)",
            label,
            format_count(count),
            percent_of(count, r.total_accounts)
        );
    }
    let _ = writeln!(out, "  Mean risk score:      {:.2}", r.avg_risk_score);
    let _ = writeln!(out, "  Risk exposure (>50):  {}", format_currency(r.risk_exposure));
    let _ = writeln!(out, "  High-risk balance:    {}", format_currency(r.high_risk_balance));
    let _ = writeln!(out, "  High-risk mean:       {}", format_currency(r.high_risk_avg_balance));
    section(&mut out, "Assessment risk levels");
    shares(&mut out, &r.level_distribution);
    section(&mut out, "Top high-risk accounts");
    ranked_accounts(&mut out, &r.top_high_risk);
    out
}

pub fn render_fraud(r: &FraudReport) -> String {
    let mut out = String::new();
    heading(&mut out, "FRAUD ANALYSIS");
    let _ = writeln!(out, "  Events:                 {}", format_count(r.total_events));
    let _ = writeln!(out, "  Amount involved:        {}", format_currency(r.total_amount));
    let _ = writeln!(out, "  Mean confidence:        {:.2}", r.avg_confidence);
    let _ = writeln!(
        out,
        "  High confidence (>80):  {} totalling {}",
        format_count(r.high_confidence_count),
        format_currency(r.high_confidence_amount)
    );
    section(&mut out, "Severity");
    shares(&mut out, &r.severity_counts);
    section(&mut out, "Fraud types");
    shares(&mut out, &r.type_distribution);
    section(&mut out, "Status");
    shares(&mut out, &r.status_distribution);
    section(&mut out, "Top events by confidence");
    for (i, e) in r.top_events.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. #{} {} {} [{}] {}  confidence {:.2}",
            i + 1,
            e.fraud_id,
            e.account_number,
            e.fraud_type,
            e.severity,
            format_currency(e.amount_involved),
            e.confidence_score
        );
    }
    out
}

pub fn render_customer(r: &CustomerReport) -> String {
    let mut out = String::new();
    heading(&mut out, "CUSTOMER ANALYSIS");
    let _ = writeln!(out, "  Customers:            {}", format_count(r.total_customers));
    let _ = writeln!(out, "  Mean credit score:    {:.1}", r.avg_credit_score);
    let _ = writeln!(out, "  Mean accounts:        {:.2}", r.avg_account_count);
    let _ = writeln!(out, "  Total balance:        {}", format_currency(r.total_customer_balance));
    section(&mut out, "Income level");
    shares(&mut out, &r.income_distribution);
    section(&mut out, "Risk category");
    shares(&mut out, &r.risk_category_distribution);
    section(&mut out, "Credit score");
    shares(&mut out, &r.credit_buckets);
    section(&mut out, "Top customers by balance");
    for (i, c) in r.top_customers.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<28} {:>16}  credit {}",
            i + 1,
            c.customer_name,
            format_currency(c.total_balance),
            c.credit_score
        );
    }
    out
}

// ── Algorithms ─────────────────────────────────────────────────────

fn key_name(key: GreedyKey) -> &'static str {
    match key {
        GreedyKey::Balance => "balance",
        GreedyKey::RiskScore => "risk score",
        GreedyKey::TransactionCount => "transaction count",
    }
}

pub fn render_greedy(r: &GreedyReport) -> String {
    let mut out = String::new();
    heading(&mut out, "GREEDY SELECTION");
    let _ = writeln!(out, "  k = {}", r.k);
    for s in &r.selections {
        let direction = match s.direction {
            SortDirection::Ascending => "lowest",
            SortDirection::Descending => "highest",
        };
        section(&mut out, &format!("By {} {}", direction, key_name(s.key)));
        let _ = writeln!(out, "  Selected:            {}", format_count(s.selected_count));
        let _ = writeln!(out, "  Total value:         {}", format_currency(s.total_value));
        let _ = writeln!(out, "  Optimisation ratio:  {:.1}%", s.optimisation_ratio * 100.0);
        let _ = writeln!(
            out,
            "  Mean {}: {:.2} (all accounts {:.2})",
            key_name(s.key),
            s.avg_key,
            s.population_avg_key
        );
        ranked_accounts(&mut out, &s.top);
    }
    out
}

pub fn render_graph(r: &GraphReport) -> String {
    let mut out = String::new();
    heading(&mut out, "TRANSACTION GRAPH");
    let _ = writeln!(out, "  Vertices:            {}", format_count(r.vertex_count));
    let _ = writeln!(out, "  Edges:               {}", format_count(r.edge_count));
    let _ = writeln!(out, "  Mean out-degree:     {:.2}", r.avg_out_degree);
    section(&mut out, &format!("DFS from {}", r.source));
    let _ = writeln!(
        out,
        "  Reached {} of {} vertices ({:.1}%)",
        format_count(r.dfs_order.len()),
        format_count(r.vertex_count),
        r.dfs_coverage * 100.0
    );
    section(&mut out, &format!("BFS from {} (max depth {})", r.source, r.bfs_max_depth));
    for (depth, vertices) in &r.bfs_levels {
        let _ = writeln!(out, "  depth {depth}: {} vertices", format_count(vertices.len()));
    }
    section(&mut out, &format!("Dijkstra {} -> {}", r.source, r.target));
    match &r.dijkstra {
        PathOutcome::Found { path, cost } => {
            let _ = writeln!(out, "  Path:  {}", path.join(" -> "));
            let _ = writeln!(out, "  Hops:  {}", path.len().saturating_sub(1));
            let _ = writeln!(out, "  Cost:  {}", format_currency(*cost));
        }
        PathOutcome::Unreachable => {
            let _ = writeln!(out, "  unreachable");
        }
    }
    out
}

pub fn render_clustering(r: &ClusteringReport) -> String {
    let mut out = String::new();
    heading(&mut out, "K-MEANS CLUSTERING");
    let _ = writeln!(out, "  Features: {}", r.features.join(", "));
    for run in &r.runs {
        section(&mut out, &format!("k = {} ({} iterations)", run.k, run.iterations));
        for c in &run.clusters {
            let _ = writeln!(
                out,
                "  cluster {}: {:>5} accounts  balance {:>16}  risk {:>6.2}  txns {:>6.2}",
                c.cluster,
                format_count(c.size),
                format_currency(c.avg_balance),
                c.avg_risk_score,
                c.avg_transaction_count
            );
        }
    }
    out
}

pub fn render_genetic(r: &GeneticReport) -> String {
    let mut out = String::new();
    let p = &r.params;
    heading(&mut out, "GENETIC OPTIMISATION");
    section(&mut out, "Parameters");
    let _ = writeln!(out, "  Population:      {}", p.population_size);
    let _ = writeln!(out, "  Generations:     {}", p.generations);
    let _ = writeln!(out, "  Mutation rate:   {}", p.mutation_rate);
    let _ = writeln!(out, "  Crossover rate:  {}", p.crossover_rate);
    let _ = writeln!(out, "  Tournament size: {}", p.tournament_size);
    section(&mut out, "Best portfolio");
    let _ = writeln!(out, "  Best fitness:    {:.2}", r.best_fitness);
    let _ = writeln!(out, "  Selected:        {}", format_count(r.selected_count));
    let _ = writeln!(out, "  Total balance:   {}", format_currency(r.total_balance));
    let _ = writeln!(out, "  Mean risk:       {:.2}", r.avg_risk_score);
    let _ = writeln!(out, "  Efficiency:      {:.2}", r.efficiency);
    section(&mut out, "Fitness evolution");
    let _ = writeln!(out, "  Initial:         {:.2}", r.initial_fitness);
    let _ = writeln!(out, "  Final:           {:.2}", r.final_fitness);
    let _ = writeln!(out, "  Improvement:     {:.2}%", r.improvement_pct);
    section(&mut out, "Top selected accounts");
    ranked_accounts(&mut out, &r.top_selected);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-4500.5), "-$4,500.50");
    }

    #[test]
    fn count_groups_thousands() {
        assert_eq!(format_count(12), "12");
        assert_eq!(format_count(1000), "1,000");
        assert_eq!(format_count(123456), "123,456");
    }
}
