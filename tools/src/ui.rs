//! Frame layout: header, tab bar, active report, log pane, key help.

use crate::shell::{App, Tab};
use ratatui::{prelude::*, widgets::*};

/// Log lines shown under the report.
const LOG_LINES: usize = 6;

pub fn draw(f: &mut Frame, app: &App) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                    // header
            Constraint::Length(3),                    // tabs
            Constraint::Min(5),                       // report
            Constraint::Length(LOG_LINES as u16 + 2), // log
            Constraint::Length(1),                    // keys
        ])
        .split(f.area());

    draw_header(f, rows[0], app);
    draw_tabs(f, rows[1], app);
    draw_report(f, rows[2], app);
    draw_log(f, rows[3], app);
    draw_keys(f, rows[4], app);
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let dataset = match app.vm.dataset() {
        Some(ds) => ds.summary(),
        None => "no dataset".to_string(),
    };
    let busy = app.vm.busy_slots();
    let mut spans = vec![
        Span::styled(" Bank Desk ", Style::default().bold().fg(Color::Cyan)),
        Span::raw(format!(" seed {} | {dataset}", app.vm.config().seed)),
    ];
    if !busy.is_empty() {
        let names: Vec<&str> = busy.iter().map(|s| s.name()).collect();
        spans.push(Span::styled(
            format!("  running: {}", names.join(", ")),
            Style::default().fg(Color::Yellow),
        ));
    }
    let p = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(p, area);
}

fn draw_tabs(f: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .map(|t| {
            let busy = t.slot().is_some_and(|s| *t != Tab::SystemLog && app.vm.is_busy(s));
            if busy {
                Line::from(format!("{} *", t.title()))
            } else {
                Line::from(t.title())
            }
        })
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab_index())
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bold().fg(Color::Black).bg(Color::Cyan));
    f.render_widget(tabs, area);
}

fn draw_report(f: &mut Frame, area: Rect, app: &App) {
    let tab = app.tab();
    let mut title = format!(" {} ", tab.title());
    if let Some(slot) = tab.slot() {
        if app.vm.is_busy(slot) {
            title = format!(" {} (running {slot}, c to cancel) ", tab.title());
        }
    }
    let p = Paragraph::new(tab.render(&app.vm))
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.scroll(), 0));
    f.render_widget(p, area);
}

fn draw_log(f: &mut Frame, area: Rect, app: &App) {
    let log = app.vm.log();
    let start = log.len().saturating_sub(LOG_LINES);
    let lines: Vec<Line> = log[start..]
        .iter()
        .map(|entry| {
            let style = if entry.message.contains("rejected") || entry.message.contains("failed") {
                Style::default().fg(Color::Red)
            } else {
                Style::default()
            };
            Line::styled(entry.to_string(), style)
        })
        .collect();
    let p = Paragraph::new(lines)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL).title(" Log "));
    f.render_widget(p, area);
}

fn draw_keys(f: &mut Frame, area: Rect, app: &App) {
    let keys = [
        ("g", "generate"),
        ("1-4", "analyses"),
        ("r", "greedy"),
        ("d", "graph"),
        ("k", "cluster"),
        ("a", "genetic"),
        ("A", "run all"),
        ("e", "export"),
        ("c", "cancel"),
        ("Tab", "switch"),
        ("PgUp/PgDn", "scroll"),
        ("q", "quit"),
    ];
    let mut spans = Vec::new();
    for (key, label) in keys {
        let enabled = match key.chars().next() {
            Some(c) if key.len() == 1 => app.trigger_enabled(c),
            _ => true,
        };
        let (key_style, label_style) = if enabled {
            (Style::default().bold().fg(Color::Cyan), Style::default())
        } else {
            (Style::default().fg(Color::DarkGray), Style::default().fg(Color::DarkGray))
        };
        spans.push(Span::styled(format!(" {key} "), key_style));
        spans.push(Span::styled(format!("{label} "), label_style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
