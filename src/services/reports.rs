//! Markdown report rendering.

use crate::error::Result;
use crate::types::{BalanceHistory, MetricsSnapshot, PeriodBalances, Strategy};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Tags attached to daily posts.
pub const DAILY_TAGS: &[&str] = &["solana", "trading", "bots", "cryptocurrency", "defi", "tournament"];
/// Tags attached to weekly posts.
pub const WEEKLY_TAGS: &[&str] = &["solana", "trading", "bots", "cryptocurrency", "defi", "weekly-summary"];

/// Week number containing `end_day`.
pub fn week_number(end_day: u32) -> u32 {
    end_day / 7 + 1
}

pub fn daily_title(day: u32) -> String {
    format!("Day {} - Solana Bot Tournament Results", day)
}

pub fn weekly_title(week: u32) -> String {
    format!("Week {} - Solana Bot Tournament Weekly Summary", week)
}

pub fn daily_file_name(day: u32) -> String {
    format!("day_{}_report.md", day)
}

pub fn weekly_file_name(week: u32) -> String {
    format!("week_{}_summary.md", week)
}

pub fn daily_chart_name(day: u32) -> String {
    format!("day_{}_chart.png", day)
}

pub fn weekly_chart_name(end_day: u32) -> String {
    format!("week_ending_day_{}_chart.png", end_day)
}

/// Shortest round-trip form, keeping a trailing `.0` on whole numbers.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

fn metrics_cells(metrics: Option<&MetricsSnapshot>) -> String {
    match metrics {
        Some(m) => format!(
            "{}% | {} | {}",
            format_number(m.win_rate),
            format_number(m.avg_pnl),
            format_number(m.max_drawdown)
        ),
        None => "- | - | -".to_string(),
    }
}

fn strategy_cell(counts: Option<&BTreeMap<Strategy, usize>>) -> String {
    match counts {
        Some(counts) if !counts.is_empty() => counts
            .iter()
            .map(|(strategy, n)| format!("{} {}", strategy, n))
            .collect::<Vec<_>>()
            .join(", "),
        _ => "-".to_string(),
    }
}

/// Render the daily standings report.
pub fn render_daily(
    day: u32,
    metrics: &BTreeMap<String, MetricsSnapshot>,
    balances: &PeriodBalances,
    strategies: &BTreeMap<String, BTreeMap<Strategy, usize>>,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Day {} - Solana Bot Tournament\n", day);

    let bots: BTreeSet<&String> = metrics.keys().chain(balances.keys()).collect();
    if bots.is_empty() {
        let _ = writeln!(out, "_No bot activity recorded yet._\n");
    } else {
        let _ = writeln!(out, "## Standings\n");
        let _ = writeln!(
            out,
            "| Bot | Win Rate | Avg PnL | Max Drawdown | Balance (SOL) | Strategies |"
        );
        let _ = writeln!(out, "|---|---|---|---|---|---|");
        for bot in bots {
            let balance = balances
                .get(bot)
                .map(|b| format_number(*b))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} |",
                bot,
                metrics_cells(metrics.get(bot)),
                balance,
                strategy_cell(strategies.get(bot))
            );
        }
        out.push('\n');
    }

    let _ = writeln!(out, "![Day {} balances]({})", day, daily_chart_name(day));
    out
}

/// Render the weekly summary covering the seven days ending at `end_day`.
///
/// `trade_count` is the number of trades inside the week window.
pub fn render_weekly(
    week: u32,
    end_day: u32,
    trade_count: usize,
    metrics: &BTreeMap<String, MetricsSnapshot>,
    history: &BalanceHistory,
) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# Week {} Summary - Solana Bot Tournament\n", week);
    let _ = writeln!(out, "Week ending Day {}.\n", end_day);

    if trade_count == 0 {
        let _ = writeln!(out, "_No trades this week._\n");
    } else {
        let _ = writeln!(out, "{} trades this week.\n", trade_count);
        let _ = writeln!(out, "## Weekly Performance\n");
        let _ = writeln!(out, "| Bot | Win Rate | Avg PnL | Max Drawdown |");
        let _ = writeln!(out, "|---|---|---|---|");
        for (bot, m) in metrics {
            let _ = writeln!(out, "| {} | {} |", bot, metrics_cells(Some(m)));
        }
        out.push('\n');
    }

    let week_start = end_day.saturating_sub(6).max(1);
    let periods: Vec<(u32, &PeriodBalances)> = history.range(week_start, end_day).collect();
    if !periods.is_empty() {
        let bots: BTreeSet<&String> = periods.iter().flat_map(|(_, b)| b.keys()).collect();
        let _ = writeln!(out, "## Balance History\n");
        let header: Vec<&str> = bots.iter().map(|b| b.as_str()).collect();
        let _ = writeln!(out, "| Day | {} |", header.join(" | "));
        let _ = writeln!(out, "|---|{}", "---|".repeat(bots.len()));
        for (day, balances) in &periods {
            let cells: Vec<String> = bots
                .iter()
                .map(|bot| {
                    balances
                        .get(*bot)
                        .map(|b| format_number(*b))
                        .unwrap_or_else(|| "-".to_string())
                })
                .collect();
            let _ = writeln!(out, "| {} | {} |", day, cells.join(" | "));
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "![Week {} balances]({})",
        week,
        weekly_chart_name(end_day)
    );
    out
}

/// Write a report into `dir`, creating the directory if needed.
pub fn write_report(dir: &Path, file_name: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, content)?;
    info!("Generated report: {}", path.display());
    Ok(path)
}
