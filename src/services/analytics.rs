//! Trade classification and performance metrics.
//!
//! Everything here is a pure function of its inputs: no I/O, no shared
//! state, safe to call from any thread.

use crate::types::{round_to, MetricsSnapshot, PeriodBalances, Strategy, Trade};
use std::collections::BTreeMap;

/// Classify a trade memo into a strategy tag.
///
/// Matching is case-insensitive substring containment, checked in order:
/// copy trade, sniper, auto. Any other non-empty memo is manual.
pub fn classify_strategy(memo: Option<&str>) -> Strategy {
    let memo = match memo {
        Some(m) if !m.is_empty() => m.to_uppercase(),
        _ => return Strategy::Unknown,
    };

    if memo.contains("COPY") {
        Strategy::CopyTrade
    } else if memo.contains("SNIPE") || memo.contains("SNIPER") {
        Strategy::Sniper
    } else if memo.contains("AUTO") {
        Strategy::Auto
    } else {
        Strategy::Manual
    }
}

/// Compute win rate, average pnl and max drawdown over trades in the given order.
///
/// Drawdown is measured against a running peak of cumulative pnl that
/// starts at zero, so a losing first trade is already a drawdown.
pub fn compute_metrics(trades: &[Trade]) -> MetricsSnapshot {
    if trades.is_empty() {
        return MetricsSnapshot::default();
    }

    let total = trades.len() as f64;
    let wins = trades.iter().filter(|t| t.is_win()).count() as f64;
    let pnl_sum: f64 = trades.iter().map(|t| t.pnl()).sum();

    let mut cumulative = 0.0f64;
    let mut peak = 0.0f64;
    let mut max_drawdown = 0.0f64;
    for trade in trades {
        cumulative += trade.pnl();
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.min(cumulative - peak);
    }

    MetricsSnapshot {
        win_rate: round_to(wins / total * 100.0, 2),
        avg_pnl: round_to(pnl_sum / total, 4),
        max_drawdown: round_to(max_drawdown, 4),
    }
}

/// Number of trades per strategy tag. Tags with no trades are omitted.
pub fn strategy_breakdown(trades: &[Trade]) -> BTreeMap<Strategy, usize> {
    let mut counts = BTreeMap::new();
    for trade in trades {
        *counts.entry(trade.strategy()).or_insert(0) += 1;
    }
    counts
}

/// Balance of every bot: `initial_balance` plus the pnl of all its trades.
///
/// This is a full recomputation over the whole log, so repeating it for
/// the same period always gives the same answer.
pub fn compute_balances<S: AsRef<str>>(
    trades: &[Trade],
    bots: &[S],
    initial_balance: f64,
) -> PeriodBalances {
    bots.iter()
        .map(|bot| {
            let bot = bot.as_ref();
            let pnl: f64 = trades
                .iter()
                .filter(|t| t.agent() == bot)
                .map(|t| t.pnl())
                .sum();
            (bot.to_string(), initial_balance + pnl)
        })
        .collect()
}
