//! Trade records attributed to tournament bots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Agent name used when a trade is not attributed to any bot.
pub const UNKNOWN_AGENT: &str = "unknown";

/// Errors raised while constructing a trade.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    #[error("trade is missing its pnl")]
    MissingPnl,

    #[error("trade is missing its timestamp")]
    MissingTimestamp,

    #[error("trade pnl must be finite, got {0}")]
    NonFinitePnl(f64),
}

/// Strategy tag inferred from a trade memo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Unknown,
    CopyTrade,
    Sniper,
    Auto,
    Manual,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Unknown => "unknown",
            Strategy::CopyTrade => "copy_trade",
            Strategy::Sniper => "sniper",
            Strategy::Auto => "auto",
            Strategy::Manual => "manual",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::Unknown
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = std::convert::Infallible;

    /// Unrecognized tags fall back to `Unknown`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "copy_trade" => Strategy::CopyTrade,
            "sniper" => Strategy::Sniper,
            "auto" => Strategy::Auto,
            "manual" => Strategy::Manual,
            _ => Strategy::Unknown,
        })
    }
}

/// One completed trade.
///
/// Fields are fixed once the value is built; there are no setters. The
/// `with_*` methods consume the trade and are meant for construction only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TradeRecord")]
pub struct Trade {
    pnl: f64,
    symbol: Option<String>,
    #[serde(rename = "ts")]
    timestamp: i64,
    trigger: Option<String>,
    strategy: Strategy,
    #[serde(rename = "bot")]
    agent: String,
    /// On-chain transaction signature, when the trade came from a chain source.
    #[serde(skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
}

impl Trade {
    /// Create an unattributed trade with no symbol, memo or strategy.
    pub fn new(pnl: f64, timestamp: i64) -> Result<Self, TradeError> {
        if !pnl.is_finite() {
            return Err(TradeError::NonFinitePnl(pnl));
        }
        Ok(Self {
            pnl,
            symbol: None,
            timestamp,
            trigger: None,
            strategy: Strategy::Unknown,
            agent: UNKNOWN_AGENT.to_string(),
            signature: None,
        })
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    /// Realized profit or loss.
    pub fn pnl(&self) -> f64 {
        self.pnl
    }

    pub fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn trigger(&self) -> Option<&str> {
        self.trigger.as_deref()
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Name of the bot that made the trade.
    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

/// Loosely-typed trade as it appears in the persisted log.
#[derive(Debug, Deserialize)]
struct TradeRecord {
    pnl: Option<f64>,
    #[serde(default)]
    symbol: Option<String>,
    ts: Option<i64>,
    #[serde(default)]
    trigger: Option<String>,
    #[serde(default)]
    strategy: Option<String>,
    #[serde(default)]
    bot: Option<String>,
    #[serde(default)]
    signature: Option<String>,
}

impl TryFrom<TradeRecord> for Trade {
    type Error = TradeError;

    fn try_from(record: TradeRecord) -> Result<Self, Self::Error> {
        let pnl = record.pnl.ok_or(TradeError::MissingPnl)?;
        let ts = record.ts.ok_or(TradeError::MissingTimestamp)?;
        let strategy = record
            .strategy
            .as_deref()
            .map(|s| s.parse().unwrap_or_default())
            .unwrap_or_default();

        let mut trade = Trade::new(pnl, ts)?.with_strategy(strategy);
        trade.symbol = record.symbol;
        trade.trigger = record.trigger;
        trade.signature = record.signature;
        if let Some(bot) = record.bot {
            trade.agent = bot;
        }
        Ok(trade)
    }
}
