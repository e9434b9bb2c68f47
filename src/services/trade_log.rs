//! Persisted, append-only log of every trade in the tournament.

use crate::config::TRADE_LOG_FILE;
use crate::services::store::JsonStore;
use crate::types::Trade;
use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;

/// Day number of a timestamp relative to the tournament start (day 1 is the start date).
pub fn day_index(timestamp: i64, start_date: NaiveDate) -> i64 {
    let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or(start_date);
    (date - start_date).num_days() + 1
}

/// All trades in the tournament, in the order they were logged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLog {
    trades: Vec<Trade>,
}

impl TradeLog {
    pub fn new(trades: Vec<Trade>) -> Self {
        Self { trades }
    }

    /// Load the log, dropping records that are not valid trades.
    pub fn load(store: &JsonStore) -> Self {
        let raw: Vec<serde_json::Value> = store.load(TRADE_LOG_FILE, Vec::new());
        Self::from_values(raw)
    }

    /// Validate raw records into trades. Invalid ones are logged and skipped.
    pub fn from_values(raw: Vec<serde_json::Value>) -> Self {
        let mut trades = Vec::with_capacity(raw.len());
        for (index, value) in raw.into_iter().enumerate() {
            match serde_json::from_value::<Trade>(value) {
                Ok(trade) => trades.push(trade),
                Err(e) => warn!("Skipping invalid trade record #{}: {}", index, e),
            }
        }
        Self { trades }
    }

    pub fn save(&self, store: &JsonStore) -> bool {
        store.save(TRADE_LOG_FILE, &self.trades)
    }

    /// Append trades to the end of the log.
    pub fn extend(&mut self, trades: impl IntoIterator<Item = Trade>) {
        self.trades.extend(trades);
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    /// Trades made by one bot, in log order.
    pub fn for_bot(&self, bot: &str) -> Vec<Trade> {
        self.trades
            .iter()
            .filter(|t| t.agent() == bot)
            .cloned()
            .collect()
    }

    /// Latest timestamp logged for a bot; new trades are fetched after it.
    pub fn last_timestamp(&self, bot: &str) -> Option<i64> {
        self.trades
            .iter()
            .filter(|t| t.agent() == bot)
            .map(|t| t.timestamp())
            .max()
    }

    /// Whether `trade` is already in the log: same signature when it has one,
    /// otherwise an identical record.
    pub fn is_logged(&self, trade: &Trade) -> bool {
        match trade.signature() {
            Some(signature) => self.trades.iter().any(|t| t.signature() == Some(signature)),
            None => self.trades.contains(trade),
        }
    }

    /// Trades whose day number falls within `[from_day, to_day]`.
    pub fn in_day_range(&self, start_date: NaiveDate, from_day: i64, to_day: i64) -> Vec<Trade> {
        self.trades
            .iter()
            .filter(|t| {
                let day = day_index(t.timestamp(), start_date);
                day >= from_day && day <= to_day
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 14).unwrap()
    }

    /// Noon UTC on the given tournament day.
    fn ts_on_day(day: i64) -> i64 {
        let date = start() + chrono::Duration::days(day - 1);
        date.and_hms_opt(12, 0, 0).unwrap().and_utc().timestamp()
    }

    #[test]
    fn test_day_index() {
        assert_eq!(day_index(ts_on_day(1), start()), 1);
        assert_eq!(day_index(ts_on_day(8), start()), 8);
        // Before the tournament starts
        assert_eq!(day_index(ts_on_day(0), start()), 0);
    }

    #[test]
    fn test_from_values_skips_invalid_records() {
        let log = TradeLog::from_values(vec![
            json!({"pnl": 0.1, "ts": 1, "bot": "Trojan"}),
            json!({"ts": 2, "bot": "Trojan"}),
            json!({"pnl": "oops", "ts": 3}),
            json!("not an object"),
            json!({"pnl": -0.2, "ts": 4, "bot": "FrogBot", "strategy": "sniper"}),
            json!({"pnl": 0.5, "bot": "Trojan"}),
        ]);

        assert_eq!(log.len(), 2);
        assert_eq!(log.trades()[0].agent(), "Trojan");
        assert_eq!(log.trades()[1].pnl(), -0.2);
    }

    #[test]
    fn test_for_bot_and_last_timestamp() {
        let log = TradeLog::new(vec![
            Trade::new(0.1, 10).unwrap().with_agent("A"),
            Trade::new(0.2, 30).unwrap().with_agent("B"),
            Trade::new(0.3, 20).unwrap().with_agent("A"),
        ]);

        assert_eq!(log.for_bot("A").len(), 2);
        assert_eq!(log.last_timestamp("A"), Some(20));
        assert_eq!(log.last_timestamp("B"), Some(30));
        assert_eq!(log.last_timestamp("C"), None);
    }

    #[test]
    fn test_is_logged() {
        let log = TradeLog::new(vec![
            Trade::new(0.1, 10).unwrap().with_agent("A").with_signature("sig-1"),
            Trade::new(0.2, 10).unwrap().with_agent("A"),
        ]);

        assert!(log.is_logged(&Trade::new(0.1, 10).unwrap().with_agent("A").with_signature("sig-1")));
        assert!(!log.is_logged(&Trade::new(0.1, 10).unwrap().with_agent("A").with_signature("sig-2")));
        assert!(log.is_logged(&Trade::new(0.2, 10).unwrap().with_agent("A")));
        assert!(!log.is_logged(&Trade::new(0.3, 10).unwrap().with_agent("A")));
    }

    #[test]
    fn test_in_day_range() {
        let log = TradeLog::new(
            (1..=10)
                .map(|day| Trade::new(day as f64, ts_on_day(day)).unwrap())
                .collect(),
        );

        let week = log.in_day_range(start(), 4, 10);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].pnl(), 4.0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("tourney_trade_log_round_trip");
        let _ = std::fs::remove_dir_all(&dir);
        let store = JsonStore::new(&dir);

        let mut log = TradeLog::default();
        log.extend(vec![Trade::new(0.5, 1).unwrap().with_symbol("BONK").with_agent("A")]);
        assert!(log.save(&store));

        let loaded = TradeLog::load(&store);
        assert_eq!(loaded, log);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
