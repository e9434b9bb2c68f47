//! Balance checkpoints keyed by tournament day.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Balances of every bot at the end of one period.
pub type PeriodBalances = BTreeMap<String, f64>;

/// Historical balance curve: day number -> bot name -> balance.
///
/// Serialized as a JSON object with string day keys, e.g.
/// `{"1": {"Trojan": 50.0}}`. Periods are only ever added or refreshed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceHistory {
    periods: BTreeMap<u32, PeriodBalances>,
}

impl BalanceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the balances for a period, replacing any earlier entry for it.
    pub fn record_period(&mut self, day: u32, balances: PeriodBalances) {
        self.periods.insert(day, balances);
    }

    /// Balances recorded for a day.
    pub fn get(&self, day: u32) -> Option<&PeriodBalances> {
        self.periods.get(&day)
    }

    /// The most recent period and its balances.
    pub fn latest(&self) -> Option<(u32, &PeriodBalances)> {
        self.periods.iter().next_back().map(|(day, b)| (*day, b))
    }

    /// Balance curve of one bot, skipping days it has no entry for.
    pub fn series(&self, bot: &str) -> Vec<(u32, f64)> {
        self.periods
            .iter()
            .filter_map(|(day, balances)| balances.get(bot).map(|b| (*day, *b)))
            .collect()
    }

    /// Periods within `[from, to]`, inclusive.
    pub fn range(&self, from: u32, to: u32) -> impl Iterator<Item = (u32, &PeriodBalances)> + '_ {
        self.periods
            .iter()
            .filter(move |(day, _)| (from..=to).contains(*day))
            .map(|(day, b)| (*day, b))
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balances(pairs: &[(&str, f64)]) -> PeriodBalances {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_record_and_get() {
        let mut history = BalanceHistory::new();
        assert!(history.is_empty());

        history.record_period(1, balances(&[("Trojan", 50.0)]));
        history.record_period(2, balances(&[("Trojan", 50.5)]));

        assert_eq!(history.len(), 2);
        assert_eq!(history.get(2).unwrap()["Trojan"], 50.5);
        assert!(history.get(3).is_none());
    }

    #[test]
    fn test_record_period_replaces_existing() {
        let mut history = BalanceHistory::new();
        history.record_period(1, balances(&[("Trojan", 49.0)]));
        history.record_period(1, balances(&[("Trojan", 51.0)]));

        assert_eq!(history.len(), 1);
        assert_eq!(history.get(1).unwrap()["Trojan"], 51.0);
    }

    #[test]
    fn test_latest_is_highest_day() {
        let mut history = BalanceHistory::new();
        history.record_period(10, balances(&[("A", 1.0)]));
        history.record_period(2, balances(&[("A", 2.0)]));
        history.record_period(9, balances(&[("A", 3.0)]));

        let (day, latest) = history.latest().unwrap();
        assert_eq!(day, 10);
        assert_eq!(latest["A"], 1.0);
        assert!(BalanceHistory::new().latest().is_none());
    }

    #[test]
    fn test_series_skips_missing_days() {
        let mut history = BalanceHistory::new();
        history.record_period(1, balances(&[("A", 50.0), ("B", 50.0)]));
        history.record_period(2, balances(&[("A", 51.0)]));

        assert_eq!(history.series("A"), vec![(1, 50.0), (2, 51.0)]);
        assert_eq!(history.series("B"), vec![(1, 50.0)]);
        assert!(history.series("C").is_empty());
    }

    #[test]
    fn test_range_is_inclusive() {
        let mut history = BalanceHistory::new();
        for day in 1..=10 {
            history.record_period(day, balances(&[("A", day as f64)]));
        }
        let days: Vec<u32> = history.range(4, 10).map(|(d, _)| d).collect();
        assert_eq!(days, vec![4, 5, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn test_json_uses_string_day_keys() {
        let mut history = BalanceHistory::new();
        history.record_period(1, balances(&[("Trojan", 50.0)]));

        let json = serde_json::to_string(&history).unwrap();
        assert_eq!(json, r#"{"1":{"Trojan":50.0}}"#);

        let parsed: BalanceHistory = serde_json::from_str(r#"{"3": {"FrogBot": 48.5}}"#).unwrap();
        assert_eq!(parsed.get(3).unwrap()["FrogBot"], 48.5);
    }
}
