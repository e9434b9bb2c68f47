//! Performance metrics derived from a trade sequence.

use serde::{Deserialize, Serialize};

/// Aggregate performance of one bot over an ordered trade sequence.
///
/// Always recomputed from the trades; never updated in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Percentage of trades with positive pnl, 0 to 100, two decimals.
    pub win_rate: f64,
    /// Mean pnl per trade, four decimals.
    pub avg_pnl: f64,
    /// Worst drop of cumulative pnl below its running peak, four decimals. Never positive.
    #[serde(rename = "max_dd")]
    pub max_drawdown: f64,
}

impl MetricsSnapshot {
    /// Whether the win rate is under the given percentage.
    pub fn is_below_win_rate(&self, minimum: f64) -> bool {
        self.win_rate < minimum
    }

    /// Whether the drawdown is deeper than the given (negative) limit.
    pub fn breaches_drawdown(&self, limit: f64) -> bool {
        self.max_drawdown < limit
    }
}

/// Round half to even on the exact binary value of `value`.
///
/// Formatting at a fixed precision is exact for `f64`, so ties such as
/// `0.125` are decided on the true value rather than a scaled
/// approximation.
pub fn round_to(value: f64, places: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let rounded = format!("{:.*}", places, value)
        .parse::<f64>()
        .unwrap_or(value);
    // Normalize -0.0
    rounded + 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_zero() {
        let snapshot = MetricsSnapshot::default();
        assert_eq!(snapshot.win_rate, 0.0);
        assert_eq!(snapshot.avg_pnl, 0.0);
        assert_eq!(snapshot.max_drawdown, 0.0);
    }

    #[test]
    fn test_thresholds() {
        let snapshot = MetricsSnapshot {
            win_rate: 50.0,
            avg_pnl: 0.01,
            max_drawdown: -6.0,
        };
        assert!(snapshot.is_below_win_rate(55.0));
        assert!(!snapshot.is_below_win_rate(50.0));
        assert!(snapshot.breaches_drawdown(-5.0));
        assert!(!snapshot.breaches_drawdown(-6.0));
    }

    #[test]
    fn test_snapshot_json_keys() {
        let snapshot = MetricsSnapshot {
            win_rate: 75.0,
            avg_pnl: 0.05,
            max_drawdown: -0.1,
        };
        let value = serde_json::to_value(snapshot).unwrap();
        assert_eq!(value["win_rate"], 75.0);
        assert_eq!(value["max_dd"], -0.1);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(33.333333, 2), 33.33);
        assert_eq!(round_to(66.666666, 2), 66.67);
        assert_eq!(round_to(0.025, 4), 0.025);
        assert_eq!(round_to(-0.15000000000000002, 4), -0.15);
    }

    #[test]
    fn test_round_to_ties_go_to_even() {
        // 0.03125 and 0.09375 are exactly representable ties at four places
        assert_eq!(round_to(0.03125, 4), 0.0312);
        assert_eq!(round_to(0.09375, 4), 0.0938);
        assert_eq!(round_to(3.125, 2), 3.12);
        assert_eq!(round_to(3.375, 2), 3.38);
    }

    #[test]
    fn test_round_to_normalizes_negative_zero() {
        let rounded = round_to(-0.00001, 4);
        assert_eq!(rounded, 0.0);
        assert!(rounded.is_sign_positive());
    }
}
