// =============================================================================
// EMA Cross + Retest
// =============================================================================
//
// Within the last `lookback` bars, find the most recent upward cross of the
// fast EMA through the slow EMA (and, independently, the most recent downward
// cross).  A setup is confirmed when, from the crossing bar to the end of the
// series, price came within 0.5 % of the fast EMA at least once.
// =============================================================================

use serde::{Deserialize, Serialize};

/// Default number of trailing bars scanned for a cross.
pub const DEFAULT_CROSS_LOOKBACK: usize = 10;

/// Maximum relative distance between price and the fast EMA that counts as a
/// retest.
pub const RETEST_TOLERANCE: f64 = 0.005;

/// Result of the cross-and-retest scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossRetest {
    pub long_setup: bool,
    pub short_setup: bool,
}

/// Scan the trailing `lookback` bars for an EMA cross followed by a retest of
/// the fast EMA.
///
/// Series shorter than `lookback + 1` (or `lookback == 0`) return no setup.
/// NaN averages never produce a cross.
pub fn check_ema_cross_retest(
    prices: &[f64],
    ema_fast: &[f64],
    ema_slow: &[f64],
    lookback: usize,
) -> CrossRetest {
    let n = prices.len().min(ema_fast.len()).min(ema_slow.len());
    if lookback == 0 || n < lookback + 1 {
        return CrossRetest::default();
    }

    let mut last_up = None;
    let mut last_down = None;

    for i in (n - lookback)..n {
        let (prev_fast, prev_slow) = (ema_fast[i - 1], ema_slow[i - 1]);
        let (fast, slow) = (ema_fast[i], ema_slow[i]);

        if prev_fast < prev_slow && fast > slow {
            last_up = Some(i);
        }
        if prev_fast > prev_slow && fast < slow {
            last_down = Some(i);
        }
    }

    CrossRetest {
        long_setup: last_up.is_some_and(|i| retested(&prices[..n], &ema_fast[..n], i)),
        short_setup: last_down.is_some_and(|i| retested(&prices[..n], &ema_fast[..n], i)),
    }
}

fn retested(prices: &[f64], ema_fast: &[f64], from: usize) -> bool {
    prices[from..]
        .iter()
        .zip(&ema_fast[from..])
        .any(|(&price, &fast)| fast != 0.0 && ((price - fast) / fast).abs() <= RETEST_TOLERANCE)
}
