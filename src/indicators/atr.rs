// =============================================================================
// Average True Range (ATR) — Wilder's Smoothing Method
// =============================================================================
//
// True Range (TR) for each bar:
//   TR_0 = H_0 - L_0                                   (no previous close)
//   TR_t = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR = RMA(TR, period), seeded by TR_0.
//
// Default period: 14
// =============================================================================

use crate::indicators::ema::calculate_rma;
use crate::market_data::OhlcSeries;

/// Default ATR look-back.
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// Compute the ATR series from parallel `high` / `low` / `close` slices.
///
/// The output has the length of `close`.
///
/// # Edge cases
/// - `close.len() < period` or `period == 0` => all-NaN series.
/// - Slices of unequal length are read up to the shortest one; trailing
///   entries past it are NaN.
/// - `high < low` is not validated.
pub fn calculate_atr(high: &[f64], low: &[f64], close: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; close.len()];
    if period == 0 || close.len() < period {
        return out;
    }

    let n = high.len().min(low.len()).min(close.len());
    let tr = true_range(&high[..n], &low[..n], &close[..n]);
    let atr = calculate_rma(&tr, period);

    out[..n].copy_from_slice(&atr);
    out
}

/// Convenience wrapper over an [`OhlcSeries`].
pub fn calculate(series: &OhlcSeries, period: usize) -> Vec<f64> {
    calculate_atr(&series.high, &series.low, &series.close, period)
}

/// Per-bar true range. Slices must be of equal length.
pub fn true_range(high: &[f64], low: &[f64], close: &[f64]) -> Vec<f64> {
    let mut tr = Vec::with_capacity(close.len());
    for i in 0..close.len() {
        let hl = high[i] - low[i];
        if i == 0 {
            tr.push(hl);
            continue;
        }
        let prev_close = close[i - 1];
        let hc = (high[i] - prev_close).abs();
        let lc = (low[i] - prev_close).abs();
        tr.push(hl.max(hc).max(lc));
    }
    tr
}
