// =============================================================================
// Relative Strength Index (RSI) — Wilder's Smoothing, and Smoothed RSI
// =============================================================================
//
// Step 1 — Per-step change of consecutive closes.
// Step 2 — gain = max(change, 0), loss = max(-change, 0).
// Step 3 — avg_gain = RMA(gain, period), avg_loss = RMA(loss, period).
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Smoothed RSI is the EMA(9) of the RSI(14) series.
//
// Categories:  >= 70 OVERBOUGHT, >= 60 STRONG, >= 40 NEUTRAL, >= 30 WEAK,
//              otherwise OVERSOLD.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::ema::{calculate_ema, calculate_rma};

/// Default RSI look-back.
pub const DEFAULT_RSI_PERIOD: usize = 14;
/// Default EMA period applied on top of the RSI for the smoothed variant.
pub const DEFAULT_SMOOTH_PERIOD: usize = 9;

/// Compute the full RSI series for `closes`, same length as the input.
///
/// The first `period` entries are NaN; entry `period` is the first defined
/// value.
///
/// # Edge cases
/// - `period == 0` or `closes.len() < period + 1` => all-NaN series.
/// - Average loss zero with a non-zero average gain => 100.0.
/// - Both averages zero (no movement at all) => 50.0.
pub fn calculate_rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; closes.len()];
    if period == 0 || closes.len() < period + 1 {
        return out;
    }

    // gains[j] / losses[j] describe the move into closes[j + 1].
    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|w| {
            let change = w[1] - w[0];
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let avg_gain = calculate_rma(&gains, period);
    let avg_loss = calculate_rma(&losses, period);

    for i in period..closes.len() {
        out[i] = rsi_from_averages(avg_gain[i - 1], avg_loss[i - 1]);
    }

    out
}

/// Compute the smoothed RSI: `EMA(RSI(closes, rsi_period), smooth_period)`.
///
/// Entries where the underlying RSI is still warming up stay NaN.
pub fn calculate_smoothed_rsi(closes: &[f64], rsi_period: usize, smooth_period: usize) -> Vec<f64> {
    let rsi = calculate_rsi(closes, rsi_period);
    // Clamp absorbs last-bit rounding of the recurrence near 0 / 100.
    calculate_ema(&rsi, smooth_period)
        .into_iter()
        .map(|v| v.clamp(0.0, 100.0))
        .collect()
}

/// Coarse RSI bucket shown next to every coin in the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RsiCategory {
    Overbought,
    Strong,
    Neutral,
    Weak,
    Oversold,
}

impl std::fmt::Display for RsiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Strong => write!(f, "STRONG"),
            Self::Neutral => write!(f, "NEUTRAL"),
            Self::Weak => write!(f, "WEAK"),
            Self::Oversold => write!(f, "OVERSOLD"),
        }
    }
}

/// Bucket an RSI reading. NaN is treated as neutral; out-of-range values are
/// bucketed like their nearest boundary.
pub fn rsi_category(rsi: f64) -> RsiCategory {
    if rsi.is_nan() {
        RsiCategory::Neutral
    } else if rsi >= 70.0 {
        RsiCategory::Overbought
    } else if rsi >= 60.0 {
        RsiCategory::Strong
    } else if rsi >= 40.0 {
        RsiCategory::Neutral
    } else if rsi >= 30.0 {
        RsiCategory::Weak
    } else {
        RsiCategory::Oversold
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return f64::NAN;
    }
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    }
}
