// =============================================================================
// Regular RSI Divergence — pivot-confirmed
// =============================================================================
//
// The candidate pivot sits `lookback_right` bars before the end of the series,
// because a pivot is only confirmed once that many later bars exist.
//
//   bullish regular:  RSI pivot low,  price makes a LOWER low,
//                     RSI makes a HIGHER low than the previous RSI pivot low.
//   bearish regular:  RSI pivot high, price makes a HIGHER high,
//                     RSI makes a LOWER high than the previous RSI pivot high.
//
// The previous pivot is the nearest one found `range_lower..=range_upper` bars
// before the candidate; the search stops at the first hit.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::indicators::pivot::{is_pivot_high, is_pivot_low, nearest_earlier_pivot};

/// Extra bars required on top of the search window before any check runs.
const HISTORY_MARGIN: usize = 5;

/// Window parameters for divergence detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceParams {
    #[serde(default = "default_lookback")]
    pub lookback_left: usize,
    #[serde(default = "default_lookback")]
    pub lookback_right: usize,
    #[serde(default = "default_range_lower")]
    pub range_lower: usize,
    #[serde(default = "default_range_upper")]
    pub range_upper: usize,
}

fn default_lookback() -> usize {
    5
}

fn default_range_lower() -> usize {
    5
}

fn default_range_upper() -> usize {
    60
}

impl Default for DivergenceParams {
    fn default() -> Self {
        Self {
            lookback_left: default_lookback(),
            lookback_right: default_lookback(),
            range_lower: default_range_lower(),
            range_upper: default_range_upper(),
        }
    }
}

impl DivergenceParams {
    /// Minimum series length for which a divergence can be reported.
    pub fn min_len(&self) -> usize {
        self.range_upper
            .saturating_add(self.lookback_left)
            .saturating_add(self.lookback_right)
            .saturating_add(HISTORY_MARGIN)
    }
}

/// Single-label view of a divergence result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DivergenceKind {
    BullishRegular,
    BearishRegular,
}

/// Independent bullish / bearish divergence flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DivergenceFlags {
    pub bullish_regular: bool,
    pub bearish_regular: bool,
}

impl DivergenceFlags {
    /// Collapse into one label. Bullish wins when both flags are set.
    pub fn label(&self) -> Option<DivergenceKind> {
        if self.bullish_regular {
            Some(DivergenceKind::BullishRegular)
        } else if self.bearish_regular {
            Some(DivergenceKind::BearishRegular)
        } else {
            None
        }
    }

    pub fn any(&self) -> bool {
        self.bullish_regular || self.bearish_regular
    }
}

/// Check for regular bullish / bearish RSI divergence at the most recent
/// confirmable pivot.
///
/// `close` only contributes to the length check; price extremes are read
/// from `low` (bullish) and `high` (bearish).  Series shorter than
/// [`DivergenceParams::min_len`] yield no divergence.
pub fn check_divergence(
    high: &[f64],
    low: &[f64],
    close: &[f64],
    rsi: &[f64],
    params: &DivergenceParams,
) -> DivergenceFlags {
    let n = high.len().min(low.len()).min(close.len()).min(rsi.len());
    if n < params.min_len() {
        return DivergenceFlags::default();
    }

    let rsi = &rsi[..n];
    let left = params.lookback_left;
    let right = params.lookback_right;
    let candidate = n - 1 - right;

    let mut flags = DivergenceFlags::default();

    if is_pivot_low(rsi, candidate, left, right) {
        if let Some(prev) = nearest_earlier_pivot(
            rsi,
            candidate,
            params.range_lower,
            params.range_upper,
            |s, i| is_pivot_low(s, i, left, right),
        ) {
            let lower_low = low[candidate] < low[prev.index];
            let higher_rsi = rsi[candidate] > prev.value;
            flags.bullish_regular = lower_low && higher_rsi;
        }
    }

    if is_pivot_high(rsi, candidate, left, right) {
        if let Some(prev) = nearest_earlier_pivot(
            rsi,
            candidate,
            params.range_lower,
            params.range_upper,
            |s, i| is_pivot_high(s, i, left, right),
        ) {
            let higher_high = high[candidate] > high[prev.index];
            let lower_rsi = rsi[candidate] < prev.value;
            flags.bearish_regular = higher_high && lower_rsi;
        }
    }

    flags
}
