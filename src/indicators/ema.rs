// =============================================================================
// Exponential Moving Average (EMA) and Wilder's Moving Average (RMA)
// =============================================================================
//
// Both averages share the same recurrence and differ only in the smoothing
// factor:
//
//   EMA:  alpha = 2 / (period + 1)
//   RMA:  alpha = 1 / period          (Wilder's smoothing, used by RSI / ATR)
//
//   avg_t = avg_{t-1} + alpha * (x_t - avg_{t-1})
//
// The average is seeded by the first finite value of the input (NOT by an SMA
// of the first `period` values).  When the input is shorter than `period` the
// whole output is NaN, even though the recurrence could start immediately.
//
// Output series always have the same length as the input.  Undefined entries
// are `f64::NAN`.
// =============================================================================

/// Compute the EMA series for `series` with look-back `period`.
///
/// # Edge cases
/// - `period == 0` or `series.len() < period` => all-NaN series.
/// - Leading NaN inputs (e.g. an RSI warm-up) stay NaN; the average seeds on
///   the first finite value.
/// - A NaN input after seeding carries the previous average forward.
pub fn calculate_ema(series: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; series.len()];
    }
    smooth(series, period, 2.0 / (period as f64 + 1.0))
}

/// Compute Wilder's moving average (RMA) for `series` with look-back `period`.
///
/// Same length and NaN policy as [`calculate_ema`].
pub fn calculate_rma(series: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; series.len()];
    }
    smooth(series, period, 1.0 / period as f64)
}

fn smooth(series: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; series.len()];
    if series.len() < period {
        return out;
    }

    let mut prev: Option<f64> = None;
    for (slot, &x) in out.iter_mut().zip(series) {
        prev = match (prev, x.is_finite()) {
            (None, true) => Some(x),
            (None, false) => None,
            (Some(p), true) => Some(p + alpha * (x - p)),
            (Some(p), false) => Some(p),
        };
        if let Some(p) = prev {
            *slot = p;
        }
    }

    out
}
