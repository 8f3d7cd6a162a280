// =============================================================================
// Signal Layer Classifier
// =============================================================================
//
// Scores long and short conviction on a 0–5 scale at the last CLOSED bar
// (index len - 2); the most recent bar is treated as in-progress.
//
// Rules (per side):
//   R1  trend + pullback   EMA13 vs EMA21 separated by >= 0.15 * ATR, and the
//                          close within 0.3 * ATR of BOTH averages.
//   R2  RSI + divergence   RSI < 40 (long) / > 60 (short) AND a regular
//                          divergence on the series without the live bar.
//   R3  smoothed RSI       SmoothedRSI < 40 / > 60, RSI crossing SmoothedRSI
//                          at the closed bar in the trade direction, AND the
//                          same divergence.
//   R4  R1 AND R2
//   R5  R1 AND R3
//
// Layer = highest rule that fires, checked 5, 4, 3, 2, 1; otherwise 0.
// Long and short are scored independently and may both be non-zero.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::atr::{self, DEFAULT_ATR_PERIOD};
use crate::indicators::divergence::{check_divergence, DivergenceParams};
use crate::indicators::ema::calculate_ema;
use crate::indicators::rsi::{
    calculate_rsi, calculate_smoothed_rsi, DEFAULT_RSI_PERIOD, DEFAULT_SMOOTH_PERIOD,
};
use crate::market_data::OhlcSeries;

pub const EMA_FAST_PERIOD: usize = 13;
pub const EMA_SLOW_PERIOD: usize = 21;

// =============================================================================
// Parameters
// =============================================================================

fn default_min_bars() -> usize {
    50
}

fn default_trend_atr_band() -> f64 {
    0.15
}

fn default_pullback_atr_band() -> f64 {
    0.3
}

fn default_long_rsi_max() -> f64 {
    40.0
}

fn default_short_rsi_min() -> f64 {
    60.0
}

/// Thresholds for the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerParams {
    /// Series shorter than this are never scored.
    #[serde(default = "default_min_bars")]
    pub min_bars: usize,

    /// Minimum EMA13/EMA21 spread, in ATR multiples, for a trend to count.
    #[serde(default = "default_trend_atr_band")]
    pub trend_atr_band: f64,

    /// Maximum close-to-EMA distance, in ATR multiples, for a pullback.
    #[serde(default = "default_pullback_atr_band")]
    pub pullback_atr_band: f64,

    /// RSI / SmoothedRSI must be below this for the long momentum rules.
    #[serde(default = "default_long_rsi_max")]
    pub long_rsi_max: f64,

    /// RSI / SmoothedRSI must be above this for the short momentum rules.
    #[serde(default = "default_short_rsi_min")]
    pub short_rsi_min: f64,

    #[serde(default)]
    pub divergence: DivergenceParams,
}

impl Default for LayerParams {
    fn default() -> Self {
        Self {
            min_bars: default_min_bars(),
            trend_atr_band: default_trend_atr_band(),
            pullback_atr_band: default_pullback_atr_band(),
            long_rsi_max: default_long_rsi_max(),
            short_rsi_min: default_short_rsi_min(),
            divergence: DivergenceParams::default(),
        }
    }
}

// =============================================================================
// Output types
// =============================================================================

/// Human-readable name for a non-zero layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalLabel {
    StrongLong,
    Long,
    WeakLong,
    PotentialLong,
    EmaLong,
    StrongShort,
    Short,
    WeakShort,
    PotentialShort,
    EmaShort,
}

impl SignalLabel {
    pub fn for_long(layer: u8) -> Option<Self> {
        match layer {
            5 => Some(Self::StrongLong),
            4 => Some(Self::Long),
            3 => Some(Self::WeakLong),
            2 => Some(Self::PotentialLong),
            1 => Some(Self::EmaLong),
            _ => None,
        }
    }

    pub fn for_short(layer: u8) -> Option<Self> {
        match layer {
            5 => Some(Self::StrongShort),
            4 => Some(Self::Short),
            3 => Some(Self::WeakShort),
            2 => Some(Self::PotentialShort),
            1 => Some(Self::EmaShort),
            _ => None,
        }
    }
}

/// Long / short layer scores for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalResult {
    pub long_layer: u8,
    pub short_layer: u8,
    pub long_signal: Option<SignalLabel>,
    pub short_signal: Option<SignalLabel>,
}

impl SignalResult {
    /// No signal on either side.
    pub fn none() -> Self {
        Self::from_layers(0, 0)
    }

    pub fn from_layers(long_layer: u8, short_layer: u8) -> Self {
        Self {
            long_layer,
            short_layer,
            long_signal: SignalLabel::for_long(long_layer),
            short_signal: SignalLabel::for_short(short_layer),
        }
    }
}

/// Which base rules fired for one side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleHits {
    /// Rule 1.
    pub trend_pullback: bool,
    /// Rule 2.
    pub rsi_divergence: bool,
    /// Rule 3.
    pub smoothed_rsi_cross: bool,
}

impl RuleHits {
    /// Strict-priority layer: the highest composite rule wins.
    pub fn layer(&self) -> u8 {
        let rule4 = self.trend_pullback && self.rsi_divergence;
        let rule5 = self.trend_pullback && self.smoothed_rsi_cross;

        if rule5 {
            5
        } else if rule4 {
            4
        } else if self.smoothed_rsi_cross {
            3
        } else if self.rsi_divergence {
            2
        } else if self.trend_pullback {
            1
        } else {
            0
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// Borrowed, index-aligned series consumed by [`detect_signal_layer`].
#[derive(Debug, Clone, Copy)]
pub struct LayerInputs<'a> {
    pub high: &'a [f64],
    pub low: &'a [f64],
    pub close: &'a [f64],
    pub ema13: &'a [f64],
    pub ema21: &'a [f64],
    pub rsi: &'a [f64],
    pub smoothed_rsi: &'a [f64],
    pub atr: &'a [f64],
}

/// Owned indicator series computed from an [`OhlcSeries`] with the standard
/// periods (EMA 13/21, RSI 14, SmoothedRSI 14/9, ATR 14).
#[derive(Debug, Clone)]
pub struct LayerIndicators {
    pub ema13: Vec<f64>,
    pub ema21: Vec<f64>,
    pub rsi: Vec<f64>,
    pub smoothed_rsi: Vec<f64>,
    pub atr: Vec<f64>,
}

impl LayerIndicators {
    pub fn compute(series: &OhlcSeries) -> Self {
        Self {
            ema13: calculate_ema(&series.close, EMA_FAST_PERIOD),
            ema21: calculate_ema(&series.close, EMA_SLOW_PERIOD),
            rsi: calculate_rsi(&series.close, DEFAULT_RSI_PERIOD),
            smoothed_rsi: calculate_smoothed_rsi(
                &series.close,
                DEFAULT_RSI_PERIOD,
                DEFAULT_SMOOTH_PERIOD,
            ),
            atr: atr::calculate(series, DEFAULT_ATR_PERIOD),
        }
    }

    pub fn inputs<'a>(&'a self, series: &'a OhlcSeries) -> LayerInputs<'a> {
        LayerInputs {
            high: &series.high,
            low: &series.low,
            close: &series.close,
            ema13: &self.ema13,
            ema21: &self.ema21,
            rsi: &self.rsi,
            smoothed_rsi: &self.smoothed_rsi,
            atr: &self.atr,
        }
    }
}

// =============================================================================
// Classifier
// =============================================================================

/// Score long / short layers at the last closed bar.
///
/// Returns [`SignalResult::none`] without evaluating any rule when
/// `close.len() < params.min_bars`.  Series shorter than `close` read as NaN
/// past their end, which makes every rule touching them false.
pub fn detect_signal_layer(inputs: &LayerInputs<'_>, params: &LayerParams) -> SignalResult {
    let n = inputs.close.len();
    if n < params.min_bars.max(3) {
        return SignalResult::none();
    }

    let i = n - 2;
    let close = inputs.close[i];
    let ema13 = at(inputs.ema13, i);
    let ema21 = at(inputs.ema21, i);
    let atr = at(inputs.atr, i);
    let rsi = at(inputs.rsi, i);
    let srsi = at(inputs.smoothed_rsi, i);
    let prev_rsi = at(inputs.rsi, i - 1);
    let prev_srsi = at(inputs.smoothed_rsi, i - 1);

    let (trend_long, trend_short) = trend_pullback(close, ema13, ema21, atr, params);

    // Divergence is judged on closed bars only.
    let closed = n - 1;
    let divergence = check_divergence(
        head(inputs.high, closed),
        head(inputs.low, closed),
        &inputs.close[..closed],
        head(inputs.rsi, closed),
        &params.divergence,
    );

    let long = RuleHits {
        trend_pullback: trend_long,
        rsi_divergence: rsi < params.long_rsi_max && divergence.bullish_regular,
        smoothed_rsi_cross: srsi < params.long_rsi_max
            && crossed_up(prev_rsi, prev_srsi, rsi, srsi)
            && divergence.bullish_regular,
    };

    let short = RuleHits {
        trend_pullback: trend_short,
        rsi_divergence: rsi > params.short_rsi_min && divergence.bearish_regular,
        smoothed_rsi_cross: srsi > params.short_rsi_min
            && crossed_down(prev_rsi, prev_srsi, rsi, srsi)
            && divergence.bearish_regular,
    };

    let result = SignalResult::from_layers(long.layer(), short.layer());

    debug!(
        bars = n,
        long_layer = result.long_layer,
        short_layer = result.short_layer,
        bullish_div = divergence.bullish_regular,
        bearish_div = divergence.bearish_regular,
        "signal layer evaluated"
    );

    result
}

/// Rule 1 for both sides: `(long, short)`.
///
/// Any NaN argument makes both sides false.
pub fn trend_pullback(
    close: f64,
    ema_fast: f64,
    ema_slow: f64,
    atr: f64,
    params: &LayerParams,
) -> (bool, bool) {
    let separated = (ema_fast - ema_slow).abs() >= params.trend_atr_band * atr;
    let band = params.pullback_atr_band * atr;
    let pullback = (close - ema_fast).abs() <= band && (close - ema_slow).abs() <= band;

    let long = ema_fast > ema_slow && separated && pullback;
    let short = ema_fast < ema_slow && separated && pullback;
    (long, short)
}

/// RSI moved from at-or-below to strictly above its smoothed line.
pub fn crossed_up(prev_rsi: f64, prev_srsi: f64, rsi: f64, srsi: f64) -> bool {
    prev_rsi <= prev_srsi && rsi > srsi
}

/// RSI moved from at-or-above to strictly below its smoothed line.
pub fn crossed_down(prev_rsi: f64, prev_srsi: f64, rsi: f64, srsi: f64) -> bool {
    prev_rsi >= prev_srsi && rsi < srsi
}

fn at(series: &[f64], i: usize) -> f64 {
    series.get(i).copied().unwrap_or(f64::NAN)
}

fn head(series: &[f64], len: usize) -> &[f64] {
    &series[..len.min(series.len())]
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const N: usize = 80;
    /// Last closed bar.
    const CLOSED: usize = N - 2;
    /// Divergence candidate on the closed-bar series (length N - 1).
    const PIVOT: usize = N - 1 - 1 - 5;

    /// Hand-built series where every field can be set per bar.
    struct Scenario {
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
        ema13: Vec<f64>,
        ema21: Vec<f64>,
        rsi: Vec<f64>,
        smoothed_rsi: Vec<f64>,
        atr: Vec<f64>,
    }

    impl Scenario {
        /// Neutral market: no trend (equal EMAs), RSI 50 everywhere.
        fn neutral() -> Self {
            Self {
                high: vec![101.0; N],
                low: vec![99.0; N],
                close: vec![100.0; N],
                ema13: vec![100.0; N],
                ema21: vec![100.0; N],
                rsi: vec![50.0; N],
                smoothed_rsi: vec![50.0; N],
                atr: vec![4.0; N],
            }
        }

        /// EMA13 above EMA21 by 1.0 (>= 0.15 * 4.0) and the close pulled back
        /// between them.
        fn with_long_trend_pullback(mut self) -> Self {
            self.ema13 = vec![101.0; N];
            self.close[CLOSED] = 100.5;
            self
        }

        fn with_short_trend_pullback(mut self) -> Self {
            self.ema13 = vec![99.0; N];
            self.close[CLOSED] = 99.5;
            self
        }

        /// Confirmed RSI pivot low that is higher than the previous one while
        /// price makes a lower low.
        fn with_bullish_divergence(mut self) -> Self {
            let prev = PIVOT - 20;
            self.rsi[prev] = 20.0;
            self.low[prev] = 100.0;
            self.rsi[PIVOT] = 25.0;
            self.low[PIVOT] = 90.0;
            self
        }

        fn with_bearish_divergence(mut self) -> Self {
            let prev = PIVOT - 20;
            self.rsi[prev] = 80.0;
            self.high[prev] = 100.0;
            self.rsi[PIVOT] = 75.0;
            self.high[PIVOT] = 110.0;
            self
        }

        /// RSI 38 at the closed bar, crossing up through a smoothed RSI of
        /// `smoothed`.
        fn with_low_rsi_cross_up(mut self, smoothed: f64) -> Self {
            self.smoothed_rsi = vec![smoothed; N];
            self.rsi[CLOSED - 1] = 30.0;
            self.rsi[CLOSED] = 38.0;
            self
        }

        fn with_high_rsi_cross_down(mut self, smoothed: f64) -> Self {
            self.smoothed_rsi = vec![smoothed; N];
            self.rsi[CLOSED - 1] = 70.0;
            self.rsi[CLOSED] = 62.0;
            self
        }

        /// RSI already above a low smoothed RSI on the previous bar: both below
        /// 40 at the closed bar, but no fresh crossing.
        fn with_low_rsi_above_smoothed(mut self, smoothed: f64) -> Self {
            self.smoothed_rsi = vec![smoothed; N];
            self.rsi[CLOSED - 1] = smoothed + 1.5;
            self.rsi[CLOSED] = 38.0;
            self
        }

        fn with_high_rsi_below_smoothed(mut self, smoothed: f64) -> Self {
            self.smoothed_rsi = vec![smoothed; N];
            self.rsi[CLOSED - 1] = smoothed - 2.0;
            self.rsi[CLOSED] = 62.0;
            self
        }

        fn detect(&self) -> SignalResult {
            let inputs = LayerInputs {
                high: &self.high,
                low: &self.low,
                close: &self.close,
                ema13: &self.ema13,
                ema21: &self.ema21,
                rsi: &self.rsi,
                smoothed_rsi: &self.smoothed_rsi,
                atr: &self.atr,
            };
            detect_signal_layer(&inputs, &LayerParams::default())
        }
    }

    // ---- RuleHits::layer -------------------------------------------------

    #[test]
    fn layer_priority_table() {
        let cases = [
            ((false, false, false), 0),
            ((true, false, false), 1),
            ((false, true, false), 2),
            ((false, false, true), 3),
            ((false, true, true), 3),
            ((true, true, false), 4),
            ((true, false, true), 5),
            ((true, true, true), 5),
        ];
        for ((tp, rd, sc), expected) in cases {
            let hits = RuleHits {
                trend_pullback: tp,
                rsi_divergence: rd,
                smoothed_rsi_cross: sc,
            };
            assert_eq!(hits.layer(), expected, "{hits:?}");
        }
    }

    // ---- trend_pullback --------------------------------------------------

    #[test]
    fn trend_pullback_long() {
        let p = LayerParams::default();
        assert_eq!(trend_pullback(100.5, 101.0, 100.0, 4.0, &p), (true, false));
    }

    #[test]
    fn trend_pullback_short() {
        let p = LayerParams::default();
        assert_eq!(trend_pullback(99.5, 99.0, 100.0, 4.0, &p), (false, true));
    }

    #[test]
    fn trend_dead_band_suppresses() {
        // Spread 0.2 < 0.15 * 4.0
        let p = LayerParams::default();
        assert_eq!(trend_pullback(100.1, 100.2, 100.0, 4.0, &p), (false, false));
    }

    #[test]
    fn pullback_must_touch_both_averages() {
        // 2.0 away from EMA13, beyond 0.3 * 4.0
        let p = LayerParams::default();
        assert_eq!(trend_pullback(103.0, 101.0, 100.0, 4.0, &p), (false, false));
    }

    #[test]
    fn trend_pullback_nan_is_false() {
        let p = LayerParams::default();
        assert_eq!(trend_pullback(100.5, 101.0, 100.0, f64::NAN, &p), (false, false));
        assert_eq!(trend_pullback(100.5, f64::NAN, 100.0, 4.0, &p), (false, false));
    }

    // ---- crosses ---------------------------------------------------------

    #[test]
    fn rsi_cross_directions() {
        assert!(crossed_up(30.0, 35.0, 38.0, 35.0));
        assert!(crossed_up(35.0, 35.0, 38.0, 35.0));
        assert!(!crossed_up(36.0, 35.0, 38.0, 35.0));
        assert!(crossed_down(70.0, 65.0, 62.0, 65.0));
        assert!(!crossed_down(60.0, 65.0, 62.0, 65.0));
    }

    // ---- detect_signal_layer ---------------------------------------------

    #[test]
    fn short_series_is_never_scored() {
        let mut sc = Scenario::neutral().with_long_trend_pullback();
        for v in [
            &mut sc.high,
            &mut sc.low,
            &mut sc.close,
            &mut sc.ema13,
            &mut sc.ema21,
            &mut sc.rsi,
            &mut sc.smoothed_rsi,
            &mut sc.atr,
        ] {
            v.truncate(49);
        }
        // The trend/pullback setup now sits on the wrong bar, so move it.
        sc.close[47] = 100.5;
        assert_eq!(sc.detect(), SignalResult::none());
    }

    #[test]
    fn neutral_market_has_no_layers() {
        let result = Scenario::neutral().detect();
        assert_eq!(result, SignalResult::none());
        assert!(result.long_signal.is_none());
        assert!(result.short_signal.is_none());
    }

    #[test]
    fn layer_one_long_trend_pullback_only() {
        let result = Scenario::neutral().with_long_trend_pullback().detect();
        assert_eq!(result.long_layer, 1);
        assert_eq!(result.long_signal, Some(SignalLabel::EmaLong));
        assert_eq!(result.short_layer, 0);
    }

    #[test]
    fn layer_one_short_trend_pullback_only() {
        let result = Scenario::neutral().with_short_trend_pullback().detect();
        assert_eq!(result.short_layer, 1);
        assert_eq!(result.short_signal, Some(SignalLabel::EmaShort));
        assert_eq!(result.long_layer, 0);
    }

    #[test]
    fn in_progress_bar_is_ignored() {
        let mut sc = Scenario::neutral();
        sc.ema13[N - 1] = 101.0;
        sc.close[N - 1] = 100.5;
        assert_eq!(sc.detect(), SignalResult::none());
    }

    #[test]
    fn layer_two_rsi_divergence_without_trend() {
        // Smoothed RSI 45 keeps Rule 3 off; RSI 38 < 40 with divergence.
        let result = Scenario::neutral()
            .with_bullish_divergence()
            .with_low_rsi_cross_up(45.0)
            .detect();
        assert_eq!(result.long_layer, 2);
        assert_eq!(result.long_signal, Some(SignalLabel::PotentialLong));
    }

    #[test]
    fn layer_three_smoothed_cross_without_trend() {
        let result = Scenario::neutral()
            .with_bullish_divergence()
            .with_low_rsi_cross_up(35.0)
            .detect();
        assert_eq!(result.long_layer, 3);
        assert_eq!(result.long_signal, Some(SignalLabel::WeakLong));
    }

    #[test]
    fn smoothed_rsi_rule_needs_a_fresh_cross_up() {
        let sc = Scenario::neutral()
            .with_bullish_divergence()
            .with_low_rsi_above_smoothed(35.0);
        assert!(sc.smoothed_rsi[CLOSED] < 40.0 && sc.rsi[CLOSED] < 40.0);
        assert!(sc.rsi[CLOSED - 1] > sc.smoothed_rsi[CLOSED - 1]);

        let result = sc.detect();
        assert_eq!(result.long_layer, 2);
        assert_eq!(result.long_signal, Some(SignalLabel::PotentialLong));
    }

    #[test]
    fn stale_cross_with_trend_stops_at_layer_four() {
        let result = Scenario::neutral()
            .with_long_trend_pullback()
            .with_bullish_divergence()
            .with_low_rsi_above_smoothed(35.0)
            .detect();
        assert_eq!(result.long_layer, 4);
        assert_eq!(result.long_signal, Some(SignalLabel::Long));
    }

    #[test]
    fn smoothed_rsi_rule_needs_a_fresh_cross_down() {
        let sc = Scenario::neutral()
            .with_bearish_divergence()
            .with_high_rsi_below_smoothed(65.0);
        assert!(sc.smoothed_rsi[CLOSED] > 60.0 && sc.rsi[CLOSED] > 60.0);
        assert!(sc.rsi[CLOSED - 1] < sc.smoothed_rsi[CLOSED - 1]);

        let result = sc.detect();
        assert_eq!(result.short_layer, 2);
        assert_eq!(result.short_signal, Some(SignalLabel::PotentialShort));
        assert_eq!(result.long_layer, 0);
    }

    #[test]
    fn layer_four_trend_and_rsi_divergence() {
        let result = Scenario::neutral()
            .with_long_trend_pullback()
            .with_bullish_divergence()
            .with_low_rsi_cross_up(45.0)
            .detect();
        assert_eq!(result.long_layer, 4);
        assert_eq!(result.long_signal, Some(SignalLabel::Long));
    }

    #[test]
    fn layer_five_everything_aligned() {
        let result = Scenario::neutral()
            .with_long_trend_pullback()
            .with_bullish_divergence()
            .with_low_rsi_cross_up(35.0)
            .detect();
        assert_eq!(result.long_layer, 5);
        assert_eq!(result.long_signal, Some(SignalLabel::StrongLong));
        assert_eq!(result.short_layer, 0);
    }

    #[test]
    fn momentum_rules_need_divergence() {
        let result = Scenario::neutral()
            .with_long_trend_pullback()
            .with_low_rsi_cross_up(35.0)
            .detect();
        assert_eq!(result.long_layer, 1);
    }

    #[test]
    fn layer_five_short_mirrors_long() {
        let result = Scenario::neutral()
            .with_short_trend_pullback()
            .with_bearish_divergence()
            .with_high_rsi_cross_down(65.0)
            .detect();
        assert_eq!(result.short_layer, 5);
        assert_eq!(result.short_signal, Some(SignalLabel::StrongShort));
        assert_eq!(result.long_layer, 0);
    }

    #[test]
    fn long_and_short_can_coexist() {
        // Bearish momentum layer while the trend test scores long.
        let result = Scenario::neutral()
            .with_long_trend_pullback()
            .with_bearish_divergence()
            .with_high_rsi_cross_down(65.0)
            .detect();
        assert_eq!(result.long_layer, 1);
        assert_eq!(result.short_layer, 3);
    }

    #[test]
    fn computed_indicators_on_real_series() {
        let close: Vec<f64> = (0..120)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1)
            .collect();
        let series = OhlcSeries {
            high: close.iter().map(|p| p * 1.02).collect(),
            low: close.iter().map(|p| p * 0.98).collect(),
            close,
        };
        let indicators = LayerIndicators::compute(&series);
        assert_eq!(indicators.ema13.len(), 120);
        assert_eq!(indicators.atr.len(), 120);

        let result = detect_signal_layer(&indicators.inputs(&series), &LayerParams::default());
        assert!(result.long_layer <= 5 && result.short_layer <= 5);
        assert_eq!(result.long_signal, SignalLabel::for_long(result.long_layer));
    }

    #[test]
    fn signal_label_serialises_screaming() {
        let json = serde_json::to_string(&SignalResult::from_layers(5, 0)).unwrap();
        assert!(json.contains("\"STRONG_LONG\""));
        assert!(json.contains("\"short_signal\":null"));
    }

    #[test]
    fn layer_params_defaults_from_empty_json() {
        let p: LayerParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, LayerParams::default());
        assert_eq!(p.min_bars, 50);
    }

    proptest! {
        #[test]
        fn layers_always_within_bounds(
            steps in prop::collection::vec(-3.0f64..3.0, 0..160)
        ) {
            let mut price = 100.0;
            let close: Vec<f64> = steps
                .iter()
                .map(|s| {
                    price = (price + s).max(1.0);
                    price
                })
                .collect();
            let series = OhlcSeries {
                high: close.iter().map(|p| p * 1.01).collect(),
                low: close.iter().map(|p| p * 0.99).collect(),
                close,
            };
            let indicators = LayerIndicators::compute(&series);
            let result = detect_signal_layer(&indicators.inputs(&series), &LayerParams::default());
            prop_assert!(result.long_layer <= 5);
            prop_assert!(result.short_layer <= 5);
            if series.len() < 50 {
                prop_assert_eq!(result, SignalResult::none());
            }
        }
    }
}
