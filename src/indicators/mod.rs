// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, allocation-only implementations of the indicators behind the signal
// layer classifier.  Every series function returns a vector of the same
// length as its input, with `f64::NAN` marking entries that have not warmed up.
// Nothing here performs I/O or holds state between calls.

pub mod atr;
pub mod cross_retest;
pub mod divergence;
pub mod ema;
pub mod pivot;
pub mod rsi;

pub use atr::calculate_atr;
pub use cross_retest::{check_ema_cross_retest, CrossRetest};
pub use divergence::{check_divergence, DivergenceFlags, DivergenceKind, DivergenceParams};
pub use ema::{calculate_ema, calculate_rma};
pub use pivot::{find_peaks_troughs, is_pivot_high, is_pivot_low, PivotPoint};
pub use rsi::{calculate_rsi, calculate_smoothed_rsi, rsi_category, RsiCategory};
