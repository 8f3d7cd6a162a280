// =============================================================================
// Signals Module
// =============================================================================
//
// The 0–5 signal layer classifier that turns indicator series into long and
// short conviction scores.

pub mod layer;

pub use layer::{
    detect_signal_layer, LayerIndicators, LayerInputs, LayerParams, RuleHits, SignalLabel,
    SignalResult,
};
