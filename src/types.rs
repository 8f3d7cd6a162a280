// =============================================================================
// Shared types used across the Layerscan backend
// =============================================================================

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Candle interval a heatmap is computed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    pub const ALL: [Timeframe; 6] = [
        Self::M15,
        Self::H1,
        Self::H4,
        Self::H12,
        Self::D1,
        Self::W1,
    ];

    /// Interval string understood by the klines endpoint.
    pub fn as_interval(&self) -> &'static str {
        match self {
            Self::M15 => "15m",
            Self::H1 => "1h",
            Self::H4 => "4h",
            Self::H12 => "12h",
            Self::D1 => "1d",
            Self::W1 => "1w",
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::H4
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_interval())
    }
}

impl FromStr for Timeframe {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tf| tf.as_interval() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown timeframe '{s}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_label() {
        for label in ["15m", "1h", "4h", "12h", "1d", "1w"] {
            let tf: Timeframe = label.parse().unwrap();
            assert_eq!(tf.to_string(), label);
        }
    }

    #[test]
    fn rejects_unknown_label() {
        assert!("2h".parse::<Timeframe>().is_err());
        assert!("4H".parse::<Timeframe>().is_err());
        assert!("".parse::<Timeframe>().is_err());
    }

    #[test]
    fn default_is_four_hours() {
        assert_eq!(Timeframe::default(), Timeframe::H4);
    }

    #[test]
    fn serde_uses_interval_labels() {
        assert_eq!(serde_json::to_string(&Timeframe::H12).unwrap(), "\"12h\"");
        let tf: Timeframe = serde_json::from_str("\"1w\"").unwrap();
        assert_eq!(tf, Timeframe::W1);
    }
}
