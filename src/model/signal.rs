use std::fmt;

use serde::Serialize;

/// Discrete outcome of the oversold-bounce classifier, strongest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalTier {
    /// Oversold, stochastic confirmation and price sitting on a volume support.
    StrongBuy,
    /// Oversold with stochastic confirmation but no support nearby.
    WatchHigh,
    /// Soft RSI or near support alone.
    Watch,
    Neutral,
}

impl SignalTier {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG_BUY",
            Self::WatchHigh => "WATCH_HIGH",
            Self::Watch => "WATCH",
            Self::Neutral => "NEUTRAL",
        }
    }

    pub fn is_actionable(self) -> bool {
        matches!(self, Self::StrongBuy | Self::WatchHigh)
    }
}

impl fmt::Display for SignalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
