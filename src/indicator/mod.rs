//! Momentum oscillators computed from a closing-price series.
//!
//! Everything here is recomputed from scratch on each call; nothing is
//! carried between evaluations.

pub mod rsi;
pub mod sma;
pub mod stochastic;

use rsi::{rsi_series, RSI_PERIOD};
use stochastic::{stochastic_slow_series, StochasticParams};

/// Fewest closes for which a snapshot is produced.
pub const MIN_BARS: usize = 20;

/// Latest and previous oscillator values for one instrument.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub prev_rsi: f64,
    pub stoch_k: f64,
    pub stoch_d: f64,
    pub prev_stoch_k: f64,
    pub prev_stoch_d: f64,
    /// Number of closes the snapshot was computed from.
    pub bars: usize,
}

impl IndicatorSnapshot {
    pub fn rsi_rising(&self) -> bool {
        self.rsi > self.prev_rsi
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorReading {
    Ready(IndicatorSnapshot),
    InsufficientData { bars: usize, required: usize },
}

impl IndicatorReading {
    pub fn snapshot(&self) -> Option<&IndicatorSnapshot> {
        match self {
            Self::Ready(s) => Some(s),
            Self::InsufficientData { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// RSI(14) and Stochastic Slow(14,3,3) for the last two bars of `closes`.
///
/// Non-finite closes are dropped first. Fewer than [`MIN_BARS`] remaining
/// closes, or any undefined value in the last two bars, yields
/// [`IndicatorReading::InsufficientData`].
pub fn compute_snapshot(closes: &[f64]) -> IndicatorReading {
    let clean: Vec<f64> = closes.iter().copied().filter(|c| c.is_finite()).collect();
    let n = clean.len();
    let insufficient = IndicatorReading::InsufficientData {
        bars: n,
        required: MIN_BARS,
    };
    if n < MIN_BARS {
        return insufficient;
    }

    let rsi = rsi_series(&clean, RSI_PERIOD);
    let stoch = stochastic_slow_series(&clean, StochasticParams::default());
    let (last, prev) = (n - 1, n - 2);

    let values = (
        rsi[last],
        rsi[prev],
        stoch.slow_k[last],
        stoch.slow_d[last],
        stoch.slow_k[prev],
        stoch.slow_d[prev],
    );
    match values {
        (Some(rsi), Some(prev_rsi), Some(k), Some(d), Some(pk), Some(pd)) => {
            IndicatorReading::Ready(IndicatorSnapshot {
                rsi,
                prev_rsi,
                stoch_k: k,
                stoch_d: d,
                prev_stoch_k: pk,
                prev_stoch_d: pd,
                bars: n,
            })
        }
        _ => insufficient,
    }
}
