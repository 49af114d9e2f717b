use super::sma::sma_series;

/// Stochastic Slow parameters: `%K` lookback, then two SMA smoothings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StochasticParams {
    pub k_period: usize,
    pub k_smoothing: usize,
    pub d_smoothing: usize,
}

impl Default for StochasticParams {
    fn default() -> Self {
        Self {
            k_period: 14,
            k_smoothing: 3,
            d_smoothing: 3,
        }
    }
}

impl StochasticParams {
    /// Bars needed before the first `%D` value is defined.
    pub fn warmup(&self) -> usize {
        self.k_period + self.k_smoothing + self.d_smoothing - 2
    }
}

/// Fast `%K` over closes. A flat window (max == min) reads 50.
pub fn fast_k_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n < period {
        return out;
    }

    for i in (period - 1)..n {
        let window = &closes[i + 1 - period..=i];
        let low = window.iter().fold(f64::MAX, |acc, p| acc.min(*p));
        let high = window.iter().fold(f64::MIN, |acc, p| acc.max(*p));
        let k = if high == low {
            50.0
        } else if closes[i] >= high {
            100.0
        } else if closes[i] <= low {
            0.0
        } else {
            (100.0 * (closes[i] - low) / (high - low)).clamp(0.0, 100.0)
        };
        out[i] = k.is_finite().then_some(k);
    }
    out
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StochasticSeries {
    pub fast_k: Vec<Option<f64>>,
    pub slow_k: Vec<Option<f64>>,
    pub slow_d: Vec<Option<f64>>,
}

/// Stochastic Slow: `slow_k` = SMA(fast_k), `slow_d` = SMA(slow_k), both
/// clamped to 0..=100.
pub fn stochastic_slow_series(closes: &[f64], params: StochasticParams) -> StochasticSeries {
    let fast_k = fast_k_series(closes, params.k_period);
    let slow_k = clamp_series(sma_series(&fast_k, params.k_smoothing));
    let slow_d = clamp_series(sma_series(&slow_k, params.d_smoothing));
    StochasticSeries {
        fast_k,
        slow_k,
        slow_d,
    }
}

fn clamp_series(values: Vec<Option<f64>>) -> Vec<Option<f64>> {
    values
        .into_iter()
        .map(|v| v.map(|x| x.clamp(0.0, 100.0)))
        .collect()
}
