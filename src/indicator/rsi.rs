//! Relative Strength Index, classic variant.
//!
//! Average gain and average loss are plain arithmetic means over the trailing
//! window of price changes. There is no Wilder smoothing: each bar's value is a
//! function of its own window only.

pub const RSI_PERIOD: usize = 14;

/// RSI from the window averages. A window without losses reads 100.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
}

/// RSI aligned 1:1 with `closes`.
///
/// Bar `i` uses the `period` price changes ending at `i`, so the first
/// `period` entries are `None`. Non-finite results are reported as `None`.
pub fn rsi_series(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let n = closes.len();
    let mut out = vec![None; n];
    if period == 0 || n <= period {
        return out;
    }

    let mut gains = vec![0.0; n];
    let mut losses = vec![0.0; n];
    for i in 1..n {
        let delta = closes[i] - closes[i - 1];
        gains[i] = delta.max(0.0);
        losses[i] = (-delta).max(0.0);
    }

    for i in period..n {
        let window = (i + 1 - period)..=i;
        let avg_gain = gains[window.clone()].iter().sum::<f64>() / period as f64;
        let avg_loss = losses[window].iter().sum::<f64>() / period as f64;
        let rsi = rsi_from_averages(avg_gain, avg_loss);
        out[i] = rsi.is_finite().then_some(rsi);
    }
    out
}
