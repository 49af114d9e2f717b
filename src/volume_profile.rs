//! Volume-by-price histogram over recent closes.
//!
//! The observed close range is cut into equal-width bins, each bar's volume is
//! credited to the bin holding its close, and bins are visited from heaviest
//! to lightest to find the nearest support below and resistance above the
//! current price.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::model::bar::PriceBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VolumeProfileParams {
    /// Trailing bars considered.
    pub lookback: usize,
    /// Equal-width price bins; values below 2 are treated as 2.
    pub bins: usize,
}

impl Default for VolumeProfileParams {
    fn default() -> Self {
        Self {
            lookback: 60,
            bins: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeBin {
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

impl VolumeBin {
    pub fn mid(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VolumeProfile {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    /// Midpoint of the heaviest bin regardless of side.
    pub point_of_control: Option<f64>,
    pub bins: Vec<VolumeBin>,
}

impl VolumeProfile {
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}

/// Profile of the trailing window, measured against the window's last close.
pub fn analyze(bars: &[PriceBar], params: VolumeProfileParams) -> VolumeProfile {
    let points = window(bars, params.lookback);
    match points.last() {
        Some(&(price, _)) => build(&points, params.bins, price),
        None => VolumeProfile::default(),
    }
}

/// Profile of the trailing window, measured against an explicit price.
pub fn analyze_at(bars: &[PriceBar], params: VolumeProfileParams, current_price: f64) -> VolumeProfile {
    let points = window(bars, params.lookback);
    build(&points, params.bins, current_price)
}

fn window(bars: &[PriceBar], lookback: usize) -> Vec<(f64, f64)> {
    let usable: Vec<(f64, f64)> = bars
        .iter()
        .filter(|b| b.close.is_finite() && b.volume.is_finite() && b.volume >= 0.0)
        .map(|b| (b.close, b.volume))
        .collect();
    let start = usable.len().saturating_sub(lookback);
    usable[start..].to_vec()
}

fn build(points: &[(f64, f64)], bins: usize, current_price: f64) -> VolumeProfile {
    if points.is_empty() {
        return VolumeProfile::default();
    }
    let low = points.iter().fold(f64::MAX, |acc, (c, _)| acc.min(*c));
    let high = points.iter().fold(f64::MIN, |acc, (c, _)| acc.max(*c));
    if high <= low {
        return VolumeProfile::default();
    }

    let bins = bins.max(2);
    let width = (high - low) / bins as f64;
    let mut histogram: Vec<VolumeBin> = (0..bins)
        .map(|i| VolumeBin {
            low: low + i as f64 * width,
            high: if i + 1 == bins {
                high
            } else {
                low + (i + 1) as f64 * width
            },
            volume: 0.0,
        })
        .collect();

    for &(close, volume) in points {
        // Right edge of the last bin is inclusive.
        let idx = (((close - low) / width).floor() as usize).min(bins - 1);
        histogram[idx].volume += volume;
    }

    let mut ranked: Vec<usize> = (0..bins).filter(|&i| histogram[i].volume > 0.0).collect();
    ranked.sort_by(|&a, &b| {
        histogram[b]
            .volume
            .partial_cmp(&histogram[a].volume)
            .unwrap_or(Ordering::Equal)
    });

    let mut support = None;
    let mut resistance = None;
    if current_price.is_finite() {
        for &i in &ranked {
            let mid = histogram[i].mid();
            if support.is_none() && mid < current_price {
                support = Some(mid);
            } else if resistance.is_none() && mid > current_price {
                resistance = Some(mid);
            }
            if support.is_some() && resistance.is_some() {
                break;
            }
        }
    }

    VolumeProfile {
        support,
        resistance,
        point_of_control: ranked.first().map(|&i| histogram[i].mid()),
        bins: histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_keeps_trailing_bars_only() {
        let bars: Vec<PriceBar> = (0..10)
            .map(|i| PriceBar::from_close(i, i as f64, 1.0))
            .collect();
        let points = window(&bars, 3);
        assert_eq!(points, vec![(7.0, 1.0), (8.0, 1.0), (9.0, 1.0)]);
    }

    #[test]
    fn window_skips_bad_volume() {
        let bars = vec![
            PriceBar::from_close(0, 1.0, -5.0),
            PriceBar::from_close(1, 2.0, f64::NAN),
            PriceBar::from_close(2, 3.0, 4.0),
        ];
        assert_eq!(window(&bars, 60), vec![(3.0, 4.0)]);
    }

    #[test]
    fn max_close_lands_in_last_bin() {
        let points = [(0.0, 1.0), (10.0, 7.0)];
        let profile = build(&points, 5, 5.0);
        assert_eq!(profile.bins[4].volume, 7.0);
        assert_eq!(profile.bins[0].volume, 1.0);
    }
}
