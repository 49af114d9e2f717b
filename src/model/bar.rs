/// One daily session for an instrument, as delivered by a market data provider.
///
/// `open` is optional because some feeds omit it for index symbols; `close` and
/// `volume` are the only fields the engine relies on.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp_ms: u64,
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// Bar with only a close and volume; high/low collapse onto the close.
    pub fn from_close(timestamp_ms: u64, close: f64, volume: f64) -> Self {
        Self {
            timestamp_ms,
            open: None,
            high: close,
            low: close,
            close,
            volume,
        }
    }

    pub fn has_close(&self) -> bool {
        self.close.is_finite()
    }
}

/// Closing prices in chronological order with gaps (NaN/inf) dropped.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter()
        .filter(|b| b.has_close())
        .map(|b| b.close)
        .collect()
}

/// Latest finite close, if any.
pub fn last_close(bars: &[PriceBar]) -> Option<f64> {
    bars.iter().rev().find(|b| b.has_close()).map(|b| b.close)
}
