//! Seam to the external source of daily bars.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::bar::PriceBar;

/// Source of daily bars for a symbol.
///
/// Implementations return bars in ascending timestamp order. An empty vector
/// means the symbol has no data; the scanner skips it.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, ProviderError>;
}
