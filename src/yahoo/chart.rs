use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

use crate::error::{compact_body, ProviderError};
use crate::market_data::MarketDataProvider;
use crate::model::bar::PriceBar;

use super::types::ChartResponse;

const PROVIDER: &str = "yahoo";

/// Daily bars from the public Yahoo Finance chart endpoint.
///
/// Handles exchange-suffixed and index symbols such as `005930.KS` or `^VIX`.
pub struct YahooChartClient {
    http: reqwest::Client,
    base_url: Url,
}

impl YahooChartClient {
    pub fn new(base_url: &str, timeout: std::time::Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        // The endpoint throttles requests without a browser-like agent.
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64) dip-sniper"),
        );
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build Yahoo HTTP client")?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid Yahoo base url '{}'", base_url))?;
        Ok(Self { http, base_url })
    }

    fn chart_url(&self, symbol: &str, lookback_days: u32) -> Result<Url, ProviderError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::Malformed("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);

        let end = Utc::now();
        let start = end - Duration::days(i64::from(lookback_days));
        url.query_pairs_mut()
            .append_pair("period1", &start.timestamp().to_string())
            .append_pair("period2", &end.timestamp().to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }
}

#[async_trait]
impl MarketDataProvider for YahooChartClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let url = self.chart_url(symbol, lookback_days)?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // Error payloads arrive with 4xx statuses but still carry a chart.error object.
        match serde_json::from_str::<ChartResponse>(&body) {
            Ok(parsed) => bars_from_chart(parsed, symbol),
            Err(_) if !status.is_success() => Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: compact_body(&body),
            }),
            Err(e) => Err(ProviderError::Json(e)),
        }
    }
}

/// Convert a chart payload into ascending bars, dropping sessions without a close.
///
/// A payload resolved for a different symbol than `symbol` is rejected.
pub fn bars_from_chart(resp: ChartResponse, symbol: &str) -> Result<Vec<PriceBar>, ProviderError> {
    if let Some(err) = resp.chart.error {
        return Err(ProviderError::Api {
            provider: PROVIDER,
            code: err.code,
            msg: err.description,
        });
    }
    let Some(result) = resp.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    if let Some(returned) = result.meta.as_ref().and_then(|m| m.symbol.as_deref()) {
        if !returned.eq_ignore_ascii_case(symbol) {
            return Err(ProviderError::Malformed(format!(
                "requested {} but chart is for {}",
                symbol, returned
            )));
        }
    }
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let Some(close) = cell(&quote.close, i) else {
            continue;
        };
        bars.push(PriceBar {
            timestamp_ms: ((*ts).max(0) as u64) * 1000,
            open: cell(&quote.open, i),
            high: cell(&quote.high, i).unwrap_or(close),
            low: cell(&quote.low, i).unwrap_or(close),
            close,
            volume: cell(&quote.volume, i).unwrap_or(0.0),
        });
    }
    bars.sort_by_key(|b| b.timestamp_ms);
    Ok(bars)
}

fn cell(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten().filter(|v| v.is_finite())
}
