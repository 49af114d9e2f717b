use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;

use crate::error::{compact_body, ProviderError};
use crate::market_data::MarketDataProvider;
use crate::model::bar::PriceBar;

const PROVIDER: &str = "alpaca";
const PAGE_LIMIT: usize = 10_000;
const MAX_PAGES: usize = 20;

pub struct AlpacaRestClient {
    http: reqwest::Client,
    data_base_url: String,
    feed: String,
}

#[derive(Debug, Deserialize)]
pub struct AlpacaBarsResponse {
    #[serde(default)]
    pub bars: Option<HashMap<String, Vec<AlpacaBar>>>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AlpacaBar {
    pub t: String,
    #[serde(default)]
    pub o: Option<f64>,
    #[serde(default)]
    pub h: Option<f64>,
    #[serde(default)]
    pub l: Option<f64>,
    pub c: f64,
    #[serde(default)]
    pub v: f64,
}

impl AlpacaRestClient {
    pub fn new(
        data_base_url: &str,
        api_key: &str,
        api_secret: &str,
        feed: &str,
        timeout: std::time::Duration,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", HeaderValue::from_str(api_key)?);
        headers.insert("APCA-API-SECRET-KEY", HeaderValue::from_str(api_secret)?);
        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .context("failed to build Alpaca HTTP client")?;
        Ok(Self {
            http,
            data_base_url: data_base_url.trim_end_matches('/').to_string(),
            feed: feed.to_string(),
        })
    }

    async fn fetch_page(
        &self,
        symbol: &str,
        start: &str,
        page_token: Option<&str>,
    ) -> Result<AlpacaBarsResponse, ProviderError> {
        let endpoint = format!("{}/v2/stocks/bars", self.data_base_url);
        let limit_s = PAGE_LIMIT.to_string();
        let mut request = self.http.get(&endpoint).query(&[
            ("symbols", symbol),
            ("timeframe", "1Day"),
            ("start", start),
            ("limit", limit_s.as_str()),
            ("adjustment", "raw"),
            ("feed", self.feed.as_str()),
            ("sort", "asc"),
        ]);
        if let Some(token) = page_token {
            request = request.query(&[("page_token", token)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                provider: PROVIDER,
                status: status.as_u16(),
                body: compact_body(&body),
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl MarketDataProvider for AlpacaRestClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn fetch_daily_bars(
        &self,
        symbol: &str,
        lookback_days: u32,
    ) -> Result<Vec<PriceBar>, ProviderError> {
        let request_symbol = symbol.trim().to_ascii_uppercase();
        let start = (Utc::now() - Duration::days(i64::from(lookback_days)))
            .to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut bars = Vec::new();
        let mut page_token: Option<String> = None;
        for _ in 0..MAX_PAGES {
            let page = self
                .fetch_page(&request_symbol, &start, page_token.as_deref())
                .await?;
            let rows = page
                .bars
                .and_then(|mut by_symbol| by_symbol.remove(&request_symbol))
                .unwrap_or_default();
            for row in rows {
                bars.push(bar_from_alpaca(&row)?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        bars.sort_by_key(|b| b.timestamp_ms);
        Ok(bars)
    }
}

pub fn bar_from_alpaca(row: &AlpacaBar) -> Result<PriceBar, ProviderError> {
    Ok(PriceBar {
        timestamp_ms: parse_rfc3339_ms(&row.t)?,
        open: row.o,
        high: row.h.unwrap_or(row.c),
        low: row.l.unwrap_or(row.c),
        close: row.c,
        volume: row.v,
    })
}

fn parse_rfc3339_ms(s: &str) -> Result<u64, ProviderError> {
    let dt = DateTime::parse_from_rfc3339(s)
        .map_err(|e| ProviderError::Malformed(format!("invalid timestamp '{}': {}", s, e)))?;
    Ok(dt.timestamp_millis().max(0) as u64)
}
