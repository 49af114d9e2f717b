use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::strategy::oversold_bounce::SignalPolicy;
use crate::volume_profile::VolumeProfileParams;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "DIP_SNIPER_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub watchlist: Vec<WatchEntry>,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub signal: SignalPolicy,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub digest: DigestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yahoo,
    Alpaca,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    #[serde(default = "default_alpaca_data_base_url")]
    pub alpaca_data_base_url: String,
    #[serde(default = "default_alpaca_feed")]
    pub alpaca_feed: String,
    #[serde(skip)]
    pub api_key: String,
    #[serde(skip)]
    pub api_secret: String,
}

fn default_yahoo_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_alpaca_data_base_url() -> String {
    "https://data.alpaca.markets".to_string()
}

fn default_alpaca_feed() -> String {
    "iex".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstrumentRole {
    /// Classified by the oversold-bounce rules.
    #[default]
    Signal,
    /// Only its latest close is reported, e.g. a volatility index.
    Gauge,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WatchEntry {
    pub symbol: String,
    /// Display name; falls back to the symbol.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: InstrumentRole,
    /// Price unit appended in the digest, e.g. "$" or "원".
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default = "default_decimals")]
    pub decimals: usize,
}

fn default_unit() -> String {
    "$".to_string()
}

fn default_decimals() -> usize {
    2
}

impl WatchEntry {
    pub fn new(symbol: &str, name: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            role: InstrumentRole::Signal,
            unit: default_unit(),
            decimals: default_decimals(),
        }
    }

    pub fn gauge(symbol: &str, name: &str) -> Self {
        Self {
            role: InstrumentRole::Gauge,
            ..Self::new(symbol, name)
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.symbol
        } else {
            &self.name
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Calendar days of daily bars requested per instrument.
    pub lookback_days: u32,
    pub fetch_timeout_ms: u64,
    /// Optional budget for the whole batch; fetches still running past it are skipped.
    pub batch_timeout_ms: Option<u64>,
    pub max_concurrency: usize,
    pub volume_profile: VolumeProfileParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            lookback_days: 180,
            fetch_timeout_ms: 15_000,
            batch_timeout_ms: None,
            max_concurrency: 4,
            volume_profile: VolumeProfileParams::default(),
        }
    }
}

impl ScanConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// When false the digest is printed to stdout.
    pub enabled: bool,
    pub telegram_api_base_url: String,
    pub parse_mode: Option<String>,
    pub timeout_ms: u64,
    #[serde(skip)]
    pub bot_token: String,
    #[serde(skip)]
    pub chat_id: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            telegram_api_base_url: "https://api.telegram.org".to_string(),
            parse_mode: Some("Markdown".to_string()),
            timeout_ms: 10_000,
            bot_token: String::new(),
            chat_id: String::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub title: String,
    /// Offset from UTC used for the digest timestamp.
    pub utc_offset_hours: i32,
    pub timezone_label: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            title: "Oversold bounce scan".to_string(),
            utc_offset_hours: 9,
            timezone_label: "KST".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load `.env`, then the TOML file named by `DIP_SNIPER_CONFIG` (or the
    /// default path), then secrets from the environment.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let mut config = Self::from_file(&config_path)?;

        if config.provider.kind == ProviderKind::Alpaca {
            config.provider.api_key = std::env::var("ALPACA_API_KEY")
                .context("ALPACA_API_KEY not set in .env or environment")?;
            config.provider.api_secret = std::env::var("ALPACA_API_SECRET")
                .context("ALPACA_API_SECRET not set in .env or environment")?;
        }
        if config.notify.enabled {
            config.notify.bot_token = std::env::var("SNIPER_TOKEN")
                .context("SNIPER_TOKEN not set in .env or environment")?;
            config.notify.chat_id = std::env::var("MY_PRIVATE_ID")
                .context("MY_PRIVATE_ID not set in .env or environment")?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&config_str).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        let symbols = self.symbols();
        if symbols.is_empty() {
            bail!("watchlist is empty");
        }
        if symbols.len() != self.watchlist.len() {
            bail!("watchlist contains blank or duplicate symbols");
        }

        match self.provider.kind {
            ProviderKind::Yahoo => check_url("provider.yahoo_base_url", &self.provider.yahoo_base_url)?,
            ProviderKind::Alpaca => check_url(
                "provider.alpaca_data_base_url",
                &self.provider.alpaca_data_base_url,
            )?,
        }
        if self.notify.enabled {
            check_url("notify.telegram_api_base_url", &self.notify.telegram_api_base_url)?;
        }

        if self.scan.lookback_days == 0 {
            bail!("scan.lookback_days must be > 0");
        }
        if self.scan.fetch_timeout_ms == 0 {
            bail!("scan.fetch_timeout_ms must be > 0");
        }
        if self.scan.max_concurrency == 0 {
            bail!("scan.max_concurrency must be > 0");
        }
        if self.scan.volume_profile.bins < 2 {
            bail!(
                "scan.volume_profile.bins must be >= 2, got {}",
                self.scan.volume_profile.bins
            );
        }
        if self.scan.volume_profile.lookback == 0 {
            bail!("scan.volume_profile.lookback must be > 0");
        }
        if !(-12..=14).contains(&self.digest.utc_offset_hours) {
            bail!(
                "digest.utc_offset_hours out of range: {}",
                self.digest.utc_offset_hours
            );
        }
        self.signal.validate().context("invalid [signal] section")?;
        Ok(())
    }

    /// Normalized, de-duplicated symbols in watch-list order.
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for entry in &self.watchlist {
            let s = entry.symbol.trim().to_ascii_uppercase();
            if !s.is_empty() && !out.iter().any(|v| v == &s) {
                out.push(s);
            }
        }
        out
    }
}

fn check_url(field: &str, value: &str) -> Result<()> {
    let url = Url::parse(value).with_context(|| format!("{} is not a valid URL", field))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("{} must be http(s), got '{}'", field, url.scheme());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_url_rejects_other_schemes() {
        assert!(check_url("x", "https://example.com").is_ok());
        assert!(check_url("x", "ftp://example.com").is_err());
        assert!(check_url("x", "not a url").is_err());
    }

    #[test]
    fn display_name_falls_back_to_symbol() {
        let entry = WatchEntry::new("IONQ", "  ");
        assert_eq!(entry.display_name(), "IONQ");
        let entry = WatchEntry::new("IONQ", "IonQ");
        assert_eq!(entry.display_name(), "IonQ");
    }
}
