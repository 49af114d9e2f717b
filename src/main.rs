use anyhow::{Context, Result};

use dip_sniper::alpaca::AlpacaRestClient;
use dip_sniper::config::{Config, ProviderKind};
use dip_sniper::digest;
use dip_sniper::market_data::MarketDataProvider;
use dip_sniper::notify::{NotificationChannel, StdoutChannel, TelegramChannel};
use dip_sniper::scanner::{scan_watchlist, Evaluator};
use dip_sniper::yahoo::YahooChartClient;

fn build_provider(config: &Config) -> Result<Box<dyn MarketDataProvider>> {
    let timeout = config.scan.fetch_timeout();
    let provider: Box<dyn MarketDataProvider> = match config.provider.kind {
        ProviderKind::Yahoo => Box::new(YahooChartClient::new(
            &config.provider.yahoo_base_url,
            timeout,
        )?),
        ProviderKind::Alpaca => Box::new(AlpacaRestClient::new(
            &config.provider.alpaca_data_base_url,
            &config.provider.api_key,
            &config.provider.api_secret,
            &config.provider.alpaca_feed,
            timeout,
        )?),
    };
    Ok(provider)
}

fn build_channel(config: &Config) -> Result<Box<dyn NotificationChannel>> {
    if !config.notify.enabled {
        return Ok(Box::new(StdoutChannel));
    }
    let channel = TelegramChannel::new(
        &config.notify.telegram_api_base_url,
        &config.notify.bot_token,
        &config.notify.chat_id,
        config.notify.parse_mode.clone(),
        std::time::Duration::from_millis(config.notify.timeout_ms),
    )?;
    Ok(Box::new(channel))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Install rustls crypto provider (required by rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Make sure .env provides SNIPER_TOKEN and MY_PRIVATE_ID (or set notify.enabled = false)");
            std::process::exit(1);
        }
    };

    // Logs go to stderr so a disabled notifier can print the digest on stdout.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        config
            .logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.with_ansi(false).init();
    }

    tracing::info!(
        provider = ?config.provider.kind,
        instruments = config.watchlist.len(),
        notify = config.notify.enabled,
        "Starting dip-sniper"
    );

    let provider = build_provider(&config).context("failed to build market data provider")?;
    let channel = build_channel(&config).context("failed to build notification channel")?;
    let evaluator = Evaluator::new(config.signal, config.scan.volume_profile);

    let report = scan_watchlist(provider.as_ref(), &config.watchlist, &config.scan, &evaluator).await;
    let message = digest::render(&report, &config.digest);

    // Signals stay valid when delivery fails; report and exit normally.
    match channel.send(&message).await {
        Ok(()) => tracing::info!(channel = channel.name(), "Digest delivered"),
        Err(e) => tracing::error!(channel = channel.name(), error = %e, "Failed to deliver digest"),
    }

    if report.skipped_count() > 0 {
        tracing::warn!(skipped = report.skipped_count(), "Some instruments were skipped");
    }
    Ok(())
}
