//! Per-instrument evaluation and the watch-list batch.
//!
//! Each instrument is fetched and evaluated on its own; a provider error,
//! an empty response or a timeout becomes a [`SkipReason`] for that
//! instrument and never affects the others.

use std::fmt;

use chrono::{DateTime, Utc};
use futures_util::stream::{self, StreamExt};
use tokio::time::Instant;

use crate::config::{InstrumentRole, ScanConfig, WatchEntry};
use crate::indicator::{compute_snapshot, IndicatorReading};
use crate::market_data::MarketDataProvider;
use crate::model::bar::{closes, last_close, PriceBar};
use crate::model::signal::SignalTier;
use crate::strategy::oversold_bounce::{
    Classification, OversoldBounceClassifier, SignalInputs, SignalPolicy,
};
use crate::volume_profile::{analyze_at, VolumeProfile, VolumeProfileParams};

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentEvaluation {
    pub current_price: f64,
    pub indicators: IndicatorReading,
    pub profile: VolumeProfile,
    pub classification: Classification,
    /// Bars with a usable close.
    pub bars: usize,
}

impl InstrumentEvaluation {
    pub fn tier(&self) -> SignalTier {
        self.classification.tier
    }
}

/// Indicators, volume profile and classifier bundled for one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    classifier: OversoldBounceClassifier,
    profile: VolumeProfileParams,
}

impl Evaluator {
    pub fn new(policy: SignalPolicy, profile: VolumeProfileParams) -> Self {
        Self {
            classifier: OversoldBounceClassifier::new(policy),
            profile,
        }
    }

    /// Evaluate the latest bar. `None` when no bar has a finite close.
    pub fn evaluate(&self, bars: &[PriceBar]) -> Option<InstrumentEvaluation> {
        let closes = closes(bars);
        let current_price = *closes.last()?;

        let indicators = compute_snapshot(&closes);
        let profile = analyze_at(bars, self.profile, current_price);
        let classification = self.classifier.classify(&SignalInputs {
            indicators,
            current_price,
            support_price: profile.support,
        });

        Some(InstrumentEvaluation {
            current_price,
            indicators,
            profile,
            classification,
            bars: closes.len(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NoData,
    ProviderFailure(String),
    TimedOut { after_ms: u64 },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoData => f.write_str("no data"),
            Self::ProviderFailure(msg) => write!(f, "provider failure: {}", msg),
            Self::TimedOut { after_ms } => write!(f, "timed out after {}ms", after_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentOutcome {
    Evaluated(InstrumentEvaluation),
    Gauge { price: f64 },
    Skipped(SkipReason),
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstrumentReport {
    pub entry: WatchEntry,
    pub outcome: InstrumentOutcome,
}

#[derive(Debug, Clone)]
pub struct ScanReport {
    pub generated_at: DateTime<Utc>,
    /// In watch-list order.
    pub instruments: Vec<InstrumentReport>,
}

impl ScanReport {
    pub fn skipped_count(&self) -> usize {
        self.instruments
            .iter()
            .filter(|r| matches!(r.outcome, InstrumentOutcome::Skipped(_)))
            .count()
    }

    pub fn evaluated(&self) -> impl Iterator<Item = (&WatchEntry, &InstrumentEvaluation)> {
        self.instruments.iter().filter_map(|r| match &r.outcome {
            InstrumentOutcome::Evaluated(eval) => Some((&r.entry, eval)),
            _ => None,
        })
    }

    /// Evaluations in an actionable tier (STRONG_BUY or WATCH_HIGH).
    pub fn hits(&self) -> impl Iterator<Item = (&WatchEntry, &InstrumentEvaluation)> {
        self.evaluated().filter(|(_, e)| e.tier().is_actionable())
    }

    /// First gauge instrument with a reading.
    pub fn gauge(&self) -> Option<(&WatchEntry, f64)> {
        self.instruments.iter().find_map(|r| match r.outcome {
            InstrumentOutcome::Gauge { price } => Some((&r.entry, price)),
            _ => None,
        })
    }
}

/// Fetch and evaluate every watch-list entry with at most
/// `scan.max_concurrency` fetches in flight.
pub async fn scan_watchlist(
    provider: &dyn MarketDataProvider,
    watchlist: &[WatchEntry],
    scan: &ScanConfig,
    evaluator: &Evaluator,
) -> ScanReport {
    let generated_at = Utc::now();
    let deadline = scan.batch_timeout().map(|budget| Instant::now() + budget);
    tracing::info!(
        provider = provider.name(),
        instruments = watchlist.len(),
        "Starting watch-list scan"
    );

    let mut indexed: Vec<(usize, InstrumentReport)> = stream::iter(watchlist.iter().enumerate())
        .map(|(i, entry)| async move {
            let outcome = scan_one(provider, entry, scan, evaluator, deadline).await;
            (
                i,
                InstrumentReport {
                    entry: entry.clone(),
                    outcome,
                },
            )
        })
        .buffer_unordered(scan.max_concurrency.max(1))
        .collect()
        .await;
    indexed.sort_by_key(|(i, _)| *i);

    let report = ScanReport {
        generated_at,
        instruments: indexed.into_iter().map(|(_, r)| r).collect(),
    };
    tracing::info!(
        evaluated = report.evaluated().count(),
        hits = report.hits().count(),
        skipped = report.skipped_count(),
        "Watch-list scan finished"
    );
    report
}

async fn scan_one(
    provider: &dyn MarketDataProvider,
    entry: &WatchEntry,
    scan: &ScanConfig,
    evaluator: &Evaluator,
    deadline: Option<Instant>,
) -> InstrumentOutcome {
    let symbol = entry.symbol.trim();
    let bars = match fetch_bars(provider, symbol, scan, deadline).await {
        Ok(bars) => bars,
        Err(reason) => {
            tracing::warn!(symbol = %symbol, reason = %reason, "Skipping instrument");
            return InstrumentOutcome::Skipped(reason);
        }
    };

    match entry.role {
        InstrumentRole::Gauge => match last_close(&bars) {
            Some(price) => InstrumentOutcome::Gauge { price },
            None => InstrumentOutcome::Skipped(SkipReason::NoData),
        },
        InstrumentRole::Signal => match evaluator.evaluate(&bars) {
            Some(eval) => {
                tracing::info!(
                    symbol = %symbol,
                    tier = %eval.tier(),
                    price = eval.current_price,
                    bars = eval.bars,
                    data_unavailable = eval.classification.facts.data_unavailable,
                    "Instrument classified"
                );
                InstrumentOutcome::Evaluated(eval)
            }
            None => InstrumentOutcome::Skipped(SkipReason::NoData),
        },
    }
}

async fn fetch_bars(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    scan: &ScanConfig,
    deadline: Option<Instant>,
) -> Result<Vec<PriceBar>, SkipReason> {
    let now = Instant::now();
    let mut until = now + scan.fetch_timeout();
    if let Some(d) = deadline {
        until = until.min(d);
    }
    let budget_ms = until.saturating_duration_since(now).as_millis() as u64;

    match tokio::time::timeout_at(until, provider.fetch_daily_bars(symbol, scan.lookback_days))
        .await
    {
        Err(_) => Err(SkipReason::TimedOut {
            after_ms: budget_ms,
        }),
        Ok(Err(e)) => Err(SkipReason::ProviderFailure(e.to_string())),
        Ok(Ok(bars)) if bars.is_empty() => Err(SkipReason::NoData),
        Ok(Ok(bars)) => Ok(bars),
    }
}
