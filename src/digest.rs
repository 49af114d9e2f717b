//! Chat-friendly Markdown rendering of a [`ScanReport`].

use std::fmt::Write as _;

use chrono::{FixedOffset, Offset, Utc};

use crate::config::{DigestConfig, WatchEntry};
use crate::indicator::IndicatorReading;
use crate::model::signal::SignalTier;
use crate::scanner::{InstrumentEvaluation, InstrumentOutcome, ScanReport};
use crate::strategy::oversold_bounce::SignalFacts;

const RULE: &str = "━━━━━━━━━━━━━━━";

pub fn render(report: &ScanReport, cfg: &DigestConfig) -> String {
    let offset = FixedOffset::east_opt(cfg.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
    let local = report.generated_at.with_timezone(&offset);

    let mut msg = String::new();
    let _ = writeln!(msg, "🎯 *{}*", escape_markdown(&cfg.title));
    let _ = writeln!(
        msg,
        "📅 {} ({})",
        local.format("%Y-%m-%d %H:%M"),
        cfg.timezone_label
    );
    let _ = writeln!(msg, "💡 *Rules: volume support + RSI rebound + stochastic confirmation*");
    let _ = writeln!(msg, "{}\n", RULE);

    for item in &report.instruments {
        match &item.outcome {
            InstrumentOutcome::Evaluated(eval) => render_instrument(&mut msg, &item.entry, eval),
            InstrumentOutcome::Skipped(reason) => {
                let _ = writeln!(
                    msg,
                    "⏭️ {}: skipped ({})\n",
                    escape_markdown(item.entry.display_name()),
                    escape_markdown(&reason.to_string())
                );
            }
            InstrumentOutcome::Gauge { .. } => {}
        }
    }

    let _ = writeln!(msg, "{}", RULE);
    if let Some((entry, price)) = report.gauge() {
        let _ = writeln!(
            msg,
            "🌡️ {}: {:.1}",
            escape_markdown(entry.display_name()),
            price
        );
    }

    let hits: Vec<_> = report.hits().collect();
    if hits.is_empty() {
        let _ = writeln!(msg, "📢 No signals today");
    } else {
        let _ = writeln!(msg, "📢 *Today's picks:*");
        for (entry, eval) in hits {
            let support = eval
                .profile
                .support
                .map(|s| format_price(s, entry))
                .unwrap_or_else(|| "n/a".to_string());
            let rsi = eval.indicators.snapshot().map(|s| s.rsi).unwrap_or_default();
            let _ = writeln!(
                msg,
                "{} *{}*\n   Price: {} (support: {})\n   Signals: RSI {:.1} / {}",
                tier_icon(eval.tier()),
                escape_markdown(entry.display_name()),
                format_price(eval.current_price, entry),
                support,
                rsi,
                explain(&eval.classification.facts)
            );
        }
    }

    let skipped = report.skipped_count();
    if skipped > 0 {
        let _ = writeln!(msg, "⚠️ Skipped instruments: {}", skipped);
    }
    msg.trim_end().to_string()
}

fn render_instrument(msg: &mut String, entry: &WatchEntry, eval: &InstrumentEvaluation) {
    let _ = writeln!(msg, "📍 *{}*", escape_markdown(entry.display_name()));
    let _ = writeln!(msg, "- Price: {}", format_price(eval.current_price, entry));
    match &eval.indicators {
        IndicatorReading::Ready(s) => {
            let _ = writeln!(
                msg,
                "- RSI: *{:.1}* | Stoch: *{:.1}/{:.1}*",
                s.rsi, s.stoch_k, s.stoch_d
            );
        }
        IndicatorReading::InsufficientData { bars, required } => {
            let _ = writeln!(msg, "- Data unavailable ({} bars, need {})", bars, required);
        }
    }
    let level = |v: Option<f64>| {
        v.map(|p| format_price(p, entry))
            .unwrap_or_else(|| "n/a".to_string())
    };
    let _ = writeln!(
        msg,
        "- Support: {} | Resistance: {}",
        level(eval.profile.support),
        level(eval.profile.resistance)
    );
    let _ = writeln!(msg, "- Status: {}\n", status_label(eval.tier()));
}

pub fn status_label(tier: SignalTier) -> &'static str {
    match tier {
        SignalTier::StrongBuy => "🔥 *[STRONG BUY]*",
        SignalTier::WatchHigh => "📈 *[BUY SETUP]*",
        SignalTier::Watch => "⚠️ *[WATCH]*",
        SignalTier::Neutral => "💤 Neutral",
    }
}

fn tier_icon(tier: SignalTier) -> &'static str {
    match tier {
        SignalTier::StrongBuy => "🔥",
        SignalTier::WatchHigh => "📈",
        SignalTier::Watch => "⚠️",
        SignalTier::Neutral => "💤",
    }
}

/// Short human-readable list of the predicates that held.
pub fn explain(facts: &SignalFacts) -> String {
    if facts.data_unavailable {
        return "data unavailable".to_string();
    }
    let mut parts = Vec::new();
    if facts.oversold {
        parts.push("RSI oversold");
    }
    if facts.stoch_bottom {
        parts.push("Stoch bottom");
    }
    if facts.golden_cross {
        parts.push("Stoch golden cross");
    }
    if facts.near_support {
        parts.push("near support");
    }
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" + ")
    }
}

/// Price with thousands separators, the entry's decimals and unit suffix.
pub fn format_price(value: f64, entry: &WatchEntry) -> String {
    let raw = format!("{:.*}", entry.decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}{}", sign, grouped, f, entry.unit),
        None => format!("{}{}{}", sign, grouped, entry.unit),
    }
}

/// Escape characters that open entities in Telegram's legacy Markdown.
pub fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
