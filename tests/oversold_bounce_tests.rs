use dip_sniper::indicator::{IndicatorReading, IndicatorSnapshot, MIN_BARS};
use dip_sniper::model::signal::SignalTier;
use dip_sniper::strategy::oversold_bounce::{
    OversoldBounceClassifier, SignalFacts, SignalInputs, SignalPolicy,
};

fn snapshot(rsi: f64, prev_rsi: f64, k: f64, d: f64, pk: f64, pd: f64) -> IndicatorReading {
    IndicatorReading::Ready(IndicatorSnapshot {
        rsi,
        prev_rsi,
        stoch_k: k,
        stoch_d: d,
        prev_stoch_k: pk,
        prev_stoch_d: pd,
        bars: 120,
    })
}

fn inputs(indicators: IndicatorReading, price: f64, support: Option<f64>) -> SignalInputs {
    SignalInputs {
        indicators,
        current_price: price,
        support_price: support,
    }
}

fn classifier() -> OversoldBounceClassifier {
    OversoldBounceClassifier::new(SignalPolicy::default())
}

#[test]
fn oversold_bottom_on_support_is_strong_buy() {
    let out = classifier().classify(&inputs(
        snapshot(30.0, 31.0, 15.0, 18.0, 10.0, 20.0),
        100.0,
        Some(98.0),
    ));
    assert_eq!(out.tier, SignalTier::StrongBuy);
    assert_eq!(
        out.facts,
        SignalFacts {
            oversold: true,
            stoch_bottom: true,
            golden_cross: false,
            near_support: true,
            data_unavailable: false,
        }
    );
}

#[test]
fn nothing_oversold_is_neutral() {
    let out = classifier().classify(&inputs(
        snapshot(48.0, 47.0, 50.0, 45.0, 52.0, 44.0),
        100.0,
        None,
    ));
    assert_eq!(out.tier, SignalTier::Neutral);
    assert_eq!(out.facts, SignalFacts::default());
}

#[test]
fn strong_buy_wins_over_watch() {
    // RSI under the watch ceiling and near support also satisfy WATCH.
    let out = classifier().classify(&inputs(
        snapshot(25.0, 28.0, 30.0, 25.0, 20.0, 22.0),
        50.0,
        Some(49.5),
    ));
    assert!(out.facts.golden_cross);
    assert_eq!(out.tier, SignalTier::StrongBuy);
}

#[test]
fn confirmation_without_support_is_watch_high() {
    let out = classifier().classify(&inputs(
        snapshot(30.0, 31.0, 15.0, 18.0, 10.0, 20.0),
        100.0,
        Some(80.0),
    ));
    assert_eq!(out.tier, SignalTier::WatchHigh);
    assert!(!out.facts.near_support);

    let out = classifier().classify(&inputs(
        snapshot(30.0, 31.0, 15.0, 18.0, 10.0, 20.0),
        100.0,
        None,
    ));
    assert_eq!(out.tier, SignalTier::WatchHigh);
}

#[test]
fn soft_rsi_alone_is_watch() {
    // 38 is under the watch ceiling but falling, so not oversold.
    let out = classifier().classify(&inputs(
        snapshot(38.0, 39.0, 50.0, 50.0, 50.0, 50.0),
        100.0,
        None,
    ));
    assert!(!out.facts.oversold);
    assert_eq!(out.tier, SignalTier::Watch);
}

#[test]
fn support_alone_is_watch() {
    let out = classifier().classify(&inputs(
        snapshot(60.0, 58.0, 70.0, 65.0, 60.0, 62.0),
        100.0,
        Some(99.0),
    ));
    assert!(out.facts.near_support);
    assert_eq!(out.tier, SignalTier::Watch);
}

#[test]
fn rebound_counts_as_oversold_only_when_rising() {
    let c = classifier();
    let rising = c.classify(&inputs(snapshot(42.0, 40.0, 50.0, 50.0, 50.0, 50.0), 10.0, None));
    assert!(rising.facts.oversold);

    let falling = c.classify(&inputs(snapshot(42.0, 44.0, 50.0, 50.0, 50.0, 50.0), 10.0, None));
    assert!(!falling.facts.oversold);

    let above = c.classify(&inputs(snapshot(46.0, 40.0, 50.0, 50.0, 50.0, 50.0), 10.0, None));
    assert!(!above.facts.oversold);
}

#[test]
fn oversold_threshold_is_inclusive() {
    let out = classifier().classify(&inputs(snapshot(35.0, 36.0, 50.0, 50.0, 50.0, 50.0), 10.0, None));
    assert!(out.facts.oversold);
}

#[test]
fn golden_cross_rules() {
    let c = classifier();
    let cross = |k, d, pk, pd| {
        c.classify(&inputs(snapshot(50.0, 50.0, k, d, pk, pd), 10.0, None))
            .facts
            .golden_cross
    };
    assert!(cross(30.0, 25.0, 20.0, 22.0));
    // At-or-below on the previous bar still counts.
    assert!(cross(30.0, 25.0, 22.0, 22.0));
    // Already above on the previous bar.
    assert!(!cross(30.0, 25.0, 23.0, 22.0));
    // Not strictly above now.
    assert!(!cross(25.0, 25.0, 20.0, 22.0));
    // Cross above the ceiling.
    assert!(!cross(45.0, 41.0, 39.0, 42.0));
}

#[test]
fn stoch_bottom_needs_both_lines() {
    let c = classifier();
    let bottom = |k, d| {
        c.classify(&inputs(snapshot(50.0, 50.0, k, d, k, d), 10.0, None))
            .facts
            .stoch_bottom
    };
    assert!(bottom(20.0, 20.0));
    assert!(bottom(5.0, 12.0));
    assert!(!bottom(15.0, 21.0));
    assert!(!bottom(21.0, 15.0));
}

#[test]
fn near_support_tolerance() {
    let c = classifier();
    let near = |price, support| {
        c.classify(&inputs(snapshot(50.0, 50.0, 50.0, 50.0, 50.0, 50.0), price, support))
            .facts
            .near_support
    };
    assert!(near(102.9, Some(100.0)));
    assert!(near(90.0, Some(100.0)));
    assert!(!near(103.5, Some(100.0)));
    assert!(!near(100.0, None));
    assert!(!near(100.0, Some(f64::NAN)));
}

#[test]
fn insufficient_data_forces_neutral() {
    let out = classifier().classify(&inputs(
        IndicatorReading::InsufficientData {
            bars: 12,
            required: MIN_BARS,
        },
        100.0,
        Some(99.0),
    ));
    assert_eq!(out.tier, SignalTier::Neutral);
    assert!(out.facts.data_unavailable);
    assert!(!out.facts.near_support);
}

#[test]
fn non_finite_price_forces_neutral() {
    let out = classifier().classify(&inputs(
        snapshot(20.0, 25.0, 10.0, 10.0, 5.0, 12.0),
        f64::NAN,
        Some(99.0),
    ));
    assert_eq!(out.tier, SignalTier::Neutral);
    assert!(out.facts.data_unavailable);
}

#[test]
fn classification_is_idempotent() {
    let c = classifier();
    let frozen = inputs(snapshot(33.0, 31.0, 18.0, 16.0, 14.0, 17.0), 100.0, Some(97.5));
    let first = c.classify(&frozen);
    for _ in 0..10 {
        assert_eq!(c.classify(&frozen), first);
    }
}

#[test]
fn thresholds_come_from_policy() {
    let frozen = inputs(snapshot(38.0, 39.0, 25.0, 24.0, 25.0, 24.0), 100.0, Some(98.0));
    assert_eq!(classifier().classify(&frozen).tier, SignalTier::Watch);

    let loose = OversoldBounceClassifier::new(SignalPolicy {
        oversold_rsi: 40.0,
        stoch_bottom: 30.0,
        ..SignalPolicy::default()
    });
    assert_eq!(loose.classify(&frozen).tier, SignalTier::StrongBuy);
    assert_eq!(loose.policy().stoch_bottom, 30.0);
}
