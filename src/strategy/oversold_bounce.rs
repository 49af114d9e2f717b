use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::indicator::{IndicatorReading, IndicatorSnapshot};
use crate::model::signal::SignalTier;

/// Thresholds for the oversold-bounce rules. All oscillator levels are on the
/// 0..=100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalPolicy {
    /// RSI at or below this is oversold outright.
    pub oversold_rsi: f64,
    /// RSI at or below this counts as oversold when it rose versus the previous bar.
    pub rebound_rsi: f64,
    /// Both slow %K and %D at or below this mark a stochastic bottom.
    pub stoch_bottom: f64,
    /// A %K/%D golden cross only counts while %K is below this.
    pub cross_ceiling: f64,
    /// Fraction above the support level still considered "near" it.
    pub support_tolerance: f64,
    /// RSI at or below this alone is enough for WATCH.
    pub watch_rsi_ceiling: f64,
}

impl Default for SignalPolicy {
    fn default() -> Self {
        Self {
            oversold_rsi: 35.0,
            rebound_rsi: 45.0,
            stoch_bottom: 20.0,
            cross_ceiling: 40.0,
            support_tolerance: 0.03,
            watch_rsi_ceiling: 40.0,
        }
    }
}

impl SignalPolicy {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let levels = [
            ("oversold_rsi", self.oversold_rsi),
            ("rebound_rsi", self.rebound_rsi),
            ("stoch_bottom", self.stoch_bottom),
            ("cross_ceiling", self.cross_ceiling),
            ("watch_rsi_ceiling", self.watch_rsi_ceiling),
        ];
        for (name, value) in levels {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 0..=100, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..1.0).contains(&self.support_tolerance) {
            return Err(ConfigError::Invalid(format!(
                "support_tolerance must be within 0..1, got {}",
                self.support_tolerance
            )));
        }
        Ok(())
    }
}

/// Everything the classifier needs for one instrument on the current bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalInputs {
    pub indicators: IndicatorReading,
    pub current_price: f64,
    pub support_price: Option<f64>,
}

/// Predicates behind a classification, kept so a digest can explain it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignalFacts {
    pub oversold: bool,
    pub stoch_bottom: bool,
    pub golden_cross: bool,
    pub near_support: bool,
    pub data_unavailable: bool,
}

impl SignalFacts {
    pub fn stoch_confirmed(&self) -> bool {
        self.stoch_bottom || self.golden_cross
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: SignalTier,
    pub facts: SignalFacts,
}

impl Classification {
    pub fn data_unavailable() -> Self {
        Self {
            tier: SignalTier::Neutral,
            facts: SignalFacts {
                data_unavailable: true,
                ..SignalFacts::default()
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OversoldBounceClassifier {
    policy: SignalPolicy,
}

impl OversoldBounceClassifier {
    pub fn new(policy: SignalPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &SignalPolicy {
        &self.policy
    }

    /// Rules are checked in priority order and the first match wins:
    /// STRONG_BUY, WATCH_HIGH, WATCH, NEUTRAL.
    pub fn classify(&self, inputs: &SignalInputs) -> Classification {
        let Some(snapshot) = inputs.indicators.snapshot() else {
            return Classification::data_unavailable();
        };
        if !inputs.current_price.is_finite() {
            return Classification::data_unavailable();
        }

        let facts = self.facts(snapshot, inputs.current_price, inputs.support_price);
        let p = &self.policy;
        let tier = if facts.oversold && facts.stoch_confirmed() && facts.near_support {
            SignalTier::StrongBuy
        } else if facts.oversold && facts.stoch_confirmed() {
            SignalTier::WatchHigh
        } else if snapshot.rsi <= p.watch_rsi_ceiling || facts.near_support {
            SignalTier::Watch
        } else {
            SignalTier::Neutral
        };
        Classification { tier, facts }
    }

    fn facts(
        &self,
        s: &IndicatorSnapshot,
        current_price: f64,
        support_price: Option<f64>,
    ) -> SignalFacts {
        let p = &self.policy;
        let oversold = s.rsi <= p.oversold_rsi || (s.rsi <= p.rebound_rsi && s.rsi_rising());
        let stoch_bottom = s.stoch_k <= p.stoch_bottom && s.stoch_d <= p.stoch_bottom;
        let golden_cross =
            s.stoch_k > s.stoch_d && s.prev_stoch_k <= s.prev_stoch_d && s.stoch_k < p.cross_ceiling;
        let near_support = support_price
            .filter(|sp| sp.is_finite())
            .map(|sp| current_price <= sp * (1.0 + p.support_tolerance))
            .unwrap_or(false);
        SignalFacts {
            oversold,
            stoch_bottom,
            golden_cross,
            near_support,
            data_unavailable: false,
        }
    }
}
