//! Composite risk scorer.
//!
//! Combines the four sub-scores into a single [`RiskResult`]:
//!
//! 1. weighted average of the component levels, rounded and clamped to 1-5;
//! 2. confidence from which components had real evidence;
//! 3. labels of every component at level 4 or above;
//! 4. the urgent-action triad for the overall tier;
//! 5. the deduplicated union of component recommendations;
//! 6. the fixed preventive checklist.
//!
//! The computation is pure: identical inputs serialize to identical bytes.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::health::HealthThresholds;
use super::historical::HistoricalPolicy;
use super::weather::WeatherThresholds;
use super::weights::{RiskWeights, WeightPreset};
use super::{RiskComponent, RiskLevel, SubScore};

/// Fixed checklist returned with every result.
pub const PREVENTIVE_MEASURES: [&str; 5] = [
    "regular health checkups",
    "attend safety training",
    "wear protective equipment",
    "check weather information",
    "verify emergency contacts",
];

/// Urgent-action bucket selected by the overall level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionTier {
    /// Level 5.
    Critical,
    /// Level 4.
    Elevated,
    /// Levels 1-3.
    Routine,
}

impl ActionTier {
    #[must_use]
    pub fn for_level(level: RiskLevel) -> Self {
        match level {
            RiskLevel::Severe => Self::Critical,
            RiskLevel::High => Self::Elevated,
            _ => Self::Routine,
        }
    }

    #[must_use]
    pub fn actions(self) -> &'static [&'static str; 3] {
        match self {
            Self::Critical => &[
                "stop work immediately",
                "evacuate to a safe location",
                "contact your manager",
            ],
            Self::Elevated => &[
                "reduce work intensity",
                "inspect safety equipment",
                "share the situation with colleagues",
            ],
            Self::Routine => &[
                "work with care",
                "take scheduled rest breaks",
                "follow safety rules",
            ],
        }
    }
}

/// Confidence contributed by each component that had real evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfidencePolicy {
    pub base: f64,
    pub weather: f64,
    pub industry: f64,
    pub health: f64,
    pub historical: f64,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            base: 0.5,
            weather: 0.2,
            industry: 0.15,
            health: 0.2,
            historical: 0.15,
        }
    }
}

impl ConfidencePolicy {
    #[must_use]
    pub fn increment(&self, component: RiskComponent) -> f64 {
        match component {
            RiskComponent::Weather => self.weather,
            RiskComponent::Industry => self.industry,
            RiskComponent::Health => self.health,
            RiskComponent::Historical => self.historical,
        }
    }

    /// Confidence for a set of inputs, clamped to 0-1.
    #[must_use]
    pub fn confidence(&self, inputs: &RiskInputs) -> f64 {
        let raw = inputs
            .iter()
            .filter(|s| s.data_available)
            .fold(self.base, |acc, s| acc + self.increment(s.component));
        if raw.is_nan() {
            return 0.0;
        }
        raw.clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("base", self.base),
            ("weather", self.weather),
            ("industry", self.industry),
            ("health", self.health),
            ("historical", self.historical),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(format!("confidence {} is not finite", name));
            }
        }
        Ok(())
    }
}

/// Runtime policy for the estimators and the composite step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScorerConfig {
    pub weights: RiskWeights,
    pub confidence: ConfidencePolicy,
    pub weather: WeatherThresholds,
    pub health: HealthThresholds,
    pub historical: HistoricalPolicy,
}

impl ScorerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default policy with weights taken from a preset.
    #[must_use]
    pub fn with_preset(preset: WeightPreset) -> Self {
        Self {
            weights: preset.weights(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_weights(mut self, weights: RiskWeights) -> Self {
        self.weights = weights;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: ConfidencePolicy) -> Self {
        self.confidence = confidence;
        self
    }

    #[must_use]
    pub fn with_weather_thresholds(mut self, thresholds: WeatherThresholds) -> Self {
        self.weather = thresholds;
        self
    }

    #[must_use]
    pub fn with_health_thresholds(mut self, thresholds: HealthThresholds) -> Self {
        self.health = thresholds;
        self
    }

    #[must_use]
    pub fn with_historical_policy(mut self, policy: HistoricalPolicy) -> Self {
        self.historical = policy;
        self
    }

    /// Validates every section, returning the first problem found as
    /// `(section, reason)`.
    pub fn validate(&self) -> Result<(), (&'static str, String)> {
        self.weights.validate().map_err(|e| ("weights", e))?;
        self.confidence.validate().map_err(|e| ("confidence", e))?;
        self.weather.validate().map_err(|e| ("weatherThresholds", e))?;
        self.health.validate().map_err(|e| ("healthThresholds", e))?;
        self.historical.validate().map_err(|e| ("historical", e))?;
        Ok(())
    }
}

/// The four sub-scores fed to the composite step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskInputs {
    pub weather: SubScore,
    pub industry: SubScore,
    pub health: SubScore,
    pub historical: SubScore,
}

impl RiskInputs {
    #[must_use]
    pub fn new(
        weather: SubScore,
        industry: SubScore,
        health: SubScore,
        historical: SubScore,
    ) -> Self {
        Self {
            weather,
            industry,
            health,
            historical,
        }
    }

    /// Inputs made of bare levels, each treated as measured evidence.
    #[must_use]
    pub fn from_levels(
        weather: RiskLevel,
        industry: RiskLevel,
        health: RiskLevel,
        historical: RiskLevel,
    ) -> Self {
        Self::new(
            SubScore::measured(RiskComponent::Weather, weather),
            SubScore::measured(RiskComponent::Industry, industry),
            SubScore::measured(RiskComponent::Health, health),
            SubScore::measured(RiskComponent::Historical, historical),
        )
    }

    /// Sub-scores in reporting order.
    pub fn iter(&self) -> impl Iterator<Item = &SubScore> {
        [&self.weather, &self.industry, &self.health, &self.historical].into_iter()
    }
}

/// Insertion-ordered recommendation list, deduplicated on trimmed,
/// case-folded content.
#[derive(Debug, Clone, Default)]
pub struct RecommendationSet {
    seen: HashSet<String>,
    items: Vec<String>,
}

impl RecommendationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn key(text: &str) -> String {
        text.trim().to_lowercase()
    }

    /// Adds a recommendation; returns false if it was already present or
    /// blank.
    pub fn insert(&mut self, text: &str) -> bool {
        let key = Self::key(text);
        if key.is_empty() || !self.seen.insert(key) {
            return false;
        }
        self.items.push(text.trim().to_string());
        true
    }

    pub fn extend<'a>(&mut self, texts: impl IntoIterator<Item = &'a String>) {
        for text in texts {
            self.insert(text);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

/// Derived guidance attached to a result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub primary_risk_factors: Vec<String>,
    pub urgent_actions: Vec<String>,
    pub preventive_measures: Vec<String>,
}

/// Output of the composite scorer. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResult {
    pub overall_risk: RiskLevel,
    pub weather_risk: RiskLevel,
    pub industry_risk: RiskLevel,
    pub health_risk: RiskLevel,
    pub historical_risk: RiskLevel,
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub analysis: RiskAnalysis,
}

impl RiskResult {
    /// Tier used to pick the urgent actions.
    #[must_use]
    pub fn tier(&self) -> ActionTier {
        ActionTier::for_level(self.overall_risk)
    }

    /// Returns true if the overall level meets the alert threshold.
    #[must_use]
    pub fn requires_alert(&self, min_level: RiskLevel) -> bool {
        self.overall_risk >= min_level
    }
}

/// Weighted composite scorer.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    config: ScorerConfig,
}

impl CompositeScorer {
    #[must_use]
    pub fn new(config: ScorerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ScorerConfig::default())
    }

    #[must_use]
    pub fn with_preset(preset: WeightPreset) -> Self {
        Self::new(ScorerConfig::with_preset(preset))
    }

    #[must_use]
    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Unrounded weighted average of the component levels.
    #[must_use]
    pub fn weighted_average(&self, inputs: &RiskInputs) -> f64 {
        let weights = self.config.weights.normalized();
        inputs
            .iter()
            .map(|s| f64::from(s.score.value()) * weights.weight(s.component))
            .sum()
    }

    #[must_use]
    pub fn overall(&self, inputs: &RiskInputs) -> RiskLevel {
        RiskLevel::from_average(self.weighted_average(inputs))
    }

    /// Computes the composite result. Never fails.
    #[must_use]
    pub fn compute(&self, inputs: &RiskInputs) -> RiskResult {
        let overall = self.overall(inputs);

        let primary_risk_factors = inputs
            .iter()
            .filter(|s| s.score >= RiskLevel::High)
            .map(|s| s.component.label().to_string())
            .collect();

        let mut recommendations = RecommendationSet::new();
        for score in inputs.iter() {
            recommendations.extend(&score.recommendations);
        }

        let result = RiskResult {
            overall_risk: overall,
            weather_risk: inputs.weather.score,
            industry_risk: inputs.industry.score,
            health_risk: inputs.health.score,
            historical_risk: inputs.historical.score,
            confidence: self.config.confidence.confidence(inputs),
            recommendations: recommendations.into_vec(),
            analysis: RiskAnalysis {
                primary_risk_factors,
                urgent_actions: ActionTier::for_level(overall)
                    .actions()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                preventive_measures: PREVENTIVE_MEASURES.iter().map(|s| s.to_string()).collect(),
            },
        };

        debug!(
            "Composite risk={} weather={} industry={} health={} historical={} confidence={:.2}",
            result.overall_risk.value(),
            result.weather_risk.value(),
            result.industry_risk.value(),
            result.health_risk.value(),
            result.historical_risk.value(),
            result.confidence
        );

        result
    }
}
