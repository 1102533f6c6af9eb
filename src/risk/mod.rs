//! Composite occupational-safety risk scoring.
//!
//! Four independent sub-scores feed one overall level:
//!
//! ```text
//! WeatherEvidence ──> weather ──┐
//! Sector name ──────> industry ─┤
//! HealthSample[] ───> health ───┼──> CompositeScorer ──> RiskResult
//! IncidentRecord[] ─> historical┘        (weights,         (overall 1-5,
//!                                         confidence)        confidence,
//!                                                            actions)
//! ```
//!
//! Every estimator is a pure function of the evidence it is handed. When the
//! evidence is missing or unusable the estimator returns an insufficient-data
//! [`SubScore`] at [`RiskLevel::DEFAULT`] instead of an error, so the
//! composite step always has four inputs.
//!
//! # Example
//!
//! ```rust
//! use safebridge::risk::{CompositeScorer, RiskInputs, RiskLevel};
//!
//! let scorer = CompositeScorer::with_defaults();
//! let inputs = RiskInputs::from_levels(
//!     RiskLevel::Severe,
//!     RiskLevel::Minimal,
//!     RiskLevel::Minimal,
//!     RiskLevel::Minimal,
//! );
//! let result = scorer.compute(&inputs);
//! assert_eq!(result.overall_risk, RiskLevel::Low);
//! ```

pub mod health;
pub mod historical;
pub mod industry;
pub mod scorer;
pub mod weather;
pub mod weights;

pub use health::{estimate_health, try_estimate_health, HealthSample, HealthThresholds};
pub use historical::{
    estimate_historical, summarize_incidents, try_estimate_historical, HistoricalPolicy,
    IncidentRecord, IncidentSummary, IncidentTrend,
};
pub use industry::{
    estimate_industry, estimate_sector, try_estimate_industry, Sector, SectorProfile,
};
pub use scorer::{
    ActionTier, CompositeScorer, ConfidencePolicy, RecommendationSet, RiskAnalysis, RiskInputs,
    RiskResult, ScorerConfig, PREVENTIVE_MEASURES,
};
pub use weather::{
    estimate_weather, try_estimate_weather, WeatherAlert, WeatherEvidence, WeatherThresholds,
};
pub use weights::{RiskWeights, WeightPreset};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Risk level on the 1-5 scale shared by sub-scores and the overall result.
///
/// Serialized as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLevel {
    /// 1: routine conditions.
    Minimal = 1,
    /// 2: also the score used when evidence is missing.
    Low = 2,
    /// 3: heightened caution.
    Moderate = 3,
    /// 4: alert-worthy.
    High = 4,
    /// 5: stop work.
    Severe = 5,
}

impl RiskLevel {
    /// Score assigned to a sub-score whose evidence was unavailable.
    pub const DEFAULT: Self = Self::Low;

    /// All levels, lowest first.
    pub const ALL: [Self; 5] = [
        Self::Minimal,
        Self::Low,
        Self::Moderate,
        Self::High,
        Self::Severe,
    ];

    /// Builds a level from any integer, clamping into 1..=5.
    #[must_use]
    pub fn clamped(value: i64) -> Self {
        match value {
            i64::MIN..=1 => Self::Minimal,
            2 => Self::Low,
            3 => Self::Moderate,
            4 => Self::High,
            _ => Self::Severe,
        }
    }

    /// Rounds a weighted average to the nearest level (halves round up).
    ///
    /// Non-finite input maps to [`RiskLevel::Minimal`].
    #[must_use]
    pub fn from_average(value: f64) -> Self {
        if !value.is_finite() {
            return Self::Minimal;
        }
        Self::clamped(value.round() as i64)
    }

    /// Numeric value, 1 through 5.
    #[must_use]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Lowercase name of the level.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Minimal => "minimal",
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
            Self::Severe => "severe",
        }
    }
}

impl From<RiskLevel> for u8 {
    fn from(level: RiskLevel) -> Self {
        level.value()
    }
}

impl TryFrom<u8> for RiskLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1..=5 => Ok(Self::clamped(i64::from(value))),
            _ => Err(format!("risk level must be between 1 and 5, got {}", value)),
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.value(), self.name())
    }
}

/// The four inputs of the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskComponent {
    Weather,
    Industry,
    Health,
    Historical,
}

impl RiskComponent {
    /// Components in the order they are reported.
    pub const ALL: [Self; 4] = [Self::Weather, Self::Industry, Self::Health, Self::Historical];

    /// Label used in `primaryRiskFactors`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Weather => "weather risk",
            Self::Industry => "industry risk",
            Self::Health => "health risk",
            Self::Historical => "historical incident risk",
        }
    }
}

impl std::fmt::Display for RiskComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weather => write!(f, "weather"),
            Self::Industry => write!(f, "industry"),
            Self::Health => write!(f, "health"),
            Self::Historical => write!(f, "historical"),
        }
    }
}

/// One estimator's verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScore {
    pub component: RiskComponent,
    pub score: RiskLevel,
    /// Labels of the thresholds or profile entries that contributed.
    #[serde(default)]
    pub factors: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    /// False when the score is the insufficient-data fallback.
    pub data_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubScore {
    /// A sub-score backed by real evidence.
    #[must_use]
    pub fn measured(component: RiskComponent, score: RiskLevel) -> Self {
        Self {
            component,
            score,
            factors: Vec::new(),
            recommendations: Vec::new(),
            data_available: true,
            message: None,
        }
    }

    /// The fallback used when evidence is missing or unusable.
    #[must_use]
    pub fn insufficient(component: RiskComponent, message: impl Into<String>) -> Self {
        Self {
            component,
            score: RiskLevel::DEFAULT,
            factors: Vec::new(),
            recommendations: Vec::new(),
            data_available: false,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn with_factors(mut self, factors: Vec<String>) -> Self {
        self.factors = factors;
        self
    }

    #[must_use]
    pub fn with_recommendations(mut self, recommendations: Vec<String>) -> Self {
        self.recommendations = recommendations;
        self
    }

    /// Returns true if this is the insufficient-data fallback.
    #[must_use]
    pub fn is_insufficient(&self) -> bool {
        !self.data_available
    }
}

/// Why an estimator could not produce a measured score.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimateError {
    #[error("no {component} evidence available")]
    MissingEvidence { component: RiskComponent },

    #[error("{field} is not a finite number: {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown industry sector '{0}'")]
    UnknownSector(String),
}

/// Turns a failed estimate into the insufficient-data sub-score.
pub(crate) fn or_insufficient(
    component: RiskComponent,
    estimate: Result<SubScore, EstimateError>,
) -> SubScore {
    match estimate {
        Ok(score) => score,
        Err(err) => {
            warn!("{} estimate fell back to default: {}", component, err);
            SubScore::insufficient(component, format!("insufficient data: {}", err))
        }
    }
}
