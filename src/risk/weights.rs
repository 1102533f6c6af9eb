//! Component weights for the composite score.
//!
//! | Component  | Default | Description                          |
//! |------------|---------|--------------------------------------|
//! | Weather    | 0.30    | Heat, wind, rain and UV conditions   |
//! | Industry   | 0.25    | Base hazard of the worker's sector   |
//! | Health     | 0.25    | Most recent wearable/self-report     |
//! | Historical | 0.20    | Incident reports in the last 90 days |
//!
//! These are product-chosen defaults, not clinical constants; they can be
//! replaced wholesale through a [`WeightPreset`] or configuration.

use serde::{Deserialize, Serialize};

use super::RiskComponent;

/// Weights for each risk component.
///
/// Weights are normalized by their sum before use, so they need not add up
/// to exactly 1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Weight for the weather sub-score (default: 0.30).
    pub weather: f64,
    /// Weight for the industry sub-score (default: 0.25).
    pub industry: f64,
    /// Weight for the personal health sub-score (default: 0.25).
    pub health: f64,
    /// Weight for the historical incident sub-score (default: 0.20).
    pub historical: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            weather: 0.30,
            industry: 0.25,
            health: 0.25,
            historical: 0.20,
        }
    }
}

impl RiskWeights {
    /// Creates new risk weights with custom values.
    #[must_use]
    pub fn new(weather: f64, industry: f64, health: f64, historical: f64) -> Self {
        Self {
            weather,
            industry,
            health,
            historical,
        }
    }

    /// Weight of a single component.
    #[must_use]
    pub fn weight(&self, component: RiskComponent) -> f64 {
        match component {
            RiskComponent::Weather => self.weather,
            RiskComponent::Industry => self.industry,
            RiskComponent::Health => self.health,
            RiskComponent::Historical => self.historical,
        }
    }

    /// Returns the sum of all weights.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.weather + self.industry + self.health + self.historical
    }

    /// Returns normalized weights that sum to 1.0.
    ///
    /// Falls back to the defaults when every weight is zero.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let total = self.total();
        if total == 0.0 {
            return Self::default();
        }
        Self {
            weather: self.weather / total,
            industry: self.industry / total,
            health: self.health / total,
            historical: self.historical / total,
        }
    }

    /// Validates that the weights are usable.
    ///
    /// # Errors
    ///
    /// Returns an error string if any weight is negative, NaN or infinite,
    /// or if all weights are zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use safebridge::risk::RiskWeights;
    ///
    /// assert!(RiskWeights::new(0.30, 0.25, 0.25, 0.20).validate().is_ok());
    /// assert!(RiskWeights::new(-0.1, 0.25, 0.25, 0.20).validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), String> {
        let weights = [
            ("weather", self.weather),
            ("industry", self.industry),
            ("health", self.health),
            ("historical", self.historical),
        ];

        for (name, value) in weights {
            if value.is_nan() {
                return Err(format!("{} weight is NaN", name));
            }
            if value.is_infinite() {
                return Err(format!("{} weight is infinite", name));
            }
            if value < 0.0 {
                return Err(format!("{} weight is negative: {}", name, value));
            }
        }

        if self.total() == 0.0 {
            return Err("All weights are zero - at least one must be positive".to_string());
        }

        Ok(())
    }
}

/// Preset weight profiles.
///
/// - **Balanced**: the default mix.
/// - **WeatherFocused**: outdoor crews during heat or storm season.
/// - **HealthFocused**: workers with wearable monitoring enrolled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeightPreset {
    /// Weights: weather=0.30, industry=0.25, health=0.25, historical=0.20
    #[default]
    Balanced,

    /// Weights: weather=0.40, industry=0.20, health=0.20, historical=0.20
    WeatherFocused,

    /// Weights: weather=0.20, industry=0.20, health=0.40, historical=0.20
    HealthFocused,
}

impl WeightPreset {
    /// Returns the risk weights for this preset.
    #[must_use]
    pub fn weights(&self) -> RiskWeights {
        match self {
            Self::Balanced => RiskWeights::default(),
            Self::WeatherFocused => RiskWeights::new(0.40, 0.20, 0.20, 0.20),
            Self::HealthFocused => RiskWeights::new(0.20, 0.20, 0.40, 0.20),
        }
    }
}

impl std::fmt::Display for WeightPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Balanced => write!(f, "balanced"),
            Self::WeatherFocused => write!(f, "weather-focused"),
            Self::HealthFocused => write!(f, "health-focused"),
        }
    }
}

impl std::str::FromStr for WeightPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "balanced" => Ok(Self::Balanced),
            "weather-focused" | "weather" => Ok(Self::WeatherFocused),
            "health-focused" | "health" => Ok(Self::HealthFocused),
            _ => Err(format!(
                "Unknown weight preset '{}'. Valid options: balanced, weather-focused, health-focused",
                s
            )),
        }
    }
}
