//! Configuration loading and validation.
//!
//! Settings live in `<project>/.safebridge/settings.json`. Every field has a
//! default, and a missing file means "all defaults".

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::alert::AlertPolicy;
use crate::error::{Result, SafeBridgeError};
use crate::risk::{
    ConfidencePolicy, HealthThresholds, HistoricalPolicy, RiskWeights, ScorerConfig,
    WeatherThresholds, WeightPreset,
};

/// Risk weight settings.
///
/// Either a preset or explicit values. A preset takes precedence.
///
/// # Example settings.json
///
/// Using a preset:
/// ```json
/// {
///   "riskWeights": {
///     "preset": "weather-focused"
///   }
/// }
/// ```
///
/// Using custom weights:
/// ```json
/// {
///   "riskWeights": {
///     "weather": 0.35,
///     "industry": 0.25,
///     "health": 0.20,
///     "historical": 0.20
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskWeightsConfig {
    /// Named preset: "balanced", "weather-focused" or "health-focused".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Weight for the weather sub-score (default: 0.30).
    #[serde(default = "default_weather")]
    pub weather: f64,

    /// Weight for the industry sub-score (default: 0.25).
    #[serde(default = "default_industry")]
    pub industry: f64,

    /// Weight for the health sub-score (default: 0.25).
    #[serde(default = "default_health")]
    pub health: f64,

    /// Weight for the historical sub-score (default: 0.20).
    #[serde(default = "default_historical")]
    pub historical: f64,
}

fn default_weather() -> f64 {
    0.30
}

fn default_industry() -> f64 {
    0.25
}

fn default_health() -> f64 {
    0.25
}

fn default_historical() -> f64 {
    0.20
}

impl Default for RiskWeightsConfig {
    fn default() -> Self {
        Self {
            preset: None,
            weather: default_weather(),
            industry: default_industry(),
            health: default_health(),
            historical: default_historical(),
        }
    }
}

impl RiskWeightsConfig {
    #[must_use]
    pub fn has_preset(&self) -> bool {
        self.preset.is_some()
    }

    /// The weights in effect: the preset's if one is named, otherwise the
    /// explicit values.
    ///
    /// # Errors
    ///
    /// Returns an error if the preset name is unknown.
    pub fn resolve(&self) -> std::result::Result<RiskWeights, String> {
        match self.preset {
            Some(ref name) => Ok(name.parse::<WeightPreset>()?.weights()),
            None => Ok(RiskWeights::new(
                self.weather,
                self.industry,
                self.health,
                self.historical,
            )),
        }
    }
}

/// Project configuration loaded from `.safebridge/settings.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafeBridgeConfig {
    #[serde(default, rename = "riskWeights")]
    pub risk_weights: RiskWeightsConfig,

    #[serde(default, rename = "weatherThresholds")]
    pub weather_thresholds: WeatherThresholds,

    #[serde(default, rename = "healthThresholds")]
    pub health_thresholds: HealthThresholds,

    #[serde(default)]
    pub confidence: ConfidencePolicy,

    #[serde(default)]
    pub historical: HistoricalPolicy,

    #[serde(default)]
    pub alerts: AlertPolicy,

    /// Store directory, relative to the project unless absolute.
    #[serde(default = "default_data_dir", rename = "dataDir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".safebridge/data")
}

impl Default for SafeBridgeConfig {
    fn default() -> Self {
        Self {
            risk_weights: RiskWeightsConfig::default(),
            weather_thresholds: WeatherThresholds::default(),
            health_thresholds: HealthThresholds::default(),
            confidence: ConfidencePolicy::default(),
            historical: HistoricalPolicy::default(),
            alerts: AlertPolicy::default(),
            data_dir: default_data_dir(),
        }
    }
}

impl SafeBridgeConfig {
    /// Load configuration from a project directory
    ///
    /// # Errors
    ///
    /// Returns [`SafeBridgeError::Config`] if the settings file exists but
    /// cannot be read or parsed.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let settings_path = Self::settings_path(project_dir);

        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&settings_path).map_err(|e| {
            SafeBridgeError::config_with_path(
                format!("cannot read settings.json: {}", e),
                settings_path.clone(),
            )
        })?;
        serde_json::from_str(&content).map_err(|e| {
            SafeBridgeError::config_with_path(
                format!("cannot parse settings.json: {}", e),
                settings_path,
            )
        })
    }

    /// Get the settings.json path for a project
    #[must_use]
    pub fn settings_path(project_dir: &Path) -> PathBuf {
        project_dir.join(".safebridge/settings.json")
    }

    /// Resolved store directory for a project
    #[must_use]
    pub fn data_dir(&self, project_dir: &Path) -> PathBuf {
        if self.data_dir.is_absolute() {
            self.data_dir.clone()
        } else {
            project_dir.join(&self.data_dir)
        }
    }

    /// Replace the configured weights with a preset.
    pub fn apply_preset(&mut self, preset: WeightPreset) {
        self.risk_weights.preset = Some(preset.to_string());
    }

    /// Build the runtime scorer policy.
    ///
    /// # Errors
    ///
    /// Returns [`SafeBridgeError::InvalidConfig`] if the preset name is
    /// unknown.
    pub fn to_scorer_config(&self) -> Result<ScorerConfig> {
        let weights = self
            .risk_weights
            .resolve()
            .map_err(|e| SafeBridgeError::invalid_config("riskWeights.preset", e))?;

        Ok(ScorerConfig::new()
            .with_weights(weights)
            .with_confidence(self.confidence.clone())
            .with_weather_thresholds(self.weather_thresholds.clone())
            .with_health_thresholds(self.health_thresholds.clone())
            .with_historical_policy(self.historical.clone()))
    }

    /// Validates every section, reporting the first problem.
    ///
    /// # Errors
    ///
    /// Returns [`SafeBridgeError::InvalidWeights`] for unusable weights and
    /// [`SafeBridgeError::InvalidConfig`] for any other invalid field.
    pub fn validate(&self) -> Result<()> {
        let scorer = self.to_scorer_config()?;

        scorer
            .weights
            .validate()
            .map_err(|reason| SafeBridgeError::InvalidWeights { reason })?;
        scorer
            .validate()
            .map_err(|(section, reason)| SafeBridgeError::invalid_config(section, reason))?;
        self.alerts
            .validate()
            .map_err(|reason| SafeBridgeError::invalid_config("alerts", reason))?;

        Ok(())
    }
}
