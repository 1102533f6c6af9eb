//! Weather sub-score.
//!
//! Starts at 1 and climbs a ladder of heat, humidity, wind, rain and UV
//! thresholds. Each rung that fires contributes one or two points and a
//! named alert; the total is capped at 5.

use serde::{Deserialize, Serialize};

use super::{or_insufficient, EstimateError, RiskComponent, RiskLevel, SubScore};

/// Raw weather observations for a work site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherEvidence {
    pub temperature_c: f64,
    pub humidity_pct: f64,
    pub wind_speed_ms: f64,
    pub precipitation_mm: f64,
    pub uv_index: f64,
}

impl WeatherEvidence {
    pub fn validate(&self) -> Result<(), EstimateError> {
        let fields = [
            ("temperatureC", self.temperature_c),
            ("humidityPct", self.humidity_pct),
            ("windSpeedMs", self.wind_speed_ms),
            ("precipitationMm", self.precipitation_mm),
            ("uvIndex", self.uv_index),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(EstimateError::NonFinite { field, value });
            }
        }
        if !(0.0..=100.0).contains(&self.humidity_pct) {
            return Err(EstimateError::OutOfRange {
                field: "humidityPct",
                value: self.humidity_pct,
                min: 0.0,
                max: 100.0,
            });
        }
        Ok(())
    }
}

/// Threshold ladder for the weather estimator. All comparisons are strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WeatherThresholds {
    pub heat_warning_c: f64,
    pub heat_advisory_c: f64,
    pub humidity_pct: f64,
    pub wind_warning_ms: f64,
    pub wind_advisory_ms: f64,
    pub rain_warning_mm: f64,
    pub rain_advisory_mm: f64,
    pub uv_index: f64,
}

impl Default for WeatherThresholds {
    fn default() -> Self {
        Self {
            heat_warning_c: 35.0,
            heat_advisory_c: 32.0,
            humidity_pct: 80.0,
            wind_warning_ms: 15.0,
            wind_advisory_ms: 10.0,
            rain_warning_mm: 30.0,
            rain_advisory_mm: 10.0,
            uv_index: 10.0,
        }
    }
}

impl WeatherThresholds {
    /// Alerts raised by the given observations, in ladder order.
    #[must_use]
    pub fn triggered(&self, evidence: &WeatherEvidence) -> Vec<WeatherAlert> {
        let mut alerts = Vec::new();

        if evidence.temperature_c > self.heat_warning_c {
            alerts.push(WeatherAlert::HeatWarning);
        } else if evidence.temperature_c > self.heat_advisory_c {
            alerts.push(WeatherAlert::HeatAdvisory);
        }

        if evidence.humidity_pct > self.humidity_pct {
            alerts.push(WeatherAlert::HighHumidity);
        }

        if evidence.wind_speed_ms > self.wind_warning_ms {
            alerts.push(WeatherAlert::StrongWindWarning);
        } else if evidence.wind_speed_ms > self.wind_advisory_ms {
            alerts.push(WeatherAlert::StrongWindAdvisory);
        }

        if evidence.precipitation_mm > self.rain_warning_mm {
            alerts.push(WeatherAlert::HeavyRainWarning);
        } else if evidence.precipitation_mm > self.rain_advisory_mm {
            alerts.push(WeatherAlert::HeavyRainAdvisory);
        }

        if evidence.uv_index > self.uv_index {
            alerts.push(WeatherAlert::UvDanger);
        }

        alerts
    }

    /// Checks that each advisory sits at or below its warning.
    pub fn validate(&self) -> Result<(), String> {
        let pairs = [
            ("heat", self.heat_advisory_c, self.heat_warning_c),
            ("wind", self.wind_advisory_ms, self.wind_warning_ms),
            ("rain", self.rain_advisory_mm, self.rain_warning_mm),
        ];
        for (name, advisory, warning) in pairs {
            if !advisory.is_finite() || !warning.is_finite() {
                return Err(format!("{} thresholds must be finite", name));
            }
            if advisory > warning {
                return Err(format!(
                    "{} advisory ({}) is above the warning ({})",
                    name, advisory, warning
                ));
            }
        }
        Ok(())
    }
}

/// A named weather condition raised by the threshold ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherAlert {
    HeatWarning,
    HeatAdvisory,
    HighHumidity,
    StrongWindWarning,
    StrongWindAdvisory,
    HeavyRainWarning,
    HeavyRainAdvisory,
    UvDanger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hazard {
    Heat,
    Humidity,
    Wind,
    Rain,
    Uv,
}

const HEAT_ADVICE: &[&str] = &[
    "drink plenty of water",
    "rest in the shade",
    "shorten working hours",
];
const WIND_ADVICE: &[&str] = &["stop outdoor work", "move to a safe location"];
const RAIN_ADVICE: &[&str] = &[
    "switch to indoor work",
    "inspect drainage",
    "check electrical safety",
];

impl WeatherAlert {
    /// Factor label reported on the sub-score.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::HeatWarning => "heat warning",
            Self::HeatAdvisory => "heat advisory",
            Self::HighHumidity => "high humidity",
            Self::StrongWindWarning => "strong wind warning",
            Self::StrongWindAdvisory => "strong wind advisory",
            Self::HeavyRainWarning => "heavy rain warning",
            Self::HeavyRainAdvisory => "heavy rain advisory",
            Self::UvDanger => "UV danger",
        }
    }

    /// Points added to the weather score.
    #[must_use]
    pub fn points(self) -> i64 {
        match self {
            Self::HeatWarning | Self::StrongWindWarning | Self::HeavyRainWarning => 2,
            _ => 1,
        }
    }

    fn hazard(self) -> Hazard {
        match self {
            Self::HeatWarning | Self::HeatAdvisory => Hazard::Heat,
            Self::HighHumidity => Hazard::Humidity,
            Self::StrongWindWarning | Self::StrongWindAdvisory => Hazard::Wind,
            Self::HeavyRainWarning | Self::HeavyRainAdvisory => Hazard::Rain,
            Self::UvDanger => Hazard::Uv,
        }
    }
}

fn advice_for(alerts: &[WeatherAlert]) -> Vec<String> {
    let table: [(Hazard, &[&str]); 3] = [
        (Hazard::Heat, HEAT_ADVICE),
        (Hazard::Wind, WIND_ADVICE),
        (Hazard::Rain, RAIN_ADVICE),
    ];

    table
        .iter()
        .filter(|(hazard, _)| alerts.iter().any(|a| a.hazard() == *hazard))
        .flat_map(|(_, advice)| advice.iter().map(|s| s.to_string()))
        .collect()
}

/// Scores weather evidence, reporting why a score could not be measured.
///
/// # Errors
///
/// Returns an error if the evidence is missing, non-finite or has a
/// humidity outside 0-100 %.
pub fn try_estimate_weather(
    evidence: Option<&WeatherEvidence>,
    thresholds: &WeatherThresholds,
) -> Result<SubScore, EstimateError> {
    let evidence = evidence.ok_or(EstimateError::MissingEvidence {
        component: RiskComponent::Weather,
    })?;
    evidence.validate()?;

    let alerts = thresholds.triggered(evidence);
    let points: i64 = alerts.iter().map(|a| a.points()).sum();

    Ok(
        SubScore::measured(RiskComponent::Weather, RiskLevel::clamped(1 + points))
            .with_factors(alerts.iter().map(|a| a.label().to_string()).collect())
            .with_recommendations(advice_for(&alerts)),
    )
}

/// Scores weather evidence, falling back to the default level when it is
/// missing or unusable.
#[must_use]
pub fn estimate_weather(
    evidence: Option<&WeatherEvidence>,
    thresholds: &WeatherThresholds,
) -> SubScore {
    or_insufficient(
        RiskComponent::Weather,
        try_estimate_weather(evidence, thresholds),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm() -> WeatherEvidence {
        WeatherEvidence {
            temperature_c: 24.0,
            humidity_pct: 55.0,
            wind_speed_ms: 3.0,
            precipitation_mm: 0.0,
            uv_index: 5.0,
        }
    }

    #[test]
    fn test_calm_weather_scores_minimal() {
        let score = estimate_weather(Some(&calm()), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Minimal);
        assert!(score.factors.is_empty());
        assert!(score.recommendations.is_empty());
        assert!(score.data_available);
    }

    #[test]
    fn test_heat_warning_adds_two() {
        let evidence = WeatherEvidence {
            temperature_c: 36.5,
            ..calm()
        };
        let score = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Moderate);
        assert_eq!(score.factors, vec!["heat warning"]);
        assert_eq!(
            score.recommendations,
            vec!["drink plenty of water", "rest in the shade", "shorten working hours"]
        );
    }

    #[test]
    fn test_heat_advisory_adds_one() {
        let evidence = WeatherEvidence {
            temperature_c: 33.0,
            ..calm()
        };
        let score = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Low);
        assert_eq!(score.factors, vec!["heat advisory"]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let evidence = WeatherEvidence {
            temperature_c: 32.0,
            humidity_pct: 80.0,
            wind_speed_ms: 10.0,
            precipitation_mm: 10.0,
            uv_index: 10.0,
        };
        let score = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Minimal);
        assert!(score.factors.is_empty());
    }

    #[test]
    fn test_storm_clamps_to_five() {
        let evidence = WeatherEvidence {
            temperature_c: 38.0,
            humidity_pct: 90.0,
            wind_speed_ms: 18.0,
            precipitation_mm: 45.0,
            uv_index: 11.0,
        };
        let score = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Severe);
        assert_eq!(
            score.factors,
            vec![
                "heat warning",
                "high humidity",
                "strong wind warning",
                "heavy rain warning",
                "UV danger"
            ]
        );
        assert_eq!(score.recommendations.len(), 8);
    }

    #[test]
    fn test_wind_and_rain_advice_order() {
        let evidence = WeatherEvidence {
            wind_speed_ms: 12.0,
            precipitation_mm: 15.0,
            ..calm()
        };
        let score = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Moderate);
        assert_eq!(
            score.recommendations,
            vec![
                "stop outdoor work",
                "move to a safe location",
                "switch to indoor work",
                "inspect drainage",
                "check electrical safety"
            ]
        );
    }

    #[test]
    fn test_humidity_and_uv_have_no_advice() {
        let evidence = WeatherEvidence {
            humidity_pct: 85.0,
            uv_index: 10.5,
            ..calm()
        };
        let score = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert_eq!(score.score, RiskLevel::Moderate);
        assert!(score.recommendations.is_empty());
    }

    #[test]
    fn test_missing_evidence_falls_back() {
        let score = estimate_weather(None, &WeatherThresholds::default());
        assert!(score.is_insufficient());
        assert_eq!(score.score, RiskLevel::DEFAULT);
    }

    #[test]
    fn test_non_finite_evidence_is_rejected() {
        let evidence = WeatherEvidence {
            temperature_c: f64::NAN,
            ..calm()
        };
        let err = try_estimate_weather(Some(&evidence), &WeatherThresholds::default())
            .unwrap_err();
        assert!(matches!(err, EstimateError::NonFinite { field: "temperatureC", .. }));

        let fallback = estimate_weather(Some(&evidence), &WeatherThresholds::default());
        assert!(fallback.is_insufficient());
    }

    #[test]
    fn test_custom_thresholds() {
        let thresholds = WeatherThresholds {
            heat_warning_c: 30.0,
            heat_advisory_c: 28.0,
            ..WeatherThresholds::default()
        };
        let evidence = WeatherEvidence {
            temperature_c: 31.0,
            ..calm()
        };
        let score = estimate_weather(Some(&evidence), &thresholds);
        assert_eq!(score.factors, vec!["heat warning"]);
    }

    #[test]
    fn test_thresholds_validate() {
        assert!(WeatherThresholds::default().validate().is_ok());
        let inverted = WeatherThresholds {
            wind_advisory_ms: 20.0,
            ..WeatherThresholds::default()
        };
        assert!(inverted.validate().unwrap_err().contains("wind"));
    }
}
