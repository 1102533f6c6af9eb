//! Personal health sub-score from wearable and self-reported samples.
//!
//! Only the most recent sample is scored; older ones are history for the
//! caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{or_insufficient, EstimateError, RiskComponent, RiskLevel, SubScore};

/// Highest value accepted for self-reported stress and fatigue.
pub const SELF_REPORT_MAX: u8 = 10;

/// One health reading. Absent measurements skip their threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthSample {
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub heart_rate: Option<u32>,
    #[serde(default)]
    pub systolic_pressure: Option<u32>,
    /// Self-reported, 0-10.
    #[serde(default)]
    pub stress_level: Option<u8>,
    /// Self-reported, 0-10.
    #[serde(default)]
    pub fatigue_level: Option<u8>,
}

impl HealthSample {
    #[must_use]
    pub fn new(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at,
            heart_rate: None,
            systolic_pressure: None,
            stress_level: None,
            fatigue_level: None,
        }
    }

    #[must_use]
    pub fn with_heart_rate(mut self, bpm: u32) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    #[must_use]
    pub fn with_systolic_pressure(mut self, mmhg: u32) -> Self {
        self.systolic_pressure = Some(mmhg);
        self
    }

    #[must_use]
    pub fn with_stress_level(mut self, level: u8) -> Self {
        self.stress_level = Some(level);
        self
    }

    #[must_use]
    pub fn with_fatigue_level(mut self, level: u8) -> Self {
        self.fatigue_level = Some(level);
        self
    }

    pub fn validate(&self) -> Result<(), EstimateError> {
        let levels = [
            ("stressLevel", self.stress_level),
            ("fatigueLevel", self.fatigue_level),
        ];
        for (field, level) in levels {
            if let Some(value) = level {
                if value > SELF_REPORT_MAX {
                    return Err(EstimateError::OutOfRange {
                        field,
                        value: f64::from(value),
                        min: 0.0,
                        max: f64::from(SELF_REPORT_MAX),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Threshold ladder for the health estimator. All comparisons are strict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HealthThresholds {
    pub heart_rate_bpm: u32,
    pub systolic_mmhg: u32,
    pub stress_level: u8,
    pub fatigue_level: u8,
}

impl Default for HealthThresholds {
    fn default() -> Self {
        Self {
            heart_rate_bpm: 100,
            systolic_mmhg: 140,
            stress_level: 7,
            fatigue_level: 7,
        }
    }
}

impl HealthThresholds {
    pub fn validate(&self) -> Result<(), String> {
        if self.stress_level > SELF_REPORT_MAX || self.fatigue_level > SELF_REPORT_MAX {
            return Err(format!(
                "stress and fatigue thresholds must be at most {}",
                SELF_REPORT_MAX
            ));
        }
        Ok(())
    }
}

/// Scores the most recent sample.
///
/// # Errors
///
/// Returns an error if there are no samples or the latest one carries an
/// out-of-range self-report.
pub fn try_estimate_health(
    samples: &[HealthSample],
    thresholds: &HealthThresholds,
) -> Result<SubScore, EstimateError> {
    let latest = samples
        .iter()
        .max_by_key(|s| s.recorded_at)
        .ok_or(EstimateError::MissingEvidence {
            component: RiskComponent::Health,
        })?;
    latest.validate()?;

    let mut points = 0i64;
    let mut factors = Vec::new();
    let mut advice: Vec<&str> = Vec::new();

    if latest.heart_rate.is_some_and(|bpm| bpm > thresholds.heart_rate_bpm) {
        points += 1;
        factors.push("high heart rate");
        advice.extend(["take sufficient rest", "consult medical staff"]);
    }

    if latest
        .systolic_pressure
        .is_some_and(|mmhg| mmhg > thresholds.systolic_mmhg)
    {
        points += 2;
        factors.push("hypertension");
        advice.extend([
            "limit salt intake",
            "measure blood pressure regularly",
            "consult medical staff",
        ]);
    }

    if latest
        .stress_level
        .is_some_and(|level| level > thresholds.stress_level)
    {
        points += 1;
        factors.push("high stress");
        advice.extend(["manage stress", "get enough sleep", "secure rest time"]);
    }

    if latest
        .fatigue_level
        .is_some_and(|level| level > thresholds.fatigue_level)
    {
        points += 1;
        factors.push("high fatigue");
    }

    Ok(
        SubScore::measured(RiskComponent::Health, RiskLevel::clamped(1 + points))
            .with_factors(factors.into_iter().map(String::from).collect())
            .with_recommendations(advice.into_iter().map(String::from).collect()),
    )
}

/// Scores the most recent sample, falling back to the default level when
/// there are none.
#[must_use]
pub fn estimate_health(samples: &[HealthSample], thresholds: &HealthThresholds) -> SubScore {
    or_insufficient(RiskComponent::Health, try_estimate_health(samples, thresholds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 14, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_healthy_sample_scores_minimal() {
        let samples = vec![HealthSample::new(at(9))
            .with_heart_rate(72)
            .with_systolic_pressure(118)
            .with_stress_level(3)
            .with_fatigue_level(2)];
        let score = estimate_health(&samples, &HealthThresholds::default());
        assert_eq!(score.score, RiskLevel::Minimal);
        assert!(score.factors.is_empty());
        assert!(score.data_available);
    }

    #[test]
    fn test_every_threshold_clamps_to_five() {
        let samples = vec![HealthSample::new(at(9))
            .with_heart_rate(120)
            .with_systolic_pressure(150)
            .with_stress_level(9)
            .with_fatigue_level(8)];
        let score = estimate_health(&samples, &HealthThresholds::default());
        assert_eq!(score.score, RiskLevel::Severe);
        assert_eq!(
            score.factors,
            vec!["high heart rate", "hypertension", "high stress", "high fatigue"]
        );
    }

    #[test]
    fn test_hypertension_adds_two() {
        let samples = vec![HealthSample::new(at(9)).with_systolic_pressure(145)];
        let score = estimate_health(&samples, &HealthThresholds::default());
        assert_eq!(score.score, RiskLevel::Moderate);
        assert_eq!(
            score.recommendations,
            vec![
                "limit salt intake",
                "measure blood pressure regularly",
                "consult medical staff"
            ]
        );
    }

    #[test]
    fn test_thresholds_are_strict() {
        let samples = vec![HealthSample::new(at(9))
            .with_heart_rate(100)
            .with_systolic_pressure(140)
            .with_stress_level(7)
            .with_fatigue_level(7)];
        let score = estimate_health(&samples, &HealthThresholds::default());
        assert_eq!(score.score, RiskLevel::Minimal);
    }

    #[test]
    fn test_uses_most_recent_sample() {
        let samples = vec![
            HealthSample::new(at(8)).with_heart_rate(130),
            HealthSample::new(at(11)).with_heart_rate(80),
            HealthSample::new(at(11) - Duration::minutes(30)).with_systolic_pressure(160),
        ];
        let score = estimate_health(&samples, &HealthThresholds::default());
        assert_eq!(score.score, RiskLevel::Minimal);
    }

    #[test]
    fn test_no_samples_falls_back() {
        let score = estimate_health(&[], &HealthThresholds::default());
        assert!(score.is_insufficient());
        assert_eq!(score.score, RiskLevel::DEFAULT);
        assert!(score.message.unwrap().contains("health"));
    }

    #[test]
    fn test_out_of_range_self_report_falls_back() {
        let samples = vec![HealthSample::new(at(9)).with_stress_level(14)];
        let err = try_estimate_health(&samples, &HealthThresholds::default()).unwrap_err();
        assert!(matches!(err, EstimateError::OutOfRange { field: "stressLevel", .. }));
        assert!(estimate_health(&samples, &HealthThresholds::default()).is_insufficient());
    }

    #[test]
    fn test_sample_json_shape() {
        let json = r#"{"recordedAt":"2025-08-14T09:00:00Z","heartRate":104}"#;
        let sample: HealthSample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.heart_rate, Some(104));
        assert_eq!(sample.systolic_pressure, None);
    }
}
