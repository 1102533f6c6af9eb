//! Historical sub-score and incident summaries.
//!
//! The score is a step function of how many incident reports fall inside
//! the lookback window: `min(count / incidents_per_level + 1, 5)`.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{or_insufficient, EstimateError, RiskComponent, RiskLevel, SubScore};

/// An emergency report filed by a worker or employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub created_at: DateTime<Utc>,
    pub emergency_type: String,
    /// 1-5 as reported.
    pub severity_level: u8,
}

impl IncidentRecord {
    #[must_use]
    pub fn new(
        created_at: DateTime<Utc>,
        emergency_type: impl Into<String>,
        severity_level: u8,
    ) -> Self {
        Self {
            created_at,
            emergency_type: emergency_type.into(),
            severity_level,
        }
    }

    /// Checks that the severity is on the 1-5 scale.
    ///
    /// # Errors
    ///
    /// Returns [`EstimateError::OutOfRange`] for any other severity.
    pub fn validate(&self) -> Result<(), EstimateError> {
        if RiskLevel::try_from(self.severity_level).is_err() {
            return Err(EstimateError::OutOfRange {
                field: "severityLevel",
                value: f64::from(self.severity_level),
                min: 1.0,
                max: 5.0,
            });
        }
        Ok(())
    }
}

/// Window and step sizes for the historical estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoricalPolicy {
    /// Lookback window for the score (default: 90).
    pub window_days: u32,
    /// Incidents per level step (default: 5).
    pub incidents_per_level: u32,
    /// Recent slice of the window compared against the rest (default: 30).
    pub trend_window_days: u32,
}

impl Default for HistoricalPolicy {
    fn default() -> Self {
        Self {
            window_days: 90,
            incidents_per_level: 5,
            trend_window_days: 30,
        }
    }
}

impl HistoricalPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if self.window_days == 0 {
            return Err("windowDays must be positive".to_string());
        }
        if self.incidents_per_level == 0 {
            return Err("incidentsPerLevel must be positive".to_string());
        }
        if self.trend_window_days > self.window_days {
            return Err(format!(
                "trendWindowDays ({}) exceeds windowDays ({})",
                self.trend_window_days, self.window_days
            ));
        }
        Ok(())
    }

    /// Earliest timestamp inside the lookback window.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(i64::from(self.window_days))
    }

    fn in_window<'a>(
        &self,
        incidents: &'a [IncidentRecord],
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a IncidentRecord> {
        let start = self.window_start(now);
        incidents
            .iter()
            .filter(move |i| i.created_at >= start && i.validate().is_ok())
    }
}

/// Direction of incident frequency over the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentTrend {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl std::fmt::Display for IncidentTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Increasing => write!(f, "increasing"),
            Self::Decreasing => write!(f, "decreasing"),
            Self::Stable => write!(f, "stable"),
            Self::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

/// Aggregate view of incidents inside the lookback window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentSummary {
    pub total_incidents: usize,
    pub average_severity: f64,
    pub incidents_by_type: BTreeMap<String, usize>,
    pub trend: IncidentTrend,
}

/// Summarizes the incidents inside the policy window.
///
/// The trend compares incidents in the most recent `trend_window_days`
/// against the older remainder of the window; fewer than two incidents is
/// reported as insufficient data.
#[must_use]
pub fn summarize_incidents(
    incidents: &[IncidentRecord],
    now: DateTime<Utc>,
    policy: &HistoricalPolicy,
) -> IncidentSummary {
    let windowed: Vec<&IncidentRecord> = policy.in_window(incidents, now).collect();
    let total = windowed.len();

    let mut by_type = BTreeMap::new();
    for incident in &windowed {
        *by_type.entry(incident.emergency_type.clone()).or_insert(0) += 1;
    }

    let average_severity = if total == 0 {
        0.0
    } else {
        windowed
            .iter()
            .map(|i| f64::from(i.severity_level))
            .sum::<f64>()
            / total as f64
    };

    let trend = if total < 2 {
        IncidentTrend::InsufficientData
    } else {
        let recent_start = now - Duration::days(i64::from(policy.trend_window_days));
        let recent = windowed.iter().filter(|i| i.created_at > recent_start).count();
        let older = total - recent;
        match recent.cmp(&older) {
            std::cmp::Ordering::Greater => IncidentTrend::Increasing,
            std::cmp::Ordering::Less => IncidentTrend::Decreasing,
            std::cmp::Ordering::Equal => IncidentTrend::Stable,
        }
    };

    IncidentSummary {
        total_incidents: total,
        average_severity,
        incidents_by_type: by_type,
        trend,
    }
}

/// Scores incident frequency inside the lookback window.
///
/// # Errors
///
/// Returns [`EstimateError::MissingEvidence`] if no incident falls inside
/// the window.
pub fn try_estimate_historical(
    incidents: &[IncidentRecord],
    now: DateTime<Utc>,
    policy: &HistoricalPolicy,
) -> Result<SubScore, EstimateError> {
    let count = policy.in_window(incidents, now).count();
    if count == 0 {
        return Err(EstimateError::MissingEvidence {
            component: RiskComponent::Historical,
        });
    }

    let step = policy.incidents_per_level.max(1) as usize;
    let level = RiskLevel::clamped((count / step + 1) as i64);

    Ok(SubScore::measured(RiskComponent::Historical, level).with_factors(vec![format!(
        "{} incidents in the last {} days",
        count, policy.window_days
    )]))
}

/// Scores incident frequency, falling back to the default level when the
/// window is empty.
#[must_use]
pub fn estimate_historical(
    incidents: &[IncidentRecord],
    now: DateTime<Utc>,
    policy: &HistoricalPolicy,
) -> SubScore {
    or_insufficient(
        RiskComponent::Historical,
        try_estimate_historical(incidents, now, policy),
    )
}
