//! Prediction pipeline.
//!
//! Wraps the pure scorer with the I/O the product needs:
//!
//! ```text
//! PredictionRequest
//!     │
//!     ├─ weather evidence (request) ──> estimate_weather
//!     ├─ sector name (request) ───────> estimate_industry
//!     ├─ HealthSource (optional) ─────> estimate_health
//!     └─ IncidentSource ──────────────> estimate_historical + summary
//!                         │
//!                         v
//!                  CompositeScorer::compute
//!                         │
//!            PredictionStore::save_prediction
//!                         │
//!         NotificationSink::dispatch (level >= alert threshold)
//! ```
//!
//! Collaborator read failures degrade to insufficient-data sub-scores.
//! Write failures (saving the prediction, queueing the alert) propagate.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::alert::{high_risk_alert, AlertPolicy, Notification};
use crate::error::{Result, SafeBridgeError};
use crate::risk::{
    estimate_health, estimate_historical, estimate_industry, estimate_weather,
    summarize_incidents, CompositeScorer, IncidentSummary, RiskComponent, RiskInputs, RiskLevel,
    RiskResult, ScorerConfig, SubScore, WeatherEvidence,
};
use crate::store::{HealthSource, IncidentSource, NotificationSink, PredictionStore};

/// Number of recent health samples requested from the health source.
pub const HEALTH_SAMPLE_LIMIT: usize = 10;

/// Horizon the prediction is made for.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::Weekly => write!(f, "weekly"),
            Self::Monthly => write!(f, "monthly"),
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!(
                "Unknown timeframe '{}'. Valid options: daily, weekly, monthly",
                s
            )),
        }
    }
}

/// A request to assess one worker's risk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    pub user_id: String,
    pub region: String,
    /// Sector name; unknown sectors score with the agriculture profile.
    pub industry: String,
    #[serde(default)]
    pub timeframe: Timeframe,
    #[serde(default)]
    pub include_health_data: bool,
    #[serde(default)]
    pub weather: Option<WeatherEvidence>,
}

impl PredictionRequest {
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        region: impl Into<String>,
        industry: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            region: region.into(),
            industry: industry.into(),
            timeframe: Timeframe::default(),
            include_health_data: false,
            weather: None,
        }
    }

    #[must_use]
    pub fn with_timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    #[must_use]
    pub fn with_health_data(mut self, include: bool) -> Self {
        self.include_health_data = include;
        self
    }

    #[must_use]
    pub fn with_weather(mut self, weather: WeatherEvidence) -> Self {
        self.weather = Some(weather);
        self
    }

    /// # Errors
    ///
    /// Returns [`SafeBridgeError::InvalidRequest`] if the user id or region
    /// is blank.
    pub fn validate(&self) -> Result<()> {
        if self.user_id.trim().is_empty() {
            return Err(SafeBridgeError::invalid_request("userId is empty"));
        }
        if self.region.trim().is_empty() {
            return Err(SafeBridgeError::invalid_request("region is empty"));
        }
        Ok(())
    }
}

/// Component levels as persisted with a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorLevels {
    pub weather: RiskLevel,
    pub industry: RiskLevel,
    pub health: RiskLevel,
    pub historical: RiskLevel,
}

/// A persisted prediction, keyed by user and date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRecord {
    pub id: Uuid,
    pub user_id: String,
    pub prediction_date: NaiveDate,
    pub risk_level: RiskLevel,
    pub risk_factors: RiskFactorLevels,
    pub recommendations: Vec<String>,
    pub confidence_score: f64,
    pub region: String,
    pub industry_sector: String,
    pub timeframe: Timeframe,
    pub created_at: DateTime<Utc>,
}

impl PredictionRecord {
    #[must_use]
    pub fn from_result(
        request: &PredictionRequest,
        result: &RiskResult,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: request.user_id.clone(),
            prediction_date: now.date_naive(),
            risk_level: result.overall_risk,
            risk_factors: RiskFactorLevels {
                weather: result.weather_risk,
                industry: result.industry_risk,
                health: result.health_risk,
                historical: result.historical_risk,
            },
            recommendations: result.recommendations.clone(),
            confidence_score: result.confidence,
            region: request.region.clone(),
            industry_sector: request.industry.clone(),
            timeframe: request.timeframe,
            created_at: now,
        }
    }
}

/// Everything one prediction produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionOutcome {
    pub record: PredictionRecord,
    pub result: RiskResult,
    pub inputs: RiskInputs,
    pub incident_summary: IncidentSummary,
    pub notification: Option<Notification>,
}

/// The collaborators a [`RiskPredictor`] reads from and writes to.
#[derive(Clone, Copy)]
pub struct Collaborators<'a> {
    pub health: &'a dyn HealthSource,
    pub incidents: &'a dyn IncidentSource,
    pub predictions: &'a dyn PredictionStore,
    pub notifications: &'a dyn NotificationSink,
}

impl<'a> Collaborators<'a> {
    /// Uses one backend for every role.
    #[must_use]
    pub fn uniform<S>(store: &'a S) -> Self
    where
        S: HealthSource + IncidentSource + PredictionStore + NotificationSink,
    {
        Self {
            health: store,
            incidents: store,
            predictions: store,
            notifications: store,
        }
    }
}

/// Runs the full assess-persist-alert sequence for one request.
pub struct RiskPredictor<'a> {
    scorer: CompositeScorer,
    alerts: AlertPolicy,
    collaborators: Collaborators<'a>,
}

impl<'a> RiskPredictor<'a> {
    #[must_use]
    pub fn new(
        config: ScorerConfig,
        alerts: AlertPolicy,
        collaborators: Collaborators<'a>,
    ) -> Self {
        Self {
            scorer: CompositeScorer::new(config),
            alerts,
            collaborators,
        }
    }

    #[must_use]
    pub fn scorer(&self) -> &CompositeScorer {
        &self.scorer
    }

    fn health_score(&self, request: &PredictionRequest) -> SubScore {
        if !request.include_health_data {
            return SubScore::insufficient(
                RiskComponent::Health,
                "insufficient data: health data not requested",
            );
        }

        match self
            .collaborators
            .health
            .recent_samples(&request.user_id, HEALTH_SAMPLE_LIMIT)
        {
            Ok(samples) => estimate_health(&samples, &self.scorer.config().health),
            Err(e) => {
                warn!("Health source unavailable for {}: {}", request.user_id, e);
                SubScore::insufficient(
                    RiskComponent::Health,
                    format!("insufficient data: health source unavailable: {}", e),
                )
            }
        }
    }

    fn historical_score(&self, now: DateTime<Utc>) -> (SubScore, IncidentSummary) {
        let policy = &self.scorer.config().historical;
        match self.collaborators.incidents.incidents_since(policy.window_start(now)) {
            Ok(incidents) => (
                estimate_historical(&incidents, now, policy),
                summarize_incidents(&incidents, now, policy),
            ),
            Err(e) => {
                warn!("Incident source unavailable: {}", e);
                (
                    SubScore::insufficient(
                        RiskComponent::Historical,
                        format!("insufficient data: incident source unavailable: {}", e),
                    ),
                    summarize_incidents(&[], now, policy),
                )
            }
        }
    }

    /// Assesses, persists and (if due) alerts.
    ///
    /// # Errors
    ///
    /// Returns an error if the request is invalid, the prediction cannot be
    /// saved, or a due alert cannot be queued.
    pub fn predict(
        &self,
        request: &PredictionRequest,
        now: DateTime<Utc>,
    ) -> Result<PredictionOutcome> {
        request.validate()?;
        let config = self.scorer.config();

        let weather = estimate_weather(request.weather.as_ref(), &config.weather);
        let industry = estimate_industry(&request.industry);
        let health = self.health_score(request);
        let (historical, incident_summary) = self.historical_score(now);

        let inputs = RiskInputs::new(weather, industry, health, historical);
        let result = self.scorer.compute(&inputs);

        let record = PredictionRecord::from_result(request, &result, now);
        self.collaborators.predictions.save_prediction(&record)?;
        info!(
            "Saved prediction {} for {} in {} (risk {}, confidence {:.2})",
            record.id, request.user_id, request.region, result.overall_risk, result.confidence
        );

        let notification = high_risk_alert(&request.user_id, &result, &self.alerts, now);
        if let Some(ref alert) = notification {
            self.collaborators.notifications.dispatch(alert)?;
            info!(
                "Dispatched priority {} alert to {}",
                alert.priority, alert.recipient_id
            );
        }

        Ok(PredictionOutcome {
            record,
            result,
            inputs,
            incident_summary,
            notification,
        })
    }
}
