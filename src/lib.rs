//! SafeBridge - composite occupational risk scoring
//!
//! Scores a worker's risk on a 1-5 scale by blending four sub-scores
//! (weather, industry, health and incident history) with configurable
//! weights, then persists the prediction and raises a high-priority alert
//! when the overall level crosses the alert threshold.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`risk`] - Pure estimators and the composite scorer
//! - [`alert`] - High-risk notification construction
//! - [`prediction`] - The assess-persist-alert pipeline
//! - [`store`] - Collaborator traits and the JSON-lines store
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Custom error types and handling
//! - [`testing`] - Testing infrastructure (mocks, fixtures)
//!
//! # Example
//!
//! ```rust
//! use safebridge::risk::{CompositeScorer, RiskInputs, RiskLevel};
//!
//! let scorer = CompositeScorer::with_defaults();
//! let result = scorer.compute(&RiskInputs::from_levels(
//!     RiskLevel::Severe,
//!     RiskLevel::Minimal,
//!     RiskLevel::Minimal,
//!     RiskLevel::Minimal,
//! ));
//! assert_eq!(result.overall_risk, RiskLevel::Low);
//! ```

pub mod alert;
pub mod config;
pub mod error;
pub mod prediction;
pub mod risk;
pub mod store;
pub mod testing;

// Re-export commonly used types
pub use error::{IntoSafeBridgeError, Result, SafeBridgeError};

pub use config::{RiskWeightsConfig, SafeBridgeConfig};

pub use alert::{high_risk_alert, AlertPolicy, Notification};

pub use prediction::{
    Collaborators, PredictionOutcome, PredictionRecord, PredictionRequest, RiskPredictor,
    Timeframe,
};

pub use risk::{
    CompositeScorer, RiskComponent, RiskInputs, RiskLevel, RiskResult, RiskWeights, ScorerConfig,
    SubScore, WeightPreset,
};

pub use store::{HealthSource, IncidentSource, JsonLinesStore, NotificationSink, PredictionStore};
