//! Collaborator seams around the scorer.
//!
//! The scorer never touches storage or messaging itself. The prediction
//! pipeline reads evidence and writes results through these traits, which
//! are implemented by the file-backed [`JsonLinesStore`] and by the test
//! doubles in [`crate::testing`].

pub mod jsonl;

pub use jsonl::{JsonLinesStore, UserHealthSample};

use chrono::{DateTime, Utc};

use crate::alert::Notification;
use crate::error::Result;
use crate::prediction::PredictionRecord;
use crate::risk::{HealthSample, IncidentRecord};

/// Source of wearable and self-reported health samples.
pub trait HealthSource: Send + Sync {
    /// Up to `limit` samples for `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn recent_samples(&self, user_id: &str, limit: usize) -> Result<Vec<HealthSample>>;
}

/// Source of emergency reports.
pub trait IncidentSource: Send + Sync {
    /// Every incident created at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn incidents_since(&self, since: DateTime<Utc>) -> Result<Vec<IncidentRecord>>;
}

/// Persistence for prediction results.
pub trait PredictionStore: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_prediction(&self, record: &PredictionRecord) -> Result<()>;

    /// Up to `limit` predictions for `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn predictions_for(&self, user_id: &str, limit: usize) -> Result<Vec<PredictionRecord>>;
}

/// Outbound notification queue.
pub trait NotificationSink: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the notification could not be queued.
    fn dispatch(&self, notification: &Notification) -> Result<()>;
}
