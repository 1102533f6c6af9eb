//! Mock implementations of the collaborator traits.
//!
//! These mocks provide controllable test doubles for the stores and the
//! notification queue, enabling deterministic pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use crate::alert::Notification;
use crate::error::{Result, SafeBridgeError};
use crate::prediction::PredictionRecord;
use crate::risk::{HealthSample, IncidentRecord};
use crate::store::{HealthSource, IncidentSource, NotificationSink, PredictionStore};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Mock health source.
///
/// # Example
///
/// ```rust,ignore
/// let health = MockHealthSource::new()
///     .with_sample("worker-1", HealthSample::new(now).with_heart_rate(120));
///
/// assert_eq!(health.recent_samples("worker-1", 10)?.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MockHealthSource {
    samples: HashMap<String, Vec<HealthSample>>,
    error: Option<String>,
    calls: AtomicU32,
}

impl MockHealthSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample for a user.
    #[must_use]
    pub fn with_sample(mut self, user_id: &str, sample: HealthSample) -> Self {
        self.samples
            .entry(user_id.to_string())
            .or_default()
            .push(sample);
        self
    }

    /// Make every read fail with `message`.
    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// Number of reads made so far.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HealthSource for MockHealthSource {
    fn recent_samples(&self, user_id: &str, limit: usize) -> Result<Vec<HealthSample>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.error {
            return Err(SafeBridgeError::store("read health samples", message.clone()));
        }

        let mut samples = self.samples.get(user_id).cloned().unwrap_or_default();
        samples.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        samples.truncate(limit);
        Ok(samples)
    }
}

/// Mock incident source.
#[derive(Debug, Default)]
pub struct MockIncidentSource {
    incidents: Vec<IncidentRecord>,
    error: Option<String>,
    calls: AtomicU32,
}

impl MockIncidentSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_incidents(mut self, incidents: Vec<IncidentRecord>) -> Self {
        self.incidents = incidents;
        self
    }

    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IncidentSource for MockIncidentSource {
    fn incidents_since(&self, since: DateTime<Utc>) -> Result<Vec<IncidentRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(ref message) = self.error {
            return Err(SafeBridgeError::store("read incidents", message.clone()));
        }

        Ok(self
            .incidents
            .iter()
            .filter(|i| i.created_at >= since)
            .cloned()
            .collect())
    }
}

/// Mock prediction store that records every saved prediction in memory.
#[derive(Debug, Default)]
pub struct MockPredictionStore {
    saved: Mutex<Vec<PredictionRecord>>,
    error: Option<String>,
}

impl MockPredictionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    /// Snapshot of the saved predictions, in save order.
    pub fn saved(&self) -> Vec<PredictionRecord> {
        lock(&self.saved).clone()
    }
}

impl PredictionStore for MockPredictionStore {
    fn save_prediction(&self, record: &PredictionRecord) -> Result<()> {
        if let Some(ref message) = self.error {
            return Err(SafeBridgeError::store("save prediction", message.clone()));
        }
        lock(&self.saved).push(record.clone());
        Ok(())
    }

    fn predictions_for(&self, user_id: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        if let Some(ref message) = self.error {
            return Err(SafeBridgeError::store("read predictions", message.clone()));
        }
        let mut records: Vec<PredictionRecord> = lock(&self.saved)
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

/// Mock notification sink that records dispatched alerts.
#[derive(Debug, Default)]
pub struct MockNotificationSink {
    sent: Mutex<Vec<Notification>>,
    error: Option<String>,
}

impl MockNotificationSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing(mut self, message: &str) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn sent(&self) -> Vec<Notification> {
        lock(&self.sent).clone()
    }
}

impl NotificationSink for MockNotificationSink {
    fn dispatch(&self, notification: &Notification) -> Result<()> {
        if let Some(ref message) = self.error {
            return Err(SafeBridgeError::notification(
                notification.recipient_id.clone(),
                message.clone(),
            ));
        }
        lock(&self.sent).push(notification.clone());
        Ok(())
    }
}
