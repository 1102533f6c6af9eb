//! File-backed store: one JSON document per line, one file per table.
//!
//! Appends take an exclusive lock on a sidecar `.lock` file and reads take a
//! shared one, so concurrent invocations never interleave partial lines.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{HealthSource, IncidentSource, NotificationSink, PredictionStore};
use crate::alert::Notification;
use crate::error::{IntoSafeBridgeError, Result, SafeBridgeError};
use crate::prediction::PredictionRecord;
use crate::risk::{HealthSample, IncidentRecord};

pub const HEALTH_FILE: &str = "health_samples.jsonl";
pub const INCIDENT_FILE: &str = "incidents.jsonl";
pub const PREDICTION_FILE: &str = "predictions.jsonl";
pub const NOTIFICATION_FILE: &str = "notifications.jsonl";

const LOCK_SUFFIX: &str = ".lock";

/// A health sample tagged with its owner, as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHealthSample {
    pub user_id: String,
    #[serde(flatten)]
    pub sample: HealthSample,
}

#[derive(Debug, Clone)]
pub struct JsonLinesStore {
    dir: PathBuf,
}

impl JsonLinesStore {
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn lock_file(&self, file: &str) -> Result<File> {
        fs::create_dir_all(&self.dir)?;
        let lock_path = self.dir.join(format!("{file}{LOCK_SUFFIX}"));
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)?;
        Ok(lock)
    }

    /// Appends one record as a JSON line.
    pub fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        let lock = self.lock_file(file)?;
        FileExt::lock_exclusive(&lock).into_store_error("lock")?;

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(file))?;
        out.write_all(line.as_bytes())?;
        out.sync_data()?;

        debug!("Appended record to {}", self.path(file).display());
        Ok(())
    }

    /// Reads every record of a table. Lines that fail to parse are skipped
    /// with a warning.
    pub fn read_all<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.path(file);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let lock = self.lock_file(file)?;
        FileExt::lock_shared(&lock).into_store_error("lock")?;

        let reader = BufReader::new(File::open(&path)?);
        let mut records = Vec::new();
        for (index, bytes) in reader.split(b'\n').enumerate() {
            let parsed = String::from_utf8(bytes?)
                .map_err(|e| e.to_string())
                .and_then(|line| {
                    if line.trim().is_empty() {
                        Ok(None)
                    } else {
                        serde_json::from_str(&line).map(Some).map_err(|e| e.to_string())
                    }
                });
            match parsed {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!(
                    "Skipping corrupted line {} in {}: {}",
                    index + 1,
                    path.display(),
                    e
                ),
            }
        }
        Ok(records)
    }

    /// # Errors
    ///
    /// Returns [`SafeBridgeError::InvalidRequest`] for a blank user id or an
    /// out-of-range self-report.
    pub fn add_health_sample(&self, user_id: &str, sample: HealthSample) -> Result<()> {
        if user_id.trim().is_empty() {
            return Err(SafeBridgeError::invalid_request("user id is empty"));
        }
        sample
            .validate()
            .map_err(|e| SafeBridgeError::invalid_request(e.to_string()))?;
        self.append(
            HEALTH_FILE,
            &UserHealthSample {
                user_id: user_id.to_string(),
                sample,
            },
        )
    }

    /// # Errors
    ///
    /// Returns [`SafeBridgeError::InvalidRequest`] for a blank emergency type
    /// or a severity outside 1-5.
    pub fn add_incident(&self, incident: &IncidentRecord) -> Result<()> {
        if incident.emergency_type.trim().is_empty() {
            return Err(SafeBridgeError::invalid_request("emergency type is empty"));
        }
        incident
            .validate()
            .map_err(|e| SafeBridgeError::invalid_request(e.to_string()))?;
        self.append(INCIDENT_FILE, incident)
    }

    /// Every queued notification, oldest first.
    pub fn notifications(&self) -> Result<Vec<Notification>> {
        self.read_all(NOTIFICATION_FILE)
    }
}

impl HealthSource for JsonLinesStore {
    fn recent_samples(&self, user_id: &str, limit: usize) -> Result<Vec<HealthSample>> {
        let mut samples: Vec<HealthSample> = self
            .read_all::<UserHealthSample>(HEALTH_FILE)?
            .into_iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.sample)
            .collect();
        samples.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        samples.truncate(limit);
        Ok(samples)
    }
}

impl IncidentSource for JsonLinesStore {
    fn incidents_since(&self, since: DateTime<Utc>) -> Result<Vec<IncidentRecord>> {
        Ok(self
            .read_all::<IncidentRecord>(INCIDENT_FILE)?
            .into_iter()
            .filter(|i| match i.validate() {
                Ok(()) => true,
                Err(e) => {
                    warn!("Skipping incident from {}: {}", i.created_at, e);
                    false
                }
            })
            .filter(|i| i.created_at >= since)
            .collect())
    }
}

impl PredictionStore for JsonLinesStore {
    fn save_prediction(&self, record: &PredictionRecord) -> Result<()> {
        self.append(PREDICTION_FILE, record)
    }

    fn predictions_for(&self, user_id: &str, limit: usize) -> Result<Vec<PredictionRecord>> {
        let mut records: Vec<PredictionRecord> = self
            .read_all::<PredictionRecord>(PREDICTION_FILE)?
            .into_iter()
            .filter(|r| r.user_id == user_id)
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }
}

impl NotificationSink for JsonLinesStore {
    fn dispatch(&self, notification: &Notification) -> Result<()> {
        self.append(NOTIFICATION_FILE, notification)
            .map_err(|e| SafeBridgeError::notification(&notification.recipient_id, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_read_missing_table_is_empty() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path().join("data"));
        let incidents: Vec<IncidentRecord> = store.read_all(INCIDENT_FILE).unwrap();
        assert!(incidents.is_empty());
        assert!(!store.dir().exists());
    }

    #[test]
    fn test_append_creates_directory_and_file() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path().join("nested/data"));
        store
            .add_incident(&IncidentRecord::new(at(3), "fall", 3))
            .unwrap();

        let content = fs::read_to_string(store.path(INCIDENT_FILE)).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("\"emergencyType\":\"fall\""));
    }

    #[test]
    fn test_recent_samples_filters_and_orders() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        store
            .add_health_sample("alice", HealthSample::new(at(1)).with_heart_rate(80))
            .unwrap();
        store
            .add_health_sample("bob", HealthSample::new(at(5)).with_heart_rate(130))
            .unwrap();
        store
            .add_health_sample("alice", HealthSample::new(at(4)).with_heart_rate(110))
            .unwrap();
        store
            .add_health_sample("alice", HealthSample::new(at(2)).with_heart_rate(90))
            .unwrap();

        let samples = store.recent_samples("alice", 2).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].heart_rate, Some(110));
        assert_eq!(samples[1].heart_rate, Some(90));
    }

    #[test]
    fn test_empty_user_id_rejected() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        let err = store
            .add_health_sample("  ", HealthSample::new(at(1)))
            .unwrap_err();
        assert!(matches!(err, SafeBridgeError::InvalidRequest { .. }));

        let err = store
            .add_health_sample("alice", HealthSample::new(at(1)).with_stress_level(11))
            .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!store.path(HEALTH_FILE).exists());
    }

    #[test]
    fn test_add_incident_rejects_bad_severity() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        for severity in [0, 6, 250] {
            let err = store
                .add_incident(&IncidentRecord::new(at(1), "fall", severity))
                .unwrap_err();
            assert!(matches!(err, SafeBridgeError::InvalidRequest { .. }));
        }
        let err = store
            .add_incident(&IncidentRecord::new(at(1), " ", 3))
            .unwrap_err();
        assert!(err.to_string().contains("emergency type"));
        assert!(!store.path(INCIDENT_FILE).exists());
    }

    #[test]
    fn test_out_of_range_incidents_skipped_on_read() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        store.add_incident(&IncidentRecord::new(at(5), "fall", 3)).unwrap();
        store
            .append(INCIDENT_FILE, &IncidentRecord::new(at(6), "fall", 250))
            .unwrap();

        let incidents = store.incidents_since(at(1)).unwrap();
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents[0].severity_level, 3);
    }

    #[test]
    fn test_incidents_since_filters_old_reports() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        store.add_incident(&IncidentRecord::new(at(1), "fall", 2)).unwrap();
        store.add_incident(&IncidentRecord::new(at(20), "cut", 1)).unwrap();

        let recent = store.incidents_since(at(10)).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].emergency_type, "cut");

        let all = store.incidents_since(at(1) - Duration::days(1)).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_corrupted_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        store.add_incident(&IncidentRecord::new(at(1), "fall", 2)).unwrap();
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(store.path(INCIDENT_FILE))
                .unwrap();
            writeln!(file, "{{\"createdAt\": broken").unwrap();
            writeln!(file).unwrap();
        }
        store.add_incident(&IncidentRecord::new(at(2), "cut", 1)).unwrap();

        let incidents: Vec<IncidentRecord> = store.read_all(INCIDENT_FILE).unwrap();
        assert_eq!(incidents.len(), 2);
    }

    #[test]
    fn test_invalid_utf8_lines_are_skipped() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        store.add_incident(&IncidentRecord::new(at(1), "fall", 2)).unwrap();
        {
            let mut file = OpenOptions::new()
                .append(true)
                .open(store.path(INCIDENT_FILE))
                .unwrap();
            file.write_all(b"\xff\xfe garbage\n").unwrap();
        }
        store.add_incident(&IncidentRecord::new(at(2), "cut", 1)).unwrap();

        let incidents = store.incidents_since(at(1)).unwrap();
        assert_eq!(incidents.len(), 2);

        fs::write(store.path(PREDICTION_FILE), b"\xff\xfe garbage\n").unwrap();
        assert!(store.predictions_for("w1", 10).unwrap().is_empty());
    }

    #[test]
    fn test_health_sample_line_is_flat() {
        let temp = TempDir::new().unwrap();
        let store = JsonLinesStore::new(temp.path());
        store
            .add_health_sample("alice", HealthSample::new(at(1)).with_stress_level(8))
            .unwrap();
        let content = fs::read_to_string(store.path(HEALTH_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(value["userId"], "alice");
        assert_eq!(value["stressLevel"], 8);
    }
}
