//! Test fixtures for reproducible scoring scenarios.
//!
//! Provides a temporary project directory with a data store, plus canned
//! evidence for common weather and incident situations.

use std::path::Path;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tempfile::TempDir;

use crate::risk::{IncidentRecord, WeatherEvidence};
use crate::store::JsonLinesStore;

/// A fixed instant used as "now" by fixture data.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 7, 21, 9, 0, 0).unwrap()
}

/// Mild weather that triggers no threshold.
#[must_use]
pub fn calm_weather() -> WeatherEvidence {
    WeatherEvidence {
        temperature_c: 24.0,
        humidity_pct: 55.0,
        wind_speed_ms: 3.0,
        precipitation_mm: 0.0,
        uv_index: 5.0,
    }
}

/// A heat wave with high humidity and UV; scores at the top of the scale.
#[must_use]
pub fn heatwave_weather() -> WeatherEvidence {
    WeatherEvidence {
        temperature_c: 37.5,
        humidity_pct: 88.0,
        wind_speed_ms: 4.0,
        precipitation_mm: 0.0,
        uv_index: 11.0,
    }
}

/// `count` incidents, one per day going back from `now`.
#[must_use]
pub fn daily_incidents(
    now: DateTime<Utc>,
    count: usize,
    emergency_type: &str,
    severity: u8,
) -> Vec<IncidentRecord> {
    (0..count)
        .map(|d| IncidentRecord::new(now - Duration::days(d as i64), emergency_type, severity))
        .collect()
}

/// A test fixture representing a temporary project directory.
///
/// Automatically cleans up when dropped.
pub struct TestFixture {
    temp_dir: TempDir,
}

impl TestFixture {
    /// Create an empty project with no settings file.
    ///
    /// # Panics
    ///
    /// Panics if temporary directory creation fails.
    #[must_use]
    pub fn empty_project() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Create a project with the given `.safebridge/settings.json`.
    ///
    /// # Panics
    ///
    /// Panics if the settings file cannot be written.
    #[must_use]
    pub fn with_settings(settings: &str) -> Self {
        let fixture = Self::empty_project();
        fixture
            .write_file(".safebridge/settings.json", settings)
            .expect("Failed to write settings.json");
        fixture
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Store rooted at the default data directory.
    #[must_use]
    pub fn store(&self) -> JsonLinesStore {
        JsonLinesStore::new(self.temp_dir.path().join(".safebridge/data"))
    }

    /// Write a file relative to the project root, creating parents.
    pub fn write_file(&self, relative_path: &str, content: &str) -> std::io::Result<()> {
        let path = self.temp_dir.path().join(relative_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
    }
}
