//! Testing infrastructure for SafeBridge.
//!
//! This module provides mocks and fixtures for testing the prediction
//! pipeline without a real data store or notification queue.
//!
//! - **Mocks**: Test doubles for the collaborator traits in [`crate::store`]
//! - **Fixtures**: Temporary projects and canned evidence (test-only)
//!
//! # Example
//!
//! ```rust,ignore
//! use safebridge::testing::{MockHealthSource, MockPredictionStore};
//!
//! let health = MockHealthSource::new().failing("connection refused");
//! let predictions = MockPredictionStore::new();
//! ```

#[cfg(test)]
pub mod fixtures;
pub mod mocks;

#[cfg(test)]
pub use fixtures::*;
pub use mocks::*;
