//! High-risk alert construction.
//!
//! The scorer only exposes the overall level. Callers that cross the alert
//! threshold turn the result into a [`Notification`] with
//! [`high_risk_alert`] and hand it to a
//! [`NotificationSink`](crate::store::NotificationSink).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::risk::{ActionTier, RiskLevel, RiskResult};

/// When and how loudly to alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertPolicy {
    /// Lowest overall level that raises an alert (default: 4).
    pub min_level: RiskLevel,
    /// Priority stamped on the notification, 1-5 (default: 5).
    pub priority: u8,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            min_level: RiskLevel::High,
            priority: 5,
        }
    }
}

impl AlertPolicy {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.priority) {
            return Err(format!(
                "priority must be between 1 and 5, got {}",
                self.priority
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    SafetyAlert,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertMetadata {
    pub risk_level: RiskLevel,
    pub primary_factors: Vec<String>,
    pub urgent_actions: Vec<String>,
}

/// A queued message for one recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: String,
    pub notification_type: NotificationKind,
    pub priority: u8,
    pub title: String,
    pub content: String,
    pub metadata: AlertMetadata,
    pub created_at: DateTime<Utc>,
}

fn tier_message(tier: ActionTier) -> &'static str {
    match tier {
        ActionTier::Critical => {
            "Critical risk detected. Stop work and move to a safe location immediately."
        }
        ActionTier::Elevated => {
            "High risk detected by the risk analysis. Take safety precautions immediately."
        }
        ActionTier::Routine => {
            "Elevated risk detected. Follow safety rules and check in with your manager."
        }
    }
}

/// Builds the alert for `recipient_id`, or `None` below the policy threshold.
#[must_use]
pub fn high_risk_alert(
    recipient_id: &str,
    result: &RiskResult,
    policy: &AlertPolicy,
    now: DateTime<Utc>,
) -> Option<Notification> {
    if !result.requires_alert(policy.min_level) {
        return None;
    }

    Some(Notification {
        id: Uuid::new_v4(),
        recipient_id: recipient_id.to_string(),
        notification_type: NotificationKind::SafetyAlert,
        priority: policy.priority,
        title: format!("High risk detected (level {})", result.overall_risk.value()),
        content: tier_message(result.tier()).to_string(),
        metadata: AlertMetadata {
            risk_level: result.overall_risk,
            primary_factors: result.analysis.primary_risk_factors.clone(),
            urgent_actions: result.analysis.urgent_actions.clone(),
        },
        created_at: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::{CompositeScorer, RiskInputs};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 17, 7, 30, 0).unwrap()
    }

    fn result_at(level: RiskLevel) -> RiskResult {
        CompositeScorer::with_defaults()
            .compute(&RiskInputs::from_levels(level, level, level, level))
    }

    #[test]
    fn test_no_alert_below_threshold() {
        let result = result_at(RiskLevel::Moderate);
        assert!(high_risk_alert("worker-7", &result, &AlertPolicy::default(), now()).is_none());
    }

    #[test]
    fn test_alert_at_level_four() {
        let result = result_at(RiskLevel::High);
        let alert = high_risk_alert("worker-7", &result, &AlertPolicy::default(), now())
            .expect("level 4 should alert");

        assert_eq!(alert.recipient_id, "worker-7");
        assert_eq!(alert.priority, 5);
        assert_eq!(alert.notification_type, NotificationKind::SafetyAlert);
        assert_eq!(alert.title, "High risk detected (level 4)");
        assert!(alert.content.contains("precautions"));
        assert_eq!(alert.metadata.urgent_actions, result.analysis.urgent_actions);
        assert_eq!(alert.created_at, now());
    }

    #[test]
    fn test_level_five_message() {
        let result = result_at(RiskLevel::Severe);
        let alert = high_risk_alert("worker-7", &result, &AlertPolicy::default(), now()).unwrap();
        assert!(alert.content.starts_with("Critical risk"));
        assert_eq!(alert.metadata.primary_factors.len(), 4);
    }

    #[test]
    fn test_lowered_threshold() {
        let policy = AlertPolicy {
            min_level: RiskLevel::Moderate,
            priority: 3,
        };
        let alert = high_risk_alert("worker-7", &result_at(RiskLevel::Moderate), &policy, now())
            .unwrap();
        assert_eq!(alert.priority, 3);
        assert!(alert.content.starts_with("Elevated risk"));
    }

    #[test]
    fn test_policy_validate() {
        assert!(AlertPolicy::default().validate().is_ok());
        let bad = AlertPolicy {
            priority: 9,
            ..AlertPolicy::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_notification_json_shape() {
        let alert =
            high_risk_alert("worker-7", &result_at(RiskLevel::High), &AlertPolicy::default(), now())
                .unwrap();
        let value = serde_json::to_value(&alert).unwrap();
        assert_eq!(value["notificationType"], "safety_alert");
        assert_eq!(value["recipientId"], "worker-7");
        assert_eq!(value["metadata"]["riskLevel"], 4);
    }
}
