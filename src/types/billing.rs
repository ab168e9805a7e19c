//! Recipients and subscription schedules

use super::{timestamp_to_datetime, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The Recipient object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `individual` or `corporation`
    #[serde(default, rename = "type")]
    pub recipient_type: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub livemode: Option<bool>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionScheduleStatus {
    NotStarted,
    Active,
    Completed,
    Released,
    Canceled,
    #[serde(other)]
    Unknown,
}

/// The SubscriptionSchedule object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionSchedule {
    pub id: String,
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub status: Option<SubscriptionScheduleStatus>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub canceled_at: Option<i64>,
    #[serde(default)]
    pub released_at: Option<i64>,
    /// `cancel`, `none` or `release`
    #[serde(default)]
    pub end_behavior: Option<String>,
    #[serde(default)]
    pub livemode: Option<bool>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl SubscriptionSchedule {
    pub fn canceled_at(&self) -> Option<DateTime<Utc>> {
        self.canceled_at.and_then(timestamp_to_datetime)
    }

    /// Canceled and released schedules no longer drive the subscription
    pub fn is_finished(&self) -> bool {
        matches!(
            self.status,
            Some(SubscriptionScheduleStatus::Canceled)
                | Some(SubscriptionScheduleStatus::Released)
                | Some(SubscriptionScheduleStatus::Completed)
        )
    }
}
