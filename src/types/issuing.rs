//! Issuing cards

use super::list::RangeQuery;
use super::{timestamp_to_datetime, Metadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStatus {
    Active,
    Canceled,
    Inactive,
    Lost,
    Pending,
    Stolen,
}

/// Why a card was replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardReplacementReason {
    Damage,
    Expiration,
    Loss,
    Theft,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Physical,
    Virtual,
}

/// The Issuing Card object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuingCard {
    pub id: String,
    /// Always `issuing.card`
    #[serde(default)]
    pub object: Option<String>,
    /// Spending rules; left undecoded
    #[serde(default)]
    pub authorization_controls: Option<Value>,
    #[serde(default)]
    pub brand: Option<String>,
    /// Cardholder object or id
    #[serde(default)]
    pub cardholder: Option<Value>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub exp_month: Option<u32>,
    #[serde(default)]
    pub exp_year: Option<u32>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub livemode: Option<bool>,
    #[serde(default)]
    pub metadata: Metadata,
    /// Name printed on the card
    #[serde(default)]
    pub name: Option<String>,
    /// Card id or expanded card this one replaces
    #[serde(default)]
    pub replacement_for: Option<Value>,
    #[serde(default)]
    pub replacement_reason: Option<CardReplacementReason>,
    #[serde(default)]
    pub shipping: Option<Value>,
    #[serde(default)]
    pub status: Option<CardStatus>,
    #[serde(default, rename = "type")]
    pub card_type: Option<CardType>,
}

impl IssuingCard {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.and_then(timestamp_to_datetime)
    }

    pub fn is_usable(&self) -> bool {
        self.status == Some(CardStatus::Active)
    }
}

/// Sensitive card details returned by `retrieveDetails`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(default)]
    pub object: Option<String>,
    pub card: IssuingCard,
    #[serde(default)]
    pub cvc: Option<String>,
    #[serde(default)]
    pub exp_month: Option<u32>,
    #[serde(default)]
    pub exp_year: Option<u32>,
    #[serde(default)]
    pub number: Option<String>,
}

/// Creates an Issuing Card object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuingCardCreateParams {
    pub currency: String,
    #[serde(rename = "type")]
    pub card_type: CardType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_controls: Option<Value>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_for: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replacement_reason: Option<CardReplacementReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
}

impl IssuingCardCreateParams {
    pub fn new(currency: impl Into<String>, card_type: CardType) -> Self {
        Self {
            currency: currency.into(),
            card_type,
            cardholder: None,
            authorization_controls: None,
            metadata: Metadata::new(),
            replacement_for: None,
            replacement_reason: None,
            shipping: None,
            status: None,
            expand: Vec::new(),
        }
    }
}

/// Updates an Issuing Card object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IssuingCardUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authorization_controls: Option<Value>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
}

/// Lists Issuing Card objects
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuingCardListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cardholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<RangeQuery>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_year: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ending_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CardStatus>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub card_type: Option<CardType>,
}
