//! 3-D Secure authentication objects

use super::timestamp_to_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The ThreeDSecure object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeDSecure {
    pub id: String,
    /// Always `three_d_secure`
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub amount: Option<i64>,
    /// True if the cardholder went through the authentication flow and their
    /// bank indicated that authentication succeeded
    #[serde(default)]
    pub authenticated: Option<bool>,
    /// Card object; left undecoded
    #[serde(default)]
    pub card: Option<Value>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub livemode: Option<bool>,
    /// Where to send the cardholder for authentication, if anywhere
    #[serde(default)]
    pub redirect_url: Option<String>,
    /// `redirect_pending`, `succeeded` or `failed`
    #[serde(default)]
    pub status: Option<String>,
}

impl ThreeDSecure {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created.and_then(timestamp_to_datetime)
    }

    pub fn is_redirect_pending(&self) -> bool {
        self.status.as_deref() == Some("redirect_pending")
    }
}

/// Initiate 3-D Secure authentication
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeDSecureCreateParams {
    /// Amount of the charge created once authentication completes
    pub amount: i64,
    /// Card token id, or the id of a card belonging to `customer`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<String>,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
    /// Where the cardholder's browser returns after authentication
    pub return_url: String,
}

/// Retrieve a 3-D Secure object
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreeDSecureRetrieveParams {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expand: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_three_d_secure() {
        let tds: ThreeDSecure = serde_json::from_value(json!({
            "id": "tdsrc_1",
            "object": "three_d_secure",
            "amount": 1099,
            "authenticated": false,
            "created": 1573000000,
            "currency": "eur",
            "livemode": false,
            "redirect_url": null,
            "status": "redirect_pending"
        }))
        .unwrap();

        assert!(tds.is_redirect_pending());
        assert!(tds.redirect_url.is_none());
        assert!(tds.created_at().is_some());
    }

    #[test]
    fn test_create_params_skip_unset() {
        let params = ThreeDSecureCreateParams {
            amount: 1099,
            currency: "eur".to_string(),
            return_url: "https://example.com/return".to_string(),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"amount": 1099, "currency": "eur", "return_url": "https://example.com/return"})
        );
    }
}
