use serde::{Deserialize, Serialize};

/// Result of exchanging an authorization code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthToken {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub livemode: Option<bool>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub stripe_publishable_key: Option<String>,
    pub stripe_user_id: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Result of disconnecting an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthDeauthorization {
    pub stripe_user_id: String,
}
