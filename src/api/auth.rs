//! API key handling
//!
//! Keys are sent as bearer credentials by the HTTP transport. They are
//! redacted in `Debug` output and in logs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of trailing characters left visible when masking a key
const VISIBLE_SUFFIX: usize = 4;

/// Secret or restricted API key
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keys issued for test mode carry a `_test_` segment
    pub fn is_test_mode(&self) -> bool {
        self.0.starts_with("sk_test_") || self.0.starts_with("rk_test_")
    }

    /// Key with everything but its prefix and last characters hidden,
    /// e.g. `sk_test_****1234`
    pub fn masked(&self) -> String {
        let prefix_len = self
            .0
            .match_indices('_')
            .nth(1)
            .map(|(idx, _)| idx + 1)
            .unwrap_or(0);
        let chars: Vec<char> = self.0.chars().collect();
        if chars.len() < prefix_len + VISIBLE_SUFFIX * 2 {
            return "****".to_string();
        }
        let suffix: String = chars[chars.len() - VISIBLE_SUFFIX..].iter().collect();
        format!("{}****{}", &self.0[..prefix_len], suffix)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ApiKey").field(&self.masked()).finish()
    }
}

impl From<&str> for ApiKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ApiKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
