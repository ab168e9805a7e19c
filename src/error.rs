//! Error types for resource method dispatch.
//!
//! Structural errors ([`Error::InvalidParameter`], [`Error::InvalidArguments`])
//! are raised before any request leaves the process. Remote and network
//! failures come back from the transport as a single [`Error::RemoteApi`] or
//! [`Error::Network`] value.

use serde_json::Value;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for all dispatch operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// A required URL placeholder had no value, or the value was empty or
    /// not usable as an identifier.
    #[error("Invalid parameter `{param}`: {reason}")]
    InvalidParameter {
        /// Placeholder name from the operation's `url_params`.
        param: String,
        /// What was wrong with the supplied value.
        reason: String,
    },

    /// Trailing call arguments could not be classified unambiguously.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The remote API answered with a failure.
    #[error(transparent)]
    RemoteApi(#[from] RemoteApiError),

    /// The request failed before any response was received.
    #[error("Network error: {0}")]
    Network(String),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Unknown resource: {0}")]
    UnknownResource(String),

    #[error("Unknown operation `{operation}` on resource `{resource}`")]
    UnknownOperation { resource: String, operation: String },

    /// A resource descriptor violates a registry invariant.
    #[error("Invalid resource definition: {0}")]
    InvalidDefinition(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn invalid_parameter(param: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns `true` for errors raised before the transport was called.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::InvalidParameter { .. }
                | Self::InvalidArguments(_)
                | Self::UnknownResource(_)
                | Self::UnknownOperation { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Classification of a remote failure.
///
/// Derived from the `error.type` field of the response body when present,
/// falling back to the HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Authentication,
    Permission,
    RateLimit,
    InvalidRequest,
    Card,
    Idempotency,
    Api,
    Unknown,
}

impl RemoteErrorKind {
    /// Classify a failure from the remote error type and HTTP status.
    pub fn classify(status: u16, error_type: Option<&str>) -> Self {
        // Status codes that carry their own meaning win over the body type
        match status {
            401 => return Self::Authentication,
            403 => return Self::Permission,
            429 => return Self::RateLimit,
            _ => {}
        }

        match error_type {
            Some("card_error") => Self::Card,
            Some("idempotency_error") => Self::Idempotency,
            Some("invalid_request_error") => Self::InvalidRequest,
            Some("authentication_error") => Self::Authentication,
            Some("rate_limit_error") => Self::RateLimit,
            Some("api_error") => Self::Api,
            _ if (400..500).contains(&status) => Self::InvalidRequest,
            _ if status >= 500 => Self::Api,
            _ => Self::Unknown,
        }
    }
}

/// Failure reported by the remote API, with its payload kept verbatim.
#[derive(Debug, Clone, Error)]
#[error("API request failed ({status}, {kind:?}): {message}")]
pub struct RemoteApiError {
    pub status: u16,
    pub kind: RemoteErrorKind,
    /// `error.message` from the body, or the status text.
    pub message: String,
    /// Remote error code such as `resource_missing`, when supplied.
    pub code: Option<String>,
    /// Parameter the remote API blamed, when supplied.
    pub param: Option<String>,
    /// Request id header returned with the failure.
    pub request_id: Option<String>,
    /// The decoded response body, unchanged.
    pub payload: Value,
}

impl RemoteApiError {
    /// Build from a status code and a decoded response body.
    pub fn from_response(status: u16, payload: Value, request_id: Option<String>) -> Self {
        let error = payload.get("error");
        let field = |name: &str| {
            error
                .and_then(|e| e.get(name))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
        };

        let kind = RemoteErrorKind::classify(status, field("type").as_deref());
        let message = field("message").unwrap_or_else(|| format!("HTTP {}", status));

        Self {
            status,
            kind,
            message,
            code: field("code"),
            param: field("param"),
            request_id,
            payload,
        }
    }
}

/// Format an error for display to a terminal user.
///
/// Remote failures are reduced to a generic message per class so raw API
/// payloads are not echoed; structural errors are shown as-is.
pub fn format_api_error(error: &Error) -> String {
    match error {
        Error::RemoteApi(remote) => match remote.kind {
            RemoteErrorKind::Authentication => {
                "Authentication failed. Check your API key.".to_string()
            }
            RemoteErrorKind::Permission => {
                "Permission denied for this API key.".to_string()
            }
            RemoteErrorKind::RateLimit => {
                "Rate limit exceeded. Please try again later.".to_string()
            }
            RemoteErrorKind::Api => {
                "Stripe API temporarily unavailable. Please try again.".to_string()
            }
            RemoteErrorKind::Card
            | RemoteErrorKind::InvalidRequest
            | RemoteErrorKind::Idempotency
            | RemoteErrorKind::Unknown => remote.message.clone(),
        },
        Error::Network(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        other => other.to_string(),
    }
}
