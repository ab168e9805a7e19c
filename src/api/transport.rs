//! Transport seam
//!
//! The dispatcher hands every [`ResolvedRequest`] to a [`Transport`]. The
//! transport owns encoding, authentication and the network; it returns the
//! decoded body or a single failure.

use super::auth::ApiKey;
use crate::error::Result;
use crate::resource::ResolvedRequest;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Effective per-call settings: client defaults merged with call options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSettings {
    pub api_key: Option<ApiKey>,
    pub timeout: Duration,
    pub max_network_retries: u32,
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one request/response exchange.
    async fn send(&self, request: ResolvedRequest, settings: CallSettings) -> Result<Value>;
}
