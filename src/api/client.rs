//! API Client
//!
//! Main client for calling resource operations, combining configuration,
//! the resource registry and a transport.

use super::http::HttpTransport;
use super::transport::{CallSettings, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::resource::{
    get_registry, Call, HttpMethod, Method, Registry, RequestOptions, ResolvedRequest,
    ResponseShape, API_VERSION_HEADER, IDEMPOTENCY_KEY_HEADER,
};
use serde_json::Value;
use std::sync::Arc;

/// Main API client. Cheap to clone; clones share configuration and transport.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    registry: Arc<Registry>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    /// Create a client using the HTTP transport and embedded resources
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create a client that sends through a custom transport
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            config: Arc::new(config),
            registry: get_registry(),
            transport,
        }
    }

    /// Replace the resource registry (e.g. embedded plus user descriptors)
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bind an operation of a resource
    pub fn method(&self, resource: &str, operation: &str) -> Result<Method<'_>> {
        let (resource_def, op) = self.registry.operation(resource, operation)?;
        Ok(Method::new(self, resource_def, op))
    }

    /// Look up and call an operation in one step
    pub async fn invoke(&self, resource: &str, operation: &str, call: Call) -> Result<Value> {
        self.method(resource, operation)?.call(call).await
    }

    /// Merge the configuration snapshot with per-call options
    pub fn settings_for(&self, options: &RequestOptions) -> CallSettings {
        CallSettings {
            api_key: options
                .api_key
                .clone()
                .or_else(|| self.config.api_key.clone()),
            timeout: options
                .timeout
                .map(std::time::Duration::from_millis)
                .unwrap_or_else(|| self.config.timeout()),
            max_network_retries: options
                .max_network_retries
                .unwrap_or(self.config.max_network_retries),
        }
    }

    /// Send a resolved request through the transport
    ///
    /// The response body is returned unchanged; a shape mismatch is only logged.
    pub async fn execute(&self, mut request: ResolvedRequest, shape: ResponseShape) -> Result<Value> {
        let settings = self.settings_for(&request.options);

        if let Some(version) = &self.config.api_version {
            request
                .headers
                .entry(API_VERSION_HEADER.to_string())
                .or_insert_with(|| version.clone());
        }

        // A retried write must carry the same key as the first attempt
        if request.method == HttpMethod::Post
            && settings.max_network_retries > 0
            && !request.headers.contains_key(IDEMPOTENCY_KEY_HEADER)
        {
            let key = uuid::Uuid::new_v4().to_string();
            tracing::debug!("Generated idempotency key {} for {}", key, request.url);
            request.headers.insert(IDEMPOTENCY_KEY_HEADER.to_string(), key);
        }

        tracing::debug!(
            "{} {} (host={:?}, timeout={:?})",
            request.method,
            request.url,
            request.host,
            settings.timeout
        );

        let url = request.url.clone();
        let body = self.transport.send(request, settings).await?;

        if !shape.matches(&body) {
            tracing::debug!("Response for {} does not look like {:?}", url, shape);
        }

        Ok(body)
    }

    /// Fail early when no API key is available for a call
    pub fn require_api_key(&self, options: &RequestOptions) -> Result<()> {
        if options.api_key.is_none() && self.config.api_key.is_none() {
            return Err(Error::Config(format!(
                "no API key configured; set {} or pass api_key in call options",
                crate::config::ENV_API_KEY
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("resources", &self.registry.len())
            .finish()
    }
}
