//! HTTP transport for REST API calls

use super::encoding::{encode_form, encode_path};
use super::transport::{CallSettings, Transport};
use crate::config::ClientConfig;
use crate::error::{Error, RemoteApiError, Result};
use crate::resource::{Host, ResolvedRequest};
use async_trait::async_trait;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Header carrying the remote request id
const REQUEST_ID_HEADER: &str = "request-id";

/// Sanitize response body for logging
/// Truncates long responses and drops non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// reqwest-backed [`Transport`]
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
    connect_base: String,
}

impl HttpTransport {
    /// Create a transport for the hosts named in `config`
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(format!("stripe-methods/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_base: checked_base(config.base_url(Host::Api))?,
            connect_base: checked_base(config.base_url(Host::Connect))?,
        })
    }

    fn base(&self, host: Host) -> &str {
        match host {
            Host::Api => &self.api_base,
            Host::Connect => &self.connect_base,
        }
    }

    /// Full URL for a request; GET and DELETE data goes into the query string
    ///
    /// Fails with `InvalidParameter` when a bound value cannot be a path segment.
    pub fn build_url(&self, request: &ResolvedRequest) -> Result<String> {
        let mut url = format!(
            "{}{}{}",
            self.base(request.host),
            request.host.path_prefix(),
            encode_path(&request.path)?
        );

        if !request.method.has_body() {
            if let Some(data) = request.data.as_ref().filter(|d| !d.is_empty()) {
                url.push('?');
                url.push_str(&encode_form(data));
            }
        }

        Ok(url)
    }
}

/// Reject base URLs reqwest could not send to
fn checked_base(base: &str) -> Result<String> {
    let parsed = url::Url::parse(base)
        .map_err(|e| Error::Config(format!("invalid base URL {}: {}", base, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(Error::Config(format!("unsupported scheme in base URL {}", base)));
    }
    Ok(base.to_string())
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue)> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| Error::InvalidArguments(format!("invalid header name: {}", name)))?;
    let header_value = HeaderValue::from_str(value)
        .map_err(|_| Error::InvalidArguments(format!("invalid value for header {}", name)))?;
    Ok((header_name, header_value))
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ResolvedRequest, settings: CallSettings) -> Result<Value> {
        let Some(api_key) = settings.api_key else {
            return Err(Error::Config("no API key configured".to_string()));
        };

        let url = self.build_url(&request)?;
        tracing::debug!("{} {} (key {})", request.method, url, api_key.masked());

        let mut builder = self
            .client
            .request(request.method.to_reqwest(), &url)
            .bearer_auth(api_key.as_str())
            .timeout(settings.timeout);

        for (name, value) in &request.headers {
            let (name, value) = header_pair(name, value)?;
            builder = builder.header(name, value);
        }

        if request.method.has_body() {
            let body = request.data.as_ref().map(encode_form).unwrap_or_default();
            builder = builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            let payload = serde_json::from_str(&body).unwrap_or(Value::Null);
            return Err(RemoteApiError::from_response(status.as_u16(), payload, request_id).into());
        }

        // Handle empty response
        if body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| Error::Decode(e.to_string()))
    }
}
