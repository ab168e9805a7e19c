//! Argument Classifier
//!
//! Two ways to supply call arguments:
//!
//! - [`Call`]: url parameters, payload and options as distinct named fields.
//!   Nothing has to be inferred, so the only structural failure is a url
//!   parameter count mismatch.
//! - A positional list of [`CallArg`]s, for callers that only have dynamic
//!   values (the CLI, JSON-driven scripts). The first values bind to the
//!   operation's `url_params`; trailing values are sorted into payload,
//!   options and completion callback by their shape.

use super::registry::OperationDef;
use super::template::{param_to_segment, value_kind};
use crate::api::auth::ApiKey;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Request payload: filters for list operations, body fields otherwise.
pub type Params = Map<String, Value>;

/// Keys recognized in a per-call options object.
pub const OPTION_KEYS: &[&str] = &[
    "api_key",
    "idempotency_key",
    "headers",
    "api_version",
    "max_network_retries",
    "timeout",
];

/// Per-call overrides of the client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequestOptions {
    /// Never serialized, so dry-run output cannot leak it.
    #[serde(default, skip_serializing)]
    pub api_key: Option<ApiKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// Extra headers sent verbatim.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_network_retries: Option<u32>,
    /// Request timeout in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_key(mut self, key: impl Into<ApiKey>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_max_network_retries(mut self, retries: u32) -> Self {
        self.max_network_retries = Some(retries);
        self
    }

    pub fn with_timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// `true` for a non-empty object whose keys are all recognized option keys.
    pub fn is_options_shape(value: &Value) -> bool {
        match value {
            Value::Object(map) => {
                !map.is_empty() && map.keys().all(|k| OPTION_KEYS.contains(&k.as_str()))
            }
            _ => false,
        }
    }

    /// Decode an options-shaped value.
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| Error::InvalidArguments(format!("malformed call options: {}", e)))
    }
}

/// Explicitly named call arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Call {
    /// Values bound to the operation's `url_params`, in order.
    pub url_params: Vec<String>,
    pub payload: Option<Params>,
    pub options: RequestOptions,
}

impl Call {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a call bound to the given url parameter values.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            url_params: ids.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append one url parameter value.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.url_params.push(id.into());
        self
    }

    pub fn payload(mut self, payload: Params) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Serialize typed params into the payload.
    ///
    /// The params must serialize to a JSON object.
    pub fn params<T: Serialize>(self, params: &T) -> Result<Self> {
        match serde_json::to_value(params)? {
            Value::Object(map) => Ok(self.payload(map)),
            other => Err(Error::InvalidArguments(format!(
                "params must serialize to an object, got {}",
                value_kind(&other)
            ))),
        }
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Check the url parameter count against an operation.
    pub fn check_arity(&self, op: &OperationDef) -> Result<()> {
        if let Some(missing) = op.url_params.get(self.url_params.len()) {
            return Err(Error::invalid_parameter(missing, "missing required argument"));
        }
        if self.url_params.len() > op.url_params.len() {
            return Err(Error::InvalidArguments(format!(
                "{} takes {} url parameter(s), got {}",
                op.name,
                op.url_params.len(),
                self.url_params.len()
            )));
        }
        Ok(())
    }
}

/// Callback receiving the outcome of a positional call.
pub type Completion = Box<dyn FnOnce(&Result<Value>) + Send + 'static>;

/// One positional call argument.
pub enum CallArg {
    Value(Value),
    /// Typed options, never mistaken for payload.
    Options(RequestOptions),
    /// Completion callback; only valid as the last argument.
    Callback(Completion),
}

impl CallArg {
    pub fn callback<F>(f: F) -> Self
    where
        F: FnOnce(&Result<Value>) + Send + 'static,
    {
        Self::Callback(Box::new(f))
    }
}

impl fmt::Debug for CallArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Options(o) => f.debug_tuple("Options").field(o).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl From<Value> for CallArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&str> for CallArg {
    fn from(value: &str) -> Self {
        Self::Value(Value::String(value.to_string()))
    }
}

impl From<String> for CallArg {
    fn from(value: String) -> Self {
        Self::Value(Value::String(value))
    }
}

impl From<Params> for CallArg {
    fn from(value: Params) -> Self {
        Self::Value(Value::Object(value))
    }
}

impl From<RequestOptions> for CallArg {
    fn from(value: RequestOptions) -> Self {
        Self::Options(value)
    }
}

/// Sort positional arguments into a [`Call`] and an optional completion.
pub fn classify(op: &OperationDef, args: Vec<CallArg>) -> Result<(Call, Option<Completion>)> {
    let mut args = args.into_iter();
    let mut url_params = Vec::with_capacity(op.url_params.len());

    for name in &op.url_params {
        match args.next() {
            Some(CallArg::Value(value)) => url_params.push(param_to_segment(name, Some(&value))?),
            Some(CallArg::Options(_)) | Some(CallArg::Callback(_)) => {
                return Err(Error::invalid_parameter(
                    name,
                    "expected an identifier, got call options or a callback",
                ))
            }
            None => return Err(Error::invalid_parameter(name, "missing required argument")),
        }
    }

    let mut trailing: Vec<CallArg> = args.collect();
    let completion = match trailing.pop() {
        Some(CallArg::Callback(f)) => Some(f),
        Some(other) => {
            trailing.push(other);
            None
        }
        None => None,
    };

    let mut payload: Option<Params> = None;
    let mut options: Option<RequestOptions> = None;

    for arg in trailing {
        let value = match arg {
            CallArg::Callback(_) => {
                return Err(Error::InvalidArguments(
                    "a completion callback must be the last argument".to_string(),
                ))
            }
            CallArg::Options(opts) => {
                set_options(&mut options, opts)?;
                continue;
            }
            CallArg::Value(value) => value,
        };

        if RequestOptions::is_options_shape(&value) {
            set_options(&mut options, RequestOptions::from_value(value)?)?;
            continue;
        }

        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(Error::InvalidArguments(format!(
                    "{}: payload must be an object, got {}",
                    op.name,
                    value_kind(&other)
                )))
            }
        };
        if options.is_some() {
            return Err(Error::InvalidArguments(format!(
                "{}: payload must come before call options",
                op.name
            )));
        }
        if payload.is_some() {
            return Err(Error::InvalidArguments(format!(
                "{}: ambiguous arguments, more than one payload object",
                op.name
            )));
        }
        payload = Some(map);
    }

    if completion.is_some() && options.is_some() {
        return Err(Error::InvalidArguments(format!(
            "{}: a completion callback cannot be combined with call options",
            op.name
        )));
    }

    let call = Call {
        url_params,
        payload,
        options: options.unwrap_or_default(),
    };
    Ok((call, completion))
}

fn set_options(slot: &mut Option<RequestOptions>, options: RequestOptions) -> Result<()> {
    if slot.is_some() {
        return Err(Error::InvalidArguments(
            "call options supplied more than once".to_string(),
        ));
    }
    *slot = Some(options);
    Ok(())
}
