//! Method Factory
//!
//! Binds one operation of a resource descriptor and turns call arguments
//! into a [`ResolvedRequest`]. Request building is a pure function,
//! [`build_request`]; [`Method`] adds the client so the request can be sent.
//!
//! Method type defaulting:
//!
//! | method type | payload when omitted | response            |
//! |-------------|----------------------|---------------------|
//! | create      | empty body           | object              |
//! | retrieve    | none                 | object              |
//! | update      | empty body           | object              |
//! | delete      | none                 | `deleted: true`     |
//! | list        | empty filter set     | list envelope       |

use super::args::{classify, Call, CallArg, Params, RequestOptions};
use super::registry::{Host, HttpMethod, MethodType, OperationDef, ResourceDef};
use super::template::{join_parts, resolve_parts, PathPart};
use crate::api::client::ApiClient;
use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const IDEMPOTENCY_KEY_HEADER: &str = "Idempotency-Key";
pub const API_VERSION_HEADER: &str = "Stripe-Version";

/// A request ready for the transport. Built fresh for every call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequest {
    pub method: HttpMethod,
    pub host: Host,
    /// Base path plus substituted template, e.g. `subscription_schedules/sub_123/cancel`
    pub url: String,
    /// `url` split into descriptor literals and bound values, for encoding.
    #[serde(skip)]
    pub path: Vec<PathPart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Params>,
    pub headers: BTreeMap<String, String>,
    /// Call options, merged with the client configuration at send time.
    pub options: RequestOptions,
}

/// Apply the method type's payload default.
pub fn default_payload(method_type: Option<MethodType>, payload: Option<Params>) -> Option<Params> {
    match method_type {
        Some(MethodType::List) | Some(MethodType::Create) | Some(MethodType::Update) => {
            Some(payload.unwrap_or_default())
        }
        Some(MethodType::Retrieve) | Some(MethodType::Delete) | None => payload,
    }
}

/// Headers derived from call options. Named options win over extra headers.
pub fn headers_for(options: &RequestOptions) -> BTreeMap<String, String> {
    let mut headers = options.headers.clone();
    if let Some(key) = &options.idempotency_key {
        headers.insert(IDEMPOTENCY_KEY_HEADER.to_string(), key.clone());
    }
    if let Some(version) = &options.api_version {
        headers.insert(API_VERSION_HEADER.to_string(), version.clone());
    }
    headers
}

/// Build the request for one operation call.
///
/// Fails with `InvalidParameter` before anything is sent when a url
/// parameter is missing or empty.
pub fn build_request(resource: &ResourceDef, op: &OperationDef, call: Call) -> Result<ResolvedRequest> {
    call.check_arity(op)?;
    let mut path = vec![PathPart::Literal(resource.path.clone())];
    path.extend(resolve_parts(&op.path, &op.url_params, &call.url_params)?);

    Ok(ResolvedRequest {
        method: op.method,
        host: resource.host,
        url: join_parts(&path),
        path,
        data: default_payload(op.method_type, call.payload),
        headers: headers_for(&call.options),
        options: call.options,
    })
}

/// A callable operation bound to a client.
#[derive(Clone, Copy)]
pub struct Method<'a> {
    client: &'a ApiClient,
    resource: &'a ResourceDef,
    op: &'a OperationDef,
}

impl<'a> Method<'a> {
    pub(crate) fn new(client: &'a ApiClient, resource: &'a ResourceDef, op: &'a OperationDef) -> Self {
        Self {
            client,
            resource,
            op,
        }
    }

    pub fn resource(&self) -> &'a ResourceDef {
        self.resource
    }

    pub fn operation(&self) -> &'a OperationDef {
        self.op
    }

    /// Build the request without sending it.
    pub fn prepare(&self, call: Call) -> Result<ResolvedRequest> {
        build_request(self.resource, self.op, call)
    }

    /// Call with explicitly named arguments.
    pub async fn call(&self, call: Call) -> Result<Value> {
        let request = self.prepare(call)?;
        tracing::info!(
            "dispatch: {}.{} -> {} {}",
            self.resource.key,
            self.op.name,
            request.method,
            request.url
        );
        self.client.execute(request, self.op.response_shape()).await
    }

    /// Call and decode the response into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, call: Call) -> Result<T> {
        let body = self.call(call).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Call with positional arguments classified by shape.
    ///
    /// A trailing completion callback receives the outcome before it is
    /// returned. Classification failures are returned without invoking it.
    pub async fn call_args(&self, args: Vec<CallArg>) -> Result<Value> {
        let (call, completion) = classify(self.op, args)?;
        let result = self.call(call).await;
        if let Some(done) = completion {
            done(&result);
        }
        result
    }
}
