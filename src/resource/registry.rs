//! Resource Registry - Load resource descriptors from JSON
//!
//! Descriptors for every API resource are embedded as JSON files and parsed
//! once into a read-only registry. Every descriptor is validated on load:
//! operation names are unique, base paths are constant and each operation's
//! `url_params` match the placeholders of its path template.

use super::template::placeholders;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/core.json"),
    include_str!("../resources/billing.json"),
    include_str!("../resources/connect.json"),
    include_str!("../resources/issuing.json"),
];

/// HTTP verbs used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    /// Returns `true` if request data travels in the body rather than the query.
    pub fn has_body(&self) -> bool {
        matches!(self, Self::Post)
    }

    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// Classification selecting default request and response shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodType {
    List,
    Create,
    Delete,
    Retrieve,
    Update,
}

impl MethodType {
    /// HTTP verb used when an operation does not name one.
    pub fn default_http_method(&self) -> HttpMethod {
        match self {
            Self::Create | Self::Update => HttpMethod::Post,
            Self::Retrieve | Self::List => HttpMethod::Get,
            Self::Delete => HttpMethod::Delete,
        }
    }

    /// Expected shape of a successful response.
    pub fn response_shape(&self) -> ResponseShape {
        match self {
            Self::List => ResponseShape::List,
            Self::Delete => ResponseShape::Deleted,
            Self::Create | Self::Retrieve | Self::Update => ResponseShape::Object,
        }
    }
}

/// Shape of a successful response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// A single API object.
    Object,
    /// A single object carrying `deleted: true`.
    Deleted,
    /// `{object: "list", data: [...], has_more: bool}`
    List,
}

impl ResponseShape {
    /// Check whether a decoded body has this shape.
    pub fn matches(&self, body: &Value) -> bool {
        let Some(obj) = body.as_object() else {
            return false;
        };
        match self {
            Self::Object => true,
            Self::Deleted => obj.get("deleted").and_then(|v| v.as_bool()) == Some(true),
            Self::List => {
                obj.get("object").and_then(|v| v.as_str()) == Some("list")
                    && obj.get("data").is_some_and(|v| v.is_array())
                    && obj.get("has_more").is_some_and(|v| v.is_boolean())
            }
        }
    }
}

/// Which server an operation talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Host {
    /// The main REST API, under `/v1/`.
    #[default]
    Api,
    /// The authorization service used by OAuth.
    Connect,
}

impl Host {
    /// Path prefix inserted between the host base URL and a resolved url.
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Self::Api => "/v1/",
            Self::Connect => "/",
        }
    }
}

/// One callable operation on a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationDef {
    pub name: String,
    pub method: HttpMethod,
    /// Path appended to the resource base path, with `{name}` placeholders.
    pub path: String,
    /// Placeholder names, in binding order.
    pub url_params: Vec<String>,
    pub method_type: Option<MethodType>,
}

impl OperationDef {
    /// Expected response shape; unclassified operations return an object.
    pub fn response_shape(&self) -> ResponseShape {
        self.method_type
            .map(|t| t.response_shape())
            .unwrap_or(ResponseShape::Object)
    }
}

/// A named group of operations sharing a base path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceDef {
    /// Registry key, e.g. `issuing_cards`.
    pub key: String,
    /// Constant base path, e.g. `issuing/cards`.
    pub path: String,
    pub host: Host,
    /// Operations in declaration order (basic operations first).
    pub operations: Vec<OperationDef>,
}

impl ResourceDef {
    /// Get an operation definition by name
    pub fn operation(&self, name: &str) -> Option<&OperationDef> {
        self.operations.iter().find(|op| op.name == name)
    }

    /// Names of all operations, in declaration order
    pub fn operation_names(&self) -> Vec<&str> {
        self.operations.iter().map(|op| op.name.as_str()).collect()
    }
}

/// Basic operations a resource may opt into with `include_basic`.
const BASIC_OPERATIONS: &[&str] = &["create", "list", "retrieve", "update", "del"];

fn basic_operation(name: &str) -> Option<OperationDef> {
    let (method_type, path) = match name {
        "create" => (MethodType::Create, ""),
        "list" => (MethodType::List, ""),
        "retrieve" => (MethodType::Retrieve, "/{id}"),
        "update" => (MethodType::Update, "/{id}"),
        "del" => (MethodType::Delete, "/{id}"),
        _ => return None,
    };

    Some(OperationDef {
        name: name.to_string(),
        method: method_type.default_http_method(),
        path: path.to_string(),
        url_params: placeholders(path).into_iter().map(String::from).collect(),
        method_type: Some(method_type),
    })
}

/// Operation entry as written in the JSON files
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperationEntry {
    #[serde(default)]
    method: Option<HttpMethod>,
    #[serde(default)]
    path: String,
    #[serde(default)]
    url_params: Vec<String>,
    #[serde(default)]
    method_type: Option<MethodType>,
}

/// Resource entry as written in the JSON files
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResourceEntry {
    path: String,
    #[serde(default)]
    host: Host,
    #[serde(default)]
    include_basic: Vec<String>,
    /// Kept as a raw map so declaration order survives.
    #[serde(default)]
    operations: Map<String, Value>,
}

/// Root structure of resources/*.json
#[derive(Debug, Deserialize)]
struct ResourceFile {
    #[serde(default)]
    resources: Map<String, Value>,
}

fn build_operation(resource: &str, name: &str, entry: OperationEntry) -> Result<OperationDef> {
    let method = match (entry.method, entry.method_type) {
        (Some(method), _) => method,
        (None, Some(method_type)) => method_type.default_http_method(),
        (None, None) => {
            return Err(Error::InvalidDefinition(format!(
                "{}.{}: neither method nor method_type given",
                resource, name
            )))
        }
    };

    let found: Vec<&str> = placeholders(&entry.path);
    if found != entry.url_params.iter().map(String::as_str).collect::<Vec<_>>() {
        return Err(Error::InvalidDefinition(format!(
            "{}.{}: url_params {:?} do not match placeholders {:?} in {}",
            resource, name, entry.url_params, found, entry.path
        )));
    }

    let mut seen = Vec::with_capacity(found.len());
    for param in &found {
        if seen.contains(param) {
            return Err(Error::InvalidDefinition(format!(
                "{}.{}: placeholder {{{}}} appears twice",
                resource, name, param
            )));
        }
        seen.push(*param);
    }

    Ok(OperationDef {
        name: name.to_string(),
        method,
        path: entry.path,
        url_params: entry.url_params,
        method_type: entry.method_type,
    })
}

fn build_resource(key: &str, entry: ResourceEntry) -> Result<ResourceDef> {
    if entry.path.contains('{') || entry.path.contains('}') {
        return Err(Error::InvalidDefinition(format!(
            "{}: base path {} must not be templated",
            key, entry.path
        )));
    }

    let mut operations: Vec<OperationDef> = Vec::new();
    let mut push = |op: OperationDef| -> Result<()> {
        if operations.iter().any(|existing| existing.name == op.name) {
            return Err(Error::InvalidDefinition(format!(
                "{}: duplicate operation {}",
                key, op.name
            )));
        }
        operations.push(op);
        Ok(())
    };

    for name in &entry.include_basic {
        let op = basic_operation(name).ok_or_else(|| {
            Error::InvalidDefinition(format!(
                "{}: unknown basic operation {} (expected one of {:?})",
                key, name, BASIC_OPERATIONS
            ))
        })?;
        push(op)?;
    }

    for (name, raw) in entry.operations {
        let op_entry: OperationEntry = serde_json::from_value(raw).map_err(|e| {
            Error::InvalidDefinition(format!("{}.{}: {}", key, name, e))
        })?;
        push(build_operation(key, &name, op_entry)?)?;
    }

    Ok(ResourceDef {
        key: key.to_string(),
        path: entry.path,
        host: entry.host,
        operations,
    })
}

/// Validated set of resource descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    resources: HashMap<String, ResourceDef>,
}

impl Registry {
    /// Parse and validate one or more descriptor documents.
    pub fn from_sources(sources: &[&str]) -> Result<Self> {
        let mut registry = Self::default();
        for content in sources {
            registry.extend_from_json(content)?;
        }
        Ok(registry)
    }

    /// Add the resources of one descriptor document.
    ///
    /// A resource key that is already registered is an error.
    pub fn extend_from_json(&mut self, content: &str) -> Result<()> {
        let file: ResourceFile = serde_json::from_str(content)
            .map_err(|e| Error::InvalidDefinition(format!("malformed descriptor JSON: {}", e)))?;

        for (key, raw) in file.resources {
            if self.resources.contains_key(&key) {
                return Err(Error::InvalidDefinition(format!("duplicate resource {}", key)));
            }
            let entry: ResourceEntry = serde_json::from_value(raw)
                .map_err(|e| Error::InvalidDefinition(format!("{}: {}", key, e)))?;
            let resource = build_resource(&key, entry)?;
            tracing::debug!(
                "Registered resource {} ({} operations)",
                key,
                resource.operations.len()
            );
            self.resources.insert(key, resource);
        }

        Ok(())
    }

    /// Get a resource definition by key
    pub fn get(&self, key: &str) -> Option<&ResourceDef> {
        self.resources.get(key)
    }

    /// Look up an operation, reporting which part was unknown.
    pub fn operation(&self, resource: &str, operation: &str) -> Result<(&ResourceDef, &OperationDef)> {
        let resource_def = self
            .get(resource)
            .ok_or_else(|| Error::UnknownResource(resource.to_string()))?;
        let op = resource_def
            .operation(operation)
            .ok_or_else(|| Error::UnknownOperation {
                resource: resource.to_string(),
                operation: operation.to_string(),
            })?;
        Ok((resource_def, op))
    }

    /// All resource keys, sorted
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.resources.keys().map(|s| s.as_str()).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Global registry loaded from the embedded JSON
static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();

/// Get the embedded registry (parsed on first access)
pub fn get_registry() -> Arc<Registry> {
    REGISTRY
        .get_or_init(|| {
            let registry = Registry::from_sources(RESOURCE_FILES)
                .unwrap_or_else(|e| panic!("Failed to load embedded resource JSON: {}", e));
            Arc::new(registry)
        })
        .clone()
}

/// Get an embedded resource definition by key
pub fn get_resource(key: &str) -> Option<ResourceDef> {
    get_registry().get(key).cloned()
}

/// Get all embedded resource keys (sorted)
pub fn get_all_resource_keys() -> Vec<String> {
    get_registry().keys().into_iter().map(String::from).collect()
}
