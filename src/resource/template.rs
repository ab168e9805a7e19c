//! URL Template Resolver
//!
//! Substitutes positional call arguments into `{name}` placeholders of an
//! operation's path template.

use crate::error::{Error, Result};
use serde_json::Value;

/// Extract placeholder names from a template, left to right.
///
/// Unterminated braces are ignored.
pub fn placeholders(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        let Some(end) = after.find('}') else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() {
            names.push(name);
        }
        rest = &after[end + 1..];
    }

    names
}

/// Convert a positional argument into a path segment.
///
/// Strings are kept exactly as given (no trimming); numbers stringify.
/// Anything else is not an identifier.
pub fn param_to_segment(name: &str, value: Option<&Value>) -> Result<String> {
    match value {
        None => Err(Error::invalid_parameter(name, "missing required argument")),
        Some(Value::String(s)) if s.is_empty() => {
            Err(Error::invalid_parameter(name, "must be a non-empty string"))
        }
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Null) => Err(Error::invalid_parameter(name, "must not be null")),
        Some(other) => Err(Error::invalid_parameter(
            name,
            format!("expected an identifier, got {}", value_kind(other)),
        )),
    }
}

/// One piece of a resolved path.
///
/// Literals come from descriptors; params are caller values kept verbatim so
/// the transport can encode each one as a single path component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathPart {
    Literal(String),
    Param { name: String, value: String },
}

impl PathPart {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) => text,
            Self::Param { value, .. } => value,
        }
    }
}

/// Join parts back into the unencoded path.
pub fn join_parts(parts: &[PathPart]) -> String {
    parts.iter().map(PathPart::as_str).collect()
}

/// Split a template into literal and bound parts, binding `values` to
/// `names` in order.
///
/// The template is walked once, left to right; bound values are never
/// searched again, so a value containing `{...}` text stays as given.
pub fn resolve_parts(template: &str, names: &[String], values: &[String]) -> Result<Vec<PathPart>> {
    let mut parts = Vec::with_capacity(names.len() * 2 + 1);
    let mut rest = template;

    for (idx, name) in names.iter().enumerate() {
        let Some(value) = values.get(idx) else {
            return Err(Error::invalid_parameter(name, "missing required argument"));
        };
        if value.is_empty() {
            return Err(Error::invalid_parameter(name, "must be a non-empty string"));
        }

        let placeholder = format!("{{{}}}", name);
        let Some(pos) = rest.find(&placeholder) else {
            return Err(Error::InvalidDefinition(format!(
                "placeholder {} not found in template {}",
                placeholder, template
            )));
        };
        if pos > 0 {
            parts.push(PathPart::Literal(rest[..pos].to_string()));
        }
        parts.push(PathPart::Param {
            name: name.clone(),
            value: value.clone(),
        });
        rest = &rest[pos + placeholder.len()..];
    }

    if !rest.is_empty() {
        parts.push(PathPart::Literal(rest.to_string()));
    }

    Ok(parts)
}

/// Resolve a template by binding `values` to `names` in order.
///
/// Each value replaces the next occurrence of its `{name}` in the template.
pub fn resolve(template: &str, names: &[String], values: &[String]) -> Result<String> {
    Ok(join_parts(&resolve_parts(template, names, values)?))
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
