//! Form encoding for request data
//!
//! Nested objects and arrays are flattened with bracket notation
//! (`metadata[order_id]=6735`, `expand[0]=customer`). Brackets stay literal;
//! keys and values are otherwise percent-encoded.

use crate::error::{Error, Result};
use crate::resource::{Params, PathPart};
use serde_json::Value;

/// Encode params as `application/x-www-form-urlencoded`, keeping key order.
pub fn encode_form(params: &Params) -> String {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for (key, value) in params {
        flatten(key.clone(), value, &mut pairs);
    }

    pairs
        .iter()
        .map(|(key, value)| format!("{}={}", encode_key(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn flatten(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        // An empty value asks the API to unset the field
        Value::Null => out.push((prefix, String::new())),
        Value::Bool(b) => out.push((prefix, b.to_string())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                flatten(format!("{}[{}]", prefix, idx), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten(format!("{}[{}]", prefix, key), item, out);
            }
        }
    }
}

fn encode_key(key: &str) -> String {
    urlencoding::encode(key)
        .replace("%5B", "[")
        .replace("%5D", "]")
}

/// Percent-encode a resolved path.
///
/// Literal parts keep their `/` separators. Each bound value is encoded as a
/// single component, so `/`, `?` and `#` inside an id cannot change the
/// endpoint. Values that would form a `.` or `..` segment are rejected.
pub fn encode_path(parts: &[PathPart]) -> Result<String> {
    let mut encoded = String::new();
    for part in parts {
        match part {
            PathPart::Literal(text) => encoded.push_str(&encode_literal(text)),
            PathPart::Param { name, value } => {
                if value == "." || value == ".." {
                    return Err(Error::invalid_parameter(
                        name,
                        "must not be a relative path segment",
                    ));
                }
                encoded.push_str(&urlencoding::encode(value));
            }
        }
    }
    Ok(encoded)
}

fn encode_literal(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
