//! Response decoding.
//!
//! Extracts zero or more record mappings from a response body according to
//! the stream's extraction rule. Decoding never coerces: a body that does
//! not match the rule is a hard error that aborts the stream's iteration.

use serde_json::Value;
use serde_json_path::JsonPath;

use crate::{catalog::Extraction, error::Error};

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Extracts the record sequence from a response body.
///
/// # Errors
///
/// Returns [`Error::Decode`] when a direct-key field is absent or not an
/// array, when a whole-body response is not an array, or when a path query
/// cannot be parsed.
pub fn extract_records(
    stream: &str,
    body: &Value,
    rule: &Extraction,
) -> Result<Vec<Value>, Error> {
    match rule {
        Extraction::DirectKey(field) => match body.get(field) {
            Some(Value::Array(items)) => Ok(items.clone()),
            Some(other) => Err(Error::decode(
                stream,
                format!("field '{field}' is {}, expected an array", value_kind(other)),
            )),
            None => Err(Error::decode(
                stream,
                format!("expected top-level field '{field}' is absent"),
            )),
        },
        Extraction::WholeBody => match body {
            Value::Array(items) => Ok(items.clone()),
            other => Err(Error::decode(
                stream,
                format!("body is {}, expected an array", value_kind(other)),
            )),
        },
        Extraction::PathQuery(query) => {
            let path = JsonPath::parse(query).map_err(|e| {
                Error::decode(stream, format!("invalid path query '{query}': {e}"))
            })?;
            Ok(path.query(body).all().into_iter().cloned().collect())
        }
    }
}
