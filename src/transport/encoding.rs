//! Rest.li 2.0 URL encoding.
//!
//! Objects become `(key:value,...)`, arrays become `List(a,b)`, and scalar
//! strings are percent-encoded including the Rest.li reserved characters
//! `(`, `)`, `,`, `:` and `'`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Characters escaped inside Rest.li values: everything except unreserved.
const RESTLI_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

fn escape(raw: &str) -> String {
    utf8_percent_encode(raw, RESTLI_ESCAPE).to_string()
}

/// Encodes a JSON value with Rest.li 2.0 rules.
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => escape(s),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(encode_value).collect();
            format!("List({})", inner.join(","))
        }
        Value::Object(fields) => {
            let inner: Vec<String> = fields
                .iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| format!("{}:{}", escape(k), encode_value(v)))
                .collect();
            format!("({})", inner.join(","))
        }
    }
}

/// Encodes an entity key for use as a path segment.
///
/// Numeric ids pass through; URNs have their colons escaped.
pub fn encode_entity_key(key: &str) -> String {
    escape(key)
}

/// Builds a query string (without leading `?`) from Rest.li parameters.
///
/// Null parameters are skipped.
pub fn encode_query(params: &Map<String, Value>) -> String {
    params
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| format!("{}={}", escape(k), encode_value(v)))
        .collect::<Vec<_>>()
        .join("&")
}
