//! Argument decoding and output rendering shared by all tools.

use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::urn::Urn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Decodes tool arguments into `T`.
///
/// Missing arguments are treated as an empty object. Decoding failures become
/// validation errors naming the field when serde reports one.
pub fn parse_input<T: DeserializeOwned>(args: Value) -> LinkedInResult<T> {
    let args = match args {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };

    serde_json::from_value(args).map_err(|e| {
        let message = e.to_string();
        match field_of(&message) {
            Some(field) => LinkedInError::validation(field, message),
            None => LinkedInError::invalid(message),
        }
    })
}

// serde names the field in backticks for missing and unknown fields only.
fn field_of(message: &str) -> Option<String> {
    if !(message.starts_with("missing field") || message.starts_with("unknown field")) {
        return None;
    }
    let start = message.find('`')? + 1;
    let len = message[start..].find('`')?;
    Some(message[start..start + len].to_string())
}

/// Requires a bare decimal id.
pub fn require_numeric_id(field: &str, value: &str) -> LinkedInResult<()> {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        Err(LinkedInError::validation(
            field,
            format!("'{}' is not a numeric ID", value),
        ))
    }
}

/// Resolves an id argument to its bare decimal form.
///
/// Accepts a bare decimal id or a `urn:li:{entity_type}:{id}` URN. A URN of any
/// other entity type is rejected instead of being stripped to its id.
pub fn require_id(field: &str, value: &str, entity_type: &str) -> LinkedInResult<String> {
    let id = match value.parse::<Urn>() {
        Ok(urn) if urn.namespace() == "li" && urn.entity_type() == entity_type => urn.id().to_string(),
        Ok(urn) => {
            return Err(LinkedInError::validation(
                field,
                format!(
                    "expected a numeric ID or urn:li:{} URN, got {}",
                    entity_type, urn
                ),
            ))
        }
        Err(_) => value.to_string(),
    };
    require_numeric_id(field, &id)?;
    Ok(id)
}

/// Requires `value` to lie within `min..=max`.
pub(crate) fn require_range(field: &str, value: u32, min: u32, max: u32) -> LinkedInResult<u32> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(LinkedInError::validation(
            field,
            format!("must be between {} and {}", min, max),
        ))
    }
}

/// Requires a non-blank string no longer than `max` characters.
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> LinkedInResult<()> {
    let len = value.chars().count();
    if value.trim().is_empty() {
        Err(LinkedInError::validation(field, "must not be empty"))
    } else if len > max {
        Err(LinkedInError::validation(
            field,
            format!("must be at most {} characters (got {})", max, len),
        ))
    } else {
        Ok(())
    }
}

/// Decodes a LinkedIn response into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(what: &str, data: Value) -> LinkedInResult<T> {
    serde_json::from_value(data).map_err(|e| LinkedInError::unexpected_response(what, e))
}

/// Renders a tool result as two-space indented JSON.
pub fn format_output<T: Serialize + ?Sized>(output: &T) -> LinkedInResult<String> {
    serde_json::to_string_pretty(output).map_err(|e| LinkedInError::Transport {
        message: format!("could not render tool output: {}", e),
    })
}

/// Rest.li `search` parameter filtering on status values.
pub(crate) fn status_search<S: Serialize>(statuses: &[S]) -> Option<Value> {
    if statuses.is_empty() {
        return None;
    }
    Some(serde_json::json!({ "status": { "values": statuses } }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Args {
        #[allow(dead_code)]
        account_id: String,
    }

    #[test]
    fn missing_field_is_named() {
        let err = parse_input::<Args>(json!({})).unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "account_id"));
    }

    #[test]
    fn unknown_field_is_named() {
        let err = parse_input::<Args>(json!({"account_id": "1", "extra": 2})).unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "extra"));
    }

    #[test]
    fn type_errors_have_no_field() {
        let err = parse_input::<Args>(json!({"account_id": 5})).unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: None, .. }));
    }

    #[test]
    fn numeric_ids() {
        assert!(require_numeric_id("account_id", "5123").is_ok());
        assert!(require_numeric_id("account_id", "").is_err());
        assert!(require_numeric_id("account_id", "12a").is_err());
    }

    #[test]
    fn typed_ids_accept_matching_urns_only() {
        assert_eq!(require_id("account_id", "5123", "sponsoredAccount").unwrap(), "5123");
        assert_eq!(
            require_id("account_id", "urn:li:sponsoredAccount:5123", "sponsoredAccount").unwrap(),
            "5123"
        );

        let err = require_id("account_id", "urn:li:sponsoredCampaign:5", "sponsoredAccount").unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "account_id"));
        assert!(require_id("account_id", "urn:li:sponsoredAccount:abc", "sponsoredAccount").is_err());
    }

    #[test]
    fn output_is_pretty_printed() {
        assert_eq!(format_output(&json!({"a": 1})).unwrap(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn text_limits() {
        assert!(require_text("text", "  ", 10).is_err());
        assert!(require_text("text", "hello", 3).is_err());
        assert!(require_text("text", "hé", 2).is_ok());
    }
}
