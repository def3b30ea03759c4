//! Rest.li partial-update patch sets.

use crate::errors::{LinkedInError, LinkedInResult};
use serde_json::{Map, Value};

const SET: &str = "$set";
const DELETE: &str = "$delete";

/// Builds the patch document sent inside `{"patch": ...}`.
///
/// Plain keys land in the top-level `$set`. Dotted keys address nested records,
/// so `runSchedule.end` becomes `{"runSchedule": {"$set": {"end": ...}}}`.
/// A `null` value removes the field through `$delete`.
///
/// ```
/// use linkedin_marketing_tools::client::build_patch_set;
/// use serde_json::json;
///
/// let fields = json!({"name": "Spring", "runSchedule.end": 1706745600000_i64});
/// let patch = build_patch_set(fields.as_object().unwrap()).unwrap();
/// assert_eq!(
///     patch,
///     json!({
///         "$set": {"name": "Spring"},
///         "runSchedule": {"$set": {"end": 1706745600000_i64}}
///     })
/// );
/// ```
pub fn build_patch_set(fields: &Map<String, Value>) -> LinkedInResult<Value> {
    if fields.is_empty() {
        return Err(LinkedInError::invalid("at least one field must be updated"));
    }

    let mut root = Map::new();
    for (path, value) in fields {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(LinkedInError::invalid(format!(
                "'{}' is not a valid field path",
                path
            )));
        }

        let (leaf, parents) = match segments.split_last() {
            Some(split) => split,
            None => continue,
        };

        let mut node = &mut root;
        for parent in parents {
            node = child_object(node, parent, path)?;
        }

        if value.is_null() {
            let deletes = node
                .entry(DELETE)
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(list) = deletes {
                list.push(Value::String((*leaf).to_string()));
            }
        } else {
            child_object(node, SET, path)?.insert((*leaf).to_string(), value.clone());
        }
    }

    Ok(Value::Object(root))
}

fn child_object<'a>(
    node: &'a mut Map<String, Value>,
    key: &str,
    path: &str,
) -> LinkedInResult<&'a mut Map<String, Value>> {
    match node
        .entry(key)
        .or_insert_with(|| Value::Object(Map::new()))
    {
        Value::Object(map) => Ok(map),
        _ => Err(LinkedInError::invalid(format!(
            "'{}' conflicts with another updated field",
            path
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn patch(fields: Value) -> LinkedInResult<Value> {
        build_patch_set(fields.as_object().unwrap())
    }

    #[test]
    fn plain_fields_go_to_top_level_set() {
        assert_eq!(
            patch(json!({"status": "PAUSED", "name": "Q1"})).unwrap(),
            json!({"$set": {"name": "Q1", "status": "PAUSED"}})
        );
    }

    #[test]
    fn dotted_fields_nest() {
        assert_eq!(
            patch(json!({
                "dailyBudget": {"amount": "10.00", "currencyCode": "USD"},
                "runSchedule.end": 1_706_745_600_000_i64
            }))
            .unwrap(),
            json!({
                "$set": {"dailyBudget": {"amount": "10.00", "currencyCode": "USD"}},
                "runSchedule": {"$set": {"end": 1_706_745_600_000_i64}}
            })
        );
    }

    #[test]
    fn deep_paths_and_deletes() {
        assert_eq!(
            patch(json!({"a.b.c": 1, "a.b.d": null})).unwrap(),
            json!({"a": {"b": {"$set": {"c": 1}, "$delete": ["d"]}}})
        );
    }

    #[test]
    fn empty_patch_rejected() {
        assert!(matches!(
            patch(json!({})),
            Err(LinkedInError::Validation { .. })
        ));
    }

    #[test]
    fn malformed_paths_rejected() {
        assert!(patch(json!({"runSchedule.": 1})).is_err());
        assert!(patch(json!({".end": 1})).is_err());
    }
}
