//! LinkedIn URNs (`urn:li:{type}:{id}`).

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Entity type of an ad account.
pub const SPONSORED_ACCOUNT: &str = "sponsoredAccount";
/// Entity type of a campaign.
pub const SPONSORED_CAMPAIGN: &str = "sponsoredCampaign";
/// Entity type of a campaign group.
pub const SPONSORED_CAMPAIGN_GROUP: &str = "sponsoredCampaignGroup";
/// Entity type of a creative.
pub const SPONSORED_CREATIVE: &str = "sponsoredCreative";
/// Entity type of an organization.
pub const ORGANIZATION: &str = "organization";
/// Entity type of a targeting facet.
pub const AD_TARGETING_FACET: &str = "adTargetingFacet";
/// Entity type of a geographic location.
pub const GEO: &str = "geo";

/// A parsed `urn:{namespace}:{type}:{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Urn {
    namespace: String,
    entity_type: String,
    id: String,
}

impl Urn {
    /// Creates a `urn:li:` URN.
    pub fn li(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            namespace: "li".to_string(),
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Namespace (`li`).
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Entity type, e.g. `sponsoredAccount`.
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Trailing id segment.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Urn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "urn:{}:{}:{}", self.namespace, self.entity_type, self.id)
    }
}

/// Error returned when a string is not a URN.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a URN: {0}")]
pub struct UrnParseError(pub String);

impl FromStr for Urn {
    type Err = UrnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // The id may itself contain colons (e.g. tuple keys), so split at most 4 ways.
        let mut parts = s.splitn(4, ':');
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some("urn"), Some(ns), Some(ty), Some(id))
                if !ns.is_empty() && !ty.is_empty() && !id.is_empty() =>
            {
                Ok(Self {
                    namespace: ns.to_string(),
                    entity_type: ty.to_string(),
                    id: id.to_string(),
                })
            }
            _ => Err(UrnParseError(s.to_string())),
        }
    }
}

/// Builds `urn:li:{entity_type}:{id}`.
pub fn to_urn(entity_type: &str, id: &str) -> String {
    Urn::li(entity_type, id).to_string()
}

/// Extracts the trailing id from a URN; non-URN input is returned unchanged.
pub fn extract_id(value: &str) -> String {
    value
        .parse::<Urn>()
        .map(|urn| urn.id)
        .unwrap_or_else(|_| value.to_string())
}

/// Deserializes a numeric id, numeric string or URN from a LinkedIn response
/// into a bare id string.
///
/// The URN's entity type is not checked. Tool arguments go through
/// [`crate::tools::require_id`] instead.
pub fn bare_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(extract_id(&s)),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected an id or URN, found {}",
            other
        ))),
    }
}

/// Optional variant of [`bare_id`].
pub fn optional_bare_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(extract_id(&s))),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected an id or URN, found {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_account_urn() {
        let urn = to_urn(SPONSORED_ACCOUNT, "123456");
        assert_eq!(urn, "urn:li:sponsoredAccount:123456");
        assert_eq!(extract_id(&urn), "123456");
    }

    #[test]
    fn parses_parts() {
        let urn: Urn = "urn:li:geo:103644278".parse().unwrap();
        assert_eq!(urn.namespace(), "li");
        assert_eq!(urn.entity_type(), "geo");
        assert_eq!(urn.id(), "103644278");
    }

    #[test]
    fn rejects_non_urns() {
        assert!("123".parse::<Urn>().is_err());
        assert!("urn:li:share".parse::<Urn>().is_err());
        assert_eq!(extract_id("123"), "123");
    }

    #[test]
    fn bare_id_accepts_numbers_and_urns() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(deserialize_with = "bare_id")]
            id: String,
        }

        let numeric: Row = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        let urn: Row = serde_json::from_str(r#"{"id": "urn:li:sponsoredCreative:7"}"#).unwrap();
        assert_eq!(numeric.id, "42");
        assert_eq!(urn.id, "7");
    }
}
