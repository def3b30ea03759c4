//! Creative tools.
//!
//! Creatives are keyed by URN (`urn:li:sponsoredCreative:{id}`) and reference
//! an existing organization post as their content.

use super::input::{decode, require_id, require_range};
use super::posts::{post_urn, PostType};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::dates::epoch_millis_to_date;
use crate::types::urn::{self, bare_id, optional_bare_id};
use crate::types::{to_urn, Collection};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Most campaigns accepted by one creative search.
pub const MAX_CAMPAIGN_FILTER: usize = 100;

fn creatives_path(account_id: &str) -> String {
    format!("/adAccounts/{}/creatives", account_id)
}

/// Status a creative is asked to be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreativeStatus {
    Active,
    Paused,
    Draft,
    Archived,
    Canceled,
    PendingDeletion,
    Removed,
}

/// Status a creative may be created in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitialCreativeStatus {
    #[default]
    Active,
    Paused,
    Draft,
}

impl From<InitialCreativeStatus> for CreativeStatus {
    fn from(status: InitialCreativeStatus) -> Self {
        match status {
            InitialCreativeStatus::Active => Self::Active,
            InitialCreativeStatus::Paused => Self::Paused,
            InitialCreativeStatus::Draft => Self::Draft,
        }
    }
}

/// Arguments of `get_creatives`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetCreativesInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Only return creatives of these campaigns.
    #[serde(default)]
    #[schemars(length(max = 100))]
    pub campaign_ids: Vec<String>,
    /// Only return creatives in these statuses.
    #[serde(default)]
    pub statuses: Vec<CreativeStatus>,
    /// Creatives per page, 1 to 100 (default 100).
    #[schemars(range(min = 1, max = 100))]
    pub page_size: Option<u32>,
    /// `next_page_token` from a previous call.
    pub page_token: Option<String>,
}

/// Arguments addressing one creative.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreativeRef {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Numeric creative ID or sponsoredCreative URN.
    pub creative_id: String,
}

/// Arguments of `create_creative`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCreativeInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Campaign to attach the creative to.
    pub campaign_id: String,
    /// Numeric ID or URN of the post to sponsor.
    pub post_id: String,
    /// Kind of post when `post_id` is bare, `share` by default.
    #[serde(default)]
    pub post_type: PostType,
    /// Initial status, `ACTIVE` by default.
    #[serde(default)]
    pub intended_status: InitialCreativeStatus,
}

/// Arguments of `update_creative_status`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCreativeStatusInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Numeric creative ID or sponsoredCreative URN.
    pub creative_id: String,
    /// New status.
    pub intended_status: CreativeStatus,
}

#[derive(Debug, Default, Deserialize)]
struct CreativeContentRecord {
    #[serde(default)]
    reference: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreativeRecord {
    #[serde(deserialize_with = "bare_id")]
    id: String,
    #[serde(default, deserialize_with = "optional_bare_id")]
    campaign: Option<String>,
    #[serde(default)]
    intended_status: Option<String>,
    #[serde(default)]
    is_serving: Option<bool>,
    #[serde(default)]
    serving_hold_reasons: Vec<String>,
    #[serde(default)]
    content: Option<CreativeContentRecord>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    last_modified_at: Option<i64>,
}

/// Creative as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creative {
    /// Creative id.
    pub id: String,
    /// Campaign id.
    pub campaign_id: Option<String>,
    /// Requested status.
    pub intended_status: Option<String>,
    /// Whether the creative is currently eligible to serve.
    pub is_serving: Option<bool>,
    /// Why serving is held, if it is.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub serving_hold_reasons: Vec<String>,
    /// URN of the post used as content.
    pub content_reference: Option<String>,
    /// Creation day.
    pub created_at: Option<String>,
    /// Last modification day.
    pub last_modified_at: Option<String>,
}

impl From<CreativeRecord> for Creative {
    fn from(record: CreativeRecord) -> Self {
        Self {
            id: record.id,
            campaign_id: record.campaign,
            intended_status: record.intended_status,
            is_serving: record.is_serving,
            serving_hold_reasons: record.serving_hold_reasons,
            content_reference: record.content.and_then(|c| c.reference),
            created_at: record.created_at.and_then(epoch_millis_to_date),
            last_modified_at: record.last_modified_at.and_then(epoch_millis_to_date),
        }
    }
}

/// Result of `get_creatives`.
#[derive(Debug, Serialize)]
pub struct CreativeList {
    /// Matching creatives.
    pub creatives: Vec<Creative>,
    /// Number of creatives in this page.
    pub count: usize,
    /// Cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Result of a creative write.
#[derive(Debug, Serialize)]
pub struct CreativeChange {
    /// Creative id, when known.
    pub creative_id: Option<String>,
    /// Status sent.
    pub intended_status: CreativeStatus,
    /// Summary.
    pub message: String,
}

/// Lists creatives of an ad account.
pub async fn get_creatives(
    clients: Arc<ApiClients>,
    input: GetCreativesInput,
) -> LinkedInResult<CreativeList> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    if input.campaign_ids.len() > MAX_CAMPAIGN_FILTER {
        return Err(LinkedInError::validation(
            "campaign_ids",
            format!("at most {} campaigns can be filtered at once", MAX_CAMPAIGN_FILTER),
        ));
    }
    let campaigns = input
        .campaign_ids
        .iter()
        .map(|id| {
            require_id("campaign_ids", id, urn::SPONSORED_CAMPAIGN)
                .map(|id| to_urn(urn::SPONSORED_CAMPAIGN, &id))
        })
        .collect::<LinkedInResult<Vec<String>>>()?;
    let page_size = require_range("page_size", input.page_size.unwrap_or(100), 1, 100)?;

    let mut params = Map::new();
    if !campaigns.is_empty() {
        params.insert("campaigns".to_string(), json!(campaigns));
    }
    if !input.statuses.is_empty() {
        params.insert("intendedStatuses".to_string(), json!(input.statuses));
    }
    params.insert("pageSize".to_string(), json!(page_size));
    if let Some(token) = input.page_token {
        params.insert("pageToken".to_string(), Value::String(token));
    }

    let data = clients
        .marketing()
        .query(&creatives_path(&account_id), "criteria", Some(params))
        .await?;
    let collection: Collection<CreativeRecord> = decode("creative search", data)?;
    let next_page_token = collection.next_page_token();
    let creatives: Vec<Creative> = collection.elements.into_iter().map(Creative::from).collect();

    Ok(CreativeList {
        count: creatives.len(),
        creatives,
        next_page_token,
    })
}

/// Fetches one creative.
pub async fn get_creative(clients: Arc<ApiClients>, input: CreativeRef) -> LinkedInResult<Creative> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let creative_id = require_id("creative_id", &input.creative_id, urn::SPONSORED_CREATIVE)?;

    let data = clients
        .marketing()
        .fetch_one(
            &creatives_path(&account_id),
            &to_urn(urn::SPONSORED_CREATIVE, &creative_id),
        )
        .await?;
    let record: CreativeRecord = decode("creative", data)?;
    Ok(record.into())
}

/// Creates a creative from an existing post.
pub async fn create_creative(
    clients: Arc<ApiClients>,
    input: CreateCreativeInput,
) -> LinkedInResult<CreativeChange> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let campaign_id = require_id("campaign_id", &input.campaign_id, urn::SPONSORED_CAMPAIGN)?;
    let post = post_urn(&input.post_id, Some(input.post_type))?;
    let intended_status = CreativeStatus::from(input.intended_status);

    let mut entity = Map::new();
    entity.insert(
        "campaign".to_string(),
        json!(to_urn(urn::SPONSORED_CAMPAIGN, &campaign_id)),
    );
    entity.insert("content".to_string(), json!({ "reference": post }));
    entity.insert("intendedStatus".to_string(), json!(intended_status));

    let created = clients
        .marketing()
        .create(&creatives_path(&account_id), entity)
        .await?;

    Ok(CreativeChange {
        creative_id: created.id.as_deref().map(urn::extract_id),
        intended_status,
        message: format!("Creative created in campaign {}", campaign_id),
    })
}

/// Changes the intended status of a creative.
pub async fn update_creative_status(
    clients: Arc<ApiClients>,
    input: UpdateCreativeStatusInput,
) -> LinkedInResult<CreativeChange> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let creative_id = require_id("creative_id", &input.creative_id, urn::SPONSORED_CREATIVE)?;

    let mut fields = Map::new();
    fields.insert("intendedStatus".to_string(), json!(input.intended_status));

    clients
        .marketing()
        .patch(
            &creatives_path(&account_id),
            &to_urn(urn::SPONSORED_CREATIVE, &creative_id),
            fields,
        )
        .await?;

    Ok(CreativeChange {
        message: format!("Creative {} updated", creative_id),
        creative_id: Some(creative_id),
        intended_status: input.intended_status,
    })
}

/// Creative tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_creatives",
            "List creatives in an ad account, optionally filtered by campaign and status.",
            get_creatives,
        ),
        Tool::new(
            "get_creative",
            "Get a single creative and its serving state.",
            get_creative,
        ),
        Tool::new(
            "create_creative",
            "Create a sponsored content creative from an existing organization post.",
            create_creative,
        ),
        Tool::new(
            "update_creative_status",
            "Activate, pause or archive a creative.",
            update_creative_status,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockTransport;
    use crate::transport::{RestliMethod, RestliResponse};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn search_by_campaign_and_status() {
        let mock = MockTransport::new().with_json(json!({
            "elements": [{
                "id": "urn:li:sponsoredCreative:555",
                "campaign": "urn:li:sponsoredCampaign:42",
                "intendedStatus": "ACTIVE",
                "isServing": true,
                "content": {"reference": "urn:li:share:9"},
                "createdAt": 1_705_276_800_000_i64
            }]
        }));
        let input: GetCreativesInput = serde_json::from_value(json!({
            "account_id": "5123",
            "campaign_ids": ["42"],
            "statuses": ["ACTIVE"]
        }))
        .unwrap();

        let result = get_creatives(mock.api_clients(), input).await.unwrap();

        assert_eq!(
            result.creatives[0],
            Creative {
                id: "555".to_string(),
                campaign_id: Some("42".to_string()),
                intended_status: Some("ACTIVE".to_string()),
                is_serving: Some(true),
                serving_hold_reasons: vec![],
                content_reference: Some("urn:li:share:9".to_string()),
                created_at: Some("2024-01-15".to_string()),
                last_modified_at: None,
            }
        );
        let request = mock.last_request().unwrap();
        assert_eq!(request.finder(), Some("criteria"));
        assert_eq!(request.query_params["campaigns"], json!(["urn:li:sponsoredCampaign:42"]));
        assert_eq!(request.query_params["intendedStatuses"], json!(["ACTIVE"]));
    }

    #[tokio::test]
    async fn creative_keys_are_urns() {
        let mock = MockTransport::new().with_json(json!({"id": "urn:li:sponsoredCreative:555"}));
        let input = CreativeRef {
            account_id: "5123".to_string(),
            creative_id: "555".to_string(),
        };

        get_creative(mock.api_clients(), input).await.unwrap();

        assert_eq!(
            mock.last_request().unwrap().resource_path,
            "/adAccounts/5123/creatives/urn%3Ali%3AsponsoredCreative%3A555"
        );
    }

    #[tokio::test]
    async fn create_references_post() {
        let mock = MockTransport::new()
            .with_response(RestliResponse::created("urn:li:sponsoredCreative:777"));
        let input: CreateCreativeInput = serde_json::from_value(json!({
            "account_id": "5123",
            "campaign_id": "42",
            "post_id": "9",
            "post_type": "ugcPost"
        }))
        .unwrap();

        let result = create_creative(mock.api_clients(), input).await.unwrap();

        assert_eq!(result.creative_id.as_deref(), Some("777"));
        assert_eq!(result.intended_status, CreativeStatus::Active);
        let body = mock.last_request().unwrap().body.unwrap();
        assert_eq!(body["content"]["reference"], json!("urn:li:ugcPost:9"));
        assert_eq!(body["campaign"], json!("urn:li:sponsoredCampaign:42"));
    }

    #[tokio::test]
    async fn status_update_is_partial() {
        let mock = MockTransport::new().with_response(RestliResponse::no_content());
        let input: UpdateCreativeStatusInput = serde_json::from_value(json!({
            "account_id": "5123",
            "creative_id": "555",
            "intended_status": "PAUSED"
        }))
        .unwrap();

        update_creative_status(mock.api_clients(), input).await.unwrap();

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, RestliMethod::PartialUpdate);
        assert_eq!(request.body, Some(json!({"$set": {"intendedStatus": "PAUSED"}})));
    }

    #[tokio::test]
    async fn create_accepts_post_urn() {
        let mock = MockTransport::new()
            .with_response(RestliResponse::created("urn:li:sponsoredCreative:778"));
        let input: CreateCreativeInput = serde_json::from_value(json!({
            "account_id": "5123",
            "campaign_id": "urn:li:sponsoredCampaign:42",
            "post_id": "urn:li:ugcPost:9",
            "intended_status": "PAUSED"
        }))
        .unwrap();

        let result = create_creative(mock.api_clients(), input).await.unwrap();

        assert_eq!(result.intended_status, CreativeStatus::Paused);
        let body = mock.last_request().unwrap().body.unwrap();
        assert_eq!(body["content"]["reference"], json!("urn:li:ugcPost:9"));
        assert_eq!(body["intendedStatus"], json!("PAUSED"));
    }

    #[test]
    fn create_status_is_limited_to_launch_states() {
        let parsed: Result<CreateCreativeInput, _> = serde_json::from_value(json!({
            "account_id": "1",
            "campaign_id": "2",
            "post_id": "3",
            "intended_status": "REMOVED"
        }));
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn campaign_filter_rejects_other_urns() {
        let mock = MockTransport::new();
        let input: GetCreativesInput = serde_json::from_value(json!({
            "account_id": "5123",
            "campaign_ids": ["42", "urn:li:sponsoredCreative:7"]
        }))
        .unwrap();

        let err = get_creatives(mock.api_clients(), input).await.unwrap_err();

        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "campaign_ids"));
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn unknown_status_rejected() {
        let parsed: Result<UpdateCreativeStatusInput, _> = serde_json::from_value(json!({
            "account_id": "1",
            "creative_id": "2",
            "intended_status": "LIVE"
        }));
        assert!(parsed.is_err());
    }
}
