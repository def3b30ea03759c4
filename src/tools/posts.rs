//! Organization post tools.
//!
//! Posts are keyed by `urn:li:share:{id}` or `urn:li:ugcPost:{id}` and use the
//! community credential when one is configured.

use super::input::{decode, require_id, require_numeric_id, require_range, require_text};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::dates::epoch_millis_to_date;
use crate::types::urn::{self, optional_bare_id, Urn};
use crate::types::{to_urn, Collection, Paging};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map};
use std::sync::Arc;

const POSTS: &str = "/posts";

/// Longest post commentary LinkedIn accepts.
pub const MAX_POST_LENGTH: usize = 3000;

/// Kind of post an id refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum PostType {
    #[default]
    #[serde(rename = "share")]
    Share,
    #[serde(rename = "ugcPost")]
    UgcPost,
}

impl PostType {
    /// URN entity type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::UgcPost => "ugcPost",
        }
    }

    /// Builds the post URN for `id`.
    pub fn urn(self, id: &str) -> String {
        to_urn(self.as_str(), id)
    }

    fn from_entity_type(entity_type: &str) -> Option<Self> {
        match entity_type {
            "share" => Some(Self::Share),
            "ugcPost" => Some(Self::UgcPost),
            _ => None,
        }
    }
}

/// Resolves a bare id or post URN into the post URN.
///
/// A URN input wins over `post_type`.
pub(crate) fn post_urn(post_id: &str, post_type: Option<PostType>) -> LinkedInResult<String> {
    if let Ok(parsed) = post_id.parse::<Urn>() {
        return match PostType::from_entity_type(parsed.entity_type()) {
            Some(kind) => {
                require_numeric_id("post_id", parsed.id())?;
                Ok(kind.urn(parsed.id()))
            }
            None => Err(LinkedInError::validation(
                "post_id",
                format!("'{}' is not a share or ugcPost URN", post_id),
            )),
        };
    }

    require_numeric_id("post_id", post_id)?;
    Ok(post_type.unwrap_or_default().urn(post_id))
}

/// Who can see a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Visibility {
    #[default]
    Public,
    Connections,
    LoggedIn,
}

/// Arguments of `create_post`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreatePostInput {
    /// Numeric organization ID or organization URN.
    pub organization_id: String,
    /// Post text, 1 to 3000 characters.
    #[schemars(length(min = 1, max = 3000))]
    pub text: String,
    /// Audience, `PUBLIC` by default.
    #[serde(default)]
    pub visibility: Visibility,
}

/// Arguments of `get_posts`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetPostsInput {
    /// Numeric organization ID or organization URN.
    pub organization_id: String,
    /// Posts per page, 1 to 100 (default 10).
    #[schemars(range(min = 1, max = 100))]
    pub count: Option<u32>,
    /// Offset of the first post.
    pub start: Option<u32>,
}

/// Arguments addressing one post.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PostRef {
    /// Numeric post ID or share/ugcPost URN.
    pub post_id: String,
    /// Kind of post when `post_id` is bare, `share` by default.
    pub post_type: Option<PostType>,
}

/// Arguments of `update_post`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePostInput {
    /// Numeric post ID or share/ugcPost URN.
    pub post_id: String,
    /// Kind of post when `post_id` is bare, `share` by default.
    pub post_type: Option<PostType>,
    /// New text, 1 to 3000 characters.
    #[schemars(length(min = 1, max = 3000))]
    pub text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PostRecord {
    id: String,
    #[serde(default, deserialize_with = "optional_bare_id")]
    author: Option<String>,
    #[serde(default)]
    commentary: Option<String>,
    #[serde(default)]
    visibility: Option<String>,
    #[serde(default)]
    lifecycle_state: Option<String>,
    #[serde(default)]
    created_at: Option<i64>,
    #[serde(default)]
    published_at: Option<i64>,
    #[serde(default)]
    last_modified_at: Option<i64>,
}

/// Post as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    /// Bare post id.
    pub id: String,
    /// `share` or `ugcPost`.
    pub post_type: Option<String>,
    /// Full post URN.
    pub urn: String,
    /// Author organization id.
    pub organization_id: Option<String>,
    /// Post text.
    pub text: Option<String>,
    /// Audience.
    pub visibility: Option<String>,
    /// `PUBLISHED`, `DRAFT`, ...
    pub lifecycle_state: Option<String>,
    /// Creation day.
    pub created_at: Option<String>,
    /// Publication day.
    pub published_at: Option<String>,
    /// Last modification day.
    pub last_modified_at: Option<String>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        let parsed = record.id.parse::<Urn>().ok();
        Self {
            id: parsed
                .as_ref()
                .map(|u| u.id().to_string())
                .unwrap_or_else(|| record.id.clone()),
            post_type: parsed.as_ref().map(|u| u.entity_type().to_string()),
            urn: record.id,
            organization_id: record.author,
            text: record.commentary,
            visibility: record.visibility,
            lifecycle_state: record.lifecycle_state,
            created_at: record.created_at.and_then(epoch_millis_to_date),
            published_at: record.published_at.and_then(epoch_millis_to_date),
            last_modified_at: record.last_modified_at.and_then(epoch_millis_to_date),
        }
    }
}

/// Result of `get_posts`.
#[derive(Debug, Serialize)]
pub struct PostList {
    /// Posts, newest first.
    pub posts: Vec<Post>,
    /// Number of posts in this page.
    pub count: usize,
    /// Paging metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

/// Result of a post write.
#[derive(Debug, Serialize)]
pub struct PostChange {
    /// Bare post id, when known.
    pub post_id: Option<String>,
    /// Full post URN, when known.
    pub post_urn: Option<String>,
    /// Summary.
    pub message: String,
}

/// Publishes a text post as an organization.
pub async fn create_post(clients: Arc<ApiClients>, input: CreatePostInput) -> LinkedInResult<PostChange> {
    let organization_id = require_id("organization_id", &input.organization_id, urn::ORGANIZATION)?;
    require_text("text", &input.text, MAX_POST_LENGTH)?;

    let mut entity = Map::new();
    entity.insert(
        "author".to_string(),
        json!(to_urn(urn::ORGANIZATION, &organization_id)),
    );
    entity.insert("commentary".to_string(), json!(input.text));
    entity.insert("visibility".to_string(), json!(input.visibility));
    entity.insert(
        "distribution".to_string(),
        json!({
            "feedDistribution": "MAIN_FEED",
            "targetEntities": [],
            "thirdPartyDistributionChannels": []
        }),
    );
    entity.insert("lifecycleState".to_string(), json!("PUBLISHED"));
    entity.insert("isReshareDisabledByAuthor".to_string(), json!(false));

    let created = clients.community().create(POSTS, entity).await?;

    Ok(PostChange {
        post_id: created.id.as_deref().map(urn::extract_id),
        post_urn: created.id,
        message: format!("Post published for organization {}", organization_id),
    })
}

/// Lists posts authored by an organization.
pub async fn get_posts(clients: Arc<ApiClients>, input: GetPostsInput) -> LinkedInResult<PostList> {
    let organization_id = require_id("organization_id", &input.organization_id, urn::ORGANIZATION)?;
    let count = require_range("count", input.count.unwrap_or(10), 1, 100)?;

    let mut params = Map::new();
    params.insert(
        "author".to_string(),
        json!(to_urn(urn::ORGANIZATION, &organization_id)),
    );
    params.insert("count".to_string(), json!(count));
    params.insert("start".to_string(), json!(input.start.unwrap_or(0)));
    params.insert("sortBy".to_string(), json!("LAST_MODIFIED"));

    let data = clients.community().query(POSTS, "author", Some(params)).await?;
    let collection: Collection<PostRecord> = decode("post search", data)?;
    let posts: Vec<Post> = collection.elements.into_iter().map(Post::from).collect();

    Ok(PostList {
        count: posts.len(),
        posts,
        paging: collection.paging,
    })
}

/// Fetches one post.
pub async fn get_post(clients: Arc<ApiClients>, input: PostRef) -> LinkedInResult<Post> {
    let key = post_urn(&input.post_id, input.post_type)?;

    let data = clients.community().fetch_one(POSTS, &key).await?;
    let record: PostRecord = decode("post", data)?;
    Ok(record.into())
}

/// Replaces the text of a post.
pub async fn update_post(clients: Arc<ApiClients>, input: UpdatePostInput) -> LinkedInResult<PostChange> {
    let key = post_urn(&input.post_id, input.post_type)?;
    require_text("text", &input.text, MAX_POST_LENGTH)?;

    let mut fields = Map::new();
    fields.insert("commentary".to_string(), json!(input.text));
    clients.community().patch(POSTS, &key, fields).await?;

    Ok(PostChange {
        post_id: Some(urn::extract_id(&key)),
        message: format!("Post {} updated", key),
        post_urn: Some(key),
    })
}

/// Deletes a post.
pub async fn delete_post(clients: Arc<ApiClients>, input: PostRef) -> LinkedInResult<PostChange> {
    let key = post_urn(&input.post_id, input.post_type)?;

    clients.community().remove(POSTS, &key).await?;

    Ok(PostChange {
        post_id: Some(urn::extract_id(&key)),
        message: format!("Post {} deleted", key),
        post_urn: Some(key),
    })
}

/// Post tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "create_post",
            "Publish a text post on a LinkedIn organization page.",
            create_post,
        ),
        Tool::new(
            "get_posts",
            "List recent posts of a LinkedIn organization page.",
            get_posts,
        ),
        Tool::new("get_post", "Get a single organization post.", get_post),
        Tool::new(
            "update_post",
            "Replace the text of an organization post.",
            update_post,
        ),
        Tool::new("delete_post", "Delete an organization post.", delete_post),
    ]
}
