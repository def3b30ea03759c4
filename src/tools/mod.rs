//! Agent-facing tools.
//!
//! Each capability module contributes a list of [`Tool`]s. A tool validates its
//! JSON arguments, calls LinkedIn through [`ApiClients`] and returns the
//! formatted result as pretty-printed JSON.

pub mod accounts;
pub mod analytics;
pub mod campaigns;
pub mod creatives;
mod input;
pub mod organizations;
pub mod posts;
pub mod targeting;

pub use input::{format_output, parse_input, require_id, require_numeric_id};

use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use futures::future::BoxFuture;
use schemars::gen::SchemaSettings;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a tool handler.
pub type ToolFuture = BoxFuture<'static, LinkedInResult<String>>;

/// Type-erased tool handler.
pub type ToolHandler = Arc<dyn Fn(Value, Arc<ApiClients>) -> ToolFuture + Send + Sync>;

/// A named operation exposed to the agent.
#[derive(Clone)]
pub struct Tool {
    name: &'static str,
    description: &'static str,
    input_schema: Value,
    handler: ToolHandler,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// JSON Schema of an argument type, with nested types inlined.
pub fn input_schema_for<I: JsonSchema>() -> Value {
    let root = SchemaSettings::draft07()
        .with(|settings| settings.inline_subschemas = true)
        .into_generator()
        .into_root_schema_for::<I>();
    serde_json::to_value(root.schema).unwrap_or_else(|_| json!({"type": "object"}))
}

impl Tool {
    /// Creates a tool from a typed handler.
    ///
    /// The advertised input schema is generated from `I`, and arguments are
    /// decoded into `I` before `handler` runs. The handler's output is
    /// rendered with [`format_output`].
    pub fn new<I, O, F, Fut>(name: &'static str, description: &'static str, handler: F) -> Self
    where
        I: DeserializeOwned + JsonSchema + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(Arc<ApiClients>, I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LinkedInResult<O>> + Send + 'static,
    {
        let handler: ToolHandler = Arc::new(move |args: Value, clients: Arc<ApiClients>| {
            let call = parse_input::<I>(args).map(|input| handler(clients, input));
            Box::pin(async move {
                let output = call?.await?;
                format_output(&output)
            }) as ToolFuture
        });

        Self {
            name,
            description,
            input_schema: input_schema_for::<I>(),
            handler,
        }
    }

    /// Tool name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &'static str {
        self.description
    }

    /// JSON Schema of the arguments.
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Listing entry as advertised to the agent.
    pub fn definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema,
        })
    }

    /// Runs the tool.
    pub fn call(&self, args: Value, clients: Arc<ApiClients>) -> ToolFuture {
        (self.handler)(args, clients)
    }
}

/// Ordered set of tools addressable by name.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Tool>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every LinkedIn tool registered.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        for tool in accounts::tools()
            .into_iter()
            .chain(campaigns::tools())
            .chain(creatives::tools())
            .chain(targeting::tools())
            .chain(analytics::tools())
            .chain(posts::tools())
            .chain(organizations::tools())
        {
            registry.register(tool);
        }
        registry
    }

    /// Registers a tool. A tool with the same name is replaced.
    pub fn register(&mut self, tool: Tool) {
        match self.index.get(tool.name) {
            Some(&position) => {
                tracing::warn!(tool = tool.name, "Replacing registered tool");
                self.tools[position] = tool;
            }
            None => {
                self.index.insert(tool.name, self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    /// Tools in registration order.
    pub fn list(&self) -> &[Tool] {
        &self.tools
    }

    /// Looks up a tool by name.
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.index.get(name).map(|&position| &self.tools[position])
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Calls a tool by name.
    pub async fn call(
        &self,
        name: &str,
        args: Value,
        clients: Arc<ApiClients>,
    ) -> LinkedInResult<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| LinkedInError::invalid(format!("Unknown tool: {}", name)))?;

        tracing::debug!(tool = name, "Calling tool");
        tool.call(args, clients).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockTransport;

    #[test]
    fn default_tools_are_unique_and_described() {
        let registry = ToolRegistry::with_default_tools();
        assert_eq!(registry.len(), 25);

        for tool in registry.list() {
            assert!(!tool.description().is_empty(), "{} has no description", tool.name());
            assert_eq!(tool.input_schema()["type"], "object", "{}", tool.name());
            assert!(registry.get(tool.name()).is_some());
        }
    }

    #[test]
    fn register_replaces_same_name() {
        let mut registry = ToolRegistry::new();
        let make = |description| {
            Tool::new("echo", description, |_clients, input: Value| async move { Ok(input) })
        };
        registry.register(make("first"));
        registry.register(make("second"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("echo").unwrap().description(), "second");
    }

    #[test]
    fn advertised_schemas_match_input_types() {
        let expected = vec![
            ("get_ad_accounts", input_schema_for::<accounts::GetAdAccountsInput>()),
            ("get_ad_account", input_schema_for::<accounts::GetAdAccountInput>()),
            ("get_campaigns", input_schema_for::<campaigns::GetCampaignsInput>()),
            ("get_campaign", input_schema_for::<campaigns::CampaignRef>()),
            ("create_campaign", input_schema_for::<campaigns::CreateCampaignInput>()),
            ("update_campaign", input_schema_for::<campaigns::UpdateCampaignInput>()),
            ("delete_campaign", input_schema_for::<campaigns::CampaignRef>()),
            ("get_creatives", input_schema_for::<creatives::GetCreativesInput>()),
            ("get_creative", input_schema_for::<creatives::CreativeRef>()),
            ("create_creative", input_schema_for::<creatives::CreateCreativeInput>()),
            (
                "update_creative_status",
                input_schema_for::<creatives::UpdateCreativeStatusInput>(),
            ),
            (
                "get_targeting_facets",
                input_schema_for::<targeting::GetTargetingFacetsInput>(),
            ),
            (
                "search_targeting_entities",
                input_schema_for::<targeting::SearchTargetingEntitiesInput>(),
            ),
            (
                "estimate_audience_size",
                input_schema_for::<targeting::EstimateAudienceInput>(),
            ),
            (
                "get_campaign_analytics",
                input_schema_for::<analytics::CampaignAnalyticsInput>(),
            ),
            (
                "get_account_analytics",
                input_schema_for::<analytics::AccountAnalyticsInput>(),
            ),
            ("create_post", input_schema_for::<posts::CreatePostInput>()),
            ("get_posts", input_schema_for::<posts::GetPostsInput>()),
            ("get_post", input_schema_for::<posts::PostRef>()),
            ("update_post", input_schema_for::<posts::UpdatePostInput>()),
            ("delete_post", input_schema_for::<posts::PostRef>()),
            (
                "get_organization",
                input_schema_for::<organizations::GetOrganizationInput>(),
            ),
            (
                "get_organization_follower_statistics",
                input_schema_for::<organizations::StatisticsInput>(),
            ),
            (
                "get_organization_share_statistics",
                input_schema_for::<organizations::StatisticsInput>(),
            ),
            (
                "get_organization_page_statistics",
                input_schema_for::<organizations::StatisticsInput>(),
            ),
        ];
        let registry = ToolRegistry::with_default_tools();
        assert_eq!(expected.len(), registry.len());

        for (name, schema) in expected {
            let tool = registry.get(name).unwrap_or_else(|| panic!("{} missing", name));
            assert_eq!(tool.definition()["inputSchema"], schema, "{}", name);
            assert_eq!(schema["additionalProperties"], json!(false), "{}", name);
        }
    }

    fn advertised_values(tool: &str, property: &str) -> Vec<String> {
        let registry = ToolRegistry::with_default_tools();
        let schema = registry.get(tool).unwrap().input_schema().clone();
        schema["properties"][property]["enum"]
            .as_array()
            .unwrap_or_else(|| panic!("{}.{} has no enum", tool, property))
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    }

    #[test]
    fn create_statuses_advertise_launch_states_only() {
        assert_eq!(
            advertised_values("create_campaign", "status"),
            vec!["ACTIVE", "PAUSED", "DRAFT"]
        );
        assert_eq!(
            advertised_values("create_creative", "intended_status"),
            vec!["ACTIVE", "PAUSED", "DRAFT"]
        );
        assert_eq!(advertised_values("update_campaign", "status").len(), 8);
    }

    #[tokio::test]
    async fn unknown_tool_is_validation_error() {
        let registry = ToolRegistry::with_default_tools();
        let err = registry
            .call("nope", json!({}), MockTransport::new().api_clients())
            .await
            .unwrap_err();
        assert_eq!(err, LinkedInError::invalid("Unknown tool: nope"));
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_api() {
        let mock = MockTransport::new();
        let registry = ToolRegistry::with_default_tools();

        let err = registry
            .call("get_ad_account", json!({"account_id": "abc"}), mock.api_clients())
            .await
            .unwrap_err();

        assert!(matches!(err, LinkedInError::Validation { .. }));
        assert_eq!(mock.call_count(), 0);
    }
}
