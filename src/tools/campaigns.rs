//! Campaign tools.
//!
//! Campaigns live under their ad account (`/adAccounts/{id}/adCampaigns`).
//! Schedules travel as epoch milliseconds and budgets as [`Money`].

use super::input::{decode, require_id, require_range, require_text, status_search};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::dates::{date_to_epoch_millis, epoch_millis_to_date, parse_date};
use crate::types::urn::{self, bare_id, optional_bare_id};
use crate::types::{to_urn, Collection, Money, MoneyInput, MoneyOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Default page size for campaign searches.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Longest accepted campaign name.
pub const MAX_NAME_LENGTH: usize = 255;

fn campaigns_path(account_id: &str) -> String {
    format!("/adAccounts/{}/adCampaigns", account_id)
}

/// Campaign status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Active,
    Paused,
    Archived,
    Draft,
    Canceled,
    Completed,
    PendingDeletion,
    Removed,
}

/// Status a campaign may be created in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CreateCampaignStatus {
    Active,
    #[default]
    Paused,
    Draft,
}

/// Campaign objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveType {
    BrandAwareness,
    Engagement,
    JobApplicants,
    LeadGeneration,
    TalentLeads,
    VideoViews,
    WebsiteConversions,
    WebsiteVisits,
}

/// Campaign format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignType {
    TextAd,
    #[default]
    SponsoredUpdates,
    SponsoredInmails,
    Dynamic,
}

/// Bidding model: cost per click, per thousand impressions or per view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CostType {
    Cpc,
    Cpm,
    Cpv,
}

/// Arguments of `get_campaigns`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetCampaignsInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Only return campaigns in these statuses.
    #[serde(default)]
    pub status: Vec<CampaignStatus>,
    /// Campaigns per page, 1 to 1000 (default 100).
    #[schemars(range(min = 1, max = 1000))]
    pub page_size: Option<u32>,
    /// `next_page_token` from a previous call.
    pub page_token: Option<String>,
}

/// Arguments addressing one campaign.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CampaignRef {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Numeric campaign ID or sponsoredCampaign URN.
    pub campaign_id: String,
}

impl CampaignRef {
    fn resolve(self) -> LinkedInResult<Self> {
        Ok(Self {
            account_id: require_id("account_id", &self.account_id, urn::SPONSORED_ACCOUNT)?,
            campaign_id: require_id("campaign_id", &self.campaign_id, urn::SPONSORED_CAMPAIGN)?,
        })
    }
}

/// Arguments of `create_campaign`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateCampaignInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Numeric campaign group ID or sponsoredCampaignGroup URN.
    pub campaign_group_id: String,
    /// Campaign name.
    #[schemars(length(max = 255))]
    pub name: String,
    /// Campaign objective.
    pub objective_type: ObjectiveType,
    /// Format, `SPONSORED_UPDATES` by default.
    #[serde(default)]
    pub campaign_type: CampaignType,
    /// Bidding model.
    pub cost_type: CostType,
    /// Daily budget.
    pub daily_budget: Option<MoneyInput>,
    /// Lifetime budget; requires `end_date`.
    pub total_budget: Option<MoneyInput>,
    /// Bid amount.
    pub unit_cost: Option<MoneyInput>,
    /// First serving day, YYYY-MM-DD.
    pub start_date: String,
    /// Last serving day, YYYY-MM-DD.
    pub end_date: Option<String>,
    /// Numeric geo IDs to target.
    #[schemars(length(min = 1))]
    pub location_ids: Vec<String>,
    /// Locale such as `en_US` (default).
    pub locale: Option<String>,
    /// Initial status, `PAUSED` by default.
    #[serde(default)]
    pub status: CreateCampaignStatus,
}

/// Arguments of `update_campaign`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateCampaignInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// Numeric campaign ID or sponsoredCampaign URN.
    pub campaign_id: String,
    /// New name.
    #[schemars(length(max = 255))]
    pub name: Option<String>,
    /// New status.
    pub status: Option<CampaignStatus>,
    /// New daily budget.
    pub daily_budget: Option<MoneyInput>,
    /// New lifetime budget.
    pub total_budget: Option<MoneyInput>,
    /// New bid amount.
    pub unit_cost: Option<MoneyInput>,
    /// New last serving day, YYYY-MM-DD.
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunScheduleRecord {
    #[serde(default)]
    start: Option<i64>,
    #[serde(default)]
    end: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CampaignRecord {
    #[serde(deserialize_with = "bare_id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "type")]
    campaign_type: Option<String>,
    #[serde(default)]
    objective_type: Option<String>,
    #[serde(default)]
    cost_type: Option<String>,
    #[serde(default)]
    daily_budget: Option<Money>,
    #[serde(default)]
    total_budget: Option<Money>,
    #[serde(default)]
    unit_cost: Option<Money>,
    #[serde(default)]
    run_schedule: Option<RunScheduleRecord>,
    #[serde(default, deserialize_with = "optional_bare_id")]
    campaign_group: Option<String>,
    #[serde(default, deserialize_with = "optional_bare_id")]
    account: Option<String>,
}

/// Campaign as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Campaign {
    /// Campaign id.
    pub id: String,
    /// Name.
    pub name: Option<String>,
    /// Status.
    pub status: Option<String>,
    /// Format.
    #[serde(rename = "type")]
    pub campaign_type: Option<String>,
    /// Objective.
    pub objective_type: Option<String>,
    /// Bidding model.
    pub cost_type: Option<String>,
    /// Daily budget.
    pub daily_budget: Option<MoneyOutput>,
    /// Lifetime budget.
    pub total_budget: Option<MoneyOutput>,
    /// Bid.
    pub unit_cost: Option<MoneyOutput>,
    /// First serving day.
    pub start_date: Option<String>,
    /// Last serving day.
    pub end_date: Option<String>,
    /// Campaign group id.
    pub campaign_group_id: Option<String>,
    /// Ad account id.
    pub account_id: Option<String>,
}

impl From<CampaignRecord> for Campaign {
    fn from(record: CampaignRecord) -> Self {
        let (start, end) = record
            .run_schedule
            .map(|s| (s.start, s.end))
            .unwrap_or_default();

        Self {
            id: record.id,
            name: record.name,
            status: record.status,
            campaign_type: record.campaign_type,
            objective_type: record.objective_type,
            cost_type: record.cost_type,
            daily_budget: record.daily_budget.map(MoneyOutput::from),
            total_budget: record.total_budget.map(MoneyOutput::from),
            unit_cost: record.unit_cost.map(MoneyOutput::from),
            start_date: start.and_then(epoch_millis_to_date),
            end_date: end.and_then(epoch_millis_to_date),
            campaign_group_id: record.campaign_group,
            account_id: record.account,
        }
    }
}

/// Result of `get_campaigns`.
#[derive(Debug, Serialize)]
pub struct CampaignList {
    /// Matching campaigns.
    pub campaigns: Vec<Campaign>,
    /// Number of campaigns in this page.
    pub count: usize,
    /// Cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Result of a campaign write.
#[derive(Debug, Serialize)]
pub struct CampaignChange {
    /// Campaign id, when known.
    pub campaign_id: Option<String>,
    /// Campaign URN, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_urn: Option<String>,
    /// Fields sent in an update.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updated_fields: Vec<String>,
    /// Summary.
    pub message: String,
}

/// Lists campaigns of an ad account.
pub async fn get_campaigns(
    clients: Arc<ApiClients>,
    input: GetCampaignsInput,
) -> LinkedInResult<CampaignList> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let page_size = require_range("page_size", input.page_size.unwrap_or(DEFAULT_PAGE_SIZE), 1, 1000)?;

    let mut params = Map::new();
    if let Some(search) = status_search(&input.status) {
        params.insert("search".to_string(), search);
    }
    params.insert("pageSize".to_string(), json!(page_size));
    if let Some(token) = input.page_token {
        params.insert("pageToken".to_string(), Value::String(token));
    }

    let data = clients
        .marketing()
        .query(&campaigns_path(&account_id), "search", Some(params))
        .await?;
    let collection: Collection<CampaignRecord> = decode("campaign search", data)?;
    let next_page_token = collection.next_page_token();
    let campaigns: Vec<Campaign> = collection.elements.into_iter().map(Campaign::from).collect();

    Ok(CampaignList {
        count: campaigns.len(),
        campaigns,
        next_page_token,
    })
}

/// Fetches one campaign.
pub async fn get_campaign(clients: Arc<ApiClients>, input: CampaignRef) -> LinkedInResult<Campaign> {
    let input = input.resolve()?;

    let data = clients
        .marketing()
        .fetch_one(&campaigns_path(&input.account_id), &input.campaign_id)
        .await?;
    let record: CampaignRecord = decode("campaign", data)?;
    Ok(record.into())
}

/// Splits `en_US` into LinkedIn's locale record.
fn parse_locale(locale: &str) -> LinkedInResult<Value> {
    let invalid = || {
        LinkedInError::validation(
            "locale",
            format!("'{}' is not a locale such as en_US", locale),
        )
    };

    let (language, country) = locale.split_once('_').ok_or_else(invalid)?;
    let language_ok = language.len() == 2 && language.chars().all(|c| c.is_ascii_lowercase());
    let country_ok = country.len() == 2 && country.chars().all(|c| c.is_ascii_uppercase());
    if !language_ok || !country_ok {
        return Err(invalid());
    }

    Ok(json!({ "country": country, "language": language }))
}

fn location_targeting(location_ids: &[String]) -> LinkedInResult<Value> {
    if location_ids.is_empty() {
        return Err(LinkedInError::validation(
            "location_ids",
            "at least one location is required",
        ));
    }
    let geos = location_ids
        .iter()
        .map(|id| require_id("location_ids", id, urn::GEO).map(|id| to_urn(urn::GEO, &id)))
        .collect::<LinkedInResult<Vec<String>>>()?;
    let mut facets = Map::new();
    facets.insert(to_urn(urn::AD_TARGETING_FACET, "locations"), json!(geos));

    Ok(json!({
        "include": {
            "and": [ { "or": facets } ]
        }
    }))
}

/// Builds the entity body of a new campaign after checking business rules.
fn campaign_entity(account_id: &str, input: &CreateCampaignInput) -> LinkedInResult<Map<String, Value>> {
    let campaign_group_id = require_id(
        "campaign_group_id",
        &input.campaign_group_id,
        urn::SPONSORED_CAMPAIGN_GROUP,
    )?;
    require_text("name", &input.name, MAX_NAME_LENGTH)?;

    if input.daily_budget.is_none() && input.total_budget.is_none() {
        return Err(LinkedInError::validation(
            "daily_budget",
            "either daily_budget or total_budget is required",
        ));
    }
    if input.total_budget.is_some() && input.end_date.is_none() {
        return Err(LinkedInError::validation(
            "end_date",
            "end_date is required when total_budget is set",
        ));
    }

    let start = parse_date("start_date", &input.start_date)?;
    let end = input
        .end_date
        .as_deref()
        .map(|e| parse_date("end_date", e))
        .transpose()?;
    if let Some(end) = end {
        if end <= start {
            return Err(LinkedInError::validation(
                "end_date",
                "end_date must be after start_date",
            ));
        }
    }

    let mut run_schedule = Map::new();
    run_schedule.insert("start".to_string(), json!(date_to_epoch_millis(start)));
    if let Some(end) = end {
        run_schedule.insert("end".to_string(), json!(date_to_epoch_millis(end)));
    }

    let mut entity = Map::new();
    entity.insert("account".to_string(), json!(to_urn(urn::SPONSORED_ACCOUNT, account_id)));
    entity.insert(
        "campaignGroup".to_string(),
        json!(to_urn(urn::SPONSORED_CAMPAIGN_GROUP, &campaign_group_id)),
    );
    entity.insert("name".to_string(), json!(input.name.trim()));
    entity.insert("objectiveType".to_string(), json!(input.objective_type));
    entity.insert("type".to_string(), json!(input.campaign_type));
    entity.insert("costType".to_string(), json!(input.cost_type));
    entity.insert("status".to_string(), json!(input.status));
    entity.insert("runSchedule".to_string(), Value::Object(run_schedule));
    entity.insert(
        "locale".to_string(),
        parse_locale(input.locale.as_deref().unwrap_or("en_US"))?,
    );
    entity.insert("targetingCriteria".to_string(), location_targeting(&input.location_ids)?);
    entity.insert("offsiteDeliveryEnabled".to_string(), json!(false));
    entity.insert("politicalIntent".to_string(), json!("NOT_DECLARED"));

    if let Some(budget) = &input.daily_budget {
        entity.insert("dailyBudget".to_string(), json!(budget.to_money("daily_budget")?));
    }
    if let Some(budget) = &input.total_budget {
        entity.insert("totalBudget".to_string(), json!(budget.to_money("total_budget")?));
    }
    if let Some(cost) = &input.unit_cost {
        entity.insert("unitCost".to_string(), json!(cost.to_money("unit_cost")?));
    }

    Ok(entity)
}

/// Creates a campaign.
pub async fn create_campaign(
    clients: Arc<ApiClients>,
    input: CreateCampaignInput,
) -> LinkedInResult<CampaignChange> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let entity = campaign_entity(&account_id, &input)?;

    let created = clients
        .marketing()
        .create(&campaigns_path(&account_id), entity)
        .await?;
    let campaign_id = created.id.as_deref().map(urn::extract_id);

    Ok(CampaignChange {
        campaign_urn: campaign_id
            .as_deref()
            .map(|id| to_urn(urn::SPONSORED_CAMPAIGN, id)),
        message: format!("Campaign '{}' created", input.name.trim()),
        campaign_id,
        updated_fields: Vec::new(),
    })
}

/// Builds the dotted-key field map of a campaign update.
fn campaign_patch(input: &UpdateCampaignInput) -> LinkedInResult<Map<String, Value>> {
    let mut fields = Map::new();

    if let Some(name) = &input.name {
        require_text("name", name, MAX_NAME_LENGTH)?;
        fields.insert("name".to_string(), json!(name.trim()));
    }
    if let Some(status) = input.status {
        fields.insert("status".to_string(), json!(status));
    }
    if let Some(budget) = &input.daily_budget {
        fields.insert("dailyBudget".to_string(), json!(budget.to_money("daily_budget")?));
    }
    if let Some(budget) = &input.total_budget {
        fields.insert("totalBudget".to_string(), json!(budget.to_money("total_budget")?));
    }
    if let Some(cost) = &input.unit_cost {
        fields.insert("unitCost".to_string(), json!(cost.to_money("unit_cost")?));
    }
    if let Some(end) = &input.end_date {
        let end = parse_date("end_date", end)?;
        fields.insert("runSchedule.end".to_string(), json!(date_to_epoch_millis(end)));
    }

    if fields.is_empty() {
        return Err(LinkedInError::invalid(
            "at least one of name, status, daily_budget, total_budget, unit_cost or end_date is required",
        ));
    }
    Ok(fields)
}

/// Partially updates a campaign.
pub async fn update_campaign(
    clients: Arc<ApiClients>,
    input: UpdateCampaignInput,
) -> LinkedInResult<CampaignChange> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let campaign_id = require_id("campaign_id", &input.campaign_id, urn::SPONSORED_CAMPAIGN)?;
    let fields = campaign_patch(&input)?;
    let updated_fields: Vec<String> = fields.keys().cloned().collect();

    clients
        .marketing()
        .patch(&campaigns_path(&account_id), &campaign_id, fields)
        .await?;

    Ok(CampaignChange {
        message: format!("Campaign {} updated", campaign_id),
        campaign_urn: Some(to_urn(urn::SPONSORED_CAMPAIGN, &campaign_id)),
        campaign_id: Some(campaign_id),
        updated_fields,
    })
}

/// Deletes a campaign. LinkedIn only allows this for `DRAFT` campaigns.
pub async fn delete_campaign(
    clients: Arc<ApiClients>,
    input: CampaignRef,
) -> LinkedInResult<CampaignChange> {
    let input = input.resolve()?;

    clients
        .marketing()
        .remove(&campaigns_path(&input.account_id), &input.campaign_id)
        .await?;

    Ok(CampaignChange {
        message: format!("Campaign {} deleted", input.campaign_id),
        campaign_urn: Some(to_urn(urn::SPONSORED_CAMPAIGN, &input.campaign_id)),
        campaign_id: Some(input.campaign_id),
        updated_fields: Vec::new(),
    })
}

/// Campaign tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_campaigns",
            "List campaigns in a LinkedIn ad account, optionally filtered by status.",
            get_campaigns,
        ),
        Tool::new(
            "get_campaign",
            "Get details of a single campaign, including budget and schedule.",
            get_campaign,
        ),
        Tool::new(
            "create_campaign",
            "Create a campaign in an ad account. Requires a daily or total budget; a total budget also requires an end date.",
            create_campaign,
        ),
        Tool::new(
            "update_campaign",
            "Update a campaign's name, status, budgets, bid or end date.",
            update_campaign,
        ),
        Tool::new(
            "delete_campaign",
            "Delete a DRAFT campaign. Active campaigns must be archived instead.",
            delete_campaign,
        ),
    ]
}
