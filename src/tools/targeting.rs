//! Targeting tools: facets, entity typeahead and audience estimates.

use super::input::{decode, require_range, require_text};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::urn::{self, Urn};
use crate::types::{to_urn, Collection};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const AD_TARGETING_FACETS: &str = "/adTargetingFacets";
const AD_TARGETING_ENTITIES: &str = "/adTargetingEntities";
const AUDIENCE_COUNTS: &str = "/audienceCounts";

/// LinkedIn refuses to estimate audiences smaller than this.
pub const MIN_AUDIENCE_SIZE: u64 = 300;

/// Accepts `locations` or `urn:li:adTargetingFacet:locations`.
fn facet_urn(field: &str, facet: &str) -> LinkedInResult<String> {
    let facet = facet.trim();
    if facet.starts_with("urn:") {
        let parsed: Urn = facet
            .parse()
            .map_err(|e| LinkedInError::validation(field, format!("{}", e)))?;
        if parsed.entity_type() != urn::AD_TARGETING_FACET {
            return Err(LinkedInError::validation(
                field,
                format!("'{}' is not an adTargetingFacet URN", facet),
            ));
        }
        return Ok(parsed.to_string());
    }
    if facet.is_empty() || !facet.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(LinkedInError::validation(
            field,
            format!("'{}' is not a targeting facet name", facet),
        ));
    }
    Ok(to_urn(urn::AD_TARGETING_FACET, facet))
}

/// Arguments of `get_targeting_facets`.
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetTargetingFacetsInput {}

/// Arguments of `search_targeting_entities`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchTargetingEntitiesInput {
    /// Facet name such as `locations`, or its URN.
    pub facet: String,
    /// Search text.
    pub query: String,
    /// Maximum results, 1 to 100.
    #[schemars(range(min = 1, max = 100))]
    pub count: Option<u32>,
}

/// One entity in an audience definition.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TargetingEntity {
    /// URN entity type, e.g. `geo`, `seniority` or `industry`.
    pub entity_type: String,
    /// Entity id.
    pub id: String,
}

/// Entities selected within one facet.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FacetSelection {
    /// Facet name such as `locations`, or its URN.
    pub facet: String,
    /// Selected entities, OR-ed together.
    #[schemars(length(min = 1))]
    pub entities: Vec<TargetingEntity>,
}

/// Arguments of `estimate_audience_size`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EstimateAudienceInput {
    /// Facets that must all match.
    #[schemars(length(min = 1))]
    pub include: Vec<FacetSelection>,
    /// Facets that must not match.
    #[serde(default)]
    pub exclude: Vec<FacetSelection>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FacetRecord {
    #[serde(default)]
    facet_name: Option<String>,
    #[serde(default)]
    ad_targeting_facet_urn: Option<String>,
    #[serde(default)]
    entity_types: Vec<String>,
    #[serde(default)]
    available_entity_finders: Vec<String>,
}

/// Targeting facet as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetingFacet {
    /// Facet name, usable as `facet` in other tools.
    pub name: Option<String>,
    /// Facet URN.
    pub urn: Option<String>,
    /// Entity types the facet accepts.
    pub entity_types: Vec<String>,
    /// Finders usable to look up entities (`TYPEAHEAD`, ...).
    pub finders: Vec<String>,
}

/// Result of `get_targeting_facets`.
#[derive(Debug, Serialize)]
pub struct TargetingFacetList {
    /// All facets.
    pub facets: Vec<TargetingFacet>,
    /// Number of facets.
    pub count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntityRecord {
    urn: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    facet_urn: Option<String>,
}

/// Targeting entity match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetingEntityMatch {
    /// Entity URN to use in targeting criteria.
    pub urn: String,
    /// Entity type parsed from the URN.
    pub entity_type: Option<String>,
    /// Entity id parsed from the URN.
    pub id: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Facet the entity belongs to.
    pub facet_urn: Option<String>,
}

impl From<EntityRecord> for TargetingEntityMatch {
    fn from(record: EntityRecord) -> Self {
        let parsed = record.urn.parse::<Urn>().ok();
        Self {
            entity_type: parsed.as_ref().map(|u| u.entity_type().to_string()),
            id: parsed.as_ref().map(|u| u.id().to_string()),
            urn: record.urn,
            name: record.name,
            facet_urn: record.facet_urn,
        }
    }
}

/// Result of `search_targeting_entities`.
#[derive(Debug, Serialize)]
pub struct TargetingEntityList {
    /// Matches.
    pub entities: Vec<TargetingEntityMatch>,
    /// Number of matches.
    pub count: usize,
}

#[derive(Debug, Deserialize)]
struct AudienceCountRecord {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    active: Option<u64>,
}

/// Result of `estimate_audience_size`.
#[derive(Debug, Serialize)]
pub struct AudienceEstimate {
    /// Estimated members matching the criteria.
    pub total: u64,
    /// Estimated active members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<u64>,
    /// Whether the audience is large enough to run a campaign.
    pub meets_minimum: bool,
    /// Guidance for small audiences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Lists every targeting facet.
pub async fn get_targeting_facets(
    clients: Arc<ApiClients>,
    _input: GetTargetingFacetsInput,
) -> LinkedInResult<TargetingFacetList> {
    let data = clients.marketing().fetch_all(AD_TARGETING_FACETS).await?;
    let collection: Collection<FacetRecord> = decode("targeting facet", data)?;

    let facets: Vec<TargetingFacet> = collection
        .elements
        .into_iter()
        .map(|f| TargetingFacet {
            name: f.facet_name,
            urn: f.ad_targeting_facet_urn,
            entity_types: f.entity_types,
            finders: f.available_entity_finders,
        })
        .collect();

    Ok(TargetingFacetList {
        count: facets.len(),
        facets,
    })
}

/// Looks up targeting entities by name.
pub async fn search_targeting_entities(
    clients: Arc<ApiClients>,
    input: SearchTargetingEntitiesInput,
) -> LinkedInResult<TargetingEntityList> {
    let facet = facet_urn("facet", &input.facet)?;
    require_text("query", &input.query, 200)?;
    let count = require_range("count", input.count.unwrap_or(20), 1, 100)?;

    let mut params = Map::new();
    params.insert("facet".to_string(), json!(facet));
    params.insert("query".to_string(), json!(input.query.trim()));
    params.insert("queryVersion".to_string(), json!("QUERY_USES_URNS"));
    params.insert("count".to_string(), json!(count));

    let data = clients
        .marketing()
        .query(AD_TARGETING_ENTITIES, "typeahead", Some(params))
        .await?;
    let collection: Collection<EntityRecord> = decode("targeting entity", data)?;
    let entities: Vec<TargetingEntityMatch> = collection
        .elements
        .into_iter()
        .map(TargetingEntityMatch::from)
        .collect();

    Ok(TargetingEntityList {
        count: entities.len(),
        entities,
    })
}

/// `{facetUrn: [entityUrn, ...]}` for one selection.
fn facet_clause(field: &str, selection: &FacetSelection) -> LinkedInResult<Map<String, Value>> {
    let facet = facet_urn(field, &selection.facet)?;
    if selection.entities.is_empty() {
        return Err(LinkedInError::validation(
            field,
            format!("facet '{}' has no entities", selection.facet),
        ));
    }

    let mut entities = Vec::with_capacity(selection.entities.len());
    for entity in &selection.entities {
        let valid_type = !entity.entity_type.is_empty()
            && entity.entity_type.chars().all(|c| c.is_ascii_alphanumeric());
        if !valid_type || entity.id.trim().is_empty() {
            return Err(LinkedInError::validation(
                field,
                format!(
                    "entity {{entity_type: '{}', id: '{}'}} is not valid",
                    entity.entity_type, entity.id
                ),
            ));
        }
        entities.push(to_urn(&entity.entity_type, entity.id.trim()));
    }

    let mut clause = Map::new();
    clause.insert(facet, json!(entities));
    Ok(clause)
}

/// Builds `targetingCriteria` from facet selections.
fn targeting_criteria(input: &EstimateAudienceInput) -> LinkedInResult<Value> {
    if input.include.is_empty() {
        return Err(LinkedInError::validation(
            "include",
            "at least one facet must be included",
        ));
    }

    let and: Vec<Value> = input
        .include
        .iter()
        .map(|s| facet_clause("include", s).map(|or| json!({ "or": or })))
        .collect::<LinkedInResult<_>>()?;

    let mut criteria = Map::new();
    criteria.insert("include".to_string(), json!({ "and": and }));

    if !input.exclude.is_empty() {
        let mut or = Map::new();
        for selection in &input.exclude {
            for (facet, entities) in facet_clause("exclude", selection)? {
                match or.get_mut(&facet) {
                    Some(Value::Array(existing)) => {
                        if let Value::Array(more) = entities {
                            existing.extend(more);
                        }
                    }
                    _ => {
                        or.insert(facet, entities);
                    }
                }
            }
        }
        criteria.insert("exclude".to_string(), json!({ "or": or }));
    }

    Ok(Value::Object(criteria))
}

/// Estimates how many members match a targeting definition.
pub async fn estimate_audience_size(
    clients: Arc<ApiClients>,
    input: EstimateAudienceInput,
) -> LinkedInResult<AudienceEstimate> {
    let mut params = Map::new();
    params.insert("targetingCriteria".to_string(), targeting_criteria(&input)?);

    let data = clients
        .marketing()
        .query(AUDIENCE_COUNTS, "targetingCriteriaV2", Some(params))
        .await?;
    let collection: Collection<AudienceCountRecord> = decode("audience count", data)?;
    let count = collection
        .elements
        .into_iter()
        .next()
        .ok_or_else(|| LinkedInError::unexpected_response("audience count", "no elements"))?;

    let meets_minimum = count.total >= MIN_AUDIENCE_SIZE;
    Ok(AudienceEstimate {
        total: count.total,
        active: count.active,
        meets_minimum,
        note: (!meets_minimum).then(|| {
            format!(
                "Audience is below the {} member minimum; broaden the targeting",
                MIN_AUDIENCE_SIZE
            )
        }),
    })
}

/// Targeting tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_targeting_facets",
            "List available audience targeting facets (locations, industries, seniorities, ...).",
            get_targeting_facets,
        ),
        Tool::new(
            "search_targeting_entities",
            "Search for targeting entities within a facet by name, e.g. cities for the locations facet.",
            search_targeting_entities,
        ),
        Tool::new(
            "estimate_audience_size",
            "Estimate the audience size of a targeting definition before creating a campaign.",
            estimate_audience_size,
        ),
    ]
}
