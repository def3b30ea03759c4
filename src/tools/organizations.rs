//! Organization page tools: profile plus follower, share and page statistics.

use super::input::{decode, require_id};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::dates::{date_to_epoch_millis, epoch_millis_to_date, parse_date};
use crate::types::urn;
use crate::types::{extract_id, to_urn, Collection};
use chrono::{NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const ORGANIZATIONS: &str = "/organizations";
const FOLLOWER_STATISTICS: &str = "/organizationalEntityFollowerStatistics";
const SHARE_STATISTICS: &str = "/organizationalEntityShareStatistics";
const PAGE_STATISTICS: &str = "/organizationPageStatistics";

/// Bucket size of time-bound statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatisticsGranularity {
    #[default]
    Day,
    Week,
    Month,
}

/// Arguments of `get_organization`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetOrganizationInput {
    /// Numeric organization ID or organization URN.
    pub organization_id: String,
}

/// Arguments of the statistics tools.
///
/// Without dates the lifetime statistics are returned.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct StatisticsInput {
    /// Numeric organization ID or organization URN.
    pub organization_id: String,
    /// First day, YYYY-MM-DD; omit for lifetime totals.
    pub start_date: Option<String>,
    /// Day the range ends on, YYYY-MM-DD; requires `start_date`. Omitted, the
    /// range runs through today.
    pub end_date: Option<String>,
    /// Bucket size, `DAY` by default.
    #[serde(default)]
    pub granularity: StatisticsGranularity,
}

/// Validated time window of a statistics request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TimeWindow {
    start_millis: i64,
    end_millis: i64,
}

impl StatisticsInput {
    fn resolve(self) -> LinkedInResult<Self> {
        Ok(Self {
            organization_id: require_id("organization_id", &self.organization_id, urn::ORGANIZATION)?,
            ..self
        })
    }

    fn window(&self, today: NaiveDate) -> LinkedInResult<Option<TimeWindow>> {
        let start = match (&self.start_date, &self.end_date) {
            (None, None) => return Ok(None),
            (None, Some(_)) => {
                return Err(LinkedInError::validation(
                    "end_date",
                    "end_date requires start_date",
                ))
            }
            (Some(start), _) => parse_date("start_date", start)?,
        };

        let end = match &self.end_date {
            Some(end) => {
                let end = parse_date("end_date", end)?;
                if end <= start {
                    return Err(LinkedInError::validation(
                        "end_date",
                        "end_date must be after start_date",
                    ));
                }
                end
            }
            // The range end is exclusive, so an omitted end_date stops at tomorrow.
            None => {
                if start > today {
                    return Err(LinkedInError::validation(
                        "start_date",
                        "start_date must not be in the future",
                    ));
                }
                today.succ_opt().ok_or_else(|| {
                    LinkedInError::validation("start_date", "date is out of range")
                })?
            }
        };

        Ok(Some(TimeWindow {
            start_millis: date_to_epoch_millis(start),
            end_millis: date_to_epoch_millis(end),
        }))
    }

    fn params(&self, entity_param: &str) -> LinkedInResult<Map<String, Value>> {
        let window = self.window(Utc::now().date_naive())?;

        let mut params = Map::new();
        params.insert(
            entity_param.to_string(),
            json!(to_urn(urn::ORGANIZATION, &self.organization_id)),
        );
        if let Some(window) = window {
            params.insert(
                "timeIntervals".to_string(),
                json!({
                    "timeGranularityType": self.granularity,
                    "timeRange": {"start": window.start_millis, "end": window.end_millis}
                }),
            );
        }
        Ok(params)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OrganizationRecord {
    id: Option<Value>,
    localized_name: Option<String>,
    vanity_name: Option<String>,
    localized_description: Option<String>,
    localized_website: Option<String>,
    primary_organization_type: Option<String>,
    staff_count_range: Option<String>,
    industries: Vec<String>,
    founded_on: Option<FoundedOnRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct FoundedOnRecord {
    year: Option<i32>,
}

/// Organization as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Organization {
    /// Organization id.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Page slug (`linkedin.com/company/{vanity_name}`).
    pub vanity_name: Option<String>,
    /// About text.
    pub description: Option<String>,
    /// Website.
    pub website: Option<String>,
    /// Organization type.
    pub organization_type: Option<String>,
    /// Staff count bucket.
    pub staff_count_range: Option<String>,
    /// Industry ids.
    pub industry_ids: Vec<String>,
    /// Year founded.
    pub founded_year: Option<i32>,
}

/// One lifetime follower breakdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowerSegment {
    /// Segment key: a URN for seniority, industry, function or geo, or a bucket name.
    pub segment: String,
    /// Organic followers.
    pub organic: u64,
    /// Paid followers.
    pub paid: u64,
}

/// One time-bound follower gain row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowerGain {
    /// First day of the bucket.
    pub start_date: Option<String>,
    /// Day after the bucket.
    pub end_date: Option<String>,
    /// Organic followers gained.
    pub organic_gain: i64,
    /// Paid followers gained.
    pub paid_gain: i64,
}

/// Result of `get_organization_follower_statistics`.
#[derive(Debug, Serialize)]
pub struct FollowerStatistics {
    /// Organization id.
    pub organization_id: String,
    /// Lifetime breakdowns by dimension, when no dates were given.
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub breakdowns: Map<String, Value>,
    /// Gains per bucket, when dates were given.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gains: Vec<FollowerGain>,
}

/// One share statistics row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShareStatisticsRow {
    /// First day of the bucket; absent for lifetime totals.
    pub start_date: Option<String>,
    /// Day after the bucket.
    pub end_date: Option<String>,
    /// Impressions.
    pub impressions: u64,
    /// Unique impressions.
    pub unique_impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Likes.
    pub likes: u64,
    /// Comments.
    pub comments: u64,
    /// Shares.
    pub shares: u64,
    /// Engagement rate.
    pub engagement: f64,
}

/// Result of `get_organization_share_statistics`.
#[derive(Debug, Serialize)]
pub struct ShareStatistics {
    /// Organization id.
    pub organization_id: String,
    /// Rows, one per bucket or a single lifetime row.
    pub rows: Vec<ShareStatisticsRow>,
}

/// One page statistics row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageStatisticsRow {
    /// First day of the bucket; absent for lifetime totals.
    pub start_date: Option<String>,
    /// Day after the bucket.
    pub end_date: Option<String>,
    /// All page views.
    pub page_views: u64,
    /// Desktop page views.
    pub desktop_page_views: u64,
    /// Mobile page views.
    pub mobile_page_views: u64,
}

/// Result of `get_organization_page_statistics`.
#[derive(Debug, Serialize)]
pub struct PageStatistics {
    /// Organization id.
    pub organization_id: String,
    /// Rows, one per bucket or a single lifetime row.
    pub rows: Vec<PageStatisticsRow>,
}

#[derive(Debug, Default, Deserialize)]
struct TimeRangeRecord {
    start: Option<i64>,
    end: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FollowerCountsRecord {
    organic_follower_count: u64,
    paid_follower_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SegmentRecord {
    #[serde(default)]
    follower_counts: FollowerCountsRecord,
    #[serde(flatten)]
    key: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FollowerGainsRecord {
    organic_follower_gain: i64,
    paid_follower_gain: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FollowerStatisticsRecord {
    time_range: Option<TimeRangeRecord>,
    follower_gains: Option<FollowerGainsRecord>,
    follower_counts_by_association_type: Vec<SegmentRecord>,
    follower_counts_by_seniority: Vec<SegmentRecord>,
    follower_counts_by_industry: Vec<SegmentRecord>,
    follower_counts_by_function: Vec<SegmentRecord>,
    follower_counts_by_staff_count_range: Vec<SegmentRecord>,
    follower_counts_by_geo_country: Vec<SegmentRecord>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ShareTotalsRecord {
    impression_count: u64,
    unique_impressions_count: u64,
    click_count: u64,
    like_count: u64,
    comment_count: u64,
    share_count: u64,
    engagement: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ShareStatisticsRecord {
    time_range: Option<TimeRangeRecord>,
    total_share_statistics: ShareTotalsRecord,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageViewCount {
    page_views: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageViewsRecord {
    all_page_views: PageViewCount,
    all_desktop_page_views: PageViewCount,
    all_mobile_page_views: PageViewCount,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageTotalsRecord {
    views: PageViewsRecord,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PageStatisticsRecord {
    time_range: Option<TimeRangeRecord>,
    total_page_statistics: PageTotalsRecord,
}

fn range_dates(range: Option<TimeRangeRecord>) -> (Option<String>, Option<String>) {
    let range = range.unwrap_or_default();
    (
        range.start.and_then(epoch_millis_to_date),
        range.end.and_then(epoch_millis_to_date),
    )
}

fn segments(records: Vec<SegmentRecord>) -> Vec<FollowerSegment> {
    records
        .into_iter()
        .map(|record| FollowerSegment {
            segment: record
                .key
                .values()
                .find_map(|v| v.as_str().map(String::from))
                .unwrap_or_default(),
            organic: record.follower_counts.organic_follower_count,
            paid: record.follower_counts.paid_follower_count,
        })
        .collect()
}

/// Fetches an organization profile.
pub async fn get_organization(
    clients: Arc<ApiClients>,
    input: GetOrganizationInput,
) -> LinkedInResult<Organization> {
    let organization_id = require_id("organization_id", &input.organization_id, urn::ORGANIZATION)?;

    let data = clients
        .community()
        .fetch_one(ORGANIZATIONS, &organization_id)
        .await?;
    let record: OrganizationRecord = decode("organization", data)?;

    Ok(Organization {
        id: match record.id {
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) => extract_id(&s),
            _ => organization_id,
        },
        name: record.localized_name,
        vanity_name: record.vanity_name,
        description: record.localized_description,
        website: record.localized_website,
        organization_type: record.primary_organization_type,
        staff_count_range: record.staff_count_range,
        industry_ids: record.industries.iter().map(|i| extract_id(i)).collect(),
        founded_year: record.founded_on.and_then(|f| f.year),
    })
}

/// Reports follower counts, lifetime or gained over a window.
pub async fn get_organization_follower_statistics(
    clients: Arc<ApiClients>,
    input: StatisticsInput,
) -> LinkedInResult<FollowerStatistics> {
    let input = input.resolve()?;
    let params = input.params("organizationalEntity")?;

    let data = clients
        .community()
        .query(FOLLOWER_STATISTICS, "organizationalEntity", Some(params))
        .await?;
    let collection: Collection<FollowerStatisticsRecord> = decode("follower statistics", data)?;

    let mut breakdowns = Map::new();
    let mut gains = Vec::new();
    for record in collection.elements {
        if let Some(gain) = record.follower_gains {
            let (start_date, end_date) = range_dates(record.time_range);
            gains.push(FollowerGain {
                start_date,
                end_date,
                organic_gain: gain.organic_follower_gain,
                paid_gain: gain.paid_follower_gain,
            });
            continue;
        }

        let dimensions = [
            ("association_type", record.follower_counts_by_association_type),
            ("seniority", record.follower_counts_by_seniority),
            ("industry", record.follower_counts_by_industry),
            ("function", record.follower_counts_by_function),
            ("staff_count_range", record.follower_counts_by_staff_count_range),
            ("geo_country", record.follower_counts_by_geo_country),
        ];
        for (name, records) in dimensions {
            if !records.is_empty() {
                breakdowns.insert(name.to_string(), json!(segments(records)));
            }
        }
    }

    Ok(FollowerStatistics {
        organization_id: input.organization_id,
        breakdowns,
        gains,
    })
}

/// Reports post impressions and engagement.
pub async fn get_organization_share_statistics(
    clients: Arc<ApiClients>,
    input: StatisticsInput,
) -> LinkedInResult<ShareStatistics> {
    let input = input.resolve()?;
    let params = input.params("organizationalEntity")?;

    let data = clients
        .community()
        .query(SHARE_STATISTICS, "organizationalEntity", Some(params))
        .await?;
    let collection: Collection<ShareStatisticsRecord> = decode("share statistics", data)?;

    let rows = collection
        .elements
        .into_iter()
        .map(|record| {
            let (start_date, end_date) = range_dates(record.time_range);
            let totals = record.total_share_statistics;
            ShareStatisticsRow {
                start_date,
                end_date,
                impressions: totals.impression_count,
                unique_impressions: totals.unique_impressions_count,
                clicks: totals.click_count,
                likes: totals.like_count,
                comments: totals.comment_count,
                shares: totals.share_count,
                engagement: totals.engagement,
            }
        })
        .collect();

    Ok(ShareStatistics {
        organization_id: input.organization_id,
        rows,
    })
}

/// Reports page views.
pub async fn get_organization_page_statistics(
    clients: Arc<ApiClients>,
    input: StatisticsInput,
) -> LinkedInResult<PageStatistics> {
    let input = input.resolve()?;
    let params = input.params("organization")?;

    let data = clients
        .community()
        .query(PAGE_STATISTICS, "organization", Some(params))
        .await?;
    let collection: Collection<PageStatisticsRecord> = decode("page statistics", data)?;

    let rows = collection
        .elements
        .into_iter()
        .map(|record| {
            let (start_date, end_date) = range_dates(record.time_range);
            let views = record.total_page_statistics.views;
            PageStatisticsRow {
                start_date,
                end_date,
                page_views: views.all_page_views.page_views,
                desktop_page_views: views.all_desktop_page_views.page_views,
                mobile_page_views: views.all_mobile_page_views.page_views,
            }
        })
        .collect();

    Ok(PageStatistics {
        organization_id: input.organization_id,
        rows,
    })
}

/// Organization tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_organization",
            "Get a LinkedIn organization (company page) profile.",
            get_organization,
        ),
        Tool::new(
            "get_organization_follower_statistics",
            "Get follower statistics of an organization: lifetime breakdowns, or gains over a date range.",
            get_organization_follower_statistics,
        ),
        Tool::new(
            "get_organization_share_statistics",
            "Get impressions, clicks and engagement of an organization's posts.",
            get_organization_share_statistics,
        ),
        Tool::new(
            "get_organization_page_statistics",
            "Get page view statistics of an organization page.",
            get_organization_page_statistics,
        ),
    ]
}
