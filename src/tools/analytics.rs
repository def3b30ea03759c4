//! Ad analytics tools.
//!
//! Both tools use the `analytics` finder on `/adAnalytics` and derive CTR and
//! CPC from the raw counters.

use super::input::{decode, require_id};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::{LinkedInError, LinkedInResult};
use crate::types::urn;
use crate::types::{extract_id, to_urn, Collection, DateParts, DateRange};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const AD_ANALYTICS: &str = "/adAnalytics";

/// Most campaigns accepted by one analytics call.
pub const MAX_CAMPAIGNS: usize = 20;

/// Metrics requested from the analytics finder.
pub const ANALYTICS_FIELDS: &str = "dateRange,pivotValues,impressions,clicks,costInLocalCurrency,\
externalWebsiteConversions,landingPageClicks,likes,comments,shares,follows,videoViews";

/// Bucket size of analytics rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeGranularity {
    #[default]
    Daily,
    Monthly,
    All,
}

/// Arguments of `get_campaign_analytics`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CampaignAnalyticsInput {
    /// Numeric campaign IDs or sponsoredCampaign URNs, 1 to 20.
    #[schemars(length(min = 1, max = 20))]
    pub campaign_ids: Vec<String>,
    /// First day, YYYY-MM-DD.
    pub start_date: String,
    /// Last day, YYYY-MM-DD, not before `start_date`.
    pub end_date: Option<String>,
    /// Row granularity, `DAILY` by default.
    #[serde(default)]
    pub time_granularity: TimeGranularity,
}

/// Arguments of `get_account_analytics`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct AccountAnalyticsInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
    /// First day, YYYY-MM-DD.
    pub start_date: String,
    /// Last day, YYYY-MM-DD, not before `start_date`.
    pub end_date: Option<String>,
    /// Row granularity, `DAILY` by default.
    #[serde(default)]
    pub time_granularity: TimeGranularity,
}

#[derive(Debug, Deserialize)]
struct DateRangeRecord {
    start: Option<DateParts>,
    #[serde(default)]
    end: Option<DateParts>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct AnalyticsRecord {
    date_range: Option<DateRangeRecord>,
    pivot_values: Vec<String>,
    impressions: u64,
    clicks: u64,
    cost_in_local_currency: Option<String>,
    external_website_conversions: u64,
    landing_page_clicks: u64,
    likes: u64,
    comments: u64,
    shares: u64,
    follows: u64,
    video_views: u64,
}

/// One analytics row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsRow {
    /// First day of the bucket.
    pub start_date: Option<String>,
    /// Last day of the bucket.
    pub end_date: Option<String>,
    /// Ids of the pivot entities (campaigns or accounts).
    pub pivot_ids: Vec<String>,
    /// Impressions.
    pub impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Spend in account currency.
    pub cost: f64,
    /// Conversions.
    pub conversions: u64,
    /// Landing page clicks.
    pub landing_page_clicks: u64,
    /// Likes, comments, shares and follows.
    pub engagements: u64,
    /// Video views.
    pub video_views: u64,
    /// Click-through rate in percent.
    pub ctr: Option<f64>,
    /// Cost per click.
    pub cpc: Option<f64>,
}

/// Totals over all rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnalyticsTotals {
    /// Impressions.
    pub impressions: u64,
    /// Clicks.
    pub clicks: u64,
    /// Spend.
    pub cost: f64,
    /// Conversions.
    pub conversions: u64,
    /// Click-through rate in percent.
    pub ctr: Option<f64>,
    /// Cost per click.
    pub cpc: Option<f64>,
}

/// Result of the analytics tools.
#[derive(Debug, Serialize)]
pub struct AnalyticsReport {
    /// Reporting granularity.
    pub time_granularity: TimeGranularity,
    /// Rows as returned by LinkedIn.
    pub rows: Vec<AnalyticsRow>,
    /// Sum over `rows`.
    pub totals: AnalyticsTotals,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Click-through rate in percent, `None` without impressions.
pub fn click_through_rate(clicks: u64, impressions: u64) -> Option<f64> {
    (impressions > 0).then(|| round2(clicks as f64 / impressions as f64 * 100.0))
}

/// Cost per click, `None` without clicks.
pub fn cost_per_click(cost: f64, clicks: u64) -> Option<f64> {
    (clicks > 0).then(|| round2(cost / clicks as f64))
}

impl TryFrom<AnalyticsRecord> for AnalyticsRow {
    type Error = LinkedInError;

    fn try_from(record: AnalyticsRecord) -> LinkedInResult<Self> {
        let cost = match record.cost_in_local_currency.as_deref() {
            None | Some("") => 0.0,
            Some(raw) => raw
                .parse::<f64>()
                .map_err(|e| LinkedInError::unexpected_response("analytics", e))?,
        };
        let (start, end) = record
            .date_range
            .map(|r| (r.start, r.end))
            .unwrap_or_default();

        Ok(Self {
            start_date: start.and_then(DateParts::to_date_string),
            end_date: end.and_then(DateParts::to_date_string),
            pivot_ids: record.pivot_values.iter().map(|v| extract_id(v)).collect(),
            ctr: click_through_rate(record.clicks, record.impressions),
            cpc: cost_per_click(cost, record.clicks),
            impressions: record.impressions,
            clicks: record.clicks,
            cost,
            conversions: record.external_website_conversions,
            landing_page_clicks: record.landing_page_clicks,
            engagements: record
                .likes
                .saturating_add(record.comments)
                .saturating_add(record.shares)
                .saturating_add(record.follows),
            video_views: record.video_views,
        })
    }
}

fn totals(rows: &[AnalyticsRow]) -> AnalyticsTotals {
    let mut totals = rows.iter().fold(AnalyticsTotals::default(), |mut acc, row| {
        acc.impressions = acc.impressions.saturating_add(row.impressions);
        acc.clicks = acc.clicks.saturating_add(row.clicks);
        acc.cost += row.cost;
        acc.conversions = acc.conversions.saturating_add(row.conversions);
        acc
    });
    totals.cost = round2(totals.cost);
    totals.ctr = click_through_rate(totals.clicks, totals.impressions);
    totals.cpc = cost_per_click(totals.cost, totals.clicks);
    totals
}

fn date_range_param(range: &DateRange) -> Value {
    let mut param = Map::new();
    param.insert("start".to_string(), json!(DateParts::from(range.start)));
    if let Some(end) = range.end {
        param.insert("end".to_string(), json!(DateParts::from(end)));
    }
    Value::Object(param)
}

async fn run_report(
    clients: &ApiClients,
    pivot: &str,
    facet: (&str, Vec<String>),
    range: DateRange,
    time_granularity: TimeGranularity,
) -> LinkedInResult<AnalyticsReport> {
    let mut params = Map::new();
    params.insert("pivot".to_string(), json!(pivot));
    params.insert("timeGranularity".to_string(), json!(time_granularity));
    params.insert("dateRange".to_string(), date_range_param(&range));
    params.insert(facet.0.to_string(), json!(facet.1));
    params.insert("fields".to_string(), json!(ANALYTICS_FIELDS));

    let data = clients
        .marketing()
        .query(AD_ANALYTICS, "analytics", Some(params))
        .await?;
    let collection: Collection<AnalyticsRecord> = decode("analytics", data)?;
    let rows = collection
        .elements
        .into_iter()
        .map(AnalyticsRow::try_from)
        .collect::<LinkedInResult<Vec<_>>>()?;

    Ok(AnalyticsReport {
        time_granularity,
        totals: totals(&rows),
        rows,
    })
}

/// Reports performance of up to 20 campaigns.
pub async fn get_campaign_analytics(
    clients: Arc<ApiClients>,
    input: CampaignAnalyticsInput,
) -> LinkedInResult<AnalyticsReport> {
    if input.campaign_ids.is_empty() || input.campaign_ids.len() > MAX_CAMPAIGNS {
        return Err(LinkedInError::validation(
            "campaign_ids",
            format!("between 1 and {} campaign IDs are required", MAX_CAMPAIGNS),
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
    let range = DateRange::parse(&input.start_date, input.end_date.as_deref())?;

    run_report(
        &clients,
        "CAMPAIGN",
        ("campaigns", campaigns),
        range,
        input.time_granularity,
    )
    .await
}

/// Reports performance of a whole ad account.
pub async fn get_account_analytics(
    clients: Arc<ApiClients>,
    input: AccountAnalyticsInput,
) -> LinkedInResult<AnalyticsReport> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;
    let range = DateRange::parse(&input.start_date, input.end_date.as_deref())?;

    run_report(
        &clients,
        "ACCOUNT",
        ("accounts", vec![to_urn(urn::SPONSORED_ACCOUNT, &account_id)]),
        range,
        input.time_granularity,
    )
    .await
}

/// Analytics tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_campaign_analytics",
            "Get impressions, clicks, spend, conversions, CTR and CPC for up to 20 campaigns.",
            get_campaign_analytics,
        ),
        Tool::new(
            "get_account_analytics",
            "Get impressions, clicks, spend, conversions, CTR and CPC for a whole ad account.",
            get_account_analytics,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockTransport;
    use pretty_assertions::assert_eq;

    fn row_json() -> Value {
        json!({
            "dateRange": {
                "start": {"year": 2024, "month": 1, "day": 15},
                "end": {"year": 2024, "month": 1, "day": 15}
            },
            "pivotValues": ["urn:li:sponsoredCampaign:42"],
            "impressions": 2000,
            "clicks": 50,
            "costInLocalCurrency": "125.5",
            "externalWebsiteConversions": 3,
            "likes": 4,
            "shares": 1
        })
    }

    #[test]
    fn derived_rates() {
        assert_eq!(click_through_rate(50, 2000), Some(2.5));
        assert_eq!(click_through_rate(1, 0), None);
        assert_eq!(cost_per_click(125.5, 50), Some(2.51));
        assert_eq!(cost_per_click(10.0, 0), None);
    }

    #[tokio::test]
    async fn campaign_report_rows_and_totals() {
        let mock = MockTransport::new().with_json(json!({"elements": [row_json(), row_json()]}));
        let input: CampaignAnalyticsInput = serde_json::from_value(json!({
            "campaign_ids": ["42"],
            "start_date": "2024-01-15",
            "end_date": "2024-01-31"
        }))
        .unwrap();

        let report = get_campaign_analytics(mock.api_clients(), input).await.unwrap();

        let row = &report.rows[0];
        assert_eq!(row.start_date.as_deref(), Some("2024-01-15"));
        assert_eq!(row.pivot_ids, vec!["42"]);
        assert_eq!(row.engagements, 5);
        assert_eq!(row.ctr, Some(2.5));
        assert_eq!(report.totals.impressions, 4000);
        assert_eq!(report.totals.cost, 251.0);
        assert_eq!(report.totals.cpc, Some(2.51));

        let request = mock.last_request().unwrap();
        assert_eq!(request.finder(), Some("analytics"));
        assert_eq!(request.query_params["pivot"], json!("CAMPAIGN"));
        assert_eq!(request.query_params["timeGranularity"], json!("DAILY"));
        assert_eq!(
            request.query_params["dateRange"],
            json!({
                "start": {"year": 2024, "month": 1, "day": 15},
                "end": {"year": 2024, "month": 1, "day": 31}
            })
        );
        assert_eq!(request.query_params["campaigns"], json!(["urn:li:sponsoredCampaign:42"]));
    }

    #[test]
    fn huge_counters_saturate() {
        let record = AnalyticsRecord {
            impressions: u64::MAX,
            clicks: u64::MAX,
            likes: u64::MAX,
            comments: 1,
            shares: 1,
            follows: 1,
            ..AnalyticsRecord::default()
        };
        let row = AnalyticsRow::try_from(record).unwrap();
        assert_eq!(row.engagements, u64::MAX);

        let totals = totals(&[row.clone(), row]);
        assert_eq!(totals.impressions, u64::MAX);
        assert_eq!(totals.clicks, u64::MAX);
    }

    #[tokio::test]
    async fn too_many_campaigns_rejected() {
        let mock = MockTransport::new();
        let ids: Vec<String> = (1..=21).map(|i| i.to_string()).collect();
        let input = CampaignAnalyticsInput {
            campaign_ids: ids,
            start_date: "2024-01-01".to_string(),
            end_date: None,
            time_granularity: TimeGranularity::All,
        };

        let err = get_campaign_analytics(mock.api_clients(), input).await.unwrap_err();
        assert!(matches!(err, LinkedInError::Validation { field: Some(ref f), .. } if f == "campaign_ids"));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn account_report_pivots_on_account() {
        let mock = MockTransport::new().with_json(json!({"elements": []}));
        let input: AccountAnalyticsInput = serde_json::from_value(json!({
            "account_id": "5123",
            "start_date": "2024-01-01",
            "time_granularity": "MONTHLY"
        }))
        .unwrap();

        let report = get_account_analytics(mock.api_clients(), input).await.unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.totals.ctr, None);
        let request = mock.last_request().unwrap();
        assert_eq!(request.query_params["accounts"], json!(["urn:li:sponsoredAccount:5123"]));
        assert_eq!(
            request.query_params["dateRange"],
            json!({"start": {"year": 2024, "month": 1, "day": 1}})
        );
    }

    #[tokio::test]
    async fn inverted_range_rejected() {
        let mock = MockTransport::new();
        let input: AccountAnalyticsInput = serde_json::from_value(json!({
            "account_id": "5123",
            "start_date": "2024-02-01",
            "end_date": "2024-01-01"
        }))
        .unwrap();

        assert!(get_account_analytics(mock.api_clients(), input).await.is_err());
        assert_eq!(mock.call_count(), 0);
    }
}
