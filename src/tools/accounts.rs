//! Ad account tools.

use super::input::{decode, require_id, require_range, status_search};
use super::Tool;
use crate::client::ApiClients;
use crate::errors::LinkedInResult;
use crate::types::urn::{self, bare_id, optional_bare_id};
use crate::types::Collection;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;

const AD_ACCOUNTS: &str = "/adAccounts";

/// Default page size for account searches.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Ad account status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Canceled,
    Draft,
    PendingDeletion,
    Removed,
}

/// Arguments of `get_ad_accounts`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetAdAccountsInput {
    /// Only return accounts in these statuses.
    #[serde(default)]
    pub status: Vec<AccountStatus>,
    /// Accounts per page, 1 to 1000 (default 100).
    #[schemars(range(min = 1, max = 1000))]
    pub page_size: Option<u32>,
    /// `next_page_token` from a previous call.
    pub page_token: Option<String>,
}

/// Arguments of `get_ad_account`.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetAdAccountInput {
    /// Numeric ad account ID or sponsoredAccount URN.
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdAccountRecord {
    #[serde(deserialize_with = "bare_id")]
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default, rename = "type")]
    account_type: Option<String>,
    #[serde(default, deserialize_with = "optional_bare_id")]
    reference: Option<String>,
    #[serde(default)]
    test: bool,
}

/// Ad account as returned to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdAccount {
    /// Account id.
    pub id: String,
    /// Display name.
    pub name: Option<String>,
    /// Status.
    pub status: Option<String>,
    /// Billing currency.
    pub currency: Option<String>,
    /// `BUSINESS` or `ENTERPRISE`.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// Organization that owns the account.
    pub organization_id: Option<String>,
    /// Whether this is a test account.
    pub test: bool,
}

impl From<AdAccountRecord> for AdAccount {
    fn from(record: AdAccountRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            status: record.status,
            currency: record.currency,
            account_type: record.account_type,
            organization_id: record.reference,
            test: record.test,
        }
    }
}

/// Result of `get_ad_accounts`.
#[derive(Debug, Serialize)]
pub struct AdAccountList {
    /// Matching accounts.
    pub accounts: Vec<AdAccount>,
    /// Number of accounts in this page.
    pub count: usize,
    /// Cursor for the next page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}

/// Lists ad accounts visible to the token.
pub async fn get_ad_accounts(
    clients: Arc<ApiClients>,
    input: GetAdAccountsInput,
) -> LinkedInResult<AdAccountList> {
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
        .query(AD_ACCOUNTS, "search", Some(params))
        .await?;
    let collection: Collection<AdAccountRecord> = decode("ad account search", data)?;
    let next_page_token = collection.next_page_token();
    let accounts: Vec<AdAccount> = collection.elements.into_iter().map(AdAccount::from).collect();

    Ok(AdAccountList {
        count: accounts.len(),
        accounts,
        next_page_token,
    })
}

/// Fetches one ad account.
pub async fn get_ad_account(
    clients: Arc<ApiClients>,
    input: GetAdAccountInput,
) -> LinkedInResult<AdAccount> {
    let account_id = require_id("account_id", &input.account_id, urn::SPONSORED_ACCOUNT)?;

    let data = clients.marketing().fetch_one(AD_ACCOUNTS, &account_id).await?;
    let record: AdAccountRecord = decode("ad account", data)?;
    Ok(record.into())
}

/// Account tools.
pub fn tools() -> Vec<Tool> {
    vec![
        Tool::new(
            "get_ad_accounts",
            "List LinkedIn ad accounts the access token can manage, optionally filtered by status.",
            get_ad_accounts,
        ),
        Tool::new(
            "get_ad_account",
            "Get details of a single LinkedIn ad account.",
            get_ad_account,
        ),
    ]
}
