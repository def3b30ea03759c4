//! Shared data contracts: URNs, money, dates and Rest.li collections.

pub mod dates;
pub mod money;
pub mod urn;

pub use dates::{date_to_epoch_millis, epoch_millis_to_date, parse_date, DateParts, DateRange};
pub use money::{Money, MoneyInput, MoneyOutput};
pub use urn::{extract_id, to_urn, Urn};

use serde::{Deserialize, Serialize};

/// Rest.li collection response.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    /// Elements of the current page.
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
    /// Offset paging metadata.
    #[serde(default)]
    pub paging: Option<Paging>,
    /// Cursor paging metadata.
    #[serde(default)]
    pub metadata: Option<CollectionMetadata>,
}

impl<T> Collection<T> {
    /// Cursor for the next page, if any.
    pub fn next_page_token(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.next_page_token.clone())
    }
}

/// Cursor paging metadata of finders that use `pageSize`/`pageToken`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionMetadata {
    /// Token to pass as `pageToken` for the next page.
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Rest.li paging metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Offset of the first element.
    #[serde(default)]
    pub start: u32,
    /// Requested page size.
    #[serde(default)]
    pub count: u32,
    /// Total elements, when the finder reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}
