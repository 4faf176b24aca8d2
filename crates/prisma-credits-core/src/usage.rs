//! Credit usage collection over the paginated usage endpoint
//!
//! Pages are strictly sequential: each request carries the continuation
//! token of the previous response, and collection stops as soon as a
//! response comes back with a null or empty `nextPageToken`.

use crate::error::CreditsError;
use crate::transport::{ApiRequest, AuthToken, Transport};
use prisma_credits_types::{CloudType, UsagePage, UsageRecord};
use serde::Serialize;

pub const USAGE_PATH: &str = "/license/api/v2/usage";

/// Page size requested from the usage endpoint
pub const PAGE_LIMIT: u32 = 10;

#[derive(Debug, Clone, Serialize)]
struct TimeAmount {
    amount: u32,
    unit: &'static str,
}

#[derive(Debug, Clone, Serialize)]
struct TimeRange {
    #[serde(rename = "type")]
    kind: &'static str,
    value: TimeAmount,
}

/// Usage filter: every cloud type, no account or group restriction,
/// last `window_months` months.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuery {
    account_ids: Vec<String>,
    cloud_types: Vec<CloudType>,
    account_group_ids: Vec<String>,
    time_range: TimeRange,
    limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_token: Option<String>,
}

impl UsageQuery {
    pub fn last_months(window_months: u32) -> Self {
        Self {
            account_ids: Vec::new(),
            cloud_types: CloudType::ALL.to_vec(),
            account_group_ids: Vec::new(),
            time_range: TimeRange {
                kind: "relative",
                value: TimeAmount {
                    amount: window_months,
                    unit: "month",
                },
            },
            limit: PAGE_LIMIT,
            page_token: None,
        }
    }

    /// Same filter, continuing from `token`
    pub fn continue_from(&self, token: &str) -> Self {
        Self {
            page_token: Some(token.to_string()),
            ..self.clone()
        }
    }
}

/// All usage records of a run, in page-arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageCollection {
    pub records: Vec<UsageRecord>,
    pub pages: usize,
}

/// Follows `nextPageToken` until the usage listing is exhausted
pub struct UsageCollector<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> UsageCollector<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Usage records for the last `window_months` months
    pub async fn collect_usage(
        &self,
        token: &AuthToken,
        window_months: u32,
    ) -> Result<Vec<UsageRecord>, CreditsError> {
        Ok(self.collect(token, window_months).await?.records)
    }

    /// Same as `collect_usage`, also reporting how many pages were fetched
    pub async fn collect(
        &self,
        token: &AuthToken,
        window_months: u32,
    ) -> Result<UsageCollection, CreditsError> {
        let base_query = UsageQuery::last_months(window_months);
        let mut query = base_query.clone();
        let mut collection = UsageCollection::default();

        loop {
            let page_number = collection.pages + 1;
            let page = self.fetch_page(token, &query, page_number).await?;
            collection.pages = page_number;

            tracing::debug!(
                page = page_number,
                items = page.items.len(),
                more = page.continuation().is_some(),
                "Fetched usage page"
            );

            let next = page.continuation().map(str::to_string);
            collection.records.extend(page.items);

            match next {
                Some(next_token) => query = base_query.continue_from(&next_token),
                None => break,
            }
        }

        tracing::info!(
            "Collected {} usage records over {} pages",
            collection.records.len(),
            collection.pages
        );

        Ok(collection)
    }

    async fn fetch_page(
        &self,
        token: &AuthToken,
        query: &UsageQuery,
        page_number: usize,
    ) -> Result<UsagePage, CreditsError> {
        let body = serde_json::to_value(query).map_err(|e| CreditsError::MalformedPage {
            page: page_number,
            reason: format!("failed to encode usage query: {}", e),
        })?;

        let response = self
            .transport
            .send(ApiRequest::post(USAGE_PATH, body).with_token(token))
            .await?
            .error_for_status(USAGE_PATH)?;

        serde_json::from_str(&response.body).map_err(|e| CreditsError::MalformedPage {
            page: page_number,
            reason: e.to_string(),
        })
    }
}
