//! Account directory: cloud account listing and the account → groups index

use crate::error::{CreditsError, DirectoryError};
use crate::transport::{ApiRequest, AuthToken, Transport};
use prisma_credits_types::{Account, AccountGroup};
use std::collections::HashMap;

pub const CLOUD_PATH: &str = "/cloud";

/// Read-only lookup from account id to the account's groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryIndex {
    groups_by_account: HashMap<String, Vec<AccountGroup>>,
}

impl DirectoryIndex {
    /// Groups of an account, in listing order (duplicates kept)
    pub fn groups(&self, account_id: &str) -> Option<&[AccountGroup]> {
        self.groups_by_account.get(account_id).map(Vec::as_slice)
    }

    pub fn contains(&self, account_id: &str) -> bool {
        self.groups_by_account.contains_key(account_id)
    }

    pub fn len(&self) -> usize {
        self.groups_by_account.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups_by_account.is_empty()
    }

    /// Total group memberships across all accounts
    pub fn membership_count(&self) -> usize {
        self.groups_by_account.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AccountGroup])> {
        self.groups_by_account
            .iter()
            .map(|(id, groups)| (id.as_str(), groups.as_slice()))
    }
}

/// Build the index from accounts in fetch order.
///
/// The first invalid entry aborts: an empty or missing id, an id seen
/// before, or an empty or missing group list. A directory with any of these
/// cannot be trusted for joining.
pub fn build_index(accounts: &[Account]) -> Result<DirectoryIndex, DirectoryError> {
    let mut groups_by_account = HashMap::with_capacity(accounts.len());

    for (position, account) in accounts.iter().enumerate() {
        let Some(account_id) = account.id() else {
            return Err(DirectoryError::MissingAccountId { position });
        };

        if groups_by_account.contains_key(account_id) {
            return Err(DirectoryError::DuplicateAccountId {
                account_id: account_id.to_string(),
            });
        }

        let groups = match &account.groups {
            Some(groups) if !groups.is_empty() => groups.clone(),
            _ => {
                return Err(DirectoryError::MissingGroups {
                    account_id: account_id.to_string(),
                })
            }
        };

        groups_by_account.insert(account_id.to_string(), groups);
    }

    Ok(DirectoryIndex { groups_by_account })
}

/// Fetches the cloud account listing
pub struct AccountDirectory<'a, T> {
    transport: &'a T,
}

impl<'a, T: Transport> AccountDirectory<'a, T> {
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// GET `/cloud` and parse the account array
    pub async fn fetch_accounts(&self, token: &AuthToken) -> Result<Vec<Account>, CreditsError> {
        let response = self
            .transport
            .send(ApiRequest::get(CLOUD_PATH).with_token(token))
            .await?;

        if !response.is_success() {
            return Err(CreditsError::DirectoryFetch {
                reason: format!(
                    "HTTP {}: {}",
                    response.status,
                    response.body_excerpt()
                ),
            });
        }

        let accounts: Vec<Account> =
            serde_json::from_str(&response.body).map_err(|e| CreditsError::DirectoryFetch {
                reason: format!("unexpected account listing: {}", e),
            })?;

        tracing::info!("Fetched {} cloud accounts", accounts.len());
        Ok(accounts)
    }
}
