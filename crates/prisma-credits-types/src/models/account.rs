use serde::{Deserialize, Serialize};

/// Cloud account as returned by `GET /cloud`.
///
/// Both fields are kept optional on the wire: the directory index is the
/// place where a missing id or group list is rejected, so deserialization
/// must not fail before that rule gets a chance to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    /// Cloud account identifier (AWS account number, Azure subscription, ...)
    #[serde(default)]
    pub account_id: Option<String>,

    /// Display name of the account
    #[serde(default)]
    pub name: Option<String>,

    /// Account groups this account belongs to, in server order
    #[serde(default)]
    pub groups: Option<Vec<AccountGroup>>,
}

impl Account {
    /// Account with an id and a list of groups
    pub fn new(account_id: impl Into<String>, groups: Vec<AccountGroup>) -> Self {
        Self {
            account_id: Some(account_id.into()),
            name: None,
            groups: Some(groups),
        }
    }

    /// Account id, treating an empty string the same as a missing one
    pub fn id(&self) -> Option<&str> {
        self.account_id.as_deref().filter(|id| !id.is_empty())
    }
}

/// Account group membership entry.
///
/// Identity is `id`; the same group may appear more than once in one
/// account's list and each occurrence is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountGroup {
    pub id: String,
    pub name: String,
}

impl AccountGroup {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
