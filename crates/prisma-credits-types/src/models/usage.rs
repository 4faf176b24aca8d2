use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Cloud provider a usage record is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloudType {
    Aws,
    Azure,
    Oci,
    AlibabaCloud,
    Gcp,
    Others,
}

impl CloudType {
    /// Every cloud type, in the order the usage filter lists them
    pub const ALL: [CloudType; 6] = [
        CloudType::Aws,
        CloudType::Azure,
        CloudType::Oci,
        CloudType::AlibabaCloud,
        CloudType::Gcp,
        CloudType::Others,
    ];

    /// Wire name ("aws", "alibaba_cloud", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            CloudType::Aws => "aws",
            CloudType::Azure => "azure",
            CloudType::Oci => "oci",
            CloudType::AlibabaCloud => "alibaba_cloud",
            CloudType::Gcp => "gcp",
            CloudType::Others => "others",
        }
    }
}

impl fmt::Display for CloudType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource-type keys, in export column order
pub const RESOURCE_TYPE_KEYS: [&str; 10] = [
    "container",
    "iam",
    "container_caas",
    "data_store",
    "agentless_host",
    "host",
    "serverless",
    "iaas",
    "waas",
    "agentless_container",
];

/// Credit counts per resource type.
///
/// Every key is required: a record missing one of them does not
/// deserialize, which makes the whole page malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceTypeCounts {
    pub container: i64,
    pub iam: i64,
    pub container_caas: i64,
    pub data_store: i64,
    pub agentless_host: i64,
    pub host: i64,
    pub serverless: i64,
    pub iaas: i64,
    pub waas: i64,
    pub agentless_container: i64,
}

impl ResourceTypeCounts {
    /// Counts in `RESOURCE_TYPE_KEYS` order
    pub fn values(&self) -> [i64; 10] {
        [
            self.container,
            self.iam,
            self.container_caas,
            self.data_store,
            self.agentless_host,
            self.host,
            self.serverless,
            self.iaas,
            self.waas,
            self.agentless_container,
        ]
    }
}

/// Account reference carried by a usage record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Credit usage statistics for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageRecord {
    pub account: AccountRef,
    pub cloud_type: CloudType,
    pub total: i64,
    #[serde(rename = "resourceTypeCount", alias = "resourceTypeCounts")]
    pub resource_type_counts: ResourceTypeCounts,
}

impl UsageRecord {
    /// Account id, treating an empty string the same as a missing one
    pub fn account_id(&self) -> Option<&str> {
        self.account.id.as_deref().filter(|id| !id.is_empty())
    }
}

/// One page of `POST /license/api/v2/usage`
///
/// Both fields must be present; `nextPageToken` may be null.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePage {
    pub items: Vec<UsageRecord>,
    #[serde(deserialize_with = "required_nullable")]
    pub next_page_token: Option<String>,
}

impl UsagePage {
    /// Continuation token for the next request, `None` once exhausted
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token.as_deref().filter(|t| !t.is_empty())
    }
}

// Using deserialize_with turns off serde's implicit `None` for absent Option fields.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}
