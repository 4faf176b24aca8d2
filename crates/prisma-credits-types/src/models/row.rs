use super::account::AccountGroup;
use super::usage::{CloudType, ResourceTypeCounts, UsageRecord};
use serde::{Deserialize, Serialize};

/// Export column schema, in output order
pub const EXPORT_COLUMNS: [&str; 16] = [
    "accountName",
    "accountId",
    "groupName",
    "groupId",
    "cloudType",
    "total",
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

/// One usage record flattened against one of its account's groups.
///
/// Field order matches `EXPORT_COLUMNS`, so the JSON export uses the same
/// names and ordering as the CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedRow {
    pub account_name: String,
    pub account_id: String,
    pub group_name: String,
    pub group_id: String,
    pub cloud_type: CloudType,
    pub total: i64,
    #[serde(flatten)]
    pub resource_type_counts: ResourceTypeCounts,
}

impl JoinedRow {
    /// Combine a usage record with one matched group
    pub fn new(account_id: &str, record: &UsageRecord, group: &AccountGroup) -> Self {
        Self {
            account_name: record.account.name.clone().unwrap_or_default(),
            account_id: account_id.to_string(),
            group_name: group.name.clone(),
            group_id: group.id.clone(),
            cloud_type: record.cloud_type,
            total: record.total,
            resource_type_counts: record.resource_type_counts,
        }
    }

    /// Cell values in `EXPORT_COLUMNS` order
    pub fn to_record(&self) -> Vec<String> {
        let mut cells = Vec::with_capacity(EXPORT_COLUMNS.len());
        cells.push(self.account_name.clone());
        cells.push(self.account_id.clone());
        cells.push(self.group_name.clone());
        cells.push(self.group_id.clone());
        cells.push(self.cloud_type.to_string());
        cells.push(self.total.to_string());
        cells.extend(
            self.resource_type_counts
                .values()
                .iter()
                .map(|count| count.to_string()),
        );
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AccountRef;

    fn sample_row() -> JoinedRow {
        let record = UsageRecord {
            account: AccountRef {
                id: Some("A1".to_string()),
                name: Some("AcctOne".to_string()),
            },
            cloud_type: CloudType::Gcp,
            total: 42,
            resource_type_counts: ResourceTypeCounts {
                host: 5,
                ..Default::default()
            },
        };
        JoinedRow::new("A1", &record, &AccountGroup::new("G1", "Prod"))
    }

    #[test]
    fn test_record_follows_column_order() {
        let cells = sample_row().to_record();
        assert_eq!(cells.len(), EXPORT_COLUMNS.len());
        assert_eq!(
            cells,
            [
                "AcctOne", "A1", "Prod", "G1", "gcp", "42", "0", "0", "0", "0", "0", "5", "0",
                "0", "0", "0"
            ]
        );
    }

    #[test]
    fn test_json_keys_match_columns() {
        let value = serde_json::to_value(sample_row()).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), EXPORT_COLUMNS.len());
        for column in EXPORT_COLUMNS {
            assert!(object.contains_key(column), "missing {column}");
        }
        assert_eq!(object["host"], 5);
        assert_eq!(object["cloudType"], "gcp");
    }
}
