//! Fan-out join of usage records against the directory index
//!
//! A usage record whose account belongs to k groups yields k rows, one per
//! group in listing order, duplicates included. Downstream consumers filter
//! or aggregate by group, so the usage figure is attributed to every group.

use crate::directory::DirectoryIndex;
use crate::error::{DropReason, DroppedRecord, RunReport};
use prisma_credits_types::{JoinedRow, UsageRecord};

/// Observability hook for the join stage.
///
/// Every method has an empty default so implementors pick what they need.
pub trait JoinReporter {
    /// Directory index is ready for joining
    fn on_index_built(&self, _index: &DirectoryIndex) {}

    /// A usage record carried no account id and was skipped
    fn on_missing_account_id(&self, _position: usize, _record: &UsageRecord) {}

    /// Join finished
    fn on_rows_joined(&self, _rows: &[JoinedRow], _report: &RunReport) {}
}

/// Reporter that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl JoinReporter for NoopReporter {}

/// Default reporter: summaries at info, full dumps at debug
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl JoinReporter for TracingReporter {
    fn on_index_built(&self, index: &DirectoryIndex) {
        tracing::info!(
            "Indexed {} accounts ({} group memberships)",
            index.len(),
            index.membership_count()
        );
        for (account_id, groups) in index.iter() {
            tracing::debug!(account_id, ?groups, "Directory entry");
        }
    }

    fn on_missing_account_id(&self, position: usize, record: &UsageRecord) {
        tracing::warn!(
            position,
            account_name = record.account.name.as_deref().unwrap_or(""),
            "Usage record has no account id, skipping"
        );
    }

    fn on_rows_joined(&self, rows: &[JoinedRow], report: &RunReport) {
        let (missing, unknown) = report.drop_count();
        tracing::info!(
            "Joined {} rows ({} records without account id, {} records for unknown accounts)",
            rows.len(),
            missing,
            unknown
        );
        for row in rows {
            tracing::debug!(?row, "Joined row");
        }
    }
}

/// Rows produced by a join, plus the records left out
#[derive(Debug, Clone, Default)]
pub struct JoinOutcome {
    pub rows: Vec<JoinedRow>,
    pub report: RunReport,
}

/// Expand each usage record into one row per group of its account.
///
/// - null/empty account id: one diagnostic through `reporter`, no rows
/// - account id absent from the index: no diagnostic, no rows
///
/// Both cases are recorded in the returned report; neither is an error.
pub fn join(
    records: &[UsageRecord],
    index: &DirectoryIndex,
    reporter: &dyn JoinReporter,
) -> JoinOutcome {
    let mut outcome = JoinOutcome::default();

    for (position, record) in records.iter().enumerate() {
        let Some(account_id) = record.account_id() else {
            reporter.on_missing_account_id(position, record);
            outcome.report.add_dropped(DroppedRecord {
                position,
                account_id: None,
                reason: DropReason::MissingAccountId,
            });
            continue;
        };

        let Some(groups) = index.groups(account_id) else {
            outcome.report.add_dropped(DroppedRecord {
                position,
                account_id: Some(account_id.to_string()),
                reason: DropReason::UnknownAccount,
            });
            continue;
        };

        outcome.rows.extend(
            groups
                .iter()
                .map(|group| JoinedRow::new(account_id, record, group)),
        );
    }

    reporter.on_rows_joined(&outcome.rows, &outcome.report);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::build_index;
    use prisma_credits_types::{
        Account, AccountGroup, AccountRef, CloudType, ResourceTypeCounts,
    };
    use std::cell::RefCell;

    #[derive(Default)]
    struct CollectingReporter {
        missing: RefCell<Vec<usize>>,
        finished: RefCell<usize>,
    }

    impl JoinReporter for CollectingReporter {
        fn on_missing_account_id(&self, position: usize, _record: &UsageRecord) {
            self.missing.borrow_mut().push(position);
        }

        fn on_rows_joined(&self, _rows: &[JoinedRow], _report: &RunReport) {
            *self.finished.borrow_mut() += 1;
        }
    }

    fn usage(account_id: Option<&str>, total: i64) -> UsageRecord {
        UsageRecord {
            account: AccountRef {
                id: account_id.map(str::to_string),
                name: Some("AcctOne".to_string()),
            },
            cloud_type: CloudType::Aws,
            total,
            resource_type_counts: ResourceTypeCounts {
                host: 5,
                ..Default::default()
            },
        }
    }

    fn directory() -> DirectoryIndex {
        build_index(&[
            Account::new(
                "A1",
                vec![
                    AccountGroup::new("G1", "Prod"),
                    AccountGroup::new("G2", "Dev"),
                ],
            ),
            Account::new("A2", vec![AccountGroup::new("G3", "Sandbox")]),
        ])
        .unwrap()
    }

    #[test]
    fn test_fan_out_one_row_per_group() {
        let records = vec![usage(Some("A1"), 42)];
        let outcome = join(&records, &directory(), &NoopReporter);

        assert_eq!(outcome.rows.len(), 2);
        assert!(!outcome.report.has_drops());

        let group_ids: Vec<&str> = outcome.rows.iter().map(|r| r.group_id.as_str()).collect();
        assert_eq!(group_ids, ["G1", "G2"]);
        assert_eq!(outcome.rows[1].group_name, "Dev");

        for row in &outcome.rows {
            assert_eq!(row.account_id, "A1");
            assert_eq!(row.account_name, "AcctOne");
            assert_eq!(row.cloud_type, CloudType::Aws);
            assert_eq!(row.total, 42);
            assert_eq!(row.resource_type_counts.host, 5);
            assert_eq!(row.resource_type_counts.iam, 0);
        }
    }

    #[test]
    fn test_duplicate_group_entries_each_produce_a_row() {
        let index = build_index(&[Account::new(
            "A1",
            vec![AccountGroup::new("G1", "Prod"), AccountGroup::new("G1", "Prod")],
        )])
        .unwrap();

        let outcome = join(&[usage(Some("A1"), 1)], &index, &NoopReporter);
        assert_eq!(outcome.rows.len(), 2);
        assert_eq!(outcome.rows[0], outcome.rows[1]);
    }

    #[test]
    fn test_unknown_account_dropped_silently() {
        let reporter = CollectingReporter::default();
        let outcome = join(&[usage(Some("ZZ"), 7)], &directory(), &reporter);

        assert!(outcome.rows.is_empty());
        assert!(reporter.missing.borrow().is_empty());
        assert_eq!(
            outcome.report.dropped,
            vec![DroppedRecord {
                position: 0,
                account_id: Some("ZZ".to_string()),
                reason: DropReason::UnknownAccount,
            }]
        );
    }

    #[test]
    fn test_missing_account_id_emits_one_diagnostic() {
        let reporter = CollectingReporter::default();
        let records = vec![usage(Some("A2"), 1), usage(None, 2), usage(Some(""), 3)];
        let outcome = join(&records, &directory(), &reporter);

        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0].group_id, "G3");
        assert_eq!(*reporter.missing.borrow(), vec![1, 2]);
        assert_eq!(outcome.report.drop_count(), (2, 0));
        assert_eq!(*reporter.finished.borrow(), 1);
    }

    #[test]
    fn test_rows_follow_record_order() {
        let records = vec![
            usage(Some("A2"), 1),
            usage(Some("A1"), 2),
            usage(Some("A2"), 3),
        ];
        let outcome = join(&records, &directory(), &TracingReporter);

        let pairs: Vec<(i64, &str)> = outcome
            .rows
            .iter()
            .map(|r| (r.total, r.group_id.as_str()))
            .collect();
        assert_eq!(pairs, [(1, "G3"), (2, "G1"), (2, "G2"), (3, "G3")]);
    }

    #[test]
    fn test_empty_inputs() {
        let outcome = join(&[], &DirectoryIndex::default(), &NoopReporter);
        assert!(outcome.rows.is_empty());
        assert!(!outcome.report.has_drops());
    }
}
