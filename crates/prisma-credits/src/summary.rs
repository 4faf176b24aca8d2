//! Human-readable run summary printed after a successful export

use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use prisma_credits_core::{DropReason, RunSummary};

/// Dropped records listed individually before the table is truncated
const MAX_DROPPED_LISTED: usize = 10;

/// Format the run summary as a two-column table
pub fn format_run_summary(summary: &RunSummary, no_color: bool) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if no_color {
        table.set_header(vec!["Stage", "Count"]);
    } else {
        table.set_header(vec![
            Cell::new("Stage").fg(Color::Cyan),
            Cell::new("Count").fg(Color::Cyan),
        ]);
    }

    let (missing, unknown) = summary.report.drop_count();
    let rows = [
        ("Accounts in directory", summary.accounts),
        ("Usage pages fetched", summary.pages),
        ("Usage records", summary.usage_records),
        ("Records without account id", missing),
        ("Records for unknown accounts", unknown),
        ("Rows exported", summary.rows),
    ];

    for (label, count) in rows {
        table.add_row(Row::from(vec![label.to_string(), count.to_string()]));
    }

    let mut out = table.to_string();

    if summary.report.has_drops() {
        out.push_str("\n\nSkipped usage records:");
        for dropped in summary.report.dropped.iter().take(MAX_DROPPED_LISTED) {
            let reason = match dropped.reason {
                DropReason::MissingAccountId => "no account id",
                DropReason::UnknownAccount => "account not in directory",
            };
            out.push_str(&format!(
                "\n  #{:<5} {:<20} {}",
                dropped.position,
                dropped.account_id.as_deref().unwrap_or("-"),
                reason
            ));
        }
        let remaining = summary.report.dropped.len().saturating_sub(MAX_DROPPED_LISTED);
        if remaining > 0 {
            out.push_str(&format!("\n  ... and {} more", remaining));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use prisma_credits_core::{DroppedRecord, RunReport};
    use std::path::PathBuf;

    fn summary(dropped: Vec<DroppedRecord>) -> RunSummary {
        RunSummary {
            accounts: 2,
            usage_records: 3,
            pages: 1,
            rows: 4,
            report: RunReport { dropped },
            output_path: PathBuf::from("out.csv"),
        }
    }

    #[test]
    fn test_summary_without_drops() {
        let out = format_run_summary(&summary(vec![]), true);
        assert!(out.contains("Rows exported"));
        assert!(out.contains("Usage records"));
        assert!(!out.contains("Skipped usage records"));
    }

    #[test]
    fn test_summary_lists_drops() {
        let dropped = (0..12)
            .map(|position| DroppedRecord {
                position,
                account_id: Some(format!("acct-{position}")),
                reason: DropReason::UnknownAccount,
            })
            .collect();

        let out = format_run_summary(&summary(dropped), true);
        assert!(out.contains("Skipped usage records"));
        assert!(out.contains("acct-0"));
        assert!(out.contains("account not in directory"));
        assert!(!out.contains("acct-11"));
        assert!(out.contains("... and 2 more"));
    }
}
