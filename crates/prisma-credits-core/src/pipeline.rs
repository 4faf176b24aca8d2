//! Run orchestration: login → directory → usage → join → export
//!
//! Every stage returns a `Result`; the first error ends the run before the
//! export file is created.

use crate::auth::{Credentials, TokenProvider};
use crate::config::ExportConfig;
use crate::directory::{build_index, AccountDirectory};
use crate::error::{CreditsError, RunReport};
use crate::export::Exporter;
use crate::join::{join, JoinReporter};
use crate::transport::Transport;
use crate::usage::UsageCollector;
use chrono::{DateTime, Local};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

/// What a completed run did
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub accounts: usize,
    pub usage_records: usize,
    pub pages: usize,
    pub rows: usize,
    pub report: RunReport,
    pub output_path: PathBuf,
}

/// Run the whole export, stamping the output file with the current time
pub async fn run_export<T: Transport>(
    config: &ExportConfig,
    transport: &T,
    reporter: &dyn JoinReporter,
) -> Result<RunSummary, CreditsError> {
    run_export_at(config, transport, reporter, Local::now()).await
}

/// Run the whole export with an explicit generation timestamp
pub async fn run_export_at<T: Transport>(
    config: &ExportConfig,
    transport: &T,
    reporter: &dyn JoinReporter,
    generated_at: DateTime<Local>,
) -> Result<RunSummary, CreditsError> {
    let start = Instant::now();

    let credentials = Credentials::new(&config.access_key_id, &config.secret_key);
    let token = TokenProvider::new(transport)
        .authenticate(&credentials)
        .await?;

    // Index before collecting usage: a corrupt directory fails the run early
    let accounts = AccountDirectory::new(transport)
        .fetch_accounts(&token)
        .await?;
    let index = build_index(&accounts)?;
    reporter.on_index_built(&index);

    let usage = UsageCollector::new(transport)
        .collect(&token, config.window_months)
        .await?;

    let outcome = join(&usage.records, &index, reporter);

    let output_path = Exporter::new(config.format).export_to_dir(
        &outcome.rows,
        &config.output_dir,
        generated_at,
    )?;

    info!(
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Export complete"
    );

    Ok(RunSummary {
        accounts: accounts.len(),
        usage_records: usage.records.len(),
        pages: usage.pages,
        rows: outcome.rows.len(),
        report: outcome.report,
        output_path,
    })
}
