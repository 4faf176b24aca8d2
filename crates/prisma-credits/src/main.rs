//! prisma-credits - Prisma Cloud credit usage export
//!
//! Logs in, indexes account groups, collects paginated credit usage, and
//! writes one row per (usage record, account group) pair.
//!
//! Configuration: `<config_dir>/prisma-credits/config.toml` or the file named
//! by `PRISMA_CREDITS_CONFIG`, overridden by environment variables:
//!   PRISMA_ACCESS_KEY_ID            # Access key id (required)
//!   PRISMA_SECRET_KEY               # Secret key (required)
//!   PRISMA_CREDITS_BASE_URL         # API base URL
//!   PRISMA_CREDITS_WINDOW_MONTHS    # Relative usage window (default: 3)
//!   PRISMA_CREDITS_OUTPUT_DIR       # Export directory (default: .)
//!   PRISMA_CREDITS_FORMAT           # csv|json (default: csv)
//!   PRISMA_CREDITS_TIMEOUT_SECS     # Per-request timeout (default: 60)
//!   RUST_LOG                        # Log filter (default: info)
//!   NO_COLOR                        # Disable ANSI colors

mod summary;

use anyhow::{Context, Result};
use prisma_credits_core::{run_export, CreditsError, ExportConfig, HttpTransport, TracingReporter};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "prisma_credits=info,prisma_credits_core=info";

#[tokio::main]
async fn main() -> Result<()> {
    let no_color = std::env::var_os("NO_COLOR").is_some();
    init_tracing(no_color);

    let config = ExportConfig::load().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let transport = HttpTransport::new(&config.base_url, config.request_timeout())?;

    let summary = match run_export(&config, &transport, &TracingReporter).await {
        Ok(summary) => summary,
        Err(e) => {
            report_failure(&e);
            return Err(e.into());
        }
    };

    eprintln!("{}", summary::format_run_summary(&summary, no_color));
    println!("Wrote credit data to {}", summary.output_path.display());

    Ok(())
}

fn init_tracing(no_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

fn report_failure(error: &CreditsError) {
    tracing::error!("{}", error);
    if let Some(suggestion) = error.suggestion() {
        eprintln!("  💡 {}", suggestion);
    }
}
