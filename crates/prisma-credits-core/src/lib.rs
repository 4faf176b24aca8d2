//! prisma-credits-core - Core library for prisma-credits
//!
//! Token-authenticated retrieval of credit usage, account-group directory
//! indexing, the usage × group fan-out join, and CSV/JSON export.

pub mod auth;
pub mod config;
pub mod directory;
pub mod error;
pub mod export;
pub mod join;
pub mod pipeline;
pub mod transport;
pub mod usage;

pub use auth::{Credentials, TokenProvider};
pub use config::{ExportConfig, OutputFormat};
pub use directory::{build_index, AccountDirectory, DirectoryIndex};
pub use error::{CreditsError, DirectoryError, DropReason, DroppedRecord, RunReport};
pub use export::{export_rows_to_csv, export_rows_to_json, Exporter};
pub use join::{join, JoinOutcome, JoinReporter, NoopReporter, TracingReporter};
pub use pipeline::{run_export, run_export_at, RunSummary};
pub use transport::{ApiRequest, ApiResponse, AuthToken, HttpTransport, Transport};
pub use usage::{UsageCollection, UsageCollector, UsageQuery};
