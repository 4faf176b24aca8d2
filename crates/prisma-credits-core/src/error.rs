//! Error types for prisma-credits-core
//!
//! Fatal conditions are `CreditsError` values propagated to the run
//! orchestrator. Dropped usage records are not errors: they are collected
//! in a `RunReport` and the run carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for prisma-credits operations
#[derive(Error, Debug)]
pub enum CreditsError {
    // ===================
    // Authentication
    // ===================
    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    // ===================
    // Account directory
    // ===================
    #[error("Failed to fetch cloud accounts: {reason}")]
    DirectoryFetch { reason: String },

    #[error("Account directory is corrupt: {0}")]
    Directory(#[from] DirectoryError),

    // ===================
    // Usage pagination
    // ===================
    #[error("Malformed usage page {page}: {reason}")]
    MalformedPage { page: usize, reason: String },

    // ===================
    // Transport
    // ===================
    #[error("{endpoint} returned HTTP {status}: {body}")]
    UnexpectedStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Request to {endpoint} failed")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    // ===================
    // Export
    // ===================
    #[error("Failed to write export: {path}")]
    Export {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl CreditsError {
    /// Actionable hint shown next to the error message, when one exists
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            CreditsError::Auth { .. } => {
                Some("Check PRISMA_ACCESS_KEY_ID / PRISMA_SECRET_KEY and that the key is not expired")
            }
            CreditsError::Directory(_) => {
                Some("Inspect the account listing: every account needs a unique id and at least one group")
            }
            CreditsError::Transport { .. } => {
                Some("Check PRISMA_CREDITS_BASE_URL and network connectivity")
            }
            CreditsError::InvalidConfig { .. } => {
                Some("Set the missing values in config.toml or the PRISMA_* environment variables")
            }
            _ => None,
        }
    }
}

/// Invalid account entry found while building the directory index
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("account #{position} has no account id")]
    MissingAccountId { position: usize },

    #[error("account {account_id} has no groups")]
    MissingGroups { account_id: String },

    #[error("duplicate account id {account_id}")]
    DuplicateAccountId { account_id: String },
}

/// Why a usage record produced no export rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// The record's account id is null or empty
    MissingAccountId,
    /// The account id is not present in the directory index
    UnknownAccount,
}

/// A usage record excluded from the export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedRecord {
    /// Position of the record in the collected usage sequence
    pub position: usize,
    pub account_id: Option<String>,
    pub reason: DropReason,
}

/// Report of non-fatal conditions encountered during a run
#[derive(Debug, Default, Clone)]
pub struct RunReport {
    pub dropped: Vec<DroppedRecord>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_dropped(&mut self, dropped: DroppedRecord) {
        self.dropped.push(dropped);
    }

    /// Returns true if any record was left out of the export
    pub fn has_drops(&self) -> bool {
        !self.dropped.is_empty()
    }

    /// Returns count by reason: (missing account id, unknown account)
    pub fn drop_count(&self) -> (usize, usize) {
        let missing = self
            .dropped
            .iter()
            .filter(|d| d.reason == DropReason::MissingAccountId)
            .count();
        let unknown = self
            .dropped
            .iter()
            .filter(|d| d.reason == DropReason::UnknownAccount)
            .count();
        (missing, unknown)
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: RunReport) {
        self.dropped.extend(other.dropped);
    }
}
