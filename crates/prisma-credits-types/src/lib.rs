//! prisma-credits-types - Shared data types for prisma-credits
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no HTTP client - just serde-serializable types.
//!
//! Used by:
//! - prisma-credits-core (retrieval, join and export pipeline)
//! - prisma-credits (binary)

pub mod models;

pub use models::{
    Account, AccountGroup, AccountRef, CloudType, JoinedRow, ResourceTypeCounts, UsagePage,
    UsageRecord, EXPORT_COLUMNS, RESOURCE_TYPE_KEYS,
};
