//! Data models for prisma-credits

pub mod account;
pub mod row;
pub mod usage;

pub use account::{Account, AccountGroup};
pub use row::{JoinedRow, EXPORT_COLUMNS};
pub use usage::{
    AccountRef, CloudType, ResourceTypeCounts, UsagePage, UsageRecord, RESOURCE_TYPE_KEYS,
};
