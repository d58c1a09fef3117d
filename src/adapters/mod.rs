//! Adapters Layer - External System Implementations
//!
//! This module contains implementations of the port traits and the
//! infrastructure wrapped around them:
//! - RugCheck: HTTP report/graph provider client
//! - Report cache: TTL memoization with singleflight fetch deduplication

pub mod report_cache;
pub mod rugcheck;

pub use report_cache::{CacheError, CacheSettings, CacheStats, CachedSnapshot, ReportCache};
pub use rugcheck::{RugcheckClient, RugcheckConfig};
