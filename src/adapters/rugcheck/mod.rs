//! RugCheck provider adapter
//!
//! Implements the `TokenDataProvider` port against a RugCheck-style REST
//! API: report summaries and insider holder graphs per token mint.

pub mod client;
pub mod types;

pub use client::{RugcheckClient, RugcheckConfig, RugcheckError};
