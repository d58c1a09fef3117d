use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{RawRiskReport, TokenGraph};

/// Provider error type
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(String),

    #[error("token {0} not found")]
    NotFound(String),

    #[error("rate limited by provider")]
    RateLimited,

    #[error("malformed provider response: {0}")]
    Malformed(String),

    #[error("provider request timed out after {0:?}")]
    Timeout(Duration),
}

/// Report/graph provider port trait
///
/// Abstracts the external data provider that supplies raw risk reports and
/// holder graphs per token. Calls are opaque, network-bound and retryable by
/// the caller; the core never retries on its own.
#[async_trait]
pub trait TokenDataProvider: Send + Sync {
    /// Fetch the raw risk report for a token
    async fn fetch_report(&self, token: &str) -> Result<RawRiskReport, ProviderError>;

    /// Fetch the holder graph for a token
    async fn fetch_graph(&self, token: &str) -> Result<TokenGraph, ProviderError>;
}
