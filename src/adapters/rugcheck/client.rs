//! RugCheck Provider Client
//!
//! HTTP implementation of the `TokenDataProvider` port against a
//! RugCheck-style REST API (`/tokens/{mint}/report/summary` and
//! `/tokens/{mint}/insiders/graph`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::domain::{RawRiskReport, TokenGraph};
use crate::ports::{ProviderError, TokenDataProvider};

use super::types::{into_graph, ReportSummaryResponse, WireNetwork};

/// Errors that can occur when talking to the RugCheck API
#[derive(Debug, Error)]
pub enum RugcheckError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("failed to parse response: {0}")]
    ParseError(String),

    #[error("token {0} not found")]
    TokenNotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("rate limited, try again later")]
    RateLimited,

    #[error("unexpected status {0}")]
    UnexpectedStatus(StatusCode),
}

impl RugcheckError {
    fn into_provider_error(self, timeout: Duration) -> ProviderError {
        match self {
            RugcheckError::HttpError(e) if e.is_timeout() => ProviderError::Timeout(timeout),
            RugcheckError::HttpError(e) => ProviderError::Network(e.to_string()),
            RugcheckError::ParseError(msg) => ProviderError::Malformed(msg),
            RugcheckError::TokenNotFound(token) => ProviderError::NotFound(token),
            RugcheckError::BadRequest(msg) => ProviderError::Malformed(msg),
            RugcheckError::RateLimited => ProviderError::RateLimited,
            RugcheckError::UnexpectedStatus(status) => {
                ProviderError::Network(format!("unexpected status {status}"))
            }
        }
    }
}

/// Configuration for the RugcheckClient
#[derive(Debug, Clone)]
pub struct RugcheckConfig {
    /// API base URL, without trailing slash
    pub base_url: String,
    /// Optional bearer token for authenticated endpoints
    pub api_key: Option<String>,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for RugcheckConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.rugcheck.xyz/v1".to_string(),
            api_key: None,
            timeout: Duration::from_secs(30),
        }
    }
}

impl RugcheckConfig {
    /// Create config with a custom base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// Client for the RugCheck-style report/graph provider
#[derive(Debug, Clone)]
pub struct RugcheckClient {
    config: RugcheckConfig,
    http: Client,
}

impl RugcheckClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self, RugcheckError> {
        Self::with_config(RugcheckConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: RugcheckConfig) -> Result<Self, RugcheckError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, http })
    }

    /// Fetch and map the report summary for a token
    pub async fn report_summary(&self, token: &str) -> Result<RawRiskReport, RugcheckError> {
        let url = format!("{}/tokens/{}/report/summary", self.config.base_url, token);
        let response: ReportSummaryResponse = self.get_json(&url, token).await?;
        Ok(response.into_report(token))
    }

    /// Fetch and merge the insider graph networks for a token
    pub async fn insider_graph(&self, token: &str) -> Result<TokenGraph, RugcheckError> {
        let url = format!("{}/tokens/{}/insiders/graph", self.config.base_url, token);
        let networks: Vec<WireNetwork> = self.get_json(&url, token).await?;
        Ok(into_graph(networks, token))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        token: &str,
    ) -> Result<T, RugcheckError> {
        let mut request = self.http.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| {
                    tracing::error!(%token, error = %e, "undecodable provider response");
                    RugcheckError::ParseError(e.to_string())
                })
            }
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(%token, %body, "bad request rejected by provider");
                Err(RugcheckError::BadRequest(body))
            }
            StatusCode::NOT_FOUND => {
                tracing::warn!(%token, "token not known to provider");
                Err(RugcheckError::TokenNotFound(token.to_string()))
            }
            StatusCode::TOO_MANY_REQUESTS => {
                tracing::warn!(%token, "provider rate limit hit");
                Err(RugcheckError::RateLimited)
            }
            status => Err(RugcheckError::UnexpectedStatus(status)),
        }
    }
}

#[async_trait]
impl TokenDataProvider for RugcheckClient {
    async fn fetch_report(&self, token: &str) -> Result<RawRiskReport, ProviderError> {
        self.report_summary(token)
            .await
            .map_err(|e| e.into_provider_error(self.config.timeout))
    }

    async fn fetch_graph(&self, token: &str) -> Result<TokenGraph, ProviderError> {
        self.insider_graph(token)
            .await
            .map_err(|e| e.into_provider_error(self.config.timeout))
    }
}
