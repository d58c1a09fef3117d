use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{RawRiskReport, TokenGraph};

use super::provider::{ProviderError, TokenDataProvider};

/// Stub provider that records calls and serves controlled responses.
///
/// Supports canned reports and graphs per token, an optional artificial
/// fetch delay (to force request overlap in concurrency tests) and a
/// per-token budget of injected failures before responses succeed.
#[derive(Debug, Default)]
pub struct StubProvider {
    reports: Mutex<HashMap<String, RawRiskReport>>,
    graphs: Mutex<HashMap<String, TokenGraph>>,
    /// Remaining injected failures per token, consumed by report fetches
    failures: Mutex<HashMap<String, u32>>,
    report_calls: Arc<Mutex<Vec<String>>>,
    graph_calls: Arc<Mutex<Vec<String>>>,
    delay: Option<Duration>,
}

impl StubProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to serve a canned report for its token
    pub fn with_report(self, report: RawRiskReport) -> Self {
        self.reports
            .lock()
            .unwrap()
            .insert(report.token.clone(), report);
        self
    }

    /// Builder method to serve a canned graph for its token
    pub fn with_graph(self, graph: TokenGraph) -> Self {
        self.graphs
            .lock()
            .unwrap()
            .insert(graph.token.clone(), graph);
        self
    }

    /// Builder method to fail the next `count` report fetches for a token
    pub fn with_failures(self, token: &str, count: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(token.to_string(), count);
        self
    }

    /// Builder method to delay every fetch, forcing overlap under load
    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// All recorded report-fetch calls, in order
    pub fn report_calls(&self) -> Vec<String> {
        self.report_calls.lock().unwrap().clone()
    }

    /// Number of report fetches issued for a token
    pub fn report_call_count(&self, token: &str) -> usize {
        self.report_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == token)
            .count()
    }

    /// All recorded graph-fetch calls, in order
    pub fn graph_calls(&self) -> Vec<String> {
        self.graph_calls.lock().unwrap().clone()
    }

    fn take_failure(&self, token: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        match failures.get_mut(token) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl TokenDataProvider for StubProvider {
    async fn fetch_report(&self, token: &str) -> Result<RawRiskReport, ProviderError> {
        self.report_calls.lock().unwrap().push(token.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.take_failure(token) {
            return Err(ProviderError::Network("injected failure".to_string()));
        }
        self.reports
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(token.to_string()))
    }

    async fn fetch_graph(&self, token: &str) -> Result<TokenGraph, ProviderError> {
        self.graph_calls.lock().unwrap().push(token.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.graphs
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RiskSignal;

    #[tokio::test]
    async fn test_stub_serves_canned_report() {
        let provider = StubProvider::new().with_report(RawRiskReport::new(
            "mint-a",
            vec![RiskSignal::new("honeypot", 40.0, "")],
        ));

        let report = provider.fetch_report("mint-a").await.unwrap();
        assert_eq!(report.signals.len(), 1);
        assert_eq!(provider.report_calls(), vec!["mint-a".to_string()]);
    }

    #[tokio::test]
    async fn test_stub_unknown_token_not_found() {
        let provider = StubProvider::new();
        let result = provider.fetch_report("missing").await;
        assert_eq!(result, Err(ProviderError::NotFound("missing".to_string())));
    }

    #[tokio::test]
    async fn test_stub_injected_failures_drain() {
        let provider = StubProvider::new()
            .with_report(RawRiskReport::new(
                "mint-a",
                vec![RiskSignal::new("x", 10.0, "")],
            ))
            .with_failures("mint-a", 1);

        assert!(provider.fetch_report("mint-a").await.is_err());
        assert!(provider.fetch_report("mint-a").await.is_ok());
        assert_eq!(provider.report_call_count("mint-a"), 2);
    }
}
