//! Raw Risk Report
//!
//! Fetched risk-report payloads as delivered by the external provider.
//! Reports are immutable once fetched; the report cache owns them until
//! eviction and downstream components only ever read them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One atomic contributor to a token's risk score.
///
/// Signals carry no identity beyond their position in the report; the
/// aggregator relies on that ordering to break ties deterministically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSignal {
    /// Signal name (e.g. "mint authority not revoked")
    pub name: String,
    /// Severity weight. Positive increases risk, negative mitigates.
    pub weight: f64,
    /// Human-readable description of the signal
    pub description: String,
}

impl RiskSignal {
    pub fn new(name: impl Into<String>, weight: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            description: description.into(),
        }
    }
}

/// A raw risk report for a single token, as fetched from the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRiskReport {
    /// Token mint address this report describes
    pub token: String,
    /// Ordered signal sequence; order is meaningful for tie-breaking
    pub signals: Vec<RiskSignal>,
    /// When the report was fetched from the provider
    pub fetched_at: DateTime<Utc>,
}

impl RawRiskReport {
    /// Create a report stamped with the current time.
    pub fn new(token: impl Into<String>, signals: Vec<RiskSignal>) -> Self {
        Self {
            token: token.into(),
            signals,
            fetched_at: Utc::now(),
        }
    }

    /// Whether the report carries any signals at all.
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_construction() {
        let report = RawRiskReport::new(
            "Mint1111111111111111111111111111111111111111",
            vec![RiskSignal::new("honeypot", 40.0, "Sell simulation failed")],
        );

        assert_eq!(report.token, "Mint1111111111111111111111111111111111111111");
        assert_eq!(report.signals.len(), 1);
        assert!(!report.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = RawRiskReport::new("Mint", vec![]);
        assert!(report.is_empty());
    }

    #[test]
    fn test_signal_order_preserved() {
        let report = RawRiskReport::new(
            "Mint",
            vec![
                RiskSignal::new("a", 10.0, ""),
                RiskSignal::new("b", 10.0, ""),
                RiskSignal::new("c", 5.0, ""),
            ],
        );

        let names: Vec<&str> = report.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
