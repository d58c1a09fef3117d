//! Risk Aggregator
//!
//! Turns a raw risk report into a normalized composite score. Aggregation is
//! a pure function of the report: identical input yields an identical
//! `RiskScore` on every call.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::report::{RawRiskReport, RiskSignal};

/// Default bound on a single signal's absolute weight
pub const DEFAULT_MAX_SIGNAL_WEIGHT: f64 = 10_000.0;

/// Default number of top signals surfaced on the score
pub const DEFAULT_TOP_SIGNALS: usize = 3;

/// Inclusive lower bound of the Medium bucket
pub const MEDIUM_THRESHOLD: f64 = 20.0;
/// Inclusive lower bound of the High bucket
pub const HIGH_THRESHOLD: f64 = 50.0;
/// Inclusive lower bound of the Critical bucket
pub const CRITICAL_THRESHOLD: f64 = 80.0;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScoreError {
    #[error("invalid report for {token}: {reason}")]
    InvalidReport { token: String, reason: String },
}

/// Bucketed risk level derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// Bucket a score in [0,100]. Bucket boundaries are inclusive lower
    /// bounds: Low [0,20), Medium [20,50), High [50,80), Critical [80,100].
    pub fn from_score(score: f64) -> Self {
        if score >= CRITICAL_THRESHOLD {
            RiskLevel::Critical
        } else if score >= HIGH_THRESHOLD {
            RiskLevel::High
        } else if score >= MEDIUM_THRESHOLD {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    /// Returns a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Few or mild risk signals detected",
            RiskLevel::Medium => "Moderate risk signals, review before interacting",
            RiskLevel::High => "Significant risk signals, interaction discouraged",
            RiskLevel::Critical => "Critical risk - strong indicators of a scam",
        }
    }
}

/// Normalized risk score for a token.
///
/// Derived data: recomputed on every aggregation call, never mutated in
/// place. The score is always within [0,100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskScore {
    /// Token mint address
    pub token: String,
    /// Composite score in [0,100]
    pub score: f64,
    /// Bucketed level derived from the score
    pub level: RiskLevel,
    /// Highest-weighted signals, descending, ties in report order
    pub top_signals: Vec<RiskSignal>,
}

/// Aggregates raw risk reports into normalized scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAggregator {
    /// Reject reports containing a signal with |weight| above this bound
    pub max_signal_weight: f64,
    /// How many top signals to surface
    pub top_signals: usize,
}

impl Default for RiskAggregator {
    fn default() -> Self {
        Self {
            max_signal_weight: DEFAULT_MAX_SIGNAL_WEIGHT,
            top_signals: DEFAULT_TOP_SIGNALS,
        }
    }
}

impl RiskAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate a raw report into a `RiskScore`.
    ///
    /// Sums signal weights and clamps the result to [0,100]. Top signals are
    /// selected by weight descending; ties keep the original report order
    /// (stable sort), so repeated runs on the same report produce identical
    /// output.
    ///
    /// Returns `InvalidReport` when the report has no signals or contains a
    /// weight that is non-finite or outside the configured bound. Callers
    /// must treat that as "score unavailable", not as a fatal condition.
    pub fn aggregate(&self, report: &RawRiskReport) -> Result<RiskScore, ScoreError> {
        if report.is_empty() {
            return Err(ScoreError::InvalidReport {
                token: report.token.clone(),
                reason: "report contains no risk signals".to_string(),
            });
        }

        for signal in &report.signals {
            if !signal.weight.is_finite() || signal.weight.abs() > self.max_signal_weight {
                return Err(ScoreError::InvalidReport {
                    token: report.token.clone(),
                    reason: format!(
                        "signal '{}' has weight {} outside ±{}",
                        signal.name, signal.weight, self.max_signal_weight
                    ),
                });
            }
        }

        let raw_sum: f64 = report.signals.iter().map(|s| s.weight).sum();
        let score = raw_sum.clamp(0.0, 100.0);
        let level = RiskLevel::from_score(score);

        // Stable sort keeps report order among equal weights.
        let mut ranked: Vec<&RiskSignal> = report.signals.iter().collect();
        ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        let top_signals = ranked
            .into_iter()
            .take(self.top_signals)
            .cloned()
            .collect();

        tracing::debug!(
            token = %report.token,
            raw_sum,
            score,
            ?level,
            "aggregated risk report"
        );

        Ok(RiskScore {
            token: report.token.clone(),
            score,
            level,
            top_signals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::report::RiskSignal;
    use approx::assert_relative_eq;

    fn report_with(signals: Vec<RiskSignal>) -> RawRiskReport {
        RawRiskReport::new("Mint1111111111111111111111111111111111111111", signals)
    }

    #[test]
    fn test_honeypot_report_scores_critical() {
        let report = report_with(vec![
            RiskSignal::new("honeypot", 40.0, "Sell simulation failed"),
            RiskSignal::new("mint-authority", 30.0, "Mint authority not revoked"),
            RiskSignal::new("low-liquidity", 15.0, "Pool liquidity below $5k"),
        ]);

        let score = RiskAggregator::new().aggregate(&report).unwrap();

        assert_relative_eq!(score.score, 85.0);
        assert_eq!(score.level, RiskLevel::Critical);
        let names: Vec<&str> = score.top_signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["honeypot", "mint-authority", "low-liquidity"]);
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let report = report_with(vec![
            RiskSignal::new("a", 12.5, ""),
            RiskSignal::new("b", 12.5, ""),
            RiskSignal::new("c", 30.0, ""),
            RiskSignal::new("d", 12.5, ""),
        ]);

        let aggregator = RiskAggregator::new();
        let first = aggregator.aggregate(&report).unwrap();
        for _ in 0..10 {
            assert_eq!(aggregator.aggregate(&report).unwrap(), first);
        }
    }

    #[test]
    fn test_ties_keep_report_order() {
        let report = report_with(vec![
            RiskSignal::new("first", 10.0, ""),
            RiskSignal::new("second", 10.0, ""),
            RiskSignal::new("third", 10.0, ""),
            RiskSignal::new("fourth", 10.0, ""),
        ]);

        let score = RiskAggregator::new().aggregate(&report).unwrap();
        let names: Vec<&str> = score.top_signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_score_clamped_to_range() {
        let over = report_with(vec![RiskSignal::new("x", 250.0, "")]);
        let under = report_with(vec![RiskSignal::new("y", -50.0, "")]);

        let aggregator = RiskAggregator::new();
        assert_relative_eq!(aggregator.aggregate(&over).unwrap().score, 100.0);
        assert_relative_eq!(aggregator.aggregate(&under).unwrap().score, 0.0);
    }

    #[test]
    fn test_bucket_boundaries_exact() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(19.99), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(20.0), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(49.99), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(79.99), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(80.0), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(100.0), RiskLevel::Critical);
    }

    #[test]
    fn test_empty_report_rejected() {
        let report = report_with(vec![]);
        let result = RiskAggregator::new().aggregate(&report);
        assert!(matches!(result, Err(ScoreError::InvalidReport { .. })));
    }

    #[test]
    fn test_out_of_range_weight_rejected() {
        let report = report_with(vec![
            RiskSignal::new("ok", 10.0, ""),
            RiskSignal::new("absurd", 10_001.0, ""),
        ]);
        let result = RiskAggregator::new().aggregate(&report);
        assert!(matches!(result, Err(ScoreError::InvalidReport { .. })));
    }

    #[test]
    fn test_non_finite_weight_rejected() {
        let report = report_with(vec![RiskSignal::new("nan", f64::NAN, "")]);
        let result = RiskAggregator::new().aggregate(&report);
        assert!(matches!(result, Err(ScoreError::InvalidReport { .. })));
    }

    #[test]
    fn test_negative_weights_mitigate() {
        let report = report_with(vec![
            RiskSignal::new("risky", 60.0, ""),
            RiskSignal::new("lp-locked", -20.0, "Liquidity locked for 12 months"),
        ]);

        let score = RiskAggregator::new().aggregate(&report).unwrap();
        assert_relative_eq!(score.score, 40.0);
        assert_eq!(score.level, RiskLevel::Medium);
    }

    #[test]
    fn test_fewer_signals_than_top_n() {
        let report = report_with(vec![RiskSignal::new("only", 30.0, "")]);
        let score = RiskAggregator::new().aggregate(&report).unwrap();
        assert_eq!(score.top_signals.len(), 1);
    }

    #[test]
    fn test_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert!(RiskLevel::High < RiskLevel::Critical);
    }
}
