//! Domain Layer - Core risk intelligence logic
//!
//! Pure domain types and algorithms with no external dependencies. All
//! provider interactions happen through the ports layer.
//!
//! - `report`: raw risk-report payloads as fetched from the provider
//! - `score`: composite risk scoring with bucketed levels
//! - `graph`: holder-graph wallet classification and insider clusters
//! - `reputation`: concurrency-safe community vote reconciliation

pub mod graph;
pub mod report;
pub mod reputation;
pub mod score;

pub use graph::{
    EdgeKind, GraphEdge, GraphError, InsiderGraphAnalyzer, InsiderGraphResult, TokenGraph,
    WalletNode, WalletRole,
};
pub use report::{RawRiskReport, RiskSignal};
pub use reputation::{ReputationRecord, Vote, VoteDirection, VoteError, VoteReconciler};
pub use score::{RiskAggregator, RiskLevel, RiskScore, ScoreError};
