//! Rugscout - Token Risk Intelligence Core
//!
//! Turns raw on-chain token/wallet data and community votes into three
//! derived artifacts: a composite token risk score, a classification of
//! wallet roles within a token's holder graph, and a tamper-resistant
//! community reputation tally.
//!
//! # Modules
//!
//! - `domain`: Core business logic (RiskAggregator, InsiderGraphAnalyzer, VoteReconciler)
//! - `ports`: Trait abstractions (TokenDataProvider) and test doubles
//! - `adapters`: External implementations (RugCheck client, report cache)
//! - `application`: RiskIntelligenceService orchestration
//! - `config`: Configuration loading and validation

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
