//! Ports Layer - Trait definitions for external dependencies
//!
//! This module defines the interfaces (ports) that adapters must implement.
//! Following hexagonal architecture, these traits abstract:
//! - The report/graph data provider (network-bound, retryable)
//!
//! `mocks` holds hand-rolled test doubles for these ports.

pub mod mocks;
pub mod provider;

pub use provider::{ProviderError, TokenDataProvider};
