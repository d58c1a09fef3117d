//! Risk Intelligence Integration Tests
//!
//! Integration tests that verify the core components work together:
//! 1. ReportCache -> RiskAggregator / InsiderGraphAnalyzer flow
//! 2. Singleflight fetch deduplication under concurrent load
//! 3. Vote reconciliation through the service facade
//!
//! All tests are deterministic (no real network calls) and use the stub
//! provider from the ports layer.

use std::sync::Arc;
use std::time::Duration;

use rugscout::application::{RiskIntelligenceService, ServiceError, ServiceSettings};
use rugscout::domain::{
    EdgeKind, GraphEdge, RawRiskReport, RiskLevel, RiskSignal, TokenGraph, VoteDirection,
    WalletRole,
};
use rugscout::ports::mocks::StubProvider;
use rugscout::ports::TokenDataProvider;

const TOKEN: &str = "Mint1111111111111111111111111111111111111111";

fn init_logs() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

// ============================================================================
// Test Fixtures
// ============================================================================

/// The classic honeypot report: 40 + 30 + 15 = 85, Critical.
fn honeypot_report() -> RawRiskReport {
    RawRiskReport::new(
        TOKEN,
        vec![
            RiskSignal::new("honeypot", 40.0, "Sell simulation failed"),
            RiskSignal::new("mint-authority", 30.0, "Mint authority not revoked"),
            RiskSignal::new("low-liquidity", 15.0, "Pool liquidity below $5k"),
        ],
    )
}

/// Holder graph with a creator, two insider hops, an outside participant
/// and a concentrated cluster.
fn holder_graph() -> TokenGraph {
    TokenGraph::new(
        TOKEN,
        vec![
            GraphEdge::new("creator", "insider-a", 200_000.0, EdgeKind::Mint),
            GraphEdge::new("insider-a", "insider-b", 80_000.0, EdgeKind::Transfer),
            GraphEdge::new("insider-b", "outsider", 1_000.0, EdgeKind::Transfer),
            GraphEdge::new("whale-x", "whale-y", 50_000.0, EdgeKind::Transfer),
        ],
        1_000_000.0,
    )
}

fn full_provider() -> StubProvider {
    StubProvider::new()
        .with_report(honeypot_report())
        .with_graph(holder_graph())
}

fn service_over(provider: StubProvider) -> (Arc<StubProvider>, RiskIntelligenceService) {
    let provider = Arc::new(provider);
    let service = RiskIntelligenceService::new(Arc::clone(&provider) as Arc<dyn TokenDataProvider>);
    (provider, service)
}

// ============================================================================
// Combined analysis
// ============================================================================

#[tokio::test]
async fn analyze_token_produces_score_graph_and_reputation() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    let intel = service.analyze_token(TOKEN).await.unwrap();

    let score = intel.score.expect("score should be available");
    assert_eq!(score.score, 85.0);
    assert_eq!(score.level, RiskLevel::Critical);
    let names: Vec<&str> = score.top_signals.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["honeypot", "mint-authority", "low-liquidity"]);

    let graph = intel.graph.expect("graph should be available");
    assert_eq!(graph.wallet("creator").unwrap().role, WalletRole::Creator);
    assert_eq!(graph.wallet("insider-a").unwrap().role, WalletRole::Insider);
    assert_eq!(graph.wallet("insider-b").unwrap().role, WalletRole::Insider);
    assert_eq!(graph.wallet("outsider").unwrap().role, WalletRole::Participant);

    // whale-x -> whale-y carries 5% of supply: one cluster of two.
    assert_eq!(graph.clusters.len(), 1);
    assert!(graph.clusters[0].contains("whale-x"));
    assert!(graph.clusters[0].contains("whale-y"));

    assert_eq!(intel.reputation.net_tally(), 0);
}

#[tokio::test]
async fn repeated_analysis_is_deterministic() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    let first = service.analyze_token(TOKEN).await.unwrap();
    let second = service.analyze_token(TOKEN).await.unwrap();

    assert_eq!(first.score, second.score);
    assert_eq!(
        first.graph.as_ref().map(|g| g.wallets.len()),
        second.graph.as_ref().map(|g| g.wallets.len())
    );
}

#[tokio::test]
async fn wallet_analysis_reports_holdings_and_role() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    let found = service.analyze_wallet("insider-a", TOKEN).await.unwrap();
    assert!(found.found);
    assert_eq!(found.role, Some(WalletRole::Insider));
    assert_eq!(found.holdings, 120_000.0);

    let missing = service.analyze_wallet("nobody", TOKEN).await.unwrap();
    assert!(!missing.found);
    assert_eq!(missing.holdings, 0.0);
    assert!(missing.role.is_none());
}

// ============================================================================
// Cache behavior through the service
// ============================================================================

#[tokio::test]
async fn concurrent_analysis_issues_one_fetch() {
    init_logs();
    let (provider, service) = service_over(
        full_provider().with_fetch_delay(Duration::from_millis(50)),
    );

    let mut handles = Vec::new();
    for _ in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.analyze_token(TOKEN).await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(provider.report_call_count(TOKEN), 1);
}

#[tokio::test]
async fn sequential_analysis_reuses_cached_snapshot() {
    init_logs();
    let (provider, service) = service_over(full_provider());

    service.analyze_token(TOKEN).await.unwrap();
    service.analyze_wallet("insider-a", TOKEN).await.unwrap();

    assert_eq!(provider.report_call_count(TOKEN), 1);
}

#[tokio::test]
async fn transient_fetch_failure_is_not_cached() {
    init_logs();
    let (provider, service) = service_over(full_provider().with_failures(TOKEN, 1));

    let first = service.analyze_token(TOKEN).await;
    assert!(matches!(first, Err(ServiceError::Fetch(_))));

    let second = service.analyze_token(TOKEN).await;
    assert!(second.is_ok());
    assert_eq!(provider.report_call_count(TOKEN), 2);
}

#[tokio::test]
async fn short_freshness_window_triggers_refetch() {
    init_logs();
    let provider = Arc::new(full_provider());
    let settings = ServiceSettings {
        cache: rugscout::adapters::CacheSettings {
            freshness_window: Duration::from_millis(10),
            ..Default::default()
        },
        ..Default::default()
    };
    let service = RiskIntelligenceService::with_settings(
        Arc::clone(&provider) as Arc<dyn TokenDataProvider>,
        settings,
    );

    service.analyze_token(TOKEN).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    service.analyze_token(TOKEN).await.unwrap();

    assert_eq!(provider.report_call_count(TOKEN), 2);
}

// ============================================================================
// Vote reconciliation
// ============================================================================

#[tokio::test]
async fn vote_lifecycle_up_down_up() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    service.submit_vote_raw(TOKEN, "alice", "up").unwrap();
    service.submit_vote_raw(TOKEN, "alice", "down").unwrap();
    let record = service.submit_vote_raw(TOKEN, "alice", "up").unwrap();

    assert_eq!(record.upvotes, 1);
    assert_eq!(record.downvotes, 0);
    assert_eq!(record.user_vote("alice"), Some(VoteDirection::Up));
}

#[tokio::test]
async fn duplicate_votes_do_not_accumulate() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    service.submit_vote(TOKEN, "alice", VoteDirection::Up);
    let record = service.submit_vote(TOKEN, "alice", VoteDirection::Up);

    assert_eq!(record.upvotes, 1);
    assert_eq!(record.total_voters(), 1);
}

#[tokio::test]
async fn invalid_direction_rejected_without_side_effects() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    let result = service.submit_vote_raw(TOKEN, "alice", "sideways");
    assert!(matches!(result, Err(ServiceError::Vote(_))));
    assert_eq!(service.get_reputation(TOKEN).total_voters(), 0);
}

#[tokio::test]
async fn votes_surface_in_token_analysis() {
    init_logs();
    let (_provider, service) = service_over(full_provider());

    service.submit_vote(TOKEN, "alice", VoteDirection::Up);
    service.submit_vote(TOKEN, "bob", VoteDirection::Up);
    service.submit_vote(TOKEN, "carol", VoteDirection::Down);

    let intel = service.analyze_token(TOKEN).await.unwrap();
    assert_eq!(intel.reputation.upvotes, 2);
    assert_eq!(intel.reputation.downvotes, 1);
    assert_eq!(intel.reputation.net_tally(), 1);
}
