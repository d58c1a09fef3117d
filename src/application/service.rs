//! Risk Intelligence Service
//!
//! Orchestrates the report cache, risk aggregator, graph analyzer and vote
//! reconciler behind one entry point. Consumers (a social bot listener, an
//! API handler) call in with a token or (wallet, token) pair and get
//! structured results back; presentation is entirely theirs.

use std::sync::Arc;

use thiserror::Error;

use crate::adapters::report_cache::{CacheError, CacheSettings, ReportCache};
use crate::domain::graph::GraphError;
use crate::domain::{
    InsiderGraphAnalyzer, InsiderGraphResult, ReputationRecord, RiskAggregator, RiskScore,
    VoteDirection, VoteError, VoteReconciler, WalletRole,
};
use crate::ports::TokenDataProvider;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Fetch(#[from] CacheError),

    #[error(transparent)]
    Vote(#[from] VoteError),
}

/// Combined analysis result for one token.
///
/// A missing score means the provider's report was unusable; a missing
/// graph means the token has no holder edges. Both are normal outcomes,
/// distinct from fetch failures which surface as errors.
#[derive(Debug, Clone)]
pub struct TokenIntelligence {
    pub token: String,
    pub score: Option<RiskScore>,
    pub graph: Option<InsiderGraphResult>,
    pub reputation: ReputationRecord,
}

/// Result of looking a wallet up within a token's holder graph.
#[derive(Debug, Clone)]
pub struct WalletIntelligence {
    pub wallet: String,
    pub token: String,
    /// Whether the wallet appears in the holder graph at all
    pub found: bool,
    pub holdings: f64,
    pub role: Option<WalletRole>,
    pub token_intel: TokenIntelligence,
}

/// Settings for all service components.
#[derive(Debug, Clone, Default)]
pub struct ServiceSettings {
    pub cache: CacheSettings,
    pub aggregator: RiskAggregator,
    pub analyzer: InsiderGraphAnalyzer,
}

/// Facade over the risk intelligence core.
#[derive(Clone)]
pub struct RiskIntelligenceService {
    cache: ReportCache,
    aggregator: RiskAggregator,
    analyzer: InsiderGraphAnalyzer,
    reconciler: Arc<VoteReconciler>,
}

impl RiskIntelligenceService {
    pub fn new(provider: Arc<dyn TokenDataProvider>) -> Self {
        Self::with_settings(provider, ServiceSettings::default())
    }

    pub fn with_settings(provider: Arc<dyn TokenDataProvider>, settings: ServiceSettings) -> Self {
        Self {
            cache: ReportCache::with_settings(provider, settings.cache),
            aggregator: settings.aggregator,
            analyzer: settings.analyzer,
            reconciler: Arc::new(VoteReconciler::new()),
        }
    }

    /// Analyze a token: fetch (or reuse) its raw data, then score and
    /// classify concurrently and attach the current reputation snapshot.
    ///
    /// An invalid report downgrades to "score unavailable" and an edgeless
    /// graph to "no graph data"; only fetch failures are returned as errors.
    pub async fn analyze_token(&self, token: &str) -> Result<TokenIntelligence, ServiceError> {
        let snapshot = self.cache.get_or_fetch(token).await?;

        // Both computations are pure; neither orders before the other.
        let (score_result, graph_result) = tokio::join!(
            async { self.aggregator.aggregate(&snapshot.report) },
            async { self.analyzer.analyze(&snapshot.graph) },
        );

        let score = match score_result {
            Ok(score) => Some(score),
            Err(error) => {
                tracing::warn!(%token, %error, "score unavailable");
                None
            }
        };

        let graph = match graph_result {
            Ok(graph) => Some(graph),
            Err(GraphError::EmptyGraph(_)) => {
                tracing::info!(%token, "no holder graph data");
                None
            }
        };

        Ok(TokenIntelligence {
            token: token.to_string(),
            score,
            graph,
            reputation: self.reconciler.get_reputation(token),
        })
    }

    /// Analyze a wallet's position within a token's holder graph.
    ///
    /// Returns the wallet's holdings and classified role alongside the full
    /// token analysis. A wallet absent from the graph is reported as not
    /// found, with zero holdings and no role.
    pub async fn analyze_wallet(
        &self,
        wallet: &str,
        token: &str,
    ) -> Result<WalletIntelligence, ServiceError> {
        let token_intel = self.analyze_token(token).await?;

        let node = token_intel
            .graph
            .as_ref()
            .and_then(|graph| graph.wallet(wallet));

        let (found, holdings, role) = match node {
            Some(node) => (true, node.balance, Some(node.role)),
            None => (false, 0.0, None),
        };

        Ok(WalletIntelligence {
            wallet: wallet.to_string(),
            token: token.to_string(),
            found,
            holdings,
            role,
            token_intel,
        })
    }

    /// Record a vote from a typed direction.
    pub fn submit_vote(&self, token: &str, user: &str, direction: VoteDirection) -> ReputationRecord {
        self.reconciler.submit_vote(token, user, direction)
    }

    /// Record a vote from the raw text a vote source delivers.
    ///
    /// Rejects anything outside up/down as `InvalidDirection` before any
    /// state is touched.
    pub fn submit_vote_raw(
        &self,
        token: &str,
        user: &str,
        direction: &str,
    ) -> Result<ReputationRecord, ServiceError> {
        let direction: VoteDirection = direction.parse().map_err(ServiceError::Vote)?;
        Ok(self.reconciler.submit_vote(token, user, direction))
    }

    /// Current reputation snapshot for a token.
    pub fn get_reputation(&self, token: &str) -> ReputationRecord {
        self.reconciler.get_reputation(token)
    }
}
