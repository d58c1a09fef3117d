//! Insider Graph Analyzer
//!
//! Classifies wallet roles in a token's holder graph and detects insider
//! clusters. The graph is directed and may contain cycles (wallets can
//! exchange tokens bidirectionally), so wallets live in a flat table keyed
//! by address and edges are address pairs, never object links.

use std::collections::{BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default hop distance from the creator that still counts as insider
pub const DEFAULT_INSIDER_HOP_LIMIT: usize = 2;

/// Default fraction of total supply an edge must carry to qualify for
/// cluster detection
pub const DEFAULT_CLUSTER_EDGE_FRACTION: f64 = 0.01;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// Normal, non-fatal outcome: the token may have a single holder.
    #[error("no holder graph edges for token {0}")]
    EmptyGraph(String),
}

/// Kind of a holder-graph edge.
///
/// `Mint` marks the token's initial minting edge; its source wallet is the
/// creator when the provider passes no explicit designation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeKind {
    Mint,
    Transfer,
    Holding,
}

/// A directed token-flow edge between two wallets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub dest: String,
    /// Token amount carried by the edge
    pub amount: f64,
    pub kind: EdgeKind,
}

impl GraphEdge {
    pub fn new(
        source: impl Into<String>,
        dest: impl Into<String>,
        amount: f64,
        kind: EdgeKind,
    ) -> Self {
        Self {
            source: source.into(),
            dest: dest.into(),
            amount,
            kind,
        }
    }
}

/// Raw holder graph for a token as delivered by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGraph {
    pub token: String,
    pub edges: Vec<GraphEdge>,
    /// Total token supply; the cluster threshold is a fraction of this
    pub total_supply: f64,
    /// Provider's creator designation, when it supplies one
    pub creator: Option<String>,
}

impl TokenGraph {
    pub fn new(token: impl Into<String>, edges: Vec<GraphEdge>, total_supply: f64) -> Self {
        Self {
            token: token.into(),
            edges,
            total_supply,
            creator: None,
        }
    }

    /// Attach the provider's creator designation.
    pub fn with_creator(mut self, creator: impl Into<String>) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

/// Role of a wallet within a token's holder graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletRole {
    Creator,
    Insider,
    Participant,
    Unknown,
}

/// A classified wallet in the holder graph.
///
/// Neighbor sets hold addresses, not node references; they are lookup
/// back-references only and imply no ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletNode {
    pub address: String,
    /// Net token balance derived from edge flows, floored at zero
    pub balance: f64,
    pub role: WalletRole,
    /// Addresses with an edge into this wallet
    pub incoming: BTreeSet<String>,
    /// Addresses this wallet has an edge to
    pub outgoing: BTreeSet<String>,
}

impl WalletNode {
    fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
            balance: 0.0,
            role: WalletRole::Unknown,
            incoming: BTreeSet::new(),
            outgoing: BTreeSet::new(),
        }
    }
}

/// Result of analyzing a token's holder graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsiderGraphResult {
    pub token: String,
    /// Flat wallet table keyed by address
    pub wallets: HashMap<String, WalletNode>,
    /// Detected insider clusters, each holding at least two wallets
    pub clusters: Vec<BTreeSet<String>>,
}

impl InsiderGraphResult {
    /// Look up a single wallet's classification.
    pub fn wallet(&self, address: &str) -> Option<&WalletNode> {
        self.wallets.get(address)
    }

    /// Number of wallets with a given role.
    pub fn count_role(&self, role: WalletRole) -> usize {
        self.wallets.values().filter(|w| w.role == role).count()
    }
}

/// Classifies wallets and detects concentration clusters in holder graphs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsiderGraphAnalyzer {
    /// Maximum hop distance from the creator for the Insider role
    pub insider_hop_limit: usize,
    /// Fraction of total supply an edge must carry to count for clustering
    pub cluster_edge_fraction: f64,
}

impl Default for InsiderGraphAnalyzer {
    fn default() -> Self {
        Self {
            insider_hop_limit: DEFAULT_INSIDER_HOP_LIMIT,
            cluster_edge_fraction: DEFAULT_CLUSTER_EDGE_FRACTION,
        }
    }
}

impl InsiderGraphAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Analyze a token's holder graph.
    ///
    /// Roles are a pure function of graph position: the creator is the
    /// provider-designated wallet (or the source of the first `Mint` edge),
    /// insiders are wallets the creator's tokens reach within the hop limit,
    /// remaining wallets are participants when they hold a balance and
    /// unknown otherwise. Traversal is visited-set bounded and tolerates
    /// cycles.
    ///
    /// Returns `EmptyGraph` for a zero-edge graph.
    pub fn analyze(&self, graph: &TokenGraph) -> Result<InsiderGraphResult, GraphError> {
        if graph.edges.is_empty() {
            return Err(GraphError::EmptyGraph(graph.token.clone()));
        }

        let mut wallets = self.build_arena(&graph.edges);
        let creator = self.identify_creator(graph, &wallets);

        let insiders = match &creator {
            Some(creator) => self.reachable_within(creator, &wallets, self.insider_hop_limit),
            None => BTreeSet::new(),
        };

        for node in wallets.values_mut() {
            node.role = if creator.as_deref() == Some(node.address.as_str()) {
                WalletRole::Creator
            } else if insiders.contains(&node.address) {
                WalletRole::Insider
            } else if node.balance > 0.0 {
                WalletRole::Participant
            } else {
                WalletRole::Unknown
            };
        }

        let clusters = self.detect_clusters(graph);

        tracing::debug!(
            token = %graph.token,
            wallets = wallets.len(),
            insiders = insiders.len(),
            clusters = clusters.len(),
            creator = ?creator,
            "analyzed holder graph"
        );

        Ok(InsiderGraphResult {
            token: graph.token.clone(),
            wallets,
            clusters,
        })
    }

    /// Build the wallet arena with both-direction adjacency and net balances.
    fn build_arena(&self, edges: &[GraphEdge]) -> HashMap<String, WalletNode> {
        let mut wallets: HashMap<String, WalletNode> = HashMap::new();

        for edge in edges {
            wallets
                .entry(edge.source.clone())
                .or_insert_with(|| WalletNode::new(&edge.source))
                .outgoing
                .insert(edge.dest.clone());
            wallets
                .entry(edge.dest.clone())
                .or_insert_with(|| WalletNode::new(&edge.dest))
                .incoming
                .insert(edge.source.clone());

            // Mint edges create tokens at the destination without debiting
            // the source.
            if edge.kind != EdgeKind::Mint {
                if let Some(source) = wallets.get_mut(&edge.source) {
                    source.balance -= edge.amount;
                }
            }
            if let Some(dest) = wallets.get_mut(&edge.dest) {
                dest.balance += edge.amount;
            }
        }

        for node in wallets.values_mut() {
            node.balance = node.balance.max(0.0);
        }

        wallets
    }

    /// Creator designation from the provider wins; the first Mint edge's
    /// source is the fallback marker. Absent both, no wallet is the creator.
    fn identify_creator(
        &self,
        graph: &TokenGraph,
        wallets: &HashMap<String, WalletNode>,
    ) -> Option<String> {
        if let Some(designated) = &graph.creator {
            if wallets.contains_key(designated) {
                return Some(designated.clone());
            }
            tracing::warn!(
                token = %graph.token,
                creator = %designated,
                "provider-designated creator not present in graph"
            );
        }

        graph
            .edges
            .iter()
            .find(|e| e.kind == EdgeKind::Mint)
            .map(|e| e.source.clone())
    }

    /// Breadth-first traversal over outgoing edges, bounded by hop distance
    /// and a visited set. The start wallet is excluded from the result.
    fn reachable_within(
        &self,
        start: &str,
        wallets: &HashMap<String, WalletNode>,
        hop_limit: usize,
    ) -> BTreeSet<String> {
        let mut reached = BTreeSet::new();
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        let mut queue: VecDeque<(&str, usize)> = VecDeque::new();

        visited.insert(start);
        queue.push_back((start, 0));

        while let Some((address, depth)) = queue.pop_front() {
            if depth >= hop_limit {
                continue;
            }
            let Some(node) = wallets.get(address) else {
                continue;
            };
            for neighbor in &node.outgoing {
                if visited.insert(neighbor.as_str()) {
                    reached.insert(neighbor.clone());
                    queue.push_back((neighbor.as_str(), depth + 1));
                }
            }
        }

        reached
    }

    /// Connected components over edges carrying at least the concentration
    /// threshold, treated as undirected. Only components of two or more
    /// wallets are reported.
    fn detect_clusters(&self, graph: &TokenGraph) -> Vec<BTreeSet<String>> {
        if graph.total_supply <= 0.0 {
            tracing::warn!(
                token = %graph.token,
                total_supply = graph.total_supply,
                "non-positive supply, skipping cluster detection"
            );
            return Vec::new();
        }

        let threshold = self.cluster_edge_fraction * graph.total_supply;
        let mut adjacency: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for edge in &graph.edges {
            if edge.amount >= threshold {
                adjacency
                    .entry(edge.source.as_str())
                    .or_default()
                    .insert(edge.dest.as_str());
                adjacency
                    .entry(edge.dest.as_str())
                    .or_default()
                    .insert(edge.source.as_str());
            }
        }

        let mut clusters = Vec::new();
        let mut visited: BTreeSet<&str> = BTreeSet::new();
        // HashMap iteration order is arbitrary; sorted seeds keep cluster
        // output deterministic.
        let mut seeds: Vec<&str> = adjacency.keys().copied().collect();
        seeds.sort_unstable();

        for seed in seeds {
            if visited.contains(seed) {
                continue;
            }
            let mut component = BTreeSet::new();
            let mut queue = VecDeque::new();
            visited.insert(seed);
            queue.push_back(seed);

            while let Some(address) = queue.pop_front() {
                component.insert(address.to_string());
                if let Some(neighbors) = adjacency.get(address) {
                    for neighbor in neighbors {
                        if visited.insert(neighbor) {
                            queue.push_back(*neighbor);
                        }
                    }
                }
            }

            if component.len() >= 2 {
                clusters.push(component);
            }
        }

        clusters
    }
}
