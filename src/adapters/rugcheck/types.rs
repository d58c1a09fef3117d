//! Wire types for the RugCheck-style provider API.

use serde::Deserialize;

use crate::domain::{EdgeKind, GraphEdge, RawRiskReport, RiskSignal, TokenGraph};

/// `/tokens/{mint}/report/summary` response
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSummaryResponse {
    #[serde(rename = "tokenProgram", default)]
    pub token_program: String,
    #[serde(default)]
    pub risks: Vec<WireRisk>,
    /// Raw provider score, unused by the core (it re-aggregates)
    #[serde(default)]
    pub score: f64,
    #[serde(rename = "score_normalised", default)]
    pub score_normalised: f64,
}

/// One risk entry in the report summary
#[derive(Debug, Clone, Deserialize)]
pub struct WireRisk {
    pub name: String,
    /// Severity weight contributed by this risk
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub description: String,
    /// Short display value (e.g. "96.2%"), appended to the description
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub level: String,
}

impl ReportSummaryResponse {
    /// Map the wire payload into the domain report.
    pub fn into_report(self, token: &str) -> RawRiskReport {
        let signals = self
            .risks
            .into_iter()
            .map(|risk| {
                let description = if risk.value.is_empty() {
                    risk.description
                } else {
                    format!("{} ({})", risk.description, risk.value)
                };
                RiskSignal::new(risk.name, risk.score, description)
            })
            .collect();
        RawRiskReport::new(token, signals)
    }
}

/// `/tokens/{mint}/insiders/graph` response: a list of holder networks
#[derive(Debug, Clone, Deserialize)]
pub struct WireNetwork {
    #[serde(default)]
    pub nodes: Vec<WireNode>,
    #[serde(default)]
    pub links: Vec<WireLink>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(rename = "totalSupply", default)]
    pub total_supply: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireNode {
    pub id: String,
    #[serde(default)]
    pub holdings: f64,
    #[serde(default)]
    pub participant: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireLink {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub value: f64,
    /// "mint", "holding" or "transfer"; absent means transfer
    #[serde(default)]
    pub kind: Option<String>,
}

impl WireLink {
    fn edge_kind(&self) -> EdgeKind {
        match self.kind.as_deref() {
            Some("mint") => EdgeKind::Mint,
            Some("holding") => EdgeKind::Holding,
            _ => EdgeKind::Transfer,
        }
    }
}

/// Merge the provider's networks into one domain graph.
///
/// Supply comes from the first network that declares it, falling back to the
/// sum of node holdings; the creator designation likewise comes from the
/// first network that carries one.
pub fn into_graph(networks: Vec<WireNetwork>, token: &str) -> TokenGraph {
    let mut edges = Vec::new();
    let mut creator = None;
    let mut declared_supply = None;
    let mut holdings_sum = 0.0;

    for network in networks {
        for link in &network.links {
            edges.push(GraphEdge::new(
                link.source.clone(),
                link.target.clone(),
                link.value,
                link.edge_kind(),
            ));
        }
        for node in &network.nodes {
            holdings_sum += node.holdings;
        }
        if creator.is_none() {
            creator = network.creator;
        }
        if declared_supply.is_none() {
            declared_supply = network.total_supply;
        }
    }

    let mut graph = TokenGraph::new(token, edges, declared_supply.unwrap_or(holdings_sum));
    graph.creator = creator;
    graph
}
