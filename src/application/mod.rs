pub mod service;

pub use service::{
    RiskIntelligenceService, ServiceError, ServiceSettings, TokenIntelligence, WalletIntelligence,
};
