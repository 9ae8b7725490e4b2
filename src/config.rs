//! Deployment configuration.
//!
//! Maps chain ids to price-feed settings, the way a deploy script picks a live
//! aggregator address per network and a mock on local chains. Loaded from TOML;
//! every field falls back to the local development defaults.

use crate::domain::identity::Identity;
use crate::domain::ports::PriceOracleRef;
use crate::error::{LedgerError, Result};
use crate::infrastructure::mock_aggregator::{
    MOCK_ADDRESS, MOCK_DECIMALS, MOCK_INITIAL_ANSWER, MockV3Aggregator,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Local development chain id.
pub const DEVELOPMENT_CHAIN_ID: u64 = 31337;
const DEFAULT_DEPLOYER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Identity that deploys, and therefore owns, the ledger.
    pub deployer: Identity,
    pub default_chain: u64,
    pub development_chains: Vec<u64>,
    pub mock: MockConfig,
    /// Keyed by chain id.
    pub networks: HashMap<String, NetworkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    pub decimals: u8,
    pub initial_answer: i128,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    pub name: String,
    pub eth_usd_price_feed: Option<Identity>,
    #[serde(default = "default_feed_decimals")]
    pub decimals: u8,
    /// Pinned answer for the feed; there is no live RPC client.
    pub answer: Option<i128>,
}

fn default_feed_decimals() -> u8 {
    MOCK_DECIMALS
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            decimals: MOCK_DECIMALS,
            initial_answer: MOCK_INITIAL_ANSWER,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut networks = HashMap::new();
        networks.insert(
            DEVELOPMENT_CHAIN_ID.to_string(),
            NetworkConfig {
                name: "hardhat".to_string(),
                eth_usd_price_feed: None,
                decimals: MOCK_DECIMALS,
                answer: None,
            },
        );
        Self {
            deployer: Identity::from_static(DEFAULT_DEPLOYER),
            default_chain: DEVELOPMENT_CHAIN_ID,
            development_chains: vec![DEVELOPMENT_CHAIN_ID],
            mock: MockConfig::default(),
            networks,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn is_development(&self, chain_id: u64) -> bool {
        self.development_chains.contains(&chain_id)
    }

    pub fn network(&self, chain_id: u64) -> Option<&NetworkConfig> {
        self.networks.get(&chain_id.to_string())
    }

    /// Builds the price feed the ledger reads on `chain_id`.
    ///
    /// Development chains get a mock aggregator seeded from `[mock]`. Other
    /// chains need a configured feed address and a pinned answer.
    pub fn price_feed(&self, chain_id: u64) -> Result<PriceOracleRef> {
        if self.is_development(chain_id) {
            let address = self
                .network(chain_id)
                .and_then(|network| network.eth_usd_price_feed.clone())
                .unwrap_or_else(|| Identity::from_static(MOCK_ADDRESS));
            return Ok(Arc::new(MockV3Aggregator::new(
                address,
                self.mock.decimals,
                self.mock.initial_answer,
            )));
        }

        let network = self.network(chain_id).ok_or_else(|| {
            LedgerError::ConfigError(format!("no network configured for chain {}", chain_id))
        })?;
        let address = network.eth_usd_price_feed.clone().ok_or_else(|| {
            LedgerError::ConfigError(format!("{} has no eth_usd_price_feed", network.name))
        })?;
        let answer = network.answer.ok_or_else(|| {
            LedgerError::ConfigError(format!(
                "{} has no pinned answer for feed {}",
                network.name, address
            ))
        })?;
        Ok(Arc::new(MockV3Aggregator::new(
            address,
            network.decimals,
            answer,
        )))
    }
}
