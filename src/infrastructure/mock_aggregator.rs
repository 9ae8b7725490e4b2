use crate::domain::identity::Identity;
use crate::domain::ports::PriceOracle;
use crate::domain::price::RoundData;
use crate::error::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// Decimals reported by the local mock feed.
pub const MOCK_DECIMALS: u8 = 8;
/// 2000 USD per native unit at 8 decimals.
pub const MOCK_INITIAL_ANSWER: i128 = 200_000_000_000;
/// Address the mock feed reports when none is configured.
pub const MOCK_ADDRESS: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

/// A price feed with a fixed precision and a settable answer.
///
/// Stands in for a live aggregator on development chains. Each
/// [`MockV3Aggregator::update_answer`] starts a new round.
pub struct MockV3Aggregator {
    address: Identity,
    round: RwLock<RoundData>,
}

impl MockV3Aggregator {
    pub fn new(address: Identity, decimals: u8, initial_answer: i128) -> Self {
        Self {
            address,
            round: RwLock::new(RoundData {
                round_id: 1,
                answer: initial_answer,
                decimals,
            }),
        }
    }

    pub async fn update_answer(&self, answer: i128) {
        let mut round = self.round.write().await;
        round.round_id += 1;
        round.answer = answer;
    }
}

impl Default for MockV3Aggregator {
    fn default() -> Self {
        Self::new(
            Identity::from_static(MOCK_ADDRESS),
            MOCK_DECIMALS,
            MOCK_INITIAL_ANSWER,
        )
    }
}

#[async_trait]
impl PriceOracle for MockV3Aggregator {
    fn address(&self) -> &Identity {
        &self.address
    }

    async fn latest_round_data(&self) -> Result<RoundData> {
        Ok(*self.round.read().await)
    }
}
