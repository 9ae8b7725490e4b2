use super::identity::Identity;
use super::ledger::LedgerState;
use super::price::RoundData;
use super::value::NativeValue;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Persistence for a ledger's state snapshot.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load(&self) -> Result<Option<LedgerState>>;
    async fn save(&self, state: LedgerState) -> Result<()>;
}

/// Read-only native/USD price feed.
///
/// Each round carries its own precision, so callers never ask for it separately.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    /// Where the feed lives; this is what `price_feed()` reports.
    fn address(&self) -> &Identity;
    async fn latest_round_data(&self) -> Result<RoundData>;
}

/// Moves value out of the ledger.
#[async_trait]
pub trait ValueTransfer: Send + Sync {
    /// Sends `amount` to `to`. Fails with `TransferFailed` if the recipient refuses it.
    async fn transfer_all(&self, to: &Identity, amount: NativeValue) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
pub type PriceOracleRef = Arc<dyn PriceOracle>;
pub type ValueTransferBox = Box<dyn ValueTransfer>;
