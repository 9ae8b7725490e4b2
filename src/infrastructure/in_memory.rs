use crate::domain::identity::Identity;
use crate::domain::ledger::LedgerState;
use crate::domain::ports::{LedgerStore, ValueTransfer};
use crate::domain::value::NativeValue;
use crate::error::{LedgerError, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for the ledger state.
///
/// Uses `Arc<RwLock<Option<LedgerState>>>`; clones share the same state.
/// Ideal for tests and one-shot runs where persistence is not required.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    state: Arc<RwLock<Option<LedgerState>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn load(&self) -> Result<Option<LedgerState>> {
        let state = self.state.read().await;
        Ok(state.clone())
    }

    async fn save(&self, state: LedgerState) -> Result<()> {
        let mut current = self.state.write().await;
        *current = Some(state);
        Ok(())
    }
}

/// An in-memory stand-in for the chain's value-transfer primitive.
///
/// Credits recipients in a shared balance map. Recipients marked with
/// [`InMemoryBank::reject`] refuse incoming value, which makes the transfer fail.
#[derive(Default, Clone)]
pub struct InMemoryBank {
    balances: Arc<RwLock<HashMap<Identity, NativeValue>>>,
    rejecting: Arc<RwLock<HashSet<Identity>>>,
}

impl InMemoryBank {
    /// Creates a bank where every recipient accepts transfers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later transfer to `recipient` fail.
    pub async fn reject(&self, recipient: Identity) {
        self.rejecting.write().await.insert(recipient);
    }

    /// Total received by `account` so far.
    pub async fn balance_of(&self, account: &Identity) -> NativeValue {
        let balances = self.balances.read().await;
        balances.get(account).copied().unwrap_or_default()
    }
}

#[async_trait]
impl ValueTransfer for InMemoryBank {
    async fn transfer_all(&self, to: &Identity, amount: NativeValue) -> Result<()> {
        if self.rejecting.read().await.contains(to) {
            return Err(LedgerError::TransferFailed(to.to_string()));
        }

        let mut balances = self.balances.write().await;
        let balance = balances.entry(to.clone()).or_default();
        *balance = balance.checked_add(amount)?;
        Ok(())
    }
}
