use crate::domain::ledger::LedgerState;
use crate::domain::ports::LedgerStore;
use crate::error::{LedgerError, Result};

/// A unit of work over the stored ledger state.
///
/// Mutations go to a private copy. Nothing reaches the store until `commit`;
/// dropping the value without committing discards them. After a commit,
/// `rollback` writes the snapshot taken at `begin` back.
pub struct StagedState<'a> {
    store: &'a dyn LedgerStore,
    snapshot: LedgerState,
    staged: LedgerState,
}

impl<'a> StagedState<'a> {
    pub async fn begin(store: &'a dyn LedgerStore) -> Result<Self> {
        let snapshot = store
            .load()
            .await?
            .ok_or_else(|| LedgerError::InternalError("ledger has not been deployed".into()))?;
        Ok(Self {
            store,
            staged: snapshot.clone(),
            snapshot,
        })
    }

    pub fn state(&self) -> &LedgerState {
        &self.staged
    }

    pub fn state_mut(&mut self) -> &mut LedgerState {
        &mut self.staged
    }

    pub async fn commit(&self) -> Result<()> {
        self.store.save(self.staged.clone()).await
    }

    pub async fn rollback(self) -> Result<()> {
        self.store.save(self.snapshot).await
    }
}
