use super::identity::Identity;
use super::value::NativeValue;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The persisted state of one deployed ledger.
///
/// `funded` maps each contributor to the total it has sent since the last
/// withdrawal. `funders` records every successful contribution in order, so an
/// identity that funds twice appears twice. `balance` is the native value the
/// ledger currently holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub owner: Identity,
    pub price_feed: Identity,
    pub funded: HashMap<Identity, NativeValue>,
    pub funders: Vec<Identity>,
    pub balance: NativeValue,
}

impl LedgerState {
    pub fn new(owner: Identity, price_feed: Identity) -> Self {
        Self {
            owner,
            price_feed,
            funded: HashMap::new(),
            funders: Vec::new(),
            balance: NativeValue::ZERO,
        }
    }

    /// Records a contribution. Leaves the state untouched on overflow.
    pub fn credit(&mut self, funder: &Identity, amount: NativeValue) -> Result<()> {
        let current = self.amount_funded(funder);
        let funded = current.checked_add(amount)?;
        let balance = self.balance.checked_add(amount)?;

        self.funded.insert(funder.clone(), funded);
        self.funders.push(funder.clone());
        self.balance = balance;
        Ok(())
    }

    pub fn amount_funded(&self, funder: &Identity) -> NativeValue {
        self.funded.get(funder).copied().unwrap_or_default()
    }

    pub fn funder_at(&self, index: usize) -> Result<&Identity> {
        self.funders.get(index).ok_or(LedgerError::IndexOutOfRange {
            index,
            len: self.funders.len(),
        })
    }

    /// Zeroes every funder's entry, re-reading the list length on each pass.
    pub fn reset_funders_indexed(&mut self) {
        let mut index = 0;
        while index < self.funders.len() {
            let funder = self.funders[index].clone();
            self.funded.insert(funder, NativeValue::ZERO);
            index += 1;
        }
        self.funders = Vec::new();
    }

    /// Zeroes every funder's entry, taking the list out once up front.
    pub fn reset_funders_cached(&mut self) {
        let funders = std::mem::take(&mut self.funders);
        for funder in funders {
            self.funded.insert(funder, NativeValue::ZERO);
        }
    }

    /// Returns the held balance and leaves zero behind.
    pub fn drain_balance(&mut self) -> NativeValue {
        std::mem::take(&mut self.balance)
    }
}
