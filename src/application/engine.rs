use super::transaction::StagedState;
use crate::domain::call::{CallContext, CallKind};
use crate::domain::identity::Identity;
use crate::domain::ledger::LedgerState;
use crate::domain::ports::{LedgerStoreBox, PriceOracleRef, ValueTransferBox};
use crate::domain::price;
use crate::domain::value::NativeValue;
use crate::error::{LedgerError, Result};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A deployed crowdfunding ledger.
///
/// Anyone may `fund` it with at least the USD minimum; only the deploying
/// identity may withdraw. The owner and price feed are fixed at deployment.
/// Every operation holds the ledger's gate for its whole duration, so calls on
/// one `Ledger` never interleave.
pub struct Ledger {
    owner: Identity,
    price_feed: PriceOracleRef,
    store: LedgerStoreBox,
    transfer: ValueTransferBox,
    gate: Mutex<()>,
}

impl Ledger {
    /// Deploys a ledger owned by `ctx.sender`, or re-opens the one already in `store`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The deploying call. Deployment does not accept value.
    /// * `price_feed` - The native/USD oracle consulted by `fund`.
    /// * `store` - Where the ledger state lives.
    /// * `transfer` - Pays the held balance out on withdrawal.
    pub async fn deploy(
        ctx: &CallContext,
        price_feed: PriceOracleRef,
        store: LedgerStoreBox,
        transfer: ValueTransferBox,
    ) -> Result<Self> {
        if !ctx.value.is_zero() {
            return Err(LedgerError::ValidationError(
                "Deployment does not accept value".to_string(),
            ));
        }

        match store.load().await? {
            Some(existing) => {
                if existing.owner != ctx.sender {
                    return Err(LedgerError::DeploymentMismatch(format!(
                        "stored ledger is owned by {}, not {}",
                        existing.owner, ctx.sender
                    )));
                }
                if existing.price_feed != *price_feed.address() {
                    return Err(LedgerError::DeploymentMismatch(format!(
                        "stored ledger reads price feed {}, not {}",
                        existing.price_feed,
                        price_feed.address()
                    )));
                }
                info!(owner = %ctx.sender, funders = existing.funders.len(), "Re-opened ledger");
            }
            None => {
                let state = LedgerState::new(ctx.sender.clone(), price_feed.address().clone());
                store.save(state).await?;
                info!(owner = %ctx.sender, price_feed = %price_feed.address(), "Deployed ledger");
            }
        }

        Ok(Self {
            owner: ctx.sender.clone(),
            price_feed,
            store,
            transfer,
            gate: Mutex::new(()),
        })
    }

    /// Dispatches one recorded call.
    pub async fn execute(&self, kind: CallKind, ctx: &CallContext) -> Result<()> {
        match kind {
            CallKind::Fund => self.fund(ctx).await,
            CallKind::Withdraw => self.withdraw(ctx).await.map(|_| ()),
            CallKind::CheaperWithdraw => self.cheaper_withdraw(ctx).await.map(|_| ()),
        }
    }

    /// Accepts `ctx.value` from `ctx.sender` if it is worth at least the USD minimum.
    pub async fn fund(&self, ctx: &CallContext) -> Result<()> {
        let _guard = self.gate.lock().await;

        let rate = self.price_feed.latest_round_data().await?.rate()?;
        if !price::meets_minimum(ctx.value, rate)? {
            debug!(funder = %ctx.sender, value = %ctx.value, "Contribution below minimum");
            return Err(LedgerError::InsufficientContribution);
        }

        let mut tx = StagedState::begin(self.store.as_ref()).await?;
        tx.state_mut().credit(&ctx.sender, ctx.value)?;
        tx.commit().await?;

        debug!(
            funder = %ctx.sender,
            value = %ctx.value,
            total = %tx.state().amount_funded(&ctx.sender),
            "Accepted contribution"
        );
        Ok(())
    }

    /// Resets every contribution and pays the held balance to the owner.
    ///
    /// Returns the amount paid out.
    pub async fn withdraw(&self, ctx: &CallContext) -> Result<NativeValue> {
        self.settle(ctx, LedgerState::reset_funders_indexed).await
    }

    /// Same as [`Ledger::withdraw`]; walks the funder list from a local copy.
    pub async fn cheaper_withdraw(&self, ctx: &CallContext) -> Result<NativeValue> {
        self.settle(ctx, LedgerState::reset_funders_cached).await
    }

    async fn settle(&self, ctx: &CallContext, reset: fn(&mut LedgerState)) -> Result<NativeValue> {
        if !ctx.value.is_zero() {
            return Err(LedgerError::ValidationError(
                "Withdrawal does not accept value".to_string(),
            ));
        }
        self.only_owner(ctx)?;
        let _guard = self.gate.lock().await;

        let mut tx = StagedState::begin(self.store.as_ref()).await?;
        reset(tx.state_mut());
        let amount = tx.state_mut().drain_balance();
        // State is reset before any value leaves the ledger.
        tx.commit().await?;

        if let Err(e) = self.transfer.transfer_all(&self.owner, amount).await {
            warn!(owner = %self.owner, amount = %amount, error = %e, "Payout failed, rolling back");
            if let Err(rollback) = tx.rollback().await {
                warn!(
                    owner = %self.owner,
                    amount = %amount,
                    error = %rollback,
                    "Rollback failed, stored ledger is drained but unpaid"
                );
                return Err(LedgerError::InternalError(
                    format!("payout failed ({}) and rollback failed ({})", e, rollback).into(),
                ));
            }
            return Err(e);
        }

        info!(owner = %self.owner, amount = %amount, "Withdrew held balance");
        Ok(amount)
    }

    fn only_owner(&self, ctx: &CallContext) -> Result<()> {
        if ctx.sender == self.owner {
            Ok(())
        } else {
            Err(LedgerError::NotOwner)
        }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn price_feed(&self) -> &PriceOracleRef {
        &self.price_feed
    }

    /// Total sent by `funder` since the last withdrawal; zero if it never funded.
    pub async fn amount_funded(&self, funder: &Identity) -> Result<NativeValue> {
        Ok(self.snapshot().await?.amount_funded(funder))
    }

    pub async fn funder_at(&self, index: usize) -> Result<Identity> {
        self.snapshot().await?.funder_at(index).cloned()
    }

    pub async fn funders(&self) -> Result<Vec<Identity>> {
        Ok(self.snapshot().await?.funders)
    }

    /// The native value currently held by the ledger.
    pub async fn balance(&self) -> Result<NativeValue> {
        Ok(self.snapshot().await?.balance)
    }

    /// A consistent copy of the stored state.
    pub async fn snapshot(&self) -> Result<LedgerState> {
        let _guard = self.gate.lock().await;
        self.store
            .load()
            .await?
            .ok_or_else(|| LedgerError::InternalError("ledger has not been deployed".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{LedgerStore, PriceOracle, PriceOracleRef};
    use async_trait::async_trait;
    use crate::infrastructure::in_memory::{InMemoryBank, InMemoryLedgerStore};
    use crate::infrastructure::mock_aggregator::MockV3Aggregator;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(s: &str) -> Identity {
        Identity::new(s).unwrap()
    }

    fn native(value: Decimal) -> NativeValue {
        NativeValue::new(value).unwrap()
    }

    async fn deploy_with(bank: InMemoryBank) -> Ledger {
        let feed: PriceOracleRef = Arc::new(MockV3Aggregator::default());
        Ledger::deploy(
            &CallContext::from_sender(id("0xdeployer")),
            feed,
            Box::new(InMemoryLedgerStore::new()),
            Box::new(bank),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_deploy_sets_owner_and_feed() {
        let ledger = deploy_with(InMemoryBank::new()).await;
        assert_eq!(ledger.owner(), &id("0xdeployer"));
        assert_eq!(
            ledger.price_feed().address(),
            MockV3Aggregator::default().address()
        );
        assert!(ledger.balance().await.unwrap().is_zero());
        assert!(ledger.funders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deploy_rejects_value() {
        let feed: PriceOracleRef = Arc::new(MockV3Aggregator::default());
        let result = Ledger::deploy(
            &CallContext::new(id("0xdeployer"), native(dec!(1))),
            feed,
            Box::new(InMemoryLedgerStore::new()),
            Box::new(InMemoryBank::new()),
        )
        .await;
        assert!(matches!(result, Err(LedgerError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_redeploy_with_other_owner_is_rejected() {
        let store = InMemoryLedgerStore::new();
        let feed: PriceOracleRef = Arc::new(MockV3Aggregator::default());
        Ledger::deploy(
            &CallContext::from_sender(id("0xdeployer")),
            feed.clone(),
            Box::new(store.clone()),
            Box::new(InMemoryBank::new()),
        )
        .await
        .unwrap();

        let result = Ledger::deploy(
            &CallContext::from_sender(id("0xsomeone")),
            feed,
            Box::new(store),
            Box::new(InMemoryBank::new()),
        )
        .await;
        assert!(matches!(result, Err(LedgerError::DeploymentMismatch(_))));
    }

    #[tokio::test]
    async fn test_fund_below_minimum() {
        let ledger = deploy_with(InMemoryBank::new()).await;
        let result = ledger
            .fund(&CallContext::new(id("0xalice"), native(dec!(0.001))))
            .await;
        assert!(matches!(result, Err(LedgerError::InsufficientContribution)));
        assert!(ledger.balance().await.unwrap().is_zero());
        assert!(ledger.funders().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fund_records_contribution() {
        let ledger = deploy_with(InMemoryBank::new()).await;
        let alice = id("0xalice");
        ledger
            .fund(&CallContext::new(alice.clone(), native(dec!(1))))
            .await
            .unwrap();

        assert_eq!(ledger.amount_funded(&alice).await.unwrap(), native(dec!(1)));
        assert_eq!(ledger.funder_at(0).await.unwrap(), alice);
        assert_eq!(ledger.balance().await.unwrap(), native(dec!(1)));
    }

    #[tokio::test]
    async fn test_fund_follows_price_updates() {
        let feed = Arc::new(MockV3Aggregator::default());
        let ledger = Ledger::deploy(
            &CallContext::from_sender(id("0xdeployer")),
            feed.clone(),
            Box::new(InMemoryLedgerStore::new()),
            Box::new(InMemoryBank::new()),
        )
        .await
        .unwrap();

        // 0.025 is worth exactly 50 USD at 2000
        let ctx = CallContext::new(id("0xalice"), native(dec!(0.025)));
        ledger.fund(&ctx).await.unwrap();

        feed.update_answer(1_000_00000000).await;
        assert!(matches!(
            ledger.fund(&ctx).await,
            Err(LedgerError::InsufficientContribution)
        ));
    }

    #[tokio::test]
    async fn test_only_owner_may_withdraw() {
        let ledger = deploy_with(InMemoryBank::new()).await;
        let attacker = CallContext::from_sender(id("0xattacker"));
        ledger
            .fund(&CallContext::new(id("0xalice"), native(dec!(1))))
            .await
            .unwrap();

        assert!(matches!(
            ledger.withdraw(&attacker).await,
            Err(LedgerError::NotOwner)
        ));
        assert!(matches!(
            ledger.cheaper_withdraw(&attacker).await,
            Err(LedgerError::NotOwner)
        ));
        assert_eq!(ledger.balance().await.unwrap(), native(dec!(1)));
        assert_eq!(ledger.funders().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_withdraw_pays_owner() {
        let bank = InMemoryBank::new();
        let ledger = deploy_with(bank.clone()).await;
        let owner = CallContext::from_sender(id("0xdeployer"));
        ledger
            .fund(&CallContext::new(id("0xalice"), native(dec!(1))))
            .await
            .unwrap();
        ledger
            .fund(&CallContext::new(id("0xbob"), native(dec!(2.5))))
            .await
            .unwrap();

        let paid = ledger.withdraw(&owner).await.unwrap();

        assert_eq!(paid, native(dec!(3.5)));
        assert_eq!(bank.balance_of(&id("0xdeployer")).await, native(dec!(3.5)));
        assert!(ledger.balance().await.unwrap().is_zero());
        assert!(matches!(
            ledger.funder_at(0).await,
            Err(LedgerError::IndexOutOfRange { .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_transfer_rolls_back() {
        let bank = InMemoryBank::new();
        bank.reject(id("0xdeployer")).await;
        let ledger = deploy_with(bank.clone()).await;
        let alice = id("0xalice");
        ledger
            .fund(&CallContext::new(alice.clone(), native(dec!(1))))
            .await
            .unwrap();
        let before = ledger.snapshot().await.unwrap();

        for result in [
            ledger.withdraw(&CallContext::from_sender(id("0xdeployer"))).await,
            ledger
                .cheaper_withdraw(&CallContext::from_sender(id("0xdeployer")))
                .await,
        ] {
            assert!(matches!(result, Err(LedgerError::TransferFailed(_))));
            assert_eq!(ledger.snapshot().await.unwrap(), before);
        }
        assert_eq!(ledger.amount_funded(&alice).await.unwrap(), native(dec!(1)));
        assert!(bank.balance_of(&id("0xdeployer")).await.is_zero());
    }

    /// Accepts a fixed number of saves, then fails every later one.
    struct FailingStore {
        inner: InMemoryLedgerStore,
        saves_left: AtomicUsize,
    }

    #[async_trait]
    impl LedgerStore for FailingStore {
        async fn load(&self) -> Result<Option<LedgerState>> {
            self.inner.load().await
        }

        async fn save(&self, state: LedgerState) -> Result<()> {
            let left = self.saves_left.load(Ordering::SeqCst);
            if left == 0 {
                return Err(LedgerError::InternalError("disk full".into()));
            }
            self.saves_left.store(left - 1, Ordering::SeqCst);
            self.inner.save(state).await
        }
    }

    #[tokio::test]
    async fn test_failed_rollback_reports_both_errors() {
        let bank = InMemoryBank::new();
        bank.reject(id("0xdeployer")).await;
        let inner = InMemoryLedgerStore::new();
        // deploy, fund and the withdrawal commit succeed; the rollback does not
        let store = FailingStore {
            inner: inner.clone(),
            saves_left: AtomicUsize::new(3),
        };
        let feed: PriceOracleRef = Arc::new(MockV3Aggregator::default());
        let ledger = Ledger::deploy(
            &CallContext::from_sender(id("0xdeployer")),
            feed,
            Box::new(store),
            Box::new(bank),
        )
        .await
        .unwrap();
        ledger
            .fund(&CallContext::new(id("0xalice"), native(dec!(1))))
            .await
            .unwrap();

        let result = ledger
            .withdraw(&CallContext::from_sender(id("0xdeployer")))
            .await;

        match result {
            Err(LedgerError::InternalError(e)) => {
                let message = e.to_string();
                assert!(message.contains("payout failed"), "{}", message);
                assert!(message.contains("disk full"), "{}", message);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let stored = inner.load().await.unwrap().unwrap();
        assert!(stored.balance.is_zero());
    }

    #[tokio::test]
    async fn test_execute_dispatches_calls() {
        let ledger = deploy_with(InMemoryBank::new()).await;
        ledger
            .execute(
                CallKind::Fund,
                &CallContext::new(id("0xalice"), native(dec!(1))),
            )
            .await
            .unwrap();
        ledger
            .execute(
                CallKind::CheaperWithdraw,
                &CallContext::from_sender(id("0xdeployer")),
            )
            .await
            .unwrap();
        assert!(ledger.balance().await.unwrap().is_zero());
    }
}
