use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::config::LedgerConfig;
use crate::domain::{
    Account, AccountEvent, AccountId, AccountStore, CurrencyId, Error, EventPublisher,
    FundsOperation, MemberId,
};

/// Handle on one account that runs every funds operation under the
/// account's exclusive row lock.
///
/// Each operation reloads the row once the lock is held and recomputes the
/// transition from that state, so a stale snapshot in the handle never leaks
/// into a write. The lock is dropped before the result is returned, on every
/// path.
pub struct AccountLedger<S, P>
where
    S: AccountStore,
    P: EventPublisher,
{
    store: Arc<S>,
    publisher: Arc<P>,
    config: LedgerConfig,
    account: Account,
}

impl<S, P> AccountLedger<S, P>
where
    S: AccountStore,
    P: EventPublisher,
{
    /// Binds to the member's account in `currency_id`, creating it on first use.
    pub async fn open(
        store: Arc<S>,
        publisher: Arc<P>,
        config: LedgerConfig,
        member_id: MemberId,
        currency_id: &CurrencyId,
    ) -> Result<Self, Error> {
        let (account, created) = store.find_or_create(member_id, currency_id).await?;

        let ledger = Self {
            store,
            publisher,
            config,
            account,
        };
        if created {
            debug!(account = ledger.account.id, member = member_id, currency = %currency_id, "account created");
            ledger.notify(AccountEvent::Created(ledger.account.clone()));
        }
        Ok(ledger)
    }

    pub async fn load(
        store: Arc<S>,
        publisher: Arc<P>,
        config: LedgerConfig,
        id: AccountId,
    ) -> Result<Self, Error> {
        let account = store.find(id).await?.ok_or(Error::AccountNotFound(id))?;
        Ok(Self {
            store,
            publisher,
            config,
            account,
        })
    }

    pub fn id(&self) -> AccountId {
        self.account.id
    }

    /// Last committed state observed through this handle.
    pub fn account(&self) -> &Account {
        &self.account
    }

    /// `balance + locked` of the last committed state. Never writes.
    pub fn amount(&self) -> Decimal {
        self.account.amount()
    }

    /// Refreshes the snapshot from the store without taking the row lock.
    pub async fn reload(&mut self) -> Result<&Account, Error> {
        let id = self.account.id;
        self.account = self.store.find(id).await?.ok_or(Error::AccountNotFound(id))?;
        Ok(&self.account)
    }

    pub async fn add_funds(&mut self, amount: Decimal) -> Result<Account, Error> {
        self.execute(FundsOperation::AddFunds, amount).await
    }

    pub async fn add_locked_funds(&mut self, amount: Decimal) -> Result<Account, Error> {
        self.execute(FundsOperation::AddLockedFunds, amount).await
    }

    pub async fn sub_funds(&mut self, amount: Decimal) -> Result<Account, Error> {
        self.execute(FundsOperation::SubFunds, amount).await
    }

    pub async fn lock_funds(&mut self, amount: Decimal) -> Result<Account, Error> {
        self.execute(FundsOperation::LockFunds, amount).await
    }

    pub async fn unlock_funds(&mut self, amount: Decimal) -> Result<Account, Error> {
        self.execute(FundsOperation::UnlockFunds, amount).await
    }

    pub async fn unlock_and_sub_funds(&mut self, amount: Decimal) -> Result<Account, Error> {
        self.execute(FundsOperation::UnlockAndSubFunds, amount).await
    }

    /// Runs `operation` as one read-validate-write sequence under the row lock.
    pub async fn execute(
        &mut self,
        operation: FundsOperation,
        amount: Decimal,
    ) -> Result<Account, Error> {
        // amount checks need no lock
        operation.check_amount(&self.account, amount)?;

        let committed = {
            let mut row = self.acquire().await?;
            unlocked::apply(&mut row, operation, amount)
        };

        let account = match committed {
            Ok(account) => account,
            Err(e) => {
                warn!(account = self.account.id, %operation, %amount, error = %e, "funds operation rejected");
                return Err(e);
            }
        };

        debug!(
            account = account.id,
            %operation,
            %amount,
            balance = %account.balance,
            locked = %account.locked,
            "funds committed"
        );
        self.account = account.clone();
        self.notify(AccountEvent::Updated(account.clone()));

        Ok(account)
    }

    async fn acquire(&self) -> Result<S::RowLock, Error> {
        let id = self.account.id;
        match self.config.lock_timeout {
            Some(timeout) => tokio::time::timeout(timeout, self.store.lock(id))
                .await
                .map_err(|_| Error::LockAcquisitionFailure {
                    account: id,
                    reason: format!("timed out after {:?}", timeout),
                })?,
            None => self.store.lock(id).await,
        }
    }

    fn notify(&self, event: AccountEvent) {
        if let Err(e) = self.publisher.publish(&event) {
            warn!(account = self.account.id, error = %e, "failed to publish account event");
        }
    }
}

/// Funds operations that do NOT acquire the account lock.
///
/// Each function takes the row guard as proof that the caller already holds
/// the exclusive lock (for instance a batch job that locked the row itself).
/// They compute from the state reloaded under that guard and write through
/// it; they never publish events.
pub mod unlocked {
    use rust_decimal::Decimal;

    use crate::domain::{Account, Error, FundsChange, FundsOperation, LockedAccount};

    /// Writes attributes that were computed by a [`FundsOperation`] against
    /// the locked row. Attributes computed from any other snapshot are only
    /// checked for non-negative, storable pools.
    pub fn apply_precomputed<L: LockedAccount>(
        row: &mut L,
        change: FundsChange,
    ) -> Result<Account, Error> {
        if !change.is_storable() {
            return Err(Error::InvalidFunds {
                account: row.account().id,
                balance: change.balance(),
                locked: change.locked(),
            });
        }
        row.update_columns(change)
    }

    pub fn apply<L: LockedAccount>(
        row: &mut L,
        operation: FundsOperation,
        amount: Decimal,
    ) -> Result<Account, Error> {
        let change = operation.compute(row.account(), amount)?;
        apply_precomputed(row, change)
    }

    pub fn add_funds<L: LockedAccount>(row: &mut L, amount: Decimal) -> Result<Account, Error> {
        apply(row, FundsOperation::AddFunds, amount)
    }

    pub fn add_locked_funds<L: LockedAccount>(
        row: &mut L,
        amount: Decimal,
    ) -> Result<Account, Error> {
        apply(row, FundsOperation::AddLockedFunds, amount)
    }

    pub fn sub_funds<L: LockedAccount>(row: &mut L, amount: Decimal) -> Result<Account, Error> {
        apply(row, FundsOperation::SubFunds, amount)
    }

    pub fn lock_funds<L: LockedAccount>(row: &mut L, amount: Decimal) -> Result<Account, Error> {
        apply(row, FundsOperation::LockFunds, amount)
    }

    pub fn unlock_funds<L: LockedAccount>(row: &mut L, amount: Decimal) -> Result<Account, Error> {
        apply(row, FundsOperation::UnlockFunds, amount)
    }

    pub fn unlock_and_sub_funds<L: LockedAccount>(
        row: &mut L,
        amount: Decimal,
    ) -> Result<Account, Error> {
        apply(row, FundsOperation::UnlockAndSubFunds, amount)
    }
}
