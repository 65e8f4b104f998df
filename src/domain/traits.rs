use async_trait::async_trait;
use futures::Stream;

use crate::domain::{Account, AccountId, CurrencyId, Error, FundsChange, FundsCommand, MemberId};

pub trait CommandStream {
    type CmdStream: Stream<Item = Result<FundsCommand, Error>> + Send + Unpin + 'static;
    fn stream(&mut self) -> Self::CmdStream;
}

pub trait DeadLetterQueue {
    fn report(&self, error: &Error);
}

/// Durable, lockable storage for account rows.
#[async_trait]
pub trait AccountStore: Send + Sync {
    type RowLock: LockedAccount + Send;

    async fn find(&self, id: AccountId) -> Result<Option<Account>, Error>;

    /// Returns the account for the pair, creating an empty one if needed.
    /// The flag is `true` when this call created the row.
    async fn find_or_create(
        &self,
        member_id: MemberId,
        currency_id: &CurrencyId,
    ) -> Result<(Account, bool), Error>;

    /// Blocks until the exclusive lock on `id` is held and returns the row
    /// as reloaded under that lock. Dropping the guard releases the lock.
    async fn lock(&self, id: AccountId) -> Result<Self::RowLock, Error>;

    async fn accounts(&self) -> Result<Vec<Account>, Error>;
}

/// Witness that the caller holds the exclusive lock on one account row.
pub trait LockedAccount {
    fn account(&self) -> &Account;

    /// Atomically writes `balance`, `locked` and `updated_at`. On error the
    /// row is left as it was.
    fn update_columns(&mut self, change: FundsChange) -> Result<Account, Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccountEvent {
    Created(Account),
    Updated(Account),
}

/// Fire-and-forget notification of account changes.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: &AccountEvent) -> Result<(), Error>;
}
