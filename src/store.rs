use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::{
    Account, AccountId, AccountStore, CurrencyId, Error, FundsChange, LockedAccount, MemberId,
};

/// A committed row plus the mutex that serializes writers on it.
#[derive(Debug, Clone)]
struct Row {
    lock: Arc<Mutex<()>>,
    committed: Arc<RwLock<Account>>,
}

#[derive(Debug, Default)]
struct Tables {
    rows: HashMap<AccountId, Row>,
    by_owner: HashMap<(MemberId, CurrencyId), AccountId>,
    next_id: AccountId,
}

/// In-process account store with one exclusive lock per account row.
///
/// Reads go straight to the committed snapshot; only `lock` waits on the
/// row mutex, so there is never a lock shared between accounts.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    offline: AtomicBool,
    read_only: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every `lock` call fails.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// While read-only every column update fails without writing.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    async fn row(&self, id: AccountId) -> Option<Row> {
        self.tables.lock().await.rows.get(&id).cloned()
    }
}

fn read_committed(id: AccountId, row: &RwLock<Account>) -> Result<Account, Error> {
    row.read()
        .map(|account| account.clone())
        .map_err(|e| Error::PersistenceFailure {
            account: id,
            reason: e.to_string(),
        })
}

#[async_trait]
impl AccountStore for MemoryStore {
    type RowLock = MemoryRowLock;

    async fn find(&self, id: AccountId) -> Result<Option<Account>, Error> {
        match self.row(id).await {
            Some(row) => read_committed(id, &row.committed).map(Some),
            None => Ok(None),
        }
    }

    async fn find_or_create(
        &self,
        member_id: MemberId,
        currency_id: &CurrencyId,
    ) -> Result<(Account, bool), Error> {
        let mut tables = self.tables.lock().await;

        let key = (member_id, currency_id.clone());
        if let Some(id) = tables.by_owner.get(&key).copied() {
            let row = tables.rows.get(&id).ok_or(Error::AccountNotFound(id))?;
            return read_committed(id, &row.committed).map(|account| (account, false));
        }

        tables.next_id += 1;
        let id = tables.next_id;
        let account = Account::new(id, member_id, currency_id.clone());
        tables.rows.insert(
            id,
            Row {
                lock: Arc::new(Mutex::new(())),
                committed: Arc::new(RwLock::new(account.clone())),
            },
        );
        tables.by_owner.insert(key, id);

        Ok((account, true))
    }

    async fn lock(&self, id: AccountId) -> Result<MemoryRowLock, Error> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::LockAcquisitionFailure {
                account: id,
                reason: "store offline".to_string(),
            });
        }

        let row = self.row(id).await.ok_or(Error::AccountNotFound(id))?;
        let guard = row.lock.lock_owned().await;
        // Reload only once the lock is held so no writer can slip in between.
        let account = read_committed(id, &row.committed)?;

        Ok(MemoryRowLock {
            _guard: guard,
            committed: row.committed,
            account,
            read_only: Arc::clone(&self.read_only),
        })
    }

    async fn accounts(&self) -> Result<Vec<Account>, Error> {
        let rows: Vec<(AccountId, Row)> = {
            let tables = self.tables.lock().await;
            tables
                .rows
                .iter()
                .map(|(id, row)| (*id, row.clone()))
                .collect()
        };

        let mut accounts = rows
            .iter()
            .map(|(id, row)| read_committed(*id, &row.committed))
            .collect::<Result<Vec<_>, _>>()?;
        accounts.sort_by_key(|account| account.id);
        Ok(accounts)
    }
}

/// Exclusive hold on one row of a [`MemoryStore`], released on drop.
#[derive(Debug)]
pub struct MemoryRowLock {
    _guard: OwnedMutexGuard<()>,
    committed: Arc<RwLock<Account>>,
    account: Account,
    read_only: Arc<AtomicBool>,
}

impl LockedAccount for MemoryRowLock {
    fn account(&self) -> &Account {
        &self.account
    }

    fn update_columns(&mut self, change: FundsChange) -> Result<Account, Error> {
        let id = self.account.id;
        if self.read_only.load(Ordering::SeqCst) {
            return Err(Error::PersistenceFailure {
                account: id,
                reason: "store is read-only".to_string(),
            });
        }

        let mut next = self.account.clone();
        next.apply(change);

        let mut committed = self
            .committed
            .write()
            .map_err(|e| Error::PersistenceFailure {
                account: id,
                reason: e.to_string(),
            })?;
        *committed = next.clone();
        self.account = next.clone();

        Ok(next)
    }
}
