use std::sync::Arc;
use std::time::Duration;

use account_ledger::{
    AccountLedger, AccountStore, Error, LedgerConfig, MemoryStore, events::NoopPublisher,
};
use rust_decimal::Decimal;

type Ledger = AccountLedger<MemoryStore, NoopPublisher>;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

async fn open(store: &Arc<MemoryStore>, member: u64, config: LedgerConfig) -> Ledger {
    AccountLedger::open(
        Arc::clone(store),
        Arc::new(NoopPublisher::default()),
        config,
        member,
        &"usd".to_string(),
    )
    .await
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_deposits_lose_no_updates() {
    const N: usize = 200;
    let store = Arc::new(MemoryStore::new());
    let id = open(&store, 1, LedgerConfig::default()).await.id();

    let tasks: Vec<_> = (0..N)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut ledger: Ledger = AccountLedger::load(
                    store,
                    Arc::new(NoopPublisher::default()),
                    LedgerConfig::default(),
                    id,
                )
                .await?;
                ledger.add_funds(Decimal::ONE).await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let account = store.find(id).await.unwrap().unwrap();
    assert_eq!(account.balance, Decimal::from(N as u64));
    assert_eq!(account.locked, Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_locks_never_overdraw() {
    let store = Arc::new(MemoryStore::new());
    let mut seed = open(&store, 1, LedgerConfig::default()).await;
    seed.add_funds(d("10")).await.unwrap();
    let id = seed.id();

    // 50 callers race to lock 1 each against a balance of 10
    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut ledger: Ledger = AccountLedger::load(
                    store,
                    Arc::new(NoopPublisher::default()),
                    LedgerConfig::default(),
                    id,
                )
                .await?;
                ledger.lock_funds(Decimal::ONE).await
            })
        })
        .collect();

    let mut locked = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => locked += 1,
            Err(Error::InsufficientFunds { .. }) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!((locked, rejected), (10, 40));
    let account = store.find(id).await.unwrap().unwrap();
    assert_eq!((account.balance, account.locked), (Decimal::ZERO, d("10")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mixed_operations_conserve_total() {
    let store = Arc::new(MemoryStore::new());
    let mut seed = open(&store, 1, LedgerConfig::default()).await;
    seed.add_funds(d("1000")).await.unwrap();
    let id = seed.id();

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut ledger: Ledger = AccountLedger::load(
                    store,
                    Arc::new(NoopPublisher::default()),
                    LedgerConfig::default(),
                    id,
                )
                .await?;
                ledger.lock_funds(d("2.5")).await?;
                ledger.unlock_funds(d("1.5")).await?;
                ledger.unlock_and_sub_funds(d("1")).await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let account = store.find(id).await.unwrap().unwrap();
    assert_eq!(account.balance, d("900"));
    assert_eq!(account.locked, Decimal::ZERO);
    assert_eq!(account.amount(), d("900"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn accounts_do_not_block_each_other() {
    let store = Arc::new(MemoryStore::new());
    let busy = open(&store, 1, LedgerConfig::default()).await;
    let mut free = open(
        &store,
        2,
        LedgerConfig::default().with_lock_timeout(Duration::from_millis(200)),
    )
    .await;

    let _held = store.lock(busy.id()).await.unwrap();
    free.add_funds(d("1")).await.unwrap();
    assert_eq!(free.amount(), d("1"));
}
