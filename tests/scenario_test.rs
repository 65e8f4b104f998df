use std::sync::Arc;

use account_ledger::{AccountLedger, Error, LedgerConfig, MemoryStore, events::NoopPublisher};
use rust_decimal::Decimal;

fn d(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn order_lifecycle_through_the_ledger() {
    let store = Arc::new(MemoryStore::new());
    let mut ledger = AccountLedger::open(
        Arc::clone(&store),
        Arc::new(NoopPublisher::default()),
        LedgerConfig::default(),
        1,
        &"usd".to_string(),
    )
    .await
    .unwrap();

    let state = |a: account_ledger::Account| (a.balance, a.locked);

    assert_eq!(state(ledger.add_funds(d("100")).await.unwrap()), (d("100"), d("0")));
    assert_eq!(state(ledger.lock_funds(d("30")).await.unwrap()), (d("70"), d("30")));
    assert_eq!(
        state(ledger.unlock_and_sub_funds(d("10")).await.unwrap()),
        (d("70"), d("20"))
    );
    assert_eq!(state(ledger.unlock_funds(d("20")).await.unwrap()), (d("90"), d("0")));
    assert_eq!(state(ledger.sub_funds(d("90")).await.unwrap()), (d("0"), d("0")));

    let err = ledger.sub_funds(d("1")).await.unwrap_err();
    assert!(matches!(err, Error::InsufficientFunds { .. }));
    assert!(!err.is_transient());
    assert_eq!(ledger.amount(), Decimal::ZERO);
}

#[tokio::test]
async fn non_positive_deposits_are_invalid() {
    let store = Arc::new(MemoryStore::new());
    let mut ledger = AccountLedger::open(
        Arc::clone(&store),
        Arc::new(NoopPublisher::default()),
        LedgerConfig::default(),
        1,
        &"usd".to_string(),
    )
    .await
    .unwrap();
    ledger.add_funds(d("12")).await.unwrap();

    for amount in ["-5", "0"] {
        assert!(matches!(
            ledger.add_funds(d(amount)).await,
            Err(Error::InvalidAmount { .. })
        ));
    }
    assert_eq!(ledger.reload().await.unwrap().balance, d("12"));
}
