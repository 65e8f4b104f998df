use rust_decimal::Decimal;

use crate::domain::{AccountId, FundsOperation};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{operation} on account {account}: invalid amount {amount}")]
    InvalidAmount {
        account: AccountId,
        operation: FundsOperation,
        amount: Decimal,
    },

    #[error("{operation} on account {account}: amount {amount} or its result is out of range")]
    AmountOutOfRange {
        account: AccountId,
        operation: FundsOperation,
        amount: Decimal,
    },

    #[error("Account {account} cannot hold balance={balance}, locked={locked}")]
    InvalidFunds {
        account: AccountId,
        balance: Decimal,
        locked: Decimal,
    },

    #[error(
        "{operation} on account {account}: insufficient funds for {amount} (balance={balance}, locked={locked})"
    )]
    InsufficientFunds {
        account: AccountId,
        operation: FundsOperation,
        amount: Decimal,
        balance: Decimal,
        locked: Decimal,
    },

    #[error("Could not lock account {account}: {reason}")]
    LockAcquisitionFailure { account: AccountId, reason: String },

    #[error("Could not persist account {account}: {reason}")]
    PersistenceFailure { account: AccountId, reason: String },

    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("Ingestion failed with: {0}")]
    Ingestion(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Lock and persistence failures leave the account untouched, so the
    /// whole operation may be retried by the caller.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::LockAcquisitionFailure { .. } | Error::PersistenceFailure { .. }
        )
    }
}
