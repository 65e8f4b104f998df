use rust_decimal::Decimal;

use crate::domain::{Account, Error};

/// The labeled transitions of an account's `(balance, locked)` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FundsOperation {
    AddFunds,
    AddLockedFunds,
    SubFunds,
    LockFunds,
    UnlockFunds,
    UnlockAndSubFunds,
}

/// Fractional digits a stored amount may carry.
pub const FUNDS_SCALE: u32 = 16;

/// Exclusive upper bound of a stored amount (10^12). At `FUNDS_SCALE` the sum
/// of any two values below it still fits the decimal mantissa, so no
/// transition ever rounds.
pub const FUNDS_LIMIT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Next `(balance, locked)` attributes computed by a transition, ready to be
/// written back under the account lock. Only a transition or an existing
/// account can produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FundsChange {
    balance: Decimal,
    locked: Decimal,
}

impl FundsChange {
    pub(crate) fn new(balance: Decimal, locked: Decimal) -> Self {
        Self { balance, locked }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn locked(&self) -> Decimal {
        self.locked
    }

    pub fn amount(&self) -> Decimal {
        self.balance + self.locked
    }

    /// Both pools non-negative, below `FUNDS_LIMIT`, and at most
    /// `FUNDS_SCALE` fractional digits.
    pub fn is_storable(&self) -> bool {
        is_storable(self.balance) && is_storable(self.locked)
    }
}

fn is_storable(value: Decimal) -> bool {
    value >= Decimal::ZERO && value < FUNDS_LIMIT && value.normalize().scale() <= FUNDS_SCALE
}

impl FundsOperation {
    pub const ALL: [FundsOperation; 6] = [
        FundsOperation::AddFunds,
        FundsOperation::AddLockedFunds,
        FundsOperation::SubFunds,
        FundsOperation::LockFunds,
        FundsOperation::UnlockFunds,
        FundsOperation::UnlockAndSubFunds,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FundsOperation::AddFunds => "add_funds",
            FundsOperation::AddLockedFunds => "add_locked_funds",
            FundsOperation::SubFunds => "sub_funds",
            FundsOperation::LockFunds => "lock_funds",
            FundsOperation::UnlockFunds => "unlock_funds",
            FundsOperation::UnlockAndSubFunds => "unlock_and_sub_funds",
        }
    }

    /// Computes the next state for `account` without touching any store.
    ///
    /// Fails with [`Error::InvalidAmount`] for non-positive amounts, with
    /// [`Error::AmountOutOfRange`] when the amount or the result does not fit
    /// the stored precision, and with [`Error::InsufficientFunds`] when the
    /// source pool is too small. The account itself is never modified.
    pub fn compute(self, account: &Account, amount: Decimal) -> Result<FundsChange, Error> {
        self.check_amount(account, amount)?;

        let FundsChange { balance, locked } = account.funds();
        let out_of_range = || Error::AmountOutOfRange {
            account: account.id,
            operation: self,
            amount,
        };
        let insufficient = |pool: Decimal| -> Result<(), Error> {
            if amount > pool {
                return Err(Error::InsufficientFunds {
                    account: account.id,
                    operation: self,
                    amount,
                    balance,
                    locked,
                });
            }
            Ok(())
        };
        let add = |pool: Decimal| pool.checked_add(amount).ok_or_else(out_of_range);
        let sub = |pool: Decimal| pool.checked_sub(amount).ok_or_else(out_of_range);

        let next = match self {
            FundsOperation::AddFunds => FundsChange::new(add(balance)?, locked),
            FundsOperation::AddLockedFunds => FundsChange::new(balance, add(locked)?),
            FundsOperation::SubFunds => {
                insufficient(balance)?;
                FundsChange::new(sub(balance)?, locked)
            }
            FundsOperation::LockFunds => {
                insufficient(balance)?;
                FundsChange::new(sub(balance)?, add(locked)?)
            }
            FundsOperation::UnlockFunds => {
                insufficient(locked)?;
                FundsChange::new(add(balance)?, sub(locked)?)
            }
            FundsOperation::UnlockAndSubFunds => {
                insufficient(locked)?;
                FundsChange::new(balance, sub(locked)?)
            }
        };

        if !next.is_storable() {
            return Err(out_of_range());
        }
        Ok(next)
    }

    /// Rejects amounts that can never apply, before any lock is taken.
    pub fn check_amount(self, account: &Account, amount: Decimal) -> Result<(), Error> {
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount {
                account: account.id,
                operation: self,
                amount,
            });
        }
        if !is_storable(amount) {
            return Err(Error::AmountOutOfRange {
                account: account.id,
                operation: self,
                amount,
            });
        }
        Ok(())
    }
}

impl core::fmt::Display for FundsOperation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl core::str::FromStr for FundsOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "add_funds" => Ok(FundsOperation::AddFunds),
            "add_locked" | "add_locked_funds" => Ok(FundsOperation::AddLockedFunds),
            "sub" | "sub_funds" => Ok(FundsOperation::SubFunds),
            "lock" | "lock_funds" => Ok(FundsOperation::LockFunds),
            "unlock" | "unlock_funds" => Ok(FundsOperation::UnlockFunds),
            "unlock_and_sub" | "unlock_and_sub_funds" => Ok(FundsOperation::UnlockAndSubFunds),
            other => Err(Error::Ingestion(format!("Invalid funds operation: {}", other))),
        }
    }
}
