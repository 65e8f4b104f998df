use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::FundsChange;

pub type AccountId = u64;
pub type MemberId = u64;
pub type CurrencyId = String;

/// One balance row per (member, currency) pair.
///
/// `balance` and `locked` are never written directly; every change goes
/// through a [`FundsChange`] produced by a validated transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,
    pub member_id: MemberId,
    pub currency_id: CurrencyId,
    pub balance: Decimal, // spendable funds
    pub locked: Decimal,  // reserved against open orders and withdrawals
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(id: AccountId, member_id: MemberId, currency_id: CurrencyId) -> Self {
        let now = Utc::now();
        Self {
            id,
            member_id,
            currency_id,
            balance: Decimal::ZERO,
            locked: Decimal::ZERO,
            created_at: now,
            updated_at: now,
        }
    }

    /// Total funds attributable to the member: `balance + locked`.
    pub fn amount(&self) -> Decimal {
        self.balance + self.locked
    }

    pub fn funds(&self) -> FundsChange {
        FundsChange::new(self.balance, self.locked)
    }

    pub(crate) fn apply(&mut self, change: FundsChange) {
        self.balance = change.balance();
        self.locked = change.locked();
        self.updated_at = Utc::now();
    }
}
