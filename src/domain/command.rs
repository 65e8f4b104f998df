use rust_decimal::Decimal;

use crate::domain::{CurrencyId, FundsOperation, MemberId};

/// A request to run one funds operation against a member's account.
#[derive(Debug, Clone, PartialEq)]
pub struct FundsCommand {
    pub operation: FundsOperation,
    pub member_id: MemberId,
    pub currency_id: CurrencyId,
    pub amount: Decimal,
}

impl core::fmt::Display for FundsCommand {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{},member={},currency={},amount={}",
            self.operation, self.member_id, self.currency_id, self.amount
        )
    }
}
