use tracing::info;

use crate::domain::{AccountEvent, Error, EventPublisher};

/// Emits account events as structured log records.
#[derive(Default, Debug)]
pub struct TracingPublisher {}

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: &AccountEvent) -> Result<(), Error> {
        let (kind, account) = match event {
            AccountEvent::Created(account) => ("created", account),
            AccountEvent::Updated(account) => ("updated", account),
        };
        info!(
            event = kind,
            account = account.id,
            member = account.member_id,
            currency = %account.currency_id,
            balance = %account.balance,
            locked = %account.locked,
            "account event"
        );
        Ok(())
    }
}

#[derive(Default, Debug)]
pub struct NoopPublisher {}

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: &AccountEvent) -> Result<(), Error> {
        Ok(())
    }
}
