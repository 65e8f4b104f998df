use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;
use tracing::debug;

use crate::config::LedgerConfig;
use crate::domain::{
    AccountStore, CurrencyId, Error, EventPublisher, FundsCommand, MemberId,
    traits::{CommandStream, DeadLetterQueue},
};
use crate::ledger::AccountLedger;
use crate::output::CsvReport;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessSummary {
    pub applied: usize,
    pub rejected: usize,
}

/// Feeds a command stream through per-account ledgers. Rejected commands go
/// to the dead letter queue and processing carries on.
pub struct Engine<I, S, P, D>
where
    I: CommandStream,
    S: AccountStore,
    P: EventPublisher,
    D: DeadLetterQueue,
{
    ingestion: I,
    store: Arc<S>,
    publisher: Arc<P>,
    config: LedgerConfig,
    dlq: D,
    ledgers: HashMap<(MemberId, CurrencyId), AccountLedger<S, P>>,
}

impl<I, S, P, D> Engine<I, S, P, D>
where
    I: CommandStream,
    S: AccountStore,
    P: EventPublisher,
    D: DeadLetterQueue,
{
    pub fn new(ingestion: I, store: Arc<S>, publisher: Arc<P>, config: LedgerConfig, dlq: D) -> Self {
        Self {
            ingestion,
            store,
            publisher,
            config,
            dlq,
            ledgers: HashMap::new(),
        }
    }

    pub async fn process(&mut self) -> Result<ProcessSummary, Error> {
        let mut res = self.ingestion.stream();
        let mut summary = ProcessSummary::default();

        while let Some(cmd) = res.next().await {
            let outcome = match cmd {
                Ok(cmd) => self.apply_command(cmd).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => summary.applied += 1,
                Err(e) => {
                    summary.rejected += 1;
                    self.dlq.report(&e);
                }
            }
        }

        Ok(summary)
    }

    async fn apply_command(&mut self, cmd: FundsCommand) -> Result<(), Error> {
        debug!(command = %cmd, "applying");
        let ledger = self.ledger(cmd.member_id, &cmd.currency_id).await?;
        ledger.execute(cmd.operation, cmd.amount).await?;
        Ok(())
    }

    async fn ledger(
        &mut self,
        member_id: MemberId,
        currency_id: &CurrencyId,
    ) -> Result<&mut AccountLedger<S, P>, Error> {
        match self.ledgers.entry((member_id, currency_id.clone())) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(e) => {
                let ledger = AccountLedger::open(
                    Arc::clone(&self.store),
                    Arc::clone(&self.publisher),
                    self.config.clone(),
                    member_id,
                    currency_id,
                )
                .await?;
                Ok(e.insert(ledger))
            }
        }
    }

    /// Writes every account in the store, ordered by id.
    pub async fn flush<W: Write>(&self, writer: W) -> Result<(), Error> {
        let accounts = self.store.accounts().await?;
        CsvReport::new(writer).write(&accounts)
    }
}
