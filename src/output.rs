use std::io::Write;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Account, CurrencyId, Error, MemberId};

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    member: MemberId,
    currency: &'a CurrencyId,
    #[serde(with = "rust_decimal::serde::str")]
    balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    locked: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

/// Writes account states as `member,currency,balance,locked,amount`.
pub struct CsvReport<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvReport<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(writer),
        }
    }

    pub fn write(&mut self, accounts: &[Account]) -> Result<(), Error> {
        for account in accounts {
            self.writer.serialize(ReportRow {
                member: account.member_id,
                currency: &account.currency_id,
                balance: account.balance.normalize(),
                locked: account.locked.normalize(),
                amount: account.amount().normalize(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> Result<W, Error> {
        self.writer
            .into_inner()
            .map_err(|e| Error::IO(e.into_error()))
    }
}
