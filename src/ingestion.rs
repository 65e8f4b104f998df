use std::io::Read;
use std::pin::Pin;

use futures::stream::{self, Stream};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::traits::CommandStream;
use crate::domain::{Error, FundsCommand, FundsOperation, MemberId};

pub struct CsvReader<R: Read> {
    reader: Option<csv::Reader<R>>,
}

impl<R: Read> CsvReader<R> {
    pub fn new(reader: R) -> Self {
        let rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        Self { reader: Some(rdr) }
    }
}

/// Internal shape used only for CSV deserialization.
#[derive(Debug, Deserialize)]
struct CsvRow {
    op: String,
    member: MemberId,
    currency: String,
    #[serde(with = "rust_decimal::serde::str")]
    amount: Decimal,
}

impl TryFrom<CsvRow> for FundsCommand {
    type Error = Error;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let currency_id = row.currency.trim().to_ascii_lowercase();
        if currency_id.is_empty() {
            return Err(Error::Ingestion(format!(
                "Missing currency for member {}",
                row.member
            )));
        }

        Ok(FundsCommand {
            operation: row.op.parse::<FundsOperation>()?,
            member_id: row.member,
            currency_id,
            amount: row.amount,
        })
    }
}

impl<R: Read + Send + 'static> CommandStream for CsvReader<R> {
    type CmdStream = Pin<Box<dyn Stream<Item = Result<FundsCommand, Error>> + Send>>;

    fn stream(&mut self) -> Self::CmdStream {
        // Take ownership of the reader so the iterator we build owns all data and is 'static.
        let reader = match self.reader.take() {
            Some(r) => r,
            None => {
                // Already consumed; return an empty stream.
                return Box::pin(stream::iter(Vec::<Result<FundsCommand, Error>>::new()));
            }
        };

        let iter = reader
            .into_deserialize::<CsvRow>()
            .map(|row_res| match row_res {
                Ok(row) => FundsCommand::try_from(row),
                Err(e) => Err(Error::Ingestion(format!(
                    "CSV deserialization error: {}",
                    e
                ))),
            });

        Box::pin(stream::iter(iter))
    }
}
