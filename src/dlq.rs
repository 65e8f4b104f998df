use tracing::warn;

use crate::domain::{DeadLetterQueue, Error};

#[derive(Default, Debug)]
pub struct StdErrDLQ {}

impl DeadLetterQueue for StdErrDLQ {
    fn report(&self, error: &Error) {
        warn!(transient = error.is_transient(), "DLQ Report - Error: {}", error);
    }
}
