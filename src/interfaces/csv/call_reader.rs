use crate::domain::call::Call;
use crate::error::{LedgerError, Result};
use std::io::Read;

/// Reads recorded ledger calls from a CSV source.
///
/// Expects a `call, caller, value` header. Wraps `csv::Reader`, trimming
/// whitespace and tolerating a missing trailing `value` column.
pub struct CallReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CallReader<R> {
    /// Creates a new `CallReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and deserializes calls.
    pub fn calls(self) -> impl Iterator<Item = Result<Call>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(LedgerError::from))
    }
}
