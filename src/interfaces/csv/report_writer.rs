use crate::domain::ledger::LedgerState;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct FunderRow<'a> {
    index: usize,
    funder: &'a str,
    amount_funded: String,
}

/// Writes the funder list of a ledger as CSV.
///
/// One row per entry of the funder list, in contribution order; an identity
/// that funded twice is listed twice, each time with its running total.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_report(&mut self, state: &LedgerState) -> Result<()> {
        if state.funders.is_empty() {
            // serialize() only emits the header alongside a first row
            self.writer
                .write_record(["index", "funder", "amount_funded"])?;
        }
        for (index, funder) in state.funders.iter().enumerate() {
            self.writer.serialize(FunderRow {
                index,
                funder: funder.as_str(),
                amount_funded: state.amount_funded(funder).to_string(),
            })?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
