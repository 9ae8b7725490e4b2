#![allow(dead_code)]

use fundme::application::engine::Ledger;
use fundme::domain::call::CallContext;
use fundme::domain::identity::Identity;
use fundme::domain::ports::PriceOracleRef;
use fundme::domain::value::NativeValue;
use fundme::infrastructure::in_memory::{InMemoryBank, InMemoryLedgerStore};
use fundme::infrastructure::mock_aggregator::MockV3Aggregator;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;

pub const DEPLOYER: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

pub fn id(s: &str) -> Identity {
    Identity::new(s).unwrap()
}

pub fn native(value: Decimal) -> NativeValue {
    NativeValue::new(value).unwrap()
}

pub fn account(index: usize) -> Identity {
    id(&format!("0x{:040x}", index))
}

/// Deploys a ledger from `DEPLOYER` against the default 2000 USD mock feed.
pub async fn deploy_local(bank: InMemoryBank) -> Ledger {
    let feed: PriceOracleRef = Arc::new(MockV3Aggregator::default());
    Ledger::deploy(
        &CallContext::from_sender(id(DEPLOYER)),
        feed,
        Box::new(InMemoryLedgerStore::new()),
        Box::new(bank),
    )
    .await
    .unwrap()
}

/// Writes `rounds` passes of one 1.0 contribution from each of `funders` accounts.
pub fn generate_fund_calls(path: &Path, funders: usize, rounds: usize) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().from_writer(file);

    wtr.write_record(["call", "caller", "value"])?;

    for _ in 0..rounds {
        for i in 1..=funders {
            wtr.write_record(["fund", &format!("0x{:040x}", i), "1.0"])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
