//! Value objects, ledger state and the ports the engine depends on.

pub mod call;
pub mod identity;
pub mod ledger;
pub mod ports;
pub mod price;
pub mod value;
