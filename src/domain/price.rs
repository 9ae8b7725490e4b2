//! Native-to-USD conversion against a price-feed answer.
//!
//! Aggregators report an integer `answer` scaled by `10^decimals`. The conversion
//! below is the decimal form of the 18-decimal fixed-point rule
//! `price * 10^(18 - decimals) * wei / 10^18`: the product is truncated toward
//! zero at 18 fractional digits, never rounded up.

use super::value::{NativeValue, Usd};
use crate::error::{LedgerError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fractional digits kept on USD values.
pub const USD_DECIMALS: u32 = 18;

/// Smallest contribution accepted by `fund`, in USD.
pub const MINIMUM_USD: Usd = Usd(dec!(50));

/// A single price-feed round as reported by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundData {
    pub round_id: u64,
    pub answer: i128,
    pub decimals: u8,
}

impl RoundData {
    /// Converts the scaled integer answer into a USD-per-native-unit rate.
    pub fn rate(&self) -> Result<Rate> {
        if self.answer <= 0 {
            return Err(LedgerError::InvalidPrice(format!(
                "round {} reported non-positive answer {}",
                self.round_id, self.answer
            )));
        }
        Decimal::try_from_i128_with_scale(self.answer, u32::from(self.decimals))
            .map(Rate)
            .map_err(|e| LedgerError::InvalidPrice(e.to_string()))
    }
}

/// USD per one native unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd)]
pub struct Rate(Decimal);

impl Rate {
    pub fn value(&self) -> Decimal {
        self.0
    }
}

pub fn usd_value(amount: NativeValue, rate: Rate) -> Result<Usd> {
    let raw = amount
        .value()
        .checked_mul(rate.0)
        .ok_or(LedgerError::Overflow)?;
    Ok(Usd(raw.round_dp_with_strategy(
        USD_DECIMALS,
        RoundingStrategy::ToZero,
    )))
}

pub fn meets_minimum(amount: NativeValue, rate: Rate) -> Result<bool> {
    Ok(usd_value(amount, rate)? >= MINIMUM_USD)
}
