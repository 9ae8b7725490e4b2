use crate::error::{LedgerError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fractional digits carried by native values (one wei is `10^-18`).
pub const NATIVE_DECIMALS: u32 = 18;

/// A non-negative amount of the chain's native currency.
///
/// Denominated in whole native units with at most 18 fractional digits, so every
/// value maps onto an integer number of wei. Arithmetic is checked: an overflow
/// surfaces as [`LedgerError::Overflow`] instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "Decimal")]
pub struct NativeValue(Decimal);

impl NativeValue {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(LedgerError::ValidationError(
                "Native value must not be negative".to_string(),
            ));
        }
        if value.normalize().scale() > NATIVE_DECIMALS {
            return Err(LedgerError::ValidationError(format!(
                "Native value {} has more than {} fractional digits",
                value, NATIVE_DECIMALS
            )));
        }
        Ok(Self(value.abs()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(LedgerError::Overflow)
    }
}

impl TryFrom<Decimal> for NativeValue {
    type Error = LedgerError;

    fn try_from(value: Decimal) -> Result<Self> {
        Self::new(value)
    }
}

// Parsed from text so CSV fields never pass through `f64`.
impl TryFrom<String> for NativeValue {
    type Error = LedgerError;

    fn try_from(value: String) -> Result<Self> {
        let decimal = Decimal::from_str(value.trim()).map_err(|e| {
            LedgerError::ValidationError(format!("Invalid native value '{}': {}", value, e))
        })?;
        Self::new(decimal)
    }
}

impl From<NativeValue> for Decimal {
    fn from(value: NativeValue) -> Self {
        value.0
    }
}

impl fmt::Display for NativeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// A USD amount at 18-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Usd(pub Decimal);

impl fmt::Display for Usd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} USD", self.0.normalize())
    }
}
