//! Milliunit amounts.
//!
//! YNAB stores every amount as an integer number of thousandths of the
//! currency unit. Conversion truncates toward zero so that re-running an
//! import produces byte-identical amounts (and therefore identical import ids).

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use thiserror::Error;

/// Scale between a currency unit and a milliunit.
pub const MILLIUNITS_PER_UNIT: i64 = 1000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount {0} does not fit in milliunits")]
    Overflow(Decimal),
}

/// Signed amount in thousandths of the currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Milliunits(pub i64);

impl Milliunits {
    pub const ZERO: Milliunits = Milliunits(0);

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn magnitude(self) -> u64 {
        self.0.unsigned_abs()
    }
}

impl Sub for Milliunits {
    type Output = Milliunits;

    fn sub(self, rhs: Milliunits) -> Milliunits {
        Milliunits(self.0.saturating_sub(rhs.0))
    }
}

impl fmt::Display for Milliunits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scale a decimal currency amount by 1000 and truncate toward zero.
///
/// `12.345 -> 12345`, `-0.001 -> -1`, `0.0019 -> 1`.
pub fn to_milliunits(value: Decimal) -> Result<Milliunits, AmountError> {
    let scaled = value
        .checked_mul(Decimal::from(MILLIUNITS_PER_UNIT))
        .ok_or(AmountError::Overflow(value))?;
    scaled
        .trunc()
        .to_i64()
        .map(Milliunits)
        .ok_or(AmountError::Overflow(value))
}
