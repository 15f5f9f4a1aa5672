//! Non-negative decimal price type.
//!
//! Prices are stored in the currency's standard unit (dollars, not cents)
//! using [`rust_decimal::Decimal`] so catalog arithmetic never goes through
//! floating point. Multi-currency is out of scope; a `Price` is an amount
//! only, and the charge currency is configured at the application level.

use core::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone)]
pub enum PriceError {
    /// The amount is negative.
    #[error("price cannot be negative")]
    Negative,
    /// The input string is not a valid decimal number.
    #[error("price is not a valid decimal number")]
    Malformed,
}

/// A non-negative price in the currency's standard unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a `Price` from a decimal amount.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Negative`] if the amount is below zero.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative);
        }
        Ok(Self(amount))
    }

    /// Parse a `Price` from user input such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Malformed`] if the input is not a decimal
    /// number, or [`PriceError::Negative`] if it is below zero.
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let amount: Decimal = input.trim().parse().map_err(|_| PriceError::Malformed)?;
        Self::new(amount)
    }

    /// The amount in the currency's standard unit.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount in minor currency units (cents), rounded half away from
    /// zero. Saturates at `i64::MAX` for absurd amounts.
    #[must_use]
    pub fn minor_units(&self) -> i64 {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(i64::MAX)
    }

    /// The total for `quantity` units at this price.
    #[must_use]
    pub fn line_total(&self, quantity: u32) -> Decimal {
        self.0 * Decimal::from(quantity)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

// SQLx support (with postgres feature): a Price is a NUMERIC column.
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Price {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Decimal as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Decimal as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Price {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let amount = <Decimal as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::new(amount)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Price {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Decimal as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(price.amount(), Decimal::new(1999, 2));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert!(Price::parse(" 5 ").is_ok());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Price::parse("ten"), Err(PriceError::Malformed)));
        assert!(matches!(Price::parse(""), Err(PriceError::Malformed)));
    }

    #[test]
    fn test_rejects_negative() {
        assert!(matches!(Price::parse("-1"), Err(PriceError::Negative)));
        assert!(matches!(
            Price::new(Decimal::new(-1, 2)),
            Err(PriceError::Negative)
        ));
    }

    #[test]
    fn test_zero_is_valid() {
        assert_eq!(Price::parse("0").unwrap(), Price::ZERO);
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(Price::parse("19.99").unwrap().minor_units(), 1999);
        assert_eq!(Price::parse("10").unwrap().minor_units(), 1000);
        // Half cents round away from zero
        assert_eq!(Price::parse("0.005").unwrap().minor_units(), 1);
    }

    #[test]
    fn test_line_total() {
        let price = Price::parse("2.50").unwrap();
        assert_eq!(price.line_total(3), Decimal::new(750, 2));
        assert_eq!(price.line_total(0), Decimal::ZERO);
    }

    #[test]
    fn test_display_two_decimal_places() {
        assert_eq!(Price::parse("10").unwrap().to_string(), "10.00");
        assert_eq!(Price::parse("19.99").unwrap().to_string(), "19.99");
    }
}
