//! Monetary amounts in minor currency units.
//!
//! All prices in Fournil are integer centimes. Floating point never touches a
//! price; `rust_decimal` is used only when formatting an amount for display
//! (receipts, emails, the payment provider).

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Neg};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An amount of money in centimes (EUR minor units).
///
/// The wrapper is signed: product prices are non-negative (enforced at the
/// catalog boundary), flavor price modifiers may be negative.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero centimes.
    pub const ZERO: Self = Self(0);

    /// Create an amount from centimes.
    #[must_use]
    pub const fn from_centimes(centimes: i64) -> Self {
        Self(centimes)
    }

    /// The raw amount in centimes.
    #[must_use]
    pub const fn centimes(&self) -> i64 {
        self.0
    }

    /// Whether the amount is below zero.
    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiply by a quantity.
    #[must_use]
    pub const fn times(self, qty: u32) -> Self {
        Self(self.0 * qty as i64)
    }

    /// The amount as a two-decimal value in major units (e.g. `28.00`).
    #[must_use]
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Format as a plain decimal string the payment provider accepts
    /// (e.g. `"28.00"`).
    #[must_use]
    pub fn to_amount_string(self) -> String {
        format!("{:.2}", self.to_decimal())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} €", self.to_decimal())
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Money {
    fn from(centimes: i64) -> Self {
        Self(centimes)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

// SQLx support (with postgres feature): stored as BIGINT
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let centimes = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(centimes))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_times_and_sum() {
        let unit = Money::from_centimes(3000);
        let total: Money = [unit.times(2), Money::from_centimes(500)].into_iter().sum();
        assert_eq!(total.centimes(), 6500);
    }

    #[test]
    fn test_negative_modifier() {
        let price = Money::from_centimes(2800) + Money::from_centimes(-300);
        assert_eq!(price.centimes(), 2500);
        assert!(!price.is_negative());
        assert!(Money::from_centimes(-1).is_negative());
    }

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::from_centimes(2800).to_string(), "28.00 €");
        assert_eq!(Money::from_centimes(205).to_string(), "2.05 €");
        assert_eq!(Money::from_centimes(2800).to_amount_string(), "28.00");
    }

    #[test]
    fn test_serde_transparent() {
        let json = serde_json::to_string(&Money::from_centimes(6000)).unwrap();
        assert_eq!(json, "6000");
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(back.centimes(), 6000);
    }
}
