//! # Money Module
//!
//! Provides the `Money` type for handling base-currency amounts safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing 0.1 + 0.2 in binary floating point:                           │
//! │    0.30000000000000004  ❌                                              │
//! │                                                                         │
//! │  A cart re-summed after every click drifts the same way.               │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 + 550 = 1550 cents, exactly, every time                        │
//! │                                                                         │
//! │  Decimal (rust_decimal) is used only when crossing into another        │
//! │  currency for display; see the `currency` module.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bistro_core::money::Money;
//!
//! let price = Money::from_cents(999); // 9.99
//! let line = price * 3u32;            // 29.97
//! assert_eq!(line.cents(), 2997);
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

/// Minor units per major unit of the base currency.
const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A base-currency amount in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// MenuItem.price ──► CartLineItem.unit_price ──► line_total
///                                                    │
///                         Σ line totals ──► subtotal ─┼─► tax
///                                                    │
///                         subtotal + tax + fee ──► total ──► Order
/// ```
///
/// Serializes as a plain integer number of cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ```rust
    /// use bistro_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates Money from a decimal major-unit amount such as `5.99`.
    ///
    /// Returns `None` when the amount has sub-cent precision or does not
    /// fit in an `i64` of cents.
    ///
    /// ```rust
    /// use bistro_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let fee = Money::from_decimal(Decimal::new(599, 2)).unwrap();
    /// assert_eq!(fee.cents(), 599);
    /// assert!(Money::from_decimal(Decimal::new(5999, 3)).is_none());
    /// ```
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let cents = amount.checked_mul(Decimal::from(MINOR_PER_MAJOR))?;
        if !cents.fract().is_zero() {
            return None;
        }
        i64::try_from(cents).ok().map(Money)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    /// Returns the exact amount in major units as a Decimal (`1099` → `10.99`).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax on this amount, rounded once to the cent.
    ///
    /// ## Rounding
    /// Half away from zero: `0.825 → 0.83`, `-0.825 → -0.83`.
    /// Tax is the only place pricing rounds; every other sum is exact.
    ///
    /// ## Example
    /// ```rust
    /// use bistro_core::money::Money;
    /// use bistro_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(2550); // 25.50
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(800)); // 8%
    /// assert_eq!(tax.cents(), 204);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so a large subtotal times 10000 bps cannot overflow
        let product = self.0 as i128 * rate.bps() as i128;
        let magnitude = (product.abs() + 5_000) / 10_000;
        let tax = if product < 0 { -magnitude } else { magnitude };
        Money(tax as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` rendering without a currency symbol.
///
/// UI display goes through [`crate::currency::format`], which knows the
/// selected currency.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a cart quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        Money(self.0 * i64::from(qty))
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_from_decimal() {
        assert_eq!(Money::from_decimal(dec!(5.99)), Some(Money::from_cents(599)));
        assert_eq!(Money::from_decimal(dec!(12)), Some(Money::from_cents(1200)));
        assert_eq!(Money::from_decimal(dec!(0.001)), None);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Money::from_cents(2550).to_decimal(), dec!(25.50));
        assert_eq!(Money::from_cents(-5).to_decimal(), dec!(-0.05));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "10.99");
        assert_eq!(Money::from_cents(500).to_string(), "5.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-5.50");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(550);

        assert_eq!((a + b).cents(), 1550);
        assert_eq!((a - b).cents(), 450);
        assert_eq!((a * 2u32).cents(), 2000);
        assert_eq!((b * 3i64).cents(), 1650);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 600);

        let empty: Money = std::iter::empty::<Money>().sum();
        assert!(empty.is_zero());
    }

    #[test]
    fn test_tax_exact() {
        let tax = Money::from_cents(2550).calculate_tax(TaxRate::from_bps(800));
        assert_eq!(tax.cents(), 204);
    }

    #[test]
    fn test_tax_rounds_half_away_from_zero() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let rate = TaxRate::from_bps(825);
        assert_eq!(Money::from_cents(1000).calculate_tax(rate).cents(), 83);
        assert_eq!(Money::from_cents(-1000).calculate_tax(rate).cents(), -83);

        // 0.10 at 8% = 0.008 → 0.01
        assert_eq!(Money::from_cents(10).calculate_tax(TaxRate::from_bps(800)).cents(), 1);
    }

    #[test]
    fn test_repeated_addition_has_no_drift() {
        let mut total = Money::zero();
        for _ in 0..1000 {
            total += Money::from_cents(1);
        }
        assert_eq!(total.cents(), 1000);
        assert_eq!(total.to_decimal(), dec!(10.00));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-550).abs().cents(), 550);
    }
}
