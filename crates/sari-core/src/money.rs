//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a cash-reconciliation report that difference shows up as a         │
//! │  phantom drawer variance at end of day.                                │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Centavos                                         │
//! │    Every peso amount is stored as i64 centavos. Sums, balances and     │
//! │    variances are exact; the only place precision is dropped is the     │
//! │    points floor, and that drop is explicit.                            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use sari_core::money::Money;
//!
//! // Create from centavos (preferred)
//! let amount = Money::from_cents(109_900); // ₱1,099.00
//!
//! // Arithmetic operations
//! let doubled = amount * 2;
//! let total = amount + Money::from_cents(500);
//!
//! // NEVER do this:
//! // let bad = Money::from_float(10.99); // NO SUCH METHOD EXISTS!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (centavos).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for variances and adjustments
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the ledger flows through this type: sale totals,
/// credit balances, declared closing cash, drawer variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from centavos (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let amount = Money::from_cents(1099); // ₱10.99
    /// assert_eq!(amount.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (pesos and centavos).
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let amount = Money::from_major_minor(10, 99); // ₱10.99
    /// assert_eq!(amount.cents(), 1099);
    ///
    /// let shortage = Money::from_major_minor(-5, 50); // -₱5.50 (drawer short)
    /// assert_eq!(shortage.cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -₱5.50, not -₱4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        // Handle sign: if major is negative, minor should subtract
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in centavos (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (pesos) portion.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (centavos) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Returns the smaller of two amounts.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    /// Subtraction clamped at zero.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let balance = Money::from_cents(1000);
    /// let payment = Money::from_cents(1500);
    ///
    /// // Overpayment is absorbed, never carried as negative balance
    /// assert_eq!(balance.saturating_sub_floor(payment), Money::zero());
    /// ```
    #[inline]
    pub fn saturating_sub_floor(self, other: Self) -> Self {
        Money((self.0 - other.0).max(0))
    }

    /// Loyalty points for this amount at a tier multiplier.
    ///
    /// ## Multiplier Encoding
    /// The multiplier is in percent: 100 = ×1, 150 = ×1.5, 300 = ×3.
    /// Points are `floor(pesos_amount × multiplier)`, computed in integer
    /// math as `cents × pct / 10_000`.
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let sale = Money::from_major_minor(300, 0); // ₱300.00
    /// assert_eq!(sale.points_at_multiplier(150), 450); // silver ×1.5
    /// assert_eq!(sale.points_at_multiplier(100), 300); // bronze ×1
    /// ```
    ///
    /// Truncating integer division equals floor for the non-negative sale
    /// amounts this is called with.
    pub fn points_at_multiplier(&self, multiplier_pct: u32) -> i64 {
        // i128 to prevent overflow on large amounts
        (self.0 as i128 * multiplier_pct as i128 / 10_000) as i64
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Arguments
    /// * `discount_bps` - Discount in basis points (1000 = 10%)
    ///
    /// ## Example
    /// ```rust
    /// use sari_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(10000); // ₱100.00
    /// let discounted = subtotal.apply_percentage_discount(1000); // 10% off
    /// assert_eq!(discounted.cents(), 9000); // ₱90.00
    /// ```
    pub fn apply_percentage_discount(&self, discount_bps: u32) -> Money {
        // Calculate discount amount with rounding, then subtract
        let discount_amount = (self.0 as i128 * discount_bps as i128 + 5000) / 10000;
        Money::from_cents(self.0 - discount_amount as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for debugging and report text. Use frontend formatting for actual
/// UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}₱{}.{:02}", sign, self.pesos().abs(), self.cents_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Summing an iterator of Money values (reading subtotals).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.pesos(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "₱10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "₱5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-₱5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "₱0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_sum() {
        let totals = [100, 250, 650].map(Money::from_cents);
        let sum: Money = totals.into_iter().sum();
        assert_eq!(sum.cents(), 1000);
    }

    #[test]
    fn test_saturating_sub_floor() {
        let balance = Money::from_cents(1200);
        assert_eq!(
            balance.saturating_sub_floor(Money::from_cents(300)).cents(),
            900
        );
        // Overpayment clamps at zero instead of going negative
        assert_eq!(
            balance.saturating_sub_floor(Money::from_cents(5000)),
            Money::zero()
        );
    }

    #[test]
    fn test_points_at_multiplier() {
        // ₱300.00 at ×1.5 = 450 points
        let sale = Money::from_major_minor(300, 0);
        assert_eq!(sale.points_at_multiplier(150), 450);

        // ₱10.50 at ×1 floors to 10 points
        let small = Money::from_major_minor(10, 50);
        assert_eq!(small.points_at_multiplier(100), 10);

        // ₱33.33 at ×3 = 99.99 → 99 points
        let odd = Money::from_cents(3333);
        assert_eq!(odd.points_at_multiplier(300), 99);
    }

    #[test]
    fn test_percentage_discount() {
        let subtotal = Money::from_cents(10000); // ₱100.00
        let discounted = subtotal.apply_percentage_discount(1000); // 10%
        assert_eq!(discounted.cents(), 9000); // ₱90.00
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(!positive.is_zero());
        assert!(positive.is_positive());
        assert!(!positive.is_negative());

        let negative = Money::from_cents(-100);
        assert!(!negative.is_zero());
        assert!(!negative.is_positive());
        assert!(negative.is_negative());
    }
}
