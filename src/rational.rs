//! Exact rational arithmetic for musical durations
//!
//! Every position and duration in the score trees is expressed in whole
//! notes as a [`Rational`]. The type wraps `num_rational::Ratio<i64>` but,
//! unlike `Ratio::new`, construction does NOT reduce: callers that need the
//! canonical form call [`Rational::rationalise`] first. Some algorithms
//! (see `lpsr::durations`) compare the numerator before and after
//! rationalisation to detect whether simplification took place.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// A numerator/denominator pair, denominator always positive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rational(Ratio<i64>);

impl Rational {
    /// Sentinel for "not yet set" positions and durations
    pub const NOT_SET: Rational = Rational(Ratio::new_raw(-222_222, 1));

    /// Create a rational, keeping the given (possibly unreduced) terms.
    ///
    /// Panics if `denominator` is zero.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        assert!(denominator != 0, "Rational denominator must not be zero");
        if denominator < 0 {
            Rational(Ratio::new_raw(-numerator, -denominator))
        } else {
            Rational(Ratio::new_raw(numerator, denominator))
        }
    }

    pub fn from_integer(value: i64) -> Self {
        Rational(Ratio::from_integer(value))
    }

    pub fn zero() -> Self {
        Self::from_integer(0)
    }

    pub fn one() -> Self {
        Self::from_integer(1)
    }

    /// Numerator of the current representation (not necessarily reduced)
    pub fn numerator(&self) -> i64 {
        *self.0.numer()
    }

    /// Denominator of the current representation (not necessarily reduced)
    pub fn denominator(&self) -> i64 {
        *self.0.denom()
    }

    /// Reduce to lowest terms in place. Idempotent.
    pub fn rationalise(&mut self) {
        self.0 = self.0.reduced();
    }

    /// Reduced copy of this value
    pub fn rationalised(self) -> Self {
        Rational(self.0.reduced())
    }

    pub fn is_set(&self) -> bool {
        *self != Self::NOT_SET
    }

    pub fn is_zero(&self) -> bool {
        self.numerator() == 0
    }

    pub fn is_positive(&self) -> bool {
        self.numerator() > 0
    }

    /// Whether the reduced value has denominator 1
    pub fn is_integer(&self) -> bool {
        self.0.reduced().denom() == &1
    }

    /// Integer part of the reduced value when it is an integer
    pub fn as_integer(&self) -> Option<i64> {
        let reduced = self.0.reduced();
        (reduced.denom() == &1).then(|| *reduced.numer())
    }

    /// For debugging and display only
    pub fn to_f64(&self) -> f64 {
        self.numerator() as f64 / self.denominator() as f64
    }

    /// `1 / 2^exponent`
    pub fn power_of_two_fraction(exponent: u32) -> Self {
        Rational::new(1, 1_i64 << exponent)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator() == 1 {
            write!(f, "{}", self.numerator())
        } else {
            write!(f, "{}/{}", self.numerator(), self.denominator())
        }
    }
}

impl Add for Rational {
    type Output = Rational;
    fn add(self, rhs: Rational) -> Rational {
        Rational(self.0 + rhs.0)
    }
}

impl AddAssign for Rational {
    fn add_assign(&mut self, rhs: Rational) {
        self.0 = self.0 + rhs.0;
    }
}

impl Sub for Rational {
    type Output = Rational;
    fn sub(self, rhs: Rational) -> Rational {
        Rational(self.0 - rhs.0)
    }
}

impl SubAssign for Rational {
    fn sub_assign(&mut self, rhs: Rational) {
        self.0 = self.0 - rhs.0;
    }
}

impl Mul for Rational {
    type Output = Rational;
    fn mul(self, rhs: Rational) -> Rational {
        Rational(self.0 * rhs.0)
    }
}

impl Mul<i64> for Rational {
    type Output = Rational;
    fn mul(self, rhs: i64) -> Rational {
        Rational(self.0 * Ratio::from_integer(rhs))
    }
}

impl Div for Rational {
    type Output = Rational;
    fn div(self, rhs: Rational) -> Rational {
        Rational(self.0 / rhs.0)
    }
}

impl Div<i64> for Rational {
    type Output = Rational;
    fn div(self, rhs: i64) -> Rational {
        Rational(self.0 / Ratio::from_integer(rhs))
    }
}

impl Neg for Rational {
    type Output = Rational;
    fn neg(self) -> Rational {
        Rational(-self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gcd(a: i64, b: i64) -> i64 {
        if b == 0 { a.abs() } else { gcd(b, a % b) }
    }

    #[test]
    fn test_new_keeps_unreduced_terms() {
        let r = Rational::new(6, 8);
        assert_eq!(r.numerator(), 6);
        assert_eq!(r.denominator(), 8);
    }

    #[test]
    fn test_rationalise_is_idempotent() {
        let mut r = Rational::new(12, 16);
        r.rationalise();
        assert_eq!((r.numerator(), r.denominator()), (3, 4));
        r.rationalise();
        assert_eq!((r.numerator(), r.denominator()), (3, 4));
    }

    #[test]
    fn test_rationalise_invariant() {
        for (n, d) in [(0, 5), (4, -6), (-9, 12), (100, 75), (7, 1), (-3, -9), (128, 1024)] {
            let mut r = Rational::new(n, d);
            r.rationalise();
            assert!(r.denominator() > 0, "{}/{}", n, d);
            assert_eq!(gcd(r.numerator(), r.denominator()), 1, "{}/{}", n, d);
        }
    }

    #[test]
    fn test_equality_ignores_representation() {
        assert_eq!(Rational::new(2, 4), Rational::new(1, 2));
        assert!(Rational::new(1, 3) < Rational::new(1, 2));
    }

    #[test]
    fn test_arithmetic_is_exact() {
        let third = Rational::new(1, 3);
        let sum = third + third + third;
        assert_eq!(sum, Rational::one());
        assert_eq!(Rational::new(3, 4) - Rational::new(1, 8), Rational::new(5, 8));
        assert_eq!(Rational::new(1, 2) * Rational::new(2, 3), Rational::new(1, 3));
        assert_eq!(Rational::new(1, 2) / Rational::new(1, 32) / 2, Rational::from_integer(8));
    }

    #[test]
    fn test_not_set_sentinel() {
        assert!(!Rational::NOT_SET.is_set());
        assert!(Rational::zero().is_set());
        assert!(Rational::NOT_SET.numerator() < 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rational::new(3, 4).to_string(), "3/4");
        assert_eq!(Rational::from_integer(2).to_string(), "2");
    }
}
