//! Exact rational arithmetic for beat offsets.
//!
//! Note offsets accumulate by repeatedly adding small per-row increments such
//! as `1/12` or `1/192`. Doing that in floating point drifts; doing it with
//! [`Fraction`] is exact. Offsets only become `f64` once, at the moment they
//! are emitted into the public model.

use num::Integer;

/// An exact rational number.
///
/// Results of arithmetic may be left unreduced; reduction is available
/// through [`Fraction::simplify`]. The denominator must be non-zero and is
/// kept positive by every constructor in this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fraction {
    /// The numerator.
    pub n: i64,
    /// The denominator. Never zero.
    pub d: i64,
}

impl Fraction {
    /// Zero, as `0/1`.
    pub const ZERO: Self = Self { n: 0, d: 1 };

    /// Creates a new fraction from a numerator and a denominator.
    #[must_use]
    pub const fn new(n: i64, d: i64) -> Self {
        Self { n, d }
    }

    /// Creates a whole number as `n/1`.
    #[must_use]
    pub const fn whole(n: i64) -> Self {
        Self { n, d: 1 }
    }

    /// Reduces the fraction by the GCD of its terms.
    #[must_use]
    pub fn simplify(self) -> Self {
        let reduce_by = self.n.gcd(&self.d);
        if reduce_by == 0 {
            return self;
        }
        Self::new(self.n / reduce_by, self.d / reduce_by)
    }

    /// The decimal quotient of the fraction.
    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.n as f64 / self.d as f64
    }

    /// Compares two fractions by value, not by representation.
    #[must_use]
    pub fn cmp_value(self, other: Self) -> std::cmp::Ordering {
        let lhs = i128::from(self.n) * i128::from(other.d);
        let rhs = i128::from(other.n) * i128::from(self.d);
        lhs.cmp(&rhs)
    }
}

impl std::ops::Add for Fraction {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        if rhs.d == self.d {
            return Self::new(self.n + rhs.n, self.d);
        }
        Self::new(self.n * rhs.d + self.d * rhs.n, self.d * rhs.d).simplify()
    }
}

impl std::ops::Rem for Fraction {
    type Output = Self;

    /// Cross-multiplied modulo, used to test beat alignment against a
    /// quantization denominator. The result is left unreduced; a zero
    /// numerator means the offset divides evenly.
    fn rem(self, rhs: Self) -> Self {
        Self::new((rhs.d * self.n) % (rhs.n * self.d), rhs.d * self.d)
    }
}

impl std::fmt::Display for Fraction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_f64())
    }
}
