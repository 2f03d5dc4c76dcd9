// ============================================================================
// Fixed-Point Decimal
// Fixed-point price arithmetic with compile-time precision
// ============================================================================

use super::errors::{NumericError, NumericResult};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Neg;

/// Fixed-point decimal number with compile-time precision.
///
/// Internally stores `value × 10^DECIMALS` as an i64, so ordering and
/// equality are exact integer comparisons. Map keys built from prices rely
/// on this.
///
/// # Type Parameter
/// - `DECIMALS`: Number of decimal places (0-18). Default is 2.
///
/// # Example
/// ```ignore
/// use clob_engine::numeric::Price;
///
/// let limit: Price = "150.25".parse()?;
/// assert_eq!(limit.to_string(), "150.25");
/// ```
#[derive(Clone, Copy)]
#[repr(transparent)]
pub struct FixedDecimal<const DECIMALS: u8 = 2>(i64);

/// Compute 10^n at compile time
const fn pow10(n: u8) -> i64 {
    let mut result: i64 = 1;
    let mut i = 0;
    while i < n {
        result *= 10;
        i += 1;
    }
    result
}

impl<const D: u8> FixedDecimal<D> {
    /// The scale factor (10^DECIMALS)
    pub const SCALE: i64 = pow10(D);

    /// Zero value
    pub const ZERO: Self = Self(0);

    // ========================================================================
    // Construction
    // ========================================================================

    /// Create from raw internal representation (an already-scaled value).
    #[inline]
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create from an integer value.
    ///
    /// # Errors
    /// Returns `Overflow` if the value is too large to represent.
    #[inline]
    pub fn from_integer(value: i64) -> NumericResult<Self> {
        value
            .checked_mul(Self::SCALE)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    /// Create from integer and fractional parts.
    ///
    /// # Arguments
    /// - `integer`: The integer part (can be negative)
    /// - `fraction`: The fractional part (must be < SCALE, always positive)
    #[inline]
    pub fn from_parts(integer: i64, fraction: u64) -> NumericResult<Self> {
        if fraction >= Self::SCALE as u64 {
            return Err(NumericError::InvalidInput);
        }

        let int_scaled = integer
            .checked_mul(Self::SCALE)
            .ok_or(NumericError::Overflow)?;

        let frac_signed = if integer < 0 {
            -(fraction as i64)
        } else {
            fraction as i64
        };

        int_scaled
            .checked_add(frac_signed)
            .map(Self)
            .ok_or(NumericError::Overflow)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Get the raw internal value (scaled).
    #[inline]
    pub const fn raw_value(self) -> i64 {
        self.0
    }

    /// Get the integer part (truncated toward zero).
    #[inline]
    pub const fn integer_part(self) -> i64 {
        self.0 / Self::SCALE
    }

    /// Get the fractional part as a positive value.
    #[inline]
    pub const fn fractional_part(self) -> u64 {
        (self.0 % Self::SCALE).unsigned_abs()
    }

    /// Check if value is zero.
    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Check if value is negative.
    #[inline]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    // ========================================================================
    // Comparison
    // ========================================================================

    /// Returns the minimum of two values.
    #[inline]
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }

    /// Returns the maximum of two values.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }
}

// ============================================================================
// Trait Implementations
// ============================================================================

impl<const D: u8> Default for FixedDecimal<D> {
    #[inline]
    fn default() -> Self {
        Self::ZERO
    }
}

impl<const D: u8> PartialEq for FixedDecimal<D> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<const D: u8> Eq for FixedDecimal<D> {}

impl<const D: u8> PartialOrd for FixedDecimal<D> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.0.cmp(&other.0))
    }
}

impl<const D: u8> Ord for FixedDecimal<D> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl<const D: u8> Hash for FixedDecimal<D> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl<const D: u8> Neg for FixedDecimal<D> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

// ============================================================================
// Display and Debug
// ============================================================================

impl<const D: u8> fmt::Debug for FixedDecimal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedDecimal<{}>({}, raw={})", D, self, self.0)
    }
}

impl<const D: u8> fmt::Display for FixedDecimal<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let int_part = self.integer_part();
        let frac_part = self.fractional_part();

        if D == 0 {
            write!(f, "{}", int_part)
        } else if self.0 < 0 && int_part == 0 {
            // Handle -0.xx case
            write!(f, "-0.{:0>width$}", frac_part, width = D as usize)
        } else {
            write!(f, "{}.{:0>width$}", int_part, frac_part, width = D as usize)
        }
    }
}

// ============================================================================
// Conversion from rust_decimal (for API boundaries)
// ============================================================================

impl<const D: u8> FixedDecimal<D> {
    /// Convert from rust_decimal::Decimal.
    ///
    /// This is intended for API boundaries only (parsing user input).
    /// The conversion normalizes the scale to match DECIMALS.
    ///
    /// # Errors
    /// - `PrecisionLoss` if significant digits would be lost
    /// - `Overflow` if the value is too large
    pub fn from_decimal(d: rust_decimal::Decimal) -> NumericResult<Self> {
        use rust_decimal::prelude::ToPrimitive;

        let decimal_scale = d.scale();
        let target_scale = D as u32;

        // Multiply to get the raw integer representation at target scale
        let multiplier = rust_decimal::Decimal::from(Self::SCALE);
        let scaled = d * multiplier;

        let raw = scaled.to_i64().ok_or(NumericError::Overflow)?;

        // Check for precision loss: if decimal has more precision than target
        if decimal_scale > target_scale {
            let reconstructed =
                rust_decimal::Decimal::from(raw) / rust_decimal::Decimal::from(Self::SCALE);
            if reconstructed != d {
                return Err(NumericError::PrecisionLoss);
            }
        }

        Ok(Self(raw))
    }
}

// ============================================================================
// String Parsing
// ============================================================================

impl<const D: u8> std::str::FromStr for FixedDecimal<D> {
    type Err = NumericError;

    /// Parse from a decimal string.
    ///
    /// # Examples
    /// - "123" -> 123.00
    /// - "123.45" -> 123.45
    /// - "-0.01" -> -0.01
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(NumericError::InvalidInput);
        }

        let (is_negative, s) = if let Some(rest) = s.strip_prefix('-') {
            (true, rest)
        } else {
            (false, s)
        };

        let (int_str, frac_str) = if let Some(pos) = s.find('.') {
            (&s[..pos], Some(&s[pos + 1..]))
        } else {
            (s, None)
        };

        let int_val: i64 = if int_str.is_empty() {
            0
        } else {
            int_str.parse().map_err(|_| NumericError::InvalidInput)?
        };

        let frac_val: u64 = if let Some(frac) = frac_str {
            if frac.is_empty() {
                0
            } else if frac.len() > D as usize {
                return Err(NumericError::PrecisionLoss);
            } else {
                // Pad with zeros to reach DECIMALS length
                let padded = format!("{:0<width$}", frac, width = D as usize);
                padded.parse().map_err(|_| NumericError::InvalidInput)?
            }
        } else {
            0
        };

        let mut result = Self::from_parts(int_val, frac_val)?;
        if is_negative {
            result = -result;
        }

        Ok(result)
    }
}

// ============================================================================
// Type Aliases
// ============================================================================

/// Price with two decimal places, the tick grid every venue file uses
pub type Price = FixedDecimal<2>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(Price::SCALE, 100);
        assert_eq!(Price::ZERO.raw_value(), 0);
    }

    #[test]
    fn test_from_integer() {
        let x = Price::from_integer(150).unwrap();
        assert_eq!(x.raw_value(), 15_000);
        assert_eq!(x.integer_part(), 150);
        assert_eq!(x.fractional_part(), 0);
    }

    #[test]
    fn test_from_parts() {
        // 150.25
        let x = Price::from_parts(150, 25).unwrap();
        assert_eq!(x.integer_part(), 150);
        assert_eq!(x.fractional_part(), 25);
        assert_eq!(x.to_string(), "150.25");

        // -5.50
        let y = Price::from_parts(-5, 50).unwrap();
        assert_eq!(y.integer_part(), -5);
        assert!(y.is_negative());
    }

    #[test]
    fn test_from_parts_invalid() {
        // Fraction >= SCALE should fail
        let result = Price::from_parts(1, 100);
        assert_eq!(result, Err(NumericError::InvalidInput));
    }

    #[test]
    fn test_comparison() {
        let a = Price::from_parts(150, 30).unwrap();
        let b = Price::from_parts(150, 25).unwrap();

        assert!(a > b);
        assert!(b < a);
        assert_eq!(a, a);
        assert_ne!(a, b);
        assert_eq!(a.min(b), b);
        assert_eq!(a.max(b), a);
    }

    #[test]
    fn test_display() {
        assert_eq!(Price::from_parts(150, 25).unwrap().to_string(), "150.25");
        assert_eq!(Price::ZERO.to_string(), "0.00");
        assert_eq!(Price::from_parts(0, 5).unwrap().to_string(), "0.05");

        let neg = -Price::from_parts(0, 10).unwrap();
        assert_eq!(neg.to_string(), "-0.10");
    }

    #[test]
    fn test_from_str() {
        let x: Price = "150.25".parse().unwrap();
        assert_eq!(x.integer_part(), 150);
        assert_eq!(x.fractional_part(), 25);

        let y: Price = "-0.01".parse().unwrap();
        assert!(y.is_negative());
        assert_eq!(y.fractional_part(), 1);

        let z: Price = "42".parse().unwrap();
        assert_eq!(z.integer_part(), 42);
        assert_eq!(z.fractional_part(), 0);

        // ".5" parses as 0.50
        let frac_only: Price = ".5".parse().unwrap();
        assert_eq!(frac_only.to_string(), "0.50");
    }

    #[test]
    fn test_from_str_invalid() {
        let result: Result<Price, _> = "not_a_number".parse();
        assert_eq!(result, Err(NumericError::InvalidInput));

        // Too many decimals
        let result: Result<Price, _> = "1.123".parse();
        assert_eq!(result, Err(NumericError::PrecisionLoss));
    }

    #[test]
    fn test_from_decimal() {
        use rust_decimal::Decimal;

        let d = Decimal::new(15025, 2); // 150.25
        let x = Price::from_decimal(d).unwrap();
        assert_eq!(x.integer_part(), 150);
        assert_eq!(x.fractional_part(), 25);

        // Integral decimal
        let whole = Price::from_decimal(Decimal::from(99)).unwrap();
        assert_eq!(whole.to_string(), "99.00");
    }

    #[test]
    fn test_from_decimal_precision_loss() {
        use rust_decimal::Decimal;

        let d = Decimal::new(150253, 3); // 150.253
        assert_eq!(Price::from_decimal(d), Err(NumericError::PrecisionLoss));
    }

    #[test]
    fn test_different_decimal_places() {
        type FD4 = FixedDecimal<4>;

        assert_eq!(FD4::SCALE, 10_000);

        let x = FD4::from_parts(123, 4567).unwrap();
        assert_eq!(x.to_string(), "123.4567");
    }
}
