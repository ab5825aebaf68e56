//! Arbitrary-precision decimal values for the `decimal` logical type.
//!
//! A decimal is an unscaled big integer paired with a scale: the represented
//! number is `unscaled * 10^(-scale)`. On the wire the unscaled integer is
//! written as big-endian two's-complement bytes, raw inside a fixed type and
//! length-prefixed on bytes.

use num_bigint::{BigInt, Sign};
use num_traits::Zero;

/// An arbitrary-precision decimal number.
///
/// Equality is exact on both the unscaled value and the scale: `1.50` and
/// `1.5` are different `Decimal` values even though they are numerically
/// equal. This mirrors the encoder's strictness, which refuses to rescale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decimal {
    unscaled: BigInt,
    scale: u32,
}

impl Decimal {
    /// Create a decimal from an unscaled integer and a scale.
    pub fn new(unscaled: impl Into<BigInt>, scale: u32) -> Self {
        Self {
            unscaled: unscaled.into(),
            scale,
        }
    }

    /// Reconstruct a decimal from big-endian two's-complement bytes.
    ///
    /// An empty slice is zero.
    pub fn from_signed_bytes_be(bytes: &[u8], scale: u32) -> Self {
        Self {
            unscaled: BigInt::from_signed_bytes_be(bytes),
            scale,
        }
    }

    /// The minimal big-endian two's-complement representation of the
    /// unscaled value.
    pub fn to_signed_bytes_be(&self) -> Vec<u8> {
        self.unscaled.to_signed_bytes_be()
    }

    /// The unscaled integer.
    pub fn unscaled(&self) -> &BigInt {
        &self.unscaled
    }

    /// The scale (digits after the decimal point).
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// The number of decimal digits in the unscaled value.
    ///
    /// Zero has precision 1, matching the convention that the smallest
    /// representable decimal occupies one digit.
    pub fn precision(&self) -> u64 {
        if self.unscaled.is_zero() {
            return 1;
        }
        let (_, digits) = self.unscaled.to_radix_be(10);
        digits.len() as u64
    }

    /// True when the unscaled value is negative.
    pub fn is_negative(&self) -> bool {
        self.unscaled.sign() == Sign::Minus
    }
}

impl std::fmt::Display for Decimal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.unscaled);
        }
        let digits = self.unscaled.magnitude().to_string();
        let sign = if self.is_negative() { "-" } else { "" };
        let scale = self.scale as usize;
        if digits.len() > scale {
            let split = digits.len() - scale;
            write!(f, "{}{}.{}", sign, &digits[..split], &digits[split..])
        } else {
            write!(f, "{}0.{}{}", sign, "0".repeat(scale - digits.len()), digits)
        }
    }
}
