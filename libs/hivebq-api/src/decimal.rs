use std::fmt;

use num_bigint::{BigInt, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

/// Largest precision Hive accepts for `DECIMAL`.
pub const MAX_PRECISION: u8 = 38;

/// Hive fixed-point decimal: `unscaled × 10^-scale`, at most
/// [`MAX_PRECISION`] digits.
///
/// Equality is representational: `1.0` (10, scale 1) and `1.00`
/// (100, scale 2) are different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HiveDecimal {
    unscaled: i128,
    scale: u8,
}

impl HiveDecimal {
    pub fn new(unscaled: i128, scale: u8) -> Self {
        Self { unscaled, scale }
    }

    /// Narrows an arbitrary-precision `unscaled × 10^-scale` to Hive's
    /// 38 digits, the way `HiveDecimal.create` does: fraction digits that do
    /// not fit are rounded half away from zero. `None` when the integer part
    /// alone needs more than 38 digits.
    pub fn from_unscaled(unscaled: &BigInt, scale: u32) -> Option<Self> {
        let max = u32::from(MAX_PRECISION);
        let int_digits = unscaled_integer_digits(unscaled, scale);
        if int_digits > max {
            return None;
        }
        let mut target_scale = scale.min(max - int_digits);
        let mut value = round_half_up(unscaled, scale - target_scale);
        // Rounding can carry into a new integer digit (9.99 -> 10.0).
        if decimal_digits(&value) > max {
            if target_scale == 0 {
                return None;
            }
            value /= 10u32;
            target_scale -= 1;
        }
        let scale = u8::try_from(target_scale).ok()?;
        value.to_i128().map(|unscaled| Self::new(unscaled, scale))
    }

    pub fn unscaled(&self) -> i128 {
        self.unscaled
    }

    pub fn scale(&self) -> u8 {
        self.scale
    }

    /// Digits of the unscaled value (zero has one digit).
    fn digits(&self) -> u8 {
        match self.unscaled.unsigned_abs() {
            0 => 1,
            n => n.ilog10() as u8 + 1,
        }
    }

    /// Integer digits plus fraction digits, as Hive counts them: `0.001`
    /// has precision 3.
    pub fn precision(&self) -> u8 {
        self.digits().max(self.scale)
    }

    pub fn integer_digits(&self) -> u8 {
        if self.unscaled == 0 {
            0
        } else {
            self.digits().saturating_sub(self.scale)
        }
    }
}

/// Digits left of the decimal point of `unscaled × 10^-scale`; zero for
/// values below one.
pub fn unscaled_integer_digits(unscaled: &BigInt, scale: u32) -> u32 {
    if unscaled.is_zero() {
        0
    } else {
        decimal_digits(unscaled).saturating_sub(scale)
    }
}

/// Plain-notation rendering of `unscaled × 10^-scale` at any width.
pub fn format_unscaled(unscaled: &BigInt, scale: u32) -> String {
    let mut out = String::new();
    write_plain(
        &mut out,
        unscaled.is_negative(),
        &unscaled.magnitude().to_string(),
        scale as usize,
    )
    .map(|()| out)
    .unwrap_or_default()
}

fn decimal_digits(value: &BigInt) -> u32 {
    value.magnitude().to_string().len() as u32
}

/// Drops `digits` trailing decimal digits, rounding half away from zero.
fn round_half_up(value: &BigInt, digits: u32) -> BigInt {
    if digits == 0 {
        return value.clone();
    }
    let divisor = BigInt::from(10u32).pow(digits);
    let quotient = value / &divisor;
    let remainder = value % &divisor;
    if remainder.magnitude() * 2u32 >= *divisor.magnitude() {
        match value.sign() {
            Sign::Minus => quotient - 1u32,
            _ => quotient + 1u32,
        }
    } else {
        quotient
    }
}

fn write_plain(f: &mut impl fmt::Write, negative: bool, digits: &str, scale: usize) -> fmt::Result {
    if negative {
        f.write_str("-")?;
    }
    if scale == 0 {
        return f.write_str(digits);
    }
    if digits.len() > scale {
        let (int, frac) = digits.split_at(digits.len() - scale);
        write!(f, "{int}.{frac}")
    } else {
        write!(f, "0.{}{digits}", "0".repeat(scale - digits.len()))
    }
}

/// Plain notation with exactly `scale` fraction digits.
impl fmt::Display for HiveDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.unscaled.unsigned_abs().to_string();
        write_plain(f, self.unscaled < 0, &digits, usize::from(self.scale))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PI_DIGITS: i128 = 314_159_265_358_979_323_846_264_338_327;

    fn big(value: i128) -> BigInt {
        BigInt::from(value)
    }

    fn pow10(exp: u32) -> BigInt {
        BigInt::from(10u32).pow(exp)
    }

    #[test]
    fn keeps_exact_digits_within_38() {
        let pi = HiveDecimal::from_unscaled(&big(PI_DIGITS), 9).unwrap();
        assert_eq!(pi, HiveDecimal::new(PI_DIGITS, 9));
        assert_eq!(pi.to_string(), "314159265358979323846.264338327");

        let negative = HiveDecimal::from_unscaled(&big(-PI_DIGITS), 9).unwrap();
        assert_eq!(negative.to_string(), "-314159265358979323846.264338327");

        assert_eq!(HiveDecimal::from_unscaled(&big(0), 0).unwrap(), HiveDecimal::new(0, 0));
    }

    #[test]
    fn narrows_wide_fractions_to_38_digits() {
        // 1.5 at scale 38 has 39 digits; one fraction digit is dropped.
        let wide = big(15) * pow10(37);
        let narrowed = HiveDecimal::from_unscaled(&wide, 38).unwrap();
        assert_eq!(narrowed, HiveDecimal::new(15 * 10_i128.pow(36), 37));

        // 10^40 at scale 38 is 100, wider than 128 bits unscaled.
        let hundred = HiveDecimal::from_unscaled(&pow10(40), 38).unwrap();
        assert_eq!(hundred.integer_digits(), 3);
        assert_eq!(hundred.scale(), 35);
    }

    #[test]
    fn narrowing_rounds_half_up() {
        let up = HiveDecimal::from_unscaled(&big(12_350), 40).unwrap();
        assert_eq!(up, HiveDecimal::new(124, 38));
        let down = HiveDecimal::from_unscaled(&big(-12_350), 40).unwrap();
        assert_eq!(down, HiveDecimal::new(-124, 38));
        let kept = HiveDecimal::from_unscaled(&big(12_349), 40).unwrap();
        assert_eq!(kept, HiveDecimal::new(123, 38));

        // 0.<38 nines>5 carries into the units digit.
        let carry = pow10(39) - big(5);
        let rounded = HiveDecimal::from_unscaled(&carry, 39).unwrap();
        assert_eq!(rounded.to_string(), format!("1.{}", "0".repeat(37)));
    }

    #[test]
    fn integer_part_wider_than_38_digits_is_rejected() {
        assert!(HiveDecimal::from_unscaled(&pow10(38), 0).is_none());
        assert!(HiveDecimal::from_unscaled(&(pow10(38) - big(1)), 0).is_some());
        // 38 nines plus .5 carries into a 39th integer digit.
        let carry = (pow10(38) - big(1)) * big(10) + big(5);
        assert!(HiveDecimal::from_unscaled(&carry, 1).is_none());
    }

    #[test]
    fn integer_digits_at_any_width() {
        assert_eq!(unscaled_integer_digits(&big(PI_DIGITS), 9), 21);
        assert_eq!(unscaled_integer_digits(&big(1), 3), 0);
        assert_eq!(unscaled_integer_digits(&big(0), 0), 0);
        assert_eq!(unscaled_integer_digits(&pow10(40), 38), 3);
    }

    #[test]
    fn precision_and_integer_digits() {
        let pi = HiveDecimal::new(PI_DIGITS, 9);
        assert_eq!(pi.precision(), 30);
        assert_eq!(pi.integer_digits(), 21);

        let small = HiveDecimal::new(1, 3);
        assert_eq!(small.precision(), 3);
        assert_eq!(small.integer_digits(), 0);
    }

    #[test]
    fn display() {
        assert_eq!(HiveDecimal::new(42, 0).to_string(), "42");
        assert_eq!(HiveDecimal::new(-1_500, 3).to_string(), "-1.500");
        assert_eq!(HiveDecimal::new(5, 3).to_string(), "0.005");
        assert_eq!(HiveDecimal::new(-5, 3).to_string(), "-0.005");
        assert_eq!(format_unscaled(&(-pow10(40)), 38), "-100.00000000000000000000000000000000000000");
    }
}
