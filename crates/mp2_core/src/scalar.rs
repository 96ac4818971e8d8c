//! Integers, booleans and reals.
//!
//! Integers are written with the smallest tag that represents them exactly.
//! The sign lives in the tag: non-negative values use the inline or the
//! unsigned tags, negative values store their magnitude under a signed tag.
//!
//! Reals are not stored as IEEE-754 bits but as an integer pair
//! `(exponent, mantissa)` with `value = mantissa * 2^exponent`. The mantissa
//! is kept odd, so powers of two and short binary fractions shrink down to a
//! few bytes.

use crate::buffer::{Appendable, ByteViewer};
use crate::consts::*;
use crate::err::{Error, Mp2Result};
use crate::header::{decode_header, encode_sized, Header};

/// Write an unsigned integer.
pub fn write_uint<W: Appendable>(value: u64, out: &mut W) {
    match value <= UINT_INLINE_MAX as u64 {
        true => out.push(value as u8),
        false => encode_sized(UINT, value, out),
    }
}

/// Write a signed integer.
///
/// Non-negative values are encoded exactly like [write_uint].
pub fn write_int<W: Appendable>(value: i64, out: &mut W) {
    match value < 0 {
        true => encode_sized(SINT, value.unsigned_abs(), out),
        false => write_uint(value as u64, out),
    }
}

/// Read an integer into any destination that converts from `i128`.
///
/// Fails with [Error::Overflow] if `T` cannot hold the decoded value.
pub fn read_int<T: TryFrom<i128>>(viewer: &mut ByteViewer) -> Mp2Result<T> {
    let value = match decode_header(viewer)? {
        Header::Uint { value, .. } => value as i128,
        Header::Sint { magnitude, .. } => -(magnitude as i128),
        other => {
            return Err(viewer.fail(Error::UnexpectedCategory {
                expected: "integer",
                found: other.category(),
            }))
        }
    };

    T::try_from(value).map_err(|_| viewer.fail(Error::Overflow))
}

pub fn write_bool<W: Appendable>(value: bool, out: &mut W) {
    match value {
        true => out.push(BOOL_TRUE),
        false => out.push(BOOL_FALSE),
    }
}

pub fn read_bool(viewer: &mut ByteViewer) -> Mp2Result<bool> {
    match decode_header(viewer)? {
        Header::Bool(value) => Ok(value),
        other => Err(viewer.fail(Error::UnexpectedCategory {
            expected: "boolean",
            found: other.category(),
        })),
    }
}

/// Split a real into its `(exponent, mantissa)` wire components.
///
/// The mantissa of an `f64` fits the 62-bit domain, so the decomposition
/// is exact. Zero of either sign becomes `(0, 0)`; infinities and NaN use
/// zero-mantissa markers no finite value produces.
pub fn real_components(value: f64) -> (i64, i64) {
    if value.is_nan() {
        return (REAL_NAN_EXP, 0);
    }
    if value.is_infinite() {
        return match value.is_sign_positive() {
            true => (REAL_POS_INFINITY_EXP, 0),
            false => (REAL_NEG_INFINITY_EXP, 0),
        };
    }
    if value == 0.0 {
        return (0, 0);
    }

    let bits = value.to_bits();
    let biased_exp = ((bits >> 52) & 0x7FF) as i64;
    let fraction = bits & ((1 << 52) - 1);

    // value = mantissa * 2^exponent
    let (mut mantissa, mut exponent) = match biased_exp {
        0 => (fraction, -1074),
        _ => (fraction | (1 << 52), biased_exp - 1075),
    };
    debug_assert!(mantissa < 1 << REAL_MANTISSA_BITS);

    let trailing = mantissa.trailing_zeros();
    mantissa >>= trailing;
    exponent += trailing as i64;

    let mantissa = mantissa as i64;
    match value.is_sign_negative() {
        true => (exponent, -mantissa),
        false => (exponent, mantissa),
    }
}

/// Rebuild a real from its wire components.
pub fn real_from_components(exponent: i64, mantissa: i64) -> f64 {
    if mantissa == 0 {
        return match exponent {
            REAL_POS_INFINITY_EXP => f64::INFINITY,
            REAL_NEG_INFINITY_EXP => f64::NEG_INFINITY,
            REAL_NAN_EXP => f64::NAN,
            _ => 0.0,
        };
    }

    ldexp(mantissa as f64, exponent)
}

/// `x * 2^exp` without overflowing the intermediate power of two.
fn ldexp(mut x: f64, exp: i64) -> f64 {
    // beyond this every finite mantissa saturates to zero or infinity
    let mut exp = exp.clamp(-2200, 2200) as i32;

    while exp > 1000 {
        x *= 2_f64.powi(1000);
        exp -= 1000;
    }
    while exp < -1000 {
        x *= 2_f64.powi(-1000);
        exp += 1000;
    }

    x * 2_f64.powi(exp)
}

/// Write a real: the tag, then the exponent and the mantissa as integers.
pub fn write_real<W: Appendable>(value: f64, out: &mut W) {
    let (exponent, mantissa) = real_components(value);

    out.push(REAL);
    write_int(exponent, out);
    write_int(mantissa, out);
}

pub fn read_real(viewer: &mut ByteViewer) -> Mp2Result<f64> {
    match decode_header(viewer)? {
        Header::Real => (),
        other => {
            return Err(viewer.fail(Error::UnexpectedCategory {
                expected: "real",
                found: other.category(),
            }))
        }
    }

    let exponent = read_int::<i64>(viewer)?;
    let mantissa = read_int::<i64>(viewer)?;

    Ok(real_from_components(exponent, mantissa))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use super::*;

    fn uint_bytes(value: u64) -> Vec<u8> {
        let mut out: Vec<u8> = vec![];
        write_uint(value, &mut out);
        out
    }

    fn int_bytes(value: i64) -> Vec<u8> {
        let mut out: Vec<u8> = vec![];
        write_int(value, &mut out);
        out
    }

    fn real_bytes(value: f64) -> Vec<u8> {
        let mut out: Vec<u8> = vec![];
        write_real(value, &mut out);
        out
    }

    fn read_back<T: TryFrom<i128>>(bytes: &[u8]) -> Mp2Result<T> {
        let mut viewer = ByteViewer::from_slice(bytes);
        let value = read_int(&mut viewer)?;
        assert!(viewer.is_end());
        Ok(value)
    }

    #[test]
    fn test_minimal_unsigned_encoding() {
        assert_eq!(uint_bytes(0), [0x00]);
        assert_eq!(uint_bytes(127), [0x7F]);
        assert_eq!(uint_bytes(128), [0xF8, 0x80]);
        assert_eq!(uint_bytes(255), [0xF8, 0xFF]);
        assert_eq!(uint_bytes(256), [0xF9, 0x01, 0x00]);
        assert_eq!(uint_bytes(1000), [0xF9, 0x03, 0xE8]);
        assert_eq!(uint_bytes(65535), [0xF9, 0xFF, 0xFF]);
        assert_eq!(uint_bytes(65536), [0xFA, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(uint_bytes(u32::MAX as u64), [0xFA, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(uint_bytes(1 << 32), [0xFB, 0, 0, 0, 1, 0, 0, 0, 0]);
        assert_eq!(uint_bytes(u64::MAX), [0xFB, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_minimal_signed_encoding() {
        assert_eq!(int_bytes(5), [0x05]);
        assert_eq!(int_bytes(200), [0xF8, 200]);
        assert_eq!(int_bytes(-1), [0xFC, 0x01]);
        assert_eq!(int_bytes(-255), [0xFC, 0xFF]);
        assert_eq!(int_bytes(-256), [0xFD, 0x01, 0x00]);
        assert_eq!(int_bytes(-65536), [0xFE, 0x00, 0x01, 0x00, 0x00]);
        assert_eq!(int_bytes(i64::MIN), [0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_integer_round_trip() {
        let values = [
            0,
            1,
            127,
            128,
            -1,
            -128,
            -129,
            i8::MIN as i64,
            i16::MAX as i64,
            i32::MIN as i64,
            i64::MAX,
            i64::MIN,
        ];

        for value in values {
            assert_eq!(read_back::<i64>(&int_bytes(value)), Ok(value));
        }

        assert_eq!(read_back::<u64>(&uint_bytes(u64::MAX)), Ok(u64::MAX));
    }

    #[test]
    fn test_random_integer_round_trip() {
        let mut rng = StdRng::seed_from_u64(0x6d70_32);

        for _ in 0..2000 {
            // spread values over every width
            let shift = rng.gen_range(0..64);
            let value = rng.gen::<i64>() >> shift;

            let bytes = int_bytes(value);
            assert_eq!(read_back::<i64>(&bytes), Ok(value));

            // re-encoding is byte identical
            assert_eq!(int_bytes(read_back::<i64>(&bytes).unwrap()), bytes);
        }
    }

    #[test]
    fn test_narrow_destination_overflow() {
        assert_eq!(read_back::<u8>(&uint_bytes(255)), Ok(255));
        assert_eq!(read_back::<u8>(&uint_bytes(256)), Err(Error::Overflow));
        assert_eq!(read_back::<i8>(&uint_bytes(200)), Err(Error::Overflow));
        assert_eq!(read_back::<i8>(&int_bytes(-128)), Ok(-128));
        assert_eq!(read_back::<i8>(&int_bytes(-129)), Err(Error::Overflow));
        assert_eq!(read_back::<u32>(&int_bytes(-1)), Err(Error::Overflow));
        assert_eq!(read_back::<i64>(&uint_bytes(u64::MAX)), Err(Error::Overflow));

        // magnitude beyond i64::MIN
        let bytes = [0xFF, 0x80, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(read_back::<i64>(&bytes), Err(Error::Overflow));
    }

    #[test]
    fn test_signed_zero_magnitude() {
        assert_eq!(read_back::<i32>(&[0xFC, 0x00]), Ok(0));
        assert_eq!(read_back::<u8>(&[0xFF, 0, 0, 0, 0, 0, 0, 0, 0]), Ok(0));
    }

    #[test]
    fn test_read_int_wrong_category() {
        let mut viewer = ByteViewer::from_slice(&[0xF5]);

        assert!(matches!(
            read_int::<u8>(&mut viewer),
            Err(Error::UnexpectedCategory { .. })
        ));
        assert!(viewer.is_failed());
    }

    #[test]
    fn test_bool() {
        let mut out: Vec<u8> = vec![];
        write_bool(true, &mut out);
        write_bool(false, &mut out);
        assert_eq!(out, [0xF5, 0xF6]);

        let mut viewer = ByteViewer::from_slice(&out);
        assert_eq!(read_bool(&mut viewer), Ok(true));
        assert_eq!(read_bool(&mut viewer), Ok(false));
        assert_eq!(read_bool(&mut viewer), Err(Error::Truncated));

        let mut viewer = ByteViewer::from_slice(&[0x01]);
        assert!(read_bool(&mut viewer).is_err());
    }

    #[test]
    fn test_real_components() {
        assert_eq!(real_components(1.0), (0, 1));
        assert_eq!(real_components(3.0), (0, 3));
        assert_eq!(real_components(0.5), (-1, 1));
        assert_eq!(real_components(-2.5), (-1, -5));
        assert_eq!(real_components(1024.0), (10, 1));
        assert_eq!(real_components(0.0), (0, 0));
        assert_eq!(real_components(-0.0), (0, 0));
        assert_eq!(real_components(5e-324), (-1074, 1));
        assert_eq!(real_components(f64::MAX), (971, (1 << 53) - 1));
    }

    #[test]
    fn test_real_encoding_is_compact() {
        assert_eq!(real_bytes(1.0), [0xF7, 0x00, 0x01]);
        assert_eq!(real_bytes(0.5), [0xF7, 0xFC, 0x01, 0x01]);
        assert_eq!(real_bytes(-2.5), [0xF7, 0xFC, 0x01, 0xFC, 0x05]);
        assert_eq!(real_bytes(0.0), [0xF7, 0x00, 0x00]);
    }

    #[test]
    fn test_real_round_trip() {
        let values = [
            0.0,
            1.0,
            -1.0,
            0.1,
            std::f64::consts::PI,
            -1e300,
            1e-300,
            5e-324,
            f64::MIN_POSITIVE,
            f64::MAX,
            f64::MIN,
            0.1_f32 as f64,
        ];

        for value in values {
            let bytes = real_bytes(value);
            let mut viewer = ByteViewer::from_slice(&bytes);
            assert_eq!(read_real(&mut viewer), Ok(value));
            assert!(viewer.is_end());
        }

        let mut rng = StdRng::seed_from_u64(62);
        for _ in 0..2000 {
            let value = f64::from_bits(rng.gen::<u64>());
            if !value.is_finite() {
                continue;
            }

            let bytes = real_bytes(value);
            let mut viewer = ByteViewer::from_slice(&bytes);
            assert_eq!(read_real(&mut viewer), Ok(value));
        }
    }

    #[test]
    fn test_real_non_finite() {
        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            let bytes = real_bytes(value);
            assert_eq!(read_real(&mut ByteViewer::from_slice(&bytes)), Ok(value));
        }

        let bytes = real_bytes(f64::NAN);
        assert!(read_real(&mut ByteViewer::from_slice(&bytes))
            .unwrap()
            .is_nan());
    }

    #[test]
    fn test_real_foreign_components() {
        // zero mantissa with an unassigned exponent
        assert_eq!(real_from_components(17, 0), 0.0);
        // extreme exponents saturate instead of panicking
        assert_eq!(real_from_components(i64::MAX, 1), f64::INFINITY);
        assert_eq!(real_from_components(i64::MIN, 1), 0.0);
        assert_eq!(real_from_components(-3, 12), 1.5);
    }

    #[test]
    fn test_real_truncated() {
        let bytes = real_bytes(-2.5);

        for end in 0..bytes.len() {
            let mut viewer = ByteViewer::from_slice(&bytes[..end]);
            assert!(read_real(&mut viewer).is_err());
        }
    }
}
