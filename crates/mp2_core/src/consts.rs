//! Tag layout shared between the writer and the reader.
//!
//! Every encoded value starts with a single tag byte. Small values and short
//! containers carry their magnitude inside the tag itself, everything else
//! is followed by an explicit big-endian field of 1, 2, 4 or 8 bytes.

/// Largest unsigned value stored inside the tag byte.
pub const UINT_INLINE_MAX: u8 = 0x7F;

/// Short strings: `0x80 + len`, `len < 64`.
pub const STR_SHORT: u8 = 0x80;
pub const STR_SHORT_LIMIT: u64 = 0x40;
pub const STR_SHORT_LAST: u8 = 0xBF;

/// Short sequences: `0xC0 + count`, `count < 32`.
pub const SEQ_SHORT: u8 = 0xC0;
pub const SEQ_SHORT_LIMIT: u64 = 0x20;
pub const SEQ_SHORT_LAST: u8 = 0xDF;

// 0xE0..=0xE8 is reserved.
pub const RESERVED_FIRST: u8 = 0xE0;
pub const RESERVED_LAST: u8 = 0xE8;

// long forms, `base + log2(width)`
pub const MAP_LONG: u8 = 0xE9;
pub const MAP_LONG_LAST: u8 = 0xEC;
pub const STR_LONG: u8 = 0xED;
pub const STR_LONG_LAST: u8 = 0xF0;
pub const SEQ_LONG: u8 = 0xF1;
pub const SEQ_LONG_LAST: u8 = 0xF4;

pub const BOOL_TRUE: u8 = 0xF5;
pub const BOOL_FALSE: u8 = 0xF6;

/// Followed by an integer exponent and an integer mantissa.
pub const REAL: u8 = 0xF7;

// explicit-width integers, `base + log2(width)`
pub const UINT: u8 = 0xF8;
pub const UINT_LAST: u8 = 0xFB;
pub const SINT: u8 = 0xFC;

/// Exponent markers for non-finite reals, always paired with a zero mantissa.
pub const REAL_POS_INFINITY_EXP: i64 = 1;
pub const REAL_NEG_INFINITY_EXP: i64 = -1;
pub const REAL_NAN_EXP: i64 = 2;

/// Bits of precision kept for real mantissas.
pub const REAL_MANTISSA_BITS: i32 = 62;
