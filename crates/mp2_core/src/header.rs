//! Tag byte classification and minimal-width header selection.

use std::fmt::Display;

use crate::buffer::{Appendable, ByteViewer};
use crate::consts::*;
use crate::err::{Error, Mp2Result};

/// Byte width of an explicit size or integer field.
///
/// [Width::Inline] means the magnitude lives inside the tag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    Inline,
    One,
    Two,
    Four,
    Eight,
}

impl Width {
    /// The smallest explicit width able to hold `magnitude`.
    pub fn for_magnitude(magnitude: u64) -> Self {
        if magnitude as u8 as u64 == magnitude {
            Self::One
        } else if magnitude as u16 as u64 == magnitude {
            Self::Two
        } else if magnitude as u32 as u64 == magnitude {
            Self::Four
        } else {
            Self::Eight
        }
    }

    /// Number of bytes following the tag.
    pub fn bytes(self) -> usize {
        match self {
            Self::Inline => 0,
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
            Self::Eight => 8,
        }
    }

    /// Offset of this width from the base of a tag group.
    fn tag_offset(self) -> u8 {
        match self {
            Self::Inline | Self::One => 0,
            Self::Two => 1,
            Self::Four => 2,
            Self::Eight => 3,
        }
    }

    fn from_tag_offset(offset: u8) -> Self {
        match offset {
            0 => Self::One,
            1 => Self::Two,
            2 => Self::Four,
            _ => Self::Eight,
        }
    }

    /// Append `value` using exactly this many bytes.
    pub(crate) fn write<W: Appendable>(self, value: u64, out: &mut W) {
        match self {
            Self::Inline => (),
            Self::One => out.append_be(value as u8),
            Self::Two => out.append_be(value as u16),
            Self::Four => out.append_be(value as u32),
            Self::Eight => out.append_be(value),
        }
    }
}

/// The kind of value a header introduces, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Uint,
    Sint,
    Bool,
    Real,
    Str,
    Seq,
    Map,
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uint => "unsigned integer",
            Self::Sint => "negative integer",
            Self::Bool => "boolean",
            Self::Real => "real",
            Self::Str => "string",
            Self::Seq => "sequence",
            Self::Map => "mapping",
        };

        write!(f, "{}", name)
    }
}

/// A decoded header, describing the value that follows.
///
/// Booleans and integers are complete once the header is read. Strings,
/// sequences and mappings carry their length, the payload is left to the
/// caller. A [Header::Real] is followed by its exponent and mantissa.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    Uint { value: u64, width: Width },
    /// Negative integer, the value is `-magnitude`.
    Sint { magnitude: u64, width: Width },
    Bool(bool),
    Real,
    Str { len: u64, width: Width },
    Seq { count: u64, width: Width },
    Map { count: u64, width: Width },
}

impl Header {
    pub fn category(&self) -> Category {
        match self {
            Self::Uint { .. } => Category::Uint,
            Self::Sint { .. } => Category::Sint,
            Self::Bool(_) => Category::Bool,
            Self::Real => Category::Real,
            Self::Str { .. } => Category::Str,
            Self::Seq { .. } => Category::Seq,
            Self::Map { .. } => Category::Map,
        }
    }
}

/// Length-prefixed value kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    Str,
    Seq,
    Map,
}

impl Container {
    /// Short-form base tag and exclusive magnitude limit, if the kind has one.
    fn short_form(self) -> Option<(u8, u64)> {
        match self {
            Self::Str => Some((STR_SHORT, STR_SHORT_LIMIT)),
            Self::Seq => Some((SEQ_SHORT, SEQ_SHORT_LIMIT)),
            Self::Map => None,
        }
    }

    fn long_base(self) -> u8 {
        match self {
            Self::Str => STR_LONG,
            Self::Seq => SEQ_LONG,
            Self::Map => MAP_LONG,
        }
    }
}

/// Read the next header, consuming the tag and any explicit size or
/// integer bytes that follow it.
pub fn decode_header(viewer: &mut ByteViewer) -> Mp2Result<Header> {
    let tag = viewer.next_byte()?;

    let header = match tag {
        0..=UINT_INLINE_MAX => Header::Uint {
            value: tag as u64,
            width: Width::Inline,
        },
        STR_SHORT..=STR_SHORT_LAST => Header::Str {
            len: (tag - STR_SHORT) as u64,
            width: Width::Inline,
        },
        SEQ_SHORT..=SEQ_SHORT_LAST => Header::Seq {
            count: (tag - SEQ_SHORT) as u64,
            width: Width::Inline,
        },
        RESERVED_FIRST..=RESERVED_LAST => return Err(viewer.fail(Error::MalformedTag(tag))),
        MAP_LONG..=MAP_LONG_LAST => {
            let (count, width) = read_sized(viewer, tag - MAP_LONG)?;
            Header::Map { count, width }
        }
        STR_LONG..=STR_LONG_LAST => {
            let (len, width) = read_sized(viewer, tag - STR_LONG)?;
            Header::Str { len, width }
        }
        SEQ_LONG..=SEQ_LONG_LAST => {
            let (count, width) = read_sized(viewer, tag - SEQ_LONG)?;
            Header::Seq { count, width }
        }
        BOOL_TRUE => Header::Bool(true),
        BOOL_FALSE => Header::Bool(false),
        REAL => Header::Real,
        UINT..=UINT_LAST => {
            let (value, width) = read_sized(viewer, tag - UINT)?;
            Header::Uint { value, width }
        }
        SINT..=u8::MAX => {
            let (magnitude, width) = read_sized(viewer, tag - SINT)?;
            Header::Sint { magnitude, width }
        }
    };

    Ok(header)
}

fn read_sized(viewer: &mut ByteViewer, tag_offset: u8) -> Mp2Result<(u64, Width)> {
    let width = Width::from_tag_offset(tag_offset);
    let value = viewer.read_be_partial(width.bytes())?;

    Ok((value, width))
}

/// Classify the next tag without consuming it.
///
/// Returns `None` at the end of input, on a reserved tag or on a failed viewer.
pub fn peek_category(viewer: &ByteViewer) -> Option<Category> {
    let category = match viewer.peek()? {
        0..=UINT_INLINE_MAX | UINT..=UINT_LAST => Category::Uint,
        STR_SHORT..=STR_SHORT_LAST | STR_LONG..=STR_LONG_LAST => Category::Str,
        SEQ_SHORT..=SEQ_SHORT_LAST | SEQ_LONG..=SEQ_LONG_LAST => Category::Seq,
        RESERVED_FIRST..=RESERVED_LAST => return None,
        MAP_LONG..=MAP_LONG_LAST => Category::Map,
        BOOL_TRUE | BOOL_FALSE => Category::Bool,
        REAL => Category::Real,
        SINT..=u8::MAX => Category::Sint,
    };

    Some(category)
}

/// Write the length header of a string, sequence or mapping.
///
/// Strings shorter than 64 bytes and sequences shorter than 32 elements use
/// the single-byte short form. Everything else, mappings always, uses the
/// long form with the smallest width that holds `magnitude`.
pub fn encode_header<W: Appendable>(container: Container, magnitude: u64, out: &mut W) {
    if let Some((base, limit)) = container.short_form() {
        if magnitude < limit {
            out.push(base + magnitude as u8);
            return;
        }
    }

    let width = Width::for_magnitude(magnitude);
    out.push(container.long_base() + width.tag_offset());
    width.write(magnitude, out);
}

/// Write an explicit-width integer tag and payload.
pub(crate) fn encode_sized<W: Appendable>(base: u8, magnitude: u64, out: &mut W) {
    let width = Width::for_magnitude(magnitude);
    out.push(base + width.tag_offset());
    width.write(magnitude, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Mp2Result<Header> {
        decode_header(&mut ByteViewer::from_slice(bytes))
    }

    fn encode(container: Container, magnitude: u64) -> Vec<u8> {
        let mut out: Vec<u8> = vec![];
        encode_header(container, magnitude, &mut out);
        out
    }

    #[test]
    fn test_decode_inline_regions() {
        assert_eq!(
            decode(&[0x00]),
            Ok(Header::Uint {
                value: 0,
                width: Width::Inline
            })
        );
        assert_eq!(
            decode(&[0x7F]),
            Ok(Header::Uint {
                value: 127,
                width: Width::Inline
            })
        );
        assert_eq!(
            decode(&[0x80]),
            Ok(Header::Str {
                len: 0,
                width: Width::Inline
            })
        );
        assert_eq!(
            decode(&[0xBF]),
            Ok(Header::Str {
                len: 63,
                width: Width::Inline
            })
        );
        assert_eq!(
            decode(&[0xDF]),
            Ok(Header::Seq {
                count: 31,
                width: Width::Inline
            })
        );
        assert_eq!(decode(&[0xF5]), Ok(Header::Bool(true)));
        assert_eq!(decode(&[0xF6]), Ok(Header::Bool(false)));
        assert_eq!(decode(&[0xF7]), Ok(Header::Real));
    }

    #[test]
    fn test_decode_short_forms_leave_payload() {
        let bytes = [0x82, b'h', b'i'];
        let mut viewer = ByteViewer::from_slice(&bytes);

        assert_eq!(
            decode_header(&mut viewer),
            Ok(Header::Str {
                len: 2,
                width: Width::Inline
            })
        );
        assert_eq!(viewer.offset(), 1);
    }

    #[test]
    fn test_decode_explicit_widths() {
        assert_eq!(
            decode(&[0xE9, 0x01]),
            Ok(Header::Map {
                count: 1,
                width: Width::One
            })
        );
        assert_eq!(
            decode(&[0xEE, 0x01, 0x00]),
            Ok(Header::Str {
                len: 256,
                width: Width::Two
            })
        );
        assert_eq!(
            decode(&[0xF3, 0x00, 0x01, 0x00, 0x00]),
            Ok(Header::Seq {
                count: 65536,
                width: Width::Four
            })
        );
        assert_eq!(
            decode(&[0xF9, 0x03, 0xE8]),
            Ok(Header::Uint {
                value: 1000,
                width: Width::Two
            })
        );
        assert_eq!(
            decode(&[0xFF, 0x80, 0, 0, 0, 0, 0, 0, 0]),
            Ok(Header::Sint {
                magnitude: 1 << 63,
                width: Width::Eight
            })
        );
    }

    /// Wider-than-necessary fields are still well formed.
    #[test]
    fn test_decode_accepts_non_minimal_widths() {
        assert_eq!(
            decode(&[0xF0, 0, 0, 0, 0, 0, 0, 0, 2]),
            Ok(Header::Str {
                len: 2,
                width: Width::Eight
            })
        );
        assert_eq!(
            decode(&[0xF8, 0x05]),
            Ok(Header::Uint {
                value: 5,
                width: Width::One
            })
        );
    }

    #[test]
    fn test_decode_reserved_tags_fail() {
        for tag in RESERVED_FIRST..=RESERVED_LAST {
            let bytes = [tag, 0, 0];
            let mut viewer = ByteViewer::from_slice(&bytes);

            assert_eq!(decode_header(&mut viewer), Err(Error::MalformedTag(tag)));
            assert!(viewer.is_failed());
        }
    }

    #[test]
    fn test_decode_truncated_fails() {
        assert_eq!(decode(&[]), Err(Error::Truncated));
        assert_eq!(decode(&[0xEA, 0x01]), Err(Error::Truncated));
        assert_eq!(decode(&[0xFB, 1, 2, 3, 4, 5, 6, 7]), Err(Error::Truncated));
        assert_eq!(decode(&[0xFC]), Err(Error::Truncated));
    }

    #[test]
    fn test_encode_string_boundary() {
        assert_eq!(encode(Container::Str, 63), [0xBF]);
        assert_eq!(encode(Container::Str, 64), [0xED, 64]);
        assert_eq!(encode(Container::Str, 300), [0xEE, 0x01, 0x2C]);
    }

    #[test]
    fn test_encode_sequence_boundary() {
        assert_eq!(encode(Container::Seq, 0), [0xC0]);
        assert_eq!(encode(Container::Seq, 31), [0xDF]);
        assert_eq!(encode(Container::Seq, 32), [0xF1, 32]);
        assert_eq!(
            encode(Container::Seq, 1 << 32),
            [0xF4, 0, 0, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_encode_map_is_always_long() {
        assert_eq!(encode(Container::Map, 0), [0xE9, 0]);
        assert_eq!(encode(Container::Map, 1), [0xE9, 1]);
        assert_eq!(encode(Container::Map, 255), [0xE9, 255]);
        assert_eq!(encode(Container::Map, 256), [0xEA, 1, 0]);
        assert_eq!(
            encode(Container::Map, u32::MAX as u64),
            [0xEB, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_width_for_magnitude() {
        assert_eq!(Width::for_magnitude(0), Width::One);
        assert_eq!(Width::for_magnitude(255), Width::One);
        assert_eq!(Width::for_magnitude(256), Width::Two);
        assert_eq!(Width::for_magnitude(65535), Width::Two);
        assert_eq!(Width::for_magnitude(65536), Width::Four);
        assert_eq!(Width::for_magnitude(u32::MAX as u64), Width::Four);
        assert_eq!(Width::for_magnitude(1 << 32), Width::Eight);
    }

    #[test]
    fn test_peek_category() {
        let bytes = [0xED, 0x40];
        let viewer = ByteViewer::from_slice(&bytes);
        assert_eq!(peek_category(&viewer), Some(Category::Str));
        assert_eq!(viewer.offset(), 0);

        assert_eq!(peek_category(&ByteViewer::from_slice(&[0xE4])), None);
        assert_eq!(
            peek_category(&ByteViewer::from_slice(&[0xFD])),
            Some(Category::Sint)
        );
        assert_eq!(peek_category(&ByteViewer::from_slice(&[])), None);
    }

    #[test]
    fn test_header_round_trip() {
        for (container, magnitude) in [
            (Container::Str, 0),
            (Container::Str, 70_000),
            (Container::Seq, 12),
            (Container::Seq, u64::MAX),
            (Container::Map, 3),
        ] {
            let bytes = encode(container, magnitude);
            let header = decode(&bytes).unwrap();

            let decoded = match header {
                Header::Str { len, .. } => (Container::Str, len),
                Header::Seq { count, .. } => (Container::Seq, count),
                Header::Map { count, .. } => (Container::Map, count),
                other => panic!("unexpected header {:?}", other),
            };

            assert_eq!(decoded, (container, magnitude));
        }
    }
}
