//! Strings, sequences and mappings.
//!
//! A string is its length header followed by the raw bytes. Sequences and
//! mappings are a count header followed by that many encoded elements or
//! (key, value) pairs, each encoded independently.

use crate::buffer::{Appendable, ByteViewer};
use crate::config::Config;
use crate::err::{Error, Mp2Result};
use crate::header::{decode_header, encode_header, Container, Header};
use crate::scalar;

/// Write a string: the length header, then the bytes unchanged.
pub fn write_str<W: Appendable>(bytes: &[u8], out: &mut W) {
    encode_header(Container::Str, bytes.len() as u64, out);
    out.append_bytes(bytes);
}

/// Read a string as a view into the input.
pub fn read_str<'a>(viewer: &mut ByteViewer<'a>) -> Mp2Result<&'a [u8]> {
    let len = match decode_header(viewer)? {
        Header::Str { len, .. } => len,
        other => {
            return Err(viewer.fail(Error::UnexpectedCategory {
                expected: "string",
                found: other.category(),
            }))
        }
    };

    viewer.ensure(len)?;
    viewer.next_bytes(len as usize)
}

/// Read a string that must be valid UTF-8.
pub fn read_utf8<'a>(viewer: &mut ByteViewer<'a>) -> Mp2Result<&'a str> {
    let bytes = read_str(viewer)?;
    std::str::from_utf8(bytes).map_err(|_| viewer.fail(Error::InvalidUtf8))
}

pub fn write_seq_header<W: Appendable>(count: u64, out: &mut W) {
    encode_header(Container::Seq, count, out);
}

pub fn write_map_header<W: Appendable>(count: u64, out: &mut W) {
    encode_header(Container::Map, count, out);
}

/// Read a sequence header and return the element count.
///
/// Every element takes at least one byte, so a count larger than the
/// remaining input fails here as truncated.
pub fn read_seq_header(viewer: &mut ByteViewer) -> Mp2Result<u64> {
    match decode_header(viewer)? {
        Header::Seq { count, .. } => {
            viewer.ensure(count)?;
            Ok(count)
        }
        other => Err(viewer.fail(Error::UnexpectedCategory {
            expected: "sequence",
            found: other.category(),
        })),
    }
}

/// Read a mapping header and return the entry count.
pub fn read_map_header(viewer: &mut ByteViewer) -> Mp2Result<u64> {
    match decode_header(viewer)? {
        Header::Map { count, .. } => {
            viewer.ensure(count.saturating_mul(2))?;
            Ok(count)
        }
        other => Err(viewer.fail(Error::UnexpectedCategory {
            expected: "mapping",
            found: other.category(),
        })),
    }
}

/// Write a sequence, encoding each element with `write_elem`.
pub fn write_seq<W, T, F>(items: &[T], mut write_elem: F, out: &mut W)
where
    W: Appendable,
    F: FnMut(&T, &mut W),
{
    write_seq_header(items.len() as u64, out);

    for item in items {
        write_elem(item, out);
    }
}

/// Read a sequence of a single element type.
///
/// The first element that fails aborts the whole read.
pub fn read_seq_with<'a, T, F>(viewer: &mut ByteViewer<'a>, mut read_elem: F) -> Mp2Result<Vec<T>>
where
    F: FnMut(&mut ByteViewer<'a>) -> Mp2Result<T>,
{
    let count = read_seq_header(viewer)?;

    (0..count).map(|_| read_elem(viewer)).collect()
}

/// Write a mapping from an iterator of pairs with a known length.
pub fn write_map<W, I, K, V, FK, FV>(
    entries: I,
    mut write_key: FK,
    mut write_value: FV,
    out: &mut W,
) where
    W: Appendable,
    I: IntoIterator<Item = (K, V)>,
    I::IntoIter: ExactSizeIterator,
    FK: FnMut(K, &mut W),
    FV: FnMut(V, &mut W),
{
    let entries = entries.into_iter();
    write_map_header(entries.len() as u64, out);

    for (key, value) in entries {
        write_key(key, out);
        write_value(value, out);
    }
}

/// Read a mapping into any keyed collection.
///
/// Later duplicates of a key overwrite earlier ones when the destination
/// is an associative container.
pub fn read_map_with<'a, M, K, V, FK, FV>(
    viewer: &mut ByteViewer<'a>,
    mut read_key: FK,
    mut read_value: FV,
) -> Mp2Result<M>
where
    M: Default + Extend<(K, V)>,
    FK: FnMut(&mut ByteViewer<'a>) -> Mp2Result<K>,
    FV: FnMut(&mut ByteViewer<'a>) -> Mp2Result<V>,
{
    let count = read_map_header(viewer)?;
    let mut map = M::default();

    for _ in 0..count {
        let key = read_key(viewer)?;
        let value = read_value(viewer)?;
        map.extend(std::iter::once((key, value)));
    }

    Ok(map)
}

/// Consume exactly one encoded value of any kind.
pub fn skip_value(viewer: &mut ByteViewer, config: &Config) -> Mp2Result<()> {
    skip_nested(viewer, config, 0)
}

pub(crate) fn skip_nested(viewer: &mut ByteViewer, config: &Config, depth: usize) -> Mp2Result<()> {
    match decode_header(viewer)? {
        Header::Uint { .. } | Header::Sint { .. } | Header::Bool(_) => Ok(()),
        Header::Real => {
            scalar::read_int::<i64>(viewer)?;
            scalar::read_int::<i64>(viewer)?;
            Ok(())
        }
        Header::Str { len, .. } => {
            viewer.ensure(len)?;
            viewer.next_bytes(len as usize)?;
            Ok(())
        }
        Header::Seq { count, .. } => {
            enter(viewer, config, depth, count)?;
            viewer.ensure(count)?;
            (0..count).try_for_each(|_| skip_nested(viewer, config, depth + 1))
        }
        Header::Map { count, .. } => {
            enter(viewer, config, depth, count)?;
            viewer.ensure(count.saturating_mul(2))?;
            (0..count.saturating_mul(2)).try_for_each(|_| skip_nested(viewer, config, depth + 1))
        }
    }
}

/// Fails if a container at `depth` would nest its `count` items too deep.
///
/// Empty containers hold nothing to nest and always pass.
pub(crate) fn enter(
    viewer: &mut ByteViewer,
    config: &Config,
    depth: usize,
    count: u64,
) -> Mp2Result<()> {
    match count == 0 || depth < config.max_depth {
        true => Ok(()),
        false => Err(viewer.fail(Error::DepthLimitExceeded)),
    }
}
