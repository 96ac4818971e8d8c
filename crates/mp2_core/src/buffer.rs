//! Output buffers and the bounds-checked input cursor.

use crate::endian::{self, BigEndian};
use crate::err::{Error, Mp2Result};

/// A growable output buffer the encoder appends into.
///
/// The codec never allocates or shrinks the buffer itself, it only
/// appends bytes or asks for a window of freshly reserved bytes.
pub trait Appendable {
    /// Append a run of bytes.
    fn append_bytes(&mut self, bytes: &[u8]);

    /// Reserve `n` bytes at the end of the buffer and return them as a
    /// mutable window.
    fn reserve_window(&mut self, n: usize) -> &mut [u8];

    /// Append a single byte.
    fn push(&mut self, byte: u8) {
        self.append_bytes(&[byte]);
    }

    /// Append a fixed-width integer in big-endian order.
    fn append_be<T: BigEndian>(&mut self, value: T)
    where
        Self: Sized,
    {
        value.write_be(self.reserve_window(T::WIDTH));
    }
}

impl Appendable for Vec<u8> {
    fn append_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }

    fn reserve_window(&mut self, n: usize) -> &mut [u8] {
        let start = self.len();
        self.resize(start + n, 0);
        &mut self[start..]
    }

    fn push(&mut self, byte: u8) {
        Vec::push(self, byte);
    }
}

impl<A: Appendable + ?Sized> Appendable for &mut A {
    fn append_bytes(&mut self, bytes: &[u8]) {
        (**self).append_bytes(bytes);
    }

    fn reserve_window(&mut self, n: usize) -> &mut [u8] {
        (**self).reserve_window(n)
    }

    fn push(&mut self, byte: u8) {
        (**self).push(byte);
    }
}

/// A reference into an existing slice of bytes.
///
/// The viewer only moves forward. Every read is checked against the end
/// bound; the first failed read poisons the viewer and every later
/// operation returns that same error without touching the slice.
#[derive(Debug, Clone)]
pub struct ByteViewer<'arr> {
    slice: &'arr [u8],
    offset: usize,
    end: usize,
    failure: Option<Error>,
}

impl<'arr> ByteViewer<'arr> {
    /// Create a new viewer over the whole slice.
    pub fn from_slice(s: &'arr [u8]) -> Self {
        Self {
            slice: s,
            offset: 0,
            end: s.len(),
            failure: None,
        }
    }

    /// Create a viewer over `s[offset..end]`.
    ///
    /// Bounds outside the slice are clamped to it.
    pub fn with_bounds(s: &'arr [u8], offset: usize, end: usize) -> Self {
        let end = end.min(s.len());

        Self {
            slice: s,
            offset: offset.min(end),
            end,
            failure: None,
        }
    }

    /// Current read position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left before the end bound.
    pub fn remaining(&self) -> usize {
        self.end - self.offset
    }

    pub fn is_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns `true` once any read on this viewer has failed.
    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }

    /// The error that put the viewer into its failed state.
    pub fn failure(&self) -> Option<&Error> {
        self.failure.as_ref()
    }

    /// Put the viewer into its failed state.
    ///
    /// Only the first failure is kept, it is also the error returned.
    pub fn fail(&mut self, err: Error) -> Error {
        if self.failure.is_none() {
            log::trace!("decode failed at offset {}: {}", self.offset, err);
        }

        self.failure.get_or_insert(err).clone()
    }

    /// Returns the stored failure, if any.
    pub fn check(&self) -> Mp2Result<()> {
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Peek at the next byte in the slice
    pub fn peek(&self) -> Option<u8> {
        match self.failure.is_some() || self.is_end() {
            true => None,
            false => Some(self.slice[self.offset]),
        }
    }

    /// Fails unless at least `n` more bytes are available.
    pub fn ensure(&mut self, n: u64) -> Mp2Result<()> {
        self.check()?;

        match n <= self.remaining() as u64 {
            true => Ok(()),
            false => Err(self.fail(Error::Truncated)),
        }
    }

    /// Return the next byte and advance the view
    pub fn next_byte(&mut self) -> Mp2Result<u8> {
        self.ensure(1)?;

        let b = self.slice[self.offset];
        self.offset += 1;

        Ok(b)
    }

    /// Returns the next `size` bytes and advances the view.
    ///
    /// The returned slice borrows the underlying input, not the viewer.
    pub fn next_bytes(&mut self, size: usize) -> Mp2Result<&'arr [u8]> {
        self.ensure(size as u64)?;

        let view = &self.slice[self.offset..self.offset + size];
        self.offset += size;

        Ok(view)
    }

    /// Returns a copy of the next bytes as a fixed-size array.
    pub fn next_bytes_fixed<const ARR_SIZE: usize>(&mut self) -> Mp2Result<[u8; ARR_SIZE]> {
        let view = self.next_bytes(ARR_SIZE)?;

        let mut arr = [0_u8; ARR_SIZE];
        arr.copy_from_slice(view);

        Ok(arr)
    }

    /// Read a fixed-width big-endian integer.
    pub fn read_be<T: BigEndian>(&mut self) -> Mp2Result<T> {
        let view = self.next_bytes(T::WIDTH)?;
        Ok(T::read_be(view))
    }

    /// Read `n` (`1..=8`) bytes as a big-endian unsigned integer.
    pub fn read_be_partial(&mut self, n: usize) -> Mp2Result<u64> {
        let view = self.next_bytes(n)?;
        Ok(endian::read_be_partial(n, view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserve_window() {
        let mut buf: Vec<u8> = vec![0xAA];
        buf.reserve_window(2).copy_from_slice(&[1, 2]);
        buf.append_be(0x0304_u16);
        Appendable::push(&mut buf, 5);

        assert_eq!(buf, [0xAA, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_viewer_reads() {
        let bytes = [1, 2, 3, 4, 5, 6];
        let mut viewer = ByteViewer::from_slice(&bytes);

        assert_eq!(viewer.peek(), Some(1));
        assert_eq!(viewer.next_byte(), Ok(1));
        assert_eq!(viewer.next_bytes(2), Ok(&bytes[1..3]));
        assert_eq!(viewer.next_bytes_fixed::<2>(), Ok([4, 5]));
        assert_eq!(viewer.remaining(), 1);
        assert_eq!(viewer.offset(), 5);
    }

    #[test]
    fn test_viewer_respects_end_bound() {
        let bytes = [0x00, 0x01, 0x02, 0x03];
        let mut viewer = ByteViewer::with_bounds(&bytes, 1, 3);

        assert_eq!(viewer.read_be::<u16>(), Ok(0x0102));
        assert!(viewer.is_end());
        assert_eq!(viewer.next_byte(), Err(Error::Truncated));
    }

    #[test]
    fn test_viewer_failure_is_sticky() {
        let bytes = [0x10, 0x20];
        let mut viewer = ByteViewer::from_slice(&bytes);

        assert_eq!(viewer.read_be::<u32>(), Err(Error::Truncated));
        assert!(viewer.is_failed());

        // bytes are still there, but the viewer refuses to read them
        assert_eq!(viewer.peek(), None);
        assert_eq!(viewer.next_byte(), Err(Error::Truncated));
        assert_eq!(viewer.offset(), 0);

        viewer.fail(Error::Overflow);
        assert_eq!(viewer.failure(), Some(&Error::Truncated));
    }
}
