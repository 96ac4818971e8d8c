//! Fixed-width conversions between native integers and the big-endian wire order.

/// Integers that can be written to and read from a big-endian byte window.
///
/// Windows must be exactly [BigEndian::WIDTH] bytes long, the caller
/// checks sizes beforehand.
pub trait BigEndian: Sized + Copy {
    /// Number of bytes occupied on the wire.
    const WIDTH: usize;

    /// Write `self` into `dst` in big-endian order.
    fn write_be(self, dst: &mut [u8]);

    /// Read a value from `src` in big-endian order.
    fn read_be(src: &[u8]) -> Self;
}

/// Impl [BigEndian] for primitives
macro_rules! impl_big_endian {
    ($($num_type: ty),*) => {
        $(
            impl BigEndian for $num_type {
                const WIDTH: usize = std::mem::size_of::<$num_type>();

                fn write_be(self, dst: &mut [u8]) {
                    debug_assert_eq!(dst.len(), Self::WIDTH);
                    dst.copy_from_slice(&self.to_be_bytes());
                }

                fn read_be(src: &[u8]) -> Self {
                    debug_assert_eq!(src.len(), Self::WIDTH);
                    let mut bytes = [0_u8; std::mem::size_of::<$num_type>()];
                    bytes.copy_from_slice(src);
                    <$num_type>::from_be_bytes(bytes)
                }
            }
        )*
    };
}

impl_big_endian! {u8, u16, u32, u64, i8, i16, i32, i64}

/// Interpret exactly `n` bytes (`1..=8`) of `src` as a big-endian unsigned
/// integer, zero-extended to 64 bits.
pub fn read_be_partial(n: usize, src: &[u8]) -> u64 {
    debug_assert!((1..=8).contains(&n));
    debug_assert!(src.len() >= n);

    src[..n]
        .iter()
        .fold(0_u64, |acc, &byte| (acc << 8) | byte as u64)
}
