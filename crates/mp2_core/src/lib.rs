//! Encoder and decoder for the mp2 binary serialization format.
//!
//! Every value starts with a one-byte tag. Small unsigned integers, short
//! strings and short sequences fit in the tag itself; everything else is
//! followed by a big-endian length or magnitude of 1, 2, 4 or 8 bytes.
//!
//! The low level codecs live in [header], [scalar] and [container].
//! Most users want the [serde] bindings in [ser_de]: [to_vec] and [from_slice].

pub mod buffer;
pub mod config;
pub mod consts;
pub mod container;
pub mod endian;
pub mod err;
pub mod header;
pub mod scalar;
pub mod ser_de;

pub use buffer::{Appendable, ByteViewer};
pub use config::{defaults, Config};
pub use container::skip_value;
pub use endian::BigEndian;
pub use err::{Error, Mp2Result};
pub use header::{decode_header, encode_header, peek_category, Category, Container, Header, Width};
pub use ser_de::{
    from_slice, from_slice_with_config, to_vec, to_writer, Mp2Deserializer, Mp2Serializer,
};
