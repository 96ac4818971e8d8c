//! Serialization and deserialization module

use crate::buffer::Appendable;
use crate::config::Config;
use crate::err::Mp2Result;

mod de;
mod ser;

pub use de::Mp2Deserializer;
pub use ser::{Compound, Mp2Serializer};

/// Serialize a data structure to a vector of bytes
pub fn to_vec<T: ?Sized + serde::Serialize>(value: &T) -> Mp2Result<Vec<u8>> {
    let mut serializer = Mp2Serializer::default();

    value.serialize(&mut serializer)?;

    Ok(serializer.into_inner())
}

/// Serialize a data structure to the end of an existing buffer
pub fn to_writer<T, W>(value: &T, out: &mut W) -> Mp2Result<()>
where
    T: ?Sized + serde::Serialize,
    W: Appendable,
{
    let mut serializer = Mp2Serializer::new(out);

    value.serialize(&mut serializer)
}

/// Deserialize a data structure from a slice of bytes.
///
/// The slice must hold exactly one value.
pub fn from_slice<'de, T>(bytes: &'de [u8]) -> Mp2Result<T>
where
    T: serde::Deserialize<'de>,
{
    from_slice_with_config(bytes, Config::default())
}

pub fn from_slice_with_config<'de, T>(bytes: &'de [u8], config: Config) -> Mp2Result<T>
where
    T: serde::Deserialize<'de>,
{
    let mut deserializer = Mp2Deserializer::with_config(bytes, config);

    let value = T::deserialize(&mut deserializer)?;
    deserializer.end()?;

    Ok(value)
}
