//! Implementation of [serde::de::Deserializer] for [Mp2Deserializer]

use serde::de::{
    self, value::BorrowedStrDeserializer, DeserializeSeed, EnumAccess, MapAccess, SeqAccess,
    Unexpected, VariantAccess,
};

use crate::buffer::ByteViewer;
use crate::config::Config;
use crate::err::{Error, Mp2Result};
use crate::header::{decode_header, Category, Header};
use crate::{container, scalar};

/// This data structure contains the serialized bytes of any arbitrary data structure.
///
/// Structs/enums to be deserialized need to derive [serde::Deserialize].
pub struct Mp2Deserializer<'de> {
    input: ByteViewer<'de>,
    config: Config,
    depth: usize,
}

impl<'de> Mp2Deserializer<'de> {
    pub fn from_slice(s: &'de [u8]) -> Self {
        Self::with_config(s, Config::default())
    }

    pub fn with_config(s: &'de [u8], config: Config) -> Self {
        Self {
            input: ByteViewer::from_slice(s),
            config,
            depth: 0,
        }
    }

    /// Check that the whole input has been consumed.
    pub fn end(&mut self) -> Mp2Result<()> {
        self.input.check()?;

        match self.input.remaining() {
            0 => Ok(()),
            n => Err(self.input.fail(Error::TrailingBytes(n))),
        }
    }

    fn unexpected(&mut self, expected: &'static str, found: Category) -> Error {
        self.input.fail(Error::UnexpectedCategory { expected, found })
    }

    /// Descend into a container of `count` items, enforcing the depth limit.
    fn enter(&mut self, count: u64) -> Mp2Result<()> {
        container::enter(&mut self.input, &self.config, self.depth, count)?;
        self.depth += 1;
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Keep an error raised by a visitor or seed as the viewer's failure.
    fn record<T>(&mut self, res: Mp2Result<T>) -> Mp2Result<T> {
        res.map_err(|e| self.input.fail(e))
    }

    /// Visit a value whose header has already been consumed.
    fn visit_header<V>(&mut self, header: Header, visitor: V) -> Mp2Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let res = match header {
            Header::Uint { value, .. } => visitor.visit_u64(value),
            Header::Sint { magnitude, .. } => match i64::try_from(-(magnitude as i128)) {
                Ok(value) => visitor.visit_i64(value),
                Err(_) => Err(Error::Overflow),
            },
            Header::Bool(value) => visitor.visit_bool(value),
            Header::Real => {
                let exponent = scalar::read_int::<i64>(&mut self.input)?;
                let mantissa = scalar::read_int::<i64>(&mut self.input)?;
                visitor.visit_f64(scalar::real_from_components(exponent, mantissa))
            }
            Header::Str { len, .. } => {
                self.input.ensure(len)?;
                let bytes = self.input.next_bytes(len as usize)?;

                match std::str::from_utf8(bytes) {
                    Ok(s) => visitor.visit_borrowed_str(s),
                    Err(_) => visitor.visit_borrowed_bytes(bytes),
                }
            }
            Header::Seq { count, .. } => self.visit_seq_body(count, visitor),
            Header::Map { count, .. } => self.visit_map_body(count, visitor),
        };

        self.record(res)
    }

    fn visit_seq_body<V>(&mut self, count: u64, visitor: V) -> Mp2Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.input.ensure(count)?;
        self.enter(count)?;

        let mut accessor = CollectionsAccessor::from_deserializer(self, count);
        let res = visitor.visit_seq(&mut accessor);
        let remaining = accessor.remaining;
        let value = self.record(res)?;

        self.leave();
        match remaining {
            0 => Ok(value),
            _ => Err(self.input.fail(de::Error::invalid_length(
                count as usize,
                &"fewer elements in sequence",
            ))),
        }
    }

    fn visit_map_body<V>(&mut self, count: u64, visitor: V) -> Mp2Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.input.ensure(count.saturating_mul(2))?;
        self.enter(count)?;

        let mut accessor = CollectionsAccessor::from_deserializer(self, count);
        let res = visitor.visit_map(&mut accessor);
        let remaining = accessor.remaining;
        let value = self.record(res)?;

        self.leave();
        match remaining {
            0 => Ok(value),
            _ => Err(self.input.fail(de::Error::invalid_length(
                count as usize,
                &"fewer entries in mapping",
            ))),
        }
    }
}

/// Impl deserialize integer primitives
macro_rules! deserialize_integer {
    ($fn_name: ident: $data_type: ty => $visitor_fn: ident) => {
        fn $fn_name<V>(self, visitor: V) -> Result<V::Value, Self::Error>
        where
            V: de::Visitor<'de>,
        {
            let value = scalar::read_int::<$data_type>(&mut self.input)?;
            let res = visitor.$visitor_fn(value);
            self.record(res)
        }
    };
}

impl<'de, 'a> de::Deserializer<'de> for &'a mut Mp2Deserializer<'de> {
    type Error = Error;

    // the format is self-describing, the header decides
    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let header = decode_header(&mut self.input)?;
        self.visit_header(header, visitor)
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = scalar::read_bool(&mut self.input)?;
        let res = visitor.visit_bool(value);
        self.record(res)
    }

    deserialize_integer! {deserialize_i64: i64 => visit_i64}
    deserialize_integer! {deserialize_i32: i32 => visit_i32}
    deserialize_integer! {deserialize_i16: i16 => visit_i16}
    deserialize_integer! {deserialize_i8: i8 => visit_i8}

    deserialize_integer! {deserialize_u64: u64 => visit_u64}
    deserialize_integer! {deserialize_u32: u32 => visit_u32}
    deserialize_integer! {deserialize_u16: u16 => visit_u16}
    deserialize_integer! {deserialize_u8: u8 => visit_u8}

    fn deserialize_i128<V>(self, _: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(self.input.fail(Error::Unsupported("i128")))
    }

    fn deserialize_u128<V>(self, _: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        Err(self.input.fail(Error::Unsupported("u128")))
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = scalar::read_real(&mut self.input)?;
        let res = visitor.visit_f32(value as f32);
        self.record(res)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = scalar::read_real(&mut self.input)?;
        let res = visitor.visit_f64(value);
        self.record(res)
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let s = container::read_utf8(&mut self.input)?;
        let mut chars = s.chars();

        let res = match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(de::Error::invalid_value(
                Unexpected::Str(s),
                &"a single character",
            )),
        };
        self.record(res)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = container::read_utf8(&mut self.input)?;
        let res = visitor.visit_borrowed_str(value);
        self.record(res)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let value = container::read_str(&mut self.input)?;
        let res = visitor.visit_borrowed_bytes(value);
        self.record(res)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let res = match decode_header(&mut self.input)? {
            Header::Seq { count: 0, .. } => visitor.visit_none(),
            Header::Seq { count: 1, .. } => {
                self.enter(1)?;
                let res = visitor.visit_some(&mut *self);
                self.leave();
                res
            }
            other => Err(self.unexpected("optional value", other.category())),
        };
        self.record(res)
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let res = match decode_header(&mut self.input)? {
            Header::Seq { count: 0, .. } => visitor.visit_unit(),
            other => Err(self.unexpected("unit", other.category())),
        };
        self.record(res)
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let res = visitor.visit_newtype_struct(&mut *self);
        self.record(res)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match decode_header(&mut self.input)? {
            Header::Seq { count, .. } => self.visit_seq_body(count, visitor),
            other => Err(self.unexpected("sequence", other.category())),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        match decode_header(&mut self.input)? {
            Header::Map { count, .. } => self.visit_map_body(count, visitor),
            other => Err(self.unexpected("mapping", other.category())),
        }
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // structs and maps use the same underlying logic
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        let res = match decode_header(&mut self.input)? {
            // unit variant, serialized as its name
            Header::Str { len, .. } => {
                self.input.ensure(len)?;
                let bytes = self.input.next_bytes(len as usize)?;
                let name = std::str::from_utf8(bytes)
                    .map_err(|_| self.input.fail(Error::InvalidUtf8))?;

                visitor.visit_enum(BorrowedStrDeserializer::<Error>::new(name))
            }
            // { variant: payload }
            Header::Map { count: 1, .. } => {
                self.enter(1)?;
                let res = visitor.visit_enum(VariantAccessor { des: &mut *self });
                self.leave();
                res
            }
            other => Err(self.unexpected("enum variant", other.category())),
        };
        self.record(res)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        // identifiers are serialized as strings
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        container::skip_nested(&mut self.input, &self.config, self.depth)?;
        let res = visitor.visit_unit();
        self.record(res)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Element access for sequences and mappings with a known count.
struct CollectionsAccessor<'a, 'de: 'a> {
    des: &'a mut Mp2Deserializer<'de>,
    remaining: u64,
}

impl<'a, 'de> CollectionsAccessor<'a, 'de> {
    /// Create a new instance of the collections accessor
    pub fn from_deserializer(des: &'a mut Mp2Deserializer<'de>, count: u64) -> Self {
        Self {
            des,
            remaining: count,
        }
    }
}

impl<'a, 'de> SeqAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        // stop at sequence boundary
        if self.remaining == 0 {
            return Ok(None);
        }

        self.remaining -= 1;
        seed.deserialize(&mut *self.des).map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        usize::try_from(self.remaining).ok()
    }
}

impl<'a, 'de> MapAccess<'de> for CollectionsAccessor<'a, 'de> {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        // stop at map boundary
        if self.remaining == 0 {
            return Ok(None);
        }

        self.remaining -= 1;
        seed.deserialize(&mut *self.des).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        seed.deserialize(&mut *self.des)
    }

    fn size_hint(&self) -> Option<usize> {
        usize::try_from(self.remaining).ok()
    }
}

/// Access to the single `{ variant: payload }` entry of an enum.
struct VariantAccessor<'a, 'de: 'a> {
    des: &'a mut Mp2Deserializer<'de>,
}

impl<'a, 'de> EnumAccess<'de> for VariantAccessor<'a, 'de> {
    type Error = Error;

    type Variant = Self;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant), Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(&mut *self.des)?;

        Ok((variant, self))
    }
}

impl<'a, 'de> VariantAccess<'de> for VariantAccessor<'a, 'de> {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Self::Error> {
        de::Deserialize::deserialize(self.des)
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(self.des)
    }

    fn tuple_variant<V>(self, len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_tuple(self.des, len, visitor)
    }

    fn struct_variant<V>(
        self,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_map(self.des, visitor)
    }
}
