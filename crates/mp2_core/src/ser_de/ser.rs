//! Implementation of [serde::ser::Serializer] for [Mp2Serializer]

use serde::{ser, Serialize};

use crate::buffer::Appendable;
use crate::err::Error;
use crate::header::{encode_header, Container};
use crate::{container, scalar};

/// This data structure contains the serialized bytes of any arbitrary data structure.
///
/// Structs/enums to be serialized need to derive [serde::Serialize].
pub struct Mp2Serializer<W: Appendable = Vec<u8>> {
    pub(crate) output: W,
}

impl Default for Mp2Serializer<Vec<u8>> {
    fn default() -> Self {
        Self {
            output: Default::default(),
        }
    }
}

impl<W: Appendable> Mp2Serializer<W> {
    /// Create a serializer that appends to `output`.
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

/// Impl serialize for unsigned primitives
macro_rules! serialize_unsigned {
    ($fn_name: ident, $num_type: ty) => {
        fn $fn_name(self, v: $num_type) -> Result<Self::Ok, Self::Error> {
            scalar::write_uint(v as u64, &mut self.output);
            Ok(())
        }
    };
}

/// Impl serialize for signed primitives
macro_rules! serialize_signed {
    ($fn_name: ident, $num_type: ty) => {
        fn $fn_name(self, v: $num_type) -> Result<Self::Ok, Self::Error> {
            scalar::write_int(v as i64, &mut self.output);
            Ok(())
        }
    };
}

impl<'a, W: Appendable> ser::Serializer for &'a mut Mp2Serializer<W> {
    type Ok = ();

    type Error = Error;

    type SerializeSeq = Compound<'a, W>;

    type SerializeTuple = Compound<'a, W>;

    type SerializeTupleStruct = Compound<'a, W>;

    type SerializeTupleVariant = Compound<'a, W>;

    type SerializeMap = Compound<'a, W>;

    type SerializeStruct = Compound<'a, W>;

    type SerializeStructVariant = Compound<'a, W>;

    fn serialize_bool(self, v: bool) -> Result<Self::Ok, Self::Error> {
        scalar::write_bool(v, &mut self.output);
        Ok(())
    }

    serialize_signed! {serialize_i8, i8}
    serialize_signed! {serialize_i16, i16}
    serialize_signed! {serialize_i32, i32}
    serialize_signed! {serialize_i64, i64}

    serialize_unsigned! {serialize_u8, u8}
    serialize_unsigned! {serialize_u16, u16}
    serialize_unsigned! {serialize_u32, u32}
    serialize_unsigned! {serialize_u64, u64}

    fn serialize_i128(self, _: i128) -> Result<Self::Ok, Self::Error> {
        Err(Error::Unsupported("i128"))
    }

    fn serialize_u128(self, _: u128) -> Result<Self::Ok, Self::Error> {
        Err(Error::Unsupported("u128"))
    }

    fn serialize_f32(self, v: f32) -> Result<Self::Ok, Self::Error> {
        scalar::write_real(v as f64, &mut self.output);
        Ok(())
    }

    fn serialize_f64(self, v: f64) -> Result<Self::Ok, Self::Error> {
        scalar::write_real(v, &mut self.output);
        Ok(())
    }

    // chars are strings of a single character
    fn serialize_char(self, v: char) -> Result<Self::Ok, Self::Error> {
        let mut buf = [0_u8; 4];
        container::write_str(v.encode_utf8(&mut buf).as_bytes(), &mut self.output);
        Ok(())
    }

    fn serialize_str(self, v: &str) -> Result<Self::Ok, Self::Error> {
        container::write_str(v.as_bytes(), &mut self.output);
        Ok(())
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Self::Ok, Self::Error> {
        container::write_str(v, &mut self.output);
        Ok(())
    }

    // none variants are empty sequences
    fn serialize_none(self) -> Result<Self::Ok, Self::Error> {
        container::write_seq_header(0, &mut self.output);
        Ok(())
    }

    // some variants are sequences of one element
    fn serialize_some<T: ?Sized>(self, value: &T) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        container::write_seq_header(1, &mut self.output);
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Self::Ok, Self::Error> {
        container::write_seq_header(0, &mut self.output);
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Result<Self::Ok, Self::Error> {
        self.serialize_unit()
    }

    // unit variants are serialized as their name
    fn serialize_unit_variant(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
    ) -> Result<Self::Ok, Self::Error> {
        variant.serialize(self)
    }

    // serialize the inner value
    fn serialize_newtype_struct<T: ?Sized>(
        self,
        _: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        value.serialize(self)
    }

    // { variant: value }
    fn serialize_newtype_variant<T: ?Sized>(
        self,
        _: &'static str,
        _: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Self::Ok, Self::Error>
    where
        T: Serialize,
    {
        container::write_map_header(1, &mut self.output);
        variant.serialize(&mut *self)?;
        value.serialize(&mut *self)
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq, Self::Error> {
        match len {
            Some(len) => {
                container::write_seq_header(len as u64, &mut self.output);
                Ok(Compound::direct(self, len as u64))
            }
            None => Ok(Compound::buffered(self, Container::Seq)),
        }
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple, Self::Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleStruct, Self::Error> {
        self.serialize_seq(Some(len))
    }

    // { variant: [fields..] }
    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeTupleVariant, Self::Error> {
        container::write_map_header(1, &mut self.output);
        variant.serialize(&mut *self)?;
        self.serialize_seq(Some(len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Self::Error> {
        match len {
            Some(len) => {
                container::write_map_header(len as u64, &mut self.output);
                Ok(Compound::direct(self, len as u64))
            }
            None => Ok(Compound::buffered(self, Container::Map)),
        }
    }

    // `len` already leaves out skipped fields
    fn serialize_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStruct, Self::Error> {
        container::write_map_header(len as u64, &mut self.output);
        Ok(Compound::direct(self, len as u64))
    }

    // { variant: { fields.. } }
    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<Self::SerializeStructVariant, Self::Error> {
        container::write_map_header(1, &mut self.output);
        variant.serialize(&mut *self)?;
        self.serialize_struct(name, len)
    }

    fn is_human_readable(&self) -> bool {
        false
    }
}

/// Serializer state for sequences, maps and structs.
///
/// When the element count is known up front the header is written
/// immediately and elements go straight to the output. Otherwise the
/// elements are collected in a scratch buffer and framed once the last
/// element is written.
pub struct Compound<'a, W: Appendable> {
    ser: &'a mut Mp2Serializer<W>,
    buffered: Option<Buffered>,
    /// Count already written in the header, unused when buffering.
    declared: u64,
    count: u64,
}

struct Buffered {
    container: Container,
    scratch: Mp2Serializer<Vec<u8>>,
}

impl<'a, W: Appendable> Compound<'a, W> {
    fn direct(ser: &'a mut Mp2Serializer<W>, declared: u64) -> Self {
        Self {
            ser,
            buffered: None,
            declared,
            count: 0,
        }
    }

    fn buffered(ser: &'a mut Mp2Serializer<W>, container: Container) -> Self {
        Self {
            ser,
            buffered: Some(Buffered {
                container,
                scratch: Mp2Serializer::default(),
            }),
            declared: 0,
            count: 0,
        }
    }

    /// Serialize one element, key or value.
    fn item<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), Error> {
        match &mut self.buffered {
            Some(buffered) => value.serialize(&mut buffered.scratch),
            None => value.serialize(&mut *self.ser),
        }
    }

    /// Count one element or one (key, value) entry.
    fn count(&mut self) {
        self.count += 1;
    }

    fn finish(self) -> Result<(), Error> {
        match self.buffered {
            Some(buffered) => {
                log::trace!(
                    "framing buffered {:?} of {} items ({} bytes)",
                    buffered.container,
                    self.count,
                    buffered.scratch.output.len()
                );

                encode_header(buffered.container, self.count, &mut self.ser.output);
                self.ser.output.append_bytes(&buffered.scratch.output);
                Ok(())
            }
            None if self.count != self.declared => Err(Error::Custom(format!(
                "declared {} items but serialized {}",
                self.declared, self.count
            ))),
            None => Ok(()),
        }
    }
}

impl<'a, W: Appendable> ser::SerializeSeq for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.item(value)?;
        self.count();
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<'a, W: Appendable> ser::SerializeTuple for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_element<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<'a, W: Appendable> ser::SerializeTupleStruct for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<'a, W: Appendable> ser::SerializeTupleVariant for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<'a, W: Appendable> ser::SerializeMap for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_key<T: ?Sized>(&mut self, key: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.item(key)?;
        self.count();
        Ok(())
    }

    fn serialize_value<T: ?Sized>(&mut self, value: &T) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        self.item(value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<'a, W: Appendable> ser::SerializeStruct for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        // same as map
        self.item(key)?;
        self.item(value)?;
        self.count();
        Ok(())
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}

impl<'a, W: Appendable> ser::SerializeStructVariant for Compound<'a, W> {
    type Ok = ();

    type Error = Error;

    fn serialize_field<T: ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), Self::Error>
    where
        T: Serialize,
    {
        ser::SerializeStruct::serialize_field(self, key, value)
    }

    fn end(self) -> Result<Self::Ok, Self::Error> {
        self.finish()
    }
}
