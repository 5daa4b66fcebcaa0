use serde::{ser, Serialize};
use amf3::Encoder;
use std::borrow::Cow;
use std::io::Write;

use crate::config::{EncoderConfig, FieldCase};
use crate::error::{Error, Result};

/// Writes any `Serialize` type through an [`amf3::Encoder`]. Structs, maps and enum variants
/// with data become anonymous dynamic objects, sequences and tuples dense arrays. Rust values
/// carry no identity, so every composite is written in full but still takes a slot in the object
/// table to keep the indices in step with any decoder.
pub struct Serializer<W: Write> {
    encoder: Encoder<W>,
    config: EncoderConfig,
    /// Names of the structs currently being written, innermost last
    records: Vec<&'static str>,
}

pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut serializer = Serializer::new(Vec::new());
    value.serialize(&mut serializer)?;
    Ok(serializer.into_inner())
}

pub fn to_writer<T: ?Sized + Serialize, W: Write>(writer: W, value: &T) -> Result<()> {
    to_writer_with_config(writer, value, EncoderConfig::default())
}

pub fn to_writer_with_config<T: ?Sized + Serialize, W: Write>(writer: W, value: &T, config: EncoderConfig) -> Result<()> {
    let mut serializer = Serializer::with_config(writer, config);
    value.serialize(&mut serializer)
}

impl<W: Write> Serializer<W> {

    pub fn new(writer: W) -> Self {
        Self::with_config(writer, EncoderConfig::default())
    }

    pub fn with_config(writer: W, config: EncoderConfig) -> Self {
        Serializer { encoder: Encoder::new(writer), config, records: Vec::new() }
    }

    /// Starts a new session: later values will not reference strings written so far.
    pub fn reset(&mut self) {
        self.encoder.reset();
    }

    pub fn into_inner(self) -> W {
        self.encoder.into_inner()
    }

    fn field_name(&self, name: &'static str) -> Cow<'static, str> {
        let literal = self.records.last().copied().map_or(false, |record| self.config.is_literal(record, name));
        if literal {
            return Cow::Borrowed(name);
        }
        match self.config.field_case {
            FieldCase::Preserve => Cow::Borrowed(name),
            FieldCase::LowerFirst => {
                let mut chars = name.chars();
                match chars.next() {
                    Some(first) if first.is_uppercase() => Cow::Owned(first.to_lowercase().chain(chars).collect()),
                    _ => Cow::Borrowed(name),
                }
            },
        }
    }

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        let key = self.field_name(key);
        self.encoder.encode_key(&key)?;
        value.serialize(self)
    }

}

impl<'a, W: Write> ser::Serializer for &'a mut Serializer<W> {

    type Ok = ();
    type Error = Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_bool(self, v: bool) -> Result<()> {
        self.encoder.encode_bool(v)?;
        Ok(())
    }

    fn serialize_i8(self, v: i8) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<()> {
        self.serialize_i64(i64::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<()> {
        self.encoder.encode_int(v)?;
        Ok(())
    }

    fn serialize_u8(self, v: u8) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<()> {
        self.serialize_u64(u64::from(v))
    }

    fn serialize_u64(self, v: u64) -> Result<()> {
        self.encoder.encode_uint(v)?;
        Ok(())
    }

    fn serialize_f32(self, v: f32) -> Result<()> {
        self.serialize_f64(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<()> {
        self.encoder.encode_double(v)?;
        Ok(())
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.serialize_str(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_str(self, v: &str) -> Result<()> {
        self.encoder.encode_str(v)?;
        Ok(())
    }

    // There is no byte array support, bytes travel as an array of integers.
    fn serialize_bytes(self, v: &[u8]) -> Result<()> {
        self.encoder.begin_array(v.len())?;
        for b in v {
            self.encoder.encode_uint(u64::from(*b))?;
        }
        Ok(())
    }

    fn serialize_none(self) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<()> {
        self.encoder.encode_null()?;
        Ok(())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> {
        self.serialize_unit()
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<()> {
        self.serialize_str(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, variant: &'static str, value: &T) -> Result<()> {
        self.encoder.begin_object()?;
        self.encoder.encode_key(variant)?;
        value.serialize(&mut *self)?;
        self.encoder.end_object()?;
        Ok(())
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<Self::SerializeSeq> {
        match len {
            Some(l) => {
                self.encoder.begin_array(l)?;
                Ok(self)
            },
            None => Err(Error::Length),
        }
    }

    fn serialize_tuple(self, len: usize) -> Result<Self::SerializeTuple> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<Self::SerializeTupleStruct> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, variant: &'static str, len: usize) -> Result<Self::SerializeTupleVariant> {
        self.encoder.begin_object()?;
        self.encoder.encode_key(variant)?;
        self.encoder.begin_array(len)?;
        Ok(self)
    }

    // Objects are terminated instead of length prefixed, so maps of unknown size are fine.
    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        self.encoder.begin_object()?;
        Ok(self)
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        self.encoder.begin_object()?;
        self.records.push(name);
        Ok(self)
    }

    fn serialize_struct_variant(self, name: &'static str, _index: u32, variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        self.encoder.begin_object()?;
        self.encoder.encode_key(variant)?;
        self.encoder.begin_object()?;
        self.records.push(name);
        Ok(self)
    }

}

impl<'a, W: Write> ser::SerializeSeq for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }

}

impl<'a, W: Write> ser::SerializeTuple for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeTupleStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeTupleVariant for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.encoder.end_object()?;
        Ok(())
    }
}

impl<'a, W: Write> ser::SerializeMap for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<()> {
        key.serialize(MapKeySerializer { ser: &mut **self })
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        value.serialize(&mut **self)
    }

    fn end(self) -> Result<()> {
        self.encoder.end_object()?;
        Ok(())
    }

}

impl<'a, W: Write> ser::SerializeStruct for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        Serializer::serialize_field(&mut **self, key, value)
    }

    fn end(self) -> Result<()> {
        self.records.pop();
        self.encoder.end_object()?;
        Ok(())
    }

}

impl<'a, W: Write> ser::SerializeStructVariant for &'a mut Serializer<W> {
    type Ok = ();
    type Error = Error;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, key: &'static str, value: &T) -> Result<()> {
        Serializer::serialize_field(&mut **self, key, value)
    }

    fn end(self) -> Result<()> {
        self.records.pop();
        self.encoder.end_object()?;
        self.encoder.end_object()?;
        Ok(())
    }

}

/// Object keys are strings without a marker. Anything that doesn't serialize as a string is
/// rejected.
struct MapKeySerializer<'a, W: Write> {
    ser: &'a mut Serializer<W>,
}

impl<'a, W: Write> MapKeySerializer<'a, W> {
    fn key(self, key: &str) -> Result<()> {
        self.ser.encoder.encode_key(key)?;
        Ok(())
    }
}

impl<'a, W: Write> ser::Serializer for MapKeySerializer<'a, W> {

    type Ok = ();
    type Error = Error;
    type SerializeSeq = ser::Impossible<(), Error>;
    type SerializeTuple = ser::Impossible<(), Error>;
    type SerializeTupleStruct = ser::Impossible<(), Error>;
    type SerializeTupleVariant = ser::Impossible<(), Error>;
    type SerializeMap = ser::Impossible<(), Error>;
    type SerializeStruct = ser::Impossible<(), Error>;
    type SerializeStructVariant = ser::Impossible<(), Error>;

    fn serialize_str(self, v: &str) -> Result<()> {
        self.key(v)
    }

    fn serialize_char(self, v: char) -> Result<()> {
        self.key(v.encode_utf8(&mut [0u8; 4]))
    }

    fn serialize_unit_variant(self, _name: &'static str, _index: u32, variant: &'static str) -> Result<()> {
        self.key(variant)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(self, _name: &'static str, value: &T) -> Result<()> {
        value.serialize(self)
    }

    fn serialize_bool(self, _v: bool) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_i8(self, _v: i8) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_i16(self, _v: i16) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_i32(self, _v: i32) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_i64(self, _v: i64) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_u8(self, _v: u8) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_u16(self, _v: u16) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_u32(self, _v: u32) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_u64(self, _v: u64) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_f32(self, _v: f32) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_f64(self, _v: f64) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_bytes(self, _v: &[u8]) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_none(self) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_some<T: ?Sized + Serialize>(self, _value: &T) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_unit(self) -> Result<()> { Err(Error::MapKeyType) }
    fn serialize_unit_struct(self, _name: &'static str) -> Result<()> { Err(Error::MapKeyType) }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(self, _name: &'static str, _index: u32, _variant: &'static str, _value: &T) -> Result<()> {
        Err(Error::MapKeyType)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Self::SerializeSeq> {
        Err(Error::MapKeyType)
    }

    fn serialize_tuple(self, _len: usize) -> Result<Self::SerializeTuple> {
        Err(Error::MapKeyType)
    }

    fn serialize_tuple_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeTupleStruct> {
        Err(Error::MapKeyType)
    }

    fn serialize_tuple_variant(self, _name: &'static str, _index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeTupleVariant> {
        Err(Error::MapKeyType)
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Self::SerializeMap> {
        Err(Error::MapKeyType)
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Self::SerializeStruct> {
        Err(Error::MapKeyType)
    }

    fn serialize_struct_variant(self, _name: &'static str, _index: u32, _variant: &'static str, _len: usize) -> Result<Self::SerializeStructVariant> {
        Err(Error::MapKeyType)
    }

}
