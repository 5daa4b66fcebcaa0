use crate::error::EncodeError;
use crate::marker::{Marker, DYNAMIC_TRAITS};
use crate::refs::{ObjectTable, Slot, StringTable};
use crate::u29;
use crate::value::Value;
use std::io::Write;
use tracing::{debug, trace};

/// Used to encode AMF3 values. The encoder owns the string and object tables of one session:
/// every value written through the same instance may reference strings and composites written
/// earlier. Call [`Encoder::reset`] to start a new session on the same writer.
///
/// Besides [`Encoder::encode_value`], which writes a whole [`Value`], the encoder exposes the
/// building blocks of the format so that other data models can be written without building a
/// `Value` first.
pub struct Encoder<W: Write> {
    writer: W,
    strings: StringTable,
    objects: ObjectTable,
}

impl<W: Write> Encoder<W> {

    /// Encode a value to the given writer within a session of its own. The resulting `usize` is
    /// the amount of bytes that got written.
    pub fn encode(value: &Value, writer: W) -> Result<usize, EncodeError> {
        Self::new(writer).encode_value(value)
    }

    pub fn new(writer: W) -> Self {
        Self { writer, strings: StringTable::default(), objects: ObjectTable::default() }
    }

    pub fn encode_value(&mut self, value: &Value) -> Result<usize, EncodeError> {
        match value {
            Value::Null       => self.encode_null(),
            Value::Bool(b)    => self.encode_bool(*b),
            Value::Integer(i) => self.encode_int(*i as i64),
            Value::Double(d)  => self.encode_double(*d),
            Value::String(s)  => self.encode_str(s),
            Value::Array(inner) => {
                let mut c = self.marker(Marker::Array)?;
                match self.objects.open(value) {
                    Slot::Known(i) => Ok(c + self.back_reference(i)?),
                    Slot::New(_) => {
                        let inner = inner.borrow();
                        c += self.array_header(inner.len())?;
                        for element in inner.iter() {
                            c += self.encode_value(element)?;
                        }
                        Ok(c)
                    },
                }
            },
            Value::Object(inner) => {
                let mut c = self.marker(Marker::Object)?;
                match self.objects.open(value) {
                    Slot::Known(i) => Ok(c + self.back_reference(i)?),
                    Slot::New(_) => {
                        c += self.object_header()?;
                        for (key, val) in inner.borrow().iter() {
                            c += self.encode_key(key)?;
                            c += self.encode_value(val)?;
                        }
                        Ok(c + self.end_object()?)
                    },
                }
            },
        }
    }

    pub fn encode_null(&mut self) -> Result<usize, EncodeError> {
        self.marker(Marker::Null)
    }

    pub fn encode_bool(&mut self, b: bool) -> Result<usize, EncodeError> {
        self.marker(if b { Marker::True } else { Marker::False })
    }

    /// Writes an integer if the value fits into 29 signed bits, a double if it fits into 32
    /// signed bits and its decimal representation as a string otherwise.
    pub fn encode_int(&mut self, v: i64) -> Result<usize, EncodeError> {
        if (u29::MIN_SIGNED as i64..=u29::MAX_SIGNED as i64).contains(&v) {
            Ok(self.marker(Marker::Integer)? + u29::encode(u29::from_i32(v as i32)?, &mut self.writer)?)
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
            self.encode_double(v as f64)
        } else {
            self.encode_str(&v.to_string())
        }
    }

    /// Writes an integer if the value fits into 29 unsigned bits, a double if it fits into 32
    /// unsigned bits and its decimal representation as a string otherwise.
    pub fn encode_uint(&mut self, v: u64) -> Result<usize, EncodeError> {
        if v <= u29::MAX as u64 {
            Ok(self.marker(Marker::Integer)? + u29::encode(v as u32, &mut self.writer)?)
        } else if v <= u32::MAX as u64 {
            self.encode_double(v as f64)
        } else {
            self.encode_str(&v.to_string())
        }
    }

    pub fn encode_double(&mut self, v: f64) -> Result<usize, EncodeError> {
        let c = self.marker(Marker::Double)?;
        self.writer.write_all(&v.to_be_bytes())?;
        Ok(c + 8)
    }

    pub fn encode_str(&mut self, s: &str) -> Result<usize, EncodeError> {
        Ok(self.marker(Marker::String)? + self.string(s)?)
    }

    /// Opens an array of `len` elements which has no identity of its own. The caller has to
    /// encode exactly `len` values afterwards.
    pub fn begin_array(&mut self, len: usize) -> Result<usize, EncodeError> {
        let c = self.marker(Marker::Array)?;
        self.objects.open_anonymous();
        Ok(c + self.array_header(len)?)
    }

    /// Opens an object which has no identity of its own. The caller continues with pairs of
    /// [`Encoder::encode_key`] and a value and finishes with [`Encoder::end_object`].
    pub fn begin_object(&mut self) -> Result<usize, EncodeError> {
        let c = self.marker(Marker::Object)?;
        self.objects.open_anonymous();
        Ok(c + self.object_header()?)
    }

    /// Writes an object key. The empty string is reserved as the terminator of the key list.
    pub fn encode_key(&mut self, key: &str) -> Result<usize, EncodeError> {
        if key.is_empty() {
            return Err(EncodeError::EmptyKey);
        }
        self.string(key)
    }

    pub fn end_object(&mut self) -> Result<usize, EncodeError> {
        self.string("")
    }

    /// Forgets all strings and composites written so far. The next value starts a new session.
    pub fn reset(&mut self) {
        debug!(strings = self.strings.len(), objects = self.objects.len(), "encoder session reset");
        self.strings.clear();
        self.objects.clear();
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn marker(&mut self, marker: Marker) -> Result<usize, EncodeError> {
        self.writer.write_all(&[marker as u8])?;
        Ok(1)
    }

    fn string(&mut self, s: &str) -> Result<usize, EncodeError> {
        match self.strings.intern(s) {
            Some(i) => {
                trace!(index = i, "string back-reference");
                u29::encode(Self::reference(i)?, &mut self.writer)
            },
            None => {
                let c = u29::encode(Self::inline(s.len())?, &mut self.writer)?;
                self.writer.write_all(s.as_bytes())?;
                Ok(c + s.len())
            },
        }
    }

    fn back_reference(&mut self, i: usize) -> Result<usize, EncodeError> {
        trace!(index = i, "object back-reference");
        u29::encode(Self::reference(i)?, &mut self.writer)
    }

    // Dense arrays only: the associative part is always empty.
    fn array_header(&mut self, len: usize) -> Result<usize, EncodeError> {
        let c = u29::encode(Self::inline(len)?, &mut self.writer)?;
        Ok(c + self.string("")?)
    }

    // Anonymous dynamic object: inline traits without sealed members and an empty class name.
    fn object_header(&mut self) -> Result<usize, EncodeError> {
        let c = u29::encode(DYNAMIC_TRAITS, &mut self.writer)?;
        Ok(c + self.string("")?)
    }

    fn inline(len: usize) -> Result<u32, EncodeError> {
        match u32::try_from(len) {
            Ok(l) if l <= u29::MAX >> 1 => Ok(l << 1 | 1),
            _ => Err(EncodeError::IntegerOverflow(len as u64)),
        }
    }

    fn reference(index: usize) -> Result<u32, EncodeError> {
        match u32::try_from(index) {
            Ok(i) if i <= u29::MAX >> 1 => Ok(i << 1),
            _ => Err(EncodeError::IntegerOverflow(index as u64)),
        }
    }

}
