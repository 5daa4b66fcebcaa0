use crate::error::{DecodeError, DecoderError};
use crate::marker::{Marker, DYNAMIC_TRAITS};
use crate::refs::{ObjectCache, StringCache};
use crate::u29;
use crate::value::{Array, Object, Value};
use std::convert::TryFrom;
use std::io::{self, Read};
use tracing::{debug, trace};

/// Composites may nest this deep before decoding is aborted, unless changed with
/// [`Decoder::with_max_depth`].
pub const MAX_DEPTH: usize = 64;

/// Used to decode AMF3 values. The decoder owns the string and object tables of one session, so
/// consecutive values read through the same instance may reference each other. Back-references
/// to composites resolve to handles sharing storage with the referenced value, which reproduces
/// shared subgraphs and cycles of the encoded graph.
pub struct Decoder<R: Read> {
    reader: Counting<R>,
    strings: StringCache,
    objects: ObjectCache,
    depth: usize,
    max_depth: usize,
}

impl<R: Read> Decoder<R> {

    /// Decode a single value from the given reader within a session of its own. Returns the
    /// value and the number of consumed bytes.
    pub fn decode(reader: R) -> Result<(Value, usize), DecoderError> {
        let mut decoder = Self::new(reader);
        let value = decoder.decode_value()?;
        Ok((value, decoder.position()))
    }

    pub fn new(reader: R) -> Self {
        Self {
            reader: Counting { inner: reader, count: 0 },
            strings: StringCache::default(),
            objects: ObjectCache::default(),
            depth: 0,
            max_depth: MAX_DEPTH,
        }
    }

    /// Allows composites to nest `max_depth` levels deep. Every level costs stack space, so keep
    /// this bounded for untrusted input.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Decodes the next value of the current session.
    pub fn decode_value(&mut self) -> Result<Value, DecoderError> {
        self.value().map_err(|e| {
            self.depth = 0;
            e.at(self.reader.count)
        })
    }

    /// Number of bytes consumed so far.
    pub fn position(&self) -> usize {
        self.reader.count
    }

    /// Forgets all strings and composites read so far. The next value starts a new session.
    pub fn reset(&mut self) {
        debug!(strings = self.strings.len(), objects = self.objects.len(), "decoder session reset");
        self.strings.clear();
        self.objects.clear();
    }

    pub fn into_inner(self) -> R {
        self.reader.inner
    }

    fn value(&mut self) -> Result<Value, DecodeError> {
        let byte = self.byte()?;
        let marker = Marker::try_from(byte).map_err(DecodeError::UnsupportedMarker)?;
        if !marker.is_supported() {
            trace!(marker = marker.name(), "unsupported marker");
            return Err(DecodeError::UnsupportedMarker(byte));
        }
        match marker {
            Marker::Undefined | Marker::Null => Ok(Value::Null),
            Marker::False   => Ok(Value::Bool(false)),
            Marker::True    => Ok(Value::Bool(true)),
            Marker::Integer => Ok(Value::Integer(u29::to_i32(self.u29()?))),
            Marker::Double  => {
                let mut buf = [0u8; 8];
                self.reader.read_exact(&mut buf)?;
                Ok(Value::Double(f64::from_be_bytes(buf)))
            },
            Marker::String  => Ok(Value::String(self.string()?)),
            Marker::Array   => self.array(),
            Marker::Object  => self.object(),
            _ => Err(DecodeError::UnsupportedMarker(byte)),
        }
    }

    fn array(&mut self) -> Result<Value, DecodeError> {
        let header = self.u29()?;
        if header & 1 == 0 {
            return self.reference(header);
        }
        if !self.string()?.is_empty() {
            return Err(DecodeError::Malformed("associative array members are not supported"));
        }
        let array = Array::new();
        self.enter()?;
        self.objects.register(Value::Array(array.clone()));
        for _ in 0..header >> 1 {
            let element = self.value()?;
            array.push(element);
        }
        self.depth -= 1;
        Ok(Value::Array(array))
    }

    fn object(&mut self) -> Result<Value, DecodeError> {
        let header = self.u29()?;
        if header & 1 == 0 {
            return self.reference(header);
        }
        if header != DYNAMIC_TRAITS {
            return Err(DecodeError::Malformed("only anonymous dynamic objects are supported"));
        }
        if !self.string()?.is_empty() {
            return Err(DecodeError::Malformed("typed objects are not supported"));
        }
        let object = Object::new();
        self.enter()?;
        self.objects.register(Value::Object(object.clone()));
        loop {
            let key = self.string()?;
            if key.is_empty() {
                break;
            }
            let value = self.value()?;
            object.insert(key, value);
        }
        self.depth -= 1;
        Ok(Value::Object(object))
    }

    fn reference(&mut self, header: u32) -> Result<Value, DecodeError> {
        let index = (header >> 1) as usize;
        trace!(index, "object back-reference");
        self.objects.resolve(index)
    }

    fn string(&mut self) -> Result<String, DecodeError> {
        let header = self.u29()?;
        let len = (header >> 1) as usize;
        if header & 1 == 0 {
            trace!(index = len, "string back-reference");
            return Ok(self.strings.resolve(len)?.to_string());
        }
        let mut buf = Vec::new();
        // bounded by the bytes actually available instead of the announced length
        (&mut self.reader).take(len as u64).read_to_end(&mut buf)?;
        if buf.len() < len {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "string ends early").into());
        }
        let s = String::from_utf8(buf)?;
        self.strings.insert(&s);
        Ok(s)
    }

    fn enter(&mut self) -> Result<(), DecodeError> {
        if self.depth >= self.max_depth {
            return Err(DecodeError::NestingTooDeep(self.max_depth));
        }
        self.depth += 1;
        Ok(())
    }

    fn u29(&mut self) -> Result<u32, DecodeError> {
        u29::decode(&mut self.reader).map(|(v, _)| v)
    }

    fn byte(&mut self) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.reader.read_exact(&mut buf)?;
        Ok(buf[0])
    }

}

/// Keeps track of the stream position for error reports.
struct Counting<R> {
    inner: R,
    count: usize,
}

impl<R: Read> Read for Counting<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let c = self.inner.read(buf)?;
        self.count += c;
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::{Decoder, MAX_DEPTH};
    use crate::encoder::Encoder;
    use crate::error::DecodeError;
    use crate::value::{Object, Value};
    use proptest::prelude::*;

    fn decode(buf: &[u8]) -> Value {
        let (value, c) = Decoder::decode(buf).unwrap();
        assert_eq!(c, buf.len());
        value
    }

    fn error(buf: &[u8]) -> DecodeError {
        Decoder::decode(buf).unwrap_err().into_inner()
    }

    fn assert_roundtrip(value: Value) {
        let mut buf = Vec::new();
        Encoder::encode(&value, &mut buf).unwrap();
        assert_eq!(decode(&buf), value);
    }

    #[test]
    fn scalars() {
        assert_eq!(decode(&[0x00]), Value::Null);
        assert_eq!(decode(&[0x01]), Value::Null);
        assert_eq!(decode(&[0x02]), Value::Bool(false));
        assert_eq!(decode(&[0x03]), Value::Bool(true));
        assert_eq!(decode(&[0x04, 0x03]), Value::Integer(3));
        assert_eq!(decode(&[0x04, 0xff, 0xff, 0xff, 0xff]), Value::Integer(-1));
        assert_eq!(decode(&[0x05, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]), Value::Double(1.5));
        assert_eq!(decode(&[0x06, 0x07, b'a', b'b', b'c']), Value::from("abc"));
    }

    #[test]
    fn composites() {
        assert_roundtrip(Value::array(vec![]));
        assert_roundtrip(Value::object(Vec::<(String, Value)>::new()));
        assert_roundtrip(Value::object(vec![
            ("name", Value::from("Jane Doe")),
            ("tags", Value::array(vec![Value::from("a"), Value::from("name"), Value::from("")])),
            ("nested", Value::object(vec![("name", Value::Double(-0.25)), ("ok", Value::Bool(true))])),
            ("nothing", Value::Null),
        ]));
    }

    #[test]
    fn empty_strings_stay_apart() {
        let value = decode(&[0x09, 0x05, 0x01, 0x06, 0x01, 0x06, 0x01]);
        assert_eq!(value, Value::array(vec![Value::from(""), Value::from("")]));
    }

    #[test]
    fn shared_object() {
        let value = decode(&[0x09, 0x05, 0x01, 0x0a, 0x0b, 0x01, 0x03, b'a', 0x01, 0x01, 0x0a, 0x02]);
        let array = value.as_array().unwrap();
        let (first, second) = (array.get(0).unwrap(), array.get(1).unwrap());
        assert!(first.as_object().unwrap().ptr_eq(second.as_object().unwrap()));
        assert_eq!(first, Value::object(vec![("a", Value::Null)]));
    }

    #[test]
    fn cycle() {
        let value = decode(&[0x0a, 0x0b, 0x01, 0x09, b's', b'e', b'l', b'f', 0x0a, 0x00, 0x01]);
        let object = value.as_object().unwrap();
        let inner = object.get("self").unwrap();
        assert!(inner.as_object().unwrap().ptr_eq(object));
        object.clear();
    }

    #[test]
    fn cycle_roundtrip() {
        let object = Object::new();
        let array = Value::array(vec![Value::Object(object.clone()), Value::from(1)]);
        object.insert("items", array.clone());
        object.insert("me", Value::Object(object.clone()));
        let mut buf = Vec::new();
        Encoder::encode(&array, &mut buf).unwrap();
        let decoded = decode(&buf);
        assert_eq!(decoded, array);
        let root = decoded.as_array().unwrap();
        let child = root.get(0).unwrap();
        let back = child.as_object().unwrap().get("items").unwrap();
        assert!(back.as_array().unwrap().ptr_eq(root));
        object.clear();
        root.clear();
    }

    #[test]
    fn sessions() {
        let mut encoder = Encoder::new(Vec::new());
        encoder.encode_str("hello").unwrap();
        encoder.encode_str("hello").unwrap();
        let buf = encoder.into_inner();
        let mut decoder = Decoder::new(&buf[..]);
        assert_eq!(decoder.decode_value().unwrap(), Value::from("hello"));
        assert_eq!(decoder.decode_value().unwrap(), Value::from("hello"));
        assert_eq!(decoder.position(), buf.len());

        let mut decoder = Decoder::new(&buf[..]);
        decoder.decode_value().unwrap();
        decoder.reset();
        assert!(matches!(decoder.decode_value().unwrap_err().into_inner(), DecodeError::UnknownStringRef(0)));
    }

    #[test]
    fn errors() {
        assert!(matches!(error(&[0x08]), DecodeError::UnsupportedMarker(0x08)));
        assert!(matches!(error(&[0x0c]), DecodeError::UnsupportedMarker(0x0c)));
        assert!(matches!(error(&[0x42]), DecodeError::UnsupportedMarker(0x42)));
        assert!(matches!(error(&[0x06, 0x02]), DecodeError::UnknownStringRef(1)));
        assert!(matches!(error(&[0x0a, 0x00]), DecodeError::UnknownObjectRef(0)));
        assert!(matches!(error(&[0x0a, 0x03, 0x01]), DecodeError::Malformed(_)));
        assert!(matches!(error(&[0x0a, 0x0b, 0x03, b'A', 0x01]), DecodeError::Malformed(_)));
        assert!(matches!(error(&[0x09, 0x01, 0x03, b'k', 0x01, 0x01]), DecodeError::Malformed(_)));
        assert!(matches!(error(&[0x06, 0x05, 0xc3, 0x28]), DecodeError::Utf8(_)));
        assert!(error(&[0x06, 0x07, b'a']).is_eof());
        assert!(error(&[0x05, 0x00]).is_eof());
        assert!(error(&[]).is_eof());
    }

    #[test]
    fn error_position() {
        let err = Decoder::decode(&[0x09, 0x03, 0x01, 0x08][..]).unwrap_err();
        assert_eq!(err.position(), 4);
        assert!(matches!(err.kind(), DecodeError::UnsupportedMarker(0x08)));
    }

    #[test]
    fn nesting_limit() {
        let deep = vec![0x09, 0x03, 0x01].repeat(MAX_DEPTH + 1);
        assert!(matches!(error(&deep), DecodeError::NestingTooDeep(MAX_DEPTH)));
        let mut fine = vec![0x09, 0x03, 0x01].repeat(MAX_DEPTH - 1);
        fine.push(0x01);
        assert!(Decoder::decode(&fine[..]).is_ok());

        let mut deeper = vec![0x09, 0x03, 0x01].repeat(200);
        deeper.push(0x01);
        let mut decoder = Decoder::new(&deeper[..]).with_max_depth(256);
        assert!(decoder.decode_value().is_ok());
        assert_eq!(decoder.position(), deeper.len());
        let err = Decoder::new(&deeper[..]).with_max_depth(100).decode_value().unwrap_err();
        assert!(matches!(err.kind(), DecodeError::NestingTooDeep(100)));
    }

    #[test]
    fn oversized_length_does_not_allocate() {
        assert!(error(&[0x06, 0xbf, 0xff, 0xff, 0xff, b'a']).is_eof());
        assert!(error(&[0x09, 0xbf, 0xff, 0xff, 0xff, 0x01]).is_eof());
    }

    fn scalar() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            (crate::u29::MIN_SIGNED..=crate::u29::MAX_SIGNED).prop_map(Value::Integer),
            any::<f64>().prop_filter("NaN never equals itself", |f| !f.is_nan()).prop_map(Value::Double),
            ".*".prop_map(Value::String),
        ]
    }

    proptest! {
        #[test]
        fn scalar_roundtrip(value in scalar()) {
            let mut buf = Vec::new();
            Encoder::encode(&value, &mut buf).unwrap();
            prop_assert_eq!(Decoder::decode(&buf[..]).unwrap(), (value, buf.len()));
        }

        #[test]
        fn nested_roundtrip(values in prop::collection::vec(scalar(), 0..16), keys in prop::collection::vec("[a-z]{1,4}", 0..16)) {
            let object = Value::object(keys.into_iter().zip(values.iter().cloned()));
            let value = Value::array(vec![object.clone(), Value::array(values), object]);
            let mut buf = Vec::new();
            Encoder::encode(&value, &mut buf).unwrap();
            prop_assert_eq!(Decoder::decode(&buf[..]).unwrap().0, value);
        }
    }
}
