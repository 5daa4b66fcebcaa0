use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, IntoDeserializer, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::de::Deserializer as _;
use amf3::{u29, Decoder, Value};
use std::borrow::Cow;
use std::io::Read;
use tracing::debug;

use crate::config::{DecoderConfig, UnknownFields};
use crate::error::{DeserializationError, Error, Result};

/// Decode a single value from the given bytes into `T`. All bytes have to be consumed.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> std::result::Result<T, DeserializationError> {
    let mut decoder = Decoder::new(bytes);
    let value = decoder.decode_value()?;
    let pos = decoder.position();
    if pos < bytes.len() {
        return Err(Error::Trailing.at(pos));
    }
    from_value(&value).map_err(|e| e.at(pos))
}

/// Decode the next value from the given reader into `T`, leaving any following bytes unread.
pub fn from_reader<R: Read, T: DeserializeOwned>(reader: R) -> std::result::Result<T, DeserializationError> {
    from_reader_with_config(reader, DecoderConfig::default())
}

pub fn from_reader_with_config<R: Read, T: DeserializeOwned>(reader: R, config: DecoderConfig) -> std::result::Result<T, DeserializationError> {
    let mut decoder = Decoder::new(reader);
    let value = decoder.decode_value()?;
    from_value_with_config(&value, config).map_err(|e| e.at(decoder.position()))
}

/// Binds an already decoded value to `T`. Composites shared within `value` are bound as
/// independent copies, a cycle fails with `Error::Cycle`.
pub fn from_value<T: DeserializeOwned>(value: &Value) -> Result<T> {
    from_value_with_config(value, DecoderConfig::default())
}

pub fn from_value_with_config<T: DeserializeOwned>(value: &Value, config: DecoderConfig) -> Result<T> {
    let mut state = State { config, active: Vec::new() };
    T::deserialize(Deserializer { value: value.clone(), state: &mut state })
}

/// Shared by all deserializers of one binding.
struct State {
    config: DecoderConfig,
    /// Composites currently being bound, innermost last
    active: Vec<Value>,
}

impl State {
    fn enter(&mut self, composite: &Value) -> Result<()> {
        if self.active.iter().any(|v| same(v, composite)) {
            return Err(Error::Cycle);
        }
        self.active.push(composite.clone());
        Ok(())
    }

    fn leave(&mut self) {
        self.active.pop();
    }
}

fn same(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Array(x), Value::Array(y)) => x.ptr_eq(y),
        (Value::Object(x), Value::Object(y)) => x.ptr_eq(y),
        _ => false,
    }
}

fn mismatch(expected: &'static str, found: &Value) -> Error {
    Error::TypeMismatch { expected, found: found.type_name() }
}

fn upper_first(s: &str) -> Cow<'_, str> {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => Cow::Owned(first.to_uppercase().chain(chars).collect()),
        _ => Cow::Borrowed(s),
    }
}

/// Finds the field a wire key binds to: the exact name first, then ignoring the case of the
/// first letter. Literal fields only bind to their exact name.
fn resolve_field(fields: &'static [&'static str], key: &str, literal: impl Fn(&'static str) -> bool) -> Option<&'static str> {
    fields.iter().copied().find(|f| *f == key).or_else(|| {
        let key = upper_first(key);
        fields.iter().copied().find(|f| !literal(f) && upper_first(f) == key)
    })
}

/// Deserializes a decoded `Value`, coercing it to whatever the visitor asks for where the
/// conversion is unambiguous.
struct Deserializer<'s> {
    value: Value,
    state: &'s mut State,
}

impl<'s> Deserializer<'s> {

    fn signed(&self, target: &'static str) -> Result<i64> {
        match &self.value {
            Value::Integer(i) => Ok(i64::from(*i)),
            Value::Double(d) => {
                let t = d.trunc();
                if t >= i64::MIN as f64 && t < i64::MAX as f64 {
                    Ok(t as i64)
                } else {
                    Err(Error::IntegerRange(t as i128, target))
                }
            },
            Value::String(s) => s.trim().parse::<i64>().map_err(|_| Error::NumericParse(s.clone(), target)),
            other => Err(mismatch(target, other)),
        }
    }

    /// Unsigned destinations see the raw bit pattern of a wire integer.
    fn unsigned(&self, target: &'static str) -> Result<u64> {
        match &self.value {
            Value::Integer(i) => Ok(u64::from(*i as u32 & u29::MAX)),
            Value::Double(d) => {
                let t = d.trunc();
                if t >= 0.0 && t < u64::MAX as f64 {
                    Ok(t as u64)
                } else {
                    Err(Error::IntegerRange(t as i128, target))
                }
            },
            Value::String(s) => s.trim().parse::<u64>().map_err(|_| Error::NumericParse(s.clone(), target)),
            other => Err(mismatch(target, other)),
        }
    }

    fn float(&self, target: &'static str) -> Result<f64> {
        match &self.value {
            Value::Integer(i) => Ok(f64::from(*i)),
            Value::Double(d) => Ok(*d),
            Value::String(s) => s.trim().parse::<f64>().map_err(|_| Error::NumericParse(s.clone(), target)),
            other => Err(mismatch(target, other)),
        }
    }

}

macro_rules! deserialize_signed {
    ($($method:ident => $visit:ident($t:ty),)*) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let v = self.signed(stringify!($t))?;
            visitor.$visit(<$t>::try_from(v).map_err(|_| Error::IntegerRange(i128::from(v), stringify!($t)))?)
        })*
    };
}

macro_rules! deserialize_unsigned {
    ($($method:ident => $visit:ident($t:ty),)*) => {
        $(fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
            let v = self.unsigned(stringify!($t))?;
            visitor.$visit(<$t>::try_from(v).map_err(|_| Error::IntegerRange(i128::from(v), stringify!($t)))?)
        })*
    };
}

impl<'de, 's> de::Deserializer<'de> for Deserializer<'s> {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null       => visitor.visit_unit(),
            Value::Bool(b)    => visitor.visit_bool(b),
            Value::Integer(i) => visitor.visit_i64(i64::from(i)),
            Value::Double(d)  => visitor.visit_f64(d),
            Value::String(s)  => visitor.visit_string(s),
            Value::Array(a)   => Deserializer { value: Value::Array(a), state: self.state }.deserialize_seq(visitor),
            Value::Object(o)  => Deserializer { value: Value::Object(o), state: self.state }.deserialize_map(visitor),
        }
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Bool(b) => visitor.visit_bool(b),
            ref other => Err(mismatch("bool", other)),
        }
    }

    deserialize_signed! {
        deserialize_i8 => visit_i8(i8),
        deserialize_i16 => visit_i16(i16),
        deserialize_i32 => visit_i32(i32),
        deserialize_i64 => visit_i64(i64),
    }

    deserialize_unsigned! {
        deserialize_u8 => visit_u8(u8),
        deserialize_u16 => visit_u16(u16),
        deserialize_u32 => visit_u32(u32),
        deserialize_u64 => visit_u64(u64),
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = self.float("f32")?;
        visitor.visit_f32(v as f32)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let v = self.float("f64")?;
        visitor.visit_f64(v)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        if let Value::String(s) = &self.value {
            let mut chars = s.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                return visitor.visit_char(c);
            }
        }
        Err(mismatch("char", &self.value))
    }

    fn deserialize_str<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_string<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::String(s) => visitor.visit_string(s),
            ref other => Err(mismatch("string", other)),
        }
    }

    fn deserialize_bytes<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_byte_buf(visitor)
    }

    fn deserialize_byte_buf<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let elements = match &self.value {
            Value::Array(a) => a.borrow().clone(),
            other => return Err(mismatch("bytes", other)),
        };
        let mut bytes = Vec::with_capacity(elements.len());
        for element in elements {
            let b = Deserializer { value: element, state: &mut *self.state }.unsigned("u8")?;
            bytes.push(u8::try_from(b).map_err(|_| Error::IntegerRange(i128::from(b), "u8"))?);
        }
        visitor.visit_byte_buf(bytes)
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_unit(),
            ref other => Err(mismatch("null", other)),
        }
    }

    fn deserialize_unit_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let state = self.state;
        match &self.value {
            Value::Array(a) => {
                state.enter(&self.value)?;
                let elements = a.borrow().clone();
                let result = visitor.visit_seq(SeqDeserializer::new(elements, &mut *state));
                state.leave();
                result
            },
            Value::Null => visitor.visit_seq(SeqDeserializer::new(Vec::new(), state)),
            other => Err(mismatch("array", other)),
        }
    }

    fn deserialize_tuple<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V: Visitor<'de>>(self, _name: &'static str, _len: usize, visitor: V) -> Result<V::Value> {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        let state = self.state;
        match &self.value {
            Value::Object(o) => {
                state.enter(&self.value)?;
                let entries = o.borrow().iter().map(|(k, v)| (k.clone(), v.clone())).collect();
                let result = visitor.visit_map(MapDeserializer::new(entries, &mut *state));
                state.leave();
                result
            },
            Value::Null => visitor.visit_map(MapDeserializer::new(Vec::new(), state)),
            other => Err(mismatch("object", other)),
        }
    }

    fn deserialize_struct<V: Visitor<'de>>(self, name: &'static str, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        let state = self.state;
        let object = match &self.value {
            Value::Object(o) => o,
            other => return Err(mismatch("object", other)),
        };
        let mut entries = Vec::with_capacity(object.len());
        for (key, value) in object.borrow().iter() {
            match resolve_field(fields, key, |f| state.config.is_literal(name, f)) {
                Some(field) => entries.push((field, value.clone())),
                None if state.config.unknown_fields == UnknownFields::Ignore => {
                    debug!(field = key.as_str(), record = name, "ignoring unknown field");
                },
                None => return Err(Error::UnknownField { field: key.clone(), record: name }),
            }
        }
        state.enter(&self.value)?;
        let result = visitor.visit_map(StructDeserializer::new(entries, &mut *state));
        state.leave();
        result
    }

    fn deserialize_enum<V: Visitor<'de>>(self, name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match &self.value {
            Value::String(s) => visitor.visit_enum(EnumDeserializer { name, variant: s.clone(), value: None, state: self.state }),
            Value::Object(o) if o.len() == 1 => {
                let (variant, value) = match o.borrow().iter().next() {
                    Some((k, v)) => (k.clone(), v.clone()),
                    None => return Err(mismatch("enum", &self.value)),
                };
                visitor.visit_enum(EnumDeserializer { name, variant, value: Some(value), state: self.state })
            },
            other => Err(mismatch("enum", other)),
        }
    }

    fn deserialize_identifier<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_string(visitor)
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_unit()
    }
}

struct SeqDeserializer<'a> {
    elements: std::vec::IntoIter<Value>,
    state: &'a mut State,
}

impl<'a> SeqDeserializer<'a> {
    fn new(elements: Vec<Value>, state: &'a mut State) -> Self {
        Self { elements: elements.into_iter(), state }
    }
}

impl<'de, 'a> SeqAccess<'de> for SeqDeserializer<'a> {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.elements.next() {
            Some(value) => seed.deserialize(Deserializer { value, state: &mut *self.state }).map(Some),
            None => Ok(None),
        }
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.elements.len())
    }
}

struct MapDeserializer<'a> {
    entries: std::vec::IntoIter<(String, Value)>,
    value: Option<Value>,
    state: &'a mut State,
}

impl<'a> MapDeserializer<'a> {
    fn new(entries: Vec<(String, Value)>, state: &'a mut State) -> Self {
        Self { entries: entries.into_iter(), value: None, state }
    }
}

impl<'de, 'a> MapAccess<'de> for MapDeserializer<'a> {
    type Error = Error;

    // keys go through the value deserializer so that they can be parsed into numeric key types
    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.entries.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(Deserializer { value: Value::String(key), state: &mut *self.state }).map(Some)
            },
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let value = self.value.take().unwrap_or(Value::Null);
        seed.deserialize(Deserializer { value, state: &mut *self.state })
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

struct StructDeserializer<'a> {
    entries: std::vec::IntoIter<(&'static str, Value)>,
    value: Option<Value>,
    state: &'a mut State,
}

impl<'a> StructDeserializer<'a> {
    fn new(entries: Vec<(&'static str, Value)>, state: &'a mut State) -> Self {
        Self { entries: entries.into_iter(), value: None, state }
    }
}

impl<'de, 'a> MapAccess<'de> for StructDeserializer<'a> {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.entries.next() {
            Some((field, value)) => {
                self.value = Some(value);
                seed.deserialize(field.into_deserializer()).map(Some)
            },
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        let value = self.value.take().unwrap_or(Value::Null);
        seed.deserialize(Deserializer { value, state: &mut *self.state })
    }

    #[inline]
    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// A unit variant arrives as a plain string, every other variant as an object with the variant
/// name as its only key.
struct EnumDeserializer<'a> {
    name: &'static str,
    variant: String,
    value: Option<Value>,
    state: &'a mut State,
}

impl<'de, 'a> EnumAccess<'de> for EnumDeserializer<'a> {
    type Error = Error;
    type Variant = Self;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let deserializer: de::value::StrDeserializer<'_, Error> = self.variant.as_str().into_deserializer();
        let variant = seed.deserialize(deserializer)?;
        Ok((variant, self))
    }
}

impl<'de, 'a> VariantAccess<'de> for EnumDeserializer<'a> {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            None | Some(Value::Null) => Ok(()),
            Some(ref other) => Err(mismatch("unit variant", other)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(Deserializer { value: self.value.unwrap_or(Value::Null), state: self.state })
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        de::Deserializer::deserialize_seq(Deserializer { value: self.value.unwrap_or(Value::Null), state: self.state }, visitor)
    }

    fn struct_variant<V: Visitor<'de>>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        let value = self.value.unwrap_or(Value::Null);
        de::Deserializer::deserialize_struct(Deserializer { value, state: self.state }, self.name, fields, visitor)
    }
}

#[cfg(test)]
mod tests {
    use super::{from_slice, from_value, from_value_with_config, resolve_field};
    use crate::config::{DecoderConfig, UnknownFields};
    use crate::error::Error;
    use amf3::{Object, Value};
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    #[allow(non_snake_case)]
    struct Abc {
        Uname: String,
        Uid: i32,
    }

    #[test]
    fn field_resolution() {
        const FIELDS: &[&str] = &["Uid", "uid", "Name"];
        let loose = |_: &str| false;
        assert_eq!(resolve_field(FIELDS, "uid", loose), Some("uid"));
        assert_eq!(resolve_field(FIELDS, "Uid", loose), Some("Uid"));
        assert_eq!(resolve_field(FIELDS, "name", loose), Some("Name"));
        assert_eq!(resolve_field(FIELDS, "NAME", loose), None);
        assert_eq!(resolve_field(FIELDS, "", loose), None);
        let literal = |f: &str| f == "Name";
        assert_eq!(resolve_field(FIELDS, "name", literal), None);
        assert_eq!(resolve_field(FIELDS, "Name", literal), Some("Name"));
        assert_eq!(resolve_field(FIELDS, "uid", literal), Some("uid"));
    }

    #[test]
    fn normalized_names() {
        let value = Value::object(vec![("uname", Value::from("jane")), ("uid", Value::from(3))]);
        assert_eq!(from_value::<Abc>(&value).unwrap(), Abc { Uname: "jane".into(), Uid: 3 });
    }

    #[test]
    fn unknown_fields() {
        let value = Value::object(vec![("uname", Value::from("jane")), ("uid", Value::from(3)), ("admin", Value::Bool(true))]);
        match from_value::<Abc>(&value) {
            Err(Error::UnknownField { field, record }) => {
                assert_eq!(field, "admin");
                assert_eq!(record, "Abc");
            },
            other => panic!("unexpected {:?}", other),
        }
        let config = DecoderConfig::default().with_unknown_fields(UnknownFields::Ignore);
        assert_eq!(from_value_with_config::<Abc>(&value, config).unwrap(), Abc { Uname: "jane".into(), Uid: 3 });
    }

    #[test]
    fn literal_fields() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Rec {
            #[serde(rename = "Str")]
            s: String,
        }
        let config = DecoderConfig::default().with_literal_field("Rec", "Str");
        let lower = Value::object(vec![("str", Value::from("x"))]);
        match from_value_with_config::<Rec>(&lower, config.clone()) {
            Err(Error::UnknownField { field, record }) => {
                assert_eq!(field, "str");
                assert_eq!(record, "Rec");
            },
            other => panic!("unexpected {:?}", other),
        }
        let exact = Value::object(vec![("Str", Value::from("x"))]);
        assert_eq!(from_value_with_config::<Rec>(&exact, config).unwrap(), Rec { s: "x".into() });
        assert_eq!(from_value::<Rec>(&lower).unwrap(), Rec { s: "x".into() });
    }

    #[test]
    fn coercions() {
        assert_eq!(from_value::<u8>(&Value::from(200)).unwrap(), 200);
        assert_eq!(from_value::<i64>(&Value::Double(-2.9)).unwrap(), -2);
        assert_eq!(from_value::<f32>(&Value::from(7)).unwrap(), 7.0);
        assert_eq!(from_value::<i64>(&Value::from("-9223372036854775808")).unwrap(), i64::MIN);
        assert_eq!(from_value::<u64>(&Value::from(" 42 ")).unwrap(), 42);
        assert_eq!(from_value::<f64>(&Value::from("1.25")).unwrap(), 1.25);
        assert_eq!(from_value::<u32>(&Value::Integer(-1)).unwrap(), 0x1fff_ffff);
        assert!(matches!(from_value::<i32>(&Value::from("x1")), Err(Error::NumericParse(s, "i32")) if s == "x1"));
        assert!(matches!(from_value::<i8>(&Value::from(300)), Err(Error::IntegerRange(300, "i8"))));
        assert!(matches!(from_value::<u8>(&Value::Double(-1.0)), Err(Error::IntegerRange(-1, "u8"))));
        assert!(matches!(from_value::<bool>(&Value::from(1)), Err(Error::TypeMismatch { expected: "bool", found: "integer" })));
        assert_eq!(from_value::<char>(&Value::from("x")).unwrap(), 'x');
        assert!(from_value::<char>(&Value::from("xy")).is_err());
    }

    #[test]
    fn null() {
        assert!(matches!(from_value::<i32>(&Value::Null), Err(Error::TypeMismatch { expected: "i32", found: "null" })));
        assert_eq!(from_value::<Option<i32>>(&Value::Null).unwrap(), None);
        assert_eq!(from_value::<Option<i32>>(&Value::from(1)).unwrap(), Some(1));
        assert_eq!(from_value::<Vec<String>>(&Value::Null).unwrap(), Vec::<String>::new());
        assert_eq!(from_value::<HashMap<String, i32>>(&Value::Null).unwrap(), HashMap::new());
        from_value::<()>(&Value::Null).unwrap();
    }

    #[test]
    fn numeric_map_keys() {
        let value = Value::object(vec![("1701", Value::from("Enterprise"))]);
        let map = from_value::<HashMap<u32, String>>(&value).unwrap();
        assert_eq!(map[&1701], "Enterprise");
    }

    #[test]
    fn cycles() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Node {
            next: Option<Box<Node>>,
        }
        let node = Object::new();
        node.insert("next", Value::Object(node.clone()));
        assert!(matches!(from_value::<Node>(&Value::Object(node.clone())), Err(Error::Cycle)));
        node.clear();
    }

    #[test]
    fn shared_subgraphs_are_copied() {
        let shared = Value::array(vec![Value::from(1), Value::from(2)]);
        let value = Value::array(vec![shared.clone(), shared]);
        assert_eq!(from_value::<Vec<Vec<u8>>>(&value).unwrap(), [[1, 2], [1, 2]]);
    }

    #[test]
    fn positions() {
        let err = from_slice::<i32>(&[0x04, 0x03, 0x01]).unwrap_err();
        assert!(matches!(err.kind(), Error::Trailing));
        assert_eq!(err.position(), 2);
        let err = from_slice::<String>(&[0x04, 0x03]).unwrap_err();
        assert!(matches!(err.kind(), Error::TypeMismatch { .. }));
        assert_eq!(err.position(), 2);
        let err = from_slice::<String>(&[0x09, 0x03, 0x01, 0x08]).unwrap_err();
        assert!(matches!(err.kind(), Error::Decode(_)));
        assert_eq!(err.position(), 4);
    }
}
