//! The atom of an AMF3 message is the `Value`.
//!
//! Arrays and objects are shared handles: cloning one yields a second handle to the same storage
//! instead of a deep copy. This is what lets a `Value` express the shared subgraphs and cycles
//! that AMF3 back-references describe. The encoder tells composites apart by the allocation behind
//! the handle, never by their content, so two equal but distinct arrays are written twice while
//! two handles to the same array are written once and referenced afterwards.
//!
//! Because handles are reference counted, a cycle keeps itself alive. Break it with
//! [`Object::clear`] or [`Array::clear`] once the graph is no longer needed.

use crate::u29;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::iter::FromIterator;
use std::rc::Rc;

/// The possible values according to the dynamic AMF3 data model. Both `undefined` and `null`
/// decode to `Value::Null`.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Signed 29 bit integer. Values outside of that range are promoted when encoded.
    Integer(i32),
    Double(f64),
    String(String),
    Array(Array),
    Object(Object),
}

/// Shared handle to a dense, ordered sequence of values.
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

/// Shared handle to a dynamic, insertion ordered mapping of string keys to values.
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<IndexMap<String, Value>>>);

impl Value {

    const PROTECTED_CHARS: &'static str = "\n\\$ ,:\"'()[]{}#";

    pub fn array<I: IntoIterator<Item = Value>>(values: I) -> Self {
        Value::Array(values.into_iter().collect())
    }

    pub fn object<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(entries: I) -> Self {
        Value::Object(entries.into_iter().collect())
    }

    /// Returns the name of the type. This is useful for error messages.
    pub fn type_name(&self) -> &'static str {
        match *self {
            Value::Null       => "null",
            Value::Bool(_)    => "bool",
            Value::Integer(_) => "integer",
            Value::Double(_)  => "double",
            Value::String(_)  => "string",
            Value::Array(_)   => "array",
            Value::Object(_)  => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match *self {
            Value::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Integers are widened.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Integer(i) => Some(i as f64),
            Value::Double(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Address of the storage behind a composite, `None` for scalars.
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(a) => Some(a.identity()),
            Value::Object(o) => Some(o.identity()),
            _ => None,
        }
    }

    fn quoted(s: &str) -> String {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n"))
    }

    fn key(k: &str) -> String {
        if k.is_empty() || k.chars().any(|c| c.is_whitespace() || Self::PROTECTED_CHARS.contains(c)) {
            Self::quoted(k)
        } else {
            k.to_string()
        }
    }

}

impl Array {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a handle to the element, which shares storage if it is a composite.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    pub fn push(&self, value: Value) {
        self.0.borrow_mut().push(value);
    }

    /// Removes all elements. Use this to break cycles.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn borrow(&self) -> Ref<'_, Vec<Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<Value>> {
        self.0.borrow_mut()
    }

    /// True if both handles point to the same storage.
    pub fn ptr_eq(&self, other: &Array) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    fn eq_with(&self, other: &Array, assumed: &mut HashSet<(usize, usize)>) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.identity(), other.identity());
        if !assumed.insert(pair) {
            return true;
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| eq(x, y, assumed))
    }

}

impl Object {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Returns a handle to the value, which shares storage if it is a composite.
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    /// Inserts or replaces the value for `key`, keeping the position of an existing key.
    pub fn insert<K: Into<String>>(&self, key: K, value: Value) -> Option<Value> {
        self.0.borrow_mut().insert(key.into(), value)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().shift_remove(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().keys().cloned().collect()
    }

    /// Removes all entries. Use this to break cycles.
    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn borrow(&self) -> Ref<'_, IndexMap<String, Value>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, IndexMap<String, Value>> {
        self.0.borrow_mut()
    }

    /// True if both handles point to the same storage.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    fn eq_with(&self, other: &Object, assumed: &mut HashSet<(usize, usize)>) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let pair = (self.identity(), other.identity());
        if !assumed.insert(pair) {
            return true;
        }
        let (a, b) = (self.0.borrow(), other.0.borrow());
        a.len() == b.len() && a.iter().all(|(k, x)| b.get(k).map_or(false, |y| eq(x, y, assumed)))
    }

}

// Structural equality. A pair of composites already under comparison is assumed equal, which
// makes comparing two cyclic graphs terminate.
fn eq(a: &Value, b: &Value, assumed: &mut HashSet<(usize, usize)>) -> bool {
    match (a, b) {
        (Value::Null, Value::Null)             => true,
        (Value::Bool(x), Value::Bool(y))       => x == y,
        (Value::Integer(x), Value::Integer(y)) => x == y,
        (Value::Double(x), Value::Double(y))   => x == y,
        (Value::String(x), Value::String(y))   => x == y,
        (Value::Array(x), Value::Array(y))     => x.eq_with(y, assumed),
        (Value::Object(x), Value::Object(y))   => x.eq_with(y, assumed),
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        eq(self, other, &mut HashSet::new())
    }
}

impl PartialEq for Array {
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, &mut HashSet::new())
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.eq_with(other, &mut HashSet::new())
    }
}

thread_local! {
    static VISITING: RefCell<Vec<usize>> = RefCell::new(Vec::new());
}

/// Marks a composite as being traversed on this thread for as long as it lives.
pub(crate) struct Visit;

impl Visit {
    pub(crate) fn enter(id: usize) -> Option<Visit> {
        VISITING.with(|v| {
            let mut v = v.borrow_mut();
            if v.contains(&id) {
                None
            } else {
                v.push(id);
                Some(Visit)
            }
        })
    }
}

impl Drop for Visit {
    fn drop(&mut self) {
        VISITING.with(|v| { v.borrow_mut().pop(); });
    }
}

const CYCLE: &str = "<cycle>";

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _visit = match Visit::enter(self.identity()) {
            Some(v) => v,
            None => return f.write_str(CYCLE),
        };
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _visit = match Visit::enter(self.identity()) {
            Some(v) => v,
            None => return f.write_str(CYCLE),
        };
        f.debug_map().entries(self.0.borrow().iter()).finish()
    }
}

fn indented<I: Iterator<Item = String>>(items: I) -> String {
    items.flat_map(|item| item.lines().map(|line| format!("  {}", line)).collect::<Vec<String>>())
        .collect::<Vec<String>>()
        .join("\n")
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _visit = match Visit::enter(self.identity()) {
            Some(v) => v,
            None => return f.write_str(CYCLE),
        };
        let inner = self.0.borrow();
        if inner.is_empty() {
            return f.write_str("[]");
        }
        write!(f, "[\n{}\n]", indented(inner.iter().map(|v| format!("{},", v))))
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let _visit = match Visit::enter(self.identity()) {
            Some(v) => v,
            None => return f.write_str(CYCLE),
        };
        let inner = self.0.borrow();
        if inner.is_empty() {
            return f.write_str("()");
        }
        write!(f, "(\n{}\n)", indented(inner.iter().map(|(k, v)| format!("{}: {},", Value::key(k), v))))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null        => f.write_str("null"),
            Value::Bool(true)  => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            Value::Integer(v)  => write!(f, "{}", v),
            Value::Double(v)   => write!(f, "${}", v),
            Value::String(v)   => f.write_str(&Self::quoted(v)),
            Value::Array(v)    => fmt::Display::fmt(v, f),
            Value::Object(v)   => fmt::Display::fmt(v, f),
        }
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Array(Rc::new(RefCell::new(iter.into_iter().collect())))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Object(Rc::new(RefCell::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())))
    }
}

impl From<Vec<Value>> for Array {
    fn from(v: Vec<Value>) -> Self {
        Array(Rc::new(RefCell::new(v)))
    }
}

impl From<IndexMap<String, Value>> for Object {
    fn from(v: IndexMap<String, Value>) -> Self {
        Object(Rc::new(RefCell::new(v)))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

// Integer conversions mirror the encoder's promotion: what fits the signed 29 bit range becomes
// an integer, what fits 32 bits becomes a double and everything else its decimal string. Unlike
// on the wire, unsigned values above `u29::MAX_SIGNED` become doubles here, because an integer
// holding them would read back as negative.

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        if (u29::MIN_SIGNED as i64..=u29::MAX_SIGNED as i64).contains(&v) {
            Value::Integer(v as i32)
        } else if (i32::MIN as i64..=i32::MAX as i64).contains(&v) {
            Value::Double(v as f64)
        } else {
            Value::String(v.to_string())
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        if v <= u29::MAX_SIGNED as u64 {
            Value::Integer(v as i32)
        } else if v <= u32::MAX as u64 {
            Value::Double(v as f64)
        } else {
            Value::String(v.to_string())
        }
    }
}

macro_rules! from_integer {
    ($($t:ty => $via:ty),*) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::from(v as $via)
            }
        })*
    };
}

from_integer!(i8 => i64, i16 => i64, i32 => i64, u8 => u64, u16 => u64, u32 => u64);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Double(v as f64)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v.into())
    }
}

impl From<Array> for Value {
    fn from(v: Array) -> Self {
        Value::Array(v)
    }
}

impl From<Object> for Value {
    fn from(v: Object) -> Self {
        Value::Object(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> Value {
        Value::object(vec![
            ("name", Value::from("Jane Doe")),
            ("age", Value::from(42)),
            ("true or false", Value::Bool(false)),
        ])
    }

    #[test]
    fn promotion() {
        assert_eq!(Value::from(3i64), Value::Integer(3));
        assert_eq!(Value::from(-0x1000_0000i64), Value::Integer(-0x1000_0000));
        assert_eq!(Value::from(0x1000_0000i64), Value::Double(268435456.0));
        assert_eq!(Value::from(-0x1000_0001i64), Value::Double(-268435457.0));
        assert_eq!(Value::from(i64::from(i32::MIN) - 1), Value::String("-2147483649".into()));
        assert_eq!(Value::from(0x2000_0001u32), Value::Double(536870913.0));
        assert_eq!(Value::from(0x1_0000_0000u64), Value::String("4294967296".into()));
        assert_eq!(Value::from(7u8), Value::Integer(7));
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn accessors() {
        let value = person();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 3);
        assert_eq!(object.keys(), ["name", "age", "true or false"]);
        assert_eq!(object.get("age").and_then(|v| v.as_i32()), Some(42));
        assert_eq!(object.get("age").and_then(|v| v.as_f64()), Some(42.0));
        assert_eq!(object.get("name").unwrap().as_str(), Some("Jane Doe"));
        assert!(object.get("missing").is_none());
        assert_eq!(value.type_name(), "object");
        assert!(Value::Null.is_null());
    }

    #[test]
    fn handles_share_storage() {
        let array = Array::new();
        let alias = array.clone();
        alias.push(Value::from(1));
        assert_eq!(array.len(), 1);
        assert!(array.ptr_eq(&alias));
        assert!(!array.ptr_eq(&Array::from(vec![Value::from(1)])));
        assert_eq!(array, Array::from(vec![Value::from(1)]));
    }

    #[test]
    fn object_equality_ignores_order() {
        let a = Value::object(vec![("a", Value::from(1)), ("b", Value::from(2))]);
        let b = Value::object(vec![("b", Value::from(2)), ("a", Value::from(1))]);
        assert_eq!(a, b);
        assert_ne!(a, Value::object(vec![("a", Value::from(1))]));
        assert_ne!(Value::Integer(1), Value::Double(1.0));
    }

    #[test]
    fn cycles() {
        let a = Object::new();
        a.insert("self", Value::Object(a.clone()));
        let b = Object::new();
        let c = Object::new();
        b.insert("self", Value::Object(c.clone()));
        c.insert("self", Value::Object(b.clone()));
        assert_eq!(Value::Object(a.clone()), Value::Object(b.clone()));
        assert_eq!(format!("{:?}", a), "{\"self\": Object(<cycle>)}");
        assert_eq!(a.to_string(), "(\n  self: <cycle>,\n)");
        for o in [a, b, c] {
            o.clear();
        }
    }

    #[test]
    fn display() {
        assert_eq!(person().to_string(), "(\n  name: \"Jane Doe\",\n  age: 42,\n  \"true or false\": false,\n)");
        let value = Value::array(vec![Value::Double(1.5), Value::array(vec![Value::Null]), Value::array(vec![]), Value::from("a\"b\nc")]);
        assert_eq!(value.to_string(), "[\n  $1.5,\n  [\n    null,\n  ],\n  [],\n  \"a\\\"b\\nc\",\n]");
        assert_eq!(Value::object(Vec::<(String, Value)>::new()).to_string(), "()");
        let keys = Value::object(vec![("a\tb", Value::Null), ("c\rd", Value::Null)]);
        assert_eq!(keys.to_string(), "(\n  \"a\tb\": null,\n  \"c\rd\": null,\n)");
    }

    #[test]
    fn shared_subgraphs_compare_once() {
        // every level refers to the next one twice, unfolding into 2^40 paths
        fn ladder(depth: usize) -> Value {
            let mut value = Value::Null;
            for _ in 0..depth {
                value = Value::array(vec![value.clone(), value]);
            }
            value
        }
        assert_eq!(ladder(40), ladder(40));
        assert_ne!(ladder(40), ladder(39));
    }
}
