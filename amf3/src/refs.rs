//! AMF3 keeps two reference tables per stream, one for strings and one for composites. Every
//! entry gets the next free index of its table in the order of first appearance, and a later
//! occurrence is written as that index instead of the full value. Encoder and decoder have to
//! replay the exact same sequence of registrations, so both sides register a composite when it
//! is *opened*, before any of its children. Otherwise a child pointing back at its parent could
//! not be resolved.
//!
//! The empty string is never registered: it doubles as the terminator of an object's key list.

use crate::error::DecodeError;
use crate::value::Value;
use std::collections::HashMap;
use tracing::trace;

/// Outcome of opening a composite for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Seen before at this index, write a back-reference.
    Known(usize),
    /// Registered at this index just now, write the full body.
    New(usize),
}

/// Encoder side string table.
#[derive(Debug, Default)]
pub struct StringTable {
    index: HashMap<String, usize>,
}

impl StringTable {

    /// Returns the index of a string seen earlier in this session. Otherwise the string gets
    /// registered, unless it is empty, and `None` signals that it must be written inline.
    pub fn intern(&mut self, s: &str) -> Option<usize> {
        if s.is_empty() {
            return None;
        }
        if let Some(&i) = self.index.get(s) {
            return Some(i);
        }
        let i = self.index.len();
        trace!(index = i, len = s.len(), "string registered");
        self.index.insert(s.to_string(), i);
        None
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn clear(&mut self) {
        self.index.clear();
    }

}

/// Encoder side object table, keyed by storage identity.
#[derive(Debug, Default)]
pub struct ObjectTable {
    index: HashMap<usize, usize>,
    next: usize,
    // Keeps every registered composite alive so its address cannot be handed out to a different
    // value while the session lasts.
    pinned: Vec<Value>,
}

impl ObjectTable {

    /// Looks up a composite by identity and registers it if it hasn't been seen. Scalars take no
    /// slot and always come back as `Slot::New` with the index they would have had.
    pub fn open(&mut self, value: &Value) -> Slot {
        let id = match value.identity() {
            Some(id) => id,
            None => return Slot::New(self.next),
        };
        if let Some(&i) = self.index.get(&id) {
            return Slot::Known(i);
        }
        let i = self.open_anonymous();
        self.index.insert(id, i);
        self.pinned.push(value.clone());
        Slot::New(i)
    }

    /// Takes a slot for a composite that has no identity and can never be referenced again,
    /// keeping the indices in step with the decoder.
    pub fn open_anonymous(&mut self) -> usize {
        let i = self.next;
        self.next += 1;
        trace!(index = i, "composite registered");
        i
    }

    pub fn len(&self) -> usize {
        self.next
    }

    pub fn is_empty(&self) -> bool {
        self.next == 0
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.pinned.clear();
        self.next = 0;
    }

}

/// Decoder side string table.
#[derive(Debug, Default)]
pub struct StringCache {
    strings: Vec<String>,
}

impl StringCache {

    /// Registers a string that appeared inline. The empty string is ignored.
    pub fn insert(&mut self, s: &str) {
        if !s.is_empty() {
            trace!(index = self.strings.len(), len = s.len(), "string registered");
            self.strings.push(s.to_string());
        }
    }

    pub fn resolve(&self, index: usize) -> Result<&str, DecodeError> {
        self.strings.get(index).map(String::as_str).ok_or(DecodeError::UnknownStringRef(index))
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn clear(&mut self) {
        self.strings.clear();
    }

}

/// Decoder side object table.
#[derive(Debug, Default)]
pub struct ObjectCache {
    objects: Vec<Value>,
}

impl ObjectCache {

    /// Registers a freshly opened composite before its children get decoded and returns its index.
    pub fn register(&mut self, value: Value) -> usize {
        let i = self.objects.len();
        trace!(index = i, kind = value.type_name(), "composite registered");
        self.objects.push(value);
        i
    }

    /// Returns a handle sharing storage with the registered composite.
    pub fn resolve(&self, index: usize) -> Result<Value, DecodeError> {
        self.objects.get(index).cloned().ok_or(DecodeError::UnknownObjectRef(index))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Array, Object};

    #[test]
    fn strings_in_order_of_appearance() {
        let mut table = StringTable::default();
        assert_eq!(table.intern("a"), None);
        assert_eq!(table.intern("b"), None);
        assert_eq!(table.intern("a"), Some(0));
        assert_eq!(table.intern("b"), Some(1));
        assert_eq!(table.len(), 2);
        table.clear();
        assert_eq!(table.intern("b"), None);
    }

    #[test]
    fn empty_string_never_registered() {
        let mut table = StringTable::default();
        assert_eq!(table.intern(""), None);
        assert_eq!(table.intern(""), None);
        assert!(table.is_empty());

        let mut cache = StringCache::default();
        cache.insert("");
        cache.insert("x");
        assert_eq!(cache.resolve(0).unwrap(), "x");
        assert!(matches!(cache.resolve(1), Err(DecodeError::UnknownStringRef(1))));
    }

    #[test]
    fn objects_by_identity() {
        let mut table = ObjectTable::default();
        let a = Value::Array(Array::new());
        let b = Value::Array(Array::new());
        let o = Value::Object(Object::new());
        assert_eq!(table.open(&a), Slot::New(0));
        assert_eq!(table.open(&b), Slot::New(1));
        assert_eq!(table.open_anonymous(), 2);
        assert_eq!(table.open(&o), Slot::New(3));
        assert_eq!(table.open(&a.clone()), Slot::Known(0));
        assert_eq!(table.open(&o), Slot::Known(3));
        assert_eq!(table.open(&Value::Null), Slot::New(4));
        assert_eq!(table.len(), 4);
        table.clear();
        assert_eq!(table.open(&o), Slot::New(0));
    }

    #[test]
    fn cache_resolves_shared_handles() {
        let mut cache = ObjectCache::default();
        let array = Array::new();
        assert_eq!(cache.register(Value::Array(array.clone())), 0);
        match cache.resolve(0).unwrap() {
            Value::Array(resolved) => assert!(resolved.ptr_eq(&array)),
            other => panic!("resolved {:?}", other),
        }
        assert!(matches!(cache.resolve(1), Err(DecodeError::UnknownObjectRef(1))));
    }
}
