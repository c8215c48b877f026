use std::collections::HashMap;
use std::fmt;
use std::ops::{Index, IndexMut};

/// Ordered sequence of values.
pub type Array = Vec<Value>;

/// String-keyed map of values. Iteration order is unspecified.
pub type Object = HashMap<String, Value>;

static NULL: Value = Value::Null;

/// A self-describing value: the unit of data exchanged between devices.
///
/// Children of `Array` and `Object` are owned by their parent, so a tree is
/// always acyclic and `clone()` yields a fully independent deep copy.
///
/// `Null` doubles as the absent value: appending to it or indexing it as an
/// array turns it into an empty array in place, and indexing it by key turns
/// it into an empty object. Any other access against the wrong variant is a
/// caller bug and panics.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Array(Array),
    Object(Object),
}

/// Variant tag of a [`Value`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    String,
    Bytes,
    Array,
    Object,
}

impl ValueKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bytes => "bytes",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[track_caller]
fn wrong_variant(expected: ValueKind, found: ValueKind) -> ! {
    panic!("expected {expected} value, found {found}")
}

impl Value {
    /// An empty array.
    pub fn array() -> Self {
        Value::Array(Array::new())
    }

    /// An empty object.
    pub fn object() -> Self {
        Value::Object(Object::new())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, Value::Bytes(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// # Panics
    ///
    /// Panics if the value is not a `Bool`.
    #[track_caller]
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            other => wrong_variant(ValueKind::Bool, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not an `Int`.
    #[track_caller]
    pub fn as_int(&self) -> i64 {
        match self {
            Value::Int(i) => *i,
            other => wrong_variant(ValueKind::Int, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not a `Float`.
    #[track_caller]
    pub fn as_float(&self) -> f64 {
        match self {
            Value::Float(f) => *f,
            other => wrong_variant(ValueKind::Float, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not a `String`.
    #[track_caller]
    pub fn as_str(&self) -> &str {
        match self {
            Value::String(s) => s,
            other => wrong_variant(ValueKind::String, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not `Bytes`.
    #[track_caller]
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Bytes(b) => b,
            other => wrong_variant(ValueKind::Bytes, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not an `Array`.
    #[track_caller]
    pub fn as_array(&self) -> &Array {
        match self {
            Value::Array(items) => items,
            other => wrong_variant(ValueKind::Array, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not an `Array`.
    #[track_caller]
    pub fn as_array_mut(&mut self) -> &mut Array {
        match self {
            Value::Array(items) => items,
            other => wrong_variant(ValueKind::Array, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not an `Object`.
    #[track_caller]
    pub fn as_object(&self) -> &Object {
        match self {
            Value::Object(map) => map,
            other => wrong_variant(ValueKind::Object, other.kind()),
        }
    }

    /// # Panics
    ///
    /// Panics if the value is not an `Object`.
    #[track_caller]
    pub fn as_object_mut(&mut self) -> &mut Object {
        match self {
            Value::Object(map) => map,
            other => wrong_variant(ValueKind::Object, other.kind()),
        }
    }

    /// Number of elements for containers, characters for strings, 0 otherwise.
    pub fn size(&self) -> usize {
        match self {
            Value::String(s) => s.chars().count(),
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Bytes(_) => 0,
        }
    }

    /// Append to an array, promoting `Null` to an empty array first.
    ///
    /// # Panics
    ///
    /// Panics if the value is neither `Null` nor an `Array`.
    #[track_caller]
    pub fn add(&mut self, value: impl Into<Value>) {
        self.promote_to_array().push(value.into());
    }

    /// Look up a key. Returns `None` for missing keys and for non-objects.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self {
            Value::Object(map) => map.get_mut(key),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a member, promoting `Null` to an empty object first.
    ///
    /// Returns the previous value stored under `key`, if any.
    ///
    /// # Panics
    ///
    /// Panics if the value is neither `Null` nor an `Object`.
    #[track_caller]
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.promote_to_object().insert(key.into(), value.into())
    }

    #[track_caller]
    fn promote_to_array(&mut self) -> &mut Array {
        if self.is_null() {
            *self = Value::array();
        }
        match self {
            Value::Array(items) => items,
            other => wrong_variant(ValueKind::Array, other.kind()),
        }
    }

    #[track_caller]
    fn promote_to_object(&mut self) -> &mut Object {
        if self.is_null() {
            *self = Value::object();
        }
        match self {
            Value::Object(map) => map,
            other => wrong_variant(ValueKind::Object, other.kind()),
        }
    }
}

impl Index<usize> for Value {
    type Output = Value;

    #[track_caller]
    fn index(&self, index: usize) -> &Value {
        &self.as_array()[index]
    }
}

/// Mutable array access. `Null` becomes an empty array, and an index past
/// the end grows the array with `Null` entries.
impl IndexMut<usize> for Value {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut Value {
        let items = self.promote_to_array();
        if index >= items.len() {
            items.resize(index + 1, Value::Null);
        }
        &mut items[index]
    }
}

/// Member access. Missing keys (and members of `Null`) read as `Null`.
impl Index<&str> for Value {
    type Output = Value;

    #[track_caller]
    fn index(&self, key: &str) -> &Value {
        match self {
            Value::Object(map) => map.get(key).unwrap_or(&NULL),
            Value::Null => &NULL,
            other => wrong_variant(ValueKind::Object, other.kind()),
        }
    }
}

impl IndexMut<&str> for Value {
    #[track_caller]
    fn index_mut(&mut self, key: &str) -> &mut Value {
        self.promote_to_object().entry(key.to_owned()).or_default()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json(false, 0))
    }
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
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

impl FromIterator<Value> for Value {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Value::Array(iter.into_iter().collect())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}
