//! rekey core types: container keys, selectors, options and errors.
//!
//! Records are plain `serde_json::Value`s. Everything here is shared by the
//! projector crate and the CLI; nothing in this crate walks a sequence.

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod options;
pub mod record;
pub mod selector;

pub use options::{FieldPolicy, ProjectOptions};
pub use selector::{KeySelector, ValueSelector};

/// Named fields of a record, in insertion order.
pub type Fields = serde_json::Map<String, Value>;

pub mod prelude {
    pub use super::{
        FieldPolicy, Fields, Key, KeySelector, ProjectError, ProjectOptions, ProjectResult,
        ValueSelector,
    };
}

/// Key of a keyed container.
///
/// Only scalars are key-eligible. Integers that fit an `i64` are `Int`; any
/// other JSON number (floats, unsigned values above `i64::MAX`) is kept as
/// `Num` with its exact form, compared and hashed by its canonical text.
/// A number key never equals a string key with the same text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    Null,
    Bool(bool),
    Int(i64),
    Num(serde_json::Number),
    Str(String),
}

impl Key {
    /// Convert a JSON value into a key; arrays and objects yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Key::Null),
            Value::Bool(b) => Some(Key::Bool(*b)),
            Value::Number(n) => Some(n.as_i64().map(Key::Int).unwrap_or_else(|| Key::Num(n.clone()))),
            Value::String(s) => Some(Key::Str(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// JSON form of the key, used when a key is restored into a record.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Null => Value::Null,
            Key::Bool(b) => Value::Bool(*b),
            Key::Int(i) => Value::from(*i),
            Key::Num(n) => Value::Number(n.clone()),
            Key::Str(s) => Value::String(s.clone()),
        }
    }

    /// String coercion used by keyed-object containers.
    pub fn into_field_name(self) -> String {
        match self {
            Key::Str(s) => s,
            other => other.to_string(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Key::Null => 0,
            Key::Bool(_) => 1,
            Key::Int(_) => 2,
            Key::Num(_) => 3,
            Key::Str(_) => 4,
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}

impl Eq for Key {}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Null, Key::Null) => Ordering::Equal,
            (Key::Bool(a), Key::Bool(b)) => a.cmp(b),
            (Key::Int(a), Key::Int(b)) => a.cmp(b),
            (Key::Num(a), Key::Num(b)) => a.to_string().cmp(&b.to_string()),
            (Key::Str(a), Key::Str(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Key::Null => {}
            Key::Bool(b) => b.hash(state),
            Key::Int(i) => i.hash(state),
            Key::Num(n) => n.to_string().hash(state),
            Key::Str(s) => s.hash(state),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Null => f.write_str("null"),
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Num(n) => write!(f, "{}", n),
            Key::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self { Key::Str(s.to_string()) }
}

impl From<String> for Key {
    fn from(s: String) -> Self { Key::Str(s) }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self { Key::Int(i) }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self { Key::Int(i64::from(i)) }
}

impl From<u32> for Key {
    fn from(i: u32) -> Self { Key::Int(i64::from(i)) }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self { Key::Bool(b) }
}

impl From<Key> for String {
    fn from(k: Key) -> Self { k.into_field_name() }
}

/// Short JSON type name used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Projection errors. Every variant aborts the whole operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ProjectError {
    #[error("invalid_input: expected {expected}, found {found}")]
    InvalidInput { expected: String, found: String },
    #[error("missing_field: `{field}` absent from record {index}")]
    MissingField { field: String, index: usize },
    #[error("unkeyable_value: field `{field}` of record {index} is {kind}")]
    UnkeyableValue { field: String, kind: String, index: usize },
    #[error("decode: {0}")]
    Decode(String),
}

impl ProjectError {
    pub fn invalid_input(expected: &str, found: &Value) -> Self {
        ProjectError::InvalidInput { expected: expected.to_string(), found: kind_of(found).to_string() }
    }
}

pub type ProjectResult<T> = Result<T, ProjectError>;
