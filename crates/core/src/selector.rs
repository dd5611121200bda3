//! Key and value selectors.
//!
//! A selector says how a record turns into a container key or a stored
//! value. Closures are shared behind `Arc` so selectors stay cheap to clone.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use smallvec::SmallVec;

use crate::Key;

pub type KeyFn = Arc<dyn Fn(&Value) -> Key + Send + Sync>;
pub type ValueFn = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Derives the container key of a record.
#[derive(Clone)]
pub enum KeySelector {
    /// Value of a named field.
    Field(String),
    /// Arbitrary derivation; the result is used as-is.
    Derive(KeyFn),
}

impl KeySelector {
    pub fn field(name: impl Into<String>) -> Self { KeySelector::Field(name.into()) }

    pub fn derive<F, K>(f: F) -> Self
    where
        F: Fn(&Value) -> K + Send + Sync + 'static,
        K: Into<Key>,
    {
        KeySelector::Derive(Arc::new(move |record| f(record).into()))
    }
}

impl fmt::Debug for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySelector::Field(name) => f.debug_tuple("Field").field(name).finish(),
            KeySelector::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

impl From<&str> for KeySelector {
    fn from(name: &str) -> Self { KeySelector::field(name) }
}

impl From<String> for KeySelector {
    fn from(name: String) -> Self { KeySelector::Field(name) }
}

/// Derives the value stored for a record.
#[derive(Clone, Default)]
pub enum ValueSelector {
    /// The entire record.
    #[default]
    Whole,
    /// Value of a single named field.
    Field(String),
    /// Sub-record with exactly these fields, in this order.
    Fields(SmallVec<[String; 4]>),
    /// Arbitrary derivation; the result is stored verbatim.
    Derive(ValueFn),
}

impl ValueSelector {
    pub fn field(name: impl Into<String>) -> Self { ValueSelector::Field(name.into()) }

    /// Field-list selector. Repeated names keep their first position.
    pub fn fields<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: SmallVec<[String; 4]> = SmallVec::new();
        for name in names {
            let name = name.into();
            if !out.contains(&name) { out.push(name); }
        }
        ValueSelector::Fields(out)
    }

    pub fn derive<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        ValueSelector::Derive(Arc::new(f))
    }

    pub fn is_whole(&self) -> bool { matches!(self, ValueSelector::Whole) }
}

impl fmt::Debug for ValueSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSelector::Whole => f.write_str("Whole"),
            ValueSelector::Field(name) => f.debug_tuple("Field").field(name).finish(),
            ValueSelector::Fields(names) => f.debug_tuple("Fields").field(names).finish(),
            ValueSelector::Derive(_) => f.write_str("Derive(..)"),
        }
    }
}

impl From<&str> for ValueSelector {
    fn from(name: &str) -> Self { ValueSelector::field(name) }
}

impl From<String> for ValueSelector {
    fn from(name: String) -> Self { ValueSelector::Field(name) }
}

impl<const N: usize> From<[&str; N]> for ValueSelector {
    fn from(names: [&str; N]) -> Self { ValueSelector::fields(names) }
}

impl From<Vec<&str>> for ValueSelector {
    fn from(names: Vec<&str>) -> Self { ValueSelector::fields(names) }
}

impl From<Vec<String>> for ValueSelector {
    fn from(names: Vec<String>) -> Self { ValueSelector::fields(names) }
}

impl<T: Into<ValueSelector>> From<Option<T>> for ValueSelector {
    fn from(sel: Option<T>) -> Self { sel.map(Into::into).unwrap_or_default() }
}
