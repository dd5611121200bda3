//! rekey projector: turn sequences of records into keyed containers and back.
//!
//! Four forward operations share one resolution path:
//! - `to_map` / `to_object`: one value per key, last writer wins
//! - `group_map` / `group_object`: every record kept, grouped by key in input order
//!
//! `unmap` / `ungroup` expand a container back into flat records.
//! The `*_value` methods on [`Projector`] accept a dynamic JSON document and
//! reject anything that is not shaped as expected with `InvalidInput`.

#![forbid(unsafe_code)]

use std::fmt;
use std::hash::{BuildHasherDefault, Hash};

use indexmap::IndexMap;
use rekey_core::{Key, KeySelector, ProjectError, ProjectOptions, ProjectResult, ValueSelector};
use rustc_hash::FxHasher;
use serde_json::Value;

mod multi;
mod resolve;
mod reverse;
mod single;
pub mod typed;

pub use resolve::{KeyResolver, ValueResolver};

pub type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Ordered keyed container: keys unique, iteration in first-insertion order.
pub type KeyedMap<K, V> = IndexMap<K, V, FxBuildHasher>;

/// Key types a container can be built over: `Key` for the mapping view,
/// `String` for the keyed-object view.
pub trait ContainerKey: Hash + Eq + From<Key> + fmt::Display {
    fn to_value(&self) -> Value;
}

impl ContainerKey for Key {
    fn to_value(&self) -> Value { Key::to_value(self) }
}

impl ContainerKey for String {
    fn to_value(&self) -> Value { Value::String(self.clone()) }
}

/// Entry point carrying the options every operation resolves against.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    opts: ProjectOptions,
}

impl Projector {
    pub fn new(opts: ProjectOptions) -> Self { Self { opts } }

    pub fn from_env() -> Self { Self::new(ProjectOptions::from_env()) }

    pub fn options(&self) -> &ProjectOptions { &self.opts }

    pub fn to_map(&self, records: &[Value], key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<Key, Value>> {
        single::build(records, key, value, &self.opts)
    }

    pub fn to_object(&self, records: &[Value], key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<String, Value>> {
        single::build(records, key, value, &self.opts)
    }

    pub fn group_map(&self, records: &[Value], key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<Key, Vec<Value>>> {
        multi::build(records, key, value, &self.opts)
    }

    pub fn group_object(&self, records: &[Value], key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<String, Vec<Value>>> {
        multi::build(records, key, value, &self.opts)
    }

    pub fn unmap<K: ContainerKey>(&self, map: &KeyedMap<K, Value>, key_field: &str, value: &ValueSelector) -> ProjectResult<Vec<Value>> {
        reverse::expand(map.iter(), key_field, value, &self.opts)
    }

    pub fn ungroup<K: ContainerKey>(&self, map: &KeyedMap<K, Vec<Value>>, key_field: &str, value: &ValueSelector) -> ProjectResult<Vec<Value>> {
        reverse::expand_groups(map.iter().map(|(k, vs)| (k, vs.as_slice())), key_field, value, &self.opts)
    }

    pub fn to_map_value(&self, doc: &Value, key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<Key, Value>> {
        self.to_map(sequence(doc)?, key, value)
    }

    pub fn to_object_value(&self, doc: &Value, key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<String, Value>> {
        self.to_object(sequence(doc)?, key, value)
    }

    pub fn group_map_value(&self, doc: &Value, key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<Key, Vec<Value>>> {
        self.group_map(sequence(doc)?, key, value)
    }

    pub fn group_object_value(&self, doc: &Value, key: &KeySelector, value: &ValueSelector) -> ProjectResult<KeyedMap<String, Vec<Value>>> {
        self.group_object(sequence(doc)?, key, value)
    }

    /// Expand a keyed document into records. Accepts a JSON object of
    /// `key -> value` or an entry list `[{"key": .., "value": ..}]`.
    pub fn unmap_value(&self, doc: &Value, key_field: &str, value: &ValueSelector) -> ProjectResult<Vec<Value>> {
        let entries = keyed_entries(doc)?;
        reverse::expand(entries.iter().map(|(k, v)| (k, *v)), key_field, value, &self.opts)
    }

    /// Expand a grouped document into records; same shapes as
    /// [`Projector::unmap_value`] with every value an array.
    pub fn ungroup_value(&self, doc: &Value, key_field: &str, value: &ValueSelector) -> ProjectResult<Vec<Value>> {
        let entries = keyed_entries(doc)?;
        let mut groups = Vec::with_capacity(entries.len());
        for (k, v) in entries.iter() {
            let items = v.as_array().ok_or_else(|| ProjectError::invalid_input("array of values", v))?;
            groups.push((k, items.as_slice()));
        }
        reverse::expand_groups(groups.into_iter(), key_field, value, &self.opts)
    }
}

/// `(key, value)` pairs of a keyed object or of a `{key, value}` entry list.
/// Entry-list keys keep their JSON type; object keys are strings.
fn keyed_entries(doc: &Value) -> ProjectResult<Vec<(Key, &Value)>> {
    match doc {
        Value::Object(obj) => Ok(obj.iter().map(|(k, v)| (Key::Str(k.clone()), v)).collect()),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let (k, v) = match (item.get("key"), item.get("value")) {
                    (Some(k), Some(v)) => (k, v),
                    _ => return Err(ProjectError::invalid_input("{key, value} entry", item)),
                };
                let key = Key::from_value(k).ok_or_else(|| ProjectError::UnkeyableValue {
                    field: "key".to_string(),
                    kind: rekey_core::kind_of(k).to_string(),
                    index,
                })?;
                out.push((key, v));
            }
            Ok(out)
        }
        other => Err(ProjectError::invalid_input("object or entry list", other)),
    }
}

/// The records of a dynamic document, which must be a JSON array.
pub fn sequence(doc: &Value) -> ProjectResult<&[Value]> {
    doc.as_array().map(Vec::as_slice).ok_or_else(|| ProjectError::invalid_input("array", doc))
}

// Free-function shorthands over default options.

pub fn to_map(records: &[Value], key: impl Into<KeySelector>, value: impl Into<ValueSelector>) -> ProjectResult<KeyedMap<Key, Value>> {
    Projector::default().to_map(records, &key.into(), &value.into())
}

pub fn to_object(records: &[Value], key: impl Into<KeySelector>, value: impl Into<ValueSelector>) -> ProjectResult<KeyedMap<String, Value>> {
    Projector::default().to_object(records, &key.into(), &value.into())
}

pub fn group_map(records: &[Value], key: impl Into<KeySelector>, value: impl Into<ValueSelector>) -> ProjectResult<KeyedMap<Key, Vec<Value>>> {
    Projector::default().group_map(records, &key.into(), &value.into())
}

pub fn group_object(records: &[Value], key: impl Into<KeySelector>, value: impl Into<ValueSelector>) -> ProjectResult<KeyedMap<String, Vec<Value>>> {
    Projector::default().group_object(records, &key.into(), &value.into())
}

pub fn unmap<K: ContainerKey>(map: &KeyedMap<K, Value>, key_field: &str, value: impl Into<ValueSelector>) -> ProjectResult<Vec<Value>> {
    Projector::default().unmap(map, key_field, &value.into())
}

pub fn ungroup<K: ContainerKey>(map: &KeyedMap<K, Vec<Value>>, key_field: &str, value: impl Into<ValueSelector>) -> ProjectResult<Vec<Value>> {
    Projector::default().ungroup(map, key_field, &value.into())
}
