//! Closure-driven builders for callers holding Rust values instead of JSON.
//!
//! Same container semantics as the JSON builders: `index_by` keeps the last
//! value per key at the key's first position, `group_by` never drops an item.

use std::hash::Hash;

use crate::KeyedMap;

pub fn index_by<T, K, V, I>(items: I, mut key: impl FnMut(&T) -> K, mut value: impl FnMut(&T) -> V) -> KeyedMap<K, V>
where
    I: IntoIterator<Item = T>,
    K: Hash + Eq,
{
    let mut out = KeyedMap::default();
    for item in items {
        out.insert(key(&item), value(&item));
    }
    out
}

pub fn group_by<T, K, V, I>(items: I, mut key: impl FnMut(&T) -> K, mut value: impl FnMut(&T) -> V) -> KeyedMap<K, Vec<V>>
where
    I: IntoIterator<Item = T>,
    K: Hash + Eq,
{
    let mut out: KeyedMap<K, Vec<V>> = KeyedMap::default();
    for item in items {
        out.entry(key(&item)).or_default().push(value(&item));
    }
    out
}

/// Rebuild one item per entry.
pub fn flatten<K, V, R>(map: KeyedMap<K, V>, mut combine: impl FnMut(K, V) -> R) -> Vec<R> {
    map.into_iter().map(|(k, v)| combine(k, v)).collect()
}

/// Rebuild one item per grouped value, keeping group order.
pub fn flatten_groups<K, V, R>(map: KeyedMap<K, Vec<V>>, mut combine: impl FnMut(&K, V) -> R) -> Vec<R> {
    let mut out = Vec::with_capacity(map.values().map(Vec::len).sum());
    for (k, vs) in map {
        for v in vs {
            out.push(combine(&k, v));
        }
    }
    out
}
