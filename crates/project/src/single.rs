//! Single-valued builder: one value per key, the last record wins.

use rekey_core::{KeySelector, ProjectOptions, ProjectResult, ValueSelector};
use serde_json::Value;
use tracing::debug;

use crate::{ContainerKey, KeyResolver, KeyedMap, ValueResolver};

pub(crate) fn build<K: ContainerKey>(
    records: &[Value],
    key: &KeySelector,
    value: &ValueSelector,
    opts: &ProjectOptions,
) -> ProjectResult<KeyedMap<K, Value>> {
    let keys = KeyResolver::new(key, opts);
    let values = ValueResolver::new(value, opts);
    let mut out: KeyedMap<K, Value> = KeyedMap::with_capacity_and_hasher(records.len(), Default::default());
    let mut overwritten = 0usize;
    for (index, record) in records.iter().enumerate() {
        let k = K::from(keys.resolve(index, record)?);
        let v = values.resolve(index, record)?;
        // Overwrite keeps the key's first position.
        if out.insert(k, v).is_some() { overwritten += 1; }
    }
    metrics::counter!("rekey_builds_total", 1);
    metrics::counter!("rekey_records_total", records.len() as u64);
    debug!(records = records.len(), keys = out.len(), overwritten, "built single-valued container");
    Ok(out)
}
