//! Multi-valued builder: records sharing a key are grouped in input order.

use rekey_core::{KeySelector, ProjectOptions, ProjectResult, ValueSelector};
use serde_json::Value;
use tracing::debug;

use crate::{ContainerKey, KeyResolver, KeyedMap, ValueResolver};

pub(crate) fn build<K: ContainerKey>(
    records: &[Value],
    key: &KeySelector,
    value: &ValueSelector,
    opts: &ProjectOptions,
) -> ProjectResult<KeyedMap<K, Vec<Value>>> {
    let keys = KeyResolver::new(key, opts);
    let values = ValueResolver::new(value, opts);
    let mut out: KeyedMap<K, Vec<Value>> = KeyedMap::default();
    for (index, record) in records.iter().enumerate() {
        let k = K::from(keys.resolve(index, record)?);
        let v = values.resolve(index, record)?;
        out.entry(k).or_default().push(v);
    }
    metrics::counter!("rekey_builds_total", 1);
    metrics::counter!("rekey_records_total", records.len() as u64);
    debug!(records = records.len(), groups = out.len(), "built multi-valued container");
    Ok(out)
}
