//! Reverse projector: expand keyed containers back into flat records.
//!
//! The restored key always wins over a same-named field coming from the
//! value. Composite values keep their own field order; the key field is
//! updated in place when present and appended otherwise. Scalars land under
//! `ProjectOptions::value_field`.

use rekey_core::{Fields, ProjectOptions, ProjectResult, ValueSelector};
use serde_json::Value;
use tracing::{debug, trace};

use crate::resolve::pick_fields;
use crate::ContainerKey;

pub(crate) fn expand<'a, K, I>(entries: I, key_field: &str, value: &ValueSelector, opts: &ProjectOptions) -> ProjectResult<Vec<Value>>
where
    K: ContainerKey + 'a,
    I: Iterator<Item = (&'a K, &'a Value)>,
{
    let mut out = Vec::with_capacity(entries.size_hint().0);
    for (k, v) in entries {
        trace!(key = %k, "restoring entry");
        out.push(restore(k, v, out.len(), key_field, value, opts)?);
    }
    debug!(records = out.len(), "expanded single-valued container");
    Ok(out)
}

pub(crate) fn expand_groups<'a, K, I>(groups: I, key_field: &str, value: &ValueSelector, opts: &ProjectOptions) -> ProjectResult<Vec<Value>>
where
    K: ContainerKey + 'a,
    I: Iterator<Item = (&'a K, &'a [Value])>,
{
    let mut out = Vec::new();
    let mut group_count = 0usize;
    for (k, items) in groups {
        trace!(key = %k, items = items.len(), "restoring group");
        for v in items {
            out.push(restore(k, v, out.len(), key_field, value, opts)?);
        }
        group_count += 1;
    }
    debug!(groups = group_count, records = out.len(), "expanded multi-valued container");
    Ok(out)
}

fn restore<K: ContainerKey>(
    key: &K,
    value: &Value,
    index: usize,
    key_field: &str,
    selector: &ValueSelector,
    opts: &ProjectOptions,
) -> ProjectResult<Value> {
    let key = key.to_value();
    match selector {
        ValueSelector::Whole => Ok(spread(key_field, key, value.clone(), index, opts)),
        ValueSelector::Field(name) => {
            let mut m = keyed(key_field, key);
            if name != key_field {
                m.insert(name.clone(), value.clone());
            } else {
                debug!(field = %name, index, "value field shadowed by key field; value dropped");
            }
            Ok(Value::Object(m))
        }
        ValueSelector::Fields(names) if value.is_object() => {
            let mut m = keyed(key_field, key);
            for (name, v) in pick_fields(value, names, index, opts.field_policy)? {
                if name != key_field {
                    m.insert(name, v);
                } else {
                    debug!(field = %name, index, "selected field shadowed by key field; value dropped");
                }
            }
            Ok(Value::Object(m))
        }
        ValueSelector::Fields(_) => Ok(spread(key_field, key, value.clone(), index, opts)),
        ValueSelector::Derive(f) => Ok(spread(key_field, key, f(value), index, opts)),
    }
}

fn keyed(key_field: &str, key: Value) -> Fields {
    let mut m = Fields::new();
    m.insert(key_field.to_string(), key);
    m
}

fn spread(key_field: &str, key: Value, value: Value, index: usize, opts: &ProjectOptions) -> Value {
    match value {
        Value::Object(mut m) => {
            m.insert(key_field.to_string(), key);
            Value::Object(m)
        }
        scalar => {
            let mut m = keyed(key_field, key);
            if opts.value_field != key_field {
                m.insert(opts.value_field.clone(), scalar);
            } else {
                debug!(field = %key_field, index, "scalar value shadowed by key field; value dropped");
            }
            Value::Object(m)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KeyedMap;
    use rekey_core::{Key, ProjectError};
    use serde_json::json;

    fn single(entries: &[(Key, Value)]) -> KeyedMap<Key, Value> { entries.iter().cloned().collect() }

    #[test]
    fn composite_values_get_the_key_merged_in() {
        let m = single(&[(Key::Int(1), json!({"name": "A", "id": 99}))]);
        let out = expand(m.iter(), "id", &ValueSelector::Whole, &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"name": "A", "id": 1})]);
        let order: Vec<&str> = out[0].as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(order, ["name", "id"]);
    }

    #[test]
    fn scalar_values_use_the_value_field() {
        let m = single(&[(Key::from("a"), json!(1)), (Key::from("b"), json!("x"))]);
        let out = expand(m.iter(), "k", &ValueSelector::Whole, &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"k": "a", "value": 1}), json!({"k": "b", "value": "x"})]);

        let opts = ProjectOptions { value_field: "v".into(), ..ProjectOptions::default() };
        let out = expand(m.iter(), "k", &ValueSelector::Whole, &opts).unwrap();
        assert_eq!(out[0], json!({"k": "a", "v": 1}));
    }

    #[test]
    fn field_selector_names_the_value() {
        let m = single(&[(Key::Int(2), json!("Bob"))]);
        let out = expand(m.iter(), "id", &ValueSelector::field("name"), &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"id": 2, "name": "Bob"})]);
    }

    #[test]
    fn field_list_picks_from_composites_and_passes_scalars() {
        let m = single(&[(Key::Int(1), json!({"name": "A", "age": 3, "x": 0})), (Key::Int(2), json!(7))]);
        let sel = ValueSelector::fields(["age", "name"]);
        let out = expand(m.iter(), "id", &sel, &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"id": 1, "age": 3, "name": "A"}), json!({"id": 2, "value": 7})]);

        let strict = expand(m.iter(), "id", &ValueSelector::fields(["missing"]), &ProjectOptions::strict());
        assert_eq!(strict.unwrap_err(), ProjectError::MissingField { field: "missing".into(), index: 0 });
    }

    #[test]
    fn key_field_wins_over_same_named_value_field() {
        let m = single(&[(Key::Int(1), json!("payload"))]);
        let out = expand(m.iter(), "id", &ValueSelector::field("id"), &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"id": 1})]);

        let opts = ProjectOptions { value_field: "id".into(), ..ProjectOptions::default() };
        let out = expand(m.iter(), "id", &ValueSelector::Whole, &opts).unwrap();
        assert_eq!(out, vec![json!({"id": 1})]);

        let m = single(&[(Key::Int(1), json!({"id": 7, "n": "a"}))]);
        let out = expand(m.iter(), "id", &ValueSelector::fields(["id", "n"]), &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"id": 1, "n": "a"})]);
    }

    #[test]
    fn float_keys_restore_as_numbers() {
        let m = single(&[(Key::from_value(&json!(1.5)).unwrap(), json!({"n": 1}))]);
        let out = expand(m.iter(), "k", &ValueSelector::Whole, &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"n": 1, "k": 1.5})]);
    }

    #[test]
    fn groups_expand_in_order() {
        let mut m: KeyedMap<String, Vec<Value>> = KeyedMap::default();
        m.insert("1".into(), vec![json!("Alice"), json!("Anna")]);
        m.insert("2".into(), vec![json!("Bob")]);
        let out = expand_groups(
            m.iter().map(|(k, v)| (k, v.as_slice())),
            "id",
            &ValueSelector::field("name"),
            &ProjectOptions::default(),
        )
        .unwrap();
        assert_eq!(
            out,
            vec![
                json!({"id": "1", "name": "Alice"}),
                json!({"id": "1", "name": "Anna"}),
                json!({"id": "2", "name": "Bob"}),
            ]
        );
    }

    #[test]
    fn derived_values_are_spread() {
        let m = single(&[(Key::Int(5), json!({"n": 2}))]);
        let sel = ValueSelector::derive(|v: &Value| json!({"double": v["n"].as_i64().unwrap_or(0) * 2}));
        let out = expand(m.iter(), "id", &sel, &ProjectOptions::default()).unwrap();
        assert_eq!(out, vec![json!({"double": 4, "id": 5})]);
    }
}
