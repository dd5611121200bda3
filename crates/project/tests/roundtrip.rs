#![forbid(unsafe_code)]

use std::collections::{HashMap, HashSet};

use proptest::prelude::*;
use rekey_core::{Key, ValueSelector};
use rekey_project::{group_map, group_object, to_map, unmap};
use serde_json::{json, Value};

/// Small integers, floats and unsigned values above `i64::MAX`, so keys of
/// every numeric shape collide often.
fn id() -> impl Strategy<Value = Value> {
    prop_oneof![
        (0i64..20).prop_map(Value::from),
        (0u32..20).prop_map(|i| Value::from(f64::from(i) + 0.5)),
        (0u64..20).prop_map(|i| Value::from(i64::MAX as u64 + 1 + i)),
    ]
}

fn records(max: usize) -> impl Strategy<Value = Vec<(Value, String, u8)>> {
    prop::collection::vec((id(), "[a-z]{0,6}", any::<u8>()), 0..max)
}

fn as_json(rows: &[(Value, String, u8)]) -> Vec<Value> {
    rows.iter().map(|(id, name, age)| json!({"id": id, "name": name, "age": age})).collect()
}

fn key(id: &Value) -> Key {
    Key::from_value(id).expect("scalar id")
}

proptest! {
    #[test]
    fn grouping_keeps_every_record(rows in records(64)) {
        let data = as_json(&rows);
        let m = group_map(&data, "id", "name").unwrap();
        prop_assert_eq!(m.values().map(Vec::len).sum::<usize>(), data.len());
        let o = group_object(&data, "name", ValueSelector::Whole).unwrap();
        prop_assert_eq!(o.values().map(Vec::len).sum::<usize>(), data.len());
    }

    #[test]
    fn unique_keys_round_trip(rows in records(64)) {
        // keep the first occurrence of every id
        let mut seen = HashSet::new();
        let unique: Vec<_> = rows.into_iter().filter(|(id, _, _)| seen.insert(key(id))).collect();
        let data = as_json(&unique);

        let m = to_map(&data, "id", ValueSelector::Whole).unwrap();
        let back = unmap(&m, "id", ValueSelector::Whole).unwrap();
        prop_assert_eq!(back, data);
    }

    #[test]
    fn single_map_holds_the_last_value_per_key(rows in records(64)) {
        let data = as_json(&rows);
        let m = to_map(&data, "id", "age").unwrap();
        let mut expected = HashMap::new();
        for (id, _, age) in &rows {
            expected.insert(key(id), *age);
        }
        prop_assert_eq!(m.len(), expected.len());
        for (k, age) in expected {
            prop_assert_eq!(&m[&k], &json!(age));
        }
    }
}
