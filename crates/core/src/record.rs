//! Field enumeration over a single record.
//!
//! Non-object records have no named fields, so every helper yields an empty
//! list for them instead of failing.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Fields, ProjectError, ProjectResult};

pub fn fields(record: &Value) -> Option<&Fields> { record.as_object() }

pub fn keys(record: &Value) -> Vec<&str> {
    fields(record).map(|m| m.keys().map(String::as_str).collect()).unwrap_or_default()
}

pub fn values(record: &Value) -> Vec<&Value> {
    fields(record).map(|m| m.values().collect()).unwrap_or_default()
}

pub fn entries(record: &Value) -> Vec<(&str, &Value)> {
    fields(record).map(|m| m.iter().map(|(k, v)| (k.as_str(), v)).collect()).unwrap_or_default()
}

/// Entries with every value decoded into `T`.
pub fn typed_entries<T: DeserializeOwned>(record: &Value) -> ProjectResult<Vec<(String, T)>> {
    let mut out = Vec::new();
    for (k, v) in entries(record) {
        let decoded = T::deserialize(v).map_err(|e| ProjectError::Decode(format!("field `{}`: {}", k, e)))?;
        out.push((k.to_string(), decoded));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn enumerates_in_insertion_order() {
        let r = json!({"zeta": 1, "alpha": 2, "mid": 3});
        assert_eq!(keys(&r), vec!["zeta", "alpha", "mid"]);
        assert_eq!(values(&r), vec![&json!(1), &json!(2), &json!(3)]);
        assert_eq!(entries(&r)[1], ("alpha", &json!(2)));
    }

    #[test]
    fn scalars_have_no_fields() {
        assert!(keys(&json!(5)).is_empty());
        assert!(entries(&json!([1, 2])).is_empty());
    }

    #[test]
    fn typed_entries_decode_or_fail() {
        let r = json!({"a": 1, "b": 2});
        let got: Vec<(String, u8)> = typed_entries(&r).unwrap();
        assert_eq!(got, vec![("a".to_string(), 1), ("b".to_string(), 2)]);

        let bad = json!({"a": 1, "b": "two"});
        let err = typed_entries::<u8>(&bad).unwrap_err();
        assert!(matches!(err, ProjectError::Decode(ref m) if m.contains("`b`")));
    }
}
