//! Per-record key and value resolution shared by every builder.

use rekey_core::{kind_of, FieldPolicy, Fields, Key, KeySelector, ProjectError, ProjectOptions, ProjectResult, ValueSelector};
use serde_json::Value;

static NULL: Value = Value::Null;

/// Read `field` from `record`, applying the missing-field policy.
/// Non-object records have no fields.
pub(crate) fn read_field<'r>(record: &'r Value, field: &str, index: usize, policy: FieldPolicy) -> ProjectResult<&'r Value> {
    match record.get(field) {
        Some(v) => Ok(v),
        None if policy == FieldPolicy::Strict => Err(ProjectError::MissingField { field: field.to_string(), index }),
        None => Ok(&NULL),
    }
}

/// Sub-record holding exactly `names`, in order.
pub(crate) fn pick_fields(record: &Value, names: &[String], index: usize, policy: FieldPolicy) -> ProjectResult<Fields> {
    let mut out = Fields::new();
    for name in names {
        out.insert(name.clone(), read_field(record, name, index, policy)?.clone());
    }
    Ok(out)
}

pub struct KeyResolver<'s> {
    selector: &'s KeySelector,
    policy: FieldPolicy,
}

impl<'s> KeyResolver<'s> {
    pub fn new(selector: &'s KeySelector, opts: &ProjectOptions) -> Self {
        Self { selector, policy: opts.field_policy }
    }

    pub fn resolve(&self, index: usize, record: &Value) -> ProjectResult<Key> {
        match self.selector {
            KeySelector::Field(name) => {
                let v = read_field(record, name, index, self.policy)?;
                Key::from_value(v).ok_or_else(|| ProjectError::UnkeyableValue {
                    field: name.clone(),
                    kind: kind_of(v).to_string(),
                    index,
                })
            }
            KeySelector::Derive(f) => Ok(f(record)),
        }
    }
}

pub struct ValueResolver<'s> {
    selector: &'s ValueSelector,
    policy: FieldPolicy,
}

impl<'s> ValueResolver<'s> {
    pub fn new(selector: &'s ValueSelector, opts: &ProjectOptions) -> Self {
        Self { selector, policy: opts.field_policy }
    }

    pub fn resolve(&self, index: usize, record: &Value) -> ProjectResult<Value> {
        match self.selector {
            ValueSelector::Whole => Ok(record.clone()),
            ValueSelector::Field(name) => read_field(record, name, index, self.policy).cloned(),
            ValueSelector::Fields(names) => pick_fields(record, names, index, self.policy).map(Value::Object),
            ValueSelector::Derive(f) => Ok(f(record)),
        }
    }
}
