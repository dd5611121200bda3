//! Projection options, optionally read from the environment.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// How a field-name selector treats a record that lacks the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldPolicy {
    /// Missing fields read as `null`.
    #[default]
    Lenient,
    /// Missing fields fail with `ProjectError::MissingField`.
    Strict,
}

impl FromStr for FieldPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(FieldPolicy::Lenient),
            "strict" => Ok(FieldPolicy::Strict),
            other => Err(format!("unknown field policy: {}", other)),
        }
    }
}

pub const DEFAULT_VALUE_FIELD: &str = "value";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectOptions {
    pub field_policy: FieldPolicy,
    /// Field holding scalar values when the reverse projector rebuilds records.
    pub value_field: String,
}

impl Default for ProjectOptions {
    fn default() -> Self {
        Self { field_policy: FieldPolicy::Lenient, value_field: DEFAULT_VALUE_FIELD.to_string() }
    }
}

impl ProjectOptions {
    pub fn strict() -> Self { Self { field_policy: FieldPolicy::Strict, ..Self::default() } }

    pub fn is_strict(&self) -> bool { self.field_policy == FieldPolicy::Strict }

    /// Read `REKEY_FIELD_POLICY` and `REKEY_VALUE_FIELD`; unset or invalid values keep defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut opts = Self::default();
        if let Some(raw) = lookup("REKEY_FIELD_POLICY") {
            match raw.parse::<FieldPolicy>() {
                Ok(p) => opts.field_policy = p,
                Err(e) => warn!(error = %e, "invalid REKEY_FIELD_POLICY; using lenient"),
            }
        }
        if let Some(name) = lookup("REKEY_VALUE_FIELD").filter(|s| !s.is_empty()) {
            opts.value_field = name;
        }
        opts
    }
}
