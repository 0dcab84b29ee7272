//! User meta: field values and attribute rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value of a single user field.
///
/// Strings are kept apart from every other JSON value because storage puts
/// them in different columns (`value` vs `data`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Structured(Value),
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => FieldValue::Text(s),
            other => FieldValue::Structured(other),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

/// Flat set of named fields supplied for, or read back from, a user.
pub type FieldSet = BTreeMap<String, FieldValue>;

/// Attribute row to be created.
///
/// Exactly one of `value` / `data` exists by construction. Serializes as
/// `{"key": .., "value": ..}` or `{"key": .., "data": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetaAttr {
    Text { key: String, value: String },
    Structured { key: String, data: Value },
}

impl MetaAttr {
    /// Build a row for `key`, choosing the column from the value's type.
    ///
    /// A JSON string always lands in `value`, however it was wrapped.
    pub fn new(key: impl Into<String>, value: FieldValue) -> Self {
        let key = key.into();
        match value {
            FieldValue::Text(value) | FieldValue::Structured(Value::String(value)) => {
                MetaAttr::Text { key, value }
            }
            FieldValue::Structured(data) => MetaAttr::Structured { key, data },
        }
    }

    /// Split into `(key, value, data)` column values.
    pub fn into_columns(self) -> (String, Option<String>, Option<Value>) {
        match self {
            MetaAttr::Text { key, value } => (key, Some(value), None),
            MetaAttr::Structured { key, data } => (key, None, Some(data)),
        }
    }
}

/// Attribute row as read from storage.
///
/// Storage does not enforce the one-of rule, so both columns stay optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMeta {
    pub id: String,
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl StoredMeta {
    /// Pair a created row with the identifier storage assigned to it
    pub fn new(id: impl Into<String>, attr: MetaAttr) -> Self {
        let (key, value, data) = attr.into_columns();
        Self {
            id: id.into(),
            key,
            value,
            data,
        }
    }

    /// Effective value of the row: `data` wins over `value`, JSON null counts
    /// as missing. `None` when neither column holds anything.
    pub fn field_value(&self) -> Option<FieldValue> {
        match (&self.data, &self.value) {
            (Some(data), _) if !data.is_null() => Some(FieldValue::Structured(data.clone())),
            (_, Some(value)) => Some(FieldValue::Text(value.clone())),
            _ => None,
        }
    }
}
