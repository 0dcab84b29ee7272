//! User domain entity and its raw storage shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::mapper::flatten;
use crate::meta::{FieldSet, StoredMeta};

/// Canonical name of the identifier field as seen by callers
pub const ID_FIELD: &str = "_id";

/// User as handed to the authentication layer: an identifier plus any
/// number of named fields.
///
/// Serializes flat, e.g. `{"_id": "u1", "bio": "hi"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: FieldSet,
}

/// User as returned by storage: native columns plus the raw meta rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredUser {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "oothMeta", default)]
    pub meta: Vec<StoredMeta>,
}

/// Rename `id` to `_id`, merge the flattened meta rows and drop the rows.
///
/// A meta row keyed `_id` never shadows the real identifier.
impl From<StoredUser> for User {
    fn from(stored: StoredUser) -> Self {
        let mut fields = if stored.meta.is_empty() {
            FieldSet::new()
        } else {
            flatten(&stored.meta)
        };
        fields.remove(ID_FIELD);

        User {
            id: stored.id,
            fields,
        }
    }
}
