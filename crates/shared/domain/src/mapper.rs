//! Attribute mapper - translation between attribute rows and flat field-sets.
//!
//! Everything here is pure: inputs are borrowed, results are new values.

use crate::meta::{FieldSet, MetaAttr, StoredMeta};

/// Result of applying a field-set to a user's existing attribute rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetaDiff {
    /// Replacements for edited rows (in storage order) followed by rows for
    /// keys the user did not have yet (in field-set order).
    pub rows_to_create: Vec<MetaAttr>,
    /// Ids of the rows superseded by a replacement. Delete these once the
    /// replacements are written.
    pub rows_to_retire: Vec<String>,
}

/// Collapse attribute rows into a field-set.
///
/// A row with neither column set drops its key, including any value an
/// earlier row with the same key produced.
pub fn flatten(rows: &[StoredMeta]) -> FieldSet {
    let mut fields = FieldSet::new();
    for row in rows {
        match row.field_value() {
            Some(value) => {
                fields.insert(row.key.clone(), value);
            }
            None => {
                fields.remove(&row.key);
            }
        }
    }
    fields
}

/// Work out which rows to create and which to retire so that `existing`
/// reflects `fields` afterwards.
///
/// Rows whose key is absent from `fields` are left alone. When storage holds
/// the same key twice, both rows are replaced and both ids retired.
pub fn diff_for_update(existing: &[StoredMeta], fields: &FieldSet) -> MetaDiff {
    let mut diff = MetaDiff::default();

    for row in existing {
        if let Some(value) = fields.get(&row.key) {
            diff.rows_to_create.push(MetaAttr::new(row.key.clone(), value.clone()));
            diff.rows_to_retire.push(row.id.clone());
        }
    }

    for (key, value) in fields {
        if !existing.iter().any(|row| &row.key == key) {
            diff.rows_to_create.push(MetaAttr::new(key.clone(), value.clone()));
        }
    }

    diff
}

/// Rows to create for a brand new user.
pub fn build_for_insert(fields: &FieldSet) -> Vec<MetaAttr> {
    fields
        .iter()
        .map(|(key, value)| MetaAttr::new(key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::FieldValue;
    use serde_json::json;

    fn stored(id: &str, key: &str, value: Option<&str>, data: Option<serde_json::Value>) -> StoredMeta {
        StoredMeta {
            id: id.to_string(),
            key: key.to_string(),
            value: value.map(str::to_string),
            data,
        }
    }

    /// Pretend storage assigned ids to freshly created rows
    fn persist(rows: Vec<MetaAttr>, prefix: &str) -> Vec<StoredMeta> {
        rows.into_iter()
            .enumerate()
            .map(|(i, attr)| StoredMeta::new(format!("{}{}", prefix, i), attr))
            .collect()
    }

    fn string_fields() -> FieldSet {
        FieldSet::from([
            ("email".to_string(), FieldValue::from("ada@example.com")),
            ("name".to_string(), FieldValue::from("Ada")),
        ])
    }

    fn structured_fields() -> FieldSet {
        FieldSet::from([
            ("age".to_string(), FieldValue::from(json!(36))),
            ("prefs".to_string(), FieldValue::from(json!({"theme": "dark", "tabs": [1, 2]}))),
            ("verified".to_string(), FieldValue::from(json!(false))),
        ])
    }

    #[test]
    fn test_flatten_round_trips_string_fields() {
        let fields = string_fields();
        let rows = persist(build_for_insert(&fields), "r");
        assert_eq!(flatten(&rows), fields);
    }

    #[test]
    fn test_flatten_round_trips_structured_fields() {
        let fields = structured_fields();
        let rows = persist(build_for_insert(&fields), "r");
        assert!(rows.iter().all(|r| r.value.is_none() && r.data.is_some()));
        assert_eq!(flatten(&rows), fields);
    }

    #[test]
    fn test_flatten_data_wins_and_empty_rows_vanish() {
        let rows = vec![
            stored("1", "bio", Some("text"), Some(json!({"rich": true}))),
            stored("2", "ghost", None, None),
        ];
        let fields = flatten(&rows);

        assert_eq!(fields.len(), 1);
        assert_eq!(fields["bio"], FieldValue::Structured(json!({"rich": true})));
    }

    #[test]
    fn test_flatten_later_empty_row_clears_key() {
        let rows = vec![stored("1", "bio", Some("x"), None), stored("2", "bio", None, None)];
        assert!(flatten(&rows).is_empty());
    }

    #[test]
    fn test_diff_against_no_rows_matches_insert() {
        let mut fields = string_fields();
        fields.extend(structured_fields());

        let diff = diff_for_update(&[], &fields);

        assert_eq!(diff.rows_to_create, build_for_insert(&fields));
        assert!(diff.rows_to_retire.is_empty());
    }

    #[test]
    fn test_diff_replaces_existing_and_appends_new() {
        let existing = vec![stored("a", "bio", Some("x"), None)];
        let fields = FieldSet::from([
            ("bio".to_string(), FieldValue::from("y")),
            ("age".to_string(), FieldValue::from(json!(30))),
        ]);

        let diff = diff_for_update(&existing, &fields);

        assert_eq!(
            serde_json::to_value(&diff.rows_to_create).unwrap(),
            json!([{"key": "bio", "value": "y"}, {"key": "age", "data": 30}])
        );
        assert_eq!(diff.rows_to_retire, vec!["a".to_string()]);
    }

    #[test]
    fn test_diff_switches_column_on_type_change() {
        let existing = vec![stored("a", "prefs", Some("dark"), None)];
        let fields = FieldSet::from([("prefs".to_string(), FieldValue::from(json!({"theme": "dark"})))]);

        let diff = diff_for_update(&existing, &fields);

        assert_eq!(
            diff.rows_to_create,
            vec![MetaAttr::Structured {
                key: "prefs".into(),
                data: json!({"theme": "dark"}),
            }]
        );
    }

    #[test]
    fn test_diff_leaves_unrelated_rows_alone() {
        let existing = vec![
            stored("a", "bio", Some("x"), None),
            stored("b", "city", Some("Paris"), None),
        ];
        let fields = FieldSet::from([("bio".to_string(), FieldValue::from("y"))]);

        let diff = diff_for_update(&existing, &fields);

        assert_eq!(diff.rows_to_create, vec![MetaAttr::new("bio", "y".into())]);
        assert_eq!(diff.rows_to_retire, vec!["a".to_string()]);
    }

    #[test]
    fn test_diff_duplicate_keys_are_all_replaced() {
        let existing = vec![
            stored("a", "bio", Some("x"), None),
            stored("b", "bio", Some("old"), None),
        ];
        let fields = FieldSet::from([("bio".to_string(), FieldValue::from("y"))]);

        let diff = diff_for_update(&existing, &fields);

        assert_eq!(
            diff.rows_to_create,
            vec![MetaAttr::new("bio", "y".into()), MetaAttr::new("bio", "y".into())]
        );
        assert_eq!(diff.rows_to_retire, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_diff_converges_on_second_application() {
        let existing = vec![
            stored("a", "bio", Some("x"), None),
            stored("b", "city", Some("Paris"), None),
        ];
        let fields = FieldSet::from([
            ("bio".to_string(), FieldValue::from("y")),
            ("age".to_string(), FieldValue::from(json!(30))),
        ]);

        let first = diff_for_update(&existing, &fields);

        // Storage after the write and the cleanup of retired rows
        let mut after: Vec<StoredMeta> = existing
            .iter()
            .filter(|row| !first.rows_to_retire.contains(&row.id))
            .cloned()
            .collect();
        let created = persist(first.rows_to_create.clone(), "n");
        let created_ids: Vec<String> = created.iter().map(|r| r.id.clone()).collect();
        after.extend(created);

        let second = diff_for_update(&after, &fields);

        assert_eq!(second.rows_to_create, first.rows_to_create);
        assert_eq!(second.rows_to_retire, created_ids);
        assert_eq!(flatten(&after)["bio"], FieldValue::from("y"));
        assert_eq!(flatten(&after)["city"], FieldValue::from("Paris"));
    }

    #[test]
    fn test_diff_empty_fields_is_empty() {
        let existing = vec![stored("a", "bio", Some("x"), None)];
        assert_eq!(diff_for_update(&existing, &FieldSet::new()), MetaDiff::default());
    }

    #[test]
    fn test_diff_does_not_touch_inputs() {
        let existing = vec![stored("a", "bio", Some("x"), None)];
        let snapshot = existing.clone();
        let fields = FieldSet::from([("bio".to_string(), FieldValue::from("y"))]);

        let _ = diff_for_update(&existing, &fields);

        assert_eq!(existing, snapshot);
    }
}
