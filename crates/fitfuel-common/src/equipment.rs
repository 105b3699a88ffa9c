//! Equipment codec
//!
//! The backend stores equipment as one comma-joined string while the edit
//! form works on a list of selected items.

use serde_json::Value;

use crate::types::{UserRecord, EQUIPMENT_FIELD};

pub const SEPARATOR: &str = ", ";

pub fn join_equipment<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Split on `,`, trim each part and drop the empty ones
pub fn split_equipment(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn a string `equipment` field into an array for editing
pub fn normalize_equipment(record: &mut UserRecord) {
    if let Some(Value::String(joined)) = record.get(EQUIPMENT_FIELD) {
        let items = split_equipment(joined)
            .into_iter()
            .map(Value::String)
            .collect();
        record.insert(EQUIPMENT_FIELD, Value::Array(items));
    }
}

/// Turn an array `equipment` field back into the joined wire form
pub fn flatten_equipment(record: &mut UserRecord) {
    if let Some(Value::Array(items)) = record.get(EQUIPMENT_FIELD) {
        let strings: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
        if let Some(strings) = strings {
            let joined = join_equipment(&strings);
            record.insert(EQUIPMENT_FIELD, Value::String(joined));
        }
    }
}

/// Current selection of a record, whichever form it is in
pub fn equipment_list(record: &UserRecord) -> Vec<String> {
    match record.get(EQUIPMENT_FIELD) {
        Some(Value::String(joined)) => split_equipment(joined),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> UserRecord {
        UserRecord::from_value(value).unwrap()
    }

    #[test]
    fn test_split_trims_and_drops_empty() {
        assert_eq!(
            split_equipment(" Dumbbell ,, Cable ,"),
            vec!["Dumbbell".to_string(), "Cable".to_string()]
        );
        assert!(split_equipment("").is_empty());
        assert!(split_equipment(" , ").is_empty());
    }

    #[test]
    fn test_join_uses_comma_space() {
        assert_eq!(join_equipment(&["EZ Bar", "Sled"]), "EZ Bar, Sled");
        assert_eq!(join_equipment::<&str>(&[]), "");
    }

    #[test]
    fn test_normalize_string_field() {
        let mut r = record(json!({"userId": 1, "equipment": "Dumbbell, Pull Up Bar"}));
        normalize_equipment(&mut r);
        assert_eq!(r.get("equipment"), Some(&json!(["Dumbbell", "Pull Up Bar"])));
    }

    #[test]
    fn test_normalize_leaves_arrays_and_missing_alone() {
        let mut r = record(json!({"equipment": ["Tire"]}));
        normalize_equipment(&mut r);
        assert_eq!(r.get("equipment"), Some(&json!(["Tire"])));

        let mut r = record(json!({"userId": 1}));
        normalize_equipment(&mut r);
        assert!(!r.contains("equipment"));
    }

    #[test]
    fn test_flatten_array_field() {
        let mut r = record(json!({"equipment": ["Sandbag", "Sled"]}));
        flatten_equipment(&mut r);
        assert_eq!(r.get("equipment"), Some(&json!("Sandbag, Sled")));
    }

    #[test]
    fn test_flatten_keeps_mixed_arrays() {
        let mut r = record(json!({"equipment": ["Sandbag", 3]}));
        flatten_equipment(&mut r);
        assert_eq!(r.get("equipment"), Some(&json!(["Sandbag", 3])));
    }

    #[test]
    fn test_equipment_list_reads_both_forms() {
        assert_eq!(
            equipment_list(&record(json!({"equipment": "Cable, Tire"}))),
            vec!["Cable", "Tire"]
        );
        assert_eq!(
            equipment_list(&record(json!({"equipment": ["Cable"]}))),
            vec!["Cable"]
        );
        assert!(equipment_list(&record(json!({}))).is_empty());
    }

    proptest! {
        #[test]
        fn prop_join_then_split_round_trips(
            items in prop::collection::vec("[A-Za-z0-9][A-Za-z0-9 ]{0,10}[A-Za-z0-9]|[A-Za-z0-9]", 0..8)
        ) {
            let joined = join_equipment(&items);
            prop_assert_eq!(split_equipment(&joined), items);
        }
    }
}
