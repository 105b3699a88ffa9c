//! Table schema negotiation for the user list
//!
//! Columns are derived from the field names of the first record returned by
//! the admin API. Every other record must carry the same field set; a
//! mismatch is reported instead of silently dropping or misaligning cells.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{ConsoleError, Result};
use crate::types::{UserRecord, ID_FIELD};

/// Never rendered as a column
pub const SENSITIVE_FIELD: &str = "passwordHash";

pub const ACTIONS_FIELD: &str = "actions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Data,
    Actions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub field: String,
    pub header_name: String,
    pub sortable: bool,
    pub kind: ColumnKind,
}

impl Column {
    pub fn data(field: &str) -> Self {
        Self {
            field: field.to_string(),
            header_name: header_name(field),
            sortable: true,
            kind: ColumnKind::Data,
        }
    }

    pub fn actions() -> Self {
        Self {
            field: ACTIONS_FIELD.to_string(),
            header_name: "Actions".to_string(),
            sortable: false,
            kind: ColumnKind::Actions,
        }
    }
}

/// Human-readable header: a space before every ASCII capital, then the
/// first character upper-cased (`targetWeightKg` -> `Target Weight Kg`)
pub fn header_name(key: &str) -> String {
    let mut spaced = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            spaced.push(' ');
        }
        spaced.push(c);
    }

    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub columns: Vec<Column>,
}

impl TableSchema {
    /// Derive the schema from `records` and check every record against it
    pub fn negotiate(records: &[UserRecord]) -> Result<Self> {
        let Some(first) = records.first() else {
            return Ok(Self::default());
        };

        if !first.contains(ID_FIELD) {
            return Err(ConsoleError::malformed(format!(
                "user records carry no '{}' field",
                ID_FIELD
            )));
        }

        let expected: BTreeSet<&str> = first.field_names().collect();
        for (row, record) in records.iter().enumerate().skip(1) {
            let actual: BTreeSet<&str> = record.field_names().collect();
            if actual != expected {
                return Err(ConsoleError::SchemaMismatch {
                    row,
                    missing: expected.difference(&actual).map(|s| s.to_string()).collect(),
                    unexpected: actual.difference(&expected).map(|s| s.to_string()).collect(),
                });
            }
        }

        let mut columns: Vec<Column> = first
            .field_names()
            .filter(|field| *field != SENSITIVE_FIELD)
            .map(Column::data)
            .collect();
        columns.push(Column::actions());

        Ok(Self { columns })
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.field.as_str())
    }

    pub fn data_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.kind == ColumnKind::Data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn records(value: Value) -> Vec<UserRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_header_names() {
        assert_eq!(header_name("userId"), "User Id");
        assert_eq!(header_name("name"), "Name");
        assert_eq!(header_name("targetWeightKg"), "Target Weight Kg");
        assert_eq!(header_name(""), "");
    }

    #[test]
    fn test_sensitive_field_is_excluded() {
        let schema = TableSchema::negotiate(&records(json!([
            {"userId": 1, "name": "Bob", "passwordHash": "x"}
        ])))
        .unwrap();

        let fields: Vec<&str> = schema.fields().collect();
        assert_eq!(fields, vec!["userId", "name", "actions"]);
        assert!(schema.columns.iter().all(|c| c.field != SENSITIVE_FIELD));
    }

    #[test]
    fn test_order_follows_first_record() {
        let schema = TableSchema::negotiate(&records(json!([
            {"name": "Bob", "goal": "strength", "userId": 1},
            {"userId": 2, "goal": "endurance", "name": "Ann"}
        ])))
        .unwrap();

        let fields: Vec<&str> = schema.fields().collect();
        assert_eq!(fields, vec!["name", "goal", "userId", "actions"]);
    }

    #[test]
    fn test_actions_column_is_last_and_not_sortable() {
        let schema = TableSchema::negotiate(&records(json!([{"userId": 1}]))).unwrap();
        let actions = schema.columns.last().unwrap();
        assert_eq!(actions.kind, ColumnKind::Actions);
        assert_eq!(actions.header_name, "Actions");
        assert!(!actions.sortable);
        assert_eq!(schema.data_columns().count(), 1);
    }

    #[test]
    fn test_negotiation_is_idempotent() {
        let rows = records(json!([
            {"userId": 1, "fitnessLevel": "beginner", "passwordHash": "x"},
            {"userId": 2, "fitnessLevel": "advance", "passwordHash": "y"}
        ]));
        let first = TableSchema::negotiate(&rows).unwrap();
        let second = TableSchema::negotiate(&rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_list_yields_empty_schema() {
        let schema = TableSchema::negotiate(&[]).unwrap();
        assert!(schema.is_empty());
    }

    #[test]
    fn test_mismatched_record_fails_loudly() {
        let err = TableSchema::negotiate(&records(json!([
            {"userId": 1, "name": "Bob"},
            {"userId": 2, "email": "ann@x.com"}
        ])))
        .unwrap_err();

        match err {
            ConsoleError::SchemaMismatch { row, missing, unexpected } => {
                assert_eq!(row, 1);
                assert_eq!(missing, vec!["name".to_string()]);
                assert_eq!(unexpected, vec!["email".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_record_needs_identifier() {
        let err = TableSchema::negotiate(&records(json!([{"name": "Bob"}]))).unwrap_err();
        assert!(matches!(err, ConsoleError::Malformed(_)));
    }
}
