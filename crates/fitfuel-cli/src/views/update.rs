//! User edit view
//!
//! Holds one record loaded from the backend plus the operator's pending
//! edits. Every setter validates before touching the record, so the payload
//! sent on submit only ever carries values the form could have produced.

use fitfuel_common::equipment::{equipment_list, flatten_equipment, normalize_equipment};
use fitfuel_common::types::{
    choice_set, form_field, is_equipment_option, FieldKind, UserRecord, EQUIPMENT_FIELD,
    EQUIPMENT_OPTIONS,
};
use fitfuel_common::{ConsoleError, Result};
use serde_json::{Number, Value};
use tracing::{debug, error, info};

use crate::client::AdminApi;
use crate::guard::Route;

#[derive(Debug, Clone, PartialEq)]
pub struct EditView {
    id: String,
    record: UserRecord,
}

impl EditView {
    pub async fn load<A: AdminApi>(api: &A, id: &str) -> Result<Self> {
        let mut record = api.get_user(id).await.map_err(|e| {
            error!("Failed to fetch user {}: {}", id, e);
            e
        })?;
        normalize_equipment(&mut record);
        debug!("Loaded user {} for editing", id);

        Ok(Self {
            id: id.to_string(),
            record,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &UserRecord {
        &self.record
    }

    pub fn equipment(&self) -> Vec<String> {
        equipment_list(&self.record)
    }

    /// Set any field from its textual form, dispatching on the form layout.
    /// Fields outside the form are stored as raw strings.
    pub fn set(&mut self, field: &str, raw: &str) -> Result<()> {
        match form_field(field).map(|f| f.kind) {
            Some(FieldKind::Text) => self.set_text(field, raw),
            Some(FieldKind::Number) => self.set_number(field, raw),
            Some(FieldKind::Choice(_)) => self.set_choice(field, raw),
            Some(FieldKind::Equipment) => {
                let items: Vec<&str> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect();
                self.set_equipment(&items)
            }
            None => self.set_raw(field, raw),
        }
    }

    pub fn set_text(&mut self, field: &str, value: &str) -> Result<()> {
        self.record.insert(field, Value::String(value.to_string()));
        Ok(())
    }

    /// Integral input is stored as a JSON integer, anything else as a float
    pub fn set_number(&mut self, field: &str, raw: &str) -> Result<()> {
        let raw = raw.trim();
        let parsed: f64 = raw
            .parse()
            .map_err(|_| ConsoleError::invalid_input(format!("{} must be a number, got '{}'", field, raw)))?;

        let value = if parsed.fract() == 0.0 && parsed.abs() < i64::MAX as f64 {
            Value::from(parsed as i64)
        } else {
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| ConsoleError::invalid_input(format!("{} must be finite", field)))?
        };

        self.record.insert(field, value);
        Ok(())
    }

    pub fn set_choice(&mut self, field: &str, value: &str) -> Result<()> {
        let set = choice_set(field)
            .ok_or_else(|| ConsoleError::invalid_input(format!("{} is not a choice field", field)))?;
        let wire = set.to_wire(value)?;
        self.record.insert(field, wire);
        Ok(())
    }

    /// Replace the equipment selection. Items must come from the closed
    /// list; repeats are dropped and the first occurrence keeps its place.
    pub fn set_equipment<S: AsRef<str>>(&mut self, items: &[S]) -> Result<()> {
        let mut selected: Vec<String> = Vec::with_capacity(items.len());
        for item in items {
            let item = item.as_ref().trim();
            if !is_equipment_option(item) {
                return Err(ConsoleError::invalid_choice(EQUIPMENT_FIELD, item, &EQUIPMENT_OPTIONS));
            }
            if !selected.iter().any(|s| s == item) {
                selected.push(item.to_string());
            }
        }

        self.record.insert(
            EQUIPMENT_FIELD,
            Value::Array(selected.into_iter().map(Value::String).collect()),
        );
        Ok(())
    }

    pub fn set_raw(&mut self, field: &str, value: &str) -> Result<()> {
        if field.trim().is_empty() {
            return Err(ConsoleError::invalid_input("field name cannot be empty"));
        }
        self.record.insert(field.trim(), Value::String(value.to_string()));
        Ok(())
    }

    /// The record as it would be sent, equipment joined back into a string
    pub fn payload(&self) -> UserRecord {
        let mut payload = self.record.clone();
        flatten_equipment(&mut payload);
        payload
    }

    /// Send the whole record back. Edits survive a failed submit.
    pub async fn submit<A: AdminApi>(&self, api: &A) -> Result<Route> {
        let payload = self.payload();
        if let Err(e) = api.update_user(&self.id, &payload).await {
            error!("Failed to update user {}: {}", self.id, e);
            return Err(e);
        }

        info!("User updated successfully!");
        Ok(Route::Team)
    }

    pub fn cancel(self) -> Route {
        debug!("Edit of user {} discarded", self.id);
        Route::Team
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockApi;
    use serde_json::json;

    fn api() -> MockApi {
        MockApi::new().with_users(vec![json!({
            "userId": 7,
            "name": "Ann",
            "email": "ann@x.com",
            "age": 30,
            "goal": "strength",
            "availability": 3,
            "equipment": "Dumbbell, Kettlebell",
            "passwordHash": "h"
        })])
    }

    #[tokio::test]
    async fn test_load_normalizes_equipment() {
        let view = EditView::load(&api(), "7").await.unwrap();
        assert_eq!(view.id(), "7");
        assert_eq!(
            view.record().get("equipment"),
            Some(&json!(["Dumbbell", "Kettlebell"]))
        );
        assert_eq!(view.equipment(), vec!["Dumbbell", "Kettlebell"]);
    }

    #[tokio::test]
    async fn test_load_missing_user() {
        let err = EditView::load(&api(), "99").await.unwrap_err();
        assert!(matches!(err, ConsoleError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_setters_validate() {
        let mut view = EditView::load(&api(), "7").await.unwrap();

        view.set("age", "31").unwrap();
        assert_eq!(view.record().get("age"), Some(&json!(31)));
        view.set("weightKg", "72.5").unwrap();
        assert_eq!(view.record().get("weightKg"), Some(&json!(72.5)));
        assert!(view.set("heightCm", "tall").is_err());

        view.set("goal", "fat loss").unwrap();
        assert_eq!(view.record().get("goal"), Some(&json!("fat loss")));
        assert!(matches!(
            view.set("goal", "bulk"),
            Err(ConsoleError::InvalidChoice { .. })
        ));

        view.set("availability", "5").unwrap();
        assert_eq!(view.record().get("availability"), Some(&json!(5)));
        assert!(view.set("availability", "6").is_err());

        view.set("nickname", "annie").unwrap();
        assert_eq!(view.record().get("nickname"), Some(&json!("annie")));
    }

    #[tokio::test]
    async fn test_equipment_selection_rules() {
        let mut view = EditView::load(&api(), "7").await.unwrap();

        view.set_equipment(&["Barbell", "Sled", "Barbell"]).unwrap();
        assert_eq!(view.equipment(), vec!["Barbell", "Sled"]);

        let err = view.set_equipment(&["Treadmill"]).unwrap_err();
        assert!(matches!(err, ConsoleError::InvalidChoice { .. }));
        // rejected selection leaves the previous one in place
        assert_eq!(view.equipment(), vec!["Barbell", "Sled"]);

        view.set("equipment", "").unwrap();
        assert!(view.equipment().is_empty());
    }

    #[tokio::test]
    async fn test_submit_flattens_equipment() {
        let api = api();
        let mut view = EditView::load(&api, "7").await.unwrap();
        view.set_equipment(&["Barbell", "Sled"]).unwrap();
        view.set("name", "Anna").unwrap();

        assert_eq!(view.submit(&api).await.unwrap(), Route::Team);

        let updates = api.updates();
        assert_eq!(updates.len(), 1);
        let (id, payload) = &updates[0];
        assert_eq!(id, "7");
        assert_eq!(payload.get("equipment"), Some(&json!("Barbell, Sled")));
        assert_eq!(payload.get("name"), Some(&json!("Anna")));
        // untouched fields are echoed back
        assert_eq!(payload.get("passwordHash"), Some(&json!("h")));
    }

    #[tokio::test]
    async fn test_failed_submit_keeps_edits() {
        let api = api().failing("update", ConsoleError::status(400, "bad"));
        let mut view = EditView::load(&api, "7").await.unwrap();
        view.set("name", "Anna").unwrap();

        assert!(view.submit(&api).await.is_err());
        assert_eq!(view.record().get("name"), Some(&json!("Anna")));
        assert!(api.updates().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_sends_nothing() {
        let api = api();
        let view = EditView::load(&api, "7").await.unwrap();
        assert_eq!(view.cancel(), Route::Team);
        assert!(api.updates().is_empty());
    }
}
