//! Type definitions shared by the admin console
//!
//! Session state, the open-ended user record echoed by the admin API,
//! login payloads and the closed option sets behind the edit form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ConsoleError, Result};

/// Session entry keys, as persisted in the session store
pub const KEY_USER_ID: &str = "userId";
pub const KEY_USER_NAME: &str = "userName";
pub const KEY_USER_EMAIL: &str = "userEmail";
pub const KEY_IS_ADMIN: &str = "isAdmin";

/// Entries whose absence means "logged out"
pub const GUARD_KEYS: [&str; 3] = [KEY_USER_ID, KEY_USER_NAME, KEY_USER_EMAIL];

/// Identifier field of a user record on the wire
pub const ID_FIELD: &str = "userId";

/// Row alias required by the table renderer
pub const ROW_ID_FIELD: &str = "id";

pub const EQUIPMENT_FIELD: &str = "equipment";

/// Logged-in operator, written after an accepted admin login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub is_admin: bool,
}

impl Session {
    /// Flat string entries in the order they are written. The user id comes
    /// last: the guard keys on it, so it must not land before the rest.
    pub fn entries(&self) -> [(&'static str, String); 4] {
        [
            (KEY_USER_NAME, self.user_name.clone()),
            (KEY_USER_EMAIL, self.user_email.clone()),
            (KEY_IS_ADMIN, self.is_admin.to_string()),
            (KEY_USER_ID, self.user_id.clone()),
        ]
    }
}

/// A user as returned by the admin API.
///
/// The backend owns the shape, so the record is kept as an ordered map and
/// echoed back verbatim on update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a JSON value, which must be an object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(ConsoleError::malformed(format!(
                "expected a user object, got {}",
                json_kind(&other)
            ))),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field names in response order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// The record's identifier, rendered as a string
    pub fn user_id(&self) -> Option<String> {
        self.0.get(ID_FIELD).and_then(scalar_to_string)
    }

    /// Copy with the `id` alias the table renderer keys rows by
    pub fn with_row_id(&self) -> Self {
        let mut row = self.clone();
        if let Some(id) = self.0.get(ID_FIELD) {
            row.0.insert(ROW_ID_FIELD.to_string(), id.clone());
        }
        row
    }

    /// Display text for a single cell
    pub fn display_value(&self, field: &str) -> String {
        match self.0.get(field) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| scalar_to_string(item).unwrap_or_else(|| item.to_string()))
                .collect::<Vec<_>>()
                .join(", "),
            Some(other) => other.to_string(),
        }
    }
}

impl From<Map<String, Value>> for UserRecord {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Parsed body of the authentication endpoint.
///
/// The backend has shipped both camelCase and PascalCase variants of the
/// identity fields; the first non-null one wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LoginResponse {
    pub message: Option<String>,
    pub user_id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl LoginResponse {
    pub fn from_value(value: &Value) -> Result<Self> {
        let obj = value.as_object().ok_or_else(|| {
            ConsoleError::malformed(format!(
                "expected a login object, got {}",
                json_kind(value)
            ))
        })?;

        Ok(Self {
            message: first_present(obj, &["message"]),
            user_id: first_present(obj, &["userId", "UserId"]),
            name: first_present(obj, &["name", "Name"]),
            email: first_present(obj, &["email", "Email"]),
        })
    }
}

fn first_present(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find_map(scalar_to_string)
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A closed single-choice set on the edit form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceSet {
    pub field: &'static str,
    pub label: &'static str,
    /// (wire value, display label)
    pub options: &'static [(&'static str, &'static str)],
    /// Sent as a JSON number instead of a string
    pub numeric: bool,
}

impl ChoiceSet {
    pub fn values(&self) -> Vec<&'static str> {
        self.options.iter().map(|(value, _)| *value).collect()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.options.iter().map(|(_, label)| *label).collect()
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.options.iter().position(|(v, _)| *v == value)
    }

    /// Validate `value` and convert it to its wire representation
    pub fn to_wire(&self, value: &str) -> Result<Value> {
        let value = value.trim();
        if self.position(value).is_none() {
            return Err(ConsoleError::invalid_choice(self.field, value, &self.values()));
        }

        if self.numeric {
            let n: i64 = value
                .parse()
                .map_err(|_| ConsoleError::invalid_choice(self.field, value, &self.values()))?;
            Ok(Value::from(n))
        } else {
            Ok(Value::String(value.to_string()))
        }
    }
}

pub const GENDER: ChoiceSet = ChoiceSet {
    field: "gender",
    label: "Gender",
    options: &[("male", "Male"), ("female", "Female")],
    numeric: false,
};

pub const GOAL: ChoiceSet = ChoiceSet {
    field: "goal",
    label: "Goal",
    options: &[
        ("fat loss", "Fat Loss"),
        ("endurance", "Endurance"),
        ("muscle gain", "Muscle Gain"),
        ("strength", "Strength"),
    ],
    numeric: false,
};

pub const FITNESS_LEVEL: ChoiceSet = ChoiceSet {
    field: "fitnessLevel",
    label: "Fitness Level",
    options: &[
        ("beginner", "Beginner"),
        ("intermediate", "Intermediate"),
        ("advance", "Advance"),
    ],
    numeric: false,
};

pub const AVAILABILITY: ChoiceSet = ChoiceSet {
    field: "availability",
    label: "Availability (days/week)",
    options: &[("3", "3"), ("4", "4"), ("5", "5")],
    numeric: true,
};

pub const ACTIVITY_LEVEL: ChoiceSet = ChoiceSet {
    field: "activityLevel",
    label: "Activity Level",
    options: &[
        ("sedentary", "Sedentary"),
        ("light", "Light"),
        ("moderate", "Moderate"),
        ("active", "Active"),
        ("very active", "Very Active"),
    ],
    numeric: false,
};

pub static CHOICE_SETS: [ChoiceSet; 5] = [GENDER, GOAL, FITNESS_LEVEL, AVAILABILITY, ACTIVITY_LEVEL];

pub fn choice_set(field: &str) -> Option<&'static ChoiceSet> {
    CHOICE_SETS.iter().find(|set| set.field == field)
}

/// Closed list offered by the equipment multi-select
pub const EQUIPMENT_OPTIONS: [&str; 31] = [
    "Parallette Bars",
    "Suspension Trainer",
    "Gymnastic Rings",
    "Dumbbell",
    "Cable",
    "Barbell",
    "EZ Bar",
    "Stability Ball",
    "Bodyweight",
    "Landmine",
    "Superband",
    "Kettlebell",
    "Resistance Band",
    "Weight Plate",
    "Macebell",
    "Indian Club",
    "Clubbell",
    "Pull Up Bar",
    "Tire",
    "Trap Bar",
    "Battle Ropes",
    "Sliders",
    "Miniband",
    "Sandbag",
    "Bulgarian Bag",
    "Sled",
    "Heavy Sandbag",
    "Slam Ball",
    "Ab Wheel",
    "Medicine Ball",
    "Wall Ball",
];

pub fn is_equipment_option(item: &str) -> bool {
    EQUIPMENT_OPTIONS.contains(&item)
}

/// How a form field is edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Choice(&'static ChoiceSet),
    Equipment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormField {
    pub field: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

/// Edit form layout, top to bottom
pub static FORM_FIELDS: [FormField; 12] = [
    FormField { field: "name", label: "Name", kind: FieldKind::Text },
    FormField { field: "email", label: "Email", kind: FieldKind::Text },
    FormField { field: "age", label: "Age", kind: FieldKind::Number },
    FormField { field: "heightCm", label: "Height (cm)", kind: FieldKind::Number },
    FormField { field: "weightKg", label: "Weight (kg)", kind: FieldKind::Number },
    FormField { field: "targetWeightKg", label: "Target Weight (kg)", kind: FieldKind::Number },
    FormField { field: "gender", label: "Gender", kind: FieldKind::Choice(&GENDER) },
    FormField { field: "goal", label: "Goal", kind: FieldKind::Choice(&GOAL) },
    FormField { field: "fitnessLevel", label: "Fitness Level", kind: FieldKind::Choice(&FITNESS_LEVEL) },
    FormField { field: "availability", label: "Availability (days/week)", kind: FieldKind::Choice(&AVAILABILITY) },
    FormField { field: "activityLevel", label: "Activity Level", kind: FieldKind::Choice(&ACTIVITY_LEVEL) },
    FormField { field: "equipment", label: "Equipment", kind: FieldKind::Equipment },
];

pub fn form_field(field: &str) -> Option<&'static FormField> {
    FORM_FIELDS.iter().find(|f| f.field == field)
}
