//! Update command handler and the interactive edit form

use anyhow::{Context, Result};
use dialoguer::{Input, MultiSelect, Select};
use serde_json::Value;

use fitfuel_common::types::{ChoiceSet, FieldKind, FormField, EQUIPMENT_OPTIONS, FORM_FIELDS};

use crate::cli::UpdateArgs;
use crate::client::AdminApi;
use crate::commands::Console;
use crate::guard::Route;
use crate::output;
use crate::session::SessionStore;
use crate::utils::parse_key_value_pairs;
use crate::views::EditView;

pub async fn handle_update<A: AdminApi, S: SessionStore>(
    console: &mut Console<A, S>,
    args: &UpdateArgs,
) -> Result<()> {
    console.enter(Route::Update { id: args.id.clone() })?;
    let color = console.color();

    let spinner = console.spinner("Loading user...");
    let loaded = EditView::load(console.api.as_ref(), &args.id).await;
    spinner.finish();
    let mut view = match loaded {
        Ok(view) => view,
        Err(e) => {
            println!("{}", output::error("User not found", color));
            return Err(e).with_context(|| format!("Failed to load user {}", args.id));
        }
    };

    if args.has_edits() {
        apply_args(&mut view, args)?;
    } else if !edit_form(&mut view, color)? {
        let next = view.cancel();
        console.enter(next)?;
        println!("{}", output::info("Edit cancelled", color));
        return Ok(());
    }

    save(console, &view).await
}

/// Submit the edited record and go back to the team list
pub async fn save<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>, view: &EditView) -> Result<()> {
    let next = view
        .submit(console.api.as_ref())
        .await
        .with_context(|| format!("Failed to update user {}", view.id()))?;
    console.enter(next)?;
    println!("{}", output::success("User updated successfully!", console.color()));
    Ok(())
}

/// Next step after a failed save
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryChoice {
    Retry,
    Cancel,
}

/// Submit until the backend accepts or the operator cancels. The view and
/// its edits stay in place across failed attempts; `on_failure` may change
/// them before the next try. Returns true once saved.
pub async fn save_with_retry<A, S, F>(
    console: &mut Console<A, S>,
    mut view: EditView,
    mut on_failure: F,
) -> Result<bool>
where
    A: AdminApi,
    S: SessionStore,
    F: FnMut(&mut EditView) -> Result<RetryChoice>,
{
    loop {
        match save(console, &view).await {
            Ok(()) => return Ok(true),
            Err(e) => {
                println!("{}", output::error(&format!("{:#}", e), console.color()));
                if on_failure(&mut view)? == RetryChoice::Cancel {
                    console.enter(view.cancel())?;
                    return Ok(false);
                }
            }
        }
    }
}

/// Apply field flags in form order, then the raw `--set` pairs
pub fn apply_args(view: &mut EditView, args: &UpdateArgs) -> Result<()> {
    for (field, value) in args.field_values() {
        view.set(field, value)?;
    }

    if let Some(items) = &args.equipment {
        let items: Vec<&str> = items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        view.set_equipment(&items)?;
    }

    for (key, value) in parse_key_value_pairs(&args.set)? {
        view.set(&key, &value)?;
    }
    Ok(())
}

/// Walk the form top to bottom. Returns true when the operator saves.
pub fn edit_form(view: &mut EditView, color: bool) -> Result<bool> {
    println!("Editing user {}", view.id());

    for field in FORM_FIELDS.iter() {
        loop {
            match prompt_field(view, field) {
                Ok(()) => break,
                Err(e) => match e.downcast_ref::<fitfuel_common::ConsoleError>() {
                    // invalid input: show it and ask again
                    Some(invalid) => println!("{}", output::warning(&invalid.to_string(), color)),
                    None => return Err(e),
                },
            }
        }
    }

    let choice = Select::new()
        .with_prompt("Save changes?")
        .items(&["Save", "Cancel"])
        .default(0)
        .interact()?;
    Ok(choice == 0)
}

/// What the operator answered for one form field
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    Text(String),
    /// `None` when the field was left unset
    Choice(Option<&'static str>),
    Equipment(Vec<&'static str>),
}

pub const LEAVE_UNSET: &str = "(leave unset)";

/// Entries of a choice prompt. A record with no valid value for the field
/// gets a leading "leave unset" entry, selected by default.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceMenu {
    set: &'static ChoiceSet,
    unset_entry: bool,
    default: usize,
}

impl ChoiceMenu {
    pub fn new(set: &'static ChoiceSet, current: &str) -> Self {
        match set.position(current) {
            Some(index) => Self { set, unset_entry: false, default: index },
            None => Self { set, unset_entry: true, default: 0 },
        }
    }

    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels = Vec::with_capacity(self.set.options.len() + 1);
        if self.unset_entry {
            labels.push(LEAVE_UNSET);
        }
        labels.extend(self.set.labels());
        labels
    }

    pub fn default_index(&self) -> usize {
        self.default
    }

    /// Wire value behind a selected entry
    pub fn pick(&self, index: usize) -> Option<&'static str> {
        let index = if self.unset_entry { index.checked_sub(1)? } else { index };
        self.set.options.get(index).map(|(value, _)| *value)
    }
}

/// Apply one answer to the view. A blank or unset answer for a field the
/// record does not carry leaves the record untouched.
pub fn apply_answer(view: &mut EditView, field: &FormField, answer: Answer) -> fitfuel_common::Result<()> {
    let present = !matches!(view.record().get(field.field), None | Some(Value::Null));

    match answer {
        Answer::Text(value) => {
            if value.trim().is_empty() && (field.kind == FieldKind::Number || !present) {
                return Ok(());
            }
            view.set(field.field, &value)
        }
        Answer::Choice(None) => Ok(()),
        Answer::Choice(Some(value)) => view.set_choice(field.field, value),
        Answer::Equipment(items) => {
            if items.is_empty() && !present {
                return Ok(());
            }
            view.set_equipment(&items)
        }
    }
}

fn prompt_field(view: &mut EditView, field: &FormField) -> Result<()> {
    let answer = match field.kind {
        FieldKind::Text | FieldKind::Number => {
            let current = current_text(view.record().get(field.field));
            let value: String = Input::new()
                .with_prompt(field.label)
                .with_initial_text(current)
                .allow_empty(true)
                .interact_text()?;
            Answer::Text(value)
        }
        FieldKind::Choice(set) => {
            let menu = ChoiceMenu::new(set, &current_text(view.record().get(field.field)));
            let index = Select::new()
                .with_prompt(field.label)
                .items(&menu.labels()[..])
                .default(menu.default_index())
                .interact()?;
            Answer::Choice(menu.pick(index))
        }
        FieldKind::Equipment => {
            let selected = view.equipment();
            let checked: Vec<bool> = EQUIPMENT_OPTIONS
                .iter()
                .map(|item| selected.iter().any(|s| s == item))
                .collect();
            let picked = MultiSelect::new()
                .with_prompt(field.label)
                .items(&EQUIPMENT_OPTIONS)
                .defaults(&checked)
                .interact()?;
            Answer::Equipment(picked.into_iter().map(|i| EQUIPMENT_OPTIONS[i]).collect())
        }
    };
    apply_answer(view, field, answer)?;
    Ok(())
}

fn current_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::session::MemorySessionStore;
    use crate::test_utils::MockApi;
    use fitfuel_common::types::KEY_USER_ID;
    use fitfuel_common::ConsoleError;
    use serde_json::json;

    fn console() -> Console<MockApi, MemorySessionStore> {
        let api = MockApi::new().with_users(vec![json!({
            "userId": 5,
            "name": "Kim",
            "equipment": "Dumbbell",
            "availability": 4
        })]);
        let mut config = ConsoleConfig::default();
        config.output.color = false;
        let console = Console::new(api, MemorySessionStore::new(), config);
        console.store.write(KEY_USER_ID, "1").unwrap();
        console
    }

    fn args(id: &str) -> UpdateArgs {
        UpdateArgs {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_flag_update_sends_payload_and_returns_to_team() {
        let mut console = console();
        let args = UpdateArgs {
            goal: Some("endurance".into()),
            availability: Some("5".into()),
            equipment: Some(vec!["Sled".into(), "Barbell".into()]),
            set: vec!["city=Oslo".into()],
            ..args("5")
        };

        handle_update(&mut console, &args).await.unwrap();
        assert_eq!(console.navigator.current(), Some(&Route::Team));

        let updates = console.api.updates();
        let (id, payload) = &updates[0];
        assert_eq!(id, "5");
        assert_eq!(payload.get("goal"), Some(&json!("endurance")));
        assert_eq!(payload.get("availability"), Some(&json!(5)));
        assert_eq!(payload.get("equipment"), Some(&json!("Sled, Barbell")));
        assert_eq!(payload.get("city"), Some(&json!("Oslo")));
    }

    #[tokio::test]
    async fn test_invalid_flag_sends_nothing() {
        let mut console = console();
        let args = UpdateArgs {
            gender: Some("other".into()),
            ..args("5")
        };

        assert!(handle_update(&mut console, &args).await.is_err());
        assert!(console.api.updates().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_fails() {
        let mut console = console();
        let args = UpdateArgs {
            name: Some("x".into()),
            ..args("404")
        };
        assert!(handle_update(&mut console, &args).await.is_err());
    }

    /// What pressing Enter through every prompt would answer
    fn enter_through(view: &EditView, field: &FormField) -> Answer {
        match field.kind {
            FieldKind::Text | FieldKind::Number => Answer::Text(current_text(view.record().get(field.field))),
            FieldKind::Choice(set) => {
                let menu = ChoiceMenu::new(set, &current_text(view.record().get(field.field)));
                Answer::Choice(menu.pick(menu.default_index()))
            }
            FieldKind::Equipment => Answer::Equipment(
                EQUIPMENT_OPTIONS
                    .iter()
                    .copied()
                    .filter(|item| view.equipment().iter().any(|s| s == item))
                    .collect(),
            ),
        }
    }

    #[tokio::test]
    async fn test_untouched_form_leaves_missing_fields_absent() {
        let api = MockApi::new().with_users(vec![json!({"userId": 5, "name": "Kim"})]);
        let mut view = EditView::load(&api, "5").await.unwrap();

        for field in FORM_FIELDS.iter() {
            let answer = enter_through(&view, field);
            apply_answer(&mut view, field, answer).unwrap();
        }

        let payload = view.payload();
        assert_eq!(payload.field_names().collect::<Vec<_>>(), vec!["userId", "name"]);
        assert_eq!(payload.get("name"), Some(&json!("Kim")));
    }

    #[tokio::test]
    async fn test_untouched_form_keeps_present_values() {
        let api = MockApi::new().with_users(vec![json!({
            "userId": 5,
            "gender": "female",
            "availability": 4,
            "equipment": "Sled, Dumbbell"
        })]);
        let mut view = EditView::load(&api, "5").await.unwrap();

        for field in FORM_FIELDS.iter() {
            let answer = enter_through(&view, field);
            apply_answer(&mut view, field, answer).unwrap();
        }

        let payload = view.payload();
        assert_eq!(payload.get("gender"), Some(&json!("female")));
        assert_eq!(payload.get("availability"), Some(&json!(4)));
        assert!(payload.get("goal").is_none());
    }

    #[test]
    fn test_choice_menu_offers_unset_for_missing_value() {
        let menu = ChoiceMenu::new(&fitfuel_common::types::GENDER, "");
        assert_eq!(menu.labels()[0], LEAVE_UNSET);
        assert_eq!(menu.default_index(), 0);
        assert_eq!(menu.pick(0), None);
        assert_eq!(menu.pick(1), Some(fitfuel_common::types::GENDER.options[0].0));

        let menu = ChoiceMenu::new(&fitfuel_common::types::GENDER, "female");
        assert!(!menu.labels().contains(&LEAVE_UNSET));
        assert_eq!(menu.pick(menu.default_index()), Some("female"));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits_for_retry() {
        let api = MockApi::new()
            .with_users(vec![json!({"userId": 5, "name": "Kim"})])
            .failing("update", ConsoleError::status(500, "boom"));
        let mut config = ConsoleConfig::default();
        config.output.color = false;
        let mut console = Console::new(api, MemorySessionStore::new(), config);
        console.store.write(KEY_USER_ID, "1").unwrap();

        let mut view = EditView::load(console.api.as_ref(), "5").await.unwrap();
        view.set("name", "Kimberly").unwrap();

        let mut failures = 0;
        let saved = save_with_retry(&mut console, view, |view| {
            failures += 1;
            assert_eq!(view.record().get("name"), Some(&json!("Kimberly")));
            Ok(RetryChoice::Retry)
        })
        .await
        .unwrap();

        assert!(saved);
        assert_eq!(failures, 1);
        let updates = console.api.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.get("name"), Some(&json!("Kimberly")));
        assert_eq!(console.navigator.current(), Some(&Route::Team));
    }

    #[tokio::test]
    async fn test_cancel_after_failed_save_sends_nothing_more() {
        let api = MockApi::new()
            .with_users(vec![json!({"userId": 5, "name": "Kim"})])
            .failing("update", ConsoleError::status(500, "boom"));
        let mut console = Console::new(api, MemorySessionStore::new(), ConsoleConfig::default());
        console.store.write(KEY_USER_ID, "1").unwrap();

        let view = EditView::load(console.api.as_ref(), "5").await.unwrap();
        let saved = save_with_retry(&mut console, view, |_| Ok(RetryChoice::Cancel))
            .await
            .unwrap();

        assert!(!saved);
        assert!(console.api.updates().is_empty());
        assert_eq!(console.navigator.current(), Some(&Route::Team));
    }

    #[test]
    fn test_current_text() {
        assert_eq!(current_text(Some(&json!(4))), "4");
        assert_eq!(current_text(Some(&json!("fat loss"))), "fat loss");
        assert_eq!(current_text(None), "");
    }
}
