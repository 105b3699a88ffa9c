//! Team command handlers

use anyhow::{Context, Result};

use crate::cli::TeamCommands;
use crate::client::AdminApi;
use crate::commands::Console;
use crate::guard::Route;
use crate::output::{self, OutputFormat};
use crate::session::SessionStore;
use crate::utils::confirm_operation;
use crate::views::{DeleteOutcome, TeamView};

pub async fn handle_command<A: AdminApi, S: SessionStore>(
    console: &mut Console<A, S>,
    command: Option<&TeamCommands>,
) -> Result<()> {
    match command {
        None | Some(TeamCommands::List) => {
            let view = load_team(console).await?;
            show_team(console, &view)
        }
        Some(TeamCommands::Delete { id, force }) => {
            let mut view = load_team(console).await?;
            delete_user(console, &mut view, id, *force).await?;
            Ok(())
        }
    }
}

/// Enter /team and fetch the user list
pub async fn load_team<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>) -> Result<TeamView> {
    console.enter(Route::Team)?;

    let spinner = console.spinner("Loading users...");
    let result = TeamView::load(console.api.as_ref()).await;
    spinner.finish();

    match result {
        Ok(view) => Ok(view),
        Err(e) => {
            if console.output.format == OutputFormat::Table {
                println!("{}", output::info("No users found", console.color()));
            }
            Err(e).context("Failed to load users")
        }
    }
}

pub fn show_team<A: AdminApi, S: SessionStore>(console: &Console<A, S>, view: &TeamView) -> Result<()> {
    if view.is_empty() && console.output.format == OutputFormat::Table {
        println!("{}", output::info("No users found", console.color()));
        return Ok(());
    }
    output::display(view, &console.output)
}

/// Ask for confirmation, then delete. Returns what happened so the console
/// can refresh its table.
pub async fn delete_user<A: AdminApi, S: SessionStore>(
    console: &Console<A, S>,
    view: &mut TeamView,
    id: &str,
    force: bool,
) -> Result<DeleteOutcome> {
    let color = console.color();
    let mut prompt_error = None;

    let outcome = view
        .delete(console.api.as_ref(), id, |id| {
            let message = format!("Are you sure you want to delete user '{}'? This action cannot be undone.", id);
            confirm_operation(&message, force).unwrap_or_else(|e| {
                prompt_error = Some(e);
                false
            })
        })
        .await
        .with_context(|| format!("Failed to delete user {}", id))?;

    if let Some(e) = prompt_error {
        return Err(e.context("Confirmation prompt failed"));
    }

    match outcome {
        DeleteOutcome::Cancelled => println!("{}", output::info("Operation cancelled", color)),
        DeleteOutcome::Deleted => {
            println!("{}", output::success(&format!("User {} deleted", id), color))
        }
    }
    Ok(outcome)
}
