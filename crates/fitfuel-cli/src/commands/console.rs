//! Interactive console
//!
//! A navigation shell over the same routes as the subcommands. The top bar
//! and sidebar are only drawn while an operator is logged in; otherwise the
//! console sits on the login prompt.

use anyhow::Result;
use dialoguer::{Confirm, Input, Select};
use tracing::debug;

use crate::client::AdminApi;
use crate::commands::update::{self, RetryChoice};
use crate::commands::{auth, team, Console};
use crate::guard::Route;
use crate::output;
use crate::session::SessionStore;
use crate::views::{DashboardView, EditView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    Dashboard,
    Team,
    Logout,
    Quit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 4] = [MenuItem::Dashboard, MenuItem::Team, MenuItem::Logout, MenuItem::Quit];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Dashboard => "Dashboard",
            MenuItem::Team => "Team",
            MenuItem::Logout => "Logout",
            MenuItem::Quit => "Quit",
        }
    }

    /// Route behind the item; `Quit` leaves the console instead
    pub fn route(&self) -> Option<Route> {
        match self {
            MenuItem::Dashboard => Some(Route::Dashboard),
            MenuItem::Team => Some(Route::Team),
            MenuItem::Logout => Some(Route::Logout),
            MenuItem::Quit => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TeamAction {
    Edit,
    Delete,
    Refresh,
    Back,
}

const TEAM_ACTIONS: [(TeamAction, &str); 4] = [
    (TeamAction::Edit, "Edit a user"),
    (TeamAction::Delete, "Delete a user"),
    (TeamAction::Refresh, "Refresh"),
    (TeamAction::Back, "Back"),
];

pub async fn run<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>) -> Result<()> {
    let color = console.color();

    loop {
        if !console.navigator.guard().shell_visible() {
            console.enter(Route::Login)?;
            if !login_prompt(console).await? {
                break;
            }
            continue;
        }

        let operator = console
            .store
            .load_session()?
            .map(|s| format!("{} <{}>", s.user_name, s.user_email))
            .unwrap_or_default();
        println!();
        println!("{}", output::top_bar(&operator, color));

        let labels: Vec<&str> = MenuItem::ALL.iter().map(MenuItem::label).collect();
        let index = Select::new()
            .with_prompt("Menu")
            .items(&labels[..])
            .default(0)
            .interact()?;

        let Some(route) = MenuItem::ALL[index].route() else {
            debug!("Leaving console");
            break;
        };

        // a failing view reports and returns to the menu
        if let Err(e) = show(console, route).await {
            println!("{}", output::error(&format!("{:#}", e), color));
        }
    }

    Ok(())
}

/// One login attempt. Returns false when the operator gives up.
async fn login_prompt<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>) -> Result<bool> {
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = dialoguer::Password::new().with_prompt("Password").interact()?;

    match auth::submit_login(console, crate::auth::LoginForm::new(email, password)).await {
        Ok(()) => Ok(true),
        Err(_) => Ok(Confirm::new()
            .with_prompt("Try again?")
            .default(true)
            .interact()?),
    }
}

async fn show<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>, route: Route) -> Result<()> {
    match route {
        Route::Team => team_screen(console).await,
        Route::Logout => auth::handle_logout(console),
        other => {
            console.enter(other)?;
            let view = DashboardView::load(console.store.as_ref())?;
            output::display(&view, &console.output)
        }
    }
}

async fn team_screen<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>) -> Result<()> {
    let mut view = team::load_team(console).await?;

    loop {
        team::show_team(console, &view)?;

        let labels: Vec<&str> = TEAM_ACTIONS.iter().map(|(_, label)| *label).collect();
        let index = Select::new()
            .with_prompt("Team")
            .items(&labels[..])
            .default(0)
            .interact()?;

        let color = console.color();
        match TEAM_ACTIONS[index].0 {
            TeamAction::Edit => {
                let id = ask_id(&view)?;
                if let Err(e) = edit_user(console, &id).await {
                    println!("{}", output::error(&format!("{:#}", e), color));
                }
                view = team::load_team(console).await?;
            }
            TeamAction::Delete => {
                let id = ask_id(&view)?;
                // the row stays listed; the operator can retry or move on
                if let Err(e) = team::delete_user(console, &mut view, &id, false).await {
                    println!("{}", output::error(&format!("{:#}", e), color));
                }
            }
            TeamAction::Refresh => view = team::load_team(console).await?,
            TeamAction::Back => return Ok(()),
        }
    }
}

async fn edit_user<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>, id: &str) -> Result<()> {
    console.enter(Route::Update { id: id.to_string() })?;
    let mut view = match EditView::load(console.api.as_ref(), id).await {
        Ok(view) => view,
        Err(e) => {
            println!("{}", output::error("User not found", console.color()));
            return Err(e.into());
        }
    };

    let color = console.color();
    if !update::edit_form(&mut view, color)? {
        console.enter(view.cancel())?;
        return Ok(());
    }

    update::save_with_retry(console, view, |view| after_failed_save(view, color)).await?;
    Ok(())
}

/// Offer to resend, revisit the form or give up after a failed save
fn after_failed_save(view: &mut EditView, color: bool) -> Result<RetryChoice> {
    let choice = Select::new()
        .with_prompt("Save failed")
        .items(&["Save again", "Edit fields", "Cancel"])
        .default(0)
        .interact()?;

    Ok(match choice {
        0 => RetryChoice::Retry,
        1 if update::edit_form(view, color)? => RetryChoice::Retry,
        _ => RetryChoice::Cancel,
    })
}

fn ask_id(view: &crate::views::TeamView) -> Result<String> {
    let ids: Vec<String> = view.rows().iter().filter_map(|r| r.user_id()).collect();
    if ids.is_empty() {
        anyhow::bail!("No users to choose from");
    }
    let index = Select::new()
        .with_prompt("User")
        .items(&ids[..])
        .default(0)
        .interact()?;
    Ok(ids[index].clone())
}
