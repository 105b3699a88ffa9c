//! Login and logout command handlers

use anyhow::{bail, Result};
use dialoguer::{Input, Password};
use tracing::info;

use crate::auth::LoginForm;
use crate::client::AdminApi;
use crate::commands::Console;
use crate::guard::Route;
use crate::output::{self, OutputFormat};
use crate::session::SessionStore;
use crate::views::DashboardView;

pub async fn handle_login<A: AdminApi, S: SessionStore>(
    console: &mut Console<A, S>,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<()> {
    let color = console.color();

    // the guard sends a logged-in operator straight to the dashboard
    if console.enter(Route::Login)? == Route::Dashboard {
        println!("{}", output::info("Already logged in", color));
        return show_dashboard(console);
    }

    let email = match email {
        Some(e) => e.to_string(),
        None => Input::<String>::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(p) => p.to_string(),
        None => Password::new().with_prompt("Password").interact()?,
    };

    submit_login(console, LoginForm::new(email, password)).await
}

/// Submit `form`, then land on the dashboard. Failures are printed inline
/// and still fail the command.
pub async fn submit_login<A: AdminApi, S: SessionStore>(
    console: &mut Console<A, S>,
    form: LoginForm,
) -> Result<()> {
    let color = console.color();
    let spinner = console.spinner("Logging in...");

    match console.login.submit(&form).await {
        Ok(session) => {
            spinner.finish();
            if console.output.format == OutputFormat::Table {
                println!(
                    "{}",
                    output::success(&format!("Logged in as {}", session.user_email), color)
                );
            }
            console.enter(Route::Dashboard)?;
            show_dashboard(console)
        }
        Err(e) => {
            spinner.finish();
            println!("{}", output::error(&e.to_string(), color));
            bail!("Login failed: {}", e)
        }
    }
}

pub fn handle_logout<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>) -> Result<()> {
    let landed = console.navigator.navigate(Route::Logout)?;
    info!("Logged out, now at {}", landed);
    println!("{}", output::success("Logged out", console.color()));
    Ok(())
}

fn show_dashboard<A: AdminApi, S: SessionStore>(console: &Console<A, S>) -> Result<()> {
    let view = DashboardView::load(console.store.as_ref())?;
    output::display(&view, &console.output)
}
