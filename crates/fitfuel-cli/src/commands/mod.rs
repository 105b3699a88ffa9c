//! Command handlers for fitctl
//!
//! Every command is a navigation to a client route. `Console` bundles what
//! the handlers share: the API, the session store, the navigator holding the
//! route history and the login flow.

pub mod auth;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod team;
pub mod update;

use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::debug;

use crate::auth::LoginFlow;
use crate::cli::{Cli, Commands};
use crate::client::AdminApi;
use crate::config::ConsoleConfig;
use crate::guard::{Navigator, Route};
use crate::output::{OutputFormat, OutputSettings, ProgressIndicator};
use crate::session::SessionStore;

pub struct Console<A, S> {
    pub api: Arc<A>,
    pub store: Arc<S>,
    pub navigator: Navigator<S>,
    pub login: LoginFlow<A, S>,
    pub output: OutputSettings,
    pub config: ConsoleConfig,
}

impl<A: AdminApi, S: SessionStore> Console<A, S> {
    pub fn new(api: A, store: S, config: ConsoleConfig) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(store);
        let output = OutputSettings {
            format: config.output.format,
            color: config.output.color,
        };

        Self {
            navigator: Navigator::new(store.clone()),
            login: LoginFlow::new(api.clone(), store.clone()),
            api,
            store,
            output,
            config,
        }
    }

    pub fn color(&self) -> bool {
        self.output.color
    }

    /// Navigate to `route`. A protected route that lands on /login means the
    /// operator is logged out, which fails the command.
    pub fn enter(&mut self, route: Route) -> Result<Route> {
        let requested = route.path();
        let rendered = self.navigator.navigate(route)?;
        debug!("{} rendered as {}", requested, rendered);

        if rendered == Route::Login && requested != Route::Login.path() {
            bail!(
                "Not logged in: {} redirected to /login. Run 'fitctl login' first.",
                requested
            );
        }
        Ok(rendered)
    }

    /// Spinner for a network wait, suppressed for machine-readable output
    pub fn spinner(&self, message: &str) -> ProgressIndicator {
        if self.output.format == OutputFormat::Table && self.output.color {
            ProgressIndicator::new(message)
        } else {
            ProgressIndicator::hidden()
        }
    }
}

/// Run one parsed command line
pub async fn execute<A: AdminApi, S: SessionStore>(console: &mut Console<A, S>, cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Login { email, password } => {
            auth::handle_login(console, email.as_deref(), password.as_deref()).await
        }
        Commands::Logout => auth::handle_logout(console),
        Commands::Dashboard => dashboard::handle_dashboard(console),
        Commands::Team { command } => team::handle_command(console, command.as_ref()).await,
        Commands::Update(args) => update::handle_update(console, args).await,
        Commands::Open { path } => {
            let route = Route::parse(path)?;
            render_route(console, route).await
        }
        Commands::Console => console::run(console).await,
        Commands::Completion { .. } | Commands::Config { .. } => {
            // These are handled before the console is built
            Ok(())
        }
    }
}

/// Show whatever `route` resolves to
pub async fn render_route<A: AdminApi, S: SessionStore>(
    console: &mut Console<A, S>,
    route: Route,
) -> Result<()> {
    match route {
        Route::Login => auth::handle_login(console, None, None).await,
        Route::Logout => auth::handle_logout(console),
        Route::Dashboard => dashboard::handle_dashboard(console),
        Route::Team => team::handle_command(console, None).await,
        Route::Update { id } => {
            let args = crate::cli::UpdateArgs {
                id,
                ..Default::default()
            };
            update::handle_update(console, &args).await
        }
    }
}

pub fn handle_completion(shell: clap_complete::Shell) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::generate;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut std::io::stdout());
    Ok(())
}
