//! fitctl: FitFuel admin console

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error};

use fitfuel_cli::commands::{self, Console};
use fitfuel_cli::config::ConsoleConfig;
use fitfuel_cli::{AnySessionStore, Cli, FileSessionStore, HttpAdminApi, MemorySessionStore};
use fitfuel_cli::cli::Commands;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    if let Commands::Completion { shell } = &cli.command {
        return commands::handle_completion(*shell);
    }

    let config = ConsoleConfig::load(cli.config.as_deref())
        .await
        .context("Failed to load configuration")?;
    let config = apply_cli_overrides(config, &cli);

    if !config.output.color {
        colored::control::set_override(false);
    }

    if let Commands::Config { command } = &cli.command {
        return commands::config::handle_command(
            command,
            &config,
            cli.config.as_deref(),
            config.output.color,
        )
        .await;
    }

    let store = if config.session.ephemeral {
        debug!("Using in-memory session store");
        AnySessionStore::Memory(MemorySessionStore::new())
    } else {
        let path = config.session_path()?;
        debug!("Using session file {}", path.display());
        AnySessionStore::File(FileSessionStore::new(path))
    };

    let api = HttpAdminApi::new(&config.server).context("Failed to initialize client")?;
    let mut console = Console::new(api, store, config);

    match commands::execute(&mut console, &cli).await {
        Ok(()) => {
            debug!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    Ok(())
}

fn apply_cli_overrides(mut config: ConsoleConfig, cli: &Cli) -> ConsoleConfig {
    if let Some(url) = &cli.auth_url {
        config.server.auth_url = url.clone();
    }
    if let Some(url) = &cli.api_url {
        config.server.api_url = url.clone();
    }
    if let Some(path) = &cli.session_file {
        config.session.path = Some(path.display().to_string());
    }
    if cli.ephemeral {
        config.session.ephemeral = true;
    }
    if let Some(timeout) = cli.timeout {
        config.server.timeout_seconds = timeout;
    }
    if let Some(format) = cli.output {
        config.output.format = format;
    }
    if cli.quiet {
        config.output.color = false;
    }
    config
}
