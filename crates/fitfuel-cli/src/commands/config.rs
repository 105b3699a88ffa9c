//! Configuration file commands

use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::cli::ConfigCommands;
use crate::config::ConsoleConfig;
use crate::output;

pub async fn handle_command(
    command: &ConfigCommands,
    config: &ConsoleConfig,
    config_path: Option<&Path>,
    color: bool,
) -> Result<()> {
    let path = resolve_path(config_path)?;

    match command {
        ConfigCommands::Show => {
            print!("{}", serde_yaml::to_string(config)?);
        }
        ConfigCommands::Path => {
            println!("{}", path.display());
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                println!(
                    "{}",
                    output::warning(
                        &format!("{} already exists, use --force to overwrite", path.display()),
                        color
                    )
                );
                return Ok(());
            }
            ConsoleConfig::default().save(Some(&path)).await?;
            println!(
                "{}",
                output::success(&format!("Configuration written to {}", path.display()), color)
            );
        }
    }
    Ok(())
}

fn resolve_path(config_path: Option<&Path>) -> Result<PathBuf> {
    match config_path {
        Some(p) => Ok(p.to_path_buf()),
        None => ConsoleConfig::default_config_path(),
    }
}
