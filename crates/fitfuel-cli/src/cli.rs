//! Command-line definition for fitctl

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// FitFuel admin console
#[derive(Parser, Debug)]
#[command(name = "fitctl")]
#[command(about = "FitFuel admin console")]
#[command(version)]
#[command(long_about = r#"
fitctl is the operator console for the FitFuel backend.

It lets an admin log in, list registered users, edit a user's profile and
delete users. Every view except login requires an admin session, which is
kept in a local session file between runs.

Examples:
  fitctl login --email admin@example.com   # Log in (prompts for the password)
  fitctl team                              # List users
  fitctl update 42 --goal strength         # Change one field
  fitctl update 42                         # Edit in an interactive form
  fitctl team delete 42                    # Delete after confirmation
  fitctl console                           # Interactive console
"#)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Authentication host override
    #[arg(long, global = true, env = "FITFUEL_AUTH_URL")]
    pub auth_url: Option<String>,

    /// Admin API host override
    #[arg(long, global = true, env = "FITFUEL_API_URL")]
    pub api_url: Option<String>,

    /// Session file override
    #[arg(long, global = true)]
    pub session_file: Option<PathBuf>,

    /// Keep the session in memory for this run only
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// Output format (defaults to the configured one)
    #[arg(long, short, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in as an admin
    Login {
        /// Account email (prompted when omitted)
        #[arg(long)]
        email: Option<String>,

        /// Account password (prompted when omitted)
        #[arg(long, env = "FITFUEL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Clear the stored session
    Logout,

    /// Show the signed-in operator
    #[command(alias = "home")]
    Dashboard,

    /// List and delete users
    #[command(alias = "users")]
    Team {
        #[command(subcommand)]
        command: Option<TeamCommands>,
    },

    /// Edit a user; opens a form when no field flags are given
    Update(UpdateArgs),

    /// Navigate to a client route such as /team or /update/42
    Open {
        path: String,
    },

    /// Interactive console with a sidebar menu
    Console,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TeamCommands {
    /// List all users
    List,

    /// Delete a user
    Delete {
        /// User identifier
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// User identifier
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub age: Option<String>,

    #[arg(long)]
    pub height_cm: Option<String>,

    #[arg(long)]
    pub weight_kg: Option<String>,

    #[arg(long)]
    pub target_weight_kg: Option<String>,

    /// male or female
    #[arg(long)]
    pub gender: Option<String>,

    /// fat loss, endurance, muscle gain or strength
    #[arg(long)]
    pub goal: Option<String>,

    /// beginner, intermediate or advance
    #[arg(long)]
    pub fitness_level: Option<String>,

    /// Training days per week: 3, 4 or 5
    #[arg(long)]
    pub availability: Option<String>,

    /// sedentary, light, moderate, active or very active
    #[arg(long)]
    pub activity_level: Option<String>,

    /// Comma-separated equipment list; pass an empty string to clear it
    #[arg(long, value_delimiter = ',')]
    pub equipment: Option<Vec<String>>,

    /// Any other field, as key=value
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,
}

impl UpdateArgs {
    /// Form fields given on the command line, keyed by their wire name
    pub fn field_values(&self) -> Vec<(&'static str, &str)> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("age", &self.age),
            ("heightCm", &self.height_cm),
            ("weightKg", &self.weight_kg),
            ("targetWeightKg", &self.target_weight_kg),
            ("gender", &self.gender),
            ("goal", &self.goal),
            ("fitnessLevel", &self.fitness_level),
            ("availability", &self.availability),
            ("activityLevel", &self.activity_level),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.as_deref().map(|v| (field, v)))
        .collect()
    }

    pub fn has_edits(&self) -> bool {
        !self.field_values().is_empty() || self.equipment.is_some() || !self.set.is_empty()
    }
}
