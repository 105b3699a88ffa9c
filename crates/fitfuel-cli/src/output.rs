//! Output formatting and display utilities for fitctl
//!
//! Provides consistent formatting across all fitctl commands with support
//! for multiple output formats (table, JSON, YAML, compact) and styling.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::builder::Builder;
use tabled::settings::object::{Columns, Rows};
use tabled::settings::{Alignment, Modify, Style};
use tabled::Table;

use fitfuel_common::columns::ColumnKind;

use crate::views::{DashboardView, TeamView};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table format
    Table,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
    /// Compact single-line format
    Compact,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
            OutputFormat::Compact => write!(f, "compact"),
        }
    }
}

/// Output settings for one command run
#[derive(Debug, Clone, Copy)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub color: bool,
}

/// Trait for views that can be formatted for output
pub trait Displayable {
    fn to_table(&self, color: bool) -> Table;
    fn to_json(&self) -> Result<String>;
    fn to_yaml(&self) -> Result<String>;
    fn to_compact(&self) -> String;
}

/// Render `data` in the configured format
pub fn render<T: Displayable>(data: &T, settings: &OutputSettings) -> Result<String> {
    Ok(match settings.format {
        OutputFormat::Table => data.to_table(settings.color).to_string(),
        OutputFormat::Json => data.to_json()?,
        OutputFormat::Yaml => data.to_yaml()?,
        OutputFormat::Compact => data.to_compact(),
    })
}

pub fn display<T: Displayable>(data: &T, settings: &OutputSettings) -> Result<()> {
    println!("{}", render(data, settings)?);
    Ok(())
}

impl Displayable for DashboardView {
    fn to_table(&self, color: bool) -> Table {
        create_kv_table(&self.summary(), color)
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.session)?)
    }

    fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.session)?)
    }

    fn to_compact(&self) -> String {
        format!(
            "{} {} {}",
            self.session.user_id, self.session.user_name, self.session.user_email
        )
    }
}

impl Displayable for TeamView {
    /// One column per negotiated field; the actions cell lists the
    /// follow-up commands for that row
    fn to_table(&self, color: bool) -> Table {
        let mut builder = Builder::default();
        builder.push_record(self.schema().columns.iter().map(|c| {
            if color {
                c.header_name.bold().to_string()
            } else {
                c.header_name.clone()
            }
        }));

        for row in self.rows() {
            let id = row.user_id().unwrap_or_default();
            builder.push_record(self.schema().columns.iter().map(|c| match c.kind {
                ColumnKind::Data => row.display_value(&c.field),
                ColumnKind::Actions => format!("update {} / delete {}", id, id),
            }));
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self.rows())?)
    }

    fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self.rows())?)
    }

    fn to_compact(&self) -> String {
        let fields: Vec<_> = self.schema().data_columns().map(|c| c.field.as_str()).collect();
        self.rows()
            .iter()
            .map(|row| {
                fields
                    .iter()
                    .map(|f| row.display_value(f))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Progress indicator for long-running operations
pub struct ProgressIndicator {
    spinner: indicatif::ProgressBar,
}

impl ProgressIndicator {
    pub fn new(message: &str) -> Self {
        let spinner = indicatif::ProgressBar::new_spinner();
        if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(std::time::Duration::from_millis(120));

        Self { spinner }
    }

    /// A spinner that draws nothing, for quiet and machine-readable runs
    pub fn hidden() -> Self {
        Self {
            spinner: indicatif::ProgressBar::hidden(),
        }
    }

    pub fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

/// Success/error message formatting
pub fn success(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "✅".green(), message)
    } else {
        format!("✅ {}", message)
    }
}

pub fn error(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "❌".red(), message.red())
    } else {
        format!("❌ {}", message)
    }
}

pub fn warning(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "⚠️".yellow(), message.yellow())
    } else {
        format!("⚠️ {}", message)
    }
}

pub fn info(message: &str, color: bool) -> String {
    if color {
        format!("{} {}", "ℹ️".blue(), message)
    } else {
        format!("ℹ️ {}", message)
    }
}

/// Create a simple two-column table for key-value data
pub fn create_kv_table(data: &[(String, String)], color: bool) -> Table {
    let mut builder = Builder::default();
    for (key, value) in data {
        let key = if color { key.bold().to_string() } else { key.clone() };
        builder.push_record([key, value.clone()]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()));
    table
}

/// Top bar of the interactive console
pub fn top_bar(operator: &str, color: bool) -> String {
    let title = "FitFuel Admin";
    if color {
        format!("{}  {}", title.bold().cyan(), operator.dimmed())
    } else {
        format!("{}  {}", title, operator)
    }
}
