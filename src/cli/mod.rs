//! Command-line surface.

mod categories;
mod config;
mod history;
mod session;

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use crate::AppState;

const DATA_DIR_ENV: &str = "FOCUSDECK_DATA_DIR";

#[derive(Parser)]
#[command(name = "focusdeck")]
#[command(about = "Focus timer with categories, distraction tracking and reports")]
#[command(version)]
pub struct Cli {
    /// Directory holding the session database and settings
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a countdown. Type p/s/r/d/q + Enter to pause, start, reset, log a distraction or quit
    Run {
        /// Session length in minutes (defaults to the configured duration)
        #[arg(short, long)]
        minutes: Option<u64>,

        /// Category to tag the session with (defaults to the selected one)
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Show focus statistics
    Report {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every stored session
    Sessions,

    /// Delete all stored sessions
    Clear {
        /// Confirm the deletion; it cannot be undone
        #[arg(long)]
        yes: bool,
    },

    /// Manage session categories
    Categories {
        #[command(subcommand)]
        action: Option<CategoryAction>,
    },

    /// Show or change saved settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// List categories, marking the selected one
    List,
    /// Add a category and select it
    Add { name: String },
    /// Select the category new sessions are tagged with
    Select { name: String },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the settings file as JSON
    Show,
    /// Set the countdown length used when `run` gets no --minutes
    SetDuration { minutes: u64 },
}

impl Cli {
    /// `--data-dir`, then `FOCUSDECK_DATA_DIR`, then the platform data directory.
    pub fn resolve_data_dir(&self) -> Result<PathBuf> {
        resolve_data_dir(self.data_dir.clone(), std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }
}

fn resolve_data_dir(flag: Option<PathBuf>, env: Option<PathBuf>) -> Result<PathBuf> {
    flag.or(env)
        .or_else(|| dirs::data_dir().map(|dir| dir.join("focusdeck")))
        .ok_or_else(|| anyhow!("could not determine a data directory; pass --data-dir"))
}

pub async fn dispatch(command: Commands, state: &AppState) -> Result<()> {
    match command {
        Commands::Run { minutes, category } => session::run_command(state, minutes, category).await,
        Commands::Report { json } => history::report_command(state, json).await,
        Commands::Sessions => history::sessions_command(state).await,
        Commands::Clear { yes } => history::clear_command(state, yes).await,
        Commands::Categories { action } => {
            categories::categories_command(state, action.unwrap_or(CategoryAction::List))
        }
        Commands::Config { action } => {
            config::config_command(state, action.unwrap_or(ConfigAction::Show))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_environment() {
        let resolved = resolve_data_dir(
            Some(PathBuf::from("/tmp/flag")),
            Some(PathBuf::from("/tmp/env")),
        )
        .unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/flag"));

        let resolved = resolve_data_dir(None, Some(PathBuf::from("/tmp/env"))).unwrap();
        assert_eq!(resolved, PathBuf::from("/tmp/env"));
    }

    #[test]
    fn parses_run_arguments() {
        let cli = Cli::try_parse_from([
            "focusdeck", "--data-dir", "/tmp/x", "run", "--minutes", "50", "-c", "Coding",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        match cli.command {
            Commands::Run { minutes, category } => {
                assert_eq!(minutes, Some(50));
                assert_eq!(category.as_deref(), Some("Coding"));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn parses_config_set_duration() {
        let cli = Cli::try_parse_from(["focusdeck", "config", "set-duration", "45"]).unwrap();
        match cli.command {
            Commands::Config {
                action: Some(ConfigAction::SetDuration { minutes }),
            } => assert_eq!(minutes, 45),
            _ => panic!("expected config set-duration"),
        }

        let cli = Cli::try_parse_from(["focusdeck", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { action: None }));
    }

    #[test]
    fn clap_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
