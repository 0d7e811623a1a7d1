pub mod categories;
pub mod cli;
pub mod db;
pub mod models;
pub mod report;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod summary;
pub mod timer;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use cli::Cli;
use db::Database;
use settings::SettingsStore;
use storage::SessionStore;

pub struct AppState {
    pub sessions: SessionStore,
    pub settings: SettingsStore,
}

impl AppState {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let database = Database::open(data_dir.join("focusdeck.sqlite3"))?;
        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        Ok(Self {
            sessions: SessionStore::new(database),
            settings,
        })
    }
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over the --verbose default.
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let data_dir = cli.resolve_data_dir()?;
    info!("focusdeck starting with data directory {}", data_dir.display());

    let state = AppState::open(&data_dir)?;
    cli::dispatch(cli.command, &state).await
}
