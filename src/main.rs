use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::fs::File;
use std::path::Path;
use tracing::debug;
use tracing_subscriber::{fmt, EnvFilter};

mod app;
mod cli;
mod config;
mod error;
mod keys;
mod models;
mod paths;
mod ssh_config;
mod ui;

use app::App;
use cli::Cli;
use config::ConfigManager;
use paths::SshPaths;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new().context("Failed to initialize config manager")?;
    init_logging(&config_manager.log_dir(), cli.verbose)?;

    let app_config = config_manager.load_config().context("Failed to load config")?;
    let paths = match cli.ssh_dir {
        Some(ssh_dir) => SshPaths::from_ssh_dir(ssh_dir),
        None => {
            let home = dirs::home_dir().context("Could not find home directory")?;
            app_config.ssh_paths(&home)
        }
    };

    debug!("Starting with {:?}", paths);
    let app = App::new(paths, app_config.default_key_type);
    app.run(cli.command)
}

/// Log to a timestamped file so command output on stdout stays clean.
fn init_logging(log_dir: &Path, verbose: bool) -> Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    let log_file = log_dir.join(format!("mssh_{}.log", Local::now().format("%Y%m%d_%H%M%S")));
    let file = File::create(&log_file).context("Failed to create log file")?;

    let level = if verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(format!("mssh={}", level).parse()?))
        .with_ansi(false)
        .with_writer(file)
        .init();

    Ok(())
}
