//! gitdeck - Interactive terminal UI for everyday git work
//!
//! Run with `gitdeck` or `gitdeck --help` for usage.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use gitdeck::{
    APP_NAME, Config, VERSION,
    git::{Change, GitExecutor, GitOps, Limits, Status},
    tui::App,
};

#[derive(Parser)]
#[command(name = APP_NAME)]
#[command(version = VERSION)]
#[command(about = "An interactive terminal UI for everyday git work")]
#[command(long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run as if started in this directory
    #[arg(short = 'C', value_name = "DIR")]
    directory: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive TUI (default)
    Tui,

    /// Print the repository status and changed files
    Status {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show configuration
    Config {
        /// Initialize config file with defaults
        #[arg(long)]
        init: bool,
    },
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info").add_directive("tokio=warn".parse()?)
    };

    match log_file {
        // The terminal belongs to the UI, so logs go to a file
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .wrap_err_with(|| format!("cannot open log file {}", path.display()))?;

            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(file).with_ansi(false).with_target(false))
                .with(filter)
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
                .with(filter)
                .init();
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Config {
    let loaded = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    loaded.unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config, using defaults: {}", e);
        Config::default()
    })
}

/// Check for git and locate the repository around `dir`
async fn open_repository(config: &Config, dir: &Path) -> Result<GitOps> {
    let executor = GitExecutor::from_config(dir, config);
    executor.check_installed().await?;
    let executor = executor.discover().await?;
    info!(repo = %executor.repo_path().display(), "repository found");
    Ok(GitOps::new(executor, Limits::from(config)))
}

#[derive(Serialize)]
struct StatusReport {
    status: Status,
    changes: Vec<Change>,
}

async fn print_status(ops: &GitOps, json: bool) -> Result<()> {
    let report = StatusReport {
        status: ops.status().await?,
        changes: ops.changes().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let status = &report.status;
    println!("On branch {}", status.branch);
    if status.ahead > 0 || status.behind > 0 {
        println!("  ahead {}, behind {}", status.ahead, status.behind);
    }
    if report.changes.is_empty() {
        println!("Working tree clean");
    } else {
        println!("{} staged, {} unstaged", status.staged, status.unstaged);
        println!();
        for change in &report.changes {
            println!("  {} {}", change.code, change.path);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());
    let debug = cli.debug || config.debug;

    let launch_dir = match cli.directory {
        Some(ref dir) => std::fs::canonicalize(dir)
            .wrap_err_with(|| format!("cannot change to {}", dir.display()))?,
        None => std::env::current_dir()?,
    };

    match cli.command {
        None | Some(Commands::Tui) => {
            if let Err(e) = config.ensure_directories() {
                eprintln!("Warning: Failed to create directories: {}", e);
            }
            let log_file = config.log_file_path()?;
            setup_logging(debug, Some(&log_file))?;

            info!("Starting gitdeck TUI v{}", VERSION);

            let ops = open_repository(&config, &launch_dir).await?;
            let mut app = App::new(config, ops, launch_dir);
            app.run().await?;
        }

        Some(Commands::Status { json }) => {
            setup_logging(debug, None)?;

            let ops = open_repository(&config, &launch_dir).await?;
            print_status(&ops, json).await?;
        }

        Some(Commands::Config { init }) => {
            setup_logging(debug, None)?;

            if init {
                match cli.config {
                    Some(ref path) => config.save_to(path)?,
                    None => config.save()?,
                }
                let path = match cli.config {
                    Some(path) => path,
                    None => Config::config_file_path()?,
                };
                println!("Configuration initialized at {:?}", path);
            } else {
                if let Err(e) = config.validate() {
                    warn!("configuration is invalid: {}", e);
                }
                println!("Configuration:");
                println!("{}", toml::to_string_pretty(&config)?);
                println!("\nConfig file: {:?}", Config::config_file_path()?);
                println!("Log file: {:?}", config.log_file_path()?);
            }
        }
    }

    Ok(())
}
