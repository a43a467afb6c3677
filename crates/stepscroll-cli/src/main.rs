use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use stepscroll_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "stepscroll")]
#[command(author, version, about = "Full-page section navigation in the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Read configuration from this file instead of ~/.config/stepscroll/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the section viewer
    Run {
        /// Number of sections to show (pads the configured ones with generated titles)
        #[arg(short = 'n', long)]
        sections: Option<usize>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Print the built-in defaults instead
        #[arg(long)]
        default: bool,
        /// Print the config file path
        #[arg(long, conflicts_with_all = ["default", "init"])]
        path: bool,
        /// Write the built-in defaults to the config file
        #[arg(long, conflicts_with = "default")]
        init: bool,
        /// Overwrite an existing file (with --init)
        #[arg(long, requires = "init")]
        force: bool,
    },
}

/// Log to stderr, or to a file under the data directory while the viewer
/// owns the terminal. `RUST_LOG` overrides the configured level.
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config = Arc::new(config);

    let viewer = matches!(cli.command, Some(Commands::Run { .. }) | None);
    init_logging(&config, viewer)?;

    match cli.command {
        Some(Commands::Run { sections }) => commands::run::run(config, sections).await,
        None => commands::run::run(config, None).await,
        Some(Commands::Config {
            default,
            path,
            init,
            force,
        }) => {
            if path {
                commands::config::path()
            } else if init {
                commands::config::init(force)
            } else {
                commands::config::show(&config, default)
            }
        }
    }
}
