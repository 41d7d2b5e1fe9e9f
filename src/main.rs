use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lazyliner::{cli, config, tui};
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lazyliner")]
#[command(about = "A keyboard-driven terminal client for Linear")]
#[command(version)]
struct Args {
    /// Initialize configuration
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List issues
    List {
        /// Number of issues to display
        #[arg(long, short = 'n', default_value_t = 20)]
        limit: usize,

        /// Show only my issues
        #[arg(long, short)]
        mine: bool,
    },
    /// View issue details
    View {
        /// Issue identifier, e.g. ENG-123
        id: String,
    },
    /// Create a new issue
    Create,
}

fn env_filter() -> Result<EnvFilter> {
    Ok(EnvFilter::from_default_env().add_directive("lazyliner=info".parse()?))
}

/// The terminal UI owns stdout, so interactive sessions log to a file.
fn init_file_logging() -> Result<()> {
    let dir = config::config_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join("lazyliner.log");
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn init_stderr_logging() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter()?)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.init {
        init_stderr_logging()?;
        config::init_wizard(args.config.as_deref())?;
        return Ok(());
    }

    let config = config::load(args.config.as_deref())?;
    let config_path = match args.config {
        Some(path) => Some(path),
        None => config::default_config_path().ok(),
    };

    match args.command {
        Some(Command::List { limit, mine }) => {
            init_stderr_logging()?;
            cli::list(&config, limit, mine).await
        }
        Some(Command::View { id }) => {
            init_stderr_logging()?;
            cli::view(&config, &id).await
        }
        Some(Command::Create) => {
            cli::require_credential(&config)?;
            init_file_logging()?;
            tui::run(config, config_path, true).await
        }
        None => {
            init_file_logging()?;
            tui::run(config, config_path, false).await
        }
    }
}
