mod responder;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use murmur_core::config::FileLoggingConfig;
use murmur_core::logging::{self, LoggingConfig};
use murmur_core::{Config, Entry, SharedTranscript};
use murmur_ui::{App, SystemClipboard};
use owo_colors::OwoColorize;
use responder::EchoResponder;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

const WELCOME: &str = "Welcome to **murmur**. Type a message and press `Enter` to send; \
`Shift+Enter` adds a new line and `Ctrl+Y` copies the conversation.";

/// murmur - a terminal chat transcript
#[derive(Parser, Debug)]
#[command(name = "murmur")]
#[command(about = "A chat transcript for the terminal", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to config.toml (default: the user config directory)
    #[arg(short, long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Write debug logs to the log directory
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the interactive chat with the local echo responder
    Start,
    /// Write the example configuration
    InitConfig {
        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start => cmd_start(cli.config.as_deref(), cli.verbose),
        Commands::InitConfig { force } => {
            let path = match cli.config {
                Some(path) => path,
                None => Config::default_path().context("Could not determine the user config directory")?,
            };
            cmd_init_config(&path, force)
        }
    }
}

/// Start the interactive TUI session
fn cmd_start(config_path: Option<&Path>, verbose: bool) -> Result<()> {
    let config = Config::load(config_path).context("Failed to load config")?;

    let mut logging_config = LoggingConfig::from(config.logging.clone()).with_stderr(false);
    if verbose {
        logging_config = logging_config.with_file_logging(FileLoggingConfig { enabled: true, level: "debug".into() });
    }
    let _guard = logging::init_logging(Some(logging_config)).context("Failed to initialize logging")?;
    tracing::info!(path = ?config_path, "starting murmur");

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    runtime.block_on(async {
        let store = SharedTranscript::with_entries([Entry::assistant(WELCOME)]);
        let (ready_tx, ready_rx) = watch::channel(false);
        let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();
        let cancel_token = CancellationToken::new();

        let responder = EchoResponder::new(store.clone(), ready_tx, cancel_token.clone());
        let responder_task = tokio::spawn(responder.run(outbox_rx));

        let mut app = App::new(store, &config.ui, Arc::new(SystemClipboard))
            .with_readiness(ready_rx)
            .with_outbox(outbox_tx);
        let result = murmur_ui::app::run(&mut app).await;

        cancel_token.cancel();
        if let Err(e) = responder_task.await {
            tracing::warn!(error = %e, "responder task failed");
        }
        result.context("Terminal error")
    })
}

/// Write the example configuration to `path`
fn cmd_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to replace it)", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(path, Config::example()).context("Failed to write config")?;

    println!("{} Wrote example config to {}", "Success:".green().bold(), path.display());
    Ok(())
}
