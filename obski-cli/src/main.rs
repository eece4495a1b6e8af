//! Obski CLI: explore a topic's most obscure citations from the terminal.
//!
//! Runs a single lookup when a topic is given, otherwise an interactive prompt.

mod commands;
mod render;
mod repl;
mod slash;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::commands::CliOverrides;

/// OBSKI: score how obscure a Wikipedia article's citations are
#[derive(Parser, Debug)]
#[command(name = "obski", version, about, long_about = None)]
struct Cli {
    /// Topic to explore (starts interactive mode if omitted)
    topic: Option<String>,

    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show each citation's original markup
    #[arg(long)]
    markup: bool,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show your cumulative Obscure Points
    Score,
    /// List the topics you have already scored
    Topics,
    /// Clear your score and scored topics
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Write a default config to .obski/config.toml in the workspace
    Init,
    /// Print the merged configuration
    Show,
}

fn log_filter(verbose: u8, quiet: bool) -> &'static str {
    match verbose {
        0 if quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Human-readable layer for stderr (always active)
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(log_filter(cli.verbose, cli.quiet)));

    // JSON file layer for structured logging
    let log_dir = obski_core::config::data_dir().join("logs");
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "obski.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let overrides = CliOverrides {
        show_markup: cli.markup,
        no_color: cli.no_color,
    };

    if let Some(command) = cli.command {
        return commands::handle_command(command, &workspace, cli.config.as_deref(), overrides)
            .await;
    }

    let config = commands::load_settings(&workspace, cli.config.as_deref(), overrides)?;

    match cli.topic {
        Some(topic) => repl::run_single_topic(&topic, config).await,
        None => repl::run_interactive(config).await,
    }
}
