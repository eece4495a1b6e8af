//! Single-topic and interactive modes.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use obski_core::{
    ExploreCallback, ExploreStatus, Explorer, LookupError, ObskiConfig, format_score,
};
use obski_wiki::WikipediaClient;

use crate::commands::{confirm_reset, open_ledger};
use crate::render::Renderer;
use crate::slash::{self, ReplInput};

/// Prints a loading line on stderr and remembers the latest total.
pub(crate) struct CliCallback {
    color: bool,
    total: AtomicU64,
}

impl CliCallback {
    pub(crate) fn new(color: bool, total: u64) -> Self {
        Self {
            color,
            total: AtomicU64::new(total),
        }
    }

    pub(crate) fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub(crate) fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
    }
}

impl ExploreCallback for CliCallback {
    fn on_status_change(&self, status: ExploreStatus) {
        match status {
            ExploreStatus::Loading { topic } => {
                if self.color {
                    eprint!("\x1b[90mExploring \"{}\"...\x1b[0m", topic);
                } else {
                    eprint!("Exploring \"{}\"...", topic);
                }
                let _ = io::stderr().flush();
            }
            ExploreStatus::Idle => {
                if self.color {
                    eprint!("\r\x1b[2K");
                } else {
                    eprintln!();
                }
            }
        }
    }

    fn on_score_update(&self, cumulative: u64) {
        self.set_total(cumulative);
    }
}

fn build_explorer(config: &ObskiConfig, callback: Arc<CliCallback>) -> anyhow::Result<Explorer> {
    let client = Arc::new(WikipediaClient::new(&config.wiki)?);
    Ok(Explorer::new(
        client.clone(),
        client,
        open_ledger(config),
        callback,
    ))
}

/// Whether a lookup error is an expected "nothing to show" result.
fn is_soft_failure(err: &LookupError) -> bool {
    err.is_not_found() || matches!(err, LookupError::EmptyTopic)
}

/// Explore one topic, print the result, and exit.
pub async fn run_single_topic(topic: &str, config: ObskiConfig) -> anyhow::Result<()> {
    let renderer = Renderer::new(&config.ui);
    let callback = Arc::new(CliCallback::new(config.ui.color, 0));
    let explorer = build_explorer(&config, callback)?;

    match explorer.explore(topic).await {
        Ok(outcome) => {
            print!("{}", renderer.outcome(&outcome));
            Ok(())
        }
        Err(e) if is_soft_failure(&e) => {
            println!("{}", renderer.error(&e));
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn run_interactive(config: ObskiConfig) -> anyhow::Result<()> {
    let renderer = Renderer::new(&config.ui);
    let ledger = open_ledger(&config);
    let callback = Arc::new(CliCallback::new(config.ui.color, ledger.cumulative_score()?));
    let explorer = build_explorer(&config, callback.clone())?;

    println!("\x1b[1;35m  OBSKI\x1b[0m  find the most obscure citations on Wikipedia");
    println!("  {}", renderer.total(callback.total()));
    println!("  Type a topic to explore, /help for commands, /quit to exit\n");

    let stdin = io::stdin();
    loop {
        print!("\x1b[1;34m[{}] > \x1b[0m", format_score(callback.total()));
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input).is_err() || input.is_empty() {
            break;
        }

        match slash::parse(&input) {
            ReplInput::Blank => continue,
            ReplInput::Quit => break,
            ReplInput::Help => print!("{}", slash::help_text()),
            ReplInput::Score => {
                let total = explorer.ledger().cumulative_score()?;
                callback.set_total(total);
                println!("{}", renderer.total(total));
            }
            ReplInput::Topics => {
                println!("{}", renderer.topics(&explorer.ledger().scored_topics()?));
            }
            ReplInput::Reset => {
                if confirm_reset()? {
                    explorer.ledger().reset()?;
                    callback.set_total(0);
                    println!("Score reset.");
                }
            }
            ReplInput::Unknown(name) => {
                println!("Unknown command: {}. Type /help for commands.", name);
            }
            ReplInput::Topic(topic) => match explorer.explore(topic).await {
                Ok(outcome) => print!("{}", renderer.outcome(&outcome)),
                Err(e) => {
                    if !is_soft_failure(&e) {
                        tracing::warn!(topic = %topic, error = %e, "lookup failed");
                    }
                    println!("{}", renderer.error(&e));
                }
            },
        }
        println!();
    }

    println!("Goodbye! Final score: {}", format_score(callback.total()));
    Ok(())
}
