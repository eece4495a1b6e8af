//! Subcommand handlers and the configuration plumbing shared with the REPL.

use std::path::Path;
use std::sync::Arc;

use dialoguer::Confirm;
use obski_core::config::workspace_config_path;
use obski_core::{JsonFileStore, ObskiConfig, ScoreLedger, load_config};

use crate::render::Renderer;
use crate::{Commands, ConfigAction};

/// Display flags given on the command line, applied over the loaded config.
#[derive(Debug, Default, Clone, Copy)]
pub struct CliOverrides {
    pub show_markup: bool,
    pub no_color: bool,
}

impl CliOverrides {
    pub fn apply(&self, config: &mut ObskiConfig) {
        if self.show_markup {
            config.ui.show_markup = true;
        }
        if self.no_color || std::env::var_os("NO_COLOR").is_some() {
            config.ui.color = false;
        }
    }
}

/// Load, override, and validate the configuration.
pub fn load_settings(
    workspace: &Path,
    config_file: Option<&Path>,
    overrides: CliOverrides,
) -> anyhow::Result<ObskiConfig> {
    let mut config = load_config(Some(workspace), config_file)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

pub fn open_ledger(config: &ObskiConfig) -> ScoreLedger {
    let path = config.ledger.resolve_path();
    tracing::debug!(path = %path.display(), "opening score ledger");
    ScoreLedger::new(Arc::new(JsonFileStore::new(path)))
}

pub fn confirm_reset() -> anyhow::Result<bool> {
    Ok(Confirm::new()
        .with_prompt("Reset your Obscure Points and scored topics?")
        .default(false)
        .interact()?)
}

pub async fn handle_command(
    command: Commands,
    workspace: &Path,
    config_file: Option<&Path>,
    overrides: CliOverrides,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace, config_file),
        Commands::Score => {
            let config = load_settings(workspace, config_file, overrides)?;
            let ledger = open_ledger(&config);
            println!("{}", Renderer::new(&config.ui).total(ledger.cumulative_score()?));
            Ok(())
        }
        Commands::Topics => {
            let config = load_settings(workspace, config_file, overrides)?;
            let ledger = open_ledger(&config);
            println!("{}", Renderer::new(&config.ui).topics(&ledger.scored_topics()?));
            Ok(())
        }
        Commands::Reset { yes } => {
            let config = load_settings(workspace, config_file, overrides)?;
            if !yes && !confirm_reset()? {
                println!("Reset cancelled.");
                return Ok(());
            }
            open_ledger(&config).reset()?;
            println!("Score reset. Obscure Points: 0");
            Ok(())
        }
    }
}

fn handle_config(
    action: ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Init => {
            let config_path = workspace_config_path(workspace);
            if config_path.exists() {
                println!(
                    "Configuration file already exists at: {}",
                    config_path.display()
                );
                return Ok(());
            }
            if let Some(dir) = config_path.parent() {
                std::fs::create_dir_all(dir)?;
            }

            let toml_str = toml::to_string_pretty(&ObskiConfig::default())?;
            std::fs::write(&config_path, &toml_str)?;
            println!(
                "Created default configuration at: {}",
                config_path.display()
            );
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_config(Some(workspace), config_file)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
    }
}
