//! Configuration system for Obski.
//!
//! Uses `figment` for layered configuration: defaults -> config file -> environment -> CLI args.
//! Configuration is loaded from `~/.config/obski/config.toml` and/or `.obski/config.toml`
//! in the workspace directory.

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObskiConfig {
    pub wiki: WikiConfig,
    pub ledger: LedgerConfig,
    pub ui: UiConfig,
}

/// Encyclopedia API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiConfig {
    /// MediaWiki `api.php` endpoint.
    pub api_base: String,
    /// User-Agent sent with every request. Wikimedia rejects anonymous agents.
    pub user_agent: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: format!("Obski/{} (citation obscurity game)", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Score ledger configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Ledger file. Defaults to `ledger.json` in the user data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl LedgerConfig {
    /// The ledger file to use, falling back to the platform data directory.
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        data_dir().join("ledger.json")
    }
}

/// Terminal presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Whether to emit ANSI colors.
    pub color: bool,
    /// Whether to print each citation's original markup under it.
    pub show_markup: bool,
    /// Citations scoring above this are flagged as obscure.
    pub highlight_threshold: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_markup: false,
            highlight_threshold: 70,
        }
    }
}

impl ObskiConfig {
    /// Reject settings the client cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.wiki.api_base.trim();
        if !base.starts_with("http://") && !base.starts_with("https://") {
            return Err(ConfigError::Invalid {
                message: format!("wiki.api_base must be an http(s) URL, got '{}'", base),
            });
        }
        if self.wiki.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "wiki.timeout_secs must be greater than zero".to_string(),
            });
        }
        if self.wiki.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "wiki.user_agent must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "obski", "obski")
}

/// Platform data directory (ledger, logs). Falls back to `./.obski`.
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".obski"))
}

/// Workspace-level config file path.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".obski").join("config.toml")
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `OBSKI_`)
/// 2. An explicit config file, if given
/// 3. Workspace-local config (`.obski/config.toml`)
/// 4. User config (`~/.config/obski/config.toml`)
/// 5. Built-in defaults
///
/// Command-line flags are applied by the caller on the returned value.
pub fn load_config(
    workspace: Option<&Path>,
    config_file: Option<&Path>,
) -> Result<ObskiConfig, Box<figment::Error>> {
    let mut figment = Figment::from(Serialized::defaults(ObskiConfig::default()));

    // User-level config
    if let Some(dirs) = project_dirs() {
        let user_config = dirs.config_dir().join("config.toml");
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    // Workspace-level config
    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(file) = config_file {
        figment = figment.merge(Toml::file(file));
    }

    // Environment variables (OBSKI_WIKI__API_BASE, OBSKI_UI__COLOR, etc.)
    figment = figment.merge(Env::prefixed("OBSKI_").split("__"));

    figment.extract().map_err(Box::new)
}
