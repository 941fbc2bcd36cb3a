//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <file>`, else `$XDG_CONFIG_HOME/hubadmin/hubadmin.toml`
//! 3. Environment variables: `HUBADMIN_*` prefix, `HF_TOKEN` for the token
//! 4. Command line: `--repo`

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::expand_env_vars;

/// Repository administered when nothing else is configured.
pub const DEFAULT_REPO_ID: &str = "argus-systems/pickup-carrot-openpi";

/// Environment variable the hub tooling reads the access token from.
pub const TOKEN_ENV: &str = "HF_TOKEN";

/// Unified configuration for hubadmin.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Dataset repository id (`org/name`)
    pub repo_id: String,
    /// Hub base URL
    pub endpoint: String,
    /// Datasets-server base URL (row access)
    pub datasets_server: String,
    /// Branch that tags and commits target
    pub revision: String,
    /// Dataset configuration name used when loading rows
    pub config_name: String,
    /// Split loaded and pushed by merges
    pub split: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Access token; falls back to `token_path`
    pub token: Option<String>,
    /// File holding the access token
    pub token_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            repo_id: DEFAULT_REPO_ID.to_string(),
            endpoint: "https://huggingface.co".to_string(),
            datasets_server: "https://datasets-server.huggingface.co".to_string(),
            revision: "main".to_string(),
            config_name: "default".to_string(),
            split: "train".to_string(),
            timeout_secs: 60,
            token: None,
            token_path: PathBuf::from("~/.cache/huggingface/token"),
        }
    }
}

/// Raw settings for intermediate parsing (`None` = not specified, inherit).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub repo_id: Option<String>,
    pub endpoint: Option<String>,
    pub datasets_server: Option<String>,
    pub revision: Option<String>,
    pub config_name: Option<String>,
    pub split: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token: Option<String>,
    pub token_path: Option<PathBuf>,
}

/// Get the XDG config directory for hubadmin.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hubadmin").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("hubadmin.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay values wins if Some, otherwise keep self.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            repo_id: overlay.repo_id.clone().unwrap_or_else(|| self.repo_id.clone()),
            endpoint: overlay.endpoint.clone().unwrap_or_else(|| self.endpoint.clone()),
            datasets_server: overlay
                .datasets_server
                .clone()
                .unwrap_or_else(|| self.datasets_server.clone()),
            revision: overlay.revision.clone().unwrap_or_else(|| self.revision.clone()),
            config_name: overlay
                .config_name
                .clone()
                .unwrap_or_else(|| self.config_name.clone()),
            split: overlay.split.clone().unwrap_or_else(|| self.split.clone()),
            timeout_secs: overlay.timeout_secs.unwrap_or(self.timeout_secs),
            token: overlay.token.clone().or_else(|| self.token.clone()),
            token_path: overlay
                .token_path
                .clone()
                .unwrap_or_else(|| self.token_path.clone()),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// An explicit `config_file` must exist; the global file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Config file
        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ApplicationError::Config {
                        message: format!("config file not found: {}", path.display()),
                    });
                }
                current = current.merge_with(&load_raw_settings(path)?);
            }
            None => {
                if let Some(global_path) = global_config_path() {
                    if global_path.exists() {
                        debug!(path = %global_path.display(), "loading global config");
                        current = current.merge_with(&load_raw_settings(&global_path)?);
                    }
                }
            }
        }

        // 3. Environment variables (explicit override)
        current = Self::apply_env_overrides(current)?;

        current.expand_paths();
        Ok(current)
    }

    /// Apply HUBADMIN_* environment variables and HF_TOKEN.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("HUBADMIN")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("repo_id") {
            settings.repo_id = val;
        }
        if let Ok(val) = config.get_string("endpoint") {
            settings.endpoint = val;
        }
        if let Ok(val) = config.get_string("datasets_server") {
            settings.datasets_server = val;
        }
        if let Ok(val) = config.get_string("revision") {
            settings.revision = val;
        }
        if let Ok(val) = config.get_string("config_name") {
            settings.config_name = val;
        }
        if let Ok(val) = config.get_string("split") {
            settings.split = val;
        }
        if let Ok(val) = config.get::<u64>("timeout_secs") {
            settings.timeout_secs = val;
        }
        if let Ok(val) = config.get_string("token_path") {
            settings.token_path = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("token") {
            settings.token = Some(val);
        }
        if let Ok(val) = std::env::var(TOKEN_ENV) {
            if !val.trim().is_empty() {
                settings.token = Some(val);
            }
        }

        Ok(settings)
    }

    /// Apply the `--repo` command line override.
    pub fn with_repo(mut self, repo: Option<&str>) -> Self {
        if let Some(repo) = repo {
            self.repo_id = repo.to_string();
        }
        self
    }

    /// Expand `~` and `$VAR` in path-like fields.
    fn expand_paths(&mut self) {
        let expanded = expand_env_vars(self.token_path.to_string_lossy().as_ref());
        self.token_path = PathBuf::from(expanded);
    }

    /// Explicit token, else the first line of `token_path` if readable.
    pub fn resolve_token(&self) -> Option<String> {
        if let Some(token) = &self.token {
            return Some(token.clone());
        }
        std::fs::read_to_string(&self.token_path)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Public web page of a dataset repository.
    pub fn dataset_url(&self, repo: &str) -> String {
        format!("{}/datasets/{}", self.endpoint.trim_end_matches('/'), repo)
    }

    /// Show the effective configuration as TOML, token redacted.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        let mut shown = self.clone();
        if shown.token.is_some() {
            shown.token = Some("<redacted>".to_string());
        }
        toml::to_string_pretty(&shown).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        format!(
            r#"# hubadmin configuration
#
# Locations (by precedence, lowest to highest):
#   File: ~/.config/hubadmin/hubadmin.toml (or --config <file>)
#   Env:  HUBADMIN_* environment variables, HF_TOKEN
#   CLI:  --repo <org/name>

# Dataset repository to administer
# repo_id = "{DEFAULT_REPO_ID}"

# Hub and datasets-server endpoints
# endpoint = "https://huggingface.co"
# datasets_server = "https://datasets-server.huggingface.co"

# Branch targeted by tags and commits
# revision = "main"

# Dataset config and split used by merge-datasets
# config_name = "default"
# split = "train"

# Request timeout in seconds
# timeout_secs = 60

# Access token file (prefer HF_TOKEN over storing the token here)
# token_path = "~/.cache/huggingface/token"
"#
        )
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
