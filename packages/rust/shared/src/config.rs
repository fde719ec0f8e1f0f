//! Application configuration for SRS Guard.
//!
//! User config lives at `~/.srsguard/srsguard.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SrsGuardError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "srsguard.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".srsguard";

// ---------------------------------------------------------------------------
// Config structs (matching srsguard.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Summarizer and embedder endpoint settings.
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Corpus database settings.
    #[serde(default)]
    pub corpus: CorpusConfig,
}

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Largest accepted upload in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}
fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

/// `[openai]` section. Any OpenAI-compatible endpoint works.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// API root, e.g. `https://api.openai.com/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model used for summarization.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model used for the corpus vectors.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Sampling temperature for summarization.
    #[serde(default)]
    pub temperature: f32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extracted text beyond this many characters is cut before summarizing.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embedding_model: default_embedding_model(),
            temperature: 0.0,
            timeout_secs: default_timeout_secs(),
            max_input_chars: default_max_input_chars(),
        }
    }
}

fn default_api_key_env() -> String {
    "OPENAI_API".into()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_chat_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_max_input_chars() -> usize {
    100_000
}

/// `[corpus]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// Path to the corpus database. A leading `~/` expands to the home directory.
    #[serde(default = "default_corpus_path")]
    pub path: String,

    /// Embedding dimension the corpus is created with.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Number of nearest neighbours fetched per check.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            path: default_corpus_path(),
            dimension: default_dimension(),
            top_k: default_top_k(),
        }
    }
}

fn default_corpus_path() -> String {
    "~/.srsguard/corpus.db".into()
}
fn default_dimension() -> usize {
    1536
}
fn default_top_k() -> usize {
    3
}

impl AppConfig {
    /// Reject values the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.openai.base_url).map_err(|e| {
            SrsGuardError::config(format!(
                "invalid openai.base_url '{}': {e}",
                self.openai.base_url
            ))
        })?;
        if self.corpus.dimension == 0 {
            return Err(SrsGuardError::config("corpus.dimension must be greater than 0"));
        }
        if self.corpus.top_k == 0 {
            return Err(SrsGuardError::config("corpus.top_k must be greater than 0"));
        }
        if self.server.max_upload_bytes == 0 {
            return Err(SrsGuardError::config(
                "server.max_upload_bytes must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Resolved on-disk location of the corpus database.
    pub fn corpus_path(&self) -> Result<PathBuf> {
        expand_home(&self.corpus.path)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.srsguard/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SrsGuardError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.srsguard/srsguard.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    match path.strip_prefix("~/") {
        Some(rest) => {
            let home = dirs::home_dir()
                .ok_or_else(|| SrsGuardError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        }
        None => Ok(PathBuf::from(path)),
    }
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SrsGuardError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SrsGuardError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Write a default config file to `~/.srsguard/srsguard.toml`.
/// Returns the path to the created file.
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = config_file_path()?;
    init_config_at(&path, force)?;
    Ok(path)
}

/// Write a default config file to `path`, creating parent directories.
///
/// An existing file is left untouched unless `force` is set.
pub fn init_config_at(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(SrsGuardError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| SrsGuardError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| SrsGuardError::config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| SrsGuardError::io(path, e))?;
    tracing::info!(?path, "created default config file");
    Ok(())
}

/// Read the API key from the env var named in the config.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    let var_name = &config.openai.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(SrsGuardError::config(format!(
            "OpenAI API key not found. Set the {var_name} environment variable."
        ))),
    }
}

/// Check that the API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    resolve_api_key(config).map(|_| ())
}
