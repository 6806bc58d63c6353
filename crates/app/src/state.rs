use std::{fs, path::PathBuf};

use common::crypto::{SecretKey, DEFAULT_KEY_BITS};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "entangle";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const KEY_FILE_NAME: &str = "key.pem";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Shared seed the temporal salt is derived from
    #[serde(default = "default_seed")]
    pub seed: String,
    /// Modulus size used when generating the node key
    #[serde(default = "default_key_bits")]
    pub key_bits: usize,
    /// Default log level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_seed() -> String {
    "myHandle".to_string()
}

fn default_key_bits() -> usize {
    DEFAULT_KEY_BITS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            key_bits: default_key_bits(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    pub fn log_level(&self) -> Result<tracing::Level, StateError> {
        self.log_level
            .parse()
            .map_err(|_| StateError::InvalidLogLevel(self.log_level.clone()))
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the state directory (~/.entangle)
    pub entangle_dir: PathBuf,
    /// Path to the node key PEM file
    pub key_path: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the state directory path (custom or default ~/.entangle)
    pub fn entangle_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Create the state directory with a fresh key and the given config
    pub fn init(
        custom_path: Option<PathBuf>,
        config: Option<AppConfig>,
    ) -> Result<Self, StateError> {
        let entangle_dir = Self::entangle_dir(custom_path)?;
        if entangle_dir.join(CONFIG_FILE_NAME).exists() {
            return Err(StateError::AlreadyInitialized);
        }
        fs::create_dir_all(&entangle_dir)?;

        let config = config.unwrap_or_default();
        config.log_level()?;

        let key = SecretKey::generate(config.key_bits)
            .map_err(|e| StateError::InvalidKey(e.to_string()))?;
        let key_path = entangle_dir.join(KEY_FILE_NAME);
        let pem = key
            .to_pem()
            .map_err(|e| StateError::InvalidKey(e.to_string()))?;
        fs::write(&key_path, pem)?;

        let config_path = entangle_dir.join(CONFIG_FILE_NAME);
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        tracing::info!(path = %entangle_dir.display(), "initialized state directory");

        Ok(Self {
            entangle_dir,
            key_path,
            config_path,
            config,
        })
    }

    /// Load existing state from the state directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let entangle_dir = Self::entangle_dir(custom_path)?;
        if !entangle_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let key_path = entangle_dir.join(KEY_FILE_NAME);
        let config_path = entangle_dir.join(CONFIG_FILE_NAME);
        if !key_path.exists() {
            return Err(StateError::MissingFile(KEY_FILE_NAME.to_string()));
        }
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config: AppConfig = toml::from_str(&fs::read_to_string(&config_path)?)?;

        Ok(Self {
            entangle_dir,
            key_path,
            config_path,
            config,
        })
    }

    /// Load the node's secret key from the key file
    pub fn load_key(&self) -> Result<SecretKey, StateError> {
        let pem = fs::read_to_string(&self.key_path)?;
        SecretKey::from_pem(&pem).map_err(|e| StateError::InvalidKey(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("entangle directory not initialized. Run 'entangle init' first")]
    NotInitialized,

    #[error("entangle directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid log level: {0}")]
    InvalidLogLevel(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
