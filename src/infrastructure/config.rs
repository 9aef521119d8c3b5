use crate::domain::error::QiitaError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides `access_token` from the config file.
pub const TOKEN_ENV: &str = "QIITA_ACCESS_TOKEN";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub access_token: Option<String>,
    #[serde(default = "default_app_url")]
    pub app_url: String,
    pub http_proxy: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_enable_emoji")]
    pub enable_emoji: bool,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub logging: Logging,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_dedupe_interval_ms")]
    pub dedupe_interval_ms: u64,
    #[serde(default)]
    pub revalidate_on_revisit: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Logging {
    #[serde(default = "default_enable")]
    pub enable: bool,
    pub path: Option<String>,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            enable: true,
            path: None,
            level: "WARN".to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dedupe_interval_ms: default_dedupe_interval_ms(),
            revalidate_on_revisit: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            access_token: None,
            app_url: default_app_url(),
            http_proxy: None,
            timeout_secs: default_timeout_secs(),
            theme: default_theme(),
            enable_emoji: true,
            cache: CacheConfig::default(),
            logging: Logging::default(),
        }
    }
}

impl Config {
    /// The bearer token, if one is configured and non-empty.
    pub fn credential(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }

    /// Replace the file token with `token` when it is set and non-empty.
    pub fn override_token(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.access_token = Some(token);
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl CacheConfig {
    pub fn dedupe_interval(&self) -> Duration {
        Duration::from_millis(self.dedupe_interval_ms)
    }
}

// Defaults
fn default_api_base() -> String {
    "https://qiita.com/api/v2".to_string()
}
fn default_app_url() -> String {
    "http://localhost:5173/".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_theme() -> String {
    "qiita".to_string()
}
fn default_enable_emoji() -> bool {
    true
}
fn default_dedupe_interval_ms() -> u64 {
    2000
}
fn default_enable() -> bool {
    true
}
fn default_log_level() -> String {
    "WARN".to_string()
}

pub fn get_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("qiita-sync").join("config.toml"))
}

/// Load the user config file (or defaults), then apply `QIITA_ACCESS_TOKEN`.
pub fn load_config() -> Result<Config, QiitaError> {
    let mut config = match get_config_path() {
        Some(path) if path.exists() => load_config_from(&path)?,
        _ => Config::default(),
    };
    config.override_token(std::env::var(TOKEN_ENV).ok());
    Ok(config)
}

/// Read a config file; a file that fails to parse falls back to defaults.
pub fn load_config_from(path: &Path) -> Result<Config, QiitaError> {
    let content = fs::read_to_string(path)?;
    match parse_config(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            eprintln!(
                "Warning: Failed to parse config file: {}. Using defaults.",
                e
            );
            Ok(Config::default())
        }
    }
}

pub fn parse_config(content: &str) -> Result<Config, QiitaError> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn generate_config_sample() -> Result<(), QiitaError> {
    let Some(path) = get_config_path() else {
        return Err(QiitaError::Config(
            "Cannot determine config directory".to_string(),
        ));
    };

    if path.exists() {
        eprintln!("Config file already exists at: {}", path.display());
        return Ok(());
    }

    write_config_sample(&path)?;
    println!("Generated config file at: {}", path.display());
    Ok(())
}

pub fn write_config_sample(path: &Path) -> Result<(), QiitaError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let sample = Config::default();
    let toml_content = toml::to_string_pretty(&sample)
        .map_err(|e| QiitaError::Config(format!("Failed to serialize config: {}", e)))?;
    fs::write(path, toml_content)
        .map_err(|e| QiitaError::Config(format!("Failed to write config file: {}", e)))?;
    Ok(())
}
