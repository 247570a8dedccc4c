//! Layered configuration for Taskboard front ends
//!
//! Priority (highest first):
//! 1. Explicit overrides (CLI flags)
//! 2. Environment variables (`TASKBOARD_API_URL`, `TASKBOARD_CONFIG`)
//! 3. TOML config file (`<config dir>/taskboard/config.toml`)
//! 4. Compiled defaults
//!
//! A missing default config file is not an error. An explicit config path
//! that does not exist is.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::filter::DEFAULT_PAGE_SIZE;

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "TASKBOARD_API_URL";

/// Environment variable pointing at a config file
pub const CONFIG_PATH_ENV: &str = "TASKBOARD_CONFIG";

/// Default API base URL
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Directory name under the platform config directory
const APP_DIR: &str = "taskboard";

/// `config.toml` layout. Every field is optional so files can be partial.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    api: ApiFileConfig,
    ui: UiFileConfig,
}

/// `[api]` section
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ApiFileConfig {
    url: Option<String>,
    request_timeout_secs: Option<u64>,
}

/// `[ui]` section
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UiFileConfig {
    page_size: Option<u32>,
    search_debounce_ms: Option<u64>,
    toast_secs: Option<u64>,
}

/// Values supplied on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--api-url`
    pub api_url: Option<String>,
    /// `--config`
    pub config_path: Option<PathBuf>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// Base URL of the backend API
    pub api_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Tasks per page
    pub page_size: u32,
    /// Delay between the last search keystroke and the fetch
    pub search_debounce: Duration,
    /// How long transient notifications stay visible
    pub toast_duration: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(10),
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(300),
            toast_duration: Duration::from_secs(4),
        }
    }
}

impl ClientConfig {
    /// Load configuration from overrides, environment, and config file.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Io` if an explicitly named config file cannot
    /// be read, or `ClientError::Config` if a config file fails to parse.
    pub fn load(overrides: &ConfigOverrides) -> ClientResult<Self> {
        let explicit = overrides
            .config_path
            .clone()
            .or_else(|| non_empty_env(CONFIG_PATH_ENV).map(PathBuf::from));

        let file = match explicit {
            Some(path) => read_config_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config_file(&path)?,
                _ => ConfigFile::default(),
            },
        };

        let env_url = non_empty_env(API_URL_ENV);
        Ok(Self::resolve(overrides, env_url, &file))
    }

    /// Merge the layers. Separated from `load()` for testing without
    /// touching the process environment.
    fn resolve(overrides: &ConfigOverrides, env_url: Option<String>, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            api_url: overrides
                .api_url
                .clone()
                .or(env_url)
                .or_else(|| file.api.url.clone())
                .unwrap_or(defaults.api_url),
            request_timeout: file
                .api
                .request_timeout_secs
                .map_or(defaults.request_timeout, Duration::from_secs),
            page_size: file
                .ui
                .page_size
                .filter(|size| *size > 0)
                .unwrap_or(defaults.page_size),
            search_debounce: file
                .ui
                .search_debounce_ms
                .map_or(defaults.search_debounce, Duration::from_millis),
            toast_duration: file
                .ui
                .toast_secs
                .map_or(defaults.toast_duration, Duration::from_secs),
        }
    }
}

/// The platform config directory for Taskboard, e.g. `~/.config/taskboard`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}

/// Default location of `config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn read_config_file(path: &Path) -> ClientResult<ConfigFile> {
    debug!(path = %path.display(), "reading config file");
    let contents = std::fs::read_to_string(path).map_err(|e| ClientError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> ClientResult<ConfigFile> {
    toml::from_str(contents).map_err(|e| ClientError::Config {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}
