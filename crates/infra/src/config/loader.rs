//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `TASKFLOW_API_URL` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//! 5. Uses built-in defaults when no file exists
//!
//! ## Environment Variables
//! - `TASKFLOW_API_URL`: API origin (required for environment loading)
//! - `TASKFLOW_API_TIMEOUT_MS`: Per-request timeout in milliseconds
//! - `TASKFLOW_API_MAX_ATTEMPTS`: Attempts for idempotent requests
//! - `TASKFLOW_REFRESH_POLICY`: `cookie` or `keychain`
//! - `TASKFLOW_CREDENTIAL_STORAGE`: `memory` or `keychain`
//! - `TASKFLOW_LOGOUT_PATH`: Server-side logout route
//! - `TASKFLOW_LEAD_MARGIN_MS`: Renew this long before expiry
//! - `TASKFLOW_MINIMUM_DELAY_MS`: Floor for the renewal delay
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./taskflow.json` or `./taskflow.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent and grandparent directories
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use taskflow_domain::{ApiConfig, Config, Result, SessionConfig, TaskflowError};

const FILE_NAMES: [&str; 4] = ["taskflow.json", "taskflow.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the API origin is
/// not set there, falls back to a config file, then to defaults.
///
/// # Errors
/// Returns `TaskflowError::Config` if a source that is present holds invalid
/// values or cannot be parsed.
pub fn load() -> Result<Config> {
    match std::env::var("TASKFLOW_API_URL") {
        Ok(_) => {
            let config = load_from_env()?;
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(_) => match probe_config_paths() {
            Some(path) => load_from_file(Some(path)),
            None => {
                tracing::debug!("No configuration source found, using defaults");
                Ok(Config::default())
            }
        },
    }
}

/// Load configuration from environment variables
///
/// `TASKFLOW_API_URL` must be present; every other variable falls back to
/// its default.
///
/// # Environment Variables
/// See module documentation for the complete list.
///
/// # Errors
/// Returns `TaskflowError::Config` if the required variable is missing or
/// any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let api_defaults = ApiConfig::default();
    let session_defaults = SessionConfig::default();

    let api = ApiConfig {
        base_url: env_var("TASKFLOW_API_URL")?,
        timeout_ms: env_parse("TASKFLOW_API_TIMEOUT_MS")?.unwrap_or(api_defaults.timeout_ms),
        max_attempts: env_parse("TASKFLOW_API_MAX_ATTEMPTS")?
            .unwrap_or(api_defaults.max_attempts),
        user_agent: api_defaults.user_agent,
    };

    let session = SessionConfig {
        lead_margin_ms: env_parse("TASKFLOW_LEAD_MARGIN_MS")?
            .unwrap_or(session_defaults.lead_margin_ms),
        minimum_delay_ms: env_parse("TASKFLOW_MINIMUM_DELAY_MS")?
            .unwrap_or(session_defaults.minimum_delay_ms),
        refresh_policy: env_parse("TASKFLOW_REFRESH_POLICY")?
            .unwrap_or(session_defaults.refresh_policy),
        credential_storage: env_parse("TASKFLOW_CREDENTIAL_STORAGE")?
            .unwrap_or(session_defaults.credential_storage),
        logout_path: std::env::var("TASKFLOW_LOGOUT_PATH").unwrap_or(session_defaults.logout_path),
        keychain_service: session_defaults.keychain_service,
    };

    Ok(Config { api, session })
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `TaskflowError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(TaskflowError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            TaskflowError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| TaskflowError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `TaskflowError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| TaskflowError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| TaskflowError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(TaskflowError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory and up to two parents, then the
/// executable's directory and its two parents.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut roots = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        roots.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.extend([exe_dir.to_path_buf(), exe_dir.join(".."), exe_dir.join("../..")]);
        }
    }

    roots
        .iter()
        .flat_map(|root| FILE_NAMES.iter().map(move |name| root.join(name)))
        .find(|path| path.exists())
}

/// Get required environment variable
///
/// # Errors
/// Returns `TaskflowError::Config` if the variable is not set.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        TaskflowError::Config(format!("Missing required environment variable: {key}"))
    })
}

/// Parse an optional environment variable
///
/// # Errors
/// Returns `TaskflowError::Config` if the variable is set but unparsable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| TaskflowError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}
