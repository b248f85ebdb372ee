//! Configuration file loading for the CLI
//!
//! This module handles finding and loading TOML configuration files
//! from various locations (explicit path, local directory, system directory).

use std::{
    fs,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use cartograph::config::AppConfig;

/// Configuration-related errors for CLI
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse TOML configuration: {0}")]
    Parse(String),

    #[error("Missing configuration file: {0}")]
    MissingFile(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Find and load configuration from various locations
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Local project directory (cartograph/config.toml)
/// 3. Platform-specific config directory
/// 4. Default config if none found
///
/// # Errors
///
/// Returns error if:
/// - Explicit path is provided but file doesn't exist
/// - Config file exists but cannot be parsed or holds invalid values
pub fn load_config(explicit_path: Option<impl AsRef<Path>>) -> Result<AppConfig, ConfigError> {
    // 1. Try the explicitly provided path first if available
    if let Some(path) = explicit_path {
        let path = path.as_ref();
        info!(path = path.display().to_string(); "Loading configuration from explicit path");
        return load_config_file(path);
    }

    // 2. Try the local project directory
    let local_config = Path::new("cartograph/config.toml");
    if local_config.exists() {
        info!(path = local_config.display().to_string(); "Loading configuration from local path");
        return load_config_file(local_config);
    }

    // 3. Try the platform-specific config directory
    if let Some(proj_dirs) = ProjectDirs::from("com", "cartograph", "cartograph") {
        let system_config = proj_dirs.config_dir().join("config.toml");

        if system_config.exists() {
            info!(path = system_config.display().to_string(); "Loading configuration from system path");
            return load_config_file(system_config);
        }

        debug!(path = system_config.display().to_string(); "System configuration file not found");
    } else {
        debug!("Could not determine platform-specific config directory");
    }

    // 4. If no config is found, return default config
    debug!("No configuration file found, using default configuration");
    Ok(AppConfig::default())
}

/// Load and validate configuration from a TOML file
fn load_config_file(path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse TOML content and reject values the store cannot work with.
fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig =
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    config.layout().validate().map_err(ConfigError::Validation)?;
    config.style().palette().map_err(ConfigError::Validation)?;
    config
        .style()
        .background_color()
        .map_err(ConfigError::Validation)?;

    Ok(config)
}
