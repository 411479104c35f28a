//! Configuration file discovery and loading
//!
//! Settings come from an explicit `--config` path when given, otherwise from
//! the platform-specific config directory, otherwise from defaults.

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Application name, also used for the config directory
pub const APP_NAME: &str = "quiz2moodle";

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

// ─────────────────────────────────────────────────────────────────────────────
// Platform-Specific Directory Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Get the platform-specific configuration directory for the application.
///
/// Returns the appropriate directory based on the operating system:
/// - **Windows**: `%APPDATA%\quiz2moodle\`
/// - **macOS**: `~/Library/Application Support/quiz2moodle/`
/// - **Linux**: `~/.config/quiz2moodle/`
///
/// # Errors
///
/// Returns `Error::ConfigDirNotFound` if the config directory cannot be determined
/// (e.g., if the HOME environment variable is not set).
pub fn get_config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|base| base.join(APP_NAME))
        .ok_or(Error::ConfigDirNotFound)
}

/// Get the full path to the default configuration file.
pub fn get_config_file_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE_NAME))
}

// ─────────────────────────────────────────────────────────────────────────────
// Load Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Load configuration for a conversion run.
///
/// # Behavior
///
/// 1. With an explicit path, the file must exist and hold valid JSON;
///    any failure is returned to the caller
/// 2. Without one, the default config file is used when present; a missing
///    or corrupted default file logs a warning and yields default settings
pub fn load_config(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => load_config_from(path),
        None => Ok(load_default_config()),
    }
}

/// Load configuration from the default config file location, falling back
/// to defaults on any error.
pub fn load_default_config() -> Settings {
    load_default_config_internal()
        .unwrap_or_warn_default(Settings::default(), "Failed to load configuration")
}

fn load_default_config_internal() -> Result<Settings> {
    let config_path = get_config_file_path()?;

    if !config_path.exists() {
        debug!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        return Ok(Settings::default());
    }

    load_config_from(&config_path)
}

/// Load and sanitize settings from a specific file.
///
/// # Errors
///
/// - `Error::ConfigLoad`: the file cannot be read
/// - `Error::ConfigParse`: the file is not valid settings JSON
pub fn load_config_from(path: &Path) -> Result<Settings> {
    debug!("Loading config from: {}", path.display());

    let contents = fs::read_to_string(path).map_err(|e| Error::ConfigLoad {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    // Handle empty file
    if contents.trim().is_empty() {
        debug!("Config file is empty, using defaults");
        return Ok(Settings::default());
    }

    let settings = Settings::from_json_sanitized(&contents).map_err(|e| {
        warn!(
            "Config file at {} contains invalid JSON: {}",
            path.display(),
            e
        );
        Error::ConfigParse {
            message: format!("Failed to parse config file: {}", e),
            source: Some(Box::new(e)),
        }
    })?;

    info!("Configuration loaded from {}", path.display());
    Ok(settings)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
