//! Platform-specific paths for configuration.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/patchbay/` (Linux),
//!   `~/Library/Application Support/patchbay/` (macOS), `%APPDATA%\patchbay\` (Windows)
//! - **Config file**: `config.toml` inside the user config directory
//!
//! # Example
//!
//! ```rust,no_run
//! use patchbay_config::paths;
//!
//! // Explicit path first, then ./patchbay.toml, then the user config file.
//! if let Some(path) = paths::find_config(None) {
//!     println!("Using config at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

/// Application name used for directory paths.
const APP_NAME: &str = "patchbay";

/// File name of the user config inside [`user_config_dir()`].
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE_NAME: &str = "patchbay.toml";

/// Returns the user-specific configuration directory.
///
/// # Platform Paths
///
/// - Linux: `~/.config/patchbay/`
/// - macOS: `~/Library/Application Support/patchbay/`
/// - Windows: `%APPDATA%\patchbay\`
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user config file.
pub fn user_config_file() -> PathBuf {
    user_config_dir().join(CONFIG_FILE_NAME)
}

/// Find the config file to use.
///
/// Searches in the following order:
/// 1. `explicit`, if given (returned even when missing, so the caller can
///    report the error)
/// 2. `patchbay.toml` in the current directory
/// 3. The user config file
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    find_config_in(&[Path::new(LOCAL_CONFIG_FILE_NAME), &user_config_file()])
}

/// First candidate that is an existing file.
fn find_config_in(candidates: &[&Path]) -> Option<PathBuf> {
    candidates
        .iter()
        .find(|path| path.is_file())
        .map(|path| path.to_path_buf())
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
