//! Helpers shared by several commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use patchbay_config::{SessionConfig, find_config};

/// Loads the session config.
///
/// An explicit path must exist. Without one, `./patchbay.toml` and then the
/// user config file are tried; if neither exists the defaults are used.
/// Returns the config and the file it came from.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<(SessionConfig, Option<PathBuf>)> {
    let Some(path) = find_config(explicit) else {
        tracing::debug!("no config file found, using defaults");
        return Ok((SessionConfig::default(), None));
    };

    let config = if explicit.is_some() {
        SessionConfig::load(&path)
    } else {
        SessionConfig::load_or_default(&path)
    }
    .with_context(|| format!("loading config from {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok((config, Some(path)))
}
