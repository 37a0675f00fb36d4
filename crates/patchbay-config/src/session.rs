//! Session configuration loaded from TOML.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use patchbay_core::ConnectionPolicy;
use patchbay_registry::NodeRegistry;
use serde::{Deserialize, Serialize};

use crate::ConfigError;
use crate::validation::{ValidationError, validate_config};

/// What happens when a connection targets an input that is already wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupiedPort {
    /// Refuse the new connection.
    #[default]
    Reject,
    /// Drop the old connection and keep the new one.
    Replace,
}

impl From<OccupiedPort> for ConnectionPolicy {
    fn from(value: OccupiedPort) -> Self {
        match value {
            OccupiedPort::Reject => ConnectionPolicy::Reject,
            OccupiedPort::Replace => ConnectionPolicy::Replace,
        }
    }
}

impl From<ConnectionPolicy> for OccupiedPort {
    fn from(value: ConnectionPolicy) -> Self {
        match value {
            ConnectionPolicy::Reject => OccupiedPort::Reject,
            ConnectionPolicy::Replace => OccupiedPort::Replace,
        }
    }
}

/// Where parameter updates are sent from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// A single worker thread sends updates; the editing thread never blocks.
    #[default]
    Background,
    /// Updates are sent on the thread that processed the graph change.
    Inline,
}

/// `[graph]` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Occupied input port policy.
    pub occupied_port: OccupiedPort,
}

/// `[dispatch]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Inline or background dispatch.
    pub mode: DispatchMode,
    /// How long shutdown waits for in-flight updates, in milliseconds.
    pub flush_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mode: DispatchMode::default(),
            flush_timeout_ms: 2000,
        }
    }
}

/// `[backend]` section.
///
/// Informational only. The built-in sinks never read it and nothing here opens
/// a connection; an embedder that ships snapshots over its own transport reads
/// the address from here when building its `patchbay_sync::ParameterSink`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Address of the synthesis backend, if any. Stored and round-tripped,
    /// never dialed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

/// Everything a patch session can be configured with.
///
/// Every section is optional; an empty document is the default config.
///
/// ```rust
/// use patchbay_config::{DispatchMode, OccupiedPort, SessionConfig};
///
/// let config = SessionConfig::from_toml(r#"
///     [graph]
///     occupied_port = "replace"
///
///     [dispatch]
///     mode = "inline"
///
///     [defaults.attack]
///     value = 0.05
/// "#).unwrap();
///
/// assert_eq!(config.graph.occupied_port, OccupiedPort::Replace);
/// assert_eq!(config.dispatch.mode, DispatchMode::Inline);
/// assert_eq!(config.dispatch.flush_timeout_ms, 2000);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Graph editing behavior.
    pub graph: GraphConfig,
    /// Snapshot dispatch behavior.
    pub dispatch: DispatchConfig,
    /// Backend connection.
    pub backend: BackendConfig,
    /// Control default overrides, keyed by node kind then control name.
    pub defaults: BTreeMap<String, BTreeMap<String, f32>>,
}

impl SessionConfig {
    /// Load a config from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load a config from a TOML file, or the default config if the file
    /// does not exist. Other read errors are still reported.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::read_file(path, e)),
        }
    }

    /// Load a config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Convert the config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the config to a TOML file, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every default override against the node catalog.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_config(self)
    }

    /// Add or replace one default override.
    pub fn with_default(mut self, kind: &str, control: &str, value: f32) -> Self {
        self.defaults
            .entry(kind.to_string())
            .or_default()
            .insert(control.to_string(), value);
        self
    }

    /// Occupied-port policy for the patch graph.
    pub fn connection_policy(&self) -> ConnectionPolicy {
        self.graph.occupied_port.into()
    }

    /// Shutdown flush timeout.
    pub fn flush_timeout(&self) -> Duration {
        Duration::from_millis(self.dispatch.flush_timeout_ms)
    }

    /// Copy the default overrides into `registry`.
    ///
    /// Validates first; on error the registry is left untouched.
    pub fn apply_defaults(&self, registry: &mut NodeRegistry) -> Result<(), ConfigError> {
        self.validate()?;
        for (kind, controls) in &self.defaults {
            for (control, value) in controls {
                // Validation already proved the kind, control and range.
                let _ = registry.set_default(kind, control, *value);
            }
        }
        Ok(())
    }

    /// A registry with this config's default overrides applied.
    pub fn registry(&self) -> Result<NodeRegistry, ConfigError> {
        let mut registry = NodeRegistry::new();
        self.apply_defaults(&mut registry)?;
        Ok(registry)
    }
}
