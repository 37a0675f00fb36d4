//! Session configuration for patchbay.
//!
//! A session config is a small TOML document that picks the occupied-port
//! policy, the dispatch mode and the backend endpoint, and overrides the
//! catalog defaults of node controls. Nothing about the patch itself is
//! stored here; patches are never persisted.
//!
//! # Features
//!
//! - **Session Config**: Load and save [`SessionConfig`] from TOML files
//! - **Validation**: Check default overrides against the node catalog
//! - **Paths**: Platform-specific config directory and file lookup
//!
//! # Example
//!
//! ```rust,no_run
//! use patchbay_config::{SessionConfig, paths};
//!
//! let config = match paths::find_config(None) {
//!     Some(path) => SessionConfig::load_or_default(path).unwrap(),
//!     None => SessionConfig::default(),
//! };
//! let registry = config.registry().unwrap();
//! println!("{} node kinds, policy {:?}", registry.len(), config.connection_policy());
//! ```

mod error;
mod session;

/// Platform-specific paths for configuration.
pub mod paths;

/// Validation of control default overrides.
pub mod validation;

pub use error::ConfigError;
pub use paths::{ensure_user_config_dir, find_config, user_config_dir, user_config_file};
pub use session::{
    BackendConfig, DispatchConfig, DispatchMode, GraphConfig, OccupiedPort, SessionConfig,
};
pub use validation::{ValidationError, ValidationResult, validate_config, validate_default};
