//! Validation of `[defaults.<kind>]` overrides.
//!
//! Every override must name a known node kind, a control of that kind, and
//! a finite value inside the control's range. Errors are collected rather
//! than reported one at a time, so a config with three typos reports all
//! three.
//!
//! # Example
//!
//! ```rust
//! use patchbay_config::{SessionConfig, validate_config};
//!
//! let config = SessionConfig::from_toml("[defaults.attack]\nvalue = 0.25\n").unwrap();
//! assert!(validate_config(&config).is_ok());
//!
//! let config = SessionConfig::from_toml("[defaults.filter]\ncutoff = 1.0\n").unwrap();
//! assert!(validate_config(&config).is_err());
//! ```

use patchbay_registry::NodeRegistry;
use thiserror::Error;

use crate::SessionConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// No node kind has this id or name.
    #[error("unknown node kind: {0}")]
    UnknownKind(String),

    /// The kind exists but has no such control.
    #[error("unknown control '{control}' for node '{kind}'")]
    UnknownControl {
        /// Node kind as written in the config.
        kind: String,
        /// Name of the unrecognized control.
        control: String,
    },

    /// Control value outside the control's range.
    #[error("control '{kind}.{control}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Node kind as written in the config.
        kind: String,
        /// Control name as written in the config.
        control: String,
        /// The offending value.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// NaN or infinite control value.
    #[error("control '{kind}.{control}' value {value} is not finite")]
    NonFinite {
        /// Node kind as written in the config.
        kind: String,
        /// Control name as written in the config.
        control: String,
        /// The offending value.
        value: f32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", join_messages(.0))]
    Multiple(Vec<ValidationError>),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a single `kind.control = value` override against the catalog.
pub fn validate_default(
    registry: &NodeRegistry,
    kind: &str,
    control: &str,
    value: f32,
) -> ValidationResult<()> {
    let descriptor = registry
        .get(kind)
        .ok_or_else(|| ValidationError::UnknownKind(kind.to_string()))?;
    let index = registry
        .control_index_by_name(descriptor.id, control)
        .ok_or_else(|| ValidationError::UnknownControl {
            kind: kind.to_string(),
            control: control.to_string(),
        })?;
    let spec = &descriptor.kind.controls()[index];

    if !value.is_finite() {
        return Err(ValidationError::NonFinite {
            kind: kind.to_string(),
            control: control.to_string(),
            value,
        });
    }
    if !spec.contains(value) {
        return Err(ValidationError::OutOfRange {
            kind: kind.to_string(),
            control: control.to_string(),
            value,
            min: spec.min,
            max: spec.max,
        });
    }
    Ok(())
}

/// Validate every default override in a session config.
///
/// Returns the single error when exactly one override is bad, and
/// [`ValidationError::Multiple`] when several are.
pub fn validate_config(config: &SessionConfig) -> ValidationResult<()> {
    let registry = NodeRegistry::new();
    let mut errors = Vec::new();

    for (kind, controls) in &config.defaults {
        if registry.get(kind).is_none() {
            errors.push(ValidationError::UnknownKind(kind.clone()));
            continue;
        }
        for (control, value) in controls {
            if let Err(e) = validate_default(&registry, kind, control, *value) {
                errors.push(e);
            }
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_accepts_in_range() {
        let registry = NodeRegistry::new();
        assert!(validate_default(&registry, "attack", "value", 0.5).is_ok());
        assert!(validate_default(&registry, "VCO", "tuning", 0.0).is_ok());
    }

    #[test]
    fn test_validate_default_unknown_kind() {
        let registry = NodeRegistry::new();
        assert_eq!(
            validate_default(&registry, "filter", "cutoff", 1.0),
            Err(ValidationError::UnknownKind("filter".to_string()))
        );
    }

    #[test]
    fn test_validate_default_unknown_control() {
        let registry = NodeRegistry::new();
        let err = validate_default(&registry, "attack", "cutoff", 1.0).unwrap_err();
        assert!(matches!(err, ValidationError::UnknownControl { .. }));
        assert_eq!(err.to_string(), "unknown control 'cutoff' for node 'attack'");
    }

    #[test]
    fn test_validate_default_out_of_range() {
        let registry = NodeRegistry::new();
        let err = validate_default(&registry, "sustain", "value", 1.5).unwrap_err();
        match err {
            ValidationError::OutOfRange { min, max, value, .. } => {
                assert_eq!(value, 1.5);
                assert_eq!(min, 0.0);
                assert_eq!(max, 1.0);
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_default_non_finite() {
        let registry = NodeRegistry::new();
        let err = validate_default(&registry, "attack", "value", f32::NAN).unwrap_err();
        assert!(matches!(err, ValidationError::NonFinite { .. }));
    }

    #[test]
    fn test_validate_config_aggregates() {
        let config = SessionConfig::from_toml(
            "[defaults.attack]\nvalue = 20.0\n\n[defaults.filter]\ncutoff = 1.0\n",
        )
        .unwrap();
        match validate_config(&config) {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_config_single_error_is_unwrapped() {
        let config = SessionConfig::from_toml("[defaults.decay]\nvalue = -1.0\n").unwrap();
        assert!(matches!(
            validate_config(&config),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_multiple_display_joins_messages() {
        let err = ValidationError::Multiple(vec![
            ValidationError::UnknownKind("a".to_string()),
            ValidationError::UnknownKind("b".to_string()),
        ]);
        assert_eq!(
            err.to_string(),
            "multiple validation errors: unknown node kind: a; unknown node kind: b"
        );
    }
}
