//! Integration tests for patchbay-config.

use patchbay_config::{
    ConfigError, DispatchMode, OccupiedPort, SessionConfig, ValidationError, validate_config,
};
use patchbay_core::{ConnectionPolicy, NodeKind, PatchGraph};
use tempfile::TempDir;

const SAMPLE: &str = r#"
[graph]
occupied_port = "replace"

[dispatch]
mode = "inline"
flush_timeout_ms = 500

[backend]
endpoint = "http://localhost:5000/update_parameters"

[defaults.attack]
value = 0.05

[defaults.keyboard]
midi_f0 = 60.0
note_on_duration = 0.5
"#;

#[test]
fn test_sample_config_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("patchbay.toml");
    std::fs::write(&path, SAMPLE).unwrap();

    let config = SessionConfig::load(&path).unwrap();
    assert!(config.validate().is_ok());
    assert_eq!(config.graph.occupied_port, OccupiedPort::Replace);
    assert_eq!(config.dispatch.mode, DispatchMode::Inline);

    let graph = PatchGraph::with_policy(config.connection_policy());
    assert_eq!(graph.policy(), ConnectionPolicy::Replace);

    let registry = config.registry().unwrap();
    let keyboard = registry.create("keyboard").unwrap();
    assert_eq!(keyboard.control("midi_f0"), Some(60.0));
    assert_eq!(keyboard.control("note_on_duration"), Some(0.5));
    assert_eq!(registry.create_kind(NodeKind::Attack).control("value"), Some(0.05));
}

#[test]
fn test_save_then_load_preserves_everything() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a").join("b").join("config.toml");

    let config = SessionConfig::from_toml(SAMPLE).unwrap();
    config.save(&path).unwrap();
    assert_eq!(SessionConfig::load(&path).unwrap(), config);
}

#[test]
fn test_invalid_defaults_are_all_reported() {
    let config = SessionConfig::from_toml(
        r#"
        [defaults.attack]
        value = 99.0
        typo = 1.0

        [defaults.reverb]
        mix = 0.5
        "#,
    )
    .unwrap();

    let Err(ValidationError::Multiple(errors)) = validate_config(&config) else {
        panic!("expected aggregated errors");
    };
    assert_eq!(errors.len(), 3);
    assert!(errors.contains(&ValidationError::UnknownKind("reverb".to_string())));

    assert!(matches!(config.registry(), Err(ConfigError::Validation(_))));
}

#[test]
fn test_malformed_file_reports_parse_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[dispatch\nmode = 3").unwrap();

    assert!(matches!(
        SessionConfig::load_or_default(&path),
        Err(ConfigError::TomlParse(_))
    ));
}
