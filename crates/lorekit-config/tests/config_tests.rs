// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the lorekit configuration system.

use lorekit_config::diagnostic::{suggest_key, ConfigError};
use lorekit_config::model::SamePriority;
use lorekit_config::{load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_lorekit_config() {
    let toml = r#"
templates_files = ["/etc/lorekit/packs/base.json"]

[engine]
separator = "\n\n"
same_priority = "last"
headings = true
max_inject = 5
match_timeout_ms = 50
max_scan_bytes = 4096
regex_size_limit = 524288
sweep_interval_secs = 300

[[templates]]
name = "calm"
enable = true
content = "Respond calmly."
priority = 10
regexs = ["冷静", "calm down"]
duration = 60
times = 3
probability = 0.5

[[templates]]
name = "strict"
content = "Be strict."
priority = 1
regexs = ["严格"]
duration = 0
only_admin = true
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.engine.separator, "\n\n");
    assert_eq!(config.engine.same_priority, SamePriority::Last);
    assert!(config.engine.headings);
    assert_eq!(config.engine.max_inject, 5);
    assert_eq!(config.engine.match_timeout_ms, 50);
    assert_eq!(config.engine.max_scan_bytes, 4096);
    assert_eq!(config.engine.regex_size_limit, 524288);
    assert_eq!(config.engine.sweep_interval_secs, 300);
    assert_eq!(config.templates_files.len(), 1);

    assert_eq!(config.templates.len(), 2);
    let calm = &config.templates[0];
    assert_eq!(calm.name, "calm");
    assert_eq!(calm.regexs, vec!["冷静", "calm down"]);
    assert_eq!(calm.duration, 60);
    assert_eq!(calm.times, 3);
    assert_eq!(calm.probability, 0.5);
    assert!(!calm.only_admin);

    let strict = &config.templates[1];
    assert_eq!(strict.priority, 1);
    assert_eq!(strict.duration, 0);
    assert!(strict.only_admin);
}

/// Unknown field in [engine] section produces an error.
#[test]
fn unknown_field_in_engine_produces_error() {
    let toml = r#"
[engine]
seperator = "|"
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = format!("{err}");
    // Figment wraps serde's deny_unknown_fields error
    assert!(
        err_str.contains("unknown field") || err_str.contains("seperator"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

/// Unknown field in a template entry produces an error.
#[test]
fn unknown_field_in_template_produces_error() {
    let toml = r#"
[[templates]]
name = "calm"
contnet = "oops"
"#;

    let result = load_config_from_str(toml);
    assert!(result.is_err());
}

/// A template missing its required content field produces an error.
#[test]
fn template_missing_content_produces_error() {
    let toml = r#"
[[templates]]
name = "calm"
"#;

    let result = load_config_from_str(toml);
    assert!(result.is_err());
}

/// Duplicate template names are rejected by validation, not deserialization.
#[test]
fn duplicate_template_names_rejected_by_validation() {
    let toml = r#"
[[templates]]
name = "calm"
content = "a"

[[templates]]
name = "calm"
content = "b"
"#;

    let errors = load_and_validate_str(toml).expect_err("duplicate names must fail");
    assert!(errors.iter().any(
        |e| matches!(e, ConfigError::Validation { message } if message.contains("duplicate template name"))
    ));
}

/// Typo suggestions surface through the diagnostic layer.
#[test]
fn suggest_key_finds_close_match() {
    let valid = &["separator", "same_priority", "headings", "max_inject"];
    assert_eq!(suggest_key("seperator", valid), Some("separator".to_string()));
    assert_eq!(suggest_key("qqqq", valid), None);
}

/// Defaults apply when sections are omitted entirely.
#[test]
fn empty_config_gets_defaults() {
    let config = load_and_validate_str("").expect("empty config is valid");
    assert_eq!(config.engine.separator, "\n");
    assert_eq!(config.engine.same_priority, SamePriority::Stack);
    assert!(config.templates.is_empty());
}

/// An invalid same_priority value is rejected.
#[test]
fn invalid_same_priority_value_rejected() {
    let toml = r#"
[engine]
same_priority = "newest"
"#;
    assert!(load_config_from_str(toml).is_err());
}
