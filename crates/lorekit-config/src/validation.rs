// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes. Duplicate template names are the one condition that fails a
//! whole load; everything else about a template degrades at runtime
//! (a bad pattern is dropped with a warning, never here).

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::LorekitConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &LorekitConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Validate no duplicate template names
    let mut seen_names = HashSet::new();
    for template in &config.templates {
        if !seen_names.insert(&template.name) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "duplicate template name `{}` in [[templates]] array",
                    template.name
                ),
            });
        }
    }

    // Validate template names are non-empty
    for (i, template) in config.templates.iter().enumerate() {
        if template.name.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("templates[{i}].name must not be empty"),
            });
        }
    }

    // Validate probability is within [0.0, 1.0]
    for template in &config.templates {
        if !(0.0..=1.0).contains(&template.probability) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "templates `{}` probability must be within [0.0, 1.0], got {}",
                    template.name, template.probability
                ),
            });
        }
    }

    // Validate match budget values
    if config.engine.match_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.match_timeout_ms must be at least 1".to_string(),
        });
    }

    if config.engine.max_scan_bytes == 0 {
        errors.push(ConfigError::Validation {
            message: "engine.max_scan_bytes must be at least 1".to_string(),
        });
    }

    // Validate pack file paths are non-empty
    for (i, path) in config.templates_files.iter().enumerate() {
        if path.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("templates_files[{i}] must not be empty"),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TemplateConfig;

    fn template(name: &str) -> TemplateConfig {
        toml::from_str(&format!(
            r#"
name = "{name}"
content = "text"
"#
        ))
        .unwrap()
    }

    #[test]
    fn default_config_validates() {
        let config = LorekitConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn duplicate_template_names_fail_validation() {
        let mut config = LorekitConfig::default();
        config.templates = vec![template("calm"), template("calm")];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(
            |e| matches!(e, ConfigError::Validation { message } if message.contains("duplicate template name"))
        ));
    }

    #[test]
    fn empty_template_name_fails_validation() {
        let mut config = LorekitConfig::default();
        config.templates = vec![template("  ")];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("must not be empty"))));
    }

    #[test]
    fn out_of_range_probability_fails_validation() {
        let mut config = LorekitConfig::default();
        let mut t = template("lucky");
        t.probability = 1.5;
        config.templates = vec![t];
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("probability"))));
    }

    #[test]
    fn zero_match_timeout_fails_validation() {
        let mut config = LorekitConfig::default();
        config.engine.match_timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| matches!(e, ConfigError::Validation { message } if message.contains("match_timeout_ms"))));
    }

    #[test]
    fn all_errors_are_collected() {
        let mut config = LorekitConfig::default();
        config.templates = vec![template("x"), template("x")];
        config.engine.match_timeout_ms = 0;
        config.engine.max_scan_bytes = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.len() >= 3);
    }
}
