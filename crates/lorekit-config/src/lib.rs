// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the lorekit activation engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, Elm-style diagnostic error rendering with typo suggestions,
//! and JSON template-pack import/export.
//!
//! # Usage
//!
//! ```no_run
//! use lorekit_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("templates: {}", config.templates.len());
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod packfile;
pub mod validation;

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{EngineConfig, LorekitConfig, SamePriority, TemplateConfig};
pub use packfile::{load_pack, save_pack};

/// Load configuration from the XDG hierarchy and validate it.
///
/// This is the high-level entry point that:
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to rich miette diagnostics with typo suggestions
///
/// Returns either a valid `LorekitConfig` or a list of diagnostic errors.
pub fn load_and_validate() -> Result<LorekitConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            // Read TOML source files for error source span information
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a specific TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<LorekitConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from an explicit file path and validate it.
pub fn load_and_validate_path(path: &Path) -> Result<LorekitConfig, Vec<ConfigError>> {
    match loader::load_config_from_path(path) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = match std::fs::read_to_string(path) {
                Ok(content) => vec![(path.display().to_string(), content)],
                Err(_) => Vec::new(),
            };
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Resolve the full template list: `[[templates]]` plus entries merged from
/// the JSON packs in `templates_files`.
///
/// Pack entries whose name collides with an already-resolved template are
/// skipped with a warning, so the resolved list is unique by name and safe
/// to hand to the registry. An unreadable pack is logged and skipped; it
/// never fails the resolution.
pub fn resolve_templates(config: &LorekitConfig) -> Vec<TemplateConfig> {
    let mut resolved = config.templates.clone();
    let mut names: HashSet<String> =
        resolved.iter().map(|t| t.name.clone()).collect();

    for path in &config.templates_files {
        let pack = match packfile::load_pack(Path::new(path)) {
            Ok(pack) => pack,
            Err(e) => {
                warn!(path = path.as_str(), error = %e, "template pack load failed, skipped");
                continue;
            }
        };

        let total = pack.len();
        let mut loaded = 0usize;
        let mut skipped = 0usize;
        for template in pack {
            if names.contains(&template.name) {
                skipped += 1;
                continue;
            }
            names.insert(template.name.clone());
            resolved.push(template);
            loaded += 1;
        }

        info!(
            path = path.as_str(),
            total, loaded, skipped, "template pack merged"
        );
    }

    resolved
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    // Local config
    if let Ok(content) = std::fs::read_to_string("lorekit.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("lorekit.toml").display().to_string())
            .unwrap_or_else(|_| "lorekit.toml".to_string());
        sources.push((path, content));
    }

    // XDG user config
    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("lorekit/lorekit.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    // System config
    let system_path = std::path::Path::new("/etc/lorekit/lorekit.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
