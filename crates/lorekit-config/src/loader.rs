// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./lorekit.toml` > `~/.config/lorekit/lorekit.toml` > `/etc/lorekit/lorekit.toml`
//! with environment variable overrides via `LOREKIT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::LorekitConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/lorekit/lorekit.toml` (system-wide)
/// 3. `~/.config/lorekit/lorekit.toml` (user XDG config)
/// 4. `./lorekit.toml` (local directory)
/// 5. `LOREKIT_*` environment variables
pub fn load_config() -> Result<LorekitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LorekitConfig::default()))
        .merge(Toml::file("/etc/lorekit/lorekit.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("lorekit/lorekit.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("lorekit.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<LorekitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LorekitConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LorekitConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LorekitConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `LOREKIT_ENGINE_MATCH_TIMEOUT_MS` must
/// map to `engine.match_timeout_ms`, not `engine.match.timeout.ms`.
fn env_provider() -> Env {
    Env::prefixed("LOREKIT_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: LOREKIT_ENGINE_MAX_INJECT -> "engine_max_inject"
        key.as_str().replacen("engine_", "engine.", 1).into()
    })
}
