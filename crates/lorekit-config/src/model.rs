// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the lorekit activation engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Top-level lorekit configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. Template definitions live in the `[[templates]]` array and in
/// optional JSON pack files listed under `templates_files`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LorekitConfig {
    /// Matching, composition, and budget settings.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Template definitions, in the order they should be matched.
    #[serde(default)]
    pub templates: Vec<TemplateConfig>,

    /// Paths of JSON template-pack files to merge after `templates`.
    /// Entries whose name collides with an already-loaded template are
    /// skipped with a warning.
    #[serde(default)]
    pub templates_files: Vec<String>,
}

/// Policy for templates sharing the same priority at compose time.
///
/// The store always admits every distinct template; this policy only
/// decides which records survive within one priority tier when the
/// injection text is built.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SamePriority {
    /// Keep all tier members, concatenated in activation order.
    #[default]
    Stack,
    /// Keep only the earliest-activated member per tier.
    First,
    /// Keep only the most-recently-activated member per tier.
    Last,
}

/// Matching, composition, and budget configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Separator joining composed template contents, and separating the
    /// injected suffix from the base system prompt.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Same-priority dedup policy applied at compose time.
    #[serde(default)]
    pub same_priority: SamePriority,

    /// Render each injected template as `## [name]` followed by its content.
    #[serde(default)]
    pub headings: bool,

    /// Maximum number of templates injected per request. `0` = unlimited.
    /// The overflow is dropped for that request only, lowest priority first.
    #[serde(default)]
    pub max_inject: usize,

    /// Wall-clock budget for a single pattern evaluation, in milliseconds.
    /// An over-budget evaluation is logged and treated as a non-match.
    #[serde(default = "default_match_timeout_ms")]
    pub match_timeout_ms: u64,

    /// Maximum number of message bytes scanned per pattern evaluation.
    #[serde(default = "default_max_scan_bytes")]
    pub max_scan_bytes: usize,

    /// Compiled-size budget handed to `regex::RegexBuilder::size_limit`.
    /// A pattern exceeding it is dropped at load with a warning.
    #[serde(default = "default_regex_size_limit")]
    pub regex_size_limit: usize,

    /// Interval of the background expiry sweeper, in seconds. `0` disables
    /// the sweeper; expiry is then enforced only lazily on reads.
    #[serde(default)]
    pub sweep_interval_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            same_priority: SamePriority::default(),
            headings: false,
            max_inject: 0,
            match_timeout_ms: default_match_timeout_ms(),
            max_scan_bytes: default_max_scan_bytes(),
            regex_size_limit: default_regex_size_limit(),
            sweep_interval_secs: 0,
        }
    }
}

fn default_separator() -> String {
    "\n".to_string()
}

fn default_match_timeout_ms() -> u64 {
    25
}

fn default_max_scan_bytes() -> usize {
    8192
}

fn default_regex_size_limit() -> usize {
    1 << 20
}

/// A single template definition.
///
/// Field names follow the host configuration contract: `enable`, `regexs`,
/// `duration`, `only_admin`. `times` and `probability` extend the base
/// record with use-count limiting and chance-gated activation.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Unique template name. Also the fallback trigger word when `regexs`
    /// is empty.
    pub name: String,

    /// Disabled templates stay in the registry but are invisible to the
    /// matcher.
    #[serde(default = "default_enable")]
    pub enable: bool,

    /// Text appended to the system prompt while the template is active.
    /// May contain `{placeholder}` markers resolved at compose time.
    pub content: String,

    /// Lower value = higher precedence in the composed injection.
    /// Not required to be unique.
    #[serde(default = "default_priority")]
    pub priority: i32,

    /// Trigger patterns, tried in order; the first match wins. A pattern
    /// that fails to compile is dropped with a warning. Empty list falls
    /// back to the literal template name.
    #[serde(default)]
    pub regexs: Vec<String>,

    /// Activation lifetime in seconds. `0` = active until cleared.
    #[serde(default = "default_duration")]
    pub duration: u64,

    /// Maximum number of injections per activation. `0` = unlimited.
    #[serde(default)]
    pub times: u32,

    /// Discard hits unless the sender is an administrator of the session.
    #[serde(default)]
    pub only_admin: bool,

    /// Activation chance in `[0.0, 1.0]`. `1.0` always activates.
    #[serde(default = "default_probability")]
    pub probability: f64,
}

fn default_enable() -> bool {
    true
}

fn default_priority() -> i32 {
    50
}

fn default_duration() -> u64 {
    180
}

fn default_probability() -> f64 {
    1.0
}
