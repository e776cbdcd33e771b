// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Compiled template: an immutable definition with its trigger patterns
//! pre-compiled. Templates are replaced wholesale on reload, never mutated
//! in place.

use lorekit_config::TemplateConfig;
use regex::{Regex, RegexBuilder};
use tracing::warn;

/// An immutable, compiled template definition.
///
/// A pattern that fails to compile (or exceeds the size budget) is dropped
/// with a warning at construction; the template stays usable with its
/// remaining valid patterns. An empty pattern list falls back to the
/// escaped template name as the trigger word.
#[derive(Debug, Clone)]
pub struct Template {
    /// Unique name across the registry.
    pub name: String,
    /// Disabled templates are invisible to the matcher but still resolvable
    /// by name lookup.
    pub enabled: bool,
    /// Text appended to the system prompt while active.
    pub content: String,
    /// Lower value = higher precedence.
    pub priority: i32,
    /// Activation lifetime in seconds. `0` = active until cleared.
    pub duration_seconds: u64,
    /// Maximum injections per activation. `0` = unlimited.
    pub max_uses: u32,
    /// Hits are discarded unless the sender is an administrator.
    pub only_admin: bool,
    /// Activation chance in `[0.0, 1.0]`.
    pub probability: f64,
    /// Raw pattern strings as configured (kept for export).
    raw_patterns: Vec<String>,
    /// Compiled trigger patterns, in configuration order.
    patterns: Vec<Regex>,
}

impl Template {
    /// Compiles a template definition. Never fails: invalid patterns are
    /// dropped individually with a warning.
    pub fn compile(config: &TemplateConfig, size_limit: usize) -> Self {
        let sources: Vec<String> = config
            .regexs
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect();

        // No usable patterns: the template name itself is the trigger word.
        let effective = if sources.is_empty() {
            vec![regex::escape(&config.name)]
        } else {
            sources
        };

        let mut patterns = Vec::with_capacity(effective.len());
        for source in &effective {
            match RegexBuilder::new(source).size_limit(size_limit).build() {
                Ok(re) => patterns.push(re),
                Err(e) => {
                    warn!(
                        template = config.name.as_str(),
                        pattern = source.as_str(),
                        error = %e,
                        "pattern failed to compile, dropped"
                    );
                }
            }
        }

        Self {
            name: config.name.clone(),
            enabled: config.enable,
            content: config.content.clone(),
            priority: config.priority,
            duration_seconds: config.duration,
            max_uses: config.times,
            only_admin: config.only_admin,
            probability: config.probability,
            raw_patterns: config.regexs.clone(),
            patterns,
        }
    }

    /// Compiled trigger patterns, in configuration order.
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// Whether the template is permanent (`duration = 0`).
    pub fn is_permanent(&self) -> bool {
        self.duration_seconds == 0
    }

    /// Converts back to a configuration record, e.g. for pack export.
    /// Patterns are the raw configured strings, including any that failed
    /// to compile.
    pub fn to_config(&self) -> TemplateConfig {
        TemplateConfig {
            name: self.name.clone(),
            enable: self.enabled,
            content: self.content.clone(),
            priority: self.priority,
            regexs: self.raw_patterns.clone(),
            duration: self.duration_seconds,
            times: self.max_uses,
            only_admin: self.only_admin,
            probability: self.probability,
        }
    }
}
