// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lorekit check` command implementation.
//!
//! Compiles the full registry from the validated configuration and reports
//! what the engine would actually run with: template count, pattern compile
//! results, and engine settings.

use colored::Colorize;
use lorekit_config::LorekitConfig;
use lorekit_core::LorekitError;
use lorekit_engine::InjectionEngine;

/// Runs the config doctor: loads the registry and prints a summary.
pub fn run_check(config: &LorekitConfig) -> Result<(), LorekitError> {
    let engine = InjectionEngine::from_config(config)?;
    let snapshot = engine.registry().snapshot();

    println!("{}", "lorekit check".bold().green());
    println!(
        "engine: separator={:?} same_priority={} max_inject={} match_timeout={}ms",
        config.engine.separator,
        config.engine.same_priority,
        config.engine.max_inject,
        config.engine.match_timeout_ms,
    );
    println!("templates: {}", snapshot.len());

    for template in snapshot.all() {
        let configured = template
            .to_config()
            .regexs
            .iter()
            .filter(|p| !p.trim().is_empty())
            .count()
            .max(1); // empty list falls back to the template name
        let compiled = template.patterns().len();

        let state = if !template.enabled {
            "disabled".dimmed()
        } else if compiled == 0 {
            "no usable patterns".red()
        } else if compiled < configured {
            "some patterns dropped".yellow()
        } else {
            "ok".green()
        };

        println!(
            "  {} priority={} duration={} patterns={}/{} {}",
            template.name.bold(),
            template.priority,
            if template.is_permanent() {
                "permanent".to_string()
            } else {
                format!("{}s", template.duration_seconds)
            },
            compiled,
            configured,
            state,
        );
    }

    Ok(())
}
