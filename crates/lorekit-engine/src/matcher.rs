// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Matcher: evaluates an inbound message against the registry snapshot.
//!
//! A pure predicate evaluator with no session state. Templates are tested
//! in registry order; each template contributes at most one hit per message
//! (first matching pattern wins). Priority-based reordering happens
//! downstream in the composer, never here.

use std::sync::Arc;
use std::time::{Duration, Instant};

use lorekit_config::EngineConfig;
use tracing::warn;

use crate::registry::RegistrySnapshot;
use crate::template::Template;

/// Per-evaluation resource budget.
///
/// `max_scan_bytes` caps the text handed to each pattern; `timeout` is a
/// wall-clock check after evaluation -- an over-budget result is discarded
/// and logged, never propagated. The `regex` engine itself is free of
/// backtracking blowup, so the budget guards the batch contract, not the
/// process.
#[derive(Debug, Clone, Copy)]
pub struct MatchBudget {
    /// Wall-clock budget for one pattern evaluation.
    pub timeout: Duration,
    /// Maximum number of message bytes scanned.
    pub max_scan_bytes: usize,
}

impl From<&EngineConfig> for MatchBudget {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.match_timeout_ms),
            max_scan_bytes: config.max_scan_bytes,
        }
    }
}

/// A single template hit for one inbound message.
#[derive(Debug, Clone)]
pub struct Hit {
    /// The template that matched.
    pub template: Arc<Template>,
    /// The pattern source that produced the match.
    pub matched_pattern: String,
}

/// Evaluates messages against registry snapshots under a match budget.
#[derive(Debug, Clone, Copy)]
pub struct Matcher {
    budget: MatchBudget,
}

impl Matcher {
    /// Creates a matcher with the given budget.
    pub fn new(budget: MatchBudget) -> Self {
        Self { budget }
    }

    /// Matches `text` against all enabled, permission-eligible templates.
    ///
    /// Output order = registry order. `admin_only` templates are skipped
    /// for non-admin senders. An evaluation that exceeds the time budget is
    /// treated as a non-match for this message and logged; the rest of the
    /// batch always completes.
    pub fn match_message(
        &self,
        snapshot: &RegistrySnapshot,
        text: &str,
        sender_is_admin: bool,
    ) -> Vec<Hit> {
        let scan = truncate_to_boundary(text, self.budget.max_scan_bytes);
        let mut hits = Vec::new();

        for template in snapshot.enabled() {
            if template.only_admin && !sender_is_admin {
                continue;
            }

            for pattern in template.patterns() {
                let started = Instant::now();
                let matched = pattern.is_match(scan);
                let elapsed = started.elapsed();

                if elapsed > self.budget.timeout {
                    warn!(
                        template = template.name.as_str(),
                        pattern = pattern.as_str(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "pattern evaluation exceeded budget, treated as non-match"
                    );
                    continue;
                }

                if matched {
                    hits.push(Hit {
                        template: Arc::clone(template),
                        matched_pattern: pattern.as_str().to_string(),
                    });
                    break;
                }
            }
        }

        hits
    }
}

/// Truncates `text` to at most `max` bytes on a char boundary.
fn truncate_to_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
