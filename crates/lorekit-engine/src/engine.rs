// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The injection engine facade: wires registry, matcher, store, and
//! composer behind the two host-pipeline hooks.
//!
//! Inbound message -> [`InjectionEngine::handle_inbound`] (match, gate,
//! activate). Outbound LLM request -> [`InjectionEngine::build_system_prompt`]
//! (compose, append). Nothing in this path returns an error to the host:
//! every failure degrades to "no injection" or "partial injection", never
//! to a dropped message.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use lorekit_config::{LorekitConfig, TemplateConfig};
use lorekit_core::{InboundMessage, LorekitError, SessionId, TemplateStatus};
use rand::Rng;
use tracing::debug;

use crate::composer::Composer;
use crate::matcher::{Hit, MatchBudget, Matcher};
use crate::registry::TemplateRegistry;
use crate::store::ActivationStore;

/// Session-scoped template activation engine.
pub struct InjectionEngine {
    registry: TemplateRegistry,
    store: ActivationStore,
    matcher: Matcher,
    composer: Composer,
}

impl InjectionEngine {
    /// Builds an engine from a validated configuration, loading the
    /// registry from `[[templates]]` plus any template-pack files.
    pub fn from_config(config: &LorekitConfig) -> Result<Self, LorekitError> {
        let templates = lorekit_config::resolve_templates(config);
        let registry = TemplateRegistry::new(config.engine.regex_size_limit);
        registry.load(&templates)?;

        Ok(Self {
            registry,
            store: ActivationStore::new(),
            matcher: Matcher::new(MatchBudget::from(&config.engine)),
            composer: Composer::new(&config.engine),
        })
    }

    /// Handles one inbound message: matches it against the registry,
    /// applies each hit's probability gate, and activates the survivors.
    ///
    /// Returns the names of the templates activated (or refreshed) by this
    /// message, in registry order.
    pub fn handle_inbound(&self, message: &InboundMessage, now: DateTime<Utc>) -> Vec<String> {
        if message.text.is_empty() {
            return Vec::new();
        }

        let snapshot = self.registry.snapshot();
        let hits =
            self.matcher
                .match_message(&snapshot, &message.text, message.sender_is_admin);
        if hits.is_empty() {
            return Vec::new();
        }

        let admitted = gate_probability(hits, &mut rand::thread_rng());
        if admitted.is_empty() {
            return Vec::new();
        }

        self.store.activate(&message.session_id, &admitted, now)
    }

    /// Builds the injection suffix for a session; empty when nothing is
    /// active.
    pub fn build_injection_suffix(&self, session: &SessionId, now: DateTime<Utc>) -> String {
        self.composer
            .build_suffix(&self.registry, &self.store, session, now)
    }

    /// The outbound-request hook: appends the session's injection suffix to
    /// the base system prompt. Returns the base unchanged when nothing is
    /// active.
    pub fn build_system_prompt(
        &self,
        session: &SessionId,
        base_system_prompt: &str,
        now: DateTime<Utc>,
    ) -> String {
        let suffix = self.build_injection_suffix(session, now);
        if suffix.is_empty() {
            base_system_prompt.to_string()
        } else if base_system_prompt.is_empty() {
            suffix
        } else {
            format!("{base_system_prompt}{}{suffix}", self.composer.separator())
        }
    }

    /// Status rows for a session's live activations. Unknown sessions
    /// yield an empty list, never an error.
    pub fn status(&self, session: &SessionId, now: DateTime<Utc>) -> Vec<TemplateStatus> {
        self.store.status(session, now)
    }

    /// Clears every activation in a session, returning the count removed.
    /// Idempotent.
    pub fn clear(&self, session: &SessionId) -> usize {
        self.store.clear(session)
    }

    /// Enables or disables templates by name; `(applied, unknown)`.
    pub fn set_enabled(&self, names: &[String], enabled: bool) -> (Vec<String>, Vec<String>) {
        self.registry.set_enabled(names, enabled)
    }

    /// Hot-reloads the registry from new template definitions. On error
    /// (duplicate names) the previous registry stays active; existing
    /// activations are untouched either way -- records whose template
    /// disappeared are evicted lazily at compose time.
    pub fn reload(&self, templates: &[TemplateConfig]) -> Result<usize, LorekitError> {
        self.registry.load(templates)
    }

    /// Exports the current registry as configuration records (pack export).
    pub fn export_templates(&self) -> Vec<TemplateConfig> {
        self.registry.export()
    }

    /// The underlying registry.
    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// The underlying activation store.
    pub fn store(&self) -> &ActivationStore {
        &self.store
    }

    /// Spawns the background expiry sweeper for idle-session memory
    /// hygiene. Correctness never depends on it: every read already prunes
    /// lazily. Returns the task handle; abort it to stop sweeping.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let engine = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let removed = engine.store.sweep(Utc::now());
                if removed > 0 {
                    debug!(removed, "expired activations swept");
                }
            }
        })
    }
}

/// Filters hits through their templates' probability gates.
///
/// `probability >= 1.0` always passes, `<= 0.0` never does; anything in
/// between passes when a uniform draw lands below it.
fn gate_probability<R: Rng>(hits: Vec<Hit>, rng: &mut R) -> Vec<Hit> {
    hits.into_iter()
        .filter(|hit| {
            let p = hit.template.probability;
            if p >= 1.0 {
                return true;
            }
            if p <= 0.0 {
                return false;
            }
            let pass = rng.r#gen::<f64>() < p;
            if !pass {
                debug!(
                    template = hit.template.name.as_str(),
                    probability = p,
                    "probability gate declined activation"
                );
            }
            pass
        })
        .collect()
}
