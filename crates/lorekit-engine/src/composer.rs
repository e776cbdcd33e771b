// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composer: builds the injection suffix from a session's live activations.
//!
//! Ordering is ascending by priority snapshot, ties broken by activation
//! time (earlier wins placement), kept stable and deterministic. The
//! same-priority policy and the injection cap apply to one composition
//! only; the stored records are never disturbed by them. Content is looked
//! up live from the registry snapshot -- a record whose template vanished or
//! was disabled after activation is evicted here.

use chrono::{DateTime, Utc};
use lorekit_config::{EngineConfig, SamePriority};
use lorekit_core::SessionId;
use tracing::{debug, warn};

use crate::registry::TemplateRegistry;
use crate::store::{ActivationRecord, ActivationStore};
use crate::wildcard::{self, RenderContext};

/// Builds injection text from live activations.
#[derive(Debug, Clone)]
pub struct Composer {
    separator: String,
    same_priority: SamePriority,
    max_inject: usize,
    headings: bool,
}

impl Composer {
    /// Creates a composer from the engine configuration.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            separator: config.separator.clone(),
            same_priority: config.same_priority,
            max_inject: config.max_inject,
            headings: config.headings,
        }
    }

    /// The configured separator (also used between the base prompt and the
    /// suffix).
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Builds the injection suffix for a session; empty when nothing is
    /// active. Each injected record's use count is incremented.
    pub fn build_suffix(
        &self,
        registry: &TemplateRegistry,
        store: &ActivationStore,
        session: &SessionId,
        now: DateTime<Utc>,
    ) -> String {
        let mut records = store.active(session, now);
        if records.is_empty() {
            return String::new();
        }

        // Stable sort: equal (priority, activated_at) keeps activation order.
        records.sort_by_key(|r| (r.priority, r.activated_at));
        let records = self.dedup_tiers(records);
        let records = self.cap(records);

        let snapshot = registry.snapshot();
        let mut injected = Vec::with_capacity(records.len());
        let mut sections = Vec::with_capacity(records.len());

        for record in &records {
            let template = match snapshot.lookup(&record.template_name) {
                Some(t) if t.enabled => t,
                _ => {
                    store.evict(session, &record.template_name);
                    debug!(
                        session = %session,
                        template = record.template_name.as_str(),
                        "template gone from registry, activation evicted"
                    );
                    continue;
                }
            };

            let ctx = RenderContext {
                session_id: session.as_str(),
                template_name: &template.name,
                now,
            };
            let rendered = wildcard::render(&template.content, &ctx);
            if self.headings {
                sections.push(format!("## [{}]\n{rendered}", template.name));
            } else {
                sections.push(rendered);
            }
            injected.push(template.name.clone());
        }

        if injected.is_empty() {
            return String::new();
        }

        store.commit_uses(session, &injected);
        sections.join(&self.separator)
    }

    /// Applies the same-priority policy to the sorted record list.
    fn dedup_tiers(&self, records: Vec<ActivationRecord>) -> Vec<ActivationRecord> {
        match self.same_priority {
            SamePriority::Stack => records,
            SamePriority::First => {
                let mut kept: Vec<ActivationRecord> = Vec::with_capacity(records.len());
                for record in records {
                    if let Some(winner) = kept.iter().find(|k| k.priority == record.priority) {
                        warn!(
                            priority = record.priority,
                            kept = winner.template_name.as_str(),
                            dropped = record.template_name.as_str(),
                            "same-priority conflict, earliest activation kept"
                        );
                    } else {
                        kept.push(record);
                    }
                }
                kept
            }
            SamePriority::Last => {
                let mut kept: Vec<ActivationRecord> = Vec::with_capacity(records.len());
                for record in records {
                    if let Some(pos) = kept.iter().position(|k| k.priority == record.priority) {
                        // Input is sorted by activation time within a tier,
                        // so a later record supersedes the current winner.
                        debug!(
                            priority = record.priority,
                            dropped = kept[pos].template_name.as_str(),
                            kept = record.template_name.as_str(),
                            "same-priority conflict, latest activation kept"
                        );
                        kept[pos] = record;
                    } else {
                        kept.push(record);
                    }
                }
                kept
            }
        }
    }

    /// Truncates to the injection cap, dropping the lowest-precedence tail
    /// for this composition only.
    fn cap(&self, mut records: Vec<ActivationRecord>) -> Vec<ActivationRecord> {
        if self.max_inject > 0 && records.len() > self.max_inject {
            let dropped: Vec<String> = records[self.max_inject..]
                .iter()
                .map(|r| r.template_name.clone())
                .collect();
            debug!(
                max_inject = self.max_inject,
                ?dropped,
                "injection cap exceeded, tail dropped for this request"
            );
            records.truncate(self.max_inject);
        }
        records
    }
}
