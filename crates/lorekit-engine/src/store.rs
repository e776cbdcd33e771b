// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-session activation store.
//!
//! Sessions are sharded by key in a `DashMap`: operations on one session
//! are serialized by its entry lock while distinct sessions proceed fully
//! in parallel. Expiry is enforced lazily -- every read prunes dead records
//! and drops emptied sessions -- with an optional full sweep for long-lived
//! idle sessions (see the engine's background sweeper).
//!
//! Invariant: a session never holds two records for the same template name;
//! re-activation replaces the existing record (timer restarts, use count
//! resets).

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use lorekit_core::{Remaining, SessionId, TemplateStatus};
use tracing::debug;

use crate::matcher::Hit;

/// A single activation of a template within one session.
///
/// `priority` and `max_uses` are snapshots taken at activation time, so a
/// later config change does not retroactively reorder or re-limit an
/// already-active injection. Content is looked up live at compose time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationRecord {
    /// Name of the activated template (lookup key, not ownership).
    pub template_name: String,
    /// When the activation (or its latest refresh) happened.
    pub activated_at: DateTime<Utc>,
    /// Expiry instant; `None` = active until cleared.
    pub expires_at: Option<DateTime<Utc>>,
    /// Priority snapshot at activation time.
    pub priority: i32,
    /// Injections performed so far.
    pub use_count: u32,
    /// Use limit snapshot; `0` = unlimited.
    pub max_uses: u32,
}

impl ActivationRecord {
    /// Whether the record is still injectable at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        if let Some(expires_at) = self.expires_at
            && now >= expires_at
        {
            return false;
        }
        self.max_uses == 0 || self.use_count < self.max_uses
    }

    /// Remaining lifetime at `now`.
    pub fn remaining(&self, now: DateTime<Utc>) -> Remaining {
        match self.expires_at {
            None => Remaining::Permanent,
            Some(expires_at) => Remaining::Seconds((expires_at - now).num_seconds().max(0)),
        }
    }
}

/// Per-session activation records, keyed by opaque session id.
#[derive(Debug, Default)]
pub struct ActivationStore {
    sessions: DashMap<SessionId, Vec<ActivationRecord>>,
}

impl ActivationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates (or refreshes) one record per hit in the batch.
    ///
    /// A hit for an already-active template replaces its record: the timer
    /// restarts from `now` and the use count resets. Returns the activated
    /// template names in batch order.
    pub fn activate(&self, session: &SessionId, hits: &[Hit], now: DateTime<Utc>) -> Vec<String> {
        if hits.is_empty() {
            return Vec::new();
        }

        let mut entry = self.sessions.entry(session.clone()).or_default();
        let records = entry.value_mut();
        prune(session, records, now);

        let mut activated = Vec::with_capacity(hits.len());
        for hit in hits {
            let template = &hit.template;
            let expires_at = if template.duration_seconds == 0 {
                None
            } else {
                Some(now + chrono::Duration::seconds(template.duration_seconds as i64))
            };
            let record = ActivationRecord {
                template_name: template.name.clone(),
                activated_at: now,
                expires_at,
                priority: template.priority,
                use_count: 0,
                max_uses: template.max_uses,
            };

            if let Some(existing) = records
                .iter_mut()
                .find(|r| r.template_name == template.name)
            {
                *existing = record;
            } else {
                records.push(record);
            }
            activated.push(template.name.clone());
        }

        debug!(session = %session, templates = ?activated, "activations attached");
        activated
    }

    /// Returns the live records for a session at `now`, in activation order.
    ///
    /// Dead records (expired, used up) are deleted opportunistically; an
    /// emptied session is dropped from the map.
    pub fn active(&self, session: &SessionId, now: DateTime<Utc>) -> Vec<ActivationRecord> {
        let records = {
            let Some(mut entry) = self.sessions.get_mut(session) else {
                return Vec::new();
            };
            prune(session, entry.value_mut(), now);
            entry.value().clone()
        };

        if records.is_empty() {
            // Entry guard released above; safe to take the shard lock again.
            self.sessions.remove_if(session, |_, v| v.is_empty());
        }
        records
    }

    /// Status rows for the session's live activations.
    pub fn status(&self, session: &SessionId, now: DateTime<Utc>) -> Vec<TemplateStatus> {
        self.active(session, now)
            .into_iter()
            .map(|r| {
                let remaining = r.remaining(now);
                TemplateStatus {
                    name: r.template_name,
                    remaining,
                    priority: r.priority,
                }
            })
            .collect()
    }

    /// Removes every record for the session. Idempotent: an unknown or
    /// empty session yields zero.
    pub fn clear(&self, session: &SessionId) -> usize {
        let removed = self
            .sessions
            .remove(session)
            .map(|(_, records)| records.len())
            .unwrap_or(0);
        if removed > 0 {
            debug!(session = %session, removed, "session activations cleared");
        }
        removed
    }

    /// Removes a single record by template name. Returns whether a record
    /// was present.
    pub fn evict(&self, session: &SessionId, template_name: &str) -> bool {
        let Some(mut entry) = self.sessions.get_mut(session) else {
            return false;
        };
        let records = entry.value_mut();
        let before = records.len();
        records.retain(|r| r.template_name != template_name);
        before != records.len()
    }

    /// Increments the use count of the named records (one injection each).
    /// Records that disappeared since the caller read them are ignored.
    pub fn commit_uses(&self, session: &SessionId, template_names: &[String]) {
        let Some(mut entry) = self.sessions.get_mut(session) else {
            return;
        };
        for record in entry.value_mut().iter_mut() {
            if template_names.contains(&record.template_name) {
                record.use_count += 1;
            }
        }
    }

    /// Full sweep across all sessions: deletes dead records and emptied
    /// sessions. Returns the number of records removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        self.sessions.retain(|session, records| {
            let before = records.len();
            prune(session, records, now);
            removed += before - records.len();
            !records.is_empty()
        });
        removed
    }

    /// Number of sessions currently holding activations.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

/// Deletes records that are no longer live at `now`.
fn prune(session: &SessionId, records: &mut Vec<ActivationRecord>, now: DateTime<Utc>) {
    records.retain(|r| {
        let live = r.is_live(now);
        if !live {
            debug!(
                session = %session,
                template = r.template_name.as_str(),
                "dead activation pruned"
            );
        }
        live
    });
}
