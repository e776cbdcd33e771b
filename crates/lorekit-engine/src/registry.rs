// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template registry: an atomically swapped immutable snapshot.
//!
//! Readers (the matcher, the composer) grab the current snapshot without
//! locking; a reload builds a complete new snapshot off to the side and
//! publishes it with one atomic swap, so in-flight matches never observe a
//! partially updated registry. A failed reload keeps the previous snapshot
//! active.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use lorekit_config::TemplateConfig;
use lorekit_core::LorekitError;
use tracing::{debug, info};

use crate::template::Template;

/// An immutable view of the loaded templates, in configuration order.
#[derive(Debug, Default)]
pub struct RegistrySnapshot {
    templates: Vec<Arc<Template>>,
    by_name: HashMap<String, Arc<Template>>,
}

impl RegistrySnapshot {
    fn build(templates: Vec<Arc<Template>>) -> Self {
        let by_name = templates
            .iter()
            .map(|t| (t.name.clone(), Arc::clone(t)))
            .collect();
        Self { templates, by_name }
    }

    /// All templates in configuration order, enabled or not.
    pub fn all(&self) -> &[Arc<Template>] {
        &self.templates
    }

    /// Enabled templates in configuration order (the matcher's view).
    pub fn enabled(&self) -> impl Iterator<Item = &Arc<Template>> {
        self.templates.iter().filter(|t| t.enabled)
    }

    /// Look up a template by name, enabled or not.
    pub fn lookup(&self, name: &str) -> Option<&Arc<Template>> {
        self.by_name.get(name)
    }

    /// Number of loaded templates.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

/// The process-wide template registry.
pub struct TemplateRegistry {
    snapshot: ArcSwap<RegistrySnapshot>,
    /// Compiled-size budget for pattern compilation.
    size_limit: usize,
    /// Serializes writers (load, set_enabled). Readers never take it.
    write_lock: Mutex<()>,
}

impl TemplateRegistry {
    /// Creates an empty registry with the given regex size budget.
    pub fn new(size_limit: usize) -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(RegistrySnapshot::default()),
            size_limit,
            write_lock: Mutex::new(()),
        }
    }

    /// Loads (or reloads) the registry from a list of template definitions.
    ///
    /// Name uniqueness is validated across the whole set; a duplicate name
    /// rejects the entire load and the previous snapshot stays active. A
    /// single bad pattern only drops that pattern (warned during compile).
    ///
    /// Returns the number of templates loaded.
    pub fn load(&self, configs: &[TemplateConfig]) -> Result<usize, LorekitError> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let mut seen = HashMap::new();
        for (i, config) in configs.iter().enumerate() {
            if let Some(first) = seen.insert(config.name.clone(), i) {
                return Err(LorekitError::Config(format!(
                    "duplicate template name `{}` (entries {} and {})",
                    config.name, first, i
                )));
            }
        }

        let templates: Vec<Arc<Template>> = configs
            .iter()
            .map(|c| Arc::new(Template::compile(c, self.size_limit)))
            .collect();
        let count = templates.len();

        self.snapshot.store(Arc::new(RegistrySnapshot::build(templates)));
        info!(count, "template registry loaded");
        Ok(count)
    }

    /// Returns the current snapshot. Lock-free.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.snapshot.load_full()
    }

    /// Looks up a template by name in the current snapshot.
    pub fn lookup(&self, name: &str) -> Option<Arc<Template>> {
        self.snapshot.load().lookup(name).cloned()
    }

    /// Enables or disables templates by name.
    ///
    /// Rebuilds and swaps the snapshot once for the whole batch. Returns
    /// `(applied, unknown)` name lists; flipping a template to its current
    /// state still counts as applied.
    pub fn set_enabled(&self, names: &[String], enabled: bool) -> (Vec<String>, Vec<String>) {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());

        let current = self.snapshot.load_full();
        let mut applied = Vec::new();
        let mut unknown: Vec<String> = Vec::new();

        for name in names {
            if current.lookup(name).is_some() {
                applied.push(name.clone());
            } else {
                unknown.push(name.clone());
            }
        }

        if applied.is_empty() {
            return (applied, unknown);
        }

        let templates: Vec<Arc<Template>> = current
            .all()
            .iter()
            .map(|t| {
                if applied.contains(&t.name) && t.enabled != enabled {
                    let mut flipped = (**t).clone();
                    flipped.enabled = enabled;
                    Arc::new(flipped)
                } else {
                    Arc::clone(t)
                }
            })
            .collect();

        self.snapshot.store(Arc::new(RegistrySnapshot::build(templates)));
        debug!(?applied, enabled, "template enable state changed");
        (applied, unknown)
    }

    /// Exports the current registry as configuration records.
    pub fn export(&self) -> Vec<TemplateConfig> {
        self.snapshot
            .load()
            .all()
            .iter()
            .map(|t| t.to_config())
            .collect()
    }
}
