// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-scoped template activation engine.
//!
//! Control flow: inbound message -> matcher (over the registry snapshot) ->
//! activation store; outbound LLM request -> composer -> injected suffix.
//!
//! - **Registry**: atomically swapped immutable snapshot; reload never
//!   blocks in-flight matches.
//! - **Matcher**: pure predicate evaluation in registry order, bounded per
//!   pattern.
//! - **Activation store**: per-session records with refresh-on-retrigger
//!   and lazy expiry, sharded by session key.
//! - **Composer**: priority-ordered, policy-deduped, placeholder-rendered
//!   injection text.
//!
//! [`InjectionEngine`] ties the pieces together behind the two host hooks.

pub mod composer;
pub mod engine;
pub mod matcher;
pub mod registry;
pub mod store;
pub mod template;
pub mod wildcard;

pub use composer::Composer;
pub use engine::InjectionEngine;
pub use matcher::{Hit, MatchBudget, Matcher};
pub use registry::{RegistrySnapshot, TemplateRegistry};
pub use store::{ActivationRecord, ActivationStore};
pub use template::Template;
