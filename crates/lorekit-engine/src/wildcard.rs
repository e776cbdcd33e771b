// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `{placeholder}` rendering for template content.
//!
//! Resolution happens at compose time against the request context. Unknown
//! placeholders are left verbatim so that literal braces in content survive
//! unchanged; content without braces is untouched.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

/// Placeholder marker: `{word}`.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// Read-only context available when a template's content is rendered.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    /// The session being composed for.
    pub session_id: &'a str,
    /// Name of the template being rendered.
    pub template_name: &'a str,
    /// Composition timestamp.
    pub now: DateTime<Utc>,
}

/// Renders `{placeholder}` markers in `content` against the context.
///
/// Built-in placeholders: `{time}`, `{date}`, `{session_id}`,
/// `{template_name}`. Anything else is passed through verbatim.
pub fn render(content: &str, ctx: &RenderContext<'_>) -> String {
    PLACEHOLDER
        .replace_all(content, |caps: &regex::Captures<'_>| match &caps[1] {
            "time" => ctx.now.format("%H:%M:%S").to_string(),
            "date" => ctx.now.format("%Y-%m-%d").to_string(),
            "session_id" => ctx.session_id.to_string(),
            "template_name" => ctx.template_name.to_string(),
            _ => caps[0].to_string(),
        })
        .into_owned()
}
