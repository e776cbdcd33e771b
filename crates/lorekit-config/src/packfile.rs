// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template-pack file protocol: JSON files carrying template definitions
//! for sharing between deployments.
//!
//! Accepted shapes: a bare array of template objects, or
//! `{"entries": [...]}`. Malformed items are skipped with a warning so one
//! bad entry never blocks the rest of a pack.

use std::path::Path;

use lorekit_core::LorekitError;
use tracing::warn;

use crate::model::TemplateConfig;

/// Read template definitions from a JSON pack file.
///
/// Items that are not objects or fail to deserialize are skipped with a
/// warning; structural errors (unreadable file, top-level shape that is
/// neither an array nor `{"entries": [...]}`) fail the whole pack.
pub fn load_pack(path: &Path) -> Result<Vec<TemplateConfig>, LorekitError> {
    let content = std::fs::read_to_string(path).map_err(|e| LorekitError::Pack {
        path: path.display().to_string(),
        message: format!("read failed: {e}"),
    })?;

    let raw: serde_json::Value =
        serde_json::from_str(&content).map_err(|e| LorekitError::Pack {
            path: path.display().to_string(),
            message: format!("invalid JSON: {e}"),
        })?;

    // Accept both a bare array and {"entries": [...]}.
    let items = match raw {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("entries") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(LorekitError::Pack {
                    path: path.display().to_string(),
                    message: "expected a template array or {\"entries\": [...]}".to_string(),
                })
            }
        },
        _ => {
            return Err(LorekitError::Pack {
                path: path.display().to_string(),
                message: "expected a template array or {\"entries\": [...]}".to_string(),
            })
        }
    };

    let mut templates = Vec::new();
    for item in items {
        match serde_json::from_value::<TemplateConfig>(item) {
            Ok(template) => templates.push(template),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping malformed pack entry");
            }
        }
    }

    Ok(templates)
}

/// Write template definitions to a JSON pack file as `{"entries": [...]}`.
pub fn save_pack(path: &Path, templates: &[TemplateConfig]) -> Result<(), LorekitError> {
    let payload = serde_json::json!({ "entries": templates });
    let content =
        serde_json::to_string_pretty(&payload).map_err(|e| LorekitError::Pack {
            path: path.display().to_string(),
            message: format!("serialize failed: {e}"),
        })?;
    std::fs::write(path, content).map_err(|e| LorekitError::Pack {
        path: path.display().to_string(),
        message: format!("write failed: {e}"),
    })?;
    Ok(())
}
