// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the lorekit activation engine.
//!
//! This crate provides the error type and the boundary types exchanged with
//! the host message pipeline. The engine itself lives in `lorekit-engine`;
//! configuration lives in `lorekit-config`.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LorekitError;
pub use types::{InboundMessage, Remaining, SessionId, TemplateStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lorekit_error_has_all_variants() {
        let _config = LorekitError::Config("test".into());
        let _pack = LorekitError::Pack {
            path: "/tmp/pack.json".into(),
            message: "not a list".into(),
        };
        let _io = LorekitError::Io(std::io::Error::other("test"));
        let _internal = LorekitError::Internal("test".into());
    }

    #[test]
    fn error_display_mentions_context() {
        let err = LorekitError::Pack {
            path: "/tmp/pack.json".into(),
            message: "not a list".into(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("/tmp/pack.json"));
        assert!(rendered.contains("not a list"));
    }
}
