// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the lorekit activation engine.
//!
//! Only load-time failures surface as errors. Runtime degradations
//! (a pattern that fails to compile, a match that exceeds its time budget,
//! a record whose template vanished) are logged and absorbed so that the
//! host message pipeline is never aborted by this subsystem.

use thiserror::Error;

/// The primary error type used across lorekit crates.
#[derive(Debug, Error)]
pub enum LorekitError {
    /// Configuration errors (duplicate template names, invalid field values).
    /// A failed reload keeps the previous registry snapshot active.
    #[error("configuration error: {0}")]
    Config(String),

    /// Template-pack file errors (unreadable file, malformed JSON structure).
    #[error("pack file error: {path}: {message}")]
    Pack { path: String, message: String },

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
