// SPDX-FileCopyrightText: 2026 Lorekit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary types exchanged with the host message pipeline.
//!
//! The engine treats the session identifier as an opaque string key supplied
//! by the caller (e.g. `"group:123"` or `"private:456"`). Message decoding,
//! admin recognition, and command presentation all live on the host side.

use serde::{Deserialize, Serialize};

/// Unique identifier for a conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    /// Returns the raw session key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        SessionId(s.to_string())
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        SessionId(s)
    }
}

/// An inbound message event consumed from the host pipeline.
///
/// Drives the match-and-activate step. The host has already decoded the
/// message text and resolved whether the sender is an administrator of
/// the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Opaque conversation identifier.
    pub session_id: SessionId,
    /// Sender identifier, for logging only.
    pub sender_id: String,
    /// Whether the sender is recognized as an administrator of the session.
    pub sender_is_admin: bool,
    /// Decoded message text.
    pub text: String,
}

/// Remaining lifetime of an activation, as reported by the status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Remaining {
    /// Active until explicitly cleared (`duration = 0`).
    Permanent,
    /// Seconds until expiry.
    Seconds(i64),
}

impl std::fmt::Display for Remaining {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Remaining::Permanent => write!(f, "permanent"),
            Remaining::Seconds(s) => write!(f, "{s}s"),
        }
    }
}

/// One row of the status query: an active template in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateStatus {
    /// Template name.
    pub name: String,
    /// Remaining lifetime.
    pub remaining: Remaining,
    /// Priority snapshot taken at activation time (lower = earlier in the
    /// composed injection).
    pub priority: i32,
}
