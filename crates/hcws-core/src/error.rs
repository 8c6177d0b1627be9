// ── Core error types ──
//
// Errors surfaced to application code. Access and translation failures
// are raised before anything reaches the session; session failures are
// wrapped unchanged.

use serde_json::Value;
use thiserror::Error;

use crate::description::Access;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Write gating ─────────────────────────────────────────────────
    #[error("Entity {name} ({uid}) is not writable: available={available}, access={access}")]
    Access {
        uid: u32,
        name: String,
        available: bool,
        access: Access,
    },

    // ── Translation ──────────────────────────────────────────────────
    #[error("Entity {uid} has no enumeration member {value}")]
    UnknownEnumValue { uid: u32, value: Value },

    #[error("Entity {uid} received unknown raw code {value}")]
    UnknownCode { uid: u32, value: Value },

    // ── Construction ─────────────────────────────────────────────────
    #[error("Invalid enumeration for entity {uid}: {source}")]
    Enumeration {
        uid: u32,
        #[source]
        source: EnumerationError,
    },

    // ── Session ──────────────────────────────────────────────────────
    #[error(transparent)]
    Session(#[from] hcws_api::Error),
}

impl CoreError {
    /// Returns `true` if a write was refused by the access gate.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Access { .. })
    }
}

/// Malformed enumeration data in an entity description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    #[error("key {key:?} is not an integer code")]
    InvalidKey { key: String },

    #[error("code {code} appears more than once")]
    DuplicateCode { code: i64 },

    #[error("display name {name:?} appears more than once")]
    DuplicateName { name: String },
}
