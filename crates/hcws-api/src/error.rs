use thiserror::Error;

/// Top-level error type for the `hcws-api` crate.
///
/// Covers every way a `send_sync` round trip can end without an
/// acknowledgement. `hcws-core` wraps these unchanged.
#[derive(Debug, Error)]
pub enum Error {
    // ── Session lifecycle ───────────────────────────────────────────
    /// The connection task is gone; nothing can be sent.
    #[error("Session closed")]
    SessionClosed,

    /// The connection task dropped the request without answering it.
    #[error("Request to {resource} was cancelled before acknowledgement")]
    Cancelled { resource: String },

    /// No acknowledgement arrived within the configured send timeout.
    #[error("Request to {resource} timed out after {timeout_ms}ms")]
    Timeout { resource: String, timeout_ms: u64 },

    // ── Device responses ────────────────────────────────────────────
    /// The device answered with an error code.
    #[error("Device rejected request to {resource} (code {code})")]
    Rejected { resource: String, code: i64 },

    // ── Transport ───────────────────────────────────────────────────
    /// Failure reported by the underlying connection.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Returns `true` if the request may succeed when issued again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Cancelled { .. })
    }

    /// The device error code, if the device rejected the request.
    pub fn device_code(&self) -> Option<i64> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}
