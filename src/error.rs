use crate::transport::TransportError;
use thiserror::Error;

/// Unified error type for the batch client.
///
/// Transport-level failures (connection refused, timeout, TLS) pass through
/// [`Error::Transport`] unchanged; this crate adds no retry or recovery on
/// top of them.
#[derive(Debug, Error)]
pub enum Error {
    /// The remote API returned a non-success status while strict errors were
    /// enabled. Carries the HTTP status and the raw response body for
    /// diagnostics.
    #[error("remote API error: HTTP {status}: {body}")]
    RemoteApi { status: u16, body: String },

    /// An operation was invoked in a state it cannot run from, e.g. cancelling
    /// a batch that was never generated.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status of a remote rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}
