//! Transport seam: the injected collaborator that actually puts requests on
//! the wire and hands back raw status/headers/body.
//!
//! The batch client assembles every request completely (path, headers, body)
//! and only needs `POST`; a [`Transport`] implementation sends it verbatim.
//! Production code uses the reqwest-backed [`HttpTransport`]; tests inject a
//! fake that records requests and returns canned responses.

mod http;

pub use http::{HttpTransport, TransportError};

use async_trait::async_trait;
use std::collections::HashMap;

/// A fully assembled outgoing POST request.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// Path relative to the transport's base URL, e.g. `/v3/mail/batch`.
    pub path: String,
    /// Headers to send verbatim, in order.
    pub headers: Vec<(String, String)>,
    /// Request body, already serialized.
    pub body: String,
}

/// Raw response as it came off the wire, before any normalization.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// HTTP-capable collaborator used by the batch client.
///
/// Implementations are externally owned and shared (`Arc`); the client never
/// closes them or pools on top of them.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(&self, request: TransportRequest) -> Result<RawResponse, TransportError>;
}
