//! Batch value objects: credentials, normalized responses, wire payloads.

use crate::transport::RawResponse;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Authentication material for the SendGrid v3 API.
///
/// The API accepts exactly two schemes, so the policy is a tagged two-case
/// variant rather than a nullable username check: a configured username means
/// HTTP Basic, a bare API key means Bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    Basic { api_user: String, api_key: String },
    Bearer { api_key: String },
}

impl Credentials {
    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        match self {
            Self::Basic { api_user, api_key } => {
                let pair = format!("{}:{}", api_user, api_key);
                format!(
                    "Basic {}",
                    base64::engine::general_purpose::STANDARD.encode(pair)
                )
            }
            Self::Bearer { api_key } => format!("Bearer {}", api_key),
        }
    }
}

/// Normalized response returned by batch operations. Immutable once built.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    /// Parsed JSON body, or `Value::String` holding the raw text when the
    /// body is not valid JSON.
    pub body: serde_json::Value,
}

impl ApiResponse {
    pub(crate) fn from_raw(raw: RawResponse) -> Self {
        let body = match serde_json::from_str(&raw.body) {
            Ok(value) => value,
            Err(_) => serde_json::Value::String(raw.body),
        };
        Self {
            status: raw.status,
            headers: raw.headers,
            body,
        }
    }
}

/// Outcome of [`BatchClient::generate`](super::BatchClient::generate).
///
/// With strict errors enabled `batch_id` is always present (anything else
/// failed earlier). In lenient mode it is a best-effort extraction from
/// whatever body came back and may be absent; inspect `response` to decide
/// what happened.
#[derive(Debug, Clone)]
pub struct BatchGeneration {
    pub batch_id: Option<String>,
    pub response: ApiResponse,
}

/// Success body of the generate endpoint.
#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedBatch {
    pub batch_id: String,
}

/// Request body of the cancel endpoint. A missing id serializes as `null`,
/// which is what the API sees from a lenient client that never generated.
#[derive(Debug, Serialize)]
pub(crate) struct CancelRequest<'a> {
    pub batch_id: Option<&'a str>,
    pub status: &'static str,
}
