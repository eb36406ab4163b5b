use super::{RawResponse, Transport, TransportRequest};
use async_trait::async_trait;
use std::env;
use std::time::Duration;

/// Default reqwest-backed transport.
///
/// Holds one `reqwest::Client` for the instance's lifetime; connection pooling
/// and TLS are reqwest's concern.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Request timeout for a default-constructed transport (env-overridable).
    pub(crate) fn default_timeout() -> Duration {
        let timeout_secs = env::var("SENDGRID_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);
        Duration::from_secs(timeout_secs)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, request: TransportRequest) -> Result<RawResponse, TransportError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), request.path);

        let mut req = self.client.post(&url);
        for (name, value) in &request.headers {
            req = req.header(name, value);
        }

        let resp = req.body(request.body).send().await?;

        let status = resp.status().as_u16();
        let headers = resp
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = resp.text().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Transport error: {0}")]
    Other(String),
}
