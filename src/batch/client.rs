//! Batch client: authenticated generate/cancel calls against the v3 API.

use super::types::{ApiResponse, BatchGeneration, CancelRequest, Credentials, GeneratedBatch};
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::{Error, Result};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const GENERATE_PATH: &str = "/v3/mail/batch";
const CANCEL_PATH: &str = "/v3/user/scheduled_sends";

/// Both batch endpoints report success as 201 Created.
const SUCCESS_STATUS: u16 = 201;

/// Client for one logical batch-management session.
///
/// Tracks at most one batch id: absent until a successful
/// [`generate`](Self::generate), then read by [`cancel`](Self::cancel). The
/// `&mut self` receiver on `generate` lets the borrow checker serialize calls
/// on an instance; no internal locking is provided. Create a new client for a
/// new batch.
pub struct BatchClient {
    credentials: Credentials,
    base_url: String,
    user_agent: String,
    strict_errors: bool,
    timeout: Duration,
    batch_id: Option<String>,
    transport: OnceCell<Arc<dyn Transport>>,
}

impl BatchClient {
    pub fn builder() -> BatchClientBuilder {
        BatchClientBuilder::new()
    }

    /// The batch id known to this client, once a generate has succeeded or
    /// when one was seeded at construction.
    pub fn batch_id(&self) -> Option<&str> {
        self.batch_id.as_deref()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Injected transport, or the reqwest default built on first use and
    /// cached for the instance's lifetime.
    fn transport(&self) -> Result<Arc<dyn Transport>> {
        let transport = self.transport.get_or_try_init(|| {
            let http = HttpTransport::new(self.base_url.as_str(), self.timeout)?;
            Ok::<_, Error>(Arc::new(http) as Arc<dyn Transport>)
        })?;
        Ok(Arc::clone(transport))
    }

    fn base_headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                self.credentials.authorization_header(),
            ),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ]
    }

    /// Creates a new batch id via `POST /v3/mail/batch`.
    ///
    /// On 201 the id from the response body is cached on the client and
    /// returned. With strict errors enabled (the default) any other status
    /// fails with [`Error::RemoteApi`] and the cached id is left untouched; in
    /// lenient mode the normalized response comes back with whatever
    /// `batch_id` the body carried, possibly none.
    pub async fn generate(&mut self) -> Result<BatchGeneration> {
        let start = Instant::now();
        let request = TransportRequest {
            path: GENERATE_PATH.to_string(),
            headers: self.base_headers(),
            body: "{}".to_string(),
        };

        let raw = self.transport()?.post(request).await?;

        if self.strict_errors && raw.status != SUCCESS_STATUS {
            info!(
                http_status = raw.status,
                endpoint = GENERATE_PATH,
                duration_ms = start.elapsed().as_millis(),
                "batch generate rejected"
            );
            return Err(Error::RemoteApi {
                status: raw.status,
                body: raw.body,
            });
        }

        let response = ApiResponse::from_raw(raw);
        let batch_id = if self.strict_errors {
            let generated: GeneratedBatch = serde_json::from_value(response.body.clone())?;
            Some(generated.batch_id)
        } else {
            response
                .body
                .get("batch_id")
                .and_then(|v| v.as_str())
                .map(String::from)
        };

        if let Some(id) = &batch_id {
            self.batch_id = Some(id.clone());
        }

        debug!(
            http_status = response.status,
            endpoint = GENERATE_PATH,
            duration_ms = start.elapsed().as_millis(),
            "batch generate completed"
        );
        Ok(BatchGeneration { batch_id, response })
    }

    /// Cancels the batch known to this client via
    /// `POST /v3/user/scheduled_sends`.
    ///
    /// With strict errors enabled this requires a non-empty batch id and fails
    /// with [`Error::InvalidState`] before any network call otherwise. In
    /// lenient mode the request is sent as-is, with a `null` id if none is
    /// known, and the normalized response is returned for the caller to
    /// inspect.
    pub async fn cancel(&self) -> Result<ApiResponse> {
        if self.strict_errors && self.batch_id.as_deref().map_or(true, str::is_empty) {
            return Err(Error::InvalidState("Batch has no ID".to_string()));
        }
        self.cancel_inner(self.batch_id.as_deref()).await
    }

    /// Cancels a caller-held batch id, leaving the cached one untouched.
    pub async fn cancel_id(&self, batch_id: &str) -> Result<ApiResponse> {
        if self.strict_errors && batch_id.is_empty() {
            return Err(Error::InvalidState("Batch has no ID".to_string()));
        }
        self.cancel_inner(Some(batch_id)).await
    }

    async fn cancel_inner(&self, batch_id: Option<&str>) -> Result<ApiResponse> {
        let start = Instant::now();
        let body = serde_json::to_string(&CancelRequest {
            batch_id,
            status: "cancel",
        })?;

        let mut headers = self.base_headers();
        headers.push(("Content-Type".to_string(), "application/json".to_string()));

        let request = TransportRequest {
            path: CANCEL_PATH.to_string(),
            headers,
            body,
        };

        let raw = self.transport()?.post(request).await?;

        if self.strict_errors && raw.status != SUCCESS_STATUS {
            info!(
                http_status = raw.status,
                endpoint = CANCEL_PATH,
                duration_ms = start.elapsed().as_millis(),
                "batch cancel rejected"
            );
            return Err(Error::RemoteApi {
                status: raw.status,
                body: raw.body,
            });
        }

        debug!(
            http_status = raw.status,
            endpoint = CANCEL_PATH,
            duration_ms = start.elapsed().as_millis(),
            "batch cancel completed"
        );
        Ok(ApiResponse::from_raw(raw))
    }
}

/// Configuration for [`BatchClient`].
///
/// Nothing is validated at build time: missing or bad credentials surface as
/// remote rejections on the first request, matching the API's behavior.
pub struct BatchClientBuilder {
    api_user: Option<String>,
    api_key: Option<String>,
    protocol: String,
    host: String,
    port: Option<u16>,
    url: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    user_agent: Option<String>,
    strict_errors: bool,
    batch_id: Option<String>,
    timeout: Option<Duration>,
}

impl BatchClientBuilder {
    pub fn new() -> Self {
        Self {
            api_user: None,
            api_key: None,
            protocol: "https".to_string(),
            host: "api.sendgrid.com".to_string(),
            port: None,
            url: None,
            transport: None,
            user_agent: None,
            strict_errors: true,
            batch_id: None,
            timeout: None,
        }
    }

    /// Username for HTTP Basic authentication. Setting this switches the
    /// client from Bearer to Basic.
    pub fn api_user(mut self, api_user: impl Into<String>) -> Self {
        self.api_user = Some(api_user.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn protocol(mut self, protocol: impl Into<String>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Full base URL; takes precedence over protocol/host/port composition.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Inject a transport instead of the reqwest default.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Whether non-success responses fail the call (default) or are returned
    /// as data.
    pub fn strict_errors(mut self, strict_errors: bool) -> Self {
        self.strict_errors = strict_errors;
        self
    }

    /// Seed a known batch id, for cancelling a batch generated elsewhere.
    pub fn batch_id(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self
    }

    /// Request timeout for the default transport. Ignored when a transport is
    /// injected.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> BatchClient {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("SENDGRID_API_KEY").ok())
            .unwrap_or_default();
        let credentials = match self.api_user {
            Some(api_user) => Credentials::Basic { api_user, api_key },
            None => Credentials::Bearer { api_key },
        };

        let base_url = self.url.unwrap_or_else(|| match self.port {
            Some(port) => format!("{}://{}:{}", self.protocol, self.host, port),
            None => format!("{}://{}", self.protocol, self.host),
        });

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("sendgrid-batch/{};rust", env!("CARGO_PKG_VERSION")));

        let transport = OnceCell::new();
        if let Some(injected) = self.transport {
            let _ = transport.set(injected);
        }

        BatchClient {
            credentials,
            base_url,
            user_agent,
            strict_errors: self.strict_errors,
            timeout: self.timeout.unwrap_or_else(HttpTransport::default_timeout),
            batch_id: self.batch_id,
            transport,
        }
    }
}

impl Default for BatchClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{RawResponse, TransportError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fake transport that records every request and replays a canned
    /// response.
    struct RecordingTransport {
        requests: Mutex<Vec<TransportRequest>>,
        response: RawResponse,
    }

    impl RecordingTransport {
        fn new(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                response: RawResponse {
                    status,
                    headers: HashMap::from([(
                        "content-type".to_string(),
                        "application/json".to_string(),
                    )]),
                    body: body.to_string(),
                },
            })
        }

        fn requests(&self) -> Vec<TransportRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn post(
            &self,
            request: TransportRequest,
        ) -> std::result::Result<RawResponse, TransportError> {
            self.requests.lock().unwrap().push(request);
            Ok(self.response.clone())
        }
    }

    fn header<'a>(request: &'a TransportRequest, name: &str) -> Option<&'a str> {
        request
            .headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn generate_sends_bearer_auth_and_empty_object() {
        let transport = RecordingTransport::new(201, r#"{"batch_id":"abc123"}"#);
        let mut client = BatchClient::builder()
            .api_key("SG.key")
            .transport(transport.clone())
            .build();

        client.generate().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/v3/mail/batch");
        assert_eq!(requests[0].body, "{}");
        assert_eq!(header(&requests[0], "Authorization"), Some("Bearer SG.key"));
        assert!(header(&requests[0], "User-Agent")
            .unwrap()
            .starts_with("sendgrid-batch/"));
    }

    #[tokio::test]
    async fn generate_sends_basic_auth_when_api_user_configured() {
        let transport = RecordingTransport::new(201, r#"{"batch_id":"abc123"}"#);
        let mut client = BatchClient::builder()
            .api_user("alice")
            .api_key("secret")
            .transport(transport.clone())
            .build();

        client.generate().await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            header(&requests[0], "Authorization"),
            Some("Basic YWxpY2U6c2VjcmV0")
        );
    }

    #[tokio::test]
    async fn generate_caches_and_returns_batch_id() {
        let transport = RecordingTransport::new(201, r#"{"batch_id":"abc123"}"#);
        let mut client = BatchClient::builder()
            .api_key("SG.key")
            .transport(transport)
            .build();

        let generated = client.generate().await.unwrap();

        assert_eq!(generated.batch_id.as_deref(), Some("abc123"));
        assert_eq!(client.batch_id(), Some("abc123"));
    }

    #[tokio::test]
    async fn strict_generate_failure_leaves_batch_id_unset() {
        let transport = RecordingTransport::new(400, r#"{"errors":["bad request"]}"#);
        let mut client = BatchClient::builder()
            .api_key("SG.key")
            .transport(transport)
            .build();

        let err = client.generate().await.unwrap_err();

        assert!(matches!(err, Error::RemoteApi { status: 400, .. }));
        assert_eq!(client.batch_id(), None);
    }

    #[tokio::test]
    async fn strict_generate_rejects_success_body_without_batch_id() {
        let transport = RecordingTransport::new(201, "{}");
        let mut client = BatchClient::builder()
            .api_key("SG.key")
            .transport(transport)
            .build();

        let err = client.generate().await.unwrap_err();

        // The wire succeeded but the body is malformed, so this is a
        // serialization failure, not a remote rejection.
        assert!(matches!(err, Error::Serialization(_)));
        assert_eq!(client.batch_id(), None);
    }

    #[tokio::test]
    async fn lenient_generate_caches_id_from_error_body_when_present() {
        let transport = RecordingTransport::new(400, r#"{"batch_id":"abc123"}"#);
        let mut client = BatchClient::builder()
            .api_key("SG.key")
            .strict_errors(false)
            .transport(transport)
            .build();

        let generated = client.generate().await.unwrap();

        assert_eq!(generated.batch_id.as_deref(), Some("abc123"));
        assert_eq!(generated.response.status, 400);
        assert_eq!(client.batch_id(), Some("abc123"));
    }

    #[tokio::test]
    async fn lenient_generate_returns_response_without_id() {
        let transport = RecordingTransport::new(400, r#"{"errors":["bad request"]}"#);
        let mut client = BatchClient::builder()
            .api_key("SG.key")
            .strict_errors(false)
            .transport(transport)
            .build();

        let generated = client.generate().await.unwrap();

        assert_eq!(generated.batch_id, None);
        assert_eq!(generated.response.status, 400);
        assert_eq!(client.batch_id(), None);
    }

    #[tokio::test]
    async fn cancel_without_id_fails_before_any_network_call() {
        let transport = RecordingTransport::new(201, "{}");
        let client = BatchClient::builder()
            .api_key("SG.key")
            .transport(transport.clone())
            .build();

        let err = client.cancel().await.unwrap_err();

        assert!(matches!(err, Error::InvalidState(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn cancel_sends_exact_body_and_content_type() {
        let transport = RecordingTransport::new(201, "{}");
        let client = BatchClient::builder()
            .api_key("SG.key")
            .batch_id("abc123")
            .transport(transport.clone())
            .build();

        client.cancel().await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].path, "/v3/user/scheduled_sends");
        assert_eq!(requests[0].body, r#"{"batch_id":"abc123","status":"cancel"}"#);
        assert_eq!(
            header(&requests[0], "Content-Type"),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn lenient_cancel_without_id_sends_null() {
        let transport = RecordingTransport::new(400, "{}");
        let client = BatchClient::builder()
            .api_key("SG.key")
            .strict_errors(false)
            .transport(transport.clone())
            .build();

        let response = client.cancel().await.unwrap();

        assert_eq!(response.status, 400);
        let requests = transport.requests();
        assert_eq!(requests[0].body, r#"{"batch_id":null,"status":"cancel"}"#);
    }

    #[tokio::test]
    async fn cancel_id_uses_the_supplied_id() {
        let transport = RecordingTransport::new(201, "{}");
        let client = BatchClient::builder()
            .api_key("SG.key")
            .batch_id("cached")
            .transport(transport.clone())
            .build();

        client.cancel_id("other").await.unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].body, r#"{"batch_id":"other","status":"cancel"}"#);
        assert_eq!(client.batch_id(), Some("cached"));
    }

    #[test]
    fn builder_composes_url_from_protocol_host_port() {
        let client = BatchClient::builder()
            .protocol("http")
            .host("localhost")
            .port(8080)
            .build();
        assert_eq!(client.base_url(), "http://localhost:8080");

        let client = BatchClient::builder().build();
        assert_eq!(client.base_url(), "https://api.sendgrid.com");
    }

    #[test]
    fn explicit_url_overrides_composition() {
        let client = BatchClient::builder()
            .host("ignored.example.com")
            .url("https://eu.api.sendgrid.com")
            .build();
        assert_eq!(client.base_url(), "https://eu.api.sendgrid.com");
    }

    #[test]
    fn same_configuration_builds_identical_independent_clients() {
        let transport = RecordingTransport::new(201, r#"{"batch_id":"abc123"}"#);
        let build = || {
            BatchClient::builder()
                .api_key("SG.key")
                .host("api.sendgrid.com")
                .transport(transport.clone())
                .build()
        };

        let mut first = build();
        let second = build();

        assert_eq!(first.base_url(), second.base_url());
        assert_eq!(first.user_agent(), second.user_agent());

        // batch_id state is per instance, not shared.
        tokio_test::block_on(first.generate()).unwrap();
        assert_eq!(first.batch_id(), Some("abc123"));
        assert_eq!(second.batch_id(), None);
    }
}
