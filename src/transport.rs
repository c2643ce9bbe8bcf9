//! HTTP transport abstraction for the publish path
//!
//! Implement `HttpTransport` to publish through any HTTP stack. The default
//! implementation is backed by a shared `reqwest` client.

use async_trait::async_trait;

use crate::auth::Credentials;

/// Request metadata handed to the transport.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Header pairs, in emission order
    pub headers: Vec<(&'static str, String)>,
    /// Credentials for the transport's native basic-auth mechanism
    pub basic_auth: Option<Credentials>,
}

/// A structured response from the service.
///
/// Any response the service actually produced is `Ok` at the transport level,
/// whatever its status; only network-level failures are transport errors.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for HTTP transports used by the publish path.
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    /// Create-style publish: the body is the message content.
    async fn post(
        &self,
        url: &str,
        body: String,
        options: RequestOptions,
    ) -> anyhow::Result<TransportResponse>;

    /// Replace-style publish: the body is a file's bytes.
    async fn put(
        &self,
        url: &str,
        body: Vec<u8>,
        options: RequestOptions,
    ) -> anyhow::Result<TransportResponse>;

    /// Return the transport name (for logging)
    fn name(&self) -> &'static str;
}

/// Default transport backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new transport with its own client
    pub fn new() -> Self {
        Self::default()
    }

    fn apply(
        mut request: reqwest::RequestBuilder,
        options: RequestOptions,
    ) -> reqwest::RequestBuilder {
        for (name, value) in options.headers {
            request = request.header(name, value);
        }
        if let Some(credentials) = options.basic_auth {
            request = request.basic_auth(credentials.username, Some(credentials.password));
        }
        request
    }

    async fn execute(request: reqwest::RequestBuilder) -> anyhow::Result<TransportResponse> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        body: String,
        options: RequestOptions,
    ) -> anyhow::Result<TransportResponse> {
        Self::execute(Self::apply(self.client.post(url), options).body(body)).await
    }

    async fn put(
        &self,
        url: &str,
        body: Vec<u8>,
        options: RequestOptions,
    ) -> anyhow::Result<TransportResponse> {
        Self::execute(Self::apply(self.client.put(url), options).body(body)).await
    }

    fn name(&self) -> &'static str {
        "Reqwest"
    }
}
