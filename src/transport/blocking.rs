use super::{ApiRequest, ApiResponse, BlockingTransport, Method, USER_AGENT};
use crate::error::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// [`BlockingTransport`] over a pooled `reqwest::blocking::Client`.
///
/// Must not be created or dropped inside an async runtime; use
/// [`HttpTransport`](super::HttpTransport) there instead.
#[derive(Debug, Clone)]
pub struct BlockingHttpTransport {
    client: reqwest::blocking::Client,
}

impl BlockingHttpTransport {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl BlockingTransport for BlockingHttpTransport {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!(method = request.method.as_str(), path = request.url.path(), "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(request.url),
            Method::Post => self.client.post(request.url),
        };
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        if let Some(json) = request.json {
            builder = builder.json(&json);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?.to_vec();

        debug!(status, bytes = body.len(), "received response");
        Ok(ApiResponse { status, body })
    }
}
