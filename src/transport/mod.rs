//! HTTP transports.
//!
//! The clients never talk to reqwest directly. They hand a fully built
//! [`ApiRequest`] to a transport and get back the raw status and body, which
//! keeps status translation and decoding in one shared place and lets tests
//! swap the network out.
//!
//! | Transport | Trait | Backed by |
//! |-----------|-------|-----------|
//! | [`HttpTransport`] | [`AsyncTransport`] | `reqwest::Client` |
//! | [`BlockingHttpTransport`] | [`BlockingTransport`] | `reqwest::blocking::Client` |

mod blocking;
mod http;
#[cfg(test)]
pub(crate) mod mock;

pub use blocking::BlockingHttpTransport;
pub use http::HttpTransport;

use crate::error::Result;
use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// A request ready to be sent.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(&'static str, String)>,
    pub json: Option<Value>,
}

impl ApiRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

// Header values can hold the API key, so only their names are printed.
impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header_names: Vec<&str> = self.headers.iter().map(|(name, _)| *name).collect();
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &header_names)
            .field("json", &self.json)
            .finish()
    }
}

/// Status and body of a completed round trip, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends requests without blocking the calling task.
///
/// Dropping the returned future must abort the request.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    /// # Errors
    ///
    /// Only connection-level failures are errors; any HTTP status is a
    /// successful [`ApiResponse`].
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Sends requests on the calling thread.
pub trait BlockingTransport: Send + Sync {
    /// # Errors
    ///
    /// Only connection-level failures are errors; any HTTP status is a
    /// successful [`ApiResponse`].
    fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[async_trait]
impl<T: AsyncTransport + ?Sized> AsyncTransport for std::sync::Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request).await
    }
}

impl<T: BlockingTransport + ?Sized> BlockingTransport for std::sync::Arc<T> {
    fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        (**self).send(request)
    }
}
