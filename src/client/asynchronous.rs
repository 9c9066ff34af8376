use super::{ClientOptions, PollBudget, WaitOptions};
use crate::api::{self, Api};
use crate::credentials::Credentials;
use crate::error::Result;
use crate::model::{ScanRequest, ScanResult, SearchBy, SearchFilter};
use crate::transport::{AsyncTransport, HttpTransport};
use tracing::{debug, info};

/// Non-blocking client for the URL Scanner API.
///
/// Each method is a single round trip (or, for [`wait_for_scan`], a bounded
/// series of them). Dropping a returned future aborts the request in flight.
///
/// [`wait_for_scan`]: AsyncClient::wait_for_scan
///
/// # Example
///
/// ```no_run
/// use urlscan::{AsyncClient, ClientOptions, WaitOptions};
///
/// #[tokio::main]
/// async fn main() -> urlscan::Result<()> {
///     let client = AsyncClient::new(ClientOptions::new())?;
///
///     let submitted = client.scan("https://example.com").await?;
///     let finished = client
///         .wait_for_scan(submitted.uuid(), WaitOptions::default())
///         .await?;
///
///     println!("{}: {:?}", finished.uuid(), finished.is_malicious());
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct AsyncClient<T = HttpTransport> {
    api: Api,
    transport: T,
}

impl AsyncClient {
    /// Resolves credentials and builds a reqwest-backed client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the
    /// credentials cannot be resolved or the base URL is invalid. No request
    /// is made.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let credentials = options.resolve_credentials()?;
        let transport = HttpTransport::new(options.timeout)?;
        Self::with_transport(credentials, &options.base_url, transport)
    }

    /// Client using only `CLOUDFLARE_API_KEY` and `CLOUDFLARE_ACCOUNT_ID`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }
}

impl<T: AsyncTransport> AsyncClient<T> {
    pub fn with_transport(credentials: Credentials, base_url: &str, transport: T) -> Result<Self> {
        Ok(Self {
            api: Api::new(credentials, base_url)?,
            transport,
        })
    }

    pub fn account_id(&self) -> &str {
        self.api.credentials().account_id()
    }

    /// Submits a URL for scanning. The result is usually still pending.
    pub async fn scan(&self, request: impl Into<ScanRequest>) -> Result<ScanResult> {
        let request = self.api.submit_scan(&request.into())?;
        let result = api::decode_scan(self.transport.send(request).await?)?;
        debug!(uuid = result.uuid(), status = %result.status(), "scan submitted");
        Ok(result)
    }

    pub async fn get_scan(&self, uuid: &str) -> Result<ScanResult> {
        let request = self.api.get_scan(uuid)?;
        api::decode_scan(self.transport.send(request).await?)
    }

    /// Searches by main page hostname or by scan id. No match is an empty
    /// list, not an error.
    pub async fn search(&self, query: &str, by: SearchBy) -> Result<Vec<ScanResult>> {
        self.search_with(&SearchFilter::by(query, by)).await
    }

    pub async fn search_with(&self, filter: &SearchFilter) -> Result<Vec<ScanResult>> {
        let request = self.api.search(filter)?;
        api::decode_search(self.transport.send(request).await?)
    }

    /// Fetches a screenshot. `resolution` must be `desktop`, `mobile` or
    /// `tablet` (or a [`ScreenshotResolution`](crate::ScreenshotResolution));
    /// anything else fails before a request is made.
    pub async fn get_screenshot(&self, uuid: &str, resolution: impl AsRef<str>) -> Result<Vec<u8>> {
        let request = self.api.get_screenshot(uuid, resolution.as_ref())?;
        api::decode_bytes(self.transport.send(request).await?)
    }

    /// Fetches the HAR capture of the page load.
    pub async fn get_har(&self, uuid: &str) -> Result<Vec<u8>> {
        let request = self.api.get_har(uuid)?;
        api::decode_bytes(self.transport.send(request).await?)
    }

    /// Polls [`get_scan`](Self::get_scan) until the scan is no longer
    /// pending.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`](crate::Error::Timeout) when the budget runs
    /// out, or the first error any poll attempt returns.
    pub async fn wait_for_scan(&self, uuid: &str, options: WaitOptions) -> Result<ScanResult> {
        let mut budget = PollBudget::start(uuid, options);
        loop {
            let result = self.get_scan(uuid).await?;
            budget.record_attempt();
            if !result.status().is_pending() {
                info!(uuid, status = %result.status(), attempts = budget.attempts(), "scan finished");
                return Ok(result);
            }
            tokio::time::sleep(budget.next_delay()?).await;
        }
    }

    /// Submits a URL and waits for the scan to finish.
    pub async fn scan_and_wait(
        &self,
        request: impl Into<ScanRequest>,
        options: WaitOptions,
    ) -> Result<ScanResult> {
        let submitted = self.scan(request).await?;
        if !submitted.status().is_pending() {
            return Ok(submitted);
        }
        self.wait_for_scan(submitted.uuid(), options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::model::{ScanStatus, ScreenshotResolution};
    use crate::transport::mock::MockTransport;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn client(transport: MockTransport) -> (AsyncClient<Arc<MockTransport>>, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let client = AsyncClient::with_transport(
            Credentials::new("key", "acc").unwrap(),
            "https://api.test/client/v4",
            Arc::clone(&transport),
        )
        .unwrap();
        (client, transport)
    }

    fn quick_wait() -> WaitOptions {
        WaitOptions::new(Duration::from_secs(5), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_scan_then_get_scan() {
        let (client, transport) = client(
            MockTransport::new()
                .respond_json(200, json!({"uuid": "abc-123", "status": "pending"}))
                .respond_json(
                    200,
                    json!({"uuid": "abc-123", "status": "done", "verdict": {"malicious": false}}),
                ),
        );

        let submitted = client.scan("example.com").await.unwrap();
        assert_eq!(submitted.uuid(), "abc-123");
        assert_eq!(submitted.status(), ScanStatus::Pending);

        let fetched = client.get_scan("abc-123").await.unwrap();
        assert_eq!(fetched.status(), ScanStatus::Done);
        assert!(fetched.verdict().is_some());

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].json.as_ref().unwrap()["url"], "example.com");
        assert!(requests[1].url.path().ends_with("/scan/abc-123"));
    }

    #[tokio::test]
    async fn test_invalid_resolution_makes_no_request() {
        let (client, transport) = client(MockTransport::new().respond(200, vec![1, 2, 3]));

        let err = client.get_screenshot("abc-123", "widescreen").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn test_screenshot_with_enum_resolution() {
        let (client, transport) = client(MockTransport::new().respond(200, vec![0x89, b'P']));

        let bytes = client
            .get_screenshot("abc-123", ScreenshotResolution::Tablet)
            .await
            .unwrap();
        assert_eq!(bytes, vec![0x89, b'P']);
        assert_eq!(transport.requests()[0].url.query(), Some("resolution=tablet"));
    }

    #[tokio::test]
    async fn test_search_empty_list() {
        let (client, _) = client(MockTransport::new().respond_json(200, json!([])));
        let results = client.search("example.com", SearchBy::Hostname).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let (client, _) = client(
            MockTransport::new()
                .respond(404, "not found")
                .respond(401, "unauthorized")
                .respond(503, "unavailable"),
        );

        assert_eq!(
            client.get_scan("nonexistent").await.unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            client.get_scan("abc").await.unwrap_err().kind(),
            ErrorKind::Authentication
        );
        let err = client.get_har("abc").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteService);
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_wait_returns_first_non_pending() {
        let (client, transport) = client(
            MockTransport::new()
                .respond_json(200, json!({"uuid": "u", "status": "pending"}))
                .respond_json(200, json!({"uuid": "u", "status": "pending"}))
                .respond_json(200, json!({"uuid": "u", "status": "done"})),
        );

        let result = client.wait_for_scan("u", quick_wait()).await.unwrap();
        assert_eq!(result.status(), ScanStatus::Done);
        assert_eq!(transport.call_count(), 3);
    }

    #[tokio::test]
    async fn test_wait_times_out() {
        let mut mock = MockTransport::new();
        for _ in 0..1000 {
            mock = mock.respond_json(200, json!({"uuid": "u", "status": "pending"}));
        }
        let (client, transport) = client(mock);

        let options = WaitOptions::new(Duration::from_millis(30), Duration::from_millis(5));
        let err = client.wait_for_scan("u", options).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert!(transport.call_count() < 1000);
    }

    #[tokio::test]
    async fn test_wait_surfaces_poll_errors() {
        let (client, _) = client(
            MockTransport::new()
                .respond_json(200, json!({"uuid": "u", "status": "pending"}))
                .respond(500, "boom"),
        );

        let err = client.wait_for_scan("u", quick_wait()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteService);
    }

    #[tokio::test]
    async fn test_scan_and_wait() {
        let (client, _) = client(
            MockTransport::new()
                .respond_json(200, json!({"success": true, "errors": [], "result": {"uuid": "u"}}))
                .respond_json(200, json!({"uuid": "u", "status": "Finished"})),
        );

        let result = client.scan_and_wait("example.com", quick_wait()).await.unwrap();
        assert_eq!(result.uuid(), "u");
        assert_eq!(result.status(), ScanStatus::Done);
    }

    #[test]
    fn test_unsendable_api_key_fails_at_construction() {
        let options = ClientOptions::new().api_key("key\n").account_id("acc");
        let err = AsyncClient::new(options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_invalid_base_url_fails_at_construction() {
        let options = ClientOptions::new()
            .api_key("key")
            .account_id("acc")
            .base_url("not a url");
        let err = AsyncClient::new(options).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }
}
