use super::{ClientOptions, PollBudget, WaitOptions};
use crate::api::{self, Api};
use crate::credentials::Credentials;
use crate::error::Result;
use crate::model::{ScanRequest, ScanResult, SearchBy, SearchFilter};
use crate::transport::{BlockingHttpTransport, BlockingTransport};
use tracing::{debug, info};

/// Blocking client for the URL Scanner API.
///
/// Calls run on the calling thread. For concurrency, share the client across
/// threads; the connection pool inside is thread-safe. Do not use it from
/// inside an async runtime; use [`AsyncClient`](super::AsyncClient) there.
///
/// # Example
///
/// ```no_run
/// use urlscan::{Client, ClientOptions, ScreenshotResolution};
///
/// let client = Client::new(ClientOptions::new().account_id("my-account"))?;
/// let png = client.get_screenshot("2ee568d0-bf70-4827-b922-b7088c0f056f", ScreenshotResolution::Desktop)?;
/// std::fs::write("screenshot.png", png).unwrap();
/// # Ok::<(), urlscan::Error>(())
/// ```
#[derive(Debug)]
pub struct Client<T = BlockingHttpTransport> {
    api: Api,
    transport: T,
}

impl Client {
    /// Resolves credentials and builds a reqwest-backed client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`](crate::Error::Configuration) if the
    /// credentials cannot be resolved or the base URL is invalid. No request
    /// is made.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let credentials = options.resolve_credentials()?;
        let transport = BlockingHttpTransport::new(options.timeout)?;
        Self::with_transport(credentials, &options.base_url, transport)
    }

    /// Client using only `CLOUDFLARE_API_KEY` and `CLOUDFLARE_ACCOUNT_ID`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientOptions::default())
    }
}

impl<T: BlockingTransport> Client<T> {
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
    pub fn scan(&self, request: impl Into<ScanRequest>) -> Result<ScanResult> {
        let request = self.api.submit_scan(&request.into())?;
        let result = api::decode_scan(self.transport.send(request)?)?;
        debug!(uuid = result.uuid(), status = %result.status(), "scan submitted");
        Ok(result)
    }

    pub fn get_scan(&self, uuid: &str) -> Result<ScanResult> {
        let request = self.api.get_scan(uuid)?;
        api::decode_scan(self.transport.send(request)?)
    }

    /// Searches by main page hostname or by scan id. No match is an empty
    /// list, not an error.
    pub fn search(&self, query: &str, by: SearchBy) -> Result<Vec<ScanResult>> {
        self.search_with(&SearchFilter::by(query, by))
    }

    pub fn search_with(&self, filter: &SearchFilter) -> Result<Vec<ScanResult>> {
        let request = self.api.search(filter)?;
        api::decode_search(self.transport.send(request)?)
    }

    /// Fetches a screenshot. An unknown `resolution` fails before a request
    /// is made.
    pub fn get_screenshot(&self, uuid: &str, resolution: impl AsRef<str>) -> Result<Vec<u8>> {
        let request = self.api.get_screenshot(uuid, resolution.as_ref())?;
        api::decode_bytes(self.transport.send(request)?)
    }

    pub fn get_har(&self, uuid: &str) -> Result<Vec<u8>> {
        let request = self.api.get_har(uuid)?;
        api::decode_bytes(self.transport.send(request)?)
    }

    /// Polls [`get_scan`](Self::get_scan) until the scan is no longer
    /// pending, sleeping the calling thread between attempts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`](crate::Error::Timeout) when the budget runs
    /// out, or the first error any poll attempt returns.
    pub fn wait_for_scan(&self, uuid: &str, options: WaitOptions) -> Result<ScanResult> {
        let mut budget = PollBudget::start(uuid, options);
        loop {
            let result = self.get_scan(uuid)?;
            budget.record_attempt();
            if !result.status().is_pending() {
                info!(uuid, status = %result.status(), attempts = budget.attempts(), "scan finished");
                return Ok(result);
            }
            std::thread::sleep(budget.next_delay()?);
        }
    }

    /// Submits a URL and waits for the scan to finish.
    pub fn scan_and_wait(
        &self,
        request: impl Into<ScanRequest>,
        options: WaitOptions,
    ) -> Result<ScanResult> {
        let submitted = self.scan(request)?;
        if !submitted.status().is_pending() {
            return Ok(submitted);
        }
        self.wait_for_scan(submitted.uuid(), options)
    }
}
