use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Whether a scan shows up in public listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    #[default]
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "Public",
            Visibility::Unlisted => "Unlisted",
            Visibility::Private => "Private",
        }
    }
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            "private" => Ok(Visibility::Private),
            _ => Err(Error::invalid_argument(format!(
                "unknown visibility: {}. Use: public, unlisted, private",
                s
            ))),
        }
    }
}

/// Viewport used when the service renders a screenshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScreenshotResolution {
    #[default]
    Desktop,
    Mobile,
    Tablet,
}

impl ScreenshotResolution {
    pub const ALL: [ScreenshotResolution; 3] = [
        ScreenshotResolution::Desktop,
        ScreenshotResolution::Mobile,
        ScreenshotResolution::Tablet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScreenshotResolution::Desktop => "desktop",
            ScreenshotResolution::Mobile => "mobile",
            ScreenshotResolution::Tablet => "tablet",
        }
    }
}

impl AsRef<str> for ScreenshotResolution {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for ScreenshotResolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ScreenshotResolution {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "desktop" => Ok(ScreenshotResolution::Desktop),
            "mobile" => Ok(ScreenshotResolution::Mobile),
            "tablet" => Ok(ScreenshotResolution::Tablet),
            _ => Err(Error::invalid_argument(format!(
                "unknown screenshot resolution: {}. Use: desktop, mobile, tablet",
                s
            ))),
        }
    }
}

/// Extra settings for a scan submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanOptions {
    /// Viewports to capture. Empty leaves the choice to the service.
    pub screenshots_resolutions: Vec<ScreenshotResolution>,
    /// Headers the scanner sends when it loads the page.
    pub custom_headers: BTreeMap<String, String>,
    /// Additional body fields forwarded as-is. Fields set above take
    /// precedence over entries with the same name here.
    pub extra: Map<String, Value>,
}

/// A URL submission.
///
/// # Example
///
/// ```
/// use urlscan::{ScanRequest, ScreenshotResolution, Visibility};
///
/// let request = ScanRequest::new("https://example.com")
///     .with_visibility(Visibility::Unlisted)
///     .with_screenshots([ScreenshotResolution::Desktop, ScreenshotResolution::Mobile])
///     .with_user_agent("urlscan-docs");
///
/// let body = request.to_body();
/// assert_eq!(body["visibility"], "Unlisted");
/// assert_eq!(body["customHeaders"]["user-agent"], "urlscan-docs");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub url: String,
    pub visibility: Option<Visibility>,
    pub options: ScanOptions,
}

impl ScanRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            visibility: None,
            options: ScanOptions::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_screenshots(
        mut self,
        resolutions: impl IntoIterator<Item = ScreenshotResolution>,
    ) -> Self {
        self.options.screenshots_resolutions = resolutions.into_iter().collect();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.custom_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_user_agent(self, user_agent: impl Into<String>) -> Self {
        self.with_header("user-agent", user_agent)
    }

    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        self.options.extra.insert(key.into(), value);
        self
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Rejects input the service would never accept. URL syntax itself is
    /// left to the service.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(Error::invalid_argument("url must not be empty"));
        }
        Ok(())
    }

    /// JSON body for the create-scan endpoint.
    pub fn to_body(&self) -> Value {
        let mut body = self.options.extra.clone();

        body.insert("url".to_string(), Value::String(self.url.clone()));
        body.insert(
            "visibility".to_string(),
            Value::String(self.visibility.unwrap_or_default().as_str().to_string()),
        );

        if !self.options.screenshots_resolutions.is_empty() {
            let resolutions = self
                .options
                .screenshots_resolutions
                .iter()
                .map(|r| Value::String(r.as_str().to_string()))
                .collect();
            body.insert("screenshotsResolutions".to_string(), Value::Array(resolutions));
        }

        if !self.options.custom_headers.is_empty() {
            let headers = self
                .options
                .custom_headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            body.insert("customHeaders".to_string(), Value::Object(headers));
        }

        Value::Object(body)
    }
}

impl From<&str> for ScanRequest {
    fn from(url: &str) -> Self {
        ScanRequest::new(url)
    }
}

impl From<String> for ScanRequest {
    fn from(url: String) -> Self {
        ScanRequest::new(url)
    }
}

/// Field the simple search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBy {
    /// Main page hostname of the scanned site.
    Hostname,
    /// Scan identifier.
    Uuid,
}

/// Full set of search filters accepted by the service. Unset fields are
/// not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilter {
    /// Only scans created by this account.
    pub account_scans: Option<bool>,
    /// Scans requested after this instant (inclusive).
    pub date_start: Option<DateTime<Utc>>,
    /// Scans requested before this instant (inclusive).
    pub date_end: Option<DateTime<Utc>>,
    /// Hostname of any request made by the page.
    pub hostname: Option<String>,
    /// IP address of any request made by the page.
    pub ip: Option<String>,
    pub limit: Option<u32>,
    /// Pagination cursor from a previous search.
    pub next_cursor: Option<String>,
    pub page_hostname: Option<String>,
    pub page_ip: Option<String>,
    /// Exact or suffix match on the main page path.
    pub page_path: Option<String>,
    /// Exact match on the scanned URL after redirects.
    pub page_url: Option<String>,
    /// URL path of any request made by the page.
    pub path: Option<String>,
    pub scan_id: Option<String>,
    /// Exact URL of any request made by the page.
    pub url: Option<String>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter matching `query` on the main page hostname or the scan id.
    pub fn by(query: impl Into<String>, by: SearchBy) -> Self {
        let query = query.into();
        match by {
            SearchBy::Hostname => Self {
                page_hostname: Some(query),
                ..Self::default()
            },
            SearchBy::Uuid => Self {
                scan_id: Some(query),
                ..Self::default()
            },
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_date_range(
        mut self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.date_start = start;
        self.date_end = end;
        self
    }

    pub fn with_next_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }

    /// Query string pairs in wire names, in a stable order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let fmt_date = |d: &DateTime<Utc>| d.to_rfc3339_opts(SecondsFormat::Secs, true);

        let fields: [(&'static str, Option<String>); 14] = [
            ("account_scans", self.account_scans.map(|b| b.to_string())),
            ("date_end", self.date_end.as_ref().map(fmt_date)),
            ("date_start", self.date_start.as_ref().map(fmt_date)),
            ("hostname", self.hostname.clone()),
            ("ip", self.ip.clone()),
            ("limit", self.limit.map(|l| l.to_string())),
            ("next_cursor", self.next_cursor.clone()),
            ("page_hostname", self.page_hostname.clone()),
            ("page_ip", self.page_ip.clone()),
            ("page_path", self.page_path.clone()),
            ("page_url", self.page_url.clone()),
            ("path", self.path.clone()),
            ("scanId", self.scan_id.clone()),
            ("url", self.url.clone()),
        ];

        fields
            .into_iter()
            .filter_map(|(name, value)| value.map(|v| (name, v)))
            .collect()
    }
}
