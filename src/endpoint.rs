//! Request URLs for the account-scoped scan endpoints.

use crate::error::{Error, Result};
use crate::model::{ScreenshotResolution, SearchFilter};
use reqwest::Url;

/// Public Cloudflare API root.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Builds the URLs for one account's scan collection.
///
/// # Example
///
/// ```
/// use urlscan::endpoint::{Endpoints, DEFAULT_BASE_URL};
///
/// let endpoints = Endpoints::new(DEFAULT_BASE_URL, "acc").unwrap();
/// assert_eq!(
///     endpoints.har("abc").as_str(),
///     "https://api.cloudflare.com/client/v4/accounts/acc/urlscanner/scan/abc/har"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    scans: Url,
}

impl Endpoints {
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(base_url: &str, account_id: &str) -> Result<Self> {
        let mut scans = Url::parse(base_url)
            .map_err(|e| Error::Configuration(format!("invalid base url {}: {}", base_url, e)))?;

        if !matches!(scans.scheme(), "http" | "https") {
            return Err(Error::Configuration(format!(
                "base url must be http or https: {}",
                base_url
            )));
        }

        scans
            .path_segments_mut()
            .map_err(|_| Error::Configuration(format!("base url cannot carry a path: {}", base_url)))?
            .pop_if_empty()
            .extend(["accounts", account_id, "urlscanner", "scan"]);
        scans.set_query(None);

        Ok(Self { scans })
    }

    /// Scan collection; target of submissions and searches.
    pub fn scans(&self) -> Url {
        self.scans.clone()
    }

    pub fn scan(&self, uuid: &str) -> Url {
        self.join(&[uuid])
    }

    pub fn screenshot(&self, uuid: &str, resolution: ScreenshotResolution) -> Url {
        let mut url = self.join(&[uuid, "screenshot"]);
        url.query_pairs_mut()
            .append_pair("resolution", resolution.as_str());
        url
    }

    pub fn har(&self, uuid: &str) -> Url {
        self.join(&[uuid, "har"])
    }

    pub fn search(&self, filter: &SearchFilter) -> Url {
        let mut url = self.scans();
        let pairs = filter.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.scans();
        // The base was checked to accept path segments in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchBy;

    fn endpoints() -> Endpoints {
        Endpoints::new(DEFAULT_BASE_URL, "acc-1").unwrap()
    }

    #[test]
    fn test_scans_url() {
        assert_eq!(
            endpoints().scans().as_str(),
            "https://api.cloudflare.com/client/v4/accounts/acc-1/urlscanner/scan"
        );
    }

    #[test]
    fn test_trailing_slash_in_base() {
        let endpoints = Endpoints::new("http://127.0.0.1:8080/", "acc-1").unwrap();
        assert_eq!(
            endpoints.scan("u-1").as_str(),
            "http://127.0.0.1:8080/accounts/acc-1/urlscanner/scan/u-1"
        );
    }

    #[test]
    fn test_screenshot_url() {
        assert_eq!(
            endpoints()
                .screenshot("u-1", ScreenshotResolution::Mobile)
                .as_str(),
            "https://api.cloudflare.com/client/v4/accounts/acc-1/urlscanner/scan/u-1/screenshot?resolution=mobile"
        );
    }

    #[test]
    fn test_search_url() {
        let url = endpoints().search(&SearchFilter::by("example.com", SearchBy::Hostname));
        assert_eq!(url.query(), Some("page_hostname=example.com"));
    }

    #[test]
    fn test_search_without_filters_has_no_query() {
        assert_eq!(endpoints().search(&SearchFilter::new()).query(), None);
    }

    #[test]
    fn test_uuid_is_path_escaped() {
        let url = endpoints().scan("../other");
        assert!(url.path().ends_with("/scan/..%2Fother"));
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(Endpoints::new("not a url", "acc").is_err());
        assert!(Endpoints::new("ftp://example.com", "acc").is_err());
    }
}
