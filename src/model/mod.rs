//! Core data types for scan submissions and results.
//!
//! - [`ScanRequest`] - A URL submission with its options
//! - [`ScanResult`] - A decoded scan as reported by the service
//! - [`ScanStatus`] - Pending, done, or error
//! - [`SearchFilter`] - Filters for the search endpoint
//! - [`ScreenshotResolution`] / [`Visibility`] - Enumerated settings
//!
//! # Example
//!
//! ```
//! use urlscan::{ScanRequest, Visibility};
//!
//! let request = ScanRequest::new("https://example.com").with_visibility(Visibility::Unlisted);
//! assert_eq!(request.to_body()["url"], "https://example.com");
//! ```

mod request;
mod scan;

pub use request::*;
pub use scan::*;

pub(crate) use scan::{is_envelope, unwrap_envelope};
