//! Client for the Cloudflare URL Scanner API.
//!
//! [`Client`] blocks the calling thread; [`AsyncClient`] runs on tokio. Both
//! build their requests and decode their responses through the same code, so
//! identical responses give identical results.
//!
//! ```no_run
//! use urlscan::{Client, ClientOptions, ScanRequest, Visibility, WaitOptions};
//!
//! let client = Client::new(ClientOptions::new())?;
//! let request = ScanRequest::new("https://example.com").with_visibility(Visibility::Unlisted);
//! let result = client.scan_and_wait(request, WaitOptions::default())?;
//! println!("{} malicious={:?}", result.uuid(), result.is_malicious());
//! # Ok::<(), urlscan::Error>(())
//! ```

pub(crate) mod api;
pub mod client;
pub mod config;
pub mod credentials;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod output;
pub mod transport;

pub use client::{AsyncClient, Client, ClientOptions, WaitOptions};
pub use config::Config;
pub use credentials::Credentials;
pub use error::{Error, ErrorKind, Result};
pub use model::{
    ScanOptions, ScanRequest, ScanResult, ScanStatus, ScreenshotResolution, SearchBy,
    SearchFilter, Visibility,
};
