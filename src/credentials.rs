//! Credential resolution.
//!
//! The API key and account id come from explicit arguments first and from
//! the process environment second. Resolution happens once, when a client is
//! built; nothing deeper in the request path reads the environment.

use crate::error::{Error, Result};
use reqwest::header::HeaderValue;
use std::fmt;

/// Environment variable holding the default API key.
pub const API_KEY_ENV: &str = "CLOUDFLARE_API_KEY";

/// Environment variable holding the default account id.
pub const ACCOUNT_ID_ENV: &str = "CLOUDFLARE_ACCOUNT_ID";

/// Resolved API credentials. Both values are guaranteed non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    account_id: String,
}

impl Credentials {
    /// Builds credentials from explicit values only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if either value is empty.
    pub fn new(api_key: impl Into<String>, account_id: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        let account_id = account_id.into();
        Self::resolve_with(Some(api_key.as_str()), Some(account_id.as_str()), |_| None)
    }

    /// Resolves credentials from explicit values, falling back to
    /// [`API_KEY_ENV`] and [`ACCOUNT_ID_ENV`].
    ///
    /// # Example
    ///
    /// ```
    /// use urlscan::Credentials;
    ///
    /// let creds = Credentials::resolve(Some("key"), Some("account")).unwrap();
    /// assert_eq!(creds.account_id(), "account");
    /// ```
    pub fn resolve(api_key: Option<&str>, account_id: Option<&str>) -> Result<Self> {
        Self::resolve_with(api_key, account_id, |name| std::env::var(name).ok())
    }

    /// Resolves credentials using `lookup` in place of the process
    /// environment.
    ///
    /// An explicit value that is empty or whitespace counts as absent. A key
    /// that cannot be sent in an `Authorization` header (a trailing newline,
    /// say) is rejected here rather than on the first request.
    pub fn resolve_with<F>(api_key: Option<&str>, account_id: Option<&str>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = pick(api_key, API_KEY_ENV, &lookup);
        let account_id = pick(account_id, ACCOUNT_ID_ENV, &lookup);

        match (api_key, account_id) {
            (Some(api_key), Some(account_id)) => {
                if HeaderValue::from_str(&format!("Bearer {}", api_key)).is_err() {
                    return Err(Error::Configuration(
                        "API key contains characters not allowed in an HTTP header".to_string(),
                    ));
                }
                Ok(Self {
                    api_key,
                    account_id,
                })
            }
            (api_key, account_id) => {
                let mut missing = Vec::new();
                if api_key.is_none() {
                    missing.push(format!("API key (set {})", API_KEY_ENV));
                }
                if account_id.is_none() {
                    missing.push(format!("account id (set {})", ACCOUNT_ID_ENV));
                }
                Err(Error::Configuration(format!(
                    "missing {}",
                    missing.join(" and ")
                )))
            }
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}

fn pick<F>(explicit: Option<&str>, env_name: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    explicit
        .filter(|v| !v.trim().is_empty())
        .map(str::to_string)
        .or_else(|| lookup(env_name).filter(|v| !v.trim().is_empty()))
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}
