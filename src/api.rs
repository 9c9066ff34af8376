//! Request construction and response decoding shared by both clients.
//!
//! The blocking and async clients differ only in how an [`ApiRequest`] is
//! sent. Everything before (validation, URL, headers, body) and after
//! (status translation, decoding) lives here.

use crate::credentials::Credentials;
use crate::endpoint::Endpoints;
use crate::error::{Error, Result};
use crate::model::{is_envelope, unwrap_envelope, ScanRequest, ScanResult, ScreenshotResolution, SearchFilter};
use crate::transport::{ApiRequest, ApiResponse, Method};
use serde_json::Value;
use tracing::warn;

/// Credentials plus endpoints for one account.
#[derive(Debug, Clone)]
pub(crate) struct Api {
    credentials: Credentials,
    endpoints: Endpoints,
}

impl Api {
    pub(crate) fn new(credentials: Credentials, base_url: &str) -> Result<Self> {
        let endpoints = Endpoints::new(base_url, credentials.account_id())?;
        Ok(Self {
            credentials,
            endpoints,
        })
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub(crate) fn submit_scan(&self, request: &ScanRequest) -> Result<ApiRequest> {
        request.validate()?;
        Ok(self.build(Method::Post, self.endpoints.scans(), Some(request.to_body())))
    }

    pub(crate) fn get_scan(&self, uuid: &str) -> Result<ApiRequest> {
        check_uuid(uuid)?;
        Ok(self.build(Method::Get, self.endpoints.scan(uuid), None))
    }

    pub(crate) fn search(&self, filter: &SearchFilter) -> Result<ApiRequest> {
        Ok(self.build(Method::Get, self.endpoints.search(filter), None))
    }

    pub(crate) fn get_screenshot(&self, uuid: &str, resolution: &str) -> Result<ApiRequest> {
        check_uuid(uuid)?;
        let resolution: ScreenshotResolution = resolution.parse()?;
        Ok(self.build(
            Method::Get,
            self.endpoints.screenshot(uuid, resolution),
            None,
        ))
    }

    pub(crate) fn get_har(&self, uuid: &str) -> Result<ApiRequest> {
        check_uuid(uuid)?;
        Ok(self.build(Method::Get, self.endpoints.har(uuid), None))
    }

    fn build(&self, method: Method, url: reqwest::Url, json: Option<Value>) -> ApiRequest {
        let mut headers = vec![("Authorization", self.credentials.bearer())];
        if json.is_some() {
            headers.push(("Content-Type", "application/json".to_string()));
        }
        ApiRequest {
            method,
            url,
            headers,
            json,
        }
    }
}

fn check_uuid(uuid: &str) -> Result<()> {
    if uuid.trim().is_empty() {
        return Err(Error::invalid_argument("scan uuid must not be empty"));
    }
    // Dot segments are normalised away by the URL and would hit another endpoint.
    if uuid == "." || uuid == ".." {
        return Err(Error::invalid_argument(format!("invalid scan uuid: {}", uuid)));
    }
    Ok(())
}

/// Turns any non-2xx response into the matching error.
pub(crate) fn check_status(response: ApiResponse) -> Result<ApiResponse> {
    if response.is_success() {
        return Ok(response);
    }
    warn!(status = response.status, "request failed");
    Err(Error::from_status(response.status, response.text()))
}

/// Parses a JSON body, rejecting any document that reports `success: false`.
fn decode_json(response: ApiResponse) -> Result<Value> {
    let response = check_status(response)?;
    let value: Value = serde_json::from_slice(&response.body)?;

    if value.get("success").and_then(Value::as_bool) == Some(false) {
        warn!(status = response.status, "service reported an unsuccessful response");
        return Err(Error::RemoteService {
            status: response.status,
            body: response.text(),
        });
    }
    Ok(value)
}

pub(crate) fn decode_scan(response: ApiResponse) -> Result<ScanResult> {
    ScanResult::from_json(decode_json(response)?)
}

pub(crate) fn decode_search(response: ApiResponse) -> Result<Vec<ScanResult>> {
    let value = decode_json(response)?;
    let payload = unwrap_envelope(&value);

    let items = match payload {
        Value::Array(items) => items,
        Value::Object(obj) => match obj.get("tasks") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) => return Ok(Vec::new()),
            Some(_) => return Err(Error::Decode("search tasks is not a list".to_string())),
            None => return Err(Error::Decode("search response has no tasks".to_string())),
        },
        // `result: null` inside an envelope means nothing matched.
        Value::Null if is_envelope(&value) => return Ok(Vec::new()),
        _ => return Err(Error::Decode("unexpected search response shape".to_string())),
    };

    items.iter().cloned().map(ScanResult::from_json).collect()
}

pub(crate) fn decode_bytes(response: ApiResponse) -> Result<Vec<u8>> {
    Ok(check_status(response)?.body)
}
