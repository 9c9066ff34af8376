use crate::error::{Error, Result};
use crate::model::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Progress of a scan as last reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Done,
    Error,
}

impl ScanStatus {
    pub fn is_pending(&self) -> bool {
        *self == ScanStatus::Pending
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Done => "done",
            ScanStatus::Error => "error",
        }
    }

    /// Maps a status string from the service. Unknown values are treated as
    /// still running.
    fn from_remote(status: &str, task_success: Option<bool>) -> Self {
        match status.to_lowercase().as_str() {
            "finished" | "done" | "complete" | "completed" => match task_success {
                Some(false) => ScanStatus::Error,
                _ => ScanStatus::Done,
            },
            "failed" | "error" => ScanStatus::Error,
            _ => ScanStatus::Pending,
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded scan.
///
/// Built once from a response body; every accessor reads from that body and
/// nothing here talks to the network. Accepts both the service envelope
/// (`{"success", "errors", "messages", "result"}`) and a bare scan object,
/// with the scan fields either at the top level or under `scan.task`.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use urlscan::{ScanResult, ScanStatus};
///
/// let result = ScanResult::from_json(json!({
///     "success": true,
///     "errors": [],
///     "messages": [],
///     "result": {
///         "scan": {
///             "task": {"uuid": "abc-123", "status": "Finished", "success": true},
///             "verdicts": {"overall": {"malicious": false, "categories": []}}
///         }
///     }
/// }))
/// .unwrap();
///
/// assert_eq!(result.uuid(), "abc-123");
/// assert_eq!(result.status(), ScanStatus::Done);
/// assert_eq!(result.is_malicious(), Some(false));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    uuid: String,
    status: ScanStatus,
    verdict: Option<Value>,
    raw: Value,
}

impl ScanResult {
    /// Decodes a scan from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if no non-empty UUID can be found.
    pub fn from_json(raw: Value) -> Result<Self> {
        let payload = unwrap_envelope(&raw);

        let uuid = [
            payload.get("uuid"),
            payload.pointer("/scan/task/uuid"),
            payload.pointer("/task/uuid"),
        ]
        .into_iter()
        .flatten()
        .find_map(Value::as_str)
        .filter(|uuid| !uuid.is_empty())
        .map(str::to_string)
        .ok_or_else(|| Error::Decode("scan response carries no uuid".to_string()))?;

        let status = derive_status(payload);

        let verdict = [
            payload.get("verdict"),
            payload.get("verdicts"),
            payload.pointer("/scan/verdicts"),
        ]
        .into_iter()
        .flatten()
        .find(|v| !v.is_null())
        .cloned();

        Ok(Self {
            uuid,
            status,
            verdict,
            raw,
        })
    }

    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Self::from_json(serde_json::from_slice(body)?)
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    pub fn verdict(&self) -> Option<&Value> {
        self.verdict.as_ref()
    }

    /// The full document the result was decoded from.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn into_raw(self) -> Value {
        self.raw
    }

    /// Overall malicious flag from the verdict, if the service reported one.
    pub fn is_malicious(&self) -> Option<bool> {
        let verdict = self.verdict.as_ref()?;
        verdict
            .pointer("/overall/malicious")
            .or_else(|| verdict.get("malicious"))
            .and_then(Value::as_bool)
    }

    /// Category names from the overall verdict.
    pub fn categories(&self) -> Vec<String> {
        let Some(verdict) = self.verdict.as_ref() else {
            return Vec::new();
        };

        verdict
            .pointer("/overall/categories")
            .or_else(|| verdict.get("categories"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| match item {
                        Value::String(name) => Some(name.clone()),
                        Value::Object(obj) => {
                            obj.get("name").and_then(Value::as_str).map(str::to_string)
                        }
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// URL that was scanned.
    pub fn url(&self) -> Option<&str> {
        self.field("url").and_then(Value::as_str)
    }

    pub fn visibility(&self) -> Option<Visibility> {
        self.field("visibility")
            .and_then(Value::as_str)
            .and_then(|v| v.parse().ok())
    }

    /// When the scan was requested.
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.field("time")
            .and_then(Value::as_str)
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
    }

    /// Looks `name` up on the scan object, then on its task.
    fn field(&self, name: &str) -> Option<&Value> {
        let payload = unwrap_envelope(&self.raw);
        payload
            .get(name)
            .or_else(|| payload.get("scan").and_then(|s| s.get("task")).and_then(|t| t.get(name)))
            .or_else(|| payload.get("task").and_then(|t| t.get(name)))
    }
}

/// Returns the `result` member of a service envelope, or the document itself.
pub(crate) fn unwrap_envelope(raw: &Value) -> &Value {
    match raw.get("result") {
        Some(result) if is_envelope(raw) => result,
        _ => raw,
    }
}

pub(crate) fn is_envelope(raw: &Value) -> bool {
    raw.get("result").is_some() && (raw.get("success").is_some() || raw.get("errors").is_some())
}

fn derive_status(payload: &Value) -> ScanStatus {
    let task = payload
        .pointer("/scan/task")
        .or_else(|| payload.get("task"))
        .unwrap_or(payload);
    let task_success = task.get("success").and_then(Value::as_bool);

    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .or_else(|| task.get("status").and_then(Value::as_str));

    match (status, task_success) {
        (Some(status), success) => ScanStatus::from_remote(status, success),
        // Search entries carry only a success flag.
        (None, Some(true)) => ScanStatus::Done,
        (None, Some(false)) => ScanStatus::Error,
        // Freshly submitted scans carry neither.
        (None, None) => ScanStatus::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_pending_scan() {
        let result = ScanResult::from_json(json!({"uuid": "abc-123", "status": "pending"})).unwrap();
        assert_eq!(result.uuid(), "abc-123");
        assert_eq!(result.status(), ScanStatus::Pending);
        assert!(result.verdict().is_none());
    }

    #[test]
    fn test_flat_done_scan_with_verdict() {
        let result = ScanResult::from_json(json!({
            "uuid": "abc-123",
            "status": "done",
            "verdict": {"malicious": true, "categories": ["Phishing"]}
        }))
        .unwrap();

        assert_eq!(result.status(), ScanStatus::Done);
        assert!(result.verdict().is_some());
        assert_eq!(result.is_malicious(), Some(true));
        assert_eq!(result.categories(), vec!["Phishing".to_string()]);
    }

    #[test]
    fn test_submit_envelope_is_pending() {
        let result = ScanResult::from_json(json!({
            "success": true,
            "errors": [],
            "messages": [{"message": "Submission successful"}],
            "result": {
                "uuid": "2ee568d0-bf70-4827-b922-b7088c0f056f",
                "visibility": "Unlisted",
                "url": "https://example.com",
                "time": "2023-05-03T17:05:04.843Z"
            }
        }))
        .unwrap();

        assert_eq!(result.uuid(), "2ee568d0-bf70-4827-b922-b7088c0f056f");
        assert_eq!(result.status(), ScanStatus::Pending);
        assert_eq!(result.visibility(), Some(Visibility::Unlisted));
        assert_eq!(result.url(), Some("https://example.com"));
        assert!(result.time().is_some());
    }

    #[test]
    fn test_task_status_mapping() {
        for (remote, expected) in [
            ("Queued", ScanStatus::Pending),
            ("InProgress", ScanStatus::Pending),
            ("InPostProcessing", ScanStatus::Pending),
            ("Finished", ScanStatus::Done),
            ("Failed", ScanStatus::Error),
        ] {
            let result = ScanResult::from_json(json!({
                "success": true,
                "result": {"scan": {"task": {"uuid": "u", "status": remote}}}
            }))
            .unwrap();
            assert_eq!(result.status(), expected, "status {}", remote);
        }
    }

    #[test]
    fn test_finished_but_unsuccessful_task_is_error() {
        let result = ScanResult::from_json(json!({
            "result": {"scan": {"task": {"uuid": "u", "status": "Finished", "success": false}}},
            "success": true
        }))
        .unwrap();
        assert_eq!(result.status(), ScanStatus::Error);
    }

    #[test]
    fn test_categories_from_objects() {
        let result = ScanResult::from_json(json!({
            "uuid": "u",
            "status": "done",
            "verdicts": {"overall": {
                "malicious": true,
                "categories": [{"id": 117, "name": "Malware"}, {"id": 131, "name": "Phishing"}]
            }}
        }))
        .unwrap();

        assert_eq!(result.is_malicious(), Some(true));
        assert_eq!(result.categories(), vec!["Malware", "Phishing"]);
    }

    #[test]
    fn test_missing_uuid_is_decode_error() {
        let err = ScanResult::from_json(json!({"status": "done"})).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));

        let err = ScanResult::from_json(json!({"uuid": ""})).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_raw_is_kept_verbatim() {
        let raw = json!({"uuid": "u", "status": "pending", "extra": {"n": 1}});
        let result = ScanResult::from_json(raw.clone()).unwrap();
        assert_eq!(result.raw(), &raw);
        assert_eq!(result.into_raw(), raw);
    }

    #[test]
    fn test_non_envelope_result_key_is_not_unwrapped() {
        let raw = json!({"uuid": "u", "result": "clean"});
        assert_eq!(unwrap_envelope(&raw), &raw);
    }
}
