use serde::Deserialize;
use serde_json::Value;

/// Structured error information extracted from a search backend error body.
///
/// Backends answer failed requests with either
/// `{"error": {"type": ..., "reason": ...}, "status": n}` or, on older
/// versions, `{"error": "message", "status": n}`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct BackendErrorInfo {
    #[serde(rename = "type")]
    pub(crate) error_type: Option<String>,
    pub(crate) reason: Option<String>,
    pub(crate) index: Option<String>,
}

impl BackendErrorInfo {
    /// Extract error details from a raw response body.
    ///
    /// Bodies that are not JSON yield an info carrying the trimmed body as
    /// the reason, so nothing the backend said is lost.
    pub fn from_body(body: &str) -> Self {
        let parsed: Value = match serde_json::from_str(body) {
            Ok(v) => v,
            Err(_) => {
                let trimmed = body.trim();
                return Self {
                    reason: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    ..Self::default()
                };
            }
        };

        match parsed.get("error") {
            Some(Value::String(msg)) => Self {
                reason: Some(msg.clone()),
                ..Self::default()
            },
            Some(Value::Object(obj)) => Self {
                error_type: obj
                    .get("type")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                reason: obj
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                index: obj
                    .get("index")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            _ => Self::default(),
        }
    }

    /// Human-readable summary, falling back to the status text.
    pub fn summary(&self, fallback: &str) -> String {
        match (&self.error_type, &self.reason) {
            (Some(kind), Some(reason)) => format!("{kind}: {reason}"),
            (None, Some(reason)) => reason.clone(),
            (Some(kind), None) => kind.clone(),
            (None, None) => fallback.to_string(),
        }
    }
}
