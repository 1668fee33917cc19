//! Wire types for the PySleuth analysis service and the client seam used by
//! the session controller.

mod http;

pub use http::HttpAnalysisClient;

use crate::task::TaskHandle;
use serde::{Deserialize, Serialize};

/// Explanation shown for every transport failure, whatever its cause.
pub const CONNECTION_FAILURE_MESSAGE: &str =
    "Failed to connect to the backend. Please ensure the server is running.";

/// Used in place of the error text when the failure carries none.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Body of `POST /debug`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugRequest {
    pub code: String,
    /// Ask the service to phrase the explanation in Hinglish. Left out of the
    /// body entirely when false.
    #[serde(skip_serializing_if = "is_false")]
    pub translate: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// What the service says about a snippet. Also synthesized locally when the
/// service could not be reached, so rendering never needs a separate
/// "request failed" branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub has_errors: bool,
    pub explanation: String,
    pub corrected_code: String,
}

impl AnalysisResult {
    pub fn from_failure(failure: &TransportFailure) -> Self {
        let detail = failure
            .detail()
            .unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
        Self {
            has_errors: true,
            explanation: CONNECTION_FAILURE_MESSAGE.to_string(),
            corrected_code: format!("# Error details: {detail}"),
        }
    }
}

/// Anything that kept a submission from producing a service result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    /// Connect, DNS, TLS or timeout error while sending the request.
    #[error("{0}")]
    Request(String),
    #[error("request failed with status code {status}")]
    Status { status: u16 },
    #[error("invalid response body: {0}")]
    Decode(String),
    /// The worker went away without reporting an outcome.
    #[error("analysis worker stopped before replying")]
    Disconnected,
}

impl TransportFailure {
    /// Message to embed in the synthesized result, if the failure has one.
    pub fn detail(&self) -> Option<String> {
        match self {
            TransportFailure::Disconnected => None,
            TransportFailure::Request(msg) if msg.trim().is_empty() => None,
            other => Some(other.to_string()),
        }
    }
}

pub type AnalysisOutcome = Result<AnalysisResult, TransportFailure>;

pub trait AnalysisClient {
    /// Start one analysis. The returned handle yields exactly one outcome, or
    /// closes if the worker dies first.
    fn submit(&self, request: DebugRequest) -> TaskHandle<AnalysisOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_omits_translate_when_off() {
        let body = serde_json::to_value(DebugRequest {
            code: "x=1".into(),
            translate: false,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "code": "x=1" }));

        let body = serde_json::to_value(DebugRequest {
            code: "x=1".into(),
            translate: true,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "code": "x=1", "translate": true }));
    }

    #[test]
    fn result_defaults_missing_has_errors_to_false() {
        let parsed: AnalysisResult =
            serde_json::from_str(r#"{"explanation":"fine","corrected_code":"x = 1"}"#).unwrap();
        assert!(!parsed.has_errors);
        assert_eq!(parsed.explanation, "fine");
    }

    #[test]
    fn failure_result_embeds_error_text() {
        let result = AnalysisResult::from_failure(&TransportFailure::Request("timeout".into()));
        assert!(result.has_errors);
        assert_eq!(result.explanation, CONNECTION_FAILURE_MESSAGE);
        assert!(result.corrected_code.contains("timeout"));

        let result = AnalysisResult::from_failure(&TransportFailure::Status { status: 500 });
        assert!(result.corrected_code.contains("500"));
    }

    #[test]
    fn failure_without_message_uses_fallback() {
        let result = AnalysisResult::from_failure(&TransportFailure::Disconnected);
        assert!(result.has_errors);
        assert!(result.corrected_code.contains(UNKNOWN_ERROR_MESSAGE));

        let result = AnalysisResult::from_failure(&TransportFailure::Request("  ".into()));
        assert!(result.corrected_code.contains(UNKNOWN_ERROR_MESSAGE));
    }
}
