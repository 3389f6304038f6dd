use chrono::NaiveDate;
use thiserror::Error;

use crate::api::dashboard::ApiError;
use crate::models::DirectionTab;

/// Filter rejected before any request is made. The previously active filter stays in place.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidFilterError {
    #[error("Amount threshold must be zero or more, got {0}")]
    NegativeThreshold(i64),
    #[error("Date range starts {from} but ends {to}")]
    InvertedDateRange { from: NaiveDate, to: NaiveDate },
}

/// Failed list request for one tab
#[derive(Debug, Clone, Error)]
#[error("Failed to fetch {direction} payments: {source}")]
pub struct FetchError {
    pub direction: DirectionTab,
    #[source]
    pub source: ApiError,
}

impl FetchError {
    pub fn new(direction: DirectionTab, source: ApiError) -> Self {
        Self { direction, source }
    }
}

/// Extract a clean error message from a backend error body
///
/// The backend wraps failures as
/// `{"success":false,"message":"Validation failed","error":{"error_type":"validation_error"}}`.
///
/// Returns only the meaningful message, falling back to the trimmed body:
/// "Validation failed"
pub fn extract_api_message(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(message) = json.get("message").and_then(|v| v.as_str()) {
            return message.trim().to_string();
        }
        if let Some(message) = json.get("error").and_then(|v| v.as_str()) {
            return message.trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_from_envelope() {
        let body = r#"{"success":false,"message":"Validation failed",
            "error":{"error_type":"validation_error"}}"#;
        assert_eq!(extract_api_message(body), "Validation failed");
    }

    #[test]
    fn test_extract_message_plain_text() {
        assert_eq!(extract_api_message("  bad gateway \n"), "bad gateway");
        assert_eq!(extract_api_message(r#"{"error":"nope"}"#), "nope");
    }
}
