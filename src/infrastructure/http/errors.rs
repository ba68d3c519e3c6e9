use reqwest::StatusCode;
use serde::Deserialize;

use crate::domain::errors::ClientError;

/// Structured error body returned by the server: `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

/// Create a `RequestFailed` from a non-2xx status code and its raw body.
///
/// Message precedence:
/// 1. `detail` from a JSON error body (string, or compact JSON when the
///    server sends a structured detail such as a validation error list)
/// 2. The canonical reason phrase of the status code
/// 3. `HTTP <code>`
///
/// # Examples
///
/// ```
/// use reqwest::StatusCode;
/// use simsync::infrastructure::http::errors::from_status;
///
/// let err = from_status(StatusCode::NOT_FOUND, r#"{"detail": "Simulation with ID x not found"}"#);
/// assert_eq!(err.to_string(), "Simulation with ID x not found");
/// assert_eq!(err.status_code(), Some(404));
/// ```
pub fn from_status(status: StatusCode, body: &str) -> ClientError {
    let detail = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.detail)
        .and_then(|detail| match detail {
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        });

    let message = detail
        .or_else(|| status.canonical_reason().map(ToString::to_string))
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));

    ClientError::request_failed(message, status.as_u16())
}

/// Create a `RequestFailed` for an exchange that failed below HTTP.
pub fn from_reqwest(err: &reqwest::Error) -> ClientError {
    let message = if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        format!("Could not connect to server: {err}")
    } else {
        format!("Network error: {err}")
    };

    match err.status() {
        Some(status) => ClientError::request_failed(message, status.as_u16()),
        None => ClientError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_string_is_used() {
        let err = from_status(StatusCode::BAD_REQUEST, r#"{"detail": "File must be a JSON file"}"#);
        assert_eq!(
            err,
            ClientError::RequestFailed {
                message: "File must be a JSON file".to_string(),
                status_code: Some(400),
            }
        );
    }

    #[test]
    fn test_structured_detail_is_rendered_as_json() {
        let body = r#"{"detail": [{"loc": ["body", "name"], "msg": "field required"}]}"#;
        let err = from_status(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert!(err.to_string().contains("field required"));
        assert_eq!(err.status_code(), Some(422));
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status_text() {
        let err = from_status(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(err.to_string(), "Bad Gateway");
        assert_eq!(err.status_code(), Some(502));
    }

    #[test]
    fn test_missing_detail_falls_back_to_status_text() {
        let err = from_status(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "boom"}"#);
        assert_eq!(err.to_string(), "Internal Server Error");

        let err = from_status(StatusCode::NOT_FOUND, r#"{"detail": ""}"#);
        assert_eq!(err.to_string(), "Not Found");
    }

    #[test]
    fn test_unknown_status_without_reason() {
        let status = StatusCode::from_u16(599).unwrap();
        let err = from_status(status, "");
        assert_eq!(err.to_string(), "HTTP 599");
        assert_eq!(err.status_code(), Some(599));
    }
}
