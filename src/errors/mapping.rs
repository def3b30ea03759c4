//! Mapping of raw transport failures to [`LinkedInError`].
//!
//! LinkedIn returns errors as JSON bodies of the form:
//!
//! ```json
//! {
//!   "status": 401,
//!   "serviceErrorCode": 65600,
//!   "code": "INVALID_ACCESS_TOKEN",
//!   "message": "Invalid access token"
//! }
//! ```

use super::LinkedInError;
use serde_json::Value;
use std::collections::HashMap;

/// HTTP response attached to a failed call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseFailure {
    /// HTTP status code.
    pub status: u16,
    /// Parsed response body, `Value::Null` when empty or not JSON.
    pub data: Value,
    /// Response headers with lowercase names.
    pub headers: HashMap<String, String>,
}

impl ResponseFailure {
    /// Creates a response failure with an empty body and no headers.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            data: Value::Null,
            headers: HashMap::new(),
        }
    }

    /// Sets the response body.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Adds a header. Names are stored lowercase.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    fn body_str(&self, key: &str) -> Option<String> {
        match self.data.get(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// A failure surfaced by a transport before classification.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFailure {
    /// Already classified; passed through unchanged.
    Classified(LinkedInError),
    /// The remote service answered with a non-success status.
    Response {
        /// The response descriptor.
        response: ResponseFailure,
        /// Fallback message used when the body carries none.
        message: String,
    },
    /// No response, only a message (connection refused, timeout, ...).
    Message(String),
    /// Anything else, in its string form.
    Opaque(String),
}

impl RawFailure {
    /// Creates a response failure with the conventional fallback message.
    pub fn response(response: ResponseFailure) -> Self {
        let message = format!("Request failed with status code {}", response.status);
        Self::Response { response, message }
    }
}

impl From<LinkedInError> for RawFailure {
    fn from(error: LinkedInError) -> Self {
        Self::Classified(error)
    }
}

impl From<ResponseFailure> for RawFailure {
    fn from(response: ResponseFailure) -> Self {
        Self::response(response)
    }
}

/// Classifies a raw failure into exactly one [`LinkedInError`].
///
/// Classification is idempotent: an already classified error is returned as is.
pub fn classify(failure: RawFailure) -> LinkedInError {
    match failure {
        RawFailure::Classified(error) => error,
        RawFailure::Response { response, message } => classify_response(&response, message),
        RawFailure::Message(message) | RawFailure::Opaque(message) => {
            LinkedInError::Transport { message }
        }
    }
}

fn classify_response(response: &ResponseFailure, fallback: String) -> LinkedInError {
    let message = response.body_str("message").unwrap_or(fallback);

    match response.status {
        401 => LinkedInError::Authentication { message },
        403 => LinkedInError::Permission { message },
        429 => LinkedInError::RateLimit {
            message,
            retry_after_seconds: response.header("retry-after").and_then(parse_retry_after),
        },
        status => LinkedInError::Api {
            message,
            status_code: status,
            error_code: response
                .body_str("code")
                .or_else(|| response.body_str("serviceErrorCode")),
            details: match &response.data {
                Value::Null => None,
                data => Some(data.clone()),
            },
        },
    }
}

/// Parses a `retry-after` header value as whole seconds.
///
/// Leading decimal digits are taken (`"2.5"` is 2); values without any are ignored.
pub fn parse_retry_after(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case("1", Some(1))]
    #[test_case(" 30 ", Some(30))]
    #[test_case("2.5", Some(2))]
    #[test_case("soon", None)]
    #[test_case("", None)]
    fn retry_after_parsing(raw: &str, expected: Option<u64>) {
        assert_eq!(parse_retry_after(raw), expected);
    }

    #[test]
    fn message_taken_from_body() {
        let failure = RawFailure::response(
            ResponseFailure::new(401).with_data(json!({"message": "Invalid access token"})),
        );
        assert_eq!(
            classify(failure),
            LinkedInError::Authentication {
                message: "Invalid access token".to_string()
            }
        );
    }

    #[test]
    fn fallback_message_used_without_body() {
        let failure = RawFailure::response(ResponseFailure::new(403));
        assert_eq!(
            classify(failure),
            LinkedInError::Permission {
                message: "Request failed with status code 403".to_string()
            }
        );
    }

    #[test]
    fn service_error_code_used_when_code_missing() {
        let failure = RawFailure::response(
            ResponseFailure::new(400)
                .with_data(json!({"serviceErrorCode": 100, "message": "Bad field"})),
        );
        match classify(failure) {
            LinkedInError::Api {
                error_code,
                status_code,
                details,
                ..
            } => {
                assert_eq!(status_code, 400);
                assert_eq!(error_code.as_deref(), Some("100"));
                assert!(details.is_some());
            }
            other => panic!("unexpected classification: {:?}", other),
        }
    }

    #[test]
    fn header_names_are_lowercased() {
        let response = ResponseFailure::new(429).with_header("Retry-After", "7");
        assert_eq!(
            classify(response.into()).retry_after_seconds(),
            Some(7)
        );
    }
}
