//! Error types for the LinkedIn tools.
//!
//! Every failure that leaves the client layer is a [`LinkedInError`]. Remote
//! failures are turned into one by [`classify`]; local input problems are
//! raised directly as [`LinkedInError::Validation`].

mod mapping;

pub use mapping::{classify, parse_retry_after, RawFailure, ResponseFailure};

use serde_json::Value;
use thiserror::Error;

/// Result type alias for LinkedIn operations.
pub type LinkedInResult<T> = Result<T, LinkedInError>;

/// Classified failure of a LinkedIn operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkedInError {
    /// The access token is invalid or expired (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Message reported by the API.
        message: String,
    },

    /// The access token lacks a required scope (HTTP 403).
    #[error("Permission denied: {message}")]
    Permission {
        /// Message reported by the API.
        message: String,
    },

    /// The caller exceeded the allowed call rate (HTTP 429).
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        /// Message reported by the API.
        message: String,
        /// Server supplied delay from the `retry-after` header.
        retry_after_seconds: Option<u64>,
    },

    /// Any other remote failure.
    #[error("LinkedIn API error (HTTP {status_code}): {message}")]
    Api {
        /// Message reported by the API.
        message: String,
        /// Original HTTP status code.
        status_code: u16,
        /// LinkedIn error code (`code` or `serviceErrorCode`), if present.
        error_code: Option<String>,
        /// Raw error body.
        details: Option<Value>,
    },

    /// Local input or response-shape violation. Never retried.
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong.
        message: String,
        /// Offending input field, if known.
        field: Option<String>,
    },

    /// Failure without an HTTP response (network, unrecognised value).
    #[error("Request failed: {message}")]
    Transport {
        /// Underlying message.
        message: String,
    },
}

impl LinkedInError {
    /// Creates a validation error for a specific input field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Creates a validation error not tied to a single field.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    /// Creates an error for a remote response that did not match the expected shape.
    pub fn unexpected_response(what: &str, cause: impl std::fmt::Display) -> Self {
        Self::Validation {
            message: format!("Unexpected {} response from LinkedIn: {}", what, cause),
            field: None,
        }
    }

    /// Returns true if the resilient invoker may retry this error.
    ///
    /// Only rate limiting is transient; 5xx responses are not retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimit { .. })
    }

    /// Server supplied retry delay in seconds, if any.
    pub fn retry_after_seconds(&self) -> Option<u64> {
        match self {
            Self::RateLimit {
                retry_after_seconds,
                ..
            } => *retry_after_seconds,
            _ => None,
        }
    }

    /// HTTP status code carried by the error, if it came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Permission { .. } => Some(403),
            Self::RateLimit { .. } => Some(429),
            Self::Api { status_code, .. } => Some(*status_code),
            Self::Validation { .. } | Self::Transport { .. } => None,
        }
    }

    /// Short machine-readable kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Authentication { .. } => "authentication",
            Self::Permission { .. } => "permission",
            Self::RateLimit { .. } => "rate_limit",
            Self::Api { .. } => "api",
            Self::Validation { .. } => "validation",
            Self::Transport { .. } => "transport",
        }
    }

    /// Human-readable summary shown to the agent.
    ///
    /// This is presentation only; the classification is left untouched.
    pub fn summary(&self) -> String {
        match self {
            Self::Authentication { message } => format!(
                "Authentication failed: {}. The LinkedIn access token is invalid or has expired; \
                 generate a new token and restart the server.",
                message
            ),
            Self::Permission { message } => format!(
                "Permission denied: {}. Check that the access token carries the required scopes \
                 (r_ads, rw_ads, r_ads_reporting for advertising; r_organization_social, \
                 w_organization_social, rw_organization_admin for pages) and that the member \
                 has a role on the ad account or organization.",
                message
            ),
            Self::RateLimit {
                message,
                retry_after_seconds,
            } => match retry_after_seconds {
                Some(secs) => format!(
                    "LinkedIn API rate limit exceeded: {}. Wait at least {} seconds before retrying.",
                    message, secs
                ),
                None => format!(
                    "LinkedIn API rate limit exceeded: {}. Wait a few minutes before making more requests.",
                    message
                ),
            },
            Self::Api {
                message,
                status_code: 404,
                ..
            } => format!(
                "Resource not found: {}. Verify that the ID exists and belongs to an account you can access.",
                message
            ),
            Self::Api {
                message,
                status_code,
                error_code,
                ..
            } => match error_code {
                Some(code) => format!("LinkedIn API error ({}, {}): {}", status_code, code, message),
                None => format!("LinkedIn API error ({}): {}", status_code, message),
            },
            Self::Validation {
                message,
                field: Some(field),
            } => format!("Invalid input for '{}': {}", field, message),
            Self::Validation { message, field: None } => format!("Invalid input: {}", message),
            Self::Transport { message } => format!("Request to LinkedIn failed: {}", message),
        }
    }
}
