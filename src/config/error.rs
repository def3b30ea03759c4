//! Configuration errors.

use thiserror::Error;

/// Error raised while loading or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required credential was not provided.
    #[error("missing required credential: {name}")]
    MissingCredential {
        /// Environment variable or builder field.
        name: &'static str,
    },

    /// A credential does not look like a LinkedIn access token.
    #[error("invalid credential {name}: expected more than 20 characters of [A-Za-z0-9_-]")]
    InvalidCredential {
        /// Environment variable or builder field.
        name: &'static str,
    },

    /// The protocol version is not a `YYYYMM` string.
    #[error("invalid API version '{0}': expected six digits in YYYYMM form")]
    InvalidApiVersion(String),

    /// Any other invalid setting.
    #[error("invalid value for {name}: {message}")]
    InvalidValue {
        /// Setting name.
        name: &'static str,
        /// What is wrong.
        message: String,
    },
}
