//! Broker error types.
//!
//! Every fallible operation in the crate returns [`BrokerResult`]. Errors
//! split into two groups: local ones raised before any request leaves the
//! process, and transport/remote ones produced while talking to the server.
//! Nothing is retried; the first error is handed back to the caller as-is.

use thiserror::Error;

/// Result type for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors that can occur while building, sending or merging requests.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum BrokerError {
    /// Input is out of range or not one of the accepted values
    #[error("Validation error: {0}")]
    Validation(String),

    /// A field required by the chosen order type or time-in-force is absent
    #[error("Missing required field '{field}' for {context}")]
    MissingRequiredField {
        /// Wire name of the missing field
        field: &'static str,
        /// What was being built when the field was found missing
        context: String,
    },

    /// Neither a provider ID nor an alias was supplied
    #[error("Either a provider ID or an alias must be supplied")]
    MissingIdentifier,

    /// A bulk operation was called without any selector
    #[error("A bulk operation needs provider IDs, aliases or an instrument")]
    MissingFilter,

    /// The server answered with a status of 400 or above
    #[error("Remote error [HTTP {status}]: {message}")]
    Remote {
        /// HTTP status code
        status: u16,
        /// Server error message, or the raw body when none was given
        message: String,
    },

    /// Transport failure (connect, timeout, body read)
    #[error("Request error: {0}")]
    Request(String),

    /// Response body did not have the expected shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl BrokerError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a missing-field error.
    pub fn missing_field(field: &'static str, context: impl Into<String>) -> Self {
        Self::MissingRequiredField {
            field,
            context: context.into(),
        }
    }

    /// Create a remote error.
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Returns true if the error was raised before any network call.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            BrokerError::Validation(_)
                | BrokerError::MissingRequiredField { .. }
                | BrokerError::MissingIdentifier
                | BrokerError::MissingFilter
        )
    }

    /// HTTP status for remote errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            BrokerError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BrokerError {
    fn from(err: serde_json::Error) -> Self {
        BrokerError::Parse(err.to_string())
    }
}
