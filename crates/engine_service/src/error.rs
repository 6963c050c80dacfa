//! Error types for the engine service client
//!
//! The remote service has no schema contract, so most failures are either
//! transport errors or replies that lack the field a request expects.

use thiserror::Error;

/// Errors that can occur while talking to the engine service or datastore
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport, timeout or HTTP status error
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Base URL or endpoint could not be built
    #[error("Invalid service URL: {0}")]
    Url(#[from] url::ParseError),

    /// Reply body was not JSON
    #[error("Malformed JSON reply: {0}")]
    Json(#[from] serde_json::Error),

    /// Reply is valid JSON but lacks an expected field
    #[error("Reply is missing field `{field}`")]
    MissingField { field: &'static str },

    /// Reply field is present but has the wrong shape
    #[error("Reply field `{field}` has unexpected value: {value}")]
    UnexpectedValue { field: &'static str, value: String },

    /// Datastore write attempted without a signed-in user
    #[error("No user is signed in")]
    NotSignedIn,

    /// Quiz scores are only stored for users that registered a nickname
    #[error("User {user_id} has no nickname registered")]
    NicknameMissing { user_id: String },
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
