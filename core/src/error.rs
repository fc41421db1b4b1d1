//! Error types for the API caller.
//!
//! # Design
//! Transport and HTTP failures are data: they end up on `ApiResponse` rather
//! than in an `Err`. The variants here are the failures that stop a caller at
//! the point of use: a payload that cannot be encoded, or an accessor asking
//! for a document that was never parsed. `Transport` and `Parse` also travel
//! between the transport, the document parser and the interpreter before the
//! interpreter folds them into the response.

use http::StatusCode;
use thiserror::Error;

/// Errors produced by request building, transports, document parsing and
/// response accessors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request payload could not be serialized to JSON.
    #[error("failed to encode payload: {0}")]
    Encoding(String),

    /// A response body could not be parsed as a JSON:API document.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// No response was received: connection, DNS, TLS or local I/O failure.
    #[error("Transport error: {0}")]
    Transport(String),

    /// An accessor needed a parsed document (or a resource in it) and there
    /// was none. `status` is always `307 Temporary Redirect`.
    #[error("{message}")]
    EmptyResponse { status: StatusCode, message: String },
}

impl ApiError {
    /// Status carried by accessor failures.
    pub const EMPTY_RESPONSE_STATUS: StatusCode = StatusCode::TEMPORARY_REDIRECT;

    pub(crate) fn empty_response(raw_response: &str) -> Self {
        let message = if raw_response.is_empty() {
            "Response is empty".to_string()
        } else {
            raw_response.to_string()
        };
        ApiError::EmptyResponse {
            status: Self::EMPTY_RESPONSE_STATUS,
            message,
        }
    }
}
